//! Configuration and CLI argument handling

use std::path::PathBuf;
use clap::Parser;

use crate::{engine::RefreshWindow, store::Viewport};

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "redfresher")]
#[command(about = "Headless host for auto-refresh controls sharing one origin store")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// JSON file persisting the origin store; in-memory when omitted
    #[arg(short, long)]
    pub store: Option<PathBuf>,

    /// Lower bound of the randomized reload delay, in milliseconds
    #[arg(long, default_value_t = RefreshWindow::DEFAULT_MIN_MS)]
    pub min_delay_ms: u64,

    /// Upper bound of the randomized reload delay, in milliseconds
    #[arg(long, default_value_t = RefreshWindow::DEFAULT_MAX_MS)]
    pub max_delay_ms: u64,

    /// Default viewport width for new views
    #[arg(long, default_value = "1280")]
    pub width: f64,

    /// Default viewport height for new views
    #[arg(long, default_value = "720")]
    pub height: f64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn refresh_window(&self) -> RefreshWindow {
        RefreshWindow::new(self.min_delay_ms, self.max_delay_ms)
    }

    pub fn default_viewport(&self) -> Viewport {
        Viewport::new(self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_window() {
        let config = Config::try_parse_from(["redfresher"]).unwrap();
        assert_eq!(config.refresh_window(), RefreshWindow::default());
        assert_eq!(config.address(), "0.0.0.0:20554");
        assert_eq!(config.log_level(), "info");
    }

    #[test]
    fn swapped_bounds_are_reordered() {
        let config =
            Config::try_parse_from(["redfresher", "--min-delay-ms", "900", "--max-delay-ms", "100"]).unwrap();
        let window = config.refresh_window();
        assert_eq!(window.min().as_millis(), 100);
        assert_eq!(window.max().as_millis(), 900);
    }
}
