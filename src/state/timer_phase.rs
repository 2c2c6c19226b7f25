//! Timer phase and how each phase is presented

use serde::{Deserialize, Serialize};

/// Tri-state status of the refresh timer for one view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerPhase {
    /// No reload pending
    Stopped,
    /// A reload is scheduled
    Running,
    /// Temporarily inert because the user is busy elsewhere on the page
    Suspended,
}

impl TimerPhase {
    pub fn is_running(&self) -> bool {
        matches!(self, TimerPhase::Running)
    }

    pub fn is_suspended(&self) -> bool {
        matches!(self, TimerPhase::Suspended)
    }

    pub fn indicator(&self) -> Indicator {
        match self {
            TimerPhase::Stopped => Indicator::Off,
            TimerPhase::Running => Indicator::On,
            TimerPhase::Suspended => Indicator::Suspended,
        }
    }
}

impl Default for TimerPhase {
    fn default() -> Self {
        TimerPhase::Stopped
    }
}

/// The three visual states of the control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Indicator {
    Off,
    On,
    Suspended,
}

impl Indicator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Indicator::Off => "off",
            Indicator::On => "on",
            Indicator::Suspended => "suspended",
        }
    }

    /// Fill colour of the icon mask
    pub fn color(&self) -> &'static str {
        match self {
            Indicator::Off => "darkgray",
            Indicator::On => "green",
            Indicator::Suspended => "goldenrod",
        }
    }

    /// Accessible label / tooltip text
    pub fn label(&self) -> &'static str {
        match self {
            Indicator::Off => "Page auto-refresh is off",
            Indicator::On => "Page auto-refresh is on",
            Indicator::Suspended => "Page auto-refresh is paused while you work on the page",
        }
    }
}
