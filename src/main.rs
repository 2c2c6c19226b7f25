//! RedFresher host - serves simulated views of one origin over HTTP
//!
//! This is the main entry point for the redfresher application.

use std::sync::Arc;
use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use redfresher::{
    api::create_router,
    config::Config,
    state::AppState,
    store::OriginStore,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("redfresher={},tower_http=info", config.log_level()))
        .init();

    let window = config.refresh_window();
    info!("Starting redfresher host v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: host={}, port={}, reload delay={}..={}ms",
        config.host,
        config.port,
        window.min().as_millis(),
        window.max().as_millis()
    );

    let origin = match &config.store {
        Some(path) => OriginStore::open(path)
            .with_context(|| format!("failed to open origin store {}", path.display()))?,
        None => {
            info!("No store file given, keys live in memory only");
            OriginStore::in_memory()
        }
    };

    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        Arc::new(origin),
        window,
        config.default_viewport(),
    ));

    let app = create_router(Arc::clone(&state));

    let addr = config.address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST   /views                 - Mount a view");
    info!("  GET    /views                 - List views");
    info!("  GET    /views/:id             - View state");
    info!("  DELETE /views/:id             - Close a view");
    info!("  POST   /views/:id/click       - Activate the control");
    info!("  POST   /views/:id/key         - Key press on the control");
    info!("  POST   /views/:id/outside-click - Click elsewhere on the page");
    info!("  POST   /views/:id/drag-start|drag-over|drop|drag-end - Move the control");
    info!("  POST   /views/:id/resize      - Resize the viewport");
    info!("  POST   /storage/clear         - Clear the origin store");
    info!("  GET    /status                - Host status");
    info!("  GET    /health                - Health check");

    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    if let Err(e) = state.close_all() {
        tracing::warn!("Failed to close views cleanly: {}", e);
    }
    info!("Server shutdown complete");
    Ok(())
}
