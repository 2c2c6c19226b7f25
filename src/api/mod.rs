//! HTTP API module
//!
//! Endpoints to mount views, deliver gestures to them and inspect the host.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/views", post(open_view_handler).get(list_views_handler))
        .route("/views/:id", get(get_view_handler).delete(close_view_handler))
        .route("/views/:id/click", post(click_handler))
        .route("/views/:id/key", post(key_handler))
        .route("/views/:id/outside-click", post(outside_click_handler))
        .route("/views/:id/drag-start", post(drag_start_handler))
        .route("/views/:id/drag-over", post(drag_over_handler))
        .route("/views/:id/drop", post(drop_handler))
        .route("/views/:id/drag-end", post(drag_end_handler))
        .route("/views/:id/resize", post(resize_handler))
        .route("/storage/clear", post(clear_storage_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
