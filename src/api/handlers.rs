//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use tracing::{error, info};

use crate::{
    state::{AppState, HostError, ViewId, ViewSnapshot},
    store::Viewport,
    view::ControlEvent,
};
use super::responses::{
    HealthResponse, KeyRequest, OpenViewRequest, PointerRequest, ResizeRequest, StatusResponse, ViewResponse,
};

fn status_for(e: &HostError) -> StatusCode {
    if e.is_not_found() {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Forward one event to a view and describe the result
async fn deliver(
    state: &AppState,
    id: ViewId,
    event: ControlEvent,
    message: &str,
) -> Result<Json<ViewResponse>, StatusCode> {
    match state.dispatch(id, event).await {
        Ok((outcome, snapshot)) => Ok(Json(ViewResponse::from_outcome(message.to_string(), outcome, snapshot))),
        Err(e) => {
            error!("Failed to deliver event to view {}: {}", id, e);
            Err(status_for(&e))
        }
    }
}

/// Handle POST /views - Mount a new view of the origin. The body is optional.
pub async fn open_view_handler(
    State(state): State<Arc<AppState>>,
    request: Option<Json<OpenViewRequest>>,
) -> Result<Json<ViewResponse>, StatusCode> {
    let request = request.map(|Json(request)| request).unwrap_or_default();
    let viewport = request.viewport(state.default_viewport);
    match state.open_view(Some(viewport)) {
        Ok(snapshot) => {
            info!("Opened view {} ({}x{})", snapshot.id, viewport.width, viewport.height);
            Ok(Json(ViewResponse::new("View mounted".to_string(), snapshot)))
        }
        Err(e) => {
            error!("Failed to open view: {}", e);
            Err(status_for(&e))
        }
    }
}

/// Handle GET /views - List every open view
pub async fn list_views_handler(State(state): State<Arc<AppState>>) -> Result<Json<Vec<ViewSnapshot>>, StatusCode> {
    state.snapshots().map(Json).map_err(|e| {
        error!("Failed to list views: {}", e);
        status_for(&e)
    })
}

/// Handle GET /views/:id - Current state of one view
pub async fn get_view_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<ViewId>,
) -> Result<Json<ViewResponse>, StatusCode> {
    match state.snapshot(id) {
        Ok(snapshot) => Ok(Json(ViewResponse::new("View state".to_string(), snapshot))),
        Err(e) => {
            error!("Failed to read view {}: {}", id, e);
            Err(status_for(&e))
        }
    }
}

/// Handle DELETE /views/:id - Close a view
pub async fn close_view_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<ViewId>,
) -> StatusCode {
    match state.close_view(id) {
        Ok(()) => {
            info!("Closed view {}", id);
            StatusCode::NO_CONTENT
        }
        Err(e) => {
            error!("Failed to close view {}: {}", id, e);
            status_for(&e)
        }
    }
}

/// Handle POST /views/:id/click - Activate the control
pub async fn click_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<ViewId>,
) -> Result<Json<ViewResponse>, StatusCode> {
    deliver(&state, id, ControlEvent::Click, "Control activated").await
}

/// Handle POST /views/:id/key - Key press on the focused control
pub async fn key_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<ViewId>,
    Json(request): Json<KeyRequest>,
) -> Result<Json<ViewResponse>, StatusCode> {
    deliver(&state, id, ControlEvent::Key(request.key), "Key delivered").await
}

/// Handle POST /views/:id/outside-click - Click elsewhere in the document
pub async fn outside_click_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<ViewId>,
) -> Result<Json<ViewResponse>, StatusCode> {
    deliver(&state, id, ControlEvent::OutsideClick, "Outside click delivered").await
}

/// Handle POST /views/:id/drag-start
pub async fn drag_start_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<ViewId>,
    Json(p): Json<PointerRequest>,
) -> Result<Json<ViewResponse>, StatusCode> {
    deliver(&state, id, ControlEvent::DragStart { x: p.x, y: p.y }, "Drag started").await
}

/// Handle POST /views/:id/drag-over
pub async fn drag_over_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<ViewId>,
    Json(p): Json<PointerRequest>,
) -> Result<Json<ViewResponse>, StatusCode> {
    deliver(&state, id, ControlEvent::DragOver { x: p.x, y: p.y }, "Drag over").await
}

/// Handle POST /views/:id/drop
pub async fn drop_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<ViewId>,
    Json(p): Json<PointerRequest>,
) -> Result<Json<ViewResponse>, StatusCode> {
    deliver(&state, id, ControlEvent::Drop { x: p.x, y: p.y }, "Drop delivered").await
}

/// Handle POST /views/:id/drag-end
pub async fn drag_end_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<ViewId>,
) -> Result<Json<ViewResponse>, StatusCode> {
    deliver(&state, id, ControlEvent::DragEnd, "Drag ended").await
}

/// Handle POST /views/:id/resize
pub async fn resize_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<ViewId>,
    Json(r): Json<ResizeRequest>,
) -> Result<Json<ViewResponse>, StatusCode> {
    let viewport = Viewport::new(r.width, r.height);
    deliver(&state, id, ControlEvent::Resize(viewport), "Viewport resized").await
}

/// Handle POST /storage/clear - Clear the whole origin store
pub async fn clear_storage_handler(State(state): State<Arc<AppState>>) -> StatusCode {
    match state.clear_store() {
        Ok(()) => {
            info!("Origin store cleared via API");
            StatusCode::NO_CONTENT
        }
        Err(e) => {
            error!("Failed to clear origin store: {}", e);
            status_for(&e)
        }
    }
}

/// Handle GET /status - Return current host status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, StatusCode> {
    let views = match state.snapshots() {
        Ok(v) => v,
        Err(e) => {
            error!("Failed to collect view snapshots: {}", e);
            return Err(status_for(&e));
        }
    };

    let store = match state.origin.entries() {
        Ok(entries) => entries,
        Err(e) => {
            error!("Failed to read origin store: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let (last_action, last_action_time) = state.get_last_action();
    let window = state.window;

    Ok(Json(StatusResponse {
        views,
        store,
        store_path: state.origin.path().map(|p| p.display().to_string()),
        refresh_window_ms: (window.min().as_millis() as u64, window.max().as_millis() as u64),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
