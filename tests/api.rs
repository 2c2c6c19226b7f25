//! HTTP surface of the view host

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use redfresher::{
    create_router,
    store::{OriginStore, ACTIVITY_KEY},
    AppState, RefreshWindow, Viewport,
};

fn app() -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(
        0,
        "127.0.0.1".to_string(),
        Arc::new(OriginStore::in_memory()),
        RefreshWindow::default(),
        Viewport::new(1280.0, 720.0),
    ));
    (create_router(Arc::clone(&state)), state)
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(match body {
            Some(json) => Body::from(json.to_string()),
            None => Body::empty(),
        })
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn click_toggles_and_persists() {
    let (app, state) = app();

    let (status, opened) = call(&app, "POST", "/views", Some(serde_json::json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(opened["view"]["phase"], "stopped");
    let id = opened["view"]["id"].as_u64().unwrap();

    let (status, clicked) = call(&app, "POST", &format!("/views/{}/click", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(clicked["status"], "on");
    assert_eq!(clicked["view"]["appearance"]["color"], "green");
    assert!(state.origin.get(ACTIVITY_KEY).unwrap().is_some());

    let (_, clicked) = call(&app, "POST", &format!("/views/{}/click", id), None).await;
    assert_eq!(clicked["view"]["phase"], "stopped");
    assert!(state.origin.get(ACTIVITY_KEY).unwrap().is_none());
}

#[tokio::test]
async fn drag_over_reports_drop_permission() {
    let (app, _state) = app();
    let (_, opened) = call(&app, "POST", "/views", Some(serde_json::json!({"width": 800.0, "height": 600.0}))).await;
    let id = opened["view"]["id"].as_u64().unwrap();

    let point = serde_json::json!({"x": 400.0, "y": 300.0});
    call(&app, "POST", &format!("/views/{}/drag-start", id), Some(point.clone())).await;
    let (_, over) = call(&app, "POST", &format!("/views/{}/drag-over", id), Some(point.clone())).await;
    assert_eq!(over["drop_allowed"], true);

    let (_, dropped) = call(&app, "POST", &format!("/views/{}/drop", id), Some(point)).await;
    assert_eq!(dropped["view"]["appearance"]["position"]["left"], 388.0);
    assert_eq!(dropped["view"]["appearance"]["position"]["top"], 288.0);

    let (_, ended) = call(&app, "POST", &format!("/views/{}/drag-end", id), None).await;
    assert_eq!(ended["view"]["dragging"], false);
}

#[tokio::test]
async fn open_view_without_body_uses_default_viewport() {
    let (app, _state) = app();

    let request = Request::builder().method("POST").uri("/views").body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let opened: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(opened["view"]["viewport"]["width"], 1280.0);
    assert_eq!(opened["view"]["viewport"]["height"], 720.0);

    // Empty body with a JSON content type is accepted too
    let (status, _) = call(&app, "POST", "/views", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn unknown_view_is_not_found() {
    let (app, _state) = app();
    let (status, _) = call(&app, "POST", "/views/42/click", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(&app, "DELETE", "/views/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn status_lists_views_and_store() {
    let (app, _state) = app();
    let (_, opened) = call(&app, "POST", "/views", Some(serde_json::json!({}))).await;
    let id = opened["view"]["id"].as_u64().unwrap();
    call(&app, "POST", &format!("/views/{}/key", id), Some(serde_json::json!({"key": "Enter"}))).await;

    let (status, body) = call(&app, "GET", "/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["views"].as_array().unwrap().len(), 1);
    assert_eq!(body["store"][ACTIVITY_KEY], "1");
    assert_eq!(body["refresh_window_ms"][0], 7500);

    let (status, _) = call(&app, "POST", "/storage/clear", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn health_reports_ok() {
    let (app, _state) = app();
    let (status, body) = call(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
