//! API request and response structures

use std::collections::BTreeMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    state::ViewSnapshot,
    store::Viewport,
    view::ViewOutcome,
};

/// Body of POST /views
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpenViewRequest {
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
}

impl OpenViewRequest {
    /// Requested viewport, filling a missing side from `fallback`
    pub fn viewport(&self, fallback: Viewport) -> Viewport {
        Viewport::new(
            self.width.unwrap_or(fallback.width),
            self.height.unwrap_or(fallback.height),
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PointerRequest {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyRequest {
    pub key: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ResizeRequest {
    pub width: f64,
    pub height: f64,
}

/// Response for every endpoint that acts on a single view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    /// Only set for drag-over
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drop_allowed: Option<bool>,
    pub reloaded: bool,
    pub view: ViewSnapshot,
}

impl ViewResponse {
    pub fn new(message: String, view: ViewSnapshot) -> Self {
        Self {
            status: view.appearance.indicator.as_str().to_string(),
            message,
            timestamp: Utc::now(),
            drop_allowed: None,
            reloaded: false,
            view,
        }
    }

    pub fn from_outcome(message: String, outcome: ViewOutcome, view: ViewSnapshot) -> Self {
        let mut response = Self::new(message, view);
        match outcome {
            ViewOutcome::DropAllowed(allowed) => response.drop_allowed = Some(allowed),
            ViewOutcome::Reload => response.reloaded = true,
            ViewOutcome::Render | ViewOutcome::Unchanged => {}
        }
        response
    }
}

/// Response of GET /status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub views: Vec<ViewSnapshot>,
    pub store: BTreeMap<String, String>,
    pub store_path: Option<String>,
    pub refresh_window_ms: (u64, u64),
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
