//! Published state of one hosted view

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{PauseContext, TimerPhase};
use crate::{
    store::Viewport,
    view::{Appearance, ControlView},
};

pub type ViewId = u64;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewSnapshot {
    pub id: ViewId,
    pub phase: TimerPhase,
    pub appearance: Appearance,
    pub viewport: Viewport,
    pub pause: PauseContext,
    pub dragging: bool,
    pub reload_pending: bool,
    /// Activity flag is only kept in memory because the store failed
    pub degraded: bool,
    /// Times the view has been reloaded by its refresh timer
    pub reloads: u32,
    pub mounted_at: DateTime<Utc>,
}

impl ViewSnapshot {
    pub fn capture(id: ViewId, view: &ControlView, reloads: u32, mounted_at: DateTime<Utc>) -> Self {
        Self {
            id,
            phase: view.phase(),
            appearance: view.appearance(),
            viewport: view.viewport(),
            pause: view.pause_context(),
            dragging: view.is_dragging(),
            reload_pending: view.pending_timer().is_some(),
            degraded: view.activity_degraded(),
            reloads,
            mounted_at,
        }
    }
}
