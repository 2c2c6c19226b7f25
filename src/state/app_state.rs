//! Main application state management

use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, MutexGuard,
    },
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::sync::oneshot;
use tracing::{info, warn};

use super::{HostError, ViewId, ViewSnapshot};
use crate::{
    engine::RefreshWindow,
    store::{OriginStore, Viewport, HOST_WRITER},
    tasks::{spawn_view, EventReply, ViewCommand, ViewHandle},
    view::ControlEvent,
};

/// Host state: the shared origin store and every open view of it
#[derive(Debug)]
pub struct AppState {
    /// Store shared by all views of the origin
    pub origin: Arc<OriginStore>,
    pub window: RefreshWindow,
    pub default_viewport: Viewport,
    views: Mutex<BTreeMap<ViewId, ViewHandle>>,
    next_view: AtomicU64,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl AppState {
    pub fn new(
        port: u16,
        host: String,
        origin: Arc<OriginStore>,
        window: RefreshWindow,
        default_viewport: Viewport,
    ) -> Self {
        Self {
            origin,
            window,
            default_viewport,
            views: Mutex::new(BTreeMap::new()),
            next_view: AtomicU64::new(1),
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
        }
    }

    /// Mount a new view of the origin. Must be called inside the runtime.
    pub fn open_view(&self, viewport: Option<Viewport>) -> Result<ViewSnapshot, HostError> {
        let id = self.next_view.fetch_add(1, Ordering::Relaxed);
        let viewport = viewport.unwrap_or(self.default_viewport);
        let handle = spawn_view(id, Arc::clone(&self.origin), viewport, self.window);
        let snapshot = handle.snapshots.borrow().clone();

        self.lock_views()?.insert(id, handle);
        self.record_action(&format!("open view {}", id));
        Ok(snapshot)
    }

    pub fn close_view(&self, id: ViewId) -> Result<(), HostError> {
        let handle = self.lock_views()?.remove(&id).ok_or(HostError::ViewNotFound { id })?;

        if handle.commands.send(ViewCommand::Close).is_err() {
            warn!("View {} task had already stopped", id);
        }
        self.record_action(&format!("close view {}", id));
        Ok(())
    }

    /// Deliver an event to a view and wait until it has been handled
    pub async fn dispatch(&self, id: ViewId, event: ControlEvent) -> Result<EventReply, HostError> {
        let commands = self
            .lock_views()?
            .get(&id)
            .map(|handle| handle.commands.clone())
            .ok_or(HostError::ViewNotFound { id })?;

        let action = format!("{:?} on view {}", event, id);
        let (reply_tx, reply_rx) = oneshot::channel();
        commands
            .send(ViewCommand::Event { event, reply: Some(reply_tx) })
            .map_err(|_| HostError::ViewClosed { id })?;

        let reply = reply_rx.await.map_err(|_| HostError::ViewClosed { id })?;
        self.record_action(&action);
        Ok(reply)
    }

    pub fn snapshot(&self, id: ViewId) -> Result<ViewSnapshot, HostError> {
        self.lock_views()?
            .get(&id)
            .map(|handle| handle.snapshots.borrow().clone())
            .ok_or(HostError::ViewNotFound { id })
    }

    pub fn snapshots(&self) -> Result<Vec<ViewSnapshot>, HostError> {
        Ok(self
            .lock_views()?
            .values()
            .map(|handle| handle.snapshots.borrow().clone())
            .collect())
    }

    /// Clear the origin store as if done from outside every view
    pub fn clear_store(&self) -> Result<(), HostError> {
        self.origin.clear(HOST_WRITER)?;
        self.record_action("clear store");
        Ok(())
    }

    /// Close every view, e.g. on shutdown
    pub fn close_all(&self) -> Result<(), HostError> {
        let views = std::mem::take(&mut *self.lock_views()?);
        for (id, handle) in views {
            if handle.commands.send(ViewCommand::Close).is_err() {
                warn!("View {} task had already stopped", id);
            }
        }
        info!("All views closed");
        Ok(())
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }

    fn lock_views(&self) -> Result<MutexGuard<'_, BTreeMap<ViewId, ViewHandle>>, HostError> {
        self.views.lock().map_err(|e| HostError::StateLock {
            reason: e.to_string(),
        })
    }
}
