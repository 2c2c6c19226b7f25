//! Cross-view reconciliation of the activity flag

use tracing::{debug, info};

use super::timer::TimerEngine;
use crate::store::{StorageEvent, ACTIVITY_KEY};

/// What a storage notification did to the local engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Started,
    Stopped,
    /// Notification was for another key
    Foreign,
    /// Local view is suspended and keeps its state
    HeldWhileSuspended,
}

#[derive(Debug, Clone)]
pub struct SyncListener {
    activity_key: String,
}

impl SyncListener {
    pub fn new() -> Self {
        Self::for_key(ACTIVITY_KEY)
    }

    pub fn for_key(activity_key: impl Into<String>) -> Self {
        Self {
            activity_key: activity_key.into(),
        }
    }

    pub fn handle(&self, event: &StorageEvent, engine: &mut TimerEngine) -> SyncOutcome {
        let Some(key) = event.key.as_deref() else {
            info!("Store cleared by another view, stopping auto-refresh");
            engine.stop();
            return SyncOutcome::Stopped;
        };

        if key != self.activity_key {
            debug!("Ignoring store change for foreign key '{}'", key);
            return SyncOutcome::Foreign;
        }

        // A suspended view does not follow remote changes until it is resumed
        if engine.phase().is_suspended() {
            debug!("Suspended, ignoring remote activity change");
            return SyncOutcome::HeldWhileSuspended;
        }

        if event.new_value.is_some() {
            info!("Auto-refresh enabled by another view");
            engine.start();
            SyncOutcome::Started
        } else {
            info!("Auto-refresh disabled by another view");
            engine.stop();
            SyncOutcome::Stopped
        }
    }
}

impl Default for SyncListener {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        engine::{ManualScheduler, RefreshWindow},
        state::TimerPhase,
        store::{ActivityStore, OriginStore},
    };

    fn engine() -> TimerEngine {
        let origin = Arc::new(OriginStore::in_memory());
        TimerEngine::new(
            Box::new(ManualScheduler::new()),
            ActivityStore::new(Arc::new(origin.handle())),
            RefreshWindow::default(),
        )
    }

    #[test]
    fn remote_disable_stops_running_view() {
        let mut engine = engine();
        engine.start();

        let outcome = SyncListener::new().handle(&StorageEvent::changed(ACTIVITY_KEY, None), &mut engine);
        assert_eq!(outcome, SyncOutcome::Stopped);
        assert_eq!(engine.phase(), TimerPhase::Stopped);
    }

    #[test]
    fn suspended_view_ignores_remote_disable() {
        let mut engine = engine();
        engine.start();
        engine.suspend();

        let outcome = SyncListener::new().handle(&StorageEvent::changed(ACTIVITY_KEY, None), &mut engine);
        assert_eq!(outcome, SyncOutcome::HeldWhileSuspended);
        assert_eq!(engine.phase(), TimerPhase::Suspended);
    }

    #[test]
    fn clear_stops_even_when_suspended() {
        let mut engine = engine();
        engine.start();
        engine.suspend();

        SyncListener::new().handle(&StorageEvent::cleared(), &mut engine);
        assert_eq!(engine.phase(), TimerPhase::Stopped);
    }

    #[test]
    fn foreign_keys_are_ignored() {
        let mut engine = engine();
        let event = StorageEvent::changed("redfresher-left", Some("10".into()));

        assert_eq!(SyncListener::new().handle(&event, &mut engine), SyncOutcome::Foreign);
        assert_eq!(engine.phase(), TimerPhase::Stopped);
    }
}
