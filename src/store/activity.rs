//! Persisted "auto-refresh enabled" flag

use std::sync::Arc;
use tracing::{debug, warn};

use super::shared::SharedStore;

/// Key whose mere presence means auto-refresh is enabled
pub const ACTIVITY_KEY: &str = "redfresher-status";

/// Value written when enabling. Constant so that re-enabling never changes it.
pub const ACTIVITY_ENABLED: &str = "1";

/// Reads and writes the activity flag, falling back to a view-local copy
/// whenever the shared store cannot be used.
pub struct ActivityStore {
    store: Arc<dyn SharedStore>,
    local: Option<bool>,
    degraded: bool,
}

impl ActivityStore {
    pub fn new(store: Arc<dyn SharedStore>) -> Self {
        Self {
            store,
            local: None,
            degraded: false,
        }
    }

    /// Whether auto-refresh is requested. Any stored value counts as enabled.
    /// Once degraded, the view-local copy wins over whatever the store says.
    pub fn is_enabled(&mut self) -> bool {
        if self.degraded {
            if let Some(enabled) = self.local {
                return enabled;
            }
        }
        match self.store.get(ACTIVITY_KEY) {
            Ok(value) => value.is_some(),
            Err(e) => {
                self.enter_degraded(&e.to_string());
                self.local.unwrap_or(false)
            }
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.local = Some(enabled);

        let result = if enabled {
            self.store.set(ACTIVITY_KEY, ACTIVITY_ENABLED)
        } else {
            self.store.remove(ACTIVITY_KEY)
        };

        match result {
            Ok(()) => debug!("Activity flag persisted: {}", enabled),
            Err(e) => self.enter_degraded(&e.to_string()),
        }
    }

    /// True once any store operation has failed for this view
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    fn enter_degraded(&mut self, reason: &str) {
        if !self.degraded {
            warn!("Activity store unavailable, keeping flag in memory: {}", reason);
        }
        self.degraded = true;
    }
}
