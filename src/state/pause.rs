//! Pause bookkeeping for the drag gesture

use serde::{Deserialize, Serialize};

/// Whether a drag pause is active, and what to restore when it ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PauseContext {
    pub is_paused: bool,
    pub was_running_before_pause: bool,
}

impl PauseContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter the pause. Returns false if a pause was already active.
    pub fn enter(&mut self, was_running: bool) -> bool {
        if self.is_paused {
            return false;
        }
        self.is_paused = true;
        self.was_running_before_pause = was_running;
        true
    }

    /// Leave the pause, yielding whether the timer should be restarted.
    /// `None` when no pause was active.
    pub fn exit(&mut self) -> Option<bool> {
        if !self.is_paused {
            return None;
        }
        let resume = self.was_running_before_pause;
        *self = Self::default();
        Some(resume)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_enter_keeps_first_snapshot() {
        let mut pause = PauseContext::new();
        assert!(pause.enter(true));
        assert!(!pause.enter(false));
        assert_eq!(pause.exit(), Some(true));
        assert_eq!(pause.exit(), None);
    }
}
