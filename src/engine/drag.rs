//! Drag-to-reposition gesture
//!
//! The refresh timer is held for the whole gesture so a reload can never land
//! mid-drag, and gesture end always releases it, dropped or not.

use tracing::debug;

use super::timer::TimerEngine;
use crate::{
    state::PauseContext,
    store::{DropZone, Position, PositionStore, Viewport},
};

#[derive(Debug, Default)]
pub struct DragController {
    pause: PauseContext,
    dragging: bool,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn pause_context(&self) -> PauseContext {
        self.pause
    }

    /// Hold the timer. Re-entrant calls are ignored.
    pub fn start_pause(&mut self, engine: &mut TimerEngine) {
        if !self.pause.enter(engine.phase().is_running()) {
            debug!("Pause already active");
            return;
        }
        engine.suspend();
    }

    /// Release the timer, restarting it if it was running before the pause
    pub fn end_pause(&mut self, engine: &mut TimerEngine) {
        match self.pause.exit() {
            Some(true) => engine.start(),
            Some(false) => {}
            None => debug!("No pause to end"),
        }
    }

    /// Fold a start that happened mid-pause into the pause, so the timer
    /// only runs once the gesture is over.
    pub fn defer_start(&mut self, engine: &mut TimerEngine) {
        if !self.pause.is_paused || !engine.phase().is_running() {
            return;
        }
        debug!("Deferring timer start until the pause ends");
        self.pause.was_running_before_pause = true;
        engine.suspend();
    }

    /// Fold a remote disable that arrived mid-pause into the pause, so gesture
    /// end does not re-enable auto-refresh. Returns whether anything changed.
    pub fn defer_stop(&mut self, engine: &mut TimerEngine) -> bool {
        if !self.pause.is_paused || !self.pause.was_running_before_pause {
            return false;
        }
        debug!("Auto-refresh disabled during pause, not resuming at its end");
        self.pause.was_running_before_pause = false;
        engine.stop();
        true
    }

    pub fn drag_start(&mut self, engine: &mut TimerEngine, x: f64, y: f64) {
        debug!("Drag started at ({}, {})", x, y);
        self.dragging = true;
        self.start_pause(engine);
    }

    /// Whether a drop is allowed at this point
    pub fn drag_over(&self, viewport: &Viewport, x: f64, y: f64) -> bool {
        self.dragging && DropZone::for_viewport(viewport).contains(x, y)
    }

    /// Complete a drop. Returns the new, persisted position, or `None` when
    /// the drop lands outside the drop zone or no drag is in progress.
    pub fn drop_at(
        &mut self,
        positions: &PositionStore,
        viewport: &Viewport,
        x: f64,
        y: f64,
    ) -> Option<Position> {
        if !self.drag_over(viewport, x, y) {
            debug!("Drop at ({}, {}) rejected", x, y);
            return None;
        }
        let position = viewport.position_under_pointer(x, y);
        positions.save(position);
        Some(position)
    }

    pub fn drag_end(&mut self, engine: &mut TimerEngine) {
        debug!("Drag ended");
        self.dragging = false;
        self.end_pause(engine);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::{
        engine::{ManualScheduler, RefreshWindow},
        state::TimerPhase,
        store::{ActivityStore, OriginStore},
    };

    fn engine(origin: &Arc<OriginStore>) -> (TimerEngine, ManualScheduler) {
        let scheduler = ManualScheduler::new();
        let engine = TimerEngine::new(
            Box::new(scheduler.clone()),
            ActivityStore::new(Arc::new(origin.handle())),
            RefreshWindow::default(),
        )
        .with_rng(StdRng::seed_from_u64(1));
        (engine, scheduler)
    }

    #[test]
    fn pause_round_trip_restores_each_phase() {
        for setup in [TimerPhase::Stopped, TimerPhase::Running, TimerPhase::Suspended] {
            let origin = Arc::new(OriginStore::in_memory());
            let (mut engine, _scheduler) = engine(&origin);
            match setup {
                TimerPhase::Stopped => {}
                TimerPhase::Running => engine.start(),
                TimerPhase::Suspended => {
                    engine.start();
                    engine.suspend();
                }
            }

            let mut drag = DragController::new();
            drag.start_pause(&mut engine);
            drag.start_pause(&mut engine);
            assert_eq!(engine.pending_timer(), None);
            drag.end_pause(&mut engine);
            drag.end_pause(&mut engine);

            assert_eq!(engine.phase(), setup);
        }
    }

    #[test]
    fn aborted_drag_reschedules_exactly_once() {
        let origin = Arc::new(OriginStore::in_memory());
        let (mut engine, scheduler) = engine(&origin);
        engine.start();
        let before = scheduler.scheduled().len();

        let mut drag = DragController::new();
        drag.drag_start(&mut engine, 100.0, 100.0);
        drag.drag_end(&mut engine);

        assert_eq!(engine.phase(), TimerPhase::Running);
        assert_eq!(scheduler.scheduled().len(), before + 1);
        assert_eq!(scheduler.pending_count(), 1);
    }

    #[test]
    fn disable_during_pause_is_kept_at_pause_end() {
        let origin = Arc::new(OriginStore::in_memory());
        let (mut engine, scheduler) = engine(&origin);
        engine.start();

        let mut drag = DragController::new();
        drag.start_pause(&mut engine);
        assert!(drag.defer_stop(&mut engine));
        assert!(!drag.defer_stop(&mut engine));
        drag.end_pause(&mut engine);

        assert_eq!(engine.phase(), TimerPhase::Stopped);
        assert_eq!(scheduler.pending_count(), 0);
        assert_eq!(origin.get(crate::store::ACTIVITY_KEY).unwrap(), None);
    }

    #[test]
    fn drop_outside_gesture_is_rejected() {
        let origin = Arc::new(OriginStore::in_memory());
        let positions = PositionStore::new(Arc::new(origin.handle()));
        let viewport = Viewport::new(800.0, 600.0);
        let mut drag = DragController::new();

        assert_eq!(drag.drop_at(&positions, &viewport, 300.0, 300.0), None);
        assert!(origin.entries().unwrap().is_empty());
    }
}
