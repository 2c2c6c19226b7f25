//! The on-screen control
//!
//! Translates gestures, timer fires and storage notifications into calls on
//! the engine, drag controller and sync listener, and exposes what the widget
//! should look like afterwards.

use std::sync::Arc;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::debug;

use crate::{
    engine::{DragController, RefreshWindow, Scheduler, SyncListener, SyncOutcome, TimerEngine, TimerHandle},
    state::{Indicator, PauseContext, TimerPhase},
    store::{ActivityStore, Position, PositionStore, SharedStore, StorageEvent, Viewport},
};

/// Everything that can happen to a mounted control
#[derive(Debug, Clone, PartialEq)]
pub enum ControlEvent {
    /// Primary click on the control
    Click,
    /// Key pressed while the control has focus
    Key(String),
    /// Primary click anywhere else in the document
    OutsideClick,
    DragStart { x: f64, y: f64 },
    DragOver { x: f64, y: f64 },
    Drop { x: f64, y: f64 },
    DragEnd,
    Resize(Viewport),
    /// Change written by another view of the origin
    Storage(StorageEvent),
    TimerFired(TimerHandle),
}

/// Result of handling one event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewOutcome {
    /// State may have changed, re-render
    Render,
    Unchanged,
    /// Answer to a drag-over: whether dropping here is allowed
    DropAllowed(bool),
    /// The refresh timer fired, the view must reload now
    Reload,
}

/// What the widget should currently look like
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appearance {
    pub indicator: Indicator,
    pub color: String,
    pub label: String,
    pub position: Position,
    pub drop_zone_active: bool,
}

pub struct ControlView {
    engine: TimerEngine,
    drag: DragController,
    sync: SyncListener,
    positions: PositionStore,
    viewport: Viewport,
    position: Position,
}

impl ControlView {
    /// Mount the control: read the stored position once and resume
    /// auto-refresh if it was left enabled.
    pub fn mount(
        store: Arc<dyn SharedStore>,
        scheduler: Box<dyn Scheduler>,
        viewport: Viewport,
        window: RefreshWindow,
    ) -> Self {
        let engine = TimerEngine::new(scheduler, ActivityStore::new(Arc::clone(&store)), window);
        Self::mount_with_engine(engine, store, viewport)
    }

    /// Mount around an already configured engine
    pub fn mount_with_engine(mut engine: TimerEngine, store: Arc<dyn SharedStore>, viewport: Viewport) -> Self {
        let positions = PositionStore::new(store);
        let position = positions.load(&viewport);
        engine.mount();

        Self {
            engine,
            drag: DragController::new(),
            sync: SyncListener::new(),
            positions,
            viewport,
            position,
        }
    }

    pub fn phase(&self) -> TimerPhase {
        self.engine.phase()
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    pub fn pause_context(&self) -> PauseContext {
        self.drag.pause_context()
    }

    pub fn pending_timer(&self) -> Option<TimerHandle> {
        self.engine.pending_timer()
    }

    pub fn activity_degraded(&self) -> bool {
        self.engine.activity_degraded()
    }

    /// Phase notifications for whoever renders the control
    pub fn subscribe(&self) -> watch::Receiver<TimerPhase> {
        self.engine.subscribe()
    }

    pub fn appearance(&self) -> Appearance {
        let indicator = self.engine.phase().indicator();
        Appearance {
            indicator,
            color: indicator.color().to_string(),
            label: indicator.label().to_string(),
            position: self.position,
            drop_zone_active: self.drag.is_dragging(),
        }
    }

    pub fn handle(&mut self, event: ControlEvent) -> ViewOutcome {
        match event {
            ControlEvent::Click => self.activate(),
            ControlEvent::Key(key) => match key.as_str() {
                "Enter" | " " | "Space" | "Spacebar" => self.activate(),
                _ => ViewOutcome::Unchanged,
            },
            ControlEvent::OutsideClick => {
                if !self.engine.phase().is_running() {
                    return ViewOutcome::Unchanged;
                }
                debug!("Click outside the control, suspending auto-refresh");
                self.engine.suspend();
                ViewOutcome::Render
            }
            ControlEvent::DragStart { x, y } => {
                self.drag.drag_start(&mut self.engine, x, y);
                ViewOutcome::Render
            }
            ControlEvent::DragOver { x, y } => {
                ViewOutcome::DropAllowed(self.drag.drag_over(&self.viewport, x, y))
            }
            ControlEvent::Drop { x, y } => {
                match self.drag.drop_at(&self.positions, &self.viewport, x, y) {
                    Some(position) => {
                        self.position = position;
                        ViewOutcome::Render
                    }
                    None => ViewOutcome::Unchanged,
                }
            }
            ControlEvent::DragEnd => {
                self.drag.drag_end(&mut self.engine);
                ViewOutcome::Render
            }
            ControlEvent::Resize(viewport) => {
                self.viewport = viewport;
                self.position = viewport.clamp(self.position);
                ViewOutcome::Render
            }
            ControlEvent::Storage(event) => match self.sync.handle(&event, &mut self.engine) {
                SyncOutcome::Started => {
                    // Keep the timer held until the gesture ends
                    self.drag.defer_start(&mut self.engine);
                    ViewOutcome::Render
                }
                SyncOutcome::Stopped => ViewOutcome::Render,
                // Held by the drag pause rather than an outside click
                SyncOutcome::HeldWhileSuspended
                    if event.new_value.is_none() && self.drag.defer_stop(&mut self.engine) =>
                {
                    ViewOutcome::Render
                }
                SyncOutcome::Foreign | SyncOutcome::HeldWhileSuspended => ViewOutcome::Unchanged,
            },
            ControlEvent::TimerFired(handle) => {
                if self.engine.on_timer_fired(handle) {
                    ViewOutcome::Reload
                } else {
                    ViewOutcome::Unchanged
                }
            }
        }
    }

    fn activate(&mut self) -> ViewOutcome {
        if self.drag.is_dragging() {
            debug!("Activation ignored during drag");
            return ViewOutcome::Unchanged;
        }
        if !self.engine.resume_if_suspended_and_flag_set() {
            self.engine.toggle();
        }
        ViewOutcome::Render
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        engine::ManualScheduler,
        store::{OriginStore, ACTIVITY_KEY},
    };

    fn mount(origin: &Arc<OriginStore>) -> (ControlView, ManualScheduler) {
        let scheduler = ManualScheduler::new();
        let view = ControlView::mount(
            Arc::new(origin.handle()),
            Box::new(scheduler.clone()),
            Viewport::new(800.0, 600.0),
            RefreshWindow::default(),
        );
        (view, scheduler)
    }

    #[test]
    fn keyboard_activation_matches_click() {
        let origin = Arc::new(OriginStore::in_memory());
        let (mut view, _scheduler) = mount(&origin);

        assert_eq!(view.handle(ControlEvent::Key("Tab".into())), ViewOutcome::Unchanged);
        view.handle(ControlEvent::Key("Enter".into()));
        assert_eq!(view.phase(), TimerPhase::Running);
        view.handle(ControlEvent::Key(" ".into()));
        assert_eq!(view.phase(), TimerPhase::Stopped);
    }

    #[test]
    fn outside_click_only_suspends_running_view() {
        let origin = Arc::new(OriginStore::in_memory());
        let (mut view, _scheduler) = mount(&origin);

        assert_eq!(view.handle(ControlEvent::OutsideClick), ViewOutcome::Unchanged);
        view.handle(ControlEvent::Click);
        view.handle(ControlEvent::OutsideClick);
        assert_eq!(view.phase(), TimerPhase::Suspended);
        assert_eq!(view.appearance().indicator, Indicator::Suspended);
    }

    #[test]
    fn drop_moves_and_persists_control() {
        let origin = Arc::new(OriginStore::in_memory());
        let (mut view, _scheduler) = mount(&origin);

        view.handle(ControlEvent::DragStart { x: 30.0, y: 570.0 });
        assert!(view.appearance().drop_zone_active);
        assert_eq!(view.handle(ControlEvent::DragOver { x: 2.0, y: 2.0 }), ViewOutcome::DropAllowed(false));
        assert_eq!(view.handle(ControlEvent::DragOver { x: 412.0, y: 312.0 }), ViewOutcome::DropAllowed(true));
        view.handle(ControlEvent::Drop { x: 412.0, y: 312.0 });
        view.handle(ControlEvent::DragEnd);

        assert_eq!(view.position(), Position { left: 400.0, top: 300.0 });
        assert_eq!(origin.get("redfresher-left").unwrap().as_deref(), Some("400"));
        assert_eq!(origin.get("redfresher-top").unwrap().as_deref(), Some("300"));
        assert!(!view.appearance().drop_zone_active);
    }

    #[test]
    fn remote_enable_during_drag_waits_for_gesture_end() {
        let origin = Arc::new(OriginStore::in_memory());
        let (mut view, scheduler) = mount(&origin);

        view.handle(ControlEvent::DragStart { x: 100.0, y: 100.0 });
        view.handle(ControlEvent::Storage(StorageEvent::changed(ACTIVITY_KEY, Some("1".into()))));
        assert_eq!(scheduler.pending_count(), 0);

        view.handle(ControlEvent::DragEnd);
        assert_eq!(view.phase(), TimerPhase::Running);
        assert_eq!(scheduler.pending_count(), 1);
    }

    #[test]
    fn remote_disable_during_drag_is_not_undone_at_gesture_end() {
        let origin = Arc::new(OriginStore::in_memory());
        let (mut view, scheduler) = mount(&origin);
        view.handle(ControlEvent::Click);

        view.handle(ControlEvent::DragStart { x: 100.0, y: 100.0 });
        origin.write(0, ACTIVITY_KEY, None).unwrap();
        let outcome = view.handle(ControlEvent::Storage(StorageEvent::changed(ACTIVITY_KEY, None)));
        assert_eq!(outcome, ViewOutcome::Render);

        view.handle(ControlEvent::DragEnd);
        assert_eq!(view.phase(), TimerPhase::Stopped);
        assert_eq!(scheduler.pending_count(), 0);
        assert_eq!(origin.get(ACTIVITY_KEY).unwrap(), None);
    }

    #[test]
    fn outside_click_suspension_still_ignores_remote_disable_while_dragging() {
        let origin = Arc::new(OriginStore::in_memory());
        let (mut view, _scheduler) = mount(&origin);
        view.handle(ControlEvent::Click);
        view.handle(ControlEvent::OutsideClick);

        view.handle(ControlEvent::DragStart { x: 100.0, y: 100.0 });
        let outcome = view.handle(ControlEvent::Storage(StorageEvent::changed(ACTIVITY_KEY, None)));
        assert_eq!(outcome, ViewOutcome::Unchanged);

        view.handle(ControlEvent::DragEnd);
        assert_eq!(view.phase(), TimerPhase::Suspended);
    }

    #[test]
    fn firing_the_pending_timer_requests_reload() {
        let origin = Arc::new(OriginStore::in_memory());
        let (mut view, scheduler) = mount(&origin);
        view.handle(ControlEvent::Click);

        let handle = scheduler.fire_next().unwrap();
        assert_eq!(view.handle(ControlEvent::TimerFired(handle)), ViewOutcome::Reload);
    }

    #[test]
    fn resize_reclamps_rendered_position() {
        let origin = Arc::new(OriginStore::in_memory());
        let (mut view, _scheduler) = mount(&origin);

        view.handle(ControlEvent::Resize(Viewport::new(400.0, 300.0)));
        assert_eq!(view.position().top, 300.0 - 24.0 - 12.0);
    }
}
