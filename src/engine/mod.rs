//! Control state machine
//!
//! Timer engine, drag pause coordination and cross-view sync.

pub mod drag;
pub mod sync;
pub mod timer;

pub use drag::DragController;
pub use sync::{SyncListener, SyncOutcome};
pub use timer::{ManualScheduler, RefreshWindow, Scheduler, TimerEngine, TimerHandle};
