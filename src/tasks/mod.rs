//! Background tasks module
//!
//! One task per hosted view, plus the timers it schedules.

pub mod scheduler;
pub mod view_task;

// Re-export main types
pub use scheduler::TokioScheduler;
pub use view_task::{spawn_view, EventReply, ViewCommand, ViewHandle};
