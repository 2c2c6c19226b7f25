//! State management module
//!
//! Per-view state types and the host-wide application state.

pub mod app_state;
pub mod errors;
pub mod pause;
pub mod timer_phase;
pub mod view_snapshot;

// Re-export main types
pub use app_state::AppState;
pub use errors::HostError;
pub use pause::PauseContext;
pub use timer_phase::{Indicator, TimerPhase};
pub use view_snapshot::{ViewId, ViewSnapshot};
