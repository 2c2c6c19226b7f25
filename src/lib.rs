//! RedFresher - a draggable control that periodically reloads the page
//!
//! The core is the control's state machine: a randomized refresh timer with a
//! stopped / running / suspended phase, a drag gesture that holds the timer
//! while the control is repositioned, and cross-view synchronization through
//! a shared per-origin store. A headless HTTP host drives simulated views.

pub mod api;
pub mod config;
pub mod engine;
pub mod state;
pub mod store;
pub mod tasks;
pub mod utils;
pub mod view;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use engine::{ManualScheduler, RefreshWindow, Scheduler, TimerEngine};
pub use state::{AppState, TimerPhase};
pub use store::{OriginStore, Position, Viewport};
pub use utils::signals::shutdown_signal;
pub use view::{ControlEvent, ControlView};
