//! View layer: the control widget and its event contract

pub mod control;

pub use control::{Appearance, ControlEvent, ControlView, ViewOutcome};
