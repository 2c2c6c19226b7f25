//! Control geometry, clamping and position persistence

use std::sync::Arc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::shared::SharedStore;

pub const LEFT_KEY: &str = "redfresher-left";
pub const TOP_KEY: &str = "redfresher-top";

/// Edge length of the square control
pub const SIZE: f64 = 24.0;
/// Horizontal margin; a full control width keeps clear of edge-swipe gestures
pub const X_GAP: f64 = SIZE;
pub const Y_GAP: f64 = SIZE / 2.0;

/// Visible area of a view
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    fn max_left(&self) -> f64 {
        self.width - SIZE - X_GAP
    }

    fn max_top(&self) -> f64 {
        self.height - SIZE - Y_GAP
    }

    /// Clamp a left coordinate into the viewport. If the viewport is too
    /// small for both margins the upper bound wins.
    pub fn clamp_left(&self, left: f64) -> f64 {
        left.max(X_GAP).min(self.max_left())
    }

    pub fn clamp_top(&self, top: f64) -> f64 {
        top.max(Y_GAP).min(self.max_top())
    }

    pub fn clamp(&self, position: Position) -> Position {
        Position {
            left: self.clamp_left(position.left),
            top: self.clamp_top(position.top),
        }
    }

    /// Position for a control centred under the pointer
    pub fn position_under_pointer(&self, x: f64, y: f64) -> Position {
        self.clamp(Position {
            left: x - SIZE / 2.0,
            top: y - SIZE / 2.0,
        })
    }
}

/// Top-left corner of the control, in viewport pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub left: f64,
    pub top: f64,
}

/// Reads the stored position once at mount and writes it on drop
pub struct PositionStore {
    store: Arc<dyn SharedStore>,
}

impl PositionStore {
    pub fn new(store: Arc<dyn SharedStore>) -> Self {
        Self { store }
    }

    /// Stored position clamped to `viewport`. Missing values default to the
    /// left-most, bottom-most spot.
    pub fn load(&self, viewport: &Viewport) -> Position {
        let left = self.read_coordinate(LEFT_KEY).unwrap_or(f64::NEG_INFINITY);
        let top = self.read_coordinate(TOP_KEY).unwrap_or(f64::INFINITY);
        viewport.clamp(Position { left, top })
    }

    pub fn save(&self, position: Position) {
        for (key, value) in [(LEFT_KEY, position.left), (TOP_KEY, position.top)] {
            if let Err(e) = self.store.set(key, &value.to_string()) {
                warn!("Failed to persist control position key {}: {}", key, e);
            }
        }
        debug!("Saved control position {:?}", position);
    }

    fn read_coordinate(&self, key: &str) -> Option<f64> {
        match self.store.get(key) {
            Ok(Some(raw)) => match raw.trim().parse::<f64>() {
                Ok(value) if value.is_finite() => Some(value),
                _ => {
                    debug!("Ignoring malformed position value {:?} for {}", raw, key);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!("Failed to read control position key {}: {}", key, e);
                None
            }
        }
    }
}

/// Area in which a drop is accepted while a drag gesture is in progress.
///
/// Any pointer inside it maps to a position the clamp leaves untouched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DropZone {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl DropZone {
    pub fn for_viewport(viewport: &Viewport) -> Self {
        Self {
            min_x: X_GAP + SIZE / 2.0,
            max_x: viewport.width - X_GAP - SIZE / 2.0,
            min_y: Y_GAP + SIZE / 2.0,
            max_y: viewport.height - Y_GAP - SIZE / 2.0,
        }
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        (self.min_x..=self.max_x).contains(&x) && (self.min_y..=self.max_y).contains(&y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::OriginStore;

    #[test]
    fn clamp_keeps_control_inside_margins() {
        let viewport = Viewport::new(800.0, 600.0);
        for (x, y) in [(-500.0, -500.0), (0.0, 0.0), (400.0, 300.0), (5000.0, 5000.0)] {
            let p = viewport.position_under_pointer(x, y);
            assert!(p.left >= X_GAP && p.left <= 800.0 - SIZE - X_GAP, "{:?}", p);
            assert!(p.top >= Y_GAP && p.top <= 600.0 - SIZE - Y_GAP, "{:?}", p);
        }
    }

    #[test]
    fn first_run_defaults_to_bottom_left() {
        let origin = Arc::new(OriginStore::in_memory());
        let positions = PositionStore::new(Arc::new(origin.handle()));
        let viewport = Viewport::new(800.0, 600.0);

        let p = positions.load(&viewport);
        assert_eq!(p, Position { left: X_GAP, top: 600.0 - SIZE - Y_GAP });
    }

    #[test]
    fn stored_position_is_clamped_on_read() {
        let origin = Arc::new(OriginStore::in_memory());
        let handle = origin.handle();
        handle.set(LEFT_KEY, "9999").unwrap();
        handle.set(TOP_KEY, "not a number").unwrap();

        let positions = PositionStore::new(Arc::new(handle));
        let p = positions.load(&Viewport::new(800.0, 600.0));
        assert_eq!(p.left, 800.0 - SIZE - X_GAP);
        assert_eq!(p.top, 600.0 - SIZE - Y_GAP);
    }

    #[test]
    fn drop_zone_points_are_never_clamped() {
        let viewport = Viewport::new(640.0, 480.0);
        let zone = DropZone::for_viewport(&viewport);
        for (x, y) in [(zone.min_x, zone.min_y), (zone.max_x, zone.max_y), (320.0, 240.0)] {
            assert!(zone.contains(x, y));
            let p = viewport.position_under_pointer(x, y);
            assert_eq!(p.left, x - SIZE / 2.0);
            assert_eq!(p.top, y - SIZE / 2.0);
        }
        assert!(!zone.contains(zone.min_x - 1.0, 240.0));
    }
}
