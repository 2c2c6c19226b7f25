//! Persistence layer
//!
//! The shared per-origin store plus the two typed views onto it used by the
//! control: the activity flag and the control position.

pub mod activity;
pub mod origin;
pub mod position;
pub mod shared;

pub use activity::{ActivityStore, ACTIVITY_KEY};
pub use origin::{OriginStore, StorageSubscription, StoreHandle, WriterId, HOST_WRITER};
pub use position::{DropZone, Position, PositionStore, Viewport};
pub use shared::{SharedStore, StorageEvent, StoreError};
