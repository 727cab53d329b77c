//! Shared types for site topology views
//!
//! DATA CONTRACTS only - no layout behaviour, no egui. The view crate owns all
//! state and algorithms; this crate is what crosses the boundary to the data
//! source and to storage.
//!
//! ## Design Principles
//!
//! 1. **String IDs** - device and link ids are opaque strings, stable across reloads
//! 2. **(f32, f32) for transport** - the view crate works in `egui::Pos2`, storage uses [`Position`]
//! 3. **Derive-heavy** - Serialize, Deserialize, Clone, Debug for all types

pub mod device;
pub mod view;

pub use device::{Device, DeviceStatus, DeviceType, Link, NetworkTopology};
pub use view::{LayoutType, ParseLayoutTypeError, Position, SavedView};
