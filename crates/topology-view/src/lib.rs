//! Site Topology View
//!
//! Layout and interaction engine for network site topologies: turns a set of
//! devices and neighbor links into an editable, persistable 2D graph.
//!
//! - [`graph`] - layout algorithms, coordinate store, viewport, pointer state
//!   machine, hit testing and the egui widget
//! - [`persistence`] - named saved views per site
//! - [`session`] - [`ViewSession`], the single owner of view state
//! - [`source`] - the device/link data source seam
//!
//! No API client and no app shell live here; hosts supply a
//! [`TopologySource`] and a [`ViewStore`].

pub mod config;
pub mod error;
pub mod graph;
pub mod persistence;
pub mod session;
pub mod source;

pub use config::{InteractionConfig, LayoutConfig, TopologyConfig};
pub use error::{PersistenceError, PersistenceResult, SessionError, SessionResult};
pub use graph::{
    DragState, GraphRenderer, InteractionOutcome, LayoutEngine, PointerEvent, TopologyWidget,
    ViewportTransform,
};
#[cfg(target_arch = "wasm32")]
pub use persistence::LocalStorageViewStore;
pub use persistence::{MemoryViewStore, ViewPersistence, ViewStore};
pub use session::ViewSession;
pub use source::{StaticTopologySource, TopologySource};

pub use topology_types::{
    Device, DeviceStatus, DeviceType, LayoutType, Link, NetworkTopology, Position, SavedView,
};

/// Route `tracing` output to the browser console and panics to `console.error`
#[cfg(target_arch = "wasm32")]
pub fn init_wasm_logging() {
    console_error_panic_hook::set_once();
    // Already installed by the host is fine
    let _ = tracing_wasm::try_set_as_global_default();
}
