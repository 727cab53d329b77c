//! View session - the single owner of topology view state
//!
//! Holds everything a topology view mutates: the current site, the device/link
//! set, the layout type, the coordinate store, the viewport transform, the
//! interaction controller, and the saved-view store. Hosts keep one session per
//! view and route every operation through it; nothing is global.
//!
//! # Flow
//! ```text
//! refresh / apply_topology ─► LayoutEngine ─► CoordinateStore (manual overrides re-applied)
//! handle_pointer ──────────► InteractionController ─► ViewportTransform / CoordinateStore
//! save_view / load_view ───► ViewPersistence ◄──────► CoordinateStore + layout type
//! ```
//!
//! # Usage
//! ```ignore
//! let mut session = ViewSession::new(MemoryViewStore::new());
//! session.set_site(Some("site-1".into()));
//! session.set_viewport_size(egui::vec2(1024.0, 768.0));
//! pollster::block_on(session.refresh(&source))?;
//!
//! match session.set_layout_type(LayoutType::Tree, false) {
//!     Err(SessionError::DestructiveLayoutChange { manual_count }) => { /* ask, then retry with true */ }
//!     other => other?,
//! }
//! session.save_view("Floor 2")?;
//! ```

use crate::config::TopologyConfig;
use crate::error::{PersistenceError, SessionError, SessionResult};
use crate::graph::coords::CoordinateStore;
use crate::graph::input::{
    DragState, InteractionContext, InteractionController, InteractionOutcome, PointerEvent,
};
use crate::graph::layout::{self, LayoutEngine, PositionMap};
use crate::graph::spatial::DeviceIndex;
use crate::graph::viewport::ViewportTransform;
use crate::persistence::{ViewPersistence, ViewStore};
use crate::source::TopologySource;
use egui::{Pos2, Vec2};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use topology_types::{Device, LayoutType, Link, NetworkTopology, SavedView};

/// Screen padding used by [`ViewSession::fit_to_content`]
const FIT_PADDING: f32 = 40.0;

/// Viewport size assumed until the host reports one
const DEFAULT_VIEWPORT: Vec2 = Vec2::new(800.0, 600.0);

pub struct ViewSession<S: ViewStore> {
    site_id: Option<String>,

    devices: Vec<Device>,
    links: Vec<Link>,
    device_ids: HashSet<String>,

    layout_type: LayoutType,
    engine: LayoutEngine,
    coords: CoordinateStore,
    viewport: ViewportTransform,
    viewport_size: Vec2,
    controller: InteractionController,
    persistence: ViewPersistence<S>,

    /// Hit-test index over present devices, rebuilt whenever positions change
    index: DeviceIndex,

    /// Changes since the last save/load
    unsaved: bool,

    /// Seeds the force-directed layout
    rng: StdRng,
}

impl<S: ViewStore> std::fmt::Debug for ViewSession<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewSession")
            .field("site_id", &self.site_id)
            .field("devices", &self.devices.len())
            .field("links", &self.links.len())
            .field("layout_type", &self.layout_type)
            .field("manual", &self.coords.manual_count())
            .field("unsaved", &self.unsaved)
            .finish_non_exhaustive()
    }
}

impl<S: ViewStore> ViewSession<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, TopologyConfig::default())
    }

    pub fn with_config(store: S, config: TopologyConfig) -> Self {
        Self {
            site_id: None,
            devices: Vec::new(),
            links: Vec::new(),
            device_ids: HashSet::new(),
            layout_type: LayoutType::default(),
            engine: LayoutEngine::new(config.layout),
            coords: CoordinateStore::new(),
            viewport: ViewportTransform::from_config(&config.interaction),
            viewport_size: DEFAULT_VIEWPORT,
            controller: InteractionController::new(config.interaction),
            persistence: ViewPersistence::new(store),
            index: DeviceIndex::default(),
            unsaved: false,
            rng: StdRng::from_entropy(),
        }
    }

    /// Builder: fix the force-directed seed (reproducible layouts)
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    // =========================================================================
    // SITE & DATA
    // =========================================================================

    /// Switch site. A different site starts from an empty view.
    pub fn set_site(&mut self, site_id: Option<String>) {
        if self.site_id == site_id {
            return;
        }
        tracing::info!(site_id = ?site_id, "site changed");
        self.site_id = site_id;
        self.devices.clear();
        self.links.clear();
        self.device_ids.clear();
        self.coords.clear();
        self.controller.cancel();
        self.controller.clear_selection();
        self.controller.set_hovered(None);
        self.rebuild_index();
        self.unsaved = false;
    }

    pub fn site_id(&self) -> Option<&str> {
        self.site_id.as_deref()
    }

    /// Record the drawing area size. Existing positions are kept; the next
    /// layout computation uses the new size.
    pub fn set_viewport_size(&mut self, size: Vec2) {
        if size.x > 0.0 && size.y > 0.0 {
            self.viewport_size = size;
        }
    }

    pub fn viewport_size(&self) -> Vec2 {
        self.viewport_size
    }

    /// Install a fresh device/link set.
    ///
    /// Recomputes with the current layout, re-applies manual overrides, and
    /// forgets positions, manual flags, selection and drags of devices that
    /// are gone.
    pub fn apply_topology(&mut self, topology: NetworkTopology) {
        let NetworkTopology { devices, links } = topology;
        self.device_ids = devices.iter().map(|d| d.id.clone()).collect();
        self.devices = devices;
        self.links = links;

        let present: HashSet<&str> = self.device_ids.iter().map(String::as_str).collect();
        self.coords.retain_devices(&present);
        self.controller.forget_missing(&self.device_ids);

        self.recompute();
        tracing::info!(
            site_id = ?self.site_id,
            devices = self.devices.len(),
            links = self.links.len(),
            manual = self.coords.manual_count(),
            "topology applied"
        );
    }

    /// Fetch the current site's topology and apply it.
    ///
    /// On failure the previous devices and positions stay as they were.
    pub async fn refresh(&mut self, source: &dyn TopologySource) -> SessionResult<()> {
        let site_id = self.site_id.clone().ok_or(SessionError::NoSiteSelected)?;
        match source.get_network_topology(&site_id).await {
            Ok(topology) => {
                self.apply_topology(topology);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(site_id = %site_id, error = %e, "topology refresh failed");
                Err(SessionError::DataUnavailable(format!("{:#}", e)))
            }
        }
    }

    // =========================================================================
    // LAYOUT
    // =========================================================================

    /// Switch layout algorithm.
    ///
    /// Manually placed devices are discarded by a switch, so while any exist
    /// the call must be confirmed; unconfirmed it returns
    /// [`SessionError::DestructiveLayoutChange`] and changes nothing.
    pub fn set_layout_type(&mut self, layout: LayoutType, confirmed: bool) -> SessionResult<()> {
        let manual_count = self.coords.manual_count();
        if manual_count > 0 && !confirmed {
            tracing::info!(
                from = self.layout_type.as_str(),
                to = layout.as_str(),
                manual_count,
                "layout change needs confirmation"
            );
            return Err(SessionError::DestructiveLayoutChange { manual_count });
        }

        self.layout_type = layout;
        self.coords.clear_manual();
        self.recompute();
        self.unsaved = true;
        Ok(())
    }

    /// Drop every manual placement and recompute the current layout
    pub fn reset_layout(&mut self) {
        if self.coords.manual_count() > 0 {
            self.unsaved = true;
        }
        self.coords.clear_manual();
        self.recompute();
    }

    /// Back to zoom 1, no pan
    pub fn reset_view(&mut self) {
        self.viewport.reset();
    }

    /// Pan/zoom so every device is visible
    pub fn fit_to_content(&mut self) {
        let Some(bounds) = self.coords.bounds() else {
            return;
        };
        let radius = self.controller.config.node_radius;
        self.viewport
            .fit_to_bounds(bounds.expand(radius), self.viewport_size, FIT_PADDING);
    }

    fn recompute(&mut self) {
        let computed = self.engine.compute_layout_with_rng(
            self.layout_type,
            &self.devices,
            &self.links,
            self.viewport_size,
            &mut self.rng,
        );
        self.coords.apply_layout(computed);
        self.rebuild_index();
    }

    // =========================================================================
    // INTERACTION
    // =========================================================================

    /// Feed a pointer event (screen space) through the interaction controller
    pub fn handle_pointer(&mut self, event: PointerEvent) -> InteractionOutcome {
        let mut ctx = InteractionContext {
            viewport: &mut self.viewport,
            store: &mut self.coords,
            devices: &self.device_ids,
        };
        let outcome = self.controller.handle(event, &mut ctx);
        if let InteractionOutcome::DeviceMoved(_) = &outcome {
            self.unsaved = true;
            self.rebuild_index();
        }
        outcome
    }

    /// Present device under a screen position
    pub fn device_at(&self, screen_pos: Pos2) -> Option<String> {
        let model = self.viewport.to_model_space(screen_pos);
        self.index.device_at(model).map(str::to_string)
    }

    /// Update hover from the pointer position (`None` when off-canvas)
    pub fn update_hover(&mut self, screen_pos: Option<Pos2>) {
        let hovered = screen_pos.and_then(|pos| self.device_at(pos));
        self.controller.set_hovered(hovered);
    }

    pub fn select_device(&mut self, device_id: &str) {
        if self.device_ids.contains(device_id) {
            self.controller.select(device_id);
        }
    }

    pub fn clear_selection(&mut self) {
        self.controller.clear_selection();
    }

    /// Present devices whose node intersects the visible area
    pub fn visible_devices(&self) -> HashSet<&str> {
        let visible = self.viewport.visible_bounds(self.viewport_size);
        self.index.in_rect(visible).into_iter().collect()
    }

    /// Only present devices are indexed; a loaded view may hold positions
    /// for devices that are not in the current topology
    fn rebuild_index(&mut self) {
        self.index = DeviceIndex::from_store(
            &self.coords,
            &self.device_ids,
            self.controller.config.node_radius,
        );
    }

    // =========================================================================
    // SAVED VIEWS
    // =========================================================================

    /// Save the current layout type, positions and manual set under `name`.
    ///
    /// An existing view with the same name is overwritten.
    pub fn save_view(&mut self, name: &str) -> SessionResult<()> {
        let view = SavedView {
            name: name.to_string(),
            positions: self.coords.snapshot_positions(),
            layout: self.layout_type,
            manually_positioned: self.coords.manual().iter().cloned().collect(),
        };
        self.persistence.save(self.site_id.as_deref(), &view)?;
        self.unsaved = false;
        Ok(())
    }

    pub fn list_views(&self) -> SessionResult<Vec<String>> {
        Ok(self.persistence.list(self.site_id.as_deref())?)
    }

    /// Replace layout type, positions and manual set with a saved view.
    ///
    /// Present devices the view does not know get positions from the view's
    /// layout type, unflagged.
    pub fn load_view(&mut self, name: &str) -> SessionResult<()> {
        let view = self.persistence.load(self.site_id.as_deref(), name)?;

        let positions: PositionMap = view
            .positions
            .iter()
            .map(|(id, pos)| (id.clone(), Pos2::new(pos.x, pos.y)))
            .collect();
        self.layout_type = view.layout;
        self.coords.replace(positions, view.manually_positioned);
        self.place_unpositioned();

        self.controller.cancel();
        self.rebuild_index();
        self.unsaved = false;
        tracing::info!(
            site_id = ?self.site_id,
            name,
            layout = view.layout.as_str(),
            "loaded saved view"
        );
        Ok(())
    }

    /// Delete a saved view. Unknown names fail before confirmation is asked for.
    pub fn delete_view(&mut self, name: &str, confirmed: bool) -> SessionResult<()> {
        let site_id = self.site_id.as_deref();
        if !self.persistence.exists(site_id, name)? {
            return Err(PersistenceError::SnapshotNotFound(name.to_string()).into());
        }
        if !confirmed {
            return Err(SessionError::ConfirmationRequired(name.to_string()));
        }
        self.persistence.delete(site_id, name)?;
        Ok(())
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved
    }

    fn place_unpositioned(&mut self) {
        let missing: Vec<&str> = self
            .devices
            .iter()
            .map(|d| d.id.as_str())
            .filter(|id| self.coords.get(id).is_none())
            .collect();
        if missing.is_empty() {
            return;
        }

        let computed = self.engine.compute_layout_with_rng(
            self.layout_type,
            &self.devices,
            &self.links,
            self.viewport_size,
            &mut self.rng,
        );
        for id in missing {
            if let Some(pos) = computed.get(id) {
                self.coords.set_one(id, *pos, false);
            }
        }
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    pub fn position(&self, device_id: &str) -> Option<Pos2> {
        self.coords.get(device_id)
    }

    pub fn positions(&self) -> &PositionMap {
        self.coords.positions()
    }

    pub fn coordinates(&self) -> &CoordinateStore {
        &self.coords
    }

    pub fn is_manual(&self, device_id: &str) -> bool {
        self.coords.is_manual(device_id)
    }

    pub fn manual_count(&self) -> usize {
        self.coords.manual_count()
    }

    pub fn layout_type(&self) -> LayoutType {
        self.layout_type
    }

    pub fn selected_device(&self) -> Option<&str> {
        self.controller.selected()
    }

    pub fn hovered_device(&self) -> Option<&str> {
        self.controller.hovered()
    }

    pub fn drag_state(&self) -> &DragState {
        self.controller.state()
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    pub fn viewport(&self) -> &ViewportTransform {
        &self.viewport
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn device(&self, device_id: &str) -> Option<&Device> {
        self.devices.iter().find(|d| d.id == device_id)
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Links whose endpoints both exist
    pub fn visible_links(&self) -> Vec<&Link> {
        layout::visible_links(&self.devices, &self.links)
    }

    pub fn persistence(&self) -> &ViewPersistence<S> {
        &self.persistence
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryViewStore;
    use egui::Rect;
    use pretty_assertions::assert_eq;
    use topology_types::DeviceType;

    fn topology() -> NetworkTopology {
        NetworkTopology::new(
            vec![
                Device::new("A", DeviceType::Switch),
                Device::new("B", DeviceType::Ap),
                Device::new("C", DeviceType::Ap),
                Device::new("D", DeviceType::Router),
            ],
            vec![
                Link::new("l1", "B", "A"),
                Link::new("l2", "C", "A"),
                Link::new("l3", "D", "A"),
            ],
        )
    }

    fn session() -> ViewSession<MemoryViewStore> {
        let mut session = ViewSession::new(MemoryViewStore::new()).with_seed(17);
        session.set_site(Some("site-1".into()));
        session.apply_topology(topology());
        session
    }

    /// Drag a device by a screen delta at the current viewport
    fn drag(session: &mut ViewSession<MemoryViewStore>, id: &str, delta: Vec2) {
        let start = session.viewport().to_screen_space(session.position(id).unwrap());
        session.handle_pointer(PointerEvent::Down {
            pos: start,
            target: Some(id.to_string()),
        });
        session.handle_pointer(PointerEvent::Move { pos: start + delta });
        session.handle_pointer(PointerEvent::Up { pos: start + delta });
    }

    #[test]
    fn test_apply_topology_positions_every_device() {
        let session = session();
        assert_eq!(session.positions().len(), 4);
        assert_eq!(session.layout_type(), LayoutType::Circle);
        assert!(!session.has_unsaved_changes());
        assert_eq!(session.visible_links().len(), 3);
    }

    #[test]
    fn test_drag_marks_manual_and_dirty() {
        let mut session = session();
        let before = session.position("B").unwrap();
        drag(&mut session, "B", Vec2::new(40.0, -10.0));

        let after = session.position("B").unwrap();
        assert!((after - (before + Vec2::new(40.0, -10.0))).length() < 0.001);
        assert!(session.is_manual("B"));
        assert!(session.has_unsaved_changes());
        assert!(session.drag_state().is_idle());
    }

    #[test]
    fn test_declined_layout_change_leaves_state() {
        let mut session = session();
        drag(&mut session, "B", Vec2::new(40.0, 0.0));
        drag(&mut session, "C", Vec2::new(0.0, 30.0));
        let positions = session.positions().clone();

        let err = session.set_layout_type(LayoutType::Grid, false).unwrap_err();
        assert_eq!(err, SessionError::DestructiveLayoutChange { manual_count: 2 });
        assert!(err.needs_confirmation());

        assert_eq!(session.layout_type(), LayoutType::Circle);
        assert_eq!(session.positions(), &positions);
        assert!(session.is_manual("B"));
        assert!(session.is_manual("C"));
    }

    #[test]
    fn test_confirmed_layout_change_clears_manual() {
        let mut session = session();
        drag(&mut session, "B", Vec2::new(40.0, 0.0));

        session.set_layout_type(LayoutType::Tree, true).unwrap();
        assert_eq!(session.layout_type(), LayoutType::Tree);
        assert_eq!(session.manual_count(), 0);
        assert_eq!(session.position("A"), Some(Pos2::new(400.0, 300.0)));
    }

    #[test]
    fn test_layout_change_without_manual_needs_no_confirmation() {
        let mut session = session();
        session.set_layout_type(LayoutType::Hierarchical, false).unwrap();
        assert_eq!(session.layout_type(), LayoutType::Hierarchical);
    }

    #[test]
    fn test_manual_survives_refresh_for_every_layout() {
        for layout in LayoutType::all() {
            let mut session = session();
            session.set_layout_type(*layout, true).unwrap();
            drag(&mut session, "C", Vec2::new(25.0, 35.0));
            let dragged = session.position("C").unwrap();

            session.apply_topology(topology());
            assert_eq!(session.position("C"), Some(dragged), "{:?}", layout);
            assert!(session.is_manual("C"));
        }
    }

    #[test]
    fn test_vanished_device_is_forgotten() {
        let mut session = session();
        drag(&mut session, "D", Vec2::new(10.0, 10.0));
        session.select_device("D");

        let mut shrunk = topology();
        shrunk.devices.retain(|d| d.id != "D");
        session.apply_topology(shrunk);

        assert!(session.position("D").is_none());
        assert!(!session.is_manual("D"));
        assert_eq!(session.selected_device(), None);
        // Link to D is still present but not visible
        assert_eq!(session.links().len(), 3);
        assert_eq!(session.visible_links().len(), 2);
    }

    #[test]
    fn test_save_load_round_trip() {
        let mut session = session();
        session.set_layout_type(LayoutType::Grid, false).unwrap();
        drag(&mut session, "A", Vec2::new(-30.0, 20.0));
        session.save_view("Floor 2").unwrap();
        assert!(!session.has_unsaved_changes());

        let saved_positions = session.positions().clone();
        let saved_manual = session.coordinates().manual().clone();

        session.set_layout_type(LayoutType::Circle, true).unwrap();
        drag(&mut session, "B", Vec2::new(5.0, 5.0));

        session.load_view("Floor 2").unwrap();
        assert_eq!(session.layout_type(), LayoutType::Grid);
        assert_eq!(session.positions(), &saved_positions);
        assert_eq!(session.coordinates().manual(), &saved_manual);
        assert!(!session.has_unsaved_changes());
    }

    #[test]
    fn test_loaded_positions_of_absent_devices_are_not_hit() {
        let mut session = session();
        let mut with_extra = topology();
        with_extra.devices.push(Device::new("gone", DeviceType::Ap));
        session.apply_topology(with_extra);
        // Park it in an empty corner, away from the ring
        let start = session.viewport().to_screen_space(session.position("gone").unwrap());
        drag(&mut session, "gone", Pos2::new(40.0, 40.0) - start);
        let ghost = session.position("gone").unwrap();
        session.save_view("old").unwrap();

        session.apply_topology(topology());
        session.load_view("old").unwrap();
        // The view still carries the stale position
        assert_eq!(session.position("gone"), Some(ghost));

        let screen = session.viewport().to_screen_space(ghost);
        assert_eq!(session.device_at(screen), None);
        assert!(!session.visible_devices().contains("gone"));

        // Pressing there pans the canvas
        let target = session.device_at(screen);
        session.handle_pointer(PointerEvent::Down { pos: screen, target });
        session.handle_pointer(PointerEvent::Move {
            pos: screen + Vec2::new(50.0, 0.0),
        });
        assert!(matches!(session.drag_state(), DragState::PanningCanvas { .. }));
        assert_eq!(session.viewport().pan_offset(), Vec2::new(50.0, 0.0));
        assert_eq!(session.position("gone"), Some(ghost));
    }

    #[test]
    fn test_load_unknown_view() {
        let mut session = session();
        let positions = session.positions().clone();
        assert_eq!(
            session.load_view("nope"),
            Err(SessionError::Persistence(PersistenceError::SnapshotNotFound("nope".into())))
        );
        assert_eq!(session.positions(), &positions);
    }

    #[test]
    fn test_save_without_site() {
        let mut session = ViewSession::new(MemoryViewStore::new());
        session.apply_topology(topology());
        assert_eq!(
            session.save_view("v"),
            Err(SessionError::Persistence(PersistenceError::NoSiteSelected))
        );
    }

    #[test]
    fn test_delete_view_confirmation() {
        let mut session = session();
        session.save_view("a").unwrap();

        assert_eq!(
            session.delete_view("missing", false),
            Err(SessionError::Persistence(PersistenceError::SnapshotNotFound("missing".into())))
        );
        assert_eq!(
            session.delete_view("a", false),
            Err(SessionError::ConfirmationRequired("a".into()))
        );
        assert_eq!(session.list_views().unwrap(), vec!["a"]);

        session.delete_view("a", true).unwrap();
        assert!(session.list_views().unwrap().is_empty());
    }

    #[test]
    fn test_reset_layout() {
        let mut session = session();
        let original = session.position("B").unwrap();
        drag(&mut session, "B", Vec2::new(50.0, 50.0));

        session.reset_layout();
        assert_eq!(session.manual_count(), 0);
        assert_eq!(session.position("B"), Some(original));
    }

    #[test]
    fn test_device_at_follows_viewport() {
        let mut session = session();
        let b = session.position("B").unwrap();
        assert_eq!(session.device_at(b).as_deref(), Some("B"));

        session.handle_pointer(PointerEvent::Wheel {
            pos: Some(Pos2::ZERO),
            notches: 3.0,
        });
        let screen = session.viewport().to_screen_space(b);
        assert_eq!(session.device_at(screen).as_deref(), Some("B"));

        session.reset_view();
        assert!(session.viewport().is_identity());
    }

    #[test]
    fn test_inverted_zoom_limits_do_not_panic() {
        let config = TopologyConfig {
            interaction: crate::config::InteractionConfig {
                min_zoom: 6.0,
                max_zoom: 5.0,
                ..Default::default()
            },
            ..Default::default()
        };
        let mut session = ViewSession::with_config(MemoryViewStore::new(), config);
        session.apply_topology(topology());

        session.handle_pointer(PointerEvent::Wheel {
            pos: Some(Pos2::new(400.0, 300.0)),
            notches: 1.0,
        });
        let zoom = session.viewport().zoom();
        assert!(zoom.is_finite());
        assert!((0.1..=5.0).contains(&zoom));
    }

    #[test]
    fn test_fit_to_content_shows_every_device() {
        let mut session = session();
        session.handle_pointer(PointerEvent::Down { pos: Pos2::ZERO, target: None });
        session.handle_pointer(PointerEvent::Move { pos: Pos2::new(900.0, 900.0) });
        session.handle_pointer(PointerEvent::Up { pos: Pos2::new(900.0, 900.0) });

        session.fit_to_content();
        let screen = Rect::from_min_size(Pos2::ZERO, session.viewport_size());
        for pos in session.positions().values() {
            assert!(screen.contains(session.viewport().to_screen_space(*pos)));
        }
    }

    #[test]
    fn test_site_change_clears_view() {
        let mut session = session();
        drag(&mut session, "A", Vec2::new(10.0, 0.0));
        session.set_site(Some("site-2".into()));

        assert!(session.devices().is_empty());
        assert!(session.positions().is_empty());
        assert!(!session.has_unsaved_changes());
    }
}
