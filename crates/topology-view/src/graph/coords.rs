//! Coordinate store - the "true" model-space position of every device
//!
//! Distinguishes algorithmically placed devices from manually placed ones.
//! Manual placement always wins: [`CoordinateStore::apply_layout`] re-applies
//! manual positions on top of freshly computed ones. Only
//! [`CoordinateStore::clear_manual`] (explicit layout change or reset) and a
//! full [`CoordinateStore::replace`] (loading a saved view) drop manual flags.

use egui::{Pos2, Rect};
use std::collections::{BTreeSet, HashSet};
use topology_types::Position;

use super::layout::PositionMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoordinateStore {
    positions: PositionMap,
    manual: BTreeSet<String>,
}

impl CoordinateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, device_id: &str) -> Option<Pos2> {
        self.positions.get(device_id).copied()
    }

    /// Replace every position; manual flags are left as they are
    pub fn set_all(&mut self, positions: PositionMap) {
        self.positions = positions;
    }

    /// Set one device's position, optionally flagging it as manually placed
    pub fn set_one(&mut self, device_id: &str, pos: Pos2, mark_manual: bool) {
        self.positions.insert(device_id.to_string(), pos);
        if mark_manual {
            self.manual.insert(device_id.to_string());
        }
    }

    pub fn clear_manual(&mut self) {
        self.manual.clear();
    }

    /// Ids of manually placed devices (sorted)
    pub fn manual(&self) -> &BTreeSet<String> {
        &self.manual
    }

    pub fn is_manual(&self, device_id: &str) -> bool {
        self.manual.contains(device_id)
    }

    pub fn manual_count(&self) -> usize {
        self.manual.len()
    }

    /// Install freshly computed positions, then re-apply manual overrides
    pub fn apply_layout(&mut self, computed: PositionMap) {
        let overrides: Vec<(String, Pos2)> = self
            .manual
            .iter()
            .filter_map(|id| self.positions.get(id).map(|pos| (id.clone(), *pos)))
            .collect();

        self.positions = computed;
        for (id, pos) in overrides {
            self.positions.insert(id, pos);
        }
    }

    /// Drop positions and manual flags of devices no longer present
    pub fn retain_devices(&mut self, present: &HashSet<&str>) {
        self.positions.retain(|id, _| present.contains(id.as_str()));
        self.manual.retain(|id| present.contains(id.as_str()));
    }

    /// Full state replacement (loading a saved view) - not a merge
    pub fn replace(&mut self, positions: PositionMap, manual: impl IntoIterator<Item = String>) {
        self.positions = positions;
        self.manual = manual.into_iter().collect();
    }

    pub fn positions(&self) -> &PositionMap {
        &self.positions
    }

    /// Positions as ordered pairs sorted by device id (storage form)
    pub fn snapshot_positions(&self) -> Vec<(String, Position)> {
        let mut pairs: Vec<(String, Position)> = self
            .positions
            .iter()
            .map(|(id, pos)| (id.clone(), Position::new(pos.x, pos.y)))
            .collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        pairs
    }

    /// Bounding box of every stored position, or `None` when empty
    pub fn bounds(&self) -> Option<Rect> {
        let mut iter = self.positions.values();
        let first = *iter.next()?;
        let mut rect = Rect::from_min_max(first, first);
        for pos in iter {
            rect.extend_with(*pos);
        }
        Some(rect)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn clear(&mut self) {
        self.positions.clear();
        self.manual.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn computed(entries: &[(&str, f32, f32)]) -> PositionMap {
        entries
            .iter()
            .map(|(id, x, y)| (id.to_string(), Pos2::new(*x, *y)))
            .collect()
    }

    #[test]
    fn test_manual_survives_recompute() {
        let mut store = CoordinateStore::new();
        store.apply_layout(computed(&[("a", 0.0, 0.0), ("b", 10.0, 10.0)]));
        store.set_one("b", Pos2::new(99.0, 42.0), true);

        store.apply_layout(computed(&[("a", 5.0, 5.0), ("b", 20.0, 20.0)]));

        assert_eq!(store.get("a"), Some(Pos2::new(5.0, 5.0)));
        assert_eq!(store.get("b"), Some(Pos2::new(99.0, 42.0)));
        assert!(store.is_manual("b"));
        assert!(!store.is_manual("a"));
    }

    #[test]
    fn test_unmarked_set_one_is_overwritten() {
        let mut store = CoordinateStore::new();
        store.set_one("a", Pos2::new(1.0, 1.0), false);
        store.apply_layout(computed(&[("a", 2.0, 2.0)]));
        assert_eq!(store.get("a"), Some(Pos2::new(2.0, 2.0)));
    }

    #[test]
    fn test_clear_manual_lets_layout_win() {
        let mut store = CoordinateStore::new();
        store.set_one("a", Pos2::new(1.0, 1.0), true);
        store.clear_manual();
        store.apply_layout(computed(&[("a", 2.0, 2.0)]));
        assert_eq!(store.get("a"), Some(Pos2::new(2.0, 2.0)));
        assert_eq!(store.manual_count(), 0);
    }

    #[test]
    fn test_retain_drops_vanished_devices() {
        let mut store = CoordinateStore::new();
        store.set_one("a", Pos2::new(1.0, 1.0), true);
        store.set_one("b", Pos2::new(2.0, 2.0), true);

        let present: HashSet<&str> = ["a"].into_iter().collect();
        store.retain_devices(&present);

        assert_eq!(store.len(), 1);
        assert!(store.get("b").is_none());
        assert!(!store.is_manual("b"));
    }

    #[test]
    fn test_replace_is_not_a_merge() {
        let mut store = CoordinateStore::new();
        store.set_one("old", Pos2::new(1.0, 1.0), true);
        store.replace(computed(&[("new", 3.0, 4.0)]), vec!["new".to_string()]);

        assert!(store.get("old").is_none());
        assert_eq!(store.manual().iter().collect::<Vec<_>>(), vec!["new"]);
    }

    #[test]
    fn test_snapshot_sorted_and_bounds() {
        let mut store = CoordinateStore::new();
        store.set_all(computed(&[("c", 10.0, 50.0), ("a", -5.0, 0.0), ("b", 3.0, 7.0)]));

        let ids: Vec<String> = store.snapshot_positions().into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);

        let bounds = store.bounds().unwrap();
        assert_eq!(bounds.min, Pos2::new(-5.0, 0.0));
        assert_eq!(bounds.max, Pos2::new(10.0, 50.0));
        assert!(CoordinateStore::new().bounds().is_none());
    }
}
