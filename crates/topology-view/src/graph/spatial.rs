//! Device hit testing via an R-tree
//!
//! Built from the coordinate store in model space, restricted to devices in
//! the current topology. Pan and zoom never invalidate it; only position
//! changes do. Queries take model-space points (convert with
//! [`ViewportTransform::to_model_space`](super::viewport::ViewportTransform::to_model_space)).

use super::coords::CoordinateStore;
use egui::{Pos2, Rect};
use rstar::{PointDistance, RTree, RTreeObject, AABB};
use std::collections::HashSet;

/// One device disc in the index
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceHit {
    pub device_id: String,
    pub center: [f32; 2],
    pub radius: f32,
}

impl DeviceHit {
    pub fn new(device_id: impl Into<String>, center: Pos2, radius: f32) -> Self {
        Self {
            device_id: device_id.into(),
            center: [center.x, center.y],
            radius,
        }
    }
}

impl RTreeObject for DeviceHit {
    type Envelope = AABB<[f32; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.center[0] - self.radius, self.center[1] - self.radius],
            [self.center[0] + self.radius, self.center[1] + self.radius],
        )
    }
}

impl PointDistance for DeviceHit {
    /// Squared distance from the point to the disc edge (zero inside)
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let dx = point[0] - self.center[0];
        let dy = point[1] - self.center[1];
        let to_edge = ((dx * dx + dy * dy).sqrt() - self.radius).max(0.0);
        to_edge * to_edge
    }

    fn contains_point(&self, point: &[f32; 2]) -> bool {
        let dx = point[0] - self.center[0];
        let dy = point[1] - self.center[1];
        dx * dx + dy * dy <= self.radius * self.radius
    }
}

/// R-tree over device discs
#[derive(Clone, Default)]
pub struct DeviceIndex {
    tree: RTree<DeviceHit>,
    radius: f32,
}

impl std::fmt::Debug for DeviceIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceIndex")
            .field("len", &self.tree.size())
            .field("radius", &self.radius)
            .finish_non_exhaustive()
    }
}

impl DeviceIndex {
    /// Index the stored positions of `present` devices as discs of `radius`
    pub fn from_store(store: &CoordinateStore, present: &HashSet<String>, radius: f32) -> Self {
        let hits: Vec<DeviceHit> = store
            .positions()
            .iter()
            .filter(|(id, _)| present.contains(id.as_str()))
            .map(|(id, pos)| DeviceHit::new(id.clone(), *pos, radius))
            .collect();
        Self {
            tree: RTree::bulk_load(hits),
            radius,
        }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Device under a model-space point.
    ///
    /// Overlapping discs resolve to the one whose centre is closest; ties go to
    /// the smaller id so the answer never depends on tree order.
    pub fn device_at(&self, point: Pos2) -> Option<&str> {
        let p = [point.x, point.y];
        self.tree
            .locate_all_at_point(&p)
            .min_by(|a, b| {
                center_distance_2(a, &p)
                    .total_cmp(&center_distance_2(b, &p))
                    .then_with(|| a.device_id.cmp(&b.device_id))
            })
            .map(|hit| hit.device_id.as_str())
    }

    /// Devices whose discs intersect a model-space rect (visibility culling)
    pub fn in_rect(&self, rect: Rect) -> Vec<&str> {
        let envelope = AABB::from_corners([rect.min.x, rect.min.y], [rect.max.x, rect.max.y]);
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|hit| hit.device_id.as_str())
            .collect()
    }
}

fn center_distance_2(hit: &DeviceHit, p: &[f32; 2]) -> f32 {
    let dx = p[0] - hit.center[0];
    let dy = p[1] - hit.center[1];
    dx * dx + dy * dy
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(entries: &[(&str, f32, f32)], radius: f32) -> DeviceIndex {
        let mut store = CoordinateStore::new();
        for (id, x, y) in entries {
            store.set_one(id, Pos2::new(*x, *y), false);
        }
        let present: HashSet<String> = entries.iter().map(|(id, _, _)| id.to_string()).collect();
        DeviceIndex::from_store(&store, &present, radius)
    }

    #[test]
    fn test_device_at() {
        let index = index(&[("a", 100.0, 100.0), ("b", 300.0, 100.0)], 20.0);
        assert_eq!(index.len(), 2);
        assert_eq!(index.device_at(Pos2::new(110.0, 105.0)), Some("a"));
        assert_eq!(index.device_at(Pos2::new(300.0, 119.0)), Some("b"));
        assert_eq!(index.device_at(Pos2::new(200.0, 100.0)), None);
        // Inside the envelope corner but outside the disc
        assert_eq!(index.device_at(Pos2::new(118.0, 118.0)), None);
    }

    #[test]
    fn test_overlap_picks_closest_center() {
        let index = index(&[("a", 100.0, 100.0), ("b", 120.0, 100.0)], 20.0);
        assert_eq!(index.device_at(Pos2::new(105.0, 100.0)), Some("a"));
        assert_eq!(index.device_at(Pos2::new(116.0, 100.0)), Some("b"));
        assert_eq!(index.device_at(Pos2::new(110.0, 100.0)), Some("a"));
    }

    #[test]
    fn test_absent_devices_not_indexed() {
        let mut store = CoordinateStore::new();
        store.set_one("a", Pos2::new(0.0, 0.0), false);
        store.set_one("gone", Pos2::new(100.0, 0.0), true);
        let present: HashSet<String> = ["a".to_string()].into_iter().collect();

        let index = DeviceIndex::from_store(&store, &present, 10.0);
        assert_eq!(index.len(), 1);
        assert_eq!(index.device_at(Pos2::new(100.0, 0.0)), None);
        assert_eq!(index.device_at(Pos2::new(2.0, 0.0)), Some("a"));
    }

    #[test]
    fn test_in_rect() {
        let index = index(&[("a", 0.0, 0.0), ("b", 50.0, 50.0), ("c", 500.0, 500.0)], 5.0);
        let rect = Rect::from_min_max(Pos2::new(-10.0, -10.0), Pos2::new(100.0, 100.0));
        let mut visible = index.in_rect(rect);
        visible.sort();
        assert_eq!(visible, vec!["a", "b"]);
    }
}
