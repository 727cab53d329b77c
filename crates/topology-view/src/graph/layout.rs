//! Layout algorithms - one pure function per layout type
//!
//! Every algorithm returns exactly one position per input device, keyed by
//! device id, in model space. Placement order follows the device slice order,
//! so angular and row placement is stable across calls. Device ids must be
//! unique; duplicates collapse to a single entry.
//!
//! Manual overrides are NOT applied here - see
//! [`CoordinateStore::apply_layout`](super::coords::CoordinateStore::apply_layout).

use super::force_sim::ForceLayout;
use crate::config::LayoutConfig;
use egui::{Pos2, Rect, Vec2};
use rand::Rng;
use std::collections::{HashMap, HashSet};
use std::f32::consts::TAU;
use topology_types::{Device, LayoutType, Link};

/// Computed positions keyed by device id
pub type PositionMap = HashMap<String, Pos2>;

// =============================================================================
// HELPERS
// =============================================================================

/// Viewport shrunk by `margin` on every side.
///
/// Collapses towards the centre when the viewport is smaller than twice the
/// margin, so the rect is never negative.
pub fn inset_bounds(viewport: Vec2, margin: f32) -> Rect {
    let width = viewport.x.max(0.0);
    let height = viewport.y.max(0.0);
    let margin_x = margin.max(0.0).min(width / 2.0);
    let margin_y = margin.max(0.0).min(height / 2.0);
    Rect::from_min_max(
        Pos2::new(margin_x, margin_y),
        Pos2::new(width - margin_x, height - margin_y),
    )
}

/// Centre of the viewport in model space
pub fn viewport_center(viewport: Vec2) -> Pos2 {
    Pos2::new(viewport.x / 2.0, viewport.y / 2.0)
}

/// Links whose endpoints both exist in `devices`.
///
/// A link referencing a missing device is an expected transient condition
/// during refresh; it is skipped, never reported.
pub fn visible_links<'a>(devices: &[Device], links: &'a [Link]) -> Vec<&'a Link> {
    let ids: HashSet<&str> = devices.iter().map(|d| d.id.as_str()).collect();
    links
        .iter()
        .filter(|l| {
            ids.contains(l.local_device_id.as_str()) && ids.contains(l.remote_device_id.as_str())
        })
        .collect()
}

/// Smallest column count whose square covers `n`
fn grid_columns(n: usize) -> usize {
    let mut cols = (n as f64).sqrt() as usize;
    while cols * cols < n {
        cols += 1;
    }
    cols.max(1)
}

/// Place devices evenly on a ring, angle `2π·i/n` starting at +x
fn place_on_ring(out: &mut PositionMap, devices: &[&Device], center: Pos2, radius: f32) {
    let n = devices.len();
    for (i, device) in devices.iter().enumerate() {
        let angle = TAU * i as f32 / n as f32;
        out.insert(device.id.clone(), center + Vec2::angled(angle) * radius);
    }
}

/// Spread devices along one horizontal row; a single device is centred
fn place_on_row(out: &mut PositionMap, devices: &[&Device], y: f32, span: Rect) {
    match devices.len() {
        0 => {}
        1 => {
            out.insert(devices[0].id.clone(), Pos2::new(span.center().x, y));
        }
        n => {
            let step = span.width() / (n - 1) as f32;
            for (i, device) in devices.iter().enumerate() {
                out.insert(
                    device.id.clone(),
                    Pos2::new(span.min.x + step * i as f32, y),
                );
            }
        }
    }
}

// =============================================================================
// ALGORITHMS
// =============================================================================

/// Evenly around a circle of radius `0.3·min(w,h)` centred on the viewport
pub fn circle_layout(devices: &[Device], viewport: Vec2, config: &LayoutConfig) -> PositionMap {
    let mut out = PositionMap::with_capacity(devices.len());
    let radius = config.circle_radius_factor * viewport.x.min(viewport.y);
    let ordered: Vec<&Device> = devices.iter().collect();
    place_on_ring(&mut out, &ordered, viewport_center(viewport), radius);
    out
}

/// Row-major grid with `ceil(sqrt(n))` columns, one device per cell centre
pub fn grid_layout(devices: &[Device], viewport: Vec2, config: &LayoutConfig) -> PositionMap {
    let n = devices.len();
    let mut out = PositionMap::with_capacity(n);
    if n == 0 {
        return out;
    }

    let cols = grid_columns(n);
    let rows = n.div_ceil(cols);
    let bounds = inset_bounds(viewport, config.margin);
    let cell = Vec2::new(bounds.width() / cols as f32, bounds.height() / rows as f32);

    for (i, device) in devices.iter().enumerate() {
        let col = (i % cols) as f32;
        let row = (i / cols) as f32;
        let pos = bounds.min + Vec2::new((col + 0.5) * cell.x, (row + 0.5) * cell.y);
        out.insert(device.id.clone(), pos);
    }
    out
}

/// Three tiers by device type: switches, access points, everything else
pub fn hierarchical_layout(
    devices: &[Device],
    viewport: Vec2,
    config: &LayoutConfig,
) -> PositionMap {
    let mut out = PositionMap::with_capacity(devices.len());
    let span = inset_bounds(viewport, config.margin);

    let switches: Vec<&Device> = devices.iter().filter(|d| d.is_switch()).collect();
    let aps: Vec<&Device> = devices.iter().filter(|d| d.is_ap()).collect();
    let others: Vec<&Device> = devices
        .iter()
        .filter(|d| !d.is_switch() && !d.is_ap())
        .collect();

    for (tier, members) in [switches, aps, others].iter().enumerate() {
        let y = viewport.y * config.tier_fractions[tier];
        place_on_row(&mut out, members, y, span);
    }
    out
}

/// First switch at the centre, APs on an inner ring, the rest on an outer ring.
///
/// Falls back to [`circle_layout`] when there is no switch.
pub fn tree_layout(devices: &[Device], viewport: Vec2, config: &LayoutConfig) -> PositionMap {
    let Some(root_idx) = devices.iter().position(|d| d.is_switch()) else {
        return circle_layout(devices, viewport, config);
    };

    let mut out = PositionMap::with_capacity(devices.len());
    let center = viewport_center(viewport);
    let min_dim = viewport.x.min(viewport.y);

    let aps: Vec<&Device> = devices.iter().filter(|d| d.is_ap()).collect();
    // Further switches have no tier of their own - they join the outer ring
    let others: Vec<&Device> = devices
        .iter()
        .enumerate()
        .filter(|(i, d)| *i != root_idx && !d.is_ap())
        .map(|(_, d)| d)
        .collect();

    place_on_ring(
        &mut out,
        &aps,
        center,
        config.tree_inner_radius_factor * min_dim,
    );
    place_on_ring(
        &mut out,
        &others,
        center,
        config.tree_outer_radius_factor * min_dim,
    );
    out.insert(devices[root_idx].id.clone(), center);
    out
}

/// Fruchterman-Reingold spring simulation seeded from `rng`
pub fn force_directed_layout<R: Rng + ?Sized>(
    devices: &[Device],
    links: &[Link],
    viewport: Vec2,
    config: &LayoutConfig,
    rng: &mut R,
) -> PositionMap {
    let mut sim = ForceLayout::new(devices, links, viewport, config, rng);
    sim.run_to_completion();
    sim.positions()
}

/// Compute a full position assignment for `layout`.
///
/// Deterministic for every layout except [`LayoutType::ForceDirected`], which
/// draws its initial placement from `rng`.
pub fn compute_layout<R: Rng + ?Sized>(
    layout: LayoutType,
    devices: &[Device],
    links: &[Link],
    viewport: Vec2,
    config: &LayoutConfig,
    rng: &mut R,
) -> PositionMap {
    match layout {
        LayoutType::Circle => circle_layout(devices, viewport, config),
        LayoutType::Grid => grid_layout(devices, viewport, config),
        LayoutType::Hierarchical => hierarchical_layout(devices, viewport, config),
        LayoutType::Tree => tree_layout(devices, viewport, config),
        LayoutType::ForceDirected => {
            force_directed_layout(devices, links, viewport, config, rng)
        }
    }
}

// =============================================================================
// LAYOUT ENGINE
// =============================================================================

/// Layout engine bound to one configuration
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    pub config: LayoutConfig,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    /// Compute positions, seeding the force layout from the thread RNG
    pub fn compute_layout(
        &self,
        layout: LayoutType,
        devices: &[Device],
        links: &[Link],
        viewport: Vec2,
    ) -> PositionMap {
        let mut rng = rand::thread_rng();
        self.compute_layout_with_rng(layout, devices, links, viewport, &mut rng)
    }

    /// Compute positions with an injected RNG (deterministic force layout)
    pub fn compute_layout_with_rng<R: Rng + ?Sized>(
        &self,
        layout: LayoutType,
        devices: &[Device],
        links: &[Link],
        viewport: Vec2,
        rng: &mut R,
    ) -> PositionMap {
        let positions = compute_layout(layout, devices, links, viewport, &self.config, rng);
        tracing::debug!(
            layout = layout.as_str(),
            devices = devices.len(),
            links = links.len(),
            width = viewport.x,
            height = viewport.y,
            "layout computed"
        );
        positions
    }
}

// =============================================================================
// TESTS
// =============================================================================
