//! Force-directed layout (Fruchterman-Reingold)
//!
//! Runs a fixed number of iterations rather than until stable, so the cost is
//! predictable: O(iterations · (n² + links)). Designed for a few hundred
//! devices; 200 devices × 100 iterations is ~2M pair evaluations.
//!
//! Each iteration:
//! - Repulsion `k²/d` between every unordered pair
//! - Attraction `d²/k` along every link with both endpoints present
//! - Displacement = net force × damping, clamped to the margin-inset viewport
//!
//! `k = sqrt(width·height / n)` is the ideal edge length.
//!
//! # Usage
//! ```ignore
//! let mut sim = ForceLayout::new(&devices, &links, viewport, &config, &mut rng);
//!
//! // All at once:
//! sim.run_to_completion();
//!
//! // Or chunked across frames:
//! while !sim.is_finished() {
//!     sim.tick(10);
//! }
//! let positions = sim.positions();
//! ```

use super::layout::{inset_bounds, PositionMap};
use crate::config::LayoutConfig;
use egui::{Pos2, Rect, Vec2};
use rand::Rng;
use std::collections::HashMap;
use topology_types::{Device, Link};

/// Golden angle, used to spread coincident nodes deterministically
const GOLDEN_ANGLE: f32 = 2.399_963;

// =============================================================================
// FORCE NODE
// =============================================================================

/// A device in the simulation
#[derive(Debug, Clone)]
pub struct ForceNode {
    pub id: String,
    pub position: Pos2,
}

// =============================================================================
// FORCE LAYOUT
// =============================================================================

/// Fixed-iteration spring simulation over one device/link set
#[derive(Debug, Clone)]
pub struct ForceLayout {
    nodes: Vec<ForceNode>,

    /// Link endpoints as node indices (self-links and dangling links removed)
    edges: Vec<(usize, usize)>,

    /// Margin-inset viewport; positions never leave it
    bounds: Rect,

    /// Ideal edge length
    k: f32,

    damping: f32,
    min_distance: f32,

    iterations_done: usize,
    iterations_total: usize,
}

impl ForceLayout {
    /// Seed every device at a uniform-random position inside the margin-inset viewport
    pub fn new<R: Rng + ?Sized>(
        devices: &[Device],
        links: &[Link],
        viewport: Vec2,
        config: &LayoutConfig,
        rng: &mut R,
    ) -> Self {
        let bounds = inset_bounds(viewport, config.margin);

        let mut nodes: Vec<ForceNode> = Vec::with_capacity(devices.len());
        let mut index: HashMap<&str, usize> = HashMap::with_capacity(devices.len());
        for device in devices {
            let position = Pos2::new(
                sample(rng, bounds.min.x, bounds.max.x),
                sample(rng, bounds.min.y, bounds.max.y),
            );
            // Duplicate ids collapse onto one node
            if let Some(&idx) = index.get(device.id.as_str()) {
                nodes[idx].position = position;
                continue;
            }
            index.insert(device.id.as_str(), nodes.len());
            nodes.push(ForceNode {
                id: device.id.clone(),
                position,
            });
        }

        let edges = links
            .iter()
            .filter_map(|link| {
                let a = *index.get(link.local_device_id.as_str())?;
                let b = *index.get(link.remote_device_id.as_str())?;
                (a != b).then_some((a, b))
            })
            .collect();

        let n = nodes.len().max(1) as f32;
        let area = (viewport.x * viewport.y).max(1.0);

        Self {
            nodes,
            edges,
            bounds,
            k: (area / n).sqrt(),
            damping: config.force_damping,
            min_distance: config.force_min_distance.max(f32::EPSILON),
            iterations_done: 0,
            iterations_total: config.force_iterations,
        }
    }

    /// Run `iterations` steps, stopping at the configured total
    pub fn tick(&mut self, iterations: usize) {
        let remaining = self.iterations_total - self.iterations_done;
        for _ in 0..iterations.min(remaining) {
            self.step();
            self.iterations_done += 1;
        }
    }

    /// Run all remaining iterations synchronously
    pub fn run_to_completion(&mut self) {
        self.tick(self.iterations_total);
    }

    pub fn is_finished(&self) -> bool {
        self.iterations_done >= self.iterations_total
    }

    pub fn iterations_done(&self) -> usize {
        self.iterations_done
    }

    /// Ideal edge length for this device count and viewport
    pub fn ideal_length(&self) -> f32 {
        self.k
    }

    pub fn nodes(&self) -> &[ForceNode] {
        &self.nodes
    }

    /// Current positions keyed by device id
    pub fn positions(&self) -> PositionMap {
        self.nodes
            .iter()
            .map(|n| (n.id.clone(), n.position))
            .collect()
    }

    /// One simulation step
    fn step(&mut self) {
        let n = self.nodes.len();
        if n == 0 {
            return;
        }

        let mut displacement = vec![Vec2::ZERO; n];
        let k_sq = self.k * self.k;

        // Repulsion between all pairs
        for i in 0..n {
            for j in (i + 1)..n {
                let (dir, dist) = self.separation(i, j);
                let force = dir * (k_sq / dist);
                displacement[i] += force;
                displacement[j] -= force;
            }
        }

        // Attraction along links
        for &(a, b) in &self.edges {
            let delta = self.nodes[a].position - self.nodes[b].position;
            let dist = delta.length();
            if dist < self.min_distance {
                continue;
            }
            let force = (delta / dist) * (dist * dist / self.k);
            displacement[a] -= force;
            displacement[b] += force;
        }

        for (node, disp) in self.nodes.iter_mut().zip(displacement) {
            let moved = node.position + disp * self.damping;
            node.position = clamp_to(moved, self.bounds);
        }
    }

    /// Unit direction from j to i and the (floored) distance between them
    fn separation(&self, i: usize, j: usize) -> (Vec2, f32) {
        let delta = self.nodes[i].position - self.nodes[j].position;
        let dist = delta.length();
        if dist < self.min_distance || !dist.is_finite() {
            // Coincident nodes: push apart along a pair-specific direction
            let angle = GOLDEN_ANGLE * (i + j + 1) as f32;
            (Vec2::angled(angle), self.min_distance)
        } else {
            (delta / dist, dist)
        }
    }
}

/// Uniform sample in `[min, max)`, or `min` when the range is empty
fn sample<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> f32 {
    if max > min {
        rng.gen_range(min..max)
    } else {
        min
    }
}

fn clamp_to(pos: Pos2, bounds: Rect) -> Pos2 {
    Pos2::new(
        pos.x.clamp(bounds.min.x, bounds.max.x),
        pos.y.clamp(bounds.min.y, bounds.max.y),
    )
}

// =============================================================================
// TESTS
// =============================================================================
