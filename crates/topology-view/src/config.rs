//! Engine configuration
//!
//! All fields default, so hosts can load a partial YAML/JSON document and only
//! override what they care about.

use serde::{Deserialize, Serialize};

/// Top-level configuration for a topology view
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TopologyConfig {
    pub layout: LayoutConfig,
    pub interaction: InteractionConfig,
}

impl TopologyConfig {
    /// Parse and validate a YAML document
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.interaction.validate()
    }
}

// =============================================================================
// LAYOUT CONFIG
// =============================================================================

/// Configuration for the layout algorithms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Inset from every viewport edge for grid, hierarchical and force layouts
    pub margin: f32,

    /// Circle radius as a fraction of min(width, height)
    pub circle_radius_factor: f32,

    /// Tree ring radius for access points, fraction of min(width, height)
    pub tree_inner_radius_factor: f32,

    /// Tree ring radius for everything else, fraction of min(width, height)
    pub tree_outer_radius_factor: f32,

    /// Vertical placement of the hierarchical tiers (switches, APs, other)
    /// as fractions of the viewport height
    pub tier_fractions: [f32; 3],

    /// Fixed iteration count for the force-directed simulation
    pub force_iterations: usize,

    /// Displacement scale applied to the net force each iteration
    pub force_damping: f32,

    /// Distance floor used by the force simulation (prevents explosion)
    pub force_min_distance: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            margin: 50.0,
            circle_radius_factor: 0.3,
            tree_inner_radius_factor: 0.25,
            tree_outer_radius_factor: 0.4,
            tier_fractions: [0.2, 0.5, 0.8],
            force_iterations: 100,
            force_damping: 0.1,
            force_min_distance: 0.01,
        }
    }
}

impl LayoutConfig {
    /// Config for dense sites (hundreds of devices): tighter margins, more settling
    pub fn dense() -> Self {
        Self {
            margin: 30.0,
            force_iterations: 150,
            ..Self::default()
        }
    }
}

// =============================================================================
// INTERACTION CONFIG
// =============================================================================

/// Configuration for pointer interaction and the viewport transform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Zoom limits
    pub min_zoom: f32,
    pub max_zoom: f32,

    /// Multiplicative zoom per wheel notch
    pub zoom_in_factor: f32,
    pub zoom_out_factor: f32,

    /// Screen-space travel (px) below which a press/release counts as a click
    pub click_threshold: f32,

    /// Node hit radius in model space
    pub node_radius: f32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            min_zoom: 0.1,
            max_zoom: 5.0,
            zoom_in_factor: 1.1,
            zoom_out_factor: 0.9,
            click_threshold: 3.0,
            node_radius: 20.0,
        }
    }
}

impl InteractionConfig {
    /// Zoom limits must be finite with `0 < min_zoom <= max_zoom`
    pub fn has_valid_zoom_limits(&self) -> bool {
        self.min_zoom.is_finite()
            && self.max_zoom.is_finite()
            && self.min_zoom > 0.0
            && self.min_zoom <= self.max_zoom
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.has_valid_zoom_limits() {
            anyhow::bail!(
                "invalid zoom limits: min_zoom {} / max_zoom {} (need 0 < min_zoom <= max_zoom)",
                self.min_zoom,
                self.max_zoom
            );
        }
        for (name, factor) in [
            ("zoom_in_factor", self.zoom_in_factor),
            ("zoom_out_factor", self.zoom_out_factor),
        ] {
            if !factor.is_finite() || factor <= 0.0 {
                anyhow::bail!("invalid {}: {}", name, factor);
            }
        }
        if !self.click_threshold.is_finite() || self.click_threshold < 0.0 {
            anyhow::bail!("invalid click_threshold: {}", self.click_threshold);
        }
        if !self.node_radius.is_finite() || self.node_radius <= 0.0 {
            anyhow::bail!("invalid node_radius: {}", self.node_radius);
        }
        Ok(())
    }

    /// Config for touch input (fat fingers, bigger click slop)
    pub fn touch() -> Self {
        Self {
            click_threshold: 8.0,
            node_radius: 28.0,
            ..Self::default()
        }
    }
}
