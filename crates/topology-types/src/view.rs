//! Layout and saved-view types
//!
//! `SavedView` is the on-disk shape of a named snapshot. Positions travel as
//! ordered `(device_id, Position)` pairs so the stored JSON is stable.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// POSITION
// ============================================================================

/// Position in model (canvas) space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<(f32, f32)> for Position {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

// ============================================================================
// LAYOUT TYPE
// ============================================================================

/// Layout algorithm selected for a topology view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum LayoutType {
    #[default]
    #[serde(rename = "circle")]
    Circle,
    #[serde(rename = "grid")]
    Grid,
    #[serde(rename = "hierarchical")]
    Hierarchical,
    #[serde(rename = "tree")]
    Tree,
    #[serde(rename = "force")]
    ForceDirected,
}

impl LayoutType {
    /// Get the storage string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutType::Circle => "circle",
            LayoutType::Grid => "grid",
            LayoutType::Hierarchical => "hierarchical",
            LayoutType::Tree => "tree",
            LayoutType::ForceDirected => "force",
        }
    }

    /// Get display name for UI
    pub fn display_name(&self) -> &'static str {
        match self {
            LayoutType::Circle => "Circle",
            LayoutType::Grid => "Grid",
            LayoutType::Hierarchical => "Hierarchical",
            LayoutType::Tree => "Tree",
            LayoutType::ForceDirected => "Force-directed",
        }
    }

    /// Get all available layouts (selector order)
    pub fn all() -> &'static [LayoutType] {
        &[
            LayoutType::Circle,
            LayoutType::Grid,
            LayoutType::Hierarchical,
            LayoutType::Tree,
            LayoutType::ForceDirected,
        ]
    }

    /// Whether the same inputs always produce the same positions
    pub fn is_deterministic(&self) -> bool {
        !matches!(self, LayoutType::ForceDirected)
    }
}

impl fmt::Display for LayoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised layout name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseLayoutTypeError(pub String);

impl fmt::Display for ParseLayoutTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown layout type: {}", self.0)
    }
}

impl std::error::Error for ParseLayoutTypeError {}

impl FromStr for LayoutType {
    type Err = ParseLayoutTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "circle" => Ok(LayoutType::Circle),
            "grid" => Ok(LayoutType::Grid),
            "hierarchical" => Ok(LayoutType::Hierarchical),
            "tree" => Ok(LayoutType::Tree),
            "force" | "force-directed" | "force_directed" => Ok(LayoutType::ForceDirected),
            other => Err(ParseLayoutTypeError(other.to_string())),
        }
    }
}

// ============================================================================
// SAVED VIEW
// ============================================================================

/// Named, persisted snapshot of a topology view, scoped to one site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedView {
    pub name: String,
    /// Device positions as ordered pairs
    #[serde(default)]
    pub positions: Vec<(String, Position)>,
    #[serde(default)]
    pub layout: LayoutType,
    #[serde(default)]
    pub manually_positioned: Vec<String>,
}

impl SavedView {
    pub fn new(name: impl Into<String>, layout: LayoutType) -> Self {
        Self {
            name: name.into(),
            positions: Vec::new(),
            layout,
            manually_positioned: Vec::new(),
        }
    }

    /// Look up a stored position by device id
    pub fn position(&self, device_id: &str) -> Option<Position> {
        self.positions
            .iter()
            .find(|(id, _)| id == device_id)
            .map(|(_, pos)| *pos)
    }
}
