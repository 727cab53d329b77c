//! Color palette for the topology view
//!
//! Node fill encodes status, node outline encodes device type.

use egui::Color32;
use topology_types::{DeviceStatus, DeviceType};

// =============================================================================
// STATUS
// =============================================================================

pub fn status_color(status: DeviceStatus) -> Color32 {
    match status {
        DeviceStatus::Online => Color32::from_rgb(76, 175, 80),   // Green
        DeviceStatus::Offline => Color32::from_rgb(229, 57, 53),  // Red
        DeviceStatus::Unknown => Color32::from_rgb(158, 158, 158), // Gray
    }
}

// =============================================================================
// DEVICE TYPE
// =============================================================================

pub fn device_type_color(device_type: DeviceType) -> Color32 {
    match device_type {
        DeviceType::Switch => Color32::from_rgb(30, 136, 229), // Blue
        DeviceType::Ap => Color32::from_rgb(0, 172, 193),      // Cyan
        DeviceType::Router => Color32::from_rgb(142, 36, 170), // Purple
        DeviceType::Unknown => Color32::from_rgb(97, 97, 97),
    }
}

// =============================================================================
// CHROME
// =============================================================================

pub const BACKGROUND: Color32 = Color32::from_rgb(24, 26, 31);
pub const LINK: Color32 = Color32::from_rgb(120, 130, 145);
pub const LABEL: Color32 = Color32::from_rgb(220, 220, 220);
pub const SELECTION: Color32 = Color32::from_rgb(255, 193, 7); // Amber
pub const HOVER: Color32 = Color32::from_rgb(255, 255, 255);
/// Dot marking a manually placed device
pub const MANUAL_MARKER: Color32 = Color32::from_rgb(255, 152, 0);
pub const OVERLAY_TEXT: Color32 = Color32::from_rgb(170, 170, 170);

/// Scale alpha by `opacity` (0.0-1.0)
pub fn with_opacity(color: Color32, opacity: f32) -> Color32 {
    let [r, g, b, a] = color.to_array();
    Color32::from_rgba_unmultiplied(r, g, b, (a as f32 * opacity.clamp(0.0, 1.0)) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_colors_distinct() {
        let colors = [
            status_color(DeviceStatus::Online),
            status_color(DeviceStatus::Offline),
            status_color(DeviceStatus::Unknown),
        ];
        assert_ne!(colors[0], colors[1]);
        assert_ne!(colors[1], colors[2]);
    }

    #[test]
    fn test_with_opacity() {
        assert_eq!(with_opacity(Color32::WHITE, 0.0).a(), 0);
        assert_eq!(with_opacity(Color32::WHITE, 1.0), Color32::WHITE);
    }
}
