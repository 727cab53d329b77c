//! Topology rendering with egui Painter
//!
//! Draws a [`ViewSession`] in widget-local screen space: links first, then
//! nodes (fill by status, shape by device type), labels, selection/hover rings
//! and an info overlay. Links with a missing endpoint are skipped.

use super::colors;
use crate::persistence::ViewStore;
use crate::session::ViewSession;
use egui::{Align2, Color32, FontId, Pos2, Rect, Shape, Stroke, Vec2};
use topology_types::{Device, DeviceType};

/// Rendering switches
#[derive(Debug, Clone)]
pub struct GraphRenderer {
    /// Draw device labels
    pub show_labels: bool,
    /// Labels are hidden below this zoom to avoid clutter
    pub label_min_zoom: f32,
    pub link_width: f32,
    /// Draw the counts/zoom/layout overlay
    pub show_overlay: bool,
}

impl Default for GraphRenderer {
    fn default() -> Self {
        Self {
            show_labels: true,
            label_min_zoom: 0.5,
            link_width: 1.5,
            show_overlay: true,
        }
    }
}

impl GraphRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render the whole view into `rect`
    pub fn render<S: ViewStore>(
        &self,
        painter: &egui::Painter,
        session: &ViewSession<S>,
        rect: Rect,
    ) {
        painter.rect_filled(rect, 0.0, colors::BACKGROUND);

        let viewport = session.viewport();
        let zoom = viewport.zoom();
        let to_screen = |model: Pos2| rect.min + viewport.to_screen_space(model).to_vec2();
        let radius = session.controller().config.node_radius * zoom;

        // Links below nodes
        let stroke = Stroke::new(self.link_width, colors::LINK);
        for link in session.visible_links() {
            let (Some(a), Some(b)) = (
                session.position(&link.local_device_id),
                session.position(&link.remote_device_id),
            ) else {
                continue;
            };
            painter.line_segment([to_screen(a), to_screen(b)], stroke);
        }

        let selected = session.selected_device();
        let hovered = session.hovered_device();
        let label_font = FontId::proportional((11.0 * zoom.sqrt()).clamp(9.0, 16.0));

        // Culled through the R-tree against the visible model-space rect
        let visible = session.visible_devices();
        for device in session.devices() {
            if !visible.contains(device.id.as_str()) {
                continue;
            }
            let Some(model) = session.position(&device.id) else {
                continue;
            };
            let center = to_screen(model);

            self.render_node(painter, device, center, radius);

            if session.is_manual(&device.id) {
                painter.circle_filled(
                    center + Vec2::new(radius, -radius) * 0.7,
                    (radius * 0.2).max(2.0),
                    colors::MANUAL_MARKER,
                );
            }
            if selected == Some(device.id.as_str()) {
                painter.circle_stroke(center, radius + 4.0, Stroke::new(3.0, colors::SELECTION));
            } else if hovered == Some(device.id.as_str()) {
                painter.circle_stroke(
                    center,
                    radius + 3.0,
                    Stroke::new(1.5, colors::with_opacity(colors::HOVER, 0.7)),
                );
            }

            if self.show_labels && zoom >= self.label_min_zoom {
                painter.text(
                    center + Vec2::new(0.0, radius + 4.0),
                    Align2::CENTER_TOP,
                    device.label(),
                    label_font.clone(),
                    colors::LABEL,
                );
            }
        }

        if self.show_overlay {
            self.render_overlay(painter, session, rect);
        }
    }

    fn render_node(&self, painter: &egui::Painter, device: &Device, center: Pos2, radius: f32) {
        let fill = colors::status_color(device.status);
        let outline = Stroke::new(2.0, colors::device_type_color(device.device_type));

        match device.device_type {
            DeviceType::Switch => {
                let rect = Rect::from_center_size(center, Vec2::splat(radius * 1.8));
                painter.rect(rect, radius * 0.2, fill, outline);
            }
            DeviceType::Router => {
                let points = vec![
                    center + Vec2::new(0.0, -radius),
                    center + Vec2::new(radius, 0.0),
                    center + Vec2::new(0.0, radius),
                    center + Vec2::new(-radius, 0.0),
                ];
                painter.add(Shape::convex_polygon(points, fill, outline));
            }
            DeviceType::Ap | DeviceType::Unknown => {
                painter.circle(center, radius, fill, outline);
            }
        }
    }

    fn render_overlay<S: ViewStore>(
        &self,
        painter: &egui::Painter,
        session: &ViewSession<S>,
        rect: Rect,
    ) {
        let mut text = format!(
            "{} devices · {} links · {:.0}% · {}",
            session.devices().len(),
            session.visible_links().len(),
            session.viewport().zoom() * 100.0,
            session.layout_type().display_name(),
        );
        if session.has_unsaved_changes() {
            text.push_str(" · unsaved");
        }
        painter.text(
            rect.left_bottom() + Vec2::new(8.0, -8.0),
            Align2::LEFT_BOTTOM,
            text,
            FontId::monospace(11.0),
            colors::OVERLAY_TEXT,
        );

        if session.devices().is_empty() {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "No devices",
                FontId::proportional(16.0),
                Color32::GRAY,
            );
        }
    }
}
