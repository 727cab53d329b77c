//! Site topology graph - layout, interaction and rendering
//!
//! # Architecture
//!
//! ```text
//! NetworkTopology (from TopologySource)
//!        │
//!        ▼
//! LayoutEngine (circle / grid / hierarchical / tree / force)
//!        │
//!        ▼
//! CoordinateStore (model-space positions + manual overrides)
//!        │
//!        ├──► GraphRenderer (draws to egui::Painter)
//!        │
//!        └──► InteractionController (pointer state machine)
//!                    │
//!                    ├──► DeviceIndex (R-tree hit testing)
//!                    ▼
//!              ViewportTransform (pan/zoom)
//! ```
//!
//! All of it is owned by a [`ViewSession`](crate::session::ViewSession);
//! [`TopologyWidget`] only translates egui input and paints.
//!
//! # Usage
//!
//! ```ignore
//! let mut widget = TopologyWidget::new();
//! // each frame
//! widget.ui(&mut session, ui);
//! ```

pub mod colors;
pub mod coords;
pub mod force_sim;
pub mod input;
pub mod layout;
pub mod render;
pub mod spatial;
pub mod viewport;

pub use coords::CoordinateStore;
pub use force_sim::ForceLayout;
pub use input::{DragState, InteractionController, InteractionOutcome, PointerEvent};
pub use layout::{compute_layout, visible_links, LayoutEngine, PositionMap};
pub use render::GraphRenderer;
pub use spatial::DeviceIndex;
pub use viewport::ViewportTransform;

use crate::persistence::ViewStore;
use crate::session::ViewSession;
use egui::{Pos2, Sense};

/// Scroll distance (points) treated as one wheel notch
const SCROLL_POINTS_PER_NOTCH: f32 = 50.0;

// =============================================================================
// WIDGET
// =============================================================================

/// egui surface for a [`ViewSession`]
#[derive(Debug, Clone, Default)]
pub struct TopologyWidget {
    pub renderer: GraphRenderer,
    /// Last pointer position (widget-local) seen inside the canvas
    last_pointer: Option<Pos2>,
}

impl TopologyWidget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle input and paint the session into the remaining space
    pub fn ui<S: ViewStore>(&mut self, session: &mut ViewSession<S>, ui: &mut egui::Ui) {
        let available = ui.available_size();
        let (response, painter) = ui.allocate_painter(available, Sense::click_and_drag());
        let rect = response.rect;
        session.set_viewport_size(rect.size());

        let (pressed, released, pointer, scroll) = ui.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.primary_released(),
                i.pointer.latest_pos(),
                i.raw_scroll_delta,
            )
        });
        // Widget-local screen space
        let local = pointer
            .filter(|p| rect.contains(*p))
            .map(|p| Pos2::ZERO + (p - rect.min));

        let mut repaint = false;
        match (local, self.last_pointer) {
            (None, Some(_)) => {
                session.handle_pointer(PointerEvent::Leave);
                session.update_hover(None);
                repaint = true;
            }
            (Some(pos), last) => {
                if pressed {
                    let target = session.device_at(pos);
                    repaint |= session
                        .handle_pointer(PointerEvent::Down { pos, target })
                        .needs_repaint();
                } else if last != Some(pos) {
                    repaint |= session
                        .handle_pointer(PointerEvent::Move { pos })
                        .needs_repaint();
                }
                if released {
                    repaint |= session
                        .handle_pointer(PointerEvent::Up { pos })
                        .needs_repaint();
                }
                if scroll.y != 0.0 {
                    repaint |= session
                        .handle_pointer(PointerEvent::Wheel {
                            pos: Some(pos),
                            notches: scroll.y / SCROLL_POINTS_PER_NOTCH,
                        })
                        .needs_repaint();
                }
                if session.drag_state().is_idle() {
                    let before = session.hovered_device().map(str::to_string);
                    session.update_hover(Some(pos));
                    repaint |= before.as_deref() != session.hovered_device();
                }
                ui.ctx()
                    .set_cursor_icon(input::cursor_for_state(session.controller()));
            }
            (None, None) => {}
        }
        self.last_pointer = local;

        self.renderer.render(&painter, session, rect);

        if repaint {
            ui.ctx().request_repaint();
        }
    }
}
