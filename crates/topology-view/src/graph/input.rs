//! Input handling - the pointer state machine
//!
//! Three mutually exclusive drag modes arbitrate every pointer gesture:
//!
//! ```text
//!            Down(empty canvas)                 Down(device)
//!   Idle ─────────────────────► PanningCanvas   Idle ──────────────► DraggingDevice
//!    ▲                               │            ▲                       │
//!    └──────── Up / Leave ───────────┘            └────── Up / Leave ─────┘
//! ```
//!
//! A press/release that never travels beyond the click threshold is a click:
//! on a device it selects the device, on empty canvas it clears the selection.
//! Wheel events zoom in any state without changing it.
//!
//! Malformed input (unknown device ids, drags of devices that vanished in a
//! refresh) is normalized to [`InteractionOutcome::None`]; nothing here fails.

use super::coords::CoordinateStore;
use super::viewport::ViewportTransform;
use crate::config::InteractionConfig;
use egui::Pos2;
use std::collections::HashSet;

// =============================================================================
// EVENTS & STATE
// =============================================================================

/// Pointer event in screen space, already hit-tested by the host
#[derive(Debug, Clone, PartialEq)]
pub enum PointerEvent {
    /// Primary button pressed; `target` is the device under the pointer, if any
    Down { pos: Pos2, target: Option<String> },
    Move { pos: Pos2 },
    Up { pos: Pos2 },
    /// Pointer left the canvas
    Leave,
    /// Wheel notches: positive zooms in, negative zooms out
    Wheel { pos: Option<Pos2>, notches: f32 },
}

/// Current drag mode
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    PanningCanvas {
        press: Pos2,
        last: Pos2,
        travelled: bool,
    },
    DraggingDevice {
        device_id: String,
        press: Pos2,
        /// Device position when the press started
        grab_start: Pos2,
        /// Pointer has travelled beyond the click threshold
        moved: bool,
    },
}

impl DragState {
    pub fn is_idle(&self) -> bool {
        matches!(self, DragState::Idle)
    }

    /// Device being dragged, if any
    pub fn dragged_device(&self) -> Option<&str> {
        match self {
            DragState::DraggingDevice { device_id, .. } => Some(device_id),
            _ => None,
        }
    }
}

/// What a pointer event did
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionOutcome {
    None,
    Panned,
    Zoomed,
    /// Device moved and is now manually placed
    DeviceMoved(String),
    Selected(String),
    Deselected,
}

impl InteractionOutcome {
    /// Does the view need repainting?
    pub fn needs_repaint(&self) -> bool {
        !matches!(self, InteractionOutcome::None)
    }
}

/// Mutable state an event may touch
pub struct InteractionContext<'a> {
    pub viewport: &'a mut ViewportTransform,
    pub store: &'a mut CoordinateStore,
    /// Ids of devices currently present
    pub devices: &'a HashSet<String>,
}

// =============================================================================
// CONTROLLER
// =============================================================================

/// Tracks drag mode, selection and hover for the topology view
#[derive(Debug, Clone, Default)]
pub struct InteractionController {
    state: DragState,
    selected: Option<String>,
    hovered: Option<String>,
    pub config: InteractionConfig,
}

impl InteractionController {
    pub fn new(config: InteractionConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    /// Select a device programmatically
    pub fn select(&mut self, device_id: &str) {
        self.selected = Some(device_id.to_string());
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn set_hovered(&mut self, device_id: Option<String>) {
        self.hovered = device_id;
    }

    /// Abandon any gesture in progress
    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }

    /// Drop selection/hover/drag state that references devices no longer present
    pub fn forget_missing(&mut self, present: &HashSet<String>) {
        if self.selected.as_ref().is_some_and(|id| !present.contains(id)) {
            self.selected = None;
        }
        if self.hovered.as_ref().is_some_and(|id| !present.contains(id)) {
            self.hovered = None;
        }
        if self
            .state
            .dragged_device()
            .is_some_and(|id| !present.contains(id))
        {
            self.state = DragState::Idle;
        }
    }

    /// Feed one pointer event through the state machine
    pub fn handle(
        &mut self,
        event: PointerEvent,
        ctx: &mut InteractionContext<'_>,
    ) -> InteractionOutcome {
        match event {
            PointerEvent::Down { pos, target } => self.on_down(pos, target, ctx),
            PointerEvent::Move { pos } => self.on_move(pos, ctx),
            PointerEvent::Up { .. } => self.on_up(ctx),
            PointerEvent::Leave => {
                self.hovered = None;
                self.state = DragState::Idle;
                InteractionOutcome::None
            }
            PointerEvent::Wheel { pos, notches } => self.on_wheel(pos, notches, ctx),
        }
    }

    fn on_down(
        &mut self,
        pos: Pos2,
        target: Option<String>,
        ctx: &mut InteractionContext<'_>,
    ) -> InteractionOutcome {
        // A press without a release in between ends the previous gesture
        self.state = DragState::Idle;

        match target {
            Some(device_id) => {
                if !ctx.devices.contains(&device_id) {
                    tracing::debug!(
                        device_id = %device_id,
                        "pointer down on unknown device ignored"
                    );
                    return InteractionOutcome::None;
                }
                let grab_start = ctx
                    .store
                    .get(&device_id)
                    .unwrap_or_else(|| ctx.viewport.to_model_space(pos));
                self.state = DragState::DraggingDevice {
                    device_id,
                    press: pos,
                    grab_start,
                    moved: false,
                };
            }
            None => {
                self.state = DragState::PanningCanvas {
                    press: pos,
                    last: pos,
                    travelled: false,
                };
            }
        }
        InteractionOutcome::None
    }

    fn on_move(&mut self, pos: Pos2, ctx: &mut InteractionContext<'_>) -> InteractionOutcome {
        let threshold = self.config.click_threshold;

        match &mut self.state {
            DragState::Idle => InteractionOutcome::None,

            DragState::PanningCanvas {
                press,
                last,
                travelled,
            } => {
                let delta = pos - *last;
                *last = pos;
                if (pos - *press).length() > threshold {
                    *travelled = true;
                }
                if delta == egui::Vec2::ZERO {
                    return InteractionOutcome::None;
                }
                ctx.viewport.pan(delta);
                InteractionOutcome::Panned
            }

            DragState::DraggingDevice {
                device_id,
                press,
                grab_start,
                moved,
            } => {
                if !ctx.devices.contains(device_id.as_str()) {
                    tracing::debug!(
                        device_id = %device_id,
                        "dragged device vanished, drag dropped"
                    );
                    self.state = DragState::Idle;
                    return InteractionOutcome::None;
                }

                let total = pos - *press;
                if !*moved && total.length() <= threshold {
                    return InteractionOutcome::None;
                }
                *moved = true;

                let new_pos = *grab_start + ctx.viewport.screen_delta_to_model(total);
                ctx.store.set_one(device_id, new_pos, true);
                InteractionOutcome::DeviceMoved(device_id.clone())
            }
        }
    }

    fn on_up(&mut self, ctx: &mut InteractionContext<'_>) -> InteractionOutcome {
        let state = std::mem::take(&mut self.state);

        match state {
            DragState::Idle => InteractionOutcome::None,

            DragState::PanningCanvas { travelled, .. } => {
                if travelled {
                    InteractionOutcome::None
                } else if self.selected.take().is_some() {
                    InteractionOutcome::Deselected
                } else {
                    InteractionOutcome::None
                }
            }

            DragState::DraggingDevice {
                device_id, moved, ..
            } => {
                if moved || !ctx.devices.contains(&device_id) {
                    return InteractionOutcome::None;
                }
                self.selected = Some(device_id.clone());
                InteractionOutcome::Selected(device_id)
            }
        }
    }

    fn on_wheel(
        &mut self,
        pos: Option<Pos2>,
        notches: f32,
        ctx: &mut InteractionContext<'_>,
    ) -> InteractionOutcome {
        if notches == 0.0 || !notches.is_finite() {
            return InteractionOutcome::None;
        }
        let factor = if notches > 0.0 {
            self.config.zoom_in_factor.powf(notches)
        } else {
            self.config.zoom_out_factor.powf(-notches)
        };

        let before = ctx.viewport.zoom();
        ctx.viewport.zoom_by(factor, pos);
        if ctx.viewport.zoom() == before {
            InteractionOutcome::None
        } else {
            InteractionOutcome::Zoomed
        }
    }
}

// =============================================================================
// CURSOR HELPER
// =============================================================================

/// Get cursor icon based on current state
pub fn cursor_for_state(controller: &InteractionController) -> egui::CursorIcon {
    match controller.state() {
        DragState::PanningCanvas { .. } | DragState::DraggingDevice { moved: true, .. } => {
            egui::CursorIcon::Grabbing
        }
        _ if controller.hovered().is_some() => egui::CursorIcon::PointingHand,
        _ => egui::CursorIcon::Grab,
    }
}
