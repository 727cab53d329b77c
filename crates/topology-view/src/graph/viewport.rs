//! Viewport transform - pan/zoom between screen space and model space
//!
//! `screen = model · zoom + pan`. Purely view-local state: never touches the
//! coordinate store and is not persisted with saved views.
//!
//! - `pan(delta)` - shift by a screen-space delta
//! - `zoom_by(factor, anchor)` - multiplicative zoom, keeping `anchor` fixed on screen
//! - `fit_to_bounds(bounds, screen, padding)` - show a model-space rect
//! - `reset()` - zoom 1, pan 0

use crate::config::InteractionConfig;
use egui::{Pos2, Rect, Vec2};

#[derive(Debug, Clone, PartialEq)]
pub struct ViewportTransform {
    zoom: f32,
    /// Screen-space offset of the model origin
    pan: Vec2,
    /// Zoom limits
    pub min_zoom: f32,
    pub max_zoom: f32,
}

impl Default for ViewportTransform {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: Vec2::ZERO,
            min_zoom: 0.1,
            max_zoom: 5.0,
        }
    }
}

impl ViewportTransform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Viewport with zoom limits taken from `config`.
    ///
    /// Unusable limits (non-finite, non-positive or inverted) fall back to the defaults.
    pub fn from_config(config: &InteractionConfig) -> Self {
        if !config.has_valid_zoom_limits() {
            tracing::warn!(
                min_zoom = config.min_zoom,
                max_zoom = config.max_zoom,
                "invalid zoom limits, using defaults"
            );
            return Self::default();
        }
        Self {
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
            ..Self::default()
        }
    }

    /// Clamp to the zoom limits without panicking on inverted or NaN bounds
    fn clamp_zoom(&self, zoom: f32) -> f32 {
        zoom.max(self.min_zoom).min(self.max_zoom)
    }

    // =========================================================================
    // CURRENT VALUES
    // =========================================================================

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn pan_offset(&self) -> Vec2 {
        self.pan
    }

    pub fn is_identity(&self) -> bool {
        self.zoom == 1.0 && self.pan == Vec2::ZERO
    }

    // =========================================================================
    // CONTROLS
    // =========================================================================

    /// Pan by delta in screen coordinates
    pub fn pan(&mut self, screen_delta: Vec2) {
        self.pan += screen_delta;
    }

    /// Zoom by factor, clamped to the limits.
    ///
    /// With an anchor, the model point under the anchor stays under it.
    pub fn zoom_by(&mut self, factor: f32, anchor: Option<Pos2>) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let old_zoom = self.zoom;
        let new_zoom = self.clamp_zoom(old_zoom * factor);
        if (new_zoom - old_zoom).abs() <= f32::EPSILON {
            return;
        }

        match anchor {
            Some(anchor) => {
                let model = self.to_model_space(anchor);
                self.zoom = new_zoom;
                self.pan = anchor.to_vec2() - model.to_vec2() * new_zoom;
            }
            None => self.zoom = new_zoom,
        }
    }

    /// Set zoom level directly (clamped), keeping pan
    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = self.clamp_zoom(zoom);
    }

    /// Reset to zoom 1, no pan
    pub fn reset(&mut self) {
        self.zoom = 1.0;
        self.pan = Vec2::ZERO;
    }

    /// Fit a model-space rect into a screen of `screen_size` with padding
    pub fn fit_to_bounds(&mut self, bounds: Rect, screen_size: Vec2, padding: f32) {
        if !bounds.is_finite() || bounds.is_negative() {
            return;
        }

        let available = Vec2::new(
            (screen_size.x - 2.0 * padding).max(1.0),
            (screen_size.y - 2.0 * padding).max(1.0),
        );
        // A single device (zero-size bounds) keeps the current zoom
        let zoom = if bounds.width() < 1.0 && bounds.height() < 1.0 {
            self.zoom
        } else {
            let zoom_x = available.x / bounds.width().max(1.0);
            let zoom_y = available.y / bounds.height().max(1.0);
            self.clamp_zoom(zoom_x.min(zoom_y))
        };

        let screen_center = screen_size / 2.0;
        self.zoom = zoom;
        self.pan = screen_center - bounds.center().to_vec2() * zoom;
    }

    // =========================================================================
    // COORDINATE TRANSFORMS
    // =========================================================================

    /// Transform screen position to model position
    pub fn to_model_space(&self, screen: Pos2) -> Pos2 {
        ((screen.to_vec2() - self.pan) / self.zoom).to_pos2()
    }

    /// Transform model position to screen position
    pub fn to_screen_space(&self, model: Pos2) -> Pos2 {
        (model.to_vec2() * self.zoom + self.pan).to_pos2()
    }

    /// Convert a screen-space delta to a model-space delta
    pub fn screen_delta_to_model(&self, delta: Vec2) -> Vec2 {
        delta / self.zoom
    }

    /// Model-space rect visible in a screen of `screen_size`
    pub fn visible_bounds(&self, screen_size: Vec2) -> Rect {
        Rect::from_min_max(
            self.to_model_space(Pos2::ZERO),
            self.to_model_space(screen_size.to_pos2()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Pos2, b: Pos2) -> bool {
        (a - b).length() < 0.001
    }

    #[test]
    fn test_round_trip_transform() {
        let mut vp = ViewportTransform::new();
        vp.pan(Vec2::new(30.0, -20.0));
        vp.zoom_by(2.0, None);

        let model = Pos2::new(100.0, 50.0);
        let screen = vp.to_screen_space(model);
        assert_eq!(screen, Pos2::new(230.0, 80.0));
        assert!(approx(vp.to_model_space(screen), model));
    }

    #[test]
    fn test_zoom_clamped() {
        let mut vp = ViewportTransform::new();
        vp.zoom_by(100.0, None);
        assert_eq!(vp.zoom(), 5.0);
        vp.zoom_by(0.0001, None);
        assert_eq!(vp.zoom(), 0.1);
        // Nonsense factors are ignored
        vp.zoom_by(f32::NAN, None);
        vp.zoom_by(-2.0, None);
        assert_eq!(vp.zoom(), 0.1);
    }

    #[test]
    fn test_inverted_config_falls_back_to_defaults() {
        let config = InteractionConfig {
            min_zoom: 6.0,
            max_zoom: 5.0,
            ..InteractionConfig::default()
        };
        let mut vp = ViewportTransform::from_config(&config);
        assert_eq!((vp.min_zoom, vp.max_zoom), (0.1, 5.0));
        vp.zoom_by(1.1, Some(Pos2::new(10.0, 10.0)));
        assert!((vp.zoom() - 1.1).abs() < 0.0001);

        // NaN limits set directly do not poison the zoom
        vp.min_zoom = f32::NAN;
        vp.set_zoom(2.0);
        assert!(vp.zoom().is_finite());
    }

    #[test]
    fn test_anchor_stays_fixed() {
        let mut vp = ViewportTransform::new();
        vp.pan(Vec2::new(12.0, 7.0));
        let anchor = Pos2::new(320.0, 240.0);
        let before = vp.to_model_space(anchor);

        vp.zoom_by(1.1, Some(anchor));
        vp.zoom_by(1.1, Some(anchor));

        assert!(approx(vp.to_model_space(anchor), before));
        assert!((vp.zoom() - 1.21).abs() < 0.0001);
    }

    #[test]
    fn test_reset() {
        let mut vp = ViewportTransform::new();
        vp.pan(Vec2::new(5.0, 5.0));
        vp.zoom_by(3.0, None);
        vp.reset();
        assert!(vp.is_identity());
    }

    #[test]
    fn test_screen_delta_to_model() {
        let mut vp = ViewportTransform::new();
        vp.set_zoom(2.0);
        assert_eq!(vp.screen_delta_to_model(Vec2::new(50.0, 0.0)), Vec2::new(25.0, 0.0));
    }

    #[test]
    fn test_fit_to_bounds_centres_content() {
        let mut vp = ViewportTransform::new();
        let bounds = Rect::from_min_max(Pos2::new(0.0, 0.0), Pos2::new(400.0, 300.0));
        let screen = Vec2::new(800.0, 600.0);
        vp.fit_to_bounds(bounds, screen, 0.0);

        assert!((vp.zoom() - 2.0).abs() < 0.0001);
        assert!(approx(vp.to_screen_space(bounds.center()), Pos2::new(400.0, 300.0)));

        // Negative bounds are ignored
        let before = vp.clone();
        vp.fit_to_bounds(Rect::NOTHING, screen, 10.0);
        assert_eq!(vp, before);
    }
}
