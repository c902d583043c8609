use crate::input::WheelEvent;
use crate::CanvasConfig;
use glam::DVec2;
use log::{trace, warn};
use node::{GraphPoint, GridCell, Rect, ScreenDelta, ScreenPoint};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ViewportError {
    #[error("scale must be positive and finite, got {0}")]
    InvalidScale(f64),
    #[error("zoom factor must be positive and finite, got {0}")]
    InvalidZoomFactor(f64),
}

/// Pan and zoom state of the canvas.
///
/// `screen = (graph + pan) * scale`. The scale is always positive.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewportTransform {
    scale: f64,
    /// Pan offset in graph units.
    pan: DVec2,
}

impl Default for ViewportTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            pan: DVec2::ZERO,
        }
    }
}

impl ViewportTransform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transform(scale: f64, pan: DVec2) -> Result<Self, ViewportError> {
        let mut viewport = Self { scale: 1.0, pan };
        viewport.set_scale(scale)?;
        Ok(viewport)
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn pan_offset(&self) -> DVec2 {
        self.pan
    }

    pub fn set_scale(&mut self, scale: f64) -> Result<(), ViewportError> {
        if !(scale.is_finite() && scale > 0.0) {
            warn!("rejected viewport scale {scale}");
            return Err(ViewportError::InvalidScale(scale));
        }
        self.scale = scale;
        Ok(())
    }

    pub fn screen_to_graph(&self, point: ScreenPoint) -> GraphPoint {
        GraphPoint(point.0 / self.scale - self.pan)
    }

    pub fn graph_to_screen(&self, point: GraphPoint) -> ScreenPoint {
        ScreenPoint((point.0 + self.pan) * self.scale)
    }

    /// The grid cell under a screen point.
    pub fn screen_to_grid(&self, point: ScreenPoint, cell_size: f64) -> GridCell {
        self.screen_to_graph(point).to_grid(cell_size)
    }

    /// Map a graph-space rectangle onto the screen.
    pub fn graph_to_screen_rect(&self, rect: Rect) -> Rect {
        Rect::new(
            self.graph_to_screen(GraphPoint(rect.min)).0,
            self.graph_to_screen(GraphPoint(rect.max)).0,
        )
    }

    /// Pan by a delta in screen pixels.
    pub fn pan(&mut self, delta: ScreenDelta) {
        self.pan += delta.0 / self.scale;
    }

    /// Zoom by `factor`, keeping the graph point under `anchor` fixed on screen.
    pub fn zoom_at(&mut self, anchor: ScreenPoint, factor: f64) -> Result<(), ViewportError> {
        if !(factor.is_finite() && factor > 0.0) {
            return Err(ViewportError::InvalidZoomFactor(factor));
        }
        if factor == 1.0 {
            return Ok(());
        }

        let under_anchor = self.screen_to_graph(anchor);
        self.set_scale(self.scale * factor)?;
        self.pan = anchor.0 / self.scale - under_anchor.0;
        Ok(())
    }

    /// Apply a wheel or trackpad scroll.
    ///
    /// Ctrl zooms around the pointer. Otherwise the delta pans, with shift
    /// turning vertical scroll into horizontal panning.
    pub fn apply_wheel(&mut self, event: &WheelEvent, config: &CanvasConfig) {
        let delta = event.delta.to_pixels(config.lines_to_pixels);
        if event.modifiers.ctrl {
            let factor = wheel_zoom_factor(delta.y, config.wheel_zoom_rate);
            if let Err(err) = self.zoom_at(event.position, factor) {
                warn!("ignored wheel zoom: {err}");
            }
            trace!("wheel zoom to {}", self.scale);
            return;
        }

        let delta = if event.modifiers.shift {
            DVec2::new(delta.x + delta.y, 0.0)
        } else {
            delta
        };
        self.pan(ScreenDelta(-delta));
        trace!("wheel pan to {:?}", self.pan);
    }
}

/// Zoom factor for a vertical wheel delta in pixels. Scrolling down zooms out.
pub fn wheel_zoom_factor(delta_y: f64, rate: f64) -> f64 {
    let factor = 1.0 + delta_y.abs() * rate;
    if delta_y > 0.0 {
        1.0 / factor
    } else {
        factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Modifiers, WheelDelta};
    use proptest::prelude::*;

    #[test]
    fn forward_and_inverse_agree() {
        let viewport = ViewportTransform::with_transform(2.0, DVec2::new(-10.0, 5.0)).unwrap();
        let screen = viewport.graph_to_screen(GraphPoint::new(30.0, 40.0));
        assert_eq!(screen, ScreenPoint::new(40.0, 90.0));
        assert_eq!(viewport.screen_to_graph(screen), GraphPoint::new(30.0, 40.0));
    }

    #[test]
    fn pan_divides_by_scale() {
        let mut viewport = ViewportTransform::with_transform(2.0, DVec2::ZERO).unwrap();
        viewport.pan(ScreenDelta::new(10.0, -4.0));
        assert_eq!(viewport.pan_offset(), DVec2::new(5.0, -2.0));
    }

    #[test]
    fn rejects_non_positive_scale() {
        let mut viewport = ViewportTransform::new();
        assert_eq!(viewport.set_scale(0.0), Err(ViewportError::InvalidScale(0.0)));
        assert_eq!(viewport.set_scale(-1.0), Err(ViewportError::InvalidScale(-1.0)));
        assert!(viewport.zoom_at(ScreenPoint::new(1.0, 1.0), 0.0).is_err());
        assert_eq!(viewport.scale(), 1.0);
    }

    #[test]
    fn right_click_grid_cell_scenario() {
        let viewport = ViewportTransform::with_transform(2.0, DVec2::new(-10.0, -10.0)).unwrap();
        let expected = ((500.0f64 / 2.0 + 10.0) / 24.0).round() as i32;
        assert_eq!(
            viewport.screen_to_grid(ScreenPoint::new(500.0, 500.0), 24.0),
            GridCell::new(expected, expected)
        );
    }

    #[test]
    fn wheel_factor_inverts_when_scrolling_down() {
        assert_eq!(wheel_zoom_factor(-100.0, 1.0 / 200.0), 1.5);
        assert_eq!(wheel_zoom_factor(100.0, 1.0 / 200.0), 1.0 / 1.5);
        assert_eq!(wheel_zoom_factor(0.0, 1.0 / 200.0), 1.0);
    }

    #[test]
    fn ctrl_wheel_zooms_plain_wheel_pans() {
        let config = CanvasConfig::default();
        let mut viewport = ViewportTransform::new();
        let mut event = WheelEvent {
            position: ScreenPoint::new(100.0, 100.0),
            delta: WheelDelta::Pixels(DVec2::new(0.0, -100.0)),
            modifiers: Modifiers::ctrl(),
        };
        viewport.apply_wheel(&event, &config);
        assert_eq!(viewport.scale(), 1.5);

        let mut viewport = ViewportTransform::new();
        event.modifiers = Modifiers::NONE;
        viewport.apply_wheel(&event, &config);
        assert_eq!(viewport.scale(), 1.0);
        assert_eq!(viewport.pan_offset(), DVec2::new(0.0, 100.0));

        let mut viewport = ViewportTransform::new();
        event.modifiers = Modifiers::shift();
        viewport.apply_wheel(&event, &config);
        assert_eq!(viewport.pan_offset(), DVec2::new(100.0, 0.0));
    }

    proptest! {
        #[test]
        fn zoom_preserves_point_under_anchor(
            scale in 0.05f64..20.0,
            pan_x in -1000.0f64..1000.0,
            pan_y in -1000.0f64..1000.0,
            anchor_x in -2000.0f64..2000.0,
            anchor_y in -2000.0f64..2000.0,
            factor in 0.05f64..20.0,
        ) {
            let mut viewport = ViewportTransform::with_transform(scale, DVec2::new(pan_x, pan_y)).unwrap();
            let anchor = ScreenPoint::new(anchor_x, anchor_y);
            let before = viewport.screen_to_graph(anchor);
            viewport.zoom_at(anchor, factor).unwrap();
            let after = viewport.screen_to_graph(anchor);
            let magnitude = before.0.abs().max_element() + anchor.0.abs().max_element() / viewport.scale();
            let tolerance = 1e-9 * (1.0 + magnitude);
            prop_assert!((before.0 - after.0).abs().max_element() <= tolerance);
            prop_assert!(viewport.scale() > 0.0);
        }
    }
}
