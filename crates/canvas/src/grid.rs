use crate::{CanvasConfig, ViewportTransform};
use glam::DVec2;
use serde::{Deserialize, Serialize};

const RADIUS_EPSILON: f64 = 0.001;

/// Dot grid parameters for the current zoom.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridSpacing {
    /// Distance between dots in screen pixels.
    pub spacing: f64,
    /// Dot radius in screen pixels.
    pub dot_radius: f64,
    /// Screen position of the first dot, in `[0, spacing)` on each axis.
    pub offset: DVec2,
}

/// Derive a stable dot grid from the viewport.
///
/// The spacing doubles until it is no denser than the collapse threshold,
/// and the dot radius grows by half a pixel for every whole step of scale.
pub fn grid_spacing(viewport: &ViewportTransform, config: &CanvasConfig) -> GridSpacing {
    let scale = viewport.scale();
    let mut spacing = scale * config.grid_cell;
    while spacing > 0.0 && spacing < config.grid_collapse_threshold {
        spacing *= 2.0;
    }

    let dot_radius = 1.0 + (scale - 0.5 + RADIUS_EPSILON).floor() / 2.0;
    let origin = viewport.pan_offset() * scale;
    let offset = if spacing > 0.0 {
        DVec2::new(origin.x.rem_euclid(spacing), origin.y.rem_euclid(spacing))
    } else {
        DVec2::ZERO
    };

    GridSpacing {
        spacing,
        dot_radius,
        offset,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(scale: f64) -> GridSpacing {
        let viewport = ViewportTransform::with_transform(scale, DVec2::ZERO).unwrap();
        grid_spacing(&viewport, &CanvasConfig::default())
    }

    #[test]
    fn spacing_follows_scale_when_dense_enough() {
        assert_eq!(at(1.0).spacing, 24.0);
        assert_eq!(at(2.0).spacing, 48.0);
    }

    #[test]
    fn spacing_doubles_below_threshold() {
        // 0.25 * 24 = 6, doubled once to 12
        assert_eq!(at(0.25).spacing, 12.0);
        // 0.1 * 24 = 2.4 -> 4.8 -> 9.6 -> 19.2
        assert!((at(0.1).spacing - 19.2).abs() < 1e-9);
        assert!(at(0.001).spacing >= 10.0);
    }

    #[test]
    fn radius_grows_in_half_pixel_steps() {
        assert_eq!(at(0.3).dot_radius, 0.5);
        assert_eq!(at(1.0).dot_radius, 1.0);
        assert_eq!(at(1.5).dot_radius, 1.5);
        assert_eq!(at(2.5).dot_radius, 2.0);
    }

    #[test]
    fn offset_tracks_pan() {
        let viewport = ViewportTransform::with_transform(1.0, DVec2::new(-30.0, 50.0)).unwrap();
        let grid = grid_spacing(&viewport, &CanvasConfig::default());
        assert_eq!(grid.offset, DVec2::new(18.0, 2.0));
    }
}
