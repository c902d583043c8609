//! Axis-aligned rectangles.
//!
//! Nodes never rotate, so every bound in the graph is axis-aligned. The same
//! type is used for graph-space node bounds and screen-space canvas bounds.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle represented by minimum and maximum points.
#[derive(Copy, Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// The minimum point (top-left)
    pub min: DVec2,
    /// The maximum point (bottom-right)
    pub max: DVec2,
}

impl Rect {
    /// Creates a rect from minimum and maximum points.
    pub fn new(min: DVec2, max: DVec2) -> Self {
        Self { min, max }
    }

    pub fn from_origin_size(origin: DVec2, size: DVec2) -> Self {
        Self {
            min: origin,
            max: origin + size,
        }
    }

    pub fn size(&self) -> DVec2 {
        self.max - self.min
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> DVec2 {
        (self.min + self.max) * 0.5
    }

    /// True when the rect has no area (zero or negative width or height).
    pub fn is_empty(&self) -> bool {
        self.min.x >= self.max.x || self.min.y >= self.max.y
    }

    /// Tests if two rects overlap. Touching edges count as overlapping.
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// Tests if a point is contained within the rect.
    ///
    /// Points on the boundary are considered contained.
    pub fn contains_point(&self, point: DVec2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_point_includes_boundary() {
        let rect = Rect::from_origin_size(DVec2::ZERO, DVec2::new(100.0, 100.0));
        assert!(rect.contains_point(DVec2::new(50.0, 50.0)));
        assert!(rect.contains_point(DVec2::new(100.0, 100.0)));
        assert!(!rect.contains_point(DVec2::new(-1.0, 50.0)));
    }

    #[test]
    fn zero_area_rect_is_empty() {
        let line = Rect::new(DVec2::new(0.0, 5.0), DVec2::new(10.0, 5.0));
        assert!(line.is_empty());
        assert!(!Rect::from_origin_size(DVec2::ZERO, DVec2::ONE).is_empty());
    }

    #[test]
    fn intersects_includes_touching_edges() {
        let a = Rect::from_origin_size(DVec2::ZERO, DVec2::new(10.0, 10.0));
        let b = Rect::from_origin_size(DVec2::new(5.0, 5.0), DVec2::new(10.0, 10.0));
        let c = Rect::from_origin_size(DVec2::new(20.0, 20.0), DVec2::new(1.0, 1.0));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
        let touching = Rect::from_origin_size(DVec2::new(10.0, 0.0), DVec2::new(5.0, 5.0));
        assert!(a.intersects(&touching));
    }
}
