//! Type-safe coordinate spaces for the node graph.
//!
//! Provides distinct types for different coordinate spaces to prevent
//! accidental mixing at compile time.
//!
//! # Coordinate Spaces
//!
//! - **Graph space**: Where nodes and wires live, in graph units (screen pixels at zoom 1)
//! - **Screen space**: Pixels relative to the canvas element origin (after pan/zoom)
//! - **Grid space**: Integer grid cells; node positions and move deltas are expressed in cells

use glam::{DVec2, IVec2};
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Sub};

/// Position in graph space.
///
/// Graph space is the infinite coordinate system wires are routed in.
/// The viewport transforms graph coordinates to screen coordinates for display.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GraphPoint(pub DVec2);

/// Position in screen space (pixels relative to the canvas element).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenPoint(pub DVec2);

/// Movement in screen space, e.g. pointer movement between two frames.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenDelta(pub DVec2);

/// A cell of the background grid. Node positions are stored in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridCell(pub IVec2);

/// Movement in whole grid cells (not a position).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridDelta(pub IVec2);

// === GraphPoint ===

impl GraphPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self(DVec2::new(x, y))
    }

    pub fn x(&self) -> f64 {
        self.0.x
    }

    pub fn y(&self) -> f64 {
        self.0.y
    }

    /// The grid cell containing this point, rounded to the nearest cell origin.
    pub fn to_grid(&self, cell_size: f64) -> GridCell {
        GridCell(IVec2::new(
            (self.0.x / cell_size).round() as i32,
            (self.0.y / cell_size).round() as i32,
        ))
    }
}

impl From<DVec2> for GraphPoint {
    fn from(v: DVec2) -> Self {
        Self(v)
    }
}

impl From<GraphPoint> for DVec2 {
    fn from(p: GraphPoint) -> Self {
        p.0
    }
}

impl Add<DVec2> for GraphPoint {
    type Output = GraphPoint;

    fn add(self, offset: DVec2) -> Self::Output {
        GraphPoint(self.0 + offset)
    }
}

// === ScreenPoint ===

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self(DVec2::new(x, y))
    }

    pub fn x(&self) -> f64 {
        self.0.x
    }

    pub fn y(&self) -> f64 {
        self.0.y
    }
}

impl From<DVec2> for ScreenPoint {
    fn from(v: DVec2) -> Self {
        Self(v)
    }
}

impl From<ScreenPoint> for DVec2 {
    fn from(p: ScreenPoint) -> Self {
        p.0
    }
}

impl Sub for ScreenPoint {
    type Output = ScreenDelta;

    /// Subtracting two points gives a delta.
    fn sub(self, other: ScreenPoint) -> Self::Output {
        ScreenDelta(self.0 - other.0)
    }
}

// === ScreenDelta ===

impl ScreenDelta {
    pub fn new(dx: f64, dy: f64) -> Self {
        Self(DVec2::new(dx, dy))
    }

    pub fn dx(&self) -> f64 {
        self.0.x
    }

    pub fn dy(&self) -> f64 {
        self.0.y
    }

    pub fn is_zero(&self) -> bool {
        self.0 == DVec2::ZERO
    }
}

// === GridCell ===

impl GridCell {
    pub fn new(x: i32, y: i32) -> Self {
        Self(IVec2::new(x, y))
    }

    pub fn x(&self) -> i32 {
        self.0.x
    }

    pub fn y(&self) -> i32 {
        self.0.y
    }

    /// The graph-space position of this cell's top-left corner.
    pub fn to_graph(&self, cell_size: f64) -> GraphPoint {
        GraphPoint(self.0.as_dvec2() * cell_size)
    }
}

impl Add<GridDelta> for GridCell {
    type Output = GridCell;

    fn add(self, delta: GridDelta) -> Self::Output {
        GridCell(self.0 + delta.0)
    }
}

impl AddAssign<GridDelta> for GridCell {
    fn add_assign(&mut self, delta: GridDelta) {
        self.0 += delta.0;
    }
}

// === GridDelta ===

impl GridDelta {
    pub const ZERO: GridDelta = GridDelta(IVec2::ZERO);

    pub fn new(dx: i32, dy: i32) -> Self {
        Self(IVec2::new(dx, dy))
    }

    pub fn dx(&self) -> i32 {
        self.0.x
    }

    pub fn dy(&self) -> i32 {
        self.0.y
    }

    pub fn is_zero(&self) -> bool {
        self.0 == IVec2::ZERO
    }

    /// Offset in graph units.
    pub fn to_graph(&self, cell_size: f64) -> DVec2 {
        self.0.as_dvec2() * cell_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_cell_add_delta() {
        let cell = GridCell::new(3, -2);
        let moved = cell + GridDelta::new(2, 5);
        assert_eq!(moved, GridCell::new(5, 3));
    }

    #[test]
    fn graph_point_rounds_to_nearest_cell() {
        assert_eq!(GraphPoint::new(260.0, 260.0).to_grid(24.0), GridCell::new(11, 11));
        assert_eq!(GraphPoint::new(11.9, -12.1).to_grid(24.0), GridCell::new(0, -1));
    }

    #[test]
    fn screen_point_sub_gives_delta() {
        let delta = ScreenPoint::new(10.0, 20.0) - ScreenPoint::new(3.0, 5.0);
        assert_eq!(delta.dx(), 7.0);
        assert_eq!(delta.dy(), 15.0);
    }

    #[test]
    fn grid_cell_to_graph_scales_by_cell_size() {
        assert_eq!(GridCell::new(2, -1).to_graph(24.0), GraphPoint::new(48.0, -24.0));
        assert_eq!(GridDelta::new(1, 3).to_graph(24.0), DVec2::new(24.0, 72.0));
    }
}
