//! Wire geometry: cubic Béziers between port anchors.

use crate::CanvasConfig;
use glam::DVec2;
use node::{DataType, GraphPoint, PortSide};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use std::fmt::Write as _;
use strum_macros::Display;

/// Corner radius of grid-aligned wires, in graph units.
const CORNER_RADIUS: f64 = 10.0;
/// Circle approximation factor for a quarter-turn cubic.
const KAPPA: f64 = 0.5523;

/// How wires are drawn between ports.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum WireStyle {
    /// One eased Bézier per wire.
    #[default]
    Direct,
    /// Horizontal and vertical runs along grid lines with rounded corners.
    #[strum(serialize = "Grid-Aligned")]
    GridAligned,
}

/// Direction a wire leaves its port in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortOrientation {
    #[default]
    Horizontal,
    Vertical,
}

/// Where a wire attaches to a port, in graph space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PortAnchor {
    pub point: GraphPoint,
    pub orientation: PortOrientation,
}

impl PortAnchor {
    pub fn horizontal(x: f64, y: f64) -> Self {
        Self {
            point: GraphPoint::new(x, y),
            orientation: PortOrientation::Horizontal,
        }
    }

    pub fn vertical(x: f64, y: f64) -> Self {
        Self {
            point: GraphPoint::new(x, y),
            orientation: PortOrientation::Vertical,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CubicBezier {
    pub p0: DVec2,
    pub c1: DVec2,
    pub c2: DVec2,
    pub p3: DVec2,
}

impl CubicBezier {
    pub fn new(p0: DVec2, c1: DVec2, c2: DVec2, p3: DVec2) -> Self {
        Self { p0, c1, c2, p3 }
    }

    /// A straight segment from `a` to `b`.
    pub fn line(a: DVec2, b: DVec2) -> Self {
        Self::new(a, a.lerp(b, 1.0 / 3.0), a.lerp(b, 2.0 / 3.0), b)
    }

    pub fn points(&self) -> [DVec2; 4] {
        [self.p0, self.c1, self.c2, self.p3]
    }

    pub fn eval(&self, t: f64) -> DVec2 {
        let mt = 1.0 - t;
        self.p0 * (mt * mt * mt) + self.c1 * (3.0 * mt * mt * t) + self.c2 * (3.0 * mt * t * t) + self.p3 * (t * t * t)
    }

    /// De Casteljau split at `t`.
    pub fn split(&self, t: f64) -> (CubicBezier, CubicBezier) {
        let ab = self.p0.lerp(self.c1, t);
        let bc = self.c1.lerp(self.c2, t);
        let cd = self.c2.lerp(self.p3, t);
        let abc = ab.lerp(bc, t);
        let bcd = bc.lerp(cd, t);
        let mid = abc.lerp(bcd, t);
        (
            CubicBezier::new(self.p0, ab, abc, mid),
            CubicBezier::new(mid, bcd, cd, self.p3),
        )
    }

    /// Apply a point transform to every control point. Exact for affine maps.
    pub fn map(&self, f: impl Fn(DVec2) -> DVec2) -> CubicBezier {
        CubicBezier::new(f(self.p0), f(self.c1), f(self.c2), f(self.p3))
    }

    /// Bounds of the control polygon, which contain the curve.
    pub fn hull_bounds(&self) -> node::Rect {
        let points = self.points();
        let min = points.iter().fold(DVec2::INFINITY, |acc, p| acc.min(*p));
        let max = points.iter().fold(DVec2::NEG_INFINITY, |acc, p| acc.max(*p));
        node::Rect::new(min, max)
    }

    /// SVG path data, `M p0 C c1 c2 p3`.
    pub fn to_svg_path(&self) -> String {
        svg_path(std::slice::from_ref(self))
    }
}

/// SVG path data for consecutive curves, one `C` command each.
fn svg_path(curves: &[CubicBezier]) -> String {
    let mut path = String::with_capacity(64 * curves.len());
    if let Some(first) = curves.first() {
        let _ = write!(path, "M{},{}", first.p0.x, first.p0.y);
    }
    for curve in curves {
        let _ = write!(
            path,
            " C{},{} {},{} {},{}",
            curve.c1.x, curve.c1.y, curve.c2.x, curve.c2.y, curve.p3.x, curve.p3.y
        );
    }
    path
}

/// Routes wires between port anchors.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WireRouter {
    curve_length: f64,
    style: WireStyle,
    grid_cell: f64,
}

impl WireRouter {
    pub fn new(curve_length: f64) -> Self {
        Self {
            curve_length,
            style: WireStyle::Direct,
            grid_cell: CanvasConfig::default().grid_cell,
        }
    }

    pub fn from_config(config: &CanvasConfig) -> Self {
        Self::new(config.wire_curve_length).with_style(config.wire_style, config.grid_cell)
    }

    pub fn with_style(mut self, style: WireStyle, grid_cell: f64) -> Self {
        self.style = style;
        self.grid_cell = grid_cell;
        self
    }

    pub fn style(&self) -> WireStyle {
        self.style
    }

    pub fn curve_length(&self) -> f64 {
        self.curve_length
    }

    /// Control point offset for a gap between endpoints.
    ///
    /// Eases from 0 towards `curve_length` and never exceeds it.
    pub fn curve(&self, gap: f64) -> f64 {
        let gap = gap.max(0.0);
        let amount = 1.0 - 2f64.powf(-10.0 * gap / (self.curve_length * TAU));
        (amount * self.curve_length).clamp(0.0, self.curve_length)
    }

    /// Route from an output anchor to an input anchor, both in graph space.
    pub fn route(&self, output: PortAnchor, input: PortAnchor) -> CubicBezier {
        let start = output.point.0;
        let end = input.point.0;
        let gap = (end - start).abs();
        let curve = DVec2::new(self.curve(gap.x), self.curve(gap.y));

        let c1 = start + control_offset(PortSide::Output, output.orientation, curve);
        let c2 = end + control_offset(PortSide::Input, input.orientation, curve);
        CubicBezier::new(start, c1, c2, end)
    }

    /// The wire from `output` to `input` as consecutive curves, in the router's style.
    pub fn path(&self, output: PortAnchor, input: PortAnchor) -> Vec<CubicBezier> {
        match self.style {
            WireStyle::Direct => vec![self.route(output, input)],
            WireStyle::GridAligned => round_corners(&simplify(self.grid_points(output, input)), CORNER_RADIUS),
        }
    }

    /// Corner points of an orthogonal route that leaves and enters each port
    /// along its orientation. Detours run one cell clear of the ports.
    fn grid_points(&self, output: PortAnchor, input: PortAnchor) -> Vec<DVec2> {
        use PortOrientation::{Horizontal, Vertical};

        let cell = self.grid_cell;
        let snap = |value: f64| (value / cell).round() * cell;
        let start = output.point.0;
        let end = input.point.0;
        let p = DVec2::new;

        match (output.orientation, input.orientation) {
            (Horizontal, Horizontal) if end.x - start.x >= 2.0 * cell => {
                let mid_x = snap((start.x + end.x) / 2.0);
                vec![start, p(mid_x, start.y), p(mid_x, end.y), end]
            }
            (Horizontal, Horizontal) => {
                let mid_y = if (end.y - start.y).abs() >= 2.0 * cell {
                    snap((start.y + end.y) / 2.0)
                } else {
                    start.y.min(end.y) - cell
                };
                let out_x = start.x + cell;
                let in_x = end.x - cell;
                vec![start, p(out_x, start.y), p(out_x, mid_y), p(in_x, mid_y), p(in_x, end.y), end]
            }
            (Vertical, Vertical) if start.y - end.y >= 2.0 * cell => {
                let mid_y = snap((start.y + end.y) / 2.0);
                vec![start, p(start.x, mid_y), p(end.x, mid_y), end]
            }
            (Vertical, Vertical) => {
                let mid_x = if (end.x - start.x).abs() >= 2.0 * cell {
                    snap((start.x + end.x) / 2.0)
                } else {
                    start.x.max(end.x) + cell
                };
                let out_y = start.y - cell;
                let in_y = end.y + cell;
                vec![start, p(start.x, out_y), p(mid_x, out_y), p(mid_x, in_y), p(end.x, in_y), end]
            }
            (Vertical, Horizontal) if start.y - end.y >= cell && end.x - start.x >= cell => {
                vec![start, p(start.x, end.y), end]
            }
            (Vertical, Horizontal) => {
                let out_y = start.y - cell;
                let in_x = end.x - cell;
                vec![start, p(start.x, out_y), p(in_x, out_y), p(in_x, end.y), end]
            }
            (Horizontal, Vertical) if start.y - end.y >= cell && end.x - start.x >= cell => {
                vec![start, p(end.x, start.y), end]
            }
            (Horizontal, Vertical) => {
                let out_x = start.x + cell;
                let in_y = end.y + cell;
                vec![start, p(out_x, start.y), p(out_x, in_y), p(end.x, in_y), end]
            }
        }
    }
}

/// Drop repeated points and points in the middle of a straight run.
fn simplify(points: Vec<DVec2>) -> Vec<DVec2> {
    let mut kept: Vec<DVec2> = Vec::with_capacity(points.len());
    for point in points {
        if kept.last() == Some(&point) {
            continue;
        }
        if let [.., before, last] = kept.as_slice() {
            let incoming = *last - *before;
            let outgoing = point - *last;
            if incoming.perp_dot(outgoing).abs() < f64::EPSILON && incoming.dot(outgoing) > 0.0 {
                kept.pop();
            }
        }
        kept.push(point);
    }
    kept
}

/// Straight segments between `points`, each corner rounded by up to `radius`.
fn round_corners(points: &[DVec2], radius: f64) -> Vec<CubicBezier> {
    let (Some(&first), Some(&last)) = (points.first(), points.last()) else {
        return Vec::new();
    };
    let mut curves = Vec::with_capacity(points.len() * 2);
    let mut cursor = first;
    for window in points.windows(3) {
        let [before, corner, after] = [window[0], window[1], window[2]];
        let r = radius
            .min(corner.distance(before) / 2.0)
            .min(corner.distance(after) / 2.0);
        let entry = corner + (before - corner).normalize_or_zero() * r;
        let exit = corner + (after - corner).normalize_or_zero() * r;
        curves.push(CubicBezier::line(cursor, entry));
        curves.push(CubicBezier::new(
            entry,
            entry.lerp(corner, KAPPA),
            exit.lerp(corner, KAPPA),
            exit,
        ));
        cursor = exit;
    }
    curves.push(CubicBezier::line(cursor, last));
    curves
}

/// Outputs leave to the right (or upwards from a layer's top edge);
/// inputs arrive from the left (or from below a layer's bottom edge).
fn control_offset(side: PortSide, orientation: PortOrientation, curve: DVec2) -> DVec2 {
    match (side, orientation) {
        (PortSide::Output, PortOrientation::Horizontal) => DVec2::new(curve.x, 0.0),
        (PortSide::Output, PortOrientation::Vertical) => DVec2::new(0.0, -curve.y),
        (PortSide::Input, PortOrientation::Horizontal) => DVec2::new(-curve.x, 0.0),
        (PortSide::Input, PortOrientation::Vertical) => DVec2::new(0.0, curve.y),
    }
}

/// A wire ready to draw, in screen space.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WirePath {
    /// SVG path data for the whole wire.
    pub path: String,
    pub segments: Vec<CubicBezier>,
    pub data_type: DataType,
    /// Both ends attach to vertical layer ports.
    pub thick: bool,
    pub dashed: bool,
}

impl WirePath {
    pub fn new(segments: Vec<CubicBezier>, data_type: DataType, dashed: bool) -> Self {
        Self {
            path: svg_path(&segments),
            segments,
            data_type,
            thick: false,
            dashed,
        }
    }

    pub fn with_thick(mut self, thick: bool) -> Self {
        self.thick = thick;
        self
    }

    pub fn start(&self) -> Option<DVec2> {
        self.segments.first().map(|curve| curve.p0)
    }

    pub fn end(&self) -> Option<DVec2> {
        self.segments.last().map(|curve| curve.p3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn router() -> WireRouter {
        WireRouter::new(200.0)
    }

    #[test]
    fn horizontal_scenario_offsets_along_x_only() {
        let wire = router().route(PortAnchor::horizontal(100.0, 50.0), PortAnchor::horizontal(300.0, 50.0));
        let expected = 200.0 * (1.0 - 2f64.powf(-10.0 * 200.0 / (200.0 * TAU)));

        assert_eq!(wire.p0, DVec2::new(100.0, 50.0));
        assert_eq!(wire.p3, DVec2::new(300.0, 50.0));
        assert_eq!(wire.c1.y, 50.0);
        assert_eq!(wire.c2.y, 50.0);
        assert!((wire.c1.x - (100.0 + expected)).abs() < 1e-9);
        assert!((wire.c2.x - (300.0 - expected)).abs() < 1e-9);
    }

    #[test]
    fn zero_gap_is_a_straight_stub() {
        assert_eq!(router().curve(0.0), 0.0);
        let wire = router().route(PortAnchor::horizontal(10.0, 10.0), PortAnchor::horizontal(10.0, 10.0));
        assert_eq!(wire.c1, wire.p0);
        assert_eq!(wire.c2, wire.p3);
    }

    #[test]
    fn vertical_anchors_offset_along_y() {
        let wire = router().route(PortAnchor::vertical(0.0, 0.0), PortAnchor::vertical(0.0, 300.0));
        assert_eq!(wire.c1.x, 0.0);
        assert!(wire.c1.y < 0.0);
        assert!(wire.c2.y > 300.0);
    }

    #[test]
    fn moderate_gaps_stay_strictly_below_curve_length() {
        for gap in [1.0, 50.0, 500.0, 2000.0] {
            let curve = router().curve(gap);
            assert!(curve > 0.0 && curve < 200.0, "gap {gap} gave {curve}");
        }
    }

    #[test]
    fn svg_path_lists_all_points() {
        let curve = CubicBezier::new(DVec2::ZERO, DVec2::new(1.0, 0.0), DVec2::new(2.0, 1.0), DVec2::new(3.0, 1.0));
        assert_eq!(curve.to_svg_path(), "M0,0 C1,0 2,1 3,1");
    }

    #[test]
    fn split_halves_meet_on_the_curve() {
        let curve = CubicBezier::new(DVec2::ZERO, DVec2::new(10.0, 20.0), DVec2::new(30.0, -5.0), DVec2::new(40.0, 0.0));
        let (left, right) = curve.split(0.5);
        assert!((left.p3 - curve.eval(0.5)).length() < 1e-12);
        assert_eq!(left.p3, right.p0);
        assert!((left.eval(0.5) - curve.eval(0.25)).length() < 1e-9);
    }

    fn grid_router() -> WireRouter {
        router().with_style(WireStyle::GridAligned, 24.0)
    }

    /// Corner points of a grid-aligned path: where its straight runs end.
    fn runs(curves: &[CubicBezier]) -> Vec<(DVec2, DVec2)> {
        curves
            .iter()
            .filter(|curve| curve.c1 == curve.p0.lerp(curve.p3, 1.0 / 3.0))
            .map(|curve| (curve.p0, curve.p3))
            .collect()
    }

    #[test]
    fn direct_path_is_the_single_route() {
        let (output, input) = (PortAnchor::horizontal(0.0, 12.0), PortAnchor::horizontal(240.0, 60.0));
        assert_eq!(router().path(output, input), vec![router().route(output, input)]);
    }

    #[test]
    fn grid_aligned_same_row_is_one_straight_run() {
        let path = grid_router().path(PortAnchor::horizontal(120.0, 12.0), PortAnchor::horizontal(240.0, 12.0));
        assert_eq!(path, vec![CubicBezier::line(DVec2::new(120.0, 12.0), DVec2::new(240.0, 12.0))]);
    }

    #[test]
    fn grid_aligned_forward_wire_turns_on_a_grid_line() {
        let path = grid_router().path(PortAnchor::horizontal(120.0, 12.0), PortAnchor::horizontal(240.0, 108.0));
        assert_eq!(path.len(), 5);
        assert_eq!(path[0].p0, DVec2::new(120.0, 12.0));
        assert_eq!(path[4].p3, DVec2::new(240.0, 108.0));
        assert_eq!(
            runs(&path),
            vec![
                (DVec2::new(120.0, 12.0), DVec2::new(182.0, 12.0)),
                (DVec2::new(192.0, 22.0), DVec2::new(192.0, 98.0)),
                (DVec2::new(202.0, 108.0), DVec2::new(240.0, 108.0)),
            ]
        );
        for pair in path.windows(2) {
            assert_eq!(pair[0].p3, pair[1].p0);
        }
    }

    #[test]
    fn grid_aligned_backward_wire_detours_around_the_ports() {
        let path = grid_router().path(PortAnchor::horizontal(240.0, 12.0), PortAnchor::horizontal(120.0, 12.0));
        let corners: Vec<DVec2> = runs(&path).iter().map(|(from, _)| *from).collect();
        assert_eq!(corners.len(), 5);
        // The detour stays within one cell of the ports.
        assert!(path.iter().all(|curve| curve.hull_bounds().min.y >= -12.0));
        assert!(path.iter().all(|curve| curve.hull_bounds().max.x <= 264.0));
        assert!(path.iter().all(|curve| curve.hull_bounds().min.x >= 96.0));
    }

    #[test]
    fn grid_aligned_layer_stack_is_vertical() {
        let path = grid_router().path(PortAnchor::vertical(96.0, 144.0), PortAnchor::vertical(96.0, 48.0));
        assert_eq!(path, vec![CubicBezier::line(DVec2::new(96.0, 144.0), DVec2::new(96.0, 48.0))]);
    }

    #[test]
    fn short_runs_shrink_the_corner_radius() {
        let path = grid_router().path(PortAnchor::horizontal(0.0, 0.0), PortAnchor::horizontal(48.0, 8.0));
        // The middle vertical run is 8 long, so each corner keeps to 4 of it.
        assert_eq!(path[1].p3, DVec2::new(24.0, 4.0));
        assert_eq!(path.last().map(|curve| curve.p3), Some(DVec2::new(48.0, 8.0)));
    }

    #[test]
    fn wire_style_names() {
        assert_eq!(WireStyle::Direct.to_string(), "Direct");
        assert_eq!(WireStyle::GridAligned.to_string(), "Grid-Aligned");
        assert_eq!(serde_json::to_string(&WireStyle::GridAligned).unwrap(), "\"grid_aligned\"");
    }

    #[test]
    fn wire_path_chains_curves_into_one_svg_path() {
        let segments = vec![
            CubicBezier::line(DVec2::ZERO, DVec2::new(3.0, 0.0)),
            CubicBezier::line(DVec2::new(3.0, 0.0), DVec2::new(3.0, 6.0)),
        ];
        let wire = WirePath::new(segments, DataType::Number, false);
        assert!(wire.path.starts_with("M0,0 C1,0 2,0 3,0 C"));
        assert_eq!(wire.path.matches(" C").count(), 2);
        assert_eq!(wire.start(), Some(DVec2::ZERO));
        assert_eq!(wire.end(), Some(DVec2::new(3.0, 6.0)));
        assert!(!wire.thick);
    }

    proptest! {
        #[test]
        fn curve_is_bounded_and_monotonic(a in 0.0f64..1e6, b in 0.0f64..1e6) {
            let router = router();
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            let curve_low = router.curve(low);
            let curve_high = router.curve(high);
            prop_assert!(curve_low >= 0.0);
            prop_assert!(curve_high <= router.curve_length());
            prop_assert!(curve_low <= curve_high);
        }
    }
}
