use crate::ports::{NodeLayout, PortResolver};
use crate::wire::{CubicBezier, WireRouter};
use crate::CanvasConfig;
use api::Command;
use log::debug;
use node::{GraphSnapshot, GridDelta, NodeId, Rect};

const MAX_SUBDIVISION_DEPTH: u32 = 16;

/// Whether any point of `curve` lies inside `rect`.
///
/// Subdivides the curve until each piece's control polygon is either clear
/// of the box or smaller than `tolerance`. Zero-area boxes and curves that
/// collapse to a point never intersect.
pub fn curve_intersects_rect(curve: &CubicBezier, rect: &Rect, tolerance: f64) -> bool {
    if rect.is_empty() || curve.hull_bounds().size() == glam::DVec2::ZERO {
        return false;
    }
    subdivide(curve, rect, tolerance, 0)
}

fn subdivide(curve: &CubicBezier, rect: &Rect, tolerance: f64, depth: u32) -> bool {
    let hull = curve.hull_bounds();
    if !hull.intersects(rect) {
        return false;
    }
    if rect.contains_point(curve.p0) || rect.contains_point(curve.p3) {
        return true;
    }
    let size = hull.size();
    if size.x < tolerance && size.y < tolerance {
        return true;
    }
    if depth >= MAX_SUBDIVISION_DEPTH {
        return false;
    }
    let (left, right) = curve.split(0.5);
    subdivide(&left, rect, tolerance, depth + 1) || subdivide(&right, rect, tolerance, depth + 1)
}

/// Splices a single dropped node into the first wire its body crosses.
pub struct NodeInsertionDetector<'a> {
    snapshot: &'a GraphSnapshot,
    resolver: &'a PortResolver,
    config: &'a CanvasConfig,
}

impl<'a> NodeInsertionDetector<'a> {
    pub fn new(snapshot: &'a GraphSnapshot, resolver: &'a PortResolver, config: &'a CanvasConfig) -> Self {
        Self {
            snapshot,
            resolver,
            config,
        }
    }

    /// Commands that insert `node_id`, moved by `offset`, into a crossed link.
    ///
    /// Returns an empty list unless the node has an input and an output,
    /// neither of which is connected, and its body crosses some other link.
    pub fn detect(&self, node_id: NodeId, offset: GridDelta) -> Vec<Command> {
        let Some(node) = self.snapshot.node(node_id) else {
            return Vec::new();
        };
        if node.input_count() == 0 || node.output_count() == 0 {
            return Vec::new();
        }
        let wired = self.snapshot.incoming_link(node_id, 0).is_some()
            || self.snapshot.outgoing_links(node_id, 0).next().is_some();
        if wired {
            debug!("node {node_id} is already wired, skipping insertion");
            return Vec::new();
        }

        let bounds = NodeLayout::compute(node, offset, self.config).bounds;
        let router = WireRouter::from_config(self.config);

        let crossed = self.snapshot.links.iter().find(|link| {
            if link.touches(node_id) {
                return false;
            }
            self.resolver.link_anchors(link).is_some_and(|(output, input)| {
                router
                    .path(output, input)
                    .iter()
                    .any(|curve| curve_intersects_rect(curve, &bounds, self.config.intersection_tolerance))
            })
        });

        match crossed {
            Some(link) => {
                debug!(
                    "inserting {node_id} between {} and {}",
                    link.source_node, link.target_node
                );
                vec![
                    Command::connect(link.source_node, link.source_output, node_id, 0),
                    Command::connect(node_id, 0, link.target_node, link.target_input),
                ]
            }
            None => Vec::new(),
        }
    }
}
