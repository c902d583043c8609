//! Node layout and port anchors.
//!
//! Port positions are a pure function of a node, its (possibly previewed)
//! grid position and the config, so wires can be routed without asking a
//! renderer where anything ended up.

use crate::wire::PortAnchor;
use crate::CanvasConfig;
use glam::DVec2;
use log::trace;
use node::{GraphPoint, GraphSnapshot, GridDelta, Link, Node, NodeId, PortRef, PortSide, Rect};
use std::collections::HashMap;

/// Graph-space geometry of one node.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeLayout {
    pub id: NodeId,
    pub bounds: Rect,
    pub inputs: Vec<PortAnchor>,
    pub outputs: Vec<PortAnchor>,
}

impl NodeLayout {
    pub fn compute(node: &Node, offset: GridDelta, config: &CanvasConfig) -> Self {
        let cell = config.grid_cell;
        let origin = (node.position + offset).to_graph(cell).0;

        if node.is_layer {
            let size = DVec2::new(f64::from(config.layer_width_cells) * cell, 2.0 * cell);
            let bounds = Rect::from_origin_size(origin, size);
            let center_x = bounds.center().x;
            let mid_y = bounds.center().y;

            let inputs = (0..node.input_count())
                .map(|index| match index {
                    0 => PortAnchor::vertical(center_x, bounds.max.y),
                    _ => PortAnchor::horizontal(bounds.min.x, mid_y),
                })
                .collect();
            let outputs = (0..node.output_count())
                .map(|index| match index {
                    0 => PortAnchor::vertical(center_x, bounds.min.y),
                    _ => PortAnchor::horizontal(bounds.max.x, origin.y + (index as f64 - 0.5) * cell),
                })
                .collect();

            return Self {
                id: node.id,
                bounds,
                inputs,
                outputs,
            };
        }

        let rows = node.input_count().max(node.output_count()).max(1);
        let size = DVec2::new(f64::from(config.node_width_cells) * cell, rows as f64 * cell);
        let bounds = Rect::from_origin_size(origin, size);
        let row_y = |index: usize| origin.y + (index as f64 + 0.5) * cell;

        Self {
            id: node.id,
            bounds,
            inputs: (0..node.input_count())
                .map(|index| PortAnchor::horizontal(bounds.min.x, row_y(index)))
                .collect(),
            outputs: (0..node.output_count())
                .map(|index| PortAnchor::horizontal(bounds.max.x, row_y(index)))
                .collect(),
        }
    }

    pub fn port(&self, side: PortSide, index: usize) -> Option<PortAnchor> {
        match side {
            PortSide::Input => self.inputs.get(index).copied(),
            PortSide::Output => self.outputs.get(index).copied(),
        }
    }

    fn ports(&self) -> impl Iterator<Item = (PortSide, usize, PortAnchor)> + '_ {
        let inputs = self.inputs.iter().enumerate().map(|(i, a)| (PortSide::Input, i, *a));
        let outputs = self.outputs.iter().enumerate().map(|(i, a)| (PortSide::Output, i, *a));
        inputs.chain(outputs)
    }
}

/// Graph-space anchor of a port, or `None` when the node has no such port.
pub fn resolve_port_anchor(node: &Node, side: PortSide, index: usize, config: &CanvasConfig) -> Option<PortAnchor> {
    NodeLayout::compute(node, GridDelta::ZERO, config).port(side, index)
}

/// What lies under a graph-space point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitTarget {
    Port(PortRef),
    Node(NodeId),
    Canvas,
}

/// Layout of every node in a snapshot, back to front.
///
/// Rebuilt when node positions or the drag preview change; the viewport
/// does not affect it since everything is in graph space.
#[derive(Clone, Debug, Default)]
pub struct PortResolver {
    layouts: Vec<NodeLayout>,
    index: HashMap<NodeId, usize>,
}

impl PortResolver {
    /// Lay out `snapshot`, shifting `preview.0` by `preview.1` cells.
    pub fn build(snapshot: &GraphSnapshot, preview: Option<(&[NodeId], GridDelta)>, config: &CanvasConfig) -> Self {
        let layouts: Vec<NodeLayout> = snapshot
            .nodes
            .iter()
            .map(|node| {
                let offset = match preview {
                    Some((ids, delta)) if ids.contains(&node.id) => delta,
                    _ => GridDelta::ZERO,
                };
                NodeLayout::compute(node, offset, config)
            })
            .collect();
        let index = layouts.iter().enumerate().map(|(i, layout)| (layout.id, i)).collect();
        trace!("laid out {} nodes", layouts.len());
        Self { layouts, index }
    }

    pub fn layout(&self, id: NodeId) -> Option<&NodeLayout> {
        self.index.get(&id).map(|&i| &self.layouts[i])
    }

    pub fn layouts(&self) -> &[NodeLayout] {
        &self.layouts
    }

    pub fn anchor(&self, port: PortRef) -> Option<PortAnchor> {
        self.layout(port.node)?.port(port.side, port.index)
    }

    /// Output and input anchors of a link. `None` when either end is gone.
    pub fn link_anchors(&self, link: &Link) -> Option<(PortAnchor, PortAnchor)> {
        Some((self.anchor(link.source())?, self.anchor(link.target())?))
    }

    /// The nearest port within `radius` of `point`, preferring topmost nodes.
    pub fn port_at(&self, point: GraphPoint, radius: f64) -> Option<PortRef> {
        self.port_matching(point, radius, |_| true)
    }

    /// Like [`Self::port_at`], but only considers inputs of nodes other than `exclude`.
    pub fn input_at(&self, point: GraphPoint, radius: f64, exclude: NodeId) -> Option<PortRef> {
        self.port_matching(point, radius, |port| port.side == PortSide::Input && port.node != exclude)
    }

    fn port_matching(&self, point: GraphPoint, radius: f64, accept: impl Fn(PortRef) -> bool) -> Option<PortRef> {
        self.layouts.iter().rev().find_map(|layout| {
            layout
                .ports()
                .map(|(side, index, anchor)| {
                    let port = PortRef {
                        node: layout.id,
                        side,
                        index,
                    };
                    (port, anchor.point.0.distance(point.0))
                })
                .filter(|(port, distance)| *distance <= radius && accept(*port))
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .map(|(port, _)| port)
        })
    }

    /// The topmost node whose body contains `point`.
    pub fn node_at(&self, point: GraphPoint) -> Option<NodeId> {
        self.layouts
            .iter()
            .rev()
            .find(|layout| layout.bounds.contains_point(point.0))
            .map(|layout| layout.id)
    }

    /// Ports first, then bodies, then empty canvas.
    pub fn hit_test(&self, point: GraphPoint, radius: f64) -> HitTarget {
        if let Some(port) = self.port_at(point, radius) {
            HitTarget::Port(port)
        } else if let Some(node) = self.node_at(point) {
            HitTarget::Node(node)
        } else {
            HitTarget::Canvas
        }
    }
}
