//! Pointer gestures on the canvas.
//!
//! [`PointerInteractionController`] owns at most one [`DragSession`]. A
//! pointer-down classifies the gesture, moves update it, and the release
//! turns it into commands for the document. Nothing here mutates the
//! snapshot; previews are read back through [`PointerInteractionController::preview`].

use crate::input::{Key, Modifiers, MouseButton, PointerEvent};
use crate::insertion::NodeInsertionDetector;
use crate::ports::{HitTarget, PortResolver};
use crate::search::NodeSearchMenu;
use crate::{CanvasConfig, ViewportTransform};
use api::Command;
use glam::IVec2;
use log::{debug, trace};
use node::{GraphPoint, GraphSnapshot, GridCell, GridDelta, Link, NodeId, PortRef, PortSide, ScreenPoint};

/// The free end of a wire being dragged.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LinkEnd {
    /// Snapped to an input port.
    Port(PortRef),
    /// Following the cursor.
    Cursor(GraphPoint),
}

/// An existing link lifted off its input to be re-routed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PickedUpLink {
    /// Index into the snapshot's links when the drag began.
    pub index: usize,
    pub link: Link,
}

/// The gesture in progress.
#[derive(Clone, Debug, PartialEq)]
pub enum DragSession {
    Panning {
        last: ScreenPoint,
    },
    DraggingNodes {
        ids: Vec<NodeId>,
        /// The node under the pointer at press time.
        pressed: NodeId,
        /// Press position in graph space, so zooming mid-drag keeps the delta.
        start: GraphPoint,
        delta: GridDelta,
        /// Shift/Ctrl changed the selection at press time.
        selection_changed: bool,
    },
    DraggingLink {
        from: PortRef,
        to: LinkEnd,
        disconnecting: Option<PickedUpLink>,
    },
    BoxMenu {
        grid_position: GridCell,
    },
}

impl DragSession {
    pub fn name(&self) -> &'static str {
        match self {
            DragSession::Panning { .. } => "panning",
            DragSession::DraggingNodes { .. } => "dragging nodes",
            DragSession::DraggingLink { .. } => "dragging link",
            DragSession::BoxMenu { .. } => "box menu",
        }
    }

    fn is_cancellable(&self) -> bool {
        matches!(self, DragSession::DraggingNodes { .. } | DragSession::DraggingLink { .. })
    }
}

/// Everything a gesture may read or touch besides its own session.
pub struct InteractionContext<'a> {
    pub snapshot: &'a GraphSnapshot,
    pub resolver: &'a PortResolver,
    pub viewport: &'a mut ViewportTransform,
    pub menu: &'a mut NodeSearchMenu,
    /// The canvas's view of the selection, updated as selection commands are emitted.
    pub selection: &'a mut Vec<NodeId>,
    pub config: &'a CanvasConfig,
}

#[derive(Clone, Debug, Default)]
pub struct PointerInteractionController {
    session: Option<DragSession>,
}

impl PointerInteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Nodes being dragged and their current grid offset.
    pub fn preview(&self) -> Option<(&[NodeId], GridDelta)> {
        match &self.session {
            Some(DragSession::DraggingNodes { ids, delta, .. }) => Some((ids.as_slice(), *delta)),
            _ => None,
        }
    }

    /// The link hidden while it is re-routed. Matched by value, since the
    /// document may push snapshots that reorder links mid-drag.
    pub fn hidden_link(&self) -> Option<Link> {
        match &self.session {
            Some(DragSession::DraggingLink {
                disconnecting: Some(picked),
                ..
            }) => Some(picked.link),
            _ => None,
        }
    }

    /// Both ends of the wire being dragged.
    pub fn link_preview(&self) -> Option<(PortRef, LinkEnd)> {
        match &self.session {
            Some(DragSession::DraggingLink { from, to, .. }) => Some((*from, *to)),
            _ => None,
        }
    }

    pub fn pointer_down(&mut self, event: &PointerEvent, cx: &mut InteractionContext) -> Vec<Command> {
        if let Some(session) = &self.session {
            if event.button == MouseButton::Right && session.is_cancellable() {
                self.cancel();
            } else {
                debug!("ignored pointer-down while {}", session.name());
            }
            return Vec::new();
        }

        cx.menu.close();

        match event.button {
            MouseButton::Middle => {
                self.begin(DragSession::Panning { last: event.position });
                return Vec::new();
            }
            MouseButton::Right => {
                let cell = cx.viewport.screen_to_grid(event.position, cx.config.grid_cell);
                cx.menu.open(cell, event.position);
                self.begin(DragSession::BoxMenu { grid_position: cell });
                return Vec::new();
            }
            MouseButton::Left => {}
        }

        let point = cx.viewport.screen_to_graph(event.position);
        let mut target = cx.resolver.hit_test(point, cx.config.port_hit_radius);
        if let HitTarget::Port(port) = target {
            if self.grab_port(port, point, cx) {
                return Vec::new();
            }
            // An unconnected input is pressed like whatever lies under it.
            target = cx.resolver.node_at(point).map_or(HitTarget::Canvas, HitTarget::Node);
        }

        match target {
            HitTarget::Node(node) => self.press_node(node, event, cx),
            HitTarget::Canvas | HitTarget::Port(_) => {
                let mut commands = Vec::new();
                if !cx.selection.is_empty() {
                    cx.selection.clear();
                    commands.push(Command::SelectNodes { ids: Vec::new() });
                }
                self.begin(DragSession::Panning { last: event.position });
                commands
            }
        }
    }

    /// Start a wire drag from an output, or pick up the link on a connected input.
    fn grab_port(&mut self, port: PortRef, point: GraphPoint, cx: &InteractionContext) -> bool {
        match port.side {
            PortSide::Output => {
                let to = snap_target(point, port, cx);
                self.begin(DragSession::DraggingLink {
                    from: port,
                    to,
                    disconnecting: None,
                });
                true
            }
            PortSide::Input => {
                let Some((index, link)) = cx.snapshot.incoming_link(port.node, port.index) else {
                    return false;
                };
                let link = *link;
                let to = snap_target(point, link.source(), cx);
                self.begin(DragSession::DraggingLink {
                    from: link.source(),
                    to,
                    disconnecting: Some(PickedUpLink { index, link }),
                });
                true
            }
        }
    }

    fn press_node(&mut self, node: NodeId, event: &PointerEvent, cx: &mut InteractionContext) -> Vec<Command> {
        if event.modifiers.alt {
            debug!("toggling preview of {node}");
            return vec![Command::TogglePreview { node }];
        }

        let mut commands = Vec::new();
        let mut selection_changed = false;
        if event.modifiers.toggles_selection() {
            match cx.selection.iter().position(|id| *id == node) {
                Some(index) => {
                    cx.selection.remove(index);
                }
                None => cx.selection.push(node),
            }
            selection_changed = true;
            commands.push(Command::SelectNodes {
                ids: cx.selection.clone(),
            });
        } else if !cx.selection.contains(&node) {
            *cx.selection = vec![node];
            commands.push(Command::SelectNodes { ids: vec![node] });
        }

        self.begin(DragSession::DraggingNodes {
            ids: cx.selection.clone(),
            pressed: node,
            start: cx.viewport.screen_to_graph(event.position),
            delta: GridDelta::ZERO,
            selection_changed,
        });
        commands
    }

    pub fn pointer_move(&mut self, event: &PointerEvent, cx: &mut InteractionContext) {
        let Some(session) = &mut self.session else {
            return;
        };

        match session {
            DragSession::Panning { last } => {
                cx.viewport.pan(event.position - *last);
                *last = event.position;
            }
            DragSession::DraggingNodes { start, delta, .. } => {
                let snapped = grid_delta(*start, event.position, cx);
                if snapped != *delta {
                    trace!("node drag delta {:?}", snapped.0);
                    *delta = snapped;
                }
            }
            DragSession::DraggingLink { from, to, .. } => {
                let point = cx.viewport.screen_to_graph(event.position);
                *to = snap_target(point, *from, cx);
            }
            DragSession::BoxMenu { .. } => {}
        }
    }

    pub fn pointer_up(&mut self, event: &PointerEvent, cx: &mut InteractionContext) -> Vec<Command> {
        let Some(session) = self.session.take() else {
            return Vec::new();
        };
        debug!("finished {}", session.name());

        match session {
            DragSession::Panning { .. } | DragSession::BoxMenu { .. } => Vec::new(),
            DragSession::DraggingLink {
                from, disconnecting, ..
            } => {
                let point = cx.viewport.screen_to_graph(event.position);
                release_link(from, snap_target(point, from, cx), disconnecting)
            }
            DragSession::DraggingNodes {
                ids,
                pressed,
                start,
                selection_changed,
                ..
            } => {
                let delta = grid_delta(start, event.position, cx);
                if delta.is_zero() {
                    if selection_changed || cx.selection.as_slice() == [pressed] {
                        return Vec::new();
                    }
                    *cx.selection = vec![pressed];
                    return vec![Command::SelectNodes { ids: vec![pressed] }];
                }
                if ids.is_empty() {
                    return Vec::new();
                }

                // The move applies to the document's selection, which may have
                // changed since the press.
                let mut commands = Vec::new();
                if *cx.selection != ids {
                    debug!("reselecting {} dragged nodes", ids.len());
                    *cx.selection = ids.clone();
                    commands.push(Command::SelectNodes { ids: ids.clone() });
                }
                commands.push(Command::MoveSelectedNodes {
                    dx: delta.dx(),
                    dy: delta.dy(),
                });
                if let [node] = ids.as_slice() {
                    let detector = NodeInsertionDetector::new(cx.snapshot, cx.resolver, cx.config);
                    commands.extend(detector.detect(*node, delta));
                }
                commands
            }
        }
    }

    /// Abort a node or link drag without emitting anything.
    pub fn cancel(&mut self) -> bool {
        if !self.session.as_ref().is_some_and(DragSession::is_cancellable) {
            return false;
        }
        if let Some(session) = self.session.take() {
            debug!("cancelled {}", session.name());
        }
        true
    }

    pub fn key_down(&mut self, key: Key, modifiers: Modifiers, cx: &mut InteractionContext) -> Vec<Command> {
        if key == Key::Escape {
            if !self.cancel() {
                cx.menu.close();
            }
            return Vec::new();
        }
        if let Some(session) = &self.session {
            debug!("ignored {key:?} while {}", session.name());
            return Vec::new();
        }
        if cx.menu.is_open() || cx.selection.is_empty() {
            return Vec::new();
        }

        match key {
            Key::Delete | Key::Backspace => vec![Command::DeleteSelectedNodes],
            Key::Character(c) if modifiers.ctrl && c.eq_ignore_ascii_case(&'d') => {
                vec![Command::DuplicateSelectedNodes]
            }
            Key::Character(c) if modifiers.ctrl && c.eq_ignore_ascii_case(&'h') => vec![Command::ToggleHidden],
            _ => Vec::new(),
        }
    }

    fn begin(&mut self, session: DragSession) {
        debug!("began {}", session.name());
        self.session = Some(session);
    }
}

/// Grid-snapped offset from a graph-space press to the current pointer.
fn grid_delta(start: GraphPoint, current: ScreenPoint, cx: &InteractionContext) -> GridDelta {
    let cells = (cx.viewport.screen_to_graph(current).0 - start.0) / cx.config.grid_cell;
    GridDelta(IVec2::new(cells.x.round() as i32, cells.y.round() as i32))
}

/// Snap to an input under `point`, never one on the wire's own source node.
fn snap_target(point: GraphPoint, from: PortRef, cx: &InteractionContext) -> LinkEnd {
    match cx.resolver.input_at(point, cx.config.port_hit_radius, from.node) {
        Some(port) => LinkEnd::Port(port),
        None => LinkEnd::Cursor(point),
    }
}

fn release_link(from: PortRef, to: LinkEnd, disconnecting: Option<PickedUpLink>) -> Vec<Command> {
    match (to, disconnecting) {
        (LinkEnd::Port(target), Some(picked)) if picked.link.target() == target => Vec::new(),
        (LinkEnd::Port(target), Some(picked)) => vec![
            Command::disconnect(picked.link.target_node, picked.link.target_input),
            Command::connect(from.node, from.index, target.node, target.index),
        ],
        (LinkEnd::Port(target), None) => vec![Command::connect(from.node, from.index, target.node, target.index)],
        (LinkEnd::Cursor(_), Some(picked)) => {
            vec![Command::disconnect(picked.link.target_node, picked.link.target_input)]
        }
        (LinkEnd::Cursor(_), None) => Vec::new(),
    }
}
