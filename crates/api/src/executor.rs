//! Command execution against a graph snapshot.
//!
//! This is the reference behaviour of the document layer: the canvas only
//! emits commands, and whoever owns the document applies them and pushes a
//! fresh snapshot back. The CLI, the demo app and the tests use this
//! executor to close that loop.

use crate::{Command, CommandResult};
use log::debug;
use node::{GraphSnapshot, GridCell, GridDelta, Link, NodeId, PortSide};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Grid offset applied when duplicating, repeated until the copies land on free cells.
const DUPLICATE_SHIFT: i32 = 2;

/// Why a command could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecuteError {
    #[error("no node {0} in the graph")]
    UnknownNode(NodeId),
    #[error("node {node} has no {side:?} port {index}")]
    UnknownPort { node: NodeId, side: PortSide, index: usize },
    #[error("node {0} cannot be connected to itself")]
    SelfConnection(NodeId),
    #[error("no node type named {0:?} in the catalog")]
    UnknownNodeType(String),
}

/// Execute a command against a snapshot.
pub fn execute_command(snapshot: &mut GraphSnapshot, command: Command) -> CommandResult {
    debug!("executing {:?}", command);
    match execute_command_inner(snapshot, command) {
        Ok(result) => result,
        Err(err) => CommandResult::error(err.to_string()),
    }
}

/// Execute commands in order, returning one result per command.
pub fn execute_commands(
    snapshot: &mut GraphSnapshot,
    commands: impl IntoIterator<Item = Command>,
) -> Vec<CommandResult> {
    commands
        .into_iter()
        .map(|command| execute_command(snapshot, command))
        .collect()
}

fn execute_command_inner(snapshot: &mut GraphSnapshot, command: Command) -> Result<CommandResult, ExecuteError> {
    match command {
        Command::SelectNodes { ids } => {
            snapshot.selection = ids
                .into_iter()
                .filter(|id| snapshot.node(*id).is_some())
                .collect();
            Ok(CommandResult::success())
        }

        Command::MoveSelectedNodes { dx, dy } => {
            let delta = GridDelta::new(dx, dy);
            let selection: HashSet<NodeId> = snapshot.selection.iter().copied().collect();
            let mut modified = Vec::new();
            for node in &mut snapshot.nodes {
                if selection.contains(&node.id) {
                    node.position += delta;
                    modified.push(node.id);
                }
            }
            Ok(CommandResult::modified(modified))
        }

        Command::ConnectNodes {
            source_node,
            source_output,
            target_node,
            target_input,
        } => {
            if source_node == target_node {
                return Err(ExecuteError::SelfConnection(source_node));
            }
            require_port(snapshot, source_node, PortSide::Output, source_output)?;
            require_port(snapshot, target_node, PortSide::Input, target_input)?;

            // An input has a single writer: the new link replaces the old one.
            snapshot
                .links
                .retain(|link| !(link.target_node == target_node && link.target_input == target_input));
            snapshot
                .links
                .push(Link::new(source_node, source_output, target_node, target_input));
            Ok(CommandResult::modified(vec![source_node, target_node]))
        }

        Command::DisconnectNode {
            target_node,
            target_input,
        } => {
            require_port(snapshot, target_node, PortSide::Input, target_input)?;
            let before = snapshot.links.len();
            snapshot
                .links
                .retain(|link| !(link.target_node == target_node && link.target_input == target_input));
            if snapshot.links.len() == before {
                return Ok(CommandResult::success());
            }
            Ok(CommandResult::modified(vec![target_node]))
        }

        Command::CreateNode { type_name, x, y } => {
            let node_type = snapshot
                .node_types
                .iter()
                .find(|node_type| node_type.name == type_name)
                .ok_or(ExecuteError::UnknownNodeType(type_name))?;
            let node = node_type.instantiate(NodeId::new(), GridCell::new(x, y));
            let id = node.id;
            snapshot.nodes.push(node);
            snapshot.selection = vec![id];
            Ok(CommandResult::created(vec![id]))
        }

        Command::TogglePreview { node } => {
            let previewed = !snapshot.node(node).ok_or(ExecuteError::UnknownNode(node))?.previewed;
            // Only one node can be the previewed output at a time.
            for other in &mut snapshot.nodes {
                other.previewed = other.id == node && previewed;
            }
            Ok(CommandResult::modified(vec![node]))
        }

        Command::DeleteSelectedNodes => {
            let doomed: HashSet<NodeId> = snapshot.selection.drain(..).collect();
            snapshot.links.retain(|link| {
                !doomed.contains(&link.source_node) && !doomed.contains(&link.target_node)
            });
            let mut deleted = Vec::new();
            snapshot.nodes.retain(|node| {
                let keep = !doomed.contains(&node.id);
                if !keep {
                    deleted.push(node.id);
                }
                keep
            });
            Ok(CommandResult::deleted(deleted))
        }

        Command::DuplicateSelectedNodes => Ok(duplicate_selected(snapshot)),

        Command::ToggleHidden => {
            let selection: HashSet<NodeId> = snapshot.selection.iter().copied().collect();
            let any_hidden = snapshot
                .nodes
                .iter()
                .any(|node| selection.contains(&node.id) && node.disabled);
            let mut modified = Vec::new();
            for node in &mut snapshot.nodes {
                if selection.contains(&node.id) {
                    node.disabled = !any_hidden;
                    modified.push(node.id);
                }
            }
            Ok(CommandResult::modified(modified))
        }
    }
}

fn require_port(snapshot: &GraphSnapshot, node: NodeId, side: PortSide, index: usize) -> Result<(), ExecuteError> {
    let found = snapshot.node(node).ok_or(ExecuteError::UnknownNode(node))?;
    if !found.has_port(side, index) {
        return Err(ExecuteError::UnknownPort { node, side, index });
    }
    Ok(())
}

fn duplicate_selected(snapshot: &mut GraphSnapshot) -> CommandResult {
    let selection: HashSet<NodeId> = snapshot.selection.iter().copied().collect();
    let originals: Vec<_> = snapshot
        .nodes
        .iter()
        .filter(|node| selection.contains(&node.id))
        .cloned()
        .collect();
    if originals.is_empty() {
        return CommandResult::success();
    }

    // Shift the copies until at least one of them is not on top of an existing node
    let mut shift = GridDelta::ZERO;
    while originals.iter().all(|original| {
        snapshot
            .nodes
            .iter()
            .any(|existing| existing.position == original.position + shift)
    }) {
        shift = GridDelta::new(shift.dx() + DUPLICATE_SHIFT, shift.dy() + DUPLICATE_SHIFT);
    }

    let new_ids: HashMap<NodeId, NodeId> = originals.iter().map(|node| (node.id, NodeId::new())).collect();
    let copied_links: Vec<Link> = snapshot
        .links
        .iter()
        .filter_map(|link| {
            let source = new_ids.get(&link.source_node)?;
            let target = new_ids.get(&link.target_node)?;
            Some(Link::new(*source, link.source_output, *target, link.target_input))
        })
        .collect();

    let mut created = Vec::new();
    for mut node in originals {
        node.id = new_ids[&node.id];
        node.position += shift;
        node.previewed = false;
        created.push(node.id);
        snapshot.nodes.push(node);
    }
    snapshot.links.extend(copied_links);
    snapshot.selection = created.clone();

    CommandResult::created(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use node::{DataType, Node, NodeType};

    fn id(n: u128) -> NodeId {
        NodeId::from_u128(n)
    }

    fn filter(n: u128, x: i32) -> Node {
        Node::new(id(n), format!("Filter {n}"), GridCell::new(x, 0))
            .with_primary_input(DataType::Raster)
            .with_output(DataType::Raster)
    }

    fn chain() -> GraphSnapshot {
        GraphSnapshot::new()
            .with_node(filter(1, 0))
            .with_node(filter(2, 10))
            .with_node(filter(3, 20))
            .with_link(Link::new(id(1), 0, id(2), 0))
    }

    #[test]
    fn connect_replaces_existing_incoming_link() {
        let mut snapshot = chain();
        let result = execute_command(&mut snapshot, Command::connect(id(3), 0, id(2), 0));

        assert!(result.is_success());
        assert_eq!(snapshot.links, vec![Link::new(id(3), 0, id(2), 0)]);
    }

    #[test]
    fn connect_rejects_missing_port() {
        let mut snapshot = chain();
        let result = execute_command(&mut snapshot, Command::connect(id(1), 4, id(3), 0));

        assert!(!result.is_success());
        assert_eq!(snapshot.links.len(), 1);
    }

    #[test]
    fn connect_rejects_self_link() {
        let mut snapshot = chain();
        let result = execute_command(&mut snapshot, Command::connect(id(3), 0, id(3), 0));
        assert_eq!(result, CommandResult::error(ExecuteError::SelfConnection(id(3)).to_string()));
    }

    #[test]
    fn disconnect_removes_incoming_link() {
        let mut snapshot = chain();
        execute_command(&mut snapshot, Command::disconnect(id(2), 0));
        assert!(snapshot.links.is_empty());
    }

    #[test]
    fn move_selected_shifts_only_selection() {
        let mut snapshot = chain();
        execute_commands(
            &mut snapshot,
            [
                Command::SelectNodes { ids: vec![id(2)] },
                Command::MoveSelectedNodes { dx: 1, dy: -3 },
            ],
        );
        assert_eq!(snapshot.node(id(2)).unwrap().position, GridCell::new(11, -3));
        assert_eq!(snapshot.node(id(1)).unwrap().position, GridCell::new(0, 0));
    }

    #[test]
    fn create_node_uses_catalog_ports_and_selects_it() {
        let mut snapshot = chain();
        snapshot
            .node_types
            .push(NodeType::new("Blur", "Raster").with_ports(&[DataType::Raster], &[DataType::Raster]));

        let result = execute_command(
            &mut snapshot,
            Command::CreateNode {
                type_name: "Blur".into(),
                x: 5,
                y: 6,
            },
        );
        let CommandResult::Success { created, .. } = result else {
            panic!("expected success");
        };
        let node = snapshot.node(created[0]).unwrap();
        assert_eq!(node.position, GridCell::new(5, 6));
        assert_eq!(node.primary_input, Some(DataType::Raster));
        assert_eq!(snapshot.selection, created);
    }

    #[test]
    fn create_node_rejects_unknown_type() {
        let mut snapshot = chain();
        let result = execute_command(
            &mut snapshot,
            Command::CreateNode {
                type_name: "Nope".into(),
                x: 0,
                y: 0,
            },
        );
        assert!(!result.is_success());
        assert_eq!(snapshot.nodes.len(), 3);
    }

    #[test]
    fn toggle_preview_keeps_single_preview() {
        let mut snapshot = chain();
        execute_command(&mut snapshot, Command::TogglePreview { node: id(1) });
        execute_command(&mut snapshot, Command::TogglePreview { node: id(2) });
        let previewed: Vec<_> = snapshot.nodes.iter().filter(|n| n.previewed).map(|n| n.id).collect();
        assert_eq!(previewed, vec![id(2)]);

        execute_command(&mut snapshot, Command::TogglePreview { node: id(2) });
        assert!(snapshot.nodes.iter().all(|n| !n.previewed));
    }

    #[test]
    fn delete_selected_removes_touching_links() {
        let mut snapshot = chain();
        snapshot.selection = vec![id(2)];
        execute_command(&mut snapshot, Command::DeleteSelectedNodes);
        assert!(snapshot.node(id(2)).is_none());
        assert!(snapshot.links.is_empty());
        assert!(snapshot.selection.is_empty());
    }

    #[test]
    fn duplicate_copies_internal_links_and_shifts() {
        let mut snapshot = chain();
        snapshot.selection = vec![id(1), id(2)];
        execute_command(&mut snapshot, Command::DuplicateSelectedNodes);

        assert_eq!(snapshot.nodes.len(), 5);
        assert_eq!(snapshot.links.len(), 2);
        let copies: Vec<_> = snapshot.selection.iter().map(|id| snapshot.node(*id).unwrap()).collect();
        assert_eq!(copies[0].position, GridCell::new(2, 2));
        assert_eq!(copies[1].position, GridCell::new(12, 2));
        assert_eq!(snapshot.links[1].source_node, copies[0].id);
        assert_eq!(snapshot.links[1].target_node, copies[1].id);
    }

    #[test]
    fn toggle_hidden_shows_when_any_hidden() {
        let mut snapshot = chain();
        snapshot.selection = vec![id(1), id(2)];
        snapshot.node_mut(id(1)).unwrap().disabled = true;

        execute_command(&mut snapshot, Command::ToggleHidden);
        assert!(!snapshot.node(id(1)).unwrap().disabled);
        assert!(!snapshot.node(id(2)).unwrap().disabled);

        execute_command(&mut snapshot, Command::ToggleHidden);
        assert!(snapshot.node(id(1)).unwrap().disabled);
        assert!(snapshot.node(id(2)).unwrap().disabled);
    }
}
