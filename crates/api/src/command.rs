//! Canvas commands - every mutation the canvas asks the document to perform.
//!
//! Commands are intent-based and fire-and-forget: the canvas never applies
//! them itself and only sees their effect through the next snapshot. The
//! document layer handles propagation, undo recording and re-execution.

use node::NodeId;
use serde::{Deserialize, Serialize};

/// A command emitted by the canvas for the document to execute.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    // === Selection ===
    /// Replace the selection.
    SelectNodes { ids: Vec<NodeId> },

    // === Transform ===
    /// Move every selected node by a delta in grid cells.
    MoveSelectedNodes { dx: i32, dy: i32 },

    // === Links ===
    /// Connect an output to an input, replacing the input's existing link.
    ConnectNodes {
        source_node: NodeId,
        source_output: usize,
        target_node: NodeId,
        target_input: usize,
    },

    /// Remove the link feeding an input.
    DisconnectNode { target_node: NodeId, target_input: usize },

    // === Nodes ===
    /// Create a node of a catalog type at a grid cell.
    CreateNode { type_name: String, x: i32, y: i32 },

    /// Make a node the previewed output, or end its preview.
    TogglePreview { node: NodeId },

    /// Delete the selected nodes and every link touching them.
    DeleteSelectedNodes,

    /// Duplicate the selected nodes (and links between them) at an offset.
    DuplicateSelectedNodes,

    /// Disable the selected nodes, or enable them if any is disabled.
    ToggleHidden,
}

impl Command {
    /// The connect command for a source output and target input.
    pub fn connect(source_node: NodeId, source_output: usize, target_node: NodeId, target_input: usize) -> Self {
        Self::ConnectNodes {
            source_node,
            source_output,
            target_node,
            target_input,
        }
    }

    pub fn disconnect(target_node: NodeId, target_input: usize) -> Self {
        Self::DisconnectNode {
            target_node,
            target_input,
        }
    }
}

/// Result of executing a command.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CommandResult {
    /// Command succeeded.
    Success {
        /// IDs of nodes created, if any.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        created: Vec<NodeId>,
        /// IDs of nodes modified, if any.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        modified: Vec<NodeId>,
        /// IDs of nodes deleted, if any.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        deleted: Vec<NodeId>,
    },
    /// Command failed.
    Error { message: String },
}

impl CommandResult {
    pub fn success() -> Self {
        Self::Success {
            created: vec![],
            modified: vec![],
            deleted: vec![],
        }
    }

    pub fn created(ids: Vec<NodeId>) -> Self {
        Self::Success {
            created: ids,
            modified: vec![],
            deleted: vec![],
        }
    }

    pub fn modified(ids: Vec<NodeId>) -> Self {
        Self::Success {
            created: vec![],
            modified: ids,
            deleted: vec![],
        }
    }

    pub fn deleted(ids: Vec<NodeId>) -> Self {
        Self::Success {
            created: vec![],
            modified: vec![],
            deleted: ids,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_serializes_with_type_field() {
        let cmd = Command::connect(NodeId::from_u128(1), 0, NodeId::from_u128(2), 1);
        let json: serde_json::Value = serde_json::to_value(&cmd).unwrap();

        assert_eq!(json["type"], "connect_nodes");
        assert_eq!(json["source_output"], 0);
        assert_eq!(json["target_input"], 1);
        assert_eq!(json["target_node"], "00000000-0000-0000-0000-000000000002");
    }

    #[test]
    fn unit_commands_serialize_as_bare_tag() {
        let json = serde_json::to_value(&Command::DeleteSelectedNodes).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "delete_selected_nodes" }));
    }

    #[test]
    fn create_node_deserializes_from_script_json() {
        let json = r#"{ "type": "create_node", "type_name": "Blur", "x": 4, "y": -2 }"#;
        let cmd: Command = serde_json::from_str(json).unwrap();
        assert_eq!(
            cmd,
            Command::CreateNode {
                type_name: "Blur".into(),
                x: 4,
                y: -2
            }
        );
    }

    #[test]
    fn error_result_serializes_status() {
        let json = serde_json::to_value(CommandResult::error("no such node")).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["message"], "no such node");
    }

    #[test]
    fn success_result_omits_empty_lists() {
        let json = serde_json::to_value(CommandResult::modified(vec![NodeId::from_u128(3)])).unwrap();
        assert_eq!(json["status"], "success");
        assert!(json.get("created").is_none());
        assert_eq!(json["modified"].as_array().unwrap().len(), 1);
    }
}
