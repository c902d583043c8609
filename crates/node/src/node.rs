use crate::coords::GridCell;
use crate::NodeId;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

/// The kind of data flowing through a port. Drives wire and port colouring.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
pub enum DataType {
    #[default]
    General,
    Number,
    Artboard,
    Graphic,
    Raster,
    Vector,
    Color,
    Gradient,
    Typography,
}

/// Which side of a node a port sits on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortSide {
    Input,
    Output,
}

/// A typed connection point. Its identity is its position in the node's
/// input or output list, see [`PortRef`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    pub data_type: DataType,
    #[serde(default)]
    pub name: String,
}

impl Port {
    pub fn new(data_type: DataType) -> Self {
        Self {
            data_type,
            name: String::new(),
        }
    }

    pub fn named(data_type: DataType, name: impl Into<String>) -> Self {
        Self {
            data_type,
            name: name.into(),
        }
    }
}

/// Addresses one port: two ports are the same iff node, side and index match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortRef {
    pub node: NodeId,
    pub side: PortSide,
    pub index: usize,
}

impl PortRef {
    pub fn input(node: NodeId, index: usize) -> Self {
        Self {
            node,
            side: PortSide::Input,
            index,
        }
    }

    pub fn output(node: NodeId, index: usize) -> Self {
        Self {
            node,
            side: PortSide::Output,
            index,
        }
    }
}

/// A node as the document presents it to the canvas.
///
/// When `primary_input` is set it is input 0 and `exposed_inputs[k]` is
/// input `k + 1`; otherwise `exposed_inputs[k]` is input `k`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    /// Top-left corner in grid cells.
    pub position: GridCell,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_input: Option<DataType>,
    #[serde(default)]
    pub exposed_inputs: Vec<Port>,
    #[serde(default)]
    pub outputs: Vec<Port>,
    /// Layer nodes stack vertically: their primary ports sit on the top and bottom edges.
    #[serde(default)]
    pub is_layer: bool,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub previewed: bool,
    /// Opaque renderable (e.g. SVG markup) supplied by the document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

impl Node {
    pub fn new(id: NodeId, display_name: impl Into<String>, position: GridCell) -> Self {
        Self {
            id,
            position,
            display_name: display_name.into(),
            primary_input: None,
            exposed_inputs: Vec::new(),
            outputs: Vec::new(),
            is_layer: false,
            disabled: false,
            previewed: false,
            thumbnail: None,
        }
    }

    pub fn with_primary_input(mut self, data_type: DataType) -> Self {
        self.primary_input = Some(data_type);
        self
    }

    pub fn with_input(mut self, data_type: DataType) -> Self {
        self.exposed_inputs.push(Port::new(data_type));
        self
    }

    pub fn with_output(mut self, data_type: DataType) -> Self {
        self.outputs.push(Port::new(data_type));
        self
    }

    pub fn as_layer(mut self) -> Self {
        self.is_layer = true;
        self
    }

    pub fn input_count(&self) -> usize {
        self.exposed_inputs.len() + usize::from(self.primary_input.is_some())
    }

    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }

    /// Data type of the input at `index`, accounting for the primary input.
    pub fn input_type(&self, index: usize) -> Option<DataType> {
        match (self.primary_input, index) {
            (Some(primary), 0) => Some(primary),
            (Some(_), index) => self.exposed_inputs.get(index - 1).map(|port| port.data_type),
            (None, index) => self.exposed_inputs.get(index).map(|port| port.data_type),
        }
    }

    pub fn output_type(&self, index: usize) -> Option<DataType> {
        self.outputs.get(index).map(|port| port.data_type)
    }

    pub fn has_port(&self, side: PortSide, index: usize) -> bool {
        match side {
            PortSide::Input => index < self.input_count(),
            PortSide::Output => index < self.output_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_input_takes_index_zero() {
        let node = Node::new(NodeId::from_u128(1), "Blend", GridCell::new(0, 0))
            .with_primary_input(DataType::Raster)
            .with_input(DataType::Number)
            .with_input(DataType::Color);

        assert_eq!(node.input_count(), 3);
        assert_eq!(node.input_type(0), Some(DataType::Raster));
        assert_eq!(node.input_type(1), Some(DataType::Number));
        assert_eq!(node.input_type(2), Some(DataType::Color));
        assert_eq!(node.input_type(3), None);
    }

    #[test]
    fn exposed_inputs_start_at_zero_without_primary() {
        let node = Node::new(NodeId::from_u128(1), "Value", GridCell::new(0, 0))
            .with_input(DataType::Number)
            .with_output(DataType::Number);

        assert_eq!(node.input_type(0), Some(DataType::Number));
        assert!(node.has_port(PortSide::Output, 0));
        assert!(!node.has_port(PortSide::Output, 1));
    }

    #[test]
    fn node_deserializes_with_defaults() {
        let json = r#"{
            "id": "00000000-0000-0000-0000-000000000007",
            "position": [3, 4],
            "display_name": "Circle",
            "outputs": [{"data_type": "Vector"}]
        }"#;
        let node: Node = serde_json::from_str(json).unwrap();
        assert_eq!(node.position, GridCell::new(3, 4));
        assert_eq!(node.output_type(0), Some(DataType::Vector));
        assert!(!node.disabled);
        assert_eq!(node.input_count(), 0);
    }
}
