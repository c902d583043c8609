use crate::coords::GridCell;
use crate::node::{DataType, Node, Port, PortRef};
use crate::NodeId;
use serde::{Deserialize, Serialize};

/// A directed edge from one node's output to another node's input.
///
/// An input has at most one incoming link; an output may fan out to many.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Link {
    pub source_node: NodeId,
    pub source_output: usize,
    pub target_node: NodeId,
    pub target_input: usize,
}

impl Link {
    pub fn new(source_node: NodeId, source_output: usize, target_node: NodeId, target_input: usize) -> Self {
        Self {
            source_node,
            source_output,
            target_node,
            target_input,
        }
    }

    pub fn source(&self) -> PortRef {
        PortRef::output(self.source_node, self.source_output)
    }

    pub fn target(&self) -> PortRef {
        PortRef::input(self.target_node, self.target_input)
    }

    pub fn touches(&self, node: NodeId) -> bool {
        self.source_node == node || self.target_node == node
    }
}

/// An entry in the node-type catalog offered by the search menu.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeType {
    pub name: String,
    pub category: String,
    /// Input types of a freshly created node; the first becomes its primary input.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub input_types: Vec<DataType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub output_types: Vec<DataType>,
}

impl NodeType {
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            input_types: Vec::new(),
            output_types: Vec::new(),
        }
    }

    pub fn with_ports(mut self, inputs: &[DataType], outputs: &[DataType]) -> Self {
        self.input_types = inputs.to_vec();
        self.output_types = outputs.to_vec();
        self
    }

    /// Builds the node the document would create for this type.
    pub fn instantiate(&self, id: NodeId, position: GridCell) -> Node {
        let mut node = Node::new(id, self.name.clone(), position);
        let mut inputs = self.input_types.iter().copied();
        node.primary_input = inputs.next();
        node.exposed_inputs = inputs.map(Port::new).collect();
        node.outputs = self.output_types.iter().copied().map(Port::new).collect();
        node
    }
}

/// Read-only view of the document's graph, pushed into the canvas.
///
/// Node order is z-order (back to front).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(default)]
    pub node_types: Vec<NodeType>,
    #[serde(default)]
    pub selection: Vec<NodeId>,
}

impl GraphSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_node(mut self, node: Node) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn with_link(mut self, link: Link) -> Self {
        self.links.push(link);
        self
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|node| node.id == id)
    }

    /// The link feeding `input`, with its index in `links`.
    pub fn incoming_link(&self, node: NodeId, input: usize) -> Option<(usize, &Link)> {
        self.links
            .iter()
            .enumerate()
            .find(|(_, link)| link.target_node == node && link.target_input == input)
    }

    pub fn outgoing_links(&self, node: NodeId, output: usize) -> impl Iterator<Item = &Link> {
        self.links
            .iter()
            .filter(move |link| link.source_node == node && link.source_output == output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u128) -> NodeId {
        NodeId::from_u128(n)
    }

    fn snapshot() -> GraphSnapshot {
        GraphSnapshot::new()
            .with_node(Node::new(id(1), "A", GridCell::new(0, 0)).with_output(DataType::Raster))
            .with_node(
                Node::new(id(2), "B", GridCell::new(10, 0))
                    .with_primary_input(DataType::Raster)
                    .with_output(DataType::Raster),
            )
            .with_link(Link::new(id(1), 0, id(2), 0))
    }

    #[test]
    fn finds_incoming_link() {
        let snapshot = snapshot();
        let (index, link) = snapshot.incoming_link(id(2), 0).unwrap();
        assert_eq!(index, 0);
        assert_eq!(link.source_node, id(1));
        assert!(snapshot.incoming_link(id(2), 1).is_none());
        assert_eq!(snapshot.outgoing_links(id(1), 0).count(), 1);
    }

    #[test]
    fn node_type_instantiates_primary_input_first() {
        let blend = NodeType::new("Blend", "Raster").with_ports(
            &[DataType::Raster, DataType::Raster, DataType::Number],
            &[DataType::Raster],
        );
        let node = blend.instantiate(id(9), GridCell::new(2, 3));
        assert_eq!(node.display_name, "Blend");
        assert_eq!(node.primary_input, Some(DataType::Raster));
        assert_eq!(node.input_count(), 3);
        assert_eq!(node.input_type(2), Some(DataType::Number));
        assert_eq!(node.output_count(), 1);
    }
}
