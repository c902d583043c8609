//! Node graph model.
//!
//! This crate provides the read-only snapshot of nodes, links and the
//! node-type catalog that the document pushes into the canvas, plus the
//! typed coordinate spaces shared by every other crate.

pub mod coords;
mod node;
mod node_id;
mod rect;
mod snapshot;

pub use coords::{GraphPoint, GridCell, GridDelta, ScreenDelta, ScreenPoint};
pub use node::{DataType, Node, Port, PortRef, PortSide};
pub use node_id::NodeId;
pub use rect::Rect;
pub use snapshot::{GraphSnapshot, Link, NodeType};
