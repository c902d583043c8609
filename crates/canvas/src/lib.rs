//! Interactive node graph canvas.
//!
//! Renderer-agnostic: the canvas takes a [`node::GraphSnapshot`] and input
//! events, and produces screen-space geometry to draw plus [`api::Command`]s
//! for the document to execute. It never edits the graph itself.

mod canvas;
mod config;
mod grid;
mod input;
mod insertion;
mod interaction;
mod ports;
mod search;
mod viewport;
mod wire;

pub use canvas::{NodeFrame, NodeGraphCanvas, PortFrame};
pub use config::{CanvasConfig, ConfigError};
pub use grid::{grid_spacing, GridSpacing};
pub use input::{InputEvent, Key, Modifiers, MouseButton, PointerEvent, WheelDelta, WheelEvent};
pub use insertion::{curve_intersects_rect, NodeInsertionDetector};
pub use interaction::{DragSession, InteractionContext, LinkEnd, PickedUpLink, PointerInteractionController};
pub use ports::{resolve_port_anchor, HitTarget, NodeLayout, PortResolver};
pub use search::{MenuContents, MenuPlacement, MenuSection, NodeSearchMenu, NO_SEARCH_RESULTS};
pub use viewport::{wheel_zoom_factor, ViewportError, ViewportTransform};
pub use wire::{CubicBezier, PortAnchor, PortOrientation, WirePath, WireRouter, WireStyle};
