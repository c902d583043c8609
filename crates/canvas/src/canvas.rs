use crate::grid::{grid_spacing, GridSpacing};
use crate::input::{InputEvent, Key, Modifiers, PointerEvent, WheelEvent};
use crate::interaction::{DragSession, InteractionContext, LinkEnd, PointerInteractionController};
use crate::ports::PortResolver;
use crate::search::{MenuContents, MenuPlacement, NodeSearchMenu};
use crate::wire::{PortAnchor, PortOrientation, WirePath, WireRouter};
use crate::{CanvasConfig, ConfigError, ViewportTransform};
use api::Command;
use glam::DVec2;
use log::{debug, trace};
use node::{DataType, GraphPoint, GraphSnapshot, NodeId, PortRef, PortSide, Rect, ScreenPoint};

/// A port as drawn on screen.
#[derive(Clone, Debug, PartialEq)]
pub struct PortFrame {
    pub port: PortRef,
    pub center: ScreenPoint,
    pub data_type: DataType,
}

/// A node as drawn on screen, with any drag preview applied.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeFrame {
    pub id: NodeId,
    pub label: String,
    pub bounds: Rect,
    pub selected: bool,
    pub disabled: bool,
    pub previewed: bool,
    /// Stable key for per-node render resources such as clip paths.
    pub clip_key: String,
    pub ports: Vec<PortFrame>,
}

/// The node graph canvas.
///
/// Holds the latest snapshot pushed by the document, the viewport and the
/// gesture state. Input handlers return the commands the document should
/// run. Derived geometry is recomputed lazily in [`Self::layout_settled`].
pub struct NodeGraphCanvas {
    config: CanvasConfig,
    snapshot: GraphSnapshot,
    selection: Vec<NodeId>,
    viewport: ViewportTransform,
    controller: PointerInteractionController,
    menu: NodeSearchMenu,
    resolver: PortResolver,
    wires: Vec<WirePath>,
    canvas_size: DVec2,
    layout_dirty: bool,
    wires_dirty: bool,
}

impl Default for NodeGraphCanvas {
    fn default() -> Self {
        Self::with_valid_config(CanvasConfig::default())
    }
}

impl NodeGraphCanvas {
    pub fn new(config: CanvasConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: CanvasConfig) -> Self {
        Self {
            config,
            snapshot: GraphSnapshot::default(),
            selection: Vec::new(),
            viewport: ViewportTransform::default(),
            controller: PointerInteractionController::new(),
            menu: NodeSearchMenu::new(),
            resolver: PortResolver::default(),
            wires: Vec::new(),
            canvas_size: DVec2::ZERO,
            layout_dirty: true,
            wires_dirty: true,
        }
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn snapshot(&self) -> &GraphSnapshot {
        &self.snapshot
    }

    pub fn selection(&self) -> &[NodeId] {
        &self.selection
    }

    pub fn viewport(&self) -> &ViewportTransform {
        &self.viewport
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.controller.session()
    }

    pub fn menu(&self) -> &NodeSearchMenu {
        &self.menu
    }

    /// Replace the graph with a fresh snapshot from the document.
    pub fn set_snapshot(&mut self, snapshot: GraphSnapshot) {
        debug!(
            "snapshot with {} nodes and {} links",
            snapshot.nodes.len(),
            snapshot.links.len()
        );
        self.selection = snapshot.selection.clone();
        self.snapshot = snapshot;
        self.invalidate_layout();
    }

    /// Reflect a selection made elsewhere. An active drag keeps the nodes it grabbed.
    pub fn set_selection(&mut self, ids: Vec<NodeId>) {
        self.snapshot.selection = ids.clone();
        self.selection = ids;
    }

    pub fn set_viewport(&mut self, viewport: ViewportTransform) {
        self.viewport = viewport;
        self.wires_dirty = true;
    }

    /// Size of the canvas element in screen pixels, used to place the search menu.
    pub fn set_canvas_size(&mut self, size: DVec2) {
        self.canvas_size = size;
    }

    pub fn pointer_down(&mut self, event: &PointerEvent) -> Vec<Command> {
        self.layout_settled();
        let commands = self.with_interaction(|controller, cx| controller.pointer_down(event, cx));
        self.invalidate_layout();
        commands
    }

    pub fn pointer_move(&mut self, event: &PointerEvent) {
        if !self.controller.is_active() {
            return;
        }
        self.layout_settled();
        self.with_interaction(|controller, cx| controller.pointer_move(event, cx));
        if self.controller.preview().is_some() {
            self.layout_dirty = true;
        }
        self.wires_dirty = true;
    }

    pub fn pointer_up(&mut self, event: &PointerEvent) -> Vec<Command> {
        self.layout_settled();
        let commands = self.with_interaction(|controller, cx| controller.pointer_up(event, cx));
        self.invalidate_layout();
        commands
    }

    pub fn wheel(&mut self, event: &WheelEvent) {
        self.menu.close();
        self.viewport.apply_wheel(event, &self.config);
        self.wires_dirty = true;
    }

    pub fn key_down(&mut self, key: Key, modifiers: Modifiers) -> Vec<Command> {
        let commands = self.with_interaction(|controller, cx| controller.key_down(key, modifiers, cx));
        self.invalidate_layout();
        commands
    }

    /// Dispatch any input event.
    pub fn handle_event(&mut self, event: &InputEvent) -> Vec<Command> {
        match event {
            InputEvent::PointerDown(event) => self.pointer_down(event),
            InputEvent::PointerMove(event) => {
                self.pointer_move(event);
                Vec::new()
            }
            InputEvent::PointerUp(event) => self.pointer_up(event),
            InputEvent::Wheel(event) => {
                self.wheel(event);
                Vec::new()
            }
            InputEvent::KeyDown { key, modifiers } => self.key_down(*key, *modifiers),
        }
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.menu.set_search_term(term);
    }

    pub fn toggle_menu_section(&mut self, category: &str) {
        self.menu.toggle_section(category);
    }

    pub fn menu_contents(&self) -> MenuContents {
        self.menu.contents(&self.snapshot.node_types)
    }

    pub fn menu_placement(&self) -> Option<MenuPlacement> {
        self.menu
            .is_open()
            .then(|| self.menu.placement(self.canvas_size, self.config.menu_size))
    }

    /// Pick a catalog entry from the open search menu.
    pub fn select_menu_entry(&mut self, type_name: &str) -> Vec<Command> {
        if !self.snapshot.node_types.iter().any(|node_type| node_type.name == type_name) {
            debug!("ignored unknown node type {type_name}");
            return Vec::new();
        }
        self.menu.select(type_name)
    }

    /// Recompute derived geometry after state changes.
    pub fn layout_settled(&mut self) {
        if self.layout_dirty {
            self.resolver = PortResolver::build(&self.snapshot, self.controller.preview(), &self.config);
            self.layout_dirty = false;
            self.wires_dirty = true;
        }
        if self.wires_dirty {
            self.wires = self.route_wires();
            self.wires_dirty = false;
        }
    }

    /// Every visible wire in screen space, plus the one being dragged.
    pub fn wires(&mut self) -> &[WirePath] {
        self.layout_settled();
        &self.wires
    }

    pub fn node_frames(&mut self) -> Vec<NodeFrame> {
        self.layout_settled();
        self.resolver
            .layouts()
            .iter()
            .filter_map(|layout| {
                let node = self.snapshot.node(layout.id)?;
                let inputs = layout.inputs.iter().enumerate().map(|(index, anchor)| PortFrame {
                    port: PortRef::input(node.id, index),
                    center: self.viewport.graph_to_screen(anchor.point),
                    data_type: node.input_type(index).unwrap_or_default(),
                });
                let outputs = layout.outputs.iter().enumerate().map(|(index, anchor)| PortFrame {
                    port: PortRef::output(node.id, index),
                    center: self.viewport.graph_to_screen(anchor.point),
                    data_type: node.output_type(index).unwrap_or_default(),
                });
                Some(NodeFrame {
                    id: node.id,
                    label: node.display_name.clone(),
                    bounds: self.viewport.graph_to_screen_rect(layout.bounds),
                    selected: self.selection.contains(&node.id),
                    disabled: node.disabled,
                    previewed: node.previewed,
                    clip_key: format!("node-{}", node.id.to_uuid_string()),
                    ports: inputs.chain(outputs).collect(),
                })
            })
            .collect()
    }

    pub fn grid(&self) -> GridSpacing {
        grid_spacing(&self.viewport, &self.config)
    }

    fn invalidate_layout(&mut self) {
        self.layout_dirty = true;
        self.wires_dirty = true;
    }

    fn with_interaction<R>(
        &mut self,
        f: impl FnOnce(&mut PointerInteractionController, &mut InteractionContext) -> R,
    ) -> R {
        let mut cx = InteractionContext {
            snapshot: &self.snapshot,
            resolver: &self.resolver,
            viewport: &mut self.viewport,
            menu: &mut self.menu,
            selection: &mut self.selection,
            config: &self.config,
        };
        f(&mut self.controller, &mut cx)
    }

    fn route_wires(&self) -> Vec<WirePath> {
        let router = WireRouter::from_config(&self.config);
        let hidden = self.controller.hidden_link();
        let screen_path = |output: PortAnchor, input: PortAnchor| {
            let to_screen = |point| self.viewport.graph_to_screen(GraphPoint(point)).0;
            router
                .path(output, input)
                .iter()
                .map(|curve| curve.map(to_screen))
                .collect::<Vec<_>>()
        };
        let thick = |output: PortAnchor, input: PortAnchor| {
            output.orientation == PortOrientation::Vertical && input.orientation == PortOrientation::Vertical
        };
        let mut wires = Vec::with_capacity(self.snapshot.links.len() + 1);

        for (index, link) in self.snapshot.links.iter().enumerate() {
            if hidden.as_ref() == Some(link) {
                continue;
            }
            let Some((output, input)) = self.resolver.link_anchors(link) else {
                trace!("omitting unresolved link {index}");
                continue;
            };
            let source = self.snapshot.node(link.source_node);
            let data_type = source
                .and_then(|node| node.output_type(link.source_output))
                .unwrap_or_default();
            let dashed = source.is_some_and(|node| node.disabled);
            wires.push(WirePath::new(screen_path(output, input), data_type, dashed).with_thick(thick(output, input)));
        }

        if let Some((from, to)) = self.controller.link_preview() {
            let input = match to {
                LinkEnd::Port(port) => self.resolver.anchor(port),
                LinkEnd::Cursor(point) => Some(PortAnchor {
                    point,
                    orientation: PortOrientation::Horizontal,
                }),
            };
            if let (Some(output), Some(input)) = (self.resolver.anchor(from), input) {
                let data_type = self
                    .snapshot
                    .node(from.node)
                    .and_then(|node| match from.side {
                        PortSide::Output => node.output_type(from.index),
                        PortSide::Input => node.input_type(from.index),
                    })
                    .unwrap_or_default();
                wires.push(WirePath::new(screen_path(output, input), data_type, true).with_thick(thick(output, input)));
            }
        }
        wires
    }
}
