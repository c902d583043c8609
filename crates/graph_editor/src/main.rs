//! GraphEditor: a desktop host for the node graph canvas.
//!
//! Owns the document snapshot, runs the commands the canvas emits against it
//! and pushes the result back, the way a real document would.

use anyhow::{Context as _, Result};
use api::{execute_command, Command, CommandResult};
use canvas::{Key, MenuContents, MenuSection, Modifiers, NodeGraphCanvas, ViewportTransform, NO_SEARCH_RESULTS};
use element::{map_modifiers, GraphElement};
use gpui::{
    actions, div, point, prelude::*, px, AnyElement, App, Application, ClickEvent, ElementId, FocusHandle,
    Focusable, IntoElement, KeyBinding, KeyDownEvent, Menu, MenuItem, ParentElement, Styled, TitlebarOptions,
    Window, WindowOptions,
};
use log::{debug, error, info, warn};
use node::{DataType, GraphSnapshot, GridCell, Link, Node, NodeId, NodeType};
use std::path::Path;
use theme::Theme;

mod element;
mod theme;

actions!(graph_editor, [Quit, ResetView]);

const LABEL_OFFSET: f32 = 16.0;

/// Main application component
pub struct GraphEditor {
    pub canvas: NodeGraphCanvas,
    document: GraphSnapshot,
    pub theme: Theme,
    focus_handle: FocusHandle,
}

impl GraphEditor {
    pub fn new(document: GraphSnapshot, _window: &mut Window, cx: &mut Context<Self>) -> Self {
        let mut canvas = NodeGraphCanvas::default();
        canvas.set_snapshot(document.clone());
        Self {
            canvas,
            document,
            theme: Theme::dark(),
            focus_handle: cx.focus_handle(),
        }
    }

    /// Run canvas commands against the document and push the new snapshot.
    pub fn apply(&mut self, commands: Vec<Command>) {
        if commands.is_empty() {
            return;
        }
        for command in commands {
            debug!("executing {command:?}");
            if let CommandResult::Error { message } = execute_command(&mut self.document, command) {
                warn!("command failed: {message}");
            }
        }
        self.canvas.set_snapshot(self.document.clone());
    }

    fn handle_key_down(&mut self, event: &KeyDownEvent, _window: &mut Window, cx: &mut Context<Self>) {
        let keystroke = &event.keystroke;
        let modifiers = map_modifiers(keystroke.modifiers);

        // The open menu owns typing.
        if self.canvas.menu().is_open() && keystroke.key != "escape" {
            let mut term = self.canvas.menu().search_term().to_string();
            if keystroke.key == "backspace" {
                term.pop();
            } else if let Some(text) = keystroke.key_char.as_ref().filter(|_| !modifiers.ctrl) {
                term.push_str(text);
            } else {
                return;
            }
            self.canvas.set_search_term(term);
            cx.notify();
            return;
        }

        let key = match keystroke.key.as_str() {
            "escape" => Key::Escape,
            "delete" => Key::Delete,
            "backspace" => Key::Backspace,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Character(c),
                    _ => return,
                }
            }
        };
        // Plain H hides, like Ctrl+H.
        let modifiers = if key == Key::Character('h') {
            Modifiers::ctrl()
        } else {
            modifiers
        };
        let commands = self.canvas.key_down(key, modifiers);
        self.apply(commands);
        cx.notify();
    }

    fn reset_view(&mut self, _: &ResetView, _window: &mut Window, cx: &mut Context<Self>) {
        self.canvas.set_viewport(ViewportTransform::default());
        cx.notify();
    }

    fn render_labels(&mut self) -> Vec<AnyElement> {
        let color = self.theme.ui_text_muted;
        self.canvas
            .node_frames()
            .into_iter()
            .map(|frame| {
                div()
                    .absolute()
                    .left(px(frame.bounds.min.x as f32))
                    .top(px(frame.bounds.min.y as f32 - LABEL_OFFSET))
                    .text_color(color)
                    .child(frame.label)
                    .into_any_element()
            })
            .collect()
    }

    fn render_menu(&self, cx: &mut Context<Self>) -> Option<AnyElement> {
        let placement = self.canvas.menu_placement()?;
        let menu_size = self.canvas.config().menu_size;
        let theme = &self.theme;

        let body: Vec<AnyElement> = match self.canvas.menu_contents() {
            MenuContents::NoResults => vec![div()
                .text_color(theme.ui_text_muted)
                .child(NO_SEARCH_RESULTS)
                .into_any_element()],
            MenuContents::Sections(sections) => sections
                .into_iter()
                .flat_map(|section| self.render_section(section, cx))
                .collect(),
        };

        Some(
            div()
                .id("node-search-menu")
                .occlude()
                .absolute()
                .left(px(placement.origin.x() as f32))
                .top(px(placement.origin.y() as f32))
                .w(px(menu_size.x as f32))
                .max_h(px(menu_size.y as f32))
                .overflow_y_scroll()
                .flex()
                .flex_col()
                .gap(px(2.0))
                .p(px(6.0))
                .bg(theme.ui_background)
                .border_1()
                .border_color(theme.ui_border)
                .rounded(px(4.0))
                .child(
                    div()
                        .pb(px(4.0))
                        .text_color(theme.ui_text)
                        .child(format!("Search: {}_", self.canvas.menu().search_term())),
                )
                .children(body)
                .into_any_element(),
        )
    }

    fn render_section(&self, section: MenuSection, cx: &mut Context<Self>) -> Vec<AnyElement> {
        let marker = if section.expanded { "v" } else { ">" };
        let category = section.category.clone();
        let header = div()
            .id(ElementId::Name(format!("category-{category}").into()))
            .text_color(self.theme.ui_text_muted)
            .child(format!("{marker} {category}"))
            .on_click(cx.listener(move |this, _: &ClickEvent, _window, cx| {
                this.canvas.toggle_menu_section(&category);
                cx.notify();
            }))
            .into_any_element();

        let mut rows = vec![header];
        if section.expanded {
            rows.extend(section.entries.into_iter().map(|name| {
                let label = name.clone();
                div()
                    .id(ElementId::Name(format!("entry-{name}").into()))
                    .pl(px(12.0))
                    .text_color(self.theme.ui_text)
                    .child(label)
                    .on_click(cx.listener(move |this, _: &ClickEvent, _window, cx| {
                        let commands = this.canvas.select_menu_entry(&name);
                        this.apply(commands);
                        cx.notify();
                    }))
                    .into_any_element()
            }));
        }
        rows
    }
}

impl Render for GraphEditor {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let labels = self.render_labels();
        let menu = self.render_menu(cx);

        div()
            .id("GraphEditor")
            .key_context("graph_editor")
            .track_focus(&self.focus_handle)
            .relative()
            .size_full()
            .overflow_hidden()
            .text_xs()
            .bg(self.theme.canvas_background)
            .text_color(self.theme.ui_text)
            .on_key_down(cx.listener(Self::handle_key_down))
            .on_action(cx.listener(Self::reset_view))
            .child(GraphElement::new(cx.entity()))
            .children(labels)
            .children(menu)
    }
}

impl Focusable for GraphEditor {
    fn focus_handle(&self, _cx: &App) -> FocusHandle {
        self.focus_handle.clone()
    }
}

fn init_keymap(cx: &mut App) {
    cx.bind_keys([
        KeyBinding::new("cmd-0", ResetView, None),
        KeyBinding::new("cmd-q", Quit, None),
    ]);
}

fn load_document(path: &Path) -> Result<GraphSnapshot> {
    let text = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
}

/// A small graph to play with when no document is given.
fn demo_document() -> GraphSnapshot {
    let catalog = vec![
        NodeType::new("Rectangle", "Generators").with_ports(&[], &[DataType::Vector]),
        NodeType::new("Ellipse", "Generators").with_ports(&[], &[DataType::Vector]),
        NodeType::new("Image", "Raster").with_ports(&[], &[DataType::Raster]),
        NodeType::new("Blur", "Raster").with_ports(&[DataType::Raster], &[DataType::Raster]),
        NodeType::new("Levels", "Raster").with_ports(&[DataType::Raster, DataType::Number], &[DataType::Raster]),
        NodeType::new("Fill", "Vector").with_ports(&[DataType::Vector, DataType::Color], &[DataType::Vector]),
        NodeType::new("Transform", "General").with_ports(&[DataType::General], &[DataType::General]),
        NodeType::new("Output", "General").with_ports(&[DataType::Graphic], &[]),
    ];

    let rectangle = NodeId::new();
    let fill = NodeId::new();
    let image = NodeId::new();
    let blur = NodeId::new();
    let layer = NodeId::new();

    let mut document = GraphSnapshot::new()
        .with_node(catalog[0].instantiate(rectangle, GridCell::new(2, 2)))
        .with_node(catalog[5].instantiate(fill, GridCell::new(10, 2)))
        .with_node(catalog[2].instantiate(image, GridCell::new(2, 8)))
        .with_node(catalog[3].instantiate(blur, GridCell::new(10, 8)))
        .with_node(
            Node::new(layer, "Layer", GridCell::new(18, 4))
                .with_primary_input(DataType::Graphic)
                .with_input(DataType::Graphic)
                .with_output(DataType::Graphic)
                .as_layer(),
        )
        .with_link(Link::new(rectangle, 0, fill, 0))
        .with_link(Link::new(image, 0, blur, 0))
        .with_link(Link::new(blur, 0, layer, 1));
    document.node_types = catalog;
    document
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let document = match std::env::args_os().nth(1) {
        Some(path) => load_document(Path::new(&path))?,
        None => demo_document(),
    };
    info!(
        "opening graph with {} nodes and {} links",
        document.nodes.len(),
        document.links.len()
    );

    Application::new().run(move |cx: &mut App| {
        cx.on_action(quit);
        cx.set_menus(vec![Menu {
            name: "GraphEditor".into(),
            items: vec![
                MenuItem::action("Reset View", ResetView),
                MenuItem::separator(),
                MenuItem::action("Quit", Quit),
            ],
        }]);
        init_keymap(cx);

        let window = cx.open_window(
            WindowOptions {
                titlebar: Some(TitlebarOptions {
                    title: Some("Graph Editor".into()),
                    appears_transparent: true,
                    traffic_light_position: Some(point(px(8.0), px(8.0))),
                }),
                ..Default::default()
            },
            |window, cx| cx.new(|cx| GraphEditor::new(document, window, cx)),
        );
        let window = match window {
            Ok(window) => window,
            Err(err) => {
                error!("failed to open window: {err:#}");
                cx.quit();
                return;
            }
        };

        if let Err(err) = window.update(cx, |view, window, cx| {
            window.focus(&view.focus_handle(cx));
            cx.activate(true);
        }) {
            error!("failed to focus window: {err:#}");
        }
    });
    Ok(())
}

fn quit(_: &Quit, cx: &mut App) {
    cx.quit();
}
