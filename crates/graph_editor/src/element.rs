use crate::theme::Theme;
use crate::GraphEditor;
use canvas::{
    CubicBezier, GridSpacing, Modifiers, MouseButton, NodeFrame, PointerEvent, WheelDelta, WheelEvent, WirePath,
};
use glam::DVec2;
use gpui::{
    point, px, size, App, BorderStyle, Bounds, ContentMask, DispatchPhase, Element, ElementId, Entity, Hitbox,
    IntoElement, MouseDownEvent, MouseMoveEvent, MouseUpEvent, PathBuilder, Pixels, Point, ScrollDelta,
    ScrollWheelEvent, Style, Window,
};
use node::ScreenPoint;

const WIRE_WIDTH: f32 = 2.0;
const THICK_WIRE_WIDTH: f32 = 5.0;
/// Screen length of one dash, and of each flattened piece of a wire.
const DASH_LENGTH: f64 = 6.0;
const PORT_RADIUS: f32 = 4.0;

/// Paints the graph and forwards pointer input to the editor's canvas.
pub struct GraphElement {
    editor: Entity<GraphEditor>,
}

impl GraphElement {
    pub fn new(editor: Entity<GraphEditor>) -> Self {
        Self { editor }
    }
}

impl IntoElement for GraphElement {
    type Element = Self;

    fn into_element(self) -> Self::Element {
        self
    }
}

pub struct GraphElementState {
    hitbox: Hitbox,
}

impl Element for GraphElement {
    type RequestLayoutState = ();
    type PrepaintState = GraphElementState;

    fn id(&self) -> Option<ElementId> {
        None
    }

    fn source_location(&self) -> Option<&'static std::panic::Location<'static>> {
        None
    }

    fn request_layout(
        &mut self,
        _id: Option<&gpui::GlobalElementId>,
        _inspector_id: Option<&gpui::InspectorElementId>,
        window: &mut Window,
        cx: &mut App,
    ) -> (gpui::LayoutId, Self::RequestLayoutState) {
        let mut style = Style::default();
        style.size.width = gpui::relative(1.).into();
        style.size.height = gpui::relative(1.).into();
        let layout_id = window.request_layout(style, None, cx);
        (layout_id, ())
    }

    fn prepaint(
        &mut self,
        _id: Option<&gpui::GlobalElementId>,
        _inspector_id: Option<&gpui::InspectorElementId>,
        bounds: Bounds<Pixels>,
        _request_layout: &mut Self::RequestLayoutState,
        window: &mut Window,
        cx: &mut App,
    ) -> Self::PrepaintState {
        let width: f32 = bounds.size.width.into();
        let height: f32 = bounds.size.height.into();
        self.editor.update(cx, |editor, _cx| {
            editor.canvas.set_canvas_size(DVec2::new(width as f64, height as f64));
        });
        let hitbox = window.insert_hitbox(bounds, gpui::HitboxBehavior::BlockMouse);
        GraphElementState { hitbox }
    }

    fn paint(
        &mut self,
        _id: Option<&gpui::GlobalElementId>,
        _inspector_id: Option<&gpui::InspectorElementId>,
        bounds: Bounds<Pixels>,
        _request_layout: &mut Self::RequestLayoutState,
        prepaint: &mut Self::PrepaintState,
        window: &mut Window,
        cx: &mut App,
    ) {
        let (grid, wires, frames, theme) = self.editor.update(cx, |editor, _cx| {
            let grid = editor.canvas.grid();
            let wires = editor.canvas.wires().to_vec();
            let frames = editor.canvas.node_frames();
            (grid, wires, frames, editor.theme.clone())
        });

        window.paint_quad(gpui::fill(bounds, theme.canvas_background));

        window.with_content_mask(Some(ContentMask { bounds }), |window| {
            paint_grid(&grid, &theme, bounds, window);
            for wire in &wires {
                paint_wire(wire, &theme, bounds, window);
            }
            for frame in &frames {
                paint_node(frame, &theme, bounds, window);
            }
        });

        let hitbox = prepaint.hitbox.clone();

        window.on_mouse_event({
            let editor = self.editor.clone();
            let hitbox = hitbox.clone();
            move |event: &MouseDownEvent, phase, window, cx| {
                if phase != DispatchPhase::Bubble || !hitbox.is_hovered(window) {
                    return;
                }
                let Some(button) = map_button(event.button) else {
                    return;
                };
                let pointer = pointer_event(event.position, bounds, event.modifiers, button);
                editor.update(cx, |editor, cx| {
                    let commands = editor.canvas.pointer_down(&pointer);
                    editor.apply(commands);
                    cx.notify();
                });
            }
        });

        // Moves and releases outside the canvas still belong to an active drag.
        window.on_mouse_event({
            let editor = self.editor.clone();
            let hitbox = hitbox.clone();
            move |event: &MouseMoveEvent, phase, window, cx| {
                if phase != DispatchPhase::Bubble {
                    return;
                }
                let dragging = editor.read(cx).canvas.session().is_some();
                if !dragging && !hitbox.is_hovered(window) {
                    return;
                }
                let pointer = pointer_event(event.position, bounds, event.modifiers, MouseButton::Left);
                editor.update(cx, |editor, cx| {
                    editor.canvas.pointer_move(&pointer);
                    if dragging {
                        cx.notify();
                    }
                });
            }
        });

        window.on_mouse_event({
            let editor = self.editor.clone();
            let hitbox = hitbox.clone();
            move |event: &MouseUpEvent, phase, window, cx| {
                if phase != DispatchPhase::Bubble {
                    return;
                }
                let dragging = editor.read(cx).canvas.session().is_some();
                if !dragging && !hitbox.is_hovered(window) {
                    return;
                }
                let Some(button) = map_button(event.button) else {
                    return;
                };
                let pointer = pointer_event(event.position, bounds, event.modifiers, button);
                editor.update(cx, |editor, cx| {
                    let commands = editor.canvas.pointer_up(&pointer);
                    editor.apply(commands);
                    cx.notify();
                });
            }
        });

        window.on_mouse_event({
            let editor = self.editor.clone();
            move |event: &ScrollWheelEvent, phase, window, cx| {
                if phase != DispatchPhase::Bubble || !hitbox.is_hovered(window) {
                    return;
                }
                let wheel = wheel_event(event, bounds);
                editor.update(cx, |editor, cx| {
                    editor.canvas.wheel(&wheel);
                    cx.notify();
                });
            }
        });
    }
}

fn map_button(button: gpui::MouseButton) -> Option<MouseButton> {
    match button {
        gpui::MouseButton::Left => Some(MouseButton::Left),
        gpui::MouseButton::Middle => Some(MouseButton::Middle),
        gpui::MouseButton::Right => Some(MouseButton::Right),
        gpui::MouseButton::Navigate(_) => None,
    }
}

pub fn map_modifiers(modifiers: gpui::Modifiers) -> Modifiers {
    Modifiers {
        shift: modifiers.shift,
        ctrl: modifiers.control || modifiers.platform,
        alt: modifiers.alt,
    }
}

fn local_point(position: Point<Pixels>, bounds: Bounds<Pixels>) -> ScreenPoint {
    let x: f32 = (position.x - bounds.origin.x).into();
    let y: f32 = (position.y - bounds.origin.y).into();
    ScreenPoint::new(x as f64, y as f64)
}

fn pointer_event(
    position: Point<Pixels>,
    bounds: Bounds<Pixels>,
    modifiers: gpui::Modifiers,
    button: MouseButton,
) -> PointerEvent {
    PointerEvent {
        position: local_point(position, bounds),
        button,
        modifiers: map_modifiers(modifiers),
    }
}

/// gpui reports content motion; the canvas expects wheel motion, so flip the sign.
fn wheel_event(event: &ScrollWheelEvent, bounds: Bounds<Pixels>) -> WheelEvent {
    let delta = match event.delta {
        ScrollDelta::Pixels(p) => {
            let x: f32 = p.x.into();
            let y: f32 = p.y.into();
            WheelDelta::Pixels(DVec2::new(-x as f64, -y as f64))
        }
        ScrollDelta::Lines(l) => WheelDelta::Lines(DVec2::new(-l.x as f64, -l.y as f64)),
    };
    WheelEvent {
        position: local_point(event.position, bounds),
        delta,
        modifiers: map_modifiers(event.modifiers),
    }
}

fn to_window(bounds: Bounds<Pixels>, at: DVec2) -> Point<Pixels> {
    point(bounds.origin.x + px(at.x as f32), bounds.origin.y + px(at.y as f32))
}

fn paint_grid(grid: &GridSpacing, theme: &Theme, bounds: Bounds<Pixels>, window: &mut Window) {
    if grid.spacing <= 0.0 {
        return;
    }
    let width: f32 = bounds.size.width.into();
    let height: f32 = bounds.size.height.into();
    let radius = grid.dot_radius as f32;

    let mut y = grid.offset.y;
    while y < height as f64 {
        let mut x = grid.offset.x;
        while x < width as f64 {
            let center = to_window(bounds, DVec2::new(x, y));
            let dot = Bounds {
                origin: point(center.x - px(radius), center.y - px(radius)),
                size: size(px(radius * 2.0), px(radius * 2.0)),
            };
            window.paint_quad(gpui::fill(dot, theme.grid).corner_radii(px(radius)));
            x += grid.spacing;
        }
        y += grid.spacing;
    }
}

/// Flatten each curve into dash-length pieces, skipping every other one when dashed.
fn paint_wire(wire: &WirePath, theme: &Theme, bounds: Bounds<Pixels>, window: &mut Window) {
    let width = if wire.thick { THICK_WIRE_WIDTH } else { WIRE_WIDTH };
    let mut builder = PathBuilder::stroke(px(width));
    let mut pen_down = false;
    let mut piece = 0usize;

    for curve in &wire.segments {
        let steps = ((polygon_length(curve) / DASH_LENGTH).ceil() as usize).max(1);
        for step in 0..steps {
            piece += 1;
            if wire.dashed && piece % 2 == 0 {
                pen_down = false;
                continue;
            }
            let start = curve.eval(step as f64 / steps as f64);
            let end = curve.eval((step + 1) as f64 / steps as f64);
            if !pen_down {
                builder.move_to(to_window(bounds, start));
                pen_down = true;
            }
            builder.line_to(to_window(bounds, end));
        }
    }

    if let Ok(path) = builder.build() {
        window.paint_path(path, theme.data_type(wire.data_type));
    }
}

fn polygon_length(curve: &CubicBezier) -> f64 {
    curve.points().windows(2).map(|pair| pair[0].distance(pair[1])).sum()
}

fn paint_node(frame: &NodeFrame, theme: &Theme, bounds: Bounds<Pixels>, window: &mut Window) {
    let body = Bounds {
        origin: to_window(bounds, frame.bounds.min),
        size: size(px(frame.bounds.width() as f32), px(frame.bounds.height() as f32)),
    };
    let background = if frame.disabled {
        theme.node_disabled
    } else {
        theme.node_background
    };
    window.paint_quad(gpui::fill(body, background).corner_radii(px(2.0)));

    let border = if frame.selected {
        theme.selection
    } else if frame.previewed {
        theme.preview
    } else {
        theme.node_border
    };
    window.paint_quad(gpui::outline(body, border, BorderStyle::Solid).corner_radii(px(2.0)));

    for port in &frame.ports {
        let center = to_window(bounds, port.center.0);
        let dot = Bounds {
            origin: point(center.x - px(PORT_RADIUS), center.y - px(PORT_RADIUS)),
            size: size(px(PORT_RADIUS * 2.0), px(PORT_RADIUS * 2.0)),
        };
        window.paint_quad(gpui::fill(dot, theme.data_type(port.data_type)).corner_radii(px(PORT_RADIUS)));
    }
}
