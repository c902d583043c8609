use api::{execute_commands, Command};
use canvas::{
    InputEvent, Key, Modifiers, MouseButton, NodeGraphCanvas, PointerEvent, PortAnchor, ViewportTransform, WireRouter,
};
use glam::DVec2;
use node::{DataType, GraphSnapshot, GridCell, Link, Node, NodeId};
use proptest::prelude::*;
use std::f64::consts::TAU;

fn id(n: u128) -> NodeId {
    NodeId::from_u128(n)
}

fn filter(data_type: DataType, n: u128, name: &str, cell: GridCell) -> Node {
    Node::new(id(n), name, cell)
        .with_primary_input(data_type)
        .with_output(data_type)
}

/// A (0,0) -> B (20,0) with an unconnected C parked below them at (0,5).
fn insertion_graph() -> GraphSnapshot {
    GraphSnapshot::new()
        .with_node(Node::new(id(1), "A", GridCell::new(0, 0)).with_output(DataType::Raster))
        .with_node(filter(DataType::Raster, 2, "B", GridCell::new(20, 0)))
        .with_node(filter(DataType::Raster, 3, "C", GridCell::new(0, 5)))
        .with_link(Link::new(id(1), 0, id(2), 0))
}

/// Feed commands back the way the document would and push the new snapshot.
fn apply(canvas: &mut NodeGraphCanvas, commands: Vec<Command>) {
    let mut snapshot = canvas.snapshot().clone();
    for result in execute_commands(&mut snapshot, commands) {
        assert!(result.is_success(), "{result:?}");
    }
    canvas.set_snapshot(snapshot);
}

#[test]
fn horizontal_wire_scenario() {
    let router = WireRouter::new(200.0);
    let curve = router.route(PortAnchor::horizontal(100.0, 50.0), PortAnchor::horizontal(300.0, 50.0));
    let expected = 200.0 * (1.0 - 2f64.powf(-10.0 * 200.0 / (200.0 * TAU)));

    assert_eq!(curve.p0, DVec2::new(100.0, 50.0));
    assert_eq!(curve.p3, DVec2::new(300.0, 50.0));
    assert_eq!((curve.c1 - curve.p0).y, 0.0);
    assert_eq!((curve.c2 - curve.p3).y, 0.0);
    assert!(((curve.c1 - curve.p0).x - expected).abs() < 1e-9);
    assert!(((curve.p3 - curve.c2).x - expected).abs() < 1e-9);
}

#[test]
fn dropping_unconnected_node_on_a_wire_splices_it_in() {
    let mut canvas = NodeGraphCanvas::default();
    canvas.set_snapshot(insertion_graph());

    // Grab C by its body and drop it over the straight A -> B wire at y = 12.
    let mut commands = canvas.pointer_down(&PointerEvent::new(60.0, 132.0));
    canvas.pointer_move(&PointerEvent::new(150.0, 60.0));
    commands.extend(canvas.pointer_up(&PointerEvent::new(252.0, 12.0)));

    assert_eq!(
        commands,
        vec![
            Command::SelectNodes { ids: vec![id(3)] },
            Command::MoveSelectedNodes { dx: 8, dy: -5 },
            Command::connect(id(1), 0, id(3), 0),
            Command::connect(id(3), 0, id(2), 0),
        ]
    );

    apply(&mut canvas, commands);
    let links = &canvas.snapshot().links;
    assert!(links.contains(&Link::new(id(1), 0, id(3), 0)));
    assert!(links.contains(&Link::new(id(3), 0, id(2), 0)));
    assert!(!links.contains(&Link::new(id(1), 0, id(2), 0)));
    assert_eq!(canvas.snapshot().node(id(3)).unwrap().position, GridCell::new(8, -5));
}

#[test]
fn dropping_next_to_a_wire_only_moves() {
    let mut canvas = NodeGraphCanvas::default();
    canvas.set_snapshot(insertion_graph());

    canvas.pointer_down(&PointerEvent::new(60.0, 132.0));
    let commands = canvas.pointer_up(&PointerEvent::new(252.0, 228.0));
    assert_eq!(commands, vec![Command::MoveSelectedNodes { dx: 8, dy: 4 }]);
}

#[test]
fn wired_node_is_never_inserted() {
    let mut snapshot = insertion_graph();
    snapshot.nodes.push(filter(DataType::Raster, 4, "D", GridCell::new(0, 10)));
    snapshot.links.push(Link::new(id(3), 0, id(4), 0));
    let mut canvas = NodeGraphCanvas::default();
    canvas.set_snapshot(snapshot);

    canvas.pointer_down(&PointerEvent::new(60.0, 132.0));
    let commands = canvas.pointer_up(&PointerEvent::new(252.0, 12.0));
    assert_eq!(commands, vec![Command::MoveSelectedNodes { dx: 8, dy: -5 }]);
}

#[test]
fn right_click_scenario_anchors_menu() {
    let mut canvas = NodeGraphCanvas::default();
    canvas.set_viewport(ViewportTransform::with_transform(2.0, DVec2::new(-10.0, -10.0)).unwrap());
    canvas.pointer_down(&PointerEvent::new(500.0, 500.0).with_button(MouseButton::Right));

    let expected = ((500.0f64 / 2.0 - (-10.0)) / 24.0).round() as i32;
    assert!(canvas.menu().is_open());
    assert_eq!(canvas.menu().anchor(), GridCell::new(expected, expected));
}

#[test]
fn connect_then_reroute_keeps_single_incoming_link() {
    let mut canvas = NodeGraphCanvas::default();
    canvas.set_snapshot(insertion_graph());

    // Drag from C's output (120, 132) onto B's input (480, 12).
    canvas.pointer_down(&PointerEvent::new(120.0, 132.0));
    let commands = canvas.pointer_up(&PointerEvent::new(478.0, 12.0));
    assert_eq!(commands, vec![Command::connect(id(3), 0, id(2), 0)]);
    apply(&mut canvas, commands);

    let into_b: Vec<_> = canvas.snapshot().links.iter().filter(|l| l.target_node == id(2)).collect();
    assert_eq!(into_b, vec![&Link::new(id(3), 0, id(2), 0)]);
}

fn event_strategy() -> impl Strategy<Value = InputEvent> {
    let point = (0.0f64..600.0, 0.0f64..300.0);
    let button = prop_oneof![
        Just(MouseButton::Left),
        Just(MouseButton::Middle),
        Just(MouseButton::Right)
    ];
    let modifiers = (any::<bool>(), any::<bool>(), any::<bool>()).prop_map(|(shift, ctrl, alt)| Modifiers {
        shift,
        ctrl,
        alt,
    });
    prop_oneof![
        (point.clone(), button.clone(), modifiers).prop_map(|((x, y), button, modifiers)| {
            InputEvent::PointerDown(PointerEvent::new(x, y).with_button(button).with_modifiers(modifiers))
        }),
        point
            .clone()
            .prop_map(|(x, y)| InputEvent::PointerMove(PointerEvent::new(x, y))),
        (point, button).prop_map(|((x, y), button)| InputEvent::PointerUp(PointerEvent::new(x, y).with_button(button))),
        Just(InputEvent::KeyDown {
            key: Key::Escape,
            modifiers: Modifiers::NONE
        }),
    ]
}

proptest! {
    #[test]
    fn press_during_a_session_never_starts_another(events in prop::collection::vec(event_strategy(), 1..40)) {
        let mut canvas = NodeGraphCanvas::default();
        canvas.set_snapshot(insertion_graph());

        for event in &events {
            let before = canvas.session().cloned();
            let commands = canvas.handle_event(event);
            if let (Some(before), InputEvent::PointerDown(_)) = (&before, event) {
                prop_assert!(commands.is_empty());
                // Either ignored outright, or a right-click that cancelled the drag.
                let after = canvas.session();
                prop_assert!(after.is_none() || after.map(|s| s.name()) == Some(before.name()));
            }
        }
    }

    #[test]
    fn still_click_on_a_node_selects_just_that_node(
        preselected in prop::collection::vec(1u128..=3, 0..3),
        node in 1u128..=3,
    ) {
        let mut snapshot = insertion_graph();
        snapshot.selection = preselected.into_iter().map(id).collect();
        let mut canvas = NodeGraphCanvas::default();
        canvas.set_snapshot(snapshot);

        // Body centres, clear of every port.
        let at = match node {
            1 => PointerEvent::new(60.0, 12.0),
            2 => PointerEvent::new(540.0, 12.0),
            _ => PointerEvent::new(60.0, 132.0),
        };
        let mut commands = canvas.pointer_down(&at);
        commands.extend(canvas.pointer_up(&at));

        let has_move = commands.iter().any(|c| matches!(c, Command::MoveSelectedNodes { .. }));
        prop_assert!(!has_move);
        apply(&mut canvas, commands);
        prop_assert_eq!(canvas.snapshot().selection.clone(), vec![id(node)]);
    }

    #[test]
    fn connects_never_fan_in(pairs in prop::collection::vec((1u128..=3, 1u128..=3), 0..20)) {
        let mut snapshot = insertion_graph();
        for (source, target) in pairs {
            let _ = execute_commands(&mut snapshot, [Command::connect(id(source), 0, id(target), 0)]);
        }
        let mut targets: Vec<_> = snapshot.links.iter().map(|l| (l.target_node, l.target_input)).collect();
        let total = targets.len();
        targets.sort();
        targets.dedup();
        prop_assert_eq!(targets.len(), total);
    }
}
