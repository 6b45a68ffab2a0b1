// Copyright 2025 the Typeblock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Placement and connection tests for the `typeblock_place` crate, run against the in-memory host.

use kurbo::Point;
use pretty_assertions::assert_eq;
use typeblock_host::memory::{BlockTemplate, MemoryWorkspace};
use typeblock_host::{BlockId, Check, ConnectionPoint, SocketRef, SurfaceId, Workspace};
use typeblock_place::{
    ConnectionConfig, ConnectionResolver, ConnectionShape, Placer, Positioner, Positioning,
};

fn surface() -> MemoryWorkspace {
    let mut ws = MemoryWorkspace::with_standard_blocks(SurfaceId(3));
    ws.register(
        BlockTemplate::new("dual")
            .output(Check::any())
            .statement(),
    );
    ws.register(
        BlockTemplate::new("wrapper")
            .previous(Check::any())
            .statement_input("DO")
            .size(140.0, 64.0),
    );
    ws
}

/// Creates `type_name`, moves it to `at`, and runs the default resolver.
fn drop_and_connect(
    ws: &mut MemoryWorkspace,
    resolver: &ConnectionResolver,
    type_name: &str,
    at: Point,
) -> (BlockId, Option<typeblock_place::Connection>) {
    let block = ws.create_block(type_name).unwrap();
    ws.move_block(block, at).unwrap();
    let connection = resolver.connect(ws, block, at);
    (block, connection)
}

fn stack(ws: &mut MemoryWorkspace, first: BlockId, second: BlockId) {
    ws.connect(
        &SocketRef::new(first, ConnectionPoint::Next),
        &SocketRef::new(second, ConnectionPoint::Previous),
    )
    .unwrap();
}

#[test]
fn statement_below_the_drop_point_is_preceded_without_overlap() {
    let mut ws = surface();
    let below = ws.spawn("text_print", Point::new(0.0, 60.0)).unwrap();
    let new = ws.create_block("text_print").unwrap();

    let mut placer = Placer::new(
        Positioner::new(Positioning::Mouse),
        ConnectionResolver::default(),
    );
    let placement = placer.place(&mut ws, new, Point::new(0.0, 40.0)).unwrap();
    let link = placement.connection.unwrap();

    assert_eq!(link.shape, ConnectionShape::Insertion);
    assert_eq!(link.target, below);
    assert_eq!(
        ws.parent(below),
        Some(SocketRef::new(new, ConnectionPoint::Next))
    );
    assert_eq!(ws.parent(new), None);

    let new_bounds = ws.bounds(new).unwrap();
    let below_bounds = ws.bounds(below).unwrap();
    assert_eq!(new_bounds.origin(), Point::new(0.0, 40.0));
    assert_eq!(new_bounds.intersect(below_bounds).area(), 0.0);
    assert_eq!(below_bounds.y0, new_bounds.y1);
}

#[test]
fn sequencing_wins_over_value_input() {
    let mut ws = surface();
    let resolver = ConnectionResolver::default();
    let print = ws.spawn("text_print", Point::ZERO).unwrap();

    let (dual, link) = drop_and_connect(&mut ws, &resolver, "dual", Point::new(0.0, 50.0));
    let link = link.unwrap();
    assert_eq!(link.shape, ConnectionShape::Statement);
    assert_eq!(link.socket, SocketRef::new(print, ConnectionPoint::Next));
    assert_eq!(
        ws.parent(dual),
        Some(SocketRef::new(print, ConnectionPoint::Next))
    );
    assert_eq!(ws.occupied_inputs(print), 0);
}

#[test]
fn value_blocks_fill_the_first_free_compatible_input() {
    let mut ws = surface();
    let resolver = ConnectionResolver::default();
    let add = ws.spawn("math_arithmetic", Point::ZERO).unwrap();
    let one = ws.create_block("math_number").unwrap();
    ws.connect(
        &SocketRef::input(add, "A"),
        &SocketRef::new(one, ConnectionPoint::Output),
    )
    .unwrap();

    let (_, link) = drop_and_connect(&mut ws, &resolver, "math_number", Point::new(10.0, 10.0));
    let link = link.unwrap();
    assert_eq!(link.shape, ConnectionShape::ValueInput);
    assert_eq!(link.socket, SocketRef::input(add, "B"));
}

#[test]
fn emptier_value_targets_win_over_nearer_ones() {
    let mut ws = surface();
    let resolver = ConnectionResolver::default();
    let near = ws.spawn("math_arithmetic", Point::new(0.0, 10.0)).unwrap();
    let filler = ws.create_block("math_number").unwrap();
    ws.connect(
        &SocketRef::input(near, "A"),
        &SocketRef::new(filler, ConnectionPoint::Output),
    )
    .unwrap();
    let far = ws.spawn("math_arithmetic", Point::new(0.0, 100.0)).unwrap();

    let (_, link) = drop_and_connect(&mut ws, &resolver, "math_number", Point::ZERO);
    let link = link.unwrap();
    assert_eq!(link.target, far);
    assert_eq!(link.socket, SocketRef::input(far, "A"));
}

#[test]
fn incompatible_blocks_stay_where_they_were_dropped() {
    let mut ws = surface();
    let resolver = ConnectionResolver::default();
    let cond = ws.spawn("controls_if", Point::ZERO).unwrap();

    let at = Point::new(20.0, 20.0);
    let (number, link) = drop_and_connect(&mut ws, &resolver, "math_number", at);
    assert_eq!(link, None);
    assert_eq!(ws.parent(number), None);
    assert_eq!(ws.bounds(number).unwrap().origin(), at);
    assert_eq!(ws.occupied_inputs(cond), 0);
}

#[test]
fn insertion_splices_into_the_middle_of_a_stack() {
    let mut ws = surface();
    let resolver = ConnectionResolver::default();
    let first = ws.spawn("text_print", Point::ZERO).unwrap();
    let second = ws.create_block("text_print").unwrap();
    stack(&mut ws, first, second);
    ws.select(Some(second));

    let (new, link) = drop_and_connect(&mut ws, &resolver, "text_print", Point::new(0.0, 20.0));
    let link = link.unwrap();
    assert_eq!(link.shape, ConnectionShape::Insertion);
    assert_eq!(link.target, second);
    assert_eq!(
        ws.parent(new),
        Some(SocketRef::new(first, ConnectionPoint::Next))
    );
    assert_eq!(
        ws.parent(second),
        Some(SocketRef::new(new, ConnectionPoint::Next))
    );
    assert_eq!(
        ws.bounds(second).unwrap().y0,
        ws.bounds(new).unwrap().y1
    );
}

#[test]
fn wrapping_moves_the_target_inside() {
    let mut ws = surface();
    let resolver = ConnectionResolver::default();
    let first = ws.spawn("text_print", Point::ZERO).unwrap();
    let second = ws.create_block("text_print").unwrap();
    stack(&mut ws, first, second);
    ws.select(Some(second));

    let (wrapper, link) = drop_and_connect(&mut ws, &resolver, "wrapper", Point::new(0.0, 20.0));
    let link = link.unwrap();
    assert_eq!(link.shape, ConnectionShape::Wrap);
    assert_eq!(link.socket, SocketRef::input(wrapper, "DO"));
    assert_eq!(
        ws.parent(wrapper),
        Some(SocketRef::new(first, ConnectionPoint::Next))
    );
    assert_eq!(ws.parent(second), Some(SocketRef::input(wrapper, "DO")));
}

#[test]
fn selected_block_is_tried_before_nearer_ones() {
    let mut ws = surface();
    let resolver = ConnectionResolver::default();
    let _near = ws.spawn("text_print", Point::ZERO).unwrap();
    let far = ws.spawn("text_print", Point::new(0.0, 150.0)).unwrap();
    ws.select(Some(far));

    let (_, link) = drop_and_connect(&mut ws, &resolver, "text_print", Point::new(0.0, 40.0));
    assert_eq!(link.unwrap().target, far);
}

#[test]
fn blocks_outside_the_radius_are_ignored() {
    let mut ws = surface();
    let resolver = ConnectionResolver::new(ConnectionConfig::default().with_radius(10.0));
    ws.spawn("text_print", Point::new(0.0, 100.0)).unwrap();

    let (_, link) = drop_and_connect(&mut ws, &resolver, "text_print", Point::ZERO);
    assert_eq!(link, None);
}

#[test]
fn a_block_never_connects_to_its_own_children() {
    let mut ws = surface();
    let resolver = ConnectionResolver::default();
    let repeat = ws.create_block("controls_repeat_ext").unwrap();
    let body = ws.create_block("text_print").unwrap();
    ws.connect(
        &SocketRef::input(repeat, "DO"),
        &SocketRef::new(body, ConnectionPoint::Previous),
    )
    .unwrap();

    let at = Point::new(50.0, 50.0);
    ws.move_block(repeat, at).unwrap();
    let ctx = resolver.context(&ws, repeat, at);
    assert!(ctx.nearby.is_empty());
    assert_eq!(resolver.connect(&mut ws, repeat, at), None);
    assert_eq!(ws.parent(body), Some(SocketRef::input(repeat, "DO")));
}

#[test]
fn disabled_connection_only_positions() {
    let mut ws = surface();
    ws.spawn("text_print", Point::ZERO).unwrap();
    let mut placer = Placer::new(
        Positioner::new(Positioning::Mouse),
        ConnectionResolver::new(ConnectionConfig::default().with_enabled(false)),
    );

    let first = ws.create_block("math_number").unwrap();
    let second = ws.create_block("math_number").unwrap();
    let a = placer.place(&mut ws, first, Point::new(300.0, 300.0)).unwrap();
    let b = placer.place(&mut ws, second, Point::new(300.0, 300.0)).unwrap();
    assert_eq!(a.connection, None);
    assert_eq!(b.connection, None);
    assert_eq!(b.drop_point, Point::new(320.0, 320.0));
    assert_eq!(ws.bounds(second).unwrap().origin(), b.drop_point);
}
