// Copyright 2025 the Typeblock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tests for the in-memory reference host.
//!
//! These exercise the `Workspace` contract as the rest of the pipeline relies on it:
//! generational handles, socket pairing and checks, layout of attached blocks, and
//! change notification.

use std::sync::mpsc;

use kurbo::Point;
use pretty_assertions::assert_eq;
use serde_json::json;
use typeblock_host::memory::{BlockTemplate, MemoryWorkspace};
use typeblock_host::{
    ChangeKind, Check, ConnectionPoint, EnclosingProcedureScope, HostError, ScopeAnalyzer,
    SocketRef, SurfaceId, Workspace,
};

fn ws() -> MemoryWorkspace {
    MemoryWorkspace::with_standard_blocks(SurfaceId(1))
}

fn out(block: typeblock_host::BlockId) -> SocketRef {
    SocketRef::new(block, ConnectionPoint::Output)
}

fn prev(block: typeblock_host::BlockId) -> SocketRef {
    SocketRef::new(block, ConnectionPoint::Previous)
}

fn next(block: typeblock_host::BlockId) -> SocketRef {
    SocketRef::new(block, ConnectionPoint::Next)
}

#[test]
fn unknown_block_type_is_rejected() {
    let mut ws = ws();
    assert_eq!(
        ws.create_block("no_such_block"),
        Err(HostError::UnknownBlockType("no_such_block".into()))
    );
    assert!(ws.blocks().is_empty());
}

#[test]
fn disposed_handles_never_resolve_again() {
    let mut ws = ws();
    let a = ws.create_block("text").unwrap();
    ws.dispose_block(a).unwrap();
    let b = ws.create_block("text").unwrap();

    assert_eq!(a.slot(), b.slot());
    assert_ne!(a, b);
    assert_eq!(ws.block_type(a), None);
    assert_eq!(ws.block_type(b), Some("text"));
    assert_eq!(ws.dispose_block(a), Err(HostError::StaleBlock(a)));
}

#[test]
fn set_field_requires_a_declared_field() {
    let mut ws = ws();
    let n = ws.create_block("math_number").unwrap();
    ws.set_field(n, "NUM", "3").unwrap();
    assert_eq!(ws.field_value(n, "NUM").as_deref(), Some("3"));
    assert!(matches!(
        ws.set_field(n, "TEXT", "x"),
        Err(HostError::UnknownField { .. })
    ));
}

#[test]
fn value_input_accepts_compatible_output() {
    let mut ws = ws();
    let add = ws.create_block("math_arithmetic").unwrap();
    let n = ws.create_block("math_number").unwrap();
    ws.connect(&SocketRef::input(add, "A"), &out(n)).unwrap();

    assert_eq!(ws.parent(n), Some(SocketRef::input(add, "A")));
    assert_eq!(ws.occupied_inputs(add), 1);
    assert!(ws.has_free_value_input(add));
}

#[test]
fn connect_is_symmetric_in_argument_order() {
    let mut ws = ws();
    let add = ws.create_block("math_arithmetic").unwrap();
    let n = ws.create_block("math_number").unwrap();
    ws.connect(&out(n), &SocketRef::input(add, "B")).unwrap();
    assert_eq!(ws.parent(n), Some(SocketRef::input(add, "B")));
}

#[test]
fn incompatible_checks_are_rejected() {
    let mut ws = ws();
    let add = ws.create_block("math_arithmetic").unwrap();
    let t = ws.create_block("text").unwrap();
    assert!(matches!(
        ws.connect(&SocketRef::input(add, "A"), &out(t)),
        Err(HostError::Incompatible(..))
    ));
    assert_eq!(ws.parent(t), None);
}

#[test]
fn occupied_socket_is_rejected() {
    let mut ws = ws();
    let add = ws.create_block("math_arithmetic").unwrap();
    let a = ws.create_block("math_number").unwrap();
    let b = ws.create_block("math_number").unwrap();
    ws.connect(&SocketRef::input(add, "A"), &out(a)).unwrap();
    assert_eq!(
        ws.connect(&SocketRef::input(add, "A"), &out(b)),
        Err(HostError::Occupied(SocketRef::input(add, "A")))
    );
}

#[test]
fn mismatched_pairings_are_invalid() {
    let mut ws = ws();
    let print = ws.create_block("text_print").unwrap();
    let other = ws.create_block("text_print").unwrap();
    let n = ws.create_block("math_number").unwrap();

    // Two parent-side sockets.
    assert!(matches!(
        ws.connect(&next(print), &SocketRef::input(other, "TEXT")),
        Err(HostError::InvalidLink(_))
    ));
    // An output cannot go into a next socket.
    assert!(matches!(
        ws.connect(&next(print), &out(n)),
        Err(HostError::InvalidLink(_))
    ));
    // A value block has no previous plug.
    assert_eq!(
        ws.connect(&next(print), &prev(n)),
        Err(HostError::MissingSocket(prev(n)))
    );
}

#[test]
fn cycles_are_rejected() {
    let mut ws = ws();
    let a = ws.create_block("text_print").unwrap();
    let b = ws.create_block("text_print").unwrap();
    ws.connect(&next(a), &prev(b)).unwrap();
    assert!(matches!(
        ws.connect(&next(b), &prev(a)),
        Err(HostError::InvalidLink(_))
    ));
}

#[test]
fn attached_blocks_are_laid_out_relative_to_parent() {
    let mut ws = ws();
    let print = ws.spawn("text_print", Point::new(10.0, 10.0)).unwrap();
    let below = ws.create_block("text_print").unwrap();
    let text = ws.create_block("text").unwrap();
    ws.connect(&next(print), &prev(below)).unwrap();
    ws.connect(&SocketRef::input(print, "TEXT"), &out(text)).unwrap();

    let p = ws.bounds(print).unwrap();
    let b = ws.bounds(below).unwrap();
    let t = ws.bounds(text).unwrap();
    assert_eq!(b.origin(), Point::new(p.x0, p.y1));
    assert_eq!(t.origin(), Point::new(p.x1, p.y0));

    // Moving the root carries the whole stack.
    ws.move_block(print, Point::new(100.0, 100.0)).unwrap();
    assert_eq!(ws.bounds(below).unwrap().origin(), Point::new(100.0, 132.0));
    assert!(matches!(
        ws.move_block(below, Point::ZERO),
        Err(HostError::InvalidLink(_))
    ));
}

#[test]
fn disconnect_from_either_side_reports_the_other_end() {
    let mut ws = ws();
    let a = ws.create_block("text_print").unwrap();
    let b = ws.create_block("text_print").unwrap();
    ws.connect(&next(a), &prev(b)).unwrap();
    assert_eq!(ws.disconnect(&next(a)).unwrap(), Some(prev(b)));
    assert_eq!(ws.parent(b), None);

    ws.connect(&next(a), &prev(b)).unwrap();
    assert_eq!(ws.disconnect(&prev(b)).unwrap(), Some(next(a)));
    assert_eq!(ws.disconnect(&prev(b)).unwrap(), None);
}

#[test]
fn dispose_removes_the_attached_subtree() {
    let mut ws = ws();
    let root = ws.create_block("controls_if").unwrap();
    let body = ws.create_block("text_print").unwrap();
    let text = ws.create_block("text").unwrap();
    ws.connect(&SocketRef::input(root, "DO0"), &prev(body)).unwrap();
    ws.connect(&SocketRef::input(body, "TEXT"), &out(text)).unwrap();

    ws.dispose_block(root).unwrap();
    assert!(ws.blocks().is_empty());
}

#[test]
fn disposing_a_child_frees_its_parent_socket() {
    let mut ws = ws();
    let add = ws.create_block("math_arithmetic").unwrap();
    let n = ws.create_block("math_number").unwrap();
    ws.connect(&SocketRef::input(add, "A"), &out(n)).unwrap();
    ws.dispose_block(n).unwrap();
    assert_eq!(ws.occupied_inputs(add), 0);
}

#[test]
fn variables_are_declared_once_per_name() {
    let mut ws = ws();
    let x = ws.create_variable("x").unwrap();
    let again = ws.create_variable("X").unwrap();
    assert_eq!(x, again);
    assert_eq!(ws.variables().unwrap().len(), 1);
    assert_eq!(ws.variable_by_name("x").map(|v| v.id), Some(x.id));
    assert_eq!(
        ws.create_variable("  "),
        Err(HostError::VariableRejected("  ".into()))
    );
}

#[test]
fn procedures_are_derived_from_definition_blocks() {
    let mut ws = ws();
    let def = ws.create_block("procedures_defreturn").unwrap();
    ws.set_field(def, "NAME", "area").unwrap();
    ws.set_extra_state(def, &json!({ "params": ["w", "h"] }))
        .unwrap();
    // Unnamed definitions are not callable.
    ws.create_block("procedures_defnoreturn").unwrap();

    let procs = ws.procedures().unwrap();
    assert_eq!(procs.len(), 1);
    assert_eq!(procs[0].name, "area");
    assert_eq!(procs[0].params, vec!["w".to_owned(), "h".to_owned()]);
    assert!(procs[0].returns_value);
}

#[test]
fn enumeration_failure_is_reported() {
    let mut ws = ws();
    ws.set_enumeration_failure(true);
    assert!(matches!(ws.block_types(), Err(HostError::Enumeration(_))));
    assert!(matches!(ws.variables(), Err(HostError::Enumeration(_))));
    assert!(matches!(ws.procedures(), Err(HostError::Enumeration(_))));
}

#[test]
fn listeners_receive_changes_until_unsubscribed() {
    let mut ws = ws();
    let (tx, rx) = mpsc::channel();
    let id = ws.subscribe(tx);

    let b = ws.create_block("text").unwrap();
    ws.set_field(b, "TEXT", "hi").unwrap();
    let events: Vec<_> = rx.try_iter().collect();
    let kinds: Vec<_> = events.iter().map(|e| e.kind).collect();
    assert_eq!(kinds, vec![ChangeKind::BlockCreated, ChangeKind::BlockChanged]);
    assert!(events.iter().all(|e| e.surface == SurfaceId(1)));

    ws.unsubscribe(id);
    assert_eq!(ws.listener_count(), 0);
    ws.create_block("text").unwrap();
    assert_eq!(rx.try_iter().count(), 0);
}

#[test]
fn dropped_receivers_are_pruned_on_emit() {
    let mut ws = ws();
    let (tx, rx) = mpsc::channel();
    ws.subscribe(tx);
    drop(rx);
    ws.emit(ChangeKind::Ui);
    assert_eq!(ws.listener_count(), 0);
}

#[test]
fn custom_templates_can_be_registered() {
    let mut ws = MemoryWorkspace::new(SurfaceId(2));
    ws.register(
        BlockTemplate::new("colour_picker")
            .label("colour")
            .dropdown("COLOUR")
            .output(Check::of(["Colour"])),
    );
    let types = ws.block_types().unwrap();
    assert_eq!(types.len(), 1);
    assert_eq!(types[0].label.as_deref(), Some("colour"));
}

#[test]
fn enclosing_procedure_parameters_are_in_scope() {
    let mut ws = ws();
    let def = ws.create_block("procedures_defnoreturn").unwrap();
    ws.set_field(def, "NAME", "greet").unwrap();
    ws.set_extra_state(def, &json!({ "params": ["who"] }))
        .unwrap();
    let body = ws.create_block("text_print").unwrap();
    ws.connect(&SocketRef::input(def, "STACK"), &prev(body))
        .unwrap();

    let scope = EnclosingProcedureScope;
    assert!(scope.local_variables_in_scope(&ws).is_empty());

    ws.select(Some(body));
    assert_eq!(scope.local_variables_in_scope(&ws), vec!["who".to_owned()]);

    let loose = ws.create_block("text_print").unwrap();
    ws.select(Some(loose));
    assert_eq!(scope.local_variables_from_selection(&ws), None);
}
