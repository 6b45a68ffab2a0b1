// Copyright 2025 the Typeblock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Connection strategies: the ways a new block can join an existing one.

use core::fmt;
use std::sync::Arc;

use kurbo::Point;
use tracing::debug;
use typeblock_host::{BlockId, Check, ConnectionPoint, HostError, InputKind, SocketRef, Workspace};

/// How a new block was joined to its target.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ConnectionShape {
    /// Appended after the target's next connection.
    Statement,
    /// Plugged into one of the target's value inputs.
    ValueInput,
    /// Spliced in before the target, taking over its predecessor.
    Insertion,
    /// The target was moved into the new block's statement input.
    Wrap,
}

impl ConnectionShape {
    /// Priority used by the built-in strategy of this shape.
    #[must_use]
    pub const fn default_priority(self) -> i32 {
        match self {
            Self::Statement => 90,
            Self::ValueInput => 80,
            Self::Insertion => 70,
            Self::Wrap => 60,
        }
    }
}

impl fmt::Display for ConnectionShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Statement => "statement",
            Self::ValueInput => "value input",
            Self::Insertion => "insertion",
            Self::Wrap => "wrap",
        })
    }
}

/// What the resolver knows when trying to connect a new block.
#[derive(Clone, Debug, PartialEq)]
pub struct ConnectionContext {
    /// Block selected on the surface, if any.
    pub selected: Option<BlockId>,
    /// Where the new block was dropped, in workspace coordinates.
    pub drop_point: Point,
    /// Candidate blocks near the drop point, nearest first.
    pub nearby: Vec<BlockId>,
}

/// A successful connection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Connection {
    /// Shape of the link.
    pub shape: ConnectionShape,
    /// Existing block the new block was joined to.
    pub target: BlockId,
    /// Parent-side socket that received the child.
    pub socket: SocketRef,
}

/// Why a strategy did not apply.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{shape} connection rejected: {reason}")]
pub struct Rejection {
    /// Strategy that rejected.
    pub shape: ConnectionShape,
    /// Human-readable reason.
    pub reason: String,
}

impl Rejection {
    fn new(shape: ConnectionShape, reason: impl Into<String>) -> Self {
        Self {
            shape,
            reason: reason.into(),
        }
    }

    fn host(shape: ConnectionShape, err: HostError) -> Self {
        Self::new(shape, err.to_string())
    }
}

/// Outcome of one strategy attempt.
pub type ConnectionResult = Result<Connection, Rejection>;

/// One way of joining a new block to a target.
///
/// A strategy either links the two blocks and reports the socket it used, or
/// leaves the surface as it found it and explains why.
pub trait ConnectionStrategy: fmt::Debug {
    /// Shape of the links this strategy makes.
    fn shape(&self) -> ConnectionShape;

    /// Higher priorities are tried first.
    fn priority(&self) -> i32 {
        self.shape().default_priority()
    }

    /// Tries to join `block` to `target`.
    fn try_connect(
        &self,
        ws: &mut dyn Workspace,
        block: BlockId,
        target: BlockId,
        ctx: &ConnectionContext,
    ) -> ConnectionResult;
}

/// The built-in strategies, highest priority first.
#[must_use]
pub fn default_strategies() -> Vec<Arc<dyn ConnectionStrategy>> {
    vec![
        Arc::new(StatementStrategy),
        Arc::new(ValueInputStrategy),
        Arc::new(InsertionStrategy),
        Arc::new(WrapStrategy),
    ]
}

/// Appends the new block below a target whose top edge is not below the drop
/// point.
#[derive(Copy, Clone, Debug, Default)]
pub struct StatementStrategy;

impl ConnectionStrategy for StatementStrategy {
    fn shape(&self) -> ConnectionShape {
        ConnectionShape::Statement
    }

    fn try_connect(
        &self,
        ws: &mut dyn Workspace,
        block: BlockId,
        target: BlockId,
        ctx: &ConnectionContext,
    ) -> ConnectionResult {
        let shape = self.shape();
        let plug = unattached_plug(ws, shape, block, ConnectionPoint::Previous)?;
        let Some(next) = ws.socket(target, &ConnectionPoint::Next) else {
            return Err(Rejection::new(shape, "target has no next connection"));
        };
        if !next.is_free() {
            return Err(Rejection::new(shape, "target already has a next block"));
        }
        let Some(bounds) = ws.bounds(target) else {
            return Err(Rejection::new(shape, "target has no bounds"));
        };
        if bounds.y0 > ctx.drop_point.y {
            return Err(Rejection::new(shape, "target lies below the drop point"));
        }
        let socket = SocketRef::new(target, ConnectionPoint::Next);
        link(ws, shape, &socket, &plug)?;
        Ok(Connection {
            shape,
            target,
            socket,
        })
    }
}

/// Plugs the new block into the target's first free compatible value input.
#[derive(Copy, Clone, Debug, Default)]
pub struct ValueInputStrategy;

impl ConnectionStrategy for ValueInputStrategy {
    fn shape(&self) -> ConnectionShape {
        ConnectionShape::ValueInput
    }

    fn try_connect(
        &self,
        ws: &mut dyn Workspace,
        block: BlockId,
        target: BlockId,
        _ctx: &ConnectionContext,
    ) -> ConnectionResult {
        let shape = self.shape();
        let plug = unattached_plug(ws, shape, block, ConnectionPoint::Output)?;
        let Some(output) = ws.socket(block, &ConnectionPoint::Output) else {
            return Err(Rejection::new(shape, "block has no output"));
        };
        let Some(input) = ws.inputs(target).into_iter().find(|i| {
            i.kind == InputKind::Value && !i.is_occupied() && i.check.accepts(&output.check)
        }) else {
            return Err(Rejection::new(shape, "target has no free compatible value input"));
        };
        let socket = SocketRef::input(target, input.name);
        link(ws, shape, &socket, &plug)?;
        Ok(Connection {
            shape,
            target,
            socket,
        })
    }
}

/// Places the new block immediately before the target in its stack.
#[derive(Copy, Clone, Debug, Default)]
pub struct InsertionStrategy;

impl ConnectionStrategy for InsertionStrategy {
    fn shape(&self) -> ConnectionShape {
        ConnectionShape::Insertion
    }

    fn try_connect(
        &self,
        ws: &mut dyn Workspace,
        block: BlockId,
        target: BlockId,
        _ctx: &ConnectionContext,
    ) -> ConnectionResult {
        let shape = self.shape();
        let Some(next) = ws.socket(block, &ConnectionPoint::Next) else {
            return Err(Rejection::new(shape, "block has no next connection"));
        };
        if !next.is_free() {
            return Err(Rejection::new(shape, "block already has a next block"));
        }
        let host = SocketRef::new(block, ConnectionPoint::Next);
        splice(ws, shape, block, target, host, &next.check)
    }
}

/// Moves the target into the new block's first free statement input.
#[derive(Copy, Clone, Debug, Default)]
pub struct WrapStrategy;

impl ConnectionStrategy for WrapStrategy {
    fn shape(&self) -> ConnectionShape {
        ConnectionShape::Wrap
    }

    fn try_connect(
        &self,
        ws: &mut dyn Workspace,
        block: BlockId,
        target: BlockId,
        _ctx: &ConnectionContext,
    ) -> ConnectionResult {
        let shape = self.shape();
        let Some(input) = ws
            .inputs(block)
            .into_iter()
            .find(|i| i.kind == InputKind::Statement && !i.is_occupied())
        else {
            return Err(Rejection::new(shape, "block has no free statement input"));
        };
        let host = SocketRef::input(block, input.name);
        splice(ws, shape, block, target, host, &input.check)
    }
}

/// Returns the child-side socket of `block` if it exists and `block` is free.
fn unattached_plug(
    ws: &dyn Workspace,
    shape: ConnectionShape,
    block: BlockId,
    point: ConnectionPoint,
) -> Result<SocketRef, Rejection> {
    if !ws.has_socket(block, &point) {
        return Err(Rejection::new(shape, format!("block has no {point} connection")));
    }
    if ws.parent(block).is_some() {
        return Err(Rejection::new(shape, "block is already attached"));
    }
    Ok(SocketRef::new(block, point))
}

fn link(
    ws: &mut dyn Workspace,
    shape: ConnectionShape,
    parent: &SocketRef,
    child: &SocketRef,
) -> Result<(), Rejection> {
    ws.connect(parent, child)
        .map_err(|err| Rejection::host(shape, err))
}

/// Detaches `target` from its predecessor, hands the predecessor to `block`, and
/// attaches `target` to `host` on `block`.
///
/// On failure every link that was broken is restored.
fn splice(
    ws: &mut dyn Workspace,
    shape: ConnectionShape,
    block: BlockId,
    target: BlockId,
    host: SocketRef,
    host_check: &Check,
) -> ConnectionResult {
    if ws.parent(block).is_some() {
        return Err(Rejection::new(shape, "block is already attached"));
    }
    let Some(target_prev) = ws.socket(target, &ConnectionPoint::Previous) else {
        return Err(Rejection::new(shape, "target has no previous connection"));
    };
    if !host_check.accepts(&target_prev.check) {
        return Err(Rejection::new(shape, "checks do not match"));
    }
    let predecessor = ws
        .parent(target)
        .filter(|_| target_prev.target.is_some());
    let block_prev = SocketRef::new(block, ConnectionPoint::Previous);
    if let Some(pred) = &predecessor {
        let Some(block_plug) = ws.socket(block, &ConnectionPoint::Previous) else {
            return Err(Rejection::new(shape, "block cannot take the target's place"));
        };
        let accepts = ws
            .socket(pred.block, &pred.point)
            .is_some_and(|s| s.check.accepts(&block_plug.check));
        if !accepts {
            return Err(Rejection::new(shape, "predecessor does not accept the block"));
        }
    }

    let target_plug = SocketRef::new(target, ConnectionPoint::Previous);
    if let Some(pred) = &predecessor {
        ws.disconnect(&target_plug)
            .map_err(|err| Rejection::host(shape, err))?;
        if let Err(err) = ws.connect(pred, &block_prev) {
            relink(ws, pred, &target_plug);
            return Err(Rejection::host(shape, err));
        }
    }
    if let Err(err) = ws.connect(&host, &target_plug) {
        if let Some(pred) = &predecessor {
            if let Err(undo) = ws.disconnect(&block_prev) {
                debug!(%undo, "could not detach block while restoring");
            }
            relink(ws, pred, &target_plug);
        }
        return Err(Rejection::host(shape, err));
    }
    Ok(Connection {
        shape,
        target,
        socket: host,
    })
}

fn relink(ws: &mut dyn Workspace, parent: &SocketRef, child: &SocketRef) {
    if let Err(err) = ws.connect(parent, child) {
        debug!(%err, "could not restore link");
    }
}
