// Copyright 2025 the Typeblock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The host editing surface abstraction.

use std::sync::mpsc::Sender;

use kurbo::{Point, Rect};

use crate::event::{ChangeEvent, ListenerId, SurfaceId};
use crate::types::{
    BlockDescriptor, BlockId, ConnectionPoint, FieldKind, InputKind, InputSocket, ProcedureInfo,
    Socket, SocketRef, Variable,
};
use crate::viewport::Viewport;

/// Errors reported by a host surface.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum HostError {
    /// No block type with this identifier is registered.
    #[error("unknown block type `{0}`")]
    UnknownBlockType(String),
    /// The handle does not refer to a live block.
    #[error("block {0} is not alive")]
    StaleBlock(BlockId),
    /// The block type declares no such field.
    #[error("block type `{block_type}` has no field `{field}`")]
    UnknownField {
        /// Type of the block the field was looked up on.
        block_type: String,
        /// Field name.
        field: String,
    },
    /// The block has no socket at this connection point.
    #[error("no socket at {0}")]
    MissingSocket(SocketRef),
    /// The socket already holds a connection.
    #[error("{0} is already connected")]
    Occupied(SocketRef),
    /// The two sockets carry disjoint type checks.
    #[error("{0} and {1} have incompatible checks")]
    Incompatible(SocketRef, SocketRef),
    /// The two sockets cannot form a link (wrong pairing, or the link would form a cycle).
    #[error("invalid link: {0}")]
    InvalidLink(&'static str),
    /// A variable could not be declared.
    #[error("variable `{0}` could not be declared")]
    VariableRejected(String),
    /// Walking editor state failed.
    #[error("enumeration failed: {0}")]
    Enumeration(String),
}

/// Capabilities the typed-block pipeline consumes from a host editing surface.
///
/// The pipeline treats registries as read-only except for
/// [`create_variable`](Self::create_variable), which construction uses to
/// auto-declare a variable referenced by name.
///
/// All coordinates returned by the surface are workspace coordinates; use
/// [`viewport`](Self::viewport) to convert from screen space.
pub trait Workspace {
    /// Identifier of this surface, as carried by its change events.
    fn surface_id(&self) -> SurfaceId;

    // -------------------------------------------------------------------------
    // Registries
    // -------------------------------------------------------------------------

    /// All registered block types.
    fn block_types(&self) -> Result<Vec<BlockDescriptor>, HostError>;

    /// Returns `true` if `type_name` is a registered block type.
    fn has_block_type(&self, type_name: &str) -> bool;

    /// All declared variables.
    fn variables(&self) -> Result<Vec<Variable>, HostError>;

    /// Looks up a variable by display name.
    fn variable_by_name(&self, name: &str) -> Option<Variable>;

    /// Declares a variable, returning the existing one if the name is taken.
    fn create_variable(&mut self, name: &str) -> Result<Variable, HostError>;

    /// All procedure definitions on the surface.
    fn procedures(&self) -> Result<Vec<ProcedureInfo>, HostError>;

    // -------------------------------------------------------------------------
    // Block queries
    // -------------------------------------------------------------------------

    /// All live blocks, top-level and nested.
    fn blocks(&self) -> Vec<BlockId>;

    /// Type identifier of a live block.
    fn block_type(&self, block: BlockId) -> Option<&str>;

    /// Current value of a field.
    fn field_value(&self, block: BlockId, field: &str) -> Option<String>;

    /// Kind of a field on a live block.
    fn field_kind(&self, block: BlockId, field: &str) -> Option<FieldKind>;

    /// Opaque extra state of a block, if any.
    fn extra_state(&self, block: BlockId) -> Option<serde_json::Value>;

    /// Named inputs of a block, in declaration order.
    fn inputs(&self, block: BlockId) -> Vec<InputSocket>;

    /// Output, previous, or next connection of a block; `None` if the block lacks it.
    ///
    /// For [`ConnectionPoint::Input`] hosts may also answer, with the input's check
    /// and target.
    fn socket(&self, block: BlockId, point: &ConnectionPoint) -> Option<Socket>;

    /// The parent-side socket this block is currently plugged into.
    fn parent(&self, block: BlockId) -> Option<SocketRef>;

    /// Workspace-space bounds of a block.
    fn bounds(&self, block: BlockId) -> Option<Rect>;

    /// The block currently selected by the user.
    fn selected(&self) -> Option<BlockId>;

    /// Current scroll and zoom.
    fn viewport(&self) -> Viewport;

    // -------------------------------------------------------------------------
    // Mutation
    // -------------------------------------------------------------------------

    /// Instantiates a block of the given type.
    fn create_block(&mut self, type_name: &str) -> Result<BlockId, HostError>;

    /// Deletes a block together with everything attached below it.
    fn dispose_block(&mut self, block: BlockId) -> Result<(), HostError>;

    /// Sets a field value.
    fn set_field(&mut self, block: BlockId, field: &str, value: &str) -> Result<(), HostError>;

    /// Applies opaque extra (mutator) state.
    fn set_extra_state(
        &mut self,
        block: BlockId,
        state: &serde_json::Value,
    ) -> Result<(), HostError>;

    /// Moves a top-level block to a workspace position.
    fn move_block(&mut self, block: BlockId, to: Point) -> Result<(), HostError>;

    /// Connects two compatible sockets.
    ///
    /// One side must be a child-side plug (output or previous) and the other a
    /// parent-side socket (next or input). Both must be free.
    fn connect(&mut self, a: &SocketRef, b: &SocketRef) -> Result<(), HostError>;

    /// Breaks whatever link `socket` takes part in, returning the socket that was on
    /// the other end, or `None` if `socket` was not connected.
    fn disconnect(&mut self, socket: &SocketRef) -> Result<Option<SocketRef>, HostError>;

    // -------------------------------------------------------------------------
    // Notifications
    // -------------------------------------------------------------------------

    /// Registers a sink that receives every change event of this surface.
    fn subscribe(&mut self, sink: Sender<ChangeEvent>) -> ListenerId;

    /// Removes a sink registered with [`subscribe`](Self::subscribe).
    fn unsubscribe(&mut self, listener: ListenerId);

    // -------------------------------------------------------------------------
    // Provided helpers
    // -------------------------------------------------------------------------

    /// Number of inputs currently holding a block.
    fn occupied_inputs(&self, block: BlockId) -> usize {
        self.inputs(block).iter().filter(|i| i.is_occupied()).count()
    }

    /// Returns `true` if the block has at least one free value input.
    fn has_free_value_input(&self, block: BlockId) -> bool {
        self.inputs(block)
            .iter()
            .any(|i| i.kind == InputKind::Value && !i.is_occupied())
    }

    /// Returns `true` if the block has a connection at `point`.
    fn has_socket(&self, block: BlockId, point: &ConnectionPoint) -> bool {
        self.socket(block, point).is_some()
    }
}
