// Copyright 2025 the Typeblock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Typeblock Host: the editing-surface interface consumed by the typed-block pipeline.
//!
//! Typeblock lets a user type free text near the pointer and turn it into blocks on a
//! block-based visual editor. This crate defines what the pipeline needs from that
//! editor, and nothing else:
//!
//! - [`Workspace`]: registries (block types, variables, procedures), block queries,
//!   mutation (create, set fields, connect), and change subscription.
//! - [`ScopeAnalyzer`]: an optional hook naming variables that are in scope for the
//!   current selection. [`EnclosingProcedureScope`] reports the parameters of the
//!   procedure definition around the selected block.
//! - [`Viewport`]: scroll + zoom state for converting screen points into workspace
//!   points.
//!
//! ## Blocks and sockets
//!
//! Blocks are referred to by [`BlockId`], a generational handle: once a block is
//! disposed its handle never resolves again, even if the slot is reused.
//!
//! A block exposes up to three plugs ([`ConnectionPoint::Output`],
//! [`ConnectionPoint::Previous`], [`ConnectionPoint::Next`]) plus named inputs.
//! Links always join a child-side plug (output or previous) to a parent-side socket
//! (next or input). Every socket carries a [`Check`], a set of type names;
//! two sockets are compatible when either is unrestricted or the sets overlap.
//!
//! ## Change events
//!
//! Hosts publish [`ChangeEvent`]s to every sink registered with
//! [`Workspace::subscribe`]. [`ChangeKind::affects_options`] separates the kinds
//! that can change which blocks are offered from pure UI or move noise.
//!
//! ## Reference host
//!
//! With the `memory` feature, [`memory::MemoryWorkspace`] implements [`Workspace`]
//! in memory, together with a small library of standard block shapes.
//!
//! ```rust
//! # #[cfg(feature = "memory")]
//! # {
//! use typeblock_host::memory::MemoryWorkspace;
//! use typeblock_host::{SurfaceId, Workspace};
//!
//! let mut ws = MemoryWorkspace::with_standard_blocks(SurfaceId(7));
//! let n = ws.create_block("math_number").unwrap();
//! ws.set_field(n, "NUM", "42").unwrap();
//! assert_eq!(ws.field_value(n, "NUM").as_deref(), Some("42"));
//! assert!(ws.has_block_type("controls_if"));
//! # }
//! ```

mod event;
mod scope;
mod types;
mod viewport;
mod workspace;

#[cfg(feature = "memory")]
pub mod memory;

pub use event::{ChangeEvent, ChangeKind, ListenerId, SurfaceId};
pub use scope::{EnclosingProcedureScope, ScopeAnalyzer};
pub use types::{
    BlockDescriptor, BlockId, Check, ConnectionPoint, FieldKind, InputKind, InputSocket,
    ProcedureInfo, Socket, SocketRef, Variable, VariableId,
};
pub use viewport::Viewport;
pub use workspace::{HostError, Workspace};
