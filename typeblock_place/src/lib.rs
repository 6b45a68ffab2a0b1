// Copyright 2025 the Typeblock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Typeblock Place: where new blocks land and what they attach to.
//!
//! Placement has two steps:
//!
//! - A [`Positioner`] turns a pointer position (or a fixed offset) into a
//!   workspace drop point through the surface [`Viewport`](typeblock_host::Viewport),
//!   nudging repeated drops at the same spot diagonally.
//! - A [`ConnectionResolver`] looks at the selected block and the blocks within a
//!   radius of the drop point, found through a [`SpatialIndex`], and runs its
//!   [`ConnectionStrategy`] list against each of them until one links the new
//!   block.
//!
//! The built-in strategies, in priority order:
//!
//! | Shape | Priority | Link |
//! |---|---|---|
//! | [`Statement`](ConnectionShape::Statement) | 90 | after the target's next connection |
//! | [`ValueInput`](ConnectionShape::ValueInput) | 80 | into the target's first free compatible value input |
//! | [`Insertion`](ConnectionShape::Insertion) | 70 | between the target and its predecessor |
//! | [`Wrap`](ConnectionShape::Wrap) | 60 | the target moves into the new block's statement input |
//!
//! [`Placer`] combines both steps.
//!
//! ```rust
//! use kurbo::Point;
//! use typeblock_host::memory::MemoryWorkspace;
//! use typeblock_host::{ConnectionPoint, SurfaceId, Workspace};
//! use typeblock_place::{
//!     ConnectionResolver, ConnectionShape, Placer, Positioner, Positioning,
//! };
//!
//! let mut ws = MemoryWorkspace::with_standard_blocks(SurfaceId(1));
//! let below = ws.spawn("text_print", Point::new(0.0, 60.0)).unwrap();
//! let new = ws.create_block("text_print").unwrap();
//!
//! let mut placer = Placer::new(
//!     Positioner::new(Positioning::Mouse),
//!     ConnectionResolver::default(),
//! );
//! let placement = placer.place(&mut ws, new, Point::new(0.0, 40.0)).unwrap();
//!
//! let link = placement.connection.unwrap();
//! assert_eq!(link.shape, ConnectionShape::Insertion);
//! assert_eq!(ws.socket(new, &ConnectionPoint::Next).unwrap().target, Some(below));
//! ```

mod placer;
mod positioner;
mod resolver;
mod spatial;
mod strategy;

pub use placer::{Placement, Placer};
pub use positioner::{DEFAULT_STACK_STEP, Positioner, Positioning};
pub use resolver::{
    ConnectionConfig, ConnectionResolver, DEFAULT_MAX_NEARBY, DEFAULT_SEARCH_RADIUS,
};
pub use spatial::SpatialIndex;
pub use strategy::{
    Connection, ConnectionContext, ConnectionResult, ConnectionShape, ConnectionStrategy,
    InsertionStrategy, Rejection, StatementStrategy, ValueInputStrategy, WrapStrategy,
    default_strategies,
};
