// Copyright 2025 the Typeblock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Typeblock Session: create blocks by typing.
//!
//! A [`Session`] attaches the Typeblock pipeline to one editing surface:
//!
//! - typed text is matched against patterns and the surface's blocks, variables
//!   and procedures to produce a ranked option list, presented through a
//!   [`FloatingInput`];
//! - confirming the text or choosing an option builds the block tree, drops it
//!   at the pointer (or a fixed spot) and connects it to a nearby block when
//!   one accepts it;
//! - surface changes invalidate the cached options through a debounced
//!   [`WorkspaceStateTracker`].
//!
//! Everything is configured up front with a [`Config`].
//!
//! Failures never interrupt typing. Text that names nothing, references to
//! missing variables, and construction failures leave the input open and
//! create nothing; generation failures fall back to the last good list; a
//! block no strategy can connect stays where it was dropped.
//!
//! ```rust
//! use kurbo::Point;
//! use typeblock_host::memory::MemoryWorkspace;
//! use typeblock_host::{SurfaceId, Workspace};
//! use typeblock_session::{Config, HeadlessInput, Session};
//!
//! let mut ws = MemoryWorkspace::with_standard_blocks(SurfaceId(1));
//! let mut session = Session::new(&mut ws, Config::default(), HeadlessInput::default()).unwrap();
//!
//! session.show(&ws, Point::new(10.0, 10.0), 0);
//! let options = session.input_changed(&ws, "2 + 3", 5);
//! assert_eq!(options[0].display_text, "2 + 3");
//!
//! let placement = session.confirm(&mut ws).unwrap();
//! assert_eq!(placement.drop_point, Point::new(10.0, 10.0));
//! assert!(!session.is_visible());
//! assert_eq!(ws.blocks().len(), 3);
//!
//! session.dispose(&mut ws);
//! ```

mod config;
mod input;
mod session;
mod tracker;

pub use config::Config;
pub use input::{FloatingInput, HeadlessInput};
pub use session::{Session, SessionDebugInfo};
pub use tracker::{DEFAULT_DEBOUNCE_MS, WorkspaceStateTracker};
