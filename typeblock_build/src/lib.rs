// Copyright 2025 the Typeblock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Typeblock Build: turn typed text, options, and instruction trees into blocks.
//!
//! [`BlockFactory`] is the only part of the pipeline that creates blocks:
//!
//! - [`BlockFactory::create_block`] resolves text through variable and procedure
//!   references, block type identifiers, and labels.
//! - [`BlockFactory::create_block_from_instruction`] materializes a
//!   [`BlockCreationInstruction`](typeblock_pattern::BlockCreationInstruction) tree,
//!   declaring variables named by variable fields.
//! - [`BlockFactory::create_from_text`] tries pattern recognition before
//!   `create_block`, and [`BlockFactory::create_block_from_option`] builds a chosen
//!   list option.
//!
//! Failures are [`BuildError`]s. [`BuildError::is_miss`] separates input that
//! names nothing (no block is created, the user keeps typing) from host
//! failures during construction. A failed tree never leaves its root behind.
//!
//! ```rust
//! use std::rc::Rc;
//!
//! use typeblock_build::BlockFactory;
//! use typeblock_host::memory::MemoryWorkspace;
//! use typeblock_host::{SurfaceId, Workspace};
//! use typeblock_options::LabelTable;
//! use typeblock_pattern::PatternEngine;
//!
//! let mut ws = MemoryWorkspace::with_standard_blocks(SurfaceId(1));
//! let factory = BlockFactory::new(Rc::new(LabelTable::new()));
//! let mut patterns = PatternEngine::default();
//!
//! let root = factory
//!     .create_from_text(&mut ws, &mut patterns, "set n to 3")
//!     .unwrap();
//! assert_eq!(ws.block_type(root), Some("variables_set"));
//! // The variable was declared and the field holds its id.
//! let n = ws.variable_by_name("n").unwrap();
//! assert_eq!(ws.field_value(root, "VAR"), Some(n.id.as_str().to_owned()));
//! assert_eq!(ws.blocks().len(), 2);
//! ```

mod error;
mod factory;

pub use error::{BuildError, ReferenceKind};
pub use factory::BlockFactory;
