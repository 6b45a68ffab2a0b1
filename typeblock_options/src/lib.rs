// Copyright 2025 the Typeblock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Typeblock Options: candidate generation and ranking for the floating input.
//!
//! An [`OptionGenerator`] turns the surface's registries into [`BlockOption`]s:
//!
//! - [`StaticGenerator`]: a list supplied up front.
//! - [`BaseGenerator`]: registered block types (minus a denylist), get/set pairs
//!   for declared and in-scope variables, and calls for procedure definitions.
//! - [`SmartGenerator`]: the base list re-ranked for each keystroke, with pattern
//!   matches and examples in front and general-purpose fallbacks for short inputs.
//!
//! Options are identified by the pair (block type, display text); every list a
//! generator returns holds each pair once.
//!
//! Non-input-aware generators produce a full list that an [`OptionMatcher`]
//! narrows per query. [`SubstringMatcher`] is the default.
//!
//! Display labels come from a [`LabelTable`] built once per session and shared by
//! reference, so the host registry is never modified.
//!
//! ```rust
//! use std::rc::Rc;
//!
//! use typeblock_host::memory::MemoryWorkspace;
//! use typeblock_host::{SurfaceId, Workspace};
//! use typeblock_options::{BaseGenerator, LabelTable, OptionGenerator, SmartGenerator};
//! use typeblock_pattern::PatternEngine;
//!
//! let mut ws = MemoryWorkspace::with_standard_blocks(SurfaceId(1));
//! ws.create_variable("count").unwrap();
//!
//! let labels = Rc::new(LabelTable::from_descriptors(&ws.block_types().unwrap()));
//! let mut smart = SmartGenerator::new(BaseGenerator::new(labels));
//! let mut patterns = PatternEngine::default();
//!
//! let options = smart
//!     .generate_options_for_input(&ws, &mut patterns, "2 + 3")
//!     .unwrap();
//! assert_eq!(options[0].display_text, "2 + 3");
//! assert_eq!(options[0].block_type, "math_arithmetic");
//!
//! let options = smart
//!     .generate_options_for_input(&ws, &mut patterns, "get c")
//!     .unwrap();
//! assert!(options.iter().any(|o| o.display_text == "get count"));
//! ```

mod generator;
mod labels;
mod matcher;
mod option;
mod smart;

pub use generator::{
    BaseGenerator, GenerateError, OptionGenerator, StaticGenerator, is_denylisted,
};
pub use labels::LabelTable;
pub use matcher::{OptionMatcher, SubstringMatcher};
pub use option::{BlockOption, OptionSet};
pub use smart::{ScoringWeights, SmartGenerator, fallback_options};
