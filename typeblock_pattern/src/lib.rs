// Copyright 2025 the Typeblock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Typeblock Pattern: recognize literal and expression syntax in typed text.
//!
//! A [`PatternEngine`] holds a priority-ordered set of [`InputPattern`]s. Given a
//! raw input it tests every grammar against the trimmed text, scores each match,
//! and reports the best one as a [`PatternDetectionResult`]. The winning pattern
//! turns its match into a [`BlockCreationInstruction`], a host-independent plan
//! for a block and the value blocks nested into it.
//!
//! ## Built-in patterns
//!
//! | name | priority | input | plan |
//! |---|---|---|---|
//! | `number` | 100 | `42`, `-3.14` | `math_number` with `NUM` |
//! | `text` | 95 | `"hi"`, `'hi'` | `text` with `TEXT` unquoted |
//! | `boolean` | 90 | `true`, `FALSE` | `logic_boolean` with `BOOL` = `TRUE`/`FALSE` |
//! | `variable_assignment` | 85 | `set x to 5` | `variables_set` with a `VALUE` child |
//! | `math_expression` | 80 | `2 + 3` | `math_arithmetic` with `OP` and `A`/`B` children |
//!
//! Each can be switched off through [`BuiltinPatterns`]; integrators add their own
//! grammars with [`RegexPattern`].
//!
//! ## Confidence
//!
//! A match scores [`BASE_CONFIDENCE`], plus [`FULL_MATCH_BONUS`] when it spans the
//! whole trimmed input, plus [`COMPLETE_BONUS`] when the pattern reports the input
//! complete, plus `priority / 1000`, capped at `1.0`. The first match reaching
//! [`SHORT_CIRCUIT_CONFIDENCE`] wins outright; otherwise the highest score at or
//! above the configured threshold wins, earlier patterns winning ties.
//!
//! Results are cached per exact input string until [`PatternEngine::clear_cache`]
//! or [`PatternEngine::update_config`].
//!
//! ```rust
//! use typeblock_pattern::{PatternConfig, PatternEngine};
//!
//! let mut engine = PatternEngine::new(PatternConfig::default());
//! let plan = engine.parse("set total to 5").unwrap();
//! assert_eq!(plan.block_type, "variables_set");
//! assert_eq!(plan.field("VAR"), Some("total"));
//! assert_eq!(plan.children[0].instruction.field("NUM"), Some("5"));
//! ```

mod builtin;
mod custom;
mod engine;
mod instruction;
mod pattern;

pub use builtin::{
    AssignmentPattern, BooleanPattern, BuiltinPatterns, MathExpressionPattern, NumberPattern,
    TextPattern, builtin_patterns,
};
pub use custom::{PatternError, RegexPattern};
pub use engine::{
    BASE_CONFIDENCE, COMPLETE_BONUS, DEFAULT_CONFIDENCE_THRESHOLD, FULL_MATCH_BONUS,
    PatternConfig, PatternDetectionResult, PatternEngine, SHORT_CIRCUIT_CONFIDENCE,
};
pub use instruction::{BlockCreationInstruction, ChildInstruction};
pub use pattern::{InputPattern, PatternMatch};
