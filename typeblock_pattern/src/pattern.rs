// Copyright 2025 the Typeblock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt::Debug;

use regex::{Captures, Regex};
use smallvec::SmallVec;

use crate::instruction::BlockCreationInstruction;

/// A named, prioritized recognizer for typed text.
///
/// A pattern owns a grammar and knows how to turn a match of that grammar into a
/// [`BlockCreationInstruction`]. Patterns are immutable; the engine shares them by
/// reference.
pub trait InputPattern: Debug {
    /// Unique name, used for configuration overrides.
    fn name(&self) -> &str;

    /// Higher priorities are tested first and win ties.
    fn priority(&self) -> i32;

    /// One-line human description.
    fn description(&self) -> &str {
        ""
    }

    /// The grammar tested against (trimmed) input.
    fn grammar(&self) -> &Regex;

    /// Builds a construction plan from a match, or `None` if the match is unusable.
    fn parse_input(&self, m: &PatternMatch) -> Option<BlockCreationInstruction>;

    /// Example completions for a (possibly partial) input.
    fn generate_suggestions(&self, input: &str) -> Vec<String> {
        let _ = input;
        Vec::new()
    }

    /// Whether `input` is a fully formed instance of this pattern.
    fn is_complete(&self, input: &str) -> bool {
        self.grammar().is_match(input.trim())
    }
}

/// One grammar match over an input string.
///
/// Owns its text so it can be cached independently of the input buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatternMatch {
    input: String,
    start: usize,
    end: usize,
    groups: SmallVec<[Option<String>; 4]>,
}

impl PatternMatch {
    /// Runs `grammar` over `input`, returning the first match.
    #[must_use]
    pub fn find(grammar: &Regex, input: &str) -> Option<Self> {
        grammar
            .captures(input)
            .map(|caps| Self::from_captures(input, &caps))
    }

    /// Captures a regex match.
    #[must_use]
    pub fn from_captures(input: &str, caps: &Captures<'_>) -> Self {
        let (start, end) = caps.get(0).map_or((0, 0), |m| (m.start(), m.end()));
        Self {
            input: input.to_owned(),
            start,
            end,
            groups: caps
                .iter()
                .skip(1)
                .map(|g| g.map(|g| g.as_str().to_owned()))
                .collect(),
        }
    }

    /// The text the grammar was run against.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// The matched slice of the input.
    #[must_use]
    pub fn matched(&self) -> &str {
        &self.input[self.start..self.end]
    }

    /// Capture group `index` (1-based, as in regex syntax).
    #[must_use]
    pub fn group(&self, index: usize) -> Option<&str> {
        self.groups
            .get(index.checked_sub(1)?)
            .and_then(|g| g.as_deref())
    }

    /// Returns `true` if the match covers the whole input.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.start == 0 && self.end == self.input.len()
    }
}
