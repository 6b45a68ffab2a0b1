// Copyright 2025 the Typeblock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;

use regex::Regex;

use crate::instruction::BlockCreationInstruction;
use crate::pattern::{InputPattern, PatternMatch};

/// Errors raised while building a pattern.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PatternError {
    /// The grammar failed to compile.
    #[error("invalid grammar for pattern `{name}`")]
    InvalidGrammar {
        /// Name of the pattern being built.
        name: String,
        /// Underlying regex error.
        #[source]
        source: regex::Error,
    },
}

type Builder = dyn Fn(&PatternMatch) -> Option<BlockCreationInstruction>;

/// A pattern defined by a regex and a closure, for integrator-supplied grammars.
///
/// ```rust
/// use typeblock_pattern::{BlockCreationInstruction, InputPattern, PatternMatch, RegexPattern};
///
/// let colour = RegexPattern::new("colour", r"^#([0-9a-fA-F]{6})$", 70, |m| {
///     Some(BlockCreationInstruction::new("colour_picker").with_field("COLOUR", m.matched()))
/// })
/// .unwrap()
/// .with_description("Hex colour");
///
/// let m = PatternMatch::find(colour.grammar(), "#ff0000").unwrap();
/// let plan = colour.parse_input(&m).unwrap();
/// assert_eq!(plan.field("COLOUR"), Some("#ff0000"));
/// ```
pub struct RegexPattern {
    name: String,
    description: String,
    priority: i32,
    grammar: Regex,
    build: Box<Builder>,
    examples: Vec<String>,
}

impl fmt::Debug for RegexPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegexPattern")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .field("grammar", &self.grammar.as_str())
            .finish_non_exhaustive()
    }
}

impl RegexPattern {
    /// Compiles `grammar` and wraps `build` as a pattern.
    pub fn new(
        name: impl Into<String>,
        grammar: &str,
        priority: i32,
        build: impl Fn(&PatternMatch) -> Option<BlockCreationInstruction> + 'static,
    ) -> Result<Self, PatternError> {
        let name = name.into();
        let grammar = Regex::new(grammar).map_err(|source| PatternError::InvalidGrammar {
            name: name.clone(),
            source,
        })?;
        Ok(Self {
            name,
            description: String::new(),
            priority,
            grammar,
            build: Box::new(build),
            examples: Vec::new(),
        })
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Adds example completions, offered when an example starts with the input.
    #[must_use]
    pub fn with_examples<I, S>(mut self, examples: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.examples.extend(examples.into_iter().map(Into::into));
        self
    }
}

impl InputPattern for RegexPattern {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn grammar(&self) -> &Regex {
        &self.grammar
    }

    fn parse_input(&self, m: &PatternMatch) -> Option<BlockCreationInstruction> {
        (self.build)(m)
    }

    fn generate_suggestions(&self, input: &str) -> Vec<String> {
        let t = input.trim();
        if t.is_empty() {
            return Vec::new();
        }
        self.examples
            .iter()
            .filter(|e| e.len() > t.len() && crate::builtin::is_word_prefix(t, e))
            .cloned()
            .collect()
    }
}
