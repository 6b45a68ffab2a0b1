// Copyright 2025 the Typeblock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pattern-aware per-keystroke ranking.

use core::cmp::Reverse;

use tracing::trace;
use typeblock_host::Workspace;
use typeblock_pattern::PatternEngine;

use crate::generator::{BaseGenerator, GenerateError, OptionGenerator, variable_pair};
use crate::option::{BlockOption, OptionSet};

/// Tunable constants for [`SmartGenerator`] scoring.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ScoringWeights {
    /// Score for an option whose text equals the input.
    pub exact: i32,
    /// Score for an option whose text starts with the input.
    pub prefix: i32,
    /// Score for an option whose text contains the input.
    pub substring: i32,
    /// Bonus when the input's shape matches keywords in the option text.
    pub context_bonus: i32,
    /// Penalty for long option texts on short inputs.
    pub long_label_penalty: i32,
    /// Texts longer than this many characters count as long.
    pub long_label_len: usize,
    /// Inputs shorter than this many characters count as short.
    pub short_input_len: usize,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            exact: 100,
            prefix: 50,
            substring: 25,
            context_bonus: 15,
            long_label_penalty: 10,
            long_label_len: 20,
            short_input_len: 3,
        }
    }
}

/// Scored options kept at least this many.
const MIN_SCORED: usize = 10;
/// Scored and pattern options together stay at or under this many.
const MAX_SCORED_TOTAL: usize = 20;
/// Below this many results short inputs get general-purpose fallbacks.
const FALLBACK_BELOW: usize = 5;
/// Fallback padding stops at this many results.
const FALLBACK_UP_TO: usize = 10;

/// General-purpose candidates offered when little else matches.
pub fn fallback_options() -> Vec<BlockOption> {
    vec![
        BlockOption::new("controls_if", "if"),
        BlockOption::new("controls_repeat_ext", "repeat"),
        BlockOption::new("variables_set", "set variable"),
        BlockOption::new("math_arithmetic", "math"),
        BlockOption::new("text", "text"),
        BlockOption::new("logic_boolean", "true").with_field("BOOL", "TRUE"),
        BlockOption::new("logic_boolean", "false").with_field("BOOL", "FALSE"),
    ]
}

/// Coarse shape of what the user is typing.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum InputShape {
    Numeric,
    Textual,
    Boolean,
    VariableVerb,
    Other,
}

impl InputShape {
    fn classify(input: &str) -> Self {
        let lower = input.to_lowercase();
        let mut chars = lower.chars();
        let first = chars.next();
        let starts_numeric = match first {
            Some(c) if c.is_ascii_digit() => true,
            Some('-') => chars.next().is_some_and(|c| c.is_ascii_digit()),
            _ => false,
        };
        if starts_numeric {
            Self::Numeric
        } else if matches!(first, Some('"' | '\'')) {
            Self::Textual
        } else if is_prefix_of(&lower, "true") || is_prefix_of(&lower, "false") {
            Self::Boolean
        } else if ["set", "get", "change"]
            .iter()
            .any(|verb| is_prefix_of(&lower, verb) || lower.starts_with(&format!("{verb} ")))
        {
            Self::VariableVerb
        } else {
            Self::Other
        }
    }

    fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::Numeric => &["math", "number", "repeat", "arithmetic"],
            Self::Textual => &["text", "print", "join"],
            Self::Boolean => &["true", "false", "logic", "if", "compare"],
            Self::VariableVerb => &["set", "get", "variable"],
            Self::Other => &[],
        }
    }
}

fn is_prefix_of(prefix: &str, word: &str) -> bool {
    !prefix.is_empty() && word.starts_with(prefix)
}

/// Option generator that re-ranks the base list for every keystroke.
///
/// For each input it:
///
/// 1. runs pattern detection and, on a match, puts the literal input first;
/// 2. adds the pattern engine's suggestions and a few contextual examples (a
///    digit `4` yields `42`, `4 + 1` and `4 * 2`);
/// 3. scores every base option against the input with [`ScoringWeights`] and
///    keeps the positive scores, best first;
/// 4. merges pattern candidates, then up to `max(10, 20 - patterns)` scored
///    options, then pads short inputs with [`fallback_options`].
///
/// Only an exact repeat of the previous input is served from cache, and
/// [`generate_options`](OptionGenerator::generate_options) clears it.
#[derive(Clone, Debug)]
pub struct SmartGenerator {
    base: BaseGenerator,
    weights: ScoringWeights,
    last: Option<(String, Vec<BlockOption>)>,
}

impl SmartGenerator {
    /// Wraps `base` with default weights.
    #[must_use]
    pub fn new(base: BaseGenerator) -> Self {
        Self {
            base,
            weights: ScoringWeights::default(),
            last: None,
        }
    }

    /// Replaces the scoring weights.
    #[must_use]
    pub fn with_weights(mut self, weights: ScoringWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Current weights.
    #[must_use]
    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Score of `option` for `input`; zero or less means "drop".
    #[must_use]
    pub fn score(&self, option: &BlockOption, input: &str) -> i32 {
        let w = &self.weights;
        let input = input.trim().to_lowercase();
        let text = option.display_text.to_lowercase();
        let mut score = 0;
        if text == input {
            score = w.exact;
        } else if text.starts_with(&input) {
            score += w.prefix;
        } else if text.contains(&input) {
            score += w.substring;
        }
        let shape = InputShape::classify(&input);
        if shape.keywords().iter().any(|k| text.contains(k)) {
            score += w.context_bonus;
        }
        if input.chars().count() < w.short_input_len && text.chars().count() > w.long_label_len {
            score -= w.long_label_penalty;
        }
        score.max(0)
    }

    /// Turns a candidate string into an option when the pattern engine can place it.
    fn pattern_option(patterns: &mut PatternEngine, text: &str) -> Option<BlockOption> {
        let plan = patterns.detect_pattern(text)?.instruction()?;
        Some(BlockOption::new(plan.block_type, text))
    }

    /// `42`, `4 + 1`, `4 * 2` for a bare numeric input `4`.
    fn numeric_examples(input: &str) -> Vec<String> {
        if InputShape::classify(input) != InputShape::Numeric || input.contains(' ') {
            return Vec::new();
        }
        vec![
            format!("{input}2"),
            format!("{input} + 1"),
            format!("{input} * 2"),
        ]
    }

    /// Getters or setters for variables named after a leading `get ` / `set `.
    fn variable_examples(ws: &dyn Workspace, input: &str) -> Vec<BlockOption> {
        let lower = input.to_lowercase();
        let Some((verb, rest)) = lower.split_once(' ') else {
            return Vec::new();
        };
        let pick = match verb {
            "get" => 0,
            "set" => 1,
            _ => return Vec::new(),
        };
        let rest = rest.trim();
        let names: Vec<String> = match ws.variable_by_name(rest) {
            Some(exact) => vec![exact.name],
            None => ws
                .variables()
                .map(|vars| {
                    vars.into_iter()
                        .map(|v| v.name)
                        .filter(|n| n.to_lowercase().starts_with(rest))
                        .collect()
                })
                .unwrap_or_default(),
        };
        names
            .iter()
            .map(|name| variable_pair(name)[pick].clone())
            .collect()
    }
}

impl SmartGenerator {
    /// Event-style options (labels starting with `when`) for a leading `when`.
    fn event_examples(all: &[BlockOption], input: &str) -> Vec<BlockOption> {
        let lower = input.to_lowercase();
        let Some(rest) = lower.strip_prefix("when") else {
            return Vec::new();
        };
        if !(rest.is_empty() || rest.starts_with(' ')) {
            return Vec::new();
        }
        let rest = rest.trim();
        all.iter()
            .filter(|o| {
                let text = o.display_text.to_lowercase();
                text.starts_with("when") && text.contains(rest)
            })
            .cloned()
            .collect()
    }
}

impl OptionGenerator for SmartGenerator {
    fn generate_options(&mut self, ws: &dyn Workspace) -> Result<Vec<BlockOption>, GenerateError> {
        self.last = None;
        self.base.generate_options(ws)
    }

    fn variable_options(&self, ws: &dyn Workspace) -> Result<Vec<BlockOption>, GenerateError> {
        self.base.variable_options(ws)
    }

    fn procedure_options(&self, ws: &dyn Workspace) -> Result<Vec<BlockOption>, GenerateError> {
        self.base.procedure_options(ws)
    }

    fn builtin_block_options(
        &self,
        ws: &dyn Workspace,
    ) -> Result<Vec<BlockOption>, GenerateError> {
        self.base.builtin_block_options(ws)
    }

    fn reset(&mut self) {
        self.last = None;
    }

    fn is_input_aware(&self) -> bool {
        true
    }

    #[tracing::instrument(level = "debug", skip(self, ws, patterns))]
    fn generate_options_for_input(
        &mut self,
        ws: &dyn Workspace,
        patterns: &mut PatternEngine,
        input: &str,
    ) -> Result<Vec<BlockOption>, GenerateError> {
        if let Some((last, options)) = &self.last
            && last == input
        {
            trace!("repeat input served from cache");
            return Ok(options.clone());
        }
        let trimmed = input.trim();
        let all = self.base.generate_options(ws)?;

        let mut merged = OptionSet::new();
        if !trimmed.is_empty() {
            if let Some(option) = Self::pattern_option(patterns, trimmed) {
                merged.push(option);
            }
            for suggestion in patterns.get_suggestions(trimmed) {
                if let Some(option) = Self::pattern_option(patterns, &suggestion) {
                    merged.push(option);
                }
            }
            for example in Self::numeric_examples(trimmed) {
                if let Some(option) = Self::pattern_option(patterns, &example) {
                    merged.push(option);
                }
            }
            merged.extend(Self::variable_examples(ws, trimmed));
            merged.extend(Self::event_examples(&all, trimmed));
        }
        let pattern_count = merged.len();

        let mut scored: Vec<(i32, BlockOption)> = all
            .into_iter()
            .map(|o| (self.score(&o, trimmed), o))
            .filter(|(s, _)| *s > 0)
            .collect();
        scored.sort_by_key(|(s, _)| Reverse(*s));
        let limit = MIN_SCORED.max(MAX_SCORED_TOTAL.saturating_sub(pattern_count));
        merged.extend(scored.into_iter().take(limit).map(|(_, o)| o));

        if merged.len() < FALLBACK_BELOW && trimmed.chars().count() < self.weights.short_input_len
        {
            for option in fallback_options() {
                if merged.len() >= FALLBACK_UP_TO {
                    break;
                }
                merged.push(option);
            }
        }

        let options = merged.into_vec();
        self.last = Some((input.to_owned(), options.clone()));
        Ok(options)
    }
}
