// Copyright 2025 the Typeblock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::cmp::Reverse;
use std::sync::Arc;

use hashbrown::{HashMap, HashSet};
use tracing::trace;

use crate::builtin::{BuiltinPatterns, builtin_patterns, is_word_prefix};
use crate::instruction::BlockCreationInstruction;
use crate::pattern::{InputPattern, PatternMatch};

/// Confidence every grammar match starts from.
pub const BASE_CONFIDENCE: f64 = 0.8;
/// Bonus when the match spans the whole trimmed input.
pub const FULL_MATCH_BONUS: f64 = 0.15;
/// Bonus when the pattern reports the input as complete.
pub const COMPLETE_BONUS: f64 = 0.05;
/// A match at or above this confidence is accepted without looking further.
pub const SHORT_CIRCUIT_CONFIDENCE: f64 = 0.95;
/// Default minimum confidence for a match to be reported.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.7;

/// Pattern recognition settings.
#[derive(Clone, Debug)]
pub struct PatternConfig {
    /// Master switch; when off nothing is ever detected.
    pub enabled: bool,
    /// Which built-in patterns to register.
    pub builtins: BuiltinPatterns,
    /// Extra patterns, always registered.
    pub custom: Vec<Arc<dyn InputPattern>>,
    /// Pattern name → priority replacing the pattern's own.
    pub priority_overrides: HashMap<String, i32>,
    /// Minimum confidence for a match to be reported.
    pub confidence_threshold: f64,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            builtins: BuiltinPatterns::all(),
            custom: Vec::new(),
            priority_overrides: HashMap::new(),
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }
}

impl PatternConfig {
    /// Turns recognition on or off.
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Selects the built-in patterns.
    #[must_use]
    pub fn with_builtins(mut self, builtins: BuiltinPatterns) -> Self {
        self.builtins = builtins;
        self
    }

    /// Adds a custom pattern.
    #[must_use]
    pub fn with_custom(mut self, pattern: Arc<dyn InputPattern>) -> Self {
        self.custom.push(pattern);
        self
    }

    /// Overrides the priority of the pattern called `name`.
    #[must_use]
    pub fn with_priority_override(mut self, name: impl Into<String>, priority: i32) -> Self {
        self.priority_overrides.insert(name.into(), priority);
        self
    }

    /// Sets the minimum reported confidence.
    #[must_use]
    pub fn with_confidence_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = threshold;
        self
    }
}

/// The best pattern match for an input.
#[derive(Clone, Debug)]
pub struct PatternDetectionResult {
    /// The winning pattern.
    pub pattern: Arc<dyn InputPattern>,
    /// Its match over the trimmed input.
    pub matched: PatternMatch,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
}

impl PatternDetectionResult {
    /// Runs the winning pattern's parser.
    #[must_use]
    pub fn instruction(&self) -> Option<BlockCreationInstruction> {
        self.pattern.parse_input(&self.matched)
    }
}

#[derive(Clone, Debug)]
struct Registered {
    pattern: Arc<dyn InputPattern>,
    priority: i32,
}

/// Registry of patterns plus the detection cache.
///
/// ```rust
/// use typeblock_pattern::{PatternConfig, PatternEngine};
///
/// let mut engine = PatternEngine::new(PatternConfig::default());
/// let hit = engine.detect_pattern("2 * 21").unwrap();
/// assert_eq!(hit.pattern.name(), "math_expression");
/// assert!(hit.confidence >= 0.95);
///
/// assert!(engine.detect_pattern("repeat").is_none());
/// assert_eq!(engine.cache_len(), 2);
/// ```
#[derive(Debug)]
pub struct PatternEngine {
    config: PatternConfig,
    patterns: Vec<Registered>,
    cache: HashMap<String, Option<PatternDetectionResult>>,
}

impl Default for PatternEngine {
    fn default() -> Self {
        Self::new(PatternConfig::default())
    }
}

impl PatternEngine {
    /// Creates an engine and registers the patterns `config` selects.
    #[must_use]
    pub fn new(config: PatternConfig) -> Self {
        let mut engine = Self {
            config,
            patterns: Vec::new(),
            cache: HashMap::new(),
        };
        engine.register_builtin_patterns();
        engine
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> &PatternConfig {
        &self.config
    }

    /// Registers the configured built-ins and every custom pattern.
    ///
    /// Built-ins are filtered by [`PatternConfig::builtins`]; custom patterns are
    /// always included. Priority overrides apply to both.
    pub fn register_builtin_patterns(&mut self) {
        let builtins = builtin_patterns(self.config.builtins);
        let custom = self.config.custom.clone();
        for pattern in builtins.into_iter().chain(custom) {
            self.insert(pattern);
        }
        self.sort();
    }

    /// Registers one pattern, replacing any pattern with the same name.
    pub fn register_pattern(&mut self, pattern: Arc<dyn InputPattern>) {
        self.insert(pattern);
        self.sort();
        self.cache.clear();
    }

    /// Replaces the configuration, re-registers patterns and clears the cache.
    pub fn update_config(&mut self, config: PatternConfig) {
        self.config = config;
        self.patterns.clear();
        self.register_builtin_patterns();
        self.clear_cache();
    }

    /// Drops every cached detection.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Number of cached inputs.
    #[must_use]
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Registered patterns with their effective priority, highest first.
    pub fn patterns(&self) -> impl Iterator<Item = (&dyn InputPattern, i32)> + '_ {
        self.patterns
            .iter()
            .map(|r| (r.pattern.as_ref(), r.priority))
    }

    fn insert(&mut self, pattern: Arc<dyn InputPattern>) {
        let priority = self
            .config
            .priority_overrides
            .get(pattern.name())
            .copied()
            .unwrap_or_else(|| pattern.priority());
        let entry = Registered { pattern, priority };
        if let Some(slot) = self
            .patterns
            .iter_mut()
            .find(|r| r.pattern.name() == entry.pattern.name())
        {
            *slot = entry;
        } else {
            self.patterns.push(entry);
        }
    }

    fn sort(&mut self) {
        // Stable: equal priorities keep registration order.
        self.patterns.sort_by_key(|r| Reverse(r.priority));
    }

    /// Finds the best pattern for `input`, consulting and filling the cache.
    pub fn detect_pattern(&mut self, input: &str) -> Option<PatternDetectionResult> {
        if !self.config.enabled {
            return None;
        }
        if let Some(hit) = self.cache.get(input) {
            trace!(input, "pattern cache hit");
            return hit.clone();
        }
        let result = self.evaluate(input);
        self.cache.insert(input.to_owned(), result.clone());
        result
    }

    /// Detects and parses in one step.
    pub fn parse(&mut self, input: &str) -> Option<BlockCreationInstruction> {
        self.detect_pattern(input)?.instruction()
    }

    fn evaluate(&self, input: &str) -> Option<PatternDetectionResult> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return None;
        }
        let mut best: Option<PatternDetectionResult> = None;
        for r in &self.patterns {
            let Some(matched) = PatternMatch::find(r.pattern.grammar(), trimmed) else {
                continue;
            };
            let mut confidence = BASE_CONFIDENCE;
            if matched.is_full() {
                confidence += FULL_MATCH_BONUS;
            }
            if r.pattern.is_complete(input) {
                confidence += COMPLETE_BONUS;
            }
            confidence = (confidence + f64::from(r.priority) / 1000.0).min(1.0);
            let candidate = PatternDetectionResult {
                pattern: Arc::clone(&r.pattern),
                matched,
                confidence,
            };
            if confidence >= SHORT_CIRCUIT_CONFIDENCE {
                trace!(input, pattern = r.pattern.name(), confidence, "pattern accepted");
                return Some(candidate);
            }
            if confidence >= self.config.confidence_threshold
                && best.as_ref().is_none_or(|b| confidence > b.confidence)
            {
                best = Some(candidate);
            }
        }
        best
    }

    /// Advisory completions for a partial input.
    ///
    /// Collects every pattern's own suggestions, then a few canned shapes for
    /// inputs that look like the start of a number, quoted text, assignment or
    /// boolean. Duplicates are removed, first occurrence wins.
    #[must_use]
    pub fn get_suggestions(&self, input: &str) -> Vec<String> {
        let t = input.trim();
        if !self.config.enabled || t.is_empty() {
            return Vec::new();
        }
        let mut out: Vec<String> = self
            .patterns
            .iter()
            .flat_map(|r| r.pattern.generate_suggestions(input))
            .collect();

        if t.starts_with(|c: char| c.is_ascii_digit()) && !t.contains(char::is_whitespace) {
            out.push(format!("{t} + 1"));
            out.push(format!("{t} * 2"));
        }
        if t == "\"" || t == "'" {
            out.push(format!("{t}text{t}"));
        }
        if is_word_prefix(t, "set") {
            out.push("set variable to 0".to_owned());
        }
        for word in ["true", "false"] {
            if is_word_prefix(t, word) {
                out.push(word.to_owned());
            }
        }

        let mut seen = HashSet::new();
        out.retain(|s| s != t && seen.insert(s.clone()));
        out
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::custom::RegexPattern;

    #[test]
    fn number_short_circuits() {
        let mut engine = PatternEngine::default();
        for input in ["42", "-3.14", "0"] {
            let hit = engine.detect_pattern(input).unwrap();
            assert_eq!(hit.pattern.name(), "number");
            assert!(hit.confidence >= 0.95);
            assert_eq!(hit.instruction().unwrap().field("NUM"), Some(input));
        }
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let mut engine = PatternEngine::default();
        let hit = engine.detect_pattern("  true ").unwrap();
        assert_eq!(hit.pattern.name(), "boolean");
    }

    #[test]
    fn disabled_engine_detects_nothing() {
        let mut engine = PatternEngine::new(PatternConfig::default().with_enabled(false));
        assert!(engine.detect_pattern("42").is_none());
        assert!(engine.get_suggestions("4").is_empty());
        assert_eq!(engine.cache_len(), 0);
    }

    #[test]
    fn disabled_builtin_is_not_registered() {
        let config =
            PatternConfig::default().with_builtins(BuiltinPatterns::all() - BuiltinPatterns::BOOLEAN);
        let mut engine = PatternEngine::new(config);
        assert!(engine.detect_pattern("true").is_none());
        assert!(engine.patterns().all(|(p, _)| p.name() != "boolean"));
    }

    #[test]
    fn patterns_are_sorted_by_effective_priority() {
        let config = PatternConfig::default().with_priority_override("math_expression", 200);
        let engine = PatternEngine::new(config);
        let order: Vec<_> = engine.patterns().map(|(p, prio)| (p.name().to_owned(), prio)).collect();
        assert_eq!(order[0], ("math_expression".to_owned(), 200));
        assert_eq!(order[1], ("number".to_owned(), 100));
        assert_eq!(order.last().map(|(_, p)| *p), Some(85));
    }

    #[test]
    fn below_threshold_matches_are_dropped() {
        // Matches part of the input only and never reports itself complete.
        let partial = RegexPattern::new("word", r"[a-z]+", -100, |_| None).unwrap();
        let config = PatternConfig::default()
            .with_custom(Arc::new(partial))
            .with_confidence_threshold(0.9);
        let mut engine = PatternEngine::new(config);
        assert!(engine.detect_pattern("abc 1").is_none());

        engine.update_config(
            PatternConfig::default()
                .with_custom(Arc::new(
                    RegexPattern::new("word", r"[a-z]+", -100, |_| None).unwrap(),
                ))
                .with_confidence_threshold(0.5),
        );
        let hit = engine.detect_pattern("abc 1").unwrap();
        assert_eq!(hit.pattern.name(), "word");
        assert!(hit.confidence < 0.95);
    }

    #[test]
    fn equal_confidence_keeps_the_earlier_pattern() {
        let first = RegexPattern::new("first", r"x", 10, |_| None).unwrap();
        let second = RegexPattern::new("second", r"x", 10, |_| None).unwrap();
        let config = PatternConfig::default()
            .with_custom(Arc::new(first))
            .with_custom(Arc::new(second));
        let mut engine = PatternEngine::new(config);
        let hit = engine.detect_pattern("a x b").unwrap();
        assert_eq!(hit.pattern.name(), "first");
    }

    #[test]
    fn cache_is_keyed_on_exact_input_and_cleared_on_update() {
        let mut engine = PatternEngine::default();
        engine.detect_pattern("1");
        engine.detect_pattern("1");
        engine.detect_pattern(" 1");
        engine.detect_pattern("nothing");
        assert_eq!(engine.cache_len(), 3);

        engine.update_config(PatternConfig::default());
        assert_eq!(engine.cache_len(), 0);
    }

    #[test]
    fn registering_a_pattern_replaces_by_name() {
        let mut engine = PatternEngine::default();
        let count = engine.patterns().count();
        engine.register_pattern(Arc::new(
            RegexPattern::new("number", r"^n$", 100, |_| None).unwrap(),
        ));
        assert_eq!(engine.patterns().count(), count);
        assert!(engine.detect_pattern("42").is_none());
    }

    #[test]
    fn suggestions_cover_partial_shapes() {
        let engine = PatternEngine::default();
        let digit = engine.get_suggestions("4");
        assert!(digit.contains(&"4 + 1".to_owned()));
        assert!(digit.contains(&"4 * 2".to_owned()));

        assert_eq!(engine.get_suggestions("\""), vec!["\"\"", "\"text\""]);
        assert!(engine.get_suggestions("se").contains(&"set variable to 0".to_owned()));
        assert_eq!(engine.get_suggestions("fa"), vec!["false"]);
    }
}
