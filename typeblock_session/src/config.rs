// Copyright 2025 the Typeblock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::rc::Rc;

use typeblock_host::ScopeAnalyzer;
use typeblock_options::{BlockOption, OptionMatcher, ScoringWeights};
use typeblock_pattern::PatternConfig;
use typeblock_place::{ConnectionConfig, DEFAULT_STACK_STEP, Positioning};

use crate::tracker::DEFAULT_DEBOUNCE_MS;

/// Everything a [`Session`](crate::Session) can be configured with.
///
/// ```rust
/// use kurbo::Vec2;
/// use typeblock_pattern::{BuiltinPatterns, PatternConfig};
/// use typeblock_place::{ConnectionConfig, Positioning};
/// use typeblock_session::Config;
///
/// let config = Config::default()
///     .with_patterns(PatternConfig::default().with_builtins(BuiltinPatterns::NUMBER))
///     .with_connection(ConnectionConfig::default().with_radius(120.0))
///     .with_positioning(Positioning::Fixed(Vec2::new(40.0, 40.0)));
/// assert!(config.dynamic_generation);
/// assert_eq!(config.debounce_ms, 100);
/// ```
#[derive(Clone, Debug)]
pub struct Config {
    /// A fixed candidate list. When set, dynamic generation is off.
    pub static_options: Option<Vec<BlockOption>>,
    /// Whether options are generated from the surface.
    pub dynamic_generation: bool,
    /// Pattern recognition settings. Disabling patterns also disables
    /// per-keystroke re-ranking.
    pub patterns: PatternConfig,
    /// Automatic connection settings.
    pub connection: ConnectionConfig,
    /// Where new blocks are dropped.
    pub positioning: Positioning,
    /// Diagonal offset for repeated drops at the same point.
    pub stack_step: f64,
    /// Scoring constants for per-keystroke ranking.
    pub scoring: ScoringWeights,
    /// Delay before a burst of surface changes invalidates the options.
    pub debounce_ms: u64,
    /// Replacement for the substring matcher.
    pub matcher: Option<Rc<dyn OptionMatcher>>,
    /// Source of in-scope variable names.
    pub scope: Option<Rc<dyn ScopeAnalyzer>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            static_options: None,
            dynamic_generation: true,
            patterns: PatternConfig::default(),
            connection: ConnectionConfig::default(),
            positioning: Positioning::Mouse,
            stack_step: DEFAULT_STACK_STEP,
            scoring: ScoringWeights::default(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            matcher: None,
            scope: None,
        }
    }
}

impl Config {
    /// Uses a fixed candidate list.
    #[must_use]
    pub fn with_static_options(mut self, options: Vec<BlockOption>) -> Self {
        self.static_options = Some(options);
        self
    }

    /// Turns dynamic generation on or off.
    #[must_use]
    pub fn with_dynamic_generation(mut self, enabled: bool) -> Self {
        self.dynamic_generation = enabled;
        self
    }

    /// Replaces the pattern settings.
    #[must_use]
    pub fn with_patterns(mut self, patterns: PatternConfig) -> Self {
        self.patterns = patterns;
        self
    }

    /// Replaces the connection settings.
    #[must_use]
    pub fn with_connection(mut self, connection: ConnectionConfig) -> Self {
        self.connection = connection;
        self
    }

    /// Sets the positioning mode.
    #[must_use]
    pub fn with_positioning(mut self, positioning: Positioning) -> Self {
        self.positioning = positioning;
        self
    }

    /// Sets the diagonal stacking step.
    #[must_use]
    pub fn with_stack_step(mut self, step: f64) -> Self {
        self.stack_step = step;
        self
    }

    /// Replaces the scoring constants.
    #[must_use]
    pub fn with_scoring(mut self, scoring: ScoringWeights) -> Self {
        self.scoring = scoring;
        self
    }

    /// Sets the change debounce delay.
    #[must_use]
    pub fn with_debounce_ms(mut self, debounce_ms: u64) -> Self {
        self.debounce_ms = debounce_ms;
        self
    }

    /// Uses a custom matcher.
    #[must_use]
    pub fn with_matcher(mut self, matcher: Rc<dyn OptionMatcher>) -> Self {
        self.matcher = Some(matcher);
        self
    }

    /// Uses a scope analyzer.
    #[must_use]
    pub fn with_scope(mut self, scope: Rc<dyn ScopeAnalyzer>) -> Self {
        self.scope = Some(scope);
        self
    }
}
