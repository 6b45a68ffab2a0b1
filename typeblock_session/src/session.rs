// Copyright 2025 the Typeblock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::rc::Rc;

use kurbo::Point;
use tracing::{debug, warn};
use typeblock_build::{BlockFactory, BuildError};
use typeblock_host::{BlockId, HostError, Workspace};
use typeblock_options::{
    BaseGenerator, BlockOption, LabelTable, OptionGenerator, OptionMatcher, SmartGenerator,
    StaticGenerator, SubstringMatcher, fallback_options,
};
use typeblock_pattern::PatternEngine;
use typeblock_place::{ConnectionResolver, Placement, Placer, Positioner};

use crate::config::Config;
use crate::input::FloatingInput;
use crate::tracker::WorkspaceStateTracker;

/// One floating-input pipeline attached to one editing surface.
///
/// The session owns the option generator, matcher, pattern engine, block
/// factory, and placer, and drives a [`FloatingInput`]:
///
/// 1. [`show`](Self::show) opens the input and presents the options for an
///    empty query.
/// 2. [`input_changed`](Self::input_changed) regenerates or filters the options
///    for each keystroke.
/// 3. [`confirm`](Self::confirm) builds the typed text, or
///    [`choose`](Self::choose) builds a listed option; the new block is placed,
///    connected if possible, and the input closes. If nothing could be built
///    the input stays open.
/// 4. [`dismiss`](Self::dismiss) closes the input without building anything.
///
/// The surface is passed to each call rather than held. Surface changes reach
/// the session through its [`WorkspaceStateTracker`]; hosts call
/// [`tick`](Self::tick) periodically so the debounce can fire while the input is
/// idle. [`dispose`](Self::dispose) releases the subscription.
#[derive(Debug)]
pub struct Session<P> {
    generator: Box<dyn OptionGenerator>,
    matcher: Rc<dyn OptionMatcher>,
    patterns: PatternEngine,
    factory: BlockFactory,
    placer: Placer,
    tracker: WorkspaceStateTracker,
    input: P,
    anchor: Point,
    query: String,
    options: Vec<BlockOption>,
}

impl<P: FloatingInput> Session<P> {
    /// Creates a session for `ws` presenting through `input`.
    ///
    /// Fails only if the surface cannot list its block types.
    pub fn new(ws: &mut dyn Workspace, config: Config, input: P) -> Result<Self, HostError> {
        let Config {
            static_options,
            dynamic_generation,
            patterns,
            connection,
            positioning,
            stack_step,
            scoring,
            debounce_ms,
            matcher,
            scope,
        } = config;

        let labels = Rc::new(LabelTable::from_descriptors(&ws.block_types()?));
        let generator: Box<dyn OptionGenerator> = match static_options {
            Some(options) => Box::new(StaticGenerator::new(options)),
            None if !dynamic_generation => Box::new(StaticGenerator::default()),
            None => {
                let mut base = BaseGenerator::new(Rc::clone(&labels));
                if let Some(scope) = scope {
                    base = base.with_scope(scope);
                }
                if patterns.enabled {
                    Box::new(SmartGenerator::new(base).with_weights(scoring))
                } else {
                    Box::new(base)
                }
            }
        };
        let positioner = Positioner::new(positioning).with_step(stack_step);

        Ok(Self {
            generator,
            matcher: matcher.unwrap_or_else(|| Rc::new(SubstringMatcher)),
            patterns: PatternEngine::new(patterns),
            factory: BlockFactory::new(labels),
            placer: Placer::new(positioner, ConnectionResolver::new(connection)),
            tracker: WorkspaceStateTracker::new(ws, debounce_ms),
            input,
            anchor: Point::ZERO,
            query: String::new(),
            options: Vec::new(),
        })
    }

    /// The presentation.
    #[must_use]
    pub fn input(&self) -> &P {
        &self.input
    }

    /// Options currently presented.
    #[must_use]
    pub fn options(&self) -> &[BlockOption] {
        &self.options
    }

    /// Current query text.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Returns `true` while the input is open.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.input.is_visible()
    }

    /// Opens the input at `pointer` (screen coordinates) with an empty query.
    ///
    /// Any list from an earlier opening is replaced, and input-aware
    /// generators rank afresh.
    pub fn show(&mut self, ws: &dyn Workspace, pointer: Point, now: u64) {
        self.tracker.pump(now);
        self.anchor = pointer;
        self.query.clear();
        self.generator.reset();
        self.input.show(pointer);
        self.refresh(ws);
    }

    /// Updates the query and the presented options.
    #[tracing::instrument(level = "debug", skip(self, ws), fields(options = tracing::field::Empty))]
    pub fn input_changed(&mut self, ws: &dyn Workspace, query: &str, now: u64) -> &[BlockOption] {
        self.tracker.pump(now);
        query.clone_into(&mut self.query);
        self.refresh(ws);
        tracing::Span::current().record("options", self.options.len());
        &self.options
    }

    /// Lets the debounce fire while no keys are pressed.
    ///
    /// If the options were invalidated and the input is open, they are
    /// regenerated for the current query. Returns `true` on invalidation.
    pub fn tick(&mut self, ws: &dyn Workspace, now: u64) -> bool {
        let fired = self.tracker.pump(now);
        if fired && self.is_visible() {
            self.refresh(ws);
        }
        fired
    }

    /// Marks the options stale, for hosts that know better than their events.
    pub fn invalidate(&mut self, reason: &str) {
        self.tracker.invalidate(reason);
    }

    /// Builds the typed query and places the result.
    ///
    /// On failure nothing is placed and the input stays open.
    pub fn confirm(&mut self, ws: &mut dyn Workspace) -> Result<Placement, BuildError> {
        let built = self
            .factory
            .create_from_text(ws, &mut self.patterns, &self.query);
        self.finish(ws, built)
    }

    /// Builds `option` and places the result.
    ///
    /// On failure nothing is placed and the input stays open.
    pub fn choose(
        &mut self,
        ws: &mut dyn Workspace,
        option: &BlockOption,
    ) -> Result<Placement, BuildError> {
        let built = self
            .factory
            .create_block_from_option(ws, &mut self.patterns, option);
        self.finish(ws, built)
    }

    /// Closes the input. Closing a closed input does nothing.
    pub fn dismiss(&mut self) {
        if self.input.is_visible() {
            self.input.hide();
        }
        self.query.clear();
    }

    /// Closes the input and releases the surface subscription.
    pub fn dispose(mut self, ws: &mut dyn Workspace) {
        self.dismiss();
        self.tracker.dispose(ws);
        debug!("session disposed");
    }

    /// Snapshot of the session state for debugging and inspection.
    #[must_use]
    pub fn debug_info(&self) -> SessionDebugInfo {
        SessionDebugInfo {
            visible: self.input.is_visible(),
            query: self.query.clone(),
            option_count: self.options.len(),
            needs_reload: self.tracker.needs_reload(),
            debounce_deadline: self.tracker.deadline(),
            pattern_cache_len: self.patterns.cache_len(),
            input_aware: self.generator.is_input_aware(),
        }
    }

    fn finish(
        &mut self,
        ws: &mut dyn Workspace,
        built: Result<BlockId, BuildError>,
    ) -> Result<Placement, BuildError> {
        let block = built?;
        match self.placer.place(ws, block, self.anchor) {
            Ok(placement) => {
                self.dismiss();
                Ok(placement)
            }
            Err(err) => {
                warn!(%err, %block, "could not place new block");
                if let Err(dispose) = ws.dispose_block(block) {
                    debug!(%dispose, "could not dispose unplaced block");
                }
                Err(err.into())
            }
        }
    }

    fn refresh(&mut self, ws: &dyn Workspace) {
        if self.tracker.needs_reload() || self.tracker.cached().is_none() {
            match self.generator.generate_options(ws) {
                Ok(options) => {
                    debug!(count = options.len(), "options regenerated");
                    self.tracker.store(options);
                    self.tracker.mark_reloaded();
                }
                Err(err) => warn!(%err, "option generation failed, keeping the last good list"),
            }
        }
        self.options = if self.generator.is_input_aware() {
            match self
                .generator
                .generate_options_for_input(ws, &mut self.patterns, &self.query)
            {
                Ok(options) => options,
                Err(err) => {
                    warn!(%err, "ranking failed, filtering the last good list");
                    self.filtered_cache()
                }
            }
        } else {
            self.filtered_cache()
        };
        self.input.set_options(&self.options);
    }

    fn filtered_cache(&self) -> Vec<BlockOption> {
        match self.tracker.cached() {
            Some(options) => self.matcher.filter(options, &self.query),
            None => self.matcher.filter(&fallback_options(), &self.query),
        }
    }
}

/// Debug snapshot of a [`Session`] state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionDebugInfo {
    /// Whether the input is open.
    pub visible: bool,
    /// Current query text.
    pub query: String,
    /// Number of options presented.
    pub option_count: usize,
    /// Whether the cached options are stale.
    pub needs_reload: bool,
    /// Pending debounce deadline, in milliseconds.
    pub debounce_deadline: Option<u64>,
    /// Number of inputs in the pattern detection cache.
    pub pattern_cache_len: usize,
    /// Whether options are ranked per keystroke.
    pub input_aware: bool,
}
