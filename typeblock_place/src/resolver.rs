// Copyright 2025 the Typeblock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::cmp::Reverse;
use std::sync::Arc;

use kurbo::Point;
use tracing::debug;
use typeblock_host::{BlockId, ConnectionPoint, InputKind, Workspace};

use crate::spatial::SpatialIndex;
use crate::strategy::{Connection, ConnectionContext, ConnectionStrategy, default_strategies};

/// Default search radius around the drop point, in workspace units.
pub const DEFAULT_SEARCH_RADIUS: f64 = 200.0;

/// Default cap on nearby candidates.
pub const DEFAULT_MAX_NEARBY: usize = 10;

/// Settings for automatic connection of new blocks.
#[derive(Clone, Debug)]
pub struct ConnectionConfig {
    /// Whether new blocks are connected at all.
    pub enabled: bool,
    /// Search radius around the drop point.
    pub radius: f64,
    /// Maximum number of nearby blocks considered.
    pub max_nearby: usize,
    /// Replacement strategy list; `None` uses [`default_strategies`].
    pub strategies: Option<Vec<Arc<dyn ConnectionStrategy>>>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            radius: DEFAULT_SEARCH_RADIUS,
            max_nearby: DEFAULT_MAX_NEARBY,
            strategies: None,
        }
    }
}

impl ConnectionConfig {
    /// Turns connection on or off.
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Sets the search radius.
    #[must_use]
    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    /// Sets the nearby candidate cap.
    #[must_use]
    pub fn with_max_nearby(mut self, max_nearby: usize) -> Self {
        self.max_nearby = max_nearby;
        self
    }

    /// Replaces the built-in strategies.
    #[must_use]
    pub fn with_strategies(mut self, strategies: Vec<Arc<dyn ConnectionStrategy>>) -> Self {
        self.strategies = Some(strategies);
        self
    }
}

/// Finds a target for a freshly created block and joins them.
///
/// Targets are the selected block followed by nearby blocks. For each target,
/// strategies run from highest to lowest priority; the first success ends the
/// search. A block nothing accepts stays where it was dropped.
#[derive(Debug)]
pub struct ConnectionResolver {
    config: ConnectionConfig,
    strategies: Vec<Arc<dyn ConnectionStrategy>>,
}

impl Default for ConnectionResolver {
    fn default() -> Self {
        Self::new(ConnectionConfig::default())
    }
}

impl ConnectionResolver {
    /// Creates a resolver from `config`.
    #[must_use]
    pub fn new(config: ConnectionConfig) -> Self {
        let mut strategies = config.strategies.clone().unwrap_or_else(default_strategies);
        // Stable, so equal priorities keep their configured order.
        strategies.sort_by_key(|s| Reverse(s.priority()));
        Self { config, strategies }
    }

    /// Current settings.
    #[must_use]
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Strategies in the order they are tried.
    #[must_use]
    pub fn strategies(&self) -> &[Arc<dyn ConnectionStrategy>] {
        &self.strategies
    }

    /// Gathers the selected block and the blocks near `drop_point`.
    ///
    /// `block` and everything attached below it are never candidates.
    #[must_use]
    pub fn context(&self, ws: &dyn Workspace, block: BlockId, drop_point: Point) -> ConnectionContext {
        let selected = ws.selected().filter(|s| !is_within(ws, *s, block));
        let index = SpatialIndex::from_workspace(ws, |id| !is_within(ws, id, block));
        let nearby = index.nearest(drop_point, self.config.radius, self.config.max_nearby);
        ConnectionContext {
            selected,
            drop_point,
            nearby,
        }
    }

    /// Orders the candidates of `ctx` for `block`.
    ///
    /// The selected block comes first. When `block` has an output plug, nearby
    /// blocks that could take it in a free value input move ahead of those that
    /// could not, emptier blocks first; otherwise nearby blocks stay
    /// nearest-first.
    #[must_use]
    pub fn targets(&self, ws: &dyn Workspace, block: BlockId, ctx: &ConnectionContext) -> Vec<BlockId> {
        let mut nearby: Vec<BlockId> = ctx
            .nearby
            .iter()
            .copied()
            .filter(|id| Some(*id) != ctx.selected)
            .collect();
        if let Some(output) = ws.socket(block, &ConnectionPoint::Output) {
            nearby.sort_by_key(|id| {
                let takes_value = ws.inputs(*id).iter().any(|i| {
                    i.kind == InputKind::Value && !i.is_occupied() && i.check.accepts(&output.check)
                });
                (!takes_value, ws.occupied_inputs(*id))
            });
        }
        ctx.selected.into_iter().chain(nearby).collect()
    }

    /// Tries to connect `block`, dropped at `drop_point`, to something nearby.
    ///
    /// Returns the connection made, or `None` if connection is disabled or
    /// nothing accepted the block.
    pub fn connect(
        &self,
        ws: &mut dyn Workspace,
        block: BlockId,
        drop_point: Point,
    ) -> Option<Connection> {
        if !self.config.enabled {
            return None;
        }
        let ctx = self.context(ws, block, drop_point);
        for target in self.targets(ws, block, &ctx) {
            for strategy in &self.strategies {
                match strategy.try_connect(ws, block, target, &ctx) {
                    Ok(connection) => {
                        debug!(
                            shape = %connection.shape,
                            %block,
                            %target,
                            "connected new block"
                        );
                        return Some(connection);
                    }
                    Err(rejection) => {
                        debug!(%rejection, %block, %target, "strategy did not apply");
                    }
                }
            }
        }
        debug!(%block, "left unconnected");
        None
    }
}

/// Returns `true` if `candidate` is `root` or hangs somewhere below it.
fn is_within(ws: &dyn Workspace, candidate: BlockId, root: BlockId) -> bool {
    let mut current = Some(candidate);
    while let Some(id) = current {
        if id == root {
            return true;
        }
        current = ws.parent(id).map(|p| p.block);
    }
    false
}
