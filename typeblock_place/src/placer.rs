// Copyright 2025 the Typeblock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::Point;
use typeblock_host::{BlockId, HostError, Workspace};

use crate::positioner::Positioner;
use crate::resolver::ConnectionResolver;
use crate::strategy::Connection;

/// Where a block ended up.
#[derive(Clone, Debug, PartialEq)]
pub struct Placement {
    /// Drop point in workspace coordinates.
    pub drop_point: Point,
    /// The link made, if any.
    pub connection: Option<Connection>,
}

/// Moves new blocks to their drop point and connects them.
#[derive(Debug)]
pub struct Placer {
    positioner: Positioner,
    resolver: ConnectionResolver,
}

impl Placer {
    /// Combines a positioner and a resolver.
    #[must_use]
    pub fn new(positioner: Positioner, resolver: ConnectionResolver) -> Self {
        Self {
            positioner,
            resolver,
        }
    }

    /// The positioner.
    #[must_use]
    pub fn positioner(&self) -> &Positioner {
        &self.positioner
    }

    /// The resolver.
    #[must_use]
    pub fn resolver(&self) -> &ConnectionResolver {
        &self.resolver
    }

    /// Drops the top-level `block` for a pointer at `pointer` (screen
    /// coordinates) and tries to connect it.
    ///
    /// Only the move can fail; a block nothing accepts stays at the drop point.
    pub fn place(
        &mut self,
        ws: &mut dyn Workspace,
        block: BlockId,
        pointer: Point,
    ) -> Result<Placement, HostError> {
        let drop_point = self.positioner.drop_point(&ws.viewport(), pointer);
        ws.move_block(block, drop_point)?;
        let connection = self.resolver.connect(ws, block, drop_point);
        Ok(Placement {
            drop_point,
            connection,
        })
    }
}
