// Copyright 2025 the Typeblock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;

use typeblock_host::HostError;

/// What a special-case input referred to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    /// A variable, as in `get x` or `set x to`.
    Variable,
    /// A procedure, as in `area(w, h)`.
    Procedure,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Variable => "variable",
            Self::Procedure => "procedure",
        })
    }
}

/// Errors raised while constructing blocks.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum BuildError {
    /// The text matched no pattern, block type, or label.
    #[error("no block matches `{0}`")]
    NoSuchBlock(String),
    /// The text named a variable or procedure that does not exist.
    #[error("{kind} `{name}` does not exist")]
    ReferenceNotFound {
        /// Kind of entity referenced.
        kind: ReferenceKind,
        /// Name as typed.
        name: String,
    },
    /// The host rejected a step of construction.
    #[error(transparent)]
    Host(#[from] HostError),
}

impl BuildError {
    /// Returns `true` for user-input misses, as opposed to construction failures.
    #[must_use]
    pub fn is_miss(&self) -> bool {
        matches!(self, Self::NoSuchBlock(_) | Self::ReferenceNotFound { .. })
    }
}
