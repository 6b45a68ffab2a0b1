// Copyright 2025 the Typeblock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the host surface: block handles, sockets, checks, variables, procedures.

use core::fmt;

use smallvec::SmallVec;

/// Handle of a block living on a host surface.
///
/// This is a small, copyable handle consisting of a slot index and a generation
/// counter. Hosts mint handles with [`BlockId::from_raw`]; a handle whose slot was
/// freed and reused gets a higher generation, so stale handles never alias a
/// different live block.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct BlockId(u32, u32);

impl BlockId {
    /// Creates a handle from a host slot index and generation.
    #[must_use]
    pub const fn from_raw(slot: u32, generation: u32) -> Self {
        Self(slot, generation)
    }

    /// Slot index of this handle.
    #[must_use]
    pub const fn slot(self) -> u32 {
        self.0
    }

    /// Generation of this handle.
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.1
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.0, self.1)
    }
}

/// Durable identifier of a declared variable.
///
/// Variable-reference fields store this identifier rather than the display name,
/// so renaming a variable does not break existing references.
#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct VariableId(String);

impl VariableId {
    /// Wraps a host-provided identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A variable declared on the surface.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Variable {
    /// Durable identifier.
    pub id: VariableId,
    /// Display name.
    pub name: String,
}

/// A procedure definition found on the surface.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProcedureInfo {
    /// Procedure name.
    pub name: String,
    /// Declared parameter names, in order.
    pub params: Vec<String>,
    /// Whether calls to this procedure produce a value.
    pub returns_value: bool,
}

/// A registered block type, as the host registry describes it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BlockDescriptor {
    /// Block type identifier, e.g. `controls_if`.
    pub type_name: String,
    /// Declared human label, if the block type has one.
    pub label: Option<String>,
}

/// One attachment point on a block.
///
/// `Output` and `Previous` are child-side plugs: they attach a block *into*
/// something. `Next` and `Input` are parent-side sockets that other blocks plug into.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum ConnectionPoint {
    /// The value plug of an expression block.
    Output,
    /// The leading sequencing plug of a statement block (it runs after whatever it attaches to).
    Previous,
    /// The trailing sequencing socket of a statement block.
    Next,
    /// A named value or statement input.
    Input(String),
}

impl ConnectionPoint {
    /// Returns `true` for plugs that attach the owning block under a parent.
    #[must_use]
    pub fn is_child_side(&self) -> bool {
        matches!(self, Self::Output | Self::Previous)
    }
}

impl fmt::Display for ConnectionPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Output => f.write_str("output"),
            Self::Previous => f.write_str("previous"),
            Self::Next => f.write_str("next"),
            Self::Input(name) => write!(f, "input `{name}`"),
        }
    }
}

/// A specific socket on a specific block.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct SocketRef {
    /// Owning block.
    pub block: BlockId,
    /// Attachment point on that block.
    pub point: ConnectionPoint,
}

impl SocketRef {
    /// Creates a socket reference.
    #[must_use]
    pub fn new(block: BlockId, point: ConnectionPoint) -> Self {
        Self { block, point }
    }

    /// Reference to a named input of `block`.
    #[must_use]
    pub fn input(block: BlockId, name: impl Into<String>) -> Self {
        Self::new(block, ConnectionPoint::Input(name.into()))
    }
}

impl fmt::Display for SocketRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {}", self.point, self.block)
    }
}

/// Type restriction carried by a socket.
///
/// An unrestricted check accepts anything. Two restricted checks are
/// compatible when their type sets share at least one entry.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Check(Option<SmallVec<[String; 2]>>);

impl Check {
    /// A check with no restriction.
    #[must_use]
    pub const fn any() -> Self {
        Self(None)
    }

    /// A check restricted to the given types.
    #[must_use]
    pub fn of<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(Some(types.into_iter().map(Into::into).collect()))
    }

    /// Returns `true` if this check declares no restriction.
    #[must_use]
    pub fn is_any(&self) -> bool {
        self.0.is_none()
    }

    /// The restricted types, or `None` when unrestricted.
    #[must_use]
    pub fn types(&self) -> Option<&[String]> {
        self.0.as_deref()
    }

    /// Returns `true` if a socket with this check may connect to one with `other`.
    #[must_use]
    pub fn accepts(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (None, _) | (_, None) => true,
            (Some(a), Some(b)) => a.iter().any(|t| b.contains(t)),
        }
    }
}

/// Kind of a named block input.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum InputKind {
    /// Holds an expression block through its output plug.
    Value,
    /// Holds a statement stack through its previous plug.
    Statement,
    /// Carries fields only; nothing connects to it.
    Dummy,
}

/// State of one named input on a live block.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InputSocket {
    /// Input name.
    pub name: String,
    /// Input kind.
    pub kind: InputKind,
    /// Type restriction.
    pub check: Check,
    /// Block currently attached, if any.
    pub target: Option<BlockId>,
}

impl InputSocket {
    /// Returns `true` if something is attached.
    #[must_use]
    pub fn is_occupied(&self) -> bool {
        self.target.is_some()
    }
}

/// State of an output, previous, or next connection on a live block.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Socket {
    /// Which connection this is.
    pub point: ConnectionPoint,
    /// Type restriction.
    pub check: Check,
    /// Block on the other end, if connected.
    pub target: Option<BlockId>,
}

impl Socket {
    /// Returns `true` if nothing is attached.
    #[must_use]
    pub fn is_free(&self) -> bool {
        self.target.is_none()
    }
}

/// Kind of a block field.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum FieldKind {
    /// Free text.
    Text,
    /// Numeric literal.
    Number,
    /// Fixed set of option codes.
    Dropdown,
    /// Reference to a declared variable; stores a [`VariableId`].
    Variable,
}
