// Copyright 2025 the Typeblock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Change notifications published by a host surface.

/// Identifier of one editing surface.
///
/// Change events carry the surface they originate from so a pipeline attached to
/// one surface can ignore traffic from another.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct SurfaceId(pub u32);

/// Handle returned by [`Workspace::subscribe`](crate::Workspace::subscribe).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ListenerId(pub u64);

/// What changed on the surface.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ChangeKind {
    /// A block was created.
    BlockCreated,
    /// A block was deleted.
    BlockDeleted,
    /// A block's fields or extra state changed.
    BlockChanged,
    /// A block moved or was (dis)connected.
    BlockMoved,
    /// A variable was declared.
    VariableCreated,
    /// A variable was deleted.
    VariableDeleted,
    /// A variable was renamed.
    VariableRenamed,
    /// The surface finished loading serialized content.
    FinishedLoading,
    /// Selection, scrolling, and other presentation-only changes.
    Ui,
}

impl ChangeKind {
    /// Returns `true` if events of this kind can change the generated option list.
    ///
    /// Moves and UI events cannot: options depend on which blocks, variables, and
    /// procedures exist, not on where they are.
    #[must_use]
    pub const fn affects_options(self) -> bool {
        matches!(
            self,
            Self::BlockCreated
                | Self::BlockDeleted
                | Self::BlockChanged
                | Self::VariableCreated
                | Self::VariableDeleted
                | Self::VariableRenamed
                | Self::FinishedLoading
        )
    }
}

/// A change notification.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ChangeEvent {
    /// What changed.
    pub kind: ChangeKind,
    /// Surface the change happened on.
    pub surface: SurfaceId,
}

impl ChangeEvent {
    /// Creates an event.
    #[must_use]
    pub const fn new(kind: ChangeKind, surface: SurfaceId) -> Self {
        Self { kind, surface }
    }
}

#[cfg(test)]
mod tests {
    use super::ChangeKind;

    #[test]
    fn moves_and_ui_do_not_affect_options() {
        assert!(!ChangeKind::BlockMoved.affects_options());
        assert!(!ChangeKind::Ui.affects_options());
        assert!(ChangeKind::VariableRenamed.affects_options());
        assert!(ChangeKind::FinishedLoading.affects_options());
    }
}
