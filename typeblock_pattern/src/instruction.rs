// Copyright 2025 the Typeblock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::collections::BTreeMap;

/// A plan for constructing one block and the value blocks nested into its inputs.
///
/// Instructions are plain data: they name block types and field values but hold no
/// host handles, so a plan can be inspected (and compared in tests) before anything
/// is created on a surface.
///
/// ```rust
/// use typeblock_pattern::BlockCreationInstruction;
///
/// let sum = BlockCreationInstruction::new("math_arithmetic")
///     .with_field("OP", "ADD")
///     .with_child("A", BlockCreationInstruction::new("math_number").with_field("NUM", "2"))
///     .with_child("B", BlockCreationInstruction::new("math_number").with_field("NUM", "3"));
/// assert_eq!(sum.children.len(), 2);
/// assert_eq!(sum.field("OP"), Some("ADD"));
/// assert_eq!(sum.depth(), 2);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlockCreationInstruction {
    /// Block type identifier to instantiate.
    pub block_type: String,
    /// Field name → literal value.
    pub field_values: BTreeMap<String, String>,
    /// Value blocks to build and plug into named inputs, in order.
    pub children: Vec<ChildInstruction>,
}

/// A nested instruction bound to an input of its parent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChildInstruction {
    /// Name of the parent input the child plugs into.
    pub input: String,
    /// Plan for the child block.
    pub instruction: BlockCreationInstruction,
}

impl BlockCreationInstruction {
    /// Creates an instruction with no fields or children.
    #[must_use]
    pub fn new(block_type: impl Into<String>) -> Self {
        Self {
            block_type: block_type.into(),
            ..Self::default()
        }
    }

    /// Sets a field value.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.field_values.insert(name.into(), value.into());
        self
    }

    /// Appends a child bound to `input`.
    #[must_use]
    pub fn with_child(mut self, input: impl Into<String>, child: Self) -> Self {
        self.children.push(ChildInstruction {
            input: input.into(),
            instruction: child,
        });
        self
    }

    /// Value of a field, if set.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.field_values.get(name).map(String::as_str)
    }

    /// Number of levels in the tree; a leaf has depth 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(|c| c.instruction.depth())
            .max()
            .unwrap_or(0)
    }

    /// Total number of blocks this plan creates.
    #[must_use]
    pub fn block_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(|c| c.instruction.block_count())
            .sum::<usize>()
    }
}
