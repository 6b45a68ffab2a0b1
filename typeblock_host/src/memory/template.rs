// Copyright 2025 the Typeblock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Block templates for the in-memory host.

use kurbo::Size;

use crate::types::{Check, FieldKind, InputKind};

/// Default block size used when a template does not set one.
pub const DEFAULT_BLOCK_SIZE: Size = Size::new(120.0, 32.0);

/// Shape of a block type registered with [`MemoryWorkspace`](super::MemoryWorkspace).
///
/// Built with chained setters:
///
/// ```rust
/// use typeblock_host::Check;
/// use typeblock_host::memory::BlockTemplate;
///
/// let add = BlockTemplate::new("math_arithmetic")
///     .dropdown("OP")
///     .value_input("A", Check::of(["Number"]))
///     .value_input("B", Check::of(["Number"]))
///     .output(Check::of(["Number"]));
/// assert_eq!(add.inputs().len(), 2);
/// ```
#[derive(Clone, Debug)]
pub struct BlockTemplate {
    pub(crate) type_name: String,
    pub(crate) label: Option<String>,
    pub(crate) fields: Vec<(String, FieldKind)>,
    pub(crate) inputs: Vec<(String, InputKind, Check)>,
    pub(crate) output: Option<Check>,
    pub(crate) previous: Option<Check>,
    pub(crate) next: Option<Check>,
    pub(crate) size: Size,
}

impl BlockTemplate {
    /// Starts a template with no fields, inputs, or plugs.
    #[must_use]
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            label: None,
            fields: Vec::new(),
            inputs: Vec::new(),
            output: None,
            previous: None,
            next: None,
            size: DEFAULT_BLOCK_SIZE,
        }
    }

    /// Sets the human label.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Adds a field.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.push((name.into(), kind));
        self
    }

    /// Adds a free-text field.
    #[must_use]
    pub fn text_field(self, name: impl Into<String>) -> Self {
        self.field(name, FieldKind::Text)
    }

    /// Adds a dropdown field.
    #[must_use]
    pub fn dropdown(self, name: impl Into<String>) -> Self {
        self.field(name, FieldKind::Dropdown)
    }

    /// Adds a variable-reference field.
    #[must_use]
    pub fn variable_field(self, name: impl Into<String>) -> Self {
        self.field(name, FieldKind::Variable)
    }

    /// Adds a value input.
    #[must_use]
    pub fn value_input(mut self, name: impl Into<String>, check: Check) -> Self {
        self.inputs.push((name.into(), InputKind::Value, check));
        self
    }

    /// Adds a statement input.
    #[must_use]
    pub fn statement_input(mut self, name: impl Into<String>) -> Self {
        self.inputs
            .push((name.into(), InputKind::Statement, Check::any()));
        self
    }

    /// Gives the block an output plug.
    #[must_use]
    pub fn output(mut self, check: Check) -> Self {
        self.output = Some(check);
        self
    }

    /// Gives the block unrestricted previous and next connections.
    #[must_use]
    pub fn statement(mut self) -> Self {
        self.previous = Some(Check::any());
        self.next = Some(Check::any());
        self
    }

    /// Gives the block a previous connection only.
    #[must_use]
    pub fn previous(mut self, check: Check) -> Self {
        self.previous = Some(check);
        self
    }

    /// Gives the block a next connection only.
    #[must_use]
    pub fn next(mut self, check: Check) -> Self {
        self.next = Some(check);
        self
    }

    /// Sets the rendered size.
    #[must_use]
    pub fn size(mut self, width: f64, height: f64) -> Self {
        self.size = Size::new(width, height);
        self
    }

    /// Block type identifier.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Declared inputs, in order.
    #[must_use]
    pub fn inputs(&self) -> &[(String, InputKind, Check)] {
        &self.inputs
    }

    pub(crate) fn field_kind(&self, name: &str) -> Option<FieldKind> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, k)| *k)
    }

    pub(crate) fn input_index(&self, name: &str) -> Option<usize> {
        self.inputs.iter().position(|(n, _, _)| n == name)
    }
}

/// A small standard library of block types, shaped like the stock blocks of common
/// block editors.
#[must_use]
pub fn standard_templates() -> Vec<BlockTemplate> {
    let number = || Check::of(["Number"]);
    let boolean = || Check::of(["Boolean"]);
    vec![
        BlockTemplate::new("controls_if")
            .label("if")
            .value_input("IF0", boolean())
            .statement_input("DO0")
            .statement()
            .size(140.0, 64.0),
        BlockTemplate::new("controls_repeat_ext")
            .label("repeat")
            .value_input("TIMES", number())
            .statement_input("DO")
            .statement()
            .size(140.0, 64.0),
        BlockTemplate::new("controls_whileUntil")
            .dropdown("MODE")
            .value_input("BOOL", boolean())
            .statement_input("DO")
            .statement()
            .size(140.0, 64.0),
        BlockTemplate::new("logic_boolean")
            .dropdown("BOOL")
            .output(boolean())
            .size(60.0, 24.0),
        BlockTemplate::new("logic_compare")
            .label("compare")
            .dropdown("OP")
            .value_input("A", Check::any())
            .value_input("B", Check::any())
            .output(boolean()),
        BlockTemplate::new("math_number")
            .field("NUM", FieldKind::Number)
            .output(number())
            .size(48.0, 24.0),
        BlockTemplate::new("math_arithmetic")
            .dropdown("OP")
            .value_input("A", number())
            .value_input("B", number())
            .output(number()),
        BlockTemplate::new("text")
            .text_field("TEXT")
            .output(Check::of(["String"]))
            .size(64.0, 24.0),
        BlockTemplate::new("text_print")
            .label("print")
            .value_input("TEXT", Check::any())
            .statement(),
        BlockTemplate::new("variables_get")
            .variable_field("VAR")
            .output(Check::any())
            .size(72.0, 24.0),
        BlockTemplate::new("variables_set")
            .variable_field("VAR")
            .value_input("VALUE", Check::any())
            .statement(),
        BlockTemplate::new("procedures_defnoreturn")
            .text_field("NAME")
            .statement_input("STACK")
            .size(180.0, 80.0),
        BlockTemplate::new("procedures_defreturn")
            .text_field("NAME")
            .statement_input("STACK")
            .value_input("RETURN", Check::any())
            .size(180.0, 96.0),
        BlockTemplate::new("procedures_callnoreturn").statement(),
        BlockTemplate::new("procedures_callreturn").output(Check::any()),
    ]
}
