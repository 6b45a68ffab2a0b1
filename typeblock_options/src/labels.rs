// Copyright 2025 the Typeblock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use hashbrown::HashMap;
use typeblock_host::BlockDescriptor;

/// Display labels for block types, kept beside the host registry.
///
/// Built once per session from the host's block descriptors and shared by
/// reference; it never writes back into the registry.
///
/// ```rust
/// use typeblock_host::BlockDescriptor;
/// use typeblock_options::LabelTable;
///
/// let labels = LabelTable::from_descriptors(&[BlockDescriptor {
///     type_name: "controls_if".into(),
///     label: Some("if".into()),
/// }]);
/// assert_eq!(labels.label("controls_if"), Some("if"));
/// assert_eq!(labels.type_for_label("IF"), Some("controls_if"));
/// assert_eq!(labels.display_text("math_number"), "math number");
/// ```
#[derive(Clone, Debug, Default)]
pub struct LabelTable {
    by_type: HashMap<String, String>,
    by_label: HashMap<String, String>,
}

impl LabelTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects the labels declared by `descriptors`.
    #[must_use]
    pub fn from_descriptors(descriptors: &[BlockDescriptor]) -> Self {
        let mut table = Self::new();
        for d in descriptors {
            if let Some(label) = d.label.as_deref() {
                table.insert(&d.type_name, label);
            }
        }
        table
    }

    /// Records `label` for `type_name`.
    ///
    /// Blank labels are ignored. When two types share a label, reverse lookup
    /// resolves to the first one recorded.
    pub fn insert(&mut self, type_name: &str, label: &str) {
        let label = label.trim();
        if label.is_empty() {
            return;
        }
        self.by_type.insert(type_name.to_owned(), label.to_owned());
        self.by_label
            .entry(label.to_lowercase())
            .or_insert_with(|| type_name.to_owned());
    }

    /// Label declared for `type_name`.
    #[must_use]
    pub fn label(&self, type_name: &str) -> Option<&str> {
        self.by_type.get(type_name).map(String::as_str)
    }

    /// Block type whose label equals `label`, ignoring case.
    #[must_use]
    pub fn type_for_label(&self, label: &str) -> Option<&str> {
        self.by_label
            .get(&label.trim().to_lowercase())
            .map(String::as_str)
    }

    /// The label, or the type identifier with `_` shown as spaces.
    #[must_use]
    pub fn display_text(&self, type_name: &str) -> String {
        self.label(type_name)
            .map_or_else(|| type_name.replace('_', " "), str::to_owned)
    }

    /// Number of labelled types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_type.len()
    }

    /// Returns `true` if no type has a label.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }
}
