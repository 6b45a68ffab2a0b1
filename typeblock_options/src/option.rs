// Copyright 2025 the Typeblock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::collections::BTreeMap;

use hashbrown::HashSet;

/// A selectable completion that maps to a constructible block.
///
/// Two options are the same candidate when both [`block_type`](Self::block_type)
/// and [`display_text`](Self::display_text) agree; see [`BlockOption::key`].
#[derive(Clone, Debug, PartialEq)]
pub struct BlockOption {
    /// Block type the option constructs.
    pub block_type: String,
    /// Text shown in the list; never empty.
    pub display_text: String,
    /// Opaque mutator state applied to the created block.
    pub extra_state: Option<serde_json::Value>,
    /// Field name → value applied to the created block.
    pub field_values: BTreeMap<String, String>,
}

impl BlockOption {
    /// Creates an option with no extra state or field values.
    ///
    /// An empty display text is replaced by the block type.
    #[must_use]
    pub fn new(block_type: impl Into<String>, display_text: impl Into<String>) -> Self {
        let block_type = block_type.into();
        let mut display_text = display_text.into();
        if display_text.trim().is_empty() {
            display_text.clone_from(&block_type);
        }
        Self {
            block_type,
            display_text,
            extra_state: None,
            field_values: BTreeMap::new(),
        }
    }

    /// Sets a field value.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.field_values.insert(name.into(), value.into());
        self
    }

    /// Sets the extra state.
    #[must_use]
    pub fn with_extra_state(mut self, state: serde_json::Value) -> Self {
        self.extra_state = Some(state);
        self
    }

    /// Identity of the option for deduplication.
    #[must_use]
    pub fn key(&self) -> (&str, &str) {
        (&self.block_type, &self.display_text)
    }

    /// Returns `true` if the option carries data beyond its type and label.
    #[must_use]
    pub fn has_payload(&self) -> bool {
        self.extra_state.is_some() || !self.field_values.is_empty()
    }
}

/// Collects options while dropping repeats of the same (type, display text) pair.
#[derive(Debug, Default)]
pub struct OptionSet {
    seen: HashSet<(String, String)>,
    options: Vec<BlockOption>,
}

impl OptionSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `option` unless an equal key is present. Returns whether it was added.
    pub fn push(&mut self, option: BlockOption) -> bool {
        let key = (option.block_type.clone(), option.display_text.clone());
        if self.seen.insert(key) {
            self.options.push(option);
            true
        } else {
            false
        }
    }

    /// Number of options kept.
    #[must_use]
    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// Returns `true` if nothing was kept.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Kept options, in insertion order.
    #[must_use]
    pub fn into_vec(self) -> Vec<BlockOption> {
        self.options
    }
}

impl Extend<BlockOption> for OptionSet {
    fn extend<T: IntoIterator<Item = BlockOption>>(&mut self, iter: T) {
        for option in iter {
            self.push(option);
        }
    }
}

impl FromIterator<BlockOption> for OptionSet {
    fn from_iter<T: IntoIterator<Item = BlockOption>>(iter: T) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedupe_uses_both_type_and_text() {
        let set: OptionSet = [
            BlockOption::new("controls_if", "if"),
            BlockOption::new("controls_if", "if"),
            BlockOption::new("custom_if", "if"),
        ]
        .into_iter()
        .collect();
        let kept = set.into_vec();
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[1].key(), ("custom_if", "if"));
    }

    #[test]
    fn empty_display_text_falls_back_to_type() {
        let o = BlockOption::new("text_print", "  ");
        assert_eq!(o.display_text, "text_print");
        assert!(!o.has_payload());
    }
}
