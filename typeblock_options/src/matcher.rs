// Copyright 2025 the Typeblock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt::Debug;

use crate::option::BlockOption;

/// Filters and orders a candidate list for a query.
pub trait OptionMatcher: Debug {
    /// Options to show for `query`.
    fn filter(&self, options: &[BlockOption], query: &str) -> Vec<BlockOption>;
}

/// Keeps options whose display text contains the query, ignoring case, in their
/// original order. An empty query keeps everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct SubstringMatcher;

impl OptionMatcher for SubstringMatcher {
    fn filter(&self, options: &[BlockOption], query: &str) -> Vec<BlockOption> {
        let query = query.trim().to_lowercase();
        options
            .iter()
            .filter(|o| query.is_empty() || o.display_text.to_lowercase().contains(&query))
            .cloned()
            .collect()
    }
}
