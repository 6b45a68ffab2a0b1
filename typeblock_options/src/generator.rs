// Copyright 2025 the Typeblock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt::Debug;
use std::rc::Rc;

use serde_json::json;
use tracing::debug;
use typeblock_host::{HostError, ScopeAnalyzer, Workspace};
use typeblock_pattern::PatternEngine;

use crate::labels::LabelTable;
use crate::option::{BlockOption, OptionSet};

/// Errors raised while walking editor state for options.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum GenerateError {
    /// The host failed to enumerate its registries.
    #[error("option generation failed")]
    Host(#[from] HostError),
}

/// Produces the candidate list for the floating input.
pub trait OptionGenerator: Debug {
    /// The full candidate list for the surface's current state.
    fn generate_options(&mut self, ws: &dyn Workspace) -> Result<Vec<BlockOption>, GenerateError>;

    /// Get/set options for declared and in-scope variables.
    fn variable_options(&self, ws: &dyn Workspace) -> Result<Vec<BlockOption>, GenerateError>;

    /// Call options for procedure definitions.
    fn procedure_options(&self, ws: &dyn Workspace) -> Result<Vec<BlockOption>, GenerateError>;

    /// Options for registered block types.
    fn builtin_block_options(&self, ws: &dyn Workspace)
    -> Result<Vec<BlockOption>, GenerateError>;

    /// Returns `true` if [`generate_options_for_input`](Self::generate_options_for_input)
    /// ranks per keystroke rather than returning the full list.
    fn is_input_aware(&self) -> bool {
        false
    }

    /// Forgets per-session state, such as the last ranked input.
    ///
    /// Called when a new input session starts, so its first list is computed
    /// afresh.
    fn reset(&mut self) {}

    /// Candidate list for one keystroke.
    ///
    /// The default ignores the input; callers filter the full list with an
    /// [`OptionMatcher`](crate::OptionMatcher).
    fn generate_options_for_input(
        &mut self,
        ws: &dyn Workspace,
        patterns: &mut PatternEngine,
        input: &str,
    ) -> Result<Vec<BlockOption>, GenerateError> {
        let _ = (patterns, input);
        self.generate_options(ws)
    }
}

/// A fixed candidate list supplied up front.
#[derive(Clone, Debug, Default)]
pub struct StaticGenerator {
    options: Vec<BlockOption>,
}

impl StaticGenerator {
    /// Wraps `options`, dropping duplicate (type, display text) pairs.
    #[must_use]
    pub fn new(options: Vec<BlockOption>) -> Self {
        Self {
            options: options.into_iter().collect::<OptionSet>().into_vec(),
        }
    }
}

impl OptionGenerator for StaticGenerator {
    fn generate_options(&mut self, _: &dyn Workspace) -> Result<Vec<BlockOption>, GenerateError> {
        Ok(self.options.clone())
    }

    fn variable_options(&self, _: &dyn Workspace) -> Result<Vec<BlockOption>, GenerateError> {
        Ok(Vec::new())
    }

    fn procedure_options(&self, _: &dyn Workspace) -> Result<Vec<BlockOption>, GenerateError> {
        Ok(Vec::new())
    }

    fn builtin_block_options(
        &self,
        _: &dyn Workspace,
    ) -> Result<Vec<BlockOption>, GenerateError> {
        Ok(self.options.clone())
    }
}

/// Block types never offered as plain options.
///
/// Procedure definitions and calls come from [`OptionGenerator::procedure_options`],
/// variable getters and setters from [`OptionGenerator::variable_options`].
#[must_use]
pub fn is_denylisted(type_name: &str) -> bool {
    type_name.starts_with('_')
        || type_name.starts_with("procedures_def")
        || type_name.starts_with("procedures_call")
        || type_name.starts_with("variables_get")
        || type_name.starts_with("variables_set")
}

/// Get and set options for one variable name.
pub(crate) fn variable_pair(name: &str) -> [BlockOption; 2] {
    [
        BlockOption::new("variables_get", format!("get {name}")).with_field("VAR", name),
        BlockOption::new("variables_set", format!("set {name} to")).with_field("VAR", name),
    ]
}

/// Builds options from the surface's registries.
///
/// The list is the union, deduplicated on (type, display text), of:
///
/// 1. every registered block type not matched by [`is_denylisted`], shown with its
///    label from the [`LabelTable`] or its identifier with `_` as spaces;
/// 2. a get/set pair per declared variable, then per variable the scope analyzer
///    reports;
/// 3. per procedure definition, its name and, when it has parameters, its name
///    followed by the parenthesized parameter list.
#[derive(Clone, Debug)]
pub struct BaseGenerator {
    labels: Rc<LabelTable>,
    scope: Option<Rc<dyn ScopeAnalyzer>>,
}

impl BaseGenerator {
    /// Creates a generator reading labels from `labels`.
    #[must_use]
    pub fn new(labels: Rc<LabelTable>) -> Self {
        Self {
            labels,
            scope: None,
        }
    }

    /// Adds a scope analyzer.
    #[must_use]
    pub fn with_scope(mut self, scope: Rc<dyn ScopeAnalyzer>) -> Self {
        self.scope = Some(scope);
        self
    }

    /// The label side-table.
    #[must_use]
    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }
}

impl OptionGenerator for BaseGenerator {
    fn generate_options(&mut self, ws: &dyn Workspace) -> Result<Vec<BlockOption>, GenerateError> {
        let mut set = OptionSet::new();
        set.extend(self.builtin_block_options(ws)?);
        set.extend(self.variable_options(ws)?);
        set.extend(self.procedure_options(ws)?);
        debug!(count = set.len(), "generated options");
        Ok(set.into_vec())
    }

    fn variable_options(&self, ws: &dyn Workspace) -> Result<Vec<BlockOption>, GenerateError> {
        let declared = ws.variables()?.into_iter().map(|v| v.name);
        let scoped = self
            .scope
            .as_ref()
            .map(|s| s.local_variables_in_scope(ws))
            .unwrap_or_default();
        Ok(declared
            .chain(scoped)
            .filter(|name| !name.trim().is_empty())
            .flat_map(|name| variable_pair(&name))
            .collect())
    }

    fn procedure_options(&self, ws: &dyn Workspace) -> Result<Vec<BlockOption>, GenerateError> {
        let mut out = Vec::new();
        for proc in ws.procedures()? {
            let call = if proc.returns_value {
                "procedures_callreturn"
            } else {
                "procedures_callnoreturn"
            };
            let state = json!({ "name": proc.name, "params": proc.params });
            out.push(BlockOption::new(call, proc.name.clone()).with_extra_state(state.clone()));
            if !proc.params.is_empty() {
                let text = format!("{}({})", proc.name, proc.params.join(", "));
                out.push(BlockOption::new(call, text).with_extra_state(state));
            }
        }
        Ok(out)
    }

    fn builtin_block_options(
        &self,
        ws: &dyn Workspace,
    ) -> Result<Vec<BlockOption>, GenerateError> {
        Ok(ws
            .block_types()?
            .into_iter()
            .filter(|d| !is_denylisted(&d.type_name))
            .map(|d| {
                let text = self.labels.display_text(&d.type_name);
                BlockOption::new(d.type_name, text)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::is_denylisted;

    #[test]
    fn denylist_covers_procedures_variables_and_internal_types() {
        for t in [
            "procedures_defnoreturn",
            "procedures_callreturn",
            "variables_get",
            "variables_set_dynamic",
            "_internal",
        ] {
            assert!(is_denylisted(t), "{t}");
        }
        for t in ["controls_if", "math_number", "text"] {
            assert!(!is_denylisted(t), "{t}");
        }
    }
}
