// Copyright 2025 the Typeblock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scope analysis: which variables are visible at the current editing position.

use core::fmt::Debug;

use crate::workspace::Workspace;

/// Reports the names of variables considered in scope for the current selection.
///
/// The option generator offers get/set pairs for these names in addition to the
/// globally declared variables. Callers that have no analyzer simply pass `None`;
/// that is treated the same as an analyzer returning nothing.
pub trait ScopeAnalyzer: Debug {
    /// Names of variables in scope given the surface's current state.
    fn local_variables_in_scope(&self, workspace: &dyn Workspace) -> Vec<String>;

    /// Names of variables derived only from the current selection, when the analyzer
    /// distinguishes that case. Defaults to `None`.
    fn local_variables_from_selection(&self, workspace: &dyn Workspace) -> Option<Vec<String>> {
        let _ = workspace;
        None
    }
}

/// Scope analyzer reporting the parameters of the procedure definition enclosing
/// the selected block.
///
/// Walks from the selected block up through its parents. If the outermost block is
/// a procedure definition (type prefixed with `procedures_def`), its parameters are
/// in scope.
#[derive(Clone, Copy, Debug, Default)]
pub struct EnclosingProcedureScope;

impl ScopeAnalyzer for EnclosingProcedureScope {
    fn local_variables_in_scope(&self, workspace: &dyn Workspace) -> Vec<String> {
        self.local_variables_from_selection(workspace)
            .unwrap_or_default()
    }

    fn local_variables_from_selection(&self, workspace: &dyn Workspace) -> Option<Vec<String>> {
        let mut current = workspace.selected()?;
        while let Some(parent) = workspace.parent(current) {
            current = parent.block;
        }
        if !workspace.block_type(current)?.starts_with("procedures_def") {
            return None;
        }
        let name = workspace.field_value(current, "NAME")?;
        let procedures = workspace.procedures().ok()?;
        procedures
            .into_iter()
            .find(|p| p.name == name)
            .map(|p| p.params)
    }
}
