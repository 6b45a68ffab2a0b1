// Copyright 2025 the Typeblock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::rc::Rc;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::json;
use tracing::{debug, warn};
use typeblock_host::{BlockId, ConnectionPoint, FieldKind, SocketRef, Workspace};
use typeblock_options::{BlockOption, LabelTable};
use typeblock_pattern::{BlockCreationInstruction, PatternEngine};

use crate::error::{BuildError, ReferenceKind};

static GET_VARIABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^get\s+(.+)$").expect("valid regex"));
static SET_VARIABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^set\s+(.+?)\s+to$").expect("valid regex"));
static CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^()\s][^()]*?)\s*\(([^()]*)\)$").expect("valid regex"));

/// Creates blocks on a surface from typed text, options, or instruction trees.
///
/// Text resolves through, in order:
///
/// 1. `get <name>`, `set <name> to`, a procedure name, or `<procedure>(<params>)`,
///    which need live lookups; a missing variable or procedure ends resolution
///    with [`BuildError::ReferenceNotFound`];
/// 2. a registered block type identifier;
/// 3. a block label from the [`LabelTable`].
///
/// ```rust
/// use std::rc::Rc;
///
/// use typeblock_build::BlockFactory;
/// use typeblock_host::memory::MemoryWorkspace;
/// use typeblock_host::{SurfaceId, Workspace};
/// use typeblock_options::LabelTable;
///
/// let mut ws = MemoryWorkspace::with_standard_blocks(SurfaceId(1));
/// let labels = Rc::new(LabelTable::from_descriptors(&ws.block_types().unwrap()));
/// let factory = BlockFactory::new(labels);
///
/// let block = factory.create_block(&mut ws, "repeat").unwrap();
/// assert_eq!(ws.block_type(block), Some("controls_repeat_ext"));
///
/// let err = factory.create_block(&mut ws, "get nobody").unwrap_err();
/// assert!(err.is_miss());
/// ```
#[derive(Clone, Debug)]
pub struct BlockFactory {
    labels: Rc<LabelTable>,
}

impl BlockFactory {
    /// Creates a factory resolving labels through `labels`.
    #[must_use]
    pub fn new(labels: Rc<LabelTable>) -> Self {
        Self { labels }
    }

    /// Resolves `text` to a block and creates it.
    pub fn create_block(&self, ws: &mut dyn Workspace, text: &str) -> Result<BlockId, BuildError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(BuildError::NoSuchBlock(String::new()));
        }
        if let Some(result) = self.create_reference(ws, text) {
            if let Err(BuildError::ReferenceNotFound { kind, name }) = &result {
                warn!(%kind, name = name.as_str(), "referenced entity does not exist");
            }
            return result;
        }
        if ws.has_block_type(text) {
            return Ok(ws.create_block(text)?);
        }
        if let Some(type_name) = self.labels.type_for_label(text)
            && ws.has_block_type(type_name)
        {
            return Ok(ws.create_block(type_name)?);
        }
        warn!(text, "no block matches input");
        Err(BuildError::NoSuchBlock(text.to_owned()))
    }

    /// Handles the forms that need variable or procedure lookups.
    ///
    /// `None` means the text is not one of those forms.
    fn create_reference(
        &self,
        ws: &mut dyn Workspace,
        text: &str,
    ) -> Option<Result<BlockId, BuildError>> {
        if let Some(caps) = GET_VARIABLE.captures(text) {
            return Some(self.variable_block(ws, "variables_get", caps[1].trim()));
        }
        if let Some(caps) = SET_VARIABLE.captures(text) {
            return Some(self.variable_block(ws, "variables_set", caps[1].trim()));
        }
        let (name, called) = match CALL.captures(text) {
            Some(caps) => (caps[1].trim().to_owned(), true),
            None => (text.to_owned(), false),
        };
        let procedures = match ws.procedures() {
            Ok(procedures) => procedures,
            Err(err) => return Some(Err(err.into())),
        };
        match procedures.into_iter().find(|p| p.name == name) {
            Some(proc) => {
                let call = if proc.returns_value {
                    "procedures_callreturn"
                } else {
                    "procedures_callnoreturn"
                };
                let state = json!({ "name": proc.name, "params": proc.params });
                Some(self.with_cleanup(ws, call, |ws, id| {
                    ws.set_extra_state(id, &state)?;
                    Ok(())
                }))
            }
            None if called => Some(Err(BuildError::ReferenceNotFound {
                kind: ReferenceKind::Procedure,
                name,
            })),
            None => None,
        }
    }

    fn variable_block(
        &self,
        ws: &mut dyn Workspace,
        block_type: &str,
        name: &str,
    ) -> Result<BlockId, BuildError> {
        let Some(var) = ws.variable_by_name(name) else {
            return Err(BuildError::ReferenceNotFound {
                kind: ReferenceKind::Variable,
                name: name.to_owned(),
            });
        };
        self.with_cleanup(ws, block_type, |ws, id| {
            ws.set_field(id, "VAR", var.id.as_str())?;
            Ok(())
        })
    }

    /// Creates a `block_type` block and runs `fill` on it, disposing the block if
    /// `fill` fails.
    fn with_cleanup(
        &self,
        ws: &mut dyn Workspace,
        block_type: &str,
        fill: impl FnOnce(&mut dyn Workspace, BlockId) -> Result<(), BuildError>,
    ) -> Result<BlockId, BuildError> {
        let id = ws.create_block(block_type)?;
        if let Err(err) = fill(&mut *ws, id) {
            warn!(%err, block_type, "construction failed");
            if let Err(dispose) = ws.dispose_block(id) {
                debug!(%dispose, "could not dispose partially built block");
            }
            return Err(err);
        }
        Ok(id)
    }

    /// Materializes an instruction tree and returns its root.
    ///
    /// Fields of kind [`FieldKind::Variable`] take a variable name; the variable is
    /// declared if missing and the field stores its id. Children are built
    /// depth-first and plugged into their named inputs. If any step fails the
    /// root is disposed, taking every already attached child with it.
    pub fn create_block_from_instruction(
        &self,
        ws: &mut dyn Workspace,
        instruction: &BlockCreationInstruction,
    ) -> Result<BlockId, BuildError> {
        self.with_cleanup(ws, &instruction.block_type, |ws, root| {
            for (field, value) in &instruction.field_values {
                if ws.field_kind(root, field) == Some(FieldKind::Variable) {
                    let var = ws.create_variable(value)?;
                    ws.set_field(root, field, var.id.as_str())?;
                } else {
                    ws.set_field(root, field, value)?;
                }
            }
            for child in &instruction.children {
                let id = self.create_block_from_instruction(ws, &child.instruction)?;
                let plug = if ws.has_socket(id, &ConnectionPoint::Output) {
                    ConnectionPoint::Output
                } else {
                    ConnectionPoint::Previous
                };
                let linked = ws.connect(
                    &SocketRef::input(root, child.input.clone()),
                    &SocketRef::new(id, plug),
                );
                if let Err(err) = linked {
                    if let Err(dispose) = ws.dispose_block(id) {
                        debug!(%dispose, "could not dispose unattached child");
                    }
                    return Err(err.into());
                }
            }
            Ok(())
        })
    }

    /// Resolves typed text: a pattern match first, then [`create_block`](Self::create_block).
    pub fn create_from_text(
        &self,
        ws: &mut dyn Workspace,
        patterns: &mut PatternEngine,
        text: &str,
    ) -> Result<BlockId, BuildError> {
        match patterns.parse(text) {
            Some(instruction) => self.create_block_from_instruction(ws, &instruction),
            None => self.create_block(ws, text),
        }
    }

    /// Creates the block a list option stands for.
    ///
    /// Options carrying field values or extra state are built directly. Others
    /// resolve their display text like typed input; if that misses, a bare block
    /// of the option's type is created.
    pub fn create_block_from_option(
        &self,
        ws: &mut dyn Workspace,
        patterns: &mut PatternEngine,
        option: &BlockOption,
    ) -> Result<BlockId, BuildError> {
        if option.has_payload() {
            let instruction = BlockCreationInstruction {
                block_type: option.block_type.clone(),
                field_values: option.field_values.clone(),
                children: Vec::new(),
            };
            let id = self.create_block_from_instruction(ws, &instruction)?;
            if let Some(state) = &option.extra_state
                && let Err(err) = ws.set_extra_state(id, state)
            {
                if let Err(dispose) = ws.dispose_block(id) {
                    debug!(%dispose, "could not dispose partially built block");
                }
                return Err(err.into());
            }
            return Ok(id);
        }
        match self.create_from_text(ws, patterns, &option.display_text) {
            Err(err) if err.is_miss() && ws.has_block_type(&option.block_type) => {
                debug!(option = option.display_text.as_str(), "creating option type directly");
                Ok(ws.create_block(&option.block_type)?)
            }
            result => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_grammar_splits_name_and_params() {
        let caps = CALL.captures("area (w, h)").unwrap();
        assert_eq!(&caps[1], "area");
        assert_eq!(&caps[2], "w, h");
        assert!(CALL.captures("(x)").is_none());
        assert!(CALL.captures("f(g(x))").is_none());
    }

    #[test]
    fn set_grammar_requires_trailing_to() {
        assert_eq!(&SET_VARIABLE.captures("Set my var TO").unwrap()[1], "my var");
        assert!(SET_VARIABLE.captures("set x to 5").is_none());
    }
}
