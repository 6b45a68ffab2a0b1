// Copyright 2025 the Typeblock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory reference host.
//!
//! [`MemoryWorkspace`] implements [`Workspace`] over plain vectors and maps. It is
//! what the other Typeblock crates test against, and a starting point for hosts
//! that want to drive the pipeline headlessly (scripted input, fixtures).
//!
//! Layout is deliberately simple: a block plugged into a `next` socket sits
//! directly below its parent, value inputs sit to the right, and statement inputs
//! are indented below the parent's header. This is enough to keep connected blocks
//! from overlapping.
//!
//! ```rust
//! use kurbo::Point;
//! use typeblock_host::memory::MemoryWorkspace;
//! use typeblock_host::{ConnectionPoint, SocketRef, SurfaceId, Workspace};
//!
//! let mut ws = MemoryWorkspace::with_standard_blocks(SurfaceId(1));
//! let print = ws.spawn("text_print", Point::new(10.0, 10.0)).unwrap();
//! let text = ws.create_block("text").unwrap();
//! ws.set_field(text, "TEXT", "hi").unwrap();
//! ws.connect(
//!     &SocketRef::input(print, "TEXT"),
//!     &SocketRef::new(text, ConnectionPoint::Output),
//! )
//! .unwrap();
//! assert_eq!(ws.parent(text).map(|s| s.block), Some(print));
//! ```

mod template;

use std::sync::mpsc::Sender;

use hashbrown::HashMap;
use kurbo::{Point, Rect};

pub use template::{BlockTemplate, DEFAULT_BLOCK_SIZE, standard_templates};

use crate::event::{ChangeEvent, ChangeKind, ListenerId, SurfaceId};
use crate::types::{
    BlockDescriptor, BlockId, ConnectionPoint, FieldKind, InputKind, InputSocket, ProcedureInfo,
    Socket, SocketRef, Variable, VariableId,
};
use crate::viewport::Viewport;
use crate::workspace::{HostError, Workspace};

const STATEMENT_INDENT: f64 = 16.0;
const STATEMENT_HEADER: f64 = 28.0;
const VALUE_ROW: f64 = 24.0;

#[derive(Clone, Debug)]
struct ParentLink {
    parent: SocketRef,
    via: ConnectionPoint,
}

#[derive(Clone, Debug)]
struct BlockRecord {
    template: usize,
    fields: HashMap<String, String>,
    extra_state: Option<serde_json::Value>,
    origin: Point,
    parent: Option<ParentLink>,
    next: Option<BlockId>,
    inputs: Vec<Option<BlockId>>,
}

#[derive(Clone, Debug, Default)]
struct Slot {
    generation: u32,
    record: Option<BlockRecord>,
}

/// In-memory implementation of [`Workspace`].
#[derive(Debug)]
pub struct MemoryWorkspace {
    surface: SurfaceId,
    templates: Vec<BlockTemplate>,
    by_type: HashMap<String, usize>,
    slots: Vec<Slot>,
    free: Vec<u32>,
    variables: Vec<Variable>,
    next_variable: u64,
    selected: Option<BlockId>,
    viewport: Viewport,
    listeners: Vec<(ListenerId, Sender<ChangeEvent>)>,
    next_listener: u64,
    fail_enumeration: bool,
}

impl Default for MemoryWorkspace {
    fn default() -> Self {
        Self::new(SurfaceId(0))
    }
}

impl MemoryWorkspace {
    /// Creates an empty surface with no registered block types.
    #[must_use]
    pub fn new(surface: SurfaceId) -> Self {
        Self {
            surface,
            templates: Vec::new(),
            by_type: HashMap::new(),
            slots: Vec::new(),
            free: Vec::new(),
            variables: Vec::new(),
            next_variable: 1,
            selected: None,
            viewport: Viewport::default(),
            listeners: Vec::new(),
            next_listener: 1,
            fail_enumeration: false,
        }
    }

    /// Creates a surface with [`standard_templates`] registered.
    #[must_use]
    pub fn with_standard_blocks(surface: SurfaceId) -> Self {
        let mut ws = Self::new(surface);
        for template in standard_templates() {
            ws.register(template);
        }
        ws
    }

    /// Registers (or replaces) a block type.
    pub fn register(&mut self, template: BlockTemplate) {
        if let Some(&idx) = self.by_type.get(template.type_name()) {
            self.templates[idx] = template;
        } else {
            self.by_type
                .insert(template.type_name().to_owned(), self.templates.len());
            self.templates.push(template);
        }
    }

    /// Creates a block and moves it to `at`.
    pub fn spawn(&mut self, type_name: &str, at: Point) -> Result<BlockId, HostError> {
        let id = self.create_block(type_name)?;
        self.move_block(id, at)?;
        Ok(id)
    }

    /// Changes the selected block.
    pub fn select(&mut self, block: Option<BlockId>) {
        if self.selected != block {
            self.selected = block;
            self.emit(ChangeKind::Ui);
        }
    }

    /// Replaces the current scroll/zoom state.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Renames a variable. Returns `false` if no variable has the old name.
    pub fn rename_variable(&mut self, old: &str, new: &str) -> bool {
        let Some(var) = self
            .variables
            .iter_mut()
            .find(|v| v.name.eq_ignore_ascii_case(old))
        else {
            return false;
        };
        var.name = new.to_owned();
        self.emit(ChangeKind::VariableRenamed);
        true
    }

    /// Makes every registry enumeration fail with [`HostError::Enumeration`].
    ///
    /// Used to exercise the pipeline's generation-failure fallback.
    pub fn set_enumeration_failure(&mut self, fail: bool) {
        self.fail_enumeration = fail;
    }

    /// Number of live change listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Publishes a change event to every listener.
    pub fn emit(&mut self, kind: ChangeKind) {
        let event = ChangeEvent::new(kind, self.surface);
        // A listener whose receiver is gone will never read again.
        self.listeners.retain(|(_, sink)| sink.send(event).is_ok());
    }

    fn record(&self, id: BlockId) -> Result<&BlockRecord, HostError> {
        self.slots
            .get(id.slot() as usize)
            .filter(|s| s.generation == id.generation())
            .and_then(|s| s.record.as_ref())
            .ok_or(HostError::StaleBlock(id))
    }

    fn record_mut(&mut self, id: BlockId) -> Result<&mut BlockRecord, HostError> {
        self.slots
            .get_mut(id.slot() as usize)
            .filter(|s| s.generation == id.generation())
            .and_then(|s| s.record.as_mut())
            .ok_or(HostError::StaleBlock(id))
    }

    fn template_of(&self, id: BlockId) -> Result<&BlockTemplate, HostError> {
        let record = self.record(id)?;
        Ok(&self.templates[record.template])
    }

    fn check_enumeration(&self, what: &str) -> Result<(), HostError> {
        if self.fail_enumeration {
            return Err(HostError::Enumeration(format!("{what} unavailable")));
        }
        Ok(())
    }

    fn input_kind(&self, block: BlockId, name: &str) -> Option<InputKind> {
        let template = self.template_of(block).ok()?;
        let idx = template.input_index(name)?;
        Some(template.inputs[idx].1)
    }

    /// Returns `true` if `candidate` is `block` or one of its ancestors.
    fn is_ancestor_or_self(&self, candidate: BlockId, block: BlockId) -> bool {
        let mut current = Some(block);
        while let Some(id) = current {
            if id == candidate {
                return true;
            }
            current = self
                .record(id)
                .ok()
                .and_then(|r| r.parent.as_ref())
                .map(|l| l.parent.block);
        }
        false
    }

    /// Blocks directly attached below `block` through its next socket or inputs.
    fn children(&self, block: BlockId) -> Vec<(ConnectionPoint, BlockId)> {
        let Ok(record) = self.record(block) else {
            return Vec::new();
        };
        let template = &self.templates[record.template];
        let mut out = Vec::new();
        if let Some(next) = record.next {
            out.push((ConnectionPoint::Next, next));
        }
        for ((name, _, _), target) in template.inputs.iter().zip(&record.inputs) {
            if let Some(target) = target {
                out.push((ConnectionPoint::Input(name.clone()), *target));
            }
        }
        out
    }

    fn child_origin(&self, parent: &SocketRef) -> Option<Point> {
        let record = self.record(parent.block).ok()?;
        let template = &self.templates[record.template];
        let o = record.origin;
        match &parent.point {
            ConnectionPoint::Next => Some(Point::new(o.x, o.y + template.size.height)),
            ConnectionPoint::Input(name) => {
                let idx = template.input_index(name)?;
                match template.inputs[idx].1 {
                    InputKind::Statement => {
                        Some(Point::new(o.x + STATEMENT_INDENT, o.y + STATEMENT_HEADER))
                    }
                    InputKind::Value | InputKind::Dummy => Some(Point::new(
                        o.x + template.size.width,
                        o.y + idx as f64 * VALUE_ROW,
                    )),
                }
            }
            ConnectionPoint::Output | ConnectionPoint::Previous => None,
        }
    }

    /// Repositions everything attached below `root` relative to `root`.
    fn layout_subtree(&mut self, root: BlockId) {
        let mut stack = vec![root];
        while let Some(block) = stack.pop() {
            for (point, child) in self.children(block) {
                let socket = SocketRef::new(block, point);
                if let Some(origin) = self.child_origin(&socket)
                    && let Ok(record) = self.record_mut(child)
                {
                    record.origin = origin;
                }
                stack.push(child);
            }
        }
    }

    fn unlink(&mut self, parent: &SocketRef, child: BlockId) -> Result<(), HostError> {
        let parent_template = self.record(parent.block)?.template;
        let input_idx = match &parent.point {
            ConnectionPoint::Input(name) => self.templates[parent_template].input_index(name),
            _ => None,
        };
        let record = self.record_mut(parent.block)?;
        match (&parent.point, input_idx) {
            (ConnectionPoint::Next, _) => record.next = None,
            (ConnectionPoint::Input(_), Some(idx)) => record.inputs[idx] = None,
            _ => return Err(HostError::MissingSocket(parent.clone())),
        }
        self.record_mut(child)?.parent = None;
        self.emit(ChangeKind::BlockMoved);
        Ok(())
    }
}

impl Workspace for MemoryWorkspace {
    fn surface_id(&self) -> SurfaceId {
        self.surface
    }

    fn block_types(&self) -> Result<Vec<BlockDescriptor>, HostError> {
        self.check_enumeration("block types")?;
        Ok(self
            .templates
            .iter()
            .map(|t| BlockDescriptor {
                type_name: t.type_name.clone(),
                label: t.label.clone(),
            })
            .collect())
    }

    fn has_block_type(&self, type_name: &str) -> bool {
        self.by_type.contains_key(type_name)
    }

    fn variables(&self) -> Result<Vec<Variable>, HostError> {
        self.check_enumeration("variables")?;
        Ok(self.variables.clone())
    }

    fn variable_by_name(&self, name: &str) -> Option<Variable> {
        self.variables
            .iter()
            .find(|v| v.name.eq_ignore_ascii_case(name))
            .cloned()
    }

    fn create_variable(&mut self, name: &str) -> Result<Variable, HostError> {
        if let Some(existing) = self.variable_by_name(name) {
            return Ok(existing);
        }
        if name.trim().is_empty() {
            return Err(HostError::VariableRejected(name.to_owned()));
        }
        let var = Variable {
            id: VariableId::new(format!("var-{}", self.next_variable)),
            name: name.to_owned(),
        };
        self.next_variable += 1;
        self.variables.push(var.clone());
        self.emit(ChangeKind::VariableCreated);
        Ok(var)
    }

    fn procedures(&self) -> Result<Vec<ProcedureInfo>, HostError> {
        self.check_enumeration("procedures")?;
        let mut out = Vec::new();
        for id in self.blocks() {
            let record = self.record(id)?;
            let template = &self.templates[record.template];
            if !template.type_name.starts_with("procedures_def") {
                continue;
            }
            let Some(name) = record.fields.get("NAME").filter(|n| !n.is_empty()) else {
                continue;
            };
            let params = record
                .extra_state
                .as_ref()
                .and_then(|s| s.get("params"))
                .and_then(|p| p.as_array())
                .map(|params| {
                    params
                        .iter()
                        .filter_map(|p| p.as_str().map(str::to_owned))
                        .collect()
                })
                .unwrap_or_default();
            out.push(ProcedureInfo {
                name: name.clone(),
                params,
                returns_value: template.type_name == "procedures_defreturn",
            });
        }
        Ok(out)
    }

    fn blocks(&self) -> Vec<BlockId> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.record.is_some())
            .filter_map(|(i, s)| Some(BlockId::from_raw(u32::try_from(i).ok()?, s.generation)))
            .collect()
    }

    fn block_type(&self, block: BlockId) -> Option<&str> {
        self.template_of(block).ok().map(|t| t.type_name.as_str())
    }

    fn field_value(&self, block: BlockId, field: &str) -> Option<String> {
        self.record(block).ok()?.fields.get(field).cloned()
    }

    fn field_kind(&self, block: BlockId, field: &str) -> Option<FieldKind> {
        self.template_of(block).ok()?.field_kind(field)
    }

    fn extra_state(&self, block: BlockId) -> Option<serde_json::Value> {
        self.record(block).ok()?.extra_state.clone()
    }

    fn inputs(&self, block: BlockId) -> Vec<InputSocket> {
        let Ok(record) = self.record(block) else {
            return Vec::new();
        };
        let template = &self.templates[record.template];
        template
            .inputs
            .iter()
            .zip(&record.inputs)
            .map(|((name, kind, check), target)| InputSocket {
                name: name.clone(),
                kind: *kind,
                check: check.clone(),
                target: *target,
            })
            .collect()
    }

    fn socket(&self, block: BlockId, point: &ConnectionPoint) -> Option<Socket> {
        let record = self.record(block).ok()?;
        let template = &self.templates[record.template];
        let upstream = record
            .parent
            .as_ref()
            .filter(|l| &l.via == point)
            .map(|l| l.parent.block);
        let (check, target) = match point {
            ConnectionPoint::Output => (template.output.clone()?, upstream),
            ConnectionPoint::Previous => (template.previous.clone()?, upstream),
            ConnectionPoint::Next => (template.next.clone()?, record.next),
            ConnectionPoint::Input(name) => {
                let idx = template.input_index(name)?;
                (template.inputs[idx].2.clone(), record.inputs[idx])
            }
        };
        Some(Socket {
            point: point.clone(),
            check,
            target,
        })
    }

    fn parent(&self, block: BlockId) -> Option<SocketRef> {
        self.record(block).ok()?.parent.as_ref().map(|l| l.parent.clone())
    }

    fn bounds(&self, block: BlockId) -> Option<Rect> {
        let record = self.record(block).ok()?;
        let size = self.templates[record.template].size;
        Some(Rect::from_origin_size(record.origin, size))
    }

    fn selected(&self) -> Option<BlockId> {
        self.selected.filter(|id| self.record(*id).is_ok())
    }

    fn viewport(&self) -> Viewport {
        self.viewport.clone()
    }

    fn create_block(&mut self, type_name: &str) -> Result<BlockId, HostError> {
        let template = *self
            .by_type
            .get(type_name)
            .ok_or_else(|| HostError::UnknownBlockType(type_name.to_owned()))?;
        let record = BlockRecord {
            template,
            fields: HashMap::new(),
            extra_state: None,
            origin: Point::ZERO,
            parent: None,
            next: None,
            inputs: vec![None; self.templates[template].inputs.len()],
        };
        let id = if let Some(slot) = self.free.pop() {
            let entry = &mut self.slots[slot as usize];
            entry.generation += 1;
            entry.record = Some(record);
            BlockId::from_raw(slot, entry.generation)
        } else {
            let slot = u32::try_from(self.slots.len())
                .map_err(|_| HostError::InvalidLink("block slots exhausted"))?;
            self.slots.push(Slot {
                generation: 1,
                record: Some(record),
            });
            BlockId::from_raw(slot, 1)
        };
        self.emit(ChangeKind::BlockCreated);
        Ok(id)
    }

    fn dispose_block(&mut self, block: BlockId) -> Result<(), HostError> {
        self.record(block)?;
        if let Some(parent) = self.parent(block) {
            self.unlink(&parent, block)?;
        }
        let mut doomed = vec![block];
        let mut i = 0;
        while i < doomed.len() {
            doomed.extend(self.children(doomed[i]).into_iter().map(|(_, c)| c));
            i += 1;
        }
        for id in doomed {
            if let Some(slot) = self.slots.get_mut(id.slot() as usize) {
                slot.record = None;
                self.free.push(id.slot());
            }
            if self.selected == Some(id) {
                self.selected = None;
            }
        }
        self.emit(ChangeKind::BlockDeleted);
        Ok(())
    }

    fn set_field(&mut self, block: BlockId, field: &str, value: &str) -> Result<(), HostError> {
        let template = self.template_of(block)?;
        if template.field_kind(field).is_none() {
            return Err(HostError::UnknownField {
                block_type: template.type_name.clone(),
                field: field.to_owned(),
            });
        }
        self.record_mut(block)?
            .fields
            .insert(field.to_owned(), value.to_owned());
        self.emit(ChangeKind::BlockChanged);
        Ok(())
    }

    fn set_extra_state(
        &mut self,
        block: BlockId,
        state: &serde_json::Value,
    ) -> Result<(), HostError> {
        self.record_mut(block)?.extra_state = Some(state.clone());
        self.emit(ChangeKind::BlockChanged);
        Ok(())
    }

    fn move_block(&mut self, block: BlockId, to: Point) -> Result<(), HostError> {
        let record = self.record_mut(block)?;
        if record.parent.is_some() {
            return Err(HostError::InvalidLink("attached blocks move with their parent"));
        }
        record.origin = to;
        self.layout_subtree(block);
        self.emit(ChangeKind::BlockMoved);
        Ok(())
    }

    fn connect(&mut self, a: &SocketRef, b: &SocketRef) -> Result<(), HostError> {
        let (parent, child) = match (a.point.is_child_side(), b.point.is_child_side()) {
            (false, true) => (a, b),
            (true, false) => (b, a),
            _ => return Err(HostError::InvalidLink("a link needs one plug and one socket")),
        };
        self.record(parent.block)?;
        self.record(child.block)?;
        let parent_socket = self
            .socket(parent.block, &parent.point)
            .ok_or_else(|| HostError::MissingSocket(parent.clone()))?;
        let child_socket = self
            .socket(child.block, &child.point)
            .ok_or_else(|| HostError::MissingSocket(child.clone()))?;

        let paired = match (&parent.point, &child.point) {
            (ConnectionPoint::Next, ConnectionPoint::Previous) => true,
            (ConnectionPoint::Input(name), ConnectionPoint::Output) => {
                self.input_kind(parent.block, name) == Some(InputKind::Value)
            }
            (ConnectionPoint::Input(name), ConnectionPoint::Previous) => {
                self.input_kind(parent.block, name) == Some(InputKind::Statement)
            }
            _ => false,
        };
        if !paired {
            return Err(HostError::InvalidLink("socket kinds do not pair"));
        }
        if !parent_socket.is_free() {
            return Err(HostError::Occupied(parent.clone()));
        }
        if self.record(child.block)?.parent.is_some() {
            return Err(HostError::Occupied(child.clone()));
        }
        if !parent_socket.check.accepts(&child_socket.check) {
            return Err(HostError::Incompatible(parent.clone(), child.clone()));
        }
        if self.is_ancestor_or_self(child.block, parent.block) {
            return Err(HostError::InvalidLink("link would form a cycle"));
        }

        let input_idx = match &parent.point {
            ConnectionPoint::Input(name) => {
                self.template_of(parent.block)?.input_index(name)
            }
            _ => None,
        };
        let record = self.record_mut(parent.block)?;
        match input_idx {
            Some(idx) => record.inputs[idx] = Some(child.block),
            None => record.next = Some(child.block),
        }
        self.record_mut(child.block)?.parent = Some(ParentLink {
            parent: parent.clone(),
            via: child.point.clone(),
        });
        if let Some(origin) = self.child_origin(parent) {
            self.record_mut(child.block)?.origin = origin;
        }
        self.layout_subtree(child.block);
        self.emit(ChangeKind::BlockMoved);
        Ok(())
    }

    fn disconnect(&mut self, socket: &SocketRef) -> Result<Option<SocketRef>, HostError> {
        let record = self.record(socket.block)?;
        if socket.point.is_child_side() {
            let Some(link) = record.parent.clone().filter(|l| l.via == socket.point) else {
                return Ok(None);
            };
            self.unlink(&link.parent, socket.block)?;
            return Ok(Some(link.parent));
        }
        let target = match &socket.point {
            ConnectionPoint::Next => {
                if self.templates[record.template].next.is_none() {
                    return Err(HostError::MissingSocket(socket.clone()));
                }
                record.next
            }
            ConnectionPoint::Input(name) => {
                let idx = self.templates[record.template]
                    .input_index(name)
                    .ok_or_else(|| HostError::MissingSocket(socket.clone()))?;
                record.inputs[idx]
            }
            ConnectionPoint::Output | ConnectionPoint::Previous => None,
        };
        let Some(target) = target else {
            return Ok(None);
        };
        let via = self
            .record(target)?
            .parent
            .as_ref()
            .map(|l| l.via.clone())
            .unwrap_or(ConnectionPoint::Previous);
        self.unlink(socket, target)?;
        Ok(Some(SocketRef::new(target, via)))
    }

    fn subscribe(&mut self, sink: Sender<ChangeEvent>) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, sink));
        id
    }

    fn unsubscribe(&mut self, listener: ListenerId) {
        self.listeners.retain(|(id, _)| *id != listener);
    }
}
