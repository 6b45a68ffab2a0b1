// Copyright 2025 the Typeblock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::sync::mpsc::{self, Receiver, TryRecvError};

use tracing::{debug, trace};
use typeblock_host::{ChangeEvent, ListenerId, SurfaceId, Workspace};
use typeblock_options::BlockOption;

/// Default delay between the last qualifying change and invalidation.
pub const DEFAULT_DEBOUNCE_MS: u64 = 100;

/// Dirty flag and cached option list for one surface.
///
/// The tracker subscribes to the surface's change events when created. Events
/// that can change the option list arm a debounce deadline; each new event
/// replaces the deadline, and once [`pump`](Self::pump) observes a time past it
/// the cache is invalidated. Time is passed in as milliseconds from any fixed
/// origin.
///
/// ```rust
/// use typeblock_host::memory::MemoryWorkspace;
/// use typeblock_host::{SurfaceId, Workspace};
/// use typeblock_session::WorkspaceStateTracker;
///
/// let mut ws = MemoryWorkspace::with_standard_blocks(SurfaceId(1));
/// let mut tracker = WorkspaceStateTracker::new(&mut ws, 100);
/// tracker.mark_reloaded();
///
/// ws.create_variable("n").unwrap();
/// assert!(!tracker.pump(0));
/// assert!(!tracker.pump(99));
/// assert!(tracker.pump(100));
/// assert!(tracker.needs_reload());
///
/// tracker.dispose(&mut ws);
/// ```
#[derive(Debug)]
pub struct WorkspaceStateTracker {
    surface: SurfaceId,
    events: Receiver<ChangeEvent>,
    listener: Option<ListenerId>,
    debounce_ms: u64,
    deadline: Option<u64>,
    dirty: bool,
    cached: Option<Vec<BlockOption>>,
}

impl WorkspaceStateTracker {
    /// Subscribes to `ws` and starts dirty.
    pub fn new(ws: &mut dyn Workspace, debounce_ms: u64) -> Self {
        let (sender, events) = mpsc::channel();
        let listener = ws.subscribe(sender);
        Self {
            surface: ws.surface_id(),
            events,
            listener: Some(listener),
            debounce_ms,
            deadline: None,
            dirty: true,
            cached: None,
        }
    }

    /// Marks the cached options stale.
    ///
    /// Repeated calls before [`mark_reloaded`](Self::mark_reloaded) collapse
    /// into one.
    pub fn invalidate(&mut self, reason: &str) {
        trace!(reason, already_dirty = self.dirty, "options invalidated");
        self.dirty = true;
    }

    /// Returns `true` while the cached options are stale.
    #[must_use]
    pub fn needs_reload(&self) -> bool {
        self.dirty
    }

    /// Clears the dirty flag after a successful regeneration.
    pub fn mark_reloaded(&mut self) {
        self.dirty = false;
    }

    /// Stores a freshly generated option list.
    pub fn store(&mut self, options: Vec<BlockOption>) {
        self.cached = Some(options);
    }

    /// The last successfully generated option list, if any.
    #[must_use]
    pub fn cached(&self) -> Option<&[BlockOption]> {
        self.cached.as_deref()
    }

    /// Pending debounce deadline, if a change is waiting.
    #[must_use]
    pub fn deadline(&self) -> Option<u64> {
        self.deadline
    }

    /// Returns `true` once [`dispose`](Self::dispose) has run.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.listener.is_none()
    }

    /// Drains queued change events and fires the debounce if it is due.
    ///
    /// Returns `true` if this call invalidated the cache.
    pub fn pump(&mut self, now: u64) -> bool {
        if self.is_disposed() {
            return false;
        }
        loop {
            match self.events.try_recv() {
                Ok(event) => {
                    if event.surface == self.surface && event.kind.affects_options() {
                        trace!(kind = ?event.kind, "change queued");
                        self.deadline = Some(now.saturating_add(self.debounce_ms));
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    debug!("change notifications closed by the host");
                    break;
                }
            }
        }
        match self.deadline {
            Some(due) if now >= due => {
                self.deadline = None;
                debug!(due, now, "debounced change fired");
                self.invalidate("workspace changed");
                true
            }
            _ => false,
        }
    }

    /// Unsubscribes from `ws` and cancels any pending debounce.
    ///
    /// Calling this again does nothing.
    pub fn dispose(&mut self, ws: &mut dyn Workspace) {
        if let Some(listener) = self.listener.take() {
            ws.unsubscribe(listener);
        }
        self.deadline = None;
        while self.events.try_recv().is_ok() {}
    }
}
