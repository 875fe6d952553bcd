//! Capture-scope undo/redo.
//!
//! A *capture scope* brackets a unit of work (a keystroke, a drag, a script
//! tool run). The first mutation inside an open scope lazily snapshots the
//! pre-state; closing the scope pushes that snapshot only if something
//! actually changed. This means scopes that end up no-ops (e.g. a drag that
//! starts and releases on the same cell) don't pollute the undo stack.

use std::collections::VecDeque;

use tracing::trace;

use crate::canvas::Canvas;
use crate::snapshot::CanvasSnapshot;

/// Bound on retained undo snapshots; oldest entries are evicted first.
pub const DEFAULT_HISTORY_LIMIT: usize = 256;

pub struct UndoEngine {
    undo_stack: VecDeque<CanvasSnapshot>,
    redo_stack: Vec<CanvasSnapshot>,
    limit: usize,
    capture_active: bool,
    capture_modified: bool,
    capture_snapshot: Option<CanvasSnapshot>,
    /// Set while [`UndoEngine::undo`]/[`UndoEngine::redo`] is restoring a
    /// snapshot, so that the restore itself can't be captured as an edit.
    applying_snapshot: bool,
}

impl Default for UndoEngine {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl UndoEngine {
    pub fn new(limit: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            limit: limit.max(1),
            capture_active: false,
            capture_modified: false,
            capture_snapshot: None,
            applying_snapshot: false,
        }
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn is_applying_snapshot(&self) -> bool {
        self.applying_snapshot
    }

    /// Snapshot capacity this engine was constructed with.
    pub fn history_limit(&self) -> usize {
        self.limit
    }

    /// Undo snapshots oldest-to-newest (index 0 is the first evicted once
    /// `history_limit` is exceeded).
    pub fn undo_snapshots(&self) -> Vec<CanvasSnapshot> {
        self.undo_stack.iter().cloned().collect()
    }

    /// Redo snapshots in pop order: the last element is what the next
    /// `redo()` call would apply.
    pub fn redo_snapshots(&self) -> Vec<CanvasSnapshot> {
        self.redo_stack.clone()
    }

    /// Rebuild an engine from previously captured stacks, e.g. when loading
    /// a project file. Any open capture scope is discarded.
    pub fn from_parts(limit: usize, undo: Vec<CanvasSnapshot>, redo: Vec<CanvasSnapshot>) -> Self {
        let mut engine = Self::new(limit);
        engine.undo_stack = undo.into();
        while engine.undo_stack.len() > engine.limit {
            engine.undo_stack.pop_front();
        }
        engine.redo_stack = redo;
        engine
    }

    /// Open a capture scope. Nested calls while a scope is already open are
    /// a no-op; `end_capture` closes the single outstanding scope.
    pub fn begin_capture(&mut self) {
        if self.applying_snapshot {
            return;
        }
        self.capture_active = true;
        self.capture_modified = false;
        self.capture_snapshot = None;
    }

    /// Called by every canvas mutator before it writes. Lazily snapshots
    /// pre-state on the first call within an open scope and marks the scope
    /// dirty; subsequent calls within the same scope are cheap no-ops.
    pub fn note_mutation(&mut self, canvas: &Canvas) {
        if self.applying_snapshot || !self.capture_active {
            return;
        }
        if self.capture_snapshot.is_none() {
            self.capture_snapshot = Some(CanvasSnapshot::capture(canvas));
        }
        self.capture_modified = true;
    }

    /// Close the open capture scope. If it was marked dirty, push its
    /// pre-state snapshot onto the undo stack, evict the oldest entry if
    /// over the limit, and clear the redo stack.
    pub fn end_capture(&mut self) {
        if !self.capture_active {
            return;
        }
        if self.capture_modified
            && let Some(snapshot) = self.capture_snapshot.take()
        {
            self.push(snapshot);
            self.redo_stack.clear();
            trace!(target: "canvas.undo", undo_depth = self.undo_stack.len(), "redo_cleared_on_capture");
        }
        self.capture_active = false;
        self.capture_modified = false;
        self.capture_snapshot = None;
    }

    fn push(&mut self, snapshot: CanvasSnapshot) {
        self.undo_stack.push_back(snapshot);
        while self.undo_stack.len() > self.limit {
            self.undo_stack.pop_front();
            trace!(target: "canvas.undo", "undo_history_trimmed");
        }
    }

    /// Restore the previous state, pushing the current state onto redo.
    /// Returns `false` if there is nothing to undo.
    pub fn undo(&mut self, canvas: &mut Canvas) -> bool {
        if self.applying_snapshot {
            return false;
        }
        let Some(prev) = self.undo_stack.pop_back() else {
            return false;
        };
        let current = CanvasSnapshot::capture(canvas);
        self.redo_stack.push(current);

        self.applying_snapshot = true;
        prev.restore_into(canvas);
        self.applying_snapshot = false;
        trace!(target: "canvas.undo", undo_depth = self.undo_stack.len(), redo_depth = self.redo_stack.len(), "undo_applied");
        true
    }

    /// Re-apply a state undone by [`UndoEngine::undo`]. Returns `false` if
    /// there is nothing to redo.
    pub fn redo(&mut self, canvas: &mut Canvas) -> bool {
        if self.applying_snapshot {
            return false;
        }
        let Some(next) = self.redo_stack.pop() else {
            return false;
        };
        let current = CanvasSnapshot::capture(canvas);
        self.push(current);

        self.applying_snapshot = true;
        next.restore_into(canvas);
        self.applying_snapshot = false;
        trace!(target: "canvas.undo", undo_depth = self.undo_stack.len(), redo_depth = self.redo_stack.len(), "redo_applied");
        true
    }
}
