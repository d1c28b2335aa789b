//! Snapshot-based undo stack.
//!
//! DESIGN
//! ======
//! The stack stores whole `DocumentModel` snapshots. `persist` truncates any
//! redo branch and appends; `undo`/`redo` move the pointer and hand back the
//! snapshot for the app to reconcile against its live pages. While paused
//! every operation is a no-op, which is how a drag gesture collapses into one
//! undo step. A fresh stack starts paused until `reset` seeds it.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use tracing::debug;

use crate::doc::DocumentModel;

#[derive(Debug, Clone)]
pub struct History {
    stack: Vec<DocumentModel>,
    pointer: usize,
    is_paused: bool,
}

impl Default for History {
    fn default() -> Self {
        Self { stack: Vec::new(), pointer: 0, is_paused: true }
    }
}

impl History {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.is_paused
    }

    #[must_use]
    pub fn pointer(&self) -> usize {
        self.pointer
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn pause(&mut self) {
        self.is_paused = true;
    }

    pub fn resume(&mut self) {
        self.is_paused = false;
    }

    /// Replace the stack with a single snapshot and resume recording.
    pub fn reset(&mut self, snapshot: DocumentModel) {
        self.stack = vec![snapshot];
        self.pointer = 0;
        self.is_paused = false;
        debug!("history reset");
    }

    /// Record a snapshot after the current pointer. Returns whether anything
    /// was recorded.
    pub fn persist(&mut self, snapshot: DocumentModel) -> bool {
        if self.is_paused {
            return false;
        }
        if self.pointer < self.stack.len() {
            self.stack.truncate(self.pointer + 1);
        }
        self.stack.push(snapshot);
        self.pointer = self.stack.len() - 1;
        debug!(pointer = self.pointer, len = self.stack.len(), "history persist");
        true
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.is_paused && self.pointer > 0
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.is_paused && self.pointer + 1 < self.stack.len()
    }

    /// Step back one snapshot and return it.
    pub fn undo(&mut self) -> Option<&DocumentModel> {
        if !self.can_undo() {
            return None;
        }
        self.pointer -= 1;
        debug!(pointer = self.pointer, "history undo");
        self.stack.get(self.pointer)
    }

    /// Step forward one snapshot and return it.
    pub fn redo(&mut self) -> Option<&DocumentModel> {
        if !self.can_redo() {
            return None;
        }
        self.pointer += 1;
        debug!(pointer = self.pointer, "history redo");
        self.stack.get(self.pointer)
    }

    /// The snapshot under the pointer.
    #[must_use]
    pub fn current(&self) -> Option<&DocumentModel> {
        self.stack.get(self.pointer)
    }
}
