//! Snapshot-based undo/redo.
//!
//! The history is a linear list of full document snapshots with a cursor
//! pointing at the snapshot that matches the live store. Entry 0 is the
//! baseline; every discrete action appends one entry after the cursor and
//! discards anything that was redoable.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use tracing::debug;

use crate::consts::HISTORY_LIMIT;
use crate::doc::{EntityStore, Snapshot};

#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<Snapshot>,
    cursor: usize,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(&EntityStore::default(), HISTORY_LIMIT)
    }
}

impl History {
    /// Start a history whose baseline is the current state of `store`.
    /// `limit` is the maximum number of snapshots kept, baseline included.
    #[must_use]
    pub fn new(store: &EntityStore, limit: usize) -> Self {
        Self { entries: vec![store.snapshot()], cursor: 0, limit: limit.max(1) }
    }

    /// Record the state after a completed action.
    pub fn push(&mut self, store: &EntityStore) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(store.snapshot());
        self.cursor = self.entries.len() - 1;
        if self.entries.len() > self.limit {
            let excess = self.entries.len() - self.limit;
            self.entries.drain(..excess);
            self.cursor -= excess;
        }
        debug!(cursor = self.cursor, len = self.entries.len(), "history push");
    }

    /// Step back one action. Returns `false` at the baseline.
    pub fn undo(&mut self, store: &mut EntityStore) -> bool {
        if !self.can_undo() {
            return false;
        }
        self.cursor -= 1;
        store.restore(&self.entries[self.cursor]);
        debug!(cursor = self.cursor, "history undo");
        true
    }

    /// Step forward one action. Returns `false` when nothing is redoable.
    pub fn redo(&mut self, store: &mut EntityStore) -> bool {
        if !self.can_redo() {
            return false;
        }
        self.cursor += 1;
        store.restore(&self.entries[self.cursor]);
        debug!(cursor = self.cursor, "history redo");
        true
    }

    /// Drop every entry and make the current state of `store` the baseline.
    pub fn reset(&mut self, store: &EntityStore) {
        self.entries.clear();
        self.entries.push(store.snapshot());
        self.cursor = 0;
        debug!("history reset");
    }

    /// The snapshot that matches the live store.
    #[must_use]
    pub fn current(&self) -> &Snapshot {
        &self.entries[self.cursor]
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Number of snapshots held, baseline included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false`: the baseline is never dropped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }
}
