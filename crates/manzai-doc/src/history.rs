//! Linear undo/redo history of full script snapshots.
//!
//! The history is an ordered list of snapshots plus a cursor. `entries[cursor]`
//! is always the script currently shown to the user.
//!
//! ```text
//!   record(d) after two undos from [a b c]:
//!
//!   entries:  a  b  c            a  b  d
//!   cursor:      ^        ->           ^      (c is gone for good)
//! ```
//!
//! - [`History::record`] truncates everything after the cursor, then appends.
//!   It is the only operation that grows the list.
//! - [`History::undo`] / [`History::redo`] only move the cursor.
//!
//! Snapshots are stored by value and never handed out mutably, so editing the
//! current script can't retroactively change a stored one.

use manzai_types::Script;

/// One recorded state.
#[derive(Clone, Debug)]
pub struct HistoryEntry {
    /// Short description of the action that produced this state.
    pub label: &'static str,
    script: Script,
}

impl HistoryEntry {
    pub fn script(&self) -> &Script {
        &self.script
    }
}

/// Snapshot history with a cursor.
#[derive(Clone, Debug)]
pub struct History {
    entries: Vec<HistoryEntry>,
    cursor: usize,
}

impl History {
    /// Start a history with `initial` as its sole entry.
    pub fn new(initial: Script) -> Self {
        Self {
            entries: vec![HistoryEntry {
                label: "open",
                script: initial,
            }],
            cursor: 0,
        }
    }

    /// Record a committed change.
    ///
    /// Any entries after the cursor become permanently unreachable.
    pub fn record(&mut self, label: &'static str, script: Script) {
        let discarded = self.entries.len() - (self.cursor + 1);
        self.entries.truncate(self.cursor + 1);
        self.entries.push(HistoryEntry { label, script });
        self.cursor = self.entries.len() - 1;

        tracing::debug!(
            label,
            depth = self.entries.len(),
            discarded,
            "history entry recorded"
        );
    }

    /// Step back one entry. Returns `None` when there is nothing to undo.
    pub fn undo(&mut self) -> Option<&Script> {
        if !self.can_undo() {
            tracing::debug!("nothing to undo");
            return None;
        }
        let undone = self.entries[self.cursor].label;
        self.cursor -= 1;
        tracing::debug!(label = undone, cursor = self.cursor, "undo");
        Some(&self.entries[self.cursor].script)
    }

    /// Step forward one entry. Returns `None` when there is nothing to redo.
    pub fn redo(&mut self) -> Option<&Script> {
        if !self.can_redo() {
            tracing::debug!("nothing to redo");
            return None;
        }
        self.cursor += 1;
        tracing::debug!(
            label = self.entries[self.cursor].label,
            cursor = self.cursor,
            "redo"
        );
        Some(&self.entries[self.cursor].script)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.entries.len() - 1
    }

    /// The script at the cursor.
    pub fn current(&self) -> &Script {
        &self.entries[self.cursor].script
    }

    /// Label of the action `undo` would revert.
    pub fn undo_label(&self) -> Option<&'static str> {
        self.can_undo().then(|| self.entries[self.cursor].label)
    }

    /// Label of the action `redo` would reapply.
    pub fn redo_label(&self) -> Option<&'static str> {
        self.can_redo().then(|| self.entries[self.cursor + 1].label)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of stored snapshots, reachable or not via redo.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false: a history holds at least its seed entry.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }
}
