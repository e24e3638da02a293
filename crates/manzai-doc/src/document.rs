//! Script document: block-level mutations over a snapshot history.
//!
//! Every mutation builds a [`ScriptUpdate`], runs it through
//! [`Script::apply`], and records the result in the [`History`]. Undo and redo
//! only move the history cursor; they are never recorded themselves.
//!
//! Blocks are always addressed by [`BlockId`]. An id that matches nothing is
//! a benign miss: the operation still commits (the script is re-stamped and
//! recorded) but no block changes.

use std::collections::HashSet;

use manzai_types::{Block, BlockId, Role, Script, ScriptUpdate};

use crate::history::History;
use crate::{DocError, Result};

/// An editable script with undo/redo.
#[derive(Clone, Debug)]
pub struct ScriptDocument {
    history: History,
}

impl ScriptDocument {
    /// Start editing `script`; it becomes the sole history entry.
    pub fn new(script: Script) -> Self {
        tracing::debug!(script_id = %script.id, blocks = script.blocks.len(), "document opened");
        Self {
            history: History::new(script),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The script currently shown to the user.
    pub fn script(&self) -> &Script {
        self.history.current()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Role the next [`add_line`](Self::add_line) will assign.
    ///
    /// Based on the last line in document order (headings skipped), not on a
    /// counter: boke after a tsukkomi or when there are no lines, tsukkomi
    /// after a boke.
    pub fn next_role(&self) -> Role {
        let last = self.script().blocks.iter().rev().find_map(Block::role);
        match last {
            None | Some(Role::Tsukkomi) => Role::Boke,
            Some(Role::Boke) => Role::Tsukkomi,
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Append an empty line with the alternating role. Returns its id.
    pub fn add_line(&mut self) -> BlockId {
        let block = Block::line(self.next_role());
        let id = block.id();
        self.append("add line", block);
        id
    }

    /// Append an empty heading. Returns its id.
    pub fn add_heading(&mut self) -> BlockId {
        let block = Block::heading();
        let id = block.id();
        self.append("add heading", block);
        id
    }

    /// Replace the content of one block.
    pub fn update_block(&mut self, id: BlockId, content: impl Into<String>) {
        let content = content.into();
        let blocks = self
            .script()
            .blocks
            .iter()
            .map(|b| {
                if b.id() == id {
                    b.with_content(content.clone())
                } else {
                    b.clone()
                }
            })
            .collect();
        self.commit("edit block", ScriptUpdate::new().blocks(blocks));
    }

    /// Remove one block; the rest keep their order.
    pub fn delete_block(&mut self, id: BlockId) {
        let blocks = self
            .script()
            .blocks
            .iter()
            .filter(|b| b.id() != id)
            .cloned()
            .collect();
        self.commit("delete block", ScriptUpdate::new().blocks(blocks));
    }

    /// Flip boke and tsukkomi on a line. Headings are left alone.
    pub fn toggle_role(&mut self, id: BlockId) {
        let blocks = self
            .script()
            .blocks
            .iter()
            .map(|b| match b {
                Block::Line(line) if line.id == id => Block::Line(line.toggled()),
                other => other.clone(),
            })
            .collect();
        self.commit("toggle role", ScriptUpdate::new().blocks(blocks));
    }

    /// Replace the whole block sequence.
    ///
    /// Any sequence is accepted as long as no id appears twice; a rejected
    /// sequence is not recorded.
    pub fn reorder(&mut self, blocks: Vec<Block>) -> Result<()> {
        self.reorder_as("reorder", blocks)
    }

    /// Move the block at `from` so it ends up at index `to`.
    ///
    /// Returns false (and records nothing) when either index is out of range
    /// or the result would fail the [`reorder`](Self::reorder) check.
    pub fn move_block(&mut self, from: usize, to: usize) -> bool {
        let len = self.script().blocks.len();
        if from >= len || to >= len {
            tracing::debug!(from, to, len, "move out of range");
            return false;
        }
        let mut blocks = self.script().blocks.clone();
        let block = blocks.remove(from);
        blocks.insert(to, block);
        self.reorder_as("move block", blocks).is_ok()
    }

    /// Set the script title. Blank titles fall back to the placeholder.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.commit("edit title", ScriptUpdate::new().title(title));
    }

    /// Trim surrounding whitespace from every block, as one change.
    pub fn format(&mut self) {
        let blocks = self
            .script()
            .blocks
            .iter()
            .map(|b| b.with_content(b.content().trim()))
            .collect();
        self.commit("format", ScriptUpdate::new().blocks(blocks));
    }

    /// Swap in a different script (new, imported, or loaded).
    ///
    /// The history is reseeded with it; earlier states are dropped.
    pub fn replace(&mut self, script: Script) {
        tracing::debug!(script_id = %script.id, "document replaced");
        self.history = History::new(script);
    }

    // =========================================================================
    // History
    // =========================================================================

    /// Step back. Returns the now-current script, or `None` if nothing to undo.
    pub fn undo(&mut self) -> Option<&Script> {
        self.history.undo()
    }

    /// Step forward. Returns the now-current script, or `None` if nothing to redo.
    pub fn redo(&mut self) -> Option<&Script> {
        self.history.redo()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn append(&mut self, label: &'static str, block: Block) {
        let mut blocks = self.script().blocks.clone();
        blocks.push(block);
        self.commit(label, ScriptUpdate::new().blocks(blocks));
    }

    fn reorder_as(&mut self, label: &'static str, blocks: Vec<Block>) -> Result<()> {
        let mut seen = HashSet::with_capacity(blocks.len());
        if let Some(dup) = blocks.iter().map(Block::id).find(|id| !seen.insert(*id)) {
            tracing::warn!(block = ?dup, label, "reorder rejected: duplicate block id");
            return Err(DocError::DuplicateBlock(dup));
        }
        self.commit(label, ScriptUpdate::new().blocks(blocks));
        Ok(())
    }

    fn commit(&mut self, label: &'static str, update: ScriptUpdate) {
        let next = self.script().apply(update);
        tracing::debug!(label, blocks = next.blocks.len(), "commit");
        self.history.record(label, next);
    }
}

impl Default for ScriptDocument {
    fn default() -> Self {
        Self::new(Script::new())
    }
}
