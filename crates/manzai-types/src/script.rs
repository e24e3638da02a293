//! The script container.
//!
//! [`Script::apply`] is the single choke point for change: every committed
//! mutation produces a new `Script` through it, which refreshes `updated_at`
//! exactly once and applies all fields of a [`ScriptUpdate`] together.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::block::Block;
use crate::ids::{BlockId, ScriptId};
use crate::now_millis;

/// Placeholder title for new scripts and blank titles.
pub const DEFAULT_TITLE: &str = "無題の台本";

/// A comedy dialogue script.
///
/// Serialized as `{id, title, blocks, createdAt, updatedAt}`; timestamps are
/// Unix milliseconds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Script {
    pub id: ScriptId,
    pub title: String,
    /// Reading/performance order.
    pub blocks: Vec<Block>,
    pub created_at: u64,
    pub updated_at: u64,
}

impl Script {
    /// New empty script with a fresh id, both timestamps set to now.
    pub fn new() -> Self {
        let now = now_millis();
        Self {
            id: ScriptId::new(),
            title: DEFAULT_TITLE.to_string(),
            blocks: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// New script with the given title and blocks, stamped now.
    ///
    /// Used by import: the caller is responsible for handing over blocks with
    /// fresh, unique ids.
    pub fn with_content(title: impl Into<String>, blocks: Vec<Block>) -> Self {
        Self {
            title: normalize_title(title.into()),
            blocks,
            ..Self::new()
        }
    }

    /// Produce the next version of this script.
    ///
    /// Fields absent from `update` are carried over; `updated_at` moves to now
    /// but never backwards. `id` and `created_at` never change.
    pub fn apply(&self, update: ScriptUpdate) -> Script {
        let ScriptUpdate { title, blocks } = update;
        Script {
            id: self.id,
            title: title.map(normalize_title).unwrap_or_else(|| self.title.clone()),
            blocks: blocks.unwrap_or_else(|| self.blocks.clone()),
            created_at: self.created_at,
            updated_at: now_millis().max(self.updated_at),
        }
    }

    /// Restore the container invariants on a script from outside the editor.
    ///
    /// A blank title becomes the placeholder. A block whose id already
    /// appeared earlier in the sequence gets a fresh id; the first occurrence
    /// keeps its own. Content, order, and timestamps are untouched.
    pub fn normalized(self) -> Script {
        let mut seen = HashSet::with_capacity(self.blocks.len());
        let blocks = self
            .blocks
            .into_iter()
            .map(|b| {
                if seen.insert(b.id()) {
                    b
                } else {
                    b.with_fresh_id()
                }
            })
            .collect();
        Script {
            title: normalize_title(self.title),
            blocks,
            ..self
        }
    }

    /// Whether [`normalized`](Self::normalized) would leave this script as is.
    pub fn is_normalized(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.blocks.len());
        !self.title.trim().is_empty() && self.blocks.iter().all(|b| seen.insert(b.id()))
    }

    /// Number of line blocks (headings excluded).
    pub fn line_count(&self) -> usize {
        self.blocks.iter().filter(|b| b.is_line()).count()
    }

    /// Find a block by id.
    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id() == id)
    }

    /// Position of a block by id.
    pub fn position(&self, id: BlockId) -> Option<usize> {
        self.blocks.iter().position(|b| b.id() == id)
    }
}

impl Default for Script {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize_title(title: String) -> String {
    if title.trim().is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        title
    }
}

/// A partial set of field changes for [`Script::apply`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScriptUpdate {
    pub title: Option<String>,
    pub blocks: Option<Vec<Block>>,
}

impl ScriptUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Replace the whole block sequence.
    pub fn blocks(mut self, blocks: Vec<Block>) -> Self {
        self.blocks = Some(blocks);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.blocks.is_none()
    }
}

// ============================================================================
// Tests
// ============================================================================
