//! Block types: dialogue lines and section headings.
//!
//! A script is an ordered sequence of [`Block`]s. `Block` is a closed sum type
//! so a heading can never carry a role:
//!
//! - [`LineBlock`]: one spoken line, attributed to a [`Role`]
//! - [`HeadingBlock`]: a structural section boundary
//!
//! Blocks are immutable values. "Updating" a block produces a new value with
//! the same id and variant and changed fields; see [`Block::with_content`] and
//! [`LineBlock::toggled`].
//!
//! On the wire a block is a flat JSON object discriminated by `type`:
//!
//! ```text
//! {"type": "line",    "id": "...", "content": "...", "role": "boke"}
//! {"type": "heading", "id": "...", "content": "..."}
//! ```

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::EnumString;

use crate::ids::BlockId;

/// Conversational role in a two-person comedy dialogue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum Role {
    /// Sets up and delivers the absurdity.
    #[strum(serialize = "boke", serialize = "ボケ")]
    Boke,
    /// Reacts to and corrects the boke.
    #[strum(serialize = "tsukkomi", serialize = "ツッコミ")]
    Tsukkomi,
}

impl Role {
    /// Parse from string (case-insensitive, accepts the katakana labels).
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        <Self as FromStr>::from_str(s).ok()
    }

    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Boke => "boke",
            Role::Tsukkomi => "tsukkomi",
        }
    }

    /// Label used in transcripts and prompts.
    pub fn label(&self) -> &'static str {
        match self {
            Role::Boke => "ボケ",
            Role::Tsukkomi => "ツッコミ",
        }
    }

    /// The other role.
    pub fn flipped(self) -> Self {
        match self {
            Role::Boke => Role::Tsukkomi,
            Role::Tsukkomi => Role::Boke,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Variant tag of a [`Block`], without its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BlockKind {
    Line,
    Heading,
}

impl BlockKind {
    /// Wire representation (the `type` field).
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockKind::Line => "line",
            BlockKind::Heading => "heading",
        }
    }
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A spoken line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineBlock {
    pub id: BlockId,
    pub content: String,
    pub role: Role,
}

impl LineBlock {
    /// New empty line with a fresh id.
    pub fn new(role: Role) -> Self {
        Self {
            id: BlockId::new(),
            content: String::new(),
            role,
        }
    }

    /// Same line spoken by the other role.
    pub fn toggled(&self) -> Self {
        Self {
            role: self.role.flipped(),
            ..self.clone()
        }
    }
}

/// A section heading.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingBlock {
    pub id: BlockId,
    pub content: String,
}

impl HeadingBlock {
    /// New empty heading with a fresh id.
    pub fn new() -> Self {
        Self {
            id: BlockId::new(),
            content: String::new(),
        }
    }
}

impl Default for HeadingBlock {
    fn default() -> Self {
        Self::new()
    }
}

/// One unit of script content.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Block {
    Line(LineBlock),
    Heading(HeadingBlock),
}

impl Block {
    /// New empty line block.
    pub fn line(role: Role) -> Self {
        Block::Line(LineBlock::new(role))
    }

    /// New empty heading block.
    pub fn heading() -> Self {
        Block::Heading(HeadingBlock::new())
    }

    pub fn id(&self) -> BlockId {
        match self {
            Block::Line(line) => line.id,
            Block::Heading(heading) => heading.id,
        }
    }

    pub fn content(&self) -> &str {
        match self {
            Block::Line(line) => &line.content,
            Block::Heading(heading) => &heading.content,
        }
    }

    pub fn kind(&self) -> BlockKind {
        match self {
            Block::Line(_) => BlockKind::Line,
            Block::Heading(_) => BlockKind::Heading,
        }
    }

    /// Role of a line block; `None` for headings.
    pub fn role(&self) -> Option<Role> {
        match self {
            Block::Line(line) => Some(line.role),
            Block::Heading(_) => None,
        }
    }

    pub fn as_line(&self) -> Option<&LineBlock> {
        match self {
            Block::Line(line) => Some(line),
            Block::Heading(_) => None,
        }
    }

    pub fn is_line(&self) -> bool {
        matches!(self, Block::Line(_))
    }

    /// Same block with a newly generated id.
    pub fn with_fresh_id(&self) -> Self {
        match self {
            Block::Line(line) => Block::Line(LineBlock {
                id: BlockId::new(),
                ..line.clone()
            }),
            Block::Heading(heading) => Block::Heading(HeadingBlock {
                id: BlockId::new(),
                content: heading.content.clone(),
            }),
        }
    }

    /// Same block (id, variant, role) with different content.
    pub fn with_content(&self, content: impl Into<String>) -> Self {
        let content = content.into();
        match self {
            Block::Line(line) => Block::Line(LineBlock {
                content,
                ..line.clone()
            }),
            Block::Heading(heading) => Block::Heading(HeadingBlock {
                id: heading.id,
                content,
            }),
        }
    }
}

impl From<LineBlock> for Block {
    fn from(line: LineBlock) -> Self {
        Block::Line(line)
    }
}

impl From<HeadingBlock> for Block {
    fn from(heading: HeadingBlock) -> Self {
        Block::Heading(heading)
    }
}

// ============================================================================
// Tests
// ============================================================================
