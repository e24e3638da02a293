//! Block and script types for the manzai script editor.
//!
//! This is the leaf crate: typed IDs, the two block variants, and the script
//! container. It has **no internal manzai dependencies**.
//!
//! # Key Types
//!
//! |-------------------|----------------------------------------------|
//! | Type              | Purpose                                      |
//! |-------------------|----------------------------------------------|
//! | [`Script`]        | Title + ordered blocks + timestamps          |
//! | [`ScriptUpdate`]  | Partial change applied via [`Script::apply`] |
//! | [`Block`]         | Line or heading (closed sum type)            |
//! | [`Role`]          | Boke or tsukkomi                             |
//! | [`ScriptId`]      | Which script                                 |
//! | [`BlockId`]       | Which block (stable across moves and edits)  |
//! |-------------------|----------------------------------------------|

pub mod block;
pub mod ids;
pub mod script;

// Re-export primary types at crate root for convenience.
pub use block::{Block, BlockKind, HeadingBlock, LineBlock, Role};
pub use ids::{BlockId, ScriptId};
pub use script::{DEFAULT_TITLE, Script, ScriptUpdate};

/// Current time as Unix milliseconds. Used by constructors throughout the crate.
pub(crate) fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
