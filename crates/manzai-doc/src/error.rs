//! Error types for document operations.

use thiserror::Error;

use manzai_types::BlockId;

/// Errors that can occur while editing or transferring a script.
///
/// Mutations that target a missing block id are not errors; they are benign
/// no-ops.
#[derive(Error, Debug)]
pub enum DocError {
    /// A replacement block sequence listed the same id twice.
    #[error("block appears more than once: {0:?}")]
    DuplicateBlock(BlockId),

    /// Imported document has no usable `title`.
    #[error("invalid file format: missing title")]
    MissingTitle,

    /// Imported document has no `blocks` array.
    #[error("invalid file format: missing blocks array")]
    MissingBlocks,

    /// One imported block could not be understood.
    #[error("invalid file format: block {index}: {reason}")]
    InvalidBlock { index: usize, reason: String },

    /// Input was not JSON at all.
    #[error("invalid file format: {0}")]
    Json(#[from] serde_json::Error),
}

impl DocError {
    /// Whether this error is a rejected import payload.
    pub fn is_format_error(&self) -> bool {
        !matches!(self, DocError::DuplicateBlock(_))
    }
}
