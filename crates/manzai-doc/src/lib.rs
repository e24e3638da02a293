//! Script document model for the manzai editor.
//!
//! A [`ScriptDocument`] wraps a [`Script`](manzai_types::Script) in a linear
//! snapshot [`History`]. Every edit is a whole-script replacement recorded as
//! one history entry; undo and redo move a cursor.
//!
//! # Modules
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`document`] | `ScriptDocument` mutations and role alternation |
//! | [`history`] | `History` cursor, truncation on record |
//! | [`pacing`] | Role balance, line lengths, phrases, tempo rhythm |
//! | [`transfer`] | JSON export/import with validation |
//! | [`transcript`] | Plain-text rendering |

pub mod document;
pub mod error;
pub mod history;
pub mod pacing;
pub mod transcript;
pub mod transfer;

pub use document::ScriptDocument;
pub use error::DocError;
pub use history::{History, HistoryEntry};
pub use pacing::{
    LineLength, PacingReport, PhraseCount, RhythmPoint, RoleBalance, TempoBand, analyze,
};
pub use transcript::transcript;
pub use transfer::{export_file_name, export_json, import_json};

/// Result type for document operations.
pub type Result<T> = std::result::Result<T, DocError>;
