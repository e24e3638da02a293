//! # manzai-kernel
//!
//! The editing session around a [`ScriptDocument`](manzai_doc::ScriptDocument):
//! durable key-value storage, debounced autosave, config loading, and the
//! text generation capability.
//!
//! ```text
//!  EditorSession ──mutation──▶ ScriptDocument (history)
//!        │
//!        └─schedule(script)──▶ Autosaver ──after quiet period──▶ KvStore
//! ```

pub mod autosave;
pub mod config;
pub mod llm;
pub mod session;
pub mod store;

pub use autosave::{Autosaver, DEFAULT_DEBOUNCE};
pub use config::{ConfigError, EditorConfig};
pub use llm::{GenResult, GeminiGenerator, GenerationError, ProviderConfig, TextGenerator};
pub use session::EditorSession;
pub use store::{
    KvStore, MemoryStore, STORAGE_KEY, SqliteStore, StoreError, StoreResult, load_script,
    save_script,
};
