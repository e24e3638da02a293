//! One editing session: the document, its autosaver, and the generator.
//!
//! Every state change (mutation, undo/redo, replace) forwards the now-current
//! script to the autosaver. Mutations never wait on storage.

use std::sync::Arc;

use manzai_doc::{DocError, PacingReport, ScriptDocument, analyze};
use manzai_types::{Block, BlockId, Role, Script};

use crate::autosave::Autosaver;
use crate::config::EditorConfig;
use crate::llm::{GenResult, GenerationError, TextGenerator};
use crate::store::{KvStore, StoreResult, load_script};

pub struct EditorSession {
    doc: ScriptDocument,
    autosaver: Autosaver,
    generator: Option<Arc<dyn TextGenerator>>,
}

impl EditorSession {
    /// Load the saved script (or start a new one) and spawn the autosaver.
    ///
    /// Must be called inside a tokio runtime.
    pub fn open(
        store: Arc<dyn KvStore>,
        config: &EditorConfig,
        generator: Option<Arc<dyn TextGenerator>>,
    ) -> StoreResult<Self> {
        let loaded = load_script(store.as_ref(), &config.storage_key)?;
        let fresh = loaded.is_none();
        let script = loaded.unwrap_or_default();

        let autosaver = Autosaver::spawn(
            store,
            config.storage_key.clone(),
            config.autosave_debounce(),
        );
        if fresh {
            tracing::info!(script_id = %script.id, "no saved script, starting a new one");
            autosaver.schedule(script.clone());
        }

        Ok(Self {
            doc: ScriptDocument::new(script),
            autosaver,
            generator,
        })
    }

    pub fn script(&self) -> &Script {
        self.doc.script()
    }

    pub fn document(&self) -> &ScriptDocument {
        &self.doc
    }

    /// Id of the block at zero-based `index`.
    pub fn block_id_at(&self, index: usize) -> Option<BlockId> {
        self.script().blocks.get(index).map(Block::id)
    }

    pub fn can_undo(&self) -> bool {
        self.doc.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.doc.can_redo()
    }

    pub fn undo_label(&self) -> Option<&'static str> {
        self.doc.history().undo_label()
    }

    pub fn redo_label(&self) -> Option<&'static str> {
        self.doc.history().redo_label()
    }

    pub fn next_role(&self) -> Role {
        self.doc.next_role()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    pub fn add_line(&mut self) -> BlockId {
        let id = self.doc.add_line();
        self.changed();
        id
    }

    pub fn add_heading(&mut self) -> BlockId {
        let id = self.doc.add_heading();
        self.changed();
        id
    }

    pub fn update_block(&mut self, id: BlockId, content: impl Into<String>) {
        self.doc.update_block(id, content);
        self.changed();
    }

    pub fn delete_block(&mut self, id: BlockId) {
        self.doc.delete_block(id);
        self.changed();
    }

    pub fn toggle_role(&mut self, id: BlockId) {
        self.doc.toggle_role(id);
        self.changed();
    }

    pub fn reorder(&mut self, blocks: Vec<Block>) -> Result<(), DocError> {
        self.doc.reorder(blocks)?;
        self.changed();
        Ok(())
    }

    /// Move one block. Returns false (and changes nothing) when out of range.
    pub fn move_block(&mut self, from: usize, to: usize) -> bool {
        let moved = self.doc.move_block(from, to);
        if moved {
            self.changed();
        }
        moved
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.doc.set_title(title);
        self.changed();
    }

    pub fn format(&mut self) {
        self.doc.format();
        self.changed();
    }

    /// Discard the current script and start an empty one.
    pub fn new_script(&mut self) {
        self.replace(Script::new());
    }

    /// Replace the current script with one parsed from an export file.
    ///
    /// On error nothing changes.
    pub fn import_json(&mut self, text: &str) -> Result<(), DocError> {
        let script = manzai_doc::import_json(text)?;
        self.replace(script);
        Ok(())
    }

    pub fn export_json(&self) -> Result<String, DocError> {
        manzai_doc::export_json(self.script())
    }

    fn replace(&mut self, script: Script) {
        self.doc.replace(script);
        self.changed();
    }

    // =========================================================================
    // History
    // =========================================================================

    pub fn undo(&mut self) -> Option<&Script> {
        self.doc.undo()?;
        self.changed();
        Some(self.doc.script())
    }

    pub fn redo(&mut self) -> Option<&Script> {
        self.doc.redo()?;
        self.changed();
        Some(self.doc.script())
    }

    // =========================================================================
    // Derived views
    // =========================================================================

    pub fn pacing(&self) -> PacingReport {
        analyze(&self.script().blocks)
    }

    pub fn transcript(&self) -> String {
        manzai_doc::transcript(self.script())
    }

    // =========================================================================
    // Text generation
    // =========================================================================

    pub fn generator_ready(&self) -> bool {
        self.generator.as_ref().is_some_and(|g| g.is_ready())
    }

    /// Ask the generator for text. Never touches the document.
    pub async fn generate_text(&self, prompt: &str) -> GenResult<String> {
        let generator = self
            .generator
            .as_ref()
            .ok_or_else(|| GenerationError::Unavailable("no generator configured".into()))?;
        if !generator.is_ready() {
            return Err(GenerationError::Unavailable(format!(
                "{} has no API key",
                generator.name()
            )));
        }
        generator.generate_text(prompt).await.inspect_err(|e| {
            tracing::warn!(generator = generator.name(), error = %e, "text generation failed");
        })
    }

    /// [`generate_text`](Self::generate_text) with the current script as context.
    pub async fn assist(&self, request: &str) -> GenResult<String> {
        let prompt = format!("{}\n---\n{}", self.transcript(), request);
        self.generate_text(&prompt).await
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Write any pending autosave now.
    pub async fn flush(&self) {
        self.autosaver.flush().await;
    }

    /// Flush and stop the autosaver.
    pub async fn shutdown(self) {
        self.autosaver.shutdown().await;
    }

    fn changed(&self) {
        self.autosaver.schedule(self.doc.script().clone());
    }
}
