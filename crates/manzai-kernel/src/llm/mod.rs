//! Text generation capability.
//!
//! The editor consumes one operation, `generate_text(prompt) -> text`. It is
//! never on the document mutation path: a failure is reported to the caller
//! and leaves the script untouched.

mod config;
mod gemini;

pub use config::{DEFAULT_MODEL, ProviderConfig, STANDARD_KEY_ENV};
pub use gemini::GeminiGenerator;

use async_trait::async_trait;

/// Errors from text generation.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// No credential or no provider configured.
    #[error("text generation unavailable: {0}")]
    Unavailable(String),

    /// Transport or provider error.
    #[error("text generation failed: {0}")]
    Failed(String),
}

impl From<reqwest::Error> for GenerationError {
    fn from(e: reqwest::Error) -> Self {
        GenerationError::Failed(e.to_string())
    }
}

pub type GenResult<T> = Result<T, GenerationError>;

/// A single request/response text generator.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Provider name (for logging).
    fn name(&self) -> &str;

    /// Whether a request could be attempted at all.
    fn is_ready(&self) -> bool;

    /// Generate text for `prompt`.
    async fn generate_text(&self, prompt: &str) -> GenResult<String>;
}

impl std::fmt::Debug for dyn TextGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextGenerator")
            .field("name", &self.name())
            .field("ready", &self.is_ready())
            .finish()
    }
}
