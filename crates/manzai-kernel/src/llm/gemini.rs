//! Gemini `generateContent` over plain REST.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use super::{GenResult, GenerationError, ProviderConfig, TextGenerator};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Gemini text generator.
pub struct GeminiGenerator {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiGenerator {
    pub fn new(api_key: Option<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.into(),
            api_key,
        }
    }

    /// Build from config, resolving the API key from config or environment.
    pub fn from_config(config: &ProviderConfig) -> Self {
        let mut generator = Self::new(config.resolve_api_key(), config.model.clone());
        if let Some(url) = &config.base_url {
            generator.base_url = url.clone();
        }
        generator
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    fn name(&self) -> &str {
        "gemini"
    }

    fn is_ready(&self) -> bool {
        self.api_key.is_some()
    }

    async fn generate_text(&self, prompt: &str) -> GenResult<String> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| GenerationError::Unavailable("no API key configured".into()))?;

        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
        });

        tracing::debug!(
            model = %self.model,
            prompt_chars = prompt.chars().count(),
            "gemini request"
        );
        let res = self
            .client
            .post(self.endpoint())
            .query(&[("key", key)])
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        let json: serde_json::Value = res.json().await?;

        extract_text(&json)
    }
}

fn extract_text(json: &serde_json::Value) -> GenResult<String> {
    let parts = json["candidates"][0]["content"]["parts"]
        .as_array()
        .ok_or_else(|| GenerationError::Failed("response has no candidates".into()))?;
    let text: String = parts.iter().filter_map(|p| p["text"].as_str()).collect();
    if text.is_empty() {
        return Err(GenerationError::Failed("response has no text".into()));
    }
    Ok(text)
}
