//! Text generation provider configuration.

use serde::{Deserialize, Serialize};

/// Model used when the config doesn't name one.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Environment variable consulted when no key is configured.
pub const STANDARD_KEY_ENV: &str = "GEMINI_API_KEY";

/// Configuration for the Gemini provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API key, inline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Environment variable name for the API key (alternative to inline key).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_env: None,
            model: default_model(),
            base_url: None,
        }
    }
}

impl ProviderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_api_key_env(mut self, env_var: impl Into<String>) -> Self {
        self.api_key_env = Some(env_var.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Resolve the API key from config or environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.resolve_api_key_with(|name| std::env::var(name).ok())
    }

    fn resolve_api_key_with(&self, env: impl Fn(&str) -> Option<String>) -> Option<String> {
        // Direct key takes precedence
        if let Some(key) = self.api_key.as_ref().filter(|k| !k.trim().is_empty()) {
            return Some(key.clone());
        }
        if let Some(var) = &self.api_key_env {
            return env(var).filter(|k| !k.trim().is_empty());
        }
        env(STANDARD_KEY_ENV).filter(|k| !k.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_with(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |name| {
            pairs
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn test_inline_key_wins() {
        let config = ProviderConfig::new().with_api_key("inline").with_api_key_env("MY_KEY");
        let env = env_with(&[("MY_KEY", "from-env"), (STANDARD_KEY_ENV, "standard")]);
        assert_eq!(config.resolve_api_key_with(env).as_deref(), Some("inline"));
    }

    #[test]
    fn test_named_env_var_before_standard() {
        let config = ProviderConfig::new().with_api_key_env("MY_KEY");
        let env = env_with(&[("MY_KEY", "from-env"), (STANDARD_KEY_ENV, "standard")]);
        assert_eq!(config.resolve_api_key_with(env).as_deref(), Some("from-env"));
    }

    #[test]
    fn test_named_env_var_missing_does_not_fall_through() {
        let config = ProviderConfig::new().with_api_key_env("MY_KEY");
        let env = env_with(&[(STANDARD_KEY_ENV, "standard")]);
        assert_eq!(config.resolve_api_key_with(env), None);
    }

    #[test]
    fn test_standard_env_var_last() {
        let env = env_with(&[(STANDARD_KEY_ENV, "standard")]);
        assert_eq!(
            ProviderConfig::new().resolve_api_key_with(env).as_deref(),
            Some("standard")
        );
    }

    #[test]
    fn test_blank_keys_count_as_missing() {
        let config = ProviderConfig::new().with_api_key("  ");
        assert_eq!(config.resolve_api_key_with(env_with(&[])), None);
    }

    #[test]
    fn test_model_defaults_when_omitted() {
        let config: ProviderConfig = ron::from_str("(api_key: Some(\"k\"))").unwrap();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.api_key.as_deref(), Some("k"));
    }
}
