use serde::Deserialize;

/// Root application configuration. Loaded from environment variables
/// with the prefix `ADGEN__`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub suggestions: SuggestionConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

// ─── Render Config ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    /// TrueType/OpenType font used for headline and CTA text. The built-in
    /// bitmap font is used when unset.
    #[serde(default)]
    pub font_path: Option<String>,
    #[serde(default = "default_decode_timeout_ms")]
    pub decode_timeout_ms: u64,
}

fn default_decode_timeout_ms() -> u64 { 5000 }

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            font_path: None,
            decode_timeout_ms: default_decode_timeout_ms(),
        }
    }
}

// ─── Suggestion Config ──────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct SuggestionConfig {
    #[serde(default = "default_suggestions_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_suggestion_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_suggestions_enabled() -> bool { true }
fn default_model() -> String { "gemini-pro".to_string() }
fn default_base_url() -> String { "https://generativelanguage.googleapis.com".to_string() }
fn default_suggestion_timeout_ms() -> u64 { 10_000 }

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            enabled: default_suggestions_enabled(),
            api_key: None,
            model: default_model(),
            base_url: default_base_url(),
            timeout_ms: default_suggestion_timeout_ms(),
        }
    }
}

// ─── Export Config ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

fn default_output_dir() -> String { "./creatives".to_string() }

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("ADGEN")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// The text suggestion service is only reachable with a key.
    pub fn suggestions_configured(&self) -> bool {
        self.suggestions.enabled
            && self
                .suggestions
                .api_key
                .as_deref()
                .is_some_and(|key| !key.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.render.decode_timeout_ms, 5000);
        assert!(config.render.font_path.is_none());
        assert_eq!(config.suggestions.model, "gemini-pro");
        assert_eq!(config.export.output_dir, "./creatives");
        assert!(!config.suggestions_configured());
    }

    #[test]
    fn test_empty_sections_deserialize_to_defaults() {
        let config: AppConfig = serde_json::from_str(r#"{"render": {}, "suggestions": {"api_key": "k"}}"#)
            .unwrap();
        assert_eq!(config.render.decode_timeout_ms, 5000);
        assert_eq!(config.suggestions.timeout_ms, 10_000);
        assert!(config.suggestions_configured());
    }

    #[test]
    fn test_blank_api_key_is_not_configured() {
        let mut config = AppConfig::default();
        config.suggestions.api_key = Some("   ".to_string());
        assert!(!config.suggestions_configured());
    }
}
