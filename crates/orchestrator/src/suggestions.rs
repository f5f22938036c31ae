//! AI copy suggestions with a static fallback.
//!
//! Every request either yields lines parsed from the text service or, on any
//! failure at all, the fixed fallback list for that kind. Callers always get
//! a usable list and cannot tell the two apart from the data.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use adgen_core::types::CampaignCopy;
use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum SuggestionServiceError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("suggestion API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("response contained no usable text")]
    EmptyResponse,

    #[error("timed out after {0}ms")]
    Timeout(u128),

    #[error("no suggestion service configured")]
    NotConfigured,
}

/// Free-form text generation: prompt in, text out. No guarantee is made
/// about line count or formatting.
#[async_trait]
pub trait TextSuggestionService: Send + Sync + 'static {
    async fn generate(&self, prompt: &str) -> Result<String, SuggestionServiceError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SuggestionKind {
    Headlines,
    Layouts,
    Backgrounds,
}

impl SuggestionKind {
    /// Maximum number of suggestions kept from a response.
    pub fn limit(&self) -> usize {
        match self {
            Self::Headlines => 3,
            Self::Layouts | Self::Backgrounds => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Headlines => "headlines",
            Self::Layouts => "layouts",
            Self::Backgrounds => "backgrounds",
        }
    }

    pub fn prompt(&self, copy: &CampaignCopy) -> String {
        match self {
            Self::Headlines => format!(
                "Generate 3 alternative ad headlines based on \"{}\".\n\
                 Each under 32 characters.\n\
                 Theme: {}. Tone: {}.\n\
                 Return one per line.",
                copy.headline.trim(),
                copy.theme,
                copy.tone
            ),
            Self::Layouts => format!(
                "Suggest 4 layout compositions for ads.\n\
                 Include logo, product, headline, CTA.\n\
                 Theme: {}.\n\
                 Return list format.",
                copy.theme
            ),
            Self::Backgrounds => format!(
                "Suggest 4 gradient color schemes.\n\
                 Theme: {}. Tone: {}.\n\
                 Return one per line.",
                copy.theme, copy.tone
            ),
        }
    }

    pub fn fallback(&self, copy: &CampaignCopy) -> Vec<String> {
        match self {
            Self::Headlines => {
                let headline = copy.headline.trim();
                vec![
                    format!("{headline} - Limited Time!"),
                    format!("Get Your {headline} Today"),
                    format!("Exclusive: {headline}"),
                ]
            }
            Self::Layouts => to_strings(&[
                "Left Layout: Logo top-left, Product center, Text bottom",
                "Center Layout: Symmetric product center, headline below",
                "Right Layout: Product left, Text stacked right, CTA big",
                "Premium Layout: Gradient background + floating text",
            ]),
            Self::Backgrounds => to_strings(&[
                "Sunset: #FF6B6B → #FFE66D",
                "Ocean: #0891B2 → #06B6D4",
                "Forest: #059669 → #10B981",
                "Purple: #7C3AED → #A78BFA",
            ]),
        }
    }
}

impl fmt::Display for SuggestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Split a free-form response into trimmed, non-empty lines, keeping at most `limit`.
pub fn parse_lines(text: &str, limit: usize) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(limit)
        .map(String::from)
        .collect()
}

/// Runs the two-branch strategy: try the service, else the fallback.
#[derive(Clone)]
pub struct SuggestionEngine {
    service: Option<Arc<dyn TextSuggestionService>>,
    timeout: Duration,
}

impl SuggestionEngine {
    pub fn new(service: Arc<dyn TextSuggestionService>, timeout: Duration) -> Self {
        Self {
            service: Some(service),
            timeout,
        }
    }

    /// No service: every request is served from the fallback lists.
    pub fn offline() -> Self {
        Self {
            service: None,
            timeout: Duration::ZERO,
        }
    }

    pub fn is_online(&self) -> bool {
        self.service.is_some()
    }

    pub async fn suggest(&self, kind: SuggestionKind, copy: &CampaignCopy) -> Vec<String> {
        match self.attempt(kind, copy).await {
            Ok(lines) => {
                info!(%kind, count = lines.len(), "suggestions generated");
                lines
            }
            Err(e) => {
                warn!(%kind, error = %e, "suggestion service failed, using fallback list");
                metrics::counter!("adgen.suggestions.fallback", "kind" => kind.as_str())
                    .increment(1);
                kind.fallback(copy)
            }
        }
    }

    async fn attempt(
        &self,
        kind: SuggestionKind,
        copy: &CampaignCopy,
    ) -> Result<Vec<String>, SuggestionServiceError> {
        let service = self
            .service
            .as_ref()
            .ok_or(SuggestionServiceError::NotConfigured)?;
        let prompt = kind.prompt(copy);

        let text = tokio::time::timeout(self.timeout, service.generate(&prompt))
            .await
            .map_err(|_| SuggestionServiceError::Timeout(self.timeout.as_millis()))??;

        let lines = parse_lines(&text, kind.limit());
        if lines.is_empty() {
            return Err(SuggestionServiceError::EmptyResponse);
        }
        Ok(lines)
    }
}

impl fmt::Debug for SuggestionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuggestionEngine")
            .field("online", &self.is_online())
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    struct Canned(&'static str);

    #[async_trait]
    impl TextSuggestionService for Canned {
        async fn generate(&self, _prompt: &str) -> Result<String, SuggestionServiceError> {
            Ok(self.0.to_string())
        }
    }

    struct Unreachable;

    #[async_trait]
    impl TextSuggestionService for Unreachable {
        async fn generate(&self, _prompt: &str) -> Result<String, SuggestionServiceError> {
            Err(SuggestionServiceError::Api {
                status: 503,
                body: "unavailable".to_string(),
            })
        }
    }

    #[derive(Default)]
    struct Recording(Mutex<Vec<String>>);

    #[async_trait]
    impl TextSuggestionService for Recording {
        async fn generate(&self, prompt: &str) -> Result<String, SuggestionServiceError> {
            self.0.lock().push(prompt.to_string());
            Ok("one".to_string())
        }
    }

    fn engine(service: impl TextSuggestionService) -> SuggestionEngine {
        SuggestionEngine::new(Arc::new(service), Duration::from_secs(1))
    }

    #[tokio::test]
    async fn test_lines_are_trimmed_filtered_and_truncated() {
        let engine = engine(Canned("\n  Big Sale Today \n\nSave More\nDeals Inside\nFourth\n"));
        let copy = CampaignCopy::new("Sale", "");
        let headlines = engine.suggest(SuggestionKind::Headlines, &copy).await;
        assert_eq!(headlines, vec!["Big Sale Today", "Save More", "Deals Inside"]);

        let layouts = engine.suggest(SuggestionKind::Layouts, &copy).await;
        assert_eq!(layouts.len(), 4);
    }

    #[tokio::test]
    async fn test_unreachable_service_uses_headline_fallback() {
        let engine = engine(Unreachable);
        let copy = CampaignCopy::new("Sale", "");
        let headlines = engine.suggest(SuggestionKind::Headlines, &copy).await;
        assert_eq!(
            headlines,
            vec!["Sale - Limited Time!", "Get Your Sale Today", "Exclusive: Sale"]
        );
    }

    #[tokio::test]
    async fn test_blank_response_uses_fallback() {
        let engine = engine(Canned("  \n\n \t\n"));
        let copy = CampaignCopy::default();
        let backgrounds = engine.suggest(SuggestionKind::Backgrounds, &copy).await;
        assert_eq!(backgrounds, SuggestionKind::Backgrounds.fallback(&copy));
        assert_eq!(backgrounds.len(), 4);
        assert!(backgrounds[0].starts_with("Sunset"));
    }

    #[tokio::test]
    async fn test_offline_engine_serves_fallbacks() {
        let engine = SuggestionEngine::offline();
        assert!(!engine.is_online());
        let layouts = engine.suggest(SuggestionKind::Layouts, &CampaignCopy::default()).await;
        assert_eq!(layouts.len(), 4);
        assert!(layouts[3].starts_with("Premium Layout"));
    }

    #[tokio::test]
    async fn test_prompt_carries_copy() {
        let recorder = Arc::new(Recording::default());
        let engine = SuggestionEngine::new(recorder.clone(), Duration::from_secs(1));
        let mut copy = CampaignCopy::new("  Fresh Coffee ", "");
        copy.tone = adgen_core::types::Tone::Playful;
        engine.suggest(SuggestionKind::Headlines, &copy).await;

        let prompts = recorder.0.lock();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("\"Fresh Coffee\""));
        assert!(prompts[0].contains("Tone: Playful"));
    }

    #[test]
    fn test_parse_lines_limit() {
        assert_eq!(parse_lines("a\nb\nc", 2), vec!["a", "b"]);
        assert!(parse_lines("", 3).is_empty());
        assert_eq!(parse_lines("a\r\nb\r\n", 4), vec!["a", "b"]);
    }
}
