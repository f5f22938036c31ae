use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use adgen_composer::CreativeComposer;
use adgen_core::config::AppConfig;
use adgen_core::types::{
    AssetSet, CampaignCopy, ComplianceResult, FormatName, FormatSpec, RenderedCreative,
    SuggestionBundle,
};
use adgen_core::{AdGenError, AdGenResult};
use anyhow::anyhow;
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::compliance;
use crate::export;
use crate::gemini::GeminiClient;
use crate::suggestions::{SuggestionEngine, SuggestionKind};

/// Rendered creatives keyed by format, in format order.
pub type CreativeSet = BTreeMap<FormatName, RenderedCreative>;

/// Coordinates the per-format renders of a campaign and holds their results.
///
/// The stored creative set is only ever replaced whole: a generation either
/// renders every format or leaves the previous set untouched. When
/// generations overlap, the most recently requested one that succeeds wins.
pub struct CampaignOrchestrator {
    composer: Arc<CreativeComposer>,
    suggestions: SuggestionEngine,
    requested: AtomicU64,
    creatives: RwLock<StoredCreatives>,
    bundle: RwLock<SuggestionBundle>,
}

#[derive(Default)]
struct StoredCreatives {
    /// Request number of the generation that produced `set`.
    generation: u64,
    set: CreativeSet,
}

impl CampaignOrchestrator {
    pub fn new(composer: CreativeComposer, suggestions: SuggestionEngine) -> Self {
        Self {
            composer: Arc::new(composer),
            suggestions,
            requested: AtomicU64::new(0),
            creatives: RwLock::new(StoredCreatives::default()),
            bundle: RwLock::new(SuggestionBundle::default()),
        }
    }

    /// Composer from the render section; Gemini suggestions when a key is set.
    pub fn from_config(config: &AppConfig) -> Self {
        let composer = CreativeComposer::from_config(&config.render);
        let suggestions = match GeminiClient::from_config(&config.suggestions) {
            Some(client) => SuggestionEngine::new(
                Arc::new(client),
                Duration::from_millis(config.suggestions.timeout_ms),
            ),
            None => {
                info!("no suggestion service configured, fallback lists only");
                SuggestionEngine::offline()
            }
        };
        Self::new(composer, suggestions)
    }

    /// Render every format concurrently.
    ///
    /// Requires a product image, a logo and a non-empty headline. If any
    /// render fails the remaining renders are aborted, nothing is stored and
    /// the originating error is returned. A successful result is not stored
    /// if a later-requested generation has already been stored.
    pub async fn generate_all(
        &self,
        assets: &AssetSet,
        copy: &CampaignCopy,
    ) -> AdGenResult<CreativeSet> {
        validate_inputs(assets, copy)?;
        let generation = self.requested.fetch_add(1, Ordering::SeqCst) + 1;
        let start = Instant::now();

        let assets = Arc::new(assets.clone());
        let copy = Arc::new(copy.clone());
        let mut pending = FormatSpec::ALL
            .iter()
            .map(|&format| {
                let composer = Arc::clone(&self.composer);
                let assets = Arc::clone(&assets);
                let copy = Arc::clone(&copy);
                let handle =
                    tokio::spawn(async move { composer.compose(&assets, &copy, format).await });
                (format, handle)
            })
            .collect::<Vec<_>>()
            .into_iter();

        let mut rendered = CreativeSet::new();
        while let Some((format, handle)) = pending.next() {
            let outcome = handle
                .await
                .map_err(|e| {
                    AdGenError::Internal(anyhow!("render task for {} failed: {e}", format.name))
                })
                .and_then(|result| result);

            match outcome {
                Ok(creative) => {
                    rendered.insert(format.name, creative);
                }
                Err(e) => {
                    for (_, handle) in pending {
                        handle.abort();
                    }
                    metrics::counter!("adgen.generations.failed").increment(1);
                    warn!(format = %format.name, error = %e, "generation failed, discarding partial output");
                    return Err(e);
                }
            }
        }

        {
            let mut stored = self.creatives.write();
            if generation <= stored.generation {
                debug!(
                    generation,
                    stored = stored.generation,
                    "newer generation already stored, not storing"
                );
                return Ok(rendered);
            }
            *stored = StoredCreatives {
                generation,
                set: rendered.clone(),
            };
        }
        info!(
            generation,
            formats = rendered.len(),
            latency_ms = start.elapsed().as_millis() as u64,
            "all creatives generated"
        );
        Ok(rendered)
    }

    pub fn creative(&self, format: FormatName) -> Option<RenderedCreative> {
        self.creatives.read().set.get(&format).cloned()
    }

    pub fn creatives(&self) -> CreativeSet {
        self.creatives.read().set.clone()
    }

    /// Requires a base headline to riff on.
    pub async fn suggest_headlines(&self, copy: &CampaignCopy) -> AdGenResult<Vec<String>> {
        if copy.headline.is_empty() {
            return Err(AdGenError::missing("a base headline is required for headline suggestions"));
        }
        let headlines = self.suggestions.suggest(SuggestionKind::Headlines, copy).await;
        self.bundle.write().headlines = headlines.clone();
        Ok(headlines)
    }

    pub async fn suggest_layouts(&self, copy: &CampaignCopy) -> Vec<String> {
        let layouts = self.suggestions.suggest(SuggestionKind::Layouts, copy).await;
        self.bundle.write().layouts = layouts.clone();
        layouts
    }

    pub async fn suggest_backgrounds(&self, copy: &CampaignCopy) -> Vec<String> {
        let backgrounds = self.suggestions.suggest(SuggestionKind::Backgrounds, copy).await;
        self.bundle.write().backgrounds = backgrounds.clone();
        backgrounds
    }

    pub fn suggestions(&self) -> SuggestionBundle {
        self.bundle.read().clone()
    }

    pub fn check_compliance(&self, copy: &CampaignCopy) -> ComplianceResult {
        compliance::check_compliance(copy)
    }

    /// Write every stored creative into `dir`.
    pub async fn export_all(&self, dir: &Path) -> AdGenResult<Vec<PathBuf>> {
        let creatives = self.creatives();
        if creatives.is_empty() {
            return Err(AdGenError::missing("no creatives have been generated yet"));
        }
        export::write_all(dir, creatives.values()).await
    }

    /// Clears stored creatives and suggestions. Generations still in flight
    /// are not stored when they finish.
    pub fn reset(&self) {
        {
            let mut stored = self.creatives.write();
            stored.generation = self.requested.load(Ordering::SeqCst);
            stored.set.clear();
        }
        *self.bundle.write() = SuggestionBundle::default();
    }
}

fn validate_inputs(assets: &AssetSet, copy: &CampaignCopy) -> AdGenResult<()> {
    if assets.product_image.is_none() {
        return Err(AdGenError::missing("product image"));
    }
    if assets.logo_image.is_none() {
        return Err(AdGenError::missing("logo"));
    }
    if copy.headline.is_empty() {
        return Err(AdGenError::missing("headline"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use adgen_composer::{DecodeError, DecodedImage, FontFace, ImageCrateDecoder, ImageDecodeService};
    use adgen_core::types::ImageRef;
    use async_trait::async_trait;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png(color: [u8; 4]) -> ImageRef {
        let img = RgbaImage::from_pixel(16, 12, Rgba(color));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        ImageRef::from(out.into_inner())
    }

    fn orchestrator() -> CampaignOrchestrator {
        let composer =
            CreativeComposer::new(Arc::new(ImageCrateDecoder::new()), FontFace::builtin());
        CampaignOrchestrator::new(composer, SuggestionEngine::offline())
    }

    fn assets() -> AssetSet {
        AssetSet {
            product_image: Some(png([220, 40, 40, 255])),
            logo_image: Some(png([40, 40, 220, 255])),
            ..AssetSet::default()
        }
    }

    #[test]
    fn test_validate_inputs_reports_first_missing_field() {
        let copy = CampaignCopy::new("Sale", "");
        let err = validate_inputs(&AssetSet::default(), &copy).unwrap_err();
        assert!(matches!(err, AdGenError::MissingInput(ref what) if what == "product image"));

        let no_logo = AssetSet {
            logo_image: None,
            ..assets()
        };
        let err = validate_inputs(&no_logo, &copy).unwrap_err();
        assert!(matches!(err, AdGenError::MissingInput(ref what) if what == "logo"));

        let err = validate_inputs(&assets(), &CampaignCopy::new("", "x")).unwrap_err();
        assert!(matches!(err, AdGenError::MissingInput(ref what) if what == "headline"));
    }

    #[test]
    fn test_whitespace_headline_counts_as_present() {
        assert!(validate_inputs(&assets(), &CampaignCopy::new(" ", "")).is_ok());
    }

    #[tokio::test]
    async fn test_generate_all_stores_every_format() {
        let orchestrator = orchestrator();
        let set = orchestrator
            .generate_all(&assets(), &CampaignCopy::new("Sale", "Shop"))
            .await
            .unwrap();
        assert_eq!(
            set.keys().copied().collect::<Vec<_>>(),
            vec![FormatName::Facebook, FormatName::Instagram, FormatName::Display]
        );
        let stored = orchestrator.creative(FormatName::Instagram).unwrap();
        assert_eq!((stored.width, stored.height), (1080, 1920));
        assert_eq!(stored.sha256, set[&FormatName::Instagram].sha256);
    }

    /// Delays decoding of one particular image, then decodes normally.
    struct SlowDecoder {
        slow: ImageRef,
        inner: ImageCrateDecoder,
    }

    #[async_trait]
    impl ImageDecodeService for SlowDecoder {
        async fn decode(&self, reference: &ImageRef) -> Result<DecodedImage, DecodeError> {
            if *reference == self.slow {
                tokio::time::sleep(Duration::from_millis(300)).await;
            }
            self.inner.decode(reference).await
        }
    }

    #[tokio::test]
    async fn test_newer_generation_wins_over_slower_older_one() {
        let slow = png([10, 10, 10, 255]);
        let decoder = SlowDecoder {
            slow: slow.clone(),
            inner: ImageCrateDecoder::new(),
        };
        let orchestrator = CampaignOrchestrator::new(
            CreativeComposer::new(Arc::new(decoder), FontFace::builtin()),
            SuggestionEngine::offline(),
        );
        let older = AssetSet {
            product_image: Some(slow),
            ..assets()
        };
        let copy = CampaignCopy::new("Sale", "Shop");

        let (older_set, newer_set) = tokio::join!(orchestrator.generate_all(&older, &copy), async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            orchestrator.generate_all(&assets(), &copy).await
        });
        let older_set = older_set.unwrap();
        let newer_set = newer_set.unwrap();

        let stored = orchestrator.creative(FormatName::Facebook).unwrap();
        assert_eq!(stored.sha256, newer_set[&FormatName::Facebook].sha256);
        assert_ne!(stored.sha256, older_set[&FormatName::Facebook].sha256);
    }

    #[tokio::test]
    async fn test_reset_discards_generation_in_flight() {
        let slow = png([10, 10, 10, 255]);
        let decoder = SlowDecoder {
            slow: slow.clone(),
            inner: ImageCrateDecoder::new(),
        };
        let orchestrator = CampaignOrchestrator::new(
            CreativeComposer::new(Arc::new(decoder), FontFace::builtin()),
            SuggestionEngine::offline(),
        );
        let assets = AssetSet {
            product_image: Some(slow),
            ..assets()
        };
        let copy = CampaignCopy::new("Sale", "");

        let (result, ()) = tokio::join!(orchestrator.generate_all(&assets, &copy), async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            orchestrator.reset();
        });
        assert!(result.is_ok());
        assert!(orchestrator.creatives().is_empty());
    }

    #[tokio::test]
    async fn test_suggestions_replace_bundle_lists() {
        let orchestrator = orchestrator();
        let copy = CampaignCopy::new("Sale", "");
        orchestrator.suggest_headlines(&copy).await.unwrap();
        orchestrator.suggest_layouts(&copy).await;

        let bundle = orchestrator.suggestions();
        assert_eq!(bundle.headlines.len(), 3);
        assert_eq!(bundle.layouts.len(), 4);
        assert!(bundle.backgrounds.is_empty());

        let renamed = CampaignCopy::new("Coffee", "");
        orchestrator.suggest_headlines(&renamed).await.unwrap();
        assert_eq!(orchestrator.suggestions().headlines[2], "Exclusive: Coffee");

        orchestrator.reset();
        assert_eq!(orchestrator.suggestions(), SuggestionBundle::default());
    }

    #[tokio::test]
    async fn test_headline_suggestions_need_a_headline() {
        let err = orchestrator()
            .suggest_headlines(&CampaignCopy::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AdGenError::MissingInput(_)));
    }

    #[tokio::test]
    async fn test_export_requires_generated_creatives() {
        let tmp = tempfile::tempdir().unwrap();
        let err = orchestrator().export_all(tmp.path()).await.unwrap_err();
        assert!(matches!(err, AdGenError::MissingInput(_)));
    }
}
