//! Wizard state for one campaign: the uploaded assets, the copy being edited
//! and the last compliance result. Every operation takes a snapshot of the
//! current inputs; [`CampaignSession::reset`] returns everything to its
//! initial value.

use std::sync::Arc;

use adgen_core::types::{
    AssetSet, BrandColor, CampaignCopy, ComplianceResult, ImageRef, Theme, Tone,
};
use adgen_core::AdGenResult;
use tracing::info;

use crate::orchestrator::{CampaignOrchestrator, CreativeSet};

pub struct CampaignSession {
    orchestrator: Arc<CampaignOrchestrator>,
    assets: AssetSet,
    copy: CampaignCopy,
    compliance: Option<ComplianceResult>,
}

impl CampaignSession {
    pub fn new(orchestrator: Arc<CampaignOrchestrator>) -> Self {
        Self {
            orchestrator,
            assets: AssetSet::default(),
            copy: CampaignCopy::default(),
            compliance: None,
        }
    }

    pub fn orchestrator(&self) -> &CampaignOrchestrator {
        &self.orchestrator
    }

    pub fn assets(&self) -> &AssetSet {
        &self.assets
    }

    pub fn copy(&self) -> &CampaignCopy {
        &self.copy
    }

    pub fn compliance(&self) -> Option<&ComplianceResult> {
        self.compliance.as_ref()
    }

    pub fn upload_product_image(&mut self, image: ImageRef) {
        info!(?image, "product image uploaded");
        self.assets.product_image = Some(image);
    }

    pub fn upload_logo(&mut self, image: ImageRef) {
        info!(?image, "logo uploaded");
        self.assets.logo_image = Some(image);
    }

    /// Rejects anything but a 6-digit hex color; the previous color is kept.
    pub fn set_brand_color(&mut self, hex: &str) -> AdGenResult<()> {
        self.assets.brand_color = hex.parse::<BrandColor>()?;
        Ok(())
    }

    pub fn set_headline(&mut self, headline: impl Into<String>) {
        self.copy.headline = headline.into();
    }

    pub fn set_call_to_action(&mut self, cta: impl Into<String>) {
        self.copy.call_to_action = cta.into();
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.copy.theme = theme;
    }

    pub fn set_tone(&mut self, tone: Tone) {
        self.copy.tone = tone;
    }

    /// Replace the headline with a previously generated suggestion.
    /// Returns false when there is no suggestion at `index`.
    pub fn adopt_headline_suggestion(&mut self, index: usize) -> bool {
        match self.orchestrator.suggestions().headlines.get(index) {
            Some(headline) => {
                self.copy.headline = headline.clone();
                true
            }
            None => false,
        }
    }

    pub async fn generate(&self) -> AdGenResult<CreativeSet> {
        self.orchestrator.generate_all(&self.assets, &self.copy).await
    }

    pub async fn suggest_headlines(&self) -> AdGenResult<Vec<String>> {
        self.orchestrator.suggest_headlines(&self.copy).await
    }

    pub async fn suggest_layouts(&self) -> Vec<String> {
        self.orchestrator.suggest_layouts(&self.copy).await
    }

    pub async fn suggest_backgrounds(&self) -> Vec<String> {
        self.orchestrator.suggest_backgrounds(&self.copy).await
    }

    pub fn run_compliance(&mut self) -> &ComplianceResult {
        let result = self.orchestrator.check_compliance(&self.copy);
        self.compliance.insert(result)
    }

    pub fn reset(&mut self) {
        self.assets = AssetSet::default();
        self.copy = CampaignCopy::default();
        self.compliance = None;
        self.orchestrator.reset();
        info!("campaign session reset");
    }
}
