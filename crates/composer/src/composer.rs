use std::sync::Arc;
use std::time::{Duration, Instant};

use adgen_core::config::RenderConfig;
use adgen_core::types::{AssetKind, AssetSet, CampaignCopy, FormatSpec, ImageRef, RenderedCreative};
use adgen_core::{AdGenError, AdGenResult};
use anyhow::anyhow;
use image::Rgba;
use tracing::{debug, info};

use crate::canvas::Canvas;
use crate::decode::{DecodedImage, ImageCrateDecoder, ImageDecodeService};
use crate::layout::{Layout, LayoutSpec, TextAnchor, CTA_COLOR, HEADLINE_COLOR};
use crate::text::FontFace;

const WHITE: Rgba<u8> = Rgba([0xff, 0xff, 0xff, 0xff]);

/// Composes one creative per call. Output depends only on the explicit
/// inputs, so equal inputs give byte-identical PNGs.
#[derive(Clone)]
pub struct CreativeComposer {
    decoder: Arc<dyn ImageDecodeService>,
    font: Arc<FontFace>,
    layout: LayoutSpec,
    decode_timeout: Duration,
}

impl CreativeComposer {
    pub fn new(decoder: Arc<dyn ImageDecodeService>, font: FontFace) -> Self {
        Self {
            decoder,
            font: Arc::new(font),
            layout: LayoutSpec::STANDARD,
            decode_timeout: Duration::from_millis(RenderConfig::default().decode_timeout_ms),
        }
    }

    pub fn from_config(config: &RenderConfig) -> Self {
        let font = FontFace::load(config.font_path.as_deref().map(std::path::Path::new));
        Self::new(Arc::new(ImageCrateDecoder::new()), font)
            .with_decode_timeout(Duration::from_millis(config.decode_timeout_ms))
    }

    pub fn with_layout(mut self, layout: LayoutSpec) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_decode_timeout(mut self, timeout: Duration) -> Self {
        self.decode_timeout = timeout;
        self
    }

    /// Render `copy` and `assets` into a `format.width × format.height` PNG.
    ///
    /// Product and logo decode concurrently; drawing starts only once every
    /// present asset has decoded. Draw order is fixed: gradient, product,
    /// logo, headline, CTA. Absent assets are skipped; a present asset that
    /// fails to decode (or times out) fails the render.
    pub async fn compose(
        &self,
        assets: &AssetSet,
        copy: &CampaignCopy,
        format: FormatSpec,
    ) -> AdGenResult<RenderedCreative> {
        let start = Instant::now();

        let (product, logo) = tokio::join!(
            self.decode_optional(AssetKind::ProductImage, assets.product_image.as_ref()),
            self.decode_optional(AssetKind::Logo, assets.logo_image.as_ref()),
        );
        let job = RenderJob {
            layout: self.layout.resolve(&format),
            format,
            brand: assets.brand_color.rgb(),
            product: product?,
            logo: logo?,
            headline: copy.headline.clone(),
            call_to_action: copy.call_to_action.clone(),
            font: Arc::clone(&self.font),
        };

        let png = tokio::task::spawn_blocking(move || job.render())
            .await
            .map_err(|e| AdGenError::Internal(anyhow!("render task failed: {e}")))??;

        let latency_us = start.elapsed().as_micros() as u64;
        metrics::counter!("adgen.renders", "format" => format.name.as_str()).increment(1);
        metrics::histogram!("adgen.render.latency_us").record(latency_us as f64);

        let creative = RenderedCreative::new(format, png);
        info!(
            format = %format.name,
            width = format.width,
            height = format.height,
            bytes = creative.png.len(),
            latency_us,
            "creative composed"
        );
        Ok(creative)
    }

    async fn decode_optional(
        &self,
        asset: AssetKind,
        reference: Option<&ImageRef>,
    ) -> AdGenResult<Option<DecodedImage>> {
        let Some(reference) = reference else {
            debug!(%asset, "asset absent, skipping");
            return Ok(None);
        };

        match tokio::time::timeout(self.decode_timeout, self.decoder.decode(reference)).await {
            Ok(Ok(decoded)) => Ok(Some(decoded)),
            Ok(Err(e)) => Err(AdGenError::decode(asset, e)),
            Err(_) => Err(AdGenError::decode(
                asset,
                format!("timed out after {}ms", self.decode_timeout.as_millis()),
            )),
        }
    }
}

impl std::fmt::Debug for CreativeComposer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreativeComposer")
            .field("font", &self.font)
            .field("layout", &self.layout)
            .field("decode_timeout", &self.decode_timeout)
            .finish_non_exhaustive()
    }
}

/// Everything one render needs, owned so it can move to the blocking pool.
struct RenderJob {
    format: FormatSpec,
    layout: Layout,
    brand: [u8; 3],
    product: Option<DecodedImage>,
    logo: Option<DecodedImage>,
    headline: String,
    call_to_action: String,
    font: Arc<FontFace>,
}

impl RenderJob {
    fn render(self) -> AdGenResult<Vec<u8>> {
        let mut canvas = Canvas::new(self.format.width, self.format.height);
        let [r, g, b] = self.brand;
        canvas.fill_linear_gradient(Rgba([r, g, b, 0xff]), WHITE);

        if let Some(product) = &self.product {
            let rect = self.layout.product_rect(product.width, product.height);
            debug!(format = %self.format.name, ?rect, "placing product image");
            canvas.draw_image(&product.pixels, rect);
        }

        if let Some(logo) = &self.logo {
            let rect = self.layout.logo_rect(logo.width, logo.height);
            debug!(format = %self.format.name, ?rect, "placing logo");
            canvas.draw_image(&logo.pixels, rect);
        }

        let width = self.format.width;
        let headline = fit_to_width(&self.font, &self.headline, self.layout.headline(), width);
        canvas.draw_text(&self.font, &self.headline, headline, HEADLINE_COLOR, true);

        if !self.call_to_action.is_empty() {
            let cta = fit_to_width(&self.font, &self.call_to_action, self.layout.cta(), width);
            canvas.draw_text(&self.font, &self.call_to_action, cta, CTA_COLOR, true);
        }

        canvas
            .encode_png()
            .map_err(|e| AdGenError::Encode(e.to_string()))
    }
}

/// Shrink `anchor`'s size so bold `text` ends at least `anchor.x` short of
/// the right edge, mirroring the left margin. Text that fits is untouched.
fn fit_to_width(
    font: &FontFace,
    text: &str,
    anchor: TextAnchor,
    canvas_width: u32,
) -> TextAnchor {
    let available = canvas_width as f32 - 2.0 * anchor.x as f32;
    let overstrike = (anchor.px / 24.0).round().max(1.0);
    let needed = font.measure(text, anchor.px) + overstrike;
    if available <= 0.0 || needed <= available {
        return anchor;
    }
    let px = anchor.px * available / needed;
    debug!(text_px = anchor.px, fitted_px = px, "shrinking text to fit canvas width");
    TextAnchor { px, ..anchor }
}
