//! AdGen: renders a campaign's Facebook, Instagram and display creatives
//! from a packshot, a logo and a line of copy.
//!
//! Command-line driver standing in for the wizard UI: collects the inputs,
//! optionally asks for AI suggestions, generates and exports every format,
//! and prints a JSON summary on stdout.

use std::path::PathBuf;
use std::sync::Arc;

use adgen_core::config::AppConfig;
use adgen_core::types::{ComplianceResult, FormatName, ImageRef, SuggestionBundle, Theme, Tone};
use adgen_orchestrator::{CampaignOrchestrator, CampaignSession};
use clap::Parser;
use serde::Serialize;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "adgen")]
#[command(about = "Render Facebook, Instagram and display ad creatives from a packshot, logo and copy")]
#[command(version)]
struct Cli {
    /// Product image (packshot): a file path or a data: URL
    #[arg(long)]
    product: String,

    /// Brand logo: a file path or a data: URL
    #[arg(long)]
    logo: String,

    /// Headline copy (32 characters or fewer to pass compliance)
    #[arg(long)]
    headline: String,

    /// Call to action (18 characters or fewer to pass compliance)
    #[arg(long, default_value = "")]
    cta: String,

    /// Brand color as 6-digit hex
    #[arg(long, default_value = "#21808d")]
    brand_color: String,

    #[arg(long, default_value = "clean")]
    theme: String,

    #[arg(long, default_value = "professional")]
    tone: String,

    /// Output directory (overrides config)
    #[arg(long, env = "ADGEN__EXPORT__OUTPUT_DIR")]
    out_dir: Option<PathBuf>,

    /// Font file for headline and CTA text (overrides config)
    #[arg(long, env = "ADGEN__RENDER__FONT_PATH")]
    font: Option<String>,

    /// Also request headline, layout and background suggestions
    #[arg(long, default_value_t = false)]
    suggest: bool,
}

#[derive(Serialize)]
struct ExportedCreative {
    format: FormatName,
    width: u32,
    height: u32,
    sha256: String,
    path: PathBuf,
}

#[derive(Serialize)]
struct Summary {
    creatives: Vec<ExportedCreative>,
    compliance: ComplianceResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    suggestions: Option<SuggestionBundle>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "adgen=info,adgen_composer=info,adgen_orchestrator=info".into()),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });
    if let Some(dir) = &cli.out_dir {
        config.export.output_dir = dir.display().to_string();
    }
    if let Some(font) = cli.font.clone() {
        config.render.font_path = Some(font);
    }

    info!(
        output_dir = %config.export.output_dir,
        font = config.render.font_path.as_deref().unwrap_or("built-in"),
        suggestions = config.suggestions_configured(),
        "Configuration loaded"
    );

    let orchestrator = Arc::new(CampaignOrchestrator::from_config(&config));
    let mut session = CampaignSession::new(Arc::clone(&orchestrator));

    session.upload_product_image(ImageRef::parse(&cli.product));
    session.upload_logo(ImageRef::parse(&cli.logo));
    session.set_brand_color(&cli.brand_color)?;
    session.set_headline(cli.headline.clone());
    session.set_call_to_action(cli.cta.clone());
    session.set_theme(cli.theme.parse::<Theme>()?);
    session.set_tone(cli.tone.parse::<Tone>()?);

    let suggestions = if cli.suggest {
        session.suggest_headlines().await?;
        session.suggest_layouts().await;
        session.suggest_backgrounds().await;
        Some(orchestrator.suggestions())
    } else {
        None
    };

    let compliance = session.run_compliance().clone();
    if !compliance.passed {
        tracing::warn!(score = compliance.score, "copy failed compliance check");
    }

    if let Err(e) = session.generate().await {
        error!(error = %e, "creative generation failed");
        return Err(e.into());
    }

    let paths = orchestrator
        .export_all(std::path::Path::new(&config.export.output_dir))
        .await?;

    let creatives = orchestrator
        .creatives()
        .into_values()
        .zip(paths)
        .map(|(creative, path)| ExportedCreative {
            format: creative.format,
            width: creative.width,
            height: creative.height,
            sha256: creative.sha256,
            path,
        })
        .collect();

    let summary = Summary {
        creatives,
        compliance,
        suggestions,
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
