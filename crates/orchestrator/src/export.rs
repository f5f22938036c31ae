//! Writing rendered creatives out of the process.

use std::path::{Path, PathBuf};

use adgen_core::types::RenderedCreative;
use adgen_core::AdGenResult;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::info;

/// `data:image/png;base64,...` form of the creative.
pub fn to_data_url(creative: &RenderedCreative) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(&creative.png))
}

/// Write one creative under its suggested filename, creating `dir` if needed.
pub async fn write_creative(dir: &Path, creative: &RenderedCreative) -> AdGenResult<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(creative.suggested_filename());
    tokio::fs::write(&path, &creative.png).await?;
    info!(
        format = %creative.format,
        path = %path.display(),
        bytes = creative.png.len(),
        "creative exported"
    );
    Ok(path)
}

pub async fn write_all<'a>(
    dir: &Path,
    creatives: impl IntoIterator<Item = &'a RenderedCreative>,
) -> AdGenResult<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for creative in creatives {
        paths.push(write_creative(dir, creative).await?);
    }
    Ok(paths)
}
