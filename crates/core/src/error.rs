use thiserror::Error;

use crate::types::AssetKind;

pub type AdGenResult<T> = Result<T, AdGenError>;

#[derive(Error, Debug)]
pub enum AdGenError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required asset or piece of copy is absent. User-correctable.
    #[error("Missing input: {0}")]
    MissingInput(String),

    #[error("Failed to decode {asset}: {reason}")]
    AssetDecode { asset: AssetKind, reason: String },

    #[error("Invalid brand color: {0}")]
    InvalidBrandColor(String),

    #[error("Image encoding error: {0}")]
    Encode(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AdGenError {
    pub fn missing(what: impl Into<String>) -> Self {
        Self::MissingInput(what.into())
    }

    pub fn decode(asset: AssetKind, reason: impl std::fmt::Display) -> Self {
        Self::AssetDecode {
            asset,
            reason: reason.to_string(),
        }
    }

    /// Whether the caller can fix this by changing wizard input.
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            Self::MissingInput(_) | Self::AssetDecode { .. } | Self::InvalidBrandColor(_)
        )
    }
}
