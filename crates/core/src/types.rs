use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::AdGenError;

// ─── Assets ─────────────────────────────────────────────────────────────

/// Opaque reference to an uploaded image.
#[derive(Clone, PartialEq, Eq)]
pub enum ImageRef {
    /// Encoded image bytes (PNG, JPEG, WebP).
    Bytes(Bytes),
    /// A file on local disk.
    Path(PathBuf),
    /// A `data:<mime>;base64,<payload>` URL as produced by browser file readers.
    DataUrl(String),
}

impl ImageRef {
    /// Interpret user input: `data:` URLs stay URLs, anything else is a path.
    pub fn parse(input: &str) -> Self {
        if input.starts_with("data:") {
            Self::DataUrl(input.to_string())
        } else {
            Self::Path(PathBuf::from(input))
        }
    }
}

impl fmt::Debug for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bytes(bytes) => write!(f, "ImageRef::Bytes({} bytes)", bytes.len()),
            Self::Path(path) => write!(f, "ImageRef::Path({})", path.display()),
            Self::DataUrl(url) => write!(f, "ImageRef::DataUrl({} chars)", url.len()),
        }
    }
}

impl From<Vec<u8>> for ImageRef {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(Bytes::from(bytes))
    }
}

/// Which uploaded asset an operation concerns.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    ProductImage,
    Logo,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProductImage => f.write_str("product image"),
            Self::Logo => f.write_str("logo"),
        }
    }
}

/// A validated 6-digit RGB brand color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BrandColor([u8; 3]);

impl BrandColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b])
    }

    pub fn rgb(&self) -> [u8; 3] {
        self.0
    }
}

impl Default for BrandColor {
    fn default() -> Self {
        Self::new(0x21, 0x80, 0x8d)
    }
}

impl FromStr for BrandColor {
    type Err = AdGenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex_digits = s.trim().trim_start_matches('#');
        if hex_digits.len() != 6 || !hex_digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(AdGenError::InvalidBrandColor(s.to_string()));
        }
        let mut rgb = [0u8; 3];
        hex::decode_to_slice(hex_digits, &mut rgb)
            .map_err(|_| AdGenError::InvalidBrandColor(s.to_string()))?;
        Ok(Self(rgb))
    }
}

impl TryFrom<String> for BrandColor {
    type Error = AdGenError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BrandColor> for String {
    fn from(color: BrandColor) -> Self {
        color.to_string()
    }
}

impl fmt::Display for BrandColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", hex::encode(self.0))
    }
}

/// Uploaded brand assets. A new upload replaces the field wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetSet {
    pub product_image: Option<ImageRef>,
    pub logo_image: Option<ImageRef>,
    pub brand_color: BrandColor,
}

// ─── Copy ───────────────────────────────────────────────────────────────

pub const MAX_HEADLINE_CHARS: usize = 32;
pub const MAX_CTA_CHARS: usize = 18;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Clean,
    Bold,
    Minimal,
    Vibrant,
    Premium,
}

impl Theme {
    pub const ALL: [Theme; 5] = [
        Theme::Clean,
        Theme::Bold,
        Theme::Minimal,
        Theme::Vibrant,
        Theme::Premium,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Clean => "Clean",
            Self::Bold => "Bold",
            Self::Minimal => "Minimal",
            Self::Vibrant => "Vibrant",
            Self::Premium => "Premium",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Professional,
    Friendly,
    Playful,
    Urgent,
    Luxurious,
}

impl Tone {
    pub const ALL: [Tone; 5] = [
        Tone::Professional,
        Tone::Friendly,
        Tone::Playful,
        Tone::Urgent,
        Tone::Luxurious,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Professional => "Professional",
            Self::Friendly => "Friendly",
            Self::Playful => "Playful",
            Self::Urgent => "Urgent",
            Self::Luxurious => "Luxurious",
        }
    }
}

macro_rules! label_enum_parsing {
    ($ty:ty, $what:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $ty {
            type Err = AdGenError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.label().eq_ignore_ascii_case(s.trim()))
                    .ok_or_else(|| AdGenError::Config(format!("unknown {}: {s}", $what)))
            }
        }
    };
}

label_enum_parsing!(Theme, "theme");
label_enum_parsing!(Tone, "tone");

/// Campaign copy entered in the wizard. Length limits are advisory and
/// only enforced by the compliance check.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CampaignCopy {
    pub headline: String,
    pub call_to_action: String,
    pub theme: Theme,
    pub tone: Tone,
}

impl CampaignCopy {
    pub fn new(headline: impl Into<String>, call_to_action: impl Into<String>) -> Self {
        Self {
            headline: headline.into(),
            call_to_action: call_to_action.into(),
            ..Default::default()
        }
    }

    pub fn headline_chars(&self) -> usize {
        self.headline.chars().count()
    }

    pub fn cta_chars(&self) -> usize {
        self.call_to_action.chars().count()
    }
}

// ─── Formats ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum FormatName {
    Facebook,
    Instagram,
    Display,
}

impl FormatName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Facebook => "facebook",
            Self::Instagram => "instagram",
            Self::Display => "display",
        }
    }
}

impl fmt::Display for FormatName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormatName {
    type Err = AdGenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FormatSpec::ALL
            .iter()
            .map(|spec| spec.name)
            .find(|name| name.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AdGenError::Config(format!("unknown format: {s}")))
    }
}

/// A named output size. The set is closed: see [`FormatSpec::ALL`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct FormatSpec {
    pub name: FormatName,
    pub width: u32,
    pub height: u32,
}

impl FormatSpec {
    pub const FACEBOOK: FormatSpec = FormatSpec {
        name: FormatName::Facebook,
        width: 1080,
        height: 1080,
    };
    pub const INSTAGRAM: FormatSpec = FormatSpec {
        name: FormatName::Instagram,
        width: 1080,
        height: 1920,
    };
    pub const DISPLAY: FormatSpec = FormatSpec {
        name: FormatName::Display,
        width: 1200,
        height: 628,
    };

    pub const ALL: [FormatSpec; 3] = [Self::FACEBOOK, Self::INSTAGRAM, Self::DISPLAY];

    pub fn for_name(name: FormatName) -> FormatSpec {
        match name {
            FormatName::Facebook => Self::FACEBOOK,
            FormatName::Instagram => Self::INSTAGRAM,
            FormatName::Display => Self::DISPLAY,
        }
    }
}

// ─── Outputs ────────────────────────────────────────────────────────────

/// One fully composed creative for one format.
#[derive(Debug, Clone, Serialize)]
pub struct RenderedCreative {
    pub id: Uuid,
    pub format: FormatName,
    pub width: u32,
    pub height: u32,
    /// Encoded PNG.
    #[serde(skip_serializing)]
    pub png: Bytes,
    /// Hex SHA-256 of `png`.
    pub sha256: String,
    pub created_at: DateTime<Utc>,
}

impl RenderedCreative {
    pub fn new(format: FormatSpec, png: Vec<u8>) -> Self {
        let sha256 = hex::encode(Sha256::digest(&png));
        Self {
            id: Uuid::new_v4(),
            format: format.name,
            width: format.width,
            height: format.height,
            png: Bytes::from(png),
            sha256,
            created_at: Utc::now(),
        }
    }

    /// `adgen-<format>-<unix millis>.png`
    pub fn suggested_filename(&self) -> String {
        format!(
            "adgen-{}-{}.png",
            self.format,
            self.created_at.timestamp_millis()
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ComplianceResult {
    pub passed: bool,
    pub score: u8,
    pub report: String,
}

/// AI (or fallback) suggestions. Each list is replaced wholesale.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SuggestionBundle {
    pub headlines: Vec<String>,
    pub layouts: Vec<String>,
    pub backgrounds: Vec<String>,
}
