//! Image decoding collaborator. The composer only needs pixel dimensions and
//! a drawable buffer; where the bytes come from is the decoder's business.

use std::sync::Arc;

use adgen_core::types::ImageRef;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use image::RgbaImage;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported or corrupt image: {0}")]
    Image(#[from] image::ImageError),

    #[error("malformed data URL: {0}")]
    DataUrl(String),

    #[error("image has no pixels")]
    Empty,

    #[error("decode task failed: {0}")]
    Task(String),
}

/// A decoded asset ready to be drawn.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Arc<RgbaImage>,
}

impl DecodedImage {
    pub fn new(pixels: RgbaImage) -> Self {
        Self {
            width: pixels.width(),
            height: pixels.height(),
            pixels: Arc::new(pixels),
        }
    }
}

#[async_trait]
pub trait ImageDecodeService: Send + Sync + 'static {
    async fn decode(&self, reference: &ImageRef) -> Result<DecodedImage, DecodeError>;
}

/// Decodes PNG, JPEG and WebP through the `image` crate.
#[derive(Debug, Clone, Default)]
pub struct ImageCrateDecoder;

impl ImageCrateDecoder {
    pub fn new() -> Self {
        Self
    }

    async fn read_bytes(reference: &ImageRef) -> Result<Bytes, DecodeError> {
        match reference {
            ImageRef::Bytes(bytes) => Ok(bytes.clone()),
            ImageRef::Path(path) => Ok(Bytes::from(tokio::fs::read(path).await?)),
            ImageRef::DataUrl(url) => decode_data_url(url).map(Bytes::from),
        }
    }
}

#[async_trait]
impl ImageDecodeService for ImageCrateDecoder {
    async fn decode(&self, reference: &ImageRef) -> Result<DecodedImage, DecodeError> {
        let bytes = Self::read_bytes(reference).await?;
        let len = bytes.len();

        let pixels = tokio::task::spawn_blocking(move || {
            image::load_from_memory(&bytes).map(|img| img.to_rgba8())
        })
        .await
        .map_err(|e| DecodeError::Task(e.to_string()))??;

        if pixels.width() == 0 || pixels.height() == 0 {
            return Err(DecodeError::Empty);
        }

        debug!(
            bytes = len,
            width = pixels.width(),
            height = pixels.height(),
            "decoded image asset"
        );
        Ok(DecodedImage::new(pixels))
    }
}

/// Extract the payload of a base64 `data:` URL.
pub fn decode_data_url(url: &str) -> Result<Vec<u8>, DecodeError> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| DecodeError::DataUrl("missing data: scheme".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| DecodeError::DataUrl("missing ',' separator".to_string()))?;
    if !header.ends_with(";base64") {
        return Err(DecodeError::DataUrl(format!(
            "only base64 payloads are supported, got '{header}'"
        )));
    }
    STANDARD
        .decode(payload.trim())
        .map_err(|e| DecodeError::DataUrl(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[tokio::test]
    async fn test_decode_bytes() {
        let decoded = ImageCrateDecoder::new()
            .decode(&ImageRef::from(png_bytes(7, 3)))
            .await
            .unwrap();
        assert_eq!((decoded.width, decoded.height), (7, 3));
        assert_eq!(*decoded.pixels.get_pixel(0, 0), Rgba([10, 20, 30, 255]));
    }

    #[tokio::test]
    async fn test_decode_data_url() {
        let url = format!("data:image/png;base64,{}", STANDARD.encode(png_bytes(4, 5)));
        let decoded = ImageCrateDecoder::new()
            .decode(&ImageRef::DataUrl(url))
            .await
            .unwrap();
        assert_eq!((decoded.width, decoded.height), (4, 5));
    }

    #[tokio::test]
    async fn test_corrupt_bytes_fail() {
        let result = ImageCrateDecoder::new()
            .decode(&ImageRef::from(b"definitely not a png".to_vec()))
            .await;
        assert!(matches!(result, Err(DecodeError::Image(_))));
    }

    #[tokio::test]
    async fn test_missing_file_fails() {
        let result = ImageCrateDecoder::new()
            .decode(&ImageRef::parse("/no/such/packshot.png"))
            .await;
        assert!(matches!(result, Err(DecodeError::Io(_))));
    }

    #[test]
    fn test_malformed_data_urls() {
        assert!(decode_data_url("image/png;base64,AAAA").is_err());
        assert!(decode_data_url("data:image/png;base64").is_err());
        assert!(decode_data_url("data:text/plain,hello").is_err());
        assert!(decode_data_url("data:image/png;base64,@@@").is_err());
        assert_eq!(decode_data_url("data:image/png;base64,AQID").unwrap(), vec![1, 2, 3]);
    }
}
