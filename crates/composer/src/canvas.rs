//! In-memory RGBA drawing surface with the handful of primitives a creative
//! needs: a diagonal gradient, alpha-composited images, text, and PNG output.

use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::{self, FilterType};
use image::{ExtendedColorType, ImageEncoder, ImageError, Rgba, RgbaImage};

use crate::layout::{Rect, TextAnchor};
use crate::text::FontFace;

/// Resampling filter for scaled assets. Must stay deterministic.
const RESAMPLE_FILTER: FilterType = FilterType::Triangle;

pub struct Canvas {
    pixels: RgbaImage,
}

impl Canvas {
    /// An opaque white canvas.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::from_pixel(width, height, Rgba([0xff, 0xff, 0xff, 0xff])),
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgba<u8> {
        *self.pixels.get_pixel(x, y)
    }

    /// Linear gradient along the full diagonal: `from` at (0, 0), `to` at
    /// (width, height). Each pixel centre is projected onto the diagonal.
    pub fn fill_linear_gradient(&mut self, from: Rgba<u8>, to: Rgba<u8>) {
        let w = f64::from(self.width());
        let h = f64::from(self.height());
        let length_sq = w * w + h * h;
        if length_sq == 0.0 {
            return;
        }

        for (x, y, pixel) in self.pixels.enumerate_pixels_mut() {
            let px = f64::from(x) + 0.5;
            let py = f64::from(y) + 0.5;
            let t = ((px * w + py * h) / length_sq).clamp(0.0, 1.0);
            *pixel = lerp(from, to, t);
        }
    }

    /// Scale `image` to the rect's size and composite it at the rect's origin.
    /// Parts falling outside the canvas are clipped.
    ///
    /// Only the visible part of the rect is resampled, so the work is bounded
    /// by the canvas size however large the rect is.
    pub fn draw_image(&mut self, image: &RgbaImage, rect: Rect) {
        if rect.width == 0 || rect.height == 0 || image.width() == 0 || image.height() == 0 {
            return;
        }
        let Some(visible) = self.visible_part(rect) else {
            return;
        };

        if visible == rect {
            if image.dimensions() == (rect.width, rect.height) {
                imageops::overlay(&mut self.pixels, image, rect.x, rect.y);
            } else {
                let scaled = imageops::resize(image, rect.width, rect.height, RESAMPLE_FILTER);
                imageops::overlay(&mut self.pixels, &scaled, rect.x, rect.y);
            }
            return;
        }

        let (sx0, sx1) = source_span(visible.x - rect.x, visible.width, rect.width, image.width());
        let (sy0, sy1) = source_span(visible.y - rect.y, visible.height, rect.height, image.height());
        let source = imageops::crop_imm(image, sx0, sy0, sx1 - sx0, sy1 - sy0).to_image();
        let scaled = imageops::resize(&source, visible.width, visible.height, RESAMPLE_FILTER);
        imageops::overlay(&mut self.pixels, &scaled, visible.x, visible.y);
    }

    /// Intersection of `rect` with the canvas, or `None` when fully outside.
    fn visible_part(&self, rect: Rect) -> Option<Rect> {
        let x0 = rect.x.max(0);
        let y0 = rect.y.max(0);
        let x1 = rect.right().min(i64::from(self.width()));
        let y1 = rect.bottom().min(i64::from(self.height()));
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some(Rect {
            x: x0,
            y: y0,
            width: (x1 - x0) as u32,
            height: (y1 - y0) as u32,
        })
    }

    pub fn draw_text(
        &mut self,
        font: &FontFace,
        text: &str,
        anchor: TextAnchor,
        color: [u8; 4],
        bold: bool,
    ) {
        font.draw(&mut self.pixels, text, anchor, Rgba(color), bold);
    }

    /// Encode as PNG with fixed compression and filter settings, so equal
    /// pixels always produce equal bytes.
    pub fn encode_png(&self) -> Result<Vec<u8>, ImageError> {
        let mut out = Vec::new();
        PngEncoder::new_with_quality(&mut out, CompressionType::Default, PngFilter::Adaptive)
            .write_image(
                self.pixels.as_raw(),
                self.width(),
                self.height(),
                ExtendedColorType::Rgba8,
            )?;
        Ok(out)
    }

    pub fn into_image(self) -> RgbaImage {
        self.pixels
    }
}

/// Source pixel range `[start, end)` that maps onto `len` destination pixels
/// starting `offset` pixels into a `dest_len`-long scaled copy of a
/// `src_len`-long source. Never empty.
fn source_span(offset: i64, len: u32, dest_len: u32, src_len: u32) -> (u32, u32) {
    let ratio = f64::from(src_len) / f64::from(dest_len);
    let start = ((offset as f64) * ratio).floor() as u32;
    let end = (((offset + i64::from(len)) as f64) * ratio).ceil() as u32;
    let start = start.min(src_len - 1);
    (start, end.clamp(start + 1, src_len))
}

fn lerp(from: Rgba<u8>, to: Rgba<u8>, t: f64) -> Rgba<u8> {
    let mut out = [0u8; 4];
    for (i, channel) in out.iter_mut().enumerate() {
        let a = f64::from(from.0[i]);
        let b = f64::from(to.0[i]);
        *channel = (a + (b - a) * t).round().clamp(0.0, 255.0) as u8;
    }
    Rgba(out)
}

/// Source-over blend of `color` scaled by `coverage` (0..=1) onto one pixel.
/// Out-of-bounds coordinates are ignored.
pub(crate) fn blend_pixel(image: &mut RgbaImage, x: i64, y: i64, color: Rgba<u8>, coverage: f32) {
    if x < 0 || y < 0 || x >= i64::from(image.width()) || y >= i64::from(image.height()) {
        return;
    }
    let alpha = (coverage.clamp(0.0, 1.0) * f32::from(color.0[3]) / 255.0).clamp(0.0, 1.0);
    if alpha <= 0.0 {
        return;
    }
    let dst = image.get_pixel_mut(x as u32, y as u32);
    for i in 0..3 {
        let src = f32::from(color.0[i]);
        let base = f32::from(dst.0[i]);
        dst.0[i] = (src * alpha + base * (1.0 - alpha)).round() as u8;
    }
    let base_alpha = f32::from(dst.0[3]) / 255.0;
    dst.0[3] = ((alpha + base_alpha * (1.0 - alpha)) * 255.0).round() as u8;
}
