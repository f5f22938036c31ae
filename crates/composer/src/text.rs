//! Text rasterization for headline and CTA copy.
//!
//! A configured TrueType/OpenType font is used when available. Otherwise the
//! built-in 8×8 bitmap font is scaled up, which keeps output independent of
//! whatever fonts the host has installed.

use std::path::Path;

use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};
use image::{Rgba, RgbaImage};
use rusttype::{point, Font, Scale};
use tracing::{info, warn};

use crate::canvas::blend_pixel;
use crate::layout::TextAnchor;

const BITMAP_CELLS: f32 = 8.0;
/// Horizontal advance of a bitmap glyph as a fraction of the font size. The
/// 8x8 cell is narrowed to match, giving the proportions of a typical sans.
const BITMAP_ADVANCE: f32 = 0.6;

#[derive(Default)]
pub enum FontFace {
    Outline(Box<Font<'static>>),
    #[default]
    Bitmap,
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Outline(_) => f.write_str("FontFace::Outline"),
            Self::Bitmap => f.write_str("FontFace::Bitmap"),
        }
    }
}

impl FontFace {
    pub fn builtin() -> Self {
        Self::Bitmap
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Option<Self> {
        Font::try_from_vec(bytes).map(|font| Self::Outline(Box::new(font)))
    }

    /// Load the font at `path`, falling back to the built-in face when the
    /// path is unset, unreadable, or not a font.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::builtin();
        };
        match std::fs::read(path) {
            Ok(bytes) => match Self::from_bytes(bytes) {
                Some(face) => {
                    info!(path = %path.display(), "loaded outline font");
                    face
                }
                None => {
                    warn!(path = %path.display(), "not a usable font file, using built-in font");
                    Self::builtin()
                }
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read font, using built-in font");
                Self::builtin()
            }
        }
    }

    /// Horizontal extent of `text` at `px`, without bold widening.
    pub fn measure(&self, text: &str, px: f32) -> f32 {
        match self {
            Self::Outline(font) => {
                let scale = Scale::uniform(px);
                font.layout(text, scale, point(0.0, 0.0))
                    .last()
                    .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
                    .unwrap_or(0.0)
            }
            Self::Bitmap => text.chars().count() as f32 * px * BITMAP_ADVANCE,
        }
    }

    /// Draw `text` with its box's top-left corner at the anchor. Bold is an
    /// overstrike shifted right by roughly 1/24 of the size.
    pub fn draw(
        &self,
        image: &mut RgbaImage,
        text: &str,
        anchor: TextAnchor,
        color: Rgba<u8>,
        bold: bool,
    ) {
        let strikes = if bold {
            (anchor.px / 24.0).round().max(1.0) as i64
        } else {
            0
        };
        // Overstrikes must not accumulate alpha on anti-aliased edges, so
        // each pass draws into a coverage mask first.
        let mut mask = CoverageMask::new(image.width(), image.height());
        for dx in 0..=strikes {
            match self {
                Self::Outline(font) => draw_outline(font, &mut mask, text, anchor, dx),
                Self::Bitmap => draw_bitmap(&mut mask, text, anchor, dx),
            }
        }
        mask.apply(image, color);
    }
}

struct CoverageMask {
    width: u32,
    height: u32,
    coverage: Vec<f32>,
}

impl CoverageMask {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            coverage: vec![0.0; width as usize * height as usize],
        }
    }

    fn mark(&mut self, x: i64, y: i64, value: f32) {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return;
        }
        let idx = y as usize * self.width as usize + x as usize;
        self.coverage[idx] = self.coverage[idx].max(value);
    }

    fn apply(&self, image: &mut RgbaImage, color: Rgba<u8>) {
        for (idx, &value) in self.coverage.iter().enumerate() {
            if value > 0.0 {
                let x = (idx % self.width as usize) as i64;
                let y = (idx / self.width as usize) as i64;
                blend_pixel(image, x, y, color, value);
            }
        }
    }
}

fn draw_outline(font: &Font<'static>, mask: &mut CoverageMask, text: &str, anchor: TextAnchor, dx: i64) {
    let scale = Scale::uniform(anchor.px);
    let ascent = font.v_metrics(scale).ascent;
    let origin = point(anchor.x as f32, anchor.y as f32 + ascent);

    for glyph in font.layout(text, scale, origin) {
        if let Some(bb) = glyph.pixel_bounding_box() {
            glyph.draw(|gx, gy, value| {
                let x = i64::from(bb.min.x) + i64::from(gx) + dx;
                let y = i64::from(bb.min.y) + i64::from(gy);
                mask.mark(x, y, value);
            });
        }
    }
}

fn draw_bitmap(mask: &mut CoverageMask, text: &str, anchor: TextAnchor, dx: i64) {
    let advance = anchor.px * BITMAP_ADVANCE;
    let cell_w = advance / BITMAP_CELLS;
    let cell_h = anchor.px / BITMAP_CELLS;
    let mut caret = anchor.x as f32 + dx as f32;
    let top = anchor.y as f32;

    for ch in text.chars() {
        let rows = BASIC_FONTS
            .get(ch)
            .or_else(|| LATIN_FONTS.get(ch))
            .or_else(|| BASIC_FONTS.get('?'))
            .unwrap_or([0; 8]);

        for (row, bits) in rows.iter().enumerate() {
            for col in 0..8 {
                if bits & (1 << col) == 0 {
                    continue;
                }
                let x0 = (caret + col as f32 * cell_w).round() as i64;
                let x1 = (caret + (col + 1) as f32 * cell_w).round() as i64;
                let y0 = (top + row as f32 * cell_h).round() as i64;
                let y1 = (top + (row + 1) as f32 * cell_h).round() as i64;
                for y in y0..y1 {
                    for x in x0..x1 {
                        mask.mark(x, y, 1.0);
                    }
                }
            }
        }
        caret += advance;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_ink(image: &RgbaImage) -> usize {
        image.pixels().filter(|p| p.0[0] > 128).count()
    }

    #[test]
    fn test_bitmap_text_draws_inside_its_box() {
        let mut image = RgbaImage::from_pixel(200, 60, Rgba([0, 0, 0, 255]));
        let anchor = TextAnchor { x: 10, y: 10, px: 16.0 };
        FontFace::builtin().draw(&mut image, "AB", anchor, Rgba([255, 255, 255, 255]), false);

        assert!(count_ink(&image) > 0);
        for (x, y, p) in image.enumerate_pixels() {
            if p.0[0] > 0 {
                assert!((10..30).contains(&x), "ink at x={x}");
                assert!((10..26).contains(&y), "ink at y={y}");
            }
        }
    }

    #[test]
    fn test_bold_adds_ink() {
        let anchor = TextAnchor { x: 0, y: 0, px: 48.0 };
        let white = Rgba([255, 255, 255, 255]);

        let mut regular = RgbaImage::from_pixel(200, 60, Rgba([0, 0, 0, 255]));
        FontFace::builtin().draw(&mut regular, "Hi", anchor, white, false);
        let mut bold = RgbaImage::from_pixel(200, 60, Rgba([0, 0, 0, 255]));
        FontFace::builtin().draw(&mut bold, "Hi", anchor, white, true);

        assert!(count_ink(&bold) > count_ink(&regular));
    }

    #[test]
    fn test_whitespace_draws_nothing() {
        let mut image = RgbaImage::from_pixel(50, 20, Rgba([0, 0, 0, 255]));
        let anchor = TextAnchor { x: 0, y: 0, px: 8.0 };
        FontFace::builtin().draw(&mut image, "   ", anchor, Rgba([255, 255, 255, 255]), true);
        assert_eq!(count_ink(&image), 0);
    }

    #[test]
    fn test_missing_font_falls_back_to_builtin() {
        let face = FontFace::load(Some(Path::new("/definitely/not/a/font.ttf")));
        assert!(matches!(face, FontFace::Bitmap));
        assert!(FontFace::from_bytes(b"not a font".to_vec()).is_none());
        assert!((face.measure("abc", 10.0) - 18.0).abs() < 1e-3);
    }
}
