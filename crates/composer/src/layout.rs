//! Placement rules for every element of a creative.
//!
//! All positions are expressed as fractions of the canvas size so one
//! [`LayoutSpec`] applies identically to every [`FormatSpec`]. The logo
//! offset is the one absolute value: it sits `logo_offset_px` from the
//! top-left corner regardless of canvas size.

use adgen_core::types::FormatSpec;

/// Width the text sizes below are calibrated against.
pub const REFERENCE_WIDTH: f64 = 1080.0;

pub const HEADLINE_COLOR: [u8; 4] = [0xff, 0xff, 0xff, 0xff];
/// Gold.
pub const CTA_COLOR: [u8; 4] = [0xff, 0xd7, 0x00, 0xff];

/// One coherent set of placement constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutSpec {
    pub product_width_ratio: f64,
    pub product_left_ratio: f64,
    pub product_top_ratio: f64,
    pub logo_width_ratio: f64,
    pub logo_offset_px: i64,
    pub text_left_ratio: f64,
    pub headline_top_ratio: f64,
    pub cta_top_ratio: f64,
    /// Headline size at [`REFERENCE_WIDTH`]; scaled linearly with canvas width.
    pub headline_px: f64,
    /// CTA size at [`REFERENCE_WIDTH`]; scaled linearly with canvas width.
    pub cta_px: f64,
}

impl LayoutSpec {
    pub const STANDARD: LayoutSpec = LayoutSpec {
        product_width_ratio: 0.45,
        product_left_ratio: 0.27,
        product_top_ratio: 0.25,
        logo_width_ratio: 0.15,
        logo_offset_px: 20,
        text_left_ratio: 0.05,
        headline_top_ratio: 0.70,
        cta_top_ratio: 0.82,
        headline_px: 42.0,
        cta_px: 28.0,
    };

    pub fn resolve(&self, format: &FormatSpec) -> Layout {
        Layout {
            spec: *self,
            width: format.width,
            height: format.height,
        }
    }
}

impl Default for LayoutSpec {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Axis-aligned placement on the canvas, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn right(&self) -> i64 {
        self.x + i64::from(self.width)
    }

    pub fn bottom(&self) -> i64 {
        self.y + i64::from(self.height)
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// Left-anchored text position: `y` is the top of the text box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextAnchor {
    pub x: i64,
    pub y: i64,
    pub px: f32,
}

/// A [`LayoutSpec`] resolved against one canvas size.
#[derive(Debug, Clone, Copy)]
pub struct Layout {
    spec: LayoutSpec,
    width: u32,
    height: u32,
}

impl Layout {
    pub fn product_rect(&self, src_width: u32, src_height: u32) -> Rect {
        let target = self.fraction_of_width(self.spec.product_width_ratio);
        let (width, height) = scale_to_width(src_width, src_height, target);
        Rect {
            x: self.fraction_of_width(self.spec.product_left_ratio) as i64,
            y: self.fraction_of_height(self.spec.product_top_ratio) as i64,
            width,
            height,
        }
    }

    pub fn logo_rect(&self, src_width: u32, src_height: u32) -> Rect {
        let target = self.fraction_of_width(self.spec.logo_width_ratio);
        let (width, height) = scale_to_width(src_width, src_height, target);
        Rect {
            x: self.spec.logo_offset_px,
            y: self.spec.logo_offset_px,
            width,
            height,
        }
    }

    pub fn headline(&self) -> TextAnchor {
        self.text_anchor(self.spec.headline_top_ratio, self.spec.headline_px)
    }

    pub fn cta(&self) -> TextAnchor {
        self.text_anchor(self.spec.cta_top_ratio, self.spec.cta_px)
    }

    fn text_anchor(&self, top_ratio: f64, reference_px: f64) -> TextAnchor {
        TextAnchor {
            x: self.fraction_of_width(self.spec.text_left_ratio) as i64,
            y: self.fraction_of_height(top_ratio) as i64,
            px: (reference_px * f64::from(self.width) / REFERENCE_WIDTH) as f32,
        }
    }

    fn fraction_of_width(&self, ratio: f64) -> u32 {
        (f64::from(self.width) * ratio).round() as u32
    }

    fn fraction_of_height(&self, ratio: f64) -> u32 {
        (f64::from(self.height) * ratio).round() as u32
    }
}

/// Proportional scale so the result is exactly `target_width` wide.
pub fn scale_to_width(src_width: u32, src_height: u32, target_width: u32) -> (u32, u32) {
    if src_width == 0 || src_height == 0 {
        return (target_width.max(1), 1);
    }
    let height = (f64::from(src_height) * f64::from(target_width) / f64::from(src_width)).round();
    (target_width.max(1), (height as u32).max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_placement_facebook() {
        let layout = LayoutSpec::STANDARD.resolve(&FormatSpec::FACEBOOK);
        let rect = layout.product_rect(400, 200);
        assert_eq!(rect, Rect { x: 292, y: 270, width: 486, height: 243 });
    }

    #[test]
    fn test_logo_is_anchored_absolutely() {
        for format in FormatSpec::ALL {
            let layout = LayoutSpec::STANDARD.resolve(&format);
            let rect = layout.logo_rect(100, 50);
            assert_eq!((rect.x, rect.y), (20, 20));
            assert_eq!(rect.width, (f64::from(format.width) * 0.15).round() as u32);
        }
    }

    #[test]
    fn test_text_anchors_scale_with_width() {
        let square = LayoutSpec::STANDARD.resolve(&FormatSpec::FACEBOOK);
        assert_eq!(square.headline(), TextAnchor { x: 54, y: 756, px: 42.0 });
        assert_eq!(square.cta(), TextAnchor { x: 54, y: 886, px: 28.0 });

        let banner = LayoutSpec::STANDARD.resolve(&FormatSpec::DISPLAY);
        let headline = banner.headline();
        assert_eq!((headline.x, headline.y), (60, 440));
        assert!(headline.px > 42.0 && headline.px < 47.0);
        assert!(banner.cta().px < headline.px);
    }

    #[test]
    fn test_scale_to_width_preserves_aspect() {
        assert_eq!(scale_to_width(200, 100, 50), (50, 25));
        assert_eq!(scale_to_width(3, 1000, 1), (1, 333));
        assert_eq!(scale_to_width(0, 10, 40), (40, 1));
    }

    #[test]
    fn test_rect_intersection() {
        let a = Rect { x: 0, y: 0, width: 10, height: 10 };
        let b = Rect { x: 9, y: 9, width: 5, height: 5 };
        let c = Rect { x: 10, y: 0, width: 5, height: 5 };
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }
}
