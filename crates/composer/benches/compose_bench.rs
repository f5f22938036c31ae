//! Benchmarks for single-format creative composition.
//! Run with: cargo bench -p adgen-composer

use std::io::Cursor;
use std::sync::Arc;

use adgen_composer::{CreativeComposer, FontFace, ImageCrateDecoder};
use adgen_core::types::{AssetSet, BrandColor, CampaignCopy, FormatSpec, ImageRef};
use criterion::{criterion_group, criterion_main, Criterion};
use image::{ImageFormat, Rgba, RgbaImage};

fn png(width: u32, height: u32, color: [u8; 4]) -> ImageRef {
    let img = RgbaImage::from_pixel(width, height, Rgba(color));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).expect("encode fixture");
    ImageRef::from(out.into_inner())
}

fn bench_compose(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
    let composer = CreativeComposer::new(Arc::new(ImageCrateDecoder::new()), FontFace::builtin());
    let assets = AssetSet {
        product_image: Some(png(800, 600, [180, 40, 40, 255])),
        logo_image: Some(png(200, 80, [20, 20, 160, 255])),
        brand_color: BrandColor::default(),
    };
    let copy = CampaignCopy::new("Summer Sale Ends Soon", "Shop Now");

    for format in FormatSpec::ALL {
        c.bench_function(&format!("compose_{}", format.name), |b| {
            b.iter(|| {
                runtime
                    .block_on(composer.compose(&assets, &copy, format))
                    .expect("compose")
            })
        });
    }
}

criterion_group!(benches, bench_compose);
criterion_main!(benches);
