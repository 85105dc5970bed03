use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{DynamicImage, Rgb, RgbImage};
use imgutil::processing::ImageResizer;
use imgutil::{FilterType, ResizeMode, ResizeRequest, Strictness};
use serde_json::json;

fn sample_image() -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(1024, 768, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    }))
}

fn benchmark_resize_modes(c: &mut Criterion) {
    let image = sample_image();
    let resizer = ImageResizer::with_filter(FilterType::Triangle);

    let mut group = c.benchmark_group("resize_modes");
    for mode in ResizeMode::ALL {
        group.bench_function(mode.as_str(), |b| {
            b.iter(|| resizer.resize(black_box(&image), mode, 320, 320));
        });
    }
    group.finish();
}

fn benchmark_option_validation(c: &mut Criterion) {
    let options = json!({
        "source": " photos/cat.png ",
        "destination": "thumbs",
        "width": 160,
        "height": "120",
        "resizeMode": " Cover ",
        "overwrite": true
    });

    c.bench_function("validate_options", |b| {
        b.iter(|| ResizeRequest::from_value(black_box(&options), Strictness::Strict));
    });
}

criterion_group!(benches, benchmark_resize_modes, benchmark_option_validation);
criterion_main!(benches);
