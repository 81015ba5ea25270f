use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use mono_core::config::Algorithm;
use mono_core::raster::{PixelFormat, Raster};
use mono_dither::luminance::normalize;
use mono_dither::pipeline::MonoDitherer;
use std::hint::black_box;

const WIDTH: u32 = 1024;
const HEIGHT: u32 = 768;

fn test_image() -> Raster {
    let mut raster = Raster::new(WIDTH, HEIGHT, PixelFormat::Rgb24);
    for y in 0..HEIGHT {
        for (x, px) in raster.row_mut(y).chunks_exact_mut(3).enumerate() {
            px[0] = (x * 255 / WIDTH as usize) as u8;
            px[1] = (y * 255 / HEIGHT) as u8;
            px[2] = ((x + y as usize) % 256) as u8;
        }
    }
    raster
}

fn bench_normalize(c: &mut Criterion) {
    let src = test_image();
    c.bench_function("normalize_rgb24_1024x768", |b| {
        b.iter(|| normalize(black_box(&src)));
    });
}

fn bench_algorithms(c: &mut Criterion) {
    let src = test_image();
    let mut group = c.benchmark_group("dither_1024x768");
    for algorithm in [
        Algorithm::FloydSteinberg,
        Algorithm::Bayer2x2,
        Algorithm::Bayer3x3,
        Algorithm::Bayer4x4,
        Algorithm::Bayer8x8,
    ] {
        let Ok(ditherer) = MonoDitherer::from_algorithm(algorithm) else {
            continue;
        };
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{algorithm:?}")),
            &src,
            |b, src| b.iter(|| ditherer.dither(black_box(src))),
        );
    }
    group.finish();
}

criterion_group!(benches, bench_normalize, bench_algorithms);
criterion_main!(benches);
