use std::time::Instant;

use mono_core::config::{Algorithm, DitherConfig};
use mono_core::error::DitherError;
use mono_core::raster::Raster;
use mono_core::traits::Quantizer;

use crate::engine::Engine;
use crate::luminance;

/// MonoDitherer orchestre la conversion couleur → monochrome.
///
/// Normalise la source en buffer de travail 8 bits, puis applique le moteur
/// configuré. Le résultat est toujours `Indexed8` avec des valeurs 0 ou 255 ;
/// le passage à 1 bit par pixel est une étape d'encodage séparée.
///
/// Un même `MonoDitherer` peut servir plusieurs appels concurrents : chaque
/// appel possède son propre buffer de travail, seule la matrice de seuils est
/// partagée (en lecture).
///
/// # Example
/// ```
/// use mono_core::config::Algorithm;
/// use mono_core::raster::{PixelFormat, Raster};
/// use mono_dither::pipeline::MonoDitherer;
///
/// let ditherer = MonoDitherer::from_algorithm(Algorithm::Bayer8x8).unwrap();
/// let src = Raster::new(16, 9, PixelFormat::Rgb24);
/// let out = ditherer.dither(&src).unwrap();
/// assert_eq!(out.format(), PixelFormat::Indexed8);
/// assert_eq!((out.width(), out.height()), (16, 9));
/// assert!(ditherer.dither(None).is_err());
/// ```
pub struct MonoDitherer {
    engine: Engine,
    /// Dedicated worker pool; `None` uses rayon's global pool.
    pool: Option<rayon::ThreadPool>,
}

impl MonoDitherer {
    /// Create a ditherer around an engine.
    #[must_use]
    pub fn new(engine: Engine) -> Self {
        Self { engine, pool: None }
    }

    /// Ditherer for a preset algorithm.
    ///
    /// # Errors
    /// `NullInput` for `Algorithm::Custom`.
    pub fn from_algorithm(algorithm: Algorithm) -> Result<Self, DitherError> {
        Ok(Self::new(Engine::from_algorithm(algorithm)?))
    }

    /// Ditherer described by a configuration (algorithm, custom map, threads).
    ///
    /// # Errors
    /// Any error of [`Engine::from_config`]; the engine is validated before
    /// any image is seen.
    pub fn from_config(config: &DitherConfig) -> Result<Self, DitherError> {
        Ok(Self::new(Engine::from_config(config)?).with_threads(config.threads))
    }

    /// Bound the row-parallel passes to `threads` workers. 0 keeps the
    /// global pool (one worker per hardware thread).
    #[must_use]
    pub fn with_threads(mut self, threads: usize) -> Self {
        if threads == 0 {
            self.pool = None;
            return self;
        }
        match rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("mono-dither-{i}"))
            .build()
        {
            Ok(pool) => self.pool = Some(pool),
            Err(e) => {
                log::warn!("Pool de {threads} threads indisponible, pool global utilisé : {e}");
                self.pool = None;
            }
        }
        self
    }

    /// Run a row-parallel stage on the dedicated pool when there is one.
    fn install<R: Send>(&self, op: impl FnOnce() -> R + Send) -> R {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }

    /// Engine in use.
    #[must_use]
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Convert `source` to an 8-bit raster holding only 0 and 255.
    ///
    /// The source is only read. Width, height and resolution are carried
    /// over to the result.
    ///
    /// # Errors
    /// `NullInput` if `source` is `None`, `UnsupportedFormat` if its pixel
    /// format cannot be normalized. No partial result is returned.
    pub fn dither<'a>(&self, source: impl Into<Option<&'a Raster>>) -> Result<Raster, DitherError> {
        let source = source.into().ok_or(DitherError::NullInput {
            what: "source raster",
        })?;

        let start = Instant::now();
        let mut result = self.install(|| luminance::normalize(source))?;
        if self.engine.is_parallel() {
            self.install(|| self.engine.quantize(&mut result));
        } else {
            self.engine.quantize(&mut result);
        }

        log::debug!(
            "{} : {}×{} {:?} tramé en {:.1?}",
            self.engine.name(),
            source.width(),
            source.height(),
            source.format(),
            start.elapsed()
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mono_core::raster::{ByteOrder, PixelFormat, Resolution};

    const ALL: [Algorithm; 5] = [
        Algorithm::FloydSteinberg,
        Algorithm::Bayer2x2,
        Algorithm::Bayer3x3,
        Algorithm::Bayer4x4,
        Algorithm::Bayer8x8,
    ];

    /// Gradient raster in `format`, stored in `order`, with a padded stride.
    fn gradient(format: PixelFormat, order: ByteOrder, width: u32, height: u32) -> Raster {
        let bpp = format.bytes_per_pixel();
        let stride = width as usize * bpp + 5;
        let mut data = vec![0u8; stride * height as usize];
        for y in 0..height as usize {
            for x in 0..width as usize {
                let v = ((x * 255) / (width as usize).max(1)) as u8;
                let px = &mut data[y * stride + x * bpp..y * stride + (x + 1) * bpp];
                px.fill(v);
                if let Some(ch) = format.channels(order) {
                    if let Some(a) = ch.a {
                        px[a] = 255 - (y as u8 * 10);
                    }
                }
            }
        }
        Raster::from_raw(width, height, stride, format, order, data).unwrap()
    }

    fn is_binary(r: &Raster) -> bool {
        r.rows().flatten().all(|&v| v == 0 || v == 255)
    }

    #[test]
    fn every_format_and_algorithm_yields_binary_output() {
        for format in [
            PixelFormat::Indexed8,
            PixelFormat::Rgb24,
            PixelFormat::Rgba32,
            PixelFormat::Rgbx32,
        ] {
            for order in [ByteOrder::LittleEndian, ByteOrder::BigEndian] {
                let src = gradient(format, order, 13, 7);
                for algorithm in ALL {
                    let out = MonoDitherer::from_algorithm(algorithm)
                        .unwrap()
                        .dither(&src)
                        .unwrap();
                    assert_eq!(out.format(), PixelFormat::Indexed8);
                    assert_eq!((out.width(), out.height()), (13, 7));
                    assert!(is_binary(&out), "{format:?} {order:?} {algorithm:?}");
                }
            }
        }
    }

    #[test]
    fn null_source_is_rejected() {
        for algorithm in ALL {
            let ditherer = MonoDitherer::from_algorithm(algorithm).unwrap();
            assert_eq!(
                ditherer.dither(None).unwrap_err(),
                DitherError::NullInput {
                    what: "source raster"
                }
            );
        }
    }

    #[test]
    fn indexed1_source_is_rejected() {
        let src = Raster::new(8, 2, PixelFormat::Indexed1);
        let ditherer = MonoDitherer::from_algorithm(Algorithm::Bayer4x4).unwrap();
        assert!(matches!(
            ditherer.dither(&src),
            Err(DitherError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn source_is_not_mutated_and_runs_are_deterministic() {
        let src = gradient(PixelFormat::Rgba32, ByteOrder::LittleEndian, 31, 17);
        let snapshot = src.clone();
        for algorithm in ALL {
            let ditherer = MonoDitherer::from_algorithm(algorithm).unwrap();
            let a = ditherer.dither(&src).unwrap();
            let b = ditherer.dither(&src).unwrap();
            assert_eq!(a.data(), b.data(), "{algorithm:?}");
        }
        assert_eq!(src, snapshot);
    }

    #[test]
    fn resolution_is_copied_through() {
        let res = Resolution {
            x_dpi: 300.0,
            y_dpi: 150.0,
        };
        let src = Raster::new(4, 4, PixelFormat::Rgb24).with_resolution(Some(res));
        let out = MonoDitherer::from_algorithm(Algorithm::FloydSteinberg)
            .unwrap()
            .dither(&src)
            .unwrap();
        assert_eq!(out.resolution(), Some(res));
    }

    #[test]
    fn scenario_rgb24_bayer2x2() {
        // (200,200,200) (50,50,50) / (10,10,10) (240,240,240), stored B G R.
        let stride = 8;
        let mut data = vec![0u8; stride * 2];
        for (i, v) in [200u8, 50, 10, 240].into_iter().enumerate() {
            let (x, y) = (i % 2, i / 2);
            data[y * stride + x * 3..y * stride + x * 3 + 3].fill(v);
        }
        let src =
            Raster::from_raw(2, 2, stride, PixelFormat::Rgb24, ByteOrder::LittleEndian, data).unwrap();
        let out = MonoDitherer::from_algorithm(Algorithm::Bayer2x2)
            .unwrap()
            .dither(&src)
            .unwrap();
        // luminance 200 50 / 10 240 against thresholds 51 153 / 204 102
        assert_eq!(out.row(0), &[255, 0]);
        assert_eq!(out.row(1), &[0, 255]);
    }

    #[test]
    fn scenario_flat_gray_floyd_steinberg() {
        let mut src = Raster::new(4, 4, PixelFormat::Indexed8);
        for y in 0..4 {
            src.row_mut(y).fill(100);
        }
        let out = MonoDitherer::from_algorithm(Algorithm::FloydSteinberg)
            .unwrap()
            .dither(&src)
            .unwrap();
        assert_eq!(out.row(0), &[0, 255, 0, 0]);
        assert_eq!(out.row(1), &[0, 0, 255, 0]);
        assert_eq!(out.row(2), &[255, 0, 255, 0]);
        assert_eq!(out.row(3), &[0, 255, 0, 255]);
    }

    #[test]
    fn dedicated_pool_matches_global_pool() {
        let src = gradient(PixelFormat::Rgb24, ByteOrder::BigEndian, 64, 48);
        let global = MonoDitherer::from_algorithm(Algorithm::Bayer8x8).unwrap();
        let bounded = MonoDitherer::from_algorithm(Algorithm::Bayer8x8)
            .unwrap()
            .with_threads(2);
        assert_eq!(
            global.dither(&src).unwrap().data(),
            bounded.dither(&src).unwrap().data()
        );
    }

    #[test]
    fn sequential_engine_with_dedicated_pool() {
        let src = gradient(PixelFormat::Rgba32, ByteOrder::LittleEndian, 33, 21);
        let global = MonoDitherer::from_algorithm(Algorithm::FloydSteinberg).unwrap();
        let bounded = MonoDitherer::from_algorithm(Algorithm::FloydSteinberg)
            .unwrap()
            .with_threads(3);
        assert!(!bounded.engine().is_parallel());
        assert_eq!(bounded.engine().name(), "floyd-steinberg");
        assert_eq!(global.dither(&src).unwrap(), bounded.dither(&src).unwrap());
    }

    #[test]
    fn concurrent_calls_share_one_engine() {
        let src = gradient(PixelFormat::Rgb24, ByteOrder::LittleEndian, 40, 40);
        let ditherer = MonoDitherer::from_algorithm(Algorithm::Bayer4x4).unwrap();
        let expected = ditherer.dither(&src).unwrap();
        std::thread::scope(|s| {
            let handles: Vec<_> = (0..4).map(|_| s.spawn(|| ditherer.dither(&src))).collect();
            for h in handles {
                assert_eq!(h.join().unwrap().unwrap(), expected);
            }
        });
    }

    #[test]
    fn empty_source_gives_empty_result() {
        let src = Raster::new(0, 0, PixelFormat::Rgb24);
        let out = MonoDitherer::from_algorithm(Algorithm::FloydSteinberg)
            .unwrap()
            .dither(&src)
            .unwrap();
        assert_eq!((out.width(), out.height()), (0, 0));
    }
}
