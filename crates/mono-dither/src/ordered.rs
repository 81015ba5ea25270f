use std::sync::Arc;

use mono_core::raster::Raster;
use mono_core::traits::Quantizer;
use rayon::prelude::*;

use crate::threshold::{BayerSize, ThresholdMap};

/// Tramage ordonné par matrice de seuils répétée sur l'image.
///
/// Sans état par pixel : chaque ligne est traitée en parallèle. La matrice
/// est partagée en lecture seule entre toutes les images (et tous les
/// threads) qui utilisent ce moteur.
///
/// # Example
/// ```
/// use mono_core::raster::{PixelFormat, Raster};
/// use mono_core::traits::Quantizer;
/// use mono_dither::ordered::OrderedDither;
/// use mono_dither::threshold::BayerSize;
///
/// let mut buf = Raster::new(2, 2, PixelFormat::Indexed8);
/// for y in 0..2 {
///     for x in 0..2 {
///         buf.set(x, y, 128);
///     }
/// }
/// OrderedDither::bayer(BayerSize::X2).quantize(&mut buf);
/// // thresholds 51 153 / 204 102
/// assert_eq!(buf.row(0), &[255, 0]);
/// assert_eq!(buf.row(1), &[0, 255]);
/// ```
#[derive(Clone, Debug)]
pub struct OrderedDither {
    map: Arc<ThresholdMap>,
}

impl OrderedDither {
    /// Wrap an already-built map.
    #[must_use]
    pub fn new(map: Arc<ThresholdMap>) -> Self {
        Self { map }
    }

    /// Engine for one of the canonical presets.
    #[must_use]
    pub fn bayer(size: BayerSize) -> Self {
        Self::new(Arc::new(ThresholdMap::bayer(size)))
    }

    /// Shared threshold map.
    #[must_use]
    pub fn map(&self) -> &Arc<ThresholdMap> {
        &self.map
    }
}

impl Quantizer for OrderedDither {
    fn quantize(&self, buffer: &mut Raster) {
        let width = buffer.width() as usize;
        let stride = buffer.stride();
        if width == 0 || stride == 0 {
            return;
        }
        let map = &*self.map;
        let size = map.size();

        buffer
            .data_mut()
            .par_chunks_mut(stride)
            .enumerate()
            .for_each(|(y, row)| {
                let thresholds = map.row_for(y);
                for (x, px) in row[..width].iter_mut().enumerate() {
                    *px = if *px < thresholds[x % size] { 0 } else { 255 };
                }
            });
    }

    fn name(&self) -> &'static str {
        "ordered"
    }
}
