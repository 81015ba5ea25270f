use std::sync::Arc;

use mono_core::config::{Algorithm, DitherConfig, ThresholdMapSpec};
use mono_core::error::DitherError;
use mono_core::raster::Raster;
use mono_core::traits::Quantizer;

use crate::error_diffusion::FloydSteinberg;
use crate::ordered::OrderedDither;
use crate::threshold::{BayerSize, ThresholdMap};

/// Ensemble fermé des algorithmes, choisi une fois à la construction.
///
/// # Example
/// ```
/// use mono_core::config::Algorithm;
/// use mono_core::traits::Quantizer;
/// use mono_dither::engine::Engine;
///
/// let engine = Engine::from_algorithm(Algorithm::Bayer4x4).unwrap();
/// assert_eq!(engine.name(), "ordered");
/// ```
#[derive(Clone, Debug)]
pub enum Engine {
    /// Sequential error diffusion.
    FloydSteinberg(FloydSteinberg),
    /// Row-parallel threshold map.
    Ordered(OrderedDither),
}

impl Engine {
    /// Engine for a preset algorithm.
    ///
    /// # Errors
    /// `NullInput` for `Algorithm::Custom`, which needs a matrix; use
    /// [`Engine::from_config`] or [`Engine::custom`] instead.
    pub fn from_algorithm(algorithm: Algorithm) -> Result<Self, DitherError> {
        let engine = match algorithm {
            Algorithm::FloydSteinberg => Self::FloydSteinberg(FloydSteinberg),
            Algorithm::Bayer2x2 => Self::Ordered(OrderedDither::bayer(BayerSize::X2)),
            Algorithm::Bayer3x3 => Self::Ordered(OrderedDither::bayer(BayerSize::X3)),
            Algorithm::Bayer4x4 => Self::Ordered(OrderedDither::bayer(BayerSize::X4)),
            Algorithm::Bayer8x8 => Self::Ordered(OrderedDither::bayer(BayerSize::X8)),
            Algorithm::Custom => {
                return Err(DitherError::NullInput {
                    what: "threshold matrix",
                });
            }
        };
        Ok(engine)
    }

    /// Ordered engine over a user-supplied matrix.
    ///
    /// # Errors
    /// `NullInput` if the matrix is absent, `InvalidThresholdMap` if it is
    /// empty, not square, or has a zero base.
    ///
    /// # Example
    /// ```
    /// use mono_core::config::ThresholdMapSpec;
    /// use mono_dither::engine::Engine;
    ///
    /// let spec = ThresholdMapSpec { matrix: Some(vec![vec![0.5, 0.5]]), base: None };
    /// assert!(Engine::custom(&spec).is_err());
    /// ```
    pub fn custom(spec: &ThresholdMapSpec) -> Result<Self, DitherError> {
        let matrix = spec.matrix.as_deref().ok_or(DitherError::NullInput {
            what: "threshold matrix",
        })?;
        let map = match spec.base {
            Some(base) => {
                let integers: Vec<Vec<u32>> = matrix
                    .iter()
                    .map(|row| row.iter().map(|&cell| cell.max(0.0) as u32).collect())
                    .collect();
                ThresholdMap::from_integers(&integers, base)?
            }
            None => ThresholdMap::from_fractions(matrix)?,
        };
        log::debug!("Matrice de seuils personnalisée {}×{}", map.size(), map.size());
        Ok(Self::Ordered(OrderedDither::new(Arc::new(map))))
    }

    /// Engine described by a configuration.
    ///
    /// # Errors
    /// Same as [`Engine::custom`] when `algorithm` is `Custom`.
    pub fn from_config(config: &DitherConfig) -> Result<Self, DitherError> {
        match config.algorithm {
            Algorithm::Custom => match &config.threshold_map {
                Some(spec) => Self::custom(spec),
                None => Err(DitherError::NullInput {
                    what: "threshold matrix",
                }),
            },
            other => Self::from_algorithm(other),
        }
    }

    /// Whether the engine may use the row-parallel worker pool.
    #[must_use]
    pub fn is_parallel(&self) -> bool {
        matches!(self, Self::Ordered(_))
    }
}

impl Quantizer for Engine {
    fn quantize(&self, buffer: &mut Raster) {
        match self {
            Self::FloydSteinberg(fs) => fs.quantize(buffer),
            Self::Ordered(ordered) => ordered.quantize(buffer),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::FloydSteinberg(fs) => fs.name(),
            Self::Ordered(ordered) => ordered.name(),
        }
    }
}
