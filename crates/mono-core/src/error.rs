use thiserror::Error;

use crate::raster::PixelFormat;

/// Errors originating from the dithering core.
///
/// Toutes les erreurs sont terminales pour l'appel en cours : aucun résultat
/// partiel n'est jamais retourné.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DitherError {
    /// A required input (source raster, threshold matrix) is absent.
    #[error("Entrée absente : {what}")]
    NullInput {
        /// Name of the missing input.
        what: &'static str,
    },

    /// Source pixel format is outside the supported set.
    #[error("Format non supporté : {format:?}")]
    UnsupportedFormat {
        /// The rejected pixel format.
        format: PixelFormat,
    },

    /// Threshold matrix is empty, not square, or has an unusable base.
    #[error("Matrice de seuils invalide : {0}")]
    InvalidThresholdMap(String),

    /// Byte buffer length does not match `height × stride`.
    #[error("Taille de buffer incohérente : attendu {expected} octets, reçu {actual}")]
    SizeMismatch {
        /// Expected byte count.
        expected: usize,
        /// Actual byte count.
        actual: usize,
    },

    /// Row stride is smaller than one row of pixels.
    #[error("Stride invalide : {stride} < {min}")]
    InvalidStride {
        /// Declared stride in bytes.
        stride: usize,
        /// Minimum stride for the width and format.
        min: usize,
    },

    /// Invalid width/height dimensions.
    #[error("Dimensions invalides : {width}×{height}")]
    InvalidDimensions {
        /// Width value.
        width: u32,
        /// Height value.
        height: u32,
    },
}
