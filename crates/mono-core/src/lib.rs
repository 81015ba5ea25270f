//! Types, configuration et erreurs partagés par le workspace monodither.
//!
//! This crate contains the raster data model, the static pixel-format
//! table, the error type and the configuration logic used by every other
//! crate of the workspace.

pub mod config;
pub mod error;
pub mod raster;
pub mod traits;

pub use config::{Algorithm, DitherConfig, OutputFormat, ThresholdMapSpec};
pub use error::DitherError;
pub use raster::{ByteOrder, PixelFormat, Raster, Resolution};
pub use traits::Quantizer;
