//! Moteur de tramage monochrome.
//!
//! Converts any supported raster to an 8-bit buffer holding only 0 and 255,
//! through the luminance normalizer and one of two engine families:
//! Floyd–Steinberg error diffusion or Bayer ordered dithering.

pub mod engine;
pub mod error_diffusion;
pub mod luminance;
pub mod ordered;
pub mod pipeline;
pub mod threshold;

pub use engine::Engine;
pub use error_diffusion::FloydSteinberg;
pub use ordered::OrderedDither;
pub use pipeline::MonoDitherer;
pub use threshold::{BayerSize, ThresholdMap};
