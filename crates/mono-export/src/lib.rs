//! Encodage du résultat monochrome.
//!
//! Re-packs the 8-bit binary raster produced by the dithering pipeline to
//! 1 bit per pixel and writes it as 8-bit gray PNG or binary PBM.

pub mod pack;
pub mod writer;

pub use pack::{pack_1bpp, packed_from_bytes, unpack_1bpp};
pub use writer::{save, save_pbm, save_png};
