//! Décodage des fichiers image vers le modèle `Raster` de monodither.
//!
//! Everything that touches encoded source files lives here: decoding with
//! the `image` crate, optional pre-resize, and folder scanning for batches.

pub mod folder;
pub mod image;
pub mod resize;

pub use folder::scan_images;
pub use crate::image::{load_raster, load_raster_resized, raster_from_image};
