use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use mono_core::config::{DitherConfig, OutputFormat};
use mono_core::traits::Quantizer;
use mono_dither::MonoDitherer;
use mono_export::save;
use mono_source::{load_raster, load_raster_resized};

/// Convertit une image : chargement → tramage → écriture.
///
/// # Errors
/// Returns an error if the engine cannot be built from `config`, the input
/// cannot be decoded, or the output cannot be written.
pub fn convert(input: &Path, output: &Path, config: &DitherConfig) -> Result<()> {
    let ditherer = MonoDitherer::from_config(config).context("Configuration de tramage invalide")?;
    convert_with(&ditherer, input, output, config)
}

/// Same as [`convert`] with an already-built ditherer, so a batch builds
/// the engine (and its threshold map) only once.
///
/// # Errors
/// Returns an error if the input cannot be decoded or the output written.
pub fn convert_with(
    ditherer: &MonoDitherer,
    input: &Path,
    output: &Path,
    config: &DitherConfig,
) -> Result<()> {
    let start = Instant::now();
    let raster = match config.resize_width {
        Some(width) => load_raster_resized(input, width)?,
        None => load_raster(input)?,
    };
    let loaded = start.elapsed();

    let mono = ditherer
        .dither(&raster)
        .with_context(|| format!("Tramage impossible : {}", input.display()))?;
    let dithered = start.elapsed();

    save(&mono, output, config.output_format)?;

    log::info!(
        "{} → {} ({}×{}, {}) chargement {:.1?}, tramage {:.1?}, total {:.1?}",
        input.display(),
        output.display(),
        mono.width(),
        mono.height(),
        ditherer.engine().name(),
        loaded,
        dithered - loaded,
        start.elapsed()
    );
    Ok(())
}

/// Sortie par défaut : `photo.jpg` → `photo_mono.pbm` dans le même dossier.
#[must_use]
pub fn default_output(input: &Path, format: OutputFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .map_or_else(|| "image".into(), |s| s.to_string_lossy());
    input.with_file_name(format!("{stem}_mono.{}", format.extension()))
}
