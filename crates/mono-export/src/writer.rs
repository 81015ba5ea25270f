use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use image::codecs::pnm::{PnmEncoder, PnmSubtype, SampleEncoding};
use image::{ExtendedColorType, GrayImage, ImageBuffer, ImageEncoder, ImageFormat};
use mono_core::config::OutputFormat;
use mono_core::raster::{PixelFormat, Raster};

use crate::pack::unpack_1bpp;

/// Écrit `raster` au format demandé.
///
/// Accepts the pipeline's `Indexed8` output or an already packed `Indexed1`
/// raster; each writer converts to the representation it needs.
///
/// # Errors
/// Returns an error on unsupported pixel formats or I/O failure.
///
/// # Example
/// ```no_run
/// use mono_core::config::OutputFormat;
/// use mono_core::raster::{PixelFormat, Raster};
/// use mono_export::save;
/// use std::path::Path;
///
/// let raster = Raster::new(64, 64, PixelFormat::Indexed8);
/// save(&raster, Path::new("out.pbm"), OutputFormat::Pbm).unwrap();
/// ```
pub fn save(raster: &Raster, path: &Path, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Png => save_png(raster, path),
        OutputFormat::Pbm => save_pbm(raster, path),
    }
}

/// Write an 8-bit grayscale PNG.
///
/// # Errors
/// Returns an error on unsupported pixel formats or if encoding fails.
pub fn save_png(raster: &Raster, path: &Path) -> Result<()> {
    let gray = to_indexed8(raster)?;
    let img: GrayImage = ImageBuffer::from_raw(gray.width(), gray.height(), gray.to_packed_vec())
        .context("Buffer gris incohérent")?;
    img.save_with_format(path, ImageFormat::Png)
        .with_context(|| format!("Écriture PNG impossible : {}", path.display()))?;
    log::debug!("PNG écrit : {}", path.display());
    Ok(())
}

/// Write a binary (`P4`) PBM file.
///
/// # Errors
/// Returns an error on unsupported pixel formats or I/O failure.
pub fn save_pbm(raster: &Raster, path: &Path) -> Result<()> {
    let bytes = encode_pbm(raster)?;
    let file = File::create(path)
        .with_context(|| format!("Création impossible : {}", path.display()))?;
    let mut out = BufWriter::new(file);
    out.write_all(&bytes)?;
    out.flush()?;
    log::debug!("PBM écrit : {} ({} octets)", path.display(), bytes.len());
    Ok(())
}

/// Encode `raster` as an in-memory `P4` PBM.
///
/// Samples are handed to the `image` PNM encoder as 0 (black) / 1 (white);
/// the encoder writes PBM's inverted convention (bit 1 = black) and zeroes
/// the row padding bits.
///
/// # Errors
/// Returns an error if `raster` is neither `Indexed8` nor `Indexed1`, or if
/// encoding fails.
///
/// # Example
/// ```
/// use mono_core::raster::{PixelFormat, Raster};
/// use mono_export::writer::encode_pbm;
///
/// let mut raster = Raster::new(3, 1, PixelFormat::Indexed8);
/// raster.set(0, 0, 255);
/// let pbm = encode_pbm(&raster).unwrap();
/// assert_eq!(&pbm[..7], b"P4\n3 1\n");
/// assert_eq!(pbm[7], 0b0110_0000);
/// ```
pub fn encode_pbm(raster: &Raster) -> Result<Vec<u8>> {
    let gray = to_indexed8(raster)?;
    let samples: Vec<u8> = gray
        .to_packed_vec()
        .iter()
        .map(|&v| u8::from(v >= 128))
        .collect();

    let mut out = Vec::new();
    PnmEncoder::new(&mut out)
        .with_subtype(PnmSubtype::Bitmap(SampleEncoding::Binary))
        .write_image(&samples, gray.width(), gray.height(), ExtendedColorType::L8)
        .context("Encodage PBM impossible")?;
    Ok(out)
}

fn to_indexed8(raster: &Raster) -> Result<Raster> {
    match raster.format() {
        PixelFormat::Indexed8 => Ok(raster.clone()),
        PixelFormat::Indexed1 => Ok(unpack_1bpp(raster)?),
        other => anyhow::bail!("Format non exportable : {other:?}"),
    }
}
