use mono_core::error::DitherError;
use mono_core::raster::{ByteOrder, ChannelOffsets, PixelFormat, Raster};
use rayon::prelude::*;

/// Poids de luminance (Rec. 601, sans correction gamma).
const R_WEIGHT: f32 = 0.299;
const G_WEIGHT: f32 = 0.587;
const B_WEIGHT: f32 = 0.114;

/// Réduit un raster source en buffer de travail 8 bits en niveaux de gris.
///
/// Formats acceptés : `Indexed8` (copié tel quel), `Rgb24`, `Rgba32`
/// (luminance pondérée par l'alpha normalisé) et `Rgbx32` (4e octet ignoré).
/// Les lignes sont indépendantes et traitées en parallèle ; chaque worker
/// n'écrit que sa propre ligne de sortie.
///
/// # Errors
/// `UnsupportedFormat` for `Indexed1`.
///
/// # Example
/// ```
/// use mono_core::raster::{ByteOrder, PixelFormat, Raster};
/// use mono_dither::luminance::normalize;
///
/// // One red pixel, stored R G B (most-significant byte first).
/// let src = Raster::from_raw(1, 1, 4, PixelFormat::Rgb24, ByteOrder::BigEndian, vec![255, 0, 0, 0]).unwrap();
/// let gray = normalize(&src).unwrap();
/// assert_eq!(gray.format(), PixelFormat::Indexed8);
/// assert_eq!(gray.get(0, 0), 76);
/// ```
pub fn normalize(src: &Raster) -> Result<Raster, DitherError> {
    // Format d'abord : même un raster vide doit être refusé s'il est Indexed1.
    let channels = match src.format() {
        PixelFormat::Indexed8 => None,
        PixelFormat::Rgb24 | PixelFormat::Rgba32 | PixelFormat::Rgbx32 => {
            Some(channel_layout(src.format(), src.byte_order())?)
        }
        format @ PixelFormat::Indexed1 => return Err(DitherError::UnsupportedFormat { format }),
    };

    let mut dst = Raster::new(src.width(), src.height(), PixelFormat::Indexed8)
        .with_resolution(src.resolution());
    if src.width() == 0 || src.height() == 0 {
        return Ok(dst);
    }

    match channels {
        None => copy_gray(src, &mut dst),
        Some(channels) => convert_rows(src, &mut dst, channels),
    }

    log::debug!(
        "Normalisation {:?} ({:?}) → Indexed8 : {}×{}",
        src.format(),
        src.byte_order(),
        src.width(),
        src.height()
    );
    Ok(dst)
}

/// Channel positions for a color format, chosen by the source byte order.
fn channel_layout(format: PixelFormat, order: ByteOrder) -> Result<ChannelOffsets, DitherError> {
    let channels = match order {
        ByteOrder::LittleEndian => format.channels(ByteOrder::LittleEndian),
        ByteOrder::BigEndian => format.channels(ByteOrder::BigEndian),
    };
    channels.ok_or(DitherError::UnsupportedFormat { format })
}

/// Indexed8 source: no per-pixel work.
fn copy_gray(src: &Raster, dst: &mut Raster) {
    if src.stride() == dst.stride() {
        dst.data_mut().copy_from_slice(src.data());
    } else {
        for y in 0..src.height() {
            dst.row_mut(y).copy_from_slice(src.row(y));
        }
    }
}

fn convert_rows(src: &Raster, dst: &mut Raster, channels: ChannelOffsets) {
    let bpp = src.format().bytes_per_pixel();
    let width = src.width() as usize;
    let src_stride = src.stride();
    let dst_stride = dst.stride();
    let src_len = width * bpp;

    dst.data_mut()
        .par_chunks_mut(dst_stride)
        .zip(src.data().par_chunks(src_stride))
        .for_each(|(out, inp)| {
            let pixels = inp[..src_len].chunks_exact(bpp);
            let out = &mut out[..width];
            match channels.a {
                Some(a) => {
                    for (o, px) in out.iter_mut().zip(pixels) {
                        *o = luminance_alpha(px[channels.r], px[channels.g], px[channels.b], px[a]);
                    }
                }
                None => {
                    for (o, px) in out.iter_mut().zip(pixels) {
                        *o = luminance(px[channels.r], px[channels.g], px[channels.b]);
                    }
                }
            }
        });
}

/// `L = 0.299·R + 0.587·G + 0.114·B`, truncated.
///
/// # Example
/// ```
/// use mono_dither::luminance::luminance;
/// assert_eq!(luminance(255, 255, 255), 255);
/// assert_eq!(luminance(0, 255, 0), 149);
/// ```
#[inline(always)]
#[must_use]
pub fn luminance(r: u8, g: u8, b: u8) -> u8 {
    weighted_sum(r, g, b) as u8
}

/// `L = (A / 255)·(0.299·R + 0.587·G + 0.114·B)`, truncated.
///
/// # Example
/// ```
/// use mono_dither::luminance::luminance_alpha;
/// assert_eq!(luminance_alpha(255, 255, 255, 0), 0);
/// assert_eq!(luminance_alpha(200, 200, 200, 128), 100);
/// ```
#[inline(always)]
#[must_use]
pub fn luminance_alpha(r: u8, g: u8, b: u8, a: u8) -> u8 {
    (f32::from(a) / 255.0 * weighted_sum(r, g, b)) as u8
}

#[inline(always)]
fn weighted_sum(r: u8, g: u8, b: u8) -> f32 {
    R_WEIGHT * f32::from(r) + G_WEIGHT * f32::from(g) + B_WEIGHT * f32::from(b)
}
