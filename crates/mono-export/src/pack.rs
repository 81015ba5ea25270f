use mono_core::error::DitherError;
use mono_core::raster::{ByteOrder, PixelFormat, Raster, min_stride};
use rayon::prelude::*;

/// Seuil de bascule 8 bits → 1 bit : `>= 128` devient blanc.
const WHITE_FROM: u8 = 128;

/// Re-pack an 8-bit raster to 1 bit per pixel, most significant bit first.
///
/// A value of 128 or more becomes bit 1 (white), anything below becomes
/// bit 0 (black). Rows are `ceil(width / 8)` bytes and the unused low bits
/// of the last byte are always 0.
///
/// # Errors
/// `UnsupportedFormat` if `src` is not `Indexed8`.
///
/// # Example
/// ```
/// use mono_core::raster::{PixelFormat, Raster};
/// use mono_export::pack_1bpp;
///
/// let mut src = Raster::new(3, 1, PixelFormat::Indexed8);
/// src.set(0, 0, 255);
/// src.set(2, 0, 255);
/// let packed = pack_1bpp(&src).unwrap();
/// assert_eq!(packed.stride(), 1);
/// assert_eq!(packed.data(), &[0b1010_0000]);
/// ```
pub fn pack_1bpp(src: &Raster) -> Result<Raster, DitherError> {
    if src.format() != PixelFormat::Indexed8 {
        return Err(DitherError::UnsupportedFormat {
            format: src.format(),
        });
    }
    let mut dst = Raster::new_packed(src.width(), src.height(), PixelFormat::Indexed1)
        .with_resolution(src.resolution());
    let width = src.width() as usize;
    let (src_stride, dst_stride) = (src.stride(), dst.stride());
    if width == 0 || src.height() == 0 {
        return Ok(dst);
    }

    dst.data_mut()
        .par_chunks_mut(dst_stride)
        .zip(src.data().par_chunks(src_stride))
        .for_each(|(out, row)| {
            for (byte, pixels) in out.iter_mut().zip(row[..width].chunks(8)) {
                *byte = pixels
                    .iter()
                    .enumerate()
                    .filter(|&(_, &v)| v >= WHITE_FROM)
                    .fold(0u8, |acc, (bit, _)| acc | (0x80 >> bit));
            }
        });
    Ok(dst)
}

/// Expand a 1-bit raster back to one byte per pixel (bit 1 → 255, bit 0 → 0).
///
/// # Errors
/// `UnsupportedFormat` if `src` is not `Indexed1`.
///
/// # Example
/// ```
/// use mono_export::{packed_from_bytes, unpack_1bpp};
///
/// let packed = packed_from_bytes(3, 1, vec![0b0100_0000]).unwrap();
/// let gray = unpack_1bpp(&packed).unwrap();
/// assert_eq!(gray.row(0), &[0, 255, 0]);
/// ```
pub fn unpack_1bpp(src: &Raster) -> Result<Raster, DitherError> {
    if src.format() != PixelFormat::Indexed1 {
        return Err(DitherError::UnsupportedFormat {
            format: src.format(),
        });
    }
    let mut dst = Raster::new(src.width(), src.height(), PixelFormat::Indexed8)
        .with_resolution(src.resolution());
    let width = src.width() as usize;
    let (src_stride, dst_stride) = (src.stride(), dst.stride());
    if width == 0 || src.height() == 0 {
        return Ok(dst);
    }

    dst.data_mut()
        .par_chunks_mut(dst_stride)
        .zip(src.data().par_chunks(src_stride))
        .for_each(|(out, bits)| {
            for (x, px) in out[..width].iter_mut().enumerate() {
                let set = bits[x / 8] & (0x80 >> (x % 8)) != 0;
                *px = if set { 255 } else { 0 };
            }
        });
    Ok(dst)
}

/// Wrap tightly packed 1-bit rows (`ceil(width / 8)` bytes each).
///
/// # Errors
/// `SizeMismatch` if `bytes.len() != height × ceil(width / 8)`.
///
/// # Example
/// ```
/// use mono_core::error::DitherError;
/// use mono_export::packed_from_bytes;
///
/// assert!(packed_from_bytes(10, 2, vec![0; 4]).is_ok());
/// assert_eq!(
///     packed_from_bytes(10, 2, vec![0; 3]).unwrap_err(),
///     DitherError::SizeMismatch { expected: 4, actual: 3 }
/// );
/// ```
pub fn packed_from_bytes(width: u32, height: u32, bytes: Vec<u8>) -> Result<Raster, DitherError> {
    let stride = min_stride(width, PixelFormat::Indexed1);
    let expected = stride * height as usize;
    if bytes.len() != expected {
        return Err(DitherError::SizeMismatch {
            expected,
            actual: bytes.len(),
        });
    }
    Raster::from_raw(
        width,
        height,
        stride,
        PixelFormat::Indexed1,
        ByteOrder::native(),
        bytes,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use mono_core::raster::Resolution;

    #[test]
    fn width_ten_round_trip_has_zero_padding() {
        let mut src = Raster::new(10, 3, PixelFormat::Indexed8);
        for y in 0..3u32 {
            for x in 0..10u32 {
                src.set(x, y, if (x * 7 + y * 3) % 4 < 2 { 255 } else { 0 });
            }
        }
        // every bit of the padding would be 1 if padding leaked
        src.row_mut(1).fill(255);

        let packed = pack_1bpp(&src).unwrap();
        assert_eq!(packed.format(), PixelFormat::Indexed1);
        assert_eq!(packed.stride(), 2);
        assert_eq!(packed.data().len(), 6);
        for row in packed.rows() {
            assert_eq!(row[1] & 0b0011_1111, 0);
        }
        assert_eq!(packed.row(1), &[0xFF, 0b1100_0000]);

        let back = unpack_1bpp(&packed).unwrap();
        assert_eq!(back.to_packed_vec(), src.to_packed_vec());
    }

    #[test]
    fn msb_is_leftmost_pixel() {
        let mut src = Raster::new(8, 1, PixelFormat::Indexed8);
        src.set(0, 0, 255);
        src.set(7, 0, 200);
        src.set(3, 0, 127);
        assert_eq!(pack_1bpp(&src).unwrap().data(), &[0b1000_0001]);
    }

    #[test]
    fn wrong_formats_are_rejected() {
        let rgb = Raster::new(4, 4, PixelFormat::Rgb24);
        assert!(matches!(
            pack_1bpp(&rgb),
            Err(DitherError::UnsupportedFormat { .. })
        ));
        let gray = Raster::new(4, 4, PixelFormat::Indexed8);
        assert!(matches!(
            unpack_1bpp(&gray),
            Err(DitherError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn size_mismatch_is_reported() {
        let err = packed_from_bytes(9, 3, vec![0; 5]).unwrap_err();
        assert_eq!(
            err,
            DitherError::SizeMismatch {
                expected: 6,
                actual: 5
            }
        );
    }

    #[test]
    fn resolution_survives_packing() {
        let res = Resolution {
            x_dpi: 200.0,
            y_dpi: 200.0,
        };
        let src = Raster::new(5, 5, PixelFormat::Indexed8).with_resolution(Some(res));
        let packed = pack_1bpp(&src).unwrap();
        assert_eq!(packed.resolution(), Some(res));
        assert_eq!(unpack_1bpp(&packed).unwrap().resolution(), Some(res));
    }

    #[test]
    fn empty_raster_packs_to_nothing() {
        let src = Raster::new(0, 4, PixelFormat::Indexed8);
        assert!(pack_1bpp(&src).unwrap().data().is_empty());
    }
}
