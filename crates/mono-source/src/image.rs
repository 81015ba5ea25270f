use std::path::Path;

use anyhow::{Context, Result};
use image::{DynamicImage, GrayImage, ImageBuffer, RgbImage, RgbaImage};
use mono_core::raster::{ByteOrder, PixelFormat, Raster};

use crate::resize::{Resizer, scaled_height};

/// Charge une image depuis le disque en raster couleur natif.
///
/// Niveaux de gris 8 bits → `Indexed8`, RGB 8 bits → `Rgb24`, tout le reste
/// passe par RGBA 8 bits → `Rgba32`.
///
/// # Errors
/// Returns an error if the file cannot be read or decoded.
///
/// # Example
/// ```no_run
/// use mono_source::load_raster;
/// use std::path::Path;
/// let raster = load_raster(Path::new("photo.png")).unwrap();
/// ```
pub fn load_raster(path: &Path) -> Result<Raster> {
    let img = open(path)?;
    Ok(raster_from_image(&img))
}

/// Charge puis redimensionne à `target_width` (ratio conservé).
///
/// # Errors
/// Returns an error if the file cannot be decoded or the resize fails.
///
/// # Example
/// ```no_run
/// use mono_source::load_raster_resized;
/// use std::path::Path;
/// let raster = load_raster_resized(Path::new("photo.jpg"), 640).unwrap();
/// assert_eq!(raster.width(), 640);
/// ```
pub fn load_raster_resized(path: &Path, target_width: u32) -> Result<Raster> {
    let img = open(path)?;
    let img = resize_image(&img, target_width)?;
    Ok(raster_from_image(&img))
}

fn open(path: &Path) -> Result<DynamicImage> {
    let img = image::open(path)
        .with_context(|| format!("Impossible de charger {}", path.display()))?;
    log::debug!(
        "{} : {}×{} {:?}",
        path.display(),
        img.width(),
        img.height(),
        img.color()
    );
    Ok(img)
}

fn resize_image(img: &DynamicImage, target_width: u32) -> Result<DynamicImage> {
    let (w, h) = (img.width(), img.height());
    let target_height = scaled_height(w, h, target_width);
    if (w, h) == (target_width, target_height) {
        return Ok(img.clone());
    }
    let mut resizer = Resizer::new();
    let dims = (target_width, target_height);

    let resized = match img {
        DynamicImage::ImageLuma8(gray) => {
            let data = resizer.resize(gray.as_raw(), (w, h), dims, 1)?;
            let buf: GrayImage = ImageBuffer::from_raw(dims.0, dims.1, data)
                .context("Buffer redimensionné incohérent")?;
            DynamicImage::ImageLuma8(buf)
        }
        DynamicImage::ImageRgb8(rgb) => {
            let data = resizer.resize(rgb.as_raw(), (w, h), dims, 3)?;
            let buf: RgbImage = ImageBuffer::from_raw(dims.0, dims.1, data)
                .context("Buffer redimensionné incohérent")?;
            DynamicImage::ImageRgb8(buf)
        }
        other => {
            let rgba = other.to_rgba8();
            let data = resizer.resize(rgba.as_raw(), (w, h), dims, 4)?;
            let buf: RgbaImage = ImageBuffer::from_raw(dims.0, dims.1, data)
                .context("Buffer redimensionné incohérent")?;
            DynamicImage::ImageRgba8(buf)
        }
    };
    log::debug!("Redimensionné {w}×{h} → {}×{}", dims.0, dims.1);
    Ok(resized)
}

/// Convert a decoded image into a raster in the platform's byte order.
///
/// # Example
/// ```
/// use image::{DynamicImage, RgbImage};
/// use mono_core::raster::PixelFormat;
/// use mono_source::raster_from_image;
///
/// let img = DynamicImage::ImageRgb8(RgbImage::new(3, 2));
/// let raster = raster_from_image(&img);
/// assert_eq!(raster.format(), PixelFormat::Rgb24);
/// assert_eq!((raster.width(), raster.height()), (3, 2));
/// ```
#[must_use]
pub fn raster_from_image(img: &DynamicImage) -> Raster {
    match img {
        DynamicImage::ImageLuma8(gray) => {
            from_rgb_order(gray.width(), gray.height(), PixelFormat::Indexed8, gray.as_raw())
        }
        DynamicImage::ImageRgb8(rgb) => {
            from_rgb_order(rgb.width(), rgb.height(), PixelFormat::Rgb24, rgb.as_raw())
        }
        other => {
            let rgba = other.to_rgba8();
            from_rgb_order(rgba.width(), rgba.height(), PixelFormat::Rgba32, rgba.as_raw())
        }
    }
}

/// Copy tight R,G,B[,A] pixels into a padded raster, reordering the
/// channels to the native layout.
fn from_rgb_order(width: u32, height: u32, format: PixelFormat, src: &[u8]) -> Raster {
    let mut raster = Raster::new(width, height, format);
    if width == 0 || height == 0 {
        return raster;
    }
    let bpp = format.bytes_per_pixel();
    let offsets = format.channels(ByteOrder::native());

    for (y, src_row) in src.chunks_exact(width as usize * bpp).enumerate() {
        let dst_row = raster.row_mut(y as u32);
        match offsets {
            None => dst_row.copy_from_slice(src_row),
            Some(ch) => {
                for (d, s) in dst_row.chunks_exact_mut(bpp).zip(src_row.chunks_exact(bpp)) {
                    d[ch.r] = s[0];
                    d[ch.g] = s[1];
                    d[ch.b] = s[2];
                    if let Some(a) = ch.a {
                        d[a] = s[3];
                    }
                }
            }
        }
    }
    raster
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb, Rgba};

    fn pixel(raster: &Raster, x: u32, y: u32) -> &[u8] {
        let bpp = raster.format().bytes_per_pixel();
        &raster.row(y)[x as usize * bpp..(x as usize + 1) * bpp]
    }

    #[test]
    fn rgb_channels_follow_native_order() {
        let mut img = RgbImage::new(2, 1);
        img.put_pixel(1, 0, Rgb([10, 20, 30]));
        let raster = raster_from_image(&DynamicImage::ImageRgb8(img));
        assert_eq!(raster.byte_order(), ByteOrder::native());

        let ch = PixelFormat::Rgb24.channels(raster.byte_order()).unwrap();
        let px = pixel(&raster, 1, 0);
        assert_eq!((px[ch.r], px[ch.g], px[ch.b]), (10, 20, 30));
    }

    #[test]
    fn rgba_keeps_alpha() {
        let mut img = RgbaImage::new(1, 1);
        img.put_pixel(0, 0, Rgba([1, 2, 3, 128]));
        let raster = raster_from_image(&DynamicImage::ImageRgba8(img));
        assert_eq!(raster.format(), PixelFormat::Rgba32);

        let ch = PixelFormat::Rgba32.channels(raster.byte_order()).unwrap();
        let px = pixel(&raster, 0, 0);
        assert_eq!(px[ch.a.unwrap()], 128);
        assert_eq!(px[ch.b], 3);
    }

    #[test]
    fn gray_maps_to_indexed8_with_padding() {
        let mut img = GrayImage::new(5, 2);
        img.put_pixel(4, 1, Luma([77]));
        let raster = raster_from_image(&DynamicImage::ImageLuma8(img));
        assert_eq!(raster.format(), PixelFormat::Indexed8);
        assert_eq!(raster.stride(), 8);
        assert_eq!(raster.get(4, 1), 77);
    }

    #[test]
    fn other_color_types_go_through_rgba() {
        let img = DynamicImage::ImageLumaA8(image::GrayAlphaImage::new(3, 3));
        assert_eq!(raster_from_image(&img).format(), PixelFormat::Rgba32);
    }

    #[test]
    fn load_png_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.png");
        let mut img = RgbImage::new(4, 3);
        img.put_pixel(0, 0, Rgb([255, 0, 0]));
        img.save(&path).unwrap();

        let raster = load_raster(&path).unwrap();
        assert_eq!((raster.width(), raster.height()), (4, 3));
        let ch = PixelFormat::Rgb24.channels(raster.byte_order()).unwrap();
        assert_eq!(pixel(&raster, 0, 0)[ch.r], 255);
    }

    #[test]
    fn load_resized_preserves_aspect() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wide.png");
        GrayImage::from_pixel(40, 20, Luma([90])).save(&path).unwrap();

        let raster = load_raster_resized(&path, 10).unwrap();
        assert_eq!((raster.width(), raster.height()), (10, 5));
        assert!((89..=91).contains(&raster.get(3, 2)));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = load_raster(Path::new("/nonexistent/none.png")).unwrap_err();
        assert!(err.to_string().contains("none.png"));
    }
}
