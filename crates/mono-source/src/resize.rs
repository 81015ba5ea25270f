use anyhow::{Context, Result, bail};
use fast_image_resize::images::Image;
use fast_image_resize::{PixelType, ResizeOptions, Resizer as FirResizer};

/// Resizer réutilisable wrappant fast_image_resize.
///
/// Travaille sur des buffers serrés (sans padding de ligne), 1, 3 ou 4
/// octets par pixel.
///
/// # Example
/// ```
/// use mono_source::resize::Resizer;
/// let r = Resizer::new();
/// ```
pub struct Resizer {
    inner: FirResizer,
    options: ResizeOptions,
    /// Scratch copy of the source (fast_image_resize wants `&mut` on it).
    src_buf: Vec<u8>,
}

impl Resizer {
    /// Create a new resizer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: FirResizer::new(),
            options: ResizeOptions::new(),
            src_buf: Vec::new(),
        }
    }

    /// Resize a tight pixel buffer of `channels` bytes per pixel.
    ///
    /// # Errors
    /// Returns an error if `channels` is not 1, 3 or 4, if a dimension is
    /// zero, or if the buffer does not match the source dimensions.
    ///
    /// # Example
    /// ```
    /// use mono_source::resize::Resizer;
    /// let mut r = Resizer::new();
    /// let src = vec![128u8; 4 * 4];
    /// let dst = r.resize(&src, (4, 4), (2, 2), 1).unwrap();
    /// assert_eq!(dst.len(), 4);
    /// assert!(dst.iter().all(|v| (127..=129).contains(v)));
    /// ```
    pub fn resize(
        &mut self,
        src: &[u8],
        (src_w, src_h): (u32, u32),
        (dst_w, dst_h): (u32, u32),
        channels: usize,
    ) -> Result<Vec<u8>> {
        let pixel_type = match channels {
            1 => PixelType::U8,
            3 => PixelType::U8x3,
            4 => PixelType::U8x4,
            n => bail!("Nombre de canaux non supporté pour le redimensionnement : {n}"),
        };
        if dst_w == 0 || dst_h == 0 {
            bail!("Dimensions cibles invalides : {dst_w}×{dst_h}");
        }
        if src_w == dst_w && src_h == dst_h {
            return Ok(src.to_vec());
        }

        // R1: forced copy by fast_image_resize API (requires &mut on source)
        self.src_buf.clear();
        self.src_buf.extend_from_slice(src);

        let src_image = Image::from_slice_u8(src_w, src_h, &mut self.src_buf, pixel_type)
            .context("Invalid source dimensions")?;

        let mut dst = vec![0u8; dst_w as usize * dst_h as usize * channels];
        let mut dst_image = Image::from_slice_u8(dst_w, dst_h, &mut dst, pixel_type)
            .context("Invalid destination dimensions")?;

        self.inner
            .resize(&src_image, &mut dst_image, Some(&self.options))
            .context("Resize failed")?;

        Ok(dst)
    }
}

impl Default for Resizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Height matching `target_width` with the source aspect ratio, at least 1.
///
/// # Example
/// ```
/// use mono_source::resize::scaled_height;
/// assert_eq!(scaled_height(1920, 1080, 384), 216);
/// assert_eq!(scaled_height(1000, 1, 10), 1);
/// ```
#[must_use]
pub fn scaled_height(width: u32, height: u32, target_width: u32) -> u32 {
    if width == 0 {
        return height.max(1);
    }
    let h = (u64::from(height) * u64::from(target_width) + u64::from(width) / 2) / u64::from(width);
    (h as u32).max(1)
}
