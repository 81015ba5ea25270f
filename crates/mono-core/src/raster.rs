use crate::error::DitherError;

/// Pixel layout tag of a [`Raster`].
///
/// Fermé : seuls ces cinq formats existent. `Indexed1` n'est produit que par
/// l'étape d'encodage 1 bit ; le normaliseur le refuse.
///
/// # Example
/// ```
/// use mono_core::raster::PixelFormat;
/// assert_eq!(PixelFormat::Rgb24.bytes_per_pixel(), 3);
/// assert_eq!(PixelFormat::Indexed1.bits_per_pixel(), 1);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 8-bit grayscale / palette index, one byte per pixel.
    Indexed8,
    /// 1 bit per pixel, 8 pixels per byte, most significant bit first.
    Indexed1,
    /// 24-bit RGB, no alpha.
    Rgb24,
    /// 32-bit RGB with straight alpha.
    Rgba32,
    /// 32-bit RGB, fourth byte unused.
    Rgbx32,
}

/// Position of each channel inside one pixel's bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelOffsets {
    /// Red byte offset.
    pub r: usize,
    /// Green byte offset.
    pub g: usize,
    /// Blue byte offset.
    pub b: usize,
    /// Alpha byte offset, `None` when the format is opaque.
    pub a: Option<usize>,
}

/// Static description of a [`PixelFormat`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FormatInfo {
    /// Storage size of one pixel in bits.
    pub bits_per_pixel: usize,
    /// Channel layout when the packed pixel word is stored least-significant byte first.
    pub little_endian: Option<ChannelOffsets>,
    /// Channel layout when the packed pixel word is stored most-significant byte first.
    pub big_endian: Option<ChannelOffsets>,
}

const GRAY_INFO: FormatInfo = FormatInfo {
    bits_per_pixel: 8,
    little_endian: None,
    big_endian: None,
};

const MONO_INFO: FormatInfo = FormatInfo {
    bits_per_pixel: 1,
    little_endian: None,
    big_endian: None,
};

// Mot 0xRRGGBB : LE = B G R, BE = R G B.
const RGB24_INFO: FormatInfo = FormatInfo {
    bits_per_pixel: 24,
    little_endian: Some(ChannelOffsets { r: 2, g: 1, b: 0, a: None }),
    big_endian: Some(ChannelOffsets { r: 0, g: 1, b: 2, a: None }),
};

// Mot 0xAARRGGBB : LE = B G R A, BE = A R G B.
const RGBA32_INFO: FormatInfo = FormatInfo {
    bits_per_pixel: 32,
    little_endian: Some(ChannelOffsets { r: 2, g: 1, b: 0, a: Some(3) }),
    big_endian: Some(ChannelOffsets { r: 1, g: 2, b: 3, a: Some(0) }),
};

// Same word as RGBA32, the X byte is never read.
const RGBX32_INFO: FormatInfo = FormatInfo {
    bits_per_pixel: 32,
    little_endian: Some(ChannelOffsets { r: 2, g: 1, b: 0, a: None }),
    big_endian: Some(ChannelOffsets { r: 1, g: 2, b: 3, a: None }),
};

impl PixelFormat {
    /// Compile-time format table lookup.
    #[must_use]
    pub const fn info(self) -> FormatInfo {
        match self {
            Self::Indexed8 => GRAY_INFO,
            Self::Indexed1 => MONO_INFO,
            Self::Rgb24 => RGB24_INFO,
            Self::Rgba32 => RGBA32_INFO,
            Self::Rgbx32 => RGBX32_INFO,
        }
    }

    /// Storage size of one pixel in bits.
    #[must_use]
    pub const fn bits_per_pixel(self) -> usize {
        self.info().bits_per_pixel
    }

    /// Storage size of one pixel in whole bytes (0 for `Indexed1`).
    #[must_use]
    pub const fn bytes_per_pixel(self) -> usize {
        self.info().bits_per_pixel / 8
    }

    /// Channel offsets for a given byte order, `None` for single-channel formats.
    ///
    /// # Example
    /// ```
    /// use mono_core::raster::{ByteOrder, PixelFormat};
    /// let le = PixelFormat::Rgba32.channels(ByteOrder::LittleEndian).unwrap();
    /// assert_eq!((le.b, le.g, le.r, le.a), (0, 1, 2, Some(3)));
    /// let be = PixelFormat::Rgba32.channels(ByteOrder::BigEndian).unwrap();
    /// assert_eq!(be.a, Some(0));
    /// ```
    #[must_use]
    pub const fn channels(self, order: ByteOrder) -> Option<ChannelOffsets> {
        match order {
            ByteOrder::LittleEndian => self.info().little_endian,
            ByteOrder::BigEndian => self.info().big_endian,
        }
    }
}

/// Byte order of the packed pixel word inside a raster row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    /// Least-significant byte first (B G R A for a 32-bit ARGB word).
    LittleEndian,
    /// Most-significant byte first (A R G B for a 32-bit ARGB word).
    BigEndian,
}

impl ByteOrder {
    /// Byte order of the running platform.
    ///
    /// # Example
    /// ```
    /// use mono_core::raster::ByteOrder;
    /// let order = ByteOrder::native();
    /// assert_eq!(order == ByteOrder::LittleEndian, cfg!(target_endian = "little"));
    /// ```
    #[must_use]
    pub const fn native() -> Self {
        if cfg!(target_endian = "little") {
            Self::LittleEndian
        } else {
            Self::BigEndian
        }
    }
}

/// Physical resolution metadata, copied through the pipeline untouched.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Resolution {
    /// Horizontal dots per inch.
    pub x_dpi: f32,
    /// Vertical dots per inch.
    pub y_dpi: f32,
}

/// Minimum number of bytes needed to hold one row of `width` pixels.
///
/// # Example
/// ```
/// use mono_core::raster::{min_stride, PixelFormat};
/// assert_eq!(min_stride(10, PixelFormat::Indexed1), 2);
/// assert_eq!(min_stride(10, PixelFormat::Rgb24), 30);
/// ```
#[must_use]
pub fn min_stride(width: u32, format: PixelFormat) -> usize {
    (width as usize * format.bits_per_pixel()).div_ceil(8)
}

/// Row stride padded to a 4-byte boundary.
///
/// # Example
/// ```
/// use mono_core::raster::{aligned_stride, PixelFormat};
/// assert_eq!(aligned_stride(3, PixelFormat::Rgb24), 12);
/// assert_eq!(aligned_stride(5, PixelFormat::Indexed8), 8);
/// ```
#[must_use]
pub fn aligned_stride(width: u32, format: PixelFormat) -> usize {
    min_stride(width, format).next_multiple_of(4)
}

/// Raster 2D row-major adossé à un buffer d'octets contigu.
///
/// Invariants : `stride >= min_stride(width, format)` et
/// `data.len() == height × stride`. Les octets de padding en fin de ligne
/// ne portent aucun pixel.
///
/// # Example
/// ```
/// use mono_core::raster::{PixelFormat, Raster};
/// let r = Raster::new(5, 2, PixelFormat::Indexed8);
/// assert_eq!(r.stride(), 8);
/// assert_eq!(r.data().len(), 16);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Raster {
    width: u32,
    height: u32,
    stride: usize,
    format: PixelFormat,
    byte_order: ByteOrder,
    resolution: Option<Resolution>,
    data: Vec<u8>,
}

impl Raster {
    /// Zero-filled raster with a 4-byte aligned stride and native byte order.
    #[must_use]
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        let stride = aligned_stride(width, format);
        Self {
            width,
            height,
            stride,
            format,
            byte_order: ByteOrder::native(),
            resolution: None,
            data: vec![0u8; stride * height as usize],
        }
    }

    /// Zero-filled raster whose stride is exactly one row of pixels.
    ///
    /// # Example
    /// ```
    /// use mono_core::raster::{PixelFormat, Raster};
    /// let r = Raster::new_packed(10, 3, PixelFormat::Indexed1);
    /// assert_eq!(r.stride(), 2);
    /// ```
    #[must_use]
    pub fn new_packed(width: u32, height: u32, format: PixelFormat) -> Self {
        let stride = min_stride(width, format);
        Self {
            width,
            height,
            stride,
            format,
            byte_order: ByteOrder::native(),
            resolution: None,
            data: vec![0u8; stride * height as usize],
        }
    }

    /// Wrap an existing byte buffer.
    ///
    /// # Errors
    /// `InvalidDimensions` if the row size overflows, `InvalidStride` if
    /// `stride` cannot hold one row, `SizeMismatch` if `data.len()` is not
    /// `height × stride`.
    ///
    /// # Example
    /// ```
    /// use mono_core::raster::{ByteOrder, PixelFormat, Raster};
    /// let r = Raster::from_raw(2, 1, 8, PixelFormat::Rgb24, ByteOrder::BigEndian, vec![0; 8]);
    /// assert!(r.is_ok());
    /// let bad = Raster::from_raw(2, 1, 4, PixelFormat::Rgb24, ByteOrder::BigEndian, vec![0; 4]);
    /// assert!(bad.is_err());
    /// ```
    pub fn from_raw(
        width: u32,
        height: u32,
        stride: usize,
        format: PixelFormat,
        byte_order: ByteOrder,
        data: Vec<u8>,
    ) -> Result<Self, DitherError> {
        let min = (width as usize)
            .checked_mul(format.bits_per_pixel())
            .map(|bits| bits.div_ceil(8))
            .ok_or(DitherError::InvalidDimensions { width, height })?;
        if stride < min {
            return Err(DitherError::InvalidStride { stride, min });
        }
        let expected = stride
            .checked_mul(height as usize)
            .ok_or(DitherError::InvalidDimensions { width, height })?;
        if data.len() != expected {
            return Err(DitherError::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            stride,
            format,
            byte_order,
            resolution: None,
            data,
        })
    }

    /// Attach resolution metadata.
    #[must_use]
    pub fn with_resolution(mut self, resolution: Option<Resolution>) -> Self {
        self.resolution = resolution;
        self
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes between the starts of consecutive rows.
    #[must_use]
    pub fn stride(&self) -> usize {
        self.stride
    }

    #[must_use]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    #[must_use]
    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    #[must_use]
    pub fn resolution(&self) -> Option<Resolution> {
        self.resolution
    }

    /// Whole backing buffer, padding included.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable backing buffer, padding included.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Pixel bytes of row `y`, padding excluded.
    ///
    /// # Panics
    /// Panics if `y >= height`.
    #[inline]
    #[must_use]
    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.stride;
        &self.data[start..start + self.row_len()]
    }

    /// Mutable pixel bytes of row `y`, padding excluded.
    ///
    /// # Panics
    /// Panics if `y >= height`.
    #[inline]
    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let start = y as usize * self.stride;
        let len = self.row_len();
        &mut self.data[start..start + len]
    }

    /// Iterate over the pixel bytes of every row, top to bottom.
    ///
    /// # Example
    /// ```
    /// use mono_core::raster::{PixelFormat, Raster};
    /// let r = Raster::new(3, 4, PixelFormat::Indexed8);
    /// assert_eq!(r.rows().count(), 4);
    /// assert!(r.rows().all(|row| row.len() == 3));
    /// ```
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        let len = self.row_len();
        // chunks() on an empty buffer yields nothing, which is what a 0-row raster needs.
        self.data
            .chunks(self.stride.max(1))
            .take(self.height as usize)
            .map(move |row| &row[..len])
    }

    /// Number of meaningful bytes per row.
    #[inline]
    #[must_use]
    pub fn row_len(&self) -> usize {
        min_stride(self.width, self.format)
    }

    /// Read one byte-sized pixel (Indexed8 only).
    ///
    /// # Example
    /// ```
    /// use mono_core::raster::{PixelFormat, Raster};
    /// let mut r = Raster::new(2, 2, PixelFormat::Indexed8);
    /// r.set(1, 1, 200);
    /// assert_eq!(r.get(1, 1), 200);
    /// ```
    #[inline(always)]
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> u8 {
        debug_assert!(self.format == PixelFormat::Indexed8, "get() on non-8bpp raster");
        debug_assert!(x < self.width && y < self.height, "pixel out of bounds");
        self.data[y as usize * self.stride + x as usize]
    }

    /// Write one byte-sized pixel (Indexed8 only).
    #[inline(always)]
    pub fn set(&mut self, x: u32, y: u32, value: u8) {
        debug_assert!(self.format == PixelFormat::Indexed8, "set() on non-8bpp raster");
        debug_assert!(x < self.width && y < self.height, "pixel out of bounds");
        self.data[y as usize * self.stride + x as usize] = value;
    }

    /// Tight copy of the pixel bytes, row padding removed.
    #[must_use]
    pub fn to_packed_vec(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.row_len() * self.height as usize);
        for row in self.rows() {
            out.extend_from_slice(row);
        }
        out
    }
}
