//! Construction et validation des matrices de seuils du tramage ordonné.
//!
//! A [`ThresholdMap`] is an immutable square matrix whose cells are already
//! scaled into 0–255. It is built once per ordered engine and shared
//! read-only (behind an `Arc`) by every image that engine processes.

use mono_core::error::DitherError;

/// Matrice de Bayer 2×2, base 5.
pub const BAYER_2X2: &[&[u32]] = &[&[1, 3], &[4, 2]];

/// Matrice 3×3, base 10.
pub const BAYER_3X3: &[&[u32]] = &[&[3, 7, 4], &[6, 1, 9], &[2, 8, 5]];

/// Matrice de Bayer 4×4, base 17.
pub const BAYER_4X4: &[&[u32]] = &[
    &[1, 9, 3, 11],
    &[13, 5, 15, 7],
    &[4, 12, 2, 10],
    &[16, 8, 14, 6],
];

/// Matrice de Bayer 8×8, base 64.
pub const BAYER_8X8: &[&[u32]] = &[
    &[1, 49, 13, 61, 4, 52, 16, 64],
    &[33, 17, 45, 29, 36, 20, 48, 32],
    &[9, 57, 5, 53, 12, 60, 8, 56],
    &[41, 25, 37, 21, 44, 28, 40, 24],
    &[3, 51, 15, 63, 2, 50, 14, 62],
    &[35, 19, 47, 31, 34, 18, 46, 30],
    &[11, 59, 7, 55, 10, 58, 6, 54],
    &[43, 27, 39, 23, 42, 26, 38, 22],
];

/// Canonical preset sizes. Each pairs a matrix with its base, used verbatim.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BayerSize {
    /// 2×2, base 5.
    X2,
    /// 3×3, base 10.
    X3,
    /// 4×4, base 17.
    X4,
    /// 8×8, base 64.
    X8,
}

impl BayerSize {
    /// Integer matrix of the preset.
    #[must_use]
    pub fn matrix(self) -> &'static [&'static [u32]] {
        match self {
            Self::X2 => BAYER_2X2,
            Self::X3 => BAYER_3X3,
            Self::X4 => BAYER_4X4,
            Self::X8 => BAYER_8X8,
        }
    }

    /// Base the integer cells are divided by.
    #[must_use]
    pub fn base(self) -> u32 {
        match self {
            Self::X2 => 5,
            Self::X3 => 10,
            Self::X4 => 17,
            Self::X8 => 64,
        }
    }
}

/// Square threshold matrix, cells in 0–255, row-major.
///
/// # Example
/// ```
/// use mono_dither::threshold::{BayerSize, ThresholdMap};
/// let map = ThresholdMap::bayer(BayerSize::X2);
/// assert_eq!(map.size(), 2);
/// assert_eq!(map.rows().collect::<Vec<_>>(), vec![&[51u8, 153][..], &[204u8, 102][..]]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThresholdMap {
    size: usize,
    cells: Vec<u8>,
}

impl ThresholdMap {
    /// Build from fractional weights in [0, 1]; each cell becomes
    /// `weight × 255` truncated toward zero.
    ///
    /// # Errors
    /// `InvalidThresholdMap` if the matrix is empty or not square.
    ///
    /// # Example
    /// ```
    /// use mono_dither::threshold::ThresholdMap;
    /// let map = ThresholdMap::from_fractions(&[[0.5f32, 0.5], [0.5, 0.5]]).unwrap();
    /// assert!(map.rows().flatten().all(|&t| t == 127));
    /// assert!(ThresholdMap::from_fractions::<[f32; 0]>(&[]).is_err());
    /// ```
    pub fn from_fractions<R: AsRef<[f32]>>(rows: &[R]) -> Result<Self, DitherError> {
        Self::build(rows, |weight: f32| (weight * 255.0) as i64)
    }

    /// Build from positive integers and an explicit base; each cell becomes
    /// `cell × 255 / base` (integer division).
    ///
    /// # Errors
    /// `InvalidThresholdMap` if the matrix is empty, not square, or `base` is 0.
    ///
    /// # Example
    /// ```
    /// use mono_dither::threshold::ThresholdMap;
    /// let map = ThresholdMap::from_integers(&[[1u32, 3], [4, 2]], 5).unwrap();
    /// assert_eq!(map.get(1, 0), 153);
    /// assert!(ThresholdMap::from_integers(&[[1u32, 2, 3], [4, 5, 6]], 7).is_err());
    /// ```
    pub fn from_integers<R: AsRef<[u32]>>(rows: &[R], base: u32) -> Result<Self, DitherError> {
        if base == 0 {
            return Err(DitherError::InvalidThresholdMap(
                "la base doit être strictement positive".into(),
            ));
        }
        Self::build(rows, |cell: u32| {
            (u64::from(cell) * 255 / u64::from(base)).min(255) as i64
        })
    }

    /// One of the canonical presets.
    #[must_use]
    pub fn bayer(size: BayerSize) -> Self {
        let matrix = size.matrix();
        let base = u64::from(size.base());
        let cells = matrix
            .iter()
            .flat_map(|row| row.iter())
            .map(|&cell| (u64::from(cell) * 255 / base).min(255) as u8)
            .collect();
        Self {
            size: matrix.len(),
            cells,
        }
    }

    /// Validation and scaling shared by both input forms.
    fn build<T: Copy, R: AsRef<[T]>>(
        rows: &[R],
        scale: impl Fn(T) -> i64,
    ) -> Result<Self, DitherError> {
        let size = rows.len();
        if size == 0 {
            return Err(DitherError::InvalidThresholdMap("matrice vide".into()));
        }
        if let Some((y, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.as_ref().len() != size)
        {
            return Err(DitherError::InvalidThresholdMap(format!(
                "matrice non carrée : {size} lignes mais la ligne {y} a {} colonnes",
                row.as_ref().len()
            )));
        }

        let cells = rows
            .iter()
            .flat_map(|row| row.as_ref().iter())
            .map(|&cell| scale(cell).clamp(0, 255) as u8)
            .collect();
        Ok(Self { size, cells })
    }

    /// Side length of the square matrix.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Threshold applied to image pixel `(x, y)`, tiled over the image.
    #[inline(always)]
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.cells[(y % self.size) * self.size + x % self.size]
    }

    /// Matrix row used for image row `y`.
    #[inline]
    #[must_use]
    pub fn row_for(&self, y: usize) -> &[u8] {
        let start = (y % self.size) * self.size;
        &self.cells[start..start + self.size]
    }

    /// Iterate over the matrix rows.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.cells.chunks_exact(self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_match_their_integer_form() {
        for size in [BayerSize::X2, BayerSize::X3, BayerSize::X4, BayerSize::X8] {
            let built = ThresholdMap::from_integers(size.matrix(), size.base()).unwrap();
            assert_eq!(built, ThresholdMap::bayer(size), "{size:?}");
        }
    }

    #[test]
    fn presets_are_square() {
        for size in [BayerSize::X2, BayerSize::X3, BayerSize::X4, BayerSize::X8] {
            let m = size.matrix();
            assert!(m.iter().all(|row| row.len() == m.len()), "{size:?}");
        }
    }

    #[test]
    fn bayer_2x2_cells() {
        let map = ThresholdMap::bayer(BayerSize::X2);
        assert_eq!(map.get(0, 0), 51);
        assert_eq!(map.get(1, 0), 153);
        assert_eq!(map.get(0, 1), 204);
        assert_eq!(map.get(1, 1), 102);
        // tiling
        assert_eq!(map.get(2, 2), 51);
        assert_eq!(map.get(3, 2), 153);
    }

    #[test]
    fn bayer_8x8_extremes() {
        let map = ThresholdMap::bayer(BayerSize::X8);
        assert_eq!(map.size(), 8);
        assert_eq!(map.get(0, 0), 3); // 1 * 255 / 64
        assert_eq!(map.get(7, 0), 255); // 64 * 255 / 64
    }

    #[test]
    fn half_weights_give_127() {
        let half = vec![vec![0.5f32; 4]; 4];
        let map = ThresholdMap::from_fractions(&half).unwrap();
        assert_eq!(map.size(), 4);
        assert!(map.rows().flatten().all(|&t| t == 127));
    }

    #[test]
    fn non_square_is_rejected() {
        let two_by_three = vec![vec![0.1f32, 0.2, 0.3], vec![0.4, 0.5, 0.6]];
        assert!(matches!(
            ThresholdMap::from_fractions(&two_by_three),
            Err(DitherError::InvalidThresholdMap(_))
        ));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        // First row has the right length, the second does not.
        let ragged: Vec<Vec<u32>> = vec![vec![1, 2], vec![3]];
        assert!(ThresholdMap::from_integers(&ragged, 4).is_err());
    }

    #[test]
    fn empty_is_rejected() {
        let empty: Vec<Vec<f32>> = Vec::new();
        assert!(matches!(
            ThresholdMap::from_fractions(&empty),
            Err(DitherError::InvalidThresholdMap(_))
        ));
    }

    #[test]
    fn zero_base_is_rejected() {
        assert!(ThresholdMap::from_integers(&[[1u32]], 0).is_err());
    }

    #[test]
    fn out_of_range_cells_are_clamped() {
        let map = ThresholdMap::from_fractions(&[[-0.5f32, 2.0], [0.0, 1.0]]).unwrap();
        assert_eq!(map.rows().flatten().copied().collect::<Vec<_>>(), vec![0, 255, 0, 255]);
        let map = ThresholdMap::from_integers(&[[10u32]], 5).unwrap();
        assert_eq!(map.get(0, 0), 255);
    }
}
