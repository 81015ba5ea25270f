use crate::raster::Raster;

/// Réduit un buffer de travail 8 bits en valeurs binaires {0, 255}, en place.
///
/// Implémenté par : `FloydSteinberg`, `OrderedDither`, et l'enum `Engine`
/// qui choisit entre les deux à la construction.
///
/// # Example
/// ```
/// use mono_core::raster::{PixelFormat, Raster};
/// use mono_core::traits::Quantizer;
///
/// struct Threshold128;
/// impl Quantizer for Threshold128 {
///     fn quantize(&self, buffer: &mut Raster) {
///         for y in 0..buffer.height() {
///             for px in buffer.row_mut(y) {
///                 *px = if *px < 128 { 0 } else { 255 };
///             }
///         }
///     }
///     fn name(&self) -> &'static str { "threshold-128" }
/// }
///
/// let mut buf = Raster::new(2, 1, PixelFormat::Indexed8);
/// buf.set(1, 0, 130);
/// Threshold128.quantize(&mut buf);
/// assert_eq!(buf.row(0), &[0, 255]);
/// ```
pub trait Quantizer: Send + Sync {
    /// Quantize every pixel of an `Indexed8` buffer to 0 or 255.
    ///
    /// CONTRAT : le buffer appartient exclusivement à l'appelant pendant
    /// l'appel ; aucun autre effet de bord.
    fn quantize(&self, buffer: &mut Raster);

    /// Nom lisible pour les logs.
    fn name(&self) -> &'static str;
}
