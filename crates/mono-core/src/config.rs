use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Configuration complète d'une conversion monochrome.
///
/// Sérialisable en TOML. Chaque champ a une valeur par défaut saine.
///
/// # Example
/// ```
/// use mono_core::config::{Algorithm, DitherConfig};
/// let config = DitherConfig::default();
/// assert_eq!(config.algorithm, Algorithm::FloydSteinberg);
/// assert_eq!(config.threads, 0);
/// ```
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct DitherConfig {
    /// Algorithme de tramage.
    pub algorithm: Algorithm,
    /// Custom ordered map, used when `algorithm` is `Custom`.
    pub threshold_map: Option<ThresholdMapSpec>,
    /// Worker threads for the row-parallel passes. 0 = hardware parallelism.
    pub threads: usize,
    /// Format du fichier de sortie.
    pub output_format: OutputFormat,
    /// Optional width to resize the source to before dithering (aspect preserved).
    pub resize_width: Option<u32>,
}

/// Noms acceptés pour [`Algorithm::from_name`].
pub const ALGORITHM_NAMES: &[&str] = &[
    "floyd-steinberg",
    "bayer2x2",
    "bayer3x3",
    "bayer4x4",
    "bayer8x8",
    "custom",
];

/// Dithering algorithm selection.
///
/// # Example
/// ```
/// use mono_core::config::Algorithm;
/// assert_eq!(Algorithm::from_name("Bayer4x4"), Some(Algorithm::Bayer4x4));
/// assert_eq!(Algorithm::from_name("fs"), Some(Algorithm::FloydSteinberg));
/// assert_eq!(Algorithm::from_name("atkinson"), None);
/// ```
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum Algorithm {
    /// Error diffusion, sequential.
    #[default]
    FloydSteinberg,
    /// Ordered, 2×2 Bayer map (base 5).
    Bayer2x2,
    /// Ordered, 3×3 map (base 10).
    Bayer3x3,
    /// Ordered, 4×4 Bayer map (base 17).
    Bayer4x4,
    /// Ordered, 8×8 Bayer map (base 64).
    Bayer8x8,
    /// Ordered, map taken from [`DitherConfig::threshold_map`].
    Custom,
}

impl Algorithm {
    /// Parse a user-facing name, case-insensitive.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "floyd-steinberg" | "floydsteinberg" | "fs" => Some(Self::FloydSteinberg),
            "bayer2x2" | "bayer2" => Some(Self::Bayer2x2),
            "bayer3x3" | "bayer3" => Some(Self::Bayer3x3),
            "bayer4x4" | "bayer4" => Some(Self::Bayer4x4),
            "bayer8x8" | "bayer8" => Some(Self::Bayer8x8),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }

    /// True for the threshold-map family.
    #[must_use]
    pub fn is_ordered(self) -> bool {
        !matches!(self, Self::FloydSteinberg)
    }
}

/// User-supplied threshold matrix.
///
/// Avec `base` : cellules entières mises à l'échelle par `cell × 255 / base`.
/// Sans `base` : poids fractionnaires dans [0, 1].
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct ThresholdMapSpec {
    /// Square matrix, row-major. `None` when the section omits it.
    pub matrix: Option<Vec<Vec<f32>>>,
    /// Integer base; switches the matrix to integer interpretation.
    pub base: Option<u32>,
}

/// Output file encoding.
///
/// # Example
/// ```
/// use mono_core::config::OutputFormat;
/// assert_eq!(OutputFormat::default().extension(), "pbm");
/// ```
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum OutputFormat {
    /// 8-bit grayscale PNG holding only 0 and 255.
    Png,
    /// Binary PBM (`P4`), 1 bit per pixel.
    #[default]
    Pbm,
}

impl OutputFormat {
    /// File extension without the dot.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Pbm => "pbm",
        }
    }

    /// Parse a user-facing name, case-insensitive.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "pbm" => Some(Self::Pbm),
            _ => None,
        }
    }
}

impl DitherConfig {
    /// Clamp all numeric fields to their valid ranges.
    /// Called after TOML deserialization to prevent out-of-range values.
    pub fn clamp_all(&mut self) {
        self.threads = self.threads.min(256);
        self.resize_width = self.resize_width.map(|w| w.clamp(1, 16384));
    }
}

/// Structure TOML intermédiaire pour désérialisation avec valeurs optionnelles.
#[derive(Deserialize)]
struct ConfigFile {
    dither: Option<DitherSection>,
    output: Option<OutputSection>,
}

/// Dither section of the TOML config, all fields optional for partial override.
#[derive(Deserialize)]
struct DitherSection {
    algorithm: Option<Algorithm>,
    threads: Option<usize>,
    threshold_map: Option<ThresholdMapSpec>,
}

/// Output section of the TOML config, all fields optional.
#[derive(Deserialize)]
struct OutputSection {
    format: Option<OutputFormat>,
    resize_width: Option<u32>,
}

/// Parse TOML text and merge it over the defaults.
///
/// # Errors
/// Returns an error if the text is not valid TOML for this schema.
///
/// # Example
/// ```
/// use mono_core::config::{parse_config, Algorithm};
/// let config = parse_config("[dither]\nalgorithm = \"Bayer8x8\"\n").unwrap();
/// assert_eq!(config.algorithm, Algorithm::Bayer8x8);
/// ```
pub fn parse_config(content: &str) -> Result<DitherConfig> {
    let file: ConfigFile = toml::from_str(content).context("Erreur de parsing TOML")?;

    let mut config = DitherConfig::default();

    if let Some(d) = file.dither {
        if let Some(v) = d.algorithm {
            config.algorithm = v;
        }
        if let Some(v) = d.threads {
            config.threads = v;
        }
        if let Some(v) = d.threshold_map {
            config.threshold_map = Some(v);
        }
    }

    if let Some(o) = file.output {
        if let Some(v) = o.format {
            config.output_format = v;
        }
        if let Some(v) = o.resize_width {
            config.resize_width = Some(v);
        }
    }

    config.clamp_all();
    Ok(config)
}

/// Charge un fichier TOML et fusionne avec les valeurs par défaut.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
///
/// # Example
/// ```no_run
/// use mono_core::config::load_config;
/// use std::path::Path;
/// let config = load_config(Path::new("config/default.toml")).unwrap();
/// ```
pub fn load_config(path: &Path) -> Result<DitherConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {}", path.display()))?;
    let config = parse_config(&content)
        .with_context(|| format!("Configuration invalide dans {}", path.display()))?;
    log::debug!("Config chargée depuis {} : {config:?}", path.display());
    Ok(config)
}
