use std::path::PathBuf;

use clap::Parser;
use mono_core::config::{ALGORITHM_NAMES, Algorithm, DitherConfig, OutputFormat};

/// monodither : conversion d'images couleur en monochrome par tramage.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Image source (PNG, JPEG, BMP, GIF, TIFF).
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Fichier de sortie. Défaut : `<source>_mono.<pbm|png>` à côté de la source.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Algorithme : floyd-steinberg, bayer2x2, bayer3x3, bayer4x4, bayer8x8, custom.
    #[arg(short, long)]
    pub algorithm: Option<String>,

    /// Fichier de configuration TOML. Défaut : config/default.toml.
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Worker threads for the row-parallel passes (0 = all hardware threads).
    #[arg(long)]
    pub threads: Option<usize>,

    /// Format de sortie : pbm ou png.
    #[arg(long)]
    pub format: Option<String>,

    /// Redimensionner la source à cette largeur avant tramage.
    #[arg(long)]
    pub resize_width: Option<u32>,

    /// Convertir toutes les images d'un dossier (récursif).
    #[arg(long)]
    pub batch_folder: Option<PathBuf>,

    /// Dossier de sortie du lot. Défaut : `<batch-folder>/mono`.
    #[arg(long)]
    pub batch_out: Option<PathBuf>,

    /// Niveau de log : error, warn, info, debug, trace.
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl Cli {
    /// Validate that exactly one of `--input` / `--batch-folder` is given.
    ///
    /// # Errors
    /// Returns an error if zero or both are specified, or if an option of
    /// the other mode is present.
    pub fn validate(&self) -> anyhow::Result<()> {
        match (&self.input, &self.batch_folder) {
            (None, None) => anyhow::bail!(
                "Aucune source spécifiée. Utilisez --input <image> ou --batch-folder <dossier>."
            ),
            (Some(_), Some(_)) => anyhow::bail!(
                "--input et --batch-folder sont exclusifs. Spécifiez l'un OU l'autre."
            ),
            (Some(_), None) if self.batch_out.is_some() => {
                anyhow::bail!("--batch-out n'a de sens qu'avec --batch-folder.")
            }
            (None, Some(_)) if self.output.is_some() => {
                anyhow::bail!("--output n'a de sens qu'avec --input (voir --batch-out).")
            }
            _ => Ok(()),
        }
    }

    /// Apply command-line overrides on top of the file configuration.
    ///
    /// # Errors
    /// Returns an error on an unknown algorithm or output format name.
    pub fn apply_overrides(&self, config: &mut DitherConfig) -> anyhow::Result<()> {
        if let Some(ref name) = self.algorithm {
            config.algorithm = Algorithm::from_name(name).ok_or_else(|| {
                anyhow::anyhow!(
                    "Algorithme inconnu '{name}'. Choix : {}",
                    ALGORITHM_NAMES.join(", ")
                )
            })?;
        }
        if let Some(threads) = self.threads {
            config.threads = threads;
        }
        if let Some(ref name) = self.format {
            config.output_format = OutputFormat::from_name(name)
                .ok_or_else(|| anyhow::anyhow!("Format inconnu '{name}'. Choix : pbm, png"))?;
        }
        if let Some(width) = self.resize_width {
            config.resize_width = Some(width);
        }
        config.clamp_all();
        Ok(())
    }
}
