use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use mono_core::config::DitherConfig;
use mono_dither::MonoDitherer;
use mono_source::scan_images;

use crate::convert::convert_with;

/// Bilan d'un traitement par lots.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Output files written.
    pub converted: Vec<PathBuf>,
    /// Inputs that failed, with the error message.
    pub failed: Vec<(PathBuf, String)>,
}

/// Convertit toutes les images de `folder` vers `out_dir`.
///
/// L'arborescence relative est conservée ; `out_dir` vaut `<folder>/mono`
/// par défaut et n'est jamais re-scanné. Un échec sur un fichier est
/// journalisé puis ignoré.
///
/// # Errors
/// Retourne une erreur si le dossier ne peut être lu, si la configuration
/// est invalide, s'il n'y a aucune image, ou si aucune n'a pu être convertie.
pub fn run_batch(
    folder: &Path,
    out_dir: Option<&Path>,
    config: &DitherConfig,
) -> Result<BatchReport> {
    let out_dir = out_dir.map_or_else(|| folder.join("mono"), Path::to_path_buf);
    let files = scan_images(folder, Some(&out_dir))?;
    if files.is_empty() {
        anyhow::bail!("Aucune image trouvée dans {}", folder.display());
    }

    let ditherer = MonoDitherer::from_config(config).context("Configuration de tramage invalide")?;
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("Création impossible : {}", out_dir.display()))?;

    let start = Instant::now();
    let mut report = BatchReport::default();
    let mut taken = HashSet::new();

    for (i, input) in files.iter().enumerate() {
        let output = target_path(folder, &out_dir, input, config, &mut taken);
        log::info!("[{}/{}] {}", i + 1, files.len(), input.display());

        let result = output
            .parent()
            .map_or(Ok(()), fs::create_dir_all)
            .map_err(anyhow::Error::from)
            .and_then(|()| convert_with(&ditherer, input, &output, config));

        match result {
            Ok(()) => report.converted.push(output),
            Err(e) => {
                log::warn!("Échec pour {} : {e:#}", input.display());
                report.failed.push((input.clone(), format!("{e:#}")));
            }
        }
    }

    log::info!(
        "Lot terminé en {:.1?} : {} converti(s), {} échec(s) → {}",
        start.elapsed(),
        report.converted.len(),
        report.failed.len(),
        out_dir.display()
    );

    if report.converted.is_empty() {
        anyhow::bail!(
            "Aucune image convertie ({} échec(s)) dans {}",
            report.failed.len(),
            folder.display()
        );
    }
    Ok(report)
}

/// `folder/sub/a.png` → `out_dir/sub/a.<ext>`. When two sources share a
/// stem (`a.png`, `a.jpg`), the later one keeps its extension in the name.
fn target_path(
    folder: &Path,
    out_dir: &Path,
    input: &Path,
    config: &DitherConfig,
    taken: &mut HashSet<PathBuf>,
) -> PathBuf {
    let ext = config.output_format.extension();
    let rel = input.strip_prefix(folder).unwrap_or(input);
    let mut target = out_dir.join(rel).with_extension(ext);
    if taken.contains(&target) {
        let stem = rel.file_stem().unwrap_or_default().to_string_lossy();
        let src_ext = rel.extension().unwrap_or_default().to_string_lossy();
        target.set_file_name(format!("{stem}_{src_ext}.{ext}"));
    }
    taken.insert(target.clone());
    target
}
