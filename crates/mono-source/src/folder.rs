use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Extensions image reconnues (comparées en minuscules).
pub const IMAGE_EXTS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "tif", "tiff"];

/// Whether `path` carries one of [`IMAGE_EXTS`].
///
/// # Example
/// ```
/// use mono_source::folder::is_image;
/// use std::path::Path;
/// assert!(is_image(Path::new("a/b/Photo.JPG")));
/// assert!(!is_image(Path::new("notes.txt")));
/// ```
#[must_use]
pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| IMAGE_EXTS.contains(&ext.to_lowercase().as_str()))
}

/// Liste récursivement les images de `dir`, triées par chemin.
///
/// `exclude` écarte un sous-dossier (typiquement le dossier de sortie d'un
/// lot placé à l'intérieur du dossier source).
///
/// # Errors
/// Retourne une erreur si `dir` n'est pas un dossier ou ne peut être lu.
///
/// # Example
/// ```no_run
/// use mono_source::scan_images;
/// use std::path::Path;
/// let files = scan_images(Path::new("photos"), None).unwrap();
/// ```
pub fn scan_images(dir: &Path, exclude: Option<&Path>) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        anyhow::bail!("{} n'est pas un dossier", dir.display());
    }
    // Chemins canoniques : `photos/mono` et `./photos/mono` désignent le même dossier.
    let exclude = exclude.and_then(|p| fs::canonicalize(p).ok());
    let mut files = Vec::new();
    scan_dir(dir, exclude.as_deref(), &mut files)?;
    files.sort();
    log::info!("{} image(s) trouvée(s) dans {}", files.len(), dir.display());
    Ok(files)
}

fn scan_dir(dir: &Path, exclude: Option<&Path>, files: &mut Vec<PathBuf>) -> Result<()> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("Lecture impossible : {}", dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        if path.is_dir() {
            if exclude.is_some_and(|ex| fs::canonicalize(&path).is_ok_and(|p| p == ex)) {
                continue;
            }
            scan_dir(&path, exclude, files)?;
        } else if is_image(&path) {
            files.push(path);
        }
    }
    Ok(())
}
