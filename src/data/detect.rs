use std::io;
use std::path::Path;

use super::model::Modality;

// ---------------------------------------------------------------------------
// Modality detection from file extensions
// ---------------------------------------------------------------------------

const PNG_EXTENSIONS: [&str; 1] = [".png"];
const JPEG_EXTENSIONS: [&str; 2] = [".jpg", ".jpeg"];
const NIFTI_EXTENSIONS: [&str; 2] = [".nii", ".nii.gz"];

fn has_any(names: &[String], extensions: &[&str]) -> bool {
    names
        .iter()
        .any(|name| extensions.iter().any(|ext| name.ends_with(ext)))
}

/// Classify a set of file names.
///
/// Priority is fixed: any PNG → 2D, else any JPEG → 2D, else any NIfTI → 3D.
/// Presence decides, not counts.
pub fn modality_of_names(names: &[String]) -> Modality {
    if has_any(names, &PNG_EXTENSIONS) || has_any(names, &JPEG_EXTENSIONS) {
        Modality::TwoD
    } else if has_any(names, &NIFTI_EXTENSIONS) {
        Modality::ThreeD
    } else {
        Modality::Unknown
    }
}

/// Classify the files directly inside `dir`.
pub fn detect_modality(dir: &Path) -> io::Result<Modality> {
    Ok(modality_of_names(&file_names(dir)?))
}

/// Sorted names of the entries directly inside `dir`.
pub fn file_names(dir: &Path) -> io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if let Some(name) = entry.file_name().to_str() {
            names.push(name.to_string());
        } else {
            log::warn!("Skipping non UTF-8 file name in {}", dir.display());
        }
    }
    names.sort();
    Ok(names)
}
