use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Image ↔ mask file pairing
// ---------------------------------------------------------------------------

/// An image file together with the mask expected to segment it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePair {
    /// File name of the image, used as the row identifier.
    pub image_name: String,
    pub image_path: PathBuf,
    pub mask_path: PathBuf,
}

/// Outcome of resolving one candidate image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairResolution {
    Paired(FilePair),
    /// The image itself is gone; carries the path that was looked for.
    MissingImage(PathBuf),
    /// No mask next to the image; carries the expected mask path.
    MissingMask(PathBuf),
}

/// Whether a file name belongs to the volumetric candidate set.
pub fn is_volume_name(name: &str) -> bool {
    name.ends_with(".nii") || name.ends_with(".nii.gz")
}

/// Whether a file name belongs to the raster candidate set.
pub fn is_raster_name(name: &str) -> bool {
    name.ends_with(".png")
}

/// Expected mask file name for a volumetric image.
///
/// `name.nii.gz` → `name_mask.nii.gz`, anything else → `<stem>_mask.nii`.
pub fn volume_mask_name(image_name: &str) -> String {
    match image_name.strip_suffix(".nii.gz") {
        Some(base) => format!("{base}_mask.nii.gz"),
        None => {
            let base = Path::new(image_name)
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or(image_name);
            format!("{base}_mask.nii")
        }
    }
}

/// Expected mask file name for a raster image: `<stem>_mask.png`.
pub fn raster_mask_name(image_name: &str) -> String {
    let base = Path::new(image_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(image_name);
    format!("{base}_mask.png")
}

/// Pair a volumetric image with its mask; both files must exist.
pub fn resolve_volume_pair(image_dir: &Path, mask_dir: &Path, image_name: &str) -> PairResolution {
    let image_path = image_dir.join(image_name);
    let mask_path = mask_dir.join(volume_mask_name(image_name));
    if !image_path.exists() {
        return PairResolution::MissingImage(image_path);
    }
    if !mask_path.exists() {
        return PairResolution::MissingMask(mask_path);
    }
    PairResolution::Paired(FilePair {
        image_name: image_name.to_string(),
        image_path,
        mask_path,
    })
}

/// Pair a raster image with its mask; `None` when the mask is absent.
pub fn resolve_raster_pair(image_dir: &Path, mask_dir: &Path, image_name: &str) -> Option<FilePair> {
    let mask_path = mask_dir.join(raster_mask_name(image_name));
    mask_path.exists().then(|| FilePair {
        image_name: image_name.to_string(),
        image_path: image_dir.join(image_name),
        mask_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volume_mask_names_keep_extension_family() {
        assert_eq!(volume_mask_name("a.nii"), "a_mask.nii");
        assert_eq!(volume_mask_name("b.nii.gz"), "b_mask.nii.gz");
        assert_eq!(volume_mask_name("case.01.nii"), "case.01_mask.nii");
    }

    #[test]
    fn raster_mask_name_appends_suffix() {
        assert_eq!(raster_mask_name("slice_3.png"), "slice_3_mask.png");
    }

    #[test]
    fn candidate_filters() {
        assert!(is_volume_name("a.nii.gz"));
        assert!(is_volume_name("a.nii"));
        assert!(!is_volume_name("a.nii.bak"));
        assert!(is_raster_name("a.png"));
        assert!(!is_raster_name("a.jpg"));
    }

    #[test]
    fn missing_mask_is_reported_by_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.nii"), b"").unwrap();
        std::fs::write(dir.path().join("b.nii.gz"), b"").unwrap();
        std::fs::write(dir.path().join("a_mask.nii"), b"").unwrap();

        match resolve_volume_pair(dir.path(), dir.path(), "a.nii") {
            PairResolution::Paired(pair) => assert_eq!(pair.mask_path, dir.path().join("a_mask.nii")),
            other => panic!("expected a pair, got {other:?}"),
        }
        assert_eq!(
            resolve_volume_pair(dir.path(), dir.path(), "b.nii.gz"),
            PairResolution::MissingMask(dir.path().join("b_mask.nii.gz"))
        );
        assert!(resolve_raster_pair(dir.path(), dir.path(), "c.png").is_none());
    }
}
