//! Batch radiomics feature extraction for folders of paired images and
//! multi-region masks.
//!
//! Volumetric scans (`name.nii` / `name.nii.gz` with `name_mask.nii[.gz]`)
//! produce one row per image with every label's features suffixed
//! `_label_<N>`. Rasters (`name.png` with `name_mask.png`) produce one row per
//! mask colour. Results are written to a single CSV table per batch.

pub mod color;
pub mod data;
pub mod engine;
pub mod extraction;
pub mod settings;
