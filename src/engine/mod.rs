/// Feature computation engine.
///
/// The batch runner talks to engines through [`FeatureEngine`]. The crate
/// ships [`BuiltinEngine`], which computes a compact radiomics feature set:
///
/// ```text
///   image ──► filter (original | wavelet bands)
///               │
///               ▼
///   mask ──► Roi: voxel list, discretised gray levels, neighbourhoods
///               │
///               ├─► firstorder   intensity statistics
///               ├─► shape/2D     voxel-count morphology (original only)
///               ├─► glcm         co-occurrence
///               ├─► glrlm        run lengths
///               ├─► glszm        size zones
///               ├─► gldm         dependence
///               └─► ngtdm        neighbouring gray-tone difference
/// ```
use std::borrow::Cow;

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

use crate::data::model::{FeatureRecord, RegionMask, Volume};
use crate::extraction::policy::{EngineConfig, FeatureClass, ImageFilter};

mod discretize;
mod firstorder;
mod glcm;
mod gldm;
mod glrlm;
mod glszm;
mod ngtdm;
mod shape;
mod wavelet;

/// Guard against `log2(0)`.
const EPSILON: f64 = 2.2e-16;

/// Most gray levels a region may discretise to; texture matrices grow with
/// the square of this.
pub const MAX_GRAY_LEVELS: f64 = 10_000.0;

// ---------------------------------------------------------------------------
// Engine contract
// ---------------------------------------------------------------------------

/// Computes named scalar features for an (image, binary mask, config) triple.
///
/// The returned record may contain `general_*` and `diagnostics_*` entries;
/// callers strip them. Failures are per-region and must not abort a batch.
pub trait FeatureEngine: Send + Sync {
    fn execute(
        &self,
        image: &Volume<f64>,
        region: &RegionMask,
        config: &EngineConfig,
    ) -> Result<FeatureRecord>;
}

/// Tunables of the built-in engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Width of the fixed intensity bins used for texture matrices.
    pub bin_width: f64,
    /// Largest per-component difference allowed between image and mask geometry.
    pub geometry_tolerance: f64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            bin_width: 25.0,
            geometry_tolerance: 1e-6,
        }
    }
}

// ---------------------------------------------------------------------------
// Region of interest shared by every feature class
// ---------------------------------------------------------------------------

/// A filtered image restricted to one region, ready for feature computation.
pub(crate) struct Roi<'a> {
    pub image: &'a Volume<f64>,
    /// Grid indices of the foreground voxels.
    pub voxels: Vec<usize>,
    /// Discretised gray level per grid voxel, 0 outside the region.
    pub gray: Vec<u32>,
    pub levels: u32,
    /// One direction per opposite pair (13 in 3D, 4 in-plane).
    pub directions: Vec<[isize; 3]>,
    /// Full neighbourhood (26 in 3D, 8 in-plane).
    pub neighbours: Vec<[isize; 3]>,
}

impl<'a> Roi<'a> {
    pub fn new(image: &'a Volume<f64>, mask: &Volume<u8>, bin_width: f64, force_2d: bool) -> Self {
        let voxels: Vec<usize> = (0..mask.len()).filter(|&i| mask.data[i] != 0).collect();
        let values: Vec<f64> = voxels.iter().map(|&i| image.data[i]).collect();
        let levels_of = discretize::fixed_bin_width(&values, bin_width);

        let mut gray = vec![0u32; image.len()];
        for (&idx, &level) in voxels.iter().zip(&levels_of) {
            gray[idx] = level;
        }
        let levels = levels_of.iter().copied().max().unwrap_or(0);

        let usable = |o: &[isize; 3]| {
            (0..3).all(|axis| o[axis] == 0 || image.dims[axis] > 1) && !(force_2d && o[2] != 0)
        };
        let neighbours: Vec<[isize; 3]> = all_offsets().into_iter().filter(usable).collect();
        let directions = neighbours
            .iter()
            .copied()
            .filter(|o| o.iter().find(|&&c| c != 0).is_some_and(|&c| c > 0))
            .collect();

        Self {
            image,
            voxels,
            gray,
            levels,
            directions,
            neighbours,
        }
    }

    /// Foreground intensities in grid order.
    pub fn values(&self) -> Vec<f64> {
        self.voxels.iter().map(|&i| self.image.data[i]).collect()
    }

    /// Gray level of the voxel at `coords + offset`, 0 if outside region or grid.
    pub fn gray_at(&self, coords: [usize; 3], offset: [isize; 3]) -> u32 {
        self.image
            .offset(coords, offset)
            .map(|idx| self.gray[idx])
            .unwrap_or(0)
    }
}

fn all_offsets() -> Vec<[isize; 3]> {
    let mut offsets = Vec::with_capacity(26);
    for dz in -1..=1 {
        for dy in -1..=1 {
            for dx in -1..=1 {
                if (dx, dy, dz) != (0, 0, 0) {
                    offsets.push([dx, dy, dz]);
                }
            }
        }
    }
    offsets
}

/// `-Σ p log2 p` over probabilities.
pub(crate) fn entropy(probabilities: impl Iterator<Item = f64>) -> f64 {
    -probabilities
        .filter(|&p| p > 0.0)
        .map(|p| p * (p + EPSILON).log2())
        .sum::<f64>()
}

/// Mean of per-direction feature vectors, skipping directions with no data.
pub(crate) fn average_directions(
    names: &[&'static str],
    per_direction: Vec<Vec<f64>>,
) -> Vec<(&'static str, f64)> {
    let n = per_direction.len() as f64;
    names
        .iter()
        .enumerate()
        .map(|(k, &name)| {
            let value = if per_direction.is_empty() {
                f64::NAN
            } else {
                per_direction.iter().map(|v| v[k]).sum::<f64>() / n
            };
            (name, value)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// BuiltinEngine
// ---------------------------------------------------------------------------

/// In-process engine computing the feature classes listed in [`FeatureClass`].
#[derive(Debug, Clone, Default)]
pub struct BuiltinEngine {
    settings: EngineSettings,
}

impl BuiltinEngine {
    pub fn new(settings: EngineSettings) -> Self {
        Self { settings }
    }

    /// Reject region intensities the discretiser cannot turn into a bounded
    /// set of gray levels.
    fn check_intensities(&self, name: &str, image: &Volume<f64>, mask: &Volume<u8>) -> Result<()> {
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for (&v, _) in image.data.iter().zip(&mask.data).filter(|(_, m)| **m != 0) {
            if !v.is_finite() {
                bail!("{name} image has a non-finite intensity ({v}) inside the region");
            }
            lo = lo.min(v);
            hi = hi.max(v);
        }
        let bin_width = self.settings.bin_width;
        let levels = (hi / bin_width).floor() - (lo / bin_width).floor() + 1.0;
        if levels > MAX_GRAY_LEVELS {
            bail!(
                "{name} image spans {levels} gray levels at bin width {bin_width} (limit {MAX_GRAY_LEVELS})"
            );
        }
        Ok(())
    }

    fn validate(&self, image: &Volume<f64>, region: &RegionMask, config: &EngineConfig) -> Result<()> {
        let mask = &region.mask;
        if image.dims != mask.dims {
            bail!(
                "Image/Mask geometry mismatch: image size {:?}, mask size {:?}",
                image.dims,
                mask.dims
            );
        }
        if !image
            .geometry
            .approx_eq(&mask.geometry, self.settings.geometry_tolerance)
        {
            bail!(
                "Image/Mask geometry mismatch: image {:?}, mask {:?}",
                image.geometry,
                mask.geometry
            );
        }
        if region.is_empty() {
            bail!("No labels found in this mask (i.e. nothing is segmented)!");
        }
        if !(self.settings.bin_width.is_finite() && self.settings.bin_width > 0.0) {
            bail!("bin width must be positive, got {}", self.settings.bin_width);
        }
        if config.image_filters.is_empty() || config.feature_classes.is_empty() {
            bail!("No image filter or feature class enabled");
        }
        if config.has_class(FeatureClass::Shape2D) && mask.dims[2] > 1 {
            if !config.force_2d {
                bail!("shape2D features require 2D extraction to be forced");
            }
            let first_slice = mask.coords(
                mask.data
                    .iter()
                    .position(|&v| v != 0)
                    .unwrap_or_default(),
            )[2];
            let single_slice = mask
                .data
                .iter()
                .enumerate()
                .all(|(i, &v)| v == 0 || mask.coords(i)[2] == first_slice);
            if !single_slice {
                bail!("shape2D features require the region to lie in a single slice");
            }
        }
        Ok(())
    }
}

impl FeatureEngine for BuiltinEngine {
    fn execute(
        &self,
        image: &Volume<f64>,
        region: &RegionMask,
        config: &EngineConfig,
    ) -> Result<FeatureRecord> {
        self.validate(image, region, config)?;

        let mut record = FeatureRecord::new();
        record.insert(
            "general_info_EnabledClasses",
            config.feature_classes.len() as f64,
        );
        record.insert("diagnostics_Configuration_BinWidth", self.settings.bin_width);
        record.insert(
            "diagnostics_Mask-original_VoxelNum",
            region.foreground_count() as f64,
        );
        let (min, max, sum) = image.data.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY, 0.0),
            |(lo, hi, s), &v| (lo.min(v), hi.max(v), s + v),
        );
        record.insert("diagnostics_Image-original_Mean", sum / image.len() as f64);
        record.insert("diagnostics_Image-original_Minimum", min);
        record.insert("diagnostics_Image-original_Maximum", max);

        for filter in &config.image_filters {
            let derived: Vec<(String, Cow<'_, Volume<f64>>)> = match filter {
                ImageFilter::Original => vec![("original".to_string(), Cow::Borrowed(image))],
                ImageFilter::Wavelet => wavelet::haar_bands(image, config.force_2d)
                    .into_iter()
                    .map(|(name, band)| (format!("wavelet-{name}"), Cow::Owned(band)))
                    .collect(),
            };

            for (prefix, filtered) in &derived {
                self.check_intensities(prefix, filtered, &region.mask)?;
                let roi = Roi::new(
                    filtered,
                    &region.mask,
                    self.settings.bin_width,
                    config.force_2d,
                );
                for &class in &config.feature_classes {
                    let features = match class {
                        FeatureClass::FirstOrder => firstorder::compute(&roi),
                        FeatureClass::Shape if *filter == ImageFilter::Original => shape::compute_3d(&roi),
                        FeatureClass::Shape2D if *filter == ImageFilter::Original => shape::compute_2d(&roi),
                        FeatureClass::Shape | FeatureClass::Shape2D => continue,
                        FeatureClass::Glcm => glcm::compute(&roi),
                        FeatureClass::Gldm => gldm::compute(&roi),
                        FeatureClass::Glrlm => glrlm::compute(&roi),
                        FeatureClass::Glszm => glszm::compute(&roi),
                        FeatureClass::Ngtdm => ngtdm::compute(&roi),
                    };
                    for (name, value) in features {
                        record.insert(format!("{prefix}_{}_{name}", class.name()), value);
                    }
                }
            }
        }

        log::debug!(
            "computed {} entries for region {} ({} voxels)",
            record.len(),
            region.id,
            region.foreground_count()
        );
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{FeatureType, Geometry, Modality, RegionId};
    use crate::extraction::policy::ExtractionPlan;

    fn planar(values: Vec<f64>, w: usize, h: usize) -> Volume<f64> {
        Volume::new([w, h, 1], values, Geometry::default())
    }

    fn region(bits: Vec<u8>, w: usize, h: usize) -> RegionMask {
        RegionMask {
            id: RegionId::Color([255, 0, 0]),
            mask: Volume::new([w, h, 1], bits, Geometry::default()),
        }
    }

    #[test]
    fn planar_roi_uses_in_plane_neighbourhoods() {
        let image = planar(vec![0.0; 9], 3, 3);
        let mask = Volume::new([3, 3, 1], vec![1u8; 9], Geometry::default());
        let roi = Roi::new(&image, &mask, 25.0, false);
        assert_eq!(roi.neighbours.len(), 8);
        assert_eq!(roi.directions.len(), 4);
        assert_eq!(roi.levels, 1);
    }

    #[test]
    fn empty_region_is_rejected() {
        let engine = BuiltinEngine::default();
        let plan = ExtractionPlan::new(FeatureType::FirstOrder, Modality::TwoD);
        let err = engine
            .execute(
                &planar(vec![1.0; 4], 2, 2),
                &region(vec![0; 4], 2, 2),
                plan.original.as_ref().unwrap(),
            )
            .unwrap_err();
        assert!(err.to_string().contains("nothing is segmented"));
    }

    #[test]
    fn size_mismatch_is_rejected() {
        let engine = BuiltinEngine::default();
        let plan = ExtractionPlan::new(FeatureType::FirstOrder, Modality::TwoD);
        let result = engine.execute(
            &planar(vec![1.0; 6], 3, 2),
            &region(vec![1; 4], 2, 2),
            plan.original.as_ref().unwrap(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn all_pass_keys_carry_filter_and_class() {
        let engine = BuiltinEngine::default();
        let image = planar((0..16).map(|v| (v * 10) as f64).collect(), 4, 4);
        let mask = region(vec![1; 16], 4, 4);
        let plan = ExtractionPlan::new(FeatureType::All, Modality::TwoD);

        let mut merged = FeatureRecord::new();
        for config in plan.passes() {
            merged.merge(engine.execute(&image, &mask, config).unwrap().without_diagnostics());
        }

        assert!(merged.contains_key("original_firstorder_Mean"));
        assert!(merged.contains_key("original_shape2D_PixelSurface"));
        assert!(merged.contains_key("original_ngtdm_Coarseness"));
        assert!(merged.contains_key("wavelet-LH_glcm_Contrast"));
        assert!(!merged.contains_key("wavelet-LH_glrlm_RunPercentage"));
        assert!(merged.keys().all(|k| !k.starts_with("diagnostics_")));
        assert_eq!(merged.get("original_firstorder_Mean"), Some(75.0));
    }

    #[test]
    fn non_finite_intensity_is_rejected() {
        let engine = BuiltinEngine::default();
        let plan = ExtractionPlan::new(FeatureType::Texture, Modality::TwoD);
        let mut values = vec![10.0; 9];
        values[4] = f64::INFINITY;
        let err = engine
            .execute(
                &planar(values, 3, 3),
                &region(vec![1; 9], 3, 3),
                plan.original.as_ref().unwrap(),
            )
            .unwrap_err();
        assert!(err.to_string().contains("non-finite"), "{err}");
    }

    #[test]
    fn non_finite_intensity_outside_region_is_ignored() {
        let engine = BuiltinEngine::default();
        let plan = ExtractionPlan::new(FeatureType::FirstOrder, Modality::TwoD);
        let record = engine
            .execute(
                &planar(vec![1.0, 2.0, f64::NAN, f64::NEG_INFINITY], 2, 2),
                &region(vec![1, 1, 0, 0], 2, 2),
                plan.original.as_ref().unwrap(),
            )
            .unwrap();
        assert_eq!(record.get("original_firstorder_Mean"), Some(1.5));
    }

    #[test]
    fn too_many_gray_levels_are_rejected() {
        let engine = BuiltinEngine::default();
        let plan = ExtractionPlan::new(FeatureType::Texture, Modality::TwoD);
        let err = engine
            .execute(
                &planar(vec![0.0, 1e9, 5.0, 7.0], 2, 2),
                &region(vec![1; 4], 2, 2),
                plan.original.as_ref().unwrap(),
            )
            .unwrap_err();
        assert!(err.to_string().contains("gray levels"), "{err}");
    }

    #[test]
    fn diagnostics_are_reported() {
        let engine = BuiltinEngine::default();
        let plan = ExtractionPlan::new(FeatureType::Shape, Modality::TwoD);
        let record = engine
            .execute(
                &planar(vec![5.0; 4], 2, 2),
                &region(vec![1, 1, 0, 0], 2, 2),
                plan.original.as_ref().unwrap(),
            )
            .unwrap();
        assert_eq!(record.get("diagnostics_Mask-original_VoxelNum"), Some(2.0));
        assert_eq!(record.get("original_shape2D_PixelSurface"), Some(2.0));
    }
}
