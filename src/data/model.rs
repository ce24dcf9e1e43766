use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Modality – what kind of files a folder holds
// ---------------------------------------------------------------------------

/// Image modality of a folder, inferred from the file extensions it contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modality {
    /// Planar rasters (`.png`, `.jpg`, `.jpeg`).
    TwoD,
    /// Volumetric scans (`.nii`, `.nii.gz`).
    ThreeD,
    Unknown,
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Modality::TwoD => write!(f, "2D"),
            Modality::ThreeD => write!(f, "3D"),
            Modality::Unknown => write!(f, "Unknown"),
        }
    }
}

// ---------------------------------------------------------------------------
// FeatureType – the category the user asked for
// ---------------------------------------------------------------------------

/// Feature category requested for a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeatureType {
    FirstOrder,
    Texture,
    Shape,
    Wavelet,
    All,
    /// Every class on the untransformed image, without the wavelet pass.
    Original,
}

impl FeatureType {
    /// The categories offered as one-click actions, in display order.
    pub const BUTTONS: [FeatureType; 5] = [
        FeatureType::FirstOrder,
        FeatureType::Texture,
        FeatureType::Shape,
        FeatureType::Wavelet,
        FeatureType::All,
    ];

    /// Literal used in file names and settings.
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureType::FirstOrder => "first-order",
            FeatureType::Texture => "texture",
            FeatureType::Shape => "shape",
            FeatureType::Wavelet => "wavelet",
            FeatureType::All => "all",
            FeatureType::Original => "original",
        }
    }

    /// Human label for buttons.
    pub fn label(&self) -> &'static str {
        match self {
            FeatureType::FirstOrder => "First-Order",
            FeatureType::Texture => "Texture",
            FeatureType::Shape => "Shape",
            FeatureType::Wavelet => "Wavelet",
            FeatureType::All => "ALL",
            FeatureType::Original => "Original",
        }
    }
}

impl fmt::Display for FeatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeatureType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            FeatureType::FirstOrder,
            FeatureType::Texture,
            FeatureType::Shape,
            FeatureType::Wavelet,
            FeatureType::All,
            FeatureType::Original,
        ]
        .into_iter()
        .find(|ft| ft.as_str() == s)
        .ok_or_else(|| format!("unknown feature type: {s}"))
    }
}

// ---------------------------------------------------------------------------
// Geometry & volumes
// ---------------------------------------------------------------------------

/// Direction cosines imposed on every volumetric image and mask.
pub const CANONICAL_DIRECTION: [f64; 9] = [-1.0, 0.0, 0.0, 0.0, -1.0, 0.0, 0.0, 0.0, 1.0];

/// Physical placement of a voxel grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    /// Voxel size along x, y, z.
    pub spacing: [f64; 3],
    pub origin: [f64; 3],
    /// Row-major 3x3 direction cosine matrix.
    pub direction: [f64; 9],
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            spacing: [1.0; 3],
            origin: [0.0; 3],
            direction: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
        }
    }
}

impl Geometry {
    /// Whether two geometries agree within `tolerance` on every component.
    pub fn approx_eq(&self, other: &Geometry, tolerance: f64) -> bool {
        let close = |a: &[f64], b: &[f64]| a.iter().zip(b).all(|(x, y)| (x - y).abs() <= tolerance);
        close(&self.spacing, &other.spacing)
            && close(&self.origin, &other.origin)
            && close(&self.direction, &other.direction)
    }
}

/// A dense voxel grid stored x-fastest: `index = x + nx * (y + ny * z)`.
///
/// Planar rasters are volumes with `dims[2] == 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct Volume<T> {
    pub dims: [usize; 3],
    pub data: Vec<T>,
    pub geometry: Geometry,
}

impl<T: Copy> Volume<T> {
    pub fn new(dims: [usize; 3], data: Vec<T>, geometry: Geometry) -> Self {
        debug_assert_eq!(dims.iter().product::<usize>(), data.len());
        Self { dims, data, geometry }
    }

    /// Number of voxels.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        x + self.dims[0] * (y + self.dims[1] * z)
    }

    /// Inverse of [`Volume::index`].
    pub fn coords(&self, idx: usize) -> [usize; 3] {
        let x = idx % self.dims[0];
        let rest = idx / self.dims[0];
        [x, rest % self.dims[1], rest / self.dims[1]]
    }

    /// Neighbour of `coords` shifted by `offset`, if it lies inside the grid.
    pub fn offset(&self, coords: [usize; 3], offset: [isize; 3]) -> Option<usize> {
        let mut shifted = [0usize; 3];
        for axis in 0..3 {
            let v = coords[axis] as isize + offset[axis];
            if v < 0 || v >= self.dims[axis] as isize {
                return None;
            }
            shifted[axis] = v as usize;
        }
        Some(self.index(shifted[0], shifted[1], shifted[2]))
    }

    /// Build a same-shaped volume by mapping every voxel, keeping the geometry.
    pub fn map<U: Copy>(&self, f: impl Fn(T) -> U) -> Volume<U> {
        Volume {
            dims: self.dims,
            data: self.data.iter().map(|&v| f(v)).collect(),
            geometry: self.geometry,
        }
    }
}

/// A decoded raster mask before channel normalisation.
#[derive(Debug, Clone, PartialEq)]
pub enum RasterMask {
    /// Single-channel mask (alpha dropped).
    Gray {
        width: usize,
        height: usize,
        values: Vec<u8>,
    },
    Rgb {
        width: usize,
        height: usize,
        pixels: Vec<[u8; 3]>,
    },
}

// ---------------------------------------------------------------------------
// Region masks
// ---------------------------------------------------------------------------

/// Identifier of one region inside a multi-region mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RegionId {
    /// Integer label of a volumetric mask.
    Label(i64),
    /// Pixel colour of a raster mask.
    Color([u8; 3]),
}

impl fmt::Display for RegionId {
    /// Colours render as channel values joined with underscores (`255_0_0`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionId::Label(label) => write!(f, "{label}"),
            RegionId::Color([r, g, b]) => write!(f, "{r}_{g}_{b}"),
        }
    }
}

/// A binary mask (values 0/1) isolating one region of a source mask.
#[derive(Debug, Clone)]
pub struct RegionMask {
    pub id: RegionId,
    pub mask: Volume<u8>,
}

impl RegionMask {
    /// Number of foreground voxels.
    pub fn foreground_count(&self) -> usize {
        self.mask.data.iter().filter(|&&v| v != 0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.mask.data.iter().all(|&v| v == 0)
    }
}

// ---------------------------------------------------------------------------
// FeatureRecord – insertion-ordered feature name → value
// ---------------------------------------------------------------------------

/// Key prefixes the engine uses for summary/diagnostic entries.
pub const DIAGNOSTIC_PREFIXES: [&str; 2] = ["general_", "diagnostics_"];

/// Feature values keyed by composite name (`<filter>_<class>_<feature>`),
/// iterated in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureRecord {
    entries: Vec<(String, f64)>,
    index: HashMap<String, usize>,
}

impl FeatureRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite; an overwritten key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: f64) {
        let key = key.into();
        match self.index.get(&key) {
            Some(&pos) => self.entries[pos].1 = value,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.index.get(key).map(|&pos| self.entries[pos].1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Merge `other` into `self`; later values win on key collision.
    pub fn merge(&mut self, other: FeatureRecord) {
        for (key, value) in other.entries {
            self.insert(key, value);
        }
    }

    /// Drop every `general_*` / `diagnostics_*` entry.
    pub fn without_diagnostics(self) -> FeatureRecord {
        self.entries
            .into_iter()
            .filter(|(k, _)| !DIAGNOSTIC_PREFIXES.iter().any(|p| k.starts_with(p)))
            .collect()
    }

    /// Suffix every key with `_label_<label>`.
    pub fn with_label_suffix(self, label: impl fmt::Display) -> FeatureRecord {
        self.entries
            .into_iter()
            .map(|(k, v)| (format!("{k}_label_{label}"), v))
            .collect()
    }
}

impl FromIterator<(String, f64)> for FeatureRecord {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        let mut record = FeatureRecord::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

// ---------------------------------------------------------------------------
// OutputRow – one line of the result table
// ---------------------------------------------------------------------------

/// Identifier columns followed by feature columns.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputRow {
    pub identifiers: Vec<(String, String)>,
    pub features: FeatureRecord,
}

impl OutputRow {
    /// Row for a volumetric image: all labels merged into one record.
    pub fn for_volume(image_name: &str, features: FeatureRecord) -> Self {
        Self {
            identifiers: vec![("Image_Name".to_string(), image_name.to_string())],
            features,
        }
    }

    /// Row for one coloured region of a raster image.
    pub fn for_region(image_name: &str, region: RegionId, features: FeatureRecord) -> Self {
        Self {
            identifiers: vec![
                ("Image_Name".to_string(), image_name.to_string()),
                ("Mask_Color".to_string(), region.to_string()),
            ],
            features,
        }
    }

    /// Column names in row order.
    pub fn keys(&self) -> Vec<String> {
        self.identifiers
            .iter()
            .map(|(k, _)| k.clone())
            .chain(self.features.keys().map(str::to_string))
            .collect()
    }

    /// Cell values in row order.
    pub fn values(&self) -> Vec<String> {
        self.identifiers
            .iter()
            .map(|(_, v)| v.clone())
            .chain(self.features.iter().map(|(_, v)| v.to_string()))
            .collect()
    }

    /// Value for a column name, formatted as written to the table.
    pub fn value_of(&self, key: &str) -> Option<String> {
        self.identifiers
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
            .or_else(|| self.features.get(key).map(|v| v.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_color_serializes_with_underscores() {
        assert_eq!(RegionId::Color([255, 0, 0]).to_string(), "255_0_0");
        assert_eq!(RegionId::Label(5).to_string(), "5");
    }

    #[test]
    fn feature_type_literals_round_trip() {
        for ft in FeatureType::BUTTONS {
            assert_eq!(ft.as_str().parse::<FeatureType>(), Ok(ft));
        }
        assert_eq!("original".parse::<FeatureType>(), Ok(FeatureType::Original));
        assert!("ALL".parse::<FeatureType>().is_err());
    }

    #[test]
    fn record_strips_diagnostics_and_keeps_order() {
        let record: FeatureRecord = [
            ("diagnostics_Versions_Engine".to_string(), 1.0),
            ("original_firstorder_Mean".to_string(), 2.0),
            ("general_info_Classes".to_string(), 3.0),
            ("original_glcm_Contrast".to_string(), 4.0),
        ]
        .into_iter()
        .collect();

        let stripped = record.without_diagnostics().with_label_suffix(2);
        let keys: Vec<&str> = stripped.keys().collect();
        assert_eq!(
            keys,
            ["original_firstorder_Mean_label_2", "original_glcm_Contrast_label_2"]
        );
    }

    #[test]
    fn merge_overwrites_in_place() {
        let mut a = FeatureRecord::new();
        a.insert("x", 1.0);
        a.insert("y", 2.0);
        let mut b = FeatureRecord::new();
        b.insert("x", 9.0);
        b.insert("z", 3.0);
        a.merge(b);
        assert_eq!(a.keys().collect::<Vec<_>>(), ["x", "y", "z"]);
        assert_eq!(a.get("x"), Some(9.0));
    }

    #[test]
    fn volume_coords_invert_index() {
        let vol = Volume::new([3, 4, 2], vec![0u8; 24], Geometry::default());
        for idx in 0..vol.len() {
            let [x, y, z] = vol.coords(idx);
            assert_eq!(vol.index(x, y, z), idx);
        }
        assert_eq!(vol.offset([0, 0, 0], [-1, 0, 0]), None);
        assert_eq!(vol.offset([0, 0, 0], [1, 1, 1]), Some(vol.index(1, 1, 1)));
    }
}
