#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Result, anyhow, bail};
use radiomics_batch::data::loader::VolumeReader;
use radiomics_batch::data::model::{FeatureRecord, FeatureType, Geometry, RegionId, RegionMask, Volume};
use radiomics_batch::engine::FeatureEngine;
use radiomics_batch::extraction::{BatchRequest, EngineConfig};

// ---------------------------------------------------------------------------
// Readers and engines
// ---------------------------------------------------------------------------

/// Serves in-memory volumes keyed by file name. The files on disk only need
/// to exist so that pairing finds them.
#[derive(Default)]
pub struct MemoryVolumes {
    volumes: HashMap<String, Volume<f64>>,
}

impl MemoryVolumes {
    pub fn with(mut self, name: &str, volume: Volume<f64>) -> Self {
        self.volumes.insert(name.to_string(), volume);
        self
    }
}

impl VolumeReader for MemoryVolumes {
    fn read_volume(&self, path: &Path) -> Result<Volume<f64>> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        self.volumes
            .get(name)
            .cloned()
            .ok_or_else(|| anyhow!("cannot read {}", path.display()))
    }
}

/// One engine invocation as seen by [`RecordingEngine`].
#[derive(Debug, Clone)]
pub struct Call {
    pub region: RegionId,
    pub config: EngineConfig,
    pub image_direction: [f64; 9],
    pub mask_direction: [f64; 9],
}

/// Emits `<filter>_<class>_Count` per enabled pair (the region's foreground
/// size) plus a diagnostics entry, and remembers every call.
#[derive(Default)]
pub struct RecordingEngine {
    pub calls: Mutex<Vec<Call>>,
}

impl RecordingEngine {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

impl FeatureEngine for RecordingEngine {
    fn execute(
        &self,
        image: &Volume<f64>,
        region: &RegionMask,
        config: &EngineConfig,
    ) -> Result<FeatureRecord> {
        self.calls.lock().unwrap().push(Call {
            region: region.id,
            config: config.clone(),
            image_direction: image.geometry.direction,
            mask_direction: region.mask.geometry.direction,
        });

        let mut record = FeatureRecord::new();
        record.insert("diagnostics_Versions_Engine", 1.0);
        for filter in &config.image_filters {
            let filter = format!("{filter:?}").to_lowercase();
            for class in &config.feature_classes {
                record.insert(
                    format!("{filter}_{}_Count", class.name()),
                    region.foreground_count() as f64,
                );
            }
        }
        Ok(record)
    }
}

/// Delegates to `inner` except for one region, which always fails.
pub struct FailingEngine<E> {
    pub inner: E,
    pub fail_on: RegionId,
}

impl<E: FeatureEngine> FeatureEngine for FailingEngine<E> {
    fn execute(
        &self,
        image: &Volume<f64>,
        region: &RegionMask,
        config: &EngineConfig,
    ) -> Result<FeatureRecord> {
        if region.id == self.fail_on {
            bail!("engine refused region {}", region.id);
        }
        self.inner.execute(image, region, config)
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn request(image_dir: &Path, mask_dir: &Path, output: &Path, feature_type: FeatureType) -> BatchRequest {
    BatchRequest {
        image_dir: image_dir.to_path_buf(),
        mask_dir: mask_dir.to_path_buf(),
        output_path: output.to_path_buf(),
        feature_type,
    }
}

/// Creates `images/`, `masks/` and `out/` under `root`.
pub fn folders(root: &Path) -> (PathBuf, PathBuf, PathBuf) {
    let dirs = ["images", "masks", "out"].map(|d| root.join(d));
    for dir in &dirs {
        fs::create_dir_all(dir).unwrap();
    }
    let [images, masks, out] = dirs;
    (images, masks, out)
}

pub fn touch(dir: &Path, name: &str) {
    fs::write(dir.join(name), b"").unwrap();
}

/// Intensities 0, 1, 2, ... over `dims`, identity geometry.
pub fn ramp(dims: [usize; 3]) -> Volume<f64> {
    let len = dims.iter().product::<usize>();
    Volume::new(dims, (0..len).map(|v| v as f64).collect(), Geometry::default())
}

pub fn labels(dims: [usize; 3], values: &[f64]) -> Volume<f64> {
    Volume::new(dims, values.to_vec(), Geometry::default())
}

/// Every record of a headerless, flexible read of `path`.
pub fn read_rows(path: &Path) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .unwrap();
    reader
        .records()
        .map(|r| r.unwrap().iter().map(str::to_string).collect())
        .collect()
}

pub fn column(rows: &[Vec<String>], name: &str) -> Vec<String> {
    let idx = rows[0].iter().position(|c| c == name).unwrap();
    rows[1..].iter().map(|r| r[idx].clone()).collect()
}
