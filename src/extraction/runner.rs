use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::data::decompose::{
    decompose_colors, decompose_labels, impose_canonical_direction, normalize_raster_mask,
    to_labels,
};
use crate::data::detect::{detect_modality, file_names};
use crate::data::loader::{VolumeReader, load_raster_image, load_raster_mask};
use crate::data::model::{FeatureRecord, FeatureType, Modality, OutputRow, RegionMask, Volume};
use crate::data::pairing::{
    FilePair, PairResolution, is_raster_name, is_volume_name, resolve_raster_pair,
    resolve_volume_pair,
};
use crate::engine::FeatureEngine;

use super::error::ExtractionError;
use super::events::{BatchEvent, DiagnosticSink, FolderRole};
use super::policy::ExtractionPlan;
use super::sink::{HeaderMode, ResultSink};

// ---------------------------------------------------------------------------
// Batch boundary types
// ---------------------------------------------------------------------------

/// Everything a batch needs from its caller.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchRequest {
    pub image_dir: PathBuf,
    pub mask_dir: PathBuf,
    pub output_path: PathBuf,
    pub feature_type: FeatureType,
}

impl BatchRequest {
    /// `<output_dir>/extracted_features_<feature_type>.csv`
    pub fn default_output_path(output_dir: &Path, feature_type: FeatureType) -> PathBuf {
        output_dir.join(format!("extracted_features_{feature_type}.csv"))
    }
}

/// Result of one batch, as shown to the user.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome {
    pub success: bool,
    pub message: String,
    pub rows_written: usize,
    /// Set only on success.
    pub output_path: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// BatchRunner
// ---------------------------------------------------------------------------

/// Drives detection, pairing, decomposition, feature computation and output
/// for one pair of folders. Items are processed strictly one at a time.
pub struct BatchRunner<'a> {
    engine: &'a dyn FeatureEngine,
    volumes: &'a dyn VolumeReader,
    header_mode: HeaderMode,
}

fn emit(diagnostics: &mut dyn DiagnosticSink, event: BatchEvent) {
    log::log!(event.level(), "{event}");
    diagnostics.report(event);
}

impl<'a> BatchRunner<'a> {
    pub fn new(engine: &'a dyn FeatureEngine, volumes: &'a dyn VolumeReader) -> Self {
        Self {
            engine,
            volumes,
            header_mode: HeaderMode::default(),
        }
    }

    pub fn with_header_mode(mut self, header_mode: HeaderMode) -> Self {
        self.header_mode = header_mode;
        self
    }

    /// Run a batch: validate paths, detect both folders' modality, then run
    /// the matching pipeline. Every failure ends up in the outcome's message.
    pub fn run(&self, request: &BatchRequest, diagnostics: &mut dyn DiagnosticSink) -> BatchOutcome {
        self.outcome(request, self.try_run(request, diagnostics))
    }

    /// Run the pipeline of a known modality, skipping folder detection.
    pub fn run_pipeline(
        &self,
        request: &BatchRequest,
        modality: Modality,
        diagnostics: &mut dyn DiagnosticSink,
    ) -> BatchOutcome {
        let result = self.try_pipeline(request, modality, diagnostics);
        self.outcome(request, result)
    }

    fn outcome(&self, request: &BatchRequest, result: Result<usize, ExtractionError>) -> BatchOutcome {
        match result {
            Ok(rows_written) => {
                log::info!(
                    "Feature extraction completed: {rows_written} rows written to {}",
                    request.output_path.display()
                );
                BatchOutcome {
                    success: true,
                    message: "Feature extraction completed".to_string(),
                    rows_written,
                    output_path: Some(request.output_path.clone()),
                }
            }
            Err(e) => {
                log::error!("Feature extraction failed: {e}");
                BatchOutcome {
                    success: false,
                    message: e.to_string(),
                    rows_written: 0,
                    output_path: None,
                }
            }
        }
    }

    fn try_run(
        &self,
        request: &BatchRequest,
        diagnostics: &mut dyn DiagnosticSink,
    ) -> Result<usize, ExtractionError> {
        let required = [&request.image_dir, &request.mask_dir, &request.output_path];
        if required.iter().any(|p| p.as_os_str().is_empty()) {
            return Err(ExtractionError::Configuration);
        }

        let images = detect_modality(&request.image_dir)?;
        emit(
            diagnostics,
            BatchEvent::ModalityDetected {
                role: FolderRole::Image,
                modality: images,
            },
        );
        let masks = detect_modality(&request.mask_dir)?;
        emit(
            diagnostics,
            BatchEvent::ModalityDetected {
                role: FolderRole::Mask,
                modality: masks,
            },
        );

        if images != masks {
            return Err(ExtractionError::ModalityMismatch { images, masks });
        }
        self.try_pipeline(request, images, diagnostics)
    }

    fn try_pipeline(
        &self,
        request: &BatchRequest,
        modality: Modality,
        diagnostics: &mut dyn DiagnosticSink,
    ) -> Result<usize, ExtractionError> {
        match modality {
            Modality::TwoD => self.run_rasters(request, diagnostics),
            Modality::ThreeD => self.run_volumes(request, diagnostics),
            Modality::Unknown => Err(ExtractionError::ModalityMismatch {
                images: modality,
                masks: modality,
            }),
        }
    }

    /// Candidate image names, or `EmptyInput` before any output exists.
    fn candidates(dir: &Path, keep: fn(&str) -> bool) -> Result<Vec<String>, ExtractionError> {
        let names: Vec<String> = file_names(dir)?.into_iter().filter(|n| keep(n)).collect();
        if names.is_empty() {
            return Err(ExtractionError::EmptyInput);
        }
        Ok(names)
    }

    // -- Volumetric pipeline ------------------------------------------------

    fn run_volumes(
        &self,
        request: &BatchRequest,
        diagnostics: &mut dyn DiagnosticSink,
    ) -> Result<usize, ExtractionError> {
        let names = Self::candidates(&request.image_dir, is_volume_name)?;
        let plan = ExtractionPlan::new(request.feature_type, Modality::ThreeD);
        let mut sink = ResultSink::create(&request.output_path, self.header_mode)?;

        for name in &names {
            let pair = match resolve_volume_pair(&request.image_dir, &request.mask_dir, name) {
                PairResolution::Paired(pair) => pair,
                PairResolution::MissingImage(missing) => {
                    let role = FolderRole::Image;
                    emit(diagnostics, BatchEvent::PairMissing { role, missing });
                    continue;
                }
                PairResolution::MissingMask(missing) => {
                    let role = FolderRole::Mask;
                    emit(diagnostics, BatchEvent::PairMissing { role, missing });
                    continue;
                }
            };

            match self.extract_volume(&pair, &plan) {
                Ok(record) if record.is_empty() => emit(
                    diagnostics,
                    BatchEvent::NoFeatures {
                        image: pair.image_name.clone(),
                    },
                ),
                Ok(record) => {
                    sink.write_row(OutputRow::for_volume(&pair.image_name, record))?;
                    emit(
                        diagnostics,
                        BatchEvent::RowWritten {
                            image: pair.image_name.clone(),
                            region: None,
                        },
                    );
                }
                Err(e) => emit(
                    diagnostics,
                    BatchEvent::ImageFailed {
                        image: pair.image_name.clone(),
                        error: format!("{e:#}"),
                    },
                ),
            }
        }

        let (_, rows) = sink.finish()?;
        Ok(rows)
    }

    /// All labels of one volume merged into a single record; any failure
    /// discards the whole image.
    fn extract_volume(&self, pair: &FilePair, plan: &ExtractionPlan) -> Result<FeatureRecord> {
        let mut image = self.volumes.read_volume(&pair.image_path)?;
        let mut mask = self.volumes.read_volume(&pair.mask_path)?;
        impose_canonical_direction(&mut image);
        impose_canonical_direction(&mut mask);

        let labels = to_labels(&mask);
        let mut merged = FeatureRecord::new();
        for region in decompose_labels(&labels) {
            let record = self.run_passes(&image, &region, plan)?;
            merged.merge(record.with_label_suffix(region.id));
        }
        Ok(merged)
    }

    // -- Raster pipeline ----------------------------------------------------

    fn run_rasters(
        &self,
        request: &BatchRequest,
        diagnostics: &mut dyn DiagnosticSink,
    ) -> Result<usize, ExtractionError> {
        let names = Self::candidates(&request.image_dir, is_raster_name)?;
        let plan = ExtractionPlan::new(request.feature_type, Modality::TwoD);
        let mut sink = ResultSink::create(&request.output_path, self.header_mode)?;

        for name in &names {
            let Some(pair) = resolve_raster_pair(&request.image_dir, &request.mask_dir, name) else {
                log::debug!("No mask for {name}, skipping");
                continue;
            };

            let (image, regions) = match load_raster_pair(&pair) {
                Ok(loaded) => loaded,
                Err(e) => {
                    emit(
                        diagnostics,
                        BatchEvent::ImageFailed {
                            image: pair.image_name.clone(),
                            error: format!("{e:#}"),
                        },
                    );
                    continue;
                }
            };

            for region in regions {
                match self.run_passes(&image, &region, &plan) {
                    Ok(record) => {
                        sink.write_row(OutputRow::for_region(&pair.image_name, region.id, record))?;
                        emit(
                            diagnostics,
                            BatchEvent::RowWritten {
                                image: pair.image_name.clone(),
                                region: Some(region.id),
                            },
                        );
                    }
                    Err(e) => emit(
                        diagnostics,
                        BatchEvent::RegionFailed {
                            image: pair.image_name.clone(),
                            region: region.id,
                            error: format!("{e:#}"),
                        },
                    ),
                }
            }
        }

        let (_, rows) = sink.finish()?;
        Ok(rows)
    }

    // -- Shared -------------------------------------------------------------

    /// Run every pass of the plan on one region and merge the stripped output.
    fn run_passes(
        &self,
        image: &Volume<f64>,
        region: &RegionMask,
        plan: &ExtractionPlan,
    ) -> Result<FeatureRecord> {
        let mut record = FeatureRecord::new();
        for config in plan.passes() {
            let raw = self.engine.execute(image, region, config)?;
            record.merge(raw.without_diagnostics());
        }
        Ok(record)
    }
}

/// Load a raster image and split its mask into non-empty colour regions.
fn load_raster_pair(pair: &FilePair) -> Result<(Volume<f64>, Vec<RegionMask>)> {
    let image = load_raster_image(&pair.image_path)?;
    let mask = normalize_raster_mask(load_raster_mask(&pair.mask_path)?);
    Ok((image, decompose_colors(&mask)))
}
