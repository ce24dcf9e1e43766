use std::fmt;
use std::path::PathBuf;

use crate::data::model::{Modality, RegionId};

/// Which input folder a message refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderRole {
    Image,
    Mask,
}

impl fmt::Display for FolderRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FolderRole::Image => "Image",
            FolderRole::Mask => "Mask",
        })
    }
}

/// Human-readable progress and skip notices produced while a batch runs.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchEvent {
    ModalityDetected { role: FolderRole, modality: Modality },
    /// An image or its mask was not found; the image is skipped.
    PairMissing { role: FolderRole, missing: PathBuf },
    /// Every region of a volumetric image produced nothing.
    NoFeatures { image: String },
    /// The per-image pipeline failed; nothing was written for the image.
    ImageFailed { image: String, error: String },
    /// One region of a raster image failed; its siblings are unaffected.
    RegionFailed {
        image: String,
        region: RegionId,
        error: String,
    },
    RowWritten { image: String, region: Option<RegionId> },
}

impl BatchEvent {
    pub fn level(&self) -> log::Level {
        match self {
            BatchEvent::ModalityDetected { .. } | BatchEvent::RowWritten { .. } => log::Level::Info,
            BatchEvent::PairMissing { .. } | BatchEvent::NoFeatures { .. } => log::Level::Warn,
            BatchEvent::ImageFailed { .. } | BatchEvent::RegionFailed { .. } => log::Level::Error,
        }
    }
}

impl fmt::Display for BatchEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchEvent::ModalityDetected { role, modality } => {
                write!(f, "{role} Folder Type: {modality}")
            }
            BatchEvent::PairMissing { role, missing } => {
                write!(f, "{role} file does not exist: {}", missing.display())
            }
            BatchEvent::NoFeatures { image } => write!(f, "No features extracted for image: {image}"),
            BatchEvent::ImageFailed { image, error } => {
                write!(f, "Error during feature extraction for image {image}: {error}")
            }
            BatchEvent::RegionFailed {
                image,
                region,
                error,
            } => write!(
                f,
                "Error during feature extraction for image {image}, region {region}: {error}"
            ),
            BatchEvent::RowWritten { image, region } => match region {
                Some(region) => write!(f, "Extracted {image} ({region})"),
                None => write!(f, "Extracted {image}"),
            },
        }
    }
}

/// Receiver of batch notices.
pub trait DiagnosticSink {
    fn report(&mut self, event: BatchEvent);
}

impl DiagnosticSink for Vec<BatchEvent> {
    fn report(&mut self, event: BatchEvent) {
        self.push(event);
    }
}

/// Discards every notice (they are still logged by the runner).
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn report(&mut self, _event: BatchEvent) {}
}
