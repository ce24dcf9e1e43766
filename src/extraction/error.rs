use crate::data::model::Modality;

/// Conditions that stop a batch.
///
/// Item-level problems (a missing mask, an engine failure on one image or
/// region) are not errors of the batch; they surface as
/// [`BatchEvent`](super::events::BatchEvent)s and the batch carries on.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    /// A required path was left empty.
    #[error("Please select all folders.")]
    Configuration,

    #[error(
        "Mismatch between image and mask dimensions ({images} vs {masks}). Please ensure both are either 2D or 3D."
    )]
    ModalityMismatch { images: Modality, masks: Modality },

    #[error("No image files found in the folder")]
    EmptyInput,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("writing results: {0}")]
    Csv(#[from] csv::Error),
}
