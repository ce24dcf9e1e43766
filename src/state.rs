use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{Receiver, TryRecvError};

use radiomics_batch::data::detect::detect_modality;
use radiomics_batch::data::loader::NiftiReader;
use radiomics_batch::data::model::{FeatureType, Modality};
use radiomics_batch::engine::BuiltinEngine;
use radiomics_batch::extraction::{BatchRequest, WorkerMessage, spawn_batch};
use radiomics_batch::settings::ExtractorSettings;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// A batch running on the worker thread.
pub struct RunningBatch {
    pub receiver: Receiver<WorkerMessage>,
    pub output_path: PathBuf,
}

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    pub image_dir: String,
    pub mask_dir: String,
    pub output_dir: String,

    /// Modality of the most recently picked input folder.
    pub detected: Option<Modality>,

    /// Accumulated console text.
    pub console: String,

    pub settings: ExtractorSettings,

    /// Status / error message shown in the top bar.
    pub status_message: Option<String>,

    /// Set while a batch is in flight; all triggers are disabled meanwhile.
    pub running: Option<RunningBatch>,
}

impl AppState {
    pub fn new(settings: ExtractorSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn is_busy(&self) -> bool {
        self.running.is_some()
    }

    /// Text for the modality indicator next to the folder pickers.
    pub fn detected_label(&self) -> String {
        match self.detected {
            None => "No Image Path Selected".to_string(),
            Some(Modality::Unknown) => "Unknown Image Dimension".to_string(),
            Some(m) => format!("{m} Image"),
        }
    }

    pub fn set_image_dir(&mut self, path: &Path) {
        self.image_dir = path.display().to_string();
        self.detect(path);
    }

    pub fn set_mask_dir(&mut self, path: &Path) {
        self.mask_dir = path.display().to_string();
        self.detect(path);
    }

    fn detect(&mut self, path: &Path) {
        match detect_modality(path) {
            Ok(modality) => self.detected = Some(modality),
            Err(e) => {
                log::error!("Failed to read {}: {e}", path.display());
                self.status_message = Some(format!("Error: {e}"));
                self.detected = None;
            }
        }
    }

    pub fn append_line(&mut self, line: &str) {
        self.console.push_str(line);
        self.console.push('\n');
    }

    /// The request the current folder selection describes.
    pub fn request(&self, feature_type: FeatureType) -> BatchRequest {
        let output_path = if self.output_dir.is_empty() {
            PathBuf::new()
        } else {
            BatchRequest::default_output_path(Path::new(&self.output_dir), feature_type)
        };
        BatchRequest {
            image_dir: PathBuf::from(&self.image_dir),
            mask_dir: PathBuf::from(&self.mask_dir),
            output_path,
            feature_type,
        }
    }

    /// Hand a batch to the worker thread; `wake` requests a repaint.
    pub fn start_batch(&mut self, feature_type: FeatureType, wake: impl Fn() + Send + 'static) {
        if self.is_busy() {
            return;
        }
        let request = self.request(feature_type);
        let output_path = request.output_path.clone();
        log::info!("Starting {feature_type} extraction: {request:?}");

        let engine = Arc::new(BuiltinEngine::new(self.settings.engine.clone()));
        match spawn_batch(
            request,
            engine,
            Arc::new(NiftiReader),
            self.settings.header_mode,
            wake,
        ) {
            Ok(receiver) => {
                self.running = Some(RunningBatch {
                    receiver,
                    output_path,
                })
            }
            Err(e) => self.append_line(&format!("An error occurred: {e}")),
        }
    }

    /// Drain worker messages into the console.
    pub fn poll_worker(&mut self) {
        let Some(running) = self.running.take() else {
            return;
        };
        loop {
            match running.receiver.try_recv() {
                Ok(WorkerMessage::Diagnostic(event)) => self.append_line(&event.to_string()),
                Ok(WorkerMessage::Finished(outcome)) => {
                    if outcome.success {
                        let path = outcome.output_path.unwrap_or(running.output_path);
                        self.append_line(&outcome.message);
                        self.append_line(&format!("Output saved to {}", path.display()));
                    } else {
                        self.append_line(&format!("Error: {}", outcome.message));
                    }
                    return;
                }
                Err(TryRecvError::Empty) => {
                    self.running = Some(running);
                    return;
                }
                Err(TryRecvError::Disconnected) => {
                    self.append_line("An error occurred: extraction stopped unexpectedly");
                    return;
                }
            }
        }
    }

    /// Replace the session settings from a JSON file.
    pub fn load_settings(&mut self, path: &Path) {
        match ExtractorSettings::load(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}: {settings:?}", path.display());
                self.settings = settings;
                self.status_message = None;
            }
            Err(e) => {
                log::error!("Failed to load settings: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use radiomics_batch::extraction::{BatchEvent, BatchOutcome};
    use std::sync::mpsc;

    #[test]
    fn empty_output_folder_yields_empty_output_path() {
        let state = AppState::default();
        assert!(state.request(FeatureType::Shape).output_path.as_os_str().is_empty());
    }

    #[test]
    fn poll_appends_lines_and_clears_running_batch() {
        let (tx, rx) = mpsc::channel();
        let mut state = AppState::default();
        state.running = Some(RunningBatch {
            receiver: rx,
            output_path: PathBuf::from("out.csv"),
        });

        tx.send(WorkerMessage::Diagnostic(BatchEvent::NoFeatures {
            image: "a.nii".into(),
        }))
        .unwrap();
        state.poll_worker();
        assert!(state.is_busy());

        tx.send(WorkerMessage::Finished(BatchOutcome {
            success: true,
            message: "Feature extraction completed".into(),
            rows_written: 1,
            output_path: Some(PathBuf::from("out.csv")),
        }))
        .unwrap();
        state.poll_worker();

        assert!(!state.is_busy());
        assert_eq!(
            state.console,
            "No features extracted for image: a.nii\nFeature extraction completed\nOutput saved to out.csv\n"
        );
    }

    #[test]
    fn dropped_worker_is_reported() {
        let (tx, rx) = mpsc::channel::<WorkerMessage>();
        drop(tx);
        let mut state = AppState::default();
        state.running = Some(RunningBatch {
            receiver: rx,
            output_path: PathBuf::new(),
        });
        state.poll_worker();
        assert!(!state.is_busy());
        assert!(state.console.contains("stopped unexpectedly"));
    }
}
