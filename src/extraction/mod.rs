/// Batch orchestration: feature-set policy, the runner, output and the
/// background worker.
///
/// ```text
///   BatchRequest ──► runner ──► policy (FeatureType → EngineConfig passes)
///                      │
///                      ├──► engine (per region)
///                      ├──► events (diagnostic lines)
///                      └──► sink   (CSV rows)
///                      │
///                      ▼
///                 BatchOutcome
/// ```

pub mod error;
pub mod events;
pub mod policy;
pub mod runner;
pub mod sink;
pub mod worker;

pub use error::ExtractionError;
pub use events::{BatchEvent, DiagnosticSink, FolderRole, NullSink};
pub use policy::{EngineConfig, ExtractionPlan, FeatureClass, ImageFilter};
pub use runner::{BatchOutcome, BatchRequest, BatchRunner};
pub use sink::{HeaderMode, ResultSink};
pub use worker::{WorkerMessage, spawn_batch};
