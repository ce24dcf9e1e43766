use std::io;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use crate::data::loader::VolumeReader;
use crate::engine::FeatureEngine;

use super::events::{BatchEvent, DiagnosticSink};
use super::runner::{BatchOutcome, BatchRequest, BatchRunner};
use super::sink::HeaderMode;

/// Messages a background batch sends to whoever started it.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerMessage {
    Diagnostic(BatchEvent),
    /// Always the last message of a batch that did not panic.
    Finished(BatchOutcome),
}

struct ChannelSink<F: Fn()> {
    tx: Sender<WorkerMessage>,
    wake: F,
}

impl<F: Fn()> DiagnosticSink for ChannelSink<F> {
    fn report(&mut self, event: BatchEvent) {
        // The receiver may already be gone; the batch still runs to completion.
        let _ = self.tx.send(WorkerMessage::Diagnostic(event));
        (self.wake)();
    }
}

/// Run one batch on a dedicated thread.
///
/// Progress and the final outcome arrive on the returned channel; `wake` is
/// called after every message so a UI can schedule a repaint. There is no way
/// to stop a batch once started.
pub fn spawn_batch<F>(
    request: BatchRequest,
    engine: Arc<dyn FeatureEngine>,
    volumes: Arc<dyn VolumeReader>,
    header_mode: HeaderMode,
    wake: F,
) -> io::Result<Receiver<WorkerMessage>>
where
    F: Fn() + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("feature-extraction".to_string())
        .spawn(move || {
            let runner =
                BatchRunner::new(engine.as_ref(), volumes.as_ref()).with_header_mode(header_mode);
            let mut sink = ChannelSink { tx, wake };
            let outcome = runner.run(&request, &mut sink);
            let _ = sink.tx.send(WorkerMessage::Finished(outcome));
            (sink.wake)();
        })?;
    Ok(rx)
}
