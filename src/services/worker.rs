//! Dedicated color worker thread.
//!
//! The worker and the host share nothing but two text channels: requests
//! flow in as serialized [`AnalysisRequest`]s, results flow out as
//! serialized [`AnalysisResult`]s. The worker blocks while its inbox is
//! empty and drains its queue to completion whenever messages arrive.

use std::thread::JoinHandle;
use tokio::sync::mpsc;

use crate::error::BackdropError;
use crate::models::{AnalysisRequest, AnalysisResult, ClusterParams};
use crate::services::ColorEngine;

const WORKER_THREAD_NAME: &str = "backdrop-color-worker";

/// Host-side handle to a running color worker
pub struct WorkerHandle {
    requests: mpsc::UnboundedSender<String>,
    thread: Option<JoinHandle<()>>,
}

impl WorkerHandle {
    /// Serialize and send a request to the worker
    pub fn submit(&self, request: AnalysisRequest) -> Result<(), BackdropError> {
        let correlation_id = request.correlation_id.clone();
        let message = request.into_message()?;
        self.send_message(message)?;
        tracing::debug!(%correlation_id, "Submitted analysis request");
        Ok(())
    }

    /// Send an already-serialized message
    pub fn send_message(&self, message: String) -> Result<(), BackdropError> {
        self.requests
            .send(message)
            .map_err(|_| BackdropError::WorkerGone)
    }

    /// Close the request channel and wait for the worker to finish its queue
    pub fn shutdown(mut self) {
        let thread = self.thread.take();
        drop(self);
        if let Some(thread) = thread {
            if thread.join().is_err() {
                tracing::error!("Color worker thread panicked");
            }
        }
    }
}

/// Spawn a worker thread.
///
/// Returns the request handle and the receiving end of the result channel.
pub fn spawn_worker(
    params: ClusterParams,
) -> Result<(WorkerHandle, mpsc::UnboundedReceiver<String>), BackdropError> {
    let (request_tx, request_rx) = mpsc::unbounded_channel::<String>();
    let (result_tx, result_rx) = mpsc::unbounded_channel::<String>();

    let thread = std::thread::Builder::new()
        .name(WORKER_THREAD_NAME.to_string())
        .spawn(move || run_worker(ColorEngine::new(params), request_rx, result_tx))
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to spawn color worker");
            BackdropError::WorkerGone
        })?;

    tracing::info!(
        threshold = params.threshold,
        long_stride = params.long_stride,
        short_stride = params.short_stride,
        "Color worker started"
    );

    Ok((
        WorkerHandle {
            requests: request_tx,
            thread: Some(thread),
        },
        result_rx,
    ))
}

fn run_worker(
    mut engine: ColorEngine,
    mut inbox: mpsc::UnboundedReceiver<String>,
    outbox: mpsc::UnboundedSender<String>,
) {
    while let Some(message) = inbox.blocking_recv() {
        accept(&mut engine, &message);
        // Pick up everything already delivered before draining
        while let Ok(message) = inbox.try_recv() {
            accept(&mut engine, &message);
        }

        engine.drain(|_, result| emit(&outbox, &result));
    }

    tracing::info!(processed = engine.processed(), "Color worker stopped");
}

fn accept(engine: &mut ColorEngine, message: &str) {
    match AnalysisRequest::from_message(message) {
        Ok(request) => engine.enqueue(request),
        Err(e) => {
            tracing::warn!(error = %e, len = message.len(), "Dropping malformed analysis request");
        }
    }
}

fn emit(outbox: &mpsc::UnboundedSender<String>, result: &AnalysisResult) {
    match result.to_message() {
        Ok(text) => {
            if outbox.send(text).is_err() {
                tracing::debug!(
                    correlation_id = %result.correlation_id,
                    "Host gone, discarding result"
                );
            }
        }
        Err(e) => {
            tracing::warn!(correlation_id = %result.correlation_id, error = %e, "Failed to encode result");
        }
    }
}
