use std::collections::VecDeque;
use std::time::Instant;

use crate::models::{AnalysisRequest, AnalysisResult, ClusterParams};
use crate::rendering::dominant_color;

/// Worker-side color engine: an owned FIFO request queue plus busy flag.
///
/// Requests are processed strictly in arrival order, each one to
/// completion before the next is dequeued.
pub struct ColorEngine {
    params: ClusterParams,
    queue: VecDeque<AnalysisRequest>,
    busy: bool,
    processed: u64,
}

impl ColorEngine {
    pub fn new(params: ClusterParams) -> Self {
        Self {
            params,
            queue: VecDeque::new(),
            busy: false,
            processed: 0,
        }
    }

    pub fn enqueue(&mut self, request: AnalysisRequest) {
        self.queue.push_back(request);
    }

    /// Requests waiting to be processed
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Total requests processed by this engine
    pub fn processed(&self) -> u64 {
        self.processed
    }

    /// Compute the result for a single request
    pub fn process(&self, request: &AnalysisRequest) -> AnalysisResult {
        AnalysisResult {
            color: dominant_color(&request.pixels, &self.params),
            correlation_id: request.correlation_id.clone(),
        }
    }

    /// Process every queued request in order, handing each result to `emit`.
    ///
    /// `emit` also receives the engine, which reports busy and the
    /// remaining queue length while the drain is under way. Returns the
    /// number of requests processed.
    pub fn drain(&mut self, mut emit: impl FnMut(&ColorEngine, AnalysisResult)) -> usize {
        self.busy = true;

        let mut count = 0;
        while let Some(request) = self.queue.pop_front() {
            let started = Instant::now();
            let result = self.process(&request);

            tracing::debug!(
                correlation_id = %result.correlation_id,
                width = request.pixels.width(),
                height = request.pixels.height(),
                color = %result.color,
                elapsed_us = started.elapsed().as_micros() as u64,
                "Computed dominant color"
            );

            emit(self, result);
            count += 1;
        }

        self.processed += count as u64;
        self.busy = false;
        count
    }
}
