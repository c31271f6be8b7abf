//! Synchronous decode pipeline
//!
//! Pulls samples from a source in order, feeds each one to a single
//! [`Decoder`] and hands every decoded event to all registered [`Sink`]s.
//! Everything runs on the calling thread; the loop ends at end-of-stream,
//! on the first source or sink error, or once the optional event limit is
//! reached.

use super::node::{Decoder, Sink};
use super::sample::Sample;
use crate::Result;
use std::fmt;
use tracing::{debug, error, info, warn};

/// Counters reported once a pipeline run ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Samples pulled from the source
    pub samples: u64,
    /// Events emitted by the decoder and delivered to the sinks
    pub events: u64,
    /// Whether the source ended while the decoder was mid-transaction
    pub truncated: bool,
    /// Whether the run stopped early because the event limit was reached
    pub limited: bool,
}

/// Pipeline that drives one decoder from one sample source
pub struct Pipeline<S, D: Decoder> {
    source: S,
    decoder: D,
    sinks: Vec<Box<dyn Sink<D::Output>>>,
    max_events: Option<u64>,
}

impl<S, D> Pipeline<S, D>
where
    S: Iterator<Item = Result<Sample>>,
    D: Decoder,
    D::Output: fmt::Display,
{
    /// Create a new pipeline
    pub fn new(source: S, decoder: D) -> Self {
        Self {
            source,
            decoder,
            sinks: Vec::new(),
            max_events: None,
        }
    }

    /// Stop after `max` events (0 = unlimited)
    pub fn with_max_events(mut self, max: u64) -> Self {
        self.max_events = (max > 0).then_some(max);
        self
    }

    /// Register a sink; every decoded event is delivered to all sinks in
    /// registration order
    pub fn add_sink<K: Sink<D::Output> + 'static>(&mut self, sink: K) {
        debug!("Adding sink: {}", sink.name());
        self.sinks.push(Box::new(sink));
    }

    /// Access the decoder (e.g. for its counters once the run completes)
    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    /// Consume the pipeline and return the decoder
    pub fn into_decoder(self) -> D {
        self.decoder
    }

    /// Run the decode loop to completion
    pub fn run(&mut self) -> Result<PipelineStats> {
        let mut stats = PipelineStats::default();

        info!(
            "[{}] Running with {} sink(s)",
            self.decoder.name(),
            self.sinks.len()
        );

        while let Some(item) = self.source.next() {
            let sample = match item {
                Ok(sample) => sample,
                Err(e) => {
                    error!("[{}] Source error: {}", self.decoder.name(), e);
                    return Err(e);
                }
            };
            stats.samples += 1;

            let Some(event) = self.decoder.process(sample) else {
                continue;
            };

            for sink in self.sinks.iter_mut() {
                sink.consume(&event)?;
            }
            stats.events += 1;

            if self.max_events.is_some_and(|max| stats.events >= max) {
                info!(
                    "[{}] Max events ({}) reached, shutting down",
                    self.decoder.name(),
                    stats.events
                );
                stats.limited = true;
                break;
            }
        }

        if !stats.limited
            && let Some(pending) = self.decoder.flush()
        {
            warn!(
                "[{}] Capture ended mid-transaction: {}",
                self.decoder.name(),
                pending
            );
            stats.truncated = true;
        }

        for sink in self.sinks.iter_mut() {
            sink.finish()?;
        }

        info!(
            "[{}] Shutdown. Processed {} samples, produced {} items.",
            self.decoder.name(),
            stats.samples,
            stats.events
        );

        Ok(stats)
    }
}
