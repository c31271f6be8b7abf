//! Node traits for streaming processing
//!
//! Defines the [`Decoder`] trait that protocol decoders implement and the
//! [`Sink`] trait for consumers of decoded events. Both are driven by the
//! [`Pipeline`](super::Pipeline) one sample at a time.

use super::sample::Sample;
use crate::Result;

/// A protocol decoder fed one sample at a time, in sequence order
///
/// A decoder owns all of its state. Feeding it a sample either produces
/// nothing (the protocol is still mid-transaction) or exactly one decoded
/// event.
pub trait Decoder {
    /// Decoded event type
    type Output;

    /// Get a debug name for this decoder
    fn name(&self) -> &str;

    /// Process the next sample, returning an event if one completed
    fn process(&mut self, sample: Sample) -> Option<Self::Output>;

    /// Called once the source is exhausted. Returns whatever transaction was
    /// still in flight, if the decoder wants to report it.
    fn flush(&mut self) -> Option<Self::Output> {
        None
    }

    /// Drop any in-flight transaction and return to the idle state
    fn reset(&mut self);
}

/// A consumer of decoded events
pub trait Sink<T> {
    /// Get a debug name for this sink
    fn name(&self) -> &str;

    /// Consume one event
    fn consume(&mut self, event: &T) -> Result<()>;

    /// Called once after the last event
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}
