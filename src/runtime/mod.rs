//! Runtime support for streaming decoders

pub mod node;
pub mod pipeline;
pub mod sample;

pub use node::{Decoder, Sink};
pub use pipeline::{Pipeline, PipelineStats};
pub use sample::Sample;
