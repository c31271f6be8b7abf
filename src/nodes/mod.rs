//! Sources, decoders and sinks
//!
//! - **Sources**: [`CaptureSource`] streams samples out of a capture
//! - **Decoders**: the LPC cycle decoder
//! - **Sinks**: text and CSV output for decoded cycles
//!
//! # Examples
//!
//! ```ignore
//! use lpc::{CaptureSource, LpcDecoder, Pipeline, SignalMap};
//!
//! let source = CaptureSource::open("capture.bin")?;
//! let mut pipeline = Pipeline::new(source, LpcDecoder::new(SignalMap::default()));
//! pipeline.run()?;
//! # Ok::<(), lpc::LpcError>(())
//! ```

mod capture_file;
pub mod decoders;
mod sinks;

pub use capture_file::{CaptureSource, DEFAULT_BUFFER_SIZE};
pub use sinks::{CycleCsvWriter, CyclePrinter};

// Re-export Sample from runtime
pub use crate::runtime::Sample;
