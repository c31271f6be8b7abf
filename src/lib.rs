//! Low Pin Count (LPC) bus decoder for logic analyzer captures
//!
//! This library turns a raw capture of the LPC bus signals (LCLK, LFRAME# and
//! LAD[3:0]) into decoded bus cycles: type, direction, address and data byte,
//! together with the sequence of protocol phases each cycle passed through.
//!
//! # Architecture
//!
//! - **CaptureSource**: Streams `(sequence number, sample byte)` records from a
//!   capture through a fixed-size refill buffer
//! - **LpcDecoder**: Falling-edge driven state machine, one sample at a time
//! - **Pipeline**: Synchronous decode loop feeding decoded cycles to sinks
//! - **Sinks**: Text printer and CSV writer for decoded cycles
//!
//! # Example
//!
//! ```no_run
//! use lpc::{CaptureSource, CyclePrinter, LpcDecoder, Pipeline, SignalMap};
//!
//! let source = CaptureSource::open("capture.bin")?;
//! let decoder = LpcDecoder::new(SignalMap::default());
//! let mut pipeline = Pipeline::new(source, decoder);
//! pipeline.add_sink(CyclePrinter::new(std::io::stdout(), false));
//! let stats = pipeline.run()?;
//! println!("{} cycles", stats.events);
//! # Ok::<(), lpc::LpcError>(())
//! ```

use thiserror::Error;

pub mod nodes;
pub mod runtime;

// Re-export decoder data types
pub use nodes::decoders::{
    CycleType, Direction, LpcCycle, Phase, PhaseHistory, SignalMap, StartCode,
};

// Re-export data types from runtime
pub use runtime::Sample;

// Re-export sources, decoders and sinks
pub use nodes::decoders::LpcDecoder;
pub use nodes::{CaptureSource, CycleCsvWriter, CyclePrinter};

// Re-export runtime components
pub use runtime::{Decoder, Pipeline, PipelineStats, Sink};

#[derive(Error, Debug)]
pub enum LpcError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("The file '{path}' could not be opened: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Capture '{0}' contains no data")]
    EmptyCapture(String),

    #[error("Capture source '{0}' failed earlier, no further samples")]
    SourceFailed(String),

    #[error("Signal {signal} uses bit {bit}, samples only have {width} bits")]
    SignalOutOfRange {
        signal: &'static str,
        bit: u8,
        width: u32,
    },

    #[error("Signals {first} and {second} both use bit {bit}")]
    SignalOverlap {
        first: &'static str,
        second: &'static str,
        bit: u8,
    },
}

pub type Result<T> = std::result::Result<T, LpcError>;
