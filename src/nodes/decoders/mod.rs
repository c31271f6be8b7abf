//! Protocol decoder nodes
//!
//! Decoders driven one sample at a time by the pipeline.

pub mod lpc_decoder;
pub mod types;

// Re-export common types
pub use types::{
    CycleType, Direction, LpcCycle, PHASE_HISTORY_CAPACITY, Phase, PhaseHistory, SignalMap,
    StartCode, VerboseCycle,
};

// Re-export decoders
pub use lpc_decoder::LpcDecoder;
