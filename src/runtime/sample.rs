//! Core data types for signal processing

use std::fmt;

/// One analyzer sample: the logic levels of up to eight probes at one edge
///
/// Captures record a sample every time any probe changes, so consecutive
/// samples are not equally spaced in time. `seq_no` orders them and is the
/// only notion of time the decoders see.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sample {
    /// Sequence number assigned by the analyzer
    pub seq_no: u64,
    /// Probe levels, one bit per probe
    pub value: u8,
}

impl Sample {
    /// Size of one sample record on disk: 8-byte LE sequence number + 1 value byte
    pub const RECORD_SIZE: usize = 9;

    /// Number of probes a single sample can carry
    pub const WIDTH: u32 = u8::BITS;

    /// Create a new sample
    pub fn new(seq_no: u64, value: u8) -> Self {
        Self { seq_no, value }
    }

    /// Level of the probe at `bit`
    #[inline]
    pub fn bit(&self, bit: u8) -> bool {
        (self.value >> bit) & 1 == 1
    }

    /// Encode this sample as an on-disk record
    pub fn to_record(&self) -> [u8; Self::RECORD_SIZE] {
        let mut record = [0u8; Self::RECORD_SIZE];
        record[..8].copy_from_slice(&self.seq_no.to_le_bytes());
        record[8] = self.value;
        record
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Sample[seq={}, v={:#010b}]", self.seq_no, self.value)
    }
}
