//! Common decoder types and enums

use crate::runtime::Sample;
use crate::{LpcError, Result};
use std::fmt;
use tinyvec::ArrayVec;

/// Bit positions of the LPC signals within a sample byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalMap {
    clk: u8,
    lframe: u8,
    lad: [u8; 4],
}

impl SignalMap {
    /// Create a signal map, rejecting out-of-range or shared bit positions
    ///
    /// `lad` lists the bit positions of LAD[0], LAD[1], LAD[2] and LAD[3].
    pub fn new(clk: u8, lframe: u8, lad: [u8; 4]) -> Result<Self> {
        let map = Self { clk, lframe, lad };
        let signals = map.named_bits();

        for (i, &(signal, bit)) in signals.iter().enumerate() {
            if u32::from(bit) >= Sample::WIDTH {
                return Err(LpcError::SignalOutOfRange {
                    signal,
                    bit,
                    width: Sample::WIDTH,
                });
            }
            if let Some(&(first, _)) = signals[..i].iter().find(|(_, b)| *b == bit) {
                return Err(LpcError::SignalOverlap {
                    first,
                    second: signal,
                    bit,
                });
            }
        }

        Ok(map)
    }

    fn named_bits(&self) -> [(&'static str, u8); 6] {
        [
            ("LCLK", self.clk),
            ("LFRAME#", self.lframe),
            ("LAD[0]", self.lad[0]),
            ("LAD[1]", self.lad[1]),
            ("LAD[2]", self.lad[2]),
            ("LAD[3]", self.lad[3]),
        ]
    }

    /// Bit position of LCLK
    pub fn clk_bit(&self) -> u8 {
        self.clk
    }

    /// Bit position of LFRAME#
    pub fn lframe_bit(&self) -> u8 {
        self.lframe
    }

    /// Bit positions of LAD[0..3]
    pub fn lad_bits(&self) -> [u8; 4] {
        self.lad
    }

    /// LCLK level in the given sample
    #[inline]
    pub fn clock(&self, sample: &Sample) -> bool {
        sample.bit(self.clk)
    }

    /// Whether LFRAME# is asserted (driven low) in the given sample
    #[inline]
    pub fn frame_asserted(&self, sample: &Sample) -> bool {
        !sample.bit(self.lframe)
    }

    /// LAD[3:0] packed into a nibble
    #[inline]
    pub fn lad(&self, sample: &Sample) -> u8 {
        self.lad
            .iter()
            .enumerate()
            .fold(0, |nibble, (i, &bit)| nibble | (u8::from(sample.bit(bit)) << i))
    }
}

impl Default for SignalMap {
    /// clk=0, LFRAME#=1, LAD[0..3]=5,4,3,2
    fn default() -> Self {
        Self {
            clk: 0,
            lframe: 1,
            lad: [5, 4, 3, 2],
        }
    }
}

/// LAD[3:0] value latched while LFRAME# is asserted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartCode {
    /// Start of a target (I/O or memory) cycle
    TargetCycle,
    /// Reserved
    Reserved,
    /// Grant for bus master 0
    BusMasterGrant0,
    /// Grant for bus master 1
    BusMasterGrant1,
    /// Stop/abort of the current cycle
    Abort,
    /// Any other (reserved) value
    Other(u8),
}

impl StartCode {
    pub fn from_nibble(nibble: u8) -> Self {
        match nibble & 0xf {
            0x0 => StartCode::TargetCycle,
            0x1 => StartCode::Reserved,
            0x2 => StartCode::BusMasterGrant0,
            0x3 => StartCode::BusMasterGrant1,
            0xf => StartCode::Abort,
            n => StartCode::Other(n),
        }
    }
}

/// Cycle type, LAD[3:2] of the first nibble after a target-cycle start
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CycleType {
    #[default]
    Io,
    Memory,
    Dma,
    Reserved,
}

impl CycleType {
    pub fn from_lad(lad: u8) -> Self {
        match (lad & 0xc) >> 2 {
            0 => CycleType::Io,
            1 => CycleType::Memory,
            2 => CycleType::Dma,
            _ => CycleType::Reserved,
        }
    }

    /// Number of address nibbles for decodable cycle types
    pub fn address_nibbles(&self) -> Option<u8> {
        match self {
            CycleType::Io => Some(4),
            CycleType::Memory => Some(8),
            CycleType::Dma | CycleType::Reserved => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CycleType::Io => "I/O",
            CycleType::Memory => "Mem",
            CycleType::Dma => "DMA",
            CycleType::Reserved => "RESERVED",
        }
    }
}

/// Transfer direction as seen from the host, LAD[1] of the cycle type nibble
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Read,
    Write,
}

impl Direction {
    pub fn from_lad(lad: u8) -> Self {
        if lad & 0x2 == 0 {
            Direction::Read
        } else {
            Direction::Write
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Direction::Read => "Read",
            Direction::Write => "Write",
        }
    }
}

/// Protocol phase of the decoder
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for LFRAME# to be asserted
    #[default]
    WaitFrame,
    /// LFRAME# asserted, start code latched
    Start,
    /// Address nibbles, count depends on the cycle type
    Address,
    /// Data nibbles, least significant first
    Data,
    /// Bus turn-around
    TurnAround,
    /// Waiting for the target to signal ready
    Sync,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::WaitFrame => "WAIT_LFRAME_ASSERTED",
            Phase::Start => "START",
            Phase::Address => "ADDR",
            Phase::Data => "DATA",
            Phase::TurnAround => "TAR",
            Phase::Sync => "SYNC",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Most phases a single cycle can pass through.
///
/// Longest path: WAIT, START, ADDR, DATA, TAR, SYNC, TAR (and the read
/// mirror of it), with headroom.
pub const PHASE_HISTORY_CAPACITY: usize = 9;

/// Phases the current cycle went through, oldest first
pub type PhaseHistory = ArrayVec<[Phase; PHASE_HISTORY_CAPACITY]>;

/// Decoded LPC cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LpcCycle {
    /// Sequence number of the sample where LFRAME# started the cycle
    pub seq_no: u64,
    pub cycle_type: CycleType,
    pub direction: Direction,
    pub address: u32,
    pub data: u8,
    /// Phase chain leading to this cycle
    pub phases: PhaseHistory,
    /// Cycle was cut short by a new LFRAME# assertion
    pub aborted: bool,
}

impl LpcCycle {
    /// Text form including the phase chain
    pub fn verbose(&self) -> VerboseCycle<'_> {
        VerboseCycle(self)
    }

    fn write_summary(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}: {} {:<5} {:#06x}: {:#04x}",
            self.seq_no,
            self.cycle_type.name(),
            self.direction.name(),
            self.address,
            self.data
        )
    }
}

impl fmt::Display for LpcCycle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.write_summary(f)?;
        if self.aborted {
            f.write_str(" <ABORT>")?;
        }
        Ok(())
    }
}

/// [`LpcCycle`] display adapter that appends the phase chain
pub struct VerboseCycle<'a>(&'a LpcCycle);

impl fmt::Display for VerboseCycle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let cycle = self.0;
        cycle.write_summary(f)?;
        f.write_str(" ")?;
        for (i, phase) in cycle.phases.iter().enumerate() {
            if i > 0 {
                f.write_str(" -> ")?;
            }
            f.write_str(phase.name())?;
        }
        if cycle.aborted {
            f.write_str(" -> <ABORT>")?;
        }
        Ok(())
    }
}
