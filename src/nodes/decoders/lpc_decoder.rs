//! LPC decoder, falling-edge driven state machine
//!
//! Processes the LPC bus one sample at a time. All signals are sampled on the
//! falling edge of LCLK; every other sample only updates the remembered clock
//! level.
//!
//! Flow per cycle:
//!   1. LFRAME# asserted: latch LAD[3:0] as the start code (the last clock
//!      with LFRAME# low wins)
//!   2. First clock after LFRAME# is released: cycle type and direction
//!   3. Address nibbles, most significant first (4 for I/O, 8 for memory)
//!   4. Writes: DATA, TAR, SYNC, TAR
//!      Reads:  TAR, SYNC, DATA, TAR
//!   5. The closing TAR emits the cycle
//!
//! Whether a TAR opens SYNC or closes the cycle is decided by the phase
//! recorded right before it in the phase history. LFRAME# asserted while a
//! cycle is in flight aborts it; the partial cycle is emitted with its abort
//! flag set.

use super::types::{
    CycleType, Direction, LpcCycle, PHASE_HISTORY_CAPACITY, Phase, PhaseHistory, SignalMap,
    StartCode,
};
use crate::runtime::node::Decoder;
use crate::runtime::sample::Sample;
use tracing::{debug, error, trace, warn};

/// Clock ticks of a turn-around phase
const TAR_CYCLES: u8 = 2;
/// Nibbles in a data phase (one byte)
const DATA_CYCLES: u8 = 2;

/// LPC cycle decoder
///
/// Input: [`Sample`]s in sequence order
/// Output: [`LpcCycle`] events
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LpcDecoder {
    name: String,
    signals: SignalMap,

    /// Phases of the current cycle; the last entry is the active phase.
    history: PhaseHistory,
    /// Tracks LCLK for falling edge detection.
    clk_last: bool,
    /// LAD[3:0] seen on the last clock with LFRAME# asserted.
    start_last: u8,
    /// Sequence number of the sample that started the cycle.
    seq_no_cycle: u64,

    cycle_type: CycleType,
    direction: Direction,
    addr_cycles: u8,
    data_cycles: u8,
    data_index: u8,
    tar_cycles: u8,
    address: u32,
    data: u8,

    cycles_emitted: u64,
    cycles_aborted: u64,
    cycles_rejected: u64,
}

impl LpcDecoder {
    /// Create a new decoder waiting for LFRAME#
    pub fn new(signals: SignalMap) -> Self {
        let mut decoder = Self {
            name: "lpc_decoder".to_string(),
            signals,
            history: PhaseHistory::new(),
            // Captures start with a low clock
            clk_last: false,
            start_last: 0,
            seq_no_cycle: 0,
            cycle_type: CycleType::default(),
            direction: Direction::default(),
            addr_cycles: 0,
            data_cycles: 0,
            data_index: 0,
            tar_cycles: 0,
            address: 0,
            data: 0,
            cycles_emitted: 0,
            cycles_aborted: 0,
            cycles_rejected: 0,
        };
        decoder.reset_state();
        decoder
    }

    /// With custom name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn signals(&self) -> &SignalMap {
        &self.signals
    }

    /// The active phase
    pub fn phase(&self) -> Phase {
        self.history.last().copied().unwrap_or_default()
    }

    /// Phases the current cycle went through, oldest first
    pub fn history(&self) -> &[Phase] {
        &self.history
    }

    /// Cycles emitted so far, aborted ones included
    pub fn cycles_emitted(&self) -> u64 {
        self.cycles_emitted
    }

    /// Cycles cut short by LFRAME#
    pub fn cycles_aborted(&self) -> u64 {
        self.cycles_aborted
    }

    /// Target cycles dropped because of an unsupported cycle type
    pub fn cycles_rejected(&self) -> u64 {
        self.cycles_rejected
    }

    fn previous_phase(&self) -> Option<Phase> {
        let len = self.history.len();
        (len >= 2).then(|| self.history[len - 2])
    }

    /// Back to waiting for LFRAME#, accumulators cleared.
    fn reset_state(&mut self) {
        self.history.clear();
        self.history.push(Phase::WaitFrame);
        self.address = 0;
        self.data = 0;
        self.data_index = 0;
    }

    fn enter(&mut self, phase: Phase) {
        trace!("[{}] {} -> {}", self.name, self.phase(), phase);
        debug_assert!(
            self.history.len() < PHASE_HISTORY_CAPACITY,
            "phase history overflow: {:?}",
            self.history
        );
        if self.history.try_push(phase).is_some() {
            error!(
                "[{}] Phase history full at seq {}, dropping cycle",
                self.name, self.seq_no_cycle
            );
            self.reset_state();
        }
    }

    fn enter_data(&mut self) {
        self.data_cycles = DATA_CYCLES;
        self.enter(Phase::Data);
    }

    fn enter_turnaround(&mut self) {
        self.tar_cycles = TAR_CYCLES;
        self.enter(Phase::TurnAround);
    }

    /// Build a cycle record from the accumulators
    fn snapshot(&self, aborted: bool) -> LpcCycle {
        LpcCycle {
            seq_no: self.seq_no_cycle,
            cycle_type: self.cycle_type,
            direction: self.direction,
            address: self.address,
            data: self.data,
            phases: self.history.clone(),
            aborted,
        }
    }

    /// Emit the current cycle and reset
    fn emit(&mut self, aborted: bool) -> LpcCycle {
        let cycle = self.snapshot(aborted);
        self.cycles_emitted += 1;
        if aborted {
            self.cycles_aborted += 1;
        }
        debug!("[{}] #{}: {}", self.name, self.cycles_emitted, cycle);
        self.reset_state();
        cycle
    }

    /// The active phase completed; move on to the next one.
    fn advance(&mut self) -> Option<LpcCycle> {
        match self.phase() {
            Phase::WaitFrame | Phase::Start => {}
            Phase::Address => match self.direction {
                Direction::Write => self.enter_data(),
                // Reads turn the bus around before the target drives data
                Direction::Read => self.enter_turnaround(),
            },
            Phase::Data => self.enter_turnaround(),
            Phase::TurnAround => {
                let opens_sync = match self.direction {
                    Direction::Write => Phase::Data,
                    Direction::Read => Phase::Address,
                };
                if self.previous_phase() == Some(opens_sync) {
                    self.enter(Phase::Sync);
                } else {
                    // Second TAR of the cycle
                    return Some(self.emit(false));
                }
            }
            Phase::Sync => match self.direction {
                Direction::Write => self.enter_turnaround(),
                Direction::Read => self.enter_data(),
            },
        }
        None
    }

    fn decode_start(&mut self, lad: u8) {
        match StartCode::from_nibble(self.start_last) {
            StartCode::TargetCycle => {
                self.cycle_type = CycleType::from_lad(lad);
                self.direction = Direction::from_lad(lad);
                self.address = 0;

                match self.cycle_type.address_nibbles() {
                    Some(nibbles) => {
                        debug!(
                            "[{}] {} {} cycle at seq {}",
                            self.name,
                            self.cycle_type.name(),
                            self.direction.name(),
                            self.seq_no_cycle
                        );
                        self.addr_cycles = nibbles;
                        self.enter(Phase::Address);
                    }
                    None => {
                        warn!(
                            "[{}] Encountered ILLEGAL/unsupported cycle type {} ({:#x}) at seq {}",
                            self.name,
                            self.cycle_type.name(),
                            (lad & 0xc) >> 2,
                            self.seq_no_cycle
                        );
                        self.cycles_rejected += 1;
                        self.reset_state();
                    }
                }
            }
            StartCode::Abort => {
                debug!("[{}] Abort start code at seq {}", self.name, self.seq_no_cycle);
                self.reset_state();
            }
            // Not a target cycle, stays pending until the next LFRAME#
            code => trace!("[{}] Ignoring start code {:?}", self.name, code),
        }
    }

    fn decode_address(&mut self, lad: u8) -> Option<LpcCycle> {
        self.addr_cycles -= 1;
        self.address |= u32::from(lad) << (u32::from(self.addr_cycles) * 4);

        if self.addr_cycles == 0 {
            return self.advance();
        }
        None
    }

    fn decode_data(&mut self, lad: u8) -> Option<LpcCycle> {
        self.data |= lad << (self.data_index * 4);
        self.data_index += 1;

        if self.data_index == self.data_cycles {
            return self.advance();
        }
        None
    }

    fn decode_turnaround(&mut self) -> Option<LpcCycle> {
        self.tar_cycles -= 1;

        if self.tar_cycles == 0 {
            return self.advance();
        }
        None
    }

    fn decode_sync(&mut self, lad: u8) -> Option<LpcCycle> {
        if lad == 0 {
            return self.advance();
        }
        trace!("[{}] SYNC not ready ({:#x})", self.name, lad);
        None
    }

    /// Handle one falling LCLK edge
    fn clock_falling(&mut self, sample: &Sample) -> Option<LpcCycle> {
        let lad = self.signals.lad(sample);

        if self.signals.frame_asserted(sample) {
            let aborted = match self.phase() {
                Phase::WaitFrame | Phase::Start => None,
                phase => {
                    debug!(
                        "[{}] LFRAME# asserted during {} at seq {}, aborting cycle",
                        self.name, phase, sample.seq_no
                    );
                    Some(self.emit(true))
                }
            };

            self.start_last = lad;
            self.seq_no_cycle = sample.seq_no;
            self.reset_state();
            self.enter(Phase::Start);
            return aborted;
        }

        match self.phase() {
            // Bus idle
            Phase::WaitFrame => None,
            Phase::Start => {
                self.decode_start(lad);
                None
            }
            Phase::Address => self.decode_address(lad),
            Phase::Data => self.decode_data(lad),
            Phase::TurnAround => self.decode_turnaround(),
            Phase::Sync => self.decode_sync(lad),
        }
    }
}

impl Decoder for LpcDecoder {
    type Output = LpcCycle;

    fn name(&self) -> &str {
        &self.name
    }

    fn process(&mut self, sample: Sample) -> Option<LpcCycle> {
        let clk = self.signals.clock(&sample);
        let falling = self.clk_last && !clk;
        self.clk_last = clk;

        if !falling {
            return None;
        }

        trace!("[{}] {}", self.name, sample);
        self.clock_falling(&sample)
    }

    fn flush(&mut self) -> Option<LpcCycle> {
        match self.phase() {
            Phase::WaitFrame | Phase::Start => None,
            _ => {
                let cycle = self.snapshot(true);
                self.reset_state();
                Some(cycle)
            }
        }
    }

    fn reset(&mut self) {
        self.reset_state();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TAR: u8 = 0xf;
    const SYNC_READY: u8 = 0x0;
    const SYNC_LONG_WAIT: u8 = 0x6;

    /// Generates LPC bus traffic as clock high/low sample pairs
    struct Bus {
        signals: SignalMap,
        seq_no: u64,
        samples: Vec<Sample>,
    }

    impl Bus {
        fn new(signals: SignalMap) -> Self {
            Self {
                signals,
                seq_no: 0,
                samples: Vec::new(),
            }
        }

        fn sample(&mut self, clk: bool, frame_asserted: bool, lad: u8) {
            let mut value = 0u8;
            if clk {
                value |= 1 << self.signals.clk_bit();
            }
            if !frame_asserted {
                value |= 1 << self.signals.lframe_bit();
            }
            for (i, bit) in self.signals.lad_bits().iter().enumerate() {
                if lad & (1 << i) != 0 {
                    value |= 1 << bit;
                }
            }
            self.samples.push(Sample::new(self.seq_no, value));
            self.seq_no += 1;
        }

        /// One LCLK period; signals are sampled on the falling edge
        fn clock(&mut self, frame_asserted: bool, lad: u8) -> &mut Self {
            self.sample(true, frame_asserted, lad);
            self.sample(false, frame_asserted, lad);
            self
        }

        fn start(&mut self, code: u8) -> &mut Self {
            self.clock(true, code)
        }

        fn nibble(&mut self, lad: u8) -> &mut Self {
            self.clock(false, lad)
        }

        fn nibbles(&mut self, lads: &[u8]) -> &mut Self {
            for &lad in lads {
                self.nibble(lad);
            }
            self
        }

        fn io_header(&mut self, write: bool, address: u16) -> &mut Self {
            self.start(0x0).nibble(if write { 0b0010 } else { 0b0000 });
            for shift in [12, 8, 4, 0] {
                self.nibble(((address >> shift) & 0xf) as u8);
            }
            self
        }

        fn io_write(&mut self, address: u16, data: u8) -> &mut Self {
            self.io_header(true, address)
                .nibbles(&[data & 0xf, data >> 4])
                .nibbles(&[TAR, TAR, SYNC_READY, TAR, TAR])
        }

        fn io_read(&mut self, address: u16, data: u8, sync_waits: usize) -> &mut Self {
            self.io_header(false, address).nibbles(&[TAR, TAR]);
            for _ in 0..sync_waits {
                self.nibble(SYNC_LONG_WAIT);
            }
            self.nibbles(&[SYNC_READY, data & 0xf, data >> 4, TAR, TAR])
        }

        fn mem_read(&mut self, address: u32, data: u8) -> &mut Self {
            self.start(0x0).nibble(0b0100);
            for shift in (0..8).rev() {
                self.nibble(((address >> (shift * 4)) & 0xf) as u8);
            }
            self.nibbles(&[TAR, TAR, SYNC_READY, data & 0xf, data >> 4, TAR, TAR])
        }

        fn idle(&mut self, clocks: usize) -> &mut Self {
            for _ in 0..clocks {
                self.nibble(TAR);
            }
            self
        }
    }

    fn decode(decoder: &mut LpcDecoder, samples: &[Sample]) -> Vec<LpcCycle> {
        samples.iter().filter_map(|s| decoder.process(*s)).collect()
    }

    fn bus() -> Bus {
        Bus::new(SignalMap::default())
    }

    #[test]
    fn test_decoder_creation() {
        let decoder = LpcDecoder::new(SignalMap::default());
        assert_eq!(decoder.name(), "lpc_decoder");
        assert_eq!(decoder.phase(), Phase::WaitFrame);
        assert_eq!(decoder.history(), &[Phase::WaitFrame]);
        assert_eq!(decoder.cycles_emitted(), 0);

        let decoder = decoder.with_name("lpc0");
        assert_eq!(decoder.name(), "lpc0");
    }

    #[test]
    fn test_io_write_cycle() {
        let mut decoder = LpcDecoder::new(SignalMap::default());
        let mut bus = bus();
        bus.idle(2).io_write(0x0080, 0x5a).idle(2);

        let cycles = decode(&mut decoder, &bus.samples);
        assert_eq!(cycles.len(), 1);

        let cycle = &cycles[0];
        assert_eq!(cycle.cycle_type, CycleType::Io);
        assert_eq!(cycle.direction, Direction::Write);
        assert_eq!(cycle.address, 0x0080);
        assert_eq!(cycle.data, 0x5a);
        assert!(!cycle.aborted);
        // Start is the falling edge of the third clock
        assert_eq!(cycle.seq_no, 5);
        assert_eq!(
            cycle.phases.as_slice(),
            &[
                Phase::WaitFrame,
                Phase::Start,
                Phase::Address,
                Phase::Data,
                Phase::TurnAround,
                Phase::Sync,
                Phase::TurnAround,
            ]
        );
        assert_eq!(decoder.phase(), Phase::WaitFrame);
    }

    #[test]
    fn test_io_read_cycle() {
        let mut decoder = LpcDecoder::new(SignalMap::default());
        let mut bus = bus();
        bus.io_read(0x03f8, 0xc3, 0);

        let cycles = decode(&mut decoder, &bus.samples);
        assert_eq!(cycles.len(), 1);

        let cycle = &cycles[0];
        assert_eq!(cycle.cycle_type, CycleType::Io);
        assert_eq!(cycle.direction, Direction::Read);
        assert_eq!(cycle.address, 0x03f8);
        assert_eq!(cycle.data, 0xc3);
        assert!(!cycle.aborted);
        assert_eq!(
            cycle.phases.as_slice(),
            &[
                Phase::WaitFrame,
                Phase::Start,
                Phase::Address,
                Phase::TurnAround,
                Phase::Sync,
                Phase::Data,
                Phase::TurnAround,
            ]
        );
    }

    #[test]
    fn test_memory_read_uses_eight_address_nibbles() {
        let mut decoder = LpcDecoder::new(SignalMap::default());
        let mut bus = bus();
        bus.mem_read(0xfff0_1234, 0x99);

        let cycles = decode(&mut decoder, &bus.samples);
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].cycle_type, CycleType::Memory);
        assert_eq!(cycles[0].direction, Direction::Read);
        assert_eq!(cycles[0].address, 0xfff0_1234);
        assert_eq!(cycles[0].data, 0x99);
    }

    #[test]
    fn test_io_address_phase_is_four_nibbles() {
        let mut decoder = LpcDecoder::new(SignalMap::default());
        let mut bus = bus();
        bus.start(0x0).nibble(0b0010).nibbles(&[0x1, 0x2, 0x3]);
        decode(&mut decoder, &bus.samples);
        assert_eq!(decoder.phase(), Phase::Address);

        bus.samples.clear();
        bus.nibble(0x4);
        decode(&mut decoder, &bus.samples);
        assert_eq!(decoder.phase(), Phase::Data);
        assert_eq!(decoder.address, 0x1234);
    }

    #[test]
    fn test_no_falling_edge_is_noop() {
        let mut decoder = LpcDecoder::new(SignalMap::default());
        let mut bus = bus();
        bus.start(0x0).nibble(0b0010).nibbles(&[0x1, 0x2]);
        decode(&mut decoder, &bus.samples);

        // Rising edge, then the clock stays high while everything else toggles
        bus.samples.clear();
        bus.sample(true, false, 0x3);
        decode(&mut decoder, &bus.samples);
        let before = decoder.clone();

        bus.samples.clear();
        for lad in 0..16 {
            bus.sample(true, lad % 2 == 0, lad);
        }
        assert!(decode(&mut decoder, &bus.samples).is_empty());
        assert_eq!(decoder, before);

        // Same with the clock held low
        bus.samples.clear();
        bus.sample(false, false, 0x3);
        decode(&mut decoder, &bus.samples);
        let before = decoder.clone();

        bus.samples.clear();
        for lad in 0..16 {
            bus.sample(false, true, lad);
        }
        assert!(decode(&mut decoder, &bus.samples).is_empty());
        assert_eq!(decoder, before);
        assert_eq!(decoder.phase(), Phase::Address);
    }

    #[test]
    fn test_frame_asserted_mid_cycle_aborts() {
        let mut decoder = LpcDecoder::new(SignalMap::default());
        let mut bus = bus();
        bus.io_header(true, 0x0080).nibble(0xa);
        assert!(decode(&mut decoder, &bus.samples).is_empty());
        assert_eq!(decoder.phase(), Phase::Data);

        bus.samples.clear();
        bus.start(0xf);
        let cycles = decode(&mut decoder, &bus.samples);
        assert_eq!(cycles.len(), 1);
        assert!(cycles[0].aborted);
        assert_eq!(cycles[0].address, 0x0080);
        assert_eq!(cycles[0].data, 0x0a);
        assert_eq!(cycles[0].phases.last(), Some(&Phase::Data));
        assert_eq!(decoder.cycles_aborted(), 1);

        // Abort start code returns to idle on the next clock
        bus.samples.clear();
        bus.idle(1);
        assert!(decode(&mut decoder, &bus.samples).is_empty());
        assert_eq!(decoder.phase(), Phase::WaitFrame);
    }

    #[test]
    fn test_frame_asserted_during_sync_aborts() {
        let mut decoder = LpcDecoder::new(SignalMap::default());
        let mut bus = bus();
        bus.io_header(false, 0x0060)
            .nibbles(&[TAR, TAR, SYNC_LONG_WAIT, SYNC_LONG_WAIT])
            .io_read(0x0064, 0x1d, 0);

        let cycles = decode(&mut decoder, &bus.samples);
        assert_eq!(cycles.len(), 2);
        assert!(cycles[0].aborted);
        assert_eq!(cycles[0].address, 0x0060);
        assert_eq!(cycles[0].phases.last(), Some(&Phase::Sync));
        assert!(!cycles[1].aborted);
        assert_eq!(cycles[1].address, 0x0064);
        assert_eq!(cycles[1].data, 0x1d);
    }

    #[test]
    fn test_sync_wait_does_not_grow_history() {
        let mut decoder = LpcDecoder::new(SignalMap::default());
        let mut bus = bus();
        bus.io_header(false, 0x0070).nibbles(&[TAR, TAR]);
        decode(&mut decoder, &bus.samples);
        assert_eq!(decoder.phase(), Phase::Sync);
        let depth = decoder.history().len();

        for _ in 0..5 {
            bus.samples.clear();
            bus.nibble(SYNC_LONG_WAIT);
            assert!(decode(&mut decoder, &bus.samples).is_empty());
            assert_eq!(decoder.phase(), Phase::Sync);
            assert_eq!(decoder.history().len(), depth);
        }

        bus.samples.clear();
        bus.nibbles(&[SYNC_READY, 0x5, 0xa, TAR, TAR]);
        let cycles = decode(&mut decoder, &bus.samples);
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].data, 0xa5);
        assert_eq!(cycles[0].address, 0x0070);
    }

    #[test]
    fn test_unsupported_cycle_types_are_rejected() {
        for type_nibble in [0b1000, 0b1010, 0b1100, 0b1110] {
            let mut decoder = LpcDecoder::new(SignalMap::default());
            let mut bus = bus();
            bus.start(0x0).nibble(type_nibble);
            assert!(decode(&mut decoder, &bus.samples).is_empty());
            assert_eq!(decoder.phase(), Phase::WaitFrame);
            assert_eq!(decoder.history(), &[Phase::WaitFrame]);
            assert_eq!(decoder.cycles_rejected(), 1);

            // Trailing nibbles are ignored while idle
            bus.samples.clear();
            bus.nibbles(&[0x1, 0x2, 0x3, 0x4, TAR, TAR, SYNC_READY, TAR, TAR]);
            assert!(decode(&mut decoder, &bus.samples).is_empty());
            assert_eq!(decoder.phase(), Phase::WaitFrame);
        }
    }

    #[test]
    fn test_abort_start_code_returns_to_idle() {
        let mut decoder = LpcDecoder::new(SignalMap::default());
        let mut bus = bus();
        bus.start(0xf).nibble(0x0);
        assert!(decode(&mut decoder, &bus.samples).is_empty());
        assert_eq!(decoder.phase(), Phase::WaitFrame);
        assert_eq!(decoder.cycles_emitted(), 0);
    }

    #[test]
    fn test_bus_master_grant_stays_in_start() {
        let mut decoder = LpcDecoder::new(SignalMap::default());
        let mut bus = bus();
        bus.start(0x2).nibbles(&[0x0, 0x1, 0x2]);
        assert!(decode(&mut decoder, &bus.samples).is_empty());
        assert_eq!(decoder.phase(), Phase::Start);

        // A new start from the pending START phase is not an abort
        bus.samples.clear();
        bus.io_write(0x0080, 0x11);
        let cycles = decode(&mut decoder, &bus.samples);
        assert_eq!(cycles.len(), 1);
        assert!(!cycles[0].aborted);
        assert_eq!(cycles[0].data, 0x11);
    }

    #[test]
    fn test_last_start_code_wins() {
        let mut decoder = LpcDecoder::new(SignalMap::default());
        let mut bus = bus();
        bus.start(0xf).io_write(0x002e, 0x87);

        let cycles = decode(&mut decoder, &bus.samples);
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].address, 0x002e);
        assert_eq!(cycles[0].data, 0x87);
        // Stamped with the sample of the last LFRAME# clock
        assert_eq!(cycles[0].seq_no, 3);
    }

    #[test]
    fn test_back_to_back_cycles() {
        let mut decoder = LpcDecoder::new(SignalMap::default());
        let mut bus = bus();
        bus.io_write(0x0080, 0x01)
            .io_read(0x0071, 0x42, 2)
            .idle(3)
            .mem_read(0x000f_fff0, 0xea)
            .io_write(0x0080, 0x02);

        let cycles = decode(&mut decoder, &bus.samples);
        let summary: Vec<_> = cycles
            .iter()
            .map(|c| (c.cycle_type, c.direction, c.address, c.data, c.aborted))
            .collect();
        assert_eq!(
            summary,
            vec![
                (CycleType::Io, Direction::Write, 0x0080, 0x01, false),
                (CycleType::Io, Direction::Read, 0x0071, 0x42, false),
                (CycleType::Memory, Direction::Read, 0x000f_fff0, 0xea, false),
                (CycleType::Io, Direction::Write, 0x0080, 0x02, false),
            ]
        );
        assert_eq!(decoder.cycles_emitted(), 4);
        assert_eq!(decoder.cycles_aborted(), 0);
    }

    #[test]
    fn test_flush_reports_in_flight_cycle() {
        let mut decoder = LpcDecoder::new(SignalMap::default());
        let mut bus = bus();
        bus.io_header(true, 0x0080);
        decode(&mut decoder, &bus.samples);

        let pending = decoder.flush().unwrap();
        assert!(pending.aborted);
        assert_eq!(pending.address, 0x0080);
        assert_eq!(decoder.phase(), Phase::WaitFrame);
        assert!(decoder.flush().is_none());
        // Not counted as an emitted cycle
        assert_eq!(decoder.cycles_emitted(), 0);
    }

    #[test]
    fn test_reset_drops_cycle() {
        let mut decoder = LpcDecoder::new(SignalMap::default());
        let mut bus = bus();
        bus.io_header(true, 0x0080).nibble(0x3);
        decode(&mut decoder, &bus.samples);
        assert_eq!(decoder.phase(), Phase::Data);

        decoder.reset();
        assert_eq!(decoder.phase(), Phase::WaitFrame);
        assert_eq!(decoder.address, 0);
        assert_eq!(decoder.data, 0);
    }

    #[test]
    fn test_custom_signal_map() {
        let signals = SignalMap::new(7, 6, [0, 1, 2, 3]).unwrap();
        let mut decoder = LpcDecoder::new(signals);
        let mut bus = Bus::new(signals);
        bus.io_write(0x0cf9, 0x06);

        let cycles = decode(&mut decoder, &bus.samples);
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].address, 0x0cf9);
        assert_eq!(cycles[0].data, 0x06);
    }
}
