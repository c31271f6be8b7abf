//! Sinks for decoded LPC cycles

use super::decoders::LpcCycle;
use crate::Result;
use crate::runtime::node::Sink;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Sink that prints one line per cycle
///
/// With `verbose` set, every line also lists the phases the cycle went
/// through.
pub struct CyclePrinter<W: Write> {
    writer: W,
    verbose: bool,
    count: u64,
}

impl<W: Write> CyclePrinter<W> {
    pub fn new(writer: W, verbose: bool) -> Self {
        Self {
            writer,
            verbose,
            count: 0,
        }
    }

    /// Cycles printed so far
    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Sink<LpcCycle> for CyclePrinter<W> {
    fn name(&self) -> &str {
        "cycle_printer"
    }

    fn consume(&mut self, cycle: &LpcCycle) -> Result<()> {
        if self.verbose {
            writeln!(self.writer, "{}", cycle.verbose())?;
        } else {
            writeln!(self.writer, "{}", cycle)?;
        }
        self.count += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Sink that writes cycles to a CSV file
pub struct CycleCsvWriter<W: Write> {
    writer: W,
    count: u64,
}

impl CycleCsvWriter<BufWriter<File>> {
    /// Create (or truncate) a CSV file
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path.as_ref())?;
        debug!("CSV output: {}", path.as_ref().display());
        Self::new(BufWriter::new(file))
    }
}

impl<W: Write> CycleCsvWriter<W> {
    /// Wrap a writer and emit the CSV header
    pub fn new(mut writer: W) -> Result<Self> {
        writeln!(writer, "Id,SeqNo,Type,Direction,Address,Data,Aborted")?;
        Ok(Self { writer, count: 0 })
    }

    pub fn count(&self) -> u64 {
        self.count
    }
}

impl<W: Write> Sink<LpcCycle> for CycleCsvWriter<W> {
    fn name(&self) -> &str {
        "cycle_csv_writer"
    }

    fn consume(&mut self, cycle: &LpcCycle) -> Result<()> {
        self.count += 1;
        writeln!(
            self.writer,
            "{},{},{},{},{:#06x},{:#04x},{}",
            self.count,
            cycle.seq_no,
            cycle.cycle_type.name(),
            cycle.direction.name(),
            cycle.address,
            cycle.data,
            cycle.aborted
        )?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

impl<W: Write> Drop for CycleCsvWriter<W> {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::decoders::{CycleType, Direction, Phase, PhaseHistory};

    fn write_cycle(aborted: bool) -> LpcCycle {
        let mut phases = PhaseHistory::new();
        phases.extend([
            Phase::WaitFrame,
            Phase::Start,
            Phase::Address,
            Phase::Data,
            Phase::TurnAround,
            Phase::Sync,
            Phase::TurnAround,
        ]);
        LpcCycle {
            seq_no: 5,
            cycle_type: CycleType::Io,
            direction: Direction::Write,
            address: 0x80,
            data: 0x5a,
            phases,
            aborted,
        }
    }

    #[test]
    fn test_printer_plain() {
        let mut printer = CyclePrinter::new(Vec::new(), false);
        printer.consume(&write_cycle(false)).unwrap();
        printer.consume(&write_cycle(true)).unwrap();
        printer.finish().unwrap();
        assert_eq!(printer.count(), 2);

        let text = String::from_utf8(printer.into_inner()).unwrap();
        assert_eq!(
            text,
            "5: I/O Write 0x0080: 0x5a\n5: I/O Write 0x0080: 0x5a <ABORT>\n"
        );
    }

    #[test]
    fn test_printer_verbose() {
        let mut printer = CyclePrinter::new(Vec::new(), true);
        printer.consume(&write_cycle(false)).unwrap();

        let text = String::from_utf8(printer.into_inner()).unwrap();
        assert_eq!(
            text,
            "5: I/O Write 0x0080: 0x5a WAIT_LFRAME_ASSERTED -> START -> ADDR -> DATA -> TAR -> SYNC -> TAR\n"
        );
    }

    #[test]
    fn test_csv_rows() {
        let mut buffer = Vec::new();
        {
            let mut csv = CycleCsvWriter::new(&mut buffer).unwrap();
            csv.consume(&write_cycle(false)).unwrap();
            csv.consume(&write_cycle(true)).unwrap();
            csv.finish().unwrap();
            assert_eq!(csv.count(), 2);
        }

        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "Id,SeqNo,Type,Direction,Address,Data,Aborted");
        assert_eq!(lines[1], "1,5,I/O,Write,0x0080,0x5a,false");
        assert_eq!(lines[2], "2,5,I/O,Write,0x0080,0x5a,true");
    }
}
