//! lpc-dec: Low Pin Count bus decoder
//!
//! Decodes the LPC cycles in a raw analyzer capture and prints one line per
//! cycle.
//!
//! Usage:
//!   lpc-dec --input capture.bin
//!
//! With phase history, a custom probe layout and CSV output:
//!   lpc-dec --input capture.bin --verbose \
//!       --clk 0 --lframe 1 --lad 5,4,3,2 \
//!       --csv-output cycles.csv

use clap::Parser;
use lpc::{CaptureSource, CycleCsvWriter, CyclePrinter, LpcDecoder, Pipeline, SignalMap};
use std::error::Error;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "lpc-dec", author, version, about = "Low Pin Count Bus protocol decoder", long_about = None)]
struct Args {
    /// Path to the analyzer capture
    #[arg(short, long)]
    input: PathBuf,

    /// Dump the state transitions encountered for each cycle
    #[arg(short, long)]
    verbose: bool,

    /// Sample bit carrying LCLK
    #[arg(long, default_value_t = 0)]
    clk: u8,

    /// Sample bit carrying LFRAME#
    #[arg(long, default_value_t = 1)]
    lframe: u8,

    /// Sample bits carrying LAD[0],LAD[1],LAD[2],LAD[3]
    #[arg(long, value_delimiter = ',', default_values_t = [5u8, 4, 3, 2])]
    lad: Vec<u8>,

    /// Number of cycles to decode (0 = unlimited)
    #[arg(short = 'n', long, default_value_t = 0)]
    max_cycles: u64,

    /// CSV output file path (optional)
    #[arg(long)]
    csv_output: Option<PathBuf>,
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let lad: [u8; 4] = args.lad.as_slice().try_into().map_err(|_| {
        format!(
            "--lad needs exactly 4 bit positions, got {}",
            args.lad.len()
        )
    })?;
    let signals = SignalMap::new(args.clk, args.lframe, lad)?;

    info!("Input: {}", args.input.display());
    info!("Signals: LCLK={}, LFRAME#={}, LAD={:?}", args.clk, args.lframe, lad);

    let source = CaptureSource::open(&args.input)?;
    let decoder = LpcDecoder::new(signals);

    let mut pipeline = Pipeline::new(source, decoder).with_max_events(args.max_cycles);
    pipeline.add_sink(CyclePrinter::new(BufWriter::new(io::stdout()), args.verbose));

    if let Some(csv_path) = &args.csv_output {
        info!("CSV output: {}", csv_path.display());
        pipeline.add_sink(CycleCsvWriter::create(csv_path)?);
    }

    let stats = pipeline.run()?;
    let decoder = pipeline.decoder();
    info!(
        "{} samples, {} cycles ({} aborted, {} unsupported){}",
        stats.samples,
        decoder.cycles_emitted(),
        decoder.cycles_aborted(),
        decoder.cycles_rejected(),
        if stats.truncated { ", capture ends mid-cycle" } else { "" }
    );

    Ok(())
}

fn main() -> ExitCode {
    // Logs go to stderr, decoded cycles to stdout
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            // --help and --version print to stdout and succeed
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
