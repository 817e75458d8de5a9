//! huffpack: command-line front end for huffpack-core.
//!
//! Owns everything the core library does not: argument parsing, reading and
//! writing files, counting symbols, naming the decoded output, and reporting.

mod config;
mod input;

use std::fs;
use std::io;
use std::process::ExitCode;

use huffpack_core::codes::CodeTable;
use huffpack_core::error::{Error, Result};
use huffpack_core::framing::{encode_frame, parse_frame, EncodedFrame};
use huffpack_core::stats::CodingStats;
use huffpack_core::tree::tally;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use crate::config::{decoded_path, Config, Mode, SymbolMode};

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = match Config::from_args(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            eprintln!("run with --help for usage");
            return ExitCode::from(2);
        }
    };

    init_logging(config.verbose);

    if config.print_config {
        config.print();
    }

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(config: &Config) -> Result<()> {
    match config.mode {
        Mode::Encode => run_encode(config),
        Mode::Decode => run_decode(config),
        Mode::RoundTrip => run_roundtrip(config),
    }
}

/// Encode raw input into a frame.
fn encode(data: &[u8], mode: SymbolMode) -> Result<(EncodedFrame, CodingStats)> {
    let mut stats = CodingStats::new();
    stats.input_bytes = data.len() as u64;

    let symbols = input::to_symbols(data, mode)?;
    let freqs = tally(symbols.iter().copied());
    let encoded = encode_frame(&symbols, &freqs)?;

    stats.record_code(&freqs, &encoded.table);
    stats.record_frame(
        encoded.header_len,
        encoded.payload.total_bits,
        encoded.bytes.len(),
    );
    stats.complete();

    Ok((encoded, stats))
}

/// Decode a frame into output bytes.
fn decode(frame_bytes: &[u8], mode: SymbolMode) -> Result<(Vec<u8>, CodingStats)> {
    let mut stats = CodingStats::new();

    let frame = parse_frame(frame_bytes)?;
    let symbols = frame.decode()?;
    let output = input::from_symbols(&symbols, mode)?;

    stats.input_bytes = output.len() as u64;
    stats.record_code(&tally(symbols.iter().copied()), &frame.table);
    stats.record_frame(frame.header_len, frame.payload.total_bits, frame_bytes.len());
    stats.complete();

    Ok((output, stats))
}

/// Read the input file, or generate sample text when none is configured.
fn load_input(config: &Config) -> Result<Vec<u8>> {
    match &config.input_file {
        Some(path) => {
            let data = fs::read(path)?;
            info!("read {} bytes from {}", data.len(), path.display());
            Ok(data)
        }
        None => {
            info!(
                "no input file; generating {} bytes of sample text (seed {})",
                config.sample_bytes, config.seed
            );
            Ok(input::generate_sample_text(config.seed, config.sample_bytes).into_bytes())
        }
    }
}

fn run_encode(config: &Config) -> Result<()> {
    let data = load_input(config)?;
    let (encoded, stats) = encode(&data, config.symbols)?;

    fs::write(&config.output_file, &encoded.bytes)?;
    info!(
        "wrote {} byte frame to {}",
        encoded.bytes.len(),
        config.output_file.display()
    );

    report(config, &encoded.table, &stats);
    Ok(())
}

fn run_decode(config: &Config) -> Result<()> {
    let frame = load_input(config)?;
    let (output, stats) = decode(&frame, config.symbols)?;

    fs::write(&config.output_file, &output)?;
    info!(
        "decoded {} bytes to {}",
        output.len(),
        config.output_file.display()
    );

    if config.print_stats {
        stats.print_summary();
    }
    Ok(())
}

/// Encode to the output path, decode what was written next to it, and verify.
fn run_roundtrip(config: &Config) -> Result<()> {
    let data = load_input(config)?;
    let (encoded, stats) = encode(&data, config.symbols)?;
    fs::write(&config.output_file, &encoded.bytes)?;
    info!(
        "wrote {} byte frame to {}",
        encoded.bytes.len(),
        config.output_file.display()
    );

    let written = fs::read(&config.output_file)?;
    let (decoded, _) = decode(&written, config.symbols)?;
    let decoded_file = decoded_path(&config.output_file);
    fs::write(&decoded_file, &decoded)?;
    info!("decoded text has been written to {}", decoded_file.display());

    verify(&data, &decoded)?;
    report(config, &encoded.table, &stats);
    println!(
        "✓ Round trip verified: {} bytes -> {} byte frame -> {} bytes",
        data.len(),
        encoded.bytes.len(),
        decoded.len()
    );
    Ok(())
}

/// Compare original and decoded data by length and CRC32.
fn verify(original: &[u8], decoded: &[u8]) -> Result<()> {
    let expected = crc32fast::hash(original);
    let actual = crc32fast::hash(decoded);
    debug!(expected, actual, "round trip checksums");

    if original.len() != decoded.len() || expected != actual {
        return Err(Error::Io(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "round trip mismatch: {} bytes (crc {:#010x}) became {} bytes (crc {:#010x})",
                original.len(),
                expected,
                decoded.len(),
                actual
            ),
        )));
    }
    Ok(())
}

fn report(config: &Config, table: &CodeTable, stats: &CodingStats) {
    if config.print_table {
        print_table(table, config.symbols);
    }
    if config.print_stats {
        stats.print_summary();
    }
}

/// Print the code table, one symbol per line.
fn print_table(table: &CodeTable, mode: SymbolMode) {
    println!("=== Code Table ===");
    for (symbol, code) in table.iter() {
        let shown = match (mode, char::from_u32(symbol)) {
            (SymbolMode::Text, Some(c)) if !c.is_control() => format!("{:?}", c),
            _ => String::new(),
        };
        println!("{:>8}  {:<6}  {}", symbol, shown, code);
    }
    println!();
}
