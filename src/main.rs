//! Main entry point for the ziptree CLI application.
//!
//! The archive and extract operations are blocking; they run on a tokio
//! blocking thread while the main task waits for Ctrl-C and raises the
//! cancellation flag when it arrives.

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing_subscriber::EnvFilter;

use ziptree::cli::Command;
use ziptree::{Cli, EntryInfo, Options, ZipArchiver, ZipExtractor};

/// Application entry point.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    let cancel = Arc::new(AtomicBool::new(false));
    let options = Options::default()
        .with_chunk_size(cli.chunk_size)
        .with_cancel_flag(cancel.clone());

    let mut task = tokio::task::spawn_blocking(move || run(&cli, &options));

    tokio::select! {
        joined = &mut task => joined.context("worker thread panicked")?,
        Ok(()) = tokio::signal::ctrl_c() => {
            eprintln!("Interrupted, stopping...");
            cancel.store(true, Ordering::Relaxed);
            task.await.context("worker thread panicked")?
        }
    }
}

/// Install the log subscriber. `RUST_LOG` wins; otherwise `-q` lowers the
/// default level from `info` to `warn`, and `-qq` to `error`.
fn init_tracing(cli: &Cli) {
    let default = if cli.is_very_quiet() {
        "error"
    } else if cli.is_quiet() {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Dispatch the parsed subcommand.
fn run(cli: &Cli, options: &Options) -> Result<()> {
    match &cli.command {
        Command::Archive { source, archive } => {
            let stats = ZipArchiver::new(options).archive(source, archive)?;
            if !cli.is_quiet() {
                println!(
                    "  created: {} ({} directories, {} files, {})",
                    archive.display(),
                    stats.directories,
                    stats.files,
                    format_size(stats.bytes)
                );
            }
        }
        Command::Extract {
            archive,
            extract_dir,
        } => {
            let stats = ZipExtractor::new(options).extract_all(archive, extract_dir)?;
            if !cli.is_quiet() {
                println!(
                    "  extracted: {} ({} directories, {} files, {})",
                    extract_dir.display(),
                    stats.directories,
                    stats.files,
                    format_size(stats.bytes)
                );
            }
        }
        Command::List { archive, verbose } => {
            let entries = ZipExtractor::new(options).list_files(archive)?;
            list_files(&entries, *verbose);
        }
    }
    Ok(())
}

/// List entries in the ZIP archive.
///
/// Supports two output formats:
/// - Simple format: Just entry names, one per line
/// - Verbose format (`-v`): Detailed table with size, compression ratio, and timestamps
fn list_files(entries: &[EntryInfo], verbose: bool) {
    if verbose {
        // Print table header for verbose output
        println!(
            "{:>10}  {:>10}  {:>5}  {:>10}  {:>5}  Name",
            "Length", "Size", "Cmpr", "Date", "Time"
        );
        println!("{}", "-".repeat(70));
    }

    // Track totals for summary line
    let mut total_uncompressed = 0u64;
    let mut total_compressed = 0u64;
    let mut file_count = 0usize;

    for entry in entries {
        if !verbose {
            println!("{}", entry.file_name);
            continue;
        }

        let (year, month, day) = entry.mod_date();
        let (hour, minute, _second) = entry.mod_time();
        println!(
            "{:>10}  {:>10}  {}  {:04}-{:02}-{:02}  {:02}:{:02}  {}",
            entry.uncompressed_size,
            entry.compressed_size,
            ratio(entry.compressed_size, entry.uncompressed_size),
            year,
            month,
            day,
            hour,
            minute,
            entry.file_name
        );

        // Accumulate totals (excluding directories)
        if !entry.is_directory {
            total_uncompressed += entry.uncompressed_size;
            total_compressed += entry.compressed_size;
            file_count += 1;
        }
    }

    if verbose {
        println!("{}", "-".repeat(70));
        println!(
            "{:>10}  {:>10}  {}  {:>21}  {} files",
            total_uncompressed,
            total_compressed,
            ratio(total_compressed, total_uncompressed),
            "",
            file_count
        );
    }
}

/// Compression ratio as percentage saved. Incompressible data can grow
/// slightly under DEFLATE, which shows as 0%.
fn ratio(compressed: u64, uncompressed: u64) -> String {
    if uncompressed > 0 && compressed <= uncompressed {
        format!("{:>4}%", 100 - (compressed * 100 / uncompressed))
    } else {
        "  0%".to_string()
    }
}

/// Format a byte size into a human-readable string.
///
/// Automatically selects the appropriate unit (bytes, KB, MB, GB)
/// based on the size magnitude.
fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}
