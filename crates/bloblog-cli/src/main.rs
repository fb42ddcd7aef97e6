/// Blob-log command-line tool — inspect and validate append-only blob
/// logs without loading whole records into memory.
///
/// # Command overview
///
/// ```text
/// bloblog <COMMAND> [OPTIONS]
///
/// Commands:
///   inspect    Print a human-readable summary of each record in a log
///   validate   Check a log file for structural correctness
///   help       Print help information
/// ```
///
/// # Exit codes
///
/// | Code | Meaning                                 |
/// |------|-----------------------------------------|
/// | 0    | Success                                 |
/// | 1    | Error (I/O failure, invalid log, etc.)  |
///
/// All error details are written to stderr so stdout can be piped cleanly.
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod cmd_inspect;
mod cmd_validate;

// ── CLI root ──────────────────────────────────────────────────────────────────

/// The blob-log command-line tool.
#[derive(Parser)]
#[command(name = "bloblog", version, about = "Blob log inspection CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

// ── Sub-commands ──────────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum Commands {
    /// Print a human-readable summary of each record in a log file.
    Inspect(InspectArgs),
    /// Check a log file for structural correctness.
    Validate(ValidateArgs),
}

// ── Argument structs ──────────────────────────────────────────────────────────

/// Arguments for `bloblog inspect`.
///
/// Streams the log and prints one summary line per record (or a single
/// record when `--record` is set).
///
/// ```text
/// ┌─────────────┬───────────────────────────────────────────────────────┐
/// │ Flag        │ Effect                                                │
/// ├─────────────┼───────────────────────────────────────────────────────┤
/// │ --show-body │ Include first 80 chars of record payload (UTF-8 lossy)│
/// │ --show-hex  │ Include 16-byte-per-line hex dump of record payload   │
/// │ --record N  │ Show only the record with index N                     │
/// │ --verify    │ Recompute CRC-32 of each payload and flag mismatches  │
/// └─────────────┴───────────────────────────────────────────────────────┘
/// ```
#[derive(clap::Args)]
pub struct InspectArgs {
    /// Path to the log file to inspect.
    pub file: PathBuf,

    /// Show record payload content (first 80 characters, UTF-8 lossy).
    #[arg(long)]
    pub show_body: bool,

    /// Show raw hex dump of record payloads (16 bytes per line).
    #[arg(long)]
    pub show_hex: bool,

    /// Inspect only the record with this index.
    #[arg(long)]
    pub record: Option<u32>,

    /// Recompute each payload's CRC-32 and compare against the stored field.
    #[arg(long)]
    pub verify: bool,
}

/// Arguments for `bloblog validate`.
///
/// Attempts a full streaming decode of the log and reports either a set
/// of success checkmarks or a diagnostic error. The process exits with
/// code 0 on success and code 1 on any structural problem.
#[derive(clap::Args)]
pub struct ValidateArgs {
    /// Path to the log file to validate.
    pub file: PathBuf,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Inspect(args) => cmd_inspect::run(&args).await,
        Commands::Validate(args) => cmd_validate::run(&args).await,
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}
