//! sheetsync: push CRM update notifications into a spreadsheet column.
//!
//! # Usage
//!
//! ```text
//! sheetsync init [--force]
//! sheetsync status [--settings <file>] [--json]
//! sheetsync sync <channel> --messages <file> --workbook <file> [--settings <file>] [--batch] [--dry-run] [--json]
//! sheetsync range <a1-range> --occupied <n> --count <n>
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{init::InitArgs, range::RangeArgs, status::StatusArgs, sync::SyncArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "sheetsync",
    version,
    about = "Synchronize CRM users and accounts into a spreadsheet column",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a default settings file to ~/.sheetsync/settings.yaml.
    Init(InitArgs),

    /// Show connector health derived from the settings.
    Status(StatusArgs),

    /// Run a batch of channel notifications through the pipeline.
    Sync(SyncArgs),

    /// Compute where new rows would be inserted below a range.
    Range(RangeArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Init(args) => args.run(),
        Commands::Status(args) => args.run(),
        Commands::Sync(args) => args.run(),
        Commands::Range(args) => args.run(),
    }
}

/// Logs go to stderr so stdout stays parseable with `--json`.
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
