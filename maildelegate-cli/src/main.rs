//! maildelegate: synchronize mailbox delegation rights from a CSV file.
//!
//! # Usage
//!
//! ```text
//! maildelegate [-f delegate_in.csv] [-y]          apply intents after confirmation
//! maildelegate -q [-o current_records.csv]        dump existing delegations
//! ```
//!
//! Organization id and token come from `~/.maildelegate/config.yaml`
//! (or `--config`) and `MAILDELEGATE_*` environment variables.

mod commands;
mod logging;
mod prompt;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};

use maildelegate_core::config;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "maildelegate",
    version,
    about = "Synchronize mailbox delegation rights from a CSV file",
    long_about = None,
)]
struct Cli {
    /// Input csv file to process.
    #[arg(short = 'f', long = "file", value_name = "FILE", default_value = "delegate_in.csv")]
    input_file: PathBuf,

    /// Query current configuration instead of applying the input file.
    #[arg(short = 'q', long = "query")]
    query_mode: bool,

    /// Snapshot file written in query mode.
    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        default_value = "current_records.csv"
    )]
    output: PathBuf,

    /// Settings file (default: ~/.maildelegate/config.yaml).
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Apply without the interactive confirmation.
    #[arg(short = 'y', long, conflicts_with = "query_mode")]
    yes: bool,

    /// More log output on stderr (-v info, -vv debug).
    #[arg(short = 'v', long, action = ArgAction::Count)]
    verbose: u8,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let settings = config::load(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?settings, "loaded settings");

    if cli.query_mode {
        commands::query::run(&settings, &cli.output)
    } else {
        commands::apply::run(&settings, &cli.input_file, cli.yes)
    }
}
