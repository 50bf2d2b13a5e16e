//! `ejson-tool` command-line entry point.
//!
//! Startup sequence:
//! 1. Parse the command line (flags fall back to `EJSON_KEY` and `LOG_LEVEL`).
//! 2. Initialise structured JSON logging on stderr.
//! 3. Run the selected command against stdout.

mod cli;
mod commands;
mod telemetry;

use anyhow::Result;
use clap::Parser;

use crate::cli::Cli;

fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Command line
    // -----------------------------------------------------------------------
    let cli = Cli::parse();

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init(&cli.log_level)?;

    // -----------------------------------------------------------------------
    // 3. Command
    // -----------------------------------------------------------------------
    let stdout = std::io::stdout();
    commands::execute(cli.command, &mut stdout.lock())
}
