//! `cryptex` — operator CLI for issuing and verifying tokens.
//!
//! Startup sequence:
//! 1. Parse command-line arguments.
//! 2. Load and validate [`Config`] from environment variables.
//! 3. Initialise structured JSON logging on stderr.
//! 4. Run the selected command against stdin/stdout.

mod cli;
mod commands;
mod config;
mod telemetry;

use anyhow::Result;
use clap::Parser;

use cli::Cli;
use config::Config;

fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Arguments
    // -----------------------------------------------------------------------
    let cli = Cli::parse();

    // -----------------------------------------------------------------------
    // 2. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 3. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init(&cfg.log_level)?;

    // -----------------------------------------------------------------------
    // 4. Command
    // -----------------------------------------------------------------------
    let settings = commands::Settings::resolve(&cli, &cfg);
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    commands::run(cli.command, &settings, &mut stdin.lock(), &mut stdout.lock())
}
