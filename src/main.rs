//! claimboost - Main Entry Point
//!
//! Trains the claim classifier described by a YAML configuration.

use clap::Parser;
use claimboost::cli::{cmd_run, Cli};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    claimboost::logging::init(Some(&cli.log_file))?;

    cmd_run(&cli.config_path, cli.skip_download)?;
    Ok(())
}
