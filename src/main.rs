//! Rhythm Refiner - summarize playlists and recommend tracks from the command line.

use clap::Parser;
use rhythm_refiner::cli;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Logs go to stderr so `--json` output on stdout stays machine-readable
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(args.verbose)));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();

    cli::run_command(&args)
}

fn default_filter(verbose: bool) -> &'static str {
    // Engine and catalog events log under short targets, not the crate path
    if verbose {
        "warn,rhythm_refiner=debug,recommend=debug,catalog=debug"
    } else {
        "warn,rhythm_refiner=info,recommend=info,catalog=info"
    }
}
