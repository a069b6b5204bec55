mod app;
mod cli;
mod config;
mod effects;
mod render;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use engine_logging::{LevelFilter, LogDestination, DEFAULT_LOG_FILE};

fn main() -> anyhow::Result<ExitCode> {
    let args = cli::Args::parse();

    let log_path = args
        .log_file
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));
    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    engine_logging::initialize(LogDestination::File(log_path), level);

    app::run(args)
}
