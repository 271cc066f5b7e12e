//! The main entry point for the `zrep` command-line application.
//!
//! This file is responsible for parsing command-line arguments, setting up
//! logging and dispatching to the engine in the `zrep` library.

use anyhow::Context;
use std::io;
use std::process;
use tracing_subscriber::EnvFilter;
use zrep::cli::{self, Args};
use zrep::engine;
use zrep::{OutputFormat, OutputFormatter};

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_env("ZREP_LOG")
        .unwrap_or_else(|_| EnvFilter::new(format!("zrep={default_level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn execute(args: &Args) -> anyhow::Result<()> {
    let request = args.to_request();
    let summary = if args.dry_run {
        engine::preview_summary(&request)?
    } else {
        engine::run(&request)?
    };

    let formatter = OutputFormatter::new(OutputFormat::from(args.format.as_str()));
    let mut stdout = io::stdout().lock();
    formatter
        .write_output(&mut stdout, &summary)
        .context("failed to write report")?;
    Ok(())
}

fn main() {
    let args = cli::parse_args();
    init_logging(args.verbose);

    if let Err(e) = execute(&args) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
