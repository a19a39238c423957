//! Pyshape CLI - line-indexed syntax metadata for Python programs
//!
//! Without a subcommand the binary answers exactly one JSON request read from
//! standard input. Logs go to standard error so that standard output carries
//! nothing but the response.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::{Cli, Commands};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing/logging; RUST_LOG takes precedence over --verbose
    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            cli::report_failure(&err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match &cli.command {
        Some(Commands::PrintDefaultConfig) => return cli::print_default_config(),
        Some(Commands::ListKinds) => return cli::list_kinds(),
        _ => {}
    }

    let config = cli::build_config(&cli)?;
    match cli.command {
        Some(Commands::Analyze(args)) => cli::analyze_command(args, config),
        _ => cli::exchange_command(config),
    }
}
