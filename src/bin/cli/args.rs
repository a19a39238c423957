//! CLI argument structures.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use pyshape_rs::Mode;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Line-indexed syntax metadata for Python programs
#[derive(Parser)]
#[command(name = "pyshape")]
#[command(version = VERSION)]
#[command(about = "Report which Python constructs appear on which lines")]
#[command(long_about = "
Reads one JSON request from standard input and writes one JSON response to
standard output. The request names the source and, optionally, the view:

  {\"code\": \"x = 1\\ny = True\", \"mode\": \"simple\"}

Modes: simple, complex, hierarchical, concepts (default: simple).

Common Usage:

  # Answer a single request from stdin
  echo '{\"code\": \"if x:\\n    y = 1\", \"mode\": \"complex\"}' | pyshape

  # Analyze a file directly
  pyshape analyze script.py --mode hierarchical

  # Show the default configuration
  pyshape print-default-config
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose logging for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (YAML)
    #[arg(long, global = true, env = "PYSHAPE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Pretty-print the JSON response
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Mode used when a request does not name one
    #[arg(long, global = true)]
    pub default_mode: Option<Mode>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a Python source file
    Analyze(AnalyzeArgs),

    /// Print default configuration in YAML format
    #[command(name = "print-default-config")]
    PrintDefaultConfig,

    /// List the node kinds that are skipped or rendered from their value
    #[command(name = "list-kinds")]
    ListKinds,
}

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Python source file
    pub file: PathBuf,

    /// Traversal mode (defaults to the configured default mode)
    #[arg(short, long)]
    pub mode: Option<Mode>,
}
