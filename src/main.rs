//! bpbind - bind source breakpoints into a debug adapter session
//!
//! `main` stays synchronous: breakpoint binding blocks on the session
//! runtime, which must not be the thread doing the blocking.

use std::path::PathBuf;

use bpbind::commands::Commands;
use bpbind::common::{config::Config, logging};
use bpbind::{cli, Result};
use clap::Parser;

#[derive(Parser)]
#[command(name = "bpbind", about = "Bind breakpoints into a debug adapter session")]
#[command(version, long_about = None)]
struct Cli {
    /// Configuration file (default: platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Also write a detailed log to the data directory
    #[arg(long, global = true)]
    log_file: bool,

    #[command(subcommand)]
    command: Commands,
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    cli::dispatch(cli.command, config)
}

fn main() {
    let cli = Cli::parse();

    if cli.log_file {
        if let Some(path) = logging::init_with_file() {
            tracing::debug!(path = %path.display(), "Logging to file");
        }
    } else {
        logging::init_cli();
    }

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
