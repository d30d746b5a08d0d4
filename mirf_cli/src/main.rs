//! mirf - missing record finder for SQLite databases.
//!
//! Looks through a SQLite database for gaps in primary-key or autoincrement
//! columns: evidence that rows were deleted even when the rows themselves
//! are gone.

use clap::Parser;
use mirf_cli::cli;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = cli::Cli::parse();
    if let Err(err) = cli::run(args) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
