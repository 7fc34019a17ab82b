//! hbnb CLI
//!
//! Opens the configured storage backend and runs the console on stdin.

use std::io::{self, IsTerminal};

use clap::Parser;
use hbnb_engine::{run_session, Console};

mod args;

fn run(cli: args::Cli) -> Result<(), Box<dyn std::error::Error>> {
    hbnb_core::logging_facility::init(cli.log_format, cli.verbose);

    let config = cli.storage_config();
    tracing::debug!(backend = %config.backend, "opening storage");
    let storage = hbnb_store::open_storage(&config)?;

    let mut console = Console::new(storage);
    let interactive = io::stdin().is_terminal();
    run_session(
        &mut console,
        io::stdin().lock(),
        &mut io::stdout().lock(),
        interactive,
    )?;
    console.close()?;

    Ok(())
}

fn main() {
    dotenvy::dotenv().ok();
    let cli = args::Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
