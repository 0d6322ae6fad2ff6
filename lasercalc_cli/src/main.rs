//! `lasercalc` -- command-line front end for lasercalc_core.
//!
//! Reads calculation inputs as JSON, prints results as JSON (or a text
//! report), and manages `.lcw` job worksheets. A failed calculation prints
//! the structured `CalcError` JSON on stderr and exits non-zero.

mod cli;
mod commands;

use clap::Parser;
use lasercalc_core::CalcError;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    let result = match &cli.command {
        Commands::Calc(args) => commands::calc(&cli.global, args),
        Commands::Template(args) => commands::template(&cli.global, args),
        Commands::Lookup(cmd) => commands::lookup(cmd),
        Commands::Worksheet(cmd) => commands::worksheet(&cli.global, cmd),
    };

    if let Err(err) = result {
        match err.downcast_ref::<CalcError>() {
            Some(calc_err) => match serde_json::to_string_pretty(calc_err) {
                Ok(json) => eprintln!("{}", json),
                Err(_) => eprintln!("error: {}", calc_err),
            },
            None => eprintln!("error: {:#}", err),
        }
        std::process::exit(1);
    }
}

/// `-v` forces `lasercalc=debug`; otherwise RUST_LOG decides and the
/// default is silent.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        Some(EnvFilter::new("lasercalc=debug"))
    } else {
        EnvFilter::try_from_default_env().ok()
    };
    if let Some(filter) = filter {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}
