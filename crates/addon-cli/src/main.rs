//! Addon Manager CLI
//!
//! The command-line interface for discovering addon modules and resolving
//! their dependencies.

mod cli;
mod commands;
mod context;
mod error;

use std::io::Write;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use context::AppContext;
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let ctx = AppContext::from_cli(&cli);
    tracing::debug!(?ctx, "invocation context");

    match cli.command {
        Some(command) => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            commands::execute(&ctx, command, &mut out)?;
            out.flush()?;
            Ok(())
        }
        None => {
            println!("{} Addon Manager CLI", "addons".green().bold());
            println!();
            println!("Run {} for available commands.", "addons --help".cyan());
            Ok(())
        }
    }
}

/// Log to stderr: `--verbose` forces debug, otherwise `RUST_LOG` or warn.
/// Called once from `run`, before any command executes.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .init();
}
