//! Command implementations for addon-cli
//!
//! Every command writes its regular output to the given writer so it can be
//! captured in tests; diagnostics go through `tracing`.

pub mod config;
pub mod format;
pub mod module;
pub mod path;
pub mod platform;

use std::io::Write;

use crate::cli::Commands;
use crate::context::AppContext;
use crate::error::Result;

/// Dispatch one parsed command.
pub fn execute(ctx: &AppContext, command: Commands, out: &mut impl Write) -> Result<()> {
    match command {
        Commands::Module { action } => module::run(ctx, action, out),
        Commands::Path { action } => path::run(ctx, action, out),
        Commands::Config { action } => config::run(ctx, action, out),
        Commands::Platform { action } => platform::run(action, out),
    }
}
