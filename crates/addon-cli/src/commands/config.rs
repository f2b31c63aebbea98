//! `config` commands: get, set, ls, path

use std::io::Write;

use crate::cli::ConfigAction;
use crate::context::AppContext;
use crate::error::Result;

pub fn run(ctx: &AppContext, action: ConfigAction, out: &mut impl Write) -> Result<()> {
    match action {
        ConfigAction::Get { key } => {
            // A missing key prints nothing and still succeeds.
            if let Some(value) = ctx.options()?.get(&key) {
                writeln!(out, "{value}")?;
            }
        }
        ConfigAction::Set { key, value } => {
            let mut options = ctx.options()?;
            options.set(&key, &value)?;
            options.save()?;
            tracing::debug!(key = %key, path = %options.path(), "option saved");
        }
        ConfigAction::Ls => {
            for (key, value) in ctx.options()?.entries() {
                writeln!(out, "{key} = {value}")?;
            }
        }
        ConfigAction::Path => {
            writeln!(out, "{}", ctx.config_path()?)?;
        }
    }
    Ok(())
}
