//! `path` commands: ls, add, rm

use std::io::Write;
use std::path::PathBuf;

use addon_fs::{canonical_identity, is_within};
use addon_registry::{discover_addons_paths, search_roots};
use colored::Colorize;

use crate::cli::PathAction;
use crate::context::{AppContext, require_dir};
use crate::error::Result;

pub fn run(ctx: &AppContext, action: PathAction, out: &mut impl Write) -> Result<()> {
    match action {
        PathAction::Ls { paths, sorted } => run_ls(ctx, &paths, sorted, out),
        PathAction::Add { path } => run_add(ctx, path, out),
        PathAction::Rm { path } => run_rm(ctx, path, out),
    }
}

/// Print the effective search roots.
fn run_ls(ctx: &AppContext, paths: &[PathBuf], sorted: bool, out: &mut impl Write) -> Result<()> {
    let mut roots: Vec<String> = search_roots(&ctx.search_config(paths)?)
        .into_iter()
        .map(|root| root.path.as_str().to_string())
        .collect();
    if sorted {
        roots.sort();
    }
    for root in roots {
        writeln!(out, "{root}")?;
    }
    Ok(())
}

/// Record every addons directory under `path` in `options.addons_path`.
fn run_add(ctx: &AppContext, path: PathBuf, out: &mut impl Write) -> Result<()> {
    require_dir(&path)?;
    let mut options = ctx.options()?;
    let mut entries = options.addons_path();

    let mut added = Vec::new();
    for discovered in discover_addons_paths(&path) {
        let identity = discovered.identity();
        let known = entries
            .iter()
            .any(|entry| canonical_identity(entry) == identity);
        if !known {
            entries.push(discovered.as_str().to_string());
            added.push(discovered);
        }
    }

    if added.is_empty() {
        tracing::info!(path = %path.display(), "no new addons directories found");
        return Ok(());
    }

    options.set_addons_path(&entries)?;
    options.save()?;
    for dir in added {
        writeln!(out, "{} {}", "added".green(), dir)?;
    }
    Ok(())
}

/// Drop `options.addons_path` entries located under `path`.
fn run_rm(ctx: &AppContext, path: PathBuf, out: &mut impl Write) -> Result<()> {
    let mut options = ctx.options()?;
    let (removed, kept): (Vec<String>, Vec<String>) = options
        .addons_path()
        .into_iter()
        .partition(|entry| is_within(entry, &path));

    if removed.is_empty() {
        tracing::info!(path = %path.display(), "no addons_path entries under path");
        return Ok(());
    }

    options.set_addons_path(&kept)?;
    options.save()?;
    for entry in removed {
        writeln!(out, "{} {}", "removed".red(), entry)?;
    }
    Ok(())
}
