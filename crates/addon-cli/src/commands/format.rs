//! Rendering of module lists

use std::io::Write;

use addon_registry::{ModuleDescriptor, ModuleInfo};

use crate::cli::OutputArgs;
use crate::error::Result;

/// Line terminator after a CSV listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsvEnd {
    Newline,
    Bare,
}

/// One entry of a plain listing: `name==version`, or the bare name.
pub fn entry(module: &ModuleDescriptor, only_name: bool) -> String {
    if only_name {
        module.technical_name.clone()
    } else {
        format!("{}=={}", module.technical_name, module.version)
    }
}

/// Write `modules` as selected by `output`.
pub fn write_modules(
    out: &mut impl Write,
    modules: &[&ModuleDescriptor],
    output: &OutputArgs,
    csv_end: CsvEnd,
) -> Result<()> {
    if output.json {
        let infos: Vec<ModuleInfo<'_>> = modules.iter().map(|m| m.info()).collect();
        writeln!(out, "{}", serde_json::to_string_pretty(&infos)?)?;
        return Ok(());
    }
    if modules.is_empty() {
        return Ok(());
    }

    let entries = modules.iter().map(|m| entry(m, output.only_name));
    if output.csv {
        write!(out, "{}", entries.collect::<Vec<_>>().join(","))?;
        if csv_end == CsvEnd::Newline {
            writeln!(out)?;
        }
    } else {
        for line in entries {
            writeln!(out, "{line}")?;
        }
    }
    Ok(())
}
