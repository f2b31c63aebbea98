//! `module` commands: ls, show, deps, requirements

use std::io::Write;

use addon_registry::{
    Error as RegistryError, ListFilter, ListOrder, ModuleDescriptor, RequirementsOptions,
    ResolveOptions, ServerWideFilter, collect_requirements,
};

use crate::cli::ModuleAction;
use crate::commands::format::{CsvEnd, write_modules};
use crate::context::AppContext;
use crate::error::Result;

pub fn run(ctx: &AppContext, action: ModuleAction, out: &mut impl Write) -> Result<()> {
    match action {
        ModuleAction::Ls {
            paths,
            modules,
            installable,
            server_wide,
            no_server_wide,
            sorted,
            output,
        } => {
            let registry = ctx.registry(&paths)?;
            let filter = ListFilter {
                names: modules,
                installable: installable.filter(),
                server_wide: server_wide_filter(server_wide, no_server_wide),
                order: if sorted {
                    ListOrder::Sorted
                } else {
                    ListOrder::Discovery
                },
            };
            write_modules(out, &registry.list(&filter), &output, CsvEnd::Newline)
        }

        ModuleAction::Show { name, all } => {
            let registry = ctx.registry(&[])?;
            let module = registry.get(&name)?;
            if !all && !module.installable {
                tracing::debug!(module = %name, "module is not installable, pass --all to show it");
                return Err(RegistryError::NotFound(name).into());
            }
            writeln!(out, "{}", serde_json::to_string_pretty(&module.info())?)?;
            Ok(())
        }

        ModuleAction::Deps {
            modules,
            paths,
            auto,
            include_requested,
            installable,
            output,
        } => {
            let registry = ctx.registry(&paths)?;
            let resolution = registry.resolve(
                &modules,
                ResolveOptions {
                    include_auto_install: auto,
                    installable: installable.filter(),
                },
            )?;
            for name in &resolution.unresolved {
                tracing::info!(module = %name, "dependency not available in any search path");
            }

            let ordered: Vec<&ModuleDescriptor> = resolution
                .order
                .iter()
                .filter(|name| include_requested || !modules.contains(name))
                .filter_map(|name| registry.get(name).ok())
                .collect();
            write_modules(out, &ordered, &output, CsvEnd::Bare)
        }

        ModuleAction::Requirements {
            modules,
            paths,
            ecosystem,
            sort,
            preserve_case,
        } => {
            let registry = ctx.registry(&paths)?;
            let selected = registry.list(&ListFilter {
                names: modules,
                ..Default::default()
            });
            let options = RequirementsOptions {
                ecosystem,
                lowercase: !preserve_case,
                sort,
            };
            for package in collect_requirements(selected, &options) {
                writeln!(out, "{package}")?;
            }
            Ok(())
        }
    }
}

fn server_wide_filter(only: bool, exclude: bool) -> ServerWideFilter {
    if only {
        ServerWideFilter::Only
    } else if exclude {
        ServerWideFilter::Exclude
    } else {
        ServerWideFilter::Include
    }
}
