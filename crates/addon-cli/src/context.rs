//! Invocation context
//!
//! Collects the global options (flags or their environment variables) and
//! the options file into the inputs the registry needs. Search paths are
//! assembled in a fixed order:
//!
//! 1. the base installation's `addons` directory;
//! 2. `options.addons_path` from the options file;
//! 3. extra paths from `--extra-paths` / `ADDONS_EXTRA_PATHS`;
//! 4. paths given to the command itself.

use std::path::{Path, PathBuf};

use addon_fs::{NormalizedPath, OptionsFile};
use addon_registry::{ModuleRegistry, PathScanner, SearchConfig};

use crate::cli::Cli;
use crate::error::{CliError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppContext {
    /// Options file location; `None` when no config directory is known.
    pub config_path: Option<NormalizedPath>,
    pub base_path: Option<PathBuf>,
    pub extra_paths: Vec<PathBuf>,
    pub exclude_base: bool,
}

impl AppContext {
    pub fn from_cli(cli: &Cli) -> Self {
        let config_path = cli
            .config
            .clone()
            .filter(|path| !path.as_os_str().is_empty())
            .or_else(OptionsFile::default_path)
            .map(NormalizedPath::new);

        Self {
            config_path,
            base_path: cli
                .base_path
                .clone()
                .filter(|path| !path.as_os_str().is_empty()),
            extra_paths: cli
                .extra_paths
                .as_deref()
                .map(parse_path_list)
                .unwrap_or_default(),
            exclude_base: cli.exclude_base,
        }
    }

    /// Location of the options file, required by commands that edit it.
    pub fn config_path(&self) -> Result<&NormalizedPath> {
        self.config_path.as_ref().ok_or_else(|| {
            CliError::user("cannot determine the options file location, pass --config")
        })
    }

    /// Load the options file; a missing file reads as empty.
    pub fn options(&self) -> Result<OptionsFile> {
        Ok(OptionsFile::load(self.config_path()?.clone())?)
    }

    /// Search configuration with `paths` appended as extra paths.
    pub fn search_config(&self, paths: &[PathBuf]) -> Result<SearchConfig> {
        let mut extra_paths: Vec<PathBuf> = Vec::new();
        if let Some(config_path) = &self.config_path {
            let options = OptionsFile::load(config_path.clone())?;
            extra_paths.extend(options.addons_path().iter().map(PathBuf::from));
        }
        extra_paths.extend(self.extra_paths.iter().cloned());
        extra_paths.extend(paths.iter().cloned());

        Ok(SearchConfig {
            base_path: self.base_path.clone(),
            extra_paths,
            exclude_base: self.exclude_base,
        })
    }

    /// Scan every search root into a registry.
    pub fn registry(&self, paths: &[PathBuf]) -> Result<ModuleRegistry> {
        let scanner = PathScanner::new(self.search_config(paths)?);
        let registry = ModuleRegistry::from_scan(scanner.scan());
        tracing::debug!(modules = registry.len(), "module registry built");
        Ok(registry)
    }
}

/// Split a PATH-style list, dropping empty entries.
pub fn parse_path_list(value: &str) -> Vec<PathBuf> {
    std::env::split_paths(value)
        .filter(|path| !path.as_os_str().is_empty())
        .collect()
}

/// Whether `path` is a directory, as a user error otherwise.
pub fn require_dir(path: &Path) -> Result<()> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(CliError::user(format!(
            "not a directory: {}",
            path.display()
        )))
    }
}
