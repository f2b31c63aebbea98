//! Discovery of module directories on disk.
//!
//! A *search root* is a directory whose immediate children are module
//! directories, i.e. directories holding a manifest file (see
//! [`addon_fs::MANIFEST_FILENAMES`]). Roots come from two places:
//!
//! - the base scope, `<base_path>/addons` of the base installation;
//! - extra paths, each expanded by [`discover_addons_paths`] into every
//!   nested directory that holds modules.
//!
//! Scanning a root is one level deep. Results are ordered by root
//! (configuration order) and then by directory name, so the output never
//! depends on the order the filesystem lists entries in.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use addon_fs::{ADDONS_SUBDIR, NormalizedPath, find_manifest, is_within, read_record};
use walkdir::WalkDir;

use crate::error::Result;
use crate::manifest::ModuleDescriptor;

/// Where to look for modules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchConfig {
    /// Base installation root; its `addons` subdirectory is the base scope.
    pub base_path: Option<PathBuf>,
    /// Extra locations, searched recursively for addons directories.
    /// Earlier entries take scan priority, later ones shadow them.
    pub extra_paths: Vec<PathBuf>,
    /// Drop every root inside the base scope, however it was reached.
    pub exclude_base: bool,
}

impl SearchConfig {
    /// Base scope directories that exist on disk.
    pub fn base_scope_paths(&self) -> Vec<NormalizedPath> {
        let Some(base) = &self.base_path else {
            return Vec::new();
        };
        let addons = NormalizedPath::new(base).join(ADDONS_SUBDIR);
        if addons.is_dir() {
            vec![addons]
        } else {
            tracing::warn!(base = %base.display(), "base path has no {ADDONS_SUBDIR} directory");
            Vec::new()
        }
    }
}

/// Which part of the search configuration a root belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Inside the base installation's addons directory.
    Base,
    /// Reached through an extra path only.
    Extra,
}

/// A directory whose immediate children are scanned for modules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRoot {
    pub path: NormalizedPath,
    pub scope: Scope,
}

/// Where a scanned module came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
    pub root: NormalizedPath,
    pub scope: Scope,
    pub manifest: NormalizedPath,
}

/// One module found by a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedModule {
    pub descriptor: ModuleDescriptor,
    pub provenance: Provenance,
}

/// Whether `dir` holds a manifest at its top level.
pub fn is_module_dir(dir: &NormalizedPath) -> bool {
    find_manifest(dir).is_some()
}

/// Whether any immediate child of `dir` is a module directory.
fn has_module_child(dir: &Path) -> bool {
    let Ok(entries) = fs::read_dir(dir) else {
        return false;
    };
    entries
        .filter_map(|entry| entry.ok())
        .map(|entry| NormalizedPath::new(entry.path()))
        .any(|child| !child.is_hidden() && child.is_dir() && is_module_dir(&child))
}

/// Find every directory under `path` (inclusive) that directly contains at
/// least one module directory.
///
/// The walk neither enters module directories nor hidden directories below
/// `path`. Results are in file-name order of the walk.
pub fn discover_addons_paths(path: impl AsRef<Path>) -> Vec<NormalizedPath> {
    let path = path.as_ref();
    let mut found = Vec::new();

    let mut walker = WalkDir::new(path)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| name.starts_with('.'))
        });

    while let Some(next) = walker.next() {
        let entry = match next {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(error = %err, "skipping unreadable entry during discovery");
                continue;
            }
        };
        if !entry.file_type().is_dir() {
            continue;
        }

        let dir = NormalizedPath::new(entry.path());
        if is_module_dir(&dir) {
            walker.skip_current_dir();
            continue;
        }
        if has_module_child(entry.path()) {
            found.push(dir);
        }
    }

    found
}

/// Compute the effective, deduplicated search roots for `config`.
///
/// The base scope comes first, then roots discovered under each extra path
/// in order. A directory reachable twice is kept at its first position.
pub fn search_roots(config: &SearchConfig) -> Vec<SearchRoot> {
    let base_scope = config.base_scope_paths();
    let in_base = |path: &NormalizedPath| base_scope.iter().any(|base| is_within(path, base));

    let mut roots = Vec::new();
    let mut seen: HashSet<PathBuf> = HashSet::new();
    let mut push = |path: NormalizedPath, scope: Scope| {
        if config.exclude_base && scope == Scope::Base {
            tracing::debug!(root = %path, "excluding base scope root");
            return;
        }
        if seen.insert(path.identity()) {
            roots.push(SearchRoot { path, scope });
        } else {
            tracing::debug!(root = %path, "root already scanned through another path");
        }
    };

    for base in &base_scope {
        push(base.clone(), Scope::Base);
    }

    for extra in &config.extra_paths {
        if !extra.is_dir() {
            tracing::warn!(path = %extra.display(), "search path is not a directory, skipping");
            continue;
        }
        for discovered in discover_addons_paths(extra) {
            let scope = if in_base(&discovered) {
                Scope::Base
            } else {
                Scope::Extra
            };
            push(discovered, scope);
        }
    }

    roots
}

/// Scan the immediate children of one root for modules.
///
/// Each module directory is matched against `base_scope` after resolving
/// symlinks: a match is tagged [`Scope::Base`], or dropped when
/// `exclude_base` is set. Unreadable entries and manifests that fail to load
/// are skipped with a warning.
pub fn scan_root(
    root: &SearchRoot,
    base_scope: &[NormalizedPath],
    exclude_base: bool,
) -> Vec<ScannedModule> {
    let native = root.path.to_native();
    let entries = match fs::read_dir(&native) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::warn!(root = %root.path, error = %err, "cannot read search root, skipping");
            return Vec::new();
        }
    };

    let mut candidates: Vec<(String, NormalizedPath)> = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(root = %root.path, error = %err, "skipping unreadable entry");
                continue;
            }
        };
        let Ok(name) = entry.file_name().into_string() else {
            tracing::warn!(path = %entry.path().display(), "skipping non UTF-8 directory name");
            continue;
        };
        if name.starts_with('.') || !entry.path().is_dir() {
            continue;
        }
        candidates.push((name, NormalizedPath::new(entry.path())));
    }
    candidates.sort_by(|a, b| a.0.cmp(&b.0));

    let mut modules = Vec::new();
    for (name, dir) in candidates {
        let Some(manifest) = find_manifest(&dir) else {
            continue;
        };
        let scope = if base_scope.iter().any(|base| is_within(&dir, base)) {
            Scope::Base
        } else {
            root.scope
        };
        if exclude_base && scope == Scope::Base {
            tracing::debug!(module = %name, path = %dir, "module resolves into the base scope, excluded");
            continue;
        }
        match load_descriptor(&name, &dir, &manifest) {
            Ok(descriptor) => modules.push(ScannedModule {
                descriptor,
                provenance: Provenance {
                    root: root.path.clone(),
                    scope,
                    manifest,
                },
            }),
            Err(err) => tracing::warn!(module = %name, error = %err, "skipping module"),
        }
    }
    modules
}

fn load_descriptor(
    name: &str,
    dir: &NormalizedPath,
    manifest: &NormalizedPath,
) -> Result<ModuleDescriptor> {
    let record = read_record(manifest)?;
    ModuleDescriptor::from_record(name, dir.clone(), &record)
}

/// Scans every root of a [`SearchConfig`].
#[derive(Debug, Clone)]
pub struct PathScanner {
    config: SearchConfig,
}

impl PathScanner {
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Effective search roots, see [`search_roots`].
    pub fn roots(&self) -> Vec<SearchRoot> {
        search_roots(&self.config)
    }

    /// Scan all roots in order.
    pub fn scan(&self) -> Vec<ScannedModule> {
        let roots = self.roots();
        let base_scope = self.config.base_scope_paths();
        tracing::debug!(roots = roots.len(), "scanning search roots");
        roots
            .iter()
            .flat_map(|root| scan_root(root, &base_scope, self.config.exclude_base))
            .collect()
    }
}
