//! The set of discovered modules, addressable by technical name.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::manifest::ModuleDescriptor;
use crate::scanner::ScannedModule;

/// Installable state a listing or resolution keeps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InstallableFilter {
    #[default]
    Any,
    Installable,
    NonInstallable,
}

impl InstallableFilter {
    pub fn matches(self, module: &ModuleDescriptor) -> bool {
        match self {
            Self::Any => true,
            Self::Installable => module.installable,
            Self::NonInstallable => !module.installable,
        }
    }
}

/// How server-wide modules are treated by a listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ServerWideFilter {
    #[default]
    Include,
    Exclude,
    Only,
}

impl ServerWideFilter {
    pub fn matches(self, module: &ModuleDescriptor) -> bool {
        match self {
            Self::Include => true,
            Self::Exclude => !module.server_wide,
            Self::Only => module.server_wide,
        }
    }
}

/// Output order of a listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListOrder {
    /// Registry insertion order.
    #[default]
    Discovery,
    /// Lexicographic by technical name.
    Sorted,
}

/// Selection applied by [`ModuleRegistry::list`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    /// Allow-list of technical names; empty keeps every module.
    pub names: Vec<String>,
    pub installable: InstallableFilter,
    pub server_wide: ServerWideFilter,
    pub order: ListOrder,
}

impl ListFilter {
    fn matches(&self, module: &ModuleDescriptor) -> bool {
        (self.names.is_empty() || self.names.contains(&module.technical_name))
            && self.installable.matches(module)
            && self.server_wide.matches(module)
    }
}

/// Immutable mapping from technical name to module descriptor.
///
/// Built once from scan results. When two descriptors share a technical
/// name the later one replaces the earlier one but keeps its position, so
/// extra paths can shadow base modules without reordering the registry.
#[derive(Debug, Clone, Default)]
pub struct ModuleRegistry {
    modules: Vec<ModuleDescriptor>,
    index: HashMap<String, usize>,
}

impl ModuleRegistry {
    /// Build a registry from descriptors in scan order.
    pub fn build(descriptors: impl IntoIterator<Item = ModuleDescriptor>) -> Self {
        let mut registry = Self::default();
        for descriptor in descriptors {
            match registry.index.get(&descriptor.technical_name) {
                Some(&position) => {
                    tracing::debug!(
                        module = %descriptor.technical_name,
                        shadowed = %registry.modules[position].source_path,
                        by = %descriptor.source_path,
                        "module shadowed by a later search root"
                    );
                    registry.modules[position] = descriptor;
                }
                None => {
                    registry
                        .index
                        .insert(descriptor.technical_name.clone(), registry.modules.len());
                    registry.modules.push(descriptor);
                }
            }
        }
        registry
    }

    /// Build a registry from scanner output.
    pub fn from_scan(scanned: impl IntoIterator<Item = ScannedModule>) -> Self {
        Self::build(scanned.into_iter().map(|module| module.descriptor))
    }

    /// Look up one module.
    pub fn get(&self, name: &str) -> Result<&ModuleDescriptor> {
        self.index
            .get(name)
            .map(|&position| &self.modules[position])
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }

    /// Discovery position of a module.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Module at a discovery position.
    pub fn at(&self, position: usize) -> Option<&ModuleDescriptor> {
        self.modules.get(position)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// All modules in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &ModuleDescriptor> {
        self.modules.iter()
    }

    /// Modules matching `filter`, in the order it asks for.
    pub fn list(&self, filter: &ListFilter) -> Vec<&ModuleDescriptor> {
        let mut modules: Vec<&ModuleDescriptor> =
            self.modules.iter().filter(|m| filter.matches(m)).collect();
        if filter.order == ListOrder::Sorted {
            modules.sort_by(|a, b| a.technical_name.cmp(&b.technical_name));
        }
        modules
    }
}
