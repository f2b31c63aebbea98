//! Flattening of `external_dependencies` into a package list.

use crate::manifest::ModuleDescriptor;

/// Ecosystem key used when none is given.
pub const DEFAULT_ECOSYSTEM: &str = "python";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequirementsOptions {
    /// Key of `external_dependencies` to collect.
    pub ecosystem: String,
    pub lowercase: bool,
    pub sort: bool,
}

impl Default for RequirementsOptions {
    fn default() -> Self {
        Self {
            ecosystem: DEFAULT_ECOSYSTEM.to_string(),
            lowercase: true,
            sort: false,
        }
    }
}

/// Collect the packages `modules` declare for one ecosystem.
///
/// Duplicates are dropped after case folding, keeping first occurrence
/// order unless `sort` is set.
pub fn collect_requirements<'a>(
    modules: impl IntoIterator<Item = &'a ModuleDescriptor>,
    options: &RequirementsOptions,
) -> Vec<String> {
    let mut packages: Vec<String> = Vec::new();
    for module in modules {
        let Some(declared) = module.external_dependencies.get(&options.ecosystem) else {
            continue;
        };
        for package in declared {
            let package = package.trim();
            if package.is_empty() {
                continue;
            }
            let package = if options.lowercase {
                package.to_lowercase()
            } else {
                package.to_string()
            };
            if !packages.contains(&package) {
                packages.push(package);
            }
        }
    }
    if options.sort {
        packages.sort();
    }
    packages
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    fn modules(records: &[(&str, Value)]) -> Vec<ModuleDescriptor> {
        records
            .iter()
            .map(|(name, record)| {
                ModuleDescriptor::from_record(name, format!("/addons/{name}"), record).unwrap()
            })
            .collect()
    }

    fn sample() -> Vec<ModuleDescriptor> {
        modules(&[
            ("a", json!({})),
            ("e", json!({"external_dependencies": {"python": ["requests"]}})),
            ("f", json!({"external_dependencies": {"python": ["Pillow", "lxml"], "bin": ["wkhtmltopdf"]}})),
            ("g", json!({"external_dependencies": {"python": ["pillow", " requests "]}})),
        ])
    }

    #[test]
    fn test_default_lowercases_and_dedups() {
        let packages = collect_requirements(&sample(), &RequirementsOptions::default());
        assert_eq!(packages, vec!["requests", "pillow", "lxml"]);
    }

    #[test]
    fn test_sorted() {
        let options = RequirementsOptions {
            sort: true,
            ..Default::default()
        };
        assert_eq!(collect_requirements(&sample(), &options), vec!["lxml", "pillow", "requests"]);
    }

    #[test]
    fn test_preserve_case() {
        let options = RequirementsOptions {
            lowercase: false,
            sort: true,
            ..Default::default()
        };
        assert_eq!(
            collect_requirements(&sample(), &options),
            vec!["Pillow", "lxml", "pillow", "requests"]
        );
    }

    #[test]
    fn test_other_ecosystem() {
        let options = RequirementsOptions {
            ecosystem: "bin".into(),
            ..Default::default()
        };
        assert_eq!(collect_requirements(&sample(), &options), vec!["wkhtmltopdf"]);
    }
}
