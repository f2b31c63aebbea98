//! [`TestAddons`] builder for module-tree test scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value, json};
use tempfile::TempDir;

use crate::literal::to_python_literal;

/// A temporary directory for laying out base installations and addons
/// directories.
///
/// # Example
///
/// ```rust,no_run
/// use addon_test_utils::TestAddons;
/// use serde_json::json;
///
/// let tree = TestAddons::new();
/// let (base, addons) = tree.init_base();
/// tree.generate_addons(&addons, &["a", "b"], json!({}));
/// tree.generate_addons(&addons, &["d"], json!({"installable": false}));
/// ```
pub struct TestAddons {
    temp_dir: TempDir,
}

impl Default for TestAddons {
    fn default() -> Self {
        Self::new()
    }
}

impl TestAddons {
    /// Create an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Return the root path of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create `<root>/base/addons` and return `(base, base/addons)`.
    pub fn init_base(&self) -> (PathBuf, PathBuf) {
        let base = self.root().join("base");
        let addons = base.join("addons");
        fs::create_dir_all(&addons).unwrap();
        (base, addons)
    }

    /// Create (if needed) and return a directory relative to the root.
    pub fn dir(&self, relative: &str) -> PathBuf {
        let path = self.root().join(relative);
        fs::create_dir_all(&path).unwrap();
        path
    }

    /// Create one module directory per name under `dir`, each with a
    /// `__manifest__.py` holding `{"description": <name>, "depends": ["web"]}`
    /// with the keys of `overrides` merged on top.
    pub fn generate_addons(&self, dir: &Path, names: &[&str], overrides: Value) {
        for name in names {
            let mut manifest = Map::new();
            manifest.insert("description".into(), json!(name));
            manifest.insert("depends".into(), json!(["web"]));
            if let Value::Object(extra) = &overrides {
                for (key, value) in extra {
                    manifest.insert(key.clone(), value.clone());
                }
            }
            self.write_manifest(dir, name, &Value::Object(manifest));
        }
    }

    /// Write `manifest` as `<dir>/<name>/__manifest__.py`.
    pub fn write_manifest(&self, dir: &Path, name: &str, manifest: &Value) -> PathBuf {
        self.write_raw_manifest(dir, name, "__manifest__.py", &to_python_literal(manifest))
    }

    /// Write arbitrary manifest content under a chosen file name.
    pub fn write_raw_manifest(
        &self,
        dir: &Path,
        name: &str,
        file_name: &str,
        content: &str,
    ) -> PathBuf {
        let module_dir = dir.join(name);
        fs::create_dir_all(&module_dir).unwrap();
        fs::write(module_dir.join(file_name), content).unwrap();
        module_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_addons_writes_manifests() {
        let tree = TestAddons::new();
        let (_, addons) = tree.init_base();
        tree.generate_addons(&addons, &["a"], json!({"installable": false}));

        let content = fs::read_to_string(addons.join("a").join("__manifest__.py")).unwrap();
        assert!(content.contains("'description': 'a'"));
        assert!(content.contains("'depends': ['web']"));
        assert!(content.contains("'installable': False"));
    }
}
