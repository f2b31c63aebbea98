//! Format-preserving options file
//!
//! The options file is a TOML document of sections holding flat key/value
//! pairs. Keys are addressed as `section.key`; a bare key refers to the
//! [`DEFAULT_SECTION`]. Edits go through `toml_edit` so comments and layout
//! written by hand survive a `set`.

use std::path::PathBuf;

use toml_edit::{Array, DocumentMut, Item, Table, TableLike, Value};

use crate::{Error, NormalizedPath, Result, io};

/// Section used when a key carries no explicit section.
pub const DEFAULT_SECTION: &str = "options";

/// Key (within [`DEFAULT_SECTION`]) listing additional addons paths.
pub const ADDONS_PATH_KEY: &str = "addons_path";

/// An options file loaded into memory.
#[derive(Debug, Clone)]
pub struct OptionsFile {
    path: NormalizedPath,
    doc: DocumentMut,
}

impl OptionsFile {
    /// Platform default location: `<config_dir>/addons/addons.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("addons").join("addons.toml"))
    }

    /// Load the options file at `path`.
    ///
    /// A missing file loads as an empty document; it is created on the
    /// first [`save`](Self::save).
    pub fn load(path: impl Into<NormalizedPath>) -> Result<Self> {
        let path = path.into();
        let doc = if path.is_file() {
            let content = io::read_text(&path)?;
            content
                .parse::<DocumentMut>()
                .map_err(|e| Error::OptionsParse {
                    path: path.to_native(),
                    message: e.to_string(),
                })?
        } else {
            tracing::debug!(path = %path, "options file absent, starting empty");
            DocumentMut::new()
        };
        Ok(Self { path, doc })
    }

    /// Location this file is read from and saved to.
    pub fn path(&self) -> &NormalizedPath {
        &self.path
    }

    /// Look up a value, rendered as text. Arrays render comma-separated.
    pub fn get(&self, key: &str) -> Option<String> {
        let (section, name) = split_key(key);
        self.doc
            .get(section)
            .and_then(Item::as_table_like)
            .and_then(|table| table.get(name))
            .and_then(Item::as_value)
            .map(render)
    }

    /// Set a string value, creating the section if needed.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let (section, name) = split_key(key);
        let table = self.section_mut(section)?;
        if table.get(name).is_some_and(|item| item.is_table_like()) {
            return Err(Error::OptionNotAValue {
                key: key.to_string(),
            });
        }
        table.insert(name, toml_edit::value(value));
        Ok(())
    }

    /// Every value in the file as `(section.key, rendered value)`, in
    /// document order.
    pub fn entries(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        collect_entries("", self.doc.as_table(), &mut out);
        out
    }

    /// Entries of `options.addons_path`.
    ///
    /// Accepts a TOML array or a single comma-separated string.
    pub fn addons_path(&self) -> Vec<String> {
        let Some(item) = self
            .doc
            .get(DEFAULT_SECTION)
            .and_then(Item::as_table_like)
            .and_then(|table| table.get(ADDONS_PATH_KEY))
        else {
            return Vec::new();
        };

        match item.as_value() {
            Some(Value::Array(array)) => array
                .iter()
                .filter_map(|v| v.as_str())
                .map(str::to_string)
                .collect(),
            Some(Value::String(s)) => s
                .value()
                .split(',')
                .map(str::trim)
                .filter(|entry| !entry.is_empty())
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Replace `options.addons_path` with `paths`, stored as an array.
    pub fn set_addons_path(&mut self, paths: &[String]) -> Result<()> {
        let array: Array = paths.iter().map(String::as_str).collect();
        let table = self.section_mut(DEFAULT_SECTION)?;
        table.insert(ADDONS_PATH_KEY, Item::Value(Value::Array(array)));
        Ok(())
    }

    /// Write the document back atomically.
    pub fn save(&self) -> Result<()> {
        io::write_text(&self.path, &self.doc.to_string())
    }

    fn section_mut(&mut self, section: &str) -> Result<&mut dyn TableLike> {
        self.doc
            .entry(section)
            .or_insert(Item::Table(Table::new()))
            .as_table_like_mut()
            .ok_or_else(|| Error::OptionNotAValue {
                key: section.to_string(),
            })
    }
}

/// Split `section.key`; a bare key belongs to [`DEFAULT_SECTION`].
fn split_key(key: &str) -> (&str, &str) {
    match key.split_once('.') {
        Some((section, name)) if !section.is_empty() && !name.is_empty() => (section, name),
        _ => (DEFAULT_SECTION, key),
    }
}

fn collect_entries(prefix: &str, table: &dyn TableLike, out: &mut Vec<(String, String)>) {
    for (key, item) in table.iter() {
        let full_key = if prefix.is_empty() {
            key.to_string()
        } else {
            format!("{prefix}.{key}")
        };
        if let Some(nested) = item.as_table_like() {
            collect_entries(&full_key, nested, out);
        } else if let Some(value) = item.as_value() {
            out.push((full_key, render(value)));
        }
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.value().to_string(),
        Value::Integer(i) => i.value().to_string(),
        Value::Float(f) => f.value().to_string(),
        Value::Boolean(b) => b.value().to_string(),
        Value::Datetime(d) => d.value().to_string(),
        Value::Array(array) => array.iter().map(render).collect::<Vec<_>>().join(","),
        Value::InlineTable(table) => table.to_string().trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn options_in(temp: &TempDir) -> OptionsFile {
        OptionsFile::load(temp.path().join("addons.toml")).unwrap()
    }

    #[test]
    fn test_missing_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let options = options_in(&temp);

        assert_eq!(options.get("data_dir"), None);
        assert!(options.entries().is_empty());
        assert!(options.addons_path().is_empty());
    }

    #[test]
    fn test_set_then_get_roundtrips_through_disk() {
        let temp = TempDir::new().unwrap();
        let mut options = options_in(&temp);
        options.set("data_dir", "value").unwrap();
        options.save().unwrap();

        let reloaded = options_in(&temp);
        assert_eq!(reloaded.get("data_dir").as_deref(), Some("value"));
        assert_eq!(reloaded.get("options.data_dir").as_deref(), Some("value"));
        assert_eq!(
            reloaded.entries(),
            vec![("options.data_dir".to_string(), "value".to_string())]
        );
    }

    #[test]
    fn test_explicit_section() {
        let temp = TempDir::new().unwrap();
        let mut options = options_in(&temp);
        options.set("server.port", "8069").unwrap();

        assert_eq!(options.get("server.port").as_deref(), Some("8069"));
        assert_eq!(options.get("port"), None);
    }

    #[test]
    fn test_comments_survive_set() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("addons.toml");
        fs::write(&path, "# managed by hand\n[options]\nworkers = 4 # keep low\n").unwrap();

        let mut options = OptionsFile::load(path.as_path()).unwrap();
        options.set("data_dir", "/srv/data").unwrap();
        options.save().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("# managed by hand"));
        assert!(content.contains("workers = 4 # keep low"));
        assert!(content.contains("data_dir = \"/srv/data\""));
    }

    #[test]
    fn test_non_string_values_render() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("addons.toml");
        fs::write(&path, "[options]\nworkers = 4\nproxy_mode = true\nlimits = [1, 2]\n").unwrap();

        let options = OptionsFile::load(path.as_path()).unwrap();
        assert_eq!(options.get("workers").as_deref(), Some("4"));
        assert_eq!(options.get("proxy_mode").as_deref(), Some("true"));
        assert_eq!(options.get("limits").as_deref(), Some("1,2"));
    }

    #[test]
    fn test_addons_path_from_comma_string() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("addons.toml");
        fs::write(&path, "[options]\naddons_path = \"/a, /b,,\"\n").unwrap();

        let options = OptionsFile::load(path.as_path()).unwrap();
        assert_eq!(options.addons_path(), vec!["/a", "/b"]);
    }

    #[test]
    fn test_set_addons_path_as_array() {
        let temp = TempDir::new().unwrap();
        let mut options = options_in(&temp);
        options
            .set_addons_path(&["/x/addons".to_string(), "/y".to_string()])
            .unwrap();
        options.save().unwrap();

        let reloaded = options_in(&temp);
        assert_eq!(reloaded.addons_path(), vec!["/x/addons", "/y"]);
        assert_eq!(reloaded.get("addons_path").as_deref(), Some("/x/addons,/y"));
    }

    #[test]
    fn test_refuses_to_overwrite_table() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("addons.toml");
        fs::write(&path, "[options.nested]\nkey = 1\n").unwrap();

        let mut options = OptionsFile::load(path.as_path()).unwrap();
        let err = options.set("options.nested", "flat").unwrap_err();
        assert!(matches!(err, Error::OptionNotAValue { .. }));
    }

    #[test]
    fn test_invalid_toml_reports_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("addons.toml");
        fs::write(&path, "[options\n").unwrap();

        let err = OptionsFile::load(path.as_path()).unwrap_err();
        assert!(matches!(err, Error::OptionsParse { .. }));
    }
}
