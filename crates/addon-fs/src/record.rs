//! Format-agnostic loading of manifest records

use serde_json::Value;

use crate::{Error, NormalizedPath, Result, io, literal};

/// Serialization formats a manifest record can be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFormat {
    /// Python literal dict (`__manifest__.py`, `__openerp__.py`)
    PythonLiteral,
    Toml,
    Json,
    Yaml,
}

impl RecordFormat {
    /// Detect the format from a file extension.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_lowercase().as_str() {
            "py" => Some(Self::PythonLiteral),
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::PythonLiteral => "Python literal",
            Self::Toml => "TOML",
            Self::Json => "JSON",
            Self::Yaml => "YAML",
        }
    }

    /// Decode `content` into a generic value.
    ///
    /// `path` is only used for error reporting.
    pub fn decode(&self, path: &NormalizedPath, content: &str) -> Result<Value> {
        let parse_error = |message: String| Error::RecordParse {
            path: path.to_native(),
            format: self.name().into(),
            message,
        };

        match self {
            Self::PythonLiteral => literal::parse(content).map_err(|e| parse_error(e.to_string())),
            Self::Toml => toml::from_str(content).map_err(|e| parse_error(e.to_string())),
            Self::Json => serde_json::from_str(content).map_err(|e| parse_error(e.to_string())),
            Self::Yaml => serde_yaml::from_str(content).map_err(|e| parse_error(e.to_string())),
        }
    }
}

/// Read a manifest record from a file.
///
/// Format is detected from file extension:
/// - `.py` -> Python literal
/// - `.toml` -> TOML
/// - `.json` -> JSON
/// - `.yaml`, `.yml` -> YAML
///
/// The returned value is whatever the file contains; checking that it is a
/// mapping is left to the manifest parser.
pub fn read_record(path: &NormalizedPath) -> Result<Value> {
    let extension = path.extension().unwrap_or("");
    let format = RecordFormat::from_extension(extension).ok_or_else(|| Error::UnsupportedFormat {
        extension: extension.to_string(),
    })?;
    let content = io::read_text(path)?;
    format.decode(path, &content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn write(temp: &TempDir, name: &str, content: &str) -> NormalizedPath {
        let path = temp.path().join(name);
        fs::write(&path, content).unwrap();
        NormalizedPath::new(path)
    }

    #[test]
    fn test_every_format_yields_same_record() {
        let temp = TempDir::new().unwrap();
        let expected = json!({"name": "Sale", "depends": ["base"], "installable": true});

        let sources = [
            ("__manifest__.py", "{'name': 'Sale', 'depends': ['base'], 'installable': True}"),
            ("__manifest__.toml", "name = \"Sale\"\ndepends = [\"base\"]\ninstallable = true\n"),
            ("__manifest__.json", r#"{"name": "Sale", "depends": ["base"], "installable": true}"#),
            ("__manifest__.yaml", "name: Sale\ndepends:\n  - base\ninstallable: true\n"),
        ];

        for (name, content) in sources {
            let path = write(&temp, name, content);
            assert_eq!(read_record(&path).unwrap(), expected, "format of {name}");
        }
    }

    #[test]
    fn test_unsupported_extension() {
        let temp = TempDir::new().unwrap();
        let path = write(&temp, "manifest.ini", "[x]");

        let err = read_record(&path).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat { ref extension } if extension == "ini"));
    }

    #[test]
    fn test_parse_error_names_format_and_path() {
        let temp = TempDir::new().unwrap();
        let path = write(&temp, "__manifest__.py", "{'name': ");

        let err = read_record(&path).unwrap_err();
        match &err {
            Error::RecordParse { format, path, .. } => {
                assert_eq!(format, "Python literal");
                assert!(path.ends_with("__manifest__.py"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_non_mapping_is_returned_as_is() {
        let temp = TempDir::new().unwrap();
        let path = write(&temp, "__manifest__.json", "[1, 2]");
        assert_eq!(read_record(&path).unwrap(), json!([1, 2]));
    }
}
