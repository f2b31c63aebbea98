//! Module manifest parsing.
//!
//! A manifest record is a loosely typed key/value mapping (see
//! [`addon_fs::read_record`]). [`ModuleDescriptor::from_record`] turns one into
//! a typed descriptor:
//!
//! - unknown keys are ignored;
//! - absent, `null` or uncoercible values fall back to the field default;
//! - scalars are coerced where the intent is unambiguous (`version: 1.0`
//!   becomes `"1.0"`, `installable: "False"` becomes `false`, a bare string
//!   where a list is expected becomes a one-element list).
//!
//! Only a record that is not a mapping at all is rejected.
//!
//! # Example record
//!
//! ```text
//! {
//!     'name': 'Sales',
//!     'version': '16.0.1.0.0',
//!     'depends': ['base', 'web'],
//!     'auto_install': False,
//!     'external_dependencies': {'python': ['requests']},
//! }
//! ```

use std::collections::BTreeMap;

use addon_fs::NormalizedPath;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Version reported for manifests that declare none.
pub const DEFAULT_VERSION: &str = "0.0.0";

/// Typed metadata of one discovered module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDescriptor {
    /// Unique identifier, the name of the module directory.
    pub technical_name: String,
    /// Display name; the technical name when the manifest has none.
    pub name: String,
    pub description: String,
    pub version: String,
    /// Declared dependencies, in manifest order, without duplicates or
    /// self references. May name modules that are not installed anywhere.
    pub depends: Vec<String>,
    pub installable: bool,
    pub application: bool,
    /// Required implicitly once every entry of `depends` is required.
    pub auto_install: bool,
    /// Part of the base/system scope rather than a regular addon.
    pub server_wide: bool,
    /// Package names per packaging ecosystem (e.g. `python`).
    pub external_dependencies: BTreeMap<String, Vec<String>>,
    pub data: Vec<String>,
    pub demo: Vec<String>,
    /// Directory the module was discovered at.
    pub source_path: NormalizedPath,
}

/// JSON projection of a descriptor for display.
#[derive(Debug, Serialize)]
pub struct ModuleInfo<'a> {
    pub application: bool,
    pub data: &'a [String],
    pub demo: &'a [String],
    pub depends: &'a [String],
    pub description: &'a str,
    pub external_dependencies: &'a BTreeMap<String, Vec<String>>,
    pub installable: bool,
    pub name: &'a str,
    pub technical_name: &'a str,
    pub version: &'a str,
}

impl ModuleDescriptor {
    /// Build a descriptor from a raw manifest record.
    ///
    /// `technical_name` is the module directory name and `source_path` the
    /// module directory itself.
    pub fn from_record(
        technical_name: &str,
        source_path: impl Into<NormalizedPath>,
        record: &Value,
    ) -> Result<Self> {
        let source_path = source_path.into();
        let fail = |reason: &str| Error::Parse {
            module: technical_name.to_string(),
            path: source_path.to_native(),
            reason: reason.to_string(),
        };

        if technical_name.trim().is_empty() {
            return Err(fail("technical name must not be empty"));
        }
        let Value::Object(map) = record else {
            return Err(fail("manifest is not a mapping"));
        };

        let fields = Fields {
            map,
            module: technical_name,
        };

        let mut depends: Vec<String> = Vec::new();
        for dep in fields.get("depends", as_list).unwrap_or_default() {
            if dep.is_empty() || depends.contains(&dep) {
                continue;
            }
            if dep == technical_name {
                tracing::debug!(module = technical_name, "dropping self dependency");
                continue;
            }
            depends.push(dep);
        }

        Ok(Self {
            technical_name: technical_name.to_string(),
            name: fields
                .get("name", as_text)
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| technical_name.to_string()),
            description: fields.get("description", as_text).unwrap_or_default(),
            version: fields
                .get("version", as_text)
                .filter(|version| !version.is_empty())
                .unwrap_or_else(|| DEFAULT_VERSION.to_string()),
            depends,
            installable: fields.get("installable", as_flag).unwrap_or(true),
            application: fields.get("application", as_flag).unwrap_or(false),
            auto_install: fields.get("auto_install", as_flag).unwrap_or(false),
            server_wide: fields.get("server_wide", as_flag).unwrap_or(false),
            external_dependencies: fields
                .get("external_dependencies", as_list_map)
                .unwrap_or_default(),
            data: fields.get("data", as_list).unwrap_or_default(),
            demo: fields.get("demo", as_list).unwrap_or_default(),
            source_path,
        })
    }

    /// Borrowed projection used for JSON output. Omits the source path
    /// and the scope flags.
    pub fn info(&self) -> ModuleInfo<'_> {
        ModuleInfo {
            application: self.application,
            data: &self.data,
            demo: &self.demo,
            depends: &self.depends,
            description: &self.description,
            external_dependencies: &self.external_dependencies,
            installable: self.installable,
            name: &self.name,
            technical_name: &self.technical_name,
            version: &self.version,
        }
    }
}

struct Fields<'a> {
    map: &'a Map<String, Value>,
    module: &'a str,
}

impl Fields<'_> {
    fn get<T>(&self, key: &str, coerce: impl Fn(&Value) -> Option<T>) -> Option<T> {
        let value = self.map.get(key).filter(|v| !v.is_null())?;
        let coerced = coerce(value);
        if coerced.is_none() {
            tracing::debug!(module = self.module, key, "ignoring manifest value of unexpected type");
        }
        coerced
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn as_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" | "" => Some(false),
            _ => None,
        },
        // A list of trigger modules counts as set when non-empty.
        Value::Array(items) => Some(!items.is_empty()),
        _ => None,
    }
}

fn as_list(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Array(items) => Some(items.iter().filter_map(as_text).collect()),
        Value::String(s) => Some(vec![s.clone()]),
        _ => None,
    }
}

fn as_list_map(value: &Value) -> Option<BTreeMap<String, Vec<String>>> {
    let Value::Object(map) = value else {
        return None;
    };
    Some(
        map.iter()
            .map(|(ecosystem, packages)| {
                (ecosystem.clone(), as_list(packages).unwrap_or_default())
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    fn parse(record: Value) -> ModuleDescriptor {
        ModuleDescriptor::from_record("sale", "/addons/sale", &record).unwrap()
    }

    #[test]
    fn test_defaults_for_empty_manifest() {
        let module = parse(json!({}));

        assert_eq!(module.technical_name, "sale");
        assert_eq!(module.name, "sale");
        assert_eq!(module.description, "");
        assert_eq!(module.version, DEFAULT_VERSION);
        assert!(module.depends.is_empty());
        assert!(module.installable);
        assert!(!module.application);
        assert!(!module.auto_install);
        assert!(!module.server_wide);
        assert!(module.external_dependencies.is_empty());
        assert!(module.data.is_empty());
        assert!(module.demo.is_empty());
        assert_eq!(module.source_path.as_str(), "/addons/sale");
    }

    #[test]
    fn test_full_manifest() {
        let module = parse(json!({
            "name": "Sales",
            "description": "Quotations and orders",
            "version": "16.0.1.0.0",
            "depends": ["base", "web"],
            "installable": true,
            "application": true,
            "auto_install": false,
            "server_wide": true,
            "external_dependencies": {"python": ["requests", "Pillow"], "bin": ["wkhtmltopdf"]},
            "data": ["views/sale.xml"],
            "demo": ["demo/sale.xml"],
            "license": "LGPL-3",
        }));

        assert_eq!(module.name, "Sales");
        assert_eq!(module.description, "Quotations and orders");
        assert_eq!(module.version, "16.0.1.0.0");
        assert_eq!(module.depends, vec!["base", "web"]);
        assert!(module.application);
        assert!(module.server_wide);
        assert_eq!(
            module.external_dependencies.get("python").unwrap(),
            &vec!["requests".to_string(), "Pillow".to_string()]
        );
        assert_eq!(module.data, vec!["views/sale.xml"]);
        assert_eq!(module.demo, vec!["demo/sale.xml"]);
    }

    #[rstest]
    #[case(json!(true), true)]
    #[case(json!(false), false)]
    #[case(json!("False"), false)]
    #[case(json!("yes"), true)]
    #[case(json!(0), false)]
    #[case(json!(1), true)]
    #[case(json!(["sale"]), true)]
    #[case(json!([]), false)]
    #[case(json!(null), false)]
    #[case(json!("maybe"), false)]
    fn test_auto_install_coercion(#[case] raw: Value, #[case] expected: bool) {
        let module = parse(json!({ "auto_install": raw }));
        assert_eq!(module.auto_install, expected);
    }

    #[rstest]
    #[case(json!(1.0), "1.0")]
    #[case(json!(2), "2")]
    #[case(json!(""), DEFAULT_VERSION)]
    #[case(json!(["1"]), DEFAULT_VERSION)]
    fn test_version_coercion(#[case] raw: Value, #[case] expected: &str) {
        let module = parse(json!({ "version": raw }));
        assert_eq!(module.version, expected);
    }

    #[test]
    fn test_installable_mismatch_defaults_true() {
        let module = parse(json!({ "installable": {"nested": true} }));
        assert!(module.installable);
    }

    #[test]
    fn test_depends_string_becomes_list() {
        let module = parse(json!({ "depends": "base" }));
        assert_eq!(module.depends, vec!["base"]);
    }

    #[test]
    fn test_depends_dedup_and_self_reference() {
        let module = parse(json!({ "depends": ["base", "sale", "web", "base", "", 3, {"x": 1}] }));
        assert_eq!(module.depends, vec!["base", "web", "3"]);
    }

    #[test]
    fn test_external_dependencies_lenient() {
        let module = parse(json!({
            "external_dependencies": {"python": "lxml", "bin": null}
        }));
        assert_eq!(module.external_dependencies["python"], vec!["lxml"]);
        assert!(module.external_dependencies["bin"].is_empty());
    }

    #[test]
    fn test_not_a_mapping_is_parse_error() {
        let err = ModuleDescriptor::from_record("sale", "/addons/sale", &json!(["a"])).unwrap_err();
        assert!(matches!(err, Error::Parse { ref module, .. } if module == "sale"));
    }

    #[test]
    fn test_empty_technical_name_rejected() {
        let err = ModuleDescriptor::from_record("", "/addons/x", &json!({})).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn test_info_projection() {
        let module = parse(json!({"description": "a", "depends": ["web"], "auto_install": true}));
        let value = serde_json::to_value(module.info()).unwrap();

        assert_eq!(
            value,
            json!({
                "application": false,
                "data": [],
                "demo": [],
                "depends": ["web"],
                "description": "a",
                "external_dependencies": {},
                "installable": true,
                "name": "sale",
                "technical_name": "sale",
                "version": "0.0.0",
            })
        );
    }
}
