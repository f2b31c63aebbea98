//! End-to-end integration test for the discovery pipeline
//!
//! This test exercises the complete flow: options file -> search roots ->
//! scan -> registry -> resolution and requirements.

use std::fs;
use std::path::PathBuf;

use addon_fs::{NormalizedPath, OptionsFile};
use addon_registry::{
    InstallableFilter, ListFilter, ListOrder, ModuleRegistry, PathScanner, RequirementsOptions,
    ResolveOptions, Scope, SearchConfig, collect_requirements, search_roots,
};
use addon_test_utils::TestAddons;
use pretty_assertions::assert_eq;
use serde_json::json;

/// Lay out a base installation plus a vendor tree and an options file that
/// points at the vendor tree.
fn setup_installation(tree: &TestAddons) -> (PathBuf, OptionsFile) {
    let (base, addons) = tree.init_base();
    tree.generate_addons(&addons, &["base", "web"], json!({"depends": [], "server_wide": true}));
    tree.generate_addons(&addons, &["mail"], json!({"depends": ["base"]}));
    tree.generate_addons(&addons, &["sale"], json!({"depends": ["mail"], "version": "1.0"}));

    let vendor = tree.dir("vendor/oca/sale-workflow");
    tree.generate_addons(
        &vendor,
        &["sale"],
        json!({"depends": ["mail", "web"], "version": "2.0"}),
    );
    tree.generate_addons(
        &vendor,
        &["sale_stock"],
        json!({
            "depends": ["sale", "stock"],
            "external_dependencies": {"python": ["Requests"]},
        }),
    );
    tree.generate_addons(
        &vendor,
        &["sale_mail_bridge"],
        json!({"depends": ["sale", "mail"], "auto_install": true}),
    );
    tree.generate_addons(&vendor, &["sale_legacy"], json!({"installable": false}));

    let mut options = OptionsFile::load(tree.root().join("addons.toml")).unwrap();
    options
        .set_addons_path(&[tree.root().join("vendor").display().to_string()])
        .unwrap();
    options.save().unwrap();

    (base, OptionsFile::load(tree.root().join("addons.toml")).unwrap())
}

fn config_from(base: PathBuf, options: &OptionsFile) -> SearchConfig {
    SearchConfig {
        base_path: Some(base),
        extra_paths: options.addons_path().into_iter().map(PathBuf::from).collect(),
        exclude_base: false,
    }
}

#[test]
fn test_full_pipeline() {
    let tree = TestAddons::new();
    let (base, options) = setup_installation(&tree);
    let config = config_from(base.clone(), &options);

    // Roots: base first, then the discovered vendor directory.
    let roots = search_roots(&config);
    assert_eq!(roots.len(), 2);
    assert_eq!(roots[0].scope, Scope::Base);
    assert_eq!(roots[0].path, NormalizedPath::new(base.join("addons")));
    assert_eq!(roots[1].scope, Scope::Extra);
    assert!(roots[1].path.as_str().ends_with("vendor/oca/sale-workflow"));

    let registry = ModuleRegistry::from_scan(PathScanner::new(config).scan());
    assert_eq!(registry.len(), 7);

    // The vendor copy of sale shadows the base one.
    assert_eq!(registry.get("sale").unwrap().version, "2.0");

    let resolution = registry
        .resolve(
            &["sale_stock"],
            ResolveOptions {
                include_auto_install: true,
                installable: InstallableFilter::Installable,
            },
        )
        .unwrap();
    assert_eq!(
        resolution.order,
        vec!["base", "mail", "web", "sale", "sale_mail_bridge", "sale_stock"]
    );
    assert_eq!(resolution.unresolved, vec!["stock"]);

    let modules: Vec<_> = resolution
        .order
        .iter()
        .filter_map(|name| registry.get(name).ok())
        .collect();
    assert_eq!(
        collect_requirements(modules, &RequirementsOptions::default()),
        vec!["requests"]
    );
}

#[test]
fn test_exclude_base_keeps_vendor_modules() {
    let tree = TestAddons::new();
    let (base, options) = setup_installation(&tree);
    let config = SearchConfig {
        exclude_base: true,
        ..config_from(base, &options)
    };

    let registry = ModuleRegistry::from_scan(PathScanner::new(config).scan());
    let listed: Vec<_> = registry
        .list(&ListFilter {
            order: ListOrder::Sorted,
            installable: InstallableFilter::Installable,
            ..Default::default()
        })
        .into_iter()
        .map(|m| m.technical_name.as_str())
        .collect();
    assert_eq!(listed, vec!["sale", "sale_mail_bridge", "sale_stock"]);

    // Dependencies in the excluded base scope are simply unresolved.
    let resolution = registry
        .resolve(&["sale_stock"], ResolveOptions::default())
        .unwrap();
    assert_eq!(resolution.order, vec!["sale", "sale_stock"]);
    assert_eq!(resolution.unresolved, vec!["stock", "mail", "web"]);
}

#[test]
fn test_options_file_survives_edits() {
    let tree = TestAddons::new();
    let path = tree.root().join("addons.toml");
    fs::write(
        &path,
        "# local settings\n[options]\ndata_dir = \"/var/lib/addons\" # keep\n",
    )
    .unwrap();

    let mut options = OptionsFile::load(path.clone()).unwrap();
    options.set("db_name", "prod").unwrap();
    options
        .set_addons_path(&["/srv/addons".to_string()])
        .unwrap();
    options.save().unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("# local settings"));
    assert!(content.contains("# keep"));

    let reloaded = OptionsFile::load(path).unwrap();
    assert_eq!(reloaded.get("db_name").as_deref(), Some("prod"));
    assert_eq!(reloaded.get("options.data_dir").as_deref(), Some("/var/lib/addons"));
    assert_eq!(reloaded.addons_path(), vec!["/srv/addons"]);
}
