//! Module discovery, registry and dependency resolution for Addon Manager
//!
//! This crate turns directories of addon modules into an ordered, queryable
//! set:
//!
//! - **Manifest parsing**: lenient conversion of manifest records into
//!   [`ModuleDescriptor`]s
//! - **Scanning**: search-root computation and one-level module discovery
//!   ([`PathScanner`])
//! - **Registry**: name-addressable module set with shadowing and listing
//!   filters ([`ModuleRegistry`])
//! - **Resolution**: dependency closure, auto-install fixed point and
//!   deterministic topological ordering ([`resolve`])
//!
//! ```text
//! SearchConfig -> PathScanner -> ModuleRegistry -> resolve / list
//!                     |
//!               addon-fs records
//! ```
//!
//! # Example
//!
//! ```no_run
//! use addon_registry::{ModuleRegistry, PathScanner, ResolveOptions, SearchConfig};
//!
//! fn example() -> addon_registry::Result<()> {
//!     let scanner = PathScanner::new(SearchConfig {
//!         base_path: Some("/opt/app".into()),
//!         ..Default::default()
//!     });
//!     let registry = ModuleRegistry::from_scan(scanner.scan());
//!     let resolution = registry.resolve(&["sale"], ResolveOptions::default())?;
//!     println!("{}", resolution.order.join(","));
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod manifest;
pub mod registry;
pub mod requirements;
pub mod resolver;
pub mod scanner;

pub use error::{Error, Result};
pub use manifest::{DEFAULT_VERSION, ModuleDescriptor, ModuleInfo};
pub use registry::{InstallableFilter, ListFilter, ListOrder, ModuleRegistry, ServerWideFilter};
pub use requirements::{DEFAULT_ECOSYSTEM, RequirementsOptions, collect_requirements};
pub use resolver::{Resolution, ResolveOptions, resolve};
pub use scanner::{
    PathScanner, Provenance, ScannedModule, Scope, SearchConfig, SearchRoot,
    discover_addons_paths, search_roots,
};
