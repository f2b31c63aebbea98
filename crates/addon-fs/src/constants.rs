//! Well-known file and directory names.

use crate::NormalizedPath;

/// Manifest file names, in lookup priority order.
///
/// A directory is a module directory when one of these exists directly
/// inside it. The first match wins.
pub const MANIFEST_FILENAMES: &[&str] = &[
    "__manifest__.py",
    "__openerp__.py",
    "__manifest__.toml",
    "__manifest__.json",
    "__manifest__.yaml",
    "__manifest__.yml",
];

/// Subdirectory of a base installation that holds the base-scope modules.
pub const ADDONS_SUBDIR: &str = "addons";

/// Locate the manifest file at the top level of `dir`.
///
/// Returns `None` when `dir` is not a module directory.
pub fn find_manifest(dir: &NormalizedPath) -> Option<NormalizedPath> {
    MANIFEST_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|candidate| candidate.is_file())
}
