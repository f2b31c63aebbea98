//! Slash-normalized paths for search roots and module locations

use std::path::{Path, PathBuf};

/// A filesystem location stored with forward slashes.
///
/// Module source paths and search roots are compared, printed and written to
/// the options file in this form, so output is the same on every platform.
/// Native paths are produced only when touching the filesystem.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedPath {
    inner: String,
}

impl NormalizedPath {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            inner: path.as_ref().to_string_lossy().replace('\\', "/"),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Native form for filesystem calls.
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.inner)
    }

    /// Append `segment`, which may itself contain separators.
    pub fn join(&self, segment: &str) -> Self {
        let segment = segment.replace('\\', "/");
        let mut inner = self.inner.clone();
        if !inner.is_empty() && !inner.ends_with('/') {
            inner.push('/');
        }
        inner.push_str(segment.trim_start_matches('/'));
        Self { inner }
    }

    /// Last non-empty component.
    pub fn file_name(&self) -> Option<&str> {
        self.inner
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .filter(|name| !name.is_empty())
    }

    pub fn is_dir(&self) -> bool {
        self.to_native().is_dir()
    }

    pub fn is_file(&self) -> bool {
        self.to_native().is_file()
    }

    /// Whether the final component is a dot-file or dot-directory.
    pub fn is_hidden(&self) -> bool {
        self.file_name().is_some_and(|name| name.starts_with('.'))
    }

    /// Extension of the file name; dot-files have none.
    pub fn extension(&self) -> Option<&str> {
        match self.file_name()?.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => Some(ext),
            _ => None,
        }
    }

    /// Path identity used for deduplication: the canonical path when the
    /// target exists, otherwise the native path as given.
    pub fn identity(&self) -> PathBuf {
        canonical_identity(self.to_native())
    }
}

/// Resolve `path` to the form used to compare directories for identity.
///
/// Symlinks and `..` components are resolved through the filesystem. Paths
/// that cannot be canonicalized (missing, unreadable) are returned unchanged.
pub fn canonical_identity(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    dunce::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Whether `path` is `base` or lies somewhere beneath it, compared by
/// canonical identity.
pub fn is_within(path: impl AsRef<Path>, base: impl AsRef<Path>) -> bool {
    canonical_identity(path).starts_with(canonical_identity(base))
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<&str> for NormalizedPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NormalizedPath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<PathBuf> for NormalizedPath {
    fn from(p: PathBuf) -> Self {
        Self::new(p)
    }
}

impl From<&Path> for NormalizedPath {
    fn from(p: &Path) -> Self {
        Self::new(p)
    }
}
