//! Atomic writes for the options file
//!
//! Content goes to a hidden sibling file first, which is locked, synced and
//! then renamed over the target. A failed write never leaves the target
//! half-written, and the sibling is removed again.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::{Error, NormalizedPath, Result};

/// Hidden temporary file next to a target; deleted on drop unless persisted.
struct Sibling {
    path: PathBuf,
    file: File,
    persisted: bool,
}

impl Sibling {
    fn create(target: &Path) -> Result<Self> {
        let name = target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let path = target.with_file_name(format!(".{name}.{}.tmp", std::process::id()));
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .map_err(|e| Error::io(&path, e))?;
        Ok(Self {
            path,
            file,
            persisted: false,
        })
    }

    fn write_locked(&mut self, target: &Path, content: &[u8]) -> Result<()> {
        let lock_failed = |_| Error::LockFailed {
            path: target.to_path_buf(),
        };
        self.file.lock_exclusive().map_err(lock_failed)?;
        self.file
            .write_all(content)
            .and_then(|()| self.file.sync_all())
            .map_err(|e| Error::io(&self.path, e))?;
        self.file.unlock().map_err(lock_failed)
    }

    fn persist(mut self, target: &Path) -> Result<()> {
        fs::rename(&self.path, target).map_err(|e| Error::io(target, e))?;
        self.persisted = true;
        Ok(())
    }
}

impl Drop for Sibling {
    fn drop(&mut self) {
        if !self.persisted {
            let _ = fs::remove_file(&self.path);
        }
    }
}

/// Replace `path` with `content` atomically, creating parent directories.
pub fn write_atomic(path: &NormalizedPath, content: &[u8]) -> Result<()> {
    let target = path.to_native();
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let mut sibling = Sibling::create(&target)?;
    sibling.write_locked(&target, content)?;
    sibling.persist(&target)
}

/// Read text content from a file.
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native = path.to_native();
    fs::read_to_string(&native).map_err(|e| Error::io(&native, e))
}

/// Write text content to a file atomically.
pub fn write_text(path: &NormalizedPath, content: &str) -> Result<()> {
    write_atomic(path, content.as_bytes())
}
