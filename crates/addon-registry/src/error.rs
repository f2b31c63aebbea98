use std::path::PathBuf;

/// Errors that can occur in module discovery and resolution.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A single manifest could not be turned into a module descriptor.
    #[error("invalid manifest for module '{module}' at {path}: {reason}")]
    Parse {
        module: String,
        path: PathBuf,
        reason: String,
    },

    /// Requested module does not exist in the registry.
    #[error("module not found: {0}")]
    NotFound(String),

    /// Required modules that could not be placed in dependency order.
    #[error("dependency cycle detected between: {}", participants.join(", "))]
    DependencyCycle {
        /// Unplaced modules, in discovery order.
        participants: Vec<String>,
        /// Modules that were ordered before the cycle blocked progress.
        resolved: Vec<String>,
    },

    /// Filesystem error from addon-fs.
    #[error(transparent)]
    Fs(#[from] addon_fs::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
