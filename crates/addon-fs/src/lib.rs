//! Filesystem layer for Addon Manager
//!
//! Provides normalized path handling, atomic I/O, decoding of per-module
//! manifest records and the format-preserving options file.

pub mod config;
pub mod constants;
pub mod error;
pub mod io;
pub mod literal;
pub mod path;
pub mod record;

pub use config::OptionsFile;
pub use constants::{ADDONS_SUBDIR, MANIFEST_FILENAMES, find_manifest};
pub use error::{Error, Result};
pub use path::{NormalizedPath, canonical_identity, is_within};
pub use record::{RecordFormat, read_record};
