//! Storage layout and the filesystem capability.
//!
//! Credentials live in one directory (default `config/`):
//! - `master.key`: hex-encoded master key, owner-only permissions
//! - `credentials.yml.enc`: `IV || ciphertext`

pub mod fs;

use std::path::{Path, PathBuf};

pub use fs::{FileSystem, OsFileSystem};

/// Default storage directory, relative to the project root.
pub const DEFAULT_CONFIG_DIR: &str = "config";

/// Default name of the encrypted document.
pub const DEFAULT_CREDENTIALS_FILE: &str = "credentials.yml.enc";

/// Default name of the master key file.
pub const DEFAULT_MASTER_KEY_FILE: &str = "master.key";

/// Resolved locations of the key and the encrypted document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePaths {
    dir: PathBuf,
    credentials: PathBuf,
    master_key: PathBuf,
}

impl StoragePaths {
    /// Build paths from a directory and the two file names inside it.
    pub fn new(dir: impl Into<PathBuf>, credentials_file: &str, master_key_file: &str) -> Self {
        let dir = dir.into();
        Self {
            credentials: dir.join(credentials_file),
            master_key: dir.join(master_key_file),
            dir,
        }
    }

    /// Paths with the default file names inside `dir`.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self::new(dir, DEFAULT_CREDENTIALS_FILE, DEFAULT_MASTER_KEY_FILE)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn credentials(&self) -> &Path {
        &self.credentials
    }

    pub fn master_key(&self) -> &Path {
        &self.master_key
    }

    /// File name of the master key, as shown in user-facing messages.
    pub fn master_key_name(&self) -> String {
        self.master_key
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .into_owned()
    }
}

impl Default for StoragePaths {
    fn default() -> Self {
        Self::in_dir(DEFAULT_CONFIG_DIR)
    }
}
