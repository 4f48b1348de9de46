use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::errors::{CredentialsError, Result};
use crate::store::{
    StoragePaths, DEFAULT_CONFIG_DIR, DEFAULT_CREDENTIALS_FILE, DEFAULT_MASTER_KEY_FILE,
};

/// Project-level configuration, loaded from `.credentials.toml`.
///
/// Every field has a sensible default so the tool works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Directory (relative to project root) holding the key and document.
    #[serde(default = "default_config_dir")]
    pub config_dir: String,

    /// File name of the encrypted document.
    #[serde(default = "default_credentials_file")]
    pub credentials_file: String,

    /// File name of the master key.
    #[serde(default = "default_master_key_file")]
    pub master_key_file: String,

    /// Editor command used by `edit` (falls back to $VISUAL / $EDITOR / vi).
    #[serde(default)]
    pub editor: Option<String>,

    /// Plaintext config merged under the credentials by the reader.
    #[serde(default)]
    pub application_config: Option<String>,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_config_dir() -> String {
    DEFAULT_CONFIG_DIR.to_string()
}

fn default_credentials_file() -> String {
    DEFAULT_CREDENTIALS_FILE.to_string()
}

fn default_master_key_file() -> String {
    DEFAULT_MASTER_KEY_FILE.to_string()
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            config_dir: default_config_dir(),
            credentials_file: default_credentials_file(),
            master_key_file: default_master_key_file(),
            editor: None,
            application_config: None,
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the project root.
    pub const FILE_NAME: &'static str = ".credentials.toml";

    /// Load settings from `<project_dir>/.credentials.toml`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(project_dir: &Path) -> Result<Self> {
        let config_path = project_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            CredentialsError::Config(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        Ok(settings)
    }

    /// Resolve the storage paths under `project_dir`.
    ///
    /// Example: `project_dir/config/master.key`
    pub fn storage_paths(&self, project_dir: &Path) -> StoragePaths {
        StoragePaths::new(
            project_dir.join(&self.config_dir),
            &self.credentials_file,
            &self.master_key_file,
        )
    }

    /// Application config path under `project_dir`, if one is configured.
    pub fn application_config_path(&self, project_dir: &Path) -> Option<PathBuf> {
        self.application_config
            .as_ref()
            .map(|path| project_dir.join(path))
    }
}

// ── Tests ────────────────────────────────────────────────────────────
