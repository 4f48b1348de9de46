//! Config reader: decrypt the credentials and merge them into typed config.
//!
//! `ConfigReader::read` runs the whole startup path:
//! 1. load the master key,
//! 2. decrypt `credentials.yml.enc`,
//! 3. merge it over the optional plaintext application config,
//! 4. deserialize one section into the caller's type,
//! 5. apply environment-variable overrides to that type's listed fields.

pub mod env;
pub mod tree;

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::crypto::{decrypt_with_key, MasterKey};
use crate::errors::{CredentialsError, Result};
use crate::output;
use crate::store::{FileSystem, OsFileSystem, StoragePaths};

pub use env::{apply_env_overrides, EnvField, EnvOverrides, EnvSlot};
pub use tree::ConfigTree;

type EnvLookup = Box<dyn Fn(&str) -> Option<String>>;
type WarningSink = Box<dyn Fn(&str)>;

/// Reads encrypted credentials into typed configuration.
pub struct ConfigReader<F = OsFileSystem> {
    paths: StoragePaths,
    application_config: Option<PathBuf>,
    fs: F,
    env: EnvLookup,
    warn: WarningSink,
}

impl ConfigReader {
    /// Reader over real files and the process environment.
    pub fn new(paths: StoragePaths) -> Self {
        Self {
            paths,
            application_config: None,
            fs: OsFileSystem,
            env: Box::new(|name| std::env::var(name).ok()),
            warn: Box::new(output::warning),
        }
    }

    /// Reader configured from `.credentials.toml` settings for `project_dir`.
    pub fn from_settings(settings: &Settings, project_dir: &Path) -> Self {
        let reader = Self::new(settings.storage_paths(project_dir));
        match settings.application_config_path(project_dir) {
            Some(path) => reader.with_application_config(path),
            None => reader,
        }
    }
}

impl<F: FileSystem> ConfigReader<F> {
    /// Use a different filesystem capability.
    pub fn with_fs<G: FileSystem>(self, fs: G) -> ConfigReader<G> {
        ConfigReader {
            paths: self.paths,
            application_config: self.application_config,
            fs,
            env: self.env,
            warn: self.warn,
        }
    }

    /// Merge the credentials over this plaintext config file.
    ///
    /// Files ending in `.toml` are parsed as TOML, anything else as YAML.
    /// A missing file only produces a warning.
    pub fn with_application_config(mut self, path: impl Into<PathBuf>) -> Self {
        self.application_config = Some(path.into());
        self
    }

    /// Replace the environment lookup used for overrides.
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String> + 'static) -> Self {
        self.env = Box::new(lookup);
        self
    }

    /// Route non-fatal warnings (an unreadable application config) to
    /// `sink` instead of stderr.
    pub fn with_warnings(mut self, sink: impl Fn(&str) + 'static) -> Self {
        self.warn = Box::new(sink);
        self
    }

    pub fn paths(&self) -> &StoragePaths {
        &self.paths
    }

    /// Load the master key and decrypt the credentials document.
    pub fn decrypt_document(&self) -> Result<Zeroizing<Vec<u8>>> {
        let key = MasterKey::load(&self.fs, self.paths.master_key())
            .map_err(|e| CredentialsError::KeyRead(Box::new(e)))?;

        let ciphertext = self.fs.read(self.paths.credentials()).map_err(|e| {
            CredentialsError::Decrypt(Box::new(CredentialsError::io(
                format!("open {}", self.paths.credentials().display()),
                e,
            )))
        })?;

        decrypt_with_key(&key, &ciphertext).map_err(|e| CredentialsError::Decrypt(Box::new(e)))
    }

    /// Decrypt the credentials and merge them over the application config.
    pub fn load_tree(&self) -> Result<ConfigTree> {
        let plaintext = self.decrypt_document()?;
        let credentials = ConfigTree::from_yaml(&plaintext)?;

        let mut tree = match &self.application_config {
            Some(path) => self.load_application_config(path)?,
            None => ConfigTree::default(),
        };
        tree.merge(credentials);
        Ok(tree)
    }

    /// Read `section` into a new `T`, then apply environment overrides.
    pub fn read<T>(&self, section: &str) -> Result<T>
    where
        T: DeserializeOwned + EnvOverrides,
    {
        let mut config: T = self.load_tree()?.unmarshal_section(section)?;
        apply_env_overrides(&mut config, &self.env);
        Ok(config)
    }

    /// Like `read`, but replaces `target` in place.  On error `target`
    /// is left as it was.
    pub fn read_into<T>(&self, section: &str, target: &mut T) -> Result<()>
    where
        T: DeserializeOwned + EnvOverrides,
    {
        *target = self.read(section)?;
        Ok(())
    }

    fn load_application_config(&self, path: &Path) -> Result<ConfigTree> {
        let bytes = match self.fs.read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                (self.warn)(&format!(
                    "could not read application config {}: {e}",
                    path.display()
                ));
                return Ok(ConfigTree::default());
            }
        };

        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        if is_toml {
            let text = String::from_utf8(bytes).map_err(|e| {
                CredentialsError::Parse(format!("{} is not UTF-8: {e}", path.display()))
            })?;
            ConfigTree::from_toml(&text)
        } else {
            ConfigTree::from_yaml(&bytes)
        }
    }
}
