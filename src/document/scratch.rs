//! The temporary plaintext file handed to the editor.
//!
//! `ScratchFile` owns the file for its whole lifetime: it is created with
//! a unique name and owner-only permissions, and dropping the guard
//! overwrites it with zeros and removes it.  Every exit path of the edit
//! workflow therefore cleans up, including editor failures and panics
//! that unwind.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use zeroize::Zeroizing;

use crate::errors::{CredentialsError, Result};

/// A uniquely named temporary file holding decrypted credentials.
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    /// Create a scratch file in the system temp directory.
    pub fn create(contents: &[u8]) -> Result<Self> {
        Self::create_in(&std::env::temp_dir(), contents)
    }

    /// Create a scratch file in `dir` and write `contents` to it.
    pub fn create_in(dir: &Path, contents: &[u8]) -> Result<Self> {
        let filename = format!(
            "credentials-{}-{}-{:08x}.yml",
            std::process::id(),
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or(0),
            rand::random::<u32>()
        );
        let path = dir.join(filename);

        // Create the file with restrictive permissions atomically (no TOCTOU race).
        #[cfg(unix)]
        let mut file = {
            use std::os::unix::fs::OpenOptionsExt;
            fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .mode(0o600)
                .open(&path)
                .map_err(|e| CredentialsError::io("failed to create temporary file", e))?
        };

        #[cfg(not(unix))]
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| CredentialsError::io("failed to create temporary file", e))?;

        // From here on the guard removes the file, even if the write fails.
        let scratch = Self { path };

        file.write_all(contents)
            .and_then(|()| file.flush())
            .map_err(|e| CredentialsError::io("failed to write temporary file", e))?;

        Ok(scratch)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read back whatever the editor left in the file.
    pub fn read(&self) -> Result<Zeroizing<Vec<u8>>> {
        fs::read(&self.path)
            .map(Zeroizing::new)
            .map_err(|e| CredentialsError::io("failed to read edited content", e))
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        secure_delete(&self.path);
    }
}

/// Overwrite a file's contents with zeros before deleting it.
/// Best-effort: failures are ignored.
fn secure_delete(path: &Path) {
    if let Ok(metadata) = fs::metadata(path) {
        let len = metadata.len() as usize;
        if len > 0 {
            if let Ok(mut file) = fs::OpenOptions::new().write(true).open(path) {
                let zeros = vec![0u8; len];
                let _ = file.write_all(&zeros);
                let _ = file.flush();
            }
        }
    }
    let _ = fs::remove_file(path);
}
