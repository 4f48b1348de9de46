//! The master key: 32 random bytes stored hex-encoded in `master.key`.
//!
//! The key is generated once, on the first `edit`, and read on every
//! later edit or read.  This tool never rotates it.

use std::fmt;
use std::path::Path;

use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use super::fill_random;
use crate::errors::{CredentialsError, Result};
use crate::store::FileSystem;

/// Length of the master key in bytes (256 bits, for AES-256).
pub const MASTER_KEY_LEN: usize = 32;

/// A 32-byte master key that zeroes its memory when dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MasterKey {
    bytes: [u8; MASTER_KEY_LEN],
}

impl MasterKey {
    /// Wrap raw key bytes.
    pub fn from_bytes(bytes: [u8; MASTER_KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Decode a hex-encoded key.  Surrounding whitespace (a trailing
    /// newline left by a text editor, say) is ignored.
    pub fn from_hex(encoded: &str) -> Result<Self> {
        let mut decoded = hex::decode(encoded.trim())
            .map_err(|e| CredentialsError::KeyFormat(format!("not valid hex: {e}")))?;

        if decoded.len() != MASTER_KEY_LEN {
            let len = decoded.len();
            decoded.zeroize();
            return Err(CredentialsError::KeyFormat(format!(
                "expected {MASTER_KEY_LEN} bytes, got {len}"
            )));
        }

        let mut bytes = [0u8; MASTER_KEY_LEN];
        bytes.copy_from_slice(&decoded);
        decoded.zeroize();
        Ok(Self { bytes })
    }

    /// Draw a fresh key from the OS random source.
    pub fn random() -> Result<Self> {
        let mut bytes = [0u8; MASTER_KEY_LEN];
        fill_random(&mut bytes)?;
        Ok(Self { bytes })
    }

    /// Generate a new key and write it, hex-encoded, to `path` with
    /// owner-only permissions.
    pub fn generate(fs: &impl FileSystem, path: &Path) -> Result<Self> {
        let key = Self::random()?;
        let encoded = key.to_hex();
        fs.write_private(path, encoded.as_bytes()).map_err(|e| {
            CredentialsError::io(format!("failed to write {}", path.display()), e)
        })?;
        Ok(key)
    }

    /// Load and decode the key stored at `path`.
    pub fn load(fs: &impl FileSystem, path: &Path) -> Result<Self> {
        let raw = Zeroizing::new(
            fs.read(path)
                .map_err(|e| CredentialsError::io(format!("open {}", path.display()), e))?,
        );
        let encoded = std::str::from_utf8(&raw)
            .map_err(|_| CredentialsError::KeyFormat("not valid hex: non-UTF-8 content".into()))?;
        Self::from_hex(encoded)
    }

    /// Access the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; MASTER_KEY_LEN] {
        &self.bytes
    }

    /// Lowercase hex encoding, as stored on disk.
    pub fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.bytes))
    }
}

impl fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MasterKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}
