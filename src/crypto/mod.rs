//! Cryptographic primitives for credentials.
//!
//! This module provides:
//! - AES-256-CFB encryption and decryption with IV framing (`cipher`)
//! - The hex-encoded master key and its on-disk lifecycle (`master_key`)

pub mod cipher;
pub mod master_key;

use rand::rngs::OsRng;
use rand::TryRngCore;

use crate::errors::{CredentialsError, Result};

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{encrypt, decrypt, MasterKey};
pub use cipher::{decrypt, decrypt_with_key, encrypt, encrypt_with_key, IV_LEN};
pub use master_key::{MasterKey, MASTER_KEY_LEN};

/// Fill `buf` from the operating system's secure random source.
pub(crate) fn fill_random(buf: &mut [u8]) -> Result<()> {
    OsRng
        .try_fill_bytes(buf)
        .map_err(|e| CredentialsError::RandomSource(e.to_string()))
}
