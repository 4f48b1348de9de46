//! AES-256-CFB stream encryption of the credentials document.
//!
//! Each call to `encrypt` draws a fresh random 16-byte IV and prepends
//! it to the ciphertext.  `decrypt` splits the IV back out before
//! running the inverse transform.
//!
//! Layout of the returned byte buffer:
//!   [ 16-byte IV | ciphertext (same length as plaintext) ]
//!
//! CFB provides confidentiality only.  There is no authentication tag,
//! so a tampered document decrypts to garbage instead of failing.

use aes::Aes256;
use cfb_mode::cipher::{AsyncStreamCipher, KeyIvInit};
use zeroize::Zeroizing;

use super::fill_random;
use super::master_key::MasterKey;
use crate::errors::{CredentialsError, Result};

type Aes256CfbEnc = cfb_mode::Encryptor<Aes256>;
type Aes256CfbDec = cfb_mode::Decryptor<Aes256>;

/// Size of the IV in bytes (the AES block size).
pub const IV_LEN: usize = 16;

/// Encrypt `plaintext` under a hex-encoded 32-byte key.
///
/// Returns the IV prepended to the ciphertext (IV || ciphertext).
pub fn encrypt(key_hex: &str, plaintext: &[u8]) -> Result<Vec<u8>> {
    let key = MasterKey::from_hex(key_hex)?;
    encrypt_with_key(&key, plaintext)
}

/// Decrypt data that was produced by `encrypt`.
///
/// The key is validated before the ciphertext length is checked.
pub fn decrypt(ciphertext: &[u8], key_hex: &str) -> Result<Zeroizing<Vec<u8>>> {
    let key = MasterKey::from_hex(key_hex)?;
    decrypt_with_key(&key, ciphertext)
}

/// Encrypt with an already decoded master key.
pub fn encrypt_with_key(key: &MasterKey, plaintext: &[u8]) -> Result<Vec<u8>> {
    let mut output = vec![0u8; IV_LEN + plaintext.len()];
    let (iv, body) = output.split_at_mut(IV_LEN);
    fill_random(iv)?;
    body.copy_from_slice(plaintext);

    let cipher = Aes256CfbEnc::new_from_slices(key.as_bytes(), iv)
        .map_err(|e| CredentialsError::KeyFormat(format!("cipher init: {e}")))?;
    cipher.encrypt(body);

    Ok(output)
}

/// Decrypt with an already decoded master key.
pub fn decrypt_with_key(key: &MasterKey, ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    if ciphertext.len() < IV_LEN {
        return Err(CredentialsError::CiphertextTooShort);
    }

    let (iv, body) = ciphertext.split_at(IV_LEN);
    let mut plaintext = Zeroizing::new(body.to_vec());

    let cipher = Aes256CfbDec::new_from_slices(key.as_bytes(), iv)
        .map_err(|e| CredentialsError::KeyFormat(format!("cipher init: {e}")))?;
    cipher.decrypt(plaintext.as_mut_slice());

    Ok(plaintext)
}
