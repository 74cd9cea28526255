//! [`Key`]: 256-bit key material and its text encoding.

use aes_gcm_siv::aead::{rand_core::RngCore, OsRng};
use base64::Engine as _;

use crate::error::CryptexError;
use crate::token::{KEY_LEN, TEXT};

/// Fixed-size key buffer that holds exactly [`KEY_LEN`] bytes.
///
/// The length is checked once, at construction. When this type is dropped
/// the memory is overwritten with zeroes.
#[derive(Clone, PartialEq, Eq)]
pub struct Key(Box<[u8; KEY_LEN]>);

impl Key {
    /// Generate a fresh key from the OS CSPRNG.
    pub fn generate() -> Self {
        let mut buf = Box::new([0u8; KEY_LEN]);
        OsRng.fill_bytes(buf.as_mut_slice());
        Self(buf)
    }

    /// Build a key from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CryptexError::InvalidKeySize`] if `bytes` is not [`KEY_LEN`] long.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptexError> {
        if bytes.len() != KEY_LEN {
            return Err(CryptexError::InvalidKeySize {
                actual: bytes.len(),
            });
        }
        let mut buf = Box::new([0u8; KEY_LEN]);
        buf.copy_from_slice(bytes);
        Ok(Self(buf))
    }

    /// Decode a key from URL-safe base64 (padding optional).
    ///
    /// # Errors
    ///
    /// Returns [`CryptexError::InvalidKeyEncoding`] if `text` is not base64 and
    /// [`CryptexError::InvalidKeySize`] if it does not decode to [`KEY_LEN`] bytes.
    pub fn from_text(text: &str) -> Result<Self, CryptexError> {
        let mut raw = TEXT
            .decode(text.trim())
            .map_err(|_| CryptexError::InvalidKeyEncoding)?;
        let key = Self::from_bytes(&raw);
        raw.iter_mut().for_each(|b| *b = 0);
        key
    }

    /// Encode as unpadded URL-safe base64.
    pub fn to_text(&self) -> String {
        TEXT.encode(self.0.as_slice())
    }

    pub(crate) fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl Drop for Key {
    fn drop(&mut self) {
        self.0.iter_mut().for_each(|b| *b = 0);
    }
}

impl std::fmt::Debug for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Key bytes stay out of every formatted representation.
        f.write_str("Key([REDACTED])")
    }
}

/// Generate a fresh random key in its text encoding.
pub fn generate_key() -> String {
    Key::generate().to_text()
}
