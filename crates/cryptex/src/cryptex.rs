//! [`Cryptex`]: issue and verify tokens under a single key.
//!
//! **Algorithm:** AES-256-GCM-SIV (RFC 8452) with a fresh random 96-bit
//! nonce per token and a detached 128-bit tag. The 8-byte expiry field is
//! passed as associated data, so it is authenticated but not encrypted.
//!
//! **Never derive the nonce from the payload or the clock.** Every call to
//! [`Cryptex::encrypt`] draws a new nonce from the OS CSPRNG.

use std::sync::Arc;

use aes_gcm_siv::{
    aead::{rand_core::RngCore, AeadInPlace, KeyInit, OsRng},
    Aes256GcmSiv, Nonce, Tag,
};
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::error::CryptexError;
use crate::key::Key;
use crate::token::{TokenParts, NONCE_LEN, TAG_LEN};

/// A verified token: the authenticated payload and its deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedToken {
    /// Absolute Unix-seconds deadline, `None` if the token never expires.
    pub expiry: Option<u64>,
    /// The decrypted, authenticated payload.
    pub payload: Vec<u8>,
}

/// Token codec bound to one key.
///
/// Immutable after construction; share it across threads freely.
#[derive(Clone)]
pub struct Cryptex {
    key: Key,
    clock: Arc<dyn Clock>,
}

impl Cryptex {
    /// Build a codec from a key in its text encoding.
    ///
    /// # Errors
    ///
    /// Returns [`CryptexError::InvalidKeySize`] if the key does not decode to
    /// exactly 32 bytes, or [`CryptexError::InvalidKeyEncoding`] if it is not
    /// URL-safe base64.
    pub fn new(key_text: &str) -> Result<Self, CryptexError> {
        Ok(Self::from_key(Key::from_text(key_text)?))
    }

    /// Build a codec from an already validated [`Key`].
    pub fn from_key(key: Key) -> Self {
        Self {
            key,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the clock used for expiry computation and checks.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Generate a fresh random key in its text encoding.
    pub fn generate_key() -> String {
        crate::key::generate_key()
    }

    /// Encrypt `payload` into a token, optionally expiring `ttl` seconds from now.
    ///
    /// # Errors
    ///
    /// Returns [`CryptexError::AeadFailure`] on an internal AEAD error (should
    /// be unreachable with a valid key and nonce).
    pub fn encrypt(&self, payload: &[u8], ttl: Option<u64>) -> Result<String, CryptexError> {
        Ok(self.seal(payload, ttl)?.to_text())
    }

    /// Encrypt `payload` and return the token split into its wire fields.
    ///
    /// # Errors
    ///
    /// See [`Cryptex::encrypt`].
    pub fn seal(&self, payload: &[u8], ttl: Option<u64>) -> Result<TokenParts, CryptexError> {
        let cipher = self.cipher()?;

        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);

        let expiry = ttl.map(|ttl| self.clock.now_unix().saturating_add(ttl));
        let expiry_bytes = TokenParts::encode_expiry(expiry);

        let mut ciphertext = payload.to_vec();
        let tag = cipher
            .encrypt_in_place_detached(Nonce::from_slice(&nonce), &expiry_bytes, &mut ciphertext)
            .map_err(|_| CryptexError::AeadFailure)?;

        let mut tag_bytes = [0u8; TAG_LEN];
        tag_bytes.copy_from_slice(tag.as_slice());

        debug!(payload_len = payload.len(), ?expiry, "token sealed");
        Ok(TokenParts {
            expiry: expiry_bytes,
            tag: tag_bytes,
            nonce,
            ciphertext,
        })
    }

    /// Verify `token` and return its payload.
    ///
    /// # Errors
    ///
    /// - [`CryptexError::MalformedToken`] if the text is not a token.
    /// - [`CryptexError::AuthenticationFailed`] on a wrong key or any tampering.
    /// - [`CryptexError::TokenExpired`] if the token is authentic but past its deadline.
    pub fn decrypt(&self, token: &str) -> Result<Vec<u8>, CryptexError> {
        self.decrypt_token(token).map(|decoded| decoded.payload)
    }

    /// Verify `token` and return both its payload and deadline.
    ///
    /// # Errors
    ///
    /// See [`Cryptex::decrypt`].
    pub fn decrypt_token(&self, token: &str) -> Result<DecodedToken, CryptexError> {
        let parts = TokenParts::from_text(token)?;
        self.open(&parts)
    }

    /// Authenticate already parsed token fields, then enforce the deadline.
    ///
    /// The deadline is only looked at after the tag verifies, so a forged
    /// token never reveals whether its claimed expiry has passed.
    ///
    /// # Errors
    ///
    /// Returns [`CryptexError::AuthenticationFailed`] or
    /// [`CryptexError::TokenExpired`].
    pub fn open(&self, parts: &TokenParts) -> Result<DecodedToken, CryptexError> {
        let cipher = self.cipher()?;

        let mut payload = parts.ciphertext.clone();
        cipher
            .decrypt_in_place_detached(
                Nonce::from_slice(&parts.nonce),
                &parts.expiry,
                &mut payload,
                Tag::from_slice(&parts.tag),
            )
            .map_err(|_| CryptexError::AuthenticationFailed)?;

        let expiry = parts.expiry();
        if let Some(deadline) = expiry {
            let now = self.clock.now_unix();
            if now > deadline {
                payload.iter_mut().for_each(|b| *b = 0);
                debug!(deadline, now, "authentic token past deadline");
                return Err(CryptexError::TokenExpired {
                    seconds_past: now - deadline,
                });
            }
        }

        Ok(DecodedToken { expiry, payload })
    }

    pub(crate) fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    fn cipher(&self) -> Result<Aes256GcmSiv, CryptexError> {
        Aes256GcmSiv::new_from_slice(self.key.as_bytes()).map_err(|_| CryptexError::AeadFailure)
    }
}

impl std::fmt::Debug for Cryptex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cryptex")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}
