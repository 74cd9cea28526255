//! [`MultiCryptex`]: an ordered key ring for seamless key rotation.
//!
//! New tokens are always issued under the primary key (index 0). Verification
//! tries each key in order and settles on the first one whose tag verifies.
//!
//! # Failure semantics
//!
//! - A token that fails under every key yields [`CryptexError::NoValidKey`],
//!   never the error of an individual key, so callers cannot tell which key
//!   came closest.
//! - A malformed token cannot verify under any key and also yields
//!   [`CryptexError::NoValidKey`].
//! - Once a key authenticates the token, that key's outcome is final: an
//!   expired token yields [`CryptexError::TokenExpired`] and the remaining
//!   keys are not tried.

use std::sync::Arc;

use tracing::debug;

use crate::clock::Clock;
use crate::cryptex::{Cryptex, DecodedToken};
use crate::error::CryptexError;
use crate::token::TokenParts;

/// Ordered collection of codecs, primary first.
#[derive(Debug, Clone)]
pub struct MultiCryptex {
    ciphers: Vec<Cryptex>,
}

impl MultiCryptex {
    /// Build a key ring from key texts in priority order (newest first).
    ///
    /// # Errors
    ///
    /// Returns [`CryptexError::EmptyKeyRing`] if `keys` is empty, or the key
    /// error of the first invalid element.
    pub fn new<I, K>(keys: I) -> Result<Self, CryptexError>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let ciphers = keys
            .into_iter()
            .map(|key| Cryptex::new(key.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_ciphers(ciphers)
    }

    /// Build a key ring from existing codecs in priority order.
    ///
    /// # Errors
    ///
    /// Returns [`CryptexError::EmptyKeyRing`] if `ciphers` is empty.
    pub fn from_ciphers(ciphers: Vec<Cryptex>) -> Result<Self, CryptexError> {
        if ciphers.is_empty() {
            return Err(CryptexError::EmptyKeyRing);
        }
        Ok(Self { ciphers })
    }

    /// Replace the clock of every codec in the ring.
    pub fn with_clock(self, clock: Arc<dyn Clock>) -> Self {
        let ciphers = self
            .ciphers
            .into_iter()
            .map(|cipher| cipher.with_clock(Arc::clone(&clock)))
            .collect();
        Self { ciphers }
    }

    /// A new ring with `primary` in front of this ring's keys, truncated to
    /// `retain` keys. `primary` adopts this ring's clock.
    pub(crate) fn rotated(&self, primary: Cryptex, retain: usize) -> Self {
        let primary = primary.with_clock(self.primary().clock());
        let ciphers = std::iter::once(primary)
            .chain(self.ciphers.iter().cloned())
            .take(retain.max(1))
            .collect();
        Self { ciphers }
    }

    /// The codec new tokens are issued under.
    pub fn primary(&self) -> &Cryptex {
        &self.ciphers[0]
    }

    /// All codecs in priority order.
    pub fn ciphers(&self) -> &[Cryptex] {
        &self.ciphers
    }

    /// Number of keys in the ring (always at least one).
    pub fn len(&self) -> usize {
        self.ciphers.len()
    }

    /// Always `false`; a ring cannot be constructed empty.
    pub fn is_empty(&self) -> bool {
        self.ciphers.is_empty()
    }

    /// Encrypt under the primary key.
    ///
    /// # Errors
    ///
    /// See [`Cryptex::encrypt`].
    pub fn encrypt(&self, payload: &[u8], ttl: Option<u64>) -> Result<String, CryptexError> {
        self.primary().encrypt(payload, ttl)
    }

    /// Verify `token` under the first key that authenticates it.
    ///
    /// # Errors
    ///
    /// Returns [`CryptexError::NoValidKey`] or [`CryptexError::TokenExpired`].
    pub fn decrypt(&self, token: &str) -> Result<Vec<u8>, CryptexError> {
        self.decrypt_token(token).map(|decoded| decoded.payload)
    }

    /// Verify `token` and return both its payload and deadline.
    ///
    /// # Errors
    ///
    /// See [`MultiCryptex::decrypt`].
    pub fn decrypt_token(&self, token: &str) -> Result<DecodedToken, CryptexError> {
        let parts = TokenParts::from_text(token).map_err(|e| {
            debug!(error = e.kind(), "token rejected before key trial");
            CryptexError::NoValidKey
        })?;

        for (index, cipher) in self.ciphers.iter().enumerate() {
            match cipher.open(&parts) {
                Err(CryptexError::AuthenticationFailed) => continue,
                outcome => {
                    debug!(key_index = index, ok = outcome.is_ok(), "token authenticated");
                    return outcome;
                }
            }
        }

        debug!(keys = self.ciphers.len(), "no key in ring verified token");
        Err(CryptexError::NoValidKey)
    }
}
