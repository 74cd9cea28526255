//! [`SharedKeyRing`]: a key ring that can be rotated while in use.
//!
//! Backed by `arc-swap`, so readers on the hot path never block and a
//! rotation atomically swaps in a complete new ring. A reader that loaded the
//! previous ring keeps a consistent view until it drops its `Arc`.

use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::info;

use crate::cryptex::Cryptex;
use crate::error::CryptexError;
use crate::multi::MultiCryptex;

/// Shared, lock-free handle to the current [`MultiCryptex`].
#[derive(Clone, Debug)]
pub struct SharedKeyRing {
    inner: Arc<ArcSwap<MultiCryptex>>,
}

impl SharedKeyRing {
    /// Wrap an initial ring.
    pub fn new(ring: MultiCryptex) -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(ring)),
        }
    }

    /// Snapshot of the current ring.
    pub fn load(&self) -> Arc<MultiCryptex> {
        self.inner.load_full()
    }

    /// Atomically replace the entire ring.
    pub fn replace(&self, ring: MultiCryptex) {
        info!(keys = ring.len(), "key ring replaced");
        self.inner.store(Arc::new(ring));
    }

    /// Promote `new_primary` to the front of the ring, keeping at most
    /// `retain` keys in total (the oldest are retired first).
    ///
    /// On error the current ring is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`CryptexError::EmptyKeyRing`] if `retain` is zero, or the key
    /// error if `new_primary` is invalid.
    pub fn rotate(&self, new_primary: &str, retain: usize) -> Result<(), CryptexError> {
        if retain == 0 {
            return Err(CryptexError::EmptyKeyRing);
        }
        let primary = Cryptex::new(new_primary)?;

        // Rebuilt from whatever ring is current at swap time, so concurrent
        // rotations compose instead of overwriting each other.
        let previous = self.inner.rcu(|current| current.rotated(primary.clone(), retain));

        let keys = retain.min(previous.len() + 1);
        info!(keys, retired = previous.len() + 1 - keys, "key ring rotated");
        Ok(())
    }

    /// Encrypt under the current primary key.
    ///
    /// # Errors
    ///
    /// See [`Cryptex::encrypt`].
    pub fn encrypt(&self, payload: &[u8], ttl: Option<u64>) -> Result<String, CryptexError> {
        self.inner.load().encrypt(payload, ttl)
    }

    /// Verify under the current ring.
    ///
    /// # Errors
    ///
    /// See [`MultiCryptex::decrypt`].
    pub fn decrypt(&self, token: &str) -> Result<Vec<u8>, CryptexError> {
        self.inner.load().decrypt(token)
    }
}
