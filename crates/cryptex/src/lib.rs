//! Self-contained, tamper-evident, optionally expiring tokens under a
//! symmetric AES-256 key.
//!
//! - [`Cryptex`] issues and verifies tokens under a single key.
//! - [`MultiCryptex`] holds an ordered key ring: it issues under the primary
//!   key and verifies under any key in the ring, newest first.
//! - [`SharedKeyRing`] lets a long-running process swap rings atomically while
//!   other threads keep verifying.
//!
//! # Token format
//!
//! ```text
//! base64url( expiry(8, BE) || tag(16) || nonce(12) || ciphertext(N) )
//! ```
//!
//! `expiry` is bound as AEAD associated data, so it travels in cleartext but
//! cannot be changed without invalidating the tag. An expiry of `0` means the
//! token never expires.
//!
//! The AEAD is AES-256-GCM-SIV (RFC 8452), not plain AES-GCM. Only
//! implementations using GCM-SIV with this layout can read these tokens.

pub mod clock;
pub mod cryptex;
pub mod error;
pub mod key;
pub mod multi;
pub mod shared;
pub mod token;

pub use clock::{Clock, SystemClock};
pub use cryptex::{Cryptex, DecodedToken};
pub use error::CryptexError;
pub use key::{generate_key, Key};
pub use multi::MultiCryptex;
pub use shared::SharedKeyRing;
pub use token::TokenParts;
