//! Error type shared by every token operation.

use thiserror::Error;

use crate::token::{HEADER_LEN, KEY_LEN};

/// Errors produced while building codecs or issuing and verifying tokens.
///
/// Variants map to stable machine-readable codes via [`CryptexError::kind`]:
/// - [`CryptexError::InvalidKeySize`] → `invalid_key_size`
/// - [`CryptexError::InvalidKeyEncoding`] → `invalid_key_encoding`
/// - [`CryptexError::EmptyKeyRing`] → `empty_key_ring`
/// - [`CryptexError::MalformedToken`] → `malformed_token`
/// - [`CryptexError::AuthenticationFailed`] → `authentication_failed`
/// - [`CryptexError::TokenExpired`] → `token_expired`
/// - [`CryptexError::NoValidKey`] → `no_valid_key`
/// - [`CryptexError::AeadFailure`] → `aead_failure`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptexError {
    /// The decoded key is not exactly [`KEY_LEN`] bytes.
    #[error("invalid key size: expected {KEY_LEN} bytes, got {actual}")]
    InvalidKeySize {
        /// Length of the decoded key material.
        actual: usize,
    },

    /// The key text is not valid URL-safe base64.
    #[error("invalid key encoding: expected URL-safe base64")]
    InvalidKeyEncoding,

    /// A key ring was constructed (or rotated) with no keys.
    #[error("key ring must contain at least one key")]
    EmptyKeyRing,

    /// The token is not valid base64 or is shorter than the fixed header.
    #[error("malformed token: expected URL-safe base64 of at least {HEADER_LEN} bytes")]
    MalformedToken,

    /// The authentication tag did not verify: wrong key, corruption, or tampering.
    #[error("token authentication failed")]
    AuthenticationFailed,

    /// The token is authentic but its deadline has passed.
    #[error("token expired {seconds_past} seconds ago")]
    TokenExpired {
        /// Seconds elapsed since the embedded expiry.
        seconds_past: u64,
    },

    /// No key in the ring could verify the token.
    #[error("no valid key found for token")]
    NoValidKey,

    /// The AEAD primitive rejected an encryption request.
    #[error("aead operation failed")]
    AeadFailure,
}

impl CryptexError {
    /// Short code suitable for logs and machine-readable output.
    pub fn kind(&self) -> &'static str {
        match self {
            CryptexError::InvalidKeySize { .. } => "invalid_key_size",
            CryptexError::InvalidKeyEncoding => "invalid_key_encoding",
            CryptexError::EmptyKeyRing => "empty_key_ring",
            CryptexError::MalformedToken => "malformed_token",
            CryptexError::AuthenticationFailed => "authentication_failed",
            CryptexError::TokenExpired { .. } => "token_expired",
            CryptexError::NoValidKey => "no_valid_key",
            CryptexError::AeadFailure => "aead_failure",
        }
    }
}
