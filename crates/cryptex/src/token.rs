//! Binary wire layout of a token and its text transport encoding.
//!
//! ```text
//! offset  0        8              24          36
//!         | expiry | tag          | nonce     | ciphertext ...
//!         | 8, BE  | 16           | 12        | len(payload)
//! ```
//!
//! All header fields are fixed width, so parsing is pure offset arithmetic.
//! Nothing in this module authenticates anything; see [`crate::Cryptex`].

use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine as _,
};

use crate::error::CryptexError;

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Byte length of the big-endian expiry field.
pub const EXPIRY_LEN: usize = 8;

/// Byte length of the AEAD authentication tag (128 bits).
pub const TAG_LEN: usize = 16;

/// Byte length of the AEAD nonce (96 bits).
pub const NONCE_LEN: usize = 12;

/// Byte length of the fixed header preceding the ciphertext.
pub const HEADER_LEN: usize = EXPIRY_LEN + TAG_LEN + NONCE_LEN;

/// URL-safe base64: unpadded on output, padding optional on input.
pub(crate) const TEXT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// A token split into its wire fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenParts {
    /// Raw big-endian expiry bytes; also the AEAD associated data.
    pub expiry: [u8; EXPIRY_LEN],
    /// AEAD authentication tag.
    pub tag: [u8; TAG_LEN],
    /// AEAD nonce.
    pub nonce: [u8; NONCE_LEN],
    /// Encrypted payload, same length as the plaintext.
    pub ciphertext: Vec<u8>,
}

impl TokenParts {
    /// Encode an optional deadline into the raw expiry field (`None` → `0`).
    pub fn encode_expiry(expiry: Option<u64>) -> [u8; EXPIRY_LEN] {
        expiry.unwrap_or(0).to_be_bytes()
    }

    /// The cleartext deadline, `None` if the token never expires.
    ///
    /// This value is **not authenticated** until the token has been opened
    /// under the right key. Use it for diagnostics only.
    pub fn expiry(&self) -> Option<u64> {
        match u64::from_be_bytes(self.expiry) {
            0 => None,
            secs => Some(secs),
        }
    }

    /// Serialise to `expiry || tag || nonce || ciphertext`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN + self.ciphertext.len());
        out.extend_from_slice(&self.expiry);
        out.extend_from_slice(&self.tag);
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// Split raw token bytes at the fixed offsets.
    ///
    /// # Errors
    ///
    /// Returns [`CryptexError::MalformedToken`] if `bytes` is shorter than
    /// [`HEADER_LEN`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptexError> {
        if bytes.len() < HEADER_LEN {
            return Err(CryptexError::MalformedToken);
        }
        let (expiry, rest) = bytes.split_at(EXPIRY_LEN);
        let (tag, rest) = rest.split_at(TAG_LEN);
        let (nonce, ciphertext) = rest.split_at(NONCE_LEN);

        Ok(Self {
            expiry: expiry.try_into().map_err(|_| CryptexError::MalformedToken)?,
            tag: tag.try_into().map_err(|_| CryptexError::MalformedToken)?,
            nonce: nonce.try_into().map_err(|_| CryptexError::MalformedToken)?,
            ciphertext: ciphertext.to_vec(),
        })
    }

    /// Encode to the transport text form.
    pub fn to_text(&self) -> String {
        TEXT.encode(self.to_bytes())
    }

    /// Parse the transport text form.
    ///
    /// # Errors
    ///
    /// Returns [`CryptexError::MalformedToken`] if `text` is not URL-safe
    /// base64 or decodes to fewer than [`HEADER_LEN`] bytes.
    pub fn from_text(text: &str) -> Result<Self, CryptexError> {
        let bytes = TEXT
            .decode(text.trim())
            .map_err(|_| CryptexError::MalformedToken)?;
        Self::from_bytes(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;

    fn sample() -> TokenParts {
        TokenParts {
            expiry: TokenParts::encode_expiry(Some(0x0102_0304_0506_0708)),
            tag: [0xAA; TAG_LEN],
            nonce: [0xBB; NONCE_LEN],
            ciphertext: b"ciphers".to_vec(),
        }
    }

    #[test]
    fn header_is_36_bytes() {
        assert_eq!(HEADER_LEN, 36);
    }

    #[test]
    fn layout_offsets_are_fixed() {
        let bytes = sample().to_bytes();
        assert_eq!(bytes.len(), HEADER_LEN + 7);
        assert_eq!(&bytes[..8], &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(&bytes[8..24], &[0xAA; TAG_LEN]);
        assert_eq!(&bytes[24..36], &[0xBB; NONCE_LEN]);
        assert_eq!(&bytes[36..], b"ciphers");
    }

    #[test]
    fn text_round_trip_preserves_fields() {
        let parts = sample();
        let parsed = TokenParts::from_text(&parts.to_text()).unwrap();
        assert_eq!(parsed, parts);
        assert_eq!(parsed.expiry(), Some(0x0102_0304_0506_0708));
    }

    #[test]
    fn zero_expiry_means_never() {
        let mut parts = sample();
        parts.expiry = TokenParts::encode_expiry(None);
        assert_eq!(parts.expiry, [0u8; EXPIRY_LEN]);
        assert_eq!(parts.expiry(), None);
    }

    #[test]
    fn empty_ciphertext_is_allowed() {
        let bytes = [0u8; HEADER_LEN];
        let parts = TokenParts::from_bytes(&bytes).unwrap();
        assert!(parts.ciphertext.is_empty());
    }

    #[test]
    fn rejects_short_input() {
        let bytes = [0u8; HEADER_LEN - 1];
        assert_eq!(
            TokenParts::from_bytes(&bytes),
            Err(CryptexError::MalformedToken)
        );
    }

    #[test]
    fn rejects_bad_base64() {
        assert_eq!(
            TokenParts::from_text("!!!not base64!!!"),
            Err(CryptexError::MalformedToken)
        );
    }

    #[test]
    fn accepts_padded_input() {
        let parts = sample();
        let padded = base64::engine::general_purpose::URL_SAFE.encode(parts.to_bytes());
        assert!(padded.ends_with('='));
        assert_eq!(TokenParts::from_text(&padded).unwrap(), parts);
    }
}
