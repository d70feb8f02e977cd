//! 4-byte function identifiers used as routing keys.
//!
//! A selector is derived deterministically from a canonical function
//! signature string (`"transfer(address,uint256)"` style): the first four
//! bytes of the SHA-256 digest of the signature. Derivation is an internal
//! convention of this core, not a wire-compatibility surface.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Byte width of a [`Selector`].
pub const SELECTOR_LEN: usize = 4;

/// Fixed-width identifier of a callable operation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Selector(pub [u8; SELECTOR_LEN]);

impl Selector {
    /// Derive the selector for a canonical function signature.
    pub fn from_signature(signature: &str) -> Self {
        let digest = Sha256::digest(signature.as_bytes());
        let mut bytes = [0u8; SELECTOR_LEN];
        bytes.copy_from_slice(&digest[..SELECTOR_LEN]);
        Self(bytes)
    }

    pub fn from_bytes(bytes: [u8; SELECTOR_LEN]) -> Self {
        Self(bytes)
    }

    /// Parse an 8-hex-digit selector, with or without a `0x` prefix.
    pub fn from_hex(input: &str) -> Result<Self, SelectorParseError> {
        let digits = input.strip_prefix("0x").unwrap_or(input);
        if digits.len() != SELECTOR_LEN * 2 {
            return Err(SelectorParseError::InvalidLength {
                expected: SELECTOR_LEN * 2,
                actual: digits.len(),
            });
        }
        let mut bytes = [0u8; SELECTOR_LEN];
        for (i, byte) in bytes.iter_mut().enumerate() {
            let pair = &digits[i * 2..i * 2 + 2];
            *byte = u8::from_str_radix(pair, 16)
                .map_err(|_| SelectorParseError::InvalidHexDigit { position: i * 2 })?;
        }
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; SELECTOR_LEN] {
        &self.0
    }

    /// Lowercase `0x`-prefixed hex representation.
    pub fn to_hex(&self) -> String {
        let mut s = String::with_capacity(2 + SELECTOR_LEN * 2);
        s.push_str("0x");
        for byte in &self.0 {
            s.push_str(&format!("{byte:02x}"));
        }
        s
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Errors from parsing a hex selector.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum SelectorParseError {
    #[error("selector must be {expected} hex digits, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("invalid hex digit at position {position}")]
    InvalidHexDigit { position: usize },
}
