//! 20-byte identity for facets, owners, and call targets.
//!
//! `Address::ZERO` is the reserved null sentinel. It is never a valid
//! facet target for Add/Replace, is the only valid target placeholder for
//! Remove entries, and is never a valid owner identity.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Byte width of an [`Address`].
pub const ADDRESS_LEN: usize = 20;

/// Stable identity of a deployed module, owner, or call target.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Address(pub [u8; ADDRESS_LEN]);

impl Address {
    /// The null sentinel meaning "no module".
    pub const ZERO: Self = Self([0u8; ADDRESS_LEN]);

    pub fn from_bytes(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Parse a 40-hex-digit address, with or without a `0x` prefix.
    pub fn from_hex(input: &str) -> Result<Self, AddressParseError> {
        let digits = input.strip_prefix("0x").unwrap_or(input);
        if digits.len() != ADDRESS_LEN * 2 {
            return Err(AddressParseError::InvalidLength {
                expected: ADDRESS_LEN * 2,
                actual: digits.len(),
            });
        }
        let mut bytes = [0u8; ADDRESS_LEN];
        for (i, byte) in bytes.iter_mut().enumerate() {
            let pair = &digits[i * 2..i * 2 + 2];
            *byte = u8::from_str_radix(pair, 16)
                .map_err(|_| AddressParseError::InvalidHexDigit { position: i * 2 })?;
        }
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Lowercase `0x`-prefixed hex representation.
    pub fn to_hex(&self) -> String {
        let mut s = String::with_capacity(2 + ADDRESS_LEN * 2);
        s.push_str("0x");
        for byte in &self.0 {
            s.push_str(&format!("{byte:02x}"));
        }
        s
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Errors from parsing a hex address.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum AddressParseError {
    #[error("address must be {expected} hex digits, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("invalid hex digit at position {position}")]
    InvalidHexDigit { position: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sentinel_is_zero() {
        assert!(Address::ZERO.is_zero());
        assert!(!Address::from_bytes([1; ADDRESS_LEN]).is_zero());
    }

    #[test]
    fn hex_round_trip() {
        let addr = Address::from_bytes([0xAB; ADDRESS_LEN]);
        let hex = addr.to_hex();
        assert_eq!(hex.len(), 2 + ADDRESS_LEN * 2);
        assert_eq!(Address::from_hex(&hex).unwrap(), addr);
    }

    #[test]
    fn from_hex_accepts_unprefixed() {
        let bare = "00".repeat(ADDRESS_LEN);
        assert_eq!(Address::from_hex(&bare).unwrap(), Address::ZERO);
    }

    #[test]
    fn from_hex_rejects_wrong_length() {
        let err = Address::from_hex("0x1234").unwrap_err();
        assert!(matches!(
            err,
            AddressParseError::InvalidLength {
                expected: 40,
                actual: 4
            }
        ));
    }

    #[test]
    fn from_hex_rejects_non_hex() {
        let bad = format!("0x{}zz", "00".repeat(ADDRESS_LEN - 1));
        let err = Address::from_hex(&bad).unwrap_err();
        assert!(matches!(err, AddressParseError::InvalidHexDigit { .. }));
    }

    #[test]
    fn display_matches_to_hex() {
        let addr = Address::from_bytes([0x0F; ADDRESS_LEN]);
        assert_eq!(addr.to_string(), addr.to_hex());
        assert!(addr.to_string().starts_with("0x"));
    }

    #[test]
    fn ordering_is_byte_ordering() {
        let low = Address::from_bytes([1; ADDRESS_LEN]);
        let high = Address::from_bytes([2; ADDRESS_LEN]);
        assert!(low < high);
    }

    #[test]
    fn serde_round_trip() {
        let addr = Address::from_bytes([7; ADDRESS_LEN]);
        let json = serde_json::to_string(&addr).expect("serialize");
        let restored: Address = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(addr, restored);
    }
}
