//! # Identity Module
//!
//! The fixed-size identifiers the rest of the crate passes around:
//!
//! 1. **Address**: a 20-byte base-chain address, or the all-`0xFF`
//!    "global account" sentinel used for cross-domain routing.
//! 2. **PubKeyHash**: a 20-byte fingerprint of a layer-2 public key. This
//!    is what an account registers, so the key itself never hits the chain
//!    until it signs something.
//! 3. **TxHash**: the 32-byte SHA-256 of a transaction's canonical bytes.
//!
//! All three share one string discipline: `0x` followed by exactly twice
//! as many hex digits as there are bytes. Anything else is a format error.

pub mod address;
pub mod pubkey_hash;
pub mod tx_hash;

pub use address::Address;
pub use pubkey_hash::PubKeyHash;
pub use tx_hash::TxHash;

use crate::error::{ProtocolError, Result};

/// Decode `0x`-prefixed hex into exactly `N` bytes.
pub(crate) fn decode_prefixed_hex<const N: usize>(field: &'static str, s: &str) -> Result<[u8; N]> {
    let digits = s
        .strip_prefix("0x")
        .ok_or_else(|| ProtocolError::format(field, "missing 0x prefix"))?;
    if digits.len() != N * 2 {
        return Err(ProtocolError::format(
            field,
            format!("expected {} hex digits, got {}", N * 2, digits.len()),
        ));
    }
    let mut out = [0u8; N];
    hex::decode_to_slice(digits, &mut out)
        .map_err(|e| ProtocolError::format(field, e.to_string()))?;
    Ok(out)
}

/// Serialize a type through its `Display`/`FromStr` string form.
macro_rules! impl_string_serde {
    ($ty:ty) => {
        impl serde::Serialize for $ty {
            fn serialize<S: serde::Serializer>(
                &self,
                serializer: S,
            ) -> std::result::Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> serde::Deserialize<'de> for $ty {
            fn deserialize<D: serde::Deserializer<'de>>(
                deserializer: D,
            ) -> std::result::Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

pub(crate) use impl_string_serde;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_exact_length() {
        let bytes: [u8; 2] = decode_prefixed_hex("field", "0xabCD").unwrap();
        assert_eq!(bytes, [0xab, 0xcd]);
    }

    #[test]
    fn rejects_missing_prefix_wrong_length_and_bad_digits() {
        assert!(decode_prefixed_hex::<2>("field", "abcd").is_err());
        assert!(decode_prefixed_hex::<2>("field", "0xabc").is_err());
        assert!(decode_prefixed_hex::<2>("field", "0xabcdef").is_err());
        assert!(decode_prefixed_hex::<2>("field", "0xzzzz").is_err());
    }
}
