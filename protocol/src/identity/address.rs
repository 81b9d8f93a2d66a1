//! Base-chain addresses.

use std::fmt;
use std::str::FromStr;

use super::{decode_prefixed_hex, impl_string_serde};
use crate::config::ADDRESS_BYTES;
use crate::error::{ProtocolError, Result};

/// A 20-byte base-chain address.
///
/// Parsing accepts any letter case (checksummed or not); display is always
/// lowercase. On the wire an address takes a full 32-byte word, left-padded
/// with zeros, see [`Address::to_fixed_bytes`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Address([u8; ADDRESS_BYTES]);

impl Address {
    pub const ZERO: Address = Address([0u8; ADDRESS_BYTES]);

    /// All-`0xFF` sentinel. Not a real account; transactions may not target it.
    pub const GLOBAL_ACCOUNT: Address = Address([0xffu8; ADDRESS_BYTES]);

    pub const fn from_bytes(bytes: [u8; ADDRESS_BYTES]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_BYTES] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    pub fn is_global_account(&self) -> bool {
        *self == Self::GLOBAL_ACCOUNT
    }

    /// The 32-byte, left-padded form used on the wire and in ABI words.
    pub fn to_fixed_bytes(&self) -> [u8; 32] {
        let mut word = [0u8; 32];
        word[32 - ADDRESS_BYTES..].copy_from_slice(&self.0);
        word
    }
}

impl From<Address> for alloy_primitives::Address {
    fn from(address: Address) -> Self {
        Self::from(address.0)
    }
}

impl From<alloy_primitives::Address> for Address {
    fn from(address: alloy_primitives::Address) -> Self {
        Self(address.into())
    }
}

impl FromStr for Address {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self> {
        decode_prefixed_hex::<ADDRESS_BYTES>("address", s).map(Self)
    }
}

impl TryFrom<&[u8]> for Address {
    type Error = ProtocolError;

    fn try_from(slice: &[u8]) -> Result<Self> {
        let bytes: [u8; ADDRESS_BYTES] = slice.try_into().map_err(|_| {
            ProtocolError::format(
                "address",
                format!("expected {} bytes, got {}", ADDRESS_BYTES, slice.len()),
            )
        })?;
        Ok(Self(bytes))
    }
}

impl From<[u8; ADDRESS_BYTES]> for Address {
    fn from(bytes: [u8; ADDRESS_BYTES]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl_string_serde!(Address);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_and_global_sentinels() {
        assert!(Address::ZERO.is_zero());
        assert!(!Address::ZERO.is_global_account());
        assert!(Address::GLOBAL_ACCOUNT.is_global_account());
        assert_eq!(
            Address::GLOBAL_ACCOUNT.to_string(),
            "0xffffffffffffffffffffffffffffffffffffffff"
        );
    }

    #[test]
    fn parse_is_case_insensitive_display_is_lowercase() {
        let addr: Address = "0xAFAFf3aD1a0425D792432D9eCD1c3e26Ef2C42E9".parse().unwrap();
        assert_eq!(addr.to_string(), "0xafaff3ad1a0425d792432d9ecd1c3e26ef2c42e9");
    }

    #[test]
    fn converts_to_and_from_alloy() {
        let addr: Address = "0xAFAFf3aD1a0425D792432D9eCD1c3e26Ef2C42E9".parse().unwrap();
        let alloy: alloy_primitives::Address = addr.into();
        assert_eq!(alloy.as_slice(), addr.as_bytes());
        assert_eq!(Address::from(alloy), addr);
    }

    #[test]
    fn six_byte_slice_is_a_format_error() {
        let err = Address::try_from(&[1u8, 2, 3, 4, 5, 6][..]).unwrap_err();
        assert!(matches!(err, ProtocolError::Format { field: "address", .. }));
    }

    #[test]
    fn fixed_bytes_are_left_padded() {
        let addr = Address::from_bytes([0xaa; 20]);
        let word = addr.to_fixed_bytes();
        assert_eq!(&word[..12], &[0u8; 12]);
        assert_eq!(&word[12..], &[0xaa; 20]);
    }

    #[test]
    fn serde_uses_hex_string() {
        let addr = Address::from_bytes([0x01; 20]);
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, "\"0x0101010101010101010101010101010101010101\"");
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
        assert!(serde_json::from_str::<Address>("\"0x0101\"").is_err());
    }
}
