//! Transaction hashes.

use std::fmt;
use std::str::FromStr;

use super::{decode_prefixed_hex, impl_string_serde};
use crate::config::TX_HASH_BYTES;
use crate::crypto::sha256;
use crate::error::{ProtocolError, Result};

/// SHA-256 of a transaction's canonical encoding. This is also the exact
/// message the layer-2 and submitter signatures cover.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TxHash([u8; TX_HASH_BYTES]);

impl TxHash {
    /// Hash encoded transaction bytes.
    pub fn of(encoded: &[u8]) -> Self {
        Self(sha256(encoded))
    }

    pub const fn from_bytes(bytes: [u8; TX_HASH_BYTES]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; TX_HASH_BYTES] {
        &self.0
    }
}

impl FromStr for TxHash {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self> {
        decode_prefixed_hex::<TX_HASH_BYTES>("tx_hash", s).map(Self)
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxHash({})", self)
    }
}

impl_string_serde!(TxHash);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_of_empty_input() {
        assert_eq!(
            TxHash::of(b"").to_string(),
            "0xe3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn display_parse_roundtrip() {
        let hash = TxHash::of(b"tx");
        assert_eq!(hash.to_string().len(), 66);
        assert_eq!(hash.to_string().parse::<TxHash>().unwrap(), hash);
    }
}
