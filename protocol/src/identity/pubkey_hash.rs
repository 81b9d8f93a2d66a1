//! Layer-2 public-key hashes.
//!
//! An account registers `PubKeyHash` rather than the key itself. The hash is
//! the first 20 bytes of BLAKE3 over the 32-byte Ed25519 public key, which
//! keeps the on-chain footprint the same size as an address.

use std::fmt;
use std::str::FromStr;

use super::{decode_prefixed_hex, impl_string_serde};
use crate::config::PUBKEY_HASH_BYTES;
use crate::crypto::hash::blake3_hash;
use crate::crypto::L2PublicKey;
use crate::error::{ProtocolError, Result};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PubKeyHash([u8; PUBKEY_HASH_BYTES]);

impl PubKeyHash {
    /// The hash of "no key registered yet".
    pub const ZERO: PubKeyHash = PubKeyHash([0u8; PUBKEY_HASH_BYTES]);

    pub const fn from_bytes(bytes: [u8; PUBKEY_HASH_BYTES]) -> Self {
        Self(bytes)
    }

    pub fn from_pubkey(key: &L2PublicKey) -> Self {
        let digest = blake3_hash(key.as_bytes());
        let mut bytes = [0u8; PUBKEY_HASH_BYTES];
        bytes.copy_from_slice(&digest[..PUBKEY_HASH_BYTES]);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; PUBKEY_HASH_BYTES] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl FromStr for PubKeyHash {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self> {
        decode_prefixed_hex::<PUBKEY_HASH_BYTES>("pub_key_hash", s).map(Self)
    }
}

impl fmt::Display for PubKeyHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for PubKeyHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PubKeyHash({})", self)
    }
}

impl_string_serde!(PubKeyHash);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::L2Keypair;

    #[test]
    fn derived_from_public_key() {
        let kp = L2Keypair::from_seed(&[4u8; 32]);
        let a = PubKeyHash::from_pubkey(&kp.public_key());
        let b = PubKeyHash::from_pubkey(&kp.public_key());
        assert_eq!(a, b);
        assert!(!a.is_zero());

        let other = L2Keypair::from_seed(&[5u8; 32]);
        assert_ne!(a, PubKeyHash::from_pubkey(&other.public_key()));
    }

    #[test]
    fn string_roundtrip() {
        let pkh = PubKeyHash::from_bytes([0xab; 20]);
        let s = pkh.to_string();
        assert_eq!(s.len(), 42);
        assert_eq!(s.parse::<PubKeyHash>().unwrap(), pkh);
        assert!("0xabab".parse::<PubKeyHash>().is_err());
    }
}
