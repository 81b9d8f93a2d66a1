//! secp256k1 signatures in the shape the base chain expects.
//!
//! The base chain never sees our Ed25519 keys; it only understands ECDSA
//! over secp256k1 with public-key recovery. A [`PackedEthSignature`] is the
//! 65-byte `r || s || v` blob wallets produce, where `v` is 27 or 28.
//! Recovering the signer from a signature and digest yields the 20-byte
//! address `keccak256(uncompressed_pubkey[1..])[12..]`.

use std::fmt;

use alloy_primitives::eip191_hash_message;
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::PublicKey;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::hash::keccak256;
use crate::config::ETH_SIGNATURE_BYTES;
use crate::error::{ProtocolError, Result};
use crate::identity::{decode_prefixed_hex, Address};

/// Offset added to the recovery id in the packed form.
const V_OFFSET: u8 = 27;

/// A recoverable secp256k1 signature, `r || s || v`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PackedEthSignature([u8; ETH_SIGNATURE_BYTES]);

/// The digest signed under the base chain's "personal sign" convention
/// (EIP-191 version `0x45`).
pub fn personal_sign_digest(message: &[u8]) -> [u8; 32] {
    eip191_hash_message(message).0
}

/// Base-chain address of a secp256k1 public key.
pub fn public_key_to_address(key: &VerifyingKey) -> Address {
    let point = PublicKey::from(key).to_encoded_point(false);
    // Drop the 0x04 SEC1 tag; the address hashes the bare x || y.
    let hash = keccak256(&point.as_bytes()[1..]);
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&hash[12..]);
    Address::from_bytes(bytes)
}

/// Sign a 32-byte digest with `key`, producing the packed recoverable form.
pub(crate) fn sign_prehash(key: &SigningKey, digest: &[u8; 32]) -> Result<PackedEthSignature> {
    let (signature, recovery_id) = key
        .sign_prehash_recoverable(digest)
        .map_err(|e| ProtocolError::Signature(format!("secp256k1 signing failed: {}", e)))?;
    let mut bytes = [0u8; ETH_SIGNATURE_BYTES];
    bytes[..64].copy_from_slice(&signature.to_bytes());
    bytes[64] = recovery_id.to_byte() + V_OFFSET;
    Ok(PackedEthSignature(bytes))
}

impl PackedEthSignature {
    pub fn from_bytes(bytes: [u8; ETH_SIGNATURE_BYTES]) -> Self {
        Self(bytes)
    }

    pub fn serialize_packed(&self) -> [u8; ETH_SIGNATURE_BYTES] {
        self.0
    }

    /// The `v` byte as stored (27 or 28 for well-formed signatures).
    pub fn v(&self) -> u8 {
        self.0[64]
    }

    pub fn as_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        decode_prefixed_hex::<ETH_SIGNATURE_BYTES>("eth_signature", s).map(Self)
    }

    /// Recover the address that signed a precomputed 32-byte digest.
    pub fn recover_from_prehash(&self, digest: &[u8; 32]) -> Result<Address> {
        let v = self.v();
        // Some wallets emit the raw recovery id instead of 27/28.
        let raw = if v >= V_OFFSET { v - V_OFFSET } else { v };
        let recovery_id = RecoveryId::from_byte(raw)
            .ok_or_else(|| ProtocolError::Signature(format!("invalid recovery byte {}", v)))?;
        let signature = Signature::from_slice(&self.0[..64])
            .map_err(|_| ProtocolError::Signature("r or s out of range".into()))?;
        let key = VerifyingKey::recover_from_prehash(digest, &signature, recovery_id)
            .map_err(|_| ProtocolError::Signature("public key recovery failed".into()))?;
        Ok(public_key_to_address(&key))
    }

    /// Recover the signer of a personal-sign message.
    pub fn signature_recover_signer(&self, message: &[u8]) -> Result<Address> {
        self.recover_from_prehash(&personal_sign_digest(message))
    }

    /// Recover the signer of an EIP-712 digest. Typed data is signed as-is,
    /// with no personal-sign prefix.
    pub fn recover_typed_data_signer(&self, digest: &[u8; 32]) -> Result<Address> {
        self.recover_from_prehash(digest)
    }
}

impl fmt::Debug for PackedEthSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PackedEthSignature({})", self.as_hex())
    }
}

impl fmt::Display for PackedEthSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_hex())
    }
}

impl Serialize for PackedEthSignature {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_hex())
    }
}

impl<'de> Deserialize<'de> for PackedEthSignature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
