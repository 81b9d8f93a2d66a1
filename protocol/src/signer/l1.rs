//! Base-chain signers.
//!
//! [`L1Signer`] is the seam for anything that can produce a secp256k1
//! signature: an in-memory key here, a hardware wallet or a remote signing
//! service elsewhere. The core only needs an address and two signing calls.

use std::fmt;

use k256::ecdsa::SigningKey;
use rand::rngs::OsRng;

use crate::crypto::eth::{public_key_to_address, sign_prehash};
use crate::crypto::{personal_sign_digest, PackedEthSignature};
use crate::error::{ProtocolError, Result};
use crate::identity::Address;

/// Something that holds, or can reach, a base-chain private key.
pub trait L1Signer: Send + Sync {
    /// The address the signatures recover to.
    fn address(&self) -> Address;

    /// Sign `message` under the personal-sign convention.
    fn sign_message(&self, message: &[u8]) -> Result<PackedEthSignature>;

    /// Sign a precomputed EIP-712 digest, without any prefix.
    fn sign_typed_data_hash(&self, digest: &[u8; 32]) -> Result<PackedEthSignature>;
}

/// An [`L1Signer`] over an in-memory secp256k1 key.
pub struct PrivateKeyL1Signer {
    key: SigningKey,
    address: Address,
}

impl PrivateKeyL1Signer {
    pub fn new(key: SigningKey) -> Self {
        let address = public_key_to_address(key.verifying_key());
        Self { key, address }
    }

    pub fn random() -> Self {
        Self::new(SigningKey::random(&mut OsRng))
    }

    /// Parse a 32-byte hex scalar. The `0x` prefix is optional here because
    /// wallets export keys both ways.
    pub fn from_hex(s: &str) -> Result<Self> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(digits)
            .map_err(|e| ProtocolError::format("l1_private_key", e.to_string()))?;
        if bytes.len() != 32 {
            return Err(ProtocolError::format(
                "l1_private_key",
                format!("expected 32 bytes, got {}", bytes.len()),
            ));
        }
        let key = SigningKey::from_slice(&bytes)
            .map_err(|_| ProtocolError::format("l1_private_key", "not a valid secp256k1 scalar"))?;
        Ok(Self::new(key))
    }
}

impl L1Signer for PrivateKeyL1Signer {
    fn address(&self) -> Address {
        self.address
    }

    fn sign_message(&self, message: &[u8]) -> Result<PackedEthSignature> {
        sign_prehash(&self.key, &personal_sign_digest(message))
    }

    fn sign_typed_data_hash(&self, digest: &[u8; 32]) -> Result<PackedEthSignature> {
        sign_prehash(&self.key, digest)
    }
}

impl fmt::Debug for PrivateKeyL1Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrivateKeyL1Signer(address={})", self.address)
    }
}
