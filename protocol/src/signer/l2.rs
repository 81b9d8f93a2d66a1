//! The layer-2 signer.
//!
//! One type covers both roles that sign with an Ed25519 key: the account
//! owner producing authorization signatures, and the relayer producing
//! submitter signatures. The two never need to share a key.

use std::fmt;

use zeroize::Zeroizing;

use super::l1::L1Signer;
use crate::config::L2_KEY_DERIVATION_MESSAGE;
use crate::crypto::hash::double_sha256;
use crate::crypto::{L2Keypair, L2PublicKey, L2Signature};
use crate::error::{ProtocolError, Result};
use crate::identity::{decode_prefixed_hex, PubKeyHash, TxHash};

/// Minimum seed length accepted by [`L2Signer::from_seed`].
pub const MIN_SEED_BYTES: usize = 32;

#[derive(Clone)]
pub struct L2Signer {
    keypair: L2Keypair,
}

impl L2Signer {
    pub fn random() -> Self {
        Self {
            keypair: L2Keypair::generate(),
        }
    }

    /// Load a raw 32-byte private key, `0x` + 64 hex digits.
    pub fn from_hex(s: &str) -> Result<Self> {
        let secret = Zeroizing::new(decode_prefixed_hex::<32>("l2_private_key", s)?);
        Ok(Self {
            keypair: L2Keypair::from_seed(&secret),
        })
    }

    /// Derive a key from arbitrary seed bytes: `sha256(sha256(seed))`.
    pub fn from_seed(seed: &[u8]) -> Result<Self> {
        if seed.len() < MIN_SEED_BYTES {
            return Err(ProtocolError::format(
                "seed",
                format!("expected at least {} bytes, got {}", MIN_SEED_BYTES, seed.len()),
            ));
        }
        Ok(Self {
            keypair: L2Keypair::from_seed(&Zeroizing::new(double_sha256(seed))),
        })
    }

    /// Derive the layer-2 key an L1 wallet controls.
    ///
    /// The wallet signs a fixed message and the 65-byte signature becomes
    /// the seed. secp256k1 signing here is RFC 6979 deterministic, so the
    /// same wallet always lands on the same layer-2 key.
    pub fn from_l1_signer(l1: &dyn L1Signer) -> Result<Self> {
        let signature = l1.sign_message(L2_KEY_DERIVATION_MESSAGE.as_bytes())?;
        Self::from_seed(&signature.serialize_packed())
    }

    pub fn public_key(&self) -> L2PublicKey {
        self.keypair.public_key()
    }

    pub fn public_key_hash(&self) -> PubKeyHash {
        PubKeyHash::from_pubkey(&self.keypair.public_key())
    }

    pub fn sign_authorization(&self, message: &[u8]) -> L2Signature {
        L2Signature {
            pub_key: self.keypair.public_key(),
            signature: self.keypair.sign(message),
        }
    }

    /// Check `signature` against its own embedded key, whoever produced it.
    pub fn verify(signature: &L2Signature, message: &[u8]) -> bool {
        signature.verify(message)
    }

    /// The relayer's co-signature over an already-signed transaction.
    pub fn submitter_signature(&self, tx_hash: &TxHash) -> L2Signature {
        self.sign_authorization(tx_hash.as_bytes())
    }
}

impl fmt::Debug for L2Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L2Signer(pub_key_hash={})", self.public_key_hash())
    }
}
