//! # Layer-2 Key Management
//!
//! Ed25519 key material for layer-2 accounts.
//!
//! Every rollup account registers the hash of one Ed25519 public key (see
//! [`PubKeyHash`](crate::identity::PubKeyHash)). The matching private key
//! produces the authorization signature on every transaction the account
//! sends, and relayers use a key of the same kind for submitter signatures.
//!
//! ## Security considerations
//!
//! - `SigningKey` wipes its secret when dropped. Secret bytes decoded from
//!   hex sit in a `Zeroizing` buffer until the key is built.
//! - `Debug` never prints secret material, only the public key.
//! - [`L2Keypair`] deliberately does not implement serde. Exporting a
//!   secret should be a conscious call to [`L2Keypair::secret_key_bytes`].

use std::fmt;

use ed25519_dalek::{Signature as DalekSignature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroizing;

use crate::config::{L2_PUBLIC_KEY_BYTES, L2_SIGNATURE_BYTES};
use crate::error::{ProtocolError, Result};
use crate::identity::decode_prefixed_hex;

/// An Ed25519 keypair owned by a layer-2 account or a relayer.
pub struct L2Keypair {
    signing_key: SigningKey,
}

/// The public half of an [`L2Keypair`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct L2PublicKey {
    bytes: [u8; L2_PUBLIC_KEY_BYTES],
}

/// A detached authorization signature together with the public key that
/// produced it.
///
/// Carrying the key makes the signature self-verifying: anyone can check it
/// against the message without knowing who signed. Whether that key is the
/// *right* one for the account is a separate question, answered by comparing
/// its hash to the account's registered [`PubKeyHash`](crate::identity::PubKeyHash).
///
/// The wire form is `pubkey (32) || signature (64)`, rendered as `0x` + 192
/// hex digits.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct L2Signature {
    pub pub_key: L2PublicKey,
    pub signature: [u8; L2_SIGNATURE_BYTES],
}

impl L2Keypair {
    /// Generate a fresh keypair from the OS RNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Build a keypair from a 32-byte seed. In Ed25519 the seed *is* the
    /// secret key, so weak seeds give weak keys.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    pub fn public_key(&self) -> L2PublicKey {
        L2PublicKey {
            bytes: self.signing_key.verifying_key().to_bytes(),
        }
    }

    /// Sign `message`, returning the raw 64-byte signature.
    ///
    /// Ed25519 is deterministic: the same key and message always produce the
    /// same signature, so there is no nonce to get wrong.
    pub fn sign(&self, message: &[u8]) -> [u8; L2_SIGNATURE_BYTES] {
        self.signing_key.sign(message).to_bytes()
    }

    /// Exports the raw secret. Handle with care.
    pub fn secret_key_bytes(&self) -> Zeroizing<[u8; 32]> {
        Zeroizing::new(self.signing_key.to_bytes())
    }
}

impl Clone for L2Keypair {
    fn clone(&self) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&self.secret_key_bytes()),
        }
    }
}

impl fmt::Debug for L2Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L2Keypair(pub={})", self.public_key())
    }
}

// ---------------------------------------------------------------------------
// L2PublicKey
// ---------------------------------------------------------------------------

impl L2PublicKey {
    /// Wrap raw bytes without checking they form a curve point. Verification
    /// against such a key simply fails.
    pub fn from_bytes(bytes: [u8; L2_PUBLIC_KEY_BYTES]) -> Self {
        Self { bytes }
    }

    /// Parse and validate a 32-byte public key.
    pub fn try_from_slice(slice: &[u8]) -> Result<Self> {
        let bytes: [u8; L2_PUBLIC_KEY_BYTES] = slice.try_into().map_err(|_| {
            ProtocolError::format(
                "public_key",
                format!("expected {} bytes, got {}", L2_PUBLIC_KEY_BYTES, slice.len()),
            )
        })?;
        VerifyingKey::from_bytes(&bytes)
            .map_err(|_| ProtocolError::format("public_key", "not a valid Ed25519 point"))?;
        Ok(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8; L2_PUBLIC_KEY_BYTES] {
        &self.bytes
    }

    /// Verify a raw 64-byte signature over `message`.
    pub fn verify(&self, message: &[u8], signature: &[u8; L2_SIGNATURE_BYTES]) -> bool {
        let Ok(verifying_key) = VerifyingKey::from_bytes(&self.bytes) else {
            return false;
        };
        let dalek_sig = DalekSignature::from_bytes(signature);
        verifying_key.verify(message, &dalek_sig).is_ok()
    }

    /// `0x`-prefixed lowercase hex.
    pub fn as_hex(&self) -> String {
        format!("0x{}", hex::encode(self.bytes))
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = decode_prefixed_hex::<L2_PUBLIC_KEY_BYTES>("public_key", s)?;
        Self::try_from_slice(&bytes)
    }
}

impl fmt::Display for L2PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_hex())
    }
}

impl fmt::Debug for L2PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L2PublicKey({})", &self.as_hex()[..18])
    }
}

// ---------------------------------------------------------------------------
// L2Signature
// ---------------------------------------------------------------------------

impl L2Signature {
    pub const BYTES: usize = L2_PUBLIC_KEY_BYTES + L2_SIGNATURE_BYTES;

    /// Check the signature against `message` using the embedded public key.
    pub fn verify(&self, message: &[u8]) -> bool {
        self.pub_key.verify(message, &self.signature)
    }

    /// `pubkey || signature`.
    pub fn to_bytes(&self) -> [u8; Self::BYTES] {
        let mut out = [0u8; Self::BYTES];
        out[..L2_PUBLIC_KEY_BYTES].copy_from_slice(&self.pub_key.bytes);
        out[L2_PUBLIC_KEY_BYTES..].copy_from_slice(&self.signature);
        out
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != Self::BYTES {
            return Err(ProtocolError::format(
                "l2_signature",
                format!("expected {} bytes, got {}", Self::BYTES, bytes.len()),
            ));
        }
        let pub_key = L2PublicKey::try_from_slice(&bytes[..L2_PUBLIC_KEY_BYTES])?;
        let mut signature = [0u8; L2_SIGNATURE_BYTES];
        signature.copy_from_slice(&bytes[L2_PUBLIC_KEY_BYTES..]);
        Ok(Self { pub_key, signature })
    }

    pub fn as_hex(&self) -> String {
        format!("0x{}", hex::encode(self.to_bytes()))
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = decode_prefixed_hex::<{ L2Signature::BYTES }>("l2_signature", s)?;
        Self::from_slice(&bytes)
    }
}

impl fmt::Debug for L2Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sig = hex::encode(self.signature);
        write!(f, "L2Signature(pub={:?}, sig=0x{}…)", self.pub_key, &sig[..16])
    }
}

impl Serialize for L2Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_hex())
    }
}

impl<'de> Deserialize<'de> for L2Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
