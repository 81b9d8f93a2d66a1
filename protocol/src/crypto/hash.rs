//! # Hashing Utilities
//!
//! Three hash functions, each with exactly one job:
//!
//! - **SHA-256**: the transaction hash. `TxHash = sha256(encode(tx))`, and
//!   that 32-byte digest is what the L2 and submitter signatures cover.
//!   Also used (doubled) to stretch an L1 signature into an L2 key seed.
//!
//! - **BLAKE3**: the public-key hash. The first 20 bytes of
//!   `blake3(pubkey)` are what an account registers on-chain.
//!
//! - **Keccak-256**: L1 addresses and the CREATE2 salt commitment. The
//!   standard base-chain digests (EIP-191, EIP-712, CREATE2) are built by
//!   alloy on top of the same function.
//!
//! Keccak-256 is *not* SHA3-256 (the padding differs). Ethereum shipped
//! before the standard was final, and here we are.

use sha2::{Digest, Sha256};
use sha3::Keccak256;

/// Compute the SHA-256 hash of the input data.
///
/// # Example
///
/// ```
/// use rollup_protocol::crypto::sha256;
///
/// let hash = sha256(b"rollup");
/// assert_eq!(hash.len(), 32);
/// ```
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// `sha256(sha256(data))`. Used for key derivation from seeds, where a
/// second round keeps the raw seed one step further from the key.
pub fn double_sha256(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// Compute the BLAKE3 hash of the input data.
pub fn blake3_hash(data: &[u8]) -> [u8; 32] {
    *blake3::hash(data).as_bytes()
}

/// Compute the Keccak-256 hash of the input data, as Ethereum does.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}

/// Keccak-256 over several parts without concatenating them first.
pub fn keccak256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
