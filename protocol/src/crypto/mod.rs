//! # Cryptographic Primitives
//!
//! Thin, typed wrappers over audited crates. Nothing in here implements
//! curve arithmetic or a hash function; it only decides *which* primitive
//! gets which bytes.
//!
//! - **Ed25519** (`ed25519-dalek`) for layer-2 authorization and submitter
//!   signatures.
//! - **secp256k1** (`k256`) for base-chain signatures with key recovery.
//! - **SHA-256** for transaction hashes, **BLAKE3** for public-key hashes,
//!   **Keccak-256** for anything the base chain checks.
//! - EIP-712, EIP-191 and CREATE2 constructions from `alloy-sol-types` and
//!   `alloy-primitives`.

pub mod eip712;
pub mod eth;
pub mod hash;
pub mod keys;
pub mod l1_signature;

pub use eip712::{domain_for_chain, ChangePubKeyTypedData, Eip712Domain};
pub use eth::{personal_sign_digest, PackedEthSignature};
pub use hash::{blake3_hash, double_sha256, keccak256, sha256};
pub use keys::{L2Keypair, L2PublicKey, L2Signature};
pub use l1_signature::{Eip1271Signature, L1Signature};
