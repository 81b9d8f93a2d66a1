//! # Signers
//!
//! Two kinds of key sign rollup traffic:
//!
//! - [`L2Signer`] holds an Ed25519 key. Account owners use it for the
//!   authorization signature on every transaction; relayers use one for the
//!   submitter co-signature.
//! - [`L1Signer`] is anything that can produce base-chain secp256k1
//!   signatures. [`PrivateKeyL1Signer`] is the in-memory implementation;
//!   hardware wallets implement the trait themselves.
//!
//! Neither signer keeps per-transaction state, so both can be shared across
//! threads freely.

pub mod l1;
pub mod l2;

pub use l1::{L1Signer, PrivateKeyL1Signer};
pub use l2::L2Signer;
