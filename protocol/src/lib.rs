// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Rollup Protocol: Transaction Core
//!
//! Client-side construction and signing for layer-2 rollup transactions.
//! Everything a wallet, market maker, or relayer needs to turn an intent
//! ("send 10 USDC to 0xafaf…", "match this taker with that maker") into
//! bytes and signatures the operator will accept.
//!
//! Two signatures matter here. The **L2 authorization signature** is an
//! Ed25519 signature over the transaction hash, made with the account's
//! layer-2 key. The **L1 signature** is an optional secp256k1 signature
//! that ties the action to a base-chain identity, either over a
//! human-readable message or over EIP-712 typed data. On top of those, a
//! relayer adds a **submitter signature** before handing the payload off.
//!
//! ## Architecture
//!
//! - **config**: Protocol constants (bit widths, limits, tags) and the
//!   per-chain L1 binding table.
//! - **crypto**: Hash wrappers, Ed25519 keys, secp256k1 signatures, EIP-712.
//! - **identity**: Addresses, public-key hashes, transaction hashes.
//! - **signer**: The L2 signer and the `L1Signer` trait.
//! - **transaction**: Amount packing, canonical encoding, builders, and the
//!   signing lifecycle.
//! - **error**: The one error type every fallible operation returns.
//! - **logging**: `tracing` subscriber setup for binaries embedding us.
//!
//! ## Ground rules
//!
//! 1. Encoding is pure. Same value in, same bytes out, on every platform.
//! 2. No implicit clocks. Timestamps are always supplied by the caller.
//! 3. Packing rounds down. We never sign for more than the user asked.
//! 4. Keys are never logged, printed, or serialized by accident.

pub mod config;
pub mod crypto;
pub mod error;
pub mod identity;
pub mod logging;
pub mod signer;
pub mod transaction;

pub use error::{ProtocolError, Result};
