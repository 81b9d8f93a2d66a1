//! # Transaction Module
//!
//! Construction, encoding, signing, and verification of rollup
//! transactions. Every action an account can take is one variant of
//! [`RollupTx`].
//!
//! ## Architecture
//!
//! ```text
//! types.rs        Id newtypes, TxType, TxStatus, serde helpers
//! packing.rs      35/5 amount and 11/5 fee float packing
//! encoding.rs     ByteWriter and the Encode trait (canonical bytes, tx hash)
//! validation.rs   Per-field range checks shared by every variant
//! prices.rs       Oracle price lists
//! transfer.rs ... update_global_var.rs
//!                 One file per variant: fields, rules, byte layout
//! tx.rs           The RollupTx enum
//! builder.rs      Builders that validate before returning a variant
//! messages.rs     Human-readable L1 messages
//! signing.rs      The TxPipeline typestate
//! verification.rs Ordered signature and binding checks
//! ```
//!
//! ## Transaction Lifecycle
//!
//! 1. **Build**: a builder from [`builder`] assembles and validates the fields.
//! 2. **Sign**: [`TxPipeline::sign_l2`] attaches the Ed25519 authorization.
//! 3. **Bind**: optionally tie the action to the L1 owner.
//! 4. **Verify**: every signature and binding is checked, cheapest first.
//! 5. **Submit**: a relayer co-signs and forwards the [`Submission`].
//!
//! ## Design Decisions
//!
//! - The transaction hash is `sha256` of the canonical bytes. Signatures and
//!   display-only fields are never encoded, so signing does not change it.
//! - Amounts are `BigUint` end to end. Anything that must fit a packed slot
//!   is checked at build time rather than silently rounded.
//! - Priority operations (Deposit, FullExit) are encodable but never enter
//!   the signing pipeline.

pub mod auth;
pub mod builder;
pub mod change_pubkey;
pub mod contract;
pub mod deposit;
pub mod encoding;
pub mod forced_exit;
pub mod funding;
pub mod liquidation;
pub mod messages;
pub mod order;
pub mod packing;
pub mod prices;
pub mod signing;
pub mod transfer;
pub mod tx;
pub mod types;
pub mod update_global_var;
pub mod validation;
pub mod verification;
pub mod withdraw;

pub use auth::{ChangePubKeyAuthData, Create2Data};
pub use change_pubkey::ChangePubKey;
pub use contract::{Contract, ContractMatching};
pub use deposit::{Deposit, FullExit};
pub use encoding::Encode;
pub use forced_exit::ForcedExit;
pub use funding::{Funding, FundingInfo};
pub use liquidation::{AutoDeleveraging, Liquidation};
pub use messages::L1MessageContext;
pub use order::{Order, OrderMatching};
pub use signing::{BindingRequest, L1Binding, Submission, TxPipeline};
pub use transfer::Transfer;
pub use tx::RollupTx;
pub use types::{TxStatus, TxType};
pub use update_global_var::{Parameter, UpdateGlobalVar};
pub use verification::{verify_l2_signature, verify_submitter_signature, VerificationContext};
pub use withdraw::Withdraw;
