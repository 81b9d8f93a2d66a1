//! Core type definitions for rollup transactions.
//!
//! Identifiers are thin newtypes over the smallest unsigned integer that
//! holds their in-memory range. The wire width can be narrower (a `TokenId`
//! is a `u32` here but 16 bits on the wire); the encoder truncates to the
//! wire width, and the validators guarantee nothing is lost when it does.

use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::config::{
    AUTO_DELEVERAGING_TX_TYPE, CHANGE_PUBKEY_TX_TYPE, CONTRACT_MATCHING_TX_TYPE, DEPOSIT_TX_TYPE,
    FORCED_EXIT_TX_TYPE, FULL_EXIT_TX_TYPE, FUNDING_TX_TYPE, LIQUIDATION_TX_TYPE,
    ORDER_MATCHING_TX_TYPE, TRANSFER_TX_TYPE, UPDATE_GLOBAL_VAR_TX_TYPE, WITHDRAW_TX_TYPE,
};

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

macro_rules! id_newtype {
    ($(#[$meta:meta])* $name:ident($inner:ty)) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub $inner);

        impl Deref for $name {
            type Target = $inner;

            fn deref(&self) -> &$inner {
                &self.0
            }
        }

        impl From<$inner> for $name {
            fn from(value: $inner) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(
    /// Layer-2 chain id. Each base chain the rollup settles on gets one.
    ChainId(u8)
);
id_newtype!(
    /// Index of an account in the account tree.
    AccountId(u32)
);
id_newtype!(SubAccountId(u8));
id_newtype!(TokenId(u32));
id_newtype!(
    /// Perpetual contract pair.
    PairId(u16)
);
id_newtype!(
    /// Order slot inside a sub-account; each slot carries its own order nonce.
    SlotId(u32)
);
id_newtype!(MarginId(u8));
id_newtype!(Nonce(u32));
id_newtype!(
    /// Seconds since the Unix epoch, always supplied by the caller.
    TimeStamp(u32)
);
id_newtype!(
    /// Serial number of an L1 priority operation.
    SerialId(u64)
);

// ---------------------------------------------------------------------------
// TxType
// ---------------------------------------------------------------------------

/// Discriminant of a [`RollupTx`](super::RollupTx), with its wire tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TxType {
    Deposit,
    Withdraw,
    Transfer,
    FullExit,
    ChangePubKey,
    ForcedExit,
    OrderMatching,
    ContractMatching,
    Liquidation,
    AutoDeleveraging,
    UpdateGlobalVar,
    Funding,
}

impl TxType {
    /// The leading byte of the canonical encoding.
    pub fn tag(self) -> u8 {
        match self {
            Self::Deposit => DEPOSIT_TX_TYPE,
            Self::Withdraw => WITHDRAW_TX_TYPE,
            Self::Transfer => TRANSFER_TX_TYPE,
            Self::FullExit => FULL_EXIT_TX_TYPE,
            Self::ChangePubKey => CHANGE_PUBKEY_TX_TYPE,
            Self::ForcedExit => FORCED_EXIT_TX_TYPE,
            Self::OrderMatching => ORDER_MATCHING_TX_TYPE,
            Self::ContractMatching => CONTRACT_MATCHING_TX_TYPE,
            Self::Liquidation => LIQUIDATION_TX_TYPE,
            Self::AutoDeleveraging => AUTO_DELEVERAGING_TX_TYPE,
            Self::UpdateGlobalVar => UPDATE_GLOBAL_VAR_TX_TYPE,
            Self::Funding => FUNDING_TX_TYPE,
        }
    }

    /// Priority operations originate on L1 and carry no L2 signature.
    pub fn is_priority_op(self) -> bool {
        matches!(self, Self::Deposit | Self::FullExit)
    }

    /// Variants whose L2 action can additionally be bound to an L1 identity.
    pub fn supports_l1_binding(self) -> bool {
        matches!(
            self,
            Self::Transfer | Self::Withdraw | Self::ForcedExit | Self::ChangePubKey
        )
    }
}

impl fmt::Display for TxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Deposit => "Deposit",
            Self::Withdraw => "Withdraw",
            Self::Transfer => "Transfer",
            Self::FullExit => "FullExit",
            Self::ChangePubKey => "ChangePubKey",
            Self::ForcedExit => "ForcedExit",
            Self::OrderMatching => "OrderMatching",
            Self::ContractMatching => "ContractMatching",
            Self::Liquidation => "Liquidation",
            Self::AutoDeleveraging => "AutoDeleveraging",
            Self::UpdateGlobalVar => "UpdateGlobalVar",
            Self::Funding => "Funding",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// TxStatus
// ---------------------------------------------------------------------------

/// Where a transaction is in the signing lifecycle.
///
/// The pipeline enforces the order at compile time; this enum exists so the
/// current stage can be logged or shown to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TxStatus {
    /// Built, no signatures yet.
    Built,
    /// Authorization signature attached.
    L2Signed,
    /// L1 signature or ChangePubKey binding attached.
    L1Bound,
    /// Every check passed; safe to hand to a relayer.
    Ready,
    /// Co-signed by the submitter. Terminal.
    Submitted,
}

impl fmt::Display for TxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Built => write!(f, "Built"),
            Self::L2Signed => write!(f, "L2Signed"),
            Self::L1Bound => write!(f, "L1Bound"),
            Self::Ready => write!(f, "Ready"),
            Self::Submitted => write!(f, "Submitted"),
        }
    }
}

// ---------------------------------------------------------------------------
// Serde helpers
// ---------------------------------------------------------------------------

/// Serialize a `BigUint` as a decimal string so JSON consumers never lose
/// precision to floating point.
pub(crate) mod biguint_str {
    use std::str::FromStr;

    use num_bigint::BigUint;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigUint, D::Error> {
        let s = String::deserialize(deserializer)?;
        BigUint::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// `[u8; 32]` as `0x` + 64 hex digits.
pub(crate) mod hex_bytes32 {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::identity::decode_prefixed_hex;

    pub fn serialize<S: Serializer>(bytes: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(bytes)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[u8; 32], D::Error> {
        let s = String::deserialize(deserializer)?;
        decode_prefixed_hex::<32>("bytes32", &s).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
