//! The closed set of rollup transactions.

use serde::{Deserialize, Serialize};

use super::change_pubkey::ChangePubKey;
use super::contract::ContractMatching;
use super::deposit::{Deposit, FullExit};
use super::encoding::Encode;
use super::forced_exit::ForcedExit;
use super::funding::Funding;
use super::liquidation::{AutoDeleveraging, Liquidation};
use super::order::OrderMatching;
use super::transfer::Transfer;
use super::types::TxType;
use super::update_global_var::UpdateGlobalVar;
use super::withdraw::Withdraw;
use crate::crypto::L2Signature;
use crate::error::Result;

/// Any transaction the operator accepts, tagged by `type` in JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RollupTx {
    Deposit(Deposit),
    Withdraw(Withdraw),
    Transfer(Transfer),
    FullExit(FullExit),
    ChangePubKey(ChangePubKey),
    ForcedExit(ForcedExit),
    OrderMatching(OrderMatching),
    ContractMatching(ContractMatching),
    Liquidation(Liquidation),
    AutoDeleveraging(AutoDeleveraging),
    UpdateGlobalVar(UpdateGlobalVar),
    Funding(Funding),
}

/// Dispatch an expression over every variant.
macro_rules! for_each_variant {
    ($value:expr, $tx:ident => $body:expr) => {
        match $value {
            RollupTx::Deposit($tx) => $body,
            RollupTx::Withdraw($tx) => $body,
            RollupTx::Transfer($tx) => $body,
            RollupTx::FullExit($tx) => $body,
            RollupTx::ChangePubKey($tx) => $body,
            RollupTx::ForcedExit($tx) => $body,
            RollupTx::OrderMatching($tx) => $body,
            RollupTx::ContractMatching($tx) => $body,
            RollupTx::Liquidation($tx) => $body,
            RollupTx::AutoDeleveraging($tx) => $body,
            RollupTx::UpdateGlobalVar($tx) => $body,
            RollupTx::Funding($tx) => $body,
        }
    };
}

impl RollupTx {
    pub fn tx_type(&self) -> TxType {
        match self {
            Self::Deposit(_) => TxType::Deposit,
            Self::Withdraw(_) => TxType::Withdraw,
            Self::Transfer(_) => TxType::Transfer,
            Self::FullExit(_) => TxType::FullExit,
            Self::ChangePubKey(_) => TxType::ChangePubKey,
            Self::ForcedExit(_) => TxType::ForcedExit,
            Self::OrderMatching(_) => TxType::OrderMatching,
            Self::ContractMatching(_) => TxType::ContractMatching,
            Self::Liquidation(_) => TxType::Liquidation,
            Self::AutoDeleveraging(_) => TxType::AutoDeleveraging,
            Self::UpdateGlobalVar(_) => TxType::UpdateGlobalVar,
            Self::Funding(_) => TxType::Funding,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for_each_variant!(self, tx => tx.validate())
    }

    /// The L2 authorization signature. Always `None` for priority operations.
    pub fn signature(&self) -> Option<&L2Signature> {
        match self {
            Self::Deposit(_) | Self::FullExit(_) => None,
            Self::Withdraw(tx) => tx.signature.as_ref(),
            Self::Transfer(tx) => tx.signature.as_ref(),
            Self::ChangePubKey(tx) => tx.signature.as_ref(),
            Self::ForcedExit(tx) => tx.signature.as_ref(),
            Self::OrderMatching(tx) => tx.signature.as_ref(),
            Self::ContractMatching(tx) => tx.signature.as_ref(),
            Self::Liquidation(tx) => tx.signature.as_ref(),
            Self::AutoDeleveraging(tx) => tx.signature.as_ref(),
            Self::UpdateGlobalVar(tx) => tx.signature.as_ref(),
            Self::Funding(tx) => tx.signature.as_ref(),
        }
    }

    /// Attach the L2 signature. Returns `false`, leaving the value alone,
    /// for variants that cannot carry one.
    pub(crate) fn set_signature(&mut self, signature: L2Signature) -> bool {
        let slot = match self {
            Self::Deposit(_) | Self::FullExit(_) => return false,
            Self::Withdraw(tx) => &mut tx.signature,
            Self::Transfer(tx) => &mut tx.signature,
            Self::ChangePubKey(tx) => &mut tx.signature,
            Self::ForcedExit(tx) => &mut tx.signature,
            Self::OrderMatching(tx) => &mut tx.signature,
            Self::ContractMatching(tx) => &mut tx.signature,
            Self::Liquidation(tx) => &mut tx.signature,
            Self::AutoDeleveraging(tx) => &mut tx.signature,
            Self::UpdateGlobalVar(tx) => &mut tx.signature,
            Self::Funding(tx) => &mut tx.signature,
        };
        *slot = Some(signature);
        true
    }

    pub fn as_change_pubkey(&self) -> Option<&ChangePubKey> {
        match self {
            Self::ChangePubKey(tx) => Some(tx),
            _ => None,
        }
    }
}

impl Encode for RollupTx {
    fn encode(&self) -> Result<Vec<u8>> {
        for_each_variant!(self, tx => tx.encode())
    }
}

macro_rules! impl_from_variant {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for RollupTx {
                fn from(tx: $variant) -> Self {
                    Self::$variant(tx)
                }
            }
        )*
    };
}

impl_from_variant!(
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
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Address;
    use crate::signer::L2Signer;
    use crate::transaction::types::{AccountId, Nonce, SubAccountId, TimeStamp, TokenId};
    use num_bigint::BigUint;

    fn transfer() -> Transfer {
        Transfer {
            account_id: AccountId(10),
            from_sub_account_id: SubAccountId(1),
            to: Address::from_bytes([0x42; 20]),
            to_sub_account_id: SubAccountId(1),
            token: TokenId(18),
            amount: BigUint::from(10_000u32),
            fee: BigUint::from(3u32),
            nonce: Nonce(1),
            ts: TimeStamp(1_693_472_232),
            signature: None,
        }
    }

    #[test]
    fn enum_encodes_like_the_variant() {
        let inner = transfer();
        let tx = RollupTx::from(inner.clone());
        assert_eq!(tx.encode().unwrap(), inner.encode().unwrap());
        assert_eq!(tx.tx_hash().unwrap(), inner.tx_hash().unwrap());
        assert_eq!(tx.tx_type(), TxType::Transfer);
        assert_eq!(tx.encode().unwrap()[0], tx.tx_type().tag());
    }

    #[test]
    fn set_signature_leaves_bytes_alone() {
        let mut tx = RollupTx::from(transfer());
        let before = tx.encode().unwrap();
        let sig = L2Signer::random().sign_authorization(b"m");
        assert!(tx.set_signature(sig));
        assert_eq!(tx.signature(), Some(&sig));
        assert_eq!(tx.encode().unwrap(), before);
    }

    #[test]
    fn json_is_tagged_by_type() {
        let tx = RollupTx::from(transfer());
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["type"], "Transfer");
        assert_eq!(json["accountId"], 10);
        let back: RollupTx = serde_json::from_value(json).unwrap();
        assert_eq!(back, tx);
    }
}
