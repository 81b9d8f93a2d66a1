//! Forced exit of an account that cannot sign for itself.
//!
//! The initiator pays and signs; the funds go to the target's own base-chain
//! address, never to the initiator. Meant for accounts whose L1 owner is a
//! contract with no way to register a layer-2 key.

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use super::encoding::{ByteWriter, Encode};
use super::types::{biguint_str, AccountId, ChainId, Nonce, SubAccountId, TimeStamp, TokenId};
use super::validation;
use crate::config::FORCED_EXIT_TX_TYPE;
use crate::crypto::L2Signature;
use crate::error::Result;
use crate::identity::Address;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForcedExit {
    pub to_chain_id: ChainId,
    pub initiator_account_id: AccountId,
    pub initiator_sub_account_id: SubAccountId,
    pub target: Address,
    pub target_sub_account_id: SubAccountId,
    pub l2_source_token: TokenId,
    pub l1_target_token: TokenId,
    pub initiator_nonce: Nonce,
    #[serde(with = "biguint_str")]
    pub exit_amount: BigUint,
    pub withdraw_to_l1: u8,
    pub ts: TimeStamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<L2Signature>,
}

impl ForcedExit {
    pub const ENCODED_LEN: usize = 69;

    pub fn validate(&self) -> Result<()> {
        validation::chain_id("to_chain_id", self.to_chain_id)?;
        validation::account_id("initiator_account_id", self.initiator_account_id)?;
        validation::sub_account_id("initiator_sub_account_id", self.initiator_sub_account_id)?;
        validation::target_address("target", &self.target)?;
        validation::sub_account_id("target_sub_account_id", self.target_sub_account_id)?;
        validation::token_id("l2_source_token", self.l2_source_token)?;
        validation::token_id("l1_target_token", self.l1_target_token)?;
        validation::nonce("initiator_nonce", self.initiator_nonce)?;
        validation::full_amount("exit_amount", &self.exit_amount)?;
        validation::boolean("withdraw_to_l1", self.withdraw_to_l1)
    }
}

impl Encode for ForcedExit {
    fn encode(&self) -> Result<Vec<u8>> {
        ByteWriter::with_tag(FORCED_EXIT_TX_TYPE, Self::ENCODED_LEN)
            .chain(self.to_chain_id)
            .account(self.initiator_account_id)
            .sub_account(self.initiator_sub_account_id)
            .address(&self.target)
            .sub_account(self.target_sub_account_id)
            .token(self.l2_source_token)
            .token(self.l1_target_token)
            .nonce(self.initiator_nonce)
            .full_amount(&self.exit_amount)
            .u8(self.withdraw_to_l1)
            .timestamp(self.ts)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ForcedExit {
        ForcedExit {
            to_chain_id: ChainId(1),
            initiator_account_id: AccountId(10),
            initiator_sub_account_id: SubAccountId(0),
            target: Address::from_bytes([0x33; 20]),
            target_sub_account_id: SubAccountId(2),
            l2_source_token: TokenId(18),
            l1_target_token: TokenId(18),
            initiator_nonce: Nonce(5),
            exit_amount: BigUint::from(1_000_000u32),
            withdraw_to_l1: 1,
            ts: TimeStamp(1_693_472_232),
            signature: None,
        }
    }

    #[test]
    fn layout() {
        let bytes = sample().encode().unwrap();
        assert_eq!(bytes.len(), ForcedExit::ENCODED_LEN);
        assert_eq!(bytes[0], FORCED_EXIT_TX_TYPE);
        assert_eq!(bytes[1], 1);
        assert_eq!(&bytes[2..6], &[0, 0, 0, 10]);
        assert_eq!(&bytes[19..39], &[0x33; 20]);
        assert_eq!(bytes[39], 2);
        assert_eq!(&bytes[44..48], &[0, 0, 0, 5]);
        assert_eq!(&bytes[60..64], &1_000_000u32.to_be_bytes());
        assert_eq!(bytes[64], 1);
    }

    #[test]
    fn target_must_be_real() {
        let mut tx = sample();
        tx.target = Address::ZERO;
        assert!(tx.validate().is_err());
        assert!(sample().validate().is_ok());
    }
}
