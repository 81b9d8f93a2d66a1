//! Withdrawal from layer 2 to a base-chain address.

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use super::encoding::{ByteWriter, Encode};
use super::types::{biguint_str, AccountId, ChainId, Nonce, SubAccountId, TimeStamp, TokenId};
use super::validation;
use crate::config::WITHDRAW_TX_TYPE;
use crate::crypto::L2Signature;
use crate::error::Result;
use crate::identity::Address;

/// The amount is unpacked because the base-chain contract pays it out
/// exactly; only the fee is packed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Withdraw {
    pub to_chain_id: ChainId,
    pub account_id: AccountId,
    pub sub_account_id: SubAccountId,
    pub to_address: Address,
    pub l2_source_token: TokenId,
    pub l1_target_token: TokenId,
    #[serde(with = "biguint_str")]
    pub amount: BigUint,
    #[serde(with = "biguint_str")]
    pub fee: BigUint,
    pub nonce: Nonce,
    /// 1 when the funds should be pushed to L1 immediately.
    pub withdraw_to_l1: u8,
    /// Fee taken by a fast-withdraw provider, in basis points.
    pub withdraw_fee_ratio: u16,
    pub ts: TimeStamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<L2Signature>,
}

impl Withdraw {
    pub const ENCODED_LEN: usize = 72;

    pub fn validate(&self) -> Result<()> {
        validation::chain_id("to_chain_id", self.to_chain_id)?;
        validation::account_id("account_id", self.account_id)?;
        validation::sub_account_id("sub_account_id", self.sub_account_id)?;
        validation::target_address("to_address", &self.to_address)?;
        validation::token_id("l2_source_token", self.l2_source_token)?;
        validation::token_id("l1_target_token", self.l1_target_token)?;
        validation::full_amount("amount", &self.amount)?;
        validation::packable_fee("fee", &self.fee)?;
        validation::nonce("nonce", self.nonce)?;
        validation::boolean("withdraw_to_l1", self.withdraw_to_l1)?;
        validation::withdraw_fee_ratio(self.withdraw_fee_ratio)
    }
}

impl Encode for Withdraw {
    fn encode(&self) -> Result<Vec<u8>> {
        ByteWriter::with_tag(WITHDRAW_TX_TYPE, Self::ENCODED_LEN)
            .chain(self.to_chain_id)
            .account(self.account_id)
            .sub_account(self.sub_account_id)
            .address(&self.to_address)
            .token(self.l2_source_token)
            .token(self.l1_target_token)
            .full_amount(&self.amount)
            .packed_fee(&self.fee)
            .nonce(self.nonce)
            .u8(self.withdraw_to_l1)
            .u16(self.withdraw_fee_ratio)
            .timestamp(self.ts)
            .finish()
    }
}
