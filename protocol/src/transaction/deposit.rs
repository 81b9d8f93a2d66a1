//! L1 priority operations: deposits and full exits.
//!
//! Both are initiated by a base-chain transaction and executed by the
//! operator in the order the main contract queued them. They carry no
//! layer-2 signature, so they never enter the signing pipeline. They are
//! still encoded so a client can hash and look them up.

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use super::encoding::{ByteWriter, Encode};
use super::types::{
    biguint_str, hex_bytes32, AccountId, ChainId, SerialId, SubAccountId, TokenId,
};
use super::validation;
use crate::config::{DEPOSIT_TX_TYPE, FULL_EXIT_TX_TYPE};
use crate::error::Result;
use crate::identity::Address;

/// Funds bridged in from a base chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deposit {
    pub from_chain_id: ChainId,
    pub account_id: AccountId,
    pub sub_account_id: SubAccountId,
    pub l1_source_token: TokenId,
    pub l2_target_token: TokenId,
    #[serde(with = "biguint_str")]
    pub amount: BigUint,
    pub owner: Address,
    /// Position of the operation in the main contract's priority queue.
    pub serial_id: SerialId,
    /// Hash of the base-chain transaction that queued the deposit.
    #[serde(with = "hex_bytes32")]
    pub l1_hash: [u8; 32],
}

/// A request, made on L1, to withdraw everything an account holds in one
/// token. The escape hatch when the operator ignores layer-2 withdrawals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullExit {
    pub to_chain_id: ChainId,
    pub account_id: AccountId,
    pub sub_account_id: SubAccountId,
    pub exit_address: Address,
    pub l2_source_token: TokenId,
    pub l1_target_token: TokenId,
    pub serial_id: SerialId,
    #[serde(with = "hex_bytes32")]
    pub l1_hash: [u8; 32],
}

impl Deposit {
    pub const ENCODED_LEN: usize = 99;

    pub fn validate(&self) -> Result<()> {
        validation::chain_id("from_chain_id", self.from_chain_id)?;
        validation::account_id("account_id", self.account_id)?;
        validation::sub_account_id("sub_account_id", self.sub_account_id)?;
        validation::token_id("l1_source_token", self.l1_source_token)?;
        validation::token_id("l2_target_token", self.l2_target_token)?;
        validation::full_amount("amount", &self.amount)?;
        validation::target_address("owner", &self.owner)
    }
}

impl Encode for Deposit {
    fn encode(&self) -> Result<Vec<u8>> {
        ByteWriter::with_tag(DEPOSIT_TX_TYPE, Self::ENCODED_LEN)
            .chain(self.from_chain_id)
            .account(self.account_id)
            .sub_account(self.sub_account_id)
            .token(self.l1_source_token)
            .token(self.l2_target_token)
            .full_amount(&self.amount)
            .address(&self.owner)
            .serial_id(self.serial_id)
            .bytes(&self.l1_hash)
            .finish()
    }
}

impl FullExit {
    pub const ENCODED_LEN: usize = 83;

    pub fn validate(&self) -> Result<()> {
        validation::chain_id("to_chain_id", self.to_chain_id)?;
        validation::account_id("account_id", self.account_id)?;
        validation::sub_account_id("sub_account_id", self.sub_account_id)?;
        validation::target_address("exit_address", &self.exit_address)?;
        validation::token_id("l2_source_token", self.l2_source_token)?;
        validation::token_id("l1_target_token", self.l1_target_token)
    }
}

impl Encode for FullExit {
    fn encode(&self) -> Result<Vec<u8>> {
        ByteWriter::with_tag(FULL_EXIT_TX_TYPE, Self::ENCODED_LEN)
            .chain(self.to_chain_id)
            .account(self.account_id)
            .sub_account(self.sub_account_id)
            .address(&self.exit_address)
            .token(self.l2_source_token)
            .token(self.l1_target_token)
            .serial_id(self.serial_id)
            .bytes(&self.l1_hash)
            .finish()
    }
}
