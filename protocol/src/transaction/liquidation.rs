//! Operator-side risk transactions: liquidation and auto-deleveraging.
//!
//! Both are signed by the operator's own account and priced against an
//! oracle snapshot carried in the transaction.

use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

use super::encoding::{ByteWriter, Encode};
use super::prices::OraclePrices;
use super::types::{biguint_str, AccountId, Nonce, PairId, SubAccountId, TokenId};
use super::validation;
use crate::config::{AUTO_DELEVERAGING_TX_TYPE, LIQUIDATION_TX_TYPE};
use crate::crypto::L2Signature;
use crate::error::{ProtocolError, Result};

/// Closes every position of an under-margined sub-account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Liquidation {
    pub account_id: AccountId,
    pub sub_account_id: SubAccountId,
    pub sub_account_nonce: Nonce,
    pub oracle_prices: OraclePrices,
    pub liquidation_account_id: AccountId,
    pub fee_token: TokenId,
    #[serde(with = "biguint_str")]
    pub fee: BigUint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<L2Signature>,
}

impl Liquidation {
    pub fn validate(&self) -> Result<()> {
        validation::account_id("account_id", self.account_id)?;
        validation::sub_account_id("sub_account_id", self.sub_account_id)?;
        validation::nonce("sub_account_nonce", self.sub_account_nonce)?;
        self.oracle_prices.validate()?;
        validation::account_id("liquidation_account_id", self.liquidation_account_id)?;
        validation::token_id("fee_token", self.fee_token)?;
        validation::packable_fee("fee", &self.fee)
    }
}

impl Encode for Liquidation {
    fn encode(&self) -> Result<Vec<u8>> {
        let mut w = ByteWriter::with_tag(LIQUIDATION_TX_TYPE, 128);
        w.account(self.account_id)
            .sub_account(self.sub_account_id)
            .nonce(self.sub_account_nonce);
        self.oracle_prices.write(&mut w);
        w.account(self.liquidation_account_id)
            .token(self.fee_token)
            .packed_fee(&self.fee)
            .finish()
    }
}

/// Force-closes `adl_size` of an account's position on `pair_id` at
/// `adl_price` when the insurance fund cannot cover a bankruptcy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoDeleveraging {
    pub account_id: AccountId,
    pub sub_account_id: SubAccountId,
    pub sub_account_nonce: Nonce,
    pub oracle_prices: OraclePrices,
    pub adl_account_id: AccountId,
    pub pair_id: PairId,
    #[serde(with = "biguint_str")]
    pub adl_size: BigUint,
    #[serde(with = "biguint_str")]
    pub adl_price: BigUint,
    pub fee_token: TokenId,
    #[serde(with = "biguint_str")]
    pub fee: BigUint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<L2Signature>,
}

impl AutoDeleveraging {
    pub fn validate(&self) -> Result<()> {
        validation::account_id("account_id", self.account_id)?;
        validation::sub_account_id("sub_account_id", self.sub_account_id)?;
        validation::nonce("sub_account_nonce", self.sub_account_nonce)?;
        self.oracle_prices.validate()?;
        validation::account_id("adl_account_id", self.adl_account_id)?;
        validation::pair_id("pair_id", self.pair_id)?;
        if self.adl_size.is_zero() {
            return Err(ProtocolError::range("adl_size", "must be positive"));
        }
        validation::packable_amount("adl_size", &self.adl_size)?;
        validation::price("adl_price", &self.adl_price)?;
        validation::token_id("fee_token", self.fee_token)?;
        validation::packable_fee("fee", &self.fee)
    }
}

impl Encode for AutoDeleveraging {
    fn encode(&self) -> Result<Vec<u8>> {
        let mut w = ByteWriter::with_tag(AUTO_DELEVERAGING_TX_TYPE, 160);
        w.account(self.account_id)
            .sub_account(self.sub_account_id)
            .nonce(self.sub_account_nonce);
        self.oracle_prices.write(&mut w);
        w.account(self.adl_account_id)
            .pair(self.pair_id)
            .packed_amount(&self.adl_size)
            .price(&self.adl_price)
            .token(self.fee_token)
            .packed_fee(&self.fee)
            .finish()
    }
}
