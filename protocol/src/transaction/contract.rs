//! Perpetual-contract orders and their matching transaction.

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use super::encoding::{ByteWriter, Encode};
use super::order::verify_leg;
use super::prices::OraclePrices;
use super::types::{biguint_str, AccountId, Nonce, PairId, SlotId, SubAccountId, TokenId};
use super::validation;
use crate::config::{CONTRACT_MATCHING_TX_TYPE, CONTRACT_MSG_TYPE, MAX_CONTRACT_MAKERS};
use crate::crypto::L2Signature;
use crate::error::{ProtocolError, Result};
use crate::signer::L2Signer;

/// An order to open or extend a position of `size` on `pair_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    pub account_id: AccountId,
    pub sub_account_id: SubAccountId,
    pub slot_id: SlotId,
    pub nonce: Nonce,
    pub pair_id: PairId,
    /// 1 goes long, 0 goes short.
    pub direction: u8,
    #[serde(with = "biguint_str")]
    pub size: BigUint,
    #[serde(with = "biguint_str")]
    pub price: BigUint,
    /// `[maker, taker]`.
    pub fee_rates: [u8; 2],
    pub has_subsidy: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<L2Signature>,
}

impl Contract {
    pub const ENCODED_LEN: usize = 36;

    pub fn validate(&self) -> Result<()> {
        validation::account_id("account_id", self.account_id)?;
        validation::sub_account_id("sub_account_id", self.sub_account_id)?;
        validation::slot_id("slot_id", self.slot_id)?;
        validation::order_nonce("nonce", self.nonce)?;
        validation::pair_id("pair_id", self.pair_id)?;
        validation::boolean("direction", self.direction)?;
        validation::packable_amount("size", &self.size)?;
        validation::price("price", &self.price)?;
        validation::boolean("has_subsidy", self.has_subsidy)
    }

    pub fn is_long(&self) -> bool {
        self.direction == 1
    }

    pub fn sign(&self, signer: &L2Signer) -> Result<Contract> {
        self.validate()?;
        let mut signed = self.clone();
        signed.signature = Some(signer.sign_authorization(self.tx_hash()?.as_bytes()));
        Ok(signed)
    }

    pub fn verify_signature(&self) -> Result<()> {
        self.validate()?;
        verify_leg("contract", &self.tx_hash()?, self.signature.as_ref())
    }
}

impl Encode for Contract {
    fn encode(&self) -> Result<Vec<u8>> {
        ByteWriter::with_tag(CONTRACT_MSG_TYPE, Self::ENCODED_LEN)
            .account(self.account_id)
            .sub_account(self.sub_account_id)
            .slot(self.slot_id)
            .order_nonce(self.nonce)
            .pair(self.pair_id)
            .u8(self.direction)
            .packed_amount(&self.size)
            .price(&self.price)
            .bytes(&self.fee_rates)
            .u8(self.has_subsidy)
            .finish()
    }
}

/// One taker filled against one or more makers on the same pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractMatching {
    pub account_id: AccountId,
    pub sub_account_id: SubAccountId,
    pub taker: Contract,
    pub maker: Vec<Contract>,
    pub oracle_prices: OraclePrices,
    pub fee_token: TokenId,
    #[serde(with = "biguint_str")]
    pub fee: BigUint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<L2Signature>,
}

impl ContractMatching {
    pub fn validate(&self) -> Result<()> {
        validation::account_id("account_id", self.account_id)?;
        validation::sub_account_id("sub_account_id", self.sub_account_id)?;
        if self.maker.is_empty() || self.maker.len() > MAX_CONTRACT_MAKERS {
            return Err(ProtocolError::range(
                "maker",
                format!(
                    "expected 1 to {} makers, got {}",
                    MAX_CONTRACT_MAKERS,
                    self.maker.len()
                ),
            ));
        }
        self.taker.validate()?;
        for maker in &self.maker {
            maker.validate()?;
        }
        self.oracle_prices.validate()?;
        validation::token_id("fee_token", self.fee_token)?;
        validation::packable_fee("fee", &self.fee)?;
        self.check_legs()
    }

    /// Every maker is signed, trades the taker's pair, and takes the other side.
    pub fn check_legs(&self) -> Result<()> {
        self.taker.verify_signature()?;
        for maker in &self.maker {
            maker.verify_signature()?;
            if maker.direction == self.taker.direction {
                return Err(ProtocolError::invalid(
                    "maker",
                    format!(
                        "maker account {} is on the taker's side",
                        maker.account_id
                    ),
                ));
            }
            if maker.pair_id != self.taker.pair_id {
                return Err(ProtocolError::invalid(
                    "maker",
                    format!(
                        "maker trades pair {} but taker trades pair {}",
                        maker.pair_id, self.taker.pair_id
                    ),
                ));
            }
        }
        Ok(())
    }
}

impl Encode for ContractMatching {
    fn encode(&self) -> Result<Vec<u8>> {
        let capacity = 8 + Contract::ENCODED_LEN * (1 + self.maker.len()) + 64;
        let mut w = ByteWriter::with_tag(CONTRACT_MATCHING_TX_TYPE, capacity);
        w.account(self.account_id)
            .sub_account(self.sub_account_id)
            .bytes(&self.taker.encode()?)
            .count(self.maker.len());
        for maker in &self.maker {
            w.bytes(&maker.encode()?);
        }
        self.oracle_prices.write(&mut w);
        w.token(self.fee_token).packed_fee(&self.fee).finish()
    }
}
