//! Periodic funding settlement for a batch of accounts.

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use super::encoding::{ByteWriter, Encode};
use super::types::{biguint_str, AccountId, Nonce, PairId, SubAccountId, TokenId};
use super::validation;
use crate::config::{FUNDING_TX_TYPE, MAX_FUNDING_ACCOUNTS};
use crate::crypto::L2Signature;
use crate::error::{ProtocolError, Result};

/// Funding rate and mark price of one pair, published through
/// `UpdateGlobalVar` before a `Funding` settles against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundingInfo {
    pub pair_id: PairId,
    #[serde(with = "biguint_str")]
    pub price: BigUint,
    /// Signed, in hundred-thousandths.
    pub funding_rate: i16,
}

impl FundingInfo {
    pub fn new(pair_id: PairId, price: impl Into<BigUint>, funding_rate: i16) -> Self {
        Self {
            pair_id,
            price: price.into(),
            funding_rate,
        }
    }

    pub fn validate(&self) -> Result<()> {
        validation::pair_id("pair_id", self.pair_id)?;
        validation::oracle_price("price", &self.price)?;
        validation::funding_rate(self.funding_rate)
    }

    /// `pair:1 | price:15 | rate:2`, the rate as sign bit plus magnitude.
    pub(crate) fn write(&self, w: &mut ByteWriter) {
        let magnitude = self.funding_rate.unsigned_abs();
        let sign = if self.funding_rate < 0 { 0x8000 } else { 0 };
        w.pair(self.pair_id).price(&self.price).u16(sign | magnitude);
    }
}

/// Settles accrued funding for `funding_account_ids`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Funding {
    pub account_id: AccountId,
    pub sub_account_id: SubAccountId,
    pub sub_account_nonce: Nonce,
    pub funding_account_ids: Vec<AccountId>,
    pub fee_token: TokenId,
    #[serde(with = "biguint_str")]
    pub fee: BigUint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<L2Signature>,
}

impl Funding {
    pub fn validate(&self) -> Result<()> {
        validation::account_id("account_id", self.account_id)?;
        validation::sub_account_id("sub_account_id", self.sub_account_id)?;
        validation::nonce("sub_account_nonce", self.sub_account_nonce)?;
        if self.funding_account_ids.len() > MAX_FUNDING_ACCOUNTS {
            return Err(ProtocolError::range(
                "funding_account_ids",
                format!(
                    "expected at most {}, got {}",
                    MAX_FUNDING_ACCOUNTS,
                    self.funding_account_ids.len()
                ),
            ));
        }
        for id in &self.funding_account_ids {
            validation::account_id("funding_account_ids", *id)?;
        }
        validation::token_id("fee_token", self.fee_token)?;
        validation::packable_fee("fee", &self.fee)
    }
}

impl Encode for Funding {
    fn encode(&self) -> Result<Vec<u8>> {
        let mut w = ByteWriter::with_tag(FUNDING_TX_TYPE, 16 + 4 * self.funding_account_ids.len());
        // The account list is the one list with a two-byte count.
        w.account(self.account_id)
            .sub_account(self.sub_account_id)
            .nonce(self.sub_account_nonce)
            .count16(self.funding_account_ids.len());
        for id in &self.funding_account_ids {
            w.account(*id);
        }
        w.token(self.fee_token).packed_fee(&self.fee).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rates_are_sign_magnitude() {
        let mut w = ByteWriter::default();
        FundingInfo::new(PairId(2), 0u32, -1).write(&mut w);
        FundingInfo::new(PairId(2), 0u32, i16::MAX).write(&mut w);
        FundingInfo::new(PairId(2), 0u32, -i16::MAX).write(&mut w);
        let out = w.finish().unwrap();
        assert_eq!(&out[16..18], &[128, 1]);
        assert_eq!(&out[34..36], &[127, 255]);
        assert_eq!(&out[52..54], &[255, 255]);
    }

    #[test]
    fn funding_layout() {
        let tx = Funding {
            account_id: AccountId(3),
            sub_account_id: SubAccountId(2),
            sub_account_nonce: Nonce(1),
            funding_account_ids: vec![AccountId(10), AccountId(11)],
            fee_token: TokenId(17),
            fee: BigUint::from(100u32),
            signature: None,
        };
        let bytes = tx.encode().unwrap();
        assert_eq!(
            bytes,
            vec![
                13, 0, 0, 0, 3, 2, 0, 0, 0, 1, 0, 2, 0, 0, 0, 10, 0, 0, 0, 11, 0, 17, 12, 128
            ]
        );
        assert!(tx.validate().is_ok());
    }

    #[test]
    fn funding_info_rejects_min_rate() {
        assert!(FundingInfo::new(PairId(0), 1u32, i16::MIN).validate().is_err());
        assert!(FundingInfo::new(PairId(32), 1u32, 0).validate().is_err());
    }
}
