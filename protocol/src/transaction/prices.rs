//! Oracle prices carried by the composite transactions.

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use super::encoding::ByteWriter;
use super::types::{biguint_str, PairId, TokenId};
use super::validation;
use crate::config::{MARGIN_TOKENS_NUMBER, USED_POSITION_NUMBER};
use crate::error::{ProtocolError, Result};

/// Mark price of one perpetual pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractPrice {
    pub pair_id: PairId,
    #[serde(with = "biguint_str")]
    pub market_price: BigUint,
}

/// Spot price of one margin token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotPriceInfo {
    pub token_id: TokenId,
    #[serde(with = "biguint_str")]
    pub price: BigUint,
}

/// The price snapshot a matching, liquidation, or ADL is executed against.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OraclePrices {
    pub contract_prices: Vec<ContractPrice>,
    pub margin_prices: Vec<SpotPriceInfo>,
}

impl ContractPrice {
    pub fn new(pair_id: PairId, market_price: impl Into<BigUint>) -> Self {
        Self {
            pair_id,
            market_price: market_price.into(),
        }
    }
}

impl SpotPriceInfo {
    pub fn new(token_id: TokenId, price: impl Into<BigUint>) -> Self {
        Self {
            token_id,
            price: price.into(),
        }
    }
}

impl OraclePrices {
    /// A snapshot is complete: one contract price per pair, listed so that
    /// entry `i` prices pair `i`, and one spot price per margin slot.
    pub fn validate(&self) -> Result<()> {
        if self.contract_prices.len() != USED_POSITION_NUMBER {
            return Err(ProtocolError::range(
                "contract_prices",
                format!(
                    "expected {}, got {}",
                    USED_POSITION_NUMBER,
                    self.contract_prices.len()
                ),
            ));
        }
        for (i, entry) in self.contract_prices.iter().enumerate() {
            validation::pair_id("contract_prices.pair_id", entry.pair_id)?;
            validation::oracle_price("contract_prices.market_price", &entry.market_price)?;
            if usize::from(*entry.pair_id) != i {
                return Err(ProtocolError::invalid(
                    "contract_prices",
                    format!("entry {} prices pair {}", i, entry.pair_id),
                ));
            }
        }

        if self.margin_prices.len() != MARGIN_TOKENS_NUMBER {
            return Err(ProtocolError::range(
                "margin_prices",
                format!(
                    "expected {}, got {}",
                    MARGIN_TOKENS_NUMBER,
                    self.margin_prices.len()
                ),
            ));
        }
        for entry in &self.margin_prices {
            validation::token_id("margin_prices.token_id", entry.token_id)?;
            validation::oracle_price("margin_prices.price", &entry.price)?;
        }
        Ok(())
    }

    pub(crate) fn write(&self, w: &mut ByteWriter) {
        w.count(self.contract_prices.len());
        for entry in &self.contract_prices {
            w.pair(entry.pair_id).price(&entry.market_price);
        }
        w.count(self.margin_prices.len());
        for entry in &self.margin_prices {
            w.token(entry.token_id).price(&entry.price);
        }
    }
}

/// A complete snapshot for unit tests: pair `i` at `100 + i`, margin
/// tokens 17 to 24 at 1.
#[cfg(test)]
pub(crate) fn snapshot() -> OraclePrices {
    OraclePrices {
        contract_prices: (0..USED_POSITION_NUMBER as u16)
            .map(|i| ContractPrice::new(PairId(i), 100u32 + u32::from(i)))
            .collect(),
        margin_prices: (0..MARGIN_TOKENS_NUMBER as u32)
            .map(|i| SpotPriceInfo::new(TokenId(17 + i), 1u32))
            .collect(),
    }
}

/// Encoded size of a complete snapshot.
#[cfg(test)]
pub(crate) const SNAPSHOT_ENCODED_LEN: usize =
    1 + USED_POSITION_NUMBER * (1 + 15) + 1 + MARGIN_TOKENS_NUMBER * (2 + 15);
