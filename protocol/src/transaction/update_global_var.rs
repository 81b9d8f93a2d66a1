//! Governance updates to rollup-wide parameters.
//!
//! These are queued on an L1 chain, like deposits, and carry that chain's
//! serial id. They still pass through the L2 lifecycle because the operator
//! signs the transaction that applies them.

use serde::{Deserialize, Serialize};

use super::encoding::{ByteWriter, Encode};
use super::funding::FundingInfo;
use super::types::{AccountId, ChainId, MarginId, PairId, SerialId, SubAccountId, TokenId};
use super::validation;
use crate::config::{PAIR_SYMBOL_BYTES, UPDATE_GLOBAL_VAR_TX_TYPE, USED_POSITION_NUMBER};
use crate::crypto::L2Signature;
use crate::error::{ProtocolError, Result};

/// The parameter being changed, with its new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Parameter {
    #[serde(rename_all = "camelCase")]
    FeeAccount { account_id: AccountId },
    #[serde(rename_all = "camelCase")]
    InsuranceFundAccount { account_id: AccountId },
    #[serde(rename_all = "camelCase")]
    MarginInfo {
        margin_id: MarginId,
        token_id: TokenId,
        /// Percentage of the token's value that counts as margin.
        ratio: u8,
    },
    #[serde(rename_all = "camelCase")]
    ContractInfo {
        pair_id: PairId,
        symbol: String,
        initial_margin_rate: u16,
        maintenance_margin_rate: u16,
    },
    #[serde(rename_all = "camelCase")]
    FundingInfos { infos: Vec<FundingInfo> },
}

impl Parameter {
    pub const FEE_ACCOUNT_PARAM_TYPE: u8 = 0;
    pub const INSURANCE_FUND_PARAM_TYPE: u8 = 1;
    pub const MARGIN_INFO_PARAM_TYPE: u8 = 2;
    pub const CONTRACT_INFO_PARAM_TYPE: u8 = 3;
    pub const FUNDING_INFOS_PARAM_TYPE: u8 = 4;

    pub fn parameter_type(&self) -> u8 {
        match self {
            Self::FeeAccount { .. } => Self::FEE_ACCOUNT_PARAM_TYPE,
            Self::InsuranceFundAccount { .. } => Self::INSURANCE_FUND_PARAM_TYPE,
            Self::MarginInfo { .. } => Self::MARGIN_INFO_PARAM_TYPE,
            Self::ContractInfo { .. } => Self::CONTRACT_INFO_PARAM_TYPE,
            Self::FundingInfos { .. } => Self::FUNDING_INFOS_PARAM_TYPE,
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            Self::FeeAccount { account_id } | Self::InsuranceFundAccount { account_id } => {
                validation::account_id("account_id", *account_id)
            }
            Self::MarginInfo {
                margin_id,
                token_id,
                ratio,
            } => {
                validation::margin_id("margin_id", *margin_id)?;
                validation::token_id("token_id", *token_id)?;
                validation::margin_ratio(*ratio)
            }
            Self::ContractInfo {
                pair_id,
                symbol,
                initial_margin_rate,
                maintenance_margin_rate,
            } => {
                validation::pair_id("pair_id", *pair_id)?;
                validation::pair_symbol(symbol)?;
                validation::margin_rate("initial_margin_rate", *initial_margin_rate)?;
                validation::margin_rate("maintenance_margin_rate", *maintenance_margin_rate)
            }
            // One entry per pair, every time.
            Self::FundingInfos { infos } => {
                if infos.len() != USED_POSITION_NUMBER {
                    return Err(ProtocolError::range(
                        "infos",
                        format!(
                            "expected {} entries, got {}",
                            USED_POSITION_NUMBER,
                            infos.len()
                        ),
                    ));
                }
                infos.iter().try_for_each(FundingInfo::validate)
            }
        }
    }

    fn write(&self, w: &mut ByteWriter) {
        w.u8(self.parameter_type());
        match self {
            Self::FeeAccount { account_id } | Self::InsuranceFundAccount { account_id } => {
                w.account(*account_id);
            }
            Self::MarginInfo {
                margin_id,
                token_id,
                ratio,
            } => {
                w.margin(*margin_id).token(*token_id).u8(*ratio);
            }
            Self::ContractInfo {
                pair_id,
                symbol,
                initial_margin_rate,
                maintenance_margin_rate,
            } => {
                let mut padded = [0u8; PAIR_SYMBOL_BYTES];
                let raw = symbol.as_bytes();
                let len = raw.len().min(PAIR_SYMBOL_BYTES);
                padded[..len].copy_from_slice(&raw[..len]);
                w.pair(*pair_id)
                    .bytes(&padded)
                    .u16(*initial_margin_rate)
                    .u16(*maintenance_margin_rate);
            }
            // No count: the entries run up to the serial id.
            Self::FundingInfos { infos } => {
                for info in infos {
                    info.write(w);
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGlobalVar {
    pub from_chain_id: ChainId,
    pub sub_account_id: SubAccountId,
    pub parameter: Parameter,
    pub serial_id: SerialId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<L2Signature>,
}

impl UpdateGlobalVar {
    pub fn validate(&self) -> Result<()> {
        validation::chain_id("from_chain_id", self.from_chain_id)?;
        validation::sub_account_id("sub_account_id", self.sub_account_id)?;
        self.parameter.validate()
    }
}

impl Encode for UpdateGlobalVar {
    fn encode(&self) -> Result<Vec<u8>> {
        let mut w = ByteWriter::with_tag(UPDATE_GLOBAL_VAR_TX_TYPE, 96);
        w.chain(self.from_chain_id).sub_account(self.sub_account_id);
        self.parameter.write(&mut w);
        w.serial_id(self.serial_id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(parameter: Parameter) -> UpdateGlobalVar {
        UpdateGlobalVar {
            from_chain_id: ChainId(1),
            sub_account_id: SubAccountId(1),
            parameter,
            serial_id: SerialId(0),
            signature: None,
        }
    }

    #[test]
    fn reference_vectors() {
        let cases = vec![
            (
                Parameter::FundingInfos {
                    infos: vec![
                        FundingInfo::new(PairId(0), 1_000_000_000_000_000_000u128, i16::MAX),
                        FundingInfo::new(PairId(1), 1_000_000_000_000_000u128, 0),
                        FundingInfo::new(PairId(2), 1_000_000_000_000u128, -1),
                        FundingInfo::new(PairId(3), 1_000_000_000u128, 1),
                    ],
                },
                vec![
                    12, 1, 1, 4, 0, 0, 0, 0, 0, 0, 0, 0, 13, 224, 182, 179, 167, 100, 0, 0, 127,
                    255, 1, 0, 0, 0, 0, 0, 0, 0, 0, 3, 141, 126, 164, 198, 128, 0, 0, 0, 2, 0, 0,
                    0, 0, 0, 0, 0, 0, 0, 0, 232, 212, 165, 16, 0, 128, 1, 3, 0, 0, 0, 0, 0, 0, 0,
                    0, 0, 0, 0, 59, 154, 202, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0,
                ],
            ),
            (
                Parameter::FeeAccount {
                    account_id: AccountId(10),
                },
                vec![12, 1, 1, 0, 0, 0, 0, 10, 0, 0, 0, 0, 0, 0, 0, 0],
            ),
            (
                Parameter::InsuranceFundAccount {
                    account_id: AccountId(9),
                },
                vec![12, 1, 1, 1, 0, 0, 0, 9, 0, 0, 0, 0, 0, 0, 0, 0],
            ),
            (
                Parameter::MarginInfo {
                    margin_id: MarginId(1),
                    token_id: TokenId(9),
                    ratio: 0,
                },
                vec![12, 1, 1, 2, 1, 0, 9, 0, 0, 0, 0, 0, 0, 0, 0, 0],
            ),
        ];
        for (parameter, expected) in cases {
            assert_eq!(tx(parameter).encode().unwrap(), expected);
        }
    }

    #[test]
    fn contract_info_symbol_is_nul_padded() {
        let bytes = tx(Parameter::ContractInfo {
            pair_id: PairId(2),
            symbol: "BTCUSDC".to_string(),
            initial_margin_rate: 6,
            maintenance_margin_rate: 8,
        })
        .encode()
        .unwrap();
        assert_eq!(&bytes[3..5], &[3, 2]);
        assert_eq!(&bytes[5..12], b"BTCUSDC");
        assert_eq!(&bytes[12..20], &[0u8; 8]);
        assert_eq!(&bytes[20..24], &[0, 6, 0, 8]);
        assert_eq!(bytes.len(), 3 + 1 + 1 + PAIR_SYMBOL_BYTES + 4 + 8);
    }

    #[test]
    fn parameter_rules() {
        let margin = |ratio| Parameter::MarginInfo {
            margin_id: MarginId(1),
            token_id: TokenId(17),
            ratio,
        };
        assert!(tx(margin(100)).validate().is_ok());
        assert!(tx(margin(101)).validate().is_err());
        assert!(tx(Parameter::FundingInfos { infos: vec![] })
            .validate()
            .is_err());

        let infos = |n: u16| Parameter::FundingInfos {
            infos: (0..n).map(|i| FundingInfo::new(PairId(i), 1_000u32, -3)).collect(),
        };
        assert!(tx(infos(USED_POSITION_NUMBER as u16)).validate().is_ok());
        assert!(matches!(
            tx(infos(USED_POSITION_NUMBER as u16 - 1)).validate(),
            Err(ProtocolError::Range { field: "infos", .. })
        ));
        assert!(tx(infos(4)).validate().is_err());
        assert!(tx(Parameter::ContractInfo {
            pair_id: PairId(2),
            symbol: "A-VERY-LONG-PAIR-NAME".to_string(),
            initial_margin_rate: 6,
            maintenance_margin_rate: 8,
        })
        .validate()
        .is_err());
    }

    #[test]
    fn parameter_serde_is_externally_tagged() {
        let json = serde_json::to_value(Parameter::FeeAccount {
            account_id: AccountId(10),
        })
        .unwrap();
        assert_eq!(json["feeAccount"]["accountId"], 10);
    }
}
