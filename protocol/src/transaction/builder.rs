//! Transaction construction.
//!
//! Every variant has a plain configuration record: fill in the public
//! fields, call `.build()`, and get back a validated, unsigned transaction
//! or the first field that is out of range. Flags are taken as `bool` here
//! and stored as the single wire byte.
//!
//! Builders do not sign and do not read a clock. Signing happens in
//! [`super::signing`]; timestamps are the caller's business.
//!
//! ```
//! use num_bigint::BigUint;
//! use rollup_protocol::transaction::builder::TransferBuilder;
//! use rollup_protocol::transaction::types::*;
//!
//! let tx = TransferBuilder {
//!     account_id: AccountId(10),
//!     from_sub_account_id: SubAccountId(1),
//!     to_address: "0xAFAFf3aD1a0425D792432D9eCD1c3e26Ef2C42E9".parse().unwrap(),
//!     to_sub_account_id: SubAccountId(1),
//!     token: TokenId(18),
//!     amount: BigUint::from(10_000u32),
//!     fee: BigUint::from(3u32),
//!     nonce: Nonce(1),
//!     timestamp: TimeStamp(1_693_472_232),
//! }
//! .build()
//! .unwrap();
//! assert!(tx.signature.is_none());
//! ```

use num_bigint::BigUint;
use tracing::debug;

use super::change_pubkey::ChangePubKey;
use super::contract::{Contract, ContractMatching};
use super::deposit::{Deposit, FullExit};
use super::forced_exit::ForcedExit;
use super::funding::Funding;
use super::liquidation::{AutoDeleveraging, Liquidation};
use super::order::{Order, OrderMatching};
use super::prices::OraclePrices;
use super::transfer::Transfer;
use super::types::{
    AccountId, ChainId, Nonce, PairId, SerialId, SlotId, SubAccountId, TimeStamp, TokenId,
};
use super::update_global_var::{Parameter, UpdateGlobalVar};
use super::withdraw::Withdraw;
use crate::error::Result;
use crate::identity::{Address, PubKeyHash};

// ---------------------------------------------------------------------------
// Account transactions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct TransferBuilder {
    pub account_id: AccountId,
    pub from_sub_account_id: SubAccountId,
    pub to_address: Address,
    pub to_sub_account_id: SubAccountId,
    pub token: TokenId,
    pub amount: BigUint,
    pub fee: BigUint,
    pub nonce: Nonce,
    pub timestamp: TimeStamp,
}

impl TransferBuilder {
    pub fn build(self) -> Result<Transfer> {
        let tx = Transfer {
            account_id: self.account_id,
            from_sub_account_id: self.from_sub_account_id,
            to: self.to_address,
            to_sub_account_id: self.to_sub_account_id,
            token: self.token,
            amount: self.amount,
            fee: self.fee,
            nonce: self.nonce,
            ts: self.timestamp,
            signature: None,
        };
        tx.validate()?;
        debug!(tx_type = "Transfer", account_id = %tx.account_id, nonce = %tx.nonce, "built transaction");
        Ok(tx)
    }
}

#[derive(Debug, Clone)]
pub struct WithdrawBuilder {
    pub account_id: AccountId,
    pub sub_account_id: SubAccountId,
    pub to_chain_id: ChainId,
    pub to_address: Address,
    pub l2_source_token: TokenId,
    pub l1_target_token: TokenId,
    pub amount: BigUint,
    pub fee: BigUint,
    pub nonce: Nonce,
    pub withdraw_to_l1: bool,
    pub withdraw_fee_ratio: u16,
    pub timestamp: TimeStamp,
}

impl WithdrawBuilder {
    pub fn build(self) -> Result<Withdraw> {
        let tx = Withdraw {
            to_chain_id: self.to_chain_id,
            account_id: self.account_id,
            sub_account_id: self.sub_account_id,
            to_address: self.to_address,
            l2_source_token: self.l2_source_token,
            l1_target_token: self.l1_target_token,
            amount: self.amount,
            fee: self.fee,
            nonce: self.nonce,
            withdraw_to_l1: u8::from(self.withdraw_to_l1),
            withdraw_fee_ratio: self.withdraw_fee_ratio,
            ts: self.timestamp,
            signature: None,
        };
        tx.validate()?;
        debug!(tx_type = "Withdraw", account_id = %tx.account_id, to_chain_id = %tx.to_chain_id, "built transaction");
        Ok(tx)
    }
}

#[derive(Debug, Clone)]
pub struct ForcedExitBuilder {
    pub to_chain_id: ChainId,
    pub initiator_account_id: AccountId,
    pub initiator_sub_account_id: SubAccountId,
    pub target: Address,
    pub target_sub_account_id: SubAccountId,
    pub l2_source_token: TokenId,
    pub l1_target_token: TokenId,
    pub initiator_nonce: Nonce,
    pub exit_amount: BigUint,
    pub withdraw_to_l1: bool,
    pub timestamp: TimeStamp,
}

impl ForcedExitBuilder {
    pub fn build(self) -> Result<ForcedExit> {
        let tx = ForcedExit {
            to_chain_id: self.to_chain_id,
            initiator_account_id: self.initiator_account_id,
            initiator_sub_account_id: self.initiator_sub_account_id,
            target: self.target,
            target_sub_account_id: self.target_sub_account_id,
            l2_source_token: self.l2_source_token,
            l1_target_token: self.l1_target_token,
            initiator_nonce: self.initiator_nonce,
            exit_amount: self.exit_amount,
            withdraw_to_l1: u8::from(self.withdraw_to_l1),
            ts: self.timestamp,
            signature: None,
        };
        tx.validate()?;
        debug!(tx_type = "ForcedExit", account_id = %tx.initiator_account_id, "built transaction");
        Ok(tx)
    }
}

#[derive(Debug, Clone)]
pub struct ChangePubKeyBuilder {
    pub chain_id: ChainId,
    pub account_id: AccountId,
    pub sub_account_id: SubAccountId,
    pub new_pubkey_hash: PubKeyHash,
    pub fee_token: TokenId,
    pub fee: BigUint,
    pub nonce: Nonce,
    pub timestamp: TimeStamp,
}

impl ChangePubKeyBuilder {
    /// The binding is attached later, by the pipeline.
    pub fn build(self) -> Result<ChangePubKey> {
        let tx = ChangePubKey {
            chain_id: self.chain_id,
            account_id: self.account_id,
            sub_account_id: self.sub_account_id,
            new_pk_hash: self.new_pubkey_hash,
            fee_token: self.fee_token,
            fee: self.fee,
            nonce: self.nonce,
            ts: self.timestamp,
            eth_auth_data: None,
            signature: None,
        };
        tx.validate()?;
        debug!(tx_type = "ChangePubKey", account_id = %tx.account_id, chain_id = %tx.chain_id, "built transaction");
        Ok(tx)
    }
}

// ---------------------------------------------------------------------------
// Priority operations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct DepositBuilder {
    pub from_chain_id: ChainId,
    pub account_id: AccountId,
    pub sub_account_id: SubAccountId,
    pub l1_source_token: TokenId,
    pub l2_target_token: TokenId,
    pub amount: BigUint,
    pub owner: Address,
    pub serial_id: SerialId,
    pub l1_hash: [u8; 32],
}

impl DepositBuilder {
    pub fn build(self) -> Result<Deposit> {
        let tx = Deposit {
            from_chain_id: self.from_chain_id,
            account_id: self.account_id,
            sub_account_id: self.sub_account_id,
            l1_source_token: self.l1_source_token,
            l2_target_token: self.l2_target_token,
            amount: self.amount,
            owner: self.owner,
            serial_id: self.serial_id,
            l1_hash: self.l1_hash,
        };
        tx.validate()?;
        debug!(tx_type = "Deposit", account_id = %tx.account_id, serial_id = %tx.serial_id, "built transaction");
        Ok(tx)
    }
}

#[derive(Debug, Clone)]
pub struct FullExitBuilder {
    pub to_chain_id: ChainId,
    pub account_id: AccountId,
    pub sub_account_id: SubAccountId,
    pub exit_address: Address,
    pub l2_source_token: TokenId,
    pub l1_target_token: TokenId,
    pub serial_id: SerialId,
    pub l1_hash: [u8; 32],
}

impl FullExitBuilder {
    pub fn build(self) -> Result<FullExit> {
        let tx = FullExit {
            to_chain_id: self.to_chain_id,
            account_id: self.account_id,
            sub_account_id: self.sub_account_id,
            exit_address: self.exit_address,
            l2_source_token: self.l2_source_token,
            l1_target_token: self.l1_target_token,
            serial_id: self.serial_id,
            l1_hash: self.l1_hash,
        };
        tx.validate()?;
        debug!(tx_type = "FullExit", account_id = %tx.account_id, serial_id = %tx.serial_id, "built transaction");
        Ok(tx)
    }
}

// ---------------------------------------------------------------------------
// Order legs and matching
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct OrderBuilder {
    pub account_id: AccountId,
    pub sub_account_id: SubAccountId,
    pub slot_id: SlotId,
    pub nonce: Nonce,
    pub base_token_id: TokenId,
    pub quote_token_id: TokenId,
    pub amount: BigUint,
    pub price: BigUint,
    pub is_sell: bool,
    pub has_subsidy: bool,
    pub maker_fee_rate: u8,
    pub taker_fee_rate: u8,
}

impl OrderBuilder {
    /// An unsigned leg. Sign it with [`Order::sign`] before matching.
    pub fn build(self) -> Result<Order> {
        let order = Order {
            account_id: self.account_id,
            sub_account_id: self.sub_account_id,
            slot_id: self.slot_id,
            nonce: self.nonce,
            base_token_id: self.base_token_id,
            quote_token_id: self.quote_token_id,
            amount: self.amount,
            price: self.price,
            is_sell: u8::from(self.is_sell),
            has_subsidy: u8::from(self.has_subsidy),
            fee_rates: [self.maker_fee_rate, self.taker_fee_rate],
            signature: None,
        };
        order.validate()?;
        debug!(account_id = %order.account_id, slot_id = %order.slot_id, "built order");
        Ok(order)
    }
}

#[derive(Debug, Clone)]
pub struct OrderMatchingBuilder {
    pub account_id: AccountId,
    pub sub_account_id: SubAccountId,
    pub taker: Order,
    pub maker: Order,
    pub oracle_prices: OraclePrices,
    pub fee_token: TokenId,
    pub fee: BigUint,
    pub expect_base_amount: BigUint,
    pub expect_quote_amount: BigUint,
}

impl OrderMatchingBuilder {
    /// Both legs must already be signed by their owners.
    pub fn build(self) -> Result<OrderMatching> {
        let tx = OrderMatching {
            account_id: self.account_id,
            sub_account_id: self.sub_account_id,
            taker: self.taker,
            maker: self.maker,
            oracle_prices: self.oracle_prices,
            fee_token: self.fee_token,
            fee: self.fee,
            expect_base_amount: self.expect_base_amount,
            expect_quote_amount: self.expect_quote_amount,
            signature: None,
        };
        tx.validate()?;
        debug!(
            tx_type = "OrderMatching",
            account_id = %tx.account_id,
            taker = %tx.taker.account_id,
            maker = %tx.maker.account_id,
            "built transaction"
        );
        Ok(tx)
    }
}

#[derive(Debug, Clone)]
pub struct ContractBuilder {
    pub account_id: AccountId,
    pub sub_account_id: SubAccountId,
    pub slot_id: SlotId,
    pub nonce: Nonce,
    pub pair_id: PairId,
    /// `true` opens a long position.
    pub direction: bool,
    pub size: BigUint,
    pub price: BigUint,
    pub maker_fee_rate: u8,
    pub taker_fee_rate: u8,
    pub has_subsidy: bool,
}

impl ContractBuilder {
    pub fn build(self) -> Result<Contract> {
        let contract = Contract {
            account_id: self.account_id,
            sub_account_id: self.sub_account_id,
            slot_id: self.slot_id,
            nonce: self.nonce,
            pair_id: self.pair_id,
            direction: u8::from(self.direction),
            size: self.size,
            price: self.price,
            fee_rates: [self.maker_fee_rate, self.taker_fee_rate],
            has_subsidy: u8::from(self.has_subsidy),
            signature: None,
        };
        contract.validate()?;
        debug!(account_id = %contract.account_id, pair_id = %contract.pair_id, "built contract");
        Ok(contract)
    }
}

#[derive(Debug, Clone)]
pub struct ContractMatchingBuilder {
    pub account_id: AccountId,
    pub sub_account_id: SubAccountId,
    pub taker: Contract,
    pub maker: Vec<Contract>,
    pub oracle_prices: OraclePrices,
    pub fee_token: TokenId,
    pub fee: BigUint,
}

impl ContractMatchingBuilder {
    pub fn build(self) -> Result<ContractMatching> {
        let tx = ContractMatching {
            account_id: self.account_id,
            sub_account_id: self.sub_account_id,
            taker: self.taker,
            maker: self.maker,
            oracle_prices: self.oracle_prices,
            fee_token: self.fee_token,
            fee: self.fee,
            signature: None,
        };
        tx.validate()?;
        debug!(
            tx_type = "ContractMatching",
            account_id = %tx.account_id,
            makers = tx.maker.len(),
            "built transaction"
        );
        Ok(tx)
    }
}

// ---------------------------------------------------------------------------
// Operator transactions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct LiquidationBuilder {
    pub account_id: AccountId,
    pub sub_account_id: SubAccountId,
    pub sub_account_nonce: Nonce,
    pub oracle_prices: OraclePrices,
    pub liquidation_account_id: AccountId,
    pub fee_token: TokenId,
    pub fee: BigUint,
}

impl LiquidationBuilder {
    pub fn build(self) -> Result<Liquidation> {
        let tx = Liquidation {
            account_id: self.account_id,
            sub_account_id: self.sub_account_id,
            sub_account_nonce: self.sub_account_nonce,
            oracle_prices: self.oracle_prices,
            liquidation_account_id: self.liquidation_account_id,
            fee_token: self.fee_token,
            fee: self.fee,
            signature: None,
        };
        tx.validate()?;
        debug!(
            tx_type = "Liquidation",
            account_id = %tx.account_id,
            liquidation_account_id = %tx.liquidation_account_id,
            "built transaction"
        );
        Ok(tx)
    }
}

#[derive(Debug, Clone)]
pub struct AutoDeleveragingBuilder {
    pub account_id: AccountId,
    pub sub_account_id: SubAccountId,
    pub sub_account_nonce: Nonce,
    pub oracle_prices: OraclePrices,
    pub adl_account_id: AccountId,
    pub pair_id: PairId,
    pub adl_size: BigUint,
    pub adl_price: BigUint,
    pub fee_token: TokenId,
    pub fee: BigUint,
}

impl AutoDeleveragingBuilder {
    pub fn build(self) -> Result<AutoDeleveraging> {
        let tx = AutoDeleveraging {
            account_id: self.account_id,
            sub_account_id: self.sub_account_id,
            sub_account_nonce: self.sub_account_nonce,
            oracle_prices: self.oracle_prices,
            adl_account_id: self.adl_account_id,
            pair_id: self.pair_id,
            adl_size: self.adl_size,
            adl_price: self.adl_price,
            fee_token: self.fee_token,
            fee: self.fee,
            signature: None,
        };
        tx.validate()?;
        debug!(
            tx_type = "AutoDeleveraging",
            account_id = %tx.account_id,
            adl_account_id = %tx.adl_account_id,
            "built transaction"
        );
        Ok(tx)
    }
}

#[derive(Debug, Clone)]
pub struct FundingBuilder {
    pub account_id: AccountId,
    pub sub_account_id: SubAccountId,
    pub sub_account_nonce: Nonce,
    pub funding_account_ids: Vec<AccountId>,
    pub fee_token: TokenId,
    pub fee: BigUint,
}

impl FundingBuilder {
    pub fn build(self) -> Result<Funding> {
        let tx = Funding {
            account_id: self.account_id,
            sub_account_id: self.sub_account_id,
            sub_account_nonce: self.sub_account_nonce,
            funding_account_ids: self.funding_account_ids,
            fee_token: self.fee_token,
            fee: self.fee,
            signature: None,
        };
        tx.validate()?;
        debug!(
            tx_type = "Funding",
            account_id = %tx.account_id,
            accounts = tx.funding_account_ids.len(),
            "built transaction"
        );
        Ok(tx)
    }
}

#[derive(Debug, Clone)]
pub struct UpdateGlobalVarBuilder {
    pub from_chain_id: ChainId,
    pub sub_account_id: SubAccountId,
    pub parameter: Parameter,
    pub serial_id: SerialId,
}

impl UpdateGlobalVarBuilder {
    pub fn build(self) -> Result<UpdateGlobalVar> {
        let tx = UpdateGlobalVar {
            from_chain_id: self.from_chain_id,
            sub_account_id: self.sub_account_id,
            parameter: self.parameter,
            serial_id: self.serial_id,
            signature: None,
        };
        tx.validate()?;
        debug!(
            tx_type = "UpdateGlobalVar",
            parameter = tx.parameter.parameter_type(),
            serial_id = %tx.serial_id,
            "built transaction"
        );
        Ok(tx)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProtocolError;
    use crate::signer::L2Signer;
    use crate::transaction::encoding::Encode;
    use crate::transaction::prices::snapshot;

    fn transfer() -> TransferBuilder {
        TransferBuilder {
            account_id: AccountId(10),
            from_sub_account_id: SubAccountId(1),
            to_address: "0xAFAFf3aD1a0425D792432D9eCD1c3e26Ef2C42E9".parse().unwrap(),
            to_sub_account_id: SubAccountId(1),
            token: TokenId(18),
            amount: BigUint::from(10_000u32),
            fee: BigUint::from(3u32),
            nonce: Nonce(1),
            timestamp: TimeStamp(1_693_472_232),
        }
    }

    fn order(account: u32, is_sell: bool) -> OrderBuilder {
        OrderBuilder {
            account_id: AccountId(account),
            sub_account_id: SubAccountId(1),
            slot_id: SlotId(1),
            nonce: Nonce(1),
            base_token_id: TokenId(18),
            quote_token_id: TokenId(145),
            amount: BigUint::from(1_000u32),
            price: BigUint::from(50_000u32),
            is_sell,
            has_subsidy: false,
            maker_fee_rate: 5,
            taker_fee_rate: 10,
        }
    }

    fn matching(taker: Order, maker: Order) -> OrderMatchingBuilder {
        OrderMatchingBuilder {
            account_id: AccountId(3),
            sub_account_id: SubAccountId(1),
            taker,
            maker,
            oracle_prices: snapshot(),
            fee_token: TokenId(18),
            fee: BigUint::from(0u32),
            expect_base_amount: BigUint::from(0u32),
            expect_quote_amount: BigUint::from(0u32),
        }
    }

    #[test]
    fn transfer_builds_unsigned() {
        let tx = transfer().build().unwrap();
        assert_eq!(tx.encode().unwrap().len(), Transfer::ENCODED_LEN);
        assert!(tx.signature.is_none());
    }

    #[test]
    fn unpackable_amount_names_closest() {
        let mut builder = transfer();
        builder.amount = BigUint::from(34_359_738_368u64);
        let err = builder.build().unwrap_err();
        assert!(matches!(err, ProtocolError::Range { field: "amount", .. }));
        assert!(err.to_string().contains("closest packable amount is 34359738367"));
    }

    #[test]
    fn global_account_is_not_a_recipient() {
        let mut builder = transfer();
        builder.to_address = Address::GLOBAL_ACCOUNT;
        assert!(matches!(
            builder.build(),
            Err(ProtocolError::InvalidField { field: "to", .. })
        ));
    }

    #[test]
    fn withdraw_flags_become_bytes() {
        let tx = WithdrawBuilder {
            account_id: AccountId(10),
            sub_account_id: SubAccountId(1),
            to_chain_id: ChainId(1),
            to_address: Address::from_bytes([0x33; 20]),
            l2_source_token: TokenId(18),
            l1_target_token: TokenId(18),
            amount: BigUint::from(123_456_789u64),
            fee: BigUint::from(3u32),
            nonce: Nonce(1),
            withdraw_to_l1: true,
            withdraw_fee_ratio: 50,
            timestamp: TimeStamp(1),
        }
        .build()
        .unwrap();
        assert_eq!(tx.withdraw_to_l1, 1);
    }

    #[test]
    fn order_matching_requires_signed_legs() {
        let signer = L2Signer::random();
        let taker = order(10, false).build().unwrap();
        let maker = order(11, true).build().unwrap();

        let err = matching(taker.clone(), maker.sign(&signer).unwrap())
            .build()
            .unwrap_err();
        assert!(matches!(err, ProtocolError::Signature(_)));

        assert!(matching(taker.sign(&signer).unwrap(), maker.sign(&signer).unwrap())
            .build()
            .is_ok());
    }

    #[test]
    fn order_matching_rejects_same_side() {
        let signer = L2Signer::random();
        let taker = order(10, true).build().unwrap().sign(&signer).unwrap();
        let maker = order(11, true).build().unwrap().sign(&signer).unwrap();
        assert!(matches!(
            matching(taker, maker).build(),
            Err(ProtocolError::InvalidField { .. })
        ));
    }

    #[test]
    fn oracle_prices_must_be_in_pair_order() {
        let signer = L2Signer::random();
        let mut builder = matching(
            order(10, false).build().unwrap().sign(&signer).unwrap(),
            order(11, true).build().unwrap().sign(&signer).unwrap(),
        );
        builder.oracle_prices.contract_prices.swap(1, 2);
        assert!(builder.build().is_err());

        let mut builder = matching(
            order(10, false).build().unwrap().sign(&signer).unwrap(),
            order(11, true).build().unwrap().sign(&signer).unwrap(),
        );
        builder.oracle_prices.margin_prices.clear();
        assert!(builder.build().is_err());
    }

    #[test]
    fn contract_matching_takes_many_makers() {
        let signer = L2Signer::random();
        let contract = |account: u32, long: bool| ContractBuilder {
            account_id: AccountId(account),
            sub_account_id: SubAccountId(0),
            slot_id: SlotId(0),
            nonce: Nonce(0),
            pair_id: PairId(1),
            direction: long,
            size: BigUint::from(100u32),
            price: BigUint::from(2_000u32),
            maker_fee_rate: 0,
            taker_fee_rate: 0,
            has_subsidy: false,
        }
        .build()
        .unwrap()
        .sign(&signer)
        .unwrap();

        let tx = ContractMatchingBuilder {
            account_id: AccountId(3),
            sub_account_id: SubAccountId(0),
            taker: contract(10, true),
            maker: vec![contract(11, false), contract(12, false)],
            oracle_prices: snapshot(),
            fee_token: TokenId(18),
            fee: BigUint::from(0u32),
        }
        .build()
        .unwrap();
        assert_eq!(tx.maker.len(), 2);
    }

    #[test]
    fn funding_rejects_reserved_fee_token() {
        let result = FundingBuilder {
            account_id: AccountId(3),
            sub_account_id: SubAccountId(0),
            sub_account_nonce: Nonce(0),
            funding_account_ids: vec![AccountId(5)],
            fee_token: TokenId(5),
            fee: BigUint::from(0u32),
        }
        .build();
        assert!(matches!(
            result,
            Err(ProtocolError::Range {
                field: "fee_token",
                ..
            })
        ));
    }
}
