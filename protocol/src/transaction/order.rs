//! Spot orders and the transaction that matches two of them.
//!
//! An [`Order`] is never submitted on its own. Its owner builds it, signs it
//! with [`Order::sign`], and hands the frozen value to a matcher, which
//! embeds a taker and a maker in an [`OrderMatching`] and signs the outer
//! transaction with its own key.

use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

use super::encoding::{ByteWriter, Encode};
use super::prices::OraclePrices;
use super::types::{biguint_str, AccountId, Nonce, SlotId, SubAccountId, TokenId};
use super::validation;
use crate::config::{ORDER_MATCHING_TX_TYPE, ORDER_MSG_TYPE};
use crate::crypto::L2Signature;
use crate::error::{ProtocolError, Result};
use crate::identity::TxHash;
use crate::signer::L2Signer;

/// A limit order for `amount` of `base_token_id` at `price` quote units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub account_id: AccountId,
    pub sub_account_id: SubAccountId,
    pub slot_id: SlotId,
    /// Per-slot order nonce, 24 bits.
    pub nonce: Nonce,
    pub base_token_id: TokenId,
    pub quote_token_id: TokenId,
    #[serde(with = "biguint_str")]
    pub amount: BigUint,
    #[serde(with = "biguint_str")]
    pub price: BigUint,
    /// 0 buys the base token, 1 sells it.
    pub is_sell: u8,
    /// Subsidy only applies to the maker fee.
    pub has_subsidy: u8,
    /// `[maker, taker]`, in hundredths of a percent.
    pub fee_rates: [u8; 2],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<L2Signature>,
}

impl Order {
    pub const ENCODED_LEN: usize = 39;

    pub fn validate(&self) -> Result<()> {
        validation::account_id("account_id", self.account_id)?;
        validation::sub_account_id("sub_account_id", self.sub_account_id)?;
        validation::slot_id("slot_id", self.slot_id)?;
        validation::order_nonce("nonce", self.nonce)?;
        validation::token_id("base_token_id", self.base_token_id)?;
        validation::token_id("quote_token_id", self.quote_token_id)?;
        validation::packable_amount("amount", &self.amount)?;
        validation::price("price", &self.price)?;
        validation::boolean("is_sell", self.is_sell)?;
        validation::boolean("has_subsidy", self.has_subsidy)
    }

    pub fn is_sell(&self) -> bool {
        self.is_sell == 1
    }

    /// Sign the leg. The returned value is what a matcher embeds; the
    /// original is left untouched.
    pub fn sign(&self, signer: &L2Signer) -> Result<Order> {
        self.validate()?;
        let mut signed = self.clone();
        signed.signature = Some(signer.sign_authorization(self.tx_hash()?.as_bytes()));
        Ok(signed)
    }

    /// The leg carries a signature over its own hash.
    pub fn verify_signature(&self) -> Result<()> {
        self.validate()?;
        verify_leg("order", &self.tx_hash()?, self.signature.as_ref())
    }
}

impl Encode for Order {
    fn encode(&self) -> Result<Vec<u8>> {
        ByteWriter::with_tag(ORDER_MSG_TYPE, Self::ENCODED_LEN)
            .account(self.account_id)
            .sub_account(self.sub_account_id)
            .slot(self.slot_id)
            .order_nonce(self.nonce)
            .token(self.base_token_id)
            .token(self.quote_token_id)
            .price(&self.price)
            .u8(self.is_sell)
            .bytes(&self.fee_rates)
            .u8(self.has_subsidy)
            .packed_amount(&self.amount)
            .finish()
    }
}

/// Shared by orders and contracts.
pub(crate) fn verify_leg(
    leg: &'static str,
    hash: &TxHash,
    signature: Option<&L2Signature>,
) -> Result<()> {
    let signature =
        signature.ok_or_else(|| ProtocolError::Signature(format!("{} leg is unsigned", leg)))?;
    if !L2Signer::verify(signature, hash.as_bytes()) {
        return Err(ProtocolError::Signature(format!(
            "{} leg signature does not verify",
            leg
        )));
    }
    Ok(())
}

/// Settles a taker order against a maker order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderMatching {
    /// The matcher submitting the trade.
    pub account_id: AccountId,
    pub sub_account_id: SubAccountId,
    pub taker: Order,
    pub maker: Order,
    pub oracle_prices: OraclePrices,
    pub fee_token: TokenId,
    #[serde(with = "biguint_str")]
    pub fee: BigUint,
    /// Upper bounds on what this match may trade. Zero means unbounded.
    /// Unpacked, since the remainder of a partially filled order need not
    /// be packable.
    #[serde(with = "biguint_str")]
    pub expect_base_amount: BigUint,
    #[serde(with = "biguint_str")]
    pub expect_quote_amount: BigUint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<L2Signature>,
}

impl OrderMatching {
    pub fn validate(&self) -> Result<()> {
        validation::account_id("account_id", self.account_id)?;
        validation::sub_account_id("sub_account_id", self.sub_account_id)?;
        self.taker.validate()?;
        self.maker.validate()?;
        self.oracle_prices.validate()?;
        validation::token_id("fee_token", self.fee_token)?;
        validation::packable_fee("fee", &self.fee)?;
        validation::full_amount("expect_base_amount", &self.expect_base_amount)?;
        validation::full_amount("expect_quote_amount", &self.expect_quote_amount)?;
        self.check_legs()
    }

    /// Signatures, sides and tokens of the two legs.
    pub fn check_legs(&self) -> Result<()> {
        self.taker.verify_signature()?;
        self.maker.verify_signature()?;
        if self.taker.is_sell == self.maker.is_sell {
            return Err(ProtocolError::invalid(
                "maker",
                "taker and maker are on the same side",
            ));
        }
        if self.taker.base_token_id != self.maker.base_token_id
            || self.taker.quote_token_id != self.maker.quote_token_id
        {
            return Err(ProtocolError::invalid(
                "maker",
                format!(
                    "taker trades {}/{} but maker trades {}/{}",
                    self.taker.base_token_id,
                    self.taker.quote_token_id,
                    self.maker.base_token_id,
                    self.maker.quote_token_id
                ),
            ));
        }
        Ok(())
    }

    /// Both bounds set: trade at most these amounts.
    pub fn is_expect_mode(&self) -> bool {
        !self.expect_base_amount.is_zero() && !self.expect_quote_amount.is_zero()
    }

    /// The bound on what the maker gives up.
    pub fn maker_expect_amount(&self) -> &BigUint {
        if self.maker.is_sell() {
            &self.expect_base_amount
        } else {
            &self.expect_quote_amount
        }
    }

    pub fn taker_expect_amount(&self) -> &BigUint {
        if self.taker.is_sell() {
            &self.expect_base_amount
        } else {
            &self.expect_quote_amount
        }
    }
}

impl Encode for OrderMatching {
    fn encode(&self) -> Result<Vec<u8>> {
        let mut w = ByteWriter::with_tag(ORDER_MATCHING_TX_TYPE, 256);
        w.account(self.account_id)
            .sub_account(self.sub_account_id)
            .bytes(&self.maker.encode()?)
            .bytes(&self.taker.encode()?);
        self.oracle_prices.write(&mut w);
        w.token(self.fee_token)
            .packed_fee(&self.fee)
            .full_amount(&self.expect_base_amount)
            .full_amount(&self.expect_quote_amount)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::prices::{snapshot, SNAPSHOT_ENCODED_LEN};

    fn order(account: u32, is_sell: bool) -> Order {
        Order {
            account_id: AccountId(account),
            sub_account_id: SubAccountId(1),
            slot_id: SlotId(3),
            nonce: Nonce(0x0a0b0c),
            base_token_id: TokenId(18),
            quote_token_id: TokenId(145),
            amount: BigUint::from(10_000u32),
            price: BigUint::from(1_500_000u32),
            is_sell: u8::from(is_sell),
            has_subsidy: 0,
            fee_rates: [5, 10],
            signature: None,
        }
    }

    fn matching(signer: &L2Signer) -> OrderMatching {
        OrderMatching {
            account_id: AccountId(7),
            sub_account_id: SubAccountId(1),
            taker: order(10, false).sign(signer).unwrap(),
            maker: order(11, true).sign(signer).unwrap(),
            oracle_prices: snapshot(),
            fee_token: TokenId(18),
            fee: BigUint::from(3u32),
            expect_base_amount: BigUint::from(5_000u32),
            expect_quote_amount: BigUint::zero(),
            signature: None,
        }
    }

    #[test]
    fn order_layout() {
        let bytes = order(10, true).encode().unwrap();
        assert_eq!(bytes.len(), Order::ENCODED_LEN);
        assert_eq!(&bytes[..11], &[0xff, 0, 0, 0, 10, 1, 0, 3, 0x0a, 0x0b, 0x0c]);
        assert_eq!(&bytes[11..15], &[0, 18, 0, 145]);
        assert_eq!(&bytes[27..30], &[0x16, 0xe3, 0x60]);
        assert_eq!(&bytes[30..34], &[1, 5, 10, 0]);
        assert_eq!(&bytes[34..], &[0, 0, 4, 226, 0]);
    }

    #[test]
    fn sign_returns_new_value_and_verifies() {
        let signer = L2Signer::random();
        let unsigned = order(10, false);
        let signed = unsigned.sign(&signer).unwrap();
        assert!(unsigned.signature.is_none());
        assert!(signed.verify_signature().is_ok());
        assert!(matches!(
            unsigned.verify_signature(),
            Err(ProtocolError::Signature(_))
        ));

        let mut tampered = signed.clone();
        tampered.price += 1u32;
        assert!(tampered.verify_signature().is_err());
    }

    #[test]
    fn matching_puts_maker_first() {
        let signer = L2Signer::random();
        let tx = matching(&signer);
        let bytes = tx.encode().unwrap();
        assert_eq!(bytes[0], ORDER_MATCHING_TX_TYPE);
        assert_eq!(&bytes[6..6 + Order::ENCODED_LEN], &tx.maker.encode().unwrap()[..]);
        let taker_at = 6 + Order::ENCODED_LEN;
        assert_eq!(
            &bytes[taker_at..taker_at + Order::ENCODED_LEN],
            &tx.taker.encode().unwrap()[..]
        );
        // prices, then fee token, fee, two u128s
        assert_eq!(
            bytes.len(),
            6 + 2 * Order::ENCODED_LEN + SNAPSHOT_ENCODED_LEN + 4 + 32
        );
        assert!(tx.validate().is_ok());
    }

    #[test]
    fn same_side_and_token_mismatch_are_rejected() {
        let signer = L2Signer::random();
        let mut tx = matching(&signer);
        tx.maker = order(11, false).sign(&signer).unwrap();
        assert!(matches!(
            tx.validate(),
            Err(ProtocolError::InvalidField { field: "maker", .. })
        ));

        let mut tx = matching(&signer);
        let mut maker = order(11, true);
        maker.quote_token_id = TokenId(17);
        tx.maker = maker.sign(&signer).unwrap();
        assert!(matches!(
            tx.validate(),
            Err(ProtocolError::InvalidField { .. })
        ));
    }

    #[test]
    fn expect_amounts_follow_sides() {
        let tx = matching(&L2Signer::random());
        assert!(!tx.is_expect_mode());
        assert_eq!(tx.maker_expect_amount(), &BigUint::from(5_000u32));
        assert!(tx.taker_expect_amount().is_zero());
    }
}
