//! Field range checks.
//!
//! Each check takes the name of the field it is validating so the error
//! points at the exact input to fix. Builders run them before returning a
//! transaction, and the pipeline runs them again on entry because a
//! transaction can also arrive through serde.

use num_bigint::BigUint;

use super::packing::{
    closest_packable_fee_amount, closest_packable_token_amount, is_fee_amount_packable,
    is_token_amount_packable,
};
use super::types::{AccountId, ChainId, MarginId, Nonce, PairId, SlotId, SubAccountId, TokenId};
use crate::config::{
    GLOBAL_ASSET_ACCOUNT_ID, MARGIN_TOKENS_NUMBER, MAX_ACCOUNT_ID, MAX_CHAIN_ID, MAX_NONCE,
    MAX_ORDER_NONCE, MAX_PRICE, MAX_SLOT_ID, MAX_SUB_ACCOUNT_ID, MAX_TOKEN_ID, MIN_PRICE,
    PAIR_SYMBOL_BYTES, USDX_TOKEN_ID_LOWER_BOUND, USDX_TOKEN_ID_UPPER_BOUND, USED_POSITION_NUMBER,
    WITHDRAW_FEE_RATIO_DENOMINATOR,
};
use crate::error::{ProtocolError, Result};
use crate::identity::Address;

/// Margin ratios are percentages.
pub const MAX_MARGIN_RATIO: u8 = 100;

/// Contract margin rates are in tenths of a percent and must stay below 100%.
pub const MARGIN_RATE_DENOMINATOR: u16 = 1000;

pub fn account_id(field: &'static str, id: AccountId) -> Result<()> {
    if *id > MAX_ACCOUNT_ID {
        return Err(ProtocolError::range(
            field,
            format!("expected <= {}, got {}", MAX_ACCOUNT_ID, id),
        ));
    }
    if *id == GLOBAL_ASSET_ACCOUNT_ID {
        return Err(ProtocolError::range(
            field,
            format!("account {} is the global asset account", id),
        ));
    }
    Ok(())
}

pub fn sub_account_id(field: &'static str, id: SubAccountId) -> Result<()> {
    if *id > MAX_SUB_ACCOUNT_ID {
        return Err(ProtocolError::range(
            field,
            format!("expected <= {}, got {}", MAX_SUB_ACCOUNT_ID, id),
        ));
    }
    Ok(())
}

pub fn chain_id(field: &'static str, id: ChainId) -> Result<()> {
    if *id > MAX_CHAIN_ID {
        return Err(ProtocolError::range(
            field,
            format!("expected <= {}, got {}", MAX_CHAIN_ID, id),
        ));
    }
    Ok(())
}

/// Token ids fit 16 bits and stay out of the reserved USD band `[2, 16]`.
pub fn token_id(field: &'static str, id: TokenId) -> Result<()> {
    if *id > MAX_TOKEN_ID {
        return Err(ProtocolError::range(
            field,
            format!("expected <= {}, got {}", MAX_TOKEN_ID, id),
        ));
    }
    if (USDX_TOKEN_ID_LOWER_BOUND..=USDX_TOKEN_ID_UPPER_BOUND).contains(&*id) {
        return Err(ProtocolError::range(
            field,
            format!(
                "token {} is in the reserved range [{}, {}]",
                id, USDX_TOKEN_ID_LOWER_BOUND, USDX_TOKEN_ID_UPPER_BOUND
            ),
        ));
    }
    Ok(())
}

pub fn pair_id(field: &'static str, id: PairId) -> Result<()> {
    if usize::from(*id) >= USED_POSITION_NUMBER {
        return Err(ProtocolError::range(
            field,
            format!("expected < {}, got {}", USED_POSITION_NUMBER, id),
        ));
    }
    Ok(())
}

pub fn margin_id(field: &'static str, id: MarginId) -> Result<()> {
    if usize::from(*id) >= MARGIN_TOKENS_NUMBER {
        return Err(ProtocolError::range(
            field,
            format!("expected < {}, got {}", MARGIN_TOKENS_NUMBER, id),
        ));
    }
    Ok(())
}

pub fn slot_id(field: &'static str, id: SlotId) -> Result<()> {
    if *id > MAX_SLOT_ID {
        return Err(ProtocolError::range(
            field,
            format!("expected <= {}, got {}", MAX_SLOT_ID, id),
        ));
    }
    Ok(())
}

pub fn nonce(field: &'static str, nonce: Nonce) -> Result<()> {
    if *nonce >= MAX_NONCE {
        return Err(ProtocolError::range(
            field,
            format!("expected < {}, got {}", MAX_NONCE, nonce),
        ));
    }
    Ok(())
}

pub fn order_nonce(field: &'static str, nonce: Nonce) -> Result<()> {
    if *nonce >= MAX_ORDER_NONCE {
        return Err(ProtocolError::range(
            field,
            format!("expected < {}, got {}", MAX_ORDER_NONCE, nonce),
        ));
    }
    Ok(())
}

/// Order and contract prices: `MIN_PRICE < price < MAX_PRICE`.
pub fn price(field: &'static str, price: &BigUint) -> Result<()> {
    if *price <= BigUint::from(MIN_PRICE) || *price >= BigUint::from(MAX_PRICE) {
        return Err(ProtocolError::range(
            field,
            format!("expected {} < price < {}, got {}", MIN_PRICE, MAX_PRICE, price),
        ));
    }
    Ok(())
}

/// Oracle prices may be anything below `MAX_PRICE`, zero included.
pub fn oracle_price(field: &'static str, price: &BigUint) -> Result<()> {
    if *price >= BigUint::from(MAX_PRICE) {
        return Err(ProtocolError::range(
            field,
            format!("expected < {}, got {}", MAX_PRICE, price),
        ));
    }
    Ok(())
}

/// Wire flags are a single byte holding 0 or 1.
pub fn boolean(field: &'static str, flag: u8) -> Result<()> {
    if flag > 1 {
        return Err(ProtocolError::range(
            field,
            format!("expected 0 or 1, got {}", flag),
        ));
    }
    Ok(())
}

pub fn withdraw_fee_ratio(ratio: u16) -> Result<()> {
    if ratio > WITHDRAW_FEE_RATIO_DENOMINATOR {
        return Err(ProtocolError::range(
            "withdraw_fee_ratio",
            format!("expected <= {}, got {}", WITHDRAW_FEE_RATIO_DENOMINATOR, ratio),
        ));
    }
    Ok(())
}

pub fn margin_ratio(ratio: u8) -> Result<()> {
    if ratio > MAX_MARGIN_RATIO {
        return Err(ProtocolError::range(
            "margin_ratio",
            format!("expected <= {}, got {}", MAX_MARGIN_RATIO, ratio),
        ));
    }
    Ok(())
}

pub fn margin_rate(field: &'static str, rate: u16) -> Result<()> {
    if rate >= MARGIN_RATE_DENOMINATOR {
        return Err(ProtocolError::range(
            field,
            format!("expected < {}, got {}", MARGIN_RATE_DENOMINATOR, rate),
        ));
    }
    Ok(())
}

/// `i16::MIN` has no sign-magnitude encoding.
pub fn funding_rate(rate: i16) -> Result<()> {
    if rate == i16::MIN {
        return Err(ProtocolError::range(
            "funding_rate",
            format!("{} is not representable", rate),
        ));
    }
    Ok(())
}

pub fn pair_symbol(symbol: &str) -> Result<()> {
    if !symbol.is_ascii() {
        return Err(ProtocolError::format("symbol", "pair symbol must be ASCII"));
    }
    if symbol.len() > PAIR_SYMBOL_BYTES {
        return Err(ProtocolError::range(
            "symbol",
            format!(
                "expected at most {} bytes, got {}",
                PAIR_SYMBOL_BYTES,
                symbol.len()
            ),
        ));
    }
    Ok(())
}

/// Recipients of funds must be real addresses.
pub fn target_address(field: &'static str, address: &Address) -> Result<()> {
    if address.is_zero() {
        return Err(ProtocolError::invalid(field, "address is zero"));
    }
    if address.is_global_account() {
        return Err(ProtocolError::invalid(field, "address is the global account"));
    }
    Ok(())
}

/// The reason names the nearest packable value so callers can round.
pub fn packable_amount(field: &'static str, amount: &BigUint) -> Result<()> {
    if !is_token_amount_packable(amount) {
        return Err(ProtocolError::range(
            field,
            format!(
                "{} is not packable, closest packable amount is {}",
                amount,
                closest_packable_token_amount(amount)
            ),
        ));
    }
    Ok(())
}

pub fn packable_fee(field: &'static str, fee: &BigUint) -> Result<()> {
    if !is_fee_amount_packable(fee) {
        return Err(ProtocolError::range(
            field,
            format!(
                "{} is not packable, closest packable fee is {}",
                fee,
                closest_packable_fee_amount(fee)
            ),
        ));
    }
    Ok(())
}

/// Amounts that travel unpacked must still fit a `u128`.
pub fn full_amount(field: &'static str, amount: &BigUint) -> Result<()> {
    if *amount > BigUint::from(u128::MAX) {
        return Err(ProtocolError::range(
            field,
            format!("expected <= {}, got {}", u128::MAX, amount),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_bounds() {
        assert!(account_id("account_id", AccountId(MAX_ACCOUNT_ID)).is_ok());
        assert!(account_id("account_id", AccountId(MAX_ACCOUNT_ID + 1)).is_err());
        assert!(account_id("account_id", AccountId(GLOBAL_ASSET_ACCOUNT_ID)).is_err());
        assert!(account_id("account_id", AccountId(0)).is_ok());
    }

    #[test]
    fn sub_account_and_chain_bounds() {
        assert!(sub_account_id("sub_account_id", SubAccountId(31)).is_ok());
        let err = sub_account_id("sub_account_id", SubAccountId(32)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "sub_account_id out of range: expected <= 31, got 32"
        );
        assert!(chain_id("chain_id", ChainId(31)).is_ok());
        assert!(chain_id("chain_id", ChainId(32)).is_err());
    }

    #[test]
    fn token_reserved_band() {
        assert!(token_id("token", TokenId(1)).is_ok());
        assert!(token_id("token", TokenId(17)).is_ok());
        assert!(token_id("token", TokenId(65_535)).is_ok());
        for reserved in 2..=16 {
            assert!(token_id("token", TokenId(reserved)).is_err());
        }
        assert!(token_id("token", TokenId(65_536)).is_err());
    }

    #[test]
    fn pair_slot_and_margin_bounds() {
        assert!(pair_id("pair_id", PairId(31)).is_ok());
        assert!(pair_id("pair_id", PairId(32)).is_err());
        assert!(slot_id("slot_id", SlotId(65_535)).is_ok());
        assert!(slot_id("slot_id", SlotId(65_536)).is_err());
        assert!(margin_id("margin_id", MarginId(7)).is_ok());
        assert!(margin_id("margin_id", MarginId(8)).is_err());
    }

    #[test]
    fn nonce_bounds() {
        assert!(nonce("nonce", Nonce(u32::MAX - 1)).is_ok());
        assert!(nonce("nonce", Nonce(u32::MAX)).is_err());
        assert!(order_nonce("nonce", Nonce((1 << 24) - 1)).is_ok());
        assert!(order_nonce("nonce", Nonce(1 << 24)).is_err());
    }

    #[test]
    fn price_bounds_are_exclusive() {
        assert!(price("price", &BigUint::from(1u32)).is_err());
        assert!(price("price", &BigUint::from(2u32)).is_ok());
        assert!(price("price", &BigUint::from(MAX_PRICE - 1)).is_ok());
        assert!(price("price", &BigUint::from(MAX_PRICE)).is_err());
        assert!(oracle_price("price", &BigUint::from(0u32)).is_ok());
        assert!(oracle_price("price", &BigUint::from(MAX_PRICE)).is_err());
    }

    #[test]
    fn flags_and_ratios() {
        assert!(boolean("is_sell", 1).is_ok());
        assert!(boolean("is_sell", 2).is_err());
        assert!(withdraw_fee_ratio(10_000).is_ok());
        assert!(withdraw_fee_ratio(10_001).is_err());
        assert!(funding_rate(i16::MIN + 1).is_ok());
        assert!(funding_rate(i16::MIN).is_err());
        assert!(margin_ratio(100).is_ok());
        assert!(margin_ratio(101).is_err());
        assert!(margin_rate("initial_margin_rate", 999).is_ok());
        assert!(margin_rate("initial_margin_rate", 1000).is_err());
    }

    #[test]
    fn symbol_rules() {
        assert!(pair_symbol("BTCUSDC").is_ok());
        assert!(pair_symbol("ABCDEFGHIJKLMNOP").is_err());
        assert!(pair_symbol("BTC€").is_err());
    }

    #[test]
    fn target_address_rules() {
        assert!(target_address("to", &Address::ZERO).is_err());
        assert!(target_address("to", &Address::GLOBAL_ACCOUNT).is_err());
        assert!(target_address("to", &Address::from_bytes([1; 20])).is_ok());
    }

    #[test]
    fn packable_error_names_closest_value() {
        let err = packable_fee("fee", &BigUint::from(2048u32)).unwrap_err();
        assert!(err.to_string().contains("2047"));
        assert!(packable_amount("amount", &BigUint::from(10_000u32)).is_ok());
    }

    #[test]
    fn full_amount_fits_u128() {
        assert!(full_amount("amount", &BigUint::from(u128::MAX)).is_ok());
        assert!(full_amount("amount", &(BigUint::from(u128::MAX) + 1u32)).is_err());
    }
}
