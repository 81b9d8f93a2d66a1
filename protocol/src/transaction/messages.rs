//! Human-readable messages an L1 wallet shows before signing.
//!
//! These texts are what the owner actually reads in their wallet, so they
//! name the token by symbol and render amounts with decimals. None of this
//! is ever part of the canonical bytes.

use num_bigint::BigUint;
use num_traits::Zero;

use super::forced_exit::ForcedExit;
use super::transfer::Transfer;
use super::withdraw::Withdraw;
use crate::config::TOKEN_MAX_PRECISION;
use crate::identity::Address;

/// Display details the transaction itself does not carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct L1MessageContext {
    pub token_symbol: String,
    pub decimals: u8,
}

impl L1MessageContext {
    /// A context using the default 18 decimals.
    pub fn new(token_symbol: impl Into<String>) -> Self {
        Self {
            token_symbol: token_symbol.into(),
            decimals: TOKEN_MAX_PRECISION,
        }
    }

    pub fn with_decimals(mut self, decimals: u8) -> Self {
        self.decimals = decimals;
        self
    }
}

/// Render an integer amount of base units as a decimal.
///
/// Trailing zeros are dropped but at least one fractional digit is kept,
/// so `1500000000000000000` at 18 decimals is `"1.5"` and zero is `"0.0"`.
pub fn format_units(value: &BigUint, decimals: u8) -> String {
    let digits = value.to_string();
    let decimals = usize::from(decimals);
    let digits = if digits.len() <= decimals {
        format!("{}{}", "0".repeat(decimals - digits.len() + 1), digits)
    } else {
        digits
    };
    let (int_part, frac_part) = digits.split_at(digits.len() - decimals);
    let frac_part = frac_part.trim_end_matches('0');
    if frac_part.is_empty() {
        format!("{}.0", int_part)
    } else {
        format!("{}.{}", int_part, frac_part)
    }
}

/// `"{action} {amount} {symbol} to: {to}\nFee: {fee} {symbol}"`. Zero
/// amounts and zero fees drop their line.
fn action_lines(
    action: &str,
    amount: &BigUint,
    fee: &BigUint,
    to: &Address,
    ctx: &L1MessageContext,
) -> Vec<String> {
    let mut lines = Vec::with_capacity(3);
    if !amount.is_zero() {
        lines.push(format!(
            "{} {} {} to: {}",
            action,
            format_units(amount, ctx.decimals),
            ctx.token_symbol,
            to
        ));
    }
    if !fee.is_zero() {
        lines.push(format!(
            "Fee: {} {}",
            format_units(fee, ctx.decimals),
            ctx.token_symbol
        ));
    }
    lines
}

pub fn transfer_message(tx: &Transfer, ctx: &L1MessageContext) -> String {
    let mut lines = action_lines("Transfer", &tx.amount, &tx.fee, &tx.to, ctx);
    lines.push(format!("Nonce: {}", tx.nonce));
    lines.join("\n")
}

pub fn withdraw_message(tx: &Withdraw, ctx: &L1MessageContext) -> String {
    let mut lines = action_lines("Withdraw", &tx.amount, &tx.fee, &tx.to_address, ctx);
    lines.push(format!("Nonce: {}", tx.nonce));
    lines.join("\n")
}

pub fn forced_exit_message(tx: &ForcedExit, ctx: &L1MessageContext) -> String {
    let mut lines = action_lines(
        "ForcedExit",
        &tx.exit_amount,
        &BigUint::zero(),
        &tx.target,
        ctx,
    );
    lines.push(format!("Nonce: {}", tx.initiator_nonce));
    lines.join("\n")
}
