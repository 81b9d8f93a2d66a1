//! # Amount Packing
//!
//! On-wire amounts are stored as `mantissa * 10^exponent` instead of as full
//! integers. A token amount is 5 bytes (35-bit mantissa, 5-bit exponent)
//! and a fee is 2 bytes (11-bit mantissa, 5-bit exponent). The packed
//! integer is `(mantissa << exponent_bits) | exponent`, big-endian.
//!
//! Packing never rounds up. A value that is not exactly representable is
//! truncated to the closest representable value *below* it, so a packed
//! transfer can never move more than the user asked for.
//!
//! ```
//! use num_bigint::BigUint;
//! use rollup_protocol::transaction::packing::{pack_fee_amount, unpack_fee_amount};
//!
//! let packed = pack_fee_amount(&BigUint::from(100u32)).unwrap();
//! assert_eq!(packed, vec![12, 128]);
//! assert_eq!(unpack_fee_amount(&packed).unwrap(), BigUint::from(100u32));
//! ```

use num_bigint::BigUint;
use num_traits::One;

use crate::config::{
    AMOUNT_EXPONENT_BIT_WIDTH, AMOUNT_MANTISSA_BIT_WIDTH, FEE_EXPONENT_BIT_WIDTH,
    FEE_MANTISSA_BIT_WIDTH, PACKING_EXPONENT_BASE,
};
use crate::error::{ProtocolError, Result};

/// Mantissa/exponent split of one amount class.
#[derive(Debug, Clone, Copy)]
struct PackingSpec {
    field: &'static str,
    mantissa_bits: usize,
    exponent_bits: usize,
}

const TOKEN: PackingSpec = PackingSpec {
    field: "amount",
    mantissa_bits: AMOUNT_MANTISSA_BIT_WIDTH,
    exponent_bits: AMOUNT_EXPONENT_BIT_WIDTH,
};

const FEE: PackingSpec = PackingSpec {
    field: "fee",
    mantissa_bits: FEE_MANTISSA_BIT_WIDTH,
    exponent_bits: FEE_EXPONENT_BIT_WIDTH,
};

/// Packed width in bytes of a token amount.
pub const PACKED_TOKEN_AMOUNT_BYTES: usize =
    (AMOUNT_MANTISSA_BIT_WIDTH + AMOUNT_EXPONENT_BIT_WIDTH) / 8;

/// Packed width in bytes of a fee.
pub const PACKED_FEE_AMOUNT_BYTES: usize = (FEE_MANTISSA_BIT_WIDTH + FEE_EXPONENT_BIT_WIDTH) / 8;

impl PackingSpec {
    fn byte_width(&self) -> usize {
        (self.mantissa_bits + self.exponent_bits) / 8
    }

    fn max_mantissa(&self) -> BigUint {
        (BigUint::one() << self.mantissa_bits) - 1u32
    }

    fn max_exponent(&self) -> u32 {
        (1u32 << self.exponent_bits) - 1
    }

    fn max_value(&self) -> BigUint {
        self.max_mantissa() * BigUint::from(PACKING_EXPONENT_BASE).pow(self.max_exponent())
    }

    /// Choose `(mantissa, exponent)` for a value known to be in range.
    ///
    /// The smallest exponent that fits gives `floor(v / 10^e)`. One step
    /// down with a saturated mantissa can land closer; both candidates are
    /// `<= v`, so picking the larger one is picking the smaller shortfall.
    fn select(&self, value: &BigUint) -> (BigUint, u32) {
        let base = BigUint::from(PACKING_EXPONENT_BASE);
        let max_mantissa = self.max_mantissa();

        let mut exponent = 0u32;
        let mut power = BigUint::one();
        while value > &(&max_mantissa * &power) {
            exponent += 1;
            power *= &base;
        }
        let mantissa = value / &power;

        if exponent > 0 {
            let lower_power = &power / &base;
            let primary = &mantissa * &power;
            let alternative = &max_mantissa * &lower_power;
            if alternative > primary {
                return (max_mantissa, exponent - 1);
            }
        }
        (mantissa, exponent)
    }

    fn encode(&self, mantissa: &BigUint, exponent: u32) -> Vec<u8> {
        let packed = (mantissa << self.exponent_bits) | BigUint::from(exponent);
        let raw = packed.to_bytes_be();
        let width = self.byte_width();
        let mut out = vec![0u8; width];
        out[width - raw.len()..].copy_from_slice(&raw);
        out
    }

    fn pack(&self, value: &BigUint) -> Result<Vec<u8>> {
        if value > &self.max_value() {
            return Err(ProtocolError::range(
                self.field,
                format!("{} exceeds the packable maximum {}", value, self.max_value()),
            ));
        }
        let (mantissa, exponent) = self.select(value);
        Ok(self.encode(&mantissa, exponent))
    }

    fn unpack(&self, bytes: &[u8]) -> Result<BigUint> {
        if bytes.len() != self.byte_width() {
            return Err(ProtocolError::format(
                self.field,
                format!(
                    "packed form is {} bytes, got {}",
                    self.byte_width(),
                    bytes.len()
                ),
            ));
        }
        let packed = BigUint::from_bytes_be(bytes);
        let exponent_mask = (BigUint::one() << self.exponent_bits) - 1u32;
        let exponent = &packed & &exponent_mask;
        let mantissa = packed >> self.exponent_bits;
        // The mask keeps the exponent below 2^exponent_bits.
        let exponent = exponent.iter_u32_digits().next().unwrap_or(0);
        Ok(mantissa * BigUint::from(PACKING_EXPONENT_BASE).pow(exponent))
    }

    fn closest(&self, value: &BigUint) -> BigUint {
        if value > &self.max_value() {
            return self.max_value();
        }
        let (mantissa, exponent) = self.select(value);
        mantissa * BigUint::from(PACKING_EXPONENT_BASE).pow(exponent)
    }
}

// ---------------------------------------------------------------------------
// Token amounts
// ---------------------------------------------------------------------------

/// Pack a token amount into 5 bytes, rounding toward zero.
pub fn pack_token_amount(amount: &BigUint) -> Result<Vec<u8>> {
    TOKEN.pack(amount)
}

pub fn unpack_token_amount(bytes: &[u8]) -> Result<BigUint> {
    TOKEN.unpack(bytes)
}

/// `unpack(pack(amount))`, saturating at the largest packable amount.
pub fn closest_packable_token_amount(amount: &BigUint) -> BigUint {
    TOKEN.closest(amount)
}

pub fn is_token_amount_packable(amount: &BigUint) -> bool {
    closest_packable_token_amount(amount) == *amount
}

/// Largest token amount the packed form can hold.
pub fn max_packable_token_amount() -> BigUint {
    TOKEN.max_value()
}

// ---------------------------------------------------------------------------
// Fees
// ---------------------------------------------------------------------------

/// Pack a fee into 2 bytes, rounding toward zero.
pub fn pack_fee_amount(fee: &BigUint) -> Result<Vec<u8>> {
    FEE.pack(fee)
}

pub fn unpack_fee_amount(bytes: &[u8]) -> Result<BigUint> {
    FEE.unpack(bytes)
}

pub fn closest_packable_fee_amount(fee: &BigUint) -> BigUint {
    FEE.closest(fee)
}

pub fn is_fee_amount_packable(fee: &BigUint) -> bool {
    closest_packable_fee_amount(fee) == *fee
}

pub fn max_packable_fee_amount() -> BigUint {
    FEE.max_value()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::Zero;
    use proptest::prelude::*;
    use std::str::FromStr;

    fn big(s: &str) -> BigUint {
        BigUint::from_str(s).unwrap()
    }

    #[test]
    fn known_fee_vectors() {
        assert_eq!(pack_fee_amount(&BigUint::from(100u32)).unwrap(), vec![12, 128]);
        assert_eq!(pack_fee_amount(&BigUint::from(3u32)).unwrap(), vec![0, 96]);
        assert_eq!(pack_fee_amount(&BigUint::zero()).unwrap(), vec![0, 0]);
    }

    #[test]
    fn known_token_vectors() {
        assert_eq!(
            pack_token_amount(&BigUint::from(10_000u32)).unwrap(),
            vec![0, 0, 4, 226, 0]
        );
        assert_eq!(
            unpack_token_amount(&[0, 0, 4, 226, 0]).unwrap(),
            BigUint::from(10_000u32)
        );
    }

    #[test]
    fn limits() {
        let max_token = max_packable_token_amount();
        assert_eq!(max_token, big("34359738367") * BigUint::from(10u32).pow(31));
        assert!(pack_token_amount(&max_token).is_ok());
        let err = pack_token_amount(&(max_token.clone() + 1u32)).unwrap_err();
        assert!(matches!(err, ProtocolError::Range { field: "amount", .. }));

        let max_fee = max_packable_fee_amount();
        assert_eq!(max_fee, big("2047") * BigUint::from(10u32).pow(31));
        assert!(pack_fee_amount(&max_fee).is_ok());
        assert!(pack_fee_amount(&(max_fee + 1u32)).is_err());
    }

    #[test]
    fn closest_saturates_but_pack_refuses() {
        let max_fee = max_packable_fee_amount();
        assert_eq!(closest_packable_fee_amount(&(max_fee.clone() * 2u32)), max_fee);
        assert!(pack_fee_amount(&(max_fee * 2u32)).is_err());
    }

    #[test]
    fn rounds_toward_zero() {
        // 2048 needs exponent 1 for a mantissa of 204; 2047 * 10^0 is closer.
        assert_eq!(closest_packable_fee_amount(&BigUint::from(2048u32)), BigUint::from(2047u32));
        assert_eq!(closest_packable_fee_amount(&BigUint::from(20_479u32)), BigUint::from(20_470u32));
        assert!(!is_fee_amount_packable(&BigUint::from(2048u32)));
        assert!(is_fee_amount_packable(&BigUint::from(2047u32)));
        assert!(is_fee_amount_packable(&BigUint::from(20_470u32)));
    }

    #[test]
    fn unpack_rejects_wrong_length() {
        assert!(matches!(
            unpack_fee_amount(&[1, 2, 3]),
            Err(ProtocolError::Format { field: "fee", .. })
        ));
        assert!(unpack_token_amount(&[1, 2]).is_err());
    }

    /// Up to `max_bytes` random big-endian bytes.
    fn amount_up_to(max_bytes: usize) -> impl Strategy<Value = BigUint> {
        prop::collection::vec(any::<u8>(), 0..=max_bytes)
            .prop_map(|bytes| BigUint::from_bytes_be(&bytes))
    }

    proptest! {
        #[test]
        fn token_packing_never_rounds_up(v in amount_up_to(17)) {
            let packed = pack_token_amount(&v).unwrap();
            let unpacked = unpack_token_amount(&packed).unwrap();
            prop_assert!(unpacked <= v);
            prop_assert_eq!(pack_token_amount(&unpacked).unwrap(), packed);
        }

        #[test]
        fn fee_packing_never_rounds_up(v in amount_up_to(24)) {
            let closest = closest_packable_fee_amount(&v);
            prop_assert!(closest <= v);
            if let Ok(packed) = pack_fee_amount(&v) {
                let unpacked = unpack_fee_amount(&packed).unwrap();
                prop_assert_eq!(&unpacked, &closest);
                prop_assert_eq!(pack_fee_amount(&unpacked).unwrap(), packed);
            }
        }

        #[test]
        fn small_values_are_exact(v in 0u64..34_359_738_367u64) {
            let v = BigUint::from(v);
            prop_assert!(is_token_amount_packable(&v));
        }
    }
}
