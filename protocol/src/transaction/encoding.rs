//! Canonical byte encoding.
//!
//! Every transaction and sub-leg has exactly one byte form. It starts with
//! the type tag, followed by the fields in a fixed order:
//!
//! - integers big-endian at their *wire* width (see `config`);
//! - packed amounts at 5 bytes, packed fees at 2 bytes;
//! - unpacked amounts as 16-byte `u128`;
//! - prices as 15 bytes;
//! - addresses in a 32-byte slot, left-padded;
//! - hashes and public-key hashes raw;
//! - lists behind a one-byte count.
//!
//! A value that does not fit its slot is an error, never a
//! truncation. Signatures, token symbols, and anything else meant for humans
//! are never part of the bytes. Because every field sits in its own fixed or
//! length-prefixed region, two values that differ in any field encode
//! differently.

use num_bigint::BigUint;

use super::packing::{
    is_fee_amount_packable, is_token_amount_packable, pack_fee_amount, pack_token_amount,
};
use super::types::{
    AccountId, ChainId, MarginId, Nonce, PairId, SerialId, SlotId, SubAccountId, TimeStamp,
    TokenId,
};
use crate::config::{PRICE_BYTES, PUBKEY_HASH_BYTES};
use crate::error::{ProtocolError, Result};
use crate::identity::{Address, PubKeyHash, TxHash};

/// A value with a canonical byte encoding.
pub trait Encode {
    /// Fails when a field does not fit its wire width.
    fn encode(&self) -> Result<Vec<u8>>;

    /// `sha256(encode(self))`.
    fn tx_hash(&self) -> Result<TxHash> {
        Ok(TxHash::of(&self.encode()?))
    }
}

/// Append-only big-endian writer.
///
/// Narrowing writes (`token`, `pair`, `order_nonce`, ...) never truncate.
/// The first value that does not fit its slot is remembered and returned
/// from [`ByteWriter::finish`]; later writes are ignored.
#[derive(Debug, Default)]
pub(crate) struct ByteWriter {
    buf: Vec<u8>,
    error: Option<ProtocolError>,
}

impl ByteWriter {
    pub fn with_tag(tag: u8, capacity: usize) -> Self {
        let mut buf = Vec::with_capacity(capacity);
        buf.push(tag);
        Self { buf, error: None }
    }

    fn fail(&mut self, err: ProtocolError) -> &mut Self {
        if self.error.is_none() {
            self.error = Some(err);
        }
        self
    }

    pub fn u8(&mut self, value: u8) -> &mut Self {
        self.buf.push(value);
        self
    }

    pub fn u16(&mut self, value: u16) -> &mut Self {
        self.buf.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn i16(&mut self, value: i16) -> &mut Self {
        self.buf.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn u32(&mut self, value: u32) -> &mut Self {
        self.buf.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn u64(&mut self, value: u64) -> &mut Self {
        self.buf.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    /// Write `value` into exactly `width` bytes, left-padded.
    pub fn uint(&mut self, field: &'static str, value: &BigUint, width: usize) -> &mut Self {
        let raw = value.to_bytes_be();
        if raw.len() > width {
            return self.fail(ProtocolError::range(
                field,
                format!("{} does not fit in {} bytes", value, width),
            ));
        }
        self.buf.resize(self.buf.len() + width - raw.len(), 0);
        self.buf.extend_from_slice(&raw);
        self
    }

    pub fn chain(&mut self, id: ChainId) -> &mut Self {
        self.u8(id.0)
    }

    pub fn account(&mut self, id: AccountId) -> &mut Self {
        self.u32(id.0)
    }

    pub fn sub_account(&mut self, id: SubAccountId) -> &mut Self {
        self.u8(id.0)
    }

    pub fn token(&mut self, id: TokenId) -> &mut Self {
        match u16::try_from(id.0) {
            Ok(v) => self.u16(v),
            Err(_) => self.fail(ProtocolError::range("token_id", format!("{} exceeds 2 bytes", id.0))),
        }
    }

    pub fn pair(&mut self, id: PairId) -> &mut Self {
        match u8::try_from(id.0) {
            Ok(v) => self.u8(v),
            Err(_) => self.fail(ProtocolError::range("pair_id", format!("{} exceeds 1 byte", id.0))),
        }
    }

    pub fn slot(&mut self, id: SlotId) -> &mut Self {
        match u16::try_from(id.0) {
            Ok(v) => self.u16(v),
            Err(_) => self.fail(ProtocolError::range("slot_id", format!("{} exceeds 2 bytes", id.0))),
        }
    }

    pub fn margin(&mut self, id: MarginId) -> &mut Self {
        self.u8(id.0)
    }

    pub fn nonce(&mut self, nonce: Nonce) -> &mut Self {
        self.u32(nonce.0)
    }

    /// Order and contract nonces are 24 bits.
    pub fn order_nonce(&mut self, nonce: Nonce) -> &mut Self {
        if nonce.0 >= 1 << 24 {
            return self.fail(ProtocolError::range(
                "nonce",
                format!("{} exceeds 3 bytes", nonce.0),
            ));
        }
        self.bytes(&nonce.0.to_be_bytes()[1..])
    }

    pub fn timestamp(&mut self, ts: TimeStamp) -> &mut Self {
        self.u32(ts.0)
    }

    pub fn serial_id(&mut self, id: SerialId) -> &mut Self {
        self.u64(id.0)
    }

    pub fn address(&mut self, address: &Address) -> &mut Self {
        self.bytes(&address.to_fixed_bytes())
    }

    pub fn pub_key_hash(&mut self, hash: &PubKeyHash) -> &mut Self {
        debug_assert_eq!(hash.as_bytes().len(), PUBKEY_HASH_BYTES);
        self.bytes(hash.as_bytes())
    }

    /// Only exactly representable amounts are written; packing never rounds here.
    pub fn packed_amount(&mut self, amount: &BigUint) -> &mut Self {
        if !is_token_amount_packable(amount) {
            return self.fail(ProtocolError::range(
                "amount",
                format!("{} is not exactly packable", amount),
            ));
        }
        match pack_token_amount(amount) {
            Ok(packed) => self.bytes(&packed),
            Err(e) => self.fail(e),
        }
    }

    pub fn packed_fee(&mut self, fee: &BigUint) -> &mut Self {
        if !is_fee_amount_packable(fee) {
            return self.fail(ProtocolError::range(
                "fee",
                format!("{} is not exactly packable", fee),
            ));
        }
        match pack_fee_amount(fee) {
            Ok(packed) => self.bytes(&packed),
            Err(e) => self.fail(e),
        }
    }

    /// Unpacked amounts are full `u128`s.
    pub fn full_amount(&mut self, amount: &BigUint) -> &mut Self {
        self.uint("amount", amount, 16)
    }

    pub fn price(&mut self, price: &BigUint) -> &mut Self {
        self.uint("price", price, PRICE_BYTES)
    }

    /// One-byte list length.
    pub fn count(&mut self, n: usize) -> &mut Self {
        match u8::try_from(n) {
            Ok(v) => self.u8(v),
            Err(_) => self.fail(ProtocolError::range("list", format!("{} entries exceed 255", n))),
        }
    }

    /// Two-byte list length.
    pub fn count16(&mut self, n: usize) -> &mut Self {
        match u16::try_from(n) {
            Ok(v) => self.u16(v),
            Err(_) => self.fail(ProtocolError::range("list", format!("{} entries exceed 65535", n))),
        }
    }

    pub fn finish(&mut self) -> Result<Vec<u8>> {
        match self.error.take() {
            Some(err) => Err(err),
            None => Ok(std::mem::take(&mut self.buf)),
        }
    }
}
