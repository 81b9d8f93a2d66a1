//! Layer-2 transfer between two sub-accounts.

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use super::encoding::{ByteWriter, Encode};
use super::types::{biguint_str, AccountId, Nonce, SubAccountId, TimeStamp, TokenId};
use super::validation;
use crate::config::TRANSFER_TX_TYPE;
use crate::crypto::L2Signature;
use crate::error::Result;
use crate::identity::Address;

/// Moves `amount` of `token` from the sender's sub-account to the account
/// registered at `to`. Both amount and fee travel packed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transfer {
    pub account_id: AccountId,
    pub from_sub_account_id: SubAccountId,
    pub to: Address,
    pub to_sub_account_id: SubAccountId,
    pub token: TokenId,
    #[serde(with = "biguint_str")]
    pub amount: BigUint,
    #[serde(with = "biguint_str")]
    pub fee: BigUint,
    pub nonce: Nonce,
    pub ts: TimeStamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<L2Signature>,
}

impl Transfer {
    pub const ENCODED_LEN: usize = 56;

    pub fn validate(&self) -> Result<()> {
        validation::account_id("account_id", self.account_id)?;
        validation::sub_account_id("from_sub_account_id", self.from_sub_account_id)?;
        validation::sub_account_id("to_sub_account_id", self.to_sub_account_id)?;
        validation::target_address("to", &self.to)?;
        validation::token_id("token", self.token)?;
        validation::packable_amount("amount", &self.amount)?;
        validation::packable_fee("fee", &self.fee)?;
        validation::nonce("nonce", self.nonce)
    }
}

impl Encode for Transfer {
    fn encode(&self) -> Result<Vec<u8>> {
        ByteWriter::with_tag(TRANSFER_TX_TYPE, Self::ENCODED_LEN)
            .account(self.account_id)
            .sub_account(self.from_sub_account_id)
            .address(&self.to)
            .sub_account(self.to_sub_account_id)
            .token(self.token)
            .packed_amount(&self.amount)
            .packed_fee(&self.fee)
            .nonce(self.nonce)
            .timestamp(self.ts)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    fn sample() -> Transfer {
        Transfer {
            account_id: AccountId(10),
            from_sub_account_id: SubAccountId(1),
            to: "0xAFAFf3aD1a0425D792432D9eCD1c3e26Ef2C42E9".parse().unwrap(),
            to_sub_account_id: SubAccountId(1),
            token: TokenId(18),
            amount: BigUint::from(10_000u32),
            fee: BigUint::from(3u32),
            nonce: Nonce(1),
            ts: TimeStamp(1_693_472_232),
            signature: None,
        }
    }

    #[test]
    fn encodes_reference_vector() {
        let expected = vec![
            4, 0, 0, 0, 10, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 175, 175, 243, 173, 26, 4, 37,
            215, 146, 67, 45, 158, 205, 28, 62, 38, 239, 44, 66, 233, 1, 0, 18, 0, 0, 4, 226, 0, 0,
            96, 0, 0, 0, 1, 100, 240, 85, 232,
        ];
        let bytes = sample().encode().unwrap();
        assert_eq!(bytes.len(), Transfer::ENCODED_LEN);
        assert_eq!(bytes, expected);
    }

    #[test]
    fn recipient_sits_left_padded_in_its_word() {
        let bytes = sample().encode().unwrap();
        assert_eq!(&bytes[18..38], &hex!("afaff3ad1a0425d792432d9ecd1c3e26ef2c42e9"));
    }

    #[test]
    fn signature_is_not_encoded() {
        let mut tx = sample();
        let unsigned = tx.encode().unwrap();
        tx.signature = Some(crate::signer::L2Signer::random().sign_authorization(b"x"));
        assert_eq!(tx.encode().unwrap(), unsigned);
    }

    #[test]
    fn validation_rejects_bad_target_and_fee() {
        let mut tx = sample();
        tx.to = Address::GLOBAL_ACCOUNT;
        assert!(tx.validate().is_err());

        let mut tx = sample();
        tx.fee = BigUint::from(2048u32);
        assert!(tx.validate().is_err());

        assert!(sample().validate().is_ok());
    }

    #[test]
    fn serde_roundtrip_uses_decimal_amounts() {
        let tx = sample();
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["amount"], "10000");
        assert_eq!(json["toSubAccountId"], 1);
        assert!(json.get("signature").is_none());
        let back: Transfer = serde_json::from_value(json).unwrap();
        assert_eq!(back, tx);
    }
}
