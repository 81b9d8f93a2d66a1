//! Registering a new layer-2 key for an account.

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use super::auth::ChangePubKeyAuthData;
use super::encoding::{ByteWriter, Encode};
use super::types::{biguint_str, AccountId, ChainId, Nonce, SubAccountId, TimeStamp, TokenId};
use super::validation;
use crate::config::{NetworkConfig, CHANGE_PUBKEY_TX_TYPE};
use crate::crypto::eip712::domain_for_chain;
use crate::crypto::{ChangePubKeyTypedData, L2Signature};
use crate::error::Result;
use crate::identity::PubKeyHash;

/// Sets the account's public-key hash to `new_pk_hash`.
///
/// The L2 signature must come from the *new* key, which proves the sender
/// actually holds it. The base-chain owner's consent travels separately in
/// `eth_auth_data` and is not part of the canonical bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePubKey {
    /// Also selects the EIP-712 domain of the binding signature.
    pub chain_id: ChainId,
    pub account_id: AccountId,
    pub sub_account_id: SubAccountId,
    pub new_pk_hash: PubKeyHash,
    pub fee_token: TokenId,
    #[serde(with = "biguint_str")]
    pub fee: BigUint,
    pub nonce: Nonce,
    pub ts: TimeStamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eth_auth_data: Option<ChangePubKeyAuthData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<L2Signature>,
}

impl ChangePubKey {
    pub const ENCODED_LEN: usize = 39;

    pub fn validate(&self) -> Result<()> {
        validation::chain_id("chain_id", self.chain_id)?;
        validation::account_id("account_id", self.account_id)?;
        validation::sub_account_id("sub_account_id", self.sub_account_id)?;
        validation::token_id("fee_token", self.fee_token)?;
        validation::packable_fee("fee", &self.fee)?;
        validation::nonce("nonce", self.nonce)
    }

    /// The EIP-712 message the base-chain owner signs.
    pub fn typed_data(&self) -> ChangePubKeyTypedData {
        ChangePubKeyTypedData {
            pub_key_hash: self.new_pk_hash,
            nonce: self.nonce,
            account_id: self.account_id,
        }
    }

    /// Digest of [`Self::typed_data`] under this chain's domain.
    pub fn eip712_digest(&self, network: &NetworkConfig) -> Result<[u8; 32]> {
        let domain = domain_for_chain(network, self.chain_id)?;
        Ok(self.typed_data().signing_digest(&domain))
    }
}

impl Encode for ChangePubKey {
    fn encode(&self) -> Result<Vec<u8>> {
        ByteWriter::with_tag(CHANGE_PUBKEY_TX_TYPE, Self::ENCODED_LEN)
            .chain(self.chain_id)
            .account(self.account_id)
            .sub_account(self.sub_account_id)
            .pub_key_hash(&self.new_pk_hash)
            .token(self.fee_token)
            .packed_fee(&self.fee)
            .nonce(self.nonce)
            .timestamp(self.ts)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChainBinding;
    use crate::identity::Address;

    fn sample() -> ChangePubKey {
        ChangePubKey {
            chain_id: ChainId(1),
            account_id: AccountId(2),
            sub_account_id: SubAccountId(4),
            new_pk_hash: PubKeyHash::from_bytes([0xab; 20]),
            fee_token: TokenId(18),
            fee: BigUint::from(100u32),
            nonce: Nonce(3),
            ts: TimeStamp(1_693_472_232),
            eth_auth_data: None,
            signature: None,
        }
    }

    #[test]
    fn layout() {
        let bytes = sample().encode().unwrap();
        assert_eq!(bytes.len(), ChangePubKey::ENCODED_LEN);
        assert_eq!(&bytes[..7], &[6, 1, 0, 0, 0, 2, 4]);
        assert_eq!(&bytes[7..27], &[0xab; 20]);
        assert_eq!(&bytes[27..31], &[0, 18, 12, 128]);
        assert_eq!(&bytes[31..35], &[0, 0, 0, 3]);
    }

    #[test]
    fn auth_data_is_not_encoded() {
        let mut tx = sample();
        let before = tx.encode().unwrap();
        tx.eth_auth_data = Some(ChangePubKeyAuthData::Onchain);
        assert_eq!(tx.encode().unwrap(), before);
    }

    #[test]
    fn digest_follows_chain_binding() {
        let network = NetworkConfig::new(vec![
            ChainBinding {
                chain_id: ChainId(1),
                l1_client_id: 1,
                main_contract: Address::from_bytes([0x11; 20]),
            },
            ChainBinding {
                chain_id: ChainId(2),
                l1_client_id: 56,
                main_contract: Address::from_bytes([0x22; 20]),
            },
        ]);
        let tx = sample();
        let on_chain_1 = tx.eip712_digest(&network).unwrap();

        let mut other = sample();
        other.chain_id = ChainId(2);
        assert_ne!(other.eip712_digest(&network).unwrap(), on_chain_1);

        let mut unknown = sample();
        unknown.chain_id = ChainId(9);
        assert!(unknown.eip712_digest(&network).is_err());
    }
}
