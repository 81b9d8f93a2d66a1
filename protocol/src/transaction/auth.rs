//! How an L1 account authorizes a new layer-2 key.
//!
//! A ChangePubKey only takes effect if the account's base-chain owner agreed
//! to it. There are exactly three ways to show that:
//!
//! | Strategy     | Evidence                                                  |
//! |--------------|-----------------------------------------------------------|
//! | `Onchain`    | The owner pre-registered the key hash in the main contract |
//! | `EthEcdsa`   | An EIP-712 signature over `{pubKeyHash, nonce, accountId}` |
//! | `EthCreate2` | The account is a CREATE2 contract whose salt commits to the key hash |
//!
//! The strategy also determines the witness bytes the operator forwards to
//! the main contract, see [`ChangePubKeyAuthData::eth_witness`].

use serde::{Deserialize, Serialize};

use super::types::hex_bytes32;
use crate::crypto::hash::keccak256_multi;
use crate::crypto::PackedEthSignature;
use crate::identity::{Address, PubKeyHash};

/// Witness prefix for an ECDSA binding.
const ECDSA_WITNESS_TAG: u8 = 0x00;
/// Witness prefix for a CREATE2 binding.
const CREATE2_WITNESS_TAG: u8 = 0x01;

/// The deployment parameters of a CREATE2 account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Create2Data {
    pub creator_address: Address,
    #[serde(with = "hex_bytes32")]
    pub salt_arg: [u8; 32],
    #[serde(with = "hex_bytes32")]
    pub code_hash: [u8; 32],
}

impl Create2Data {
    /// `keccak256(salt_arg || pub_key_hash)`.
    pub fn salt(&self, pub_key_hash: &PubKeyHash) -> [u8; 32] {
        keccak256_multi(&[&self.salt_arg, pub_key_hash.as_bytes()])
    }

    /// The address CREATE2 deploys to when the salt commits to `pub_key_hash`.
    pub fn address(&self, pub_key_hash: &PubKeyHash) -> Address {
        let creator = alloy_primitives::Address::from(self.creator_address);
        creator
            .create2(self.salt(pub_key_hash), self.code_hash)
            .into()
    }
}

/// The binding strategy attached to a ChangePubKey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ChangePubKeyAuthData {
    Onchain,
    EthEcdsa {
        #[serde(rename = "ethSignature")]
        eth_signature: PackedEthSignature,
    },
    EthCreate2 { data: Create2Data },
}

impl ChangePubKeyAuthData {
    pub fn is_onchain(&self) -> bool {
        matches!(self, Self::Onchain)
    }

    pub fn is_eth_ecdsa(&self) -> bool {
        matches!(self, Self::EthEcdsa { .. })
    }

    pub fn is_create2(&self) -> bool {
        matches!(self, Self::EthCreate2 { .. })
    }

    /// Bytes handed to the main contract alongside the operation.
    ///
    /// Empty for `Onchain`, `0x00 || r || s || v` for ECDSA and
    /// `0x01 || creator || salt_arg || code_hash` for CREATE2.
    pub fn eth_witness(&self) -> Vec<u8> {
        match self {
            Self::Onchain => Vec::new(),
            Self::EthEcdsa { eth_signature } => {
                let mut out = Vec::with_capacity(66);
                out.push(ECDSA_WITNESS_TAG);
                out.extend_from_slice(&eth_signature.serialize_packed());
                out
            }
            Self::EthCreate2 { data } => {
                let mut out = Vec::with_capacity(85);
                out.push(CREATE2_WITNESS_TAG);
                out.extend_from_slice(data.creator_address.as_bytes());
                out.extend_from_slice(&data.salt_arg);
                out.extend_from_slice(&data.code_hash);
                out
            }
        }
    }
}
