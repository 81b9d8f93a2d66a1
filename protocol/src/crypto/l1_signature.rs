//! Base-chain signatures attached to an L1 binding.
//!
//! An externally owned account signs with ECDSA and the signer is recovered
//! from the signature. A smart-contract wallet instead answers
//! `isValidSignature` (EIP-1271) on chain; its signature is an opaque blob
//! whose meaning only the wallet contract knows.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::eth::PackedEthSignature;
use crate::error::{ProtocolError, Result};

/// The opaque signature of a contract wallet.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Eip1271Signature(pub Vec<u8>);

impl Eip1271Signature {
    pub fn as_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.0))
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        let digits = s
            .strip_prefix("0x")
            .ok_or_else(|| ProtocolError::format("eip1271_signature", "missing 0x prefix"))?;
        hex::decode(digits)
            .map(Self)
            .map_err(|e| ProtocolError::format("eip1271_signature", e.to_string()))
    }
}

impl fmt::Debug for Eip1271Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Eip1271Signature({})", self.as_hex())
    }
}

impl fmt::Display for Eip1271Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EIP1271Signature {}", self.as_hex())
    }
}

impl Serialize for Eip1271Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_hex())
    }
}

impl<'de> Deserialize<'de> for Eip1271Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// What the L1 owner produced over the binding message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "signature")]
pub enum L1Signature {
    #[serde(rename = "EthereumSignature")]
    Ecdsa(PackedEthSignature),
    #[serde(rename = "EIP1271Signature")]
    Eip1271(Eip1271Signature),
}

impl L1Signature {
    pub fn is_eip1271(&self) -> bool {
        matches!(self, Self::Eip1271(_))
    }

    pub fn as_ecdsa(&self) -> Option<&PackedEthSignature> {
        match self {
            Self::Ecdsa(sig) => Some(sig),
            Self::Eip1271(_) => None,
        }
    }

    pub fn as_hex(&self) -> String {
        match self {
            Self::Ecdsa(sig) => sig.as_hex(),
            Self::Eip1271(sig) => sig.as_hex(),
        }
    }
}

impl From<PackedEthSignature> for L1Signature {
    fn from(sig: PackedEthSignature) -> Self {
        Self::Ecdsa(sig)
    }
}

impl From<Eip1271Signature> for L1Signature {
    fn from(sig: Eip1271Signature) -> Self {
        Self::Eip1271(sig)
    }
}
