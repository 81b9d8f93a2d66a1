//! EIP-712 typed data for the ChangePubKey binding.
//!
//! The struct and domain encoding come from `alloy-sol-types`; this module
//! only decides which values go in. The domain is the rollup's main
//! contract on the base chain a layer-2 chain settles to:
//!
//! ```text
//! digest = keccak256(0x19 0x01 || domainSeparator || hashStruct(ChangePubKey))
//! ```

use std::borrow::Cow;

use alloy_primitives::{FixedBytes, U256};
use alloy_sol_types::{sol, SolStruct};

pub use alloy_sol_types::Eip712Domain;

use crate::config::NetworkConfig;
use crate::error::Result;
use crate::identity::PubKeyHash;
use crate::transaction::types::{AccountId, ChainId, Nonce};

mod typed {
    use super::sol;

    sol! {
        struct ChangePubKey {
            bytes20 pubKeyHash;
            uint32 nonce;
            uint32 accountId;
        }
    }
}

/// The signing domain a layer-2 chain's binding signatures live under.
pub fn domain_for_chain(config: &NetworkConfig, chain_id: ChainId) -> Result<Eip712Domain> {
    let binding = config.binding_for(chain_id)?;
    Ok(Eip712Domain::new(
        Some(Cow::Owned(config.eip712_domain_name.clone())),
        Some(Cow::Owned(config.eip712_domain_version.clone())),
        Some(U256::from(binding.l1_client_id)),
        Some(binding.main_contract.into()),
        None,
    ))
}

/// The message an L1 wallet signs to authorize a new layer-2 key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangePubKeyTypedData {
    pub pub_key_hash: PubKeyHash,
    pub nonce: Nonce,
    pub account_id: AccountId,
}

impl ChangePubKeyTypedData {
    fn to_sol(self) -> typed::ChangePubKey {
        typed::ChangePubKey {
            pubKeyHash: FixedBytes::from(*self.pub_key_hash.as_bytes()),
            nonce: *self.nonce,
            accountId: *self.account_id,
        }
    }

    pub fn struct_hash(&self) -> [u8; 32] {
        self.to_sol().eip712_hash_struct().0
    }

    /// The final 32-byte digest under `domain`.
    pub fn signing_digest(&self, domain: &Eip712Domain) -> [u8; 32] {
        self.to_sol().eip712_signing_hash(domain).0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChainBinding;
    use crate::identity::Address;

    fn ether_mail_domain() -> Eip712Domain {
        let contract: Address = "0xCcCCccccCCCCcCCCCCCcCcCccCcCCCcCcccccccC".parse().unwrap();
        Eip712Domain::new(
            Some("Ether Mail".into()),
            Some("1".into()),
            Some(U256::from(1u64)),
            Some(contract.into()),
            None,
        )
    }

    #[test]
    fn domain_separator_matches_reference_example() {
        assert_eq!(
            hex::encode(ether_mail_domain().separator()),
            "f2cee375fa42b42143804025fc449deafd50cc031ca257e0b194a650a912090f"
        );
    }

    #[test]
    fn digest_composition_matches_reference_example() {
        sol! {
            struct Person {
                string name;
                address wallet;
            }
            struct Mail {
                Person from;
                Person to;
                string contents;
            }
        }
        let person = |name: &str, wallet: &str| {
            let wallet: Address = wallet.parse().unwrap();
            Person {
                name: name.to_string(),
                wallet: wallet.into(),
            }
        };
        let mail = Mail {
            from: person("Cow", "0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826"),
            to: person("Bob", "0xbBbBBBBbbBBBbbbBbbBbbbbBBbBbbbbBbBbbBBbB"),
            contents: "Hello, Bob!".to_string(),
        };
        assert_eq!(
            hex::encode(mail.eip712_signing_hash(&ether_mail_domain())),
            "be609aee343fb3c4b28e1df9e632fca64fcfaede20f02e86244efddf30957bd2"
        );
    }

    #[test]
    fn change_pubkey_type_string() {
        assert_eq!(
            typed::ChangePubKey::eip712_encode_type(),
            "ChangePubKey(bytes20 pubKeyHash,uint32 nonce,uint32 accountId)"
        );
    }

    #[test]
    fn change_pubkey_digest_depends_on_every_field() {
        let domain = ether_mail_domain();
        let base = ChangePubKeyTypedData {
            pub_key_hash: PubKeyHash::from_bytes([0xab; 20]),
            nonce: Nonce(3),
            account_id: AccountId(10),
        };
        let digest = base.signing_digest(&domain);

        let mut other = base;
        other.nonce = Nonce(4);
        assert_ne!(other.signing_digest(&domain), digest);

        let mut other = base;
        other.account_id = AccountId(11);
        assert_ne!(other.signing_digest(&domain), digest);

        let mut other = base;
        other.pub_key_hash = PubKeyHash::from_bytes([0xac; 20]);
        assert_ne!(other.signing_digest(&domain), digest);

        let mut other_domain = domain.clone();
        other_domain.chain_id = Some(U256::from(5u64));
        assert_ne!(base.signing_digest(&other_domain), digest);
    }

    #[test]
    fn domain_follows_the_chain_binding() {
        let network = NetworkConfig::new(vec![ChainBinding {
            chain_id: ChainId(1),
            l1_client_id: 56,
            main_contract: Address::from_bytes([0x22; 20]),
        }]);
        let domain = domain_for_chain(&network, ChainId(1)).unwrap();
        assert_eq!(domain.name.as_deref(), Some("ZkLink"));
        assert_eq!(domain.version.as_deref(), Some("1"));
        assert_eq!(domain.chain_id, Some(U256::from(56u64)));
        assert_eq!(
            domain.verifying_contract,
            Some(Address::from_bytes([0x22; 20]).into())
        );
        assert!(domain_for_chain(&network, ChainId(2)).is_err());
    }
}
