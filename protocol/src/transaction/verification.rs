//! Signature and binding checks.
//!
//! A transaction is ready for a relayer once [`verify_ready`] passes. The
//! checks run from cheapest to most expensive so an obviously broken
//! payload costs almost nothing to reject:
//!
//! 0. **Fields in range**: the transaction passes its own validation, so
//!    the hash is computed over values that fit their wire slots.
//! 1. **Signature present**: the L2 authorization signature is attached.
//! 2. **Key hash** (ChangePubKey only): the signing key hashes to `new_pk_hash`.
//! 3. **Signature valid**: Ed25519 over the transaction hash.
//! 4. **Binding** (ChangePubKey only): present, and owned by the account's L1 address.
//! 5. **L1 message signature**: recovers to the account's L1 address, if one is known.
//!
//! Relayers that receive a payload from elsewhere can call
//! [`verify_l2_signature`] and [`verify_submitter_signature`] directly.

use tracing::warn;

use super::auth::ChangePubKeyAuthData;
use super::change_pubkey::ChangePubKey;
use super::encoding::Encode;
use super::signing::L1Binding;
use super::tx::RollupTx;
use crate::config::NetworkConfig;
use crate::crypto::{L1Signature, L2Signature};
use crate::error::{ProtocolError, Result};
use crate::identity::{Address, PubKeyHash};
use crate::signer::L2Signer;

/// What the verifier needs to know beyond the transaction itself.
#[derive(Debug, Clone, Copy)]
pub struct VerificationContext<'a> {
    pub network: &'a NetworkConfig,
    /// The account's base-chain address. Required to check ECDSA and
    /// CREATE2 bindings; optional for everything else.
    pub l1_address: Option<Address>,
}

impl<'a> VerificationContext<'a> {
    pub fn new(network: &'a NetworkConfig) -> Self {
        Self {
            network,
            l1_address: None,
        }
    }

    pub fn with_l1_address(mut self, address: Address) -> Self {
        self.l1_address = Some(address);
        self
    }
}

/// Checks 0 to 3: the fields are valid, the L2 signature is present, from
/// the right key for a ChangePubKey, and valid over the transaction hash.
pub fn verify_l2_signature(tx: &RollupTx) -> Result<()> {
    tx.validate()?;
    let signature = tx.signature().ok_or_else(|| {
        ProtocolError::Signature(format!("{} carries no L2 signature", tx.tx_type()))
    })?;

    if let Some(cpk) = tx.as_change_pubkey() {
        let actual = PubKeyHash::from_pubkey(&signature.pub_key);
        if actual != cpk.new_pk_hash {
            return Err(ProtocolError::KeyMismatch {
                expected: cpk.new_pk_hash,
                actual,
            });
        }
    }

    if !L2Signer::verify(signature, tx.tx_hash()?.as_bytes()) {
        return Err(ProtocolError::Signature(format!(
            "L2 signature does not verify for {}",
            tx.tx_type()
        )));
    }
    Ok(())
}

/// The relayer's co-signature covers the same hash as the L2 signature.
pub fn verify_submitter_signature(tx: &RollupTx, signature: &L2Signature) -> Result<()> {
    tx.validate()?;
    if !L2Signer::verify(signature, tx.tx_hash()?.as_bytes()) {
        return Err(ProtocolError::Signature(
            "submitter signature does not verify".to_string(),
        ));
    }
    Ok(())
}

/// Check 4: the base-chain owner agreed to the new key.
pub fn verify_change_pubkey_binding(
    tx: &ChangePubKey,
    network: &NetworkConfig,
    l1_address: Option<Address>,
) -> Result<()> {
    let auth = tx
        .eth_auth_data
        .as_ref()
        .ok_or_else(|| ProtocolError::Binding("ChangePubKey has no binding".to_string()))?;

    let owner = match auth {
        ChangePubKeyAuthData::Onchain => return Ok(()),
        ChangePubKeyAuthData::EthEcdsa { eth_signature } => {
            let digest = tx.eip712_digest(network)?;
            eth_signature
                .recover_typed_data_signer(&digest)
                .map_err(|e| ProtocolError::Binding(format!("unrecoverable signature: {}", e)))?
        }
        ChangePubKeyAuthData::EthCreate2 { data } => data.address(&tx.new_pk_hash),
    };

    let expected = l1_address.ok_or_else(|| {
        ProtocolError::Binding("the account's L1 address is needed to check the binding".to_string())
    })?;
    if owner != expected {
        return Err(ProtocolError::Binding(format!(
            "binding belongs to {}, account is owned by {}",
            owner, expected
        )));
    }
    Ok(())
}

/// Check 5. An EIP-1271 signature can only be checked by the wallet
/// contract, so off chain it must merely be non-empty.
fn verify_l1_binding(binding: &L1Binding, l1_address: Option<Address>) -> Result<()> {
    let signature = match &binding.signature {
        L1Signature::Ecdsa(signature) => signature,
        L1Signature::Eip1271(signature) => {
            if signature.0.is_empty() {
                return Err(ProtocolError::Signature(
                    "EIP-1271 signature is empty".to_string(),
                ));
            }
            return Ok(());
        }
    };
    let signer = signature
        .signature_recover_signer(binding.message.as_bytes())
        .map_err(|e| ProtocolError::Signature(format!("L1 signature: {}", e)))?;
    if let Some(expected) = l1_address {
        if signer != expected {
            return Err(ProtocolError::Signature(format!(
                "L1 signature is from {}, expected {}",
                signer, expected
            )));
        }
    }
    Ok(())
}

/// Every check, in order. Failures are logged at `warn`.
pub fn verify_ready(
    tx: &RollupTx,
    l1_binding: Option<&L1Binding>,
    ctx: &VerificationContext<'_>,
) -> Result<()> {
    let result = run_checks(tx, l1_binding, ctx);
    if let Err(err) = &result {
        warn!(
            tx_type = %tx.tx_type(),
            tx_hash = ?tx.tx_hash().ok(),
            error = %err,
            "transaction failed verification"
        );
    }
    result
}

fn run_checks(
    tx: &RollupTx,
    l1_binding: Option<&L1Binding>,
    ctx: &VerificationContext<'_>,
) -> Result<()> {
    verify_l2_signature(tx)?;
    if let Some(cpk) = tx.as_change_pubkey() {
        verify_change_pubkey_binding(cpk, ctx.network, ctx.l1_address)?;
    }
    if let Some(binding) = l1_binding {
        verify_l1_binding(binding, ctx.l1_address)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChainBinding;
    use crate::signer::{L1Signer, PrivateKeyL1Signer};
    use crate::crypto::Eip1271Signature;
    use crate::transaction::auth::Create2Data;
    use crate::transaction::transfer::Transfer;
    use crate::transaction::types::{
        AccountId, ChainId, Nonce, SubAccountId, TimeStamp, TokenId,
    };
    use num_bigint::BigUint;

    fn network() -> NetworkConfig {
        NetworkConfig::new(vec![ChainBinding {
            chain_id: ChainId(1),
            l1_client_id: 1,
            main_contract: Address::from_bytes([0x11; 20]),
        }])
    }

    fn change_pubkey(new_pk_hash: PubKeyHash) -> ChangePubKey {
        ChangePubKey {
            chain_id: ChainId(1),
            account_id: AccountId(2),
            sub_account_id: SubAccountId(0),
            new_pk_hash,
            fee_token: TokenId(18),
            fee: BigUint::from(0u32),
            nonce: Nonce(0),
            ts: TimeStamp(1_700_000_000),
            eth_auth_data: None,
            signature: None,
        }
    }

    fn signed(signer: &L2Signer, tx: ChangePubKey) -> RollupTx {
        let mut tx = RollupTx::from(tx);
        let sig = signer.sign_authorization(tx.tx_hash().unwrap().as_bytes());
        tx.set_signature(sig);
        tx
    }

    #[test]
    fn unsigned_is_a_signature_error() {
        let tx = RollupTx::from(change_pubkey(PubKeyHash::from_bytes([1; 20])));
        assert!(matches!(
            verify_l2_signature(&tx),
            Err(ProtocolError::Signature(_))
        ));
    }

    #[test]
    fn change_pubkey_must_be_signed_by_the_new_key() {
        let signer = L2Signer::random();
        let tx = signed(&signer, change_pubkey(PubKeyHash::from_bytes([1; 20])));
        assert!(matches!(
            verify_l2_signature(&tx),
            Err(ProtocolError::KeyMismatch { .. })
        ));

        let tx = signed(&signer, change_pubkey(signer.public_key_hash()));
        assert!(verify_l2_signature(&tx).is_ok());
    }

    #[test]
    fn ecdsa_binding_must_come_from_the_owner() {
        let owner = PrivateKeyL1Signer::random();
        let mut tx = change_pubkey(PubKeyHash::from_bytes([7; 20]));
        let digest = tx.eip712_digest(&network()).unwrap();
        tx.eth_auth_data = Some(ChangePubKeyAuthData::EthEcdsa {
            eth_signature: owner.sign_typed_data_hash(&digest).unwrap(),
        });

        assert!(verify_change_pubkey_binding(&tx, &network(), Some(owner.address())).is_ok());

        let stranger = PrivateKeyL1Signer::random().address();
        assert!(matches!(
            verify_change_pubkey_binding(&tx, &network(), Some(stranger)),
            Err(ProtocolError::Binding(_))
        ));
        assert!(verify_change_pubkey_binding(&tx, &network(), None).is_err());
    }

    #[test]
    fn create2_binding_derives_the_owner() {
        let pk_hash = PubKeyHash::from_bytes([7; 20]);
        let data = Create2Data {
            creator_address: Address::from_bytes([1; 20]),
            salt_arg: [2; 32],
            code_hash: [3; 32],
        };
        let mut tx = change_pubkey(pk_hash);
        tx.eth_auth_data = Some(ChangePubKeyAuthData::EthCreate2 { data });

        let owner = data.address(&pk_hash);
        assert!(verify_change_pubkey_binding(&tx, &network(), Some(owner)).is_ok());

        let other_salt = Create2Data {
            salt_arg: [9; 32],
            ..data
        };
        tx.eth_auth_data = Some(ChangePubKeyAuthData::EthCreate2 { data: other_salt });
        assert!(verify_change_pubkey_binding(&tx, &network(), Some(owner)).is_err());
    }

    #[test]
    fn onchain_binding_passes_without_an_address() {
        let mut tx = change_pubkey(PubKeyHash::from_bytes([7; 20]));
        assert!(verify_change_pubkey_binding(&tx, &network(), None).is_err());
        tx.eth_auth_data = Some(ChangePubKeyAuthData::Onchain);
        assert!(verify_change_pubkey_binding(&tx, &network(), None).is_ok());
    }

    #[test]
    fn submitter_signature_covers_the_tx_hash() {
        let signer = L2Signer::random();
        let tx = signed(&signer, change_pubkey(signer.public_key_hash()));
        let relayer = L2Signer::random();
        let co_sig = relayer.submitter_signature(&tx.tx_hash().unwrap());
        assert!(verify_submitter_signature(&tx, &co_sig).is_ok());

        let wrong = relayer.sign_authorization(b"something else");
        assert!(verify_submitter_signature(&tx, &wrong).is_err());
    }

    fn transfer(token: TokenId) -> Transfer {
        Transfer {
            account_id: AccountId(10),
            from_sub_account_id: SubAccountId(1),
            to: Address::from_bytes([0x42; 20]),
            to_sub_account_id: SubAccountId(1),
            token,
            amount: BigUint::from(10_000u32),
            fee: BigUint::from(3u32),
            nonce: Nonce(1),
            ts: TimeStamp(1_693_472_232),
            signature: None,
        }
    }

    #[test]
    fn out_of_range_token_does_not_reuse_a_valid_signature() {
        // 65554 = 65536 + 18: truncated to two bytes it would hash as token 18.
        let signer = L2Signer::random();
        let mut honest = RollupTx::from(transfer(TokenId(18)));
        let sig = signer.sign_authorization(honest.tx_hash().unwrap().as_bytes());
        honest.set_signature(sig);
        assert!(verify_l2_signature(&honest).is_ok());

        let mut forged = RollupTx::from(transfer(TokenId(65_554)));
        forged.set_signature(sig);
        assert!(matches!(
            verify_l2_signature(&forged),
            Err(ProtocolError::Range { .. })
        ));
        assert!(forged.encode().is_err());

        let co_sig = L2Signer::random().submitter_signature(&honest.tx_hash().unwrap());
        assert!(matches!(
            verify_submitter_signature(&forged, &co_sig),
            Err(ProtocolError::Range { .. })
        ));
    }

    #[test]
    fn eip1271_binding_is_structural() {
        let binding = L1Binding {
            message: "Transfer 1.0 USDC".to_string(),
            signature: L1Signature::Eip1271(Eip1271Signature(vec![1, 2, 3])),
        };
        let anyone = Address::from_bytes([5; 20]);
        assert!(verify_l1_binding(&binding, Some(anyone)).is_ok());

        let empty = L1Binding {
            signature: L1Signature::Eip1271(Eip1271Signature(Vec::new())),
            ..binding
        };
        assert!(matches!(
            verify_l1_binding(&empty, None),
            Err(ProtocolError::Signature(_))
        ));
    }
}
