//! The signing lifecycle as a typestate.
//!
//! A transaction moves through
//!
//! ```text
//! Built --sign_l2--> L2Signed --bind_l1* / bind_change_pubkey--> L1Bound
//!                       |                                         |
//!                       +-----------------verify------------------+--> Ready --submit--> Submission
//! ```
//!
//! Each transition consumes the previous pipeline, so calling them out of
//! order is a compile error rather than a runtime one. The runtime stage is
//! still available through [`TxPipeline::status`] for logging.
//!
//! # Example
//!
//! ```
//! use num_bigint::BigUint;
//! use rollup_protocol::config::{ChainBinding, NetworkConfig};
//! use rollup_protocol::identity::Address;
//! use rollup_protocol::signer::{L1Signer, L2Signer, PrivateKeyL1Signer};
//! use rollup_protocol::transaction::builder::TransferBuilder;
//! use rollup_protocol::transaction::messages::L1MessageContext;
//! use rollup_protocol::transaction::signing::TxPipeline;
//! use rollup_protocol::transaction::types::*;
//! use rollup_protocol::transaction::verification::VerificationContext;
//!
//! let owner = PrivateKeyL1Signer::random();
//! let l2 = L2Signer::from_l1_signer(&owner).unwrap();
//! let network = NetworkConfig::new(vec![ChainBinding {
//!     chain_id: ChainId(1),
//!     l1_client_id: 1,
//!     main_contract: Address::from_bytes([0x11; 20]),
//! }]);
//!
//! let tx = TransferBuilder {
//!     account_id: AccountId(10),
//!     from_sub_account_id: SubAccountId(1),
//!     to_address: Address::from_bytes([0x42; 20]),
//!     to_sub_account_id: SubAccountId(1),
//!     token: TokenId(18),
//!     amount: BigUint::from(10_000u32),
//!     fee: BigUint::from(3u32),
//!     nonce: Nonce(1),
//!     timestamp: TimeStamp(1_693_472_232),
//! }
//! .build()
//! .unwrap();
//!
//! let submission = TxPipeline::new(tx.into())
//!     .unwrap()
//!     .sign_l2(&l2, Some(l2.public_key_hash()))
//!     .unwrap()
//!     .bind_l1(&owner, &L1MessageContext::new("USDC"))
//!     .unwrap()
//!     .verify(&VerificationContext::new(&network).with_l1_address(owner.address()))
//!     .unwrap()
//!     .submit(&L2Signer::random());
//!
//! assert!(submission.tx_bytes_hex().starts_with("0x04"));
//! assert!(submission.l1_signature_hex().is_some());
//! ```

use std::marker::PhantomData;

use tracing::debug;

use super::auth::{ChangePubKeyAuthData, Create2Data};
use super::encoding::Encode;
use super::messages::{forced_exit_message, transfer_message, withdraw_message, L1MessageContext};
use super::tx::RollupTx;
use super::types::TxStatus;
use super::verification::{verify_ready, VerificationContext};
use crate::config::NetworkConfig;
use crate::crypto::{Eip1271Signature, L1Signature, L2Signature};
use crate::error::{ProtocolError, Result};
use crate::identity::{PubKeyHash, TxHash};
use crate::signer::{L1Signer, L2Signer};

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

/// A lifecycle stage marker.
pub trait Stage {
    const STATUS: TxStatus;
}

macro_rules! stage {
    ($($name:ident),* $(,)?) => {
        $(
            #[derive(Debug, Clone, Copy, PartialEq, Eq)]
            pub struct $name;

            impl Stage for $name {
                const STATUS: TxStatus = TxStatus::$name;
            }
        )*
    };
}

stage!(Built, L2Signed, L1Bound, Ready, Submitted);

/// How the owner of a ChangePubKey's account approves the new key.
pub enum BindingRequest<'a> {
    /// Pre-registered on the base chain.
    Onchain,
    /// The account is a CREATE2 contract whose salt commits to the key.
    Create2(Create2Data),
    /// The owner signs the EIP-712 typed data.
    Ecdsa(&'a dyn L1Signer),
}

/// The personal-sign message for a Transfer, Withdraw, or ForcedExit and
/// the owner's signature over it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct L1Binding {
    pub message: String,
    pub signature: L1Signature,
}

/// The message the L1 owner signs for `tx`, if it has one.
fn l1_message(tx: &RollupTx, ctx: &L1MessageContext) -> Result<String> {
    match tx {
        RollupTx::Transfer(tx) => Ok(transfer_message(tx, ctx)),
        RollupTx::Withdraw(tx) => Ok(withdraw_message(tx, ctx)),
        RollupTx::ForcedExit(tx) => Ok(forced_exit_message(tx, ctx)),
        RollupTx::ChangePubKey(_) => Err(ProtocolError::Binding(
            "ChangePubKey is bound with bind_change_pubkey".to_string(),
        )),
        other => Err(ProtocolError::Binding(format!(
            "{} has no L1 binding",
            other.tx_type()
        ))),
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Signatures and auth data are not encoded, so the canonical bytes are
/// fixed once the pipeline starts.
#[derive(Debug, Clone)]
pub struct TxPipeline<S> {
    tx: RollupTx,
    tx_bytes: Vec<u8>,
    tx_hash: TxHash,
    l1_binding: Option<L1Binding>,
    _stage: PhantomData<S>,
}

impl<S: Stage> TxPipeline<S> {
    pub fn status(&self) -> TxStatus {
        S::STATUS
    }

    pub fn tx(&self) -> &RollupTx {
        &self.tx
    }

    pub fn tx_hash(&self) -> TxHash {
        self.tx_hash
    }

    pub fn l1_binding(&self) -> Option<&L1Binding> {
        self.l1_binding.as_ref()
    }

    pub fn into_tx(self) -> RollupTx {
        self.tx
    }

    fn advance<T: Stage>(self) -> TxPipeline<T> {
        debug!(
            tx_type = %self.tx.tx_type(),
            from = %S::STATUS,
            to = %T::STATUS,
            "transaction advanced"
        );
        TxPipeline {
            tx: self.tx,
            tx_bytes: self.tx_bytes,
            tx_hash: self.tx_hash,
            l1_binding: self.l1_binding,
            _stage: PhantomData,
        }
    }
}

impl TxPipeline<Built> {
    /// Start the lifecycle. Priority operations are rejected: they are
    /// authorized on the base chain and never carry an L2 signature.
    pub fn new(tx: RollupTx) -> Result<Self> {
        if tx.tx_type().is_priority_op() {
            return Err(ProtocolError::invalid(
                "type",
                format!("{} is a priority operation and is not L2-signed", tx.tx_type()),
            ));
        }
        tx.validate()?;
        let tx_bytes = tx.encode()?;
        let tx_hash = TxHash::of(&tx_bytes);
        Ok(Self {
            tx,
            tx_bytes,
            tx_hash,
            l1_binding: None,
            _stage: PhantomData,
        })
    }

    /// Attach the L2 authorization signature over the transaction hash.
    ///
    /// A ChangePubKey must be signed by the key it installs. `expected` is
    /// the hash the account currently has registered, when the caller knows
    /// it.
    pub fn sign_l2(
        mut self,
        signer: &L2Signer,
        expected: Option<PubKeyHash>,
    ) -> Result<TxPipeline<L2Signed>> {
        let actual = signer.public_key_hash();
        if let Some(cpk) = self.tx.as_change_pubkey() {
            if cpk.new_pk_hash != actual {
                return Err(ProtocolError::KeyMismatch {
                    expected: cpk.new_pk_hash,
                    actual,
                });
            }
        }
        if let Some(expected) = expected {
            if expected != actual {
                return Err(ProtocolError::KeyMismatch { expected, actual });
            }
        }

        let signature = signer.sign_authorization(self.tx_hash.as_bytes());
        if !self.tx.set_signature(signature) {
            return Err(ProtocolError::invalid(
                "type",
                format!("{} cannot carry an L2 signature", self.tx.tx_type()),
            ));
        }
        Ok(self.advance())
    }
}

impl TxPipeline<L2Signed> {
    /// Have the L1 owner sign the human-readable message for a Transfer,
    /// Withdraw, or ForcedExit.
    pub fn bind_l1(
        mut self,
        l1_signer: &dyn L1Signer,
        ctx: &L1MessageContext,
    ) -> Result<TxPipeline<L1Bound>> {
        let message = l1_message(&self.tx, ctx)?;
        let signature = l1_signer.sign_message(message.as_bytes())?;
        self.l1_binding = Some(L1Binding {
            message,
            signature: L1Signature::Ecdsa(signature),
        });
        Ok(self.advance())
    }

    /// Bind with a contract wallet's EIP-1271 signature over the same
    /// message [`Self::bind_l1`] would have an EOA sign. The wallet produces
    /// the signature out of band.
    pub fn bind_l1_eip1271(
        mut self,
        signature: Eip1271Signature,
        ctx: &L1MessageContext,
    ) -> Result<TxPipeline<L1Bound>> {
        let message = l1_message(&self.tx, ctx)?;
        self.l1_binding = Some(L1Binding {
            message,
            signature: L1Signature::Eip1271(signature),
        });
        Ok(self.advance())
    }

    /// The message an L1 owner is asked to sign for this transaction.
    pub fn l1_message(&self, ctx: &L1MessageContext) -> Result<String> {
        l1_message(&self.tx, ctx)
    }

    /// Attach the owner's approval of the new key to a ChangePubKey.
    ///
    /// The auth data is not part of the canonical bytes, so the L2
    /// signature stays valid.
    pub fn bind_change_pubkey(
        mut self,
        request: BindingRequest<'_>,
        network: &NetworkConfig,
    ) -> Result<TxPipeline<L1Bound>> {
        let tx = match &mut self.tx {
            RollupTx::ChangePubKey(tx) => tx,
            other => {
                return Err(ProtocolError::Binding(format!(
                    "{} is not a ChangePubKey",
                    other.tx_type()
                )))
            }
        };
        let auth = match request {
            BindingRequest::Onchain => ChangePubKeyAuthData::Onchain,
            BindingRequest::Create2(data) => ChangePubKeyAuthData::EthCreate2 { data },
            BindingRequest::Ecdsa(signer) => {
                let digest = tx.eip712_digest(network)?;
                ChangePubKeyAuthData::EthEcdsa {
                    eth_signature: signer.sign_typed_data_hash(&digest)?,
                }
            }
        };
        tx.eth_auth_data = Some(auth);
        Ok(self.advance())
    }

    /// Run every check and mark the transaction ready. A ChangePubKey
    /// without a binding fails here.
    pub fn verify(self, ctx: &VerificationContext<'_>) -> Result<TxPipeline<Ready>> {
        verify_ready(&self.tx, self.l1_binding.as_ref(), ctx)?;
        Ok(self.advance())
    }
}

impl TxPipeline<L1Bound> {
    pub fn verify(self, ctx: &VerificationContext<'_>) -> Result<TxPipeline<Ready>> {
        verify_ready(&self.tx, self.l1_binding.as_ref(), ctx)?;
        Ok(self.advance())
    }
}

impl TxPipeline<Ready> {
    /// Co-sign as the relayer. The submitter key need not be the account's.
    pub fn submit(self, submitter: &L2Signer) -> Submission {
        let tx_hash = self.tx_hash;
        let submitter_signature = submitter.submitter_signature(&tx_hash);
        debug!(
            tx_type = %self.tx.tx_type(),
            tx_hash = %tx_hash,
            to = %Submitted::STATUS,
            "transaction submitted"
        );
        Submission {
            tx: self.tx,
            tx_bytes: self.tx_bytes,
            tx_hash,
            l1_signature: self.l1_binding.map(|b| b.signature),
            submitter_signature,
        }
    }
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

/// Everything a relayer forwards to the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    tx: RollupTx,
    tx_bytes: Vec<u8>,
    tx_hash: TxHash,
    l1_signature: Option<L1Signature>,
    submitter_signature: L2Signature,
}

impl Submission {
    pub fn status(&self) -> TxStatus {
        Submitted::STATUS
    }

    pub fn tx(&self) -> &RollupTx {
        &self.tx
    }

    pub fn tx_bytes(&self) -> &[u8] {
        &self.tx_bytes
    }

    pub fn tx_hash(&self) -> TxHash {
        self.tx_hash
    }

    pub fn l1_signature(&self) -> Option<&L1Signature> {
        self.l1_signature.as_ref()
    }

    pub fn submitter_signature(&self) -> &L2Signature {
        &self.submitter_signature
    }

    pub fn tx_bytes_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.tx_bytes))
    }

    pub fn l1_signature_hex(&self) -> Option<String> {
        self.l1_signature.as_ref().map(L1Signature::as_hex)
    }

    /// `0x` + public key + signature.
    pub fn submitter_signature_hex(&self) -> String {
        self.submitter_signature.as_hex()
    }
}
