//! Error types shared by every layer of the crate.
//!
//! None of these are retryable: each one is a deterministic function of the
//! input, so feeding the same input back reproduces the same error. The
//! variants carry the offending field and enough of the expected/actual
//! values for a caller to fix the input without reading our source.

use thiserror::Error;

use crate::identity::PubKeyHash;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ProtocolError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Malformed hex, wrong byte length, missing `0x` prefix.
    #[error("malformed {field}: {reason}")]
    Format { field: &'static str, reason: String },

    /// A numeric field outside its bit width or allowed range, or an amount
    /// the packer cannot represent exactly.
    #[error("{field} out of range: {reason}")]
    Range { field: &'static str, reason: String },

    /// A ChangePubKey binding is missing, malformed, or does not match.
    #[error("binding error: {0}")]
    Binding(String),

    /// A signature is missing, unparsable, or does not verify.
    #[error("signature error: {0}")]
    Signature(String),

    /// The signer's public-key hash is not the one the account expects.
    #[error("key mismatch: expected public key hash {expected}, signer has {actual}")]
    KeyMismatch {
        expected: PubKeyHash,
        actual: PubKeyHash,
    },

    /// Individually valid fields that do not make sense together.
    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

impl ProtocolError {
    pub(crate) fn range(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Range {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn format(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Format {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}
