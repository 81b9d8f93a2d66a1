//! # Protocol Configuration & Constants
//!
//! Every magic number of the wire format lives here. The bit widths below
//! are a versioned protocol constant: the operator's circuits decode the
//! exact same layout, so changing any of them is a hard fork, not a patch.
//!
//! The second half of the file is the runtime side: [`NetworkConfig`], the
//! table that maps each layer-2 chain id to the L1 client id and main
//! contract used in EIP-712 binding signatures. That one is loaded from
//! JSON because it differs between mainnet, testnet, and your laptop.

use serde::{Deserialize, Serialize};

use crate::error::{ProtocolError, Result};
use crate::identity::Address;
use crate::transaction::types::ChainId;

// ---------------------------------------------------------------------------
// Protocol Version
// ---------------------------------------------------------------------------

/// Version of the wire layout described by the constants in this file.
pub const WIRE_FORMAT_VERSION: u16 = 1;

// ---------------------------------------------------------------------------
// Identifier Widths & Limits
// ---------------------------------------------------------------------------

pub const CHAIN_ID_BIT_WIDTH: usize = 8;
pub const ACCOUNT_ID_BIT_WIDTH: usize = 32;
pub const SUB_ACCOUNT_ID_BIT_WIDTH: usize = 8;
pub const TOKEN_BIT_WIDTH: usize = 16;
pub const PAIR_BIT_WIDTH: usize = 8;
pub const SLOT_BIT_WIDTH: usize = 16;
pub const NONCE_BIT_WIDTH: usize = 32;
pub const ORDER_NONCE_BIT_WIDTH: usize = 24;
pub const TIMESTAMP_BIT_WIDTH: usize = 32;
pub const TX_TYPE_BIT_WIDTH: usize = 8;

/// Depth of the account subtree. Account ids above `2^24 - 1` do not exist.
pub const USED_ACCOUNT_SUBTREE_DEPTH: u32 = 24;
pub const MAX_ACCOUNT_ID: u32 = (1 << USED_ACCOUNT_SUBTREE_DEPTH) - 1;

/// Account 1 holds the global asset pool and can never sign anything.
pub const GLOBAL_ASSET_ACCOUNT_ID: u32 = 1;

pub const SUB_ACCOUNT_TREE_DEPTH: u32 = 5;
pub const MAX_SUB_ACCOUNT_ID: u8 = (1 << SUB_ACCOUNT_TREE_DEPTH) - 1;

/// Chains share the sub-account tree depth.
pub const MAX_CHAIN_ID: u8 = (1 << SUB_ACCOUNT_TREE_DEPTH) - 1;

pub const MAX_TOKEN_ID: u32 = (1 << TOKEN_BIT_WIDTH) - 1;

/// Token 1 is USD. Ids 2 through 16 are reserved for USD-pegged variants
/// that only exist inside the rollup and can never be referenced by users.
pub const USD_TOKEN_ID: u32 = 1;
pub const USDX_TOKEN_ID_LOWER_BOUND: u32 = USD_TOKEN_ID + 1;
pub const USDX_TOKEN_ID_UPPER_BOUND: u32 = 16;

pub const MAX_SLOT_ID: u32 = (1 << SLOT_BIT_WIDTH) - 1;

/// Account nonces are strictly below `u32::MAX`; the top value is a
/// sentinel the operator uses for "nonce exhausted".
pub const MAX_NONCE: u32 = u32::MAX;

/// Order and contract nonces are stored in 24 bits.
pub const MAX_ORDER_NONCE: u32 = 1 << ORDER_NONCE_BIT_WIDTH;

/// Number of perpetual contract pairs. Pair ids live in `0..USED_POSITION_NUMBER`.
pub const USED_POSITION_NUMBER: usize = 32;

/// Number of tokens usable as margin.
pub const MARGIN_TOKENS_NUMBER: usize = 8;

/// Upper bound on maker legs in one contract matching.
pub const MAX_CONTRACT_MAKERS: usize = 16;

/// Upper bound on accounts settled by one funding transaction.
pub const MAX_FUNDING_ACCOUNTS: usize = u16::MAX as usize;

// ---------------------------------------------------------------------------
// Amounts & Prices
// ---------------------------------------------------------------------------

/// Token amounts: 35-bit mantissa, 5-bit decimal exponent. 5 bytes on the wire.
pub const AMOUNT_MANTISSA_BIT_WIDTH: usize = 35;
pub const AMOUNT_EXPONENT_BIT_WIDTH: usize = 5;
pub const AMOUNT_BIT_WIDTH: usize = AMOUNT_MANTISSA_BIT_WIDTH + AMOUNT_EXPONENT_BIT_WIDTH;

/// Fees: 11-bit mantissa, 5-bit decimal exponent. 2 bytes on the wire.
pub const FEE_MANTISSA_BIT_WIDTH: usize = 11;
pub const FEE_EXPONENT_BIT_WIDTH: usize = 5;
pub const FEE_BIT_WIDTH: usize = FEE_MANTISSA_BIT_WIDTH + FEE_EXPONENT_BIT_WIDTH;

/// Unpacked balances (withdraw amounts, expected trade amounts) are u128.
pub const BALANCE_BIT_WIDTH: usize = 128;

/// Packed exponents are powers of ten.
pub const PACKING_EXPONENT_BASE: u32 = 10;

pub const PRICE_BIT_WIDTH: usize = 120;
pub const PRICE_BYTES: usize = PRICE_BIT_WIDTH / 8;

/// Order and contract prices must satisfy `MIN_PRICE < price < MAX_PRICE`.
pub const MIN_PRICE: u128 = 1;
pub const MAX_PRICE: u128 = 1_329_227_995_784_915_872_000_000_000_000_000_000;

/// Withdraw fee ratio is expressed in basis points of this denominator.
pub const WITHDRAW_FEE_RATIO_DENOMINATOR: u16 = 10_000;

/// Contract symbols are NUL-padded to this many bytes in `UpdateGlobalVar`.
pub const PAIR_SYMBOL_BYTES: usize = 15;

/// Decimal precision used when rendering amounts in L1 messages.
pub const TOKEN_MAX_PRECISION: u8 = 18;

// ---------------------------------------------------------------------------
// Addresses & Keys
// ---------------------------------------------------------------------------

pub const ADDRESS_BYTES: usize = 20;

/// Addresses occupy a full 32-byte slot on the wire, left-padded with zeros.
pub const LAYER1_ADDR_BIT_WIDTH: usize = 256;

pub const PUBKEY_HASH_BYTES: usize = 20;
pub const TX_HASH_BYTES: usize = 32;

pub const L2_PUBLIC_KEY_BYTES: usize = 32;
pub const L2_SIGNATURE_BYTES: usize = 64;
pub const ETH_SIGNATURE_BYTES: usize = 65;

/// Message an L1 wallet signs to deterministically derive its layer-2 key.
pub const L2_KEY_DERIVATION_MESSAGE: &str = "Sign this message to create a key to interact with the rollup's layer2 services.\nNOTE: This application is powered by the rollup protocol.\n\nOnly sign this message for a trusted client!";

// ---------------------------------------------------------------------------
// Transaction Tags
// ---------------------------------------------------------------------------

pub const DEPOSIT_TX_TYPE: u8 = 0x01;
pub const WITHDRAW_TX_TYPE: u8 = 0x03;
pub const TRANSFER_TX_TYPE: u8 = 0x04;
pub const FULL_EXIT_TX_TYPE: u8 = 0x05;
pub const CHANGE_PUBKEY_TX_TYPE: u8 = 0x06;
pub const FORCED_EXIT_TX_TYPE: u8 = 0x07;
pub const ORDER_MATCHING_TX_TYPE: u8 = 0x08;
pub const CONTRACT_MATCHING_TX_TYPE: u8 = 0x09;
pub const LIQUIDATION_TX_TYPE: u8 = 0x0a;
pub const AUTO_DELEVERAGING_TX_TYPE: u8 = 0x0b;
pub const UPDATE_GLOBAL_VAR_TX_TYPE: u8 = 0x0c;
pub const FUNDING_TX_TYPE: u8 = 0x0d;

/// Sub-leg message tags. They sit at the top of the byte range so they can
/// never be confused with a transaction tag.
pub const ORDER_MSG_TYPE: u8 = 0xff;
pub const CONTRACT_MSG_TYPE: u8 = 0xfe;

// ---------------------------------------------------------------------------
// EIP-712
// ---------------------------------------------------------------------------

pub const DEFAULT_EIP712_DOMAIN_NAME: &str = "ZkLink";
pub const DEFAULT_EIP712_DOMAIN_VERSION: &str = "1";

// ---------------------------------------------------------------------------
// Network Configuration
// ---------------------------------------------------------------------------

/// The L1 side of one layer-2 chain: which base chain it settles on and
/// which contract verifies its binding signatures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainBinding {
    /// Layer-2 chain id, as it appears in transactions.
    pub chain_id: ChainId,
    /// EIP-155 chain id of the base chain (the "L1 client id").
    pub l1_client_id: u32,
    /// Main rollup contract on that base chain; the EIP-712 verifying contract.
    pub main_contract: Address,
}

/// Runtime network parameters.
///
/// ```
/// use rollup_protocol::config::NetworkConfig;
///
/// let json = r#"{
///     "chains": [
///         { "chainId": 1, "l1ClientId": 5, "mainContract": "0x0000000000000000000000000000000000000001" }
///     ]
/// }"#;
/// let config = NetworkConfig::from_json_str(json).unwrap();
/// assert_eq!(config.binding_for(1.into()).unwrap().l1_client_id, 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    #[serde(default = "default_domain_name")]
    pub eip712_domain_name: String,
    #[serde(default = "default_domain_version")]
    pub eip712_domain_version: String,
    pub chains: Vec<ChainBinding>,
}

fn default_domain_name() -> String {
    DEFAULT_EIP712_DOMAIN_NAME.to_string()
}

fn default_domain_version() -> String {
    DEFAULT_EIP712_DOMAIN_VERSION.to_string()
}

impl NetworkConfig {
    /// A config with the default EIP-712 domain and the given chains.
    pub fn new(chains: Vec<ChainBinding>) -> Self {
        Self {
            eip712_domain_name: default_domain_name(),
            eip712_domain_version: default_domain_version(),
            chains,
        }
    }

    /// Parse a JSON document. Duplicate chain ids are rejected, since the
    /// lookup would otherwise silently pick the first one.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| ProtocolError::Format {
            field: "network_config",
            reason: e.to_string(),
        })?;
        for (i, binding) in config.chains.iter().enumerate() {
            if config.chains[..i]
                .iter()
                .any(|other| other.chain_id == binding.chain_id)
            {
                return Err(ProtocolError::InvalidField {
                    field: "chains",
                    reason: format!("chain {} configured twice", binding.chain_id),
                });
            }
        }
        Ok(config)
    }

    /// Look up the L1 binding of a layer-2 chain.
    pub fn binding_for(&self, chain_id: ChainId) -> Result<&ChainBinding> {
        self.chains
            .iter()
            .find(|binding| binding.chain_id == chain_id)
            .ok_or_else(|| {
                ProtocolError::Binding(format!("no L1 binding configured for chain {}", chain_id))
            })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
