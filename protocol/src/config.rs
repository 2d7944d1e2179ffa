//! # Vault Configuration & Constants
//!
//! Every magic number the vault depends on lives here, next to the
//! deploy-time [`VaultConfig`] that names who holds which role.
//!
//! The fee cap and the price precision are consensus-critical in the sense
//! that changing them changes what every depositor gets back. Treat edits
//! here like a contract upgrade.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::address::Address;

// ---------------------------------------------------------------------------
// Fee Parameters
// ---------------------------------------------------------------------------

/// Basis-point denominator. 10_000 bps = 100%.
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Exclusive upper bound on the withdrawal fee, in basis points.
///
/// A fee of exactly this value is rejected. 100 bps is 1%, which is already
/// more than anyone should pay to leave a vault.
pub const MAX_WITHDRAWAL_FEE_BPS: u64 = 100;

/// Withdrawal fee a freshly created vault starts with.
pub const DEFAULT_WITHDRAWAL_FEE_BPS: u64 = 0;

// ---------------------------------------------------------------------------
// Share Pricing
// ---------------------------------------------------------------------------

/// Fixed-point scale of the price-per-share views. A price of
/// `PRICE_PRECISION` means one share redeems for exactly one asset unit.
pub const PRICE_PRECISION: u128 = 1_000_000_000_000_000_000;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Label the default vault address is derived from.
pub const DEFAULT_VAULT_LABEL: &str = "sett-vault";

/// Symbol used for the underlying asset when a config doesn't name one.
pub const DEFAULT_ASSET_SYMBOL: &str = "WANT";

/// Asset units minted to governance when a simulation doesn't say
/// otherwise.
pub const DEFAULT_GENESIS_SUPPLY: u64 = 1_000_000_000_000;

/// Protocol version string reported by the CLI.
pub const PROTOCOL_VERSION: &str = "0.1.0";

// ---------------------------------------------------------------------------
// VaultConfig
// ---------------------------------------------------------------------------

/// Errors raised while loading or validating a [`VaultConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The initial withdrawal fee is at or above [`MAX_WITHDRAWAL_FEE_BPS`].
    #[error("withdrawal fee {requested} bps must be below {max} bps")]
    FeeTooHigh {
        /// The configured fee.
        requested: u64,
        /// The exclusive cap.
        max: u64,
    },

    /// The governance slot was left as the zero address.
    #[error("governance must not be the zero address")]
    ZeroGovernance,

    /// The JSON document could not be parsed.
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Deploy-time parameters of a vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultConfig {
    /// The vault's own address on the asset ledger.
    #[serde(default = "default_vault_address")]
    pub vault: Address,
    /// Sole holder of unpause, fee and allowlist authority.
    pub governance: Address,
    /// Emergency brake: may pause, nothing else.
    pub guardian: Address,
    /// Strategy operator. Carries no vault-level privileges.
    pub strategist: Address,
    /// Automation operator. Carries no vault-level privileges.
    pub keeper: Address,
    /// Ticker of the underlying asset, for logs.
    #[serde(default = "default_asset_symbol")]
    pub asset_symbol: String,
    /// Initial withdrawal fee in basis points.
    #[serde(default)]
    pub withdrawal_fee_bps: u64,
}

fn default_vault_address() -> Address {
    Address::derive(DEFAULT_VAULT_LABEL)
}

fn default_asset_symbol() -> String {
    DEFAULT_ASSET_SYMBOL.to_string()
}

impl VaultConfig {
    /// Builds a config with the default vault address, asset symbol and a
    /// zero withdrawal fee.
    pub fn new(governance: Address, guardian: Address, strategist: Address, keeper: Address) -> Self {
        Self {
            vault: default_vault_address(),
            governance,
            guardian,
            strategist,
            keeper,
            asset_symbol: default_asset_symbol(),
            withdrawal_fee_bps: DEFAULT_WITHDRAWAL_FEE_BPS,
        }
    }

    /// Parses and validates a JSON config document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the invariants a vault relies on from its first block.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.governance.is_zero() {
            return Err(ConfigError::ZeroGovernance);
        }
        if self.withdrawal_fee_bps >= MAX_WITHDRAWAL_FEE_BPS {
            return Err(ConfigError::FeeTooHigh {
                requested: self.withdrawal_fee_bps,
                max: MAX_WITHDRAWAL_FEE_BPS,
            });
        }
        Ok(())
    }
}
