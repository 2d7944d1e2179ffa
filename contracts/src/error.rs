//! Vault error taxonomy.
//!
//! Every guarded entry point returns [`VaultError`]. Messages follow the
//! `dev: ...` revert-reason convention so operators recognise them, but
//! callers should match on the variant, never on the text.

use std::fmt;

use serde::{Deserialize, Serialize};
use sett_protocol::{Address, LedgerError};
use thiserror::Error;

use crate::roles::RoleKind;
use crate::vault::VaultStatus;

/// What an unauthorized caller was missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Requirement {
    /// A single role.
    Role(RoleKind),
    /// Either of two roles.
    EitherRole(RoleKind, RoleKind),
    /// Contract callers must be on the allowlist.
    ApprovedContract,
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirement::Role(role) => write!(f, "{role}"),
            Requirement::EitherRole(a, b) => write!(f, "{a} or {b}"),
            Requirement::ApprovedContract => write!(f, "approved contracts"),
        }
    }
}

/// Errors returned by vault entry points.
///
/// Any of these aborts the whole call: the vault and the asset ledger are
/// restored to their pre-call state before the error reaches the caller.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VaultError {
    /// The caller lacks the role or allowlist entry this entry point needs.
    #[error("dev: only {required}")]
    Unauthorized {
        /// The rejected caller.
        caller: Address,
        /// What the entry point requires.
        required: Requirement,
    },

    /// The vault is in the wrong pause state for this entry point.
    #[error("dev: {}", .current.revert_reason())]
    InvalidState {
        /// Status at the time of the call.
        current: VaultStatus,
        /// Status the entry point needs.
        expected: VaultStatus,
    },

    /// Withdrawal fee at or above the cap.
    #[error("dev: withdrawal fee {requested} bps must be below {max} bps")]
    FeeTooHigh {
        /// The requested fee.
        requested: u64,
        /// The exclusive cap.
        max: u64,
    },

    /// The caller holds fewer shares than the operation needs.
    #[error("dev: insufficient shares: holding {held}, requested {requested}")]
    InsufficientShares {
        /// Shares held by the account.
        held: u64,
        /// Shares requested.
        requested: u64,
    },

    /// The caller's asset balance cannot cover a deposit.
    #[error("dev: insufficient balance: available {available}, requested {requested}")]
    InsufficientBalance {
        /// Asset units available.
        available: u64,
        /// Asset units requested.
        requested: u64,
    },

    /// Share allowance too small for `transfer_from` or `decrease_allowance`.
    #[error("dev: insufficient allowance: {allowance} approved, {requested} requested")]
    InsufficientAllowance {
        /// Current allowance.
        allowance: u64,
        /// Amount requested.
        requested: u64,
    },

    /// The vault's holding of the asset cannot cover a payout.
    #[error("dev: insufficient liquidity: vault holds {available}, payout is {requested}")]
    InsufficientLiquidity {
        /// Asset units the vault holds on the ledger.
        available: u64,
        /// Net payout requested.
        requested: u64,
    },

    /// Zero-sized deposit or withdrawal, or a deposit too small to mint a
    /// single share.
    #[error("dev: amount must be non-zero")]
    ZeroAmount,

    /// Governance cannot be handed to the zero address.
    #[error("dev: {role} cannot be the zero address")]
    ZeroAddress {
        /// The role being reassigned.
        role: RoleKind,
    },

    /// The vault's own address cannot deposit, withdraw, or receive shares.
    #[error("dev: vault {account} cannot act as a holder")]
    VaultAccount {
        /// The vault address that was passed in.
        account: Address,
    },

    /// Construction-time configuration the vault cannot run with.
    #[error("dev: invalid config: {reason}")]
    InvalidConfig {
        /// Why the config was rejected.
        reason: String,
    },

    /// Share or asset arithmetic exceeded `u64`.
    #[error("dev: arithmetic overflow")]
    Overflow,

    /// The underlying asset ledger rejected a transfer.
    #[error("dev: asset ledger: {0}")]
    Ledger(#[from] LedgerError),
}

/// Coarse classification of a [`VaultError`], stable enough for metric
/// labels and log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Unauthorized,
    InvalidState,
    FeeTooHigh,
    InsufficientShares,
    InsufficientAllowance,
    InsufficientBalance,
    InvalidInput,
    Ledger,
}

impl ErrorKind {
    /// Snake-case label.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::InvalidState => "invalid_state",
            ErrorKind::FeeTooHigh => "fee_too_high",
            ErrorKind::InsufficientShares => "insufficient_shares",
            ErrorKind::InsufficientAllowance => "insufficient_allowance",
            ErrorKind::InsufficientBalance => "insufficient_balance",
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::Ledger => "ledger",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl VaultError {
    /// Taxonomy bucket of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            VaultError::Unauthorized { .. } => ErrorKind::Unauthorized,
            VaultError::InvalidState { .. } => ErrorKind::InvalidState,
            VaultError::FeeTooHigh { .. } => ErrorKind::FeeTooHigh,
            VaultError::InsufficientShares { .. } => ErrorKind::InsufficientShares,
            VaultError::InsufficientAllowance { .. } => ErrorKind::InsufficientAllowance,
            VaultError::InsufficientBalance { .. } | VaultError::InsufficientLiquidity { .. } => {
                ErrorKind::InsufficientBalance
            }
            VaultError::ZeroAmount
            | VaultError::ZeroAddress { .. }
            | VaultError::VaultAccount { .. }
            | VaultError::InvalidConfig { .. }
            | VaultError::Overflow => ErrorKind::InvalidInput,
            VaultError::Ledger(_) => ErrorKind::Ledger,
        }
    }
}
