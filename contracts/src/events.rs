//! Vault event log.
//!
//! Every committed state change appends one [`VaultEvent`]. Events are part
//! of the vault's state, so a rejected call leaves no trace here either.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sett_protocol::Address;

use crate::roles::RoleKind;

/// A committed state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VaultEvent {
    Deposit {
        account: Address,
        assets: u64,
        shares: u64,
    },
    Withdraw {
        account: Address,
        shares: u64,
        assets: u64,
        fee: u64,
    },
    /// Share token transfer between holders.
    Transfer {
        from: Address,
        to: Address,
        shares: u64,
    },
    /// Share allowance set, raised or lowered.
    Approval {
        owner: Address,
        spender: Address,
        shares: u64,
    },
    Paused {
        by: Address,
    },
    Unpaused {
        by: Address,
    },
    WithdrawalFeeChanged {
        old_bps: u64,
        new_bps: u64,
    },
    ContractApproved {
        contract: Address,
    },
    ContractRevoked {
        contract: Address,
    },
    RoleChanged {
        role: RoleKind,
        previous: Address,
        current: Address,
    },
}

/// An event together with its position in the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Zero-based, gap-free sequence number.
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub event: VaultEvent,
}
