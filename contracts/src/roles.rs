//! # Role Registry
//!
//! Four fixed privileged slots, one address each. Governance reconfigures
//! the vault, the guardian can only pull the emergency brake, and the
//! strategist and keeper are recorded for the strategy layer but carry no
//! vault-level authority.
//!
//! The slots are plain fields rather than a role → set mapping: the set of
//! identities is closed, and the gating table in [`crate::vault`] refers to
//! them by name.

use std::fmt;

use serde::{Deserialize, Serialize};
use sett_protocol::Address;

use crate::error::{Requirement, VaultError};

/// One of the four privileged identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleKind {
    Governance,
    Guardian,
    Strategist,
    Keeper,
}

impl fmt::Display for RoleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoleKind::Governance => write!(f, "governance"),
            RoleKind::Guardian => write!(f, "guardian"),
            RoleKind::Strategist => write!(f, "strategist"),
            RoleKind::Keeper => write!(f, "keeper"),
        }
    }
}

/// Holders of the four role slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRegistry {
    governance: Address,
    guardian: Address,
    strategist: Address,
    keeper: Address,
}

impl RoleRegistry {
    pub fn new(governance: Address, guardian: Address, strategist: Address, keeper: Address) -> Self {
        Self {
            governance,
            guardian,
            strategist,
            keeper,
        }
    }

    /// Current holder of `role`.
    pub fn holder(&self, role: RoleKind) -> Address {
        match role {
            RoleKind::Governance => self.governance,
            RoleKind::Guardian => self.guardian,
            RoleKind::Strategist => self.strategist,
            RoleKind::Keeper => self.keeper,
        }
    }

    pub fn has_role(&self, address: Address, role: RoleKind) -> bool {
        self.holder(role) == address
    }

    /// Fails with [`VaultError::Unauthorized`] unless `caller` holds `role`.
    pub fn require(&self, caller: Address, role: RoleKind) -> Result<(), VaultError> {
        if self.has_role(caller, role) {
            Ok(())
        } else {
            Err(VaultError::Unauthorized {
                caller,
                required: Requirement::Role(role),
            })
        }
    }

    /// Fails unless `caller` holds `a` or `b`.
    pub fn require_either(&self, caller: Address, a: RoleKind, b: RoleKind) -> Result<(), VaultError> {
        if self.has_role(caller, a) || self.has_role(caller, b) {
            Ok(())
        } else {
            Err(VaultError::Unauthorized {
                caller,
                required: Requirement::EitherRole(a, b),
            })
        }
    }

    /// Overwrites a slot and returns the previous holder. Authorization is
    /// the vault's job; this only stores.
    pub(crate) fn assign(&mut self, role: RoleKind, holder: Address) -> Address {
        let slot = match role {
            RoleKind::Governance => &mut self.governance,
            RoleKind::Guardian => &mut self.guardian,
            RoleKind::Strategist => &mut self.strategist,
            RoleKind::Keeper => &mut self.keeper,
        };
        std::mem::replace(slot, holder)
    }
}
