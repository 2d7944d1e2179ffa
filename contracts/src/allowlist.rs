//! # Contract Allowlist
//!
//! Contracts can bundle a borrow, a deposit and a withdrawal into one
//! transaction; that is how flash-loan sandwiches drain share-priced vaults.
//! So contract callers are refused value-moving calls unless governance has
//! approved them by address. Human-held accounts are never affected.
//!
//! Entries are overwritten, never removed: revoking stores `false`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sett_protocol::Address;

use crate::error::{Requirement, VaultError};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractAllowlist {
    approved: HashMap<Address, bool>,
}

impl ContractAllowlist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_approved(&self, address: Address) -> bool {
        self.approved.get(&address).copied().unwrap_or(false)
    }

    /// Marks `address` as approved. Returns `false` when it already was.
    pub(crate) fn approve(&mut self, address: Address) -> bool {
        self.approved.insert(address, true) != Some(true)
    }

    /// Marks `address` as not approved. Returns `false` when it already
    /// wasn't.
    pub(crate) fn revoke(&mut self, address: Address) -> bool {
        let was_approved = self.is_approved(address);
        self.approved.insert(address, false);
        was_approved
    }

    /// The gate itself: contract callers must be approved, everyone else
    /// passes.
    pub fn check(&self, caller: Address, caller_is_contract: bool) -> Result<(), VaultError> {
        if caller_is_contract && !self.is_approved(caller) {
            return Err(VaultError::Unauthorized {
                caller,
                required: Requirement::ApprovedContract,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_not_approved() {
        let list = ContractAllowlist::new();
        assert!(!list.is_approved(Address::ZERO));
        assert!(!list.is_approved(Address::derive("anything")));
    }

    #[test]
    fn approve_and_revoke_are_idempotent() {
        let mut list = ContractAllowlist::new();
        let addr = Address::derive("strategy");

        assert!(list.approve(addr));
        assert!(!list.approve(addr));
        assert!(list.is_approved(addr));

        assert!(list.revoke(addr));
        assert!(!list.revoke(addr));
        assert!(!list.is_approved(addr));
    }

    #[test]
    fn revoking_unknown_address_reports_no_change() {
        let mut list = ContractAllowlist::new();
        assert!(!list.revoke(Address::derive("never-seen")));
    }

    #[test]
    fn gate_only_applies_to_contracts() {
        let mut list = ContractAllowlist::new();
        let caller = Address::derive("depositor");

        assert!(list.check(caller, false).is_ok());
        assert!(matches!(
            list.check(caller, true),
            Err(VaultError::Unauthorized {
                required: Requirement::ApprovedContract,
                ..
            })
        ));

        list.approve(caller);
        assert!(list.check(caller, true).is_ok());
    }
}
