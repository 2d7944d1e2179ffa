//! Caller classification.
//!
//! The allowlist gate only applies to callers that are themselves
//! contracts. How the host tells a contract from a human-held account is
//! its own business; the vault just asks a [`CallerClassifier`].

use std::collections::HashSet;
use std::fmt;

use sett_protocol::Address;

/// Answers whether a caller is a contract (programmatic) account.
pub trait CallerClassifier: fmt::Debug + Send + Sync {
    fn is_contract(&self, caller: Address) -> bool;
}

/// Treats every caller as an externally owned account. The allowlist gate
/// never fires.
#[derive(Debug, Clone, Copy, Default)]
pub struct EoaOnly;

impl CallerClassifier for EoaOnly {
    fn is_contract(&self, _caller: Address) -> bool {
        false
    }
}

/// A fixed set of addresses known to hold code.
#[derive(Debug, Clone, Default)]
pub struct KnownContracts {
    contracts: HashSet<Address>,
}

impl KnownContracts {
    pub fn new<I: IntoIterator<Item = Address>>(contracts: I) -> Self {
        Self {
            contracts: contracts.into_iter().collect(),
        }
    }

    /// Registers another contract address.
    pub fn insert(&mut self, contract: Address) -> bool {
        self.contracts.insert(contract)
    }
}

impl CallerClassifier for KnownContracts {
    fn is_contract(&self, caller: Address) -> bool {
        self.contracts.contains(&caller)
    }
}
