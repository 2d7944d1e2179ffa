//! # Underlying Asset Ledger
//!
//! The vault never owns the asset it accounts for; it holds a balance on an
//! external fungible-token ledger, exactly like any other account. This
//! module defines that collaborator as the [`AssetLedger`] trait and ships
//! [`InMemoryLedger`], a plain balance-and-allowance book used by tests, the
//! CLI simulator, and anyone embedding the vault without a real chain.
//!
//! The ledger enforces the usual fungible-token rules: no balance goes
//! negative, no credit overflows, and `transfer_from` spends the
//! spender's allowance.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::address::Address;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised by an [`AssetLedger`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// The source account does not hold enough of the asset.
    #[error("insufficient asset balance: {owner} has {available}, needs {requested}")]
    InsufficientBalance {
        /// Account being debited.
        owner: Address,
        /// Its current balance.
        available: u64,
        /// The amount requested.
        requested: u64,
    },

    /// The spender's allowance does not cover the transfer.
    #[error("insufficient asset allowance: {spender} may move {allowance} of {owner}'s funds, needs {requested}")]
    InsufficientAllowance {
        /// Account whose funds are being moved.
        owner: Address,
        /// Account moving them.
        spender: Address,
        /// Remaining allowance.
        allowance: u64,
        /// The amount requested.
        requested: u64,
    },

    /// A credit would push a balance or the supply past `u64::MAX`.
    #[error("asset balance overflow crediting {amount} to {account}")]
    Overflow {
        /// Account being credited.
        account: Address,
        /// The amount that overflowed.
        amount: u64,
    },
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// A fungible-asset ledger the vault can pull deposits from and pay
/// withdrawals out of.
///
/// Implementations must apply each mutating call entirely or not at all.
pub trait AssetLedger {
    /// Ticker of the asset.
    fn symbol(&self) -> &str;

    /// Total units in existence.
    fn total_supply(&self) -> u64;

    /// Balance held by `owner`.
    fn balance_of(&self, owner: Address) -> u64;

    /// How much `spender` may still move out of `owner`'s balance.
    fn allowance(&self, owner: Address, spender: Address) -> u64;

    /// Moves `amount` from `from` to `to`, authorized by `from` itself.
    fn transfer(&mut self, from: Address, to: Address, amount: u64) -> Result<(), LedgerError>;

    /// Sets `spender`'s allowance over `owner`'s balance to `amount`.
    fn approve(&mut self, owner: Address, spender: Address, amount: u64) -> Result<(), LedgerError>;

    /// Moves `amount` from `from` to `to` on behalf of `spender`, consuming
    /// allowance.
    fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: u64,
    ) -> Result<(), LedgerError>;
}

// ---------------------------------------------------------------------------
// InMemoryLedger
// ---------------------------------------------------------------------------

/// A `HashMap`-backed [`AssetLedger`].
///
/// Cheap to clone, which is what lets the vault snapshot it around every
/// guarded call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InMemoryLedger {
    symbol: String,
    total_supply: u64,
    balances: HashMap<Address, u64>,
    allowances: HashMap<Address, HashMap<Address, u64>>,
}

impl InMemoryLedger {
    /// Creates an empty ledger for the given asset symbol.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            total_supply: 0,
            balances: HashMap::new(),
            allowances: HashMap::new(),
        }
    }

    /// Creates a ledger whose entire initial supply sits with `holder`.
    pub fn with_supply(symbol: impl Into<String>, holder: Address, supply: u64) -> Self {
        let mut ledger = Self::new(symbol);
        ledger.balances.insert(holder, supply);
        ledger.total_supply = supply;
        ledger
    }

    /// Creates `amount` new units in `to`'s balance.
    pub fn mint(&mut self, to: Address, amount: u64) -> Result<(), LedgerError> {
        let overflow = LedgerError::Overflow {
            account: to,
            amount,
        };
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or_else(|| overflow.clone())?;
        let balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(overflow)?;
        self.total_supply = supply;
        self.balances.insert(to, balance);
        Ok(())
    }

    fn debit(&mut self, owner: Address, amount: u64) -> Result<(), LedgerError> {
        let available = self.balance_of(owner);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                owner,
                available,
                requested: amount,
            });
        }
        self.balances.insert(owner, available - amount);
        Ok(())
    }

    fn credit(&mut self, account: Address, amount: u64) -> Result<(), LedgerError> {
        let balance = self
            .balance_of(account)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow { account, amount })?;
        self.balances.insert(account, balance);
        Ok(())
    }
}

impl AssetLedger for InMemoryLedger {
    fn symbol(&self) -> &str {
        &self.symbol
    }

    fn total_supply(&self) -> u64 {
        self.total_supply
    }

    fn balance_of(&self, owner: Address) -> u64 {
        self.balances.get(&owner).copied().unwrap_or(0)
    }

    fn allowance(&self, owner: Address, spender: Address) -> u64 {
        self.allowances
            .get(&owner)
            .and_then(|spenders| spenders.get(&spender))
            .copied()
            .unwrap_or(0)
    }

    fn transfer(&mut self, from: Address, to: Address, amount: u64) -> Result<(), LedgerError> {
        if from == to {
            // Self-transfer still has to be covered by the balance.
            let available = self.balance_of(from);
            if available < amount {
                return Err(LedgerError::InsufficientBalance {
                    owner: from,
                    available,
                    requested: amount,
                });
            }
            return Ok(());
        }
        // Credit is checked before the debit lands so a failure leaves both
        // balances untouched.
        self.balance_of(to)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow { account: to, amount })?;
        self.debit(from, amount)?;
        self.credit(to, amount)
    }

    fn approve(&mut self, owner: Address, spender: Address, amount: u64) -> Result<(), LedgerError> {
        self.allowances.entry(owner).or_default().insert(spender, amount);
        Ok(())
    }

    fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: u64,
    ) -> Result<(), LedgerError> {
        let allowance = self.allowance(from, spender);
        if allowance < amount {
            return Err(LedgerError::InsufficientAllowance {
                owner: from,
                spender,
                allowance,
                requested: amount,
            });
        }
        self.transfer(from, to, amount)?;
        self.allowances
            .entry(from)
            .or_default()
            .insert(spender, allowance - amount);
        Ok(())
    }
}
