//! # Share Accounting
//!
//! The vault's internal unit of account. A depositor's shares are a
//! proportional claim on `total_assets`; the exchange rate is
//! `total_assets / total_shares`, with the empty pool pricing at exactly
//! 1.0 so the first deposit mints 1:1.
//!
//! Besides the pool totals this module keeps the ERC-20 style side of the
//! share token: per-holder balances and spender allowances. It performs no
//! authorization and knows nothing about pausing; [`crate::vault`] decides
//! whether a call may reach it.
//!
//! ## Invariant
//!
//! `total_shares == sum(balances)` after every public method returns,
//! successfully or not.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sett_protocol::math::{mul_div, price_per_share};
use sett_protocol::Address;

use crate::error::VaultError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareAccounting {
    total_shares: u64,
    total_assets: u64,
    balances: HashMap<Address, u64>,
    allowances: HashMap<Address, HashMap<Address, u64>>,
}

impl ShareAccounting {
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Views
    // -----------------------------------------------------------------------

    pub fn total_shares(&self) -> u64 {
        self.total_shares
    }

    pub fn total_assets(&self) -> u64 {
        self.total_assets
    }

    pub fn balance_of(&self, holder: Address) -> u64 {
        self.balances.get(&holder).copied().unwrap_or(0)
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> u64 {
        self.allowances
            .get(&owner)
            .and_then(|spenders| spenders.get(&spender))
            .copied()
            .unwrap_or(0)
    }

    /// Asset value of one share, scaled by `PRICE_PRECISION`. The single
    /// source of truth for both price views the vault exposes.
    pub fn price_per_share(&self) -> u128 {
        price_per_share(self.total_assets, self.total_shares)
    }

    /// Shares a deposit of `amount` would mint at the current rate.
    pub fn preview_deposit(&self, amount: u64) -> Result<u64, VaultError> {
        if self.total_shares == 0 || self.total_assets == 0 {
            return Ok(amount);
        }
        mul_div(amount, self.total_shares, self.total_assets).ok_or(VaultError::Overflow)
    }

    /// Gross asset value of `shares` at the current rate, before fees.
    pub fn preview_redeem(&self, shares: u64) -> Result<u64, VaultError> {
        if shares > self.total_shares {
            return Err(VaultError::InsufficientShares {
                held: self.total_shares,
                requested: shares,
            });
        }
        if shares == self.total_shares {
            return Ok(self.total_assets);
        }
        mul_div(shares, self.total_assets, self.total_shares).ok_or(VaultError::Overflow)
    }

    // -----------------------------------------------------------------------
    // Pool mutations
    // -----------------------------------------------------------------------

    /// Credits `shares` to `holder` against `assets` entering the pool.
    pub(crate) fn mint(&mut self, holder: Address, shares: u64, assets: u64) -> Result<(), VaultError> {
        let total_shares = self.total_shares.checked_add(shares).ok_or(VaultError::Overflow)?;
        let total_assets = self.total_assets.checked_add(assets).ok_or(VaultError::Overflow)?;
        let balance = self.balance_of(holder).checked_add(shares).ok_or(VaultError::Overflow)?;

        self.total_shares = total_shares;
        self.total_assets = total_assets;
        self.balances.insert(holder, balance);
        Ok(())
    }

    /// Burns `shares` from `holder` while `assets_out` leave the pool. Any
    /// withdrawal fee is simply not part of `assets_out`.
    pub(crate) fn burn(&mut self, holder: Address, shares: u64, assets_out: u64) -> Result<(), VaultError> {
        let held = self.balance_of(holder);
        if held < shares {
            return Err(VaultError::InsufficientShares {
                held,
                requested: shares,
            });
        }
        let total_assets = self
            .total_assets
            .checked_sub(assets_out)
            .ok_or(VaultError::Overflow)?;

        self.total_shares -= shares;
        self.total_assets = total_assets;
        self.set_balance(holder, held - shares);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Share token
    // -----------------------------------------------------------------------

    pub(crate) fn transfer(&mut self, from: Address, to: Address, amount: u64) -> Result<(), VaultError> {
        let held = self.balance_of(from);
        if held < amount {
            return Err(VaultError::InsufficientShares {
                held,
                requested: amount,
            });
        }
        if from == to {
            return Ok(());
        }
        // Cannot overflow: both balances are bounded by total_shares.
        self.set_balance(from, held - amount);
        let to_balance = self.balance_of(to) + amount;
        self.set_balance(to, to_balance);
        Ok(())
    }

    pub(crate) fn set_allowance(&mut self, owner: Address, spender: Address, amount: u64) {
        self.allowances.entry(owner).or_default().insert(spender, amount);
    }

    /// Consumes `amount` of `spender`'s allowance over `owner`'s shares.
    pub(crate) fn spend_allowance(
        &mut self,
        owner: Address,
        spender: Address,
        amount: u64,
    ) -> Result<(), VaultError> {
        let allowance = self.allowance(owner, spender);
        if allowance < amount {
            return Err(VaultError::InsufficientAllowance {
                allowance,
                requested: amount,
            });
        }
        self.set_allowance(owner, spender, allowance - amount);
        Ok(())
    }

    fn set_balance(&mut self, holder: Address, balance: u64) {
        if balance == 0 {
            self.balances.remove(&holder);
        } else {
            self.balances.insert(holder, balance);
        }
    }

    /// Sum of every holder's balance. Should always equal `total_shares`.
    pub fn sum_of_balances(&self) -> u128 {
        self.balances.values().map(|b| *b as u128).sum()
    }
}
