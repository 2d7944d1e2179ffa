//! # Vault State Machine
//!
//! The top-level contract. It owns the role registry, the contract
//! allowlist, the share book and the fee calculator, and it is the only way
//! to reach any of them mutably. Every external call passes through the
//! same three steps:
//!
//! 1. **Guards**: pause state, then role or allowlist checks.
//! 2. **Effects**: share and asset bookkeeping.
//! 3. **Interactions**: the asset ledger transfer, issued last.
//!
//! ## States
//!
//! ```text
//!   Active --pause (governance | guardian)--> Paused
//!   Paused --unpause (governance)-----------> Active
//! ```
//!
//! While `Paused`, every balance- or allowance-moving entry point is
//! rejected for every caller, governance included. Configuration entry
//! points (fee, allowlist, roles) work in either state.
//!
//! ## Atomicity
//!
//! Each entry point runs inside [`Vault::atomically`]: the vault state and
//! the asset ledger are cloned up front and restored if anything fails, so
//! a rejected call is indistinguishable from one that never happened. The
//! event log is append-only and lives outside that snapshot; a rollback
//! truncates it back to its pre-call length instead of copying it.
//! External contracts that chain several calls (a flash loan borrowing,
//! depositing and withdrawing) use the same boundary to roll back as one
//! unit.

use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sett_protocol::config::{ConfigError, VaultConfig};
use sett_protocol::{Address, AssetLedger, InMemoryLedger};
use tracing::{debug, info, warn};

use crate::allowlist::ContractAllowlist;
use crate::caller::{CallerClassifier, EoaOnly};
use crate::error::VaultError;
use crate::events::{EventRecord, VaultEvent};
use crate::fees::FeeCalculator;
use crate::roles::{RoleKind, RoleRegistry};
use crate::shares::ShareAccounting;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Pause state of the vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VaultStatus {
    /// Deposits, withdrawals and share transfers are open.
    Active,
    /// Emergency brake engaged.
    Paused,
}

impl VaultStatus {
    /// Revert reason for a call that found the vault in this state.
    pub(crate) fn revert_reason(&self) -> &'static str {
        match self {
            VaultStatus::Active => "not paused",
            VaultStatus::Paused => "paused",
        }
    }
}

impl fmt::Display for VaultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VaultStatus::Active => write!(f, "Active"),
            VaultStatus::Paused => write!(f, "Paused"),
        }
    }
}

/// Everything a rejected call must leave untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultState {
    address: Address,
    status: VaultStatus,
    roles: RoleRegistry,
    allowlist: ContractAllowlist,
    shares: ShareAccounting,
    fees: FeeCalculator,
}

/// A single vault over the asset ledger `L`.
#[derive(Debug)]
pub struct Vault<L = InMemoryLedger> {
    state: VaultState,
    events: Vec<EventRecord>,
    ledger: L,
    classifier: Box<dyn CallerClassifier>,
}

impl<L: AssetLedger + Clone> Vault<L> {
    /// Creates an active vault in which no caller is treated as a contract.
    ///
    /// # Errors
    ///
    /// [`VaultError::ZeroAddress`] for a zero governance address,
    /// [`VaultError::FeeTooHigh`] for an initial fee at or above the cap,
    /// [`VaultError::InvalidConfig`] when the configured asset symbol does
    /// not match the ledger's.
    pub fn new(config: &VaultConfig, ledger: L) -> Result<Self, VaultError> {
        Self::with_classifier(config, ledger, Box::new(EoaOnly))
    }

    /// Creates an active vault that asks `classifier` which callers are
    /// contracts subject to the allowlist.
    pub fn with_classifier(
        config: &VaultConfig,
        ledger: L,
        classifier: Box<dyn CallerClassifier>,
    ) -> Result<Self, VaultError> {
        config.validate().map_err(|e| match e {
            ConfigError::ZeroGovernance => VaultError::ZeroAddress {
                role: RoleKind::Governance,
            },
            ConfigError::FeeTooHigh { requested, max } => VaultError::FeeTooHigh { requested, max },
            other => VaultError::InvalidConfig {
                reason: other.to_string(),
            },
        })?;
        if config.asset_symbol != ledger.symbol() {
            return Err(VaultError::InvalidConfig {
                reason: format!(
                    "asset {} does not match ledger asset {}",
                    config.asset_symbol,
                    ledger.symbol()
                ),
            });
        }
        let fees = FeeCalculator::new(config.withdrawal_fee_bps)?;

        info!(
            vault = %config.vault,
            governance = %config.governance,
            guardian = %config.guardian,
            asset = ledger.symbol(),
            withdrawal_fee_bps = config.withdrawal_fee_bps,
            "vault created"
        );

        Ok(Self {
            state: VaultState {
                address: config.vault,
                status: VaultStatus::Active,
                roles: RoleRegistry::new(
                    config.governance,
                    config.guardian,
                    config.strategist,
                    config.keeper,
                ),
                allowlist: ContractAllowlist::new(),
                shares: ShareAccounting::new(),
                fees,
            },
            events: Vec::new(),
            ledger,
            classifier,
        })
    }

    // -----------------------------------------------------------------------
    // Transaction boundary
    // -----------------------------------------------------------------------

    /// Runs `f` against the vault and keeps its effects only if it returns
    /// `Ok`. On `Err`, the vault state, event log and asset ledger are
    /// restored to what they were before `f` started.
    ///
    /// Events emitted by `f` are dropped by truncation; the log itself is
    /// never copied.
    pub fn atomically<R, E>(&mut self, f: impl FnOnce(&mut Self) -> Result<R, E>) -> Result<R, E> {
        let state = self.state.clone();
        let ledger = self.ledger.clone();
        let mark = self.events.len();
        let result = f(self);
        if result.is_err() {
            self.state = state;
            self.ledger = ledger;
            self.events.truncate(mark);
        }
        result
    }

    fn guarded<R>(
        &mut self,
        op: &'static str,
        caller: Address,
        f: impl FnOnce(&mut Self) -> Result<R, VaultError>,
    ) -> Result<R, VaultError> {
        self.atomically(f).map_err(|e| {
            warn!(op, caller = %caller, kind = %e.kind(), error = %e, "call rejected");
            e
        })
    }

    fn require_status(&self, expected: VaultStatus) -> Result<(), VaultError> {
        if self.state.status != expected {
            return Err(VaultError::InvalidState {
                current: self.state.status,
                expected,
            });
        }
        Ok(())
    }

    /// The vault's own account never holds shares or deposits into itself.
    fn reject_vault_account(&self, account: Address) -> Result<(), VaultError> {
        if account == self.state.address {
            return Err(VaultError::VaultAccount { account });
        }
        Ok(())
    }

    /// Allowlist gate, evaluated fresh on every value-moving entry.
    fn check_contract_access(&self, caller: Address) -> Result<(), VaultError> {
        let is_contract = self.classifier.is_contract(caller);
        self.state.allowlist.check(caller, is_contract)
    }

    fn emit(&mut self, event: VaultEvent) {
        let sequence = self.events.len() as u64;
        self.events.push(EventRecord {
            sequence,
            timestamp: Utc::now(),
            event,
        });
    }

    // -----------------------------------------------------------------------
    // Pause
    // -----------------------------------------------------------------------

    /// Engages the emergency brake. Governance or guardian, vault active.
    pub fn pause(&mut self, caller: Address) -> Result<(), VaultError> {
        self.guarded("pause", caller, |v| {
            v.state
                .roles
                .require_either(caller, RoleKind::Governance, RoleKind::Guardian)?;
            v.require_status(VaultStatus::Active)?;
            v.state.status = VaultStatus::Paused;
            v.emit(VaultEvent::Paused { by: caller });
            info!(by = %caller, "vault paused");
            Ok(())
        })
    }

    /// Releases the brake. Governance only; the guardian cannot undo what
    /// it started.
    pub fn unpause(&mut self, caller: Address) -> Result<(), VaultError> {
        self.guarded("unpause", caller, |v| {
            v.state.roles.require(caller, RoleKind::Governance)?;
            v.require_status(VaultStatus::Paused)?;
            v.state.status = VaultStatus::Active;
            v.emit(VaultEvent::Unpaused { by: caller });
            info!(by = %caller, "vault unpaused");
            Ok(())
        })
    }

    // -----------------------------------------------------------------------
    // Deposits & withdrawals
    // -----------------------------------------------------------------------

    /// Pulls `amount` of the asset from `caller` and mints shares at the
    /// current rate. Returns the shares minted.
    ///
    /// The caller must have approved the vault on the asset ledger for at
    /// least `amount`.
    pub fn deposit(&mut self, caller: Address, amount: u64) -> Result<u64, VaultError> {
        self.guarded("deposit", caller, |v| v.deposit_inner(caller, amount))
    }

    /// Deposits the caller's entire asset balance.
    pub fn deposit_all(&mut self, caller: Address) -> Result<u64, VaultError> {
        self.guarded("deposit_all", caller, |v| {
            v.require_status(VaultStatus::Active)?;
            let amount = v.ledger.balance_of(caller);
            v.deposit_inner(caller, amount)
        })
    }

    fn deposit_inner(&mut self, caller: Address, amount: u64) -> Result<u64, VaultError> {
        self.require_status(VaultStatus::Active)?;
        self.check_contract_access(caller)?;
        self.reject_vault_account(caller)?;
        if amount == 0 {
            return Err(VaultError::ZeroAmount);
        }
        let available = self.ledger.balance_of(caller);
        if available < amount {
            return Err(VaultError::InsufficientBalance {
                available,
                requested: amount,
            });
        }

        let shares = self.state.shares.preview_deposit(amount)?;
        if shares == 0 {
            return Err(VaultError::ZeroAmount);
        }

        self.state.shares.mint(caller, shares, amount)?;
        let vault = self.state.address;
        self.ledger.transfer_from(vault, caller, vault, amount)?;

        self.emit(VaultEvent::Deposit {
            account: caller,
            assets: amount,
            shares,
        });
        debug!(account = %caller, assets = amount, shares, "deposit");
        Ok(shares)
    }

    /// Burns `shares` from `caller` and pays out their value minus the
    /// withdrawal fee. Returns the net asset amount paid.
    pub fn withdraw(&mut self, caller: Address, shares: u64) -> Result<u64, VaultError> {
        self.guarded("withdraw", caller, |v| v.withdraw_inner(caller, shares))
    }

    /// Withdraws the caller's entire share balance.
    pub fn withdraw_all(&mut self, caller: Address) -> Result<u64, VaultError> {
        self.guarded("withdraw_all", caller, |v| {
            v.require_status(VaultStatus::Active)?;
            let shares = v.state.shares.balance_of(caller);
            v.withdraw_inner(caller, shares)
        })
    }

    fn withdraw_inner(&mut self, caller: Address, shares: u64) -> Result<u64, VaultError> {
        self.require_status(VaultStatus::Active)?;
        self.check_contract_access(caller)?;
        self.reject_vault_account(caller)?;
        if shares == 0 {
            return Err(VaultError::ZeroAmount);
        }
        let held = self.state.shares.balance_of(caller);
        if held < shares {
            return Err(VaultError::InsufficientShares {
                held,
                requested: shares,
            });
        }

        let gross = self.state.shares.preview_redeem(shares)?;
        let (net, fee) = self.state.fees.apply_withdrawal_fee(gross)?;

        let vault = self.state.address;
        let available = self.ledger.balance_of(vault);
        if available < net {
            return Err(VaultError::InsufficientLiquidity {
                available,
                requested: net,
            });
        }

        self.state.shares.burn(caller, shares, net)?;
        self.ledger.transfer(vault, caller, net)?;

        self.emit(VaultEvent::Withdraw {
            account: caller,
            shares,
            assets: net,
            fee,
        });
        debug!(account = %caller, shares, assets = net, fee, "withdraw");
        Ok(net)
    }

    // -----------------------------------------------------------------------
    // Share token
    // -----------------------------------------------------------------------

    pub fn transfer(&mut self, caller: Address, to: Address, shares: u64) -> Result<(), VaultError> {
        self.guarded("transfer", caller, |v| {
            v.require_status(VaultStatus::Active)?;
            v.reject_vault_account(to)?;
            v.state.shares.transfer(caller, to, shares)?;
            v.emit(VaultEvent::Transfer {
                from: caller,
                to,
                shares,
            });
            debug!(from = %caller, to = %to, shares, "share transfer");
            Ok(())
        })
    }

    /// Moves `owner`'s shares on their behalf, spending `caller`'s allowance.
    pub fn transfer_from(
        &mut self,
        caller: Address,
        owner: Address,
        to: Address,
        shares: u64,
    ) -> Result<(), VaultError> {
        self.guarded("transfer_from", caller, |v| {
            v.require_status(VaultStatus::Active)?;
            v.reject_vault_account(to)?;
            v.state.shares.spend_allowance(owner, caller, shares)?;
            v.state.shares.transfer(owner, to, shares)?;
            v.emit(VaultEvent::Transfer {
                from: owner,
                to,
                shares,
            });
            debug!(spender = %caller, from = %owner, to = %to, shares, "share transfer_from");
            Ok(())
        })
    }

    pub fn approve(&mut self, caller: Address, spender: Address, shares: u64) -> Result<(), VaultError> {
        self.guarded("approve", caller, |v| {
            v.require_status(VaultStatus::Active)?;
            v.set_share_allowance(caller, spender, shares);
            Ok(())
        })
    }

    pub fn increase_allowance(
        &mut self,
        caller: Address,
        spender: Address,
        delta: u64,
    ) -> Result<(), VaultError> {
        self.guarded("increase_allowance", caller, |v| {
            v.require_status(VaultStatus::Active)?;
            let raised = v
                .state
                .shares
                .allowance(caller, spender)
                .checked_add(delta)
                .ok_or(VaultError::Overflow)?;
            v.set_share_allowance(caller, spender, raised);
            Ok(())
        })
    }

    /// Lowers an allowance. Going below zero is an error, not a clamp.
    pub fn decrease_allowance(
        &mut self,
        caller: Address,
        spender: Address,
        delta: u64,
    ) -> Result<(), VaultError> {
        self.guarded("decrease_allowance", caller, |v| {
            v.require_status(VaultStatus::Active)?;
            let allowance = v.state.shares.allowance(caller, spender);
            let lowered = allowance
                .checked_sub(delta)
                .ok_or(VaultError::InsufficientAllowance {
                    allowance,
                    requested: delta,
                })?;
            v.set_share_allowance(caller, spender, lowered);
            Ok(())
        })
    }

    fn set_share_allowance(&mut self, owner: Address, spender: Address, shares: u64) {
        self.state.shares.set_allowance(owner, spender, shares);
        self.emit(VaultEvent::Approval {
            owner,
            spender,
            shares,
        });
        debug!(owner = %owner, spender = %spender, shares, "share allowance set");
    }

    // -----------------------------------------------------------------------
    // Governance
    // -----------------------------------------------------------------------

    /// Sets the withdrawal fee in basis points. Governance only, strictly
    /// below the cap.
    pub fn set_withdrawal_fee(&mut self, caller: Address, bps: u64) -> Result<(), VaultError> {
        self.guarded("set_withdrawal_fee", caller, |v| {
            v.state.roles.require(caller, RoleKind::Governance)?;
            let old_bps = v.state.fees.set_fee(bps)?;
            v.emit(VaultEvent::WithdrawalFeeChanged {
                old_bps,
                new_bps: bps,
            });
            info!(old_bps, new_bps = bps, "withdrawal fee changed");
            Ok(())
        })
    }

    /// Adds `contract` to the allowlist. Approving twice is a no-op.
    pub fn approve_contract_access(&mut self, caller: Address, contract: Address) -> Result<(), VaultError> {
        self.guarded("approve_contract_access", caller, |v| {
            v.state.roles.require(caller, RoleKind::Governance)?;
            if v.state.allowlist.approve(contract) {
                v.emit(VaultEvent::ContractApproved { contract });
                info!(contract = %contract, "contract access approved");
            }
            Ok(())
        })
    }

    /// Removes `contract` from the allowlist, effective on its next call.
    /// Revoking twice is a no-op.
    pub fn revoke_contract_access(&mut self, caller: Address, contract: Address) -> Result<(), VaultError> {
        self.guarded("revoke_contract_access", caller, |v| {
            v.state.roles.require(caller, RoleKind::Governance)?;
            if v.state.allowlist.revoke(contract) {
                v.emit(VaultEvent::ContractRevoked { contract });
                info!(contract = %contract, "contract access revoked");
            }
            Ok(())
        })
    }

    /// Hands a role slot to a new holder. Governance only; governance
    /// itself can be handed over but never to the zero address.
    pub fn set_role(&mut self, caller: Address, role: RoleKind, holder: Address) -> Result<(), VaultError> {
        self.guarded("set_role", caller, |v| {
            v.state.roles.require(caller, RoleKind::Governance)?;
            if role == RoleKind::Governance && holder.is_zero() {
                return Err(VaultError::ZeroAddress { role });
            }
            let previous = v.state.roles.assign(role, holder);
            v.emit(VaultEvent::RoleChanged {
                role,
                previous,
                current: holder,
            });
            info!(%role, previous = %previous, current = %holder, "role reassigned");
            Ok(())
        })
    }

    // -----------------------------------------------------------------------
    // Views
    // -----------------------------------------------------------------------

    /// The vault's own account on the asset ledger.
    pub fn address(&self) -> Address {
        self.state.address
    }

    pub fn status(&self) -> VaultStatus {
        self.state.status
    }

    pub fn paused(&self) -> bool {
        self.state.status == VaultStatus::Paused
    }

    /// Whether `contract` is on the allowlist.
    pub fn approved(&self, contract: Address) -> bool {
        self.state.allowlist.is_approved(contract)
    }

    /// Withdrawal fee in basis points.
    pub fn withdrawal_fee(&self) -> u64 {
        self.state.fees.withdrawal_fee_bps()
    }

    /// Asset value of one share, scaled by `PRICE_PRECISION`.
    pub fn price_per_share(&self) -> u128 {
        self.state.shares.price_per_share()
    }

    /// Alias of [`price_per_share`](Self::price_per_share) kept for
    /// integrations that read the older name.
    pub fn price_per_full_share(&self) -> u128 {
        self.price_per_share()
    }

    pub fn balance_of(&self, holder: Address) -> u64 {
        self.state.shares.balance_of(holder)
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> u64 {
        self.state.shares.allowance(owner, spender)
    }

    /// Shares in existence.
    pub fn total_supply(&self) -> u64 {
        self.state.shares.total_shares()
    }

    /// Asset units backing the outstanding shares, retained fees included.
    pub fn total_assets(&self) -> u64 {
        self.state.shares.total_assets()
    }

    pub fn has_role(&self, address: Address, role: RoleKind) -> bool {
        self.state.roles.has_role(address, role)
    }

    pub fn governance(&self) -> Address {
        self.state.roles.holder(RoleKind::Governance)
    }

    pub fn guardian(&self) -> Address {
        self.state.roles.holder(RoleKind::Guardian)
    }

    pub fn strategist(&self) -> Address {
        self.state.roles.holder(RoleKind::Strategist)
    }

    pub fn keeper(&self) -> Address {
        self.state.roles.holder(RoleKind::Keeper)
    }

    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    /// Full internal state, for snapshots and equality checks.
    pub fn state(&self) -> &VaultState {
        &self.state
    }

    /// Sum of all share balances. Equal to [`total_supply`](Self::total_supply)
    /// in every reachable state.
    pub fn sum_of_balances(&self) -> u128 {
        self.state.shares.sum_of_balances()
    }

    /// The underlying asset ledger.
    pub fn asset(&self) -> &L {
        &self.ledger
    }

    /// Direct access to the asset ledger, as any account holder has on a
    /// real chain. Calls made through here bypass every vault guard.
    pub fn asset_mut(&mut self) -> &mut L {
        &mut self.ledger
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sett_protocol::config::PRICE_PRECISION;

    fn config() -> VaultConfig {
        VaultConfig::new(
            Address::derive("gov"),
            Address::derive("guardian"),
            Address::derive("strategist"),
            Address::derive("keeper"),
        )
    }

    fn vault() -> Vault {
        let ledger = InMemoryLedger::with_supply("WANT", Address::derive("gov"), 1_000_000);
        Vault::new(&config(), ledger).unwrap()
    }

    #[test]
    fn new_vault_defaults() {
        let vault = vault();
        assert!(!vault.paused());
        assert_eq!(vault.status(), VaultStatus::Active);
        assert_eq!(vault.withdrawal_fee(), 0);
        assert_eq!(vault.total_supply(), 0);
        assert_eq!(vault.price_per_share(), PRICE_PRECISION);
        assert_eq!(vault.governance(), Address::derive("gov"));
        assert_eq!(vault.keeper(), Address::derive("keeper"));
        assert!(vault.events().is_empty());
    }

    #[test]
    fn zero_governance_rejected_at_construction() {
        let mut cfg = config();
        cfg.governance = Address::ZERO;
        let err = Vault::new(&cfg, InMemoryLedger::new("WANT")).unwrap_err();
        assert_eq!(
            err,
            VaultError::ZeroAddress {
                role: RoleKind::Governance
            }
        );
    }

    #[test]
    fn excessive_initial_fee_rejected_at_construction() {
        let mut cfg = config();
        cfg.withdrawal_fee_bps = 100;
        assert!(matches!(
            Vault::new(&cfg, InMemoryLedger::new("WANT")),
            Err(VaultError::FeeTooHigh { .. })
        ));
    }

    #[test]
    fn deposit_without_ledger_approval_rolls_back() {
        let mut vault = vault();
        let gov = Address::derive("gov");
        let before = vault.state().clone();

        let err = vault.deposit(gov, 1000).unwrap_err();
        assert!(matches!(err, VaultError::Ledger(_)));
        assert_eq!(vault.state(), &before);
        assert_eq!(vault.asset().balance_of(gov), 1_000_000);
    }

    #[test]
    fn deposit_more_than_balance_rejected() {
        let mut vault = vault();
        let rando = Address::derive("rando");
        assert_eq!(
            vault.deposit(rando, 1),
            Err(VaultError::InsufficientBalance {
                available: 0,
                requested: 1
            })
        );
    }

    #[test]
    fn events_are_sequenced() {
        let mut vault = vault();
        let gov = Address::derive("gov");
        vault.pause(gov).unwrap();
        vault.unpause(gov).unwrap();
        vault.set_withdrawal_fee(gov, 10).unwrap();

        let sequences: Vec<u64> = vault.events().iter().map(|e| e.sequence).collect();
        assert_eq!(sequences, vec![0, 1, 2]);
        assert_eq!(
            vault.events()[2].event,
            VaultEvent::WithdrawalFeeChanged {
                old_bps: 0,
                new_bps: 10
            }
        );
    }

    #[test]
    fn pause_twice_is_invalid_state() {
        let mut vault = vault();
        let guardian = Address::derive("guardian");
        vault.pause(guardian).unwrap();
        assert_eq!(
            vault.pause(guardian),
            Err(VaultError::InvalidState {
                current: VaultStatus::Paused,
                expected: VaultStatus::Active,
            })
        );
    }

    #[test]
    fn unpause_active_vault_is_invalid_state() {
        let mut vault = vault();
        let err = vault.unpause(Address::derive("gov")).unwrap_err();
        assert_eq!(err.to_string(), "dev: not paused");
    }

    #[test]
    fn configuration_allowed_while_paused() {
        let mut vault = vault();
        let gov = Address::derive("gov");
        vault.pause(gov).unwrap();
        vault.set_withdrawal_fee(gov, 25).unwrap();
        vault.approve_contract_access(gov, Address::ZERO).unwrap();
        vault
            .set_role(gov, RoleKind::Keeper, Address::derive("new-keeper"))
            .unwrap();
        assert_eq!(vault.withdrawal_fee(), 25);
        assert!(vault.approved(Address::ZERO));
        assert_eq!(vault.keeper(), Address::derive("new-keeper"));
    }

    #[test]
    fn governance_cannot_be_zeroed() {
        let mut vault = vault();
        let gov = Address::derive("gov");
        assert!(matches!(
            vault.set_role(gov, RoleKind::Governance, Address::ZERO),
            Err(VaultError::ZeroAddress { .. })
        ));
        assert_eq!(vault.governance(), gov);
    }

    #[test]
    fn mismatched_asset_symbol_rejected_at_construction() {
        let mut cfg = config();
        cfg.asset_symbol = "USDC".to_string();
        assert!(matches!(
            Vault::new(&cfg, InMemoryLedger::new("WANT")),
            Err(VaultError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn rejected_call_truncates_event_log_in_place() {
        let mut vault = vault();
        let gov = Address::derive("gov");
        for _ in 0..50 {
            vault.pause(gov).unwrap();
            vault.unpause(gov).unwrap();
        }
        let len = vault.events().len();
        let log = vault.events().as_ptr();

        assert!(vault.pause(Address::derive("rando")).is_err());
        assert_eq!(vault.events().len(), len);
        assert_eq!(vault.events().as_ptr(), log);
    }

    #[test]
    fn failed_batch_drops_its_events() {
        let mut vault = vault();
        let gov = Address::derive("gov");
        vault.set_withdrawal_fee(gov, 10).unwrap();

        let result = vault.atomically(|v| -> Result<(), VaultError> {
            v.pause(gov)?;
            v.unpause(gov)?;
            Err(VaultError::ZeroAmount)
        });
        assert_eq!(result, Err(VaultError::ZeroAmount));
        assert_eq!(vault.events().len(), 1);

        vault.pause(gov).unwrap();
        let sequences: Vec<u64> = vault.events().iter().map(|e| e.sequence).collect();
        assert_eq!(sequences, vec![0, 1]);
        assert_eq!(vault.events()[1].event, VaultEvent::Paused { by: gov });
    }

    #[test]
    fn state_snapshot_excludes_event_log() {
        let mut vault = vault();
        vault.pause(Address::derive("gov")).unwrap();
        let json = serde_json::to_value(vault.state()).unwrap();
        assert!(json.get("events").is_none());
        assert!(json.get("shares").is_some());
    }
}
