//! Shared fixtures: the cast of accounts every vault test needs, a funded
//! asset ledger, and two contract callers.

#![allow(dead_code)]

use sett_contracts::{KnownContracts, Vault};
use sett_protocol::config::VaultConfig;
use sett_protocol::{Address, AssetLedger, InMemoryLedger};

/// Asset supply minted to governance at genesis.
pub const GENESIS_SUPPLY: u64 = 1_000_000_000;

pub struct Fixture {
    pub vault: Vault,
    pub gov: Address,
    pub guardian: Address,
    pub strategist: Address,
    pub keeper: Address,
    pub rando: Address,
    /// A contract that just forwards deposits to the vault.
    pub deposit_contract: Address,
    /// A contract that borrows, deposits and withdraws in one transaction.
    pub flashloan_contract: Address,
}

impl Fixture {
    pub fn new() -> Self {
        let gov = Address::derive("gov");
        let guardian = Address::derive("guardian");
        let strategist = Address::derive("strategist");
        let keeper = Address::derive("keeper");
        let rando = Address::derive("rando");
        let deposit_contract = Address::derive("deposit-contract");
        let flashloan_contract = Address::derive("flashloan-contract");

        let config = VaultConfig::new(gov, guardian, strategist, keeper);
        let ledger = InMemoryLedger::with_supply("WANT", gov, GENESIS_SUPPLY);
        let classifier = KnownContracts::new([deposit_contract, flashloan_contract]);
        let vault = Vault::with_classifier(&config, ledger, Box::new(classifier))
            .expect("fixture config is valid");

        Self {
            vault,
            gov,
            guardian,
            strategist,
            keeper,
            rando,
            deposit_contract,
            flashloan_contract,
        }
    }

    /// Sends `amount` of the asset from governance to `to` and approves the
    /// vault to pull all of it.
    pub fn fund_and_approve(&mut self, to: Address, amount: u64) {
        let vault_address = self.vault.address();
        let gov = self.gov;
        let ledger = self.vault.asset_mut();
        ledger.transfer(gov, to, amount).expect("gov is funded");
        let allowance = ledger.allowance(to, vault_address);
        ledger
            .approve(to, vault_address, allowance + amount)
            .expect("approve never fails");
    }

    pub fn asset_balance(&self, who: Address) -> u64 {
        self.vault.asset().balance_of(who)
    }
}
