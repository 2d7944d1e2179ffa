//! # Scenario Replay
//!
//! A scenario is a JSON document describing one vault deployment and an
//! ordered list of calls against it:
//!
//! ```json
//! {
//!   "name": "withdrawal fee",
//!   "vault": { "governance": "gov", "guardian": "guardian",
//!              "strategist": "strategist", "keeper": "keeper" },
//!   "contracts": ["flash-lender"],
//!   "funding": [{ "account": "rando", "amount": 1000 }],
//!   "steps": [
//!     { "caller": "gov", "action": "set_withdrawal_fee", "bps": 50 },
//!     { "caller": "rando", "action": "deposit", "amount": 1000 },
//!     { "caller": "rando", "action": "withdraw_all", "expect": "ok" }
//!   ]
//! }
//! ```
//!
//! Accounts are written either as `0x`-prefixed hex addresses or as plain
//! labels, which are hashed into an address. The same label always names
//! the same account.
//!
//! Each step may carry an `expect` of `"ok"` or an error kind such as
//! `"unauthorized"`; the report counts steps whose outcome differs.

use std::fmt::{self, Write as _};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sett_contracts::{KnownContracts, RoleKind, Vault, VaultError};
use sett_protocol::address::AddressError;
use sett_protocol::config::{VaultConfig, DEFAULT_ASSET_SYMBOL, DEFAULT_GENESIS_SUPPLY};
use sett_protocol::{Address, AssetLedger, InMemoryLedger};
use tracing::{debug, info, warn};

use crate::metrics::VaultMetrics;

// ---------------------------------------------------------------------------
// Scenario document
// ---------------------------------------------------------------------------

/// An account reference: hex address or label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Account(String);

impl Account {
    pub fn resolve(&self) -> Result<Address, AddressError> {
        if self.0.starts_with("0x") {
            Address::from_hex(&self.0)
        } else {
            Ok(Address::derive(&self.0))
        }
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Account {
    fn from(s: &str) -> Self {
        Account(s.to_string())
    }
}

/// The deployment half of a scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultSection {
    pub governance: Account,
    pub guardian: Account,
    pub strategist: Account,
    pub keeper: Account,
    /// The vault's own address. Defaults to the standard vault label.
    #[serde(default)]
    pub vault: Option<Account>,
    #[serde(default)]
    pub asset_symbol: Option<String>,
    #[serde(default)]
    pub withdrawal_fee_bps: u64,
}

impl VaultSection {
    pub fn to_config(&self) -> Result<VaultConfig> {
        let resolve = |account: &Account, slot: &str| {
            account
                .resolve()
                .with_context(|| format!("invalid {slot} address {account}"))
        };
        let mut config = VaultConfig::new(
            resolve(&self.governance, "governance")?,
            resolve(&self.guardian, "guardian")?,
            resolve(&self.strategist, "strategist")?,
            resolve(&self.keeper, "keeper")?,
        );
        if let Some(vault) = &self.vault {
            config.vault = resolve(vault, "vault")?;
        }
        config.asset_symbol = self
            .asset_symbol
            .clone()
            .unwrap_or_else(|| DEFAULT_ASSET_SYMBOL.to_string());
        config.withdrawal_fee_bps = self.withdrawal_fee_bps;
        Ok(config)
    }
}

/// Asset sent from governance to an account before the first step. The
/// vault is approved to pull all of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Funding {
    pub account: Account,
    pub amount: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub vault: VaultSection,
    /// Asset supply minted to governance at genesis.
    #[serde(default = "default_genesis_supply")]
    pub genesis_supply: u64,
    /// Accounts the vault treats as contracts.
    #[serde(default)]
    pub contracts: Vec<Account>,
    #[serde(default)]
    pub funding: Vec<Funding>,
    pub steps: Vec<Step>,
}

fn default_genesis_supply() -> u64 {
    DEFAULT_GENESIS_SUPPLY
}

impl Scenario {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("malformed scenario")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    pub caller: Account,
    #[serde(flatten)]
    pub action: Action,
    /// `"ok"` or an error kind.
    #[serde(default)]
    pub expect: Option<String>,
}

/// One vault call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Pause,
    Unpause,
    Deposit { amount: u64 },
    DepositAll,
    Withdraw { shares: u64 },
    WithdrawAll,
    Transfer { to: Account, shares: u64 },
    TransferFrom { owner: Account, to: Account, shares: u64 },
    Approve { spender: Account, shares: u64 },
    IncreaseAllowance { spender: Account, delta: u64 },
    DecreaseAllowance { spender: Account, delta: u64 },
    SetWithdrawalFee { bps: u64 },
    ApproveContractAccess { contract: Account },
    RevokeContractAccess { contract: Account },
    SetRole { role: RoleKind, holder: Account },
    /// The caller borrows `amount` from `lender`, deposits it, withdraws
    /// everything and repays in full, all as one transaction.
    FlashLoan { lender: Account, amount: u64 },
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Pause => "pause",
            Action::Unpause => "unpause",
            Action::Deposit { .. } => "deposit",
            Action::DepositAll => "deposit_all",
            Action::Withdraw { .. } => "withdraw",
            Action::WithdrawAll => "withdraw_all",
            Action::Transfer { .. } => "transfer",
            Action::TransferFrom { .. } => "transfer_from",
            Action::Approve { .. } => "approve",
            Action::IncreaseAllowance { .. } => "increase_allowance",
            Action::DecreaseAllowance { .. } => "decrease_allowance",
            Action::SetWithdrawalFee { .. } => "set_withdrawal_fee",
            Action::ApproveContractAccess { .. } => "approve_contract_access",
            Action::RevokeContractAccess { .. } => "revoke_contract_access",
            Action::SetRole { .. } => "set_role",
            Action::FlashLoan { .. } => "flash_loan",
        }
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepResult {
    Ok {
        #[serde(skip_serializing_if = "Option::is_none")]
        value: Option<u64>,
    },
    Rejected {
        kind: String,
        reason: String,
    },
}

impl StepResult {
    fn from_call(result: &Result<Option<u64>, VaultError>) -> Self {
        match result {
            Ok(value) => StepResult::Ok { value: *value },
            Err(e) => StepResult::Rejected {
                kind: e.kind().as_str().to_string(),
                reason: e.to_string(),
            },
        }
    }

    fn matches(&self, expect: &str) -> bool {
        match self {
            StepResult::Ok { .. } => expect == "ok",
            StepResult::Rejected { kind, .. } => expect == kind,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    pub index: usize,
    pub caller: String,
    pub action: &'static str,
    #[serde(flatten)]
    pub result: StepResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    pub matched: bool,
}

/// Vault books at the end of a run.
#[derive(Debug, Clone, Serialize)]
pub struct VaultSummary {
    pub address: Address,
    pub paused: bool,
    pub withdrawal_fee_bps: u64,
    pub total_supply: u64,
    pub total_assets: u64,
    pub price_per_share: u128,
    pub events: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub name: String,
    pub started_at: DateTime<Utc>,
    pub outcomes: Vec<StepOutcome>,
    pub summary: VaultSummary,
    pub mismatches: usize,
}

impl Report {
    /// Fixed-width text table, one line per step, then the summary.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "scenario: {}", self.name);
        for o in &self.outcomes {
            let result = match &o.result {
                StepResult::Ok { value: Some(v) } => format!("ok {v}"),
                StepResult::Ok { value: None } => "ok".to_string(),
                StepResult::Rejected { kind, reason } => format!("rejected [{kind}] {reason}"),
            };
            let _ = write!(out, "[{:02}] {:<20} {:<24} {}", o.index, o.caller, o.action, result);
            if !o.matched {
                if let Some(expected) = &o.expected {
                    let _ = write!(out, "  (expected {expected})");
                }
            }
            out.push('\n');
        }
        let s = &self.summary;
        let _ = writeln!(
            out,
            "vault {}: paused={} fee={}bps supply={} assets={} price={} events={}",
            s.address, s.paused, s.withdrawal_fee_bps, s.total_supply, s.total_assets, s.price_per_share, s.events
        );
        let _ = writeln!(out, "mismatches: {}", self.mismatches);
        out
    }
}

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

/// Builds the vault a scenario describes and replays its steps.
///
/// `config_override` replaces the scenario's `vault` section. Rejected
/// calls are outcomes, not errors; this only fails on a malformed scenario
/// or an impossible setup.
pub fn run(scenario: &Scenario, config_override: Option<VaultConfig>, metrics: &VaultMetrics) -> Result<Report> {
    let config = match config_override {
        Some(config) => config,
        None => scenario.vault.to_config()?,
    };
    config.validate().context("invalid vault config")?;

    let contracts = scenario
        .contracts
        .iter()
        .map(|c| c.resolve().with_context(|| format!("invalid contract address {c}")))
        .collect::<Result<Vec<_>>>()?;

    let ledger = InMemoryLedger::with_supply(config.asset_symbol.clone(), config.governance, scenario.genesis_supply);
    let mut vault = Vault::with_classifier(&config, ledger, Box::new(KnownContracts::new(contracts)))
        .context("failed to create vault")?;

    for funding in &scenario.funding {
        fund(&mut vault, config.governance, funding)
            .with_context(|| format!("failed to fund {}", funding.account))?;
    }

    info!(scenario = %scenario.name, steps = scenario.steps.len(), "replaying scenario");
    let started_at = Utc::now();
    let mut outcomes = Vec::with_capacity(scenario.steps.len());

    for (index, step) in scenario.steps.iter().enumerate() {
        let caller = step
            .caller
            .resolve()
            .with_context(|| format!("step {index}: invalid caller {}", step.caller))?;

        let result = execute(&mut vault, caller, &step.action).with_context(|| format!("step {index}"))?;
        metrics.record_call(step.action.name(), result.as_ref().err());

        let result = StepResult::from_call(&result);
        let matched = step.expect.as_deref().map_or(true, |e| result.matches(e));
        if !matched {
            warn!(index, action = step.action.name(), expected = ?step.expect, "unexpected outcome");
        }
        debug!(index, caller = %step.caller, action = step.action.name(), ?result, "step replayed");

        outcomes.push(StepOutcome {
            index,
            caller: step.caller.to_string(),
            action: step.action.name(),
            result,
            expected: step.expect.clone(),
            matched,
        });
    }
    metrics.observe(&vault);

    let mismatches = outcomes.iter().filter(|o| !o.matched).count();
    info!(scenario = %scenario.name, mismatches, "scenario finished");

    Ok(Report {
        name: scenario.name.clone(),
        started_at,
        outcomes,
        summary: VaultSummary {
            address: vault.address(),
            paused: vault.paused(),
            withdrawal_fee_bps: vault.withdrawal_fee(),
            total_supply: vault.total_supply(),
            total_assets: vault.total_assets(),
            price_per_share: vault.price_per_share(),
            events: vault.events().len(),
        },
        mismatches,
    })
}

fn fund(vault: &mut Vault, from: Address, funding: &Funding) -> Result<()> {
    let to = funding.account.resolve()?;
    let vault_address = vault.address();
    let ledger = vault.asset_mut();
    ledger.transfer(from, to, funding.amount)?;
    let allowance = ledger.allowance(to, vault_address).saturating_add(funding.amount);
    ledger.approve(to, vault_address, allowance)?;
    Ok(())
}

/// Issues one call. The outer `Result` is a bad account reference; the
/// inner one is the vault's verdict.
fn execute(vault: &mut Vault, caller: Address, action: &Action) -> Result<Result<Option<u64>, VaultError>> {
    let result = match action {
        Action::Pause => vault.pause(caller).map(|_| None),
        Action::Unpause => vault.unpause(caller).map(|_| None),
        Action::Deposit { amount } => vault.deposit(caller, *amount).map(Some),
        Action::DepositAll => vault.deposit_all(caller).map(Some),
        Action::Withdraw { shares } => vault.withdraw(caller, *shares).map(Some),
        Action::WithdrawAll => vault.withdraw_all(caller).map(Some),
        Action::Transfer { to, shares } => vault.transfer(caller, to.resolve()?, *shares).map(|_| None),
        Action::TransferFrom { owner, to, shares } => vault
            .transfer_from(caller, owner.resolve()?, to.resolve()?, *shares)
            .map(|_| None),
        Action::Approve { spender, shares } => vault.approve(caller, spender.resolve()?, *shares).map(|_| None),
        Action::IncreaseAllowance { spender, delta } => vault
            .increase_allowance(caller, spender.resolve()?, *delta)
            .map(|_| None),
        Action::DecreaseAllowance { spender, delta } => vault
            .decrease_allowance(caller, spender.resolve()?, *delta)
            .map(|_| None),
        Action::SetWithdrawalFee { bps } => vault.set_withdrawal_fee(caller, *bps).map(|_| None),
        Action::ApproveContractAccess { contract } => vault
            .approve_contract_access(caller, contract.resolve()?)
            .map(|_| None),
        Action::RevokeContractAccess { contract } => vault
            .revoke_contract_access(caller, contract.resolve()?)
            .map(|_| None),
        Action::SetRole { role, holder } => vault.set_role(caller, *role, holder.resolve()?).map(|_| None),
        Action::FlashLoan { lender, amount } => flash_loan(vault, caller, lender.resolve()?, *amount).map(Some),
    };
    Ok(result)
}

/// Borrow, deposit, withdraw, repay. Returns what the withdrawal paid out.
fn flash_loan(vault: &mut Vault, borrower: Address, lender: Address, amount: u64) -> Result<u64, VaultError> {
    vault.atomically(|v| -> Result<u64, VaultError> {
        let vault_address = v.address();
        v.asset_mut().transfer(lender, borrower, amount)?;
        v.asset_mut().approve(borrower, vault_address, amount)?;
        v.deposit(borrower, amount)?;
        let returned = v.withdraw_all(borrower)?;
        v.asset_mut().transfer(borrower, lender, amount)?;
        Ok(returned)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEE_SCENARIO: &str = r#"{
        "name": "fee",
        "vault": {
            "governance": "gov",
            "guardian": "guardian",
            "strategist": "strategist",
            "keeper": "keeper"
        },
        "funding": [{ "account": "rando", "amount": 1000 }],
        "steps": [
            { "caller": "rando", "action": "set_withdrawal_fee", "bps": 50, "expect": "unauthorized" },
            { "caller": "gov", "action": "set_withdrawal_fee", "bps": 100, "expect": "fee_too_high" },
            { "caller": "gov", "action": "set_withdrawal_fee", "bps": 50, "expect": "ok" },
            { "caller": "rando", "action": "deposit", "amount": 1000, "expect": "ok" },
            { "caller": "rando", "action": "withdraw_all", "expect": "ok" }
        ]
    }"#;

    fn replay(json: &str) -> Report {
        let scenario = Scenario::from_json(json).unwrap();
        run(&scenario, None, &VaultMetrics::new().unwrap()).unwrap()
    }

    #[test]
    fn parses_flattened_actions() {
        let scenario = Scenario::from_json(FEE_SCENARIO).unwrap();
        assert_eq!(scenario.steps.len(), 5);
        assert_eq!(scenario.genesis_supply, DEFAULT_GENESIS_SUPPLY);
        assert!(matches!(scenario.steps[0].action, Action::SetWithdrawalFee { bps: 50 }));
        assert!(matches!(scenario.steps[4].action, Action::WithdrawAll));
        assert_eq!(scenario.steps[4].expect.as_deref(), Some("ok"));
    }

    #[test]
    fn replays_fee_scenario() {
        let report = replay(FEE_SCENARIO);
        assert_eq!(report.mismatches, 0);
        assert_eq!(report.outcomes[4].result, StepResult::Ok { value: Some(995) });
        assert_eq!(report.summary.total_assets, 5);
        assert_eq!(report.summary.total_supply, 0);
        assert_eq!(report.summary.withdrawal_fee_bps, 50);
    }

    #[test]
    fn counts_mismatches() {
        let json = FEE_SCENARIO.replace(r#""bps": 100, "expect": "fee_too_high""#, r#""bps": 100, "expect": "ok""#);
        let report = replay(&json);
        assert_eq!(report.mismatches, 1);
        assert!(!report.outcomes[1].matched);
        assert!(report.render().contains("(expected ok)"));
    }

    #[test]
    fn flash_loan_needs_allowlisting() {
        let report = replay(
            r#"{
                "name": "flash",
                "vault": { "governance": "gov", "guardian": "guardian",
                           "strategist": "strategist", "keeper": "keeper" },
                "contracts": ["flash-borrower"],
                "steps": [
                    { "caller": "flash-borrower", "action": "flash_loan", "lender": "gov", "amount": 500, "expect": "unauthorized" },
                    { "caller": "gov", "action": "approve_contract_access", "contract": "flash-borrower" },
                    { "caller": "flash-borrower", "action": "flash_loan", "lender": "gov", "amount": 500, "expect": "ok" }
                ]
            }"#,
        );
        assert_eq!(report.mismatches, 0);
        assert_eq!(report.outcomes[2].result, StepResult::Ok { value: Some(500) });
        assert_eq!(report.summary.total_supply, 0);
    }

    #[test]
    fn hex_and_label_accounts() {
        let gov = Address::derive("gov");
        assert_eq!(Account::from("gov").resolve().unwrap(), gov);
        assert_eq!(Account(gov.to_hex()).resolve().unwrap(), gov);
        assert!(Account::from("0xnothex").resolve().is_err());
    }

    #[test]
    fn config_override_replaces_vault_section() {
        let scenario = Scenario::from_json(FEE_SCENARIO).unwrap();
        let mut config = scenario.vault.to_config().unwrap();
        config.withdrawal_fee_bps = 99;
        let report = run(&scenario, Some(config), &VaultMetrics::new().unwrap()).unwrap();
        // The third step lowers the fee from 99 to 50.
        assert_eq!(report.summary.withdrawal_fee_bps, 50);
    }

    #[test]
    fn invalid_setup_is_an_error() {
        let json = FEE_SCENARIO.replace(r#""amount": 1000 }]"#, r#""amount": 1000000000000001 }]"#);
        let scenario = Scenario::from_json(&json).unwrap();
        assert!(run(&scenario, None, &VaultMetrics::new().unwrap()).is_err());
    }

    #[test]
    fn bundled_demo_has_no_mismatches() {
        let report = replay(include_str!("../scenarios/sett_edits.json"));
        assert_eq!(report.mismatches, 0, "{}", report.render());
    }

    #[test]
    fn report_serializes_flat_status() {
        let report = replay(FEE_SCENARIO);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["outcomes"][0]["status"], "rejected");
        assert_eq!(json["outcomes"][0]["kind"], "unauthorized");
        assert_eq!(json["outcomes"][4]["value"], 995);
    }
}
