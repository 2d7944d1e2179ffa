//! # Prometheus Metrics
//!
//! Counters and gauges for a scenario run, kept in a dedicated
//! [`prometheus::Registry`] under the `sett` namespace and dumped in the
//! text exposition format with `simulate --metrics`.

use prometheus::{Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use sett_contracts::{Vault, VaultError};
use sett_protocol::AssetLedger;

/// Metric handles for one vault.
#[derive(Clone)]
pub struct VaultMetrics {
    registry: Registry,
    /// Vault calls attempted, by action.
    pub calls_total: IntCounterVec,
    /// Vault calls rejected, by error kind.
    pub calls_rejected_total: IntCounterVec,
    /// Asset units backing outstanding shares.
    pub total_assets: IntGauge,
    /// Shares in existence.
    pub total_shares: IntGauge,
}

impl VaultMetrics {
    /// Creates and registers all metrics.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("sett".into()), None)?;

        let calls_total = IntCounterVec::new(
            Opts::new("calls_total", "Vault calls attempted"),
            &["action"],
        )?;
        registry.register(Box::new(calls_total.clone()))?;

        let calls_rejected_total = IntCounterVec::new(
            Opts::new("calls_rejected_total", "Vault calls rejected"),
            &["kind"],
        )?;
        registry.register(Box::new(calls_rejected_total.clone()))?;

        let total_assets = IntGauge::new("total_assets", "Asset units held for share holders")?;
        registry.register(Box::new(total_assets.clone()))?;

        let total_shares = IntGauge::new("total_shares", "Vault shares in existence")?;
        registry.register(Box::new(total_shares.clone()))?;

        Ok(Self {
            registry,
            calls_total,
            calls_rejected_total,
            total_assets,
            total_shares,
        })
    }

    /// Counts one call and, if it failed, its rejection.
    pub fn record_call(&self, action: &str, error: Option<&VaultError>) {
        self.calls_total.with_label_values(&[action]).inc();
        if let Some(e) = error {
            self.calls_rejected_total
                .with_label_values(&[e.kind().as_str()])
                .inc();
        }
    }

    /// Refreshes the pool gauges from the vault's current books.
    pub fn observe<L: AssetLedger + Clone>(&self, vault: &Vault<L>) {
        self.total_assets.set(clamp(vault.total_assets()));
        self.total_shares.set(clamp(vault.total_supply()));
    }

    /// Encodes all registered metrics into the Prometheus text format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

// IntGauge is i64; u64 amounts above i64::MAX saturate.
fn clamp(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
