// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Sett Protocol: Shared Primitives
//!
//! Everything the vault needs from the outside world, reduced to the few
//! pieces it actually touches:
//!
//! - **address**: 20-byte account addresses, hex on the wire.
//! - **config**: fee caps, price precision, and the deploy-time
//!   [`VaultConfig`](config::VaultConfig).
//! - **ledger**: the underlying asset as an [`AssetLedger`](ledger::AssetLedger)
//!   trait plus an in-memory implementation.
//! - **math**: checked mul-div and basis-point helpers.
//!
//! The vault state machine itself lives in `sett-contracts`.

pub mod address;
pub mod config;
pub mod ledger;
pub mod math;

pub use address::Address;
pub use ledger::{AssetLedger, InMemoryLedger, LedgerError};
