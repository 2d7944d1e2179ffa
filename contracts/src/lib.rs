//! # Sett Vault Contracts
//!
//! A host-neutral implementation of a share-priced asset vault with the
//! access control it needs to survive adversarial callers:
//!
//! - **Roles**: governance, guardian, strategist, keeper
//!   ([`roles`]).
//! - **Contract allowlist**: contract callers must be approved before
//!   they can move value in or out ([`allowlist`], [`caller`]).
//! - **Share accounting**: deposits mint at the current exchange rate,
//!   withdrawals redeem proportionally ([`shares`]).
//! - **Withdrawal fee**: a capped basis-point haircut that stays with the
//!   remaining holders ([`fees`]).
//! - **State machine**: pause gating and the all-or-nothing call boundary
//!   that ties the pieces together ([`vault`]).
//!
//! ## Design Principles
//!
//! 1. All share and asset arithmetic is checked. Products are taken in
//!    `u128` before dividing back down.
//! 2. A rejected call changes nothing: not the vault, not the asset
//!    ledger, not the event log.
//! 3. Guards run before effects, effects before ledger transfers.
//! 4. Every piece of state is serializable (serde) for snapshots and
//!    inspection.

pub mod allowlist;
pub mod caller;
pub mod error;
pub mod events;
pub mod fees;
pub mod roles;
pub mod shares;
pub mod vault;

pub use caller::{CallerClassifier, EoaOnly, KnownContracts};
pub use error::{ErrorKind, Requirement, VaultError};
pub use events::{EventRecord, VaultEvent};
pub use roles::RoleKind;
pub use vault::{Vault, VaultState, VaultStatus};
