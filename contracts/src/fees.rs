//! # Withdrawal Fee
//!
//! A basis-point haircut on every withdrawal. The fee is not sent anywhere:
//! it stays in the pool's asset total, so each early exit slightly raises
//! the price per share for everyone who stays.

use serde::{Deserialize, Serialize};
use sett_protocol::config::MAX_WITHDRAWAL_FEE_BPS;
use sett_protocol::math::bps_of;

use crate::error::VaultError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeCalculator {
    withdrawal_fee_bps: u64,
}

impl FeeCalculator {
    /// Creates a calculator with an initial fee, checked against the cap.
    pub fn new(withdrawal_fee_bps: u64) -> Result<Self, VaultError> {
        let mut fees = Self::default();
        fees.set_fee(withdrawal_fee_bps)?;
        Ok(fees)
    }

    pub fn withdrawal_fee_bps(&self) -> u64 {
        self.withdrawal_fee_bps
    }

    /// Replaces the fee and returns the old one.
    ///
    /// # Errors
    ///
    /// [`VaultError::FeeTooHigh`] when `bps >= MAX_WITHDRAWAL_FEE_BPS`.
    pub fn set_fee(&mut self, bps: u64) -> Result<u64, VaultError> {
        if bps >= MAX_WITHDRAWAL_FEE_BPS {
            return Err(VaultError::FeeTooHigh {
                requested: bps,
                max: MAX_WITHDRAWAL_FEE_BPS,
            });
        }
        Ok(std::mem::replace(&mut self.withdrawal_fee_bps, bps))
    }

    /// Splits a gross payout into `(net, fee)`. The fee rounds down, so
    /// rounding always favours the withdrawer.
    pub fn apply_withdrawal_fee(&self, gross: u64) -> Result<(u64, u64), VaultError> {
        let fee = bps_of(gross, self.withdrawal_fee_bps).ok_or(VaultError::Overflow)?;
        Ok((gross - fee, fee))
    }
}
