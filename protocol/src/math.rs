//! Checked fixed-point helpers for share and fee arithmetic.
//!
//! Amounts are `u64`; products are taken in `u128` so `a * b` can never
//! wrap before the division. Results that don't fit back into `u64` are
//! reported as `None` and the caller decides which error that is.

use crate::config::{BPS_DENOMINATOR, PRICE_PRECISION};

/// `floor(a * b / denominator)`, or `None` on a zero denominator or a
/// result wider than `u64`.
pub fn mul_div(a: u64, b: u64, denominator: u64) -> Option<u64> {
    if denominator == 0 {
        return None;
    }
    let product = (a as u128) * (b as u128);
    u64::try_from(product / denominator as u128).ok()
}

/// Basis-point share of `amount`, rounded down.
pub fn bps_of(amount: u64, bps: u64) -> Option<u64> {
    mul_div(amount, bps, BPS_DENOMINATOR)
}

/// Price of one share in asset units, scaled by [`PRICE_PRECISION`].
///
/// An empty pool prices at exactly 1.0 so the bootstrap deposit mints 1:1.
pub fn price_per_share(total_assets: u64, total_shares: u64) -> u128 {
    if total_shares == 0 {
        return PRICE_PRECISION;
    }
    // u64::MAX * 1e18 < u128::MAX, so this cannot overflow.
    (total_assets as u128) * PRICE_PRECISION / total_shares as u128
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mul_div_floors() {
        assert_eq!(mul_div(10, 1, 3), Some(3));
        assert_eq!(mul_div(1000, 3000, 3000), Some(1000));
        assert_eq!(mul_div(u64::MAX, u64::MAX, u64::MAX), Some(u64::MAX));
    }

    #[test]
    fn mul_div_rejects_zero_denominator_and_overflow() {
        assert_eq!(mul_div(1, 1, 0), None);
        assert_eq!(mul_div(u64::MAX, 2, 1), None);
    }

    #[test]
    fn bps_math() {
        assert_eq!(bps_of(1000, 50), Some(5));
        assert_eq!(bps_of(199, 50), Some(0));
        assert_eq!(bps_of(10_000, 10_000), Some(10_000));
    }

    #[test]
    fn empty_pool_prices_at_one() {
        assert_eq!(price_per_share(0, 0), PRICE_PRECISION);
        assert_eq!(price_per_share(5, 0), PRICE_PRECISION);
    }

    #[test]
    fn price_tracks_assets_per_share() {
        assert_eq!(price_per_share(1000, 1000), PRICE_PRECISION);
        assert_eq!(price_per_share(2000, 1000), 2 * PRICE_PRECISION);
        assert_eq!(price_per_share(u64::MAX, 1), u64::MAX as u128 * PRICE_PRECISION);
    }
}
