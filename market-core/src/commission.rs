//! Operator commission policy
//!
//! Every sale, primary or resale, pays the operator a fixed share of the
//! gross proceeds. The split is exact: the fee is floored to the smallest
//! currency unit and the rounding remainder stays on the seller side, so
//! `fee + net == proceeds` for every non-negative amount.

use crate::types::Money;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Basis points in a whole (100%)
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Default commission: 5% of gross proceeds
pub const DEFAULT_RATE_BPS: u32 = 500;

/// Result of splitting sale proceeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSplit {
    /// Share owed to the marketplace operator
    pub fee: Money,

    /// Net proceeds owed to the seller side
    pub net: Money,
}

/// Global commission policy
///
/// A single rate applies to all sales. It changes only through the
/// engine's operator-only administrative operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionPolicy {
    rate_bps: u32,
}

impl CommissionPolicy {
    /// Create a policy with the given rate in basis points
    pub fn new(rate_bps: u32) -> Result<Self> {
        if rate_bps > BPS_DENOMINATOR {
            return Err(Error::InvalidInput(format!(
                "Commission rate {} bps exceeds {} bps",
                rate_bps, BPS_DENOMINATOR
            )));
        }
        Ok(Self { rate_bps })
    }

    /// Current rate in basis points
    pub fn rate_bps(&self) -> u32 {
        self.rate_bps
    }

    /// Split sale proceeds into operator fee and net seller proceeds
    ///
    /// The fee is floored; the remainder stays with the seller, never lost
    /// and never duplicated.
    pub fn split(&self, proceeds: Money) -> FeeSplit {
        // Split proceeds into quotient and remainder by the denominator so
        // the intermediate products cannot overflow even at Money::MAX.
        let denom = Money::from(BPS_DENOMINATOR);
        let rate = Money::from(self.rate_bps);
        let fee = proceeds / denom * rate + proceeds % denom * rate / denom;
        FeeSplit {
            fee,
            net: proceeds - fee,
        }
    }
}

impl Default for CommissionPolicy {
    fn default() -> Self {
        Self {
            rate_bps: DEFAULT_RATE_BPS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rate_is_five_percent() {
        let policy = CommissionPolicy::default();
        assert_eq!(policy.rate_bps(), 500);

        let split = policy.split(100);
        assert_eq!(split.fee, 5);
        assert_eq!(split.net, 95);
    }

    #[test]
    fn test_split_is_exact() {
        let policy = CommissionPolicy::default();
        for proceeds in [0u128, 1, 19, 20, 21, 99, 100, 12_345_678_901_234_567_890] {
            let split = policy.split(proceeds);
            assert_eq!(split.fee + split.net, proceeds);
        }
    }

    #[test]
    fn test_fee_is_floored() {
        let policy = CommissionPolicy::default();

        // 5% of 19 is 0.95: floors to 0, remainder stays with the seller
        let split = policy.split(19);
        assert_eq!(split.fee, 0);
        assert_eq!(split.net, 19);

        // 5% of 21 is 1.05: floors to 1
        let split = policy.split(21);
        assert_eq!(split.fee, 1);
        assert_eq!(split.net, 20);
    }

    #[test]
    fn test_zero_proceeds() {
        let split = CommissionPolicy::default().split(0);
        assert_eq!(split.fee, 0);
        assert_eq!(split.net, 0);
    }

    #[test]
    fn test_rate_bounds() {
        assert!(CommissionPolicy::new(0).is_ok());
        assert!(CommissionPolicy::new(10_000).is_ok());
        assert!(matches!(
            CommissionPolicy::new(10_001),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_full_rate_takes_everything() {
        let policy = CommissionPolicy::new(10_000).unwrap();
        let split = policy.split(1234);
        assert_eq!(split.fee, 1234);
        assert_eq!(split.net, 0);
    }

    #[test]
    fn test_huge_proceeds_do_not_overflow() {
        let policy = CommissionPolicy::default();
        let proceeds = Money::MAX;
        let split = policy.split(proceeds);
        assert_eq!(split.fee + split.net, proceeds);
    }
}
