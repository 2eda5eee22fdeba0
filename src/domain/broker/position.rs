//! TP/SL position-sharing pool (§4.8): tracks how much of a balance's
//! available funds are already backing the *aggregate* of live strategy
//! (TP/SL) orders on one side of the position, so that a TP and its sibling
//! SL — which can never both execute — don't each independently lock up the
//! full notional.

use rust_decimal::Decimal;

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct PositionPool {
    pub aggregated: Decimal,
    pub shared: Decimal,
}

impl PositionPool {
    /// Amount that must be deducted from `available` to back `total` more
    /// notional on this side: the full amount if `available` covers it
    /// outright, else only the portion not already backed by `shared`.
    pub fn required_hold(&self, total: Decimal, available: Decimal) -> Decimal {
        if total <= available {
            total
        } else {
            (total - self.shared).max(Decimal::ZERO)
        }
    }

    /// Commits a hold already applied to the balance: grows `shared` only on
    /// the fully-covered branch, and always grows `aggregated`.
    pub fn commit_hold(&mut self, total: Decimal, available: Decimal) {
        if total <= available {
            self.shared += total;
        }
        self.aggregated += total;
    }

    /// Releases one order's `total` notional from the aggregate, clamping
    /// `shared` down to the remaining aggregate, and returns the amount that
    /// should be restored to `available` now that less is backed (zero if
    /// the existing shared pool already covers what remains).
    pub fn release(&mut self, total: Decimal, balance_total: Decimal, balance_available: Decimal) -> Decimal {
        self.aggregated -= total;
        if self.shared > self.aggregated {
            self.shared = self.aggregated;
        }
        (balance_total - self.aggregated - balance_available).max(Decimal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn second_sibling_order_reuses_the_shared_pool() {
        let mut pool = PositionPool::default();
        let mut available = dec!(150);

        let hold1 = pool.required_hold(dec!(100), available);
        assert_eq!(hold1, dec!(100));
        pool.commit_hold(dec!(100), available);
        available -= hold1;
        assert_eq!(available, dec!(50));
        assert_eq!(pool.aggregated, dec!(100));
        assert_eq!(pool.shared, dec!(100));

        let hold2 = pool.required_hold(dec!(100), available);
        assert_eq!(hold2, dec!(0)); // fully covered by the existing shared pool
        pool.commit_hold(dec!(100), available);
        assert_eq!(pool.aggregated, dec!(200));
        assert_eq!(pool.shared, dec!(100)); // unchanged on the reuse branch
    }

    #[test]
    fn releasing_the_last_sibling_frees_the_shared_pool() {
        let mut pool = PositionPool {
            aggregated: dec!(200),
            shared: dec!(100),
        };
        let balance_total = dec!(150);
        let mut available = dec!(50);

        let release1 = pool.release(dec!(100), balance_total, available);
        assert_eq!(release1, dec!(0)); // still one sibling outstanding
        available += release1;

        let release2 = pool.release(dec!(100), balance_total, available);
        assert_eq!(release2, dec!(100));
        available += release2;
        assert_eq!(available, balance_total);
        assert_eq!(pool.aggregated, dec!(0));
        assert_eq!(pool.shared, dec!(0));
    }

    #[test]
    fn required_hold_can_exceed_available_when_shared_is_insufficient() {
        let pool = PositionPool {
            aggregated: dec!(100),
            shared: dec!(20),
        };
        // total(500) > available(100); only (500-20)=480 reused-shared discount applies.
        assert_eq!(pool.required_hold(dec!(500), dec!(100)), dec!(480));
    }
}
