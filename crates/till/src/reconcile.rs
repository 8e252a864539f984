use serde::{Deserialize, Serialize};

use posforge_core::Amount;

/// Outcome of comparing counted cash against the ledger's expected balance.
///
/// A non-zero difference is a recorded fact, not an error; whether it is
/// surfaced as an alert is a reporting concern.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reconciliation {
    pub expected: Amount,
    pub counted: Amount,
    /// `counted - expected`. Negative means the drawer is short.
    pub difference: Amount,
}

/// Reconcile a physically counted amount against the expected balance.
///
/// Pure: no side effects, no rounding beyond the minor unit the amounts
/// already carry.
pub fn reconcile(expected: Amount, counted: Amount) -> Reconciliation {
    // Minor-unit i64 domain makes overflow here unreachable for real drawers;
    // saturate rather than wrap if it ever happens.
    let difference = Amount::from_minor(counted.minor().saturating_sub(expected.minor()));
    Reconciliation {
        expected,
        counted,
        difference,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difference_is_counted_minus_expected() {
        let r = reconcile(Amount::from_minor(130_000), Amount::from_minor(129_000));
        assert_eq!(r.expected, Amount::from_minor(130_000));
        assert_eq!(r.counted, Amount::from_minor(129_000));
        assert_eq!(r.difference, Amount::from_minor(-1_000));
    }

    #[test]
    fn exact_count_has_zero_difference() {
        let r = reconcile(Amount::from_minor(50_00), Amount::from_minor(50_00));
        assert!(r.difference.is_zero());
    }

    #[test]
    fn overage_is_positive() {
        let r = reconcile(Amount::from_minor(100), Amount::from_minor(150));
        assert_eq!(r.difference, Amount::from_minor(50));
    }
}
