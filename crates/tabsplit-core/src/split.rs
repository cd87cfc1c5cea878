//! # Split Engine
//!
//! Turns "this item is shared by these people" into per-person shares.
//!
//! ## Split Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          split_item()                                   │
//! │                                                                         │
//! │   Nachos: $10.00 × 2 = $20.00      participants: [A, B, C]              │
//! │                  │                                                      │
//! │                  ▼                                                      │
//! │   participants empty? ──yes──► CoreError::EmptySplit                    │
//! │                  │ no                                                   │
//! │                  ▼                                                      │
//! │   split_equally?                                                        │
//! │     ├── yes: pct = 1/3 each, amounts = allocate_evenly(2000, 3)        │
//! │     │          A: 667   B: 667   C: 666      (sum = 2000)               │
//! │     │                                                                   │
//! │     └── no:  pct = 1.0 each, amount = full line total each             │
//! │                A: 2000  B: 2000  C: 2000                                │
//! │              (caller adjusts individual assignments afterwards)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Shares are returned in the same order as the participant ids.

use crate::error::{CoreError, CoreResult};
use crate::money::Money;

/// One participant's share of an item.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitShare {
    pub participant_id: String,
    /// Fraction of the item in [0, 1].
    pub split_percentage: f64,
    pub amount: Money,
}

/// Computes each participant's share of an item's line total.
///
/// ## Example
/// ```rust
/// use tabsplit_core::money::Money;
/// use tabsplit_core::split::split_item;
///
/// let ids = vec!["a".to_string(), "b".to_string()];
/// let shares = split_item(Money::from_cents(1500), &ids, true).unwrap();
///
/// assert_eq!(shares[0].amount.cents(), 750);
/// assert_eq!(shares[1].split_percentage, 0.5);
/// ```
pub fn split_item(
    line_total: Money,
    participant_ids: &[String],
    split_equally: bool,
) -> CoreResult<Vec<SplitShare>> {
    if participant_ids.is_empty() {
        return Err(CoreError::EmptySplit);
    }

    if !split_equally {
        return Ok(participant_ids
            .iter()
            .map(|id| SplitShare {
                participant_id: id.clone(),
                split_percentage: 1.0,
                amount: line_total,
            })
            .collect());
    }

    let split_percentage = 1.0 / participant_ids.len() as f64;
    let amounts = line_total.allocate_evenly(participant_ids.len());

    Ok(participant_ids
        .iter()
        .zip(amounts)
        .map(|(id, amount)| SplitShare {
            participant_id: id.clone(),
            split_percentage,
            amount,
        })
        .collect())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("p{}", i)).collect()
    }

    #[test]
    fn test_equal_split_three_ways() {
        let shares = split_item(Money::from_cents(2000), &ids(3), true).unwrap();

        assert_eq!(shares.len(), 3);
        assert_eq!(
            shares.iter().map(|s| s.amount.cents()).collect::<Vec<_>>(),
            vec![667, 667, 666]
        );
        for share in &shares {
            assert!((share.split_percentage - 1.0 / 3.0).abs() < 1e-12);
        }
        assert_eq!(shares[0].participant_id, "p0");
        assert_eq!(shares[2].participant_id, "p2");
    }

    #[test]
    fn test_equal_split_sums_to_line_total() {
        for n in 1..=7 {
            let shares = split_item(Money::from_cents(1999), &ids(n), true).unwrap();
            let sum: Money = shares.iter().map(|s| s.amount).sum();
            assert_eq!(sum.cents(), 1999, "n = {}", n);
        }
    }

    #[test]
    fn test_single_participant_gets_everything() {
        let shares = split_item(Money::from_cents(1234), &ids(1), true).unwrap();
        assert_eq!(shares[0].amount.cents(), 1234);
        assert_eq!(shares[0].split_percentage, 1.0);
    }

    #[test]
    fn test_unequal_split_gives_full_share() {
        let shares = split_item(Money::from_cents(900), &ids(2), false).unwrap();
        assert!(shares
            .iter()
            .all(|s| s.amount.cents() == 900 && s.split_percentage == 1.0));
    }

    #[test]
    fn test_empty_participants_rejected() {
        let result = split_item(Money::from_cents(900), &[], true);
        assert!(matches!(result, Err(CoreError::EmptySplit)));
    }

    #[test]
    fn test_zero_priced_item() {
        let shares = split_item(Money::zero(), &ids(2), true).unwrap();
        assert!(shares.iter().all(|s| s.amount.is_zero()));
    }
}
