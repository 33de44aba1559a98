//! Property-based tests for journal line validation.

use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::error::LedgerError;
use super::types::JournalLineInput;
use super::validation::validate_lines;

/// Strategy to generate a valid positive amount (0.01 to 1,000,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Builds a balanced entry: one debit line per amount, one credit line for the sum.
fn balanced_lines(amounts: &[Decimal]) -> Vec<JournalLineInput> {
    let mut lines: Vec<JournalLineInput> = amounts
        .iter()
        .map(|a| JournalLineInput::debit(Uuid::new_v4(), *a))
        .collect();
    let total: Decimal = amounts.iter().copied().sum();
    lines.push(JournalLineInput::credit(Uuid::new_v4(), total));
    lines
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property 1.1: Balanced entries are accepted.
    ///
    /// *For any* set of debit lines offset by one credit line for their sum,
    /// validation SHALL accept the entry and report equal totals.
    #[test]
    fn prop_balanced_entries_accepted(
        amounts in prop::collection::vec(positive_amount(), 1..10),
    ) {
        let lines = balanced_lines(&amounts);
        let totals = validate_lines(&lines);
        prop_assert!(totals.is_ok(), "balanced entry rejected: {:?}", totals);
        let totals = totals.unwrap();
        prop_assert_eq!(totals.total_debit, totals.total_credit);
    }

    /// Property 1.2: Any imbalance is rejected.
    ///
    /// *For any* balanced entry with one extra unmatched debit line,
    /// validation SHALL reject it as unbalanced.
    #[test]
    fn prop_unbalanced_entries_rejected(
        amounts in prop::collection::vec(positive_amount(), 1..10),
        extra in positive_amount(),
    ) {
        let mut lines = balanced_lines(&amounts);
        lines.push(JournalLineInput::debit(Uuid::new_v4(), extra));

        let result = validate_lines(&lines);
        prop_assert!(
            matches!(result, Err(LedgerError::UnbalancedEntry { .. })),
            "imbalance should be rejected, got: {:?}",
            result
        );
    }

    /// Property 1.3: Two-sided lines are rejected.
    ///
    /// *For any* line with both a debit and a credit amount, validation SHALL
    /// reject the entry even when the totals balance.
    #[test]
    fn prop_two_sided_line_rejected(amount in positive_amount()) {
        let lines = vec![
            JournalLineInput {
                account_id: Uuid::new_v4(),
                debit_amount: amount,
                credit_amount: amount,
                description: None,
            },
            JournalLineInput::debit(Uuid::new_v4(), amount),
            JournalLineInput::credit(Uuid::new_v4(), amount),
        ];

        let result = validate_lines(&lines);
        prop_assert!(
            matches!(result, Err(LedgerError::InvalidLineSide { line: 1 })),
            "two-sided line should be rejected, got: {:?}",
            result
        );
    }

    /// Property 1.4: Negative amounts are rejected.
    #[test]
    fn prop_negative_amount_rejected(amount in positive_amount()) {
        let lines = vec![
            JournalLineInput::debit(Uuid::new_v4(), -amount),
            JournalLineInput::credit(Uuid::new_v4(), -amount),
        ];

        let result = validate_lines(&lines);
        prop_assert!(
            matches!(result, Err(LedgerError::NegativeAmount { line: 1 })),
            "negative amount should be rejected, got: {:?}",
            result
        );
    }
}
