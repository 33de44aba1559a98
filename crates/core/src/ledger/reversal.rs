//! Reversing entries for posted journals.
//!
//! A reversal copies every line of the original with debit and credit
//! swapped, so the pair nets to zero on every account.

use rust_decimal::Decimal;
use uuid::Uuid;

use super::types::{JournalLineInput, JournalTotals};

/// Suffix appended to the original number.
pub const REVERSAL_SUFFIX: &str = "-R";

/// A line of the entry being reversed.
#[derive(Debug, Clone)]
pub struct OriginalLine {
    /// The account ID.
    pub account_id: Uuid,
    /// Debit amount (0 if credit).
    pub debit: Decimal,
    /// Credit amount (0 if debit).
    pub credit: Decimal,
    /// Optional line description.
    pub description: Option<String>,
}

/// Everything needed to insert the reversing entry.
#[derive(Debug, Clone)]
pub struct ReversalPlan {
    /// Journal number of the reversing entry.
    pub number: String,
    /// Header description.
    pub description: String,
    /// Swapped lines, in original order.
    pub lines: Vec<JournalLineInput>,
    /// Totals of the swapped lines.
    pub totals: JournalTotals,
}

/// Stateless builder for reversing entries.
pub struct ReversalService;

impl ReversalService {
    /// Builds the reversing entry for `original_number`.
    ///
    /// Line descriptions are prefixed with "Reversal: ". The header reads
    /// "Reversal of {number}", followed by the reason when one is given.
    #[must_use]
    pub fn plan(original_number: &str, original_lines: &[OriginalLine], reason: Option<&str>) -> ReversalPlan {
        let lines: Vec<JournalLineInput> = original_lines
            .iter()
            .map(|line| JournalLineInput {
                account_id: line.account_id,
                debit_amount: line.credit,
                credit_amount: line.debit,
                description: Some(format!(
                    "Reversal: {}",
                    line.description.as_deref().unwrap_or_default()
                )),
            })
            .collect();

        let description = match reason.map(str::trim).filter(|r| !r.is_empty()) {
            Some(reason) => format!("Reversal of {original_number}. Reason: {reason}"),
            None => format!("Reversal of {original_number}"),
        };

        ReversalPlan {
            number: reversal_number(original_number),
            description,
            totals: JournalTotals::of(&lines),
            lines,
        }
    }
}

/// Number of the reversing entry: `{original}-R`.
#[must_use]
pub fn reversal_number(original_number: &str) -> String {
    format!("{original_number}{REVERSAL_SUFFIX}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn sample_lines() -> Vec<OriginalLine> {
        vec![
            OriginalLine {
                account_id: Uuid::new_v4(),
                debit: dec!(20000),
                credit: Decimal::ZERO,
                description: Some("Retur penjualan".to_string()),
            },
            OriginalLine {
                account_id: Uuid::new_v4(),
                debit: Decimal::ZERO,
                credit: dec!(20000),
                description: None,
            },
        ]
    }

    #[test]
    fn test_plan_swaps_sides() {
        let original = sample_lines();
        let plan = ReversalService::plan("JU/202401/0007", &original, Some("salah akun"));

        assert_eq!(plan.number, "JU/202401/0007-R");
        assert_eq!(plan.description, "Reversal of JU/202401/0007. Reason: salah akun");
        assert_eq!(plan.lines[0].credit_amount, dec!(20000));
        assert_eq!(plan.lines[0].debit_amount, Decimal::ZERO);
        assert_eq!(plan.lines[1].debit_amount, dec!(20000));
        assert_eq!(
            plan.lines[0].description.as_deref(),
            Some("Reversal: Retur penjualan")
        );
        assert_eq!(plan.lines[0].account_id, original[0].account_id);
    }

    #[test]
    fn test_plan_without_reason() {
        let plan = ReversalService::plan("7", &sample_lines(), Some("  "));
        assert_eq!(plan.description, "Reversal of 7");
    }

    fn line_strategy() -> impl Strategy<Value = (bool, i64)> {
        (any::<bool>(), 1i64..10_000_000i64)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// **Property: Reversal swaps every line**
        ///
        /// *For any* original entry, each reversing line's debit equals the
        /// original credit and vice versa, and the reversal totals equal the
        /// original totals swapped.
        #[test]
        fn prop_reversal_swaps_lines_and_totals(
            raw in prop::collection::vec(line_strategy(), 2..12),
        ) {
            let original: Vec<OriginalLine> = raw
                .iter()
                .map(|(is_debit, cents)| {
                    let amount = Decimal::new(*cents, 2);
                    OriginalLine {
                        account_id: Uuid::new_v4(),
                        debit: if *is_debit { amount } else { Decimal::ZERO },
                        credit: if *is_debit { Decimal::ZERO } else { amount },
                        description: None,
                    }
                })
                .collect();

            let plan = ReversalService::plan("N", &original, None);

            prop_assert_eq!(plan.lines.len(), original.len());
            for (reversed, orig) in plan.lines.iter().zip(&original) {
                prop_assert_eq!(reversed.debit_amount, orig.credit);
                prop_assert_eq!(reversed.credit_amount, orig.debit);
                prop_assert_eq!(reversed.account_id, orig.account_id);
            }

            let orig_debit: Decimal = original.iter().map(|l| l.debit).sum();
            let orig_credit: Decimal = original.iter().map(|l| l.credit).sum();
            prop_assert_eq!(plan.totals.total_debit, orig_credit);
            prop_assert_eq!(plan.totals.total_credit, orig_debit);
        }
    }
}
