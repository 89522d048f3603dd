//! Property-based tests for journal line validation.

use proptest::prelude::*;
use rust_decimal::Decimal;
use tally_shared::types::AccountId;

use super::error::LedgerError;
use super::types::JournalLineInput;
use super::validation::validate_lines;
use crate::invariant::BALANCE_TOLERANCE;

/// Strategy to generate a valid positive amount (> 0).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    // 0.01 to 1,000,000.00
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate a set of debit amounts split across 1-5 lines.
fn debit_amounts() -> impl Strategy<Value = Vec<Decimal>> {
    prop::collection::vec(positive_amount(), 1..=5)
}

/// Credits mirroring `amounts` in a single line.
fn balanced_lines(amounts: &[Decimal]) -> Vec<JournalLineInput> {
    let total: Decimal = amounts.iter().copied().sum();
    let mut lines: Vec<JournalLineInput> = amounts
        .iter()
        .map(|a| JournalLineInput::debit(AccountId::new(), *a))
        .collect();
    lines.push(JournalLineInput::credit(AccountId::new(), total));
    lines
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Debits mirrored by an equal credit always validate, and the returned
    /// totals match the inputs.
    #[test]
    fn prop_balanced_lines_accepted(amounts in debit_amounts()) {
        let lines = balanced_lines(&amounts);
        let totals = validate_lines(&lines, BALANCE_TOLERANCE);
        prop_assert!(totals.is_ok(), "balanced lines rejected: {:?}", totals);
        let totals = totals.unwrap();
        prop_assert_eq!(totals.debit, totals.credit);
        prop_assert_eq!(totals.debit, amounts.iter().copied().sum::<Decimal>());
    }

    /// Any skew of at least one cent is rejected as unbalanced.
    #[test]
    fn prop_skewed_lines_rejected(
        amounts in debit_amounts(),
        skew in positive_amount(),
    ) {
        let mut lines = balanced_lines(&amounts);
        lines[0].debit += skew;

        let result = validate_lines(&lines, BALANCE_TOLERANCE);
        let is_unbalanced = matches!(
            result,
            Err(LedgerError::Unbalanced { difference, .. }) if difference == skew
        );
        prop_assert!(is_unbalanced, "expected Unbalanced, got {:?}", result);
    }

    /// Accepted lines always satisfy the balance invariant.
    #[test]
    fn prop_accepted_implies_balanced(
        debits in prop::collection::vec(positive_amount(), 1..=4),
        credits in prop::collection::vec(positive_amount(), 1..=4),
    ) {
        let lines: Vec<JournalLineInput> = debits
            .iter()
            .map(|a| JournalLineInput::debit(AccountId::new(), *a))
            .chain(credits.iter().map(|a| JournalLineInput::credit(AccountId::new(), *a)))
            .collect();

        if let Ok(totals) = validate_lines(&lines, BALANCE_TOLERANCE) {
            prop_assert!(totals.difference().abs() < BALANCE_TOLERANCE);
        }
    }

    /// A negative amount anywhere is rejected regardless of balance.
    #[test]
    fn prop_negative_amount_rejected(
        amount in positive_amount(),
        position in 0usize..2,
    ) {
        let mut lines = vec![
            JournalLineInput::debit(AccountId::new(), amount),
            JournalLineInput::credit(AccountId::new(), amount),
        ];
        if position == 0 {
            lines[0].debit = -amount;
        } else {
            lines[1].credit = -amount;
        }

        let result = validate_lines(&lines, BALANCE_TOLERANCE);
        let is_negative = matches!(result, Err(LedgerError::NegativeAmount { .. }));
        prop_assert!(is_negative, "expected NegativeAmount, got {:?}", result);
    }
}
