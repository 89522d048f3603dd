//! Line-level validation for journals.
//!
//! Account existence and activity need storage and are checked by the
//! journal engine; everything here is pure.

use rust_decimal::Decimal;

use super::error::LedgerError;
use super::types::JournalLineInput;
use crate::invariant::DebitCreditTotals;

/// Minimum number of lines in a journal.
pub const MIN_LINES: usize = 2;

/// Validates journal lines and returns their totals.
///
/// Rules, in order:
/// - at least [`MIN_LINES`] lines
/// - no negative amount
/// - no line with both a debit and a credit (both zero is allowed)
/// - `|debit - credit| < tolerance`
///
/// # Errors
///
/// Returns the first rule violated.
pub fn validate_lines(
    lines: &[JournalLineInput],
    tolerance: Decimal,
) -> Result<DebitCreditTotals, LedgerError> {
    if lines.len() < MIN_LINES {
        return Err(LedgerError::InsufficientLines);
    }

    let mut totals = DebitCreditTotals::default();
    for (index, line) in lines.iter().enumerate() {
        let line_no = index + 1;
        if line.debit < Decimal::ZERO || line.credit < Decimal::ZERO {
            return Err(LedgerError::NegativeAmount { line: line_no });
        }
        if !line.debit.is_zero() && !line.credit.is_zero() {
            return Err(LedgerError::BothSides { line: line_no });
        }
        totals.add(line.debit, line.credit);
    }

    if !totals.is_balanced_within(tolerance) {
        return Err(LedgerError::Unbalanced {
            debit: totals.debit,
            credit: totals.credit,
            difference: totals.difference(),
        });
    }

    Ok(totals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invariant::BALANCE_TOLERANCE;
    use rust_decimal_macros::dec;
    use tally_shared::types::AccountId;

    fn debit(amount: Decimal) -> JournalLineInput {
        JournalLineInput::debit(AccountId::new(), amount)
    }

    fn credit(amount: Decimal) -> JournalLineInput {
        JournalLineInput::credit(AccountId::new(), amount)
    }

    #[test]
    fn test_balanced_lines() {
        let totals =
            validate_lines(&[debit(dec!(100)), credit(dec!(100))], BALANCE_TOLERANCE).unwrap();
        assert_eq!(totals.debit, dec!(100));
        assert_eq!(totals.credit, dec!(100));
    }

    #[test]
    fn test_unbalanced_lines() {
        let err = validate_lines(&[debit(dec!(100)), credit(dec!(50))], BALANCE_TOLERANCE)
            .unwrap_err();
        match err {
            LedgerError::Unbalanced {
                debit,
                credit,
                difference,
            } => {
                assert_eq!(debit, dec!(100));
                assert_eq!(credit, dec!(50));
                assert_eq!(difference, dec!(50));
            }
            other => panic!("expected Unbalanced, got {other:?}"),
        }
    }

    #[test]
    fn test_single_line_rejected() {
        assert!(matches!(
            validate_lines(&[debit(dec!(1))], BALANCE_TOLERANCE),
            Err(LedgerError::InsufficientLines)
        ));
        assert!(matches!(
            validate_lines(&[], BALANCE_TOLERANCE),
            Err(LedgerError::InsufficientLines)
        ));
    }

    #[test]
    fn test_negative_amount_names_the_line() {
        assert!(matches!(
            validate_lines(&[debit(dec!(5)), credit(dec!(-5))], BALANCE_TOLERANCE),
            Err(LedgerError::NegativeAmount { line: 2 })
        ));
    }

    #[test]
    fn test_both_sides_rejected() {
        let mut line = debit(dec!(5));
        line.credit = dec!(5);
        assert!(matches!(
            validate_lines(&[line, debit(dec!(0))], BALANCE_TOLERANCE),
            Err(LedgerError::BothSides { line: 1 })
        ));
    }

    #[test]
    fn test_zero_lines_are_informational() {
        let totals = validate_lines(
            &[debit(dec!(10)), credit(dec!(10)), debit(dec!(0))],
            BALANCE_TOLERANCE,
        )
        .unwrap();
        assert_eq!(totals.difference(), Decimal::ZERO);
    }

    #[test]
    fn test_difference_below_tolerance_accepted() {
        assert!(validate_lines(&[debit(dec!(100.009)), credit(dec!(100))], BALANCE_TOLERANCE)
            .is_ok());
        assert!(validate_lines(&[debit(dec!(100.01)), credit(dec!(100))], BALANCE_TOLERANCE)
            .is_err());
    }

    #[test]
    fn test_custom_tolerance() {
        assert!(validate_lines(&[debit(dec!(100.04)), credit(dec!(100))], dec!(0.05)).is_ok());
        assert!(validate_lines(&[debit(dec!(100)), credit(dec!(100))], Decimal::ZERO).is_err());
    }
}
