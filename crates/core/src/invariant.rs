//! Invariants shared by the journal engine, opening balances, reports and
//! the costing engine.
//!
//! A set of lines is balanced when `|debit - credit| < tolerance`. The
//! comparison is strict so that a difference of exactly one cent fails
//! at the default tolerance.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Default balance tolerance: 0.01 currency units.
pub const BALANCE_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Debit and credit sums of a set of lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebitCreditTotals {
    /// Sum of debits.
    pub debit: Decimal,
    /// Sum of credits.
    pub credit: Decimal,
}

impl DebitCreditTotals {
    /// Creates totals from already-summed values.
    #[must_use]
    pub const fn new(debit: Decimal, credit: Decimal) -> Self {
        Self { debit, credit }
    }

    /// Sums `(debit, credit)` pairs.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Decimal, Decimal)>,
    {
        pairs
            .into_iter()
            .fold(Self::default(), |mut acc, (debit, credit)| {
                acc.add(debit, credit);
                acc
            })
    }

    /// Adds one line.
    pub fn add(&mut self, debit: Decimal, credit: Decimal) {
        self.debit += debit;
        self.credit += credit;
    }

    /// `debit - credit`.
    #[must_use]
    pub fn difference(&self) -> Decimal {
        self.debit - self.credit
    }

    /// True when `|debit - credit| < tolerance`.
    #[must_use]
    pub fn is_balanced_within(&self, tolerance: Decimal) -> bool {
        self.difference().abs() < tolerance
    }

    /// True when balanced at [`BALANCE_TOLERANCE`].
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.is_balanced_within(BALANCE_TOLERANCE)
    }
}

impl std::ops::AddAssign for DebitCreditTotals {
    fn add_assign(&mut self, rhs: Self) {
        self.add(rhs.debit, rhs.credit);
    }
}

/// True when `0 <= remaining <= original`.
#[must_use]
pub fn layer_within_bounds(original: Decimal, remaining: Decimal) -> bool {
    remaining >= Decimal::ZERO && remaining <= original
}
