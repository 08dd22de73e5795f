//! Journal entry types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use ledgerbook_shared::types::AccountId;

use super::account::Side;

/// Tolerance inside which an entry's debit and credit totals are considered
/// equal. Two decimal places is the currency precision of the ledger.
#[must_use]
pub fn balance_tolerance() -> Decimal {
    Decimal::new(1, 2) // 0.01
}

/// Identity of the caller performing a mutation.
///
/// Every posting-engine operation takes this explicitly; there is no
/// ambient "current user" state anywhere in the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorContext {
    /// Name recorded in audit trails and entry metadata.
    pub actor: String,
}

impl ActorContext {
    /// Creates a context for the named actor.
    #[must_use]
    pub fn new(actor: impl Into<String>) -> Self {
        Self { actor: actor.into() }
    }
}

/// Lifecycle status of a journal entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// Saved but not yet affecting balances or reports.
    Draft,
    /// Final; included in ledgers, trial balances, and statements.
    Posted,
}

impl EntryStatus {
    /// Returns the canonical string form used in storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Posted => "posted",
        }
    }

    /// Parses the canonical string form.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(Self::Draft),
            "posted" => Some(Self::Posted),
            _ => None,
        }
    }
}

impl std::fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification flags carried by a journal entry.
///
/// A regular transaction leaves all three unset. The flags drive cycle-step
/// propagation and report filtering; they are not mutually exclusive in
/// storage but are in practice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryFlags {
    /// End-of-period adjustment (accruals, deferrals, depreciation).
    pub is_adjusting: bool,
    /// Sweeps temporary balances into capital at period close.
    pub is_closing: bool,
    /// Start-of-period reversal of a prior accrual.
    pub is_reversing: bool,
}

impl EntryFlags {
    /// Flags for an end-of-period adjusting entry.
    #[must_use]
    pub const fn adjusting() -> Self {
        Self { is_adjusting: true, is_closing: false, is_reversing: false }
    }

    /// Flags for a closing entry.
    #[must_use]
    pub const fn closing() -> Self {
        Self { is_adjusting: false, is_closing: true, is_reversing: false }
    }

    /// Flags for a reversing entry.
    #[must_use]
    pub const fn reversing() -> Self {
        Self { is_adjusting: false, is_closing: false, is_reversing: true }
    }
}

/// One line of a journal entry being recorded.
///
/// A line is a single amount on a single side; "both sides on one line" is
/// unrepresentable by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineInput {
    /// Account the line hits.
    pub account_id: AccountId,
    /// Which side of the ledger the amount lands on.
    pub side: Side,
    /// Positive currency amount.
    pub amount: Decimal,
}

impl LineInput {
    /// Creates a debit line.
    #[must_use]
    pub const fn debit(account_id: AccountId, amount: Decimal) -> Self {
        Self { account_id, side: Side::Debit, amount }
    }

    /// Creates a credit line.
    #[must_use]
    pub const fn credit(account_id: AccountId, amount: Decimal) -> Self {
        Self { account_id, side: Side::Credit, amount }
    }

    /// The amount if this is a debit line, otherwise zero.
    #[must_use]
    pub fn debit_amount(&self) -> Decimal {
        match self.side {
            Side::Debit => self.amount,
            Side::Credit => Decimal::ZERO,
        }
    }

    /// The amount if this is a credit line, otherwise zero.
    #[must_use]
    pub fn credit_amount(&self) -> Decimal {
        match self.side {
            Side::Debit => Decimal::ZERO,
            Side::Credit => self.amount,
        }
    }
}

/// A journal line as read back from storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedLine {
    /// Account the line hit.
    pub account_id: AccountId,
    /// Debit amount (zero when the line was a credit).
    pub debit: Decimal,
    /// Credit amount (zero when the line was a debit).
    pub credit: Decimal,
}

/// Debit and credit totals of a validated entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryTotals {
    /// Sum of all debit lines.
    pub debits: Decimal,
    /// Sum of all credit lines.
    pub credits: Decimal,
}

impl EntryTotals {
    /// Computes totals over a set of lines.
    #[must_use]
    pub fn of(lines: &[LineInput]) -> Self {
        let mut debits = Decimal::ZERO;
        let mut credits = Decimal::ZERO;
        for line in lines {
            match line.side {
                Side::Debit => debits += line.amount,
                Side::Credit => credits += line.amount,
            }
        }
        Self { debits, credits }
    }

    /// Absolute difference between the two sides.
    #[must_use]
    pub fn difference(&self) -> Decimal {
        (self.debits - self.credits).abs()
    }

    /// Whether the totals agree within [`balance_tolerance`].
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.difference() <= balance_tolerance()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_line_side_amounts() {
        let line = LineInput::debit(AccountId::new(1), dec!(100));
        assert_eq!(line.debit_amount(), dec!(100));
        assert_eq!(line.credit_amount(), Decimal::ZERO);

        let line = LineInput::credit(AccountId::new(2), dec!(45.50));
        assert_eq!(line.debit_amount(), Decimal::ZERO);
        assert_eq!(line.credit_amount(), dec!(45.50));
    }

    #[test]
    fn test_totals_balanced_within_tolerance() {
        let totals = EntryTotals { debits: dec!(100.00), credits: dec!(100.01) };
        assert!(totals.is_balanced());

        let totals = EntryTotals { debits: dec!(100.00), credits: dec!(100.02) };
        assert!(!totals.is_balanced());
        assert_eq!(totals.difference(), dec!(0.02));
    }

    #[test]
    fn test_totals_of_lines() {
        let lines = vec![
            LineInput::debit(AccountId::new(1), dec!(60)),
            LineInput::debit(AccountId::new(2), dec!(40)),
            LineInput::credit(AccountId::new(3), dec!(100)),
        ];
        let totals = EntryTotals::of(&lines);
        assert_eq!(totals.debits, dec!(100));
        assert_eq!(totals.credits, dec!(100));
        assert!(totals.is_balanced());
    }

    #[test]
    fn test_flag_constructors() {
        assert!(EntryFlags::adjusting().is_adjusting);
        assert!(EntryFlags::closing().is_closing);
        assert!(EntryFlags::reversing().is_reversing);
        assert_eq!(EntryFlags::default(), EntryFlags {
            is_adjusting: false,
            is_closing: false,
            is_reversing: false
        });
    }
}
