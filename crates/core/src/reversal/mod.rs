//! Reversing-entry construction and schedule readiness.
//!
//! A reversing entry undoes a prior accrual by swapping every line's sides.
//! Reversals can be scheduled ahead of time in a queue; items may require
//! sign-off before the processor is allowed to post them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ledger::types::{LineInput, RecordedLine};

/// Processing status of a scheduled reversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueStatus {
    /// Waiting to be processed.
    Pending,
    /// Reversal entry has been posted.
    Completed,
}

impl QueueStatus {
    /// Returns the canonical string form used in storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }

    /// Parses the canonical string form.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

/// Verdict recorded by a reviewer on a queue item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    /// Review requested, no verdict yet.
    Pending,
    /// Reviewer signed off.
    Approved,
    /// Reviewer rejected the reversal.
    Rejected,
}

impl ApprovalStatus {
    /// Returns the canonical string form used in storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Parses the canonical string form.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// A reviewer's sign-off on a scheduled reversal, as read from storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalRecord {
    /// Who reviewed.
    pub reviewer: String,
    /// Reviewer's role.
    pub role: String,
    /// Authority level of the reviewer (lower is more senior).
    pub level: i32,
    /// The verdict.
    pub status: ApprovalStatus,
}

/// Builds the reversal of a posted entry by swapping every line's sides.
///
/// Each original debit becomes a credit of the same amount on the same
/// account, and vice versa.
#[must_use]
pub fn build_reversal_lines(original: &[RecordedLine]) -> Vec<LineInput> {
    let mut lines = Vec::with_capacity(original.len());
    for line in original {
        if line.debit > rust_decimal::Decimal::ZERO {
            lines.push(LineInput::credit(line.account_id, line.debit));
        }
        if line.credit > rust_decimal::Decimal::ZERO {
            lines.push(LineInput::debit(line.account_id, line.credit));
        }
    }
    lines
}

/// Whether a scheduled reversal is due on or before `as_of`.
#[must_use]
pub fn is_due(reverse_on: NaiveDate, as_of: NaiveDate) -> bool {
    reverse_on <= as_of
}

/// Whether a queue item's approval requirements are satisfied.
///
/// Items that never required approval are always ready. Otherwise at least
/// one approval must be approved, and the most senior reviewer attached
/// (smallest level, any verdict) must be at or above the item's required
/// authorization level.
#[must_use]
pub fn is_ready(
    approval_required: bool,
    authorization_level: i32,
    approvals: &[ApprovalRecord],
) -> bool {
    if !approval_required {
        return true;
    }
    let any_approved = approvals.iter().any(|a| a.status == ApprovalStatus::Approved);
    let Some(min_level) = approvals.iter().map(|a| a.level).min() else {
        return false;
    };
    any_approved && min_level <= authorization_level
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerbook_shared::types::AccountId;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use crate::ledger::validation::validate_lines;

    fn line(id: i64, debit: Decimal, credit: Decimal) -> RecordedLine {
        RecordedLine { account_id: AccountId::new(id), debit, credit }
    }

    fn approval(level: i32, status: ApprovalStatus) -> ApprovalRecord {
        ApprovalRecord {
            reviewer: "reviewer".to_string(),
            role: "controller".to_string(),
            level,
            status,
        }
    }

    #[test]
    fn test_reversal_swaps_sides() {
        // Accrued salaries: Dr Salaries Expense / Cr Salaries Payable.
        let original = vec![line(502, dec!(400), dec!(0)), line(212, dec!(0), dec!(400))];
        let reversed = build_reversal_lines(&original);
        assert_eq!(reversed.len(), 2);
        assert_eq!(reversed[0], LineInput::credit(AccountId::new(502), dec!(400)));
        assert_eq!(reversed[1], LineInput::debit(AccountId::new(212), dec!(400)));
    }

    #[test]
    fn test_reversal_of_balanced_entry_is_balanced() {
        let original = vec![
            line(1, dec!(250), dec!(0)),
            line(2, dec!(100), dec!(0)),
            line(3, dec!(0), dec!(350)),
        ];
        let reversed = build_reversal_lines(&original);
        let totals = validate_lines(&reversed).unwrap();
        assert_eq!(totals.debits, dec!(350));
        assert_eq!(totals.credits, dec!(350));
    }

    #[test]
    fn test_double_reversal_restores_original() {
        let original = vec![line(1, dec!(75.25), dec!(0)), line(2, dec!(0), dec!(75.25))];
        let once = build_reversal_lines(&original);
        let recorded: Vec<RecordedLine> = once
            .iter()
            .map(|l| RecordedLine {
                account_id: l.account_id,
                debit: l.debit_amount(),
                credit: l.credit_amount(),
            })
            .collect();
        let twice = build_reversal_lines(&recorded);
        assert_eq!(twice[0], LineInput::debit(AccountId::new(1), dec!(75.25)));
        assert_eq!(twice[1], LineInput::credit(AccountId::new(2), dec!(75.25)));
    }

    #[test]
    fn test_due_dates() {
        let feb1 = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        let feb2 = NaiveDate::from_ymd_opt(2025, 2, 2).unwrap();
        assert!(is_due(feb1, feb1));
        assert!(is_due(feb1, feb2));
        assert!(!is_due(feb2, feb1));
    }

    #[test]
    fn test_no_approval_needed_is_always_ready() {
        assert!(is_ready(false, 0, &[]));
        assert!(is_ready(false, 3, &[approval(9, ApprovalStatus::Rejected)]));
    }

    #[test]
    fn test_approval_required_with_no_approvals_is_not_ready() {
        assert!(!is_ready(true, 3, &[]));
    }

    #[test]
    fn test_approved_at_sufficient_level_is_ready() {
        assert!(is_ready(true, 3, &[approval(2, ApprovalStatus::Approved)]));
        assert!(is_ready(true, 3, &[approval(3, ApprovalStatus::Approved)]));
    }

    #[test]
    fn test_approved_only_below_required_level_is_not_ready() {
        assert!(!is_ready(true, 2, &[approval(5, ApprovalStatus::Approved)]));
    }

    #[test]
    fn test_rejection_alone_is_not_ready() {
        assert!(!is_ready(true, 3, &[approval(1, ApprovalStatus::Rejected)]));
    }

    #[test]
    fn test_senior_pending_plus_junior_approval_is_ready() {
        // Level check looks at the most senior reviewer attached, regardless
        // of their verdict, as long as someone approved.
        let approvals =
            vec![approval(1, ApprovalStatus::Pending), approval(5, ApprovalStatus::Approved)];
        assert!(is_ready(true, 3, &approvals));
    }
}
