//! Closing-entry planning.
//!
//! At period end, every temporary account (revenue, contra revenue, expense)
//! is swept into owner's capital, and drawings are folded in as well. The
//! planner here is pure: it takes the period's temporary balances and
//! produces the entries to post, leaving persistence to the repository
//! layer.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use ledgerbook_shared::types::AccountId;

use crate::ledger::account::AccountType;
use crate::ledger::types::LineInput;

/// Balances below this are treated as zero and not closed.
#[must_use]
pub fn activity_threshold() -> Decimal {
    Decimal::new(5, 3) // 0.005
}

/// A temporary account's net balance for the period being closed.
///
/// The balance is signed by the account's normal side: positive means the
/// account sits on its normal side (a credit balance for revenue, a debit
/// balance for expenses), negative means it has flipped to the abnormal
/// side. Contra accounts therefore arrive naturally negative when grouped
/// with their parent category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporaryBalance {
    /// The account being closed.
    pub account_id: AccountId,
    /// Account name, used in entry descriptions.
    pub name: String,
    /// Account classification.
    pub account_type: AccountType,
    /// Net balance signed by the category's normal side.
    pub balance: Decimal,
}

/// One closing entry the planner wants posted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosingEntryPlan {
    /// Entry description.
    pub description: String,
    /// Entry memo.
    pub memo: String,
    /// Balanced line pair for the entry.
    pub lines: Vec<LineInput>,
}

/// Plans the closing entries for a period.
///
/// `revenues` holds revenue and contra-revenue balances signed
/// credit-positive; `expenses` holds expense balances signed debit-positive;
/// `drawings` is the owner's drawings balance signed debit-positive, if such
/// an account exists. Accounts within [`activity_threshold`] of zero are
/// skipped. Abnormal (negative) balances are closed with the sides swapped
/// and a distinct memo, so a contra-revenue or credit-balance expense still
/// lands in capital with the right sign.
#[must_use]
pub fn plan_closing_entries(
    revenues: &[TemporaryBalance],
    expenses: &[TemporaryBalance],
    drawings: Option<&TemporaryBalance>,
    capital_account: AccountId,
) -> Vec<ClosingEntryPlan> {
    let threshold = activity_threshold();
    let mut plans = Vec::new();

    for rev in revenues {
        if rev.balance.abs() <= threshold {
            continue;
        }
        if rev.balance > Decimal::ZERO {
            plans.push(ClosingEntryPlan {
                description: format!("Close {} to capital", rev.name),
                memo: "Automatic closing entry".to_string(),
                lines: vec![
                    LineInput::debit(rev.account_id, rev.balance),
                    LineInput::credit(capital_account, rev.balance),
                ],
            });
        } else {
            let amount = rev.balance.abs();
            plans.push(ClosingEntryPlan {
                description: format!("Close {} to capital", rev.name),
                memo: "Automatic closing entry (abnormal balance)".to_string(),
                lines: vec![
                    LineInput::debit(capital_account, amount),
                    LineInput::credit(rev.account_id, amount),
                ],
            });
        }
    }

    for exp in expenses {
        if exp.balance.abs() <= threshold {
            continue;
        }
        if exp.balance > Decimal::ZERO {
            plans.push(ClosingEntryPlan {
                description: format!("Close {} to capital", exp.name),
                memo: "Automatic closing entry".to_string(),
                lines: vec![
                    LineInput::debit(capital_account, exp.balance),
                    LineInput::credit(exp.account_id, exp.balance),
                ],
            });
        } else {
            let amount = exp.balance.abs();
            plans.push(ClosingEntryPlan {
                description: format!("Close {} to capital", exp.name),
                memo: "Automatic closing entry (abnormal balance)".to_string(),
                lines: vec![
                    LineInput::debit(exp.account_id, amount),
                    LineInput::credit(capital_account, amount),
                ],
            });
        }
    }

    if let Some(draw) = drawings {
        if draw.balance > threshold {
            plans.push(ClosingEntryPlan {
                description: format!("Close {} to capital", draw.name),
                memo: "Automatic closing entry".to_string(),
                lines: vec![
                    LineInput::debit(capital_account, draw.balance),
                    LineInput::credit(draw.account_id, draw.balance),
                ],
            });
        }
    }

    plans
}
