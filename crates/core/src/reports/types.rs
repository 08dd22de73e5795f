//! Report data structures.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use ledgerbook_shared::types::{AccountId, EntryId};

use crate::ledger::account::{AccountType, Side};

/// Raw posting activity for one account over some filter window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountActivity {
    /// The account.
    pub account_id: AccountId,
    /// Chart-of-accounts code, used for ordering.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account classification.
    pub account_type: AccountType,
    /// The account's normal balance side.
    pub normal_side: Side,
    /// Whether the account survives period close.
    pub is_permanent: bool,
    /// Sum of debit amounts posted to the account.
    pub debit_total: Decimal,
    /// Sum of credit amounts posted to the account.
    pub credit_total: Decimal,
}

/// One account's row on a trial balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceRow {
    /// The account.
    pub account_id: AccountId,
    /// Chart-of-accounts code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account classification.
    pub account_type: AccountType,
    /// The account's normal balance side.
    pub normal_side: Side,
    /// Whether the account survives period close.
    pub is_permanent: bool,
    /// Net balance shown in the debit column (zero if the account nets to
    /// a credit).
    pub net_debit: Decimal,
    /// Net balance shown in the credit column (zero if the account nets to
    /// a debit).
    pub net_credit: Decimal,
}

/// Trial balance: every account's net balance on its net side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceReport {
    /// Rows ordered by account code.
    pub rows: Vec<TrialBalanceRow>,
    /// Sum of the debit column.
    pub total_debit: Decimal,
    /// Sum of the credit column.
    pub total_credit: Decimal,
}

impl TrialBalanceReport {
    /// The trial balance law: the two columns must agree exactly.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.total_debit == self.total_credit
    }
}

/// A named amount on a financial statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementLine {
    /// Account name.
    pub name: String,
    /// Signed amount; contra accounts appear negative within their section.
    pub amount: Decimal,
}

/// Income statement over a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeStatementReport {
    /// Start of the range (inclusive).
    pub from: NaiveDate,
    /// End of the range (inclusive).
    pub to: NaiveDate,
    /// Revenue lines; contra revenue appears negative.
    pub revenue: Vec<StatementLine>,
    /// Expense lines.
    pub expenses: Vec<StatementLine>,
    /// Sum of the revenue section.
    pub total_revenue: Decimal,
    /// Sum of the expense section.
    pub total_expense: Decimal,
    /// `total_revenue - total_expense`.
    pub net_income: Decimal,
}

/// Balance sheet as of a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSheetReport {
    /// Report date (inclusive cutoff).
    pub as_of: NaiveDate,
    /// Asset lines; contra assets appear negative.
    pub assets: Vec<StatementLine>,
    /// Liability lines.
    pub liabilities: Vec<StatementLine>,
    /// Permanent equity lines, credit-signed; drawings appear negative.
    pub equity: Vec<StatementLine>,
    /// Net credit balance of temporary accounts not yet closed, folded into
    /// total equity. Zero once closing entries have been posted.
    pub unclosed_net_income: Decimal,
    /// Sum of the asset section.
    pub total_assets: Decimal,
    /// Sum of the liability section.
    pub total_liabilities: Decimal,
    /// Sum of the equity section plus unclosed net income.
    pub total_equity: Decimal,
    /// `total_assets - (total_liabilities + total_equity)`; zero when the
    /// accounting equation holds.
    pub balance_check: Decimal,
}

/// Cash flow classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CashFlowSection {
    /// Day-to-day revenue and expense activity.
    Operating,
    /// Acquisition or disposal of long-lived assets.
    Investing,
    /// Owner and creditor funding activity.
    Financing,
}

/// Minimal view of one line, as needed for cash flow classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashFlowLineView {
    /// Whether this line hits the designated cash account.
    pub is_cash: bool,
    /// Classification of the line's account.
    pub account_type: AccountType,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
}

/// One posted entry's lines, as input to cash flow classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashFlowEntryView {
    /// The entry.
    pub entry_id: EntryId,
    /// Entry date.
    pub date: NaiveDate,
    /// Entry description.
    pub description: String,
    /// The entry's lines, in stored order.
    pub lines: Vec<CashFlowLineView>,
}

/// One classified cash movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashFlowItem {
    /// Source entry.
    pub entry_id: EntryId,
    /// Entry date.
    pub date: NaiveDate,
    /// Entry description.
    pub description: String,
    /// Net cash movement of the entry (debit-positive).
    pub amount: Decimal,
}

/// Cash flow listing over a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashFlowReport {
    /// Start of the range (inclusive).
    pub from: NaiveDate,
    /// End of the range (inclusive).
    pub to: NaiveDate,
    /// Operating activity.
    pub operating: Vec<CashFlowItem>,
    /// Investing activity.
    pub investing: Vec<CashFlowItem>,
    /// Financing activity.
    pub financing: Vec<CashFlowItem>,
    /// Net operating cash.
    pub total_operating: Decimal,
    /// Net investing cash.
    pub total_investing: Decimal,
    /// Net financing cash.
    pub total_financing: Decimal,
    /// Sum of the three section totals.
    pub net_change: Decimal,
}
