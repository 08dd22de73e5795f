//! Financial report assembly.
//!
//! Pure aggregation over account activity the repository layer has already
//! queried: trial balance, income statement, balance sheet, and a simple
//! classified cash flow listing.

pub mod service;
pub mod types;

pub use service::{
    build_balance_sheet, build_cash_flow, build_income_statement, build_trial_balance,
};
pub use types::{
    AccountActivity, BalanceSheetReport, CashFlowEntryView, CashFlowItem, CashFlowLineView,
    CashFlowReport, CashFlowSection, IncomeStatementReport, StatementLine, TrialBalanceReport,
    TrialBalanceRow,
};
