//! Report assembly over pre-queried account activity.

use rust_decimal::Decimal;

use chrono::NaiveDate;

use crate::ledger::account::AccountType;

use super::types::{
    AccountActivity, BalanceSheetReport, CashFlowEntryView, CashFlowItem, CashFlowReport,
    CashFlowSection, IncomeStatementReport, StatementLine, TrialBalanceReport, TrialBalanceRow,
};

/// Statement lines with an amount inside this of zero are omitted.
fn display_threshold() -> Decimal {
    Decimal::new(5, 3) // 0.005
}

/// Builds a trial balance from per-account activity.
///
/// Each account's net balance lands in exactly one column: debit if debits
/// exceed credits, credit otherwise. Amounts are rounded to two decimal
/// places. Rows come out ordered by account code.
#[must_use]
pub fn build_trial_balance(mut activity: Vec<AccountActivity>) -> TrialBalanceReport {
    activity.sort_by(|a, b| a.code.cmp(&b.code));

    let mut rows = Vec::with_capacity(activity.len());
    let mut total_debit = Decimal::ZERO;
    let mut total_credit = Decimal::ZERO;

    for account in activity {
        let balance = (account.debit_total - account.credit_total).round_dp(2);
        let (net_debit, net_credit) = if balance >= Decimal::ZERO {
            (balance, Decimal::ZERO)
        } else {
            (Decimal::ZERO, -balance)
        };
        total_debit += net_debit;
        total_credit += net_credit;
        rows.push(TrialBalanceRow {
            account_id: account.account_id,
            code: account.code,
            name: account.name,
            account_type: account.account_type,
            normal_side: account.normal_side,
            is_permanent: account.is_permanent,
            net_debit,
            net_credit,
        });
    }

    TrialBalanceReport { rows, total_debit, total_credit }
}

/// Builds an income statement from trial balance rows over a date range.
///
/// Revenue amounts are credit-signed (`net_credit - net_debit`), so contra
/// revenue reduces the section naturally. Expense amounts are debit-signed.
/// Accounts with no meaningful activity are omitted.
#[must_use]
pub fn build_income_statement(
    rows: &[TrialBalanceRow],
    from: NaiveDate,
    to: NaiveDate,
) -> IncomeStatementReport {
    let threshold = display_threshold();
    let mut revenue = Vec::new();
    let mut expenses = Vec::new();
    let mut total_revenue = Decimal::ZERO;
    let mut total_expense = Decimal::ZERO;

    for row in rows {
        match row.account_type {
            AccountType::Revenue | AccountType::ContraRevenue => {
                let amount = row.net_credit - row.net_debit;
                if amount.abs() > threshold {
                    total_revenue += amount;
                    revenue.push(StatementLine { name: row.name.clone(), amount });
                }
            }
            AccountType::Expense => {
                let amount = row.net_debit - row.net_credit;
                if amount.abs() > threshold {
                    total_expense += amount;
                    expenses.push(StatementLine { name: row.name.clone(), amount });
                }
            }
            _ => {}
        }
    }

    IncomeStatementReport {
        from,
        to,
        revenue,
        expenses,
        total_revenue,
        total_expense,
        net_income: total_revenue - total_expense,
    }
}

/// Builds a balance sheet from trial balance rows as of a date.
///
/// The rows must include temporary accounts: any revenue or expense balance
/// not yet swept by closing entries is folded into equity as unclosed net
/// income so the accounting equation still holds mid-period. Contra assets
/// appear negative within the asset section; drawings appear negative
/// within equity.
#[must_use]
pub fn build_balance_sheet(rows: &[TrialBalanceRow], as_of: NaiveDate) -> BalanceSheetReport {
    let threshold = display_threshold();
    let mut assets = Vec::new();
    let mut liabilities = Vec::new();
    let mut equity = Vec::new();
    let mut total_assets = Decimal::ZERO;
    let mut total_liabilities = Decimal::ZERO;
    let mut total_equity = Decimal::ZERO;
    let mut unclosed_net_income = Decimal::ZERO;

    for row in rows {
        match row.account_type {
            AccountType::Asset => {
                let amount = row.net_debit - row.net_credit;
                if amount.abs() > threshold {
                    total_assets += amount;
                    assets.push(StatementLine { name: row.name.clone(), amount });
                }
            }
            AccountType::ContraAsset => {
                // Shown inside assets as a reduction.
                let balance = row.net_credit - row.net_debit;
                let amount = -balance.abs();
                if amount.abs() > threshold {
                    total_assets += amount;
                    assets.push(StatementLine { name: row.name.clone(), amount });
                }
            }
            AccountType::Liability => {
                let amount = row.net_credit - row.net_debit;
                if amount.abs() > threshold {
                    total_liabilities += amount;
                    liabilities.push(StatementLine { name: row.name.clone(), amount });
                }
            }
            AccountType::Equity => {
                let amount = row.net_credit - row.net_debit;
                if amount.abs() > threshold {
                    total_equity += amount;
                    equity.push(StatementLine { name: row.name.clone(), amount });
                }
            }
            AccountType::Revenue | AccountType::ContraRevenue | AccountType::Expense => {
                unclosed_net_income += row.net_credit - row.net_debit;
            }
        }
    }

    if unclosed_net_income.abs() > threshold {
        total_equity += unclosed_net_income;
    } else {
        unclosed_net_income = Decimal::ZERO;
    }

    BalanceSheetReport {
        as_of,
        assets,
        liabilities,
        equity,
        unclosed_net_income,
        total_assets,
        total_liabilities,
        total_equity,
        balance_check: total_assets - (total_liabilities + total_equity),
    }
}

fn classify(counterpart: Option<AccountType>) -> CashFlowSection {
    match counterpart {
        Some(AccountType::Asset | AccountType::ContraAsset) => CashFlowSection::Investing,
        Some(AccountType::Liability | AccountType::Equity) => CashFlowSection::Financing,
        _ => CashFlowSection::Operating,
    }
}

/// Builds a classified cash flow listing from entries that touch cash.
///
/// Each entry contributes its net cash movement (cash debits minus cash
/// credits). The section is decided by the first non-cash line: asset
/// counterparts are investing, liability or equity counterparts are
/// financing, everything else is operating.
#[must_use]
pub fn build_cash_flow(
    entries: &[CashFlowEntryView],
    from: NaiveDate,
    to: NaiveDate,
) -> CashFlowReport {
    let mut operating = Vec::new();
    let mut investing = Vec::new();
    let mut financing = Vec::new();
    let mut total_operating = Decimal::ZERO;
    let mut total_investing = Decimal::ZERO;
    let mut total_financing = Decimal::ZERO;

    for entry in entries {
        let mut amount = Decimal::ZERO;
        for line in entry.lines.iter().filter(|l| l.is_cash) {
            amount += line.debit - line.credit;
        }
        if amount == Decimal::ZERO {
            continue;
        }

        let counterpart = entry.lines.iter().find(|l| !l.is_cash).map(|l| l.account_type);
        let item = CashFlowItem {
            entry_id: entry.entry_id,
            date: entry.date,
            description: entry.description.clone(),
            amount,
        };
        match classify(counterpart) {
            CashFlowSection::Operating => {
                total_operating += amount;
                operating.push(item);
            }
            CashFlowSection::Investing => {
                total_investing += amount;
                investing.push(item);
            }
            CashFlowSection::Financing => {
                total_financing += amount;
                financing.push(item);
            }
        }
    }

    CashFlowReport {
        from,
        to,
        operating,
        investing,
        financing,
        total_operating,
        total_investing,
        total_financing,
        net_change: total_operating + total_investing + total_financing,
    }
}
