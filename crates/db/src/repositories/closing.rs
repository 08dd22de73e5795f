//! Closing engine: sweeps temporary balances into capital at period end.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, TransactionTrait,
};

use ledgerbook_core::closing::{plan_closing_entries, TemporaryBalance};
use ledgerbook_core::cycle::{CascadePolicy, CycleStep, StepStatus};
use ledgerbook_core::ledger::{AccountType, ActorContext, EntryFlags, EntryStatus, LedgerError};
use ledgerbook_shared::types::{AccountId, EntryId, PeriodId};

use crate::entities::{accounts, journal_entries, journal_lines};
use crate::repositories::period::PeriodRepository;
use crate::repositories::posting::{PostingRepository, PostingWarning, RecordEntryInput};

/// Name of the equity account all temporary balances close into.
const CAPITAL_ACCOUNT_NAME: &str = "Owner's Capital";

/// Name of the drawings account folded into capital at close.
const DRAWINGS_ACCOUNT_NAME: &str = "Owner's Drawings";

/// Result of running the closing engine.
#[derive(Debug, Clone)]
pub struct ClosingOutcome {
    /// Ids of the closing entries created, in posting order.
    pub entry_ids: Vec<EntryId>,
    /// Non-fatal problems from cycle tracker propagation.
    pub warnings: Vec<PostingWarning>,
}

/// Closing engine repository.
#[derive(Debug, Clone)]
pub struct ClosingRepository {
    db: DatabaseConnection,
}

impl ClosingRepository {
    /// Creates a new closing repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Posts the period's closing entries, dated `date`.
    ///
    /// Refuses to run twice: if any closing entry already exists for the
    /// current period the call fails with
    /// [`LedgerError::ClosingAlreadyPosted`] and writes nothing, so the
    /// post-closing trial balance cannot be corrupted by a re-run. All
    /// closing entries for the period post inside one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NoActivePeriod`] without a current period,
    /// [`LedgerError::ClosingAlreadyPosted`] on a re-run, or
    /// [`LedgerError::CapitalAccountMissing`] if the chart has no capital
    /// account.
    pub async fn make_closing_entries(
        &self,
        ctx: &ActorContext,
        date: NaiveDate,
    ) -> Result<ClosingOutcome, LedgerError> {
        let periods = PeriodRepository::new(self.db.clone());
        let period = periods.current_period().await?.ok_or(LedgerError::NoActivePeriod)?;

        let txn = self.db.begin().await.map_err(LedgerError::database)?;

        let already = journal_entries::Entity::find()
            .filter(journal_entries::Column::PeriodId.eq(period.id))
            .filter(journal_entries::Column::IsClosing.eq(true))
            .one(&txn)
            .await
            .map_err(LedgerError::database)?;
        if already.is_some() {
            return Err(LedgerError::ClosingAlreadyPosted { period: period.name });
        }

        let capital = accounts::Entity::find()
            .filter(accounts::Column::Name.eq(CAPITAL_ACCOUNT_NAME))
            .filter(accounts::Column::IsActive.eq(true))
            .one(&txn)
            .await
            .map_err(LedgerError::database)?
            .ok_or_else(|| LedgerError::CapitalAccountMissing {
                name: CAPITAL_ACCOUNT_NAME.to_string(),
            })?;

        let (revenues, expenses, drawings) = Self::temporary_balances(&txn, period.id).await?;
        let plans = plan_closing_entries(
            &revenues,
            &expenses,
            drawings.as_ref(),
            AccountId::new(capital.id),
        );

        if plans.is_empty() {
            // Nothing with a balance to close; leave the tracker alone.
            return Ok(ClosingOutcome { entry_ids: Vec::new(), warnings: Vec::new() });
        }

        let mut entry_ids = Vec::with_capacity(plans.len());
        for plan in plans {
            let mut input = RecordEntryInput::new(date, plan.description, plan.lines);
            input.flags = EntryFlags::closing();
            input.memo = Some(plan.memo);
            input.source_type = Some("system".to_string());
            let entry_id = PostingRepository::post_into(&txn, ctx, &period, &input).await?;
            entry_ids.push(entry_id);
        }
        txn.commit().await.map_err(LedgerError::database)?;

        let mut warnings = Vec::new();
        let tracker_updates = [
            (CycleStep::ClosingEntries, StepStatus::Completed, "Closing entries posted"),
            (
                CycleStep::PostClosingTrialBalance,
                StepStatus::InProgress,
                "Post-closing trial balance ready to prepare",
            ),
        ];
        for (step, status, note) in tracker_updates {
            if let Err(err) = periods
                .set_cycle_step_status(
                    ctx,
                    PeriodId::new(period.id),
                    step,
                    status,
                    note,
                    CascadePolicy::CompletePrior,
                )
                .await
            {
                tracing::warn!(step = step.number(), error = %err, "cycle tracker update failed after closing");
                warnings.push(PostingWarning::CycleTrackerUpdate {
                    step: step.number(),
                    detail: err.to_string(),
                });
            }
        }

        Ok(ClosingOutcome { entry_ids, warnings })
    }

    /// Computes the period's temporary balances: revenue-like accounts
    /// signed credit-positive, expenses signed debit-positive, plus the
    /// drawings balance if that account exists.
    async fn temporary_balances<C: sea_orm::ConnectionTrait>(
        conn: &C,
        period_id: i64,
    ) -> Result<(Vec<TemporaryBalance>, Vec<TemporaryBalance>, Option<TemporaryBalance>), LedgerError>
    {
        let rows = journal_lines::Entity::find()
            .find_also_related(journal_entries::Entity)
            .filter(journal_entries::Column::PeriodId.eq(period_id))
            .filter(journal_entries::Column::Status.eq(EntryStatus::Posted.as_str()))
            .all(conn)
            .await
            .map_err(LedgerError::database)?;

        let mut sums: HashMap<i64, (Decimal, Decimal)> = HashMap::new();
        for (line, _) in rows {
            let sum = sums.entry(line.account_id).or_insert((Decimal::ZERO, Decimal::ZERO));
            sum.0 += line.debit;
            sum.1 += line.credit;
        }

        let account_rows = accounts::Entity::find()
            .filter(accounts::Column::IsActive.eq(true))
            .all(conn)
            .await
            .map_err(LedgerError::database)?;

        let mut revenues = Vec::new();
        let mut expenses = Vec::new();
        let mut drawings = None;
        for account in account_rows {
            let Some(account_type) = AccountType::parse(&account.account_type) else {
                continue;
            };
            let (debit, credit) =
                sums.get(&account.id).copied().unwrap_or((Decimal::ZERO, Decimal::ZERO));
            match account_type {
                AccountType::Revenue | AccountType::ContraRevenue => {
                    revenues.push(TemporaryBalance {
                        account_id: AccountId::new(account.id),
                        name: account.name,
                        account_type,
                        balance: credit - debit,
                    });
                }
                AccountType::Expense => {
                    expenses.push(TemporaryBalance {
                        account_id: AccountId::new(account.id),
                        name: account.name,
                        account_type,
                        balance: debit - credit,
                    });
                }
                AccountType::Equity if account.name == DRAWINGS_ACCOUNT_NAME => {
                    drawings = Some(TemporaryBalance {
                        account_id: AccountId::new(account.id),
                        name: account.name,
                        account_type,
                        balance: debit - credit,
                    });
                }
                _ => {}
            }
        }

        Ok((revenues, expenses, drawings))
    }
}
