//! The posting engine: validated journal-entry recording.

use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set, TransactionTrait,
};
use thiserror::Error;

use ledgerbook_core::cycle::{steps_after_posting, CascadePolicy};
use ledgerbook_core::ledger::{
    validate_lines, ActorContext, EntryFlags, EntryStatus, LedgerError, LineInput, RecordedLine,
};
use ledgerbook_core::reversal::{build_reversal_lines, QueueStatus};
use ledgerbook_shared::types::{AccountId, EntryId, PeriodId};

use crate::entities::{accounts, journal_entries, journal_lines, reversing_entry_queue};
use crate::repositories::audit::AuditLogRepository;
use crate::repositories::period::PeriodRepository;

/// A non-fatal problem encountered after the entry itself was committed.
#[derive(Debug, Clone, Error)]
pub enum PostingWarning {
    /// A cycle tracker update failed; the entry is posted regardless.
    #[error("cycle tracker update failed for step {step}: {detail}")]
    CycleTrackerUpdate {
        /// Cycle step number the update targeted.
        step: u8,
        /// What went wrong.
        detail: String,
    },
}

/// Result of recording an entry.
#[derive(Debug, Clone)]
pub struct PostOutcome {
    /// Id of the recorded entry.
    pub entry_id: EntryId,
    /// Non-fatal problems from post-commit propagation.
    pub warnings: Vec<PostingWarning>,
}

/// Input for recording a journal entry.
#[derive(Debug, Clone)]
pub struct RecordEntryInput {
    /// Entry date.
    pub entry_date: NaiveDate,
    /// Entry description.
    pub description: String,
    /// The entry's lines.
    pub lines: Vec<LineInput>,
    /// Adjusting/closing/reversing classification.
    pub flags: EntryFlags,
    /// Draft or posted.
    pub status: EntryStatus,
    /// Target period; defaults to the current period.
    pub period_id: Option<PeriodId>,
    /// Source document reference.
    pub document_ref: Option<String>,
    /// External system reference.
    pub external_ref: Option<String>,
    /// Free-form memo.
    pub memo: Option<String>,
    /// Origin tag (manual, import, system).
    pub source_type: Option<String>,
    /// If set, enqueue a scheduled reversal of this entry for the date.
    pub schedule_reverse_on: Option<NaiveDate>,
}

impl RecordEntryInput {
    /// A posted entry in the current period with no flags or refs.
    #[must_use]
    pub fn new(entry_date: NaiveDate, description: impl Into<String>, lines: Vec<LineInput>) -> Self {
        Self {
            entry_date,
            description: description.into(),
            lines,
            flags: EntryFlags::default(),
            status: EntryStatus::Posted,
            period_id: None,
            document_ref: None,
            external_ref: None,
            memo: None,
            source_type: None,
            schedule_reverse_on: None,
        }
    }
}

/// The posting engine repository.
#[derive(Debug, Clone)]
pub struct PostingRepository {
    db: DatabaseConnection,
}

impl PostingRepository {
    /// Creates a new posting repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a journal entry.
    ///
    /// Validation happens before any write; the entry, its lines, the audit
    /// row, and any scheduled reversal are inserted in one transaction.
    /// After commit, cycle tracker propagation runs best-effort: failures
    /// come back as warnings in the outcome, never as a lost entry.
    ///
    /// # Errors
    ///
    /// Returns a validation, state, or not-found error detected before the
    /// write, or a storage error if the transaction fails.
    pub async fn record_entry(
        &self,
        ctx: &ActorContext,
        input: RecordEntryInput,
    ) -> Result<PostOutcome, LedgerError> {
        let period = self.resolve_period(input.period_id).await?;

        let txn = self.db.begin().await.map_err(LedgerError::database)?;
        let entry_id = Self::post_into(&txn, ctx, &period, &input).await?;
        txn.commit().await.map_err(LedgerError::database)?;

        let warnings = self
            .propagate_cycle(ctx, PeriodId::new(period.id), input.flags, input.status)
            .await;
        Ok(PostOutcome { entry_id, warnings })
    }

    /// Posts the line-for-line reversal of an existing entry, dated `date`,
    /// into the current period.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::EntryNotFound`] if the entry does not exist or
    /// has no lines, or any error [`Self::record_entry`] can return.
    pub async fn reverse_entry(
        &self,
        ctx: &ActorContext,
        entry_id: EntryId,
        date: NaiveDate,
    ) -> Result<PostOutcome, LedgerError> {
        let (_, lines) = self.get_entry_with_lines(entry_id).await?;
        let recorded: Vec<RecordedLine> = lines
            .iter()
            .map(|line| RecordedLine {
                account_id: AccountId::new(line.account_id),
                debit: line.debit,
                credit: line.credit,
            })
            .collect();

        let mut input = RecordEntryInput::new(
            date,
            format!("Reversal of entry #{entry_id}"),
            build_reversal_lines(&recorded),
        );
        input.flags = EntryFlags::reversing();
        input.memo = Some(format!("Automatic reversal of entry #{entry_id}"));
        input.source_type = Some("system".to_string());
        self.record_entry(ctx, input).await
    }

    /// Loads an entry and its lines.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::EntryNotFound`] if the entry does not exist or
    /// has no lines.
    pub async fn get_entry_with_lines(
        &self,
        entry_id: EntryId,
    ) -> Result<(journal_entries::Model, Vec<journal_lines::Model>), LedgerError> {
        let entry = journal_entries::Entity::find_by_id(entry_id.into_inner())
            .one(&self.db)
            .await
            .map_err(LedgerError::database)?
            .ok_or(LedgerError::EntryNotFound { entry: entry_id })?;
        let lines = journal_lines::Entity::find()
            .filter(journal_lines::Column::EntryId.eq(entry_id.into_inner()))
            .all(&self.db)
            .await
            .map_err(LedgerError::database)?;
        if lines.is_empty() {
            return Err(LedgerError::EntryNotFound { entry: entry_id });
        }
        Ok((entry, lines))
    }

    /// Resolves the target period: the explicit one, or the current one.
    pub(crate) async fn resolve_period(
        &self,
        period_id: Option<PeriodId>,
    ) -> Result<crate::entities::accounting_periods::Model, LedgerError> {
        match period_id {
            Some(id) => PeriodRepository::new(self.db.clone()).get(id).await,
            None => PeriodRepository::new(self.db.clone())
                .current_period()
                .await?
                .ok_or(LedgerError::NoActivePeriod),
        }
    }

    /// Validates and inserts one entry with its lines, audit row, and any
    /// scheduled reversal, on the caller's connection. No cycle propagation
    /// here; callers decide when the transaction is over.
    pub(crate) async fn post_into<C: ConnectionTrait>(
        conn: &C,
        ctx: &ActorContext,
        period: &crate::entities::accounting_periods::Model,
        input: &RecordEntryInput,
    ) -> Result<EntryId, LedgerError> {
        check_period_accepts(period, input.entry_date)?;
        let totals = validate_lines(&input.lines)?;
        Self::check_accounts_active(conn, &input.lines).await?;

        let now = chrono::Utc::now();
        let posted = input.status == EntryStatus::Posted;
        let entry = journal_entries::ActiveModel {
            entry_date: Set(input.entry_date),
            description: Set(input.description.clone()),
            status: Set(input.status.as_str().to_string()),
            is_adjusting: Set(input.flags.is_adjusting),
            is_closing: Set(input.flags.is_closing),
            is_reversing: Set(input.flags.is_reversing),
            period_id: Set(period.id),
            document_ref: Set(input.document_ref.clone()),
            external_ref: Set(input.external_ref.clone()),
            memo: Set(input.memo.clone()),
            source_type: Set(input.source_type.clone()),
            created_by: Set(ctx.actor.clone()),
            posted_by: Set(posted.then(|| ctx.actor.clone())),
            created_at: Set(now),
            posted_at: Set(posted.then_some(now)),
            ..Default::default()
        };
        let entry = entry.insert(conn).await.map_err(LedgerError::database)?;

        for line in &input.lines {
            let row = journal_lines::ActiveModel {
                entry_id: Set(entry.id),
                account_id: Set(line.account_id.into_inner()),
                debit: Set(line.debit_amount()),
                credit: Set(line.credit_amount()),
                ..Default::default()
            };
            row.insert(conn).await.map_err(LedgerError::database)?;
        }

        if let Some(reverse_on) = input.schedule_reverse_on {
            let item = reversing_entry_queue::ActiveModel {
                original_entry_id: Set(entry.id),
                reverse_on: Set(reverse_on),
                deadline_on: Set(None),
                remind_on: Set(None),
                status: Set(QueueStatus::Pending.as_str().to_string()),
                approval_required: Set(false),
                authorization_level: Set(0),
                reversed_entry_id: Set(None),
                created_at: Set(now),
                ..Default::default()
            };
            item.insert(conn).await.map_err(LedgerError::database)?;
        }

        AuditLogRepository::append(
            conn,
            &ctx.actor,
            "journal_entry_recorded",
            Some(serde_json::json!({
                "entry_id": entry.id,
                "date": input.entry_date.to_string(),
                "status": input.status.as_str(),
                "debits": totals.debits.to_string(),
                "credits": totals.credits.to_string(),
            })),
        )
        .await
        .map_err(LedgerError::database)?;

        Ok(EntryId::new(entry.id))
    }

    /// Runs cycle tracker propagation for a freshly committed entry,
    /// collecting failures as warnings.
    pub(crate) async fn propagate_cycle(
        &self,
        ctx: &ActorContext,
        period_id: PeriodId,
        flags: EntryFlags,
        status: EntryStatus,
    ) -> Vec<PostingWarning> {
        let periods = PeriodRepository::new(self.db.clone());
        let mut warnings = Vec::new();
        for update in steps_after_posting(flags, status) {
            if let Err(err) = periods
                .set_cycle_step_status(
                    ctx,
                    period_id,
                    update.step,
                    update.status,
                    &update.note,
                    CascadePolicy::CompletePrior,
                )
                .await
            {
                tracing::warn!(
                    step = update.step.number(),
                    error = %err,
                    "cycle tracker update failed after posting"
                );
                warnings.push(PostingWarning::CycleTrackerUpdate {
                    step: update.step.number(),
                    detail: err.to_string(),
                });
            }
        }
        warnings
    }

    /// Rejects lines whose account is missing or inactive.
    async fn check_accounts_active<C: ConnectionTrait>(
        conn: &C,
        lines: &[LineInput],
    ) -> Result<(), LedgerError> {
        let mut ids: Vec<i64> = lines.iter().map(|line| line.account_id.into_inner()).collect();
        ids.sort_unstable();
        ids.dedup();

        let found = accounts::Entity::find()
            .filter(accounts::Column::Id.is_in(ids.clone()))
            .all(conn)
            .await
            .map_err(LedgerError::database)?;

        for id in ids {
            match found.iter().find(|account| account.id == id) {
                Some(account) if account.is_active => {}
                Some(account) => {
                    return Err(LedgerError::AccountNotFound {
                        reference: format!("{} (inactive)", account.name),
                    });
                }
                None => {
                    return Err(LedgerError::AccountNotFound { reference: id.to_string() });
                }
            }
        }
        Ok(())
    }
}

/// Checks that a period accepts an entry dated `date`.
fn check_period_accepts(
    period: &crate::entities::accounting_periods::Model,
    date: NaiveDate,
) -> Result<(), LedgerError> {
    if period.is_closed {
        return Err(LedgerError::PeriodClosed { period: period.name.clone() });
    }
    let out_of_bounds = period.start_date.is_some_and(|start| date < start)
        || period.end_date.is_some_and(|end| date > end);
    if out_of_bounds {
        return Err(LedgerError::DateOutsidePeriod {
            date,
            period: period.name.clone(),
            start: period.start_date.map_or_else(|| "open".to_string(), |d| d.to_string()),
            end: period.end_date.map_or_else(|| "open".to_string(), |d| d.to_string()),
        });
    }
    Ok(())
}
