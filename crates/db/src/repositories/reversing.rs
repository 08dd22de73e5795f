//! Reversing-entry schedule: queue, approvals, processing.

use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};

use ledgerbook_core::cycle::{step_after_reversal_completion, CascadePolicy};
use ledgerbook_core::ledger::{
    ActorContext, EntryFlags, EntryStatus, LedgerError, RecordedLine,
};
use ledgerbook_core::reversal::{
    build_reversal_lines, is_due, is_ready, ApprovalRecord, ApprovalStatus, QueueStatus,
};
use ledgerbook_shared::types::{AccountId, EntryId, PeriodId, QueueItemId};

use crate::entities::{
    accounting_periods, journal_entries, journal_lines, reversing_entry_approvals,
    reversing_entry_history, reversing_entry_queue,
};
use crate::repositories::audit::AuditLogRepository;
use crate::repositories::period::PeriodRepository;
use crate::repositories::posting::{PostingRepository, PostingWarning, RecordEntryInput};

/// Options for scheduling a reversal.
#[derive(Debug, Clone, Default)]
pub struct ScheduleOptions {
    /// Hard deadline for processing.
    pub deadline_on: Option<NaiveDate>,
    /// Reminder date.
    pub remind_on: Option<NaiveDate>,
    /// Whether the item needs sign-off before it may post.
    pub approval_required: bool,
    /// Required authority level when approval is needed (lower is more
    /// senior).
    pub authorization_level: i32,
}

/// One reversal the processor posted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletedReversal {
    /// The queue item.
    pub queue_id: QueueItemId,
    /// The reversal entry it created.
    pub reversal_entry_id: EntryId,
}

/// Result of processing a single queue item.
#[derive(Debug, Clone)]
pub struct ItemOutcome {
    /// The posted reversal.
    pub completed: CompletedReversal,
    /// Non-fatal problems from cycle tracker propagation.
    pub warnings: Vec<PostingWarning>,
}

/// Why the processor left an item pending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Not yet due.
    NotDue {
        /// The item's reversal date.
        due: NaiveDate,
    },
    /// Approval required and not yet granted at a sufficient level.
    AwaitingApproval,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotDue { due } => write!(f, "not due until {due}"),
            Self::AwaitingApproval => f.write_str("awaiting approval"),
        }
    }
}

/// A pending item the processor skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedItem {
    /// The queue item.
    pub queue_id: QueueItemId,
    /// Why it was skipped.
    pub reason: SkipReason,
}

/// A due, ready item whose posting failed.
#[derive(Debug, Clone)]
pub struct FailedItem {
    /// The queue item.
    pub queue_id: QueueItemId,
    /// The error; the item stays pending.
    pub error: LedgerError,
}

/// Result of one processor run.
#[derive(Debug, Clone, Default)]
pub struct ScheduleOutcome {
    /// Items reversed and marked completed.
    pub completed: Vec<CompletedReversal>,
    /// Items left pending, with the reason.
    pub skipped: Vec<SkippedItem>,
    /// Items that were due and ready but failed to post.
    pub failures: Vec<FailedItem>,
    /// Non-fatal problems from cycle tracker propagation.
    pub warnings: Vec<PostingWarning>,
}

/// Reversing workflow repository.
#[derive(Debug, Clone)]
pub struct ReversingRepository {
    db: DatabaseConnection,
}

impl ReversingRepository {
    /// Creates a new reversing repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Schedules a reversal of an existing entry for a future date.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::EntryNotFound`] if the entry does not exist.
    pub async fn schedule(
        &self,
        ctx: &ActorContext,
        entry_id: EntryId,
        reverse_on: NaiveDate,
        opts: ScheduleOptions,
    ) -> Result<reversing_entry_queue::Model, LedgerError> {
        journal_entries::Entity::find_by_id(entry_id.into_inner())
            .one(&self.db)
            .await
            .map_err(LedgerError::database)?
            .ok_or(LedgerError::EntryNotFound { entry: entry_id })?;

        let txn = self.db.begin().await.map_err(LedgerError::database)?;
        let item = reversing_entry_queue::ActiveModel {
            original_entry_id: Set(entry_id.into_inner()),
            reverse_on: Set(reverse_on),
            deadline_on: Set(opts.deadline_on),
            remind_on: Set(opts.remind_on),
            status: Set(QueueStatus::Pending.as_str().to_string()),
            approval_required: Set(opts.approval_required),
            authorization_level: Set(opts.authorization_level),
            reversed_entry_id: Set(None),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        };
        let item = item.insert(&txn).await.map_err(LedgerError::database)?;
        AuditLogRepository::append(
            &txn,
            &ctx.actor,
            "reversal_scheduled",
            Some(serde_json::json!({
                "queue_id": item.id,
                "entry_id": entry_id.into_inner(),
                "reverse_on": reverse_on.to_string(),
            })),
        )
        .await
        .map_err(LedgerError::database)?;
        txn.commit().await.map_err(LedgerError::database)?;
        Ok(item)
    }

    /// Records a reviewer's verdict on a queue item.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::QueueItemNotFound`] if no such item exists.
    pub async fn record_approval(
        &self,
        ctx: &ActorContext,
        queue_id: QueueItemId,
        reviewer: &str,
        role: &str,
        level: i32,
        status: ApprovalStatus,
    ) -> Result<reversing_entry_approvals::Model, LedgerError> {
        self.get_item(queue_id).await?;

        let txn = self.db.begin().await.map_err(LedgerError::database)?;
        let decided = (status != ApprovalStatus::Pending)
            .then(|| chrono::Utc::now().date_naive());
        let approval = reversing_entry_approvals::ActiveModel {
            queue_id: Set(queue_id.into_inner()),
            reviewer: Set(reviewer.to_string()),
            role: Set(role.to_string()),
            level: Set(level),
            status: Set(status.as_str().to_string()),
            decided_on: Set(decided),
            ..Default::default()
        };
        let approval = approval.insert(&txn).await.map_err(LedgerError::database)?;
        AuditLogRepository::append(
            &txn,
            &ctx.actor,
            "reversal_approval_recorded",
            Some(serde_json::json!({
                "queue_id": queue_id.into_inner(),
                "reviewer": reviewer,
                "status": status.as_str(),
            })),
        )
        .await
        .map_err(LedgerError::database)?;
        txn.commit().await.map_err(LedgerError::database)?;
        Ok(approval)
    }

    /// Lists queue items, optionally filtered by status, ordered by
    /// reversal date.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_queue(
        &self,
        status: Option<QueueStatus>,
    ) -> Result<Vec<reversing_entry_queue::Model>, LedgerError> {
        let mut query = reversing_entry_queue::Entity::find();
        if let Some(status) = status {
            query = query.filter(reversing_entry_queue::Column::Status.eq(status.as_str()));
        }
        query
            .order_by_asc(reversing_entry_queue::Column::ReverseOn)
            .order_by_asc(reversing_entry_queue::Column::Id)
            .all(&self.db)
            .await
            .map_err(LedgerError::database)
    }

    /// Returns the approvals recorded for a queue item.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn approvals_for(
        &self,
        queue_id: QueueItemId,
    ) -> Result<Vec<reversing_entry_approvals::Model>, LedgerError> {
        reversing_entry_approvals::Entity::find()
            .filter(reversing_entry_approvals::Column::QueueId.eq(queue_id.into_inner()))
            .order_by_asc(reversing_entry_approvals::Column::Id)
            .all(&self.db)
            .await
            .map_err(LedgerError::database)
    }

    /// Returns the field-change history for a queue item.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn history_for(
        &self,
        queue_id: QueueItemId,
    ) -> Result<Vec<reversing_entry_history::Model>, LedgerError> {
        reversing_entry_history::Entity::find()
            .filter(reversing_entry_history::Column::QueueId.eq(queue_id.into_inner()))
            .order_by_asc(reversing_entry_history::Column::Id)
            .all(&self.db)
            .await
            .map_err(LedgerError::database)
    }

    /// Processes every pending item due on or before `as_of`.
    ///
    /// Each item posts in its own transaction: a failing item stays pending
    /// and is reported in `failures` while the rest of the run continues.
    /// Items not yet due or still awaiting approval are reported in
    /// `skipped`. Nothing is ever silently discarded.
    ///
    /// # Errors
    ///
    /// Returns an error only if the queue itself cannot be read.
    pub async fn process_schedule(
        &self,
        ctx: &ActorContext,
        as_of: NaiveDate,
    ) -> Result<ScheduleOutcome, LedgerError> {
        let items = self.list_queue(Some(QueueStatus::Pending)).await?;
        let mut outcome = ScheduleOutcome::default();

        for item in items {
            let queue_id = QueueItemId::new(item.id);
            if !is_due(item.reverse_on, as_of) {
                outcome
                    .skipped
                    .push(SkippedItem { queue_id, reason: SkipReason::NotDue { due: item.reverse_on } });
                continue;
            }
            if !self.item_is_ready(&item).await? {
                outcome
                    .skipped
                    .push(SkippedItem { queue_id, reason: SkipReason::AwaitingApproval });
                continue;
            }
            match self.complete_in_txn(ctx, &item).await {
                Ok(reversal_entry_id) => {
                    outcome.completed.push(CompletedReversal { queue_id, reversal_entry_id });
                }
                Err(error) => {
                    tracing::warn!(queue_id = item.id, error = %error, "scheduled reversal failed; item stays pending");
                    outcome.failures.push(FailedItem { queue_id, error });
                }
            }
        }

        if !outcome.completed.is_empty() {
            outcome.warnings = self.mark_reversal_step(ctx).await;
        }
        Ok(outcome)
    }

    /// Processes one queue item immediately, ignoring its due date.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::QueueItemNotFound`] for an unknown item,
    /// [`LedgerError::QueueItemCompleted`] if it already ran, or
    /// [`LedgerError::ReversalNotReady`] if approval is still missing.
    pub async fn process_item(
        &self,
        ctx: &ActorContext,
        queue_id: QueueItemId,
    ) -> Result<ItemOutcome, LedgerError> {
        let item = self.get_item(queue_id).await?;
        if item.status == QueueStatus::Completed.as_str() {
            return Err(LedgerError::QueueItemCompleted { item: queue_id });
        }
        if !self.item_is_ready(&item).await? {
            return Err(LedgerError::ReversalNotReady { item: queue_id });
        }
        let reversal_entry_id = self.complete_in_txn(ctx, &item).await?;
        let warnings = self.mark_reversal_step(ctx).await;
        Ok(ItemOutcome {
            completed: CompletedReversal { queue_id, reversal_entry_id },
            warnings,
        })
    }

    async fn get_item(
        &self,
        queue_id: QueueItemId,
    ) -> Result<reversing_entry_queue::Model, LedgerError> {
        reversing_entry_queue::Entity::find_by_id(queue_id.into_inner())
            .one(&self.db)
            .await
            .map_err(LedgerError::database)?
            .ok_or(LedgerError::QueueItemNotFound { item: queue_id })
    }

    async fn item_is_ready(
        &self,
        item: &reversing_entry_queue::Model,
    ) -> Result<bool, LedgerError> {
        if !item.approval_required {
            return Ok(true);
        }
        let approvals = self.approvals_for(QueueItemId::new(item.id)).await?;
        let records: Vec<ApprovalRecord> = approvals
            .into_iter()
            .filter_map(|row| {
                Some(ApprovalRecord {
                    reviewer: row.reviewer,
                    role: row.role,
                    level: row.level,
                    status: ApprovalStatus::parse(&row.status)?,
                })
            })
            .collect();
        Ok(is_ready(item.approval_required, item.authorization_level, &records))
    }

    /// Posts the reversal, marks the item completed, and appends the
    /// history row, all in one transaction. A failure rolls everything
    /// back; the item stays pending.
    async fn complete_in_txn(
        &self,
        ctx: &ActorContext,
        item: &reversing_entry_queue::Model,
    ) -> Result<EntryId, LedgerError> {
        let txn: DatabaseTransaction = self.db.begin().await.map_err(LedgerError::database)?;

        let period = accounting_periods::Entity::find()
            .filter(accounting_periods::Column::IsCurrent.eq(true))
            .one(&txn)
            .await
            .map_err(LedgerError::database)?
            .ok_or(LedgerError::NoActivePeriod)?;

        let original_id = EntryId::new(item.original_entry_id);
        let original = journal_entries::Entity::find_by_id(item.original_entry_id)
            .one(&txn)
            .await
            .map_err(LedgerError::database)?
            .ok_or(LedgerError::EntryNotFound { entry: original_id })?;
        let lines = journal_lines::Entity::find()
            .filter(journal_lines::Column::EntryId.eq(item.original_entry_id))
            .all(&txn)
            .await
            .map_err(LedgerError::database)?;
        if lines.is_empty() {
            return Err(LedgerError::EntryNotFound { entry: original_id });
        }

        let recorded: Vec<RecordedLine> = lines
            .iter()
            .map(|line| RecordedLine {
                account_id: AccountId::new(line.account_id),
                debit: line.debit,
                credit: line.credit,
            })
            .collect();

        let mut input = RecordEntryInput::new(
            item.reverse_on,
            format!("Reversal of entry #{original_id}"),
            build_reversal_lines(&recorded),
        );
        input.flags = EntryFlags::reversing();
        input.status = EntryStatus::Posted;
        input.memo = Some(format!("Scheduled reversal of '{}'", original.description));
        input.source_type = Some("system".to_string());

        let reversal_entry_id = PostingRepository::post_into(&txn, ctx, &period, &input).await?;

        let mut active: reversing_entry_queue::ActiveModel = item.clone().into();
        active.status = Set(QueueStatus::Completed.as_str().to_string());
        active.reversed_entry_id = Set(Some(reversal_entry_id.into_inner()));
        active.update(&txn).await.map_err(LedgerError::database)?;

        let history = reversing_entry_history::ActiveModel {
            queue_id: Set(item.id),
            field: Set("status".to_string()),
            old_value: Set(Some(QueueStatus::Pending.as_str().to_string())),
            new_value: Set(Some(QueueStatus::Completed.as_str().to_string())),
            changed_by: Set(ctx.actor.clone()),
            changed_at: Set(chrono::Utc::now()),
            ..Default::default()
        };
        history.insert(&txn).await.map_err(LedgerError::database)?;

        txn.commit().await.map_err(LedgerError::database)?;
        Ok(reversal_entry_id)
    }

    /// Marks cycle step 10 completed for the current period. The reversal
    /// belongs to the tail of the cycle, so no cascade: earlier steps of
    /// the new period are not implied.
    async fn mark_reversal_step(&self, ctx: &ActorContext) -> Vec<PostingWarning> {
        let update = step_after_reversal_completion();
        let periods = PeriodRepository::new(self.db.clone());
        let current = match periods.current_period().await {
            Ok(Some(period)) => period,
            Ok(None) => return Vec::new(),
            Err(err) => {
                tracing::warn!(error = %err, "could not resolve current period after reversal");
                return vec![PostingWarning::CycleTrackerUpdate {
                    step: update.step.number(),
                    detail: err.to_string(),
                }];
            }
        };
        match periods
            .set_cycle_step_status(
                ctx,
                PeriodId::new(current.id),
                update.step,
                update.status,
                &update.note,
                CascadePolicy::Exact,
            )
            .await
        {
            Ok(()) => Vec::new(),
            Err(err) => {
                tracing::warn!(error = %err, "cycle tracker update failed after reversal");
                vec![PostingWarning::CycleTrackerUpdate {
                    step: update.step.number(),
                    detail: err.to_string(),
                }]
            }
        }
    }
}
