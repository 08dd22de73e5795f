//! Accounting period and cycle tracker repository.

use chrono::NaiveDate;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

use ledgerbook_core::cycle::{
    plan_step_update, CascadePolicy, CycleStep, StepState, StepStatus, StepUpdate,
};
use ledgerbook_core::ledger::{ActorContext, LedgerError};
use ledgerbook_shared::types::PeriodId;

use crate::entities::{accounting_periods, cycle_step_status};
use crate::repositories::audit::AuditLogRepository;

/// Accounting period repository, including the per-period cycle tracker.
#[derive(Debug, Clone)]
pub struct PeriodRepository {
    db: DatabaseConnection,
}

impl PeriodRepository {
    /// Creates a new period repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a period, or updates the bounds of an existing period with
    /// the same name. Seeds the ten cycle step rows either way.
    ///
    /// # Errors
    ///
    /// Returns an error if a database operation fails.
    pub async fn create_period(
        &self,
        ctx: &ActorContext,
        name: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        make_current: bool,
    ) -> Result<accounting_periods::Model, LedgerError> {
        let txn = self.db.begin().await.map_err(LedgerError::database)?;

        let existing = accounting_periods::Entity::find()
            .filter(accounting_periods::Column::Name.eq(name))
            .one(&txn)
            .await
            .map_err(LedgerError::database)?;

        let mut period = match existing {
            Some(found) => {
                let mut active: accounting_periods::ActiveModel = found.into();
                active.start_date = Set(start_date);
                active.end_date = Set(end_date);
                active.update(&txn).await.map_err(LedgerError::database)?
            }
            None => {
                let fresh = accounting_periods::ActiveModel {
                    name: Set(name.to_string()),
                    start_date: Set(start_date),
                    end_date: Set(end_date),
                    is_closed: Set(false),
                    is_current: Set(false),
                    current_step: Set(1),
                    ..Default::default()
                };
                fresh.insert(&txn).await.map_err(LedgerError::database)?
            }
        };

        Self::ensure_cycle_steps(&txn, period.id).await?;

        if make_current && !period.is_current {
            accounting_periods::Entity::update_many()
                .col_expr(accounting_periods::Column::IsCurrent, Expr::value(false))
                .exec(&txn)
                .await
                .map_err(LedgerError::database)?;
            let mut active: accounting_periods::ActiveModel = period.into();
            active.is_current = Set(true);
            period = active.update(&txn).await.map_err(LedgerError::database)?;
        }

        AuditLogRepository::append(
            &txn,
            &ctx.actor,
            "period_created",
            Some(serde_json::json!({ "id": period.id, "name": period.name })),
        )
        .await
        .map_err(LedgerError::database)?;
        txn.commit().await.map_err(LedgerError::database)?;
        Ok(period)
    }

    /// Makes a period the current one, clearing the flag on all others.
    ///
    /// Never touches `is_closed`: activating a closed period for review is
    /// allowed, posting to it still is not. A period with an untouched
    /// tracker gets step 1 marked in progress.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::PeriodNotFound`] if no such period exists.
    pub async fn set_active_period(
        &self,
        ctx: &ActorContext,
        id: PeriodId,
    ) -> Result<accounting_periods::Model, LedgerError> {
        let txn = self.db.begin().await.map_err(LedgerError::database)?;

        let period = accounting_periods::Entity::find_by_id(id.into_inner())
            .one(&txn)
            .await
            .map_err(LedgerError::database)?
            .ok_or(LedgerError::PeriodNotFound { period: id })?;

        accounting_periods::Entity::update_many()
            .col_expr(accounting_periods::Column::IsCurrent, Expr::value(false))
            .exec(&txn)
            .await
            .map_err(LedgerError::database)?;

        let mut active: accounting_periods::ActiveModel = period.into();
        active.is_current = Set(true);
        let period = active.update(&txn).await.map_err(LedgerError::database)?;

        Self::ensure_cycle_steps(&txn, period.id).await?;
        let rows = Self::step_rows(&txn, period.id).await?;
        if rows.iter().all(|row| row.status == StepStatus::Pending.as_str()) {
            let updates = plan_step_update(
                &Self::states_from_rows(&rows),
                CycleStep::AnalyzeTransactions,
                StepStatus::InProgress,
                "Period activated",
                CascadePolicy::Exact,
            );
            Self::apply_updates_in(&txn, period.id, &updates).await?;
        }

        AuditLogRepository::append(
            &txn,
            &ctx.actor,
            "period_activated",
            Some(serde_json::json!({ "id": period.id, "name": period.name })),
        )
        .await
        .map_err(LedgerError::database)?;
        txn.commit().await.map_err(LedgerError::database)?;
        Ok(period)
    }

    /// Returns the current period, if one is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn current_period(&self) -> Result<Option<accounting_periods::Model>, LedgerError> {
        accounting_periods::Entity::find()
            .filter(accounting_periods::Column::IsCurrent.eq(true))
            .one(&self.db)
            .await
            .map_err(LedgerError::database)
    }

    /// Finds a period by id.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::PeriodNotFound`] if no such period exists.
    pub async fn get(&self, id: PeriodId) -> Result<accounting_periods::Model, LedgerError> {
        accounting_periods::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(LedgerError::database)?
            .ok_or(LedgerError::PeriodNotFound { period: id })
    }

    /// Closes a period to further posting.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::PeriodNotFound`] if no such period exists.
    pub async fn close_period(
        &self,
        ctx: &ActorContext,
        id: PeriodId,
    ) -> Result<accounting_periods::Model, LedgerError> {
        let period = self.get(id).await?;
        let txn = self.db.begin().await.map_err(LedgerError::database)?;
        let mut active: accounting_periods::ActiveModel = period.into();
        active.is_closed = Set(true);
        let period = active.update(&txn).await.map_err(LedgerError::database)?;
        AuditLogRepository::append(
            &txn,
            &ctx.actor,
            "period_closed",
            Some(serde_json::json!({ "id": period.id, "name": period.name })),
        )
        .await
        .map_err(LedgerError::database)?;
        txn.commit().await.map_err(LedgerError::database)?;
        Ok(period)
    }

    /// Lists all periods ordered by start date, then name.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_periods(&self) -> Result<Vec<accounting_periods::Model>, LedgerError> {
        accounting_periods::Entity::find()
            .order_by_asc(accounting_periods::Column::StartDate)
            .order_by_asc(accounting_periods::Column::Name)
            .all(&self.db)
            .await
            .map_err(LedgerError::database)
    }

    /// Returns all ten cycle step rows for a period, ordered by step.
    ///
    /// # Errors
    ///
    /// Returns an error if a database operation fails.
    pub async fn get_cycle_status(
        &self,
        period_id: PeriodId,
    ) -> Result<Vec<cycle_step_status::Model>, LedgerError> {
        Self::ensure_cycle_steps(&self.db, period_id.into_inner()).await?;
        Self::step_rows(&self.db, period_id.into_inner()).await
    }

    /// Sets one cycle step's status, applying the given cascade policy.
    ///
    /// Also records the step as the period's `current_step`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::PeriodNotFound`] if no such period exists.
    pub async fn set_cycle_step_status(
        &self,
        ctx: &ActorContext,
        period_id: PeriodId,
        step: CycleStep,
        status: StepStatus,
        note: &str,
        policy: CascadePolicy,
    ) -> Result<(), LedgerError> {
        let period = self.get(period_id).await?;

        let txn = self.db.begin().await.map_err(LedgerError::database)?;
        Self::ensure_cycle_steps(&txn, period.id).await?;
        let rows = Self::step_rows(&txn, period.id).await?;
        let updates =
            plan_step_update(&Self::states_from_rows(&rows), step, status, note, policy);
        Self::apply_updates_in(&txn, period.id, &updates).await?;

        let mut active: accounting_periods::ActiveModel = period.into();
        active.current_step = Set(i32::from(step.number()));
        active.update(&txn).await.map_err(LedgerError::database)?;

        AuditLogRepository::append(
            &txn,
            &ctx.actor,
            "cycle_step_updated",
            Some(serde_json::json!({
                "period_id": period_id.into_inner(),
                "step": step.number(),
                "status": status.as_str(),
            })),
        )
        .await
        .map_err(LedgerError::database)?;
        txn.commit().await.map_err(LedgerError::database)?;
        Ok(())
    }

    /// Applies a batch of planned tracker updates, one cascade policy for
    /// all of them. Used by posting-side propagation.
    ///
    /// # Errors
    ///
    /// Returns an error if any update fails.
    pub async fn apply_step_updates(
        &self,
        ctx: &ActorContext,
        period_id: PeriodId,
        updates: &[StepUpdate],
        policy: CascadePolicy,
    ) -> Result<(), LedgerError> {
        for update in updates {
            self.set_cycle_step_status(
                ctx,
                period_id,
                update.step,
                update.status,
                &update.note,
                policy,
            )
            .await?;
        }
        Ok(())
    }

    /// Inserts any missing step rows for a period.
    pub(crate) async fn ensure_cycle_steps<C: ConnectionTrait>(
        conn: &C,
        period_id: i64,
    ) -> Result<(), LedgerError> {
        for step in CycleStep::all() {
            let exists = cycle_step_status::Entity::find()
                .filter(cycle_step_status::Column::PeriodId.eq(period_id))
                .filter(cycle_step_status::Column::Step.eq(i32::from(step.number())))
                .one(conn)
                .await
                .map_err(LedgerError::database)?;
            if exists.is_none() {
                let row = cycle_step_status::ActiveModel {
                    period_id: Set(period_id),
                    step: Set(i32::from(step.number())),
                    step_name: Set(step.name().to_string()),
                    status: Set(StepStatus::Pending.as_str().to_string()),
                    note: Set(None),
                    updated_at: Set(chrono::Utc::now()),
                    ..Default::default()
                };
                row.insert(conn).await.map_err(LedgerError::database)?;
            }
        }
        Ok(())
    }

    async fn step_rows<C: ConnectionTrait>(
        conn: &C,
        period_id: i64,
    ) -> Result<Vec<cycle_step_status::Model>, LedgerError> {
        cycle_step_status::Entity::find()
            .filter(cycle_step_status::Column::PeriodId.eq(period_id))
            .order_by_asc(cycle_step_status::Column::Step)
            .all(conn)
            .await
            .map_err(LedgerError::database)
    }

    fn states_from_rows(rows: &[cycle_step_status::Model]) -> Vec<StepState> {
        rows.iter()
            .filter_map(|row| {
                let step = u8::try_from(row.step).ok().and_then(CycleStep::from_number)?;
                let status = StepStatus::parse(&row.status)?;
                Some(StepState { step, status })
            })
            .collect()
    }

    async fn apply_updates_in<C: ConnectionTrait>(
        conn: &C,
        period_id: i64,
        updates: &[StepUpdate],
    ) -> Result<(), LedgerError> {
        let now = chrono::Utc::now();
        for update in updates {
            cycle_step_status::Entity::update_many()
                .col_expr(cycle_step_status::Column::Status, Expr::value(update.status.as_str()))
                .col_expr(cycle_step_status::Column::Note, Expr::value(update.note.clone()))
                .col_expr(cycle_step_status::Column::UpdatedAt, Expr::value(now))
                .filter(cycle_step_status::Column::PeriodId.eq(period_id))
                .filter(cycle_step_status::Column::Step.eq(i32::from(update.step.number())))
                .exec(conn)
                .await
                .map_err(LedgerError::database)?;
        }
        Ok(())
    }
}
