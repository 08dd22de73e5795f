//! Chart of accounts repository.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

use ledgerbook_core::ledger::{AccountType, ActorContext, LedgerError, Side};
use ledgerbook_shared::types::AccountId;

use crate::entities::accounts;
use crate::repositories::audit::AuditLogRepository;

/// The default small-business chart of accounts.
///
/// Tuple layout: code, name, type, normal side, permanent.
const DEFAULT_CHART: &[(&str, &str, AccountType, Side, bool)] = &[
    ("101", "Cash", AccountType::Asset, Side::Debit, true),
    ("106", "Accounts Receivable", AccountType::Asset, Side::Debit, true),
    ("124", "Supplies", AccountType::Asset, Side::Debit, true),
    ("128", "Prepaid Rent", AccountType::Asset, Side::Debit, true),
    ("167", "Equipment", AccountType::Asset, Side::Debit, true),
    (
        "168",
        "Accumulated Depreciation - Equipment",
        AccountType::ContraAsset,
        Side::Credit,
        true,
    ),
    ("201", "Accounts Payable", AccountType::Liability, Side::Credit, true),
    ("212", "Salaries Payable", AccountType::Liability, Side::Credit, true),
    ("230", "Unearned Revenue", AccountType::Liability, Side::Credit, true),
    ("301", "Owner's Capital", AccountType::Equity, Side::Credit, true),
    ("302", "Owner's Drawings", AccountType::Equity, Side::Debit, true),
    ("401", "Service Revenue", AccountType::Revenue, Side::Credit, false),
    ("402", "Sales Revenue", AccountType::Revenue, Side::Credit, false),
    ("501", "Rent Expense", AccountType::Expense, Side::Debit, false),
    ("502", "Salaries Expense", AccountType::Expense, Side::Debit, false),
    ("503", "Supplies Expense", AccountType::Expense, Side::Debit, false),
    ("504", "Depreciation Expense", AccountType::Expense, Side::Debit, false),
    ("505", "Utilities Expense", AccountType::Expense, Side::Debit, false),
    ("506", "Cost of Goods Sold", AccountType::Expense, Side::Debit, false),
];

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    /// Chart-of-accounts code (unique).
    pub code: String,
    /// Account name (unique).
    pub name: String,
    /// Account classification.
    pub account_type: AccountType,
    /// Normal balance side; defaults to the type's natural side.
    pub normal_side: Option<Side>,
    /// Whether the account survives period close.
    pub is_permanent: bool,
}

/// Chart of accounts repository.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails (including unique-constraint
    /// violations on code or name).
    pub async fn create(
        &self,
        ctx: &ActorContext,
        input: CreateAccountInput,
    ) -> Result<accounts::Model, LedgerError> {
        let normal_side = input.normal_side.unwrap_or_else(|| input.account_type.normal_side());

        let txn = self.db.begin().await.map_err(LedgerError::database)?;
        let account = accounts::ActiveModel {
            code: Set(input.code),
            name: Set(input.name),
            account_type: Set(input.account_type.as_str().to_string()),
            normal_side: Set(normal_side.as_str().to_string()),
            is_permanent: Set(input.is_permanent),
            is_active: Set(true),
            ..Default::default()
        };
        let account = account.insert(&txn).await.map_err(LedgerError::database)?;
        AuditLogRepository::append(
            &txn,
            &ctx.actor,
            "account_created",
            Some(serde_json::json!({ "id": account.id, "code": account.code })),
        )
        .await
        .map_err(LedgerError::database)?;
        txn.commit().await.map_err(LedgerError::database)?;
        Ok(account)
    }

    /// Finds an account by id, active or not.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::AccountNotFound`] if no such account exists.
    pub async fn get(&self, id: AccountId) -> Result<accounts::Model, LedgerError> {
        accounts::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(LedgerError::database)?
            .ok_or(LedgerError::AccountNotFound { reference: id.to_string() })
    }

    /// Finds an account by its unique name.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<accounts::Model>, LedgerError> {
        accounts::Entity::find()
            .filter(accounts::Column::Name.eq(name))
            .one(&self.db)
            .await
            .map_err(LedgerError::database)
    }

    /// Finds an account by its unique code.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn find_by_code(&self, code: &str) -> Result<Option<accounts::Model>, LedgerError> {
        accounts::Entity::find()
            .filter(accounts::Column::Code.eq(code))
            .one(&self.db)
            .await
            .map_err(LedgerError::database)
    }

    /// Lists active accounts ordered by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_active(&self) -> Result<Vec<accounts::Model>, LedgerError> {
        accounts::Entity::find()
            .filter(accounts::Column::IsActive.eq(true))
            .order_by_asc(accounts::Column::Code)
            .all(&self.db)
            .await
            .map_err(LedgerError::database)
    }

    /// Deactivates an account. History stays intact; new lines against the
    /// account are rejected at posting time.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::AccountNotFound`] if no such account exists.
    pub async fn deactivate(
        &self,
        ctx: &ActorContext,
        id: AccountId,
    ) -> Result<accounts::Model, LedgerError> {
        let account = self.get(id).await?;
        let txn = self.db.begin().await.map_err(LedgerError::database)?;
        let mut active: accounts::ActiveModel = account.into();
        active.is_active = Set(false);
        let updated = active.update(&txn).await.map_err(LedgerError::database)?;
        AuditLogRepository::append(
            &txn,
            &ctx.actor,
            "account_deactivated",
            Some(serde_json::json!({ "id": updated.id, "code": updated.code })),
        )
        .await
        .map_err(LedgerError::database)?;
        txn.commit().await.map_err(LedgerError::database)?;
        Ok(updated)
    }

    /// Seeds the default chart of accounts, skipping codes that already
    /// exist. Returns how many accounts were inserted. The whole seed is
    /// one transaction: a failing insert leaves the chart untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if any insert fails.
    pub async fn seed_chart_of_accounts(&self, ctx: &ActorContext) -> Result<usize, LedgerError> {
        let txn = self.db.begin().await.map_err(LedgerError::database)?;
        let mut inserted = 0usize;
        for (code, name, account_type, normal_side, is_permanent) in DEFAULT_CHART {
            let exists = accounts::Entity::find()
                .filter(accounts::Column::Code.eq(*code))
                .one(&txn)
                .await
                .map_err(LedgerError::database)?
                .is_some();
            if exists {
                continue;
            }
            let account = accounts::ActiveModel {
                code: Set((*code).to_string()),
                name: Set((*name).to_string()),
                account_type: Set(account_type.as_str().to_string()),
                normal_side: Set(normal_side.as_str().to_string()),
                is_permanent: Set(*is_permanent),
                is_active: Set(true),
                ..Default::default()
            };
            account.insert(&txn).await.map_err(LedgerError::database)?;
            inserted += 1;
        }
        if inserted > 0 {
            AuditLogRepository::append(
                &txn,
                &ctx.actor,
                "chart_of_accounts_seeded",
                Some(serde_json::json!({ "inserted": inserted })),
            )
            .await
            .map_err(LedgerError::database)?;
        }
        txn.commit().await.map_err(LedgerError::database)?;
        Ok(inserted)
    }
}
