//! Append-only audit log repository.

use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryOrder,
    QuerySelect, Set,
};

use ledgerbook_core::ledger::LedgerError;

use crate::entities::audit_log;

/// Audit log repository.
#[derive(Debug, Clone)]
pub struct AuditLogRepository {
    db: DatabaseConnection,
}

impl AuditLogRepository {
    /// Creates a new audit log repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Appends one audit row on the caller's connection.
    ///
    /// Generic over the connection so mutating repositories can write the
    /// audit row inside their own transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn append<C: ConnectionTrait>(
        conn: &C,
        actor: &str,
        action: &str,
        details: Option<serde_json::Value>,
    ) -> Result<(), DbErr> {
        let row = audit_log::ActiveModel {
            occurred_at: Set(chrono::Utc::now()),
            actor: Set(actor.to_string()),
            action: Set(action.to_string()),
            details: Set(details.map(|d| d.to_string())),
            ..Default::default()
        };
        row.insert(conn).await?;
        Ok(())
    }

    /// Lists the most recent audit rows, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list(&self, limit: u64) -> Result<Vec<audit_log::Model>, LedgerError> {
        audit_log::Entity::find()
            .order_by_desc(audit_log::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(LedgerError::database)
    }
}
