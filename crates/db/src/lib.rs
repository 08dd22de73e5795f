//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions for the ledger schema
//! - Repository abstractions for data access
//! - Database migrations for the embedded `SQLite` store

pub mod entities;
pub mod migration;
pub mod repositories;

pub use repositories::{
    AccountRepository, AuditLogRepository, ClosingOutcome, ClosingRepository, CompletedReversal,
    CreateAccountInput, FailedItem, ItemOutcome, PeriodRepository, PostOutcome,
    PostingRepository, PostingWarning, RecordEntryInput, ReportRepository, ReversingRepository,
    ScheduleOptions, ScheduleOutcome, SkipReason, SkippedItem, TrialBalanceFilter,
};

use sea_orm::{Database, DatabaseConnection, DbErr};

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}
