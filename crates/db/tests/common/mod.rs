//! Shared fixtures for integration tests.
//!
//! Each test gets its own in-memory store with the real migrations applied.

#![allow(dead_code)] // Not every test binary uses every helper.

use chrono::NaiveDate;
use ledgerbook_core::ledger::{ActorContext, LineInput};
use ledgerbook_db::migration::Migrator;
use ledgerbook_db::{AccountRepository, PeriodRepository, PostingRepository, RecordEntryInput};
use ledgerbook_shared::types::{AccountId, EntryId, PeriodId};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

/// The actor all test mutations run as.
pub fn ctx() -> ActorContext {
    ActorContext::new("tester")
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Fresh in-memory store with migrations applied.
pub async fn setup() -> DatabaseConnection {
    // One pooled connection: every handle must see the same in-memory db.
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1);
    let db = Database::connect(opts).await.expect("connect to in-memory sqlite");
    Migrator::up(&db, None).await.expect("run migrations");
    db
}

/// Fresh store with the default chart of accounts and "January 2025"
/// (2025-01-01 to 2025-01-31) as the current period.
pub async fn setup_seeded() -> DatabaseConnection {
    let db = setup().await;
    AccountRepository::new(db.clone())
        .seed_chart_of_accounts(&ctx())
        .await
        .expect("seed chart of accounts");
    PeriodRepository::new(db.clone())
        .create_period(
            &ctx(),
            "January 2025",
            Some(date(2025, 1, 1)),
            Some(date(2025, 1, 31)),
            true,
        )
        .await
        .expect("seed current period");
    db
}

/// Looks an account up by name.
pub async fn account(db: &DatabaseConnection, name: &str) -> AccountId {
    let found = AccountRepository::new(db.clone())
        .find_by_name(name)
        .await
        .expect("account query")
        .unwrap_or_else(|| panic!("account '{name}' should exist"));
    AccountId::new(found.id)
}

/// Id of the current period.
pub async fn current_period_id(db: &DatabaseConnection) -> PeriodId {
    let period = PeriodRepository::new(db.clone())
        .current_period()
        .await
        .expect("period query")
        .expect("a current period");
    PeriodId::new(period.id)
}

/// Posts a plain entry into the current period.
pub async fn post(
    db: &DatabaseConnection,
    entry_date: NaiveDate,
    description: &str,
    lines: Vec<LineInput>,
) -> EntryId {
    PostingRepository::new(db.clone())
        .record_entry(&ctx(), RecordEntryInput::new(entry_date, description, lines))
        .await
        .expect("entry should post")
        .entry_id
}
