//! Database seeder for Ledgerbook development and testing.
//!
//! Runs pending migrations, seeds the default chart of accounts, and makes
//! sure a current accounting period exists for this month.
//!
//! Usage: cargo run --bin seeder

use chrono::{Datelike, NaiveDate, Utc};
use ledgerbook_core::ledger::ActorContext;
use ledgerbook_db::migration::Migrator;
use ledgerbook_db::{AccountRepository, PeriodRepository};
use ledgerbook_shared::AppConfig;
use sea_orm_migration::MigratorTrait;
use tracing::info;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load().expect("failed to load configuration");

    info!(url = %config.database.url, "connecting to database");
    let db = ledgerbook_db::connect(&config.database.url)
        .await
        .expect("failed to connect to database");

    info!("running migrations");
    Migrator::up(&db, None).await.expect("migrations failed");

    let ctx = ActorContext::new("seeder");

    info!("seeding chart of accounts");
    let inserted = AccountRepository::new(db.clone())
        .seed_chart_of_accounts(&ctx)
        .await
        .expect("failed to seed chart of accounts");
    info!(inserted, "chart of accounts ready");

    info!("seeding current accounting period");
    let (name, start, end) = current_month_bounds();
    let periods = PeriodRepository::new(db.clone());
    let period = periods
        .create_period(&ctx, &name, Some(start), Some(end), true)
        .await
        .expect("failed to seed period");
    info!(period = %period.name, "current period ready");

    info!("seeding complete");
}

/// Name and inclusive bounds of the current calendar month.
fn current_month_bounds() -> (String, NaiveDate, NaiveDate) {
    let today = Utc::now().date_naive();
    let start = NaiveDate::from_ymd_opt(today.year(), today.month(), 1)
        .expect("first of month is always valid");
    let next_month = if today.month() == 12 {
        NaiveDate::from_ymd_opt(today.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(today.year(), today.month() + 1, 1)
    }
    .expect("first of next month is always valid");
    let end = next_month.pred_opt().expect("last day of month is always valid");
    (start.format("%B %Y").to_string(), start, end)
}
