//! Initial schema: chart of accounts, journal, periods, cycle tracker,
//! reversing queue, and audit log.

use sea_orm_migration::prelude::*;

/// Initial schema migration.
#[derive(DeriveMigrationName)]
pub struct Migration;

const CREATE_ACCOUNTS: &str = r"
CREATE TABLE IF NOT EXISTS accounts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    code TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL UNIQUE,
    account_type TEXT NOT NULL,
    normal_side TEXT NOT NULL,
    is_permanent INTEGER NOT NULL DEFAULT 1,
    is_active INTEGER NOT NULL DEFAULT 1
);
";

const CREATE_ACCOUNTING_PERIODS: &str = r"
CREATE TABLE IF NOT EXISTS accounting_periods (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    start_date TEXT,
    end_date TEXT,
    is_closed INTEGER NOT NULL DEFAULT 0,
    is_current INTEGER NOT NULL DEFAULT 0,
    current_step INTEGER NOT NULL DEFAULT 1
);
";

const CREATE_JOURNAL_ENTRIES: &str = r"
CREATE TABLE IF NOT EXISTS journal_entries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    entry_date TEXT NOT NULL,
    description TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'posted',
    is_adjusting INTEGER NOT NULL DEFAULT 0,
    is_closing INTEGER NOT NULL DEFAULT 0,
    is_reversing INTEGER NOT NULL DEFAULT 0,
    period_id INTEGER NOT NULL REFERENCES accounting_periods(id),
    document_ref TEXT,
    external_ref TEXT,
    memo TEXT,
    source_type TEXT,
    created_by TEXT NOT NULL,
    posted_by TEXT,
    created_at TEXT NOT NULL,
    posted_at TEXT
);
";

const CREATE_JOURNAL_LINES: &str = r"
CREATE TABLE IF NOT EXISTS journal_lines (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    entry_id INTEGER NOT NULL REFERENCES journal_entries(id) ON DELETE CASCADE,
    account_id INTEGER NOT NULL REFERENCES accounts(id),
    debit REAL NOT NULL DEFAULT 0,
    credit REAL NOT NULL DEFAULT 0,
    CHECK ((debit > 0 AND credit = 0) OR (credit > 0 AND debit = 0))
);
";

const CREATE_CYCLE_STEP_STATUS: &str = r"
CREATE TABLE IF NOT EXISTS cycle_step_status (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    period_id INTEGER NOT NULL REFERENCES accounting_periods(id) ON DELETE CASCADE,
    step INTEGER NOT NULL,
    step_name TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'pending',
    note TEXT,
    updated_at TEXT NOT NULL,
    UNIQUE (period_id, step)
);
";

const CREATE_REVERSING_ENTRY_QUEUE: &str = r"
CREATE TABLE IF NOT EXISTS reversing_entry_queue (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    original_entry_id INTEGER NOT NULL REFERENCES journal_entries(id),
    reverse_on TEXT NOT NULL,
    deadline_on TEXT,
    remind_on TEXT,
    status TEXT NOT NULL DEFAULT 'pending',
    approval_required INTEGER NOT NULL DEFAULT 0,
    authorization_level INTEGER NOT NULL DEFAULT 0,
    reversed_entry_id INTEGER REFERENCES journal_entries(id),
    created_at TEXT NOT NULL
);
";

const CREATE_REVERSING_ENTRY_APPROVALS: &str = r"
CREATE TABLE IF NOT EXISTS reversing_entry_approvals (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    queue_id INTEGER NOT NULL REFERENCES reversing_entry_queue(id) ON DELETE CASCADE,
    reviewer TEXT NOT NULL,
    role TEXT NOT NULL,
    level INTEGER NOT NULL DEFAULT 0,
    status TEXT NOT NULL DEFAULT 'pending',
    decided_on TEXT
);
";

const CREATE_REVERSING_ENTRY_HISTORY: &str = r"
CREATE TABLE IF NOT EXISTS reversing_entry_history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    queue_id INTEGER NOT NULL REFERENCES reversing_entry_queue(id) ON DELETE CASCADE,
    field TEXT NOT NULL,
    old_value TEXT,
    new_value TEXT,
    changed_by TEXT NOT NULL,
    changed_at TEXT NOT NULL
);
";

const CREATE_AUDIT_LOG: &str = r"
CREATE TABLE IF NOT EXISTS audit_log (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    occurred_at TEXT NOT NULL,
    actor TEXT NOT NULL,
    action TEXT NOT NULL,
    details TEXT
);
";

const CREATE_INDEXES: &str = r"
CREATE INDEX IF NOT EXISTS idx_journal_entries_period ON journal_entries(period_id);
CREATE INDEX IF NOT EXISTS idx_journal_entries_date ON journal_entries(entry_date);
CREATE INDEX IF NOT EXISTS idx_journal_lines_entry ON journal_lines(entry_id);
CREATE INDEX IF NOT EXISTS idx_journal_lines_account ON journal_lines(account_id);
CREATE INDEX IF NOT EXISTS idx_reversing_queue_status ON reversing_entry_queue(status, reverse_on);
";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();
        conn.execute_unprepared(CREATE_ACCOUNTS).await?;
        conn.execute_unprepared(CREATE_ACCOUNTING_PERIODS).await?;
        conn.execute_unprepared(CREATE_JOURNAL_ENTRIES).await?;
        conn.execute_unprepared(CREATE_JOURNAL_LINES).await?;
        conn.execute_unprepared(CREATE_CYCLE_STEP_STATUS).await?;
        conn.execute_unprepared(CREATE_REVERSING_ENTRY_QUEUE).await?;
        conn.execute_unprepared(CREATE_REVERSING_ENTRY_APPROVALS).await?;
        conn.execute_unprepared(CREATE_REVERSING_ENTRY_HISTORY).await?;
        conn.execute_unprepared(CREATE_AUDIT_LOG).await?;
        conn.execute_unprepared(CREATE_INDEXES).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();
        conn.execute_unprepared("DROP TABLE IF EXISTS audit_log;").await?;
        conn.execute_unprepared("DROP TABLE IF EXISTS reversing_entry_history;").await?;
        conn.execute_unprepared("DROP TABLE IF EXISTS reversing_entry_approvals;").await?;
        conn.execute_unprepared("DROP TABLE IF EXISTS reversing_entry_queue;").await?;
        conn.execute_unprepared("DROP TABLE IF EXISTS cycle_step_status;").await?;
        conn.execute_unprepared("DROP TABLE IF EXISTS journal_lines;").await?;
        conn.execute_unprepared("DROP TABLE IF EXISTS journal_entries;").await?;
        conn.execute_unprepared("DROP TABLE IF EXISTS accounting_periods;").await?;
        conn.execute_unprepared("DROP TABLE IF EXISTS accounts;").await?;
        Ok(())
    }
}
