//! `SeaORM` entity definitions for the ledger schema.
//!
//! Enum-valued columns (account types, statuses) are stored as their
//! canonical strings; `ledgerbook-core` owns the enums and their parsing.

pub mod accounts;
pub mod accounting_periods;
pub mod audit_log;
pub mod cycle_step_status;
pub mod journal_entries;
pub mod journal_lines;
pub mod reversing_entry_approvals;
pub mod reversing_entry_history;
pub mod reversing_entry_queue;
