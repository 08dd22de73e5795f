//! Repository abstractions for data access.
//!
//! Repositories own a [`sea_orm::DatabaseConnection`] and expose the
//! boundary API of the engine. Multi-row mutations run inside a single
//! transaction; validation happens in `ledgerbook-core` before any write.

pub mod account;
pub mod audit;
pub mod closing;
pub mod period;
pub mod posting;
pub mod report;
pub mod reversing;

pub use account::{AccountRepository, CreateAccountInput};
pub use audit::AuditLogRepository;
pub use closing::{ClosingOutcome, ClosingRepository};
pub use period::PeriodRepository;
pub use posting::{PostOutcome, PostingRepository, PostingWarning, RecordEntryInput};
pub use report::{ReportRepository, TrialBalanceFilter};
pub use reversing::{
    CompletedReversal, FailedItem, ItemOutcome, ReversingRepository, ScheduleOptions,
    ScheduleOutcome, SkipReason, SkippedItem,
};
