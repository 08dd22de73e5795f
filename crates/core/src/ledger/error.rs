//! Error taxonomy for the ledger engine.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use ledgerbook_shared::types::{AccountId, EntryId, PeriodId, QueueItemId};

/// Broad classification of a [`LedgerError`], for callers that branch on
/// category rather than on the precise variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input itself is malformed (empty, unbalanced, bad amounts).
    Validation,
    /// The input is well-formed but the ledger's state forbids the operation.
    State,
    /// A referenced record does not exist.
    NotFound,
    /// The storage layer failed.
    Storage,
}

/// Errors produced by ledger operations.
///
/// Messages carry the expected-versus-actual detail so callers can surface
/// them without re-querying.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// Entry has no lines at all.
    #[error("Journal entry has no lines")]
    NoLines,

    /// A line carries a zero amount.
    #[error("Line for account {account} has a zero amount")]
    ZeroAmount {
        /// Account on the offending line.
        account: AccountId,
    },

    /// A line carries a negative amount.
    #[error("Line for account {account} has a negative amount; use the opposite side instead")]
    NegativeAmount {
        /// Account on the offending line.
        account: AccountId,
    },

    /// Debit and credit totals disagree beyond tolerance.
    #[error("Entry is not balanced: debits {debits} != credits {credits} (difference {difference})")]
    Unbalanced {
        /// Sum of debit lines.
        debits: Decimal,
        /// Sum of credit lines.
        credits: Decimal,
        /// Absolute difference between the sides.
        difference: Decimal,
    },

    /// Entry date falls outside the target period's bounds.
    #[error("Entry date {date} is outside period '{period}' ({start} to {end})")]
    DateOutsidePeriod {
        /// Offending entry date.
        date: NaiveDate,
        /// Period name.
        period: String,
        /// Period start bound, rendered for the message.
        start: String,
        /// Period end bound, rendered for the message.
        end: String,
    },

    /// No period is marked current and none was given explicitly.
    #[error("No active accounting period; create or activate one first")]
    NoActivePeriod,

    /// Target period has been closed to posting.
    #[error("Accounting period '{period}' is closed; no further entries may be posted to it")]
    PeriodClosed {
        /// Period name.
        period: String,
    },

    /// Closing entries already exist for the period.
    #[error("Closing entries already posted for period '{period}'")]
    ClosingAlreadyPosted {
        /// Period name.
        period: String,
    },

    /// The chart of accounts has no owner's capital account to close into.
    #[error("Cannot close: no '{name}' account exists in the chart of accounts")]
    CapitalAccountMissing {
        /// Expected capital account name.
        name: String,
    },

    /// Referenced account does not exist (or is inactive when an active one
    /// is required).
    #[error("Account not found: {reference}")]
    AccountNotFound {
        /// Id, code, or name used in the lookup.
        reference: String,
    },

    /// Referenced journal entry does not exist.
    #[error("Journal entry {entry} not found")]
    EntryNotFound {
        /// Missing entry id.
        entry: EntryId,
    },

    /// Referenced accounting period does not exist.
    #[error("Accounting period {period} not found")]
    PeriodNotFound {
        /// Missing period id.
        period: PeriodId,
    },

    /// Referenced reversing queue item does not exist.
    #[error("Reversing queue item {item} not found")]
    QueueItemNotFound {
        /// Missing queue item id.
        item: QueueItemId,
    },

    /// Queue item has already been processed.
    #[error("Reversing queue item {item} is already completed")]
    QueueItemCompleted {
        /// Completed queue item id.
        item: QueueItemId,
    },

    /// Queue item still awaits the approvals it requires.
    #[error("Reversing queue item {item} is not ready: required approval is missing")]
    ReversalNotReady {
        /// Blocked queue item id.
        item: QueueItemId,
    },

    /// Underlying storage failure.
    #[error("Database error: {0}")]
    Database(String),
}

impl LedgerError {
    /// Wraps any displayable storage error.
    pub fn database(err: impl std::fmt::Display) -> Self {
        Self::Database(err.to_string())
    }

    /// Returns the broad classification of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NoLines
            | Self::ZeroAmount { .. }
            | Self::NegativeAmount { .. }
            | Self::Unbalanced { .. }
            | Self::DateOutsidePeriod { .. } => ErrorKind::Validation,
            Self::NoActivePeriod
            | Self::PeriodClosed { .. }
            | Self::ClosingAlreadyPosted { .. }
            | Self::QueueItemCompleted { .. }
            | Self::ReversalNotReady { .. } => ErrorKind::State,
            Self::CapitalAccountMissing { .. }
            | Self::AccountNotFound { .. }
            | Self::EntryNotFound { .. }
            | Self::PeriodNotFound { .. }
            | Self::QueueItemNotFound { .. } => ErrorKind::NotFound,
            Self::Database(_) => ErrorKind::Storage,
        }
    }

    /// Returns a stable machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NoLines => "LEDGER_NO_LINES",
            Self::ZeroAmount { .. } => "LEDGER_ZERO_AMOUNT",
            Self::NegativeAmount { .. } => "LEDGER_NEGATIVE_AMOUNT",
            Self::Unbalanced { .. } => "LEDGER_UNBALANCED",
            Self::DateOutsidePeriod { .. } => "PERIOD_DATE_OUT_OF_BOUNDS",
            Self::NoActivePeriod => "PERIOD_NONE_ACTIVE",
            Self::PeriodClosed { .. } => "PERIOD_CLOSED",
            Self::ClosingAlreadyPosted { .. } => "CLOSING_ALREADY_POSTED",
            Self::CapitalAccountMissing { .. } => "CLOSING_NO_CAPITAL_ACCOUNT",
            Self::AccountNotFound { .. } => "ACCOUNT_NOT_FOUND",
            Self::EntryNotFound { .. } => "ENTRY_NOT_FOUND",
            Self::PeriodNotFound { .. } => "PERIOD_NOT_FOUND",
            Self::QueueItemNotFound { .. } => "QUEUE_ITEM_NOT_FOUND",
            Self::QueueItemCompleted { .. } => "QUEUE_ITEM_COMPLETED",
            Self::ReversalNotReady { .. } => "REVERSAL_NOT_READY",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}
