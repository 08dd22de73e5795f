//! Double-entry ledger primitives.
//!
//! Types and validation rules for journal entries. An entry is a dated,
//! described set of lines; each line hits exactly one side of exactly one
//! account. Validation enforces the double-entry law before anything is
//! allowed near storage.

pub mod account;
pub mod error;
pub mod types;
pub mod validation;

pub use account::{AccountType, Side};
pub use error::{ErrorKind, LedgerError};
pub use types::{ActorContext, EntryFlags, EntryStatus, EntryTotals, LineInput, RecordedLine};
pub use validation::validate_lines;
