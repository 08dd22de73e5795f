//! Common type definitions.

pub mod id;

pub use id::{AccountId, EntryId, PeriodId, QueueItemId};
