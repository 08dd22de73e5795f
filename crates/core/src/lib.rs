//! Core accounting logic for Ledgerbook.
//!
//! Pure business rules for the double-entry ledger and accounting-cycle
//! engine: entry validation, the 10-step cycle state machine, closing-entry
//! planning, reversing-entry construction/readiness, and report assembly.
//! No database or I/O dependencies; persistence lives in `ledgerbook-db`.

pub mod closing;
pub mod cycle;
pub mod ledger;
pub mod reports;
pub mod reversal;
