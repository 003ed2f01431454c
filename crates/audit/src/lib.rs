//! # dbtransfer Audit
//!
//! Stage journal for a single export, import or status invocation.

mod journal;

pub use journal::{Direction, JournalEntry, JournalStats, Stage, TransferJournal};
