//! Append-only record of terminal events for the UI.

mod ledger;
mod types;

pub use ledger::HistoryLedger;
pub use types::{HistoryEntry, HistoryKind};
