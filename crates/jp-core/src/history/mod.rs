//! Persistent download history (SQLite via sqlx).
//!
//! One row per successful job. Rows are never updated; they are removed one at
//! a time or all at once by operator calls.

mod db;
mod records;
mod store;
mod types;

pub use db::HistoryDb;
pub use store::HistoryStore;
pub use types::*;
