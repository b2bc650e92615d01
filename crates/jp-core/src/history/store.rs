use async_trait::async_trait;

use super::types::{HistoryRecord, NewHistoryRecord, RecordId};
use crate::error::HistoryError;

/// Append/query/delete log of completed downloads.
///
/// Each call is a self-contained commit; concurrent jobs never share a transaction.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn append(&self, record: &NewHistoryRecord) -> Result<RecordId, HistoryError>;

    /// Most recent `limit` records, newest first.
    async fn recent(&self, limit: i64) -> Result<Vec<HistoryRecord>, HistoryError>;

    /// Returns false when no record has this id.
    async fn delete(&self, id: RecordId) -> Result<bool, HistoryError>;

    /// Removes every record; returns how many were removed.
    async fn clear(&self) -> Result<u64, HistoryError>;

    /// Release the backing store. Later calls fail with `HistoryError::Unavailable`.
    async fn close(&self) {}
}
