//! History read/write operations.

use async_trait::async_trait;
use sqlx::Row;

use super::db::{unix_timestamp_millis, HistoryDb};
use super::store::HistoryStore;
use super::types::{format_timestamp, HistoryRecord, NewHistoryRecord, RecordId, STATUS_COMPLETED};
use crate::error::HistoryError;

#[async_trait]
impl HistoryStore for HistoryDb {
    async fn append(&self, record: &NewHistoryRecord) -> Result<RecordId, HistoryError> {
        let row_id = sqlx::query(
            r#"
            INSERT INTO download_history (
                url, title, file_format, quality,
                file_size, download_path, timestamp, status
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&record.url)
        .bind(&record.title)
        .bind(&record.file_format)
        .bind(&record.quality)
        .bind(&record.file_size)
        .bind(&record.download_path)
        .bind(unix_timestamp_millis())
        .bind(STATUS_COMPLETED)
        .execute(self.pool()?)
        .await?
        .last_insert_rowid();

        Ok(row_id)
    }

    async fn recent(&self, limit: i64) -> Result<Vec<HistoryRecord>, HistoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, url, title, file_format, quality,
                   file_size, download_path, timestamp, status
            FROM download_history
            ORDER BY timestamp DESC, id DESC
            LIMIT ?1
            "#,
        )
        .bind(limit.max(0))
        .fetch_all(self.pool()?)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let millis: i64 = row.get("timestamp");
            out.push(HistoryRecord {
                id: row.get("id"),
                url: row.get("url"),
                title: row.get("title"),
                file_format: row.get("file_format"),
                quality: row.get("quality"),
                file_size: row.get("file_size"),
                download_path: row.get("download_path"),
                timestamp: format_timestamp(millis),
                status: row.get("status"),
            });
        }

        Ok(out)
    }

    async fn delete(&self, id: RecordId) -> Result<bool, HistoryError> {
        // Dropping the transaction on error rolls it back.
        let mut tx = self.pool()?.begin().await?;
        let affected = sqlx::query(
            r#"
            DELETE FROM download_history
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();
        tx.commit().await?;
        Ok(affected > 0)
    }

    async fn clear(&self) -> Result<u64, HistoryError> {
        let mut tx = self.pool()?.begin().await?;
        let affected = sqlx::query("DELETE FROM download_history")
            .execute(&mut *tx)
            .await?
            .rows_affected();
        tx.commit().await?;
        Ok(affected)
    }

    async fn close(&self) {
        self.pool.close().await;
        tracing::debug!("history database closed");
    }
}
