//! SQLite-backed history database: connection, migrations, timestamp helper.

use anyhow::Result;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};
use std::path::Path;

use crate::error::HistoryError;

/// Percent-encode a path for use in a sqlite:// URI so spaces and special chars don't break parsing.
fn path_to_sqlite_uri(path: &Path) -> String {
    let s = path.to_string_lossy();
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '%' => out.push_str("%25"),
            ' ' => out.push_str("%20"),
            '#' => out.push_str("%23"),
            '?' => out.push_str("%3F"),
            '&' => out.push_str("%26"),
            c => out.push(c),
        }
    }
    format!("sqlite://{}", out)
}

/// Handle to the SQLite history database.
///
/// The database file defaults to the XDG state directory:
/// `~/.local/state/just-paste/downloads.db`.
#[derive(Clone)]
pub struct HistoryDb {
    pub(crate) pool: Pool<Sqlite>,
}

impl HistoryDb {
    /// Open (or create) the default history database and run migrations.
    pub async fn open_default() -> Result<Self> {
        let xdg_dirs = xdg::BaseDirectories::with_prefix("just-paste")?;
        let state_dir = xdg_dirs.get_state_home().join("just-paste");
        Self::open_at(state_dir.join("downloads.db")).await
    }

    /// Open (or create) the database at a specific path. Creates parent dirs if needed.
    pub async fn open_at(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let uri = path_to_sqlite_uri(path) + "?mode=rwc";
        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect(&uri)
            .await?;
        let db = HistoryDb { pool };
        db.migrate().await?;
        tracing::debug!(path = %path.display(), "history database ready");
        Ok(db)
    }

    async fn migrate(&self) -> Result<()> {
        // `timestamp` is Unix milliseconds (UTC); `file_size` is the display string.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS download_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                url TEXT NOT NULL,
                title TEXT,
                file_format TEXT NOT NULL,
                quality TEXT,
                file_size TEXT,
                download_path TEXT,
                timestamp INTEGER NOT NULL,
                status TEXT NOT NULL DEFAULT 'completed'
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS download_history_timestamp
            ON download_history (timestamp DESC);
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Pool for one operation; a closed database is reported as unavailable.
    pub(crate) fn pool(&self) -> Result<&Pool<Sqlite>, HistoryError> {
        if self.pool.is_closed() {
            return Err(HistoryError::Unavailable("database closed".into()));
        }
        Ok(&self.pool)
    }
}

/// Current time as Unix milliseconds (for history timestamps).
pub(crate) fn unix_timestamp_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
/// Open an in-memory database for tests (no disk I/O).
pub(crate) async fn open_memory() -> Result<HistoryDb> {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    let db = HistoryDb { pool };
    db.migrate().await?;
    Ok(db)
}
