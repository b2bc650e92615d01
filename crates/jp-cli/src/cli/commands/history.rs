//! `just-paste history`, `clear-history`, `delete-history`.

use anyhow::{bail, Result};
use jp_core::config::JpConfig;
use jp_core::history::{HistoryDb, HistoryStore};

/// The configured history database, or the XDG default.
pub async fn open_history(cfg: &JpConfig) -> Result<HistoryDb> {
    match &cfg.database_path {
        Some(path) => HistoryDb::open_at(path).await,
        None => HistoryDb::open_default().await,
    }
}

pub async fn run_history(db: &HistoryDb, limit: i64) -> Result<()> {
    let records = db.recent(limit).await?;
    if records.is_empty() {
        println!("No downloads in history.");
        return Ok(());
    }
    println!(
        "{:<6} {:<28} {:<6} {:<10} {:<12} {}",
        "ID", "WHEN", "FMT", "QUALITY", "SIZE", "TITLE / URL"
    );
    for r in records {
        println!(
            "{:<6} {:<28} {:<6} {:<10} {:<12} {}",
            r.id,
            r.timestamp,
            r.file_format,
            r.quality.as_deref().unwrap_or("-"),
            r.file_size.as_deref().unwrap_or("-"),
            r.title.as_deref().unwrap_or(&r.url)
        );
    }
    Ok(())
}

pub async fn run_clear_history(db: &HistoryDb) -> Result<()> {
    let removed = db.clear().await?;
    println!("History cleared ({} records removed).", removed);
    Ok(())
}

pub async fn run_delete_history(db: &HistoryDb, id: i64) -> Result<()> {
    if !db.delete(id).await? {
        bail!("record {} not found", id);
    }
    println!("Record {} deleted.", id);
    Ok(())
}
