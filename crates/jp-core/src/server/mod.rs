//! HTTP/WebSocket surface (axum).
//!
//! Routes:
//! - `GET /` front-end page (optional static dir)
//! - `POST /download` run a batch
//! - `GET /download_file?path=` fetch a packaged output
//! - `GET /history`, `POST /clear_history`, `DELETE /delete_history/{id}`
//! - `POST /validate_path`
//! - `GET /ws` progress push channel

mod dto;
mod handlers;
mod ws;

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::routing::{delete, get, post};
use axum::Router;
use tokio::net::TcpListener;

use crate::config::JpConfig;
use crate::fetcher::YtDlpFetcher;
use crate::history::HistoryDb;
use crate::orchestrator::Orchestrator;
use crate::progress::ProgressBroadcaster;

pub use dto::{download_url, DownloadBody, DownloadResponse, ErrorEntry, ResultEntry};
pub use handlers::{content_disposition, ApiError};

/// Shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    /// Number of records `GET /history` returns.
    pub history_limit: i64,
    pub static_dir: Option<PathBuf>,
}

impl AppState {
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        Self {
            orchestrator,
            history_limit: 100,
            static_dir: None,
        }
    }

    /// Production wiring: yt-dlp fetcher, SQLite history, broadcast hub.
    pub async fn from_config(cfg: &JpConfig) -> Result<Self> {
        let history = match &cfg.database_path {
            Some(path) => HistoryDb::open_at(path).await,
            None => HistoryDb::open_default().await,
        }
        .context("opening history database")?;
        let orchestrator = Orchestrator::new(
            Arc::new(YtDlpFetcher::new(&cfg.ytdlp_path)),
            Arc::new(history),
            ProgressBroadcaster::new(cfg.progress_buffer),
            cfg.limits(),
        );
        Ok(Self {
            orchestrator: Arc::new(orchestrator),
            history_limit: cfg.history_limit,
            static_dir: cfg.static_dir.clone(),
        })
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/download", post(handlers::download))
        .route("/download_file", get(handlers::download_file))
        .route("/history", get(handlers::history))
        .route("/clear_history", post(handlers::clear_history))
        .route("/delete_history/{id}", delete(handlers::delete_history))
        .route("/validate_path", post(handlers::validate_path))
        .route("/ws", get(ws::upgrade))
        .with_state(state)
}

/// Serve until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!(%addr, "listening");
    let orchestrator = Arc::clone(&state.orchestrator);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .context("http server")?;
    orchestrator.history().close().await;
    tracing::info!("server stopped");
    Ok(())
}
