//! Spawns the HTTP surface on an ephemeral port with a scratch history database.

use std::sync::Arc;

use jp_core::fetcher::Fetcher;
use jp_core::history::HistoryDb;
use jp_core::orchestrator::{Orchestrator, OrchestratorLimits};
use jp_core::progress::ProgressBroadcaster;
use jp_core::server::{router, AppState};
use tempfile::TempDir;
use tokio::net::TcpListener;

pub struct TestApp {
    /// e.g. "http://127.0.0.1:40123"
    pub base: String,
    pub orchestrator: Arc<Orchestrator>,
    pub client: reqwest::Client,
    /// Holds the history database.
    pub state_dir: TempDir,
    /// Parent of the temporary batch directories.
    pub temp_root: TempDir,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Same path on the `ws://` scheme.
    pub fn ws_url(&self, path: &str) -> String {
        format!("{}{}", self.base.replacen("http://", "ws://", 1), path)
    }
}

pub async fn spawn(fetcher: impl Fetcher + 'static) -> TestApp {
    let state_dir = tempfile::tempdir().unwrap();
    let temp_root = tempfile::tempdir().unwrap();
    let history = HistoryDb::open_at(state_dir.path().join("downloads.db"))
        .await
        .unwrap();
    let orchestrator = Arc::new(
        Orchestrator::new(
            Arc::new(fetcher),
            Arc::new(history),
            ProgressBroadcaster::new(1024),
            OrchestratorLimits::default(),
        )
        .with_temp_root(temp_root.path()),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router(AppState::new(Arc::clone(&orchestrator)));
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    TestApp {
        base: format!("http://{}", addr),
        orchestrator,
        client: reqwest::Client::new(),
        state_dir,
        temp_root,
    }
}
