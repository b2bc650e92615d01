//! `just-paste serve` – run the HTTP/WebSocket server until Ctrl-C.

use anyhow::{Context, Result};
use jp_core::config::JpConfig;
use jp_core::server::{self, AppState};
use tokio::net::TcpListener;

pub async fn run_serve(cfg: &JpConfig, bind: Option<&str>) -> Result<()> {
    let addr = bind.unwrap_or(&cfg.bind);
    let state = AppState::from_config(cfg).await?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    println!("just-paste listening on http://{}", listener.local_addr()?);

    server::serve(listener, state, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("waiting for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
        tracing::info!("shutdown requested");
    })
    .await
}
