//! WebSocket push channel: every progress event becomes one JSON text frame.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use tokio::sync::broadcast::error::RecvError;

use super::AppState;

/// GET /ws
pub async fn upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let rx = state.orchestrator.progress().subscribe();
    ws.on_upgrade(move |socket| push_events(socket, rx))
}

async fn push_events(
    mut socket: WebSocket,
    mut rx: tokio::sync::broadcast::Receiver<crate::progress::ProgressEvent>,
) {
    tracing::debug!("progress observer connected");
    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Ok(event) => {
                    let frame = event.to_wire().to_string();
                    if socket.send(Message::Text(frame.into())).await.is_err() {
                        break;
                    }
                }
                // Best effort: a slow observer skips what it missed.
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "progress observer lagging; events dropped");
                }
                Err(RecvError::Closed) => break,
            },
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => {}
            },
        }
    }
    tracing::debug!("progress observer disconnected");
}
