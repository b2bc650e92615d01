//! Progress push channel: a `/ws` observer sees every job's frames in order.

mod common;

use std::time::Duration;

use common::stubs::LocalFetcher;
use futures_util::StreamExt;
use serde_json::{json, Value};
use tokio_tungstenite::tungstenite::Message;

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// Reads text frames until `done` frames named `download_complete` or `download_error` arrived.
async fn read_until_terminal(ws: &mut WsStream, done: usize) -> Vec<Value> {
    let mut frames = Vec::new();
    let mut terminal = 0;
    while terminal < done {
        let msg = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("no frame within 5s")
            .expect("socket closed")
            .unwrap();
        let Message::Text(text) = msg else { continue };
        let frame: Value = serde_json::from_str(text.as_str()).unwrap();
        if frame["event"] == "download_complete" || frame["event"] == "download_error" {
            terminal += 1;
        }
        frames.push(frame);
    }
    frames
}

#[tokio::test]
async fn observer_receives_ordered_frames_ending_in_complete() {
    let app = common::app::spawn(LocalFetcher::default()).await;
    let (mut ws, _) = tokio_tungstenite::connect_async(app.ws_url("/ws")).await.unwrap();

    let resp = app
        .client
        .post(app.url("/download"))
        .json(&json!({"urls": ["https://media.example/clip"], "format": "mp3"}))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);

    let frames = read_until_terminal(&mut ws, 1).await;
    for frame in &frames {
        let obj = frame.as_object().unwrap();
        assert_eq!(obj.len(), 2, "{frame}");
        assert!(obj.contains_key("event") && obj.contains_key("data"), "{frame}");
    }
    let events: Vec<&str> = frames.iter().map(|f| f["event"].as_str().unwrap()).collect();
    assert_eq!(
        events,
        ["download_progress", "download_progress", "download_complete"]
    );
    assert_eq!(frames[0]["data"]["status"], "Downloading");
    assert_eq!(frames[0]["data"]["percent"], "10.0%");
    assert_eq!(frames[1]["data"]["status"], "Processing...");
    assert_eq!(frames[2]["data"]["title"], "clip");

    let id = &frames[0]["data"]["download_id"];
    assert!(id.as_str().unwrap().starts_with("download_0_"), "{id}");
    assert!(frames.iter().all(|f| &f["data"]["download_id"] == id));
}

#[tokio::test]
async fn failed_job_ends_with_error_frame() {
    let app = common::app::spawn(LocalFetcher::failing(&["https://media.example/broken"])).await;
    let (mut ws, _) = tokio_tungstenite::connect_async(app.ws_url("/ws")).await.unwrap();

    app.client
        .post(app.url("/download"))
        .json(&json!({
            "urls": ["https://media.example/ok", "https://media.example/broken"],
            "format": "mp4"
        }))
        .send()
        .await
        .unwrap();

    let frames = read_until_terminal(&mut ws, 2).await;
    let error = frames
        .iter()
        .find(|f| f["event"] == "download_error")
        .expect("an error frame");
    let failed_id = &error["data"]["download_id"];
    assert!(error["data"]["error"].as_str().unwrap().contains("Unsupported URL"));
    let last_for_failed = frames
        .iter()
        .rev()
        .find(|f| &f["data"]["download_id"] == failed_id)
        .unwrap();
    assert_eq!(last_for_failed["event"], "download_error");
    assert_eq!(
        frames.iter().filter(|f| f["event"] == "download_complete").count(),
        1
    );
}
