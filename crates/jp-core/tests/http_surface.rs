//! End-to-end tests of the HTTP surface with a local fetcher and a real SQLite history.

mod common;

use std::io::Read;

use common::stubs::LocalFetcher;
use reqwest::StatusCode;
use serde_json::{json, Value};

async fn post_download(app: &common::app::TestApp, body: Value) -> (StatusCode, Value) {
    let resp = app
        .client
        .post(app.url("/download"))
        .json(&body)
        .send()
        .await
        .unwrap();
    let status = resp.status();
    (status, resp.json().await.unwrap())
}

#[tokio::test]
async fn three_urls_come_back_as_one_zip() {
    let app = common::app::spawn(LocalFetcher::default()).await;
    let (status, body) = post_download(
        &app,
        json!({
            "urls": ["https://media.example/a", "https://media.example/b", "https://media.example/c"],
            "format": "mp3",
            "quality": "192kbps"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["results"].as_array().unwrap().len(), 3);
    assert_eq!(body["errors"].as_array().unwrap().len(), 0);
    assert_eq!(body["download_type"], "zip");
    let link = body["download_url"].as_str().unwrap();
    assert!(link.starts_with("/download_file?path="), "{link}");

    let resp = app.client.get(app.url(link)).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let disposition = resp.headers()["content-disposition"].to_str().unwrap().to_string();
    assert!(disposition.starts_with("attachment; filename=\"just_paste_downloads_"));
    let bytes = resp.bytes().await.unwrap();

    let mut zip = zip::ZipArchive::new(std::io::Cursor::new(bytes.to_vec())).unwrap();
    assert_eq!(zip.len(), 3);
    let mut names: Vec<String> = (0..zip.len())
        .map(|i| zip.by_index(i).unwrap().name().to_string())
        .collect();
    names.sort();
    assert_eq!(names, ["a.mp3", "b.mp3", "c.mp3"]);
    let mut content = String::new();
    zip.by_name("b.mp3").unwrap().read_to_string(&mut content).unwrap();
    assert_eq!(content, "media bytes for https://media.example/b");
}

#[tokio::test]
async fn single_failed_url_has_no_download_link() {
    let app = common::app::spawn(LocalFetcher::failing(&["https://media.example/broken"])).await;
    let (status, body) = post_download(
        &app,
        json!({"urls": ["https://media.example/broken"], "format": "mp4", "quality": "720p"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["results"].as_array().unwrap().len(), 0);
    let errors = body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["url"], "https://media.example/broken");
    assert!(errors[0]["error"].as_str().unwrap().contains("Unsupported URL"));
    assert!(body.get("download_url").is_none());
    assert!(body.get("download_type").is_none());
}

#[tokio::test]
async fn one_success_is_served_as_single_file() {
    let app = common::app::spawn(LocalFetcher::failing(&["https://media.example/x"])).await;
    let (_, body) = post_download(
        &app,
        json!({"urls": ["https://media.example/x", "https://media.example/song"], "format": "wav"}),
    )
    .await;
    assert_eq!(body["success"], false);
    assert_eq!(body["download_type"], "single");
    let resp = app
        .client
        .get(app.url(body["download_url"].as_str().unwrap()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.text().await.unwrap(),
        "media bytes for https://media.example/song"
    );
}

#[tokio::test]
async fn custom_directory_is_echoed_back() {
    let app = common::app::spawn(LocalFetcher::default()).await;
    let out = tempfile::tempdir().unwrap();
    let (_, body) = post_download(
        &app,
        json!({
            "urls": ["https://media.example/one", "https://media.example/two"],
            "format": "mp4",
            "path": out.path().to_str().unwrap()
        }),
    )
    .await;
    assert_eq!(body["success"], true);
    assert_eq!(body["path"], out.path().to_str().unwrap());
    assert!(body.get("download_url").is_none());
    assert!(out.path().join("one.mp4").is_file());
    assert!(out.path().join("two.mp4").is_file());
}

#[tokio::test]
async fn malformed_requests_are_rejected() {
    let app = common::app::spawn(LocalFetcher::default()).await;

    let (status, body) = post_download(&app, json!({"urls": [], "format": "mp3"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required parameters");

    let (status, _) = post_download(&app, json!({"urls": ["https://media.example/a"]})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) =
        post_download(&app, json!({"urls": ["https://media.example/a"], "format": "gif"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "unsupported format: gif");
}

#[tokio::test]
async fn missing_file_is_404() {
    let app = common::app::spawn(LocalFetcher::default()).await;
    let resp = app
        .client
        .get(app.url("/download_file?path=%2Fdefinitely%2Fnot%2Fthere.zip"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "File not found");
}

#[tokio::test]
async fn validate_path_reports_missing_directory() {
    let app = common::app::spawn(LocalFetcher::default()).await;
    let resp = app
        .client
        .post(app.url("/validate_path"))
        .json(&json!({"path": "/definitely/not/a/dir"}))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["valid"], false);
    assert_eq!(body["message"], "Path does not exist or is not a directory");

    let dir = tempfile::tempdir().unwrap();
    let resp = app
        .client
        .post(app.url("/validate_path"))
        .json(&json!({"path": dir.path().to_str().unwrap()}))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["valid"], true);
    assert_eq!(body["message"], "Path is valid");
}

#[tokio::test]
async fn history_lifecycle() {
    let app = common::app::spawn(LocalFetcher::default()).await;
    post_download(
        &app,
        json!({"urls": ["https://media.example/first", "https://media.example/second"], "format": "mp3", "quality": "320kbps"}),
    )
    .await;

    let records: Vec<Value> = app
        .client
        .get(app.url("/history"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(records.len(), 2);
    for r in &records {
        assert_eq!(r["file_format"], "mp3");
        assert_eq!(r["quality"], "320kbps");
        assert_eq!(r["status"], "completed");
        assert!(r["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    let id = records[0]["id"].as_i64().unwrap();
    let resp = app
        .client
        .delete(app.url(&format!("/delete_history/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "Record deleted");

    let resp = app
        .client
        .delete(app.url(&format!("/delete_history/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Record not found");

    let resp = app.client.post(app.url("/clear_history")).send().await.unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "History cleared");

    let records: Vec<Value> = app
        .client
        .get(app.url("/history"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn index_without_static_dir_is_404() {
    let app = common::app::spawn(LocalFetcher::default()).await;
    let resp = app.client.get(app.url("/")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn server_shutdown_closes_history() {
    use std::sync::Arc;

    use jp_core::error::HistoryError;
    use jp_core::history::{HistoryDb, NewHistoryRecord};
    use jp_core::orchestrator::{Orchestrator, OrchestratorLimits};
    use jp_core::progress::ProgressBroadcaster;
    use jp_core::server::{serve, AppState};

    let state_dir = tempfile::tempdir().unwrap();
    let history = HistoryDb::open_at(state_dir.path().join("downloads.db")).await.unwrap();
    let orchestrator = Arc::new(Orchestrator::new(
        Arc::new(LocalFetcher::default()),
        Arc::new(history),
        ProgressBroadcaster::new(16),
        OrchestratorLimits::default(),
    ));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let (stop, stopped) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(serve(
        listener,
        AppState::new(Arc::clone(&orchestrator)),
        async move {
            stopped.await.ok();
        },
    ));

    stop.send(()).unwrap();
    server.await.unwrap().unwrap();

    let record = NewHistoryRecord {
        url: "https://media.example/late".into(),
        title: "late".into(),
        file_format: "mp3".into(),
        quality: None,
        file_size: "0.00 MB".into(),
        download_path: "/tmp/late.mp3".into(),
    };
    let err = orchestrator.history().append(&record).await.unwrap_err();
    assert!(matches!(err, HistoryError::Unavailable(_)), "{err}");
}
