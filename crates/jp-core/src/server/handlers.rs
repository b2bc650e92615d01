use std::path::PathBuf;

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use tokio_util::io::ReaderStream;

use super::dto::{
    DownloadBody, DownloadResponse, ErrorBody, FileQuery, StatusBody, ValidatePathBody,
};
use super::AppState;
use crate::error::{BatchError, HistoryError, JobError};
use crate::history::{HistoryRecord, RecordId};
use crate::media::MediaFormat;
use crate::orchestrator::{BatchRequest, Destination};
use crate::paths::{validate_dir, PathValidation};

/// JSON `{error}` reply with a status code.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

impl From<BatchError> for ApiError {
    fn from(e: BatchError) -> Self {
        match &e {
            BatchError::InvalidRequest(_) => ApiError::bad_request(e.to_string()),
            _ => ApiError::internal(e.to_string()),
        }
    }
}

impl From<HistoryError> for ApiError {
    fn from(e: HistoryError) -> Self {
        tracing::error!("history request failed: {}", e);
        ApiError::internal(e.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        ApiError::bad_request(e.body_text())
    }
}

/// GET /: the front-end page, when a static directory is configured.
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let Some(dir) = state.static_dir.as_ref() else {
        return Err(ApiError::not_found("No front-end configured"));
    };
    tokio::fs::read_to_string(dir.join("index.html"))
        .await
        .map(Html)
        .map_err(|_| ApiError::not_found("index.html not found"))
}

/// POST /download: run one batch to completion and describe the result.
pub async fn download(
    State(state): State<AppState>,
    body: Result<Json<DownloadBody>, JsonRejection>,
) -> Result<Json<DownloadResponse>, ApiError> {
    let Json(body) = body?;
    let urls = body.clean_urls();
    let format = match body.format.as_deref().map(str::trim) {
        Some(f) if !f.is_empty() && !urls.is_empty() => f,
        _ => return Err(ApiError::bad_request("Missing required parameters")),
    };
    let format: MediaFormat = format
        .parse()
        .map_err(|e: JobError| ApiError::bad_request(e.to_string()))?;

    let destination = Destination::from_user_path(body.path.as_deref());
    let user_supplied = destination.is_user_supplied();
    let request = BatchRequest {
        urls,
        format,
        quality: body.clean_quality(),
        destination,
    };

    let result = state.orchestrator.submit(request).await.map_err(|e| {
        tracing::error!("download batch failed: {}", e);
        ApiError::from(e)
    })?;
    Ok(Json(DownloadResponse::from_batch(&result, user_supplied)))
}

/// GET /download_file?path=: stream a packaged output as an attachment.
pub async fn download_file(Query(query): Query<FileQuery>) -> Result<Response, ApiError> {
    let path = match query.path.as_deref() {
        Some(p) if !p.is_empty() => PathBuf::from(p),
        _ => return Err(ApiError::not_found("File not found")),
    };
    let meta = match tokio::fs::metadata(&path).await {
        Ok(m) if m.is_file() => m,
        _ => return Err(ApiError::not_found("File not found")),
    };
    let file = tokio::fs::File::open(&path)
        .await
        .map_err(|_| ApiError::not_found("File not found"))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "download".to_string());
    tracing::debug!(path = %path.display(), bytes = meta.len(), "serving file");

    let disposition = HeaderValue::from_str(&content_disposition(&name))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));
    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/octet-stream")),
            (header::CONTENT_LENGTH, HeaderValue::from(meta.len())),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Body::from_stream(ReaderStream::new(file)),
    )
        .into_response())
}

/// `attachment` header with an ASCII `filename` and, when needed, an RFC 5987 `filename*`.
pub fn content_disposition(name: &str) -> String {
    let ascii: String = name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii() && !c.is_ascii_control() => c,
            _ => '_',
        })
        .collect();
    if ascii == name {
        return format!("attachment; filename=\"{}\"", ascii);
    }
    let mut encoded = String::with_capacity(name.len() * 3);
    for b in name.bytes() {
        if b.is_ascii_alphanumeric() || b"!#$&+-.^_`|~".contains(&b) {
            encoded.push(b as char);
        } else {
            encoded.push_str(&format!("%{:02X}", b));
        }
    }
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        ascii, encoded
    )
}

/// GET /history
pub async fn history(State(state): State<AppState>) -> Result<Json<Vec<HistoryRecord>>, ApiError> {
    let records = state
        .orchestrator
        .history()
        .recent(state.history_limit)
        .await?;
    Ok(Json(records))
}

/// POST /clear_history
pub async fn clear_history(State(state): State<AppState>) -> Result<Json<StatusBody>, ApiError> {
    let removed = state.orchestrator.history().clear().await?;
    tracing::info!(removed, "history cleared");
    Ok(Json(StatusBody {
        status: "History cleared",
    }))
}

/// DELETE /delete_history/{id}
pub async fn delete_history(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> Result<Json<StatusBody>, ApiError> {
    if state.orchestrator.history().delete(id).await? {
        Ok(Json(StatusBody {
            status: "Record deleted",
        }))
    } else {
        Err(ApiError::not_found("Record not found"))
    }
}

/// POST /validate_path
pub async fn validate_path(
    body: Result<Json<ValidatePathBody>, JsonRejection>,
) -> Result<Json<PathValidation>, ApiError> {
    let Json(body) = body?;
    Ok(Json(validate_dir(body.path.trim())))
}
