//! Request and response bodies of the HTTP surface.

use serde::{Deserialize, Serialize};

use crate::orchestrator::{BatchResult, JobFailure, JobSuccess, Packaging};

/// `POST /download` body. Every field is optional at the wire level so that a
/// missing field is reported as a 400 with a JSON error, not a rejection.
#[derive(Debug, Default, Deserialize)]
pub struct DownloadBody {
    #[serde(default)]
    pub urls: Vec<String>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub quality: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
}

impl DownloadBody {
    /// URLs with surrounding whitespace removed; blank entries dropped.
    pub fn clean_urls(&self) -> Vec<String> {
        self.urls
            .iter()
            .map(|u| u.trim())
            .filter(|u| !u.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn clean_quality(&self) -> Option<String> {
        self.quality
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_string)
    }
}

#[derive(Debug, Deserialize)]
pub struct ValidatePathBody {
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct FileQuery {
    pub path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultEntry {
    pub url: String,
    pub title: String,
    pub path: String,
    /// Display size, e.g. "3.21 MB".
    pub size: String,
}

impl From<&JobSuccess> for ResultEntry {
    fn from(s: &JobSuccess) -> Self {
        Self {
            url: s.url.clone(),
            title: s.title.clone(),
            path: s.path.display().to_string(),
            size: s.size_display(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorEntry {
    pub url: String,
    pub error: String,
}

impl From<&JobFailure> for ErrorEntry {
    fn from(f: &JobFailure) -> Self {
        Self {
            url: f.url.clone(),
            error: f.error.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadResponse {
    pub success: bool,
    pub results: Vec<ResultEntry>,
    pub errors: Vec<ErrorEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    /// Directory the files were written to, when the caller chose one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl DownloadResponse {
    /// A packaged batch gets a download link; otherwise a caller-supplied
    /// destination is echoed back.
    pub fn from_batch(result: &BatchResult, user_supplied_path: bool) -> Self {
        let locator = result.packaging.locator();
        let path = match (&result.packaging, user_supplied_path) {
            (Packaging::None, true) => Some(result.output_dir.display().to_string()),
            _ => None,
        };
        Self {
            success: result.success(),
            results: result.succeeded.iter().map(ResultEntry::from).collect(),
            errors: result.failed.iter().map(ErrorEntry::from).collect(),
            download_type: result.packaging.kind_str(),
            download_url: locator.map(|p| download_url(&p.display().to_string())),
            path,
        }
    }
}

/// Link served by `GET /download_file` for a packaged output.
pub fn download_url(path: &str) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("path", path)
        .finish();
    format!("/download_file?{}", query)
}

#[derive(Debug, Serialize)]
pub struct StatusBody {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::JobError;
    use crate::orchestrator::JobId;
    use std::path::PathBuf;

    fn batch(packaging: Packaging, failed: usize) -> BatchResult {
        let succeeded = vec![JobSuccess {
            index: 0,
            job_id: JobId::from_raw("download_0_a"),
            url: "https://media.example/a".into(),
            title: "A".into(),
            path: PathBuf::from("/tmp/just_paste_x/A.mp3"),
            size_bytes: 2 * 1024 * 1024,
        }];
        let failed = (0..failed)
            .map(|i| JobFailure {
                index: i + 1,
                job_id: JobId::from_raw(format!("download_{}_b", i + 1)),
                url: "https://media.example/b".into(),
                error: JobError::FetchFailed("ERROR: Unsupported URL".into()),
            })
            .collect();
        BatchResult {
            succeeded,
            failed,
            output_dir: PathBuf::from("/tmp/just_paste_x"),
            is_temp: true,
            packaging,
        }
    }

    #[test]
    fn download_url_is_percent_encoded() {
        assert_eq!(
            download_url("/tmp/just_paste_1/My Song.mp3"),
            "/download_file?path=%2Ftmp%2Fjust_paste_1%2FMy+Song.mp3"
        );
    }

    #[test]
    fn single_file_response_has_link() {
        let r = DownloadResponse::from_batch(
            &batch(Packaging::SingleFile(PathBuf::from("/tmp/just_paste_x/A.mp3")), 0),
            false,
        );
        assert!(r.success);
        assert_eq!(r.download_type, Some("single"));
        assert!(r.download_url.unwrap().starts_with("/download_file?path="));
        assert_eq!(r.results[0].size, "2.00 MB");
        assert!(r.path.is_none());
    }

    #[test]
    fn user_directory_response_echoes_path() {
        let r = DownloadResponse::from_batch(&batch(Packaging::None, 1), true);
        assert!(!r.success);
        assert_eq!(r.errors.len(), 1);
        assert_eq!(r.errors[0].error, "ERROR: Unsupported URL");
        assert_eq!(r.path.as_deref(), Some("/tmp/just_paste_x"));
        let json = serde_json::to_value(&r).unwrap();
        assert!(json.get("download_url").is_none());
        assert!(json.get("download_type").is_none());
    }

    #[test]
    fn body_cleanup() {
        let body: DownloadBody = serde_json::from_str(
            r#"{"urls": [" https://a ", "", "https://b"], "format": "mp3", "quality": "  "}"#,
        )
        .unwrap();
        assert_eq!(body.clean_urls(), ["https://a", "https://b"]);
        assert_eq!(body.clean_quality(), None);
        assert!(body.path.is_none());
    }
}
