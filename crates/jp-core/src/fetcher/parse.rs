//! Parsing of the tool's stdout: templated progress lines and `--print` markers.

use std::path::PathBuf;

use crate::progress::DownloadProgress;

/// Prefix of lines produced by our `--progress-template`.
pub const PROGRESS_MARKER: &str = "[jp-progress]";
/// Prefix of the `--print` line carrying the extracted title.
pub const TITLE_MARKER: &str = "[jp-title]";
/// Prefix of the `--print` line carrying the final file path.
pub const FILE_MARKER: &str = "[jp-file]";

/// Download phase as the tool's progress hook reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolPhase {
    Downloading(DownloadProgress),
    Finished,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolLine {
    Progress(ToolPhase),
    Title(String),
    FilePath(PathBuf),
    /// An `ERROR:` diagnostic.
    Error(String),
    Other,
}

/// Template fields: status|percent|speed|eta|downloaded|total.
pub(crate) fn progress_template() -> String {
    format!(
        "download:{}%(progress.status)s|%(progress._percent_str)s|%(progress._speed_str)s|%(progress._eta_str)s|%(progress._downloaded_bytes_str)s|%(progress._total_bytes_str)s",
        PROGRESS_MARKER
    )
}

/// Missing template fields render as "NA"; use the display defaults instead.
fn field(raw: Option<&str>, default: &str) -> String {
    match raw.map(str::trim) {
        None | Some("") | Some("NA") | Some("N/A") => default.to_string(),
        Some(v) => v.to_string(),
    }
}

pub fn parse_line(line: &str) -> ToolLine {
    let line = line.trim_end_matches(['\r', '\n']);
    let trimmed = line.trim_start();

    if let Some(rest) = trimmed.strip_prefix(PROGRESS_MARKER) {
        let mut parts = rest.split('|');
        let status = parts.next().unwrap_or("").trim();
        return match status {
            "downloading" => {
                let d = DownloadProgress::default();
                ToolLine::Progress(ToolPhase::Downloading(DownloadProgress {
                    percent: field(parts.next(), &d.percent),
                    speed: field(parts.next(), &d.speed),
                    eta: field(parts.next(), &d.eta),
                    downloaded: field(parts.next(), &d.downloaded),
                    total: field(parts.next(), &d.total),
                }))
            }
            "finished" => ToolLine::Progress(ToolPhase::Finished),
            "error" => ToolLine::Progress(ToolPhase::Error),
            _ => ToolLine::Other,
        };
    }
    if let Some(rest) = trimmed.strip_prefix(TITLE_MARKER) {
        return ToolLine::Title(rest.trim().to_string());
    }
    if let Some(rest) = trimmed.strip_prefix(FILE_MARKER) {
        let path = rest.trim();
        if path.is_empty() || path == "NA" {
            return ToolLine::Other;
        }
        return ToolLine::FilePath(PathBuf::from(path));
    }
    if let Some(rest) = trimmed.strip_prefix("ERROR:") {
        return ToolLine::Error(format!("ERROR: {}", rest.trim()));
    }
    ToolLine::Other
}
