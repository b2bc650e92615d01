//! Locate the file the tool actually produced.
//!
//! The reported path differs by mode (merged media vs. thumbnail) and is
//! sometimes missing; fall back to scanning the destination for a file named
//! after the title with an extension valid for the format.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use crate::error::JobError;
use crate::media::MediaFormat;

/// Characters the tool swaps for look-alikes when building filenames from titles.
const TITLE_SUBSTITUTIONS: &[(char, char)] = &[
    ('/', '⧸'),
    ('\\', '⧹'),
    (':', '：'),
    ('?', '？'),
    ('*', '＊'),
    ('"', '＂'),
    ('<', '＜'),
    ('>', '＞'),
    ('|', '｜'),
];

fn candidate_stems(title: &str) -> Vec<String> {
    let substituted: String = title
        .chars()
        .map(|c| {
            TITLE_SUBSTITUTIONS
                .iter()
                .find(|(from, _)| *from == c)
                .map(|(_, to)| *to)
                .unwrap_or(c)
        })
        .collect();
    let mut stems = vec![title.to_string()];
    if substituted != title {
        stems.push(substituted);
    }
    stems
}

fn has_accepted_extension(path: &Path, format: MediaFormat) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .map(|ext| {
            format
                .accepted_extensions()
                .iter()
                .any(|a| a.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}

/// Returns an existing file for this fetch or `FileNotFound`.
pub async fn resolve_output(
    reported: Option<&Path>,
    dest_dir: &Path,
    title: Option<&str>,
    format: MediaFormat,
) -> Result<PathBuf, JobError> {
    if let Some(path) = reported {
        if is_file(path).await {
            return Ok(path.to_path_buf());
        }
        tracing::debug!(path = %path.display(), "reported output missing, scanning destination");
    }

    if let Some(title) = title {
        let stems = candidate_stems(title);
        let mut entries = tokio::fs::read_dir(dest_dir)
            .await
            .map_err(|e| JobError::FileNotFound(format!("{}: {}", dest_dir.display(), e)))?;
        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            let stem_matches = path
                .file_stem()
                .and_then(OsStr::to_str)
                .map(|s| stems.iter().any(|c| c == s))
                .unwrap_or(false);
            if stem_matches && has_accepted_extension(&path, format) && is_file(&path).await {
                return Ok(path);
            }
        }
    }

    let expected = match (reported, title) {
        (Some(p), _) => p.display().to_string(),
        (None, Some(t)) => dest_dir
            .join(format!("{}.{}", t, format.extension()))
            .display()
            .to_string(),
        (None, None) => dest_dir.display().to_string(),
    };
    Err(JobError::FileNotFound(expected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn reported_path_wins_when_present() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("Clip.mp4");
        std::fs::write(&p, b"x").unwrap();
        let got = resolve_output(Some(p.as_path()), dir.path(), Some("Other"), MediaFormat::Mp4)
            .await
            .unwrap();
        assert_eq!(got, p);
    }

    #[tokio::test]
    async fn falls_back_to_title_scan() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("Cover.jpeg");
        std::fs::write(&p, b"x").unwrap();
        let missing = dir.path().join("Cover.webp");
        let got = resolve_output(Some(missing.as_path()), dir.path(), Some("Cover"), MediaFormat::Jpg)
            .await
            .unwrap();
        assert_eq!(got, p);
    }

    #[tokio::test]
    async fn matches_tool_substituted_title() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("AC⧸DC： Live.mp3");
        std::fs::write(&p, b"x").unwrap();
        let got = resolve_output(None, dir.path(), Some("AC/DC: Live"), MediaFormat::Mp3)
            .await
            .unwrap();
        assert_eq!(got, p);
    }

    #[tokio::test]
    async fn wrong_extension_is_not_found() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("Song.webm"), b"x").unwrap();
        let err = resolve_output(None, dir.path(), Some("Song"), MediaFormat::Mp3)
            .await
            .unwrap_err();
        assert!(matches!(err, JobError::FileNotFound(_)));
    }
}
