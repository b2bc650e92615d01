//! Post-processing of a settled batch: raw directory, single file, or zip archive.

use std::collections::HashSet;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::job::JobSuccess;
use crate::error::ArchiveError;
use crate::media::MediaFormat;

/// What the caller gets back to retrieve the batch's output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packaging {
    /// Files were placed in the caller's directory.
    None,
    SingleFile(PathBuf),
    Archive(PathBuf),
}

impl Packaging {
    /// Archive iff temp destination and more than one success; single file iff
    /// temp destination and exactly one; otherwise nothing to package.
    pub fn decide(is_temp: bool, succeeded: usize) -> PackagingKind {
        match (is_temp, succeeded) {
            (true, 0) | (false, _) => PackagingKind::None,
            (true, 1) => PackagingKind::SingleFile,
            (true, _) => PackagingKind::Archive,
        }
    }

    pub fn locator(&self) -> Option<&Path> {
        match self {
            Packaging::None => None,
            Packaging::SingleFile(p) | Packaging::Archive(p) => Some(p),
        }
    }

    /// `download_type` value on the HTTP surface.
    pub fn kind_str(&self) -> Option<&'static str> {
        match self {
            Packaging::None => None,
            Packaging::SingleFile(_) => Some("single"),
            Packaging::Archive(_) => Some("zip"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackagingKind {
    None,
    SingleFile,
    Archive,
}

/// Archive member name for a title: path separators, NUL and control chars become `_`.
pub fn archive_member_name(title: &str, format: MediaFormat) -> String {
    let stem: String = title
        .chars()
        .map(|c| {
            if c == '/' || c == '\\' || c == '\0' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();
    let stem = if stem.trim().is_empty() {
        "download".to_string()
    } else {
        stem
    };
    format!("{}.{}", stem, format.extension())
}

/// Member names for all successes, made unique by inserting ` (n)` before the extension.
pub fn unique_member_names(succeeded: &[JobSuccess], format: MediaFormat) -> Vec<String> {
    let mut used = HashSet::new();
    let mut out = Vec::with_capacity(succeeded.len());
    for s in succeeded {
        let base = archive_member_name(&s.title, format);
        let mut name = base.clone();
        let mut n = 2;
        while !used.insert(name.clone()) {
            let stem = base
                .strip_suffix(&format!(".{}", format.extension()))
                .unwrap_or(&base);
            name = format!("{} ({}).{}", stem, n, format.extension());
            n += 1;
        }
        out.push(name);
    }
    out
}

fn archive_file_name() -> String {
    format!(
        "just_paste_downloads_{}.zip",
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    )
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> ArchiveError + '_ {
    move |source| ArchiveError::Io {
        path: path.display().to_string(),
        source,
    }
}

fn write_archive(archive_path: &Path, members: &[(PathBuf, String)]) -> Result<(), ArchiveError> {
    let file = File::create(archive_path).map_err(io_err(archive_path))?;
    let mut zip = ZipWriter::new(file);
    for (path, name) in members {
        let mut src = File::open(path).map_err(io_err(path))?;
        let len = src.metadata().map_err(io_err(path))?.len();
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .large_file(len >= u32::MAX as u64);
        zip.start_file(name.as_str(), options)?;
        io::copy(&mut src, &mut zip).map_err(io_err(path))?;
    }
    zip.finish()?;
    Ok(())
}

/// Build one zip in `dir` holding every succeeded file. On failure the partial
/// archive is removed and nothing is returned.
pub async fn build_archive(
    dir: &Path,
    succeeded: &[JobSuccess],
    format: MediaFormat,
) -> Result<PathBuf, ArchiveError> {
    let names = unique_member_names(succeeded, format);
    let members: Vec<(PathBuf, String)> = succeeded
        .iter()
        .map(|s| s.path.clone())
        .zip(names)
        .collect();
    let archive_path = dir.join(archive_file_name());

    let path = archive_path.clone();
    let result = tokio::task::spawn_blocking(move || write_archive(&path, &members))
        .await
        .map_err(|e| ArchiveError::Join(e.to_string()))
        .and_then(|r| r);

    match result {
        Ok(()) => {
            tracing::info!(path = %archive_path.display(), members = succeeded.len(), "archive built");
            Ok(archive_path)
        }
        Err(e) => {
            if let Err(rm) = tokio::fs::remove_file(&archive_path).await {
                if rm.kind() != io::ErrorKind::NotFound {
                    tracing::warn!(path = %archive_path.display(), "could not remove partial archive: {}", rm);
                }
            }
            Err(e)
        }
    }
}
