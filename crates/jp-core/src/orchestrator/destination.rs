//! Where a batch writes its files: the caller's directory or a fresh temp dir.

use std::path::{Path, PathBuf};

use crate::error::BatchError;
use crate::paths;

/// Prefix of generated temporary batch directories.
pub const TEMP_DIR_PREFIX: &str = "just_paste_";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Caller-chosen directory; used only if it exists and is a directory.
    Dir(PathBuf),
    /// Allocate a fresh uniquely-named temporary directory.
    Temporary,
}

impl Destination {
    /// Empty or missing user input means "use a temporary directory".
    pub fn from_user_path(path: Option<&str>) -> Self {
        match path.map(str::trim) {
            Some(p) if !p.is_empty() => Destination::Dir(PathBuf::from(p)),
            _ => Destination::Temporary,
        }
    }

    pub fn is_user_supplied(&self) -> bool {
        matches!(self, Destination::Dir(_))
    }
}

/// The directory all jobs of one batch share.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDestination {
    pub dir: PathBuf,
    pub is_temp: bool,
}

/// Decide once per batch. An unusable caller directory falls back to a temp dir.
pub fn resolve(destination: &Destination, temp_root: Option<&Path>) -> Result<ResolvedDestination, BatchError> {
    if let Destination::Dir(dir) = destination {
        let check = paths::validate_dir(dir);
        if check.valid {
            return Ok(ResolvedDestination {
                dir: dir.clone(),
                is_temp: false,
            });
        }
        tracing::warn!(path = %dir.display(), "{}; using a temporary directory", check.message);
    }

    let mut builder = tempfile::Builder::new();
    builder.prefix(TEMP_DIR_PREFIX);
    let tmp = match temp_root {
        Some(root) => builder.tempdir_in(root),
        None => builder.tempdir(),
    }
    .map_err(BatchError::DestinationFailed)?;
    // Kept after the batch: the packaged file is served from here later.
    let dir = tmp.keep();
    tracing::debug!(path = %dir.display(), "allocated temporary batch directory");
    Ok(ResolvedDestination { dir, is_temp: true })
}
