//! Validation of user-supplied destination directories.

use serde::Serialize;
use std::path::Path;

/// `{valid, message}` answer for `/validate_path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathValidation {
    pub valid: bool,
    pub message: String,
}

/// A destination is valid iff it exists and is a directory.
pub fn validate_dir(path: impl AsRef<Path>) -> PathValidation {
    let path = path.as_ref();
    if !path.as_os_str().is_empty() && path.is_dir() {
        PathValidation {
            valid: true,
            message: "Path is valid".to_string(),
        }
    } else {
        PathValidation {
            valid: false,
            message: "Path does not exist or is not a directory".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn existing_directory_is_valid() {
        let dir = tempdir().unwrap();
        let v = validate_dir(dir.path());
        assert!(v.valid);
        assert_eq!(v.message, "Path is valid");
    }

    #[test]
    fn missing_path_and_files_are_invalid() {
        let dir = tempdir().unwrap();
        assert!(!validate_dir(dir.path().join("missing")).valid);
        let file = dir.path().join("f");
        std::fs::write(&file, b"").unwrap();
        assert!(!validate_dir(&file).valid);
        assert!(!validate_dir("").valid);
    }
}
