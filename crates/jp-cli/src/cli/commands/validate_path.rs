//! `just-paste validate-path <PATH>`

use anyhow::{bail, Result};
use jp_core::paths::validate_dir;

pub fn run_validate_path(path: &str) -> Result<()> {
    let check = validate_dir(path);
    if !check.valid {
        bail!("{}: {}", path, check.message);
    }
    println!("{}: {}", path, check.message);
    Ok(())
}
