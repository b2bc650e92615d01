use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::orchestrator::OrchestratorLimits;

/// Global configuration loaded from `~/.config/just-paste/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JpConfig {
    /// Socket address the HTTP/WebSocket server listens on.
    pub bind: String,
    /// yt-dlp executable (looked up on PATH when not absolute).
    pub ytdlp_path: String,
    /// Number of history records returned by `GET /history`.
    pub history_limit: i64,
    /// Capacity of the progress broadcast channel (events per slow observer before it lags).
    pub progress_buffer: usize,
    /// Optional history database location; defaults to the XDG state dir.
    #[serde(default)]
    pub database_path: Option<PathBuf>,
    /// Optional directory holding the front-end's `index.html`.
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
    /// Optional cap on fetches running at once within one batch (None = unbounded).
    #[serde(default)]
    pub max_concurrent_jobs: Option<usize>,
    /// Optional per-job deadline in seconds (None = wait until the tool exits).
    #[serde(default)]
    pub job_timeout_secs: Option<u64>,
}

impl Default for JpConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:5000".to_string(),
            ytdlp_path: "yt-dlp".to_string(),
            history_limit: 100,
            progress_buffer: 1024,
            database_path: None,
            static_dir: None,
            max_concurrent_jobs: None,
            job_timeout_secs: None,
        }
    }
}

impl JpConfig {
    /// Orchestrator hardening knobs derived from the config file.
    pub fn limits(&self) -> OrchestratorLimits {
        OrchestratorLimits {
            max_concurrent_jobs: self.max_concurrent_jobs.filter(|n| *n > 0),
            job_timeout: self.job_timeout_secs.map(Duration::from_secs),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("just-paste")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<JpConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = JpConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: JpConfig = toml::from_str(&data)?;
    Ok(cfg)
}
