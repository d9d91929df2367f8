//! Configuration management for evalsync.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::services::upload::WorkerConfig;

/// Default settings file name, looked up in the working directory.
pub const SETTINGS_FILE: &str = "evalsync.toml";

/// Top-level settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory holding the database.
    pub data_dir: PathBuf,
    pub worker: WorkerSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            worker: WorkerSettings::default(),
        }
    }
}

/// Worker tuning knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerSettings {
    pub poll_interval_secs: u64,
    pub batch_size: u32,
    pub max_attempts: u32,
    pub stale_after_secs: u64,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        let defaults = WorkerConfig::default();
        Self {
            poll_interval_secs: defaults.poll_interval.as_secs(),
            batch_size: defaults.batch_size,
            max_attempts: defaults.max_attempts,
            stale_after_secs: defaults.stale_after.as_secs(),
        }
    }
}

impl Settings {
    /// Load settings from an explicit path, or from `evalsync.toml` in the
    /// working directory when present; defaults otherwise.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let candidate = match path {
            Some(p) => Some(p.to_path_buf()),
            None => {
                let default = PathBuf::from(SETTINGS_FILE);
                default.exists().then_some(default)
            }
        };

        match candidate {
            Some(path) => {
                let raw = fs::read_to_string(&path)?;
                let settings = toml::from_str(&raw)
                    .map_err(|e| anyhow::anyhow!("parsing {}: {}", path.display(), e))?;
                Ok(settings)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("evalsync.db")
    }

    pub fn database_url(&self) -> String {
        self.database_path().display().to_string()
    }

    pub fn ensure_directories(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.data_dir)
    }

    pub fn worker_config(&self) -> WorkerConfig {
        WorkerConfig {
            poll_interval: Duration::from_secs(self.worker.poll_interval_secs),
            batch_size: self.worker.batch_size,
            max_attempts: self.worker.max_attempts,
            stale_after: Duration::from_secs(self.worker.stale_after_secs),
            ..WorkerConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.worker.poll_interval_secs, 2);
        assert_eq!(settings.worker.batch_size, 5);
        assert_eq!(settings.worker.max_attempts, 8);
        assert_eq!(settings.worker.stale_after_secs, 600);
        assert!(settings.database_url().ends_with("evalsync.db"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            data_dir = "/var/lib/evalsync"

            [worker]
            batch_size = 10
            "#,
        )
        .unwrap();
        assert_eq!(settings.data_dir, PathBuf::from("/var/lib/evalsync"));
        assert_eq!(settings.worker.batch_size, 10);
        assert_eq!(settings.worker.max_attempts, 8);
    }
}
