// src/install/config.rs

//! Configuration for the install pipeline

use std::path::PathBuf;
use std::time::Duration;

/// Environment variable overriding [`InstallerConfig::work_dir`]
pub const WORK_DIR_ENV: &str = "SRCTRACK_WORK_DIR";

/// Configuration for an [`Installer`](super::Installer)
#[derive(Debug, Clone)]
pub struct InstallerConfig {
    /// Parent directory for extraction and staging directories
    pub work_dir: PathBuf,
    /// How long a running command waits for output before checking for
    /// cancellation
    pub poll_interval: Duration,
    /// Record successful installs in the package store (when one is set)
    pub track: bool,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            work_dir: std::env::temp_dir(),
            poll_interval: Duration::from_millis(100),
            track: true,
        }
    }
}

impl InstallerConfig {
    /// Defaults, with `work_dir` taken from `$SRCTRACK_WORK_DIR` when set
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(dir) = std::env::var_os(WORK_DIR_ENV) {
            config.work_dir = PathBuf::from(dir);
        }
        config
    }

    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = dir.into();
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Build and install without recording anything in the store
    pub fn without_tracking(mut self) -> Self {
        self.track = false;
        self
    }
}
