//! Switch configuration loaded from a TOML file at startup.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::ConfigError;

/// Upper bound on `time_limit_seconds` (ten years).
pub const MAX_TIME_LIMIT_SECONDS: u64 = 10 * 365 * 24 * 60 * 60;

/// On-disk layout: a single `[settings]` table.
///
/// ```toml
/// [settings]
/// git_repo_path = "/srv/git/project.git"
/// local_code_path = "/home/me/project"
/// time_limit_seconds = 3600
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
struct ConfigFile {
    settings: SwitchConfig,
}

/// Roots to wipe and how long the countdown runs once armed.
///
/// Immutable after load. Every field is required; there are no defaults for a
/// destructive setting.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SwitchConfig {
    pub git_repo_path: PathBuf,
    pub local_code_path: PathBuf,
    pub time_limit_seconds: u64,
}

impl SwitchConfig {
    pub fn new(
        git_repo_path: impl Into<PathBuf>,
        local_code_path: impl Into<PathBuf>,
        time_limit_seconds: u64,
    ) -> Self {
        Self {
            git_repo_path: git_repo_path.into(),
            local_code_path: local_code_path.into(),
            time_limit_seconds,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.time_limit_seconds == 0 {
            return Err(ConfigError::Invalid(
                "time_limit_seconds must be > 0".to_string(),
            ));
        }
        if self.time_limit_seconds > MAX_TIME_LIMIT_SECONDS {
            return Err(ConfigError::Invalid(format!(
                "time_limit_seconds must be <= {MAX_TIME_LIMIT_SECONDS}"
            )));
        }
        if self.git_repo_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "git_repo_path must not be empty".to_string(),
            ));
        }
        if self.local_code_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "local_code_path must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn time_limit(&self) -> Duration {
        Duration::from_secs(self.time_limit_seconds)
    }

    /// Roots in deletion order: local working copy first, then the repository.
    pub fn roots(&self) -> Vec<PathBuf> {
        vec![self.local_code_path.clone(), self.git_repo_path.clone()]
    }
}

/// Load and validate config from a TOML file.
///
/// A missing file is an error: the server must not start without knowing what
/// it is guarding.
pub fn load_config(path: &Path) -> Result<SwitchConfig, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let contents = fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => ConfigError::Missing {
            path: path.to_path_buf(),
        },
        _ => ConfigError::Read {
            path: path.to_path_buf(),
            source,
        },
    })?;
    let file: ConfigFile = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    file.settings.validate()?;
    Ok(file.settings)
}
