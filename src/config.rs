//! Runtime configuration for the backup and restore scripts.
//!
//! Values come from environment variables and may be overridden by CLI flags.
//! Window settings live in `tauri.conf.json`.

use crate::error::{BackupGuiError, Result};
use crate::handlers::Action;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const BACKUP_SCRIPT_ENV: &str = "BACKUP_GUI_BACKUP_SCRIPT";
pub const RESTORE_SCRIPT_ENV: &str = "BACKUP_GUI_RESTORE_SCRIPT";
pub const TIMEOUT_ENV: &str = "BACKUP_GUI_TIMEOUT_SECS";

/// Relative to the directory the program was started from
pub const DEFAULT_BACKUP_SCRIPT: &str = "./backup.sh";
pub const DEFAULT_RESTORE_SCRIPT: &str = "./restore.sh";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub backup_script: PathBuf,
    pub restore_script: PathBuf,
    /// Kill the script after this many seconds; `None` waits forever
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backup_script: PathBuf::from(DEFAULT_BACKUP_SCRIPT),
            restore_script: PathBuf::from(DEFAULT_RESTORE_SCRIPT),
            timeout_secs: None,
        }
    }
}

impl AppConfig {
    /// Build the configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(script) = lookup(BACKUP_SCRIPT_ENV).filter(|s| !s.trim().is_empty()) {
            config.backup_script = PathBuf::from(script);
        }
        if let Some(script) = lookup(RESTORE_SCRIPT_ENV).filter(|s| !s.trim().is_empty()) {
            config.restore_script = PathBuf::from(script);
        }
        if let Some(raw) = lookup(TIMEOUT_ENV) {
            config.timeout_secs = parse_timeout(&raw)?;
        }

        Ok(config)
    }

    /// Script invoked for the given action
    pub fn script_for(&self, action: Action) -> &Path {
        match action {
            Action::Backup => &self.backup_script,
            Action::Restore => &self.restore_script,
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Parse a timeout in whole seconds. Empty or `0` means no timeout.
pub fn parse_timeout(raw: &str) -> Result<Option<u64>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let secs: u64 = trimmed.parse().map_err(|_| {
        BackupGuiError::Config(format!(
            "{} must be a whole number of seconds, got '{}'",
            TIMEOUT_ENV, raw
        ))
    })?;

    Ok((secs > 0).then_some(secs))
}
