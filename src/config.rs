//! Client configuration.
//!
//! Stored in `config.yaml` under the fixdesk root (the `FIXDESK_ROOT`
//! environment variable, or the platform config directory). Covers the
//! remembered account e-mail, the default status partition, and the data
//! file used by the local backend.

use std::env;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{FixdeskError, Result};
use crate::types::TicketStatus;

/// Resolve the fixdesk root directory.
pub fn fixdesk_root() -> PathBuf {
    if let Some(root) = env::var_os("FIXDESK_ROOT") {
        return PathBuf::from(root);
    }
    directories::ProjectDirs::from("", "", "fixdesk")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".fixdesk"))
}

fn config_path() -> PathBuf {
    fixdesk_root().join("config.yaml")
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remembered account. Only the e-mail; passwords are never persisted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<AccountConfig>,

    /// Status partition shown when none is requested.
    #[serde(default)]
    pub default_status: TicketStatus,

    /// Data file for the local backend. Defaults to `tickets.json` under the
    /// fixdesk root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountConfig {
    pub email: String,
}

impl Config {
    /// Load the configuration, or defaults if no file exists yet.
    pub fn load() -> Result<Self> {
        let path = config_path();
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(&path)?;
        let config: Config = serde_yaml_ng::from_str(&content).map_err(|e| {
            FixdeskError::Config(format!("failed to parse {}: {}", path.display(), e))
        })?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, serde_yaml_ng::to_string(self)?)?;
        Ok(())
    }

    /// The effective data file path.
    pub fn data_file_path(&self) -> PathBuf {
        self.data_file
            .clone()
            .unwrap_or_else(|| fixdesk_root().join("tickets.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    /// RAII guard that points FIXDESK_ROOT at a temp dir and restores the
    /// previous value on drop.
    struct RootGuard {
        _dir: tempfile::TempDir,
        original: Option<std::ffi::OsString>,
    }

    impl RootGuard {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let original = env::var_os("FIXDESK_ROOT");
            // SAFETY: tests using this guard are marked #[serial], so the
            // process environment is not mutated concurrently.
            unsafe { env::set_var("FIXDESK_ROOT", dir.path()) };
            Self {
                _dir: dir,
                original,
            }
        }
    }

    impl Drop for RootGuard {
        fn drop(&mut self) {
            // SAFETY: see RootGuard::new.
            match &self.original {
                Some(val) => unsafe { env::set_var("FIXDESK_ROOT", val) },
                None => unsafe { env::remove_var("FIXDESK_ROOT") },
            }
        }
    }

    #[test]
    #[serial]
    fn test_load_missing_returns_default() {
        let _guard = RootGuard::new();
        let config = Config::load().unwrap();
        assert!(config.account.is_none());
        assert_eq!(config.default_status, TicketStatus::Open);
    }

    #[test]
    #[serial]
    fn test_save_and_reload() {
        let _guard = RootGuard::new();
        let config = Config {
            account: Some(AccountConfig {
                email: "tech@example.com".to_string(),
            }),
            default_status: TicketStatus::Closed,
            data_file: None,
        };
        config.save().unwrap();

        let reloaded = Config::load().unwrap();
        assert_eq!(
            reloaded.account.map(|a| a.email).as_deref(),
            Some("tech@example.com")
        );
        assert_eq!(reloaded.default_status, TicketStatus::Closed);
    }

    #[test]
    #[serial]
    fn test_data_file_defaults_under_root() {
        let _guard = RootGuard::new();
        let config = Config::default();
        assert!(config.data_file_path().ends_with("tickets.json"));
        assert!(config.data_file_path().starts_with(fixdesk_root()));
    }
}
