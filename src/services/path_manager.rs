//! Centralized path management for clipstash storage locations.
//!
//! - Path constants (directory and file names)
//! - Default data, config and image directories
//! - Directory creation with proper error handling
//!
//! # Examples
//!
//! ```rust,ignore
//! use clipstash::services::PathManager;
//!
//! let paths = PathManager::from_config(&config);
//! paths.ensure_data_dir()?;
//! let store = SqliteHistoryBackend::new(paths.db_path())?;
//! ```

use crate::config::ClipConfig;
use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Application directory name under the platform data/config/temp dirs.
pub const APP_DIR_NAME: &str = "clipstash";

/// Name of the `SQLite` history database file.
pub const HISTORY_DB_NAME: &str = "history.db";

/// Name of the daemon's single-instance lock file.
pub const DAEMON_LOCK_NAME: &str = "daemon.lock";

/// Name of the config file inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Returns the user-level data directory (`~/.local/share/clipstash` on Linux).
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn get_user_data_dir() -> Result<PathBuf> {
    directories::BaseDirs::new()
        .map(|b| b.data_local_dir().join(APP_DIR_NAME))
        .ok_or_else(|| {
            Error::failed("get_user_data_dir", "Could not determine user data directory")
        })
}

/// Returns the default config file path (`~/.config/clipstash/config.json` on Linux).
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.config_dir().join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Returns the default image directory. Lives under the temp dir, so its
/// contents do not survive reboots.
#[must_use]
pub fn default_image_dir() -> PathBuf {
    std::env::temp_dir().join(APP_DIR_NAME).join("images")
}

/// Resolved storage locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathManager {
    data_dir: PathBuf,
    image_dir: PathBuf,
}

impl PathManager {
    /// Creates a `PathManager` with explicit directories.
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>, image_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            image_dir: image_dir.into(),
        }
    }

    /// Resolves directories from config overrides, falling back to the
    /// platform defaults.
    ///
    /// Falls back to a temp directory if the user data dir cannot be resolved.
    #[must_use]
    pub fn from_config(config: &ClipConfig) -> Self {
        let data_dir = config.data_dir.clone().unwrap_or_else(|| {
            get_user_data_dir().unwrap_or_else(|err| {
                tracing::warn!(
                    error = %err,
                    "Failed to resolve user data dir; falling back to temp dir"
                );
                std::env::temp_dir().join(APP_DIR_NAME).join("data")
            })
        });
        let image_dir = config.image_dir.clone().unwrap_or_else(default_image_dir);
        Self::new(data_dir, image_dir)
    }

    /// Returns the data directory.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Returns the image directory.
    #[must_use]
    pub fn image_dir(&self) -> &Path {
        &self.image_dir
    }

    /// `{data_dir}/history.db`
    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(HISTORY_DB_NAME)
    }

    /// `{data_dir}/daemon.lock`
    #[must_use]
    pub fn lock_path(&self) -> PathBuf {
        self.data_dir.join(DAEMON_LOCK_NAME)
    }

    /// Ensures the data directory exists.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation fails due to permissions
    /// or other filesystem issues.
    pub fn ensure_data_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir).map_err(|e| Error::OperationFailed {
            operation: "create_data_dir".to_string(),
            cause: format!(
                "Cannot create {}: {}. Please create manually with: mkdir -p {}",
                self.data_dir.display(),
                e,
                self.data_dir.display()
            ),
        })
    }

    /// Ensures the parent directory of a path exists.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation fails.
    pub fn ensure_parent_dir(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::failed("create_parent_dir", e))?;
        }
        Ok(())
    }
}
