//! Configuration management.
//!
//! Configuration lives in a JSON file (`~/.config/clipstash/config.json` on
//! Linux). Every key is optional:
//!
//! ```json
//! {
//!     "max_entries": 100,
//!     "blacklist": ["KeePassXC", "1Password"],
//!     "data_dir": "/home/me/.local/share/clipstash",
//!     "image_dir": "/tmp/clipstash/images",
//!     "log_level": "info",
//!     "log_format": "compact",
//!     "log_file": "/tmp/clipstash.log",
//!     "poll_interval_ms": 1000
//! }
//! ```

use crate::services::{PathManager, default_config_path};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "CLIPSTASH_CONFIG_PATH";

/// Default retention cap.
pub const DEFAULT_MAX_ENTRIES: usize = 100;

/// Default X11 clipboard poll interval.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

/// Main configuration for clipstash.
///
/// Threaded explicitly into every operation that needs it; there is no
/// global config state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipConfig {
    /// Maximum number of history entries kept. Never zero.
    pub max_entries: usize,
    /// Window classes whose clipboard content is never captured.
    pub blacklist: Vec<String>,
    /// Override for the data directory (database, lock file).
    pub data_dir: Option<PathBuf>,
    /// Override for the image directory.
    pub image_dir: Option<PathBuf>,
    /// Log filter directive used when `CLIPSTASH_LOG` is unset.
    pub log_level: Option<String>,
    /// Log format: `pretty`, `compact` or `json`.
    pub log_format: Option<String>,
    /// Log file; logs go to stderr when unset.
    pub log_file: Option<PathBuf>,
    /// X11 clipboard poll interval.
    pub poll_interval_ms: u64,
}

/// Configuration file structure (for JSON parsing).
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct ConfigFile {
    /// Retention cap.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_entries: Option<usize>,
    /// Blacklisted window classes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blacklist: Option<Vec<String>>,
    /// Data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
    /// Image directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_dir: Option<String>,
    /// Log level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
    /// Log format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_format: Option<String>,
    /// Log file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<String>,
    /// X11 poll interval.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_interval_ms: Option<u64>,
}

impl Default for ClipConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            blacklist: Vec::new(),
            data_dir: None,
            image_dir: None,
            log_level: None,
            log_format: None,
            log_file: None,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl ClipConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| Error::failed("read_config_file", e))?;
        Self::parse(&contents)
    }

    /// Parses configuration from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid config object.
    pub fn parse(contents: &str) -> Result<Self> {
        let file: ConfigFile =
            serde_json::from_str(contents).map_err(|e| Error::failed("parse_config_file", e))?;
        Ok(Self::from_config_file(file))
    }

    /// Loads configuration from `explicit` if given, else from the default
    /// location.
    ///
    /// # Errors
    ///
    /// Returns an error only for an explicit path that cannot be loaded.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_from_file(path),
            None => Ok(Self::load_default()),
        }
    }

    /// Loads configuration from the default location.
    ///
    /// A missing file is created with the defaults (best effort). An
    /// unreadable or invalid file yields the defaults.
    #[must_use]
    pub fn load_default() -> Self {
        let Some(path) = default_config_path() else {
            return Self::default();
        };
        Self::load_or_init(&path)
    }

    /// Loads `path`, writing the defaults there first if it does not exist.
    #[must_use]
    pub fn load_or_init(path: &Path) -> Self {
        if !path.exists() {
            if let Err(e) = Self::write_default(path) {
                tracing::debug!(path = %path.display(), error = %e, "Could not write default config");
            }
            return Self::default();
        }

        Self::load_from_file(path).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "Invalid config file, using defaults");
            Self::default()
        })
    }

    /// Writes the default config file to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn write_default(path: &Path) -> Result<()> {
        let defaults = ConfigFile {
            max_entries: Some(DEFAULT_MAX_ENTRIES),
            blacklist: Some(Vec::new()),
            ..ConfigFile::default()
        };
        let json = serde_json::to_string_pretty(&defaults)
            .map_err(|e| Error::failed("serialize_config", e))?;

        PathManager::ensure_parent_dir(path)?;
        std::fs::write(path, json).map_err(|e| Error::failed("write_config_file", e))
    }

    /// Converts a `ConfigFile` to `ClipConfig`.
    fn from_config_file(file: ConfigFile) -> Self {
        let mut config = Self::default();

        if let Some(max_entries) = file.max_entries {
            config.max_entries = max_entries.max(1);
        }
        if let Some(blacklist) = file.blacklist {
            config.blacklist = blacklist;
        }
        config.data_dir = file.data_dir.map(PathBuf::from);
        config.image_dir = file.image_dir.map(PathBuf::from);
        config.log_level = file.log_level;
        config.log_format = file.log_format;
        config.log_file = file.log_file.map(PathBuf::from);
        if let Some(interval) = file.poll_interval_ms {
            config.poll_interval_ms = interval.max(50);
        }

        config
    }

    /// Returns true if `window_class` is blacklisted (case-insensitive).
    #[must_use]
    pub fn is_blacklisted(&self, window_class: &str) -> bool {
        let class = window_class.to_lowercase();
        self.blacklist.iter().any(|b| b.to_lowercase() == class)
    }

    /// Sets the data directory.
    #[must_use]
    pub fn with_data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(path.into());
        self
    }

    /// Sets the image directory.
    #[must_use]
    pub fn with_image_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.image_dir = Some(path.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = ClipConfig::default();
        assert_eq!(config.max_entries, 100);
        assert!(config.blacklist.is_empty());
        assert_eq!(config.poll_interval_ms, 1000);
    }

    #[test]
    fn test_parse_partial_file_keeps_defaults() {
        let config = ClipConfig::parse(r#"{"blacklist": ["KeePassXC"]}"#).unwrap();
        assert_eq!(config.max_entries, 100);
        assert_eq!(config.blacklist, vec!["KeePassXC".to_string()]);
    }

    #[test]
    fn test_parse_full_file() {
        let config = ClipConfig::parse(
            r#"{
                "max_entries": 500,
                "data_dir": "/data",
                "image_dir": "/img",
                "log_level": "debug",
                "log_format": "json",
                "log_file": "/tmp/c.log",
                "poll_interval_ms": 250
            }"#,
        )
        .unwrap();

        assert_eq!(config.max_entries, 500);
        assert_eq!(config.data_dir, Some(PathBuf::from("/data")));
        assert_eq!(config.image_dir, Some(PathBuf::from("/img")));
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.log_format.as_deref(), Some("json"));
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/c.log")));
        assert_eq!(config.poll_interval_ms, 250);
    }

    #[test]
    fn test_zero_max_entries_is_clamped() {
        let config = ClipConfig::parse(r#"{"max_entries": 0}"#).unwrap();
        assert_eq!(config.max_entries, 1);
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let config = ClipConfig::parse(r#"{"theme": "dark"}"#).unwrap();
        assert_eq!(config, ClipConfig::default());
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(ClipConfig::parse("{not json").is_err());
        assert!(ClipConfig::parse(r#"{"max_entries": "many"}"#).is_err());
    }

    #[test]
    fn test_blacklist_case_insensitive() {
        let config = ClipConfig {
            blacklist: vec!["KeePassXC".to_string()],
            ..ClipConfig::default()
        };
        assert!(config.is_blacklisted("keepassxc"));
        assert!(config.is_blacklisted("KEEPASSXC"));
        assert!(!config.is_blacklisted("firefox"));
    }

    #[test]
    fn test_load_or_init_writes_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("clipstash/config.json");

        let config = ClipConfig::load_or_init(&path);

        assert_eq!(config, ClipConfig::default());
        let written = ClipConfig::load_from_file(&path).unwrap();
        assert_eq!(written, ClipConfig::default());
    }

    #[test]
    fn test_load_or_init_invalid_falls_back() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        std::fs::write(&path, "garbage").unwrap();

        assert_eq!(ClipConfig::load_or_init(&path), ClipConfig::default());
    }

    #[test]
    fn test_explicit_invalid_path_is_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        std::fs::write(&path, "garbage").unwrap();

        assert!(ClipConfig::load(Some(&path)).is_err());
        assert!(ClipConfig::load(Some(&temp.path().join("missing.json"))).is_err());
    }
}
