//! Logging configuration.

use crate::config::ClipConfig;
use std::path::PathBuf;

/// Env var holding a full filter directive (`info`, `clipstash=debug,warn`, ...).
pub const LOG_FILTER_ENV: &str = "CLIPSTASH_LOG";

/// Env var overriding the log format.
pub const LOG_FORMAT_ENV: &str = "CLIPSTASH_LOG_FORMAT";

/// Env var overriding the log file.
pub const LOG_FILE_ENV: &str = "CLIPSTASH_LOG_FILE";

/// Filter used when nothing else is configured.
pub const DEFAULT_FILTER: &str = "warn";

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line human-readable output.
    Pretty,
    /// Single-line human-readable output.
    #[default]
    Compact,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// Parses a format name, case-insensitively.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Some(Self::Pretty),
            "compact" | "text" => Some(Self::Compact),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Resolved logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// `EnvFilter` directive.
    pub filter: String,
    /// Output format.
    pub format: LogFormat,
    /// Append to this file instead of stderr.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_FILTER.to_string(),
            format: LogFormat::default(),
            file: None,
        }
    }
}

impl LoggingConfig {
    /// Resolves settings from the process environment, `--verbose` and config.
    #[must_use]
    pub fn from_env(config: &ClipConfig, verbose: bool) -> Self {
        Self::resolve(config, verbose, |key| std::env::var(key).ok())
    }

    /// Resolves settings with `env` as the variable source.
    ///
    /// Filter: `CLIPSTASH_LOG`, then `--verbose` (debug), then config
    /// `log_level`, then `warn`. Format and file: env var, then config.
    pub fn resolve(
        config: &ClipConfig,
        verbose: bool,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let non_empty = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let filter = non_empty(LOG_FILTER_ENV)
            .or_else(|| verbose.then(|| "debug".to_string()))
            .or_else(|| config.log_level.clone())
            .unwrap_or_else(|| DEFAULT_FILTER.to_string());

        let format = non_empty(LOG_FORMAT_ENV)
            .or_else(|| config.log_format.clone())
            .and_then(|f| LogFormat::parse(&f))
            .unwrap_or_default();

        let file = non_empty(LOG_FILE_ENV)
            .map(PathBuf::from)
            .or_else(|| config.log_file.clone());

        Self {
            filter,
            format,
            file,
        }
    }
}
