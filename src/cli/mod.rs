//! CLI command implementations.
//!
//! Each submodule implements one `clipstash` subcommand. Commands write their
//! primary output (listings, status) to the writer they are given and report
//! progress through return values; `main.rs` owns stdout/stderr and exit codes.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `daemon` | Watch the clipboard and record every change |
//! | `add` | Record the current clipboard content once |
//! | `list` | Print history, newest first |
//! | `recall` | Put a clip back on the clipboard |
//! | `delete` | Remove a clip |
//! | `clear` | Remove all clips, or those matching a regex |
//! | `status` | Report whether the daemon is running |
//!
//! # Example Usage
//!
//! ```bash
//! clipstash daemon &
//! clipstash list | fzf | clipstash recall
//! clipstash list | rofi -dmenu | clipstash delete
//! clipstash clear 'password|token'
//! ```

mod add;
mod clear;
mod daemon;
mod delete;
mod list;
mod recall;
mod selection;
mod status;

pub use add::cmd_add;
pub use clear::cmd_clear;
pub use daemon::cmd_daemon;
pub use delete::cmd_delete;
pub use list::{ListArgs, cmd_list};
pub use recall::cmd_recall;
pub use selection::{Selection, read_selection, selection_from_input};
pub use status::{StatusReport, cmd_status};

use crate::Result;
use crate::backend::{ClipboardBackend, detect_backend};
use crate::config::ClipConfig;
use crate::services::{HistoryService, PathManager};
use crate::storage::{ImageStore, SqliteHistoryBackend};

/// Resolved config and paths shared by all commands.
#[derive(Debug, Clone)]
pub struct CliContext {
    config: ClipConfig,
    paths: PathManager,
}

impl CliContext {
    /// Creates a context, resolving paths from `config`.
    #[must_use]
    pub fn new(config: ClipConfig) -> Self {
        let paths = PathManager::from_config(&config);
        Self { config, paths }
    }

    /// Creates a context with explicit paths.
    #[must_use]
    pub const fn with_paths(config: ClipConfig, paths: PathManager) -> Self {
        Self { config, paths }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &ClipConfig {
        &self.config
    }

    /// Returns the resolved paths.
    #[must_use]
    pub const fn paths(&self) -> &PathManager {
        &self.paths
    }

    /// Returns the image store.
    #[must_use]
    pub fn image_store(&self) -> ImageStore {
        ImageStore::new(self.paths.image_dir())
    }

    /// Opens the history database and wraps it in a service.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory or database cannot be opened.
    pub fn open_service(&self) -> Result<HistoryService> {
        self.paths.ensure_data_dir()?;
        let store = SqliteHistoryBackend::new(self.paths.db_path())?;
        Ok(HistoryService::new(store, self.config.clone()))
    }

    /// Detects and creates the clipboard backend.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NoBackendAvailable`] if no backend is usable.
    pub fn backend(&self) -> Result<Box<dyn ClipboardBackend>> {
        detect_backend(self.image_store(), &self.config)
    }
}
