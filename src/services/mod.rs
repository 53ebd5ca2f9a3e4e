//! Business logic services.
//!
//! - [`ContentHasher`]: content addressing for captured bytes
//! - [`LooseMatcher`]: picker output to stored entry
//! - [`HistoryService`]: capture cycle, restore, delete and clear
//! - [`PathManager`]: storage locations

mod hasher;
mod history;
mod matcher;
mod path_manager;

pub use hasher::ContentHasher;
pub use history::{AddOutcome, HistoryService};
pub use matcher::{LooseMatcher, SUBSTRING_SCAN_LIMIT, literal_candidates, strip_image_prefix};
pub use path_manager::{
    APP_DIR_NAME, CONFIG_FILE_NAME, DAEMON_LOCK_NAME, HISTORY_DB_NAME, PathManager,
    default_config_path, default_image_dir, get_user_data_dir,
};
