//! Background capture daemon: single-instance lock and watch loop.

mod lock;
mod watcher;

pub use lock::{DaemonLock, DaemonStatus, read_status};
pub use watcher::{install_shutdown_handler, run_watch_loop};
