//! Clipboard backends.
//!
//! The core depends only on [`ClipboardBackend`]. Which implementation runs is
//! decided once at startup by [`select_backend`], a pure function of the
//! session environment:
//!
//! 1. `XDG_SESSION_TYPE=wayland` and `wl-copy` on `PATH` → [`WaylandBackend`]
//! 2. `xclip` on `PATH` → [`X11Backend`]
//! 3. otherwise [`Error::NoBackendAvailable`]

mod process;
mod targets;
mod wayland;
mod window;
mod x11;

pub use targets::{ClipTargets, SENSITIVE_TARGETS, TEXT_TARGETS, classify_targets, parse_target_list};
pub use wayland::WaylandBackend;
pub use window::{find_focused_class, hyprland_class, parse_active_window_id, parse_wm_class};
pub use x11::X11Backend;

use crate::config::ClipConfig;
use crate::models::{Capture, ContentKind};
use crate::storage::ImageStore;
use crate::{Error, Result};
use std::fmt;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

/// Capability contract of a clipboard backend.
pub trait ClipboardBackend: Send + Sync {
    /// Short backend name for logs and `status`.
    fn name(&self) -> &'static str;

    /// Reads the current clipboard content.
    ///
    /// Returns `Ok(None)` when there is nothing to capture: an empty
    /// clipboard, no text or image target, content marked sensitive, or a
    /// tool that failed to read it.
    ///
    /// # Errors
    ///
    /// Reserved for failures the caller must see; reading problems are
    /// reported as `Ok(None)`.
    fn fetch(&self) -> Result<Option<Capture>>;

    /// Puts `value` on the clipboard. For images `value` is the file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the image file cannot be read or the tool fails.
    fn apply(&self, value: &str, kind: ContentKind) -> Result<()>;

    /// Class of the focused window, if it can be determined.
    fn active_window_class(&self) -> Option<String>;

    /// Blocks, calling `on_change` once per detected clipboard change, until
    /// `shutdown` is raised.
    ///
    /// # Errors
    ///
    /// Returns an error if the change source cannot be started or dies.
    fn watch(&self, shutdown: &AtomicBool, on_change: &mut dyn FnMut()) -> Result<()>;
}

/// The available backend implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// `wl-clipboard`.
    Wayland,
    /// `xclip` / `xprop`.
    X11,
}

impl BackendKind {
    /// Returns the kind name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Wayland => "wayland",
            Self::X11 => "x11",
        }
    }

    /// Instantiates the backend.
    #[must_use]
    pub fn create(self, images: ImageStore, config: &ClipConfig) -> Box<dyn ClipboardBackend> {
        match self {
            Self::Wayland => Box::new(WaylandBackend::new(images)),
            Self::X11 => Box::new(X11Backend::new(
                images,
                Duration::from_millis(config.poll_interval_ms),
            )),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Session signals that decide the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionEnv {
    /// Value of `XDG_SESSION_TYPE`.
    pub session_type: Option<String>,
    /// Whether `wl-copy` is on `PATH`.
    pub has_wl_copy: bool,
    /// Whether `xclip` is on `PATH`.
    pub has_xclip: bool,
}

impl SessionEnv {
    /// Reads the signals from the current process environment.
    #[must_use]
    pub fn detect() -> Self {
        Self {
            session_type: std::env::var("XDG_SESSION_TYPE").ok(),
            has_wl_copy: process::is_available("wl-copy"),
            has_xclip: process::is_available("xclip"),
        }
    }
}

/// Picks the backend for `env`.
///
/// # Errors
///
/// Returns [`Error::NoBackendAvailable`] if no supported tool set is present.
pub fn select_backend(env: &SessionEnv) -> Result<BackendKind> {
    if env.session_type.as_deref() == Some("wayland") && env.has_wl_copy {
        return Ok(BackendKind::Wayland);
    }
    if env.has_xclip {
        return Ok(BackendKind::X11);
    }
    Err(Error::NoBackendAvailable(
        "install wl-clipboard (Wayland) or xclip (X11)".to_string(),
    ))
}

/// Detects the session and instantiates the matching backend.
///
/// # Errors
///
/// Returns [`Error::NoBackendAvailable`] if no supported tool set is present.
pub fn detect_backend(images: ImageStore, config: &ClipConfig) -> Result<Box<dyn ClipboardBackend>> {
    let env = SessionEnv::detect();
    let kind = select_backend(&env)?;
    tracing::debug!(backend = %kind, session_type = ?env.session_type, "Selected clipboard backend");
    Ok(kind.create(images, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn env(session: Option<&str>, wl_copy: bool, xclip: bool) -> SessionEnv {
        SessionEnv {
            session_type: session.map(str::to_string),
            has_wl_copy: wl_copy,
            has_xclip: xclip,
        }
    }

    #[test_case(env(Some("wayland"), true, true), BackendKind::Wayland ; "wayland preferred")]
    #[test_case(env(Some("wayland"), false, true), BackendKind::X11 ; "xwayland fallback")]
    #[test_case(env(Some("x11"), true, true), BackendKind::X11 ; "x11 session ignores wl-copy")]
    #[test_case(env(None, false, true), BackendKind::X11 ; "no session type")]
    fn test_select_backend(env: SessionEnv, expected: BackendKind) {
        assert_eq!(select_backend(&env).unwrap(), expected);
    }

    #[test_case(env(Some("wayland"), false, false) ; "wayland without tools")]
    #[test_case(env(Some("x11"), true, false) ; "x11 with only wl-copy")]
    #[test_case(SessionEnv::default() ; "nothing")]
    fn test_no_backend(env: SessionEnv) {
        assert!(matches!(select_backend(&env), Err(Error::NoBackendAvailable(_))));
    }

    #[test]
    fn test_create_names() {
        let images = ImageStore::new("/tmp/clipstash-test-images");
        let config = ClipConfig::default();
        assert_eq!(BackendKind::Wayland.create(images.clone(), &config).name(), "wayland");
        assert_eq!(BackendKind::X11.create(images, &config).name(), "x11");
    }
}
