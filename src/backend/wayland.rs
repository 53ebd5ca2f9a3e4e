//! Wayland backend built on `wl-clipboard` (`wl-paste` / `wl-copy`).

use super::process::{is_available, run_output, run_text, run_with_input};
use super::targets::{ClipTargets, classify_targets, parse_target_list};
use super::window::{find_focused_class, hyprland_class};
use super::ClipboardBackend;
use crate::models::{Capture, ContentKind};
use crate::services::ContentHasher;
use crate::storage::ImageStore;
use crate::{Error, Result};
use std::io::{BufRead, BufReader};
use std::process::{Child, Command, Stdio};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

const SHUTDOWN_POLL: Duration = Duration::from_millis(100);

/// Clipboard access through `wl-paste` and `wl-copy`.
#[derive(Debug, Clone)]
pub struct WaylandBackend {
    images: ImageStore,
}

impl WaylandBackend {
    /// Creates a backend that materializes images into `images`.
    #[must_use]
    pub const fn new(images: ImageStore) -> Self {
        Self { images }
    }

    fn fetch_text() -> Option<String> {
        match run_text("wl-paste", &["--no-newline"]) {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::debug!(error = %e, "Reading clipboard text failed");
                None
            },
        }
    }

    fn fetch_image(&self, mime: &str) -> Option<Capture> {
        let raw = run_output("wl-paste", &["--no-newline", "--type", mime])
            .map_err(|e| tracing::debug!(error = %e, mime, "Reading clipboard image failed"))
            .ok()?;
        if raw.is_empty() {
            return None;
        }
        let hash = ContentHasher::hash(&raw);

        // Stored as PNG where the compositor can convert; otherwise the raw bytes
        let path = self
            .images
            .store_with(&hash, "png", || {
                Ok(run_output("wl-paste", &["--type", "image/png"]).unwrap_or(raw))
            })
            .map_err(|e| tracing::warn!(error = %e, "Failed to store clipboard image"))
            .ok()?;

        Some(Capture::image(path, hash))
    }

    fn sway_class() -> Option<String> {
        if !is_available("swaymsg") {
            return None;
        }
        let output = run_output("swaymsg", &["-t", "get_tree"]).ok()?;
        let tree: serde_json::Value = serde_json::from_slice(&output).ok()?;
        find_focused_class(&tree)
    }

    fn hyprland_class() -> Option<String> {
        if !is_available("hyprctl") {
            return None;
        }
        let output = run_output("hyprctl", &["activewindow", "-j"]).ok()?;
        let window: serde_json::Value = serde_json::from_slice(&output).ok()?;
        hyprland_class(&window)
    }
}

impl ClipboardBackend for WaylandBackend {
    fn name(&self) -> &'static str {
        "wayland"
    }

    fn fetch(&self) -> Result<Option<Capture>> {
        let targets = match run_text("wl-paste", &["--list-types"]) {
            Ok(output) => parse_target_list(&output),
            Err(e) => {
                tracing::debug!(error = %e, "Listing clipboard types failed");
                return Ok(None);
            },
        };

        match classify_targets(&targets) {
            ClipTargets::Sensitive => {
                tracing::debug!("Clipboard marked sensitive, skipping");
                Ok(None)
            },
            ClipTargets::Text { image } => match Self::fetch_text() {
                Some(text) if text.is_empty() => Ok(None),
                Some(text) => Ok(Some(Capture::text(text))),
                None => Ok(image.and_then(|mime| self.fetch_image(&mime))),
            },
            ClipTargets::Image(mime) => Ok(self.fetch_image(&mime)),
            ClipTargets::Empty => Ok(None),
        }
    }

    fn apply(&self, value: &str, kind: ContentKind) -> Result<()> {
        match kind {
            ContentKind::Text => run_with_input("wl-copy", &["--type", "text/plain"], value.as_bytes()),
            ContentKind::Image => {
                let bytes = std::fs::read(value).map_err(|e| Error::failed("read_image", e))?;
                run_with_input("wl-copy", &["--type", "image/png"], &bytes)
            },
        }
    }

    fn active_window_class(&self) -> Option<String> {
        Self::sway_class().or_else(Self::hyprland_class)
    }

    /// Runs `wl-paste --watch echo`; every line it prints is one change.
    ///
    /// A monitor thread kills the child when `shutdown` is raised, which ends
    /// the read loop.
    fn watch(&self, shutdown: &AtomicBool, on_change: &mut dyn FnMut()) -> Result<()> {
        let mut child = Command::new("wl-paste")
            .args(["--watch", "echo"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Error::failed("wl-paste --watch", e))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::failed("wl-paste --watch", "stdout not captured"))?;

        let child: Mutex<Child> = Mutex::new(child);
        let finished = AtomicBool::new(false);

        std::thread::scope(|scope| {
            scope.spawn(|| {
                while !finished.load(Ordering::SeqCst) {
                    if shutdown.load(Ordering::SeqCst) {
                        if let Ok(mut child) = child.lock() {
                            let _ = child.kill();
                        }
                        break;
                    }
                    std::thread::sleep(SHUTDOWN_POLL);
                }
            });

            for line in BufReader::new(stdout).lines() {
                if line.is_err() || shutdown.load(Ordering::SeqCst) {
                    break;
                }
                on_change();
            }
            finished.store(true, Ordering::SeqCst);
        });

        let status = child
            .into_inner()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .wait()
            .map_err(|e| Error::failed("wl-paste --watch", e))?;

        // Killed by a signal: ours, or Ctrl-C delivered to the process group
        if shutdown.load(Ordering::SeqCst) || status.success() || status.code().is_none() {
            Ok(())
        } else {
            Err(Error::failed("wl-paste --watch", status))
        }
    }
}
