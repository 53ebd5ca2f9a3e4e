//! X11 backend built on `xclip` and `xprop`.

use super::ClipboardBackend;
use super::process::{run_output, run_text, run_with_input};
use super::targets::{ClipTargets, classify_targets, parse_target_list};
use super::window::{parse_active_window_id, parse_wm_class};
use crate::models::{Capture, ContentKind};
use crate::services::ContentHasher;
use crate::storage::ImageStore;
use crate::{Error, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Raw clipboard content before it is materialized.
enum Snapshot {
    Text(String),
    Image(Vec<u8>),
}

impl Snapshot {
    fn hash(&self) -> String {
        match self {
            Self::Text(text) => ContentHasher::hash(text.as_bytes()),
            Self::Image(bytes) => ContentHasher::hash(bytes),
        }
    }
}

/// Clipboard access through `xclip`; change detection by polling.
#[derive(Debug, Clone)]
pub struct X11Backend {
    images: ImageStore,
    poll_interval: Duration,
}

impl X11Backend {
    /// Creates a backend that materializes images into `images` and polls
    /// every `poll_interval` while watching.
    #[must_use]
    pub const fn new(images: ImageStore, poll_interval: Duration) -> Self {
        Self {
            images,
            poll_interval,
        }
    }

    /// Reads the clipboard without side effects.
    fn snapshot() -> Option<Snapshot> {
        let targets = run_text("xclip", &["-selection", "clipboard", "-t", "TARGETS", "-o"])
            .map_err(|e| tracing::trace!(error = %e, "Listing clipboard targets failed"))
            .ok()?;

        let image_target = match classify_targets(&parse_target_list(&targets)) {
            ClipTargets::Sensitive | ClipTargets::Empty => return None,
            ClipTargets::Text { image } => {
                match run_text("xclip", &["-selection", "clipboard", "-o"]) {
                    Ok(text) if text.is_empty() => return None,
                    Ok(text) => return Some(Snapshot::Text(text)),
                    Err(e) => {
                        tracing::debug!(error = %e, "Reading clipboard text failed");
                        image
                    },
                }
            },
            ClipTargets::Image(mime) => Some(mime),
        };

        // xclip converts any offered image to PNG on request
        image_target.as_ref()?;
        let bytes = run_output("xclip", &["-selection", "clipboard", "-t", "image/png", "-o"])
            .map_err(|e| tracing::debug!(error = %e, "Reading clipboard image failed"))
            .ok()?;
        (!bytes.is_empty()).then_some(Snapshot::Image(bytes))
    }

    /// Sleeps for up to `total`, returning early once `shutdown` is raised.
    fn interruptible_sleep(shutdown: &AtomicBool, total: Duration) {
        let deadline = Instant::now() + total;
        let step = Duration::from_millis(50);
        while !shutdown.load(Ordering::SeqCst) {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            std::thread::sleep(step.min(deadline - now));
        }
    }
}

impl ClipboardBackend for X11Backend {
    fn name(&self) -> &'static str {
        "x11"
    }

    fn fetch(&self) -> Result<Option<Capture>> {
        let Some(snapshot) = Self::snapshot() else {
            return Ok(None);
        };
        let hash = snapshot.hash();

        match snapshot {
            Snapshot::Text(text) => Ok(Some(Capture::text(text))),
            Snapshot::Image(bytes) => match self.images.store(&hash, "png", &bytes) {
                Ok(path) => Ok(Some(Capture::image(path, hash))),
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to store clipboard image");
                    Ok(None)
                },
            },
        }
    }

    fn apply(&self, value: &str, kind: ContentKind) -> Result<()> {
        match kind {
            ContentKind::Text => {
                run_with_input("xclip", &["-selection", "clipboard", "-i"], value.as_bytes())
            },
            ContentKind::Image => {
                let bytes = std::fs::read(value).map_err(|e| Error::failed("read_image", e))?;
                run_with_input(
                    "xclip",
                    &["-selection", "clipboard", "-t", "image/png", "-i"],
                    &bytes,
                )
            },
        }
    }

    fn active_window_class(&self) -> Option<String> {
        let root = run_text("xprop", &["-root", "_NET_ACTIVE_WINDOW"]).ok()?;
        let window_id = parse_active_window_id(&root)?;
        let class = run_text("xprop", &["-id", &window_id, "WM_CLASS"]).ok()?;
        parse_wm_class(&class)
    }

    /// Polls the clipboard, reporting a change whenever the content hash
    /// differs from the last one seen. Content present at startup counts as
    /// a change.
    fn watch(&self, shutdown: &AtomicBool, on_change: &mut dyn FnMut()) -> Result<()> {
        tracing::info!(interval_ms = self.poll_interval.as_millis(), "Polling X11 clipboard");
        let mut last_hash: Option<String> = None;

        while !shutdown.load(Ordering::SeqCst) {
            if let Some(snapshot) = Self::snapshot() {
                let hash = snapshot.hash();
                if last_hash.as_deref() != Some(hash.as_str()) {
                    last_hash = Some(hash);
                    on_change();
                }
            }
            Self::interruptible_sleep(shutdown, self.poll_interval);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_hash_matches_capture_hash() {
        let text = Snapshot::Text("hello".to_string());
        assert_eq!(text.hash(), Capture::text("hello").content_hash);

        let image = Snapshot::Image(vec![1, 2, 3]);
        assert_eq!(image.hash(), ContentHasher::hash(&[1, 2, 3]));
    }

    #[test]
    fn test_interruptible_sleep_returns_on_shutdown() {
        let shutdown = AtomicBool::new(true);
        let start = Instant::now();
        X11Backend::interruptible_sleep(&shutdown, Duration::from_secs(10));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_watch_exits_when_already_shut_down() {
        let backend = X11Backend::new(ImageStore::new("/nonexistent"), Duration::from_millis(10));
        let shutdown = AtomicBool::new(true);
        let mut calls = 0;
        backend.watch(&shutdown, &mut || calls += 1).unwrap();
        assert_eq!(calls, 0);
    }
}
