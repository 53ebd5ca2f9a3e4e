//! Content-addressed image files.
//!
//! Image clips are stored on disk as `<hash>.<ext>` in a single directory; the
//! history row's value is the file's absolute path. The directory lives under
//! the system temp dir, so files may vanish across reboots while their rows
//! survive. Callers handle that as a missing image, not a store failure.

use crate::{Error, Result};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::instrument;

/// Outcome of a best-effort file removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileCleanup {
    /// The file existed and was removed.
    Removed,
    /// The file did not exist.
    AlreadyGone,
    /// Removal failed for another reason (permissions, I/O).
    Failed(io::ErrorKind),
}

/// Removes an image file, logging but never propagating failures.
///
/// A row whose file cannot be removed is still deleted; an orphaned file in
/// the temp dir is harmless.
pub fn remove_image_file(path: &Path) -> FileCleanup {
    match fs::remove_file(path) {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "Removed image file");
            FileCleanup::Removed
        },
        Err(e) if e.kind() == io::ErrorKind::NotFound => FileCleanup::AlreadyGone,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove image file");
            metrics::counter!("image_cleanup_failures_total").increment(1);
            FileCleanup::Failed(e.kind())
        },
    }
}

/// Directory of content-addressed image files.
#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    /// Creates a store rooted at `dir`. The directory is created lazily.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the image directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file for `hash` with extension `ext`.
    #[must_use]
    pub fn path_for(&self, hash: &str, ext: &str) -> PathBuf {
        self.dir.join(format!("{hash}.{ext}"))
    }

    /// Writes `bytes` as the file for `hash`, unless it already exists.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationFailed`] if the directory or file cannot be written.
    pub fn store(&self, hash: &str, ext: &str, bytes: &[u8]) -> Result<PathBuf> {
        self.store_with(hash, ext, || Ok(bytes.to_vec()))
    }

    /// Writes the file for `hash` using bytes from `produce`, unless it
    /// already exists, in which case `produce` is never called.
    ///
    /// The bytes go to a per-process temp name first and are renamed into
    /// place, so a concurrent reader never sees a partial file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationFailed`] if the directory or file cannot be
    /// written, or the error from `produce`.
    #[instrument(skip(self, produce), fields(dir = %self.dir.display()))]
    pub fn store_with(
        &self,
        hash: &str,
        ext: &str,
        produce: impl FnOnce() -> Result<Vec<u8>>,
    ) -> Result<PathBuf> {
        let target = self.path_for(hash, ext);
        if target.is_file() {
            return Ok(target);
        }

        fs::create_dir_all(&self.dir).map_err(|e| Error::failed("create_image_dir", e))?;

        let bytes = produce()?;
        let tmp = self
            .dir
            .join(format!(".{hash}.{ext}.{}.tmp", std::process::id()));

        let written = fs::File::create(&tmp)
            .and_then(|mut file| {
                file.write_all(&bytes)?;
                file.sync_all()
            })
            .and_then(|()| fs::rename(&tmp, &target));

        if let Err(e) = written {
            let _ = fs::remove_file(&tmp);
            return Err(Error::failed("write_image", e));
        }

        tracing::debug!(path = %target.display(), bytes = bytes.len(), "Stored image file");
        Ok(target)
    }
}
