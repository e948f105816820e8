//! Local handling of downloaded video bytes.
//!
//! A downloaded video lands in a temp file owned by a [`VideoFile`] guard.
//! Dropping the guard removes the file exactly once, mirroring how the
//! platform's web client revokes its blob object URL when the player
//! unmounts. [`VideoFile::persist`] hands the file over to the caller
//! instead.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Owning handle to a downloaded video file.
#[derive(Debug)]
pub struct VideoFile {
    path: Option<PathBuf>,
}

impl VideoFile {
    /// Wraps an already-written file. The guard now owns deletion.
    pub fn new(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    /// Path of the downloaded file, valid while the guard lives.
    pub fn path(&self) -> &Path {
        self.path
            .as_deref()
            .expect("VideoFile path taken before drop")
    }

    /// Moves the file to `dest` and releases ownership; nothing is deleted.
    pub fn persist(mut self, dest: &Path) -> Result<()> {
        let path = self
            .path
            .take()
            .expect("VideoFile path taken before drop");
        std::fs::rename(&path, dest).or_else(|_| {
            // rename fails across filesystems; fall back to copy + remove
            std::fs::copy(&path, dest)
                .map(|_| ())
                .and_then(|()| std::fs::remove_file(&path))
        })
        .with_context(|| format!("Failed to move video to {}", dest.display()))
    }
}

impl Drop for VideoFile {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            let _ = std::fs::remove_file(path);
        }
    }
}
