//! Scratch directory for transient frame images
//!
//! Created once at startup (failure is fatal) and emptied on shutdown. Each
//! frame file is a [`TempPath`] that removes itself when dropped.

use std::path::{Path, PathBuf};

use tempfile::TempPath;

use super::error::CaptureError;
use crate::error::{Error, Result};

/// Handle to the scratch directory
#[derive(Debug, Clone)]
pub struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    /// Create the directory (and parents) if missing
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        std::fs::create_dir_all(&path).map_err(|source| Error::Scratch {
            path: path.clone(),
            source,
        })?;

        tracing::debug!(path = %path.display(), "Scratch directory ready");
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reserve a uniquely named `.jpg` path for one extracted frame
    pub fn frame_path(&self) -> std::result::Result<TempPath, CaptureError> {
        let file = tempfile::Builder::new()
            .prefix("frame_")
            .suffix(".jpg")
            .tempfile_in(&self.path)?;
        Ok(file.into_temp_path())
    }

    /// Delete every entry in the directory, returning how many were removed
    pub fn clear(&self) -> Result<usize> {
        let entries = std::fs::read_dir(&self.path).map_err(|source| Error::Scratch {
            path: self.path.clone(),
            source,
        })?;

        let mut removed = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            let result = if path.is_dir() {
                std::fs::remove_dir_all(&path)
            } else {
                std::fs::remove_file(&path)
            };
            match result {
                Ok(()) => removed += 1,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to remove scratch entry")
                }
            }
        }

        Ok(removed)
    }

    /// Clear and remove the directory itself
    pub fn remove(self) -> Result<()> {
        let removed = self.clear()?;
        std::fs::remove_dir(&self.path).map_err(|source| Error::Scratch {
            path: self.path.clone(),
            source,
        })?;

        tracing::info!(path = %self.path.display(), removed, "Scratch directory removed");
        Ok(())
    }
}
