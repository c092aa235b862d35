//! Per-run transient workspace
//!
//! A workspace is a uniquely named local file that holds the downloaded
//! source document for one pipeline run. It is removed exactly once:
//! either through [`Workspace::release`] or, if the run is unwound early,
//! when the guard is dropped.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use uuid::Uuid;

use crate::event::base_name;

/// Failure to remove a workspace. Never fatal for a run.
#[derive(Debug, Error)]
#[error("Failed to remove workspace {path}: {source}")]
pub struct CleanupError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Scoped handle to a workspace file
#[derive(Debug)]
pub struct Workspace {
    path: PathBuf,
    released: bool,
}

impl Workspace {
    /// Create an empty, uniquely named file under `dir` for `key`
    ///
    /// The file name keeps the key's base name so it stays recognizable in
    /// the working directory.
    pub async fn allocate(dir: &Path, key: &str) -> io::Result<Self> {
        tokio::fs::create_dir_all(dir).await?;

        let path = dir.join(format!("{}-{}", Uuid::new_v4(), base_name(key)));
        tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;

        tracing::debug!(path = %path.display(), "Allocated workspace");

        Ok(Self {
            path,
            released: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the workspace file
    pub async fn release(mut self) -> Result<(), CleanupError> {
        // Marked first so a failed removal is not retried from Drop
        self.released = true;

        tokio::fs::remove_file(&self.path)
            .await
            .map_err(|source| CleanupError {
                path: self.path.clone(),
                source,
            })?;

        tracing::debug!(path = %self.path.display(), "Removed workspace");
        Ok(())
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        // Unwind path; a blocking unlink is all Drop can do
        if let Err(source) = std::fs::remove_file(&self.path) {
            let err = CleanupError {
                path: self.path.clone(),
                source,
            };
            tracing::warn!("{}", err);
        }
    }
}
