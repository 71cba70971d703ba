//! File system utilities for the export pipeline.
//!
//! Job-scoped temporary directories and file copies with automatic parent
//! directory creation.

use crate::exporter::error::{Error, ErrorExt, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Creates a fresh, uniquely named directory under the OS temp dir.
///
/// Each call yields a new directory; nothing is reused across jobs and
/// nothing is cleaned up here.
pub async fn create_temp_dir(prefix: &str) -> Result<PathBuf> {
    let dir = std::env::temp_dir().join(format!("{}-{}", prefix, uuid::Uuid::new_v4()));
    fs::create_dir_all(&dir)
        .await
        .fs_context("creating temporary directory", &dir)?;
    log::debug!("Created temporary directory {}", dir.display());
    Ok(dir)
}

/// Copies a regular file from one path to another, creating any parent
/// directories of the destination path as necessary.
///
/// Fails if the source path is a directory or doesn't exist.
pub async fn copy_file(from: &Path, to: &Path) -> Result<()> {
    let metadata = fs::metadata(from)
        .await
        .fs_context("reading source file metadata", from)?;
    if !metadata.is_file() {
        return Err(Error::GenericError(format!("{from:?} is not a file")));
    }
    if let Some(dest_dir) = to.parent() {
        fs::create_dir_all(dest_dir)
            .await
            .fs_context("creating destination directory", dest_dir)?;
    }
    fs::copy(from, to).await.fs_context("copying file", to)?;
    Ok(())
}
