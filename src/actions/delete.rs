//! File deletion, to the system trash or permanently.
//!
//! # Overview
//!
//! This module provides the two deletion back-ends used by the resolution
//! step:
//! - Move to system trash (recoverable, via the `trash` crate)
//! - Permanent removal (`std::fs::remove_file`)
//!
//! Every deletion first reads the file's metadata, so a file that vanished
//! since the scan is reported as [`DeleteError::NotFound`] rather than as a
//! back-end failure.
//!
//! # Example
//!
//! ```no_run
//! use ccdupe::actions::delete::{delete_file, DeleteConfig};
//! use std::path::Path;
//!
//! match delete_file(Path::new("/path/to/duplicate.txt"), &DeleteConfig::trash()) {
//!     Ok(result) => println!("Deleted: {}", result.path.display()),
//!     Err(e) => eprintln!("Failed: {}", e),
//! }
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

/// Error type for deletion operations.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// File was not found (may have been deleted or moved).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when attempting to delete.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// File size changed since it was verified.
    #[error("file modified since scan: {0}")]
    Modified(PathBuf),

    /// The copy that should be kept no longer exists.
    #[error("refusing to delete {target}: kept copy {kept} is missing")]
    KeptCopyMissing {
        /// File that would have been deleted
        target: PathBuf,
        /// File that was supposed to survive
        kept: PathBuf,
    },

    /// Both paths of the pair name the same file, e.g. through a symlink.
    #[error("refusing to delete {target}: it is the same file as {kept}")]
    SameFile {
        /// File that would have been deleted
        target: PathBuf,
        /// File that was supposed to survive
        kept: PathBuf,
    },

    /// Trash operation failed.
    #[error("trash operation failed for {path}: {message}")]
    TrashFailed {
        /// File being deleted
        path: PathBuf,
        /// Message from the trash back-end
        message: String,
    },

    /// Permanent delete operation failed.
    #[error("permanent delete failed for {path}: {message}")]
    PermanentDeleteFailed {
        /// File being deleted
        path: PathBuf,
        /// Message from the filesystem
        message: String,
    },

    /// General I/O error.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// File being inspected
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl DeleteError {
    /// Get the path of the file that was to be deleted.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(p)
            | Self::PermissionDenied(p)
            | Self::Modified(p)
            | Self::KeptCopyMissing { target: p, .. }
            | Self::SameFile { target: p, .. }
            | Self::TrashFailed { path: p, .. }
            | Self::PermanentDeleteFailed { path: p, .. }
            | Self::Io { path: p, .. } => p,
        }
    }

    fn from_metadata(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }
}

/// Result of a successful deletion operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteResult {
    /// Path that was deleted.
    pub path: PathBuf,
    /// Size of the deleted file in bytes.
    pub size: u64,
    /// Whether deletion was permanent (true) or to trash (false).
    pub permanent: bool,
}

impl DeleteResult {
    /// Create a new delete result.
    #[must_use]
    pub fn new(path: PathBuf, size: u64, permanent: bool) -> Self {
        Self {
            path,
            size,
            permanent,
        }
    }
}

/// Configuration for deletion operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteConfig {
    /// Use permanent deletion instead of trash.
    pub permanent: bool,
}

impl DeleteConfig {
    /// Create config for trash deletion.
    #[must_use]
    pub fn trash() -> Self {
        Self::default()
    }

    /// Create config for permanent deletion.
    #[must_use]
    pub fn permanent() -> Self {
        Self { permanent: true }
    }
}

/// Delete a single file to the system trash.
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `PermissionDenied` if its metadata cannot be read
/// - `TrashFailed` if the trash operation fails
pub fn delete_to_trash(path: &Path) -> Result<DeleteResult, DeleteError> {
    let size = fs::metadata(path)
        .map_err(|e| DeleteError::from_metadata(path, e))?
        .len();

    trash::delete(path).map_err(|e| {
        log::error!("Trash operation failed for {}: {}", path.display(), e);
        DeleteError::TrashFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })?;

    log::info!("Moved to trash: {} ({} bytes)", path.display(), size);

    Ok(DeleteResult::new(path.to_path_buf(), size, false))
}

/// Permanently delete a single file.
///
/// **WARNING**: This operation cannot be undone.
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `PermissionDenied` if its metadata cannot be read
/// - `PermanentDeleteFailed` if the removal fails
pub fn permanent_delete(path: &Path) -> Result<DeleteResult, DeleteError> {
    let size = fs::metadata(path)
        .map_err(|e| DeleteError::from_metadata(path, e))?
        .len();

    fs::remove_file(path).map_err(|e| {
        log::error!("Permanent delete failed for {}: {}", path.display(), e);
        DeleteError::PermanentDeleteFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })?;

    log::info!("Permanently deleted: {} ({} bytes)", path.display(), size);

    Ok(DeleteResult::new(path.to_path_buf(), size, true))
}

/// Delete a file using the mode selected in `config`.
///
/// # Errors
///
/// See [`delete_to_trash`] and [`permanent_delete`].
pub fn delete_file(path: &Path, config: &DeleteConfig) -> Result<DeleteResult, DeleteError> {
    if config.permanent {
        permanent_delete(path)
    } else {
        delete_to_trash(path)
    }
}

/// Check that `path` still exists and has `expected_size` bytes.
///
/// # Errors
///
/// Returns `Modified` on a size mismatch, or the metadata error otherwise.
pub fn check_unchanged(path: &Path, expected_size: u64) -> Result<(), DeleteError> {
    let size = fs::metadata(path)
        .map_err(|e| DeleteError::from_metadata(path, e))?
        .len();
    if size != expected_size {
        log::warn!(
            "File modified since scan: {} (size changed from {} to {})",
            path.display(),
            expected_size,
            size
        );
        return Err(DeleteError::Modified(path.to_path_buf()));
    }
    Ok(())
}

/// Refuse when `target` and `kept` resolve to the same file.
///
/// Deleting the target would then remove the only copy and leave `kept`
/// dangling.
///
/// # Errors
///
/// Returns [`DeleteError::SameFile`] if both canonicalize to one path, or
/// a metadata error if `target` cannot be resolved.
pub fn check_distinct(target: &Path, kept: &Path) -> Result<(), DeleteError> {
    let target_real =
        fs::canonicalize(target).map_err(|e| DeleteError::from_metadata(target, e))?;
    let kept_real = fs::canonicalize(kept).map_err(|e| DeleteError::from_metadata(kept, e))?;
    if target_real == kept_real {
        return Err(DeleteError::SameFile {
            target: target.to_path_buf(),
            kept: kept.to_path_buf(),
        });
    }
    Ok(())
}
