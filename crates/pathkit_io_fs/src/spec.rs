//! Copy option models and top-level error types.

use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

////////////////////////////////////////////////////////////////////////////////
// #region EnumsInit

/// Symlink handling policy for `copy_entry`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumCopySymlinkStrategy {
    /// Follow the link and copy the target bytes/entries.
    Dereference,
    /// Create a symbolic link at destination (do not copy target bytes).
    CopySymlinks,
}

/// Existing destination file conflict policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumCopyFileConflictStrategy {
    /// Keep destination file and skip current source file.
    Skip,
    /// Replace destination file with source file.
    Overwrite,
    /// Record an error and skip this file.
    Error,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region StructsAndErrors

/// Input options for `copy_entry`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecCopyOptions {
    /// Conflict behavior for destination files.
    pub rule_conflict_file: EnumCopyFileConflictStrategy,
    /// Symlink handling behavior.
    pub rule_symlink: EnumCopySymlinkStrategy,
    /// Maximum worker threads for the file-copy stage of a tree copy.
    pub num_workers_max: Option<usize>,
    /// Carry permissions, timestamps and (Linux) xattrs onto copied files.
    pub if_preserve_metadata: bool,
}

impl Default for SpecCopyOptions {
    fn default() -> Self {
        Self {
            rule_conflict_file: EnumCopyFileConflictStrategy::Overwrite,
            rule_symlink: EnumCopySymlinkStrategy::CopySymlinks,
            num_workers_max: None,
            if_preserve_metadata: true,
        }
    }
}

/// One copy failure item with path + error text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecCopyError {
    /// Failed source or destination path.
    pub path: PathBuf,
    /// User-facing error text.
    pub exception: String,
}

/// "Top-level call failed" errors for `copy_entry`.
#[derive(Debug, Error)]
pub enum CopyEntryError {
    /// Source path does not exist.
    #[error("Source does not exist: {}", .0.display())]
    SourceMissing(PathBuf),
    /// Source is neither file, directory nor symlink.
    #[error("Source is a special file: {}", .0.display())]
    UnsupportedEntry(PathBuf),
    /// Destination lies inside the source directory (or vice versa).
    #[error(
        "Source and destination directories overlap: {} <-> {}",
        source_dir.display(),
        destination.display()
    )]
    SourceDestinationOverlap {
        /// Normalized source directory.
        source_dir: PathBuf,
        /// Normalized destination path.
        destination: PathBuf,
    },
    /// Destination initialization failed.
    #[error("Failed to initialize destination {}: {}", path.display(), source)]
    DestinationInitFailed {
        /// Destination path that failed initialization.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// Source inspection failed for a reason other than absence.
    #[error("Failed to inspect source {}: {}", path.display(), source)]
    SourceInspectFailed {
        /// Source path.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// The run finished but recorded per-entry errors.
    #[error("{} entries failed to copy; first: {}: {}", count, path.display(), message)]
    EntriesFailed {
        /// Number of recorded entry errors.
        count: usize,
        /// Path of the first failed entry.
        path: PathBuf,
        /// Error text of the first failed entry.
        message: String,
    },
}

impl CopyEntryError {
    /// Closest `io::ErrorKind` for this failure.
    pub fn kind(&self) -> io::ErrorKind {
        match self {
            Self::SourceMissing(_) => io::ErrorKind::NotFound,
            Self::UnsupportedEntry(_) => io::ErrorKind::Unsupported,
            Self::SourceDestinationOverlap { .. } => io::ErrorKind::InvalidInput,
            Self::DestinationInitFailed { source, .. } => source.kind(),
            Self::SourceInspectFailed { source, .. } => source.kind(),
            Self::EntriesFailed { .. } => io::ErrorKind::Other,
        }
    }
}

impl From<CopyEntryError> for io::Error {
    fn from(err: CopyEntryError) -> Self {
        io::Error::new(err.kind(), err)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
