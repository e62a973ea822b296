//! Builder option models, copy intent and top-level error types.

use std::io;
use std::path::{Path, PathBuf};

use pathkit_io_fs::SpecCopyOptions;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::builder::PathChain;
use crate::queue::EnumOperationKind;

////////////////////////////////////////////////////////////////////////////////
// #region EnumsInit

/// Strategy used by [`PathChain::execute`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumExecMode {
    /// Drain with blocking `std::fs` calls.
    #[default]
    Blocking,
    /// Drain with `tokio::fs`, awaiting each call in order.
    NonBlocking,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region StructsAndErrors

/// Construction options for a [`PathChain`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecPathOptions {
    /// Initial path.
    pub path: PathBuf,
    /// Execution strategy for [`PathChain::execute`].
    pub mode: EnumExecMode,
}

impl Default for SpecPathOptions {
    fn default() -> Self {
        Self {
            path: PathBuf::from(crate::builder::C_PATH_DEFAULT),
            mode: EnumExecMode::default(),
        }
    }
}

/// Destination argument of a copy: a literal path or another builder.
///
/// A builder destination hands over its pending operations; they run before
/// the copy that needs them.
#[derive(Debug)]
pub enum SpecCopyDestination {
    Literal(PathBuf),
    Builder(PathChain),
}

impl From<PathChain> for SpecCopyDestination {
    fn from(chain: PathChain) -> Self {
        Self::Builder(chain)
    }
}

impl From<PathBuf> for SpecCopyDestination {
    fn from(path: PathBuf) -> Self {
        Self::Literal(path)
    }
}

impl From<&Path> for SpecCopyDestination {
    fn from(path: &Path) -> Self {
        Self::Literal(path.to_path_buf())
    }
}

impl From<&str> for SpecCopyDestination {
    fn from(path: &str) -> Self {
        Self::Literal(PathBuf::from(path))
    }
}

impl From<String> for SpecCopyDestination {
    fn from(path: String) -> Self {
        Self::Literal(PathBuf::from(path))
    }
}

/// Copy intent. Exactly one of `to` / `into` must be set.
#[derive(Debug, Default)]
pub struct SpecCopyOption {
    /// Exact destination path.
    pub to: Option<SpecCopyDestination>,
    /// Destination directory; the source base name is joined under it.
    pub into: Option<SpecCopyDestination>,
    /// Options forwarded to the copy primitive.
    pub spec_cp_options: SpecCopyOptions,
}

impl SpecCopyOption {
    /// Copy to exactly `destination`.
    pub fn copy_to(destination: impl Into<SpecCopyDestination>) -> Self {
        Self {
            to: Some(destination.into()),
            ..Self::default()
        }
    }

    /// Copy under the `destination` directory, keeping the source base name.
    pub fn copy_into(destination: impl Into<SpecCopyDestination>) -> Self {
        Self {
            into: Some(destination.into()),
            ..Self::default()
        }
    }

    pub fn with_options(mut self, spec_cp_options: SpecCopyOptions) -> Self {
        self.spec_cp_options = spec_cp_options;
        self
    }
}

/// Errors surfaced by the path builder.
#[derive(Debug, Error)]
pub enum ErrorPath {
    /// Malformed call; nothing was queued.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// Dynamic segment access hit a declared member name.
    #[error("`{0}` is a declared member; use `join(\"{0}\")` for a segment of that name")]
    DeclaredMemberName(String),
    /// A queued operation failed; later operations were discarded.
    #[error("{} failed for {}: {}", kind, path.display(), source)]
    Filesystem {
        /// Kind of the failing operation.
        kind: EnumOperationKind,
        /// Snapshot path of the failing operation.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// Immediate listing or probe failed.
    #[error("Failed to inspect {}: {}", path.display(), source)]
    Inspect {
        /// Probed path.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// Listing filter pattern did not compile.
    #[error("Invalid glob pattern `{pattern}`: {source}")]
    InvalidGlob {
        /// Offending pattern.
        pattern: String,
        /// Underlying globset error.
        source: globset::Error,
    },
}

pub type PathResult<T> = Result<T, ErrorPath>;

// #endregion
////////////////////////////////////////////////////////////////////////////////
