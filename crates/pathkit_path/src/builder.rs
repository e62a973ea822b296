//! Fluent path builder with a deferred operation queue.

use std::fmt;
use std::io;
use std::ops::Div;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use pathkit_io_fs::{
    FsAccess, FsTokio, SpecLsEntry, SpecPathStatus, filter_entries_by_glob, list_directory,
    status_of,
};

use crate::exec::{ReportDrain, drain_blocking, drain_non_blocking};
use crate::queue::{EnumOperation, OperationQueue};
use crate::resolve::CopyResolver;
use crate::segment::SegmentResolver;
use crate::spec::{EnumExecMode, ErrorPath, PathResult, SpecCopyOption, SpecPathOptions};
use crate::state::PathState;

/// Initial path when none is given.
pub const C_PATH_DEFAULT: &str = "./";
/// Filesystem root anchor.
pub const C_PATH_ROOT: &str = "/";

static PATH_HOME: LazyLock<PathBuf> =
    LazyLock::new(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from("~")));

/// A path under construction plus the filesystem mutations queued against it.
///
/// Mutating methods (`mkdir`, `touch`, `chmod`, `copy`) only record an
/// operation; nothing touches the filesystem until one of the `execute*`
/// calls drains the queue in insertion order.
///
/// ```ignore
/// let report = pathkit_path::path("./data")
///     .join("sub")
///     .mkdir()
///     .join("f.txt")
///     .touch()
///     .execute_blocking()?;
/// ```
///
/// The builder is deliberately not `Clone`: a queue has exactly one owner.
#[derive(Debug)]
pub struct PathChain {
    state: PathState,
    mode: EnumExecMode,
}

impl Default for PathChain {
    fn default() -> Self {
        Self::new(C_PATH_DEFAULT)
    }
}

/// Shorthand for [`PathChain::new`].
pub fn path(path: impl Into<PathBuf>) -> PathChain {
    PathChain::new(path)
}

/// Builder anchored at the current user's home directory (`~` if unknown).
pub fn home() -> PathChain {
    PathChain::new(PATH_HOME.as_path())
}

/// Builder anchored at the filesystem root.
pub fn root() -> PathChain {
    PathChain::new(C_PATH_ROOT)
}

impl PathChain {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            state: PathState::new(path),
            mode: EnumExecMode::default(),
        }
    }

    pub fn from_options(spec_path_options: SpecPathOptions) -> Self {
        Self {
            state: PathState::new(spec_path_options.path),
            mode: spec_path_options.mode,
        }
    }

    /// Switch the strategy used by [`PathChain::execute`].
    pub fn with_mode(mut self, mode: EnumExecMode) -> Self {
        self.mode = mode;
        self
    }

    ////////////////////////////////////////////////////////////////////////////
    // #region PathAccess

    /// Append `segment` to the current path. No I/O, never fails.
    pub fn join(mut self, segment: impl AsRef<Path>) -> Self {
        self.state.join(segment);
        self
    }

    /// Replace the current path.
    pub fn cwd(mut self, path: impl Into<PathBuf>) -> Self {
        self.state.set_path(path);
        self
    }

    /// Dynamic segment access: join `name` unless it is a declared member.
    pub fn get(self, name: &str) -> PathResult<Self> {
        SegmentResolver::resolve(self, name)
    }

    pub fn path(&self) -> &Path {
        self.state.path()
    }

    pub fn mode(&self) -> EnumExecMode {
        self.mode
    }

    // #endregion
    ////////////////////////////////////////////////////////////////////////////
    // #region Queue

    pub fn mkdir(mut self) -> Self {
        self.state.enqueue(EnumOperation::MakeDirectory);
        self
    }

    /// Queue creation of an empty file; an existing file is truncated.
    pub fn touch(mut self) -> Self {
        self.state.enqueue(EnumOperation::Touch);
        self
    }

    pub fn chmod(mut self, mode: u32) -> Self {
        self.state.enqueue(EnumOperation::Chmod { mode });
        self
    }

    /// Queue a copy of the current path; see [`PathChain::try_copy`].
    pub fn copy(mut self, spec_copy: SpecCopyOption) -> PathResult<Self> {
        self.try_copy(spec_copy)?;
        Ok(self)
    }

    /// Queue a copy of the current path.
    ///
    /// Pending operations of a builder destination are moved in front of the
    /// copy. On error nothing is queued.
    pub fn try_copy(&mut self, spec_copy: SpecCopyOption) -> PathResult<()> {
        let spec_resolved = CopyResolver::resolve(self.state.path(), spec_copy)?;
        let (dependencies, operation) = spec_resolved.into_operation();
        self.state.pending_mut().append(dependencies);
        self.state.enqueue(operation);
        Ok(())
    }

    pub fn has_queue(&self) -> bool {
        !self.state.pending().is_empty()
    }

    pub fn pending_len(&self) -> usize {
        self.state.pending().len()
    }

    pub fn pending(&self) -> &OperationQueue {
        self.state.pending()
    }

    /// Move the pending operations out of this builder.
    pub fn take_pending(&mut self) -> OperationQueue {
        self.state.take_pending()
    }

    // #endregion
    ////////////////////////////////////////////////////////////////////////////
    // #region Execute

    /// Drain the queue with blocking calls.
    ///
    /// The queue is emptied even when an operation fails.
    pub fn execute_blocking(&mut self) -> PathResult<ReportDrain> {
        drain_blocking(self.state.take_pending())
    }

    /// Drain the queue with `tokio::fs`, one awaited call at a time.
    pub async fn execute_non_blocking(&mut self) -> PathResult<ReportDrain> {
        drain_non_blocking(self.state.take_pending()).await
    }

    /// Drain using the builder's [`EnumExecMode`].
    pub async fn execute(&mut self) -> PathResult<ReportDrain> {
        match self.mode {
            EnumExecMode::Blocking => self.execute_blocking(),
            EnumExecMode::NonBlocking => self.execute_non_blocking().await,
        }
    }

    // #endregion
    ////////////////////////////////////////////////////////////////////////////
    // #region Inspect

    fn inspect_err(&self, source: io::Error) -> ErrorPath {
        ErrorPath::Inspect {
            path: self.path().to_path_buf(),
            source,
        }
    }

    /// List the directory at the current path now (not queued).
    pub fn ls(&self) -> PathResult<Vec<SpecLsEntry>> {
        list_directory(self.path()).map_err(|e| self.inspect_err(e))
    }

    pub async fn ls_async(&self) -> PathResult<Vec<SpecLsEntry>> {
        FsTokio
            .list_directory(self.path())
            .await
            .map_err(|e| self.inspect_err(e))
    }

    /// [`PathChain::ls`] restricted to names matching a glob.
    pub fn ls_glob(&self, pattern: &str) -> PathResult<Vec<SpecLsEntry>> {
        filter_entries_by_glob(self.ls()?, pattern).map_err(|e| ErrorPath::InvalidGlob {
            pattern: pattern.to_string(),
            source: e,
        })
    }

    fn status(&self) -> PathResult<SpecPathStatus> {
        status_of(self.path())
            .map(Option::unwrap_or_default)
            .map_err(|e| self.inspect_err(e))
    }

    /// `Ok(false)` when nothing exists at the current path.
    pub fn is_file(&self) -> PathResult<bool> {
        Ok(self.status()?.is_file)
    }

    pub fn is_directory(&self) -> PathResult<bool> {
        Ok(self.status()?.is_directory)
    }

    /// Whether the current path itself is a symbolic link.
    pub fn is_symlink(&self) -> PathResult<bool> {
        Ok(self.status()?.is_symlink)
    }

    // #endregion
    ////////////////////////////////////////////////////////////////////////////
}

impl Div<&str> for PathChain {
    type Output = PathChain;

    /// `chain / "segment"` is `chain.join("segment")`.
    fn div(self, segment: &str) -> PathChain {
        self.join(segment)
    }
}

impl AsRef<Path> for PathChain {
    fn as_ref(&self) -> &Path {
        self.path()
    }
}

impl fmt::Display for PathChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.state)
    }
}
