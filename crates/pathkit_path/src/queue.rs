//! Deferred operation records and the FIFO queue holding them.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

use pathkit_io_fs::{SpecCopyOptions, SpecPathStatus};

/// Kind tag of a queued operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumOperationKind {
    MakeDirectory,
    Touch,
    Chmod,
    Copy,
}

impl fmt::Display for EnumOperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c_name = match self {
            Self::MakeDirectory => "mkdir",
            Self::Touch => "touch",
            Self::Chmod => "chmod",
            Self::Copy => "copy",
        };
        f.write_str(c_name)
    }
}

/// Kind-specific payload of a queued operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumOperation {
    /// Recursive directory creation.
    MakeDirectory,
    /// Create or truncate to an empty file.
    Touch,
    /// Set permission bits.
    Chmod { mode: u32 },
    /// Copy the operation path (source) to `target`.
    Copy {
        target: EnumCopyTarget,
        spec_cp_options: SpecCopyOptions,
    },
}

/// Destination of a queued copy.
///
/// `Into` is settled when the copy runs, after earlier operations (such as a
/// `mkdir` of the destination) have been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumCopyTarget {
    /// Exact destination path.
    Exact(PathBuf),
    /// Copy under `path_dir` keeping the source base name `name`.
    Into { path_dir: PathBuf, name: OsString },
}

impl EnumCopyTarget {
    /// Final destination given the status of `path_dir` at copy time.
    ///
    /// An existing non-directory `path_dir` is replaced by its parent, so the
    /// copy lands beside it. A missing `path_dir` is used as is.
    pub fn destination(&self, status_dir: Option<SpecPathStatus>) -> PathBuf {
        match self {
            Self::Exact(path) => path.clone(),
            Self::Into { path_dir, name } => {
                let path_base = match status_dir {
                    Some(status) if !status.is_directory => {
                        path_dir.parent().unwrap_or(path_dir.as_path())
                    }
                    _ => path_dir.as_path(),
                };
                path_base.join(name)
            }
        }
    }

    /// Directory to inspect before copying; `None` for an exact target.
    pub fn directory_to_inspect(&self) -> Option<&Path> {
        match self {
            Self::Exact(_) => None,
            Self::Into { path_dir, .. } => Some(path_dir),
        }
    }
}

/// One queued filesystem mutation.
///
/// `path` is the builder path captured when the operation was queued; later
/// joins never change it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecOperation {
    pub path: PathBuf,
    pub operation: EnumOperation,
}

impl SpecOperation {
    pub fn new(path: &Path, operation: EnumOperation) -> Self {
        Self {
            path: path.to_path_buf(),
            operation,
        }
    }

    pub fn kind(&self) -> EnumOperationKind {
        match self.operation {
            EnumOperation::MakeDirectory => EnumOperationKind::MakeDirectory,
            EnumOperation::Touch => EnumOperationKind::Touch,
            EnumOperation::Chmod { .. } => EnumOperationKind::Chmod,
            EnumOperation::Copy { .. } => EnumOperationKind::Copy,
        }
    }
}

/// Ordered, append-only list of pending operations.
///
/// Insertion order is execution order. A queue is moved between owners,
/// never shared.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct OperationQueue {
    l_operations: Vec<SpecOperation>,
}

impl OperationQueue {
    pub fn push(&mut self, spec_op: SpecOperation) {
        self.l_operations.push(spec_op);
    }

    /// Move every operation of `other` to the back of this queue, keeping
    /// their order.
    pub fn append(&mut self, mut other: OperationQueue) {
        self.l_operations.append(&mut other.l_operations);
    }

    /// Take the whole queue out, leaving an empty one behind.
    pub fn take(&mut self) -> OperationQueue {
        std::mem::take(self)
    }

    pub fn len(&self) -> usize {
        self.l_operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.l_operations.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SpecOperation> {
        self.l_operations.iter()
    }
}

impl IntoIterator for OperationQueue {
    type Item = SpecOperation;
    type IntoIter = std::vec::IntoIter<SpecOperation>;

    fn into_iter(self) -> Self::IntoIter {
        self.l_operations.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use pathkit_io_fs::SpecPathStatus;

    use super::{EnumCopyTarget, EnumOperation, EnumOperationKind, OperationQueue, SpecOperation};

    fn queue_of(l_paths: &[&str]) -> OperationQueue {
        let mut queue = OperationQueue::default();
        for path in l_paths {
            queue.push(SpecOperation::new(Path::new(path), EnumOperation::Touch));
        }
        queue
    }

    #[test]
    fn append_keeps_both_orders() {
        let mut queue = queue_of(&["a", "b"]);
        queue.append(queue_of(&["c", "d"]));

        let l_paths: Vec<_> = queue.iter().map(|op| op.path.clone()).collect();
        assert_eq!(
            l_paths,
            vec![
                Path::new("a").to_path_buf(),
                Path::new("b").to_path_buf(),
                Path::new("c").to_path_buf(),
                Path::new("d").to_path_buf(),
            ]
        );
    }

    #[test]
    fn take_leaves_empty_queue() {
        let mut queue = queue_of(&["a"]);
        let taken = queue.take();
        assert!(queue.is_empty());
        assert_eq!(taken.len(), 1);
    }

    #[test]
    fn kind_tags_display_as_verbs() {
        let spec_op = SpecOperation::new(Path::new("x"), EnumOperation::Chmod { mode: 0o644 });
        assert_eq!(spec_op.kind(), EnumOperationKind::Chmod);
        assert_eq!(spec_op.kind().to_string(), "chmod");
        assert_eq!(EnumOperationKind::MakeDirectory.to_string(), "mkdir");
    }

    #[test]
    fn into_target_settles_on_status_at_copy_time() {
        let target = EnumCopyTarget::Into {
            path_dir: Path::new("data").join("bar.ts"),
            name: "foo.ts".into(),
        };
        let status_file = SpecPathStatus {
            is_file: true,
            ..SpecPathStatus::default()
        };
        let status_dir = SpecPathStatus {
            is_directory: true,
            ..SpecPathStatus::default()
        };

        assert_eq!(
            target.destination(Some(status_file)),
            Path::new("data").join("foo.ts")
        );
        assert_eq!(
            target.destination(Some(status_dir)),
            Path::new("data").join("bar.ts").join("foo.ts")
        );
        assert_eq!(
            target.destination(None),
            Path::new("data").join("bar.ts").join("foo.ts")
        );
        assert_eq!(target.directory_to_inspect(), Some(Path::new("data/bar.ts")));

        let target = EnumCopyTarget::Exact("out.ts".into());
        assert_eq!(target.destination(Some(status_file)), Path::new("out.ts"));
        assert_eq!(target.directory_to_inspect(), None);
    }
}
