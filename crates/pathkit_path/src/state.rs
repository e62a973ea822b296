use std::fmt;
use std::path::{Path, PathBuf};

use crate::queue::{EnumOperation, OperationQueue, SpecOperation};

/// Current path plus the operations queued against it.
#[derive(Debug, Default)]
pub struct PathState {
    current_path: PathBuf,
    pending: OperationQueue,
}

impl PathState {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            current_path: path.into(),
            pending: OperationQueue::default(),
        }
    }

    /// Platform join; pure string composition, no I/O.
    ///
    /// An absolute `segment` replaces the current path (`Path::join`).
    pub fn join(&mut self, segment: impl AsRef<Path>) {
        self.current_path.push(segment);
    }

    /// Replace the current path; queued operations keep their snapshots.
    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.current_path = path.into();
    }

    pub fn path(&self) -> &Path {
        &self.current_path
    }

    /// Queue `operation` against a snapshot of the current path.
    pub fn enqueue(&mut self, operation: EnumOperation) {
        let spec_op = SpecOperation::new(&self.current_path, operation);
        tracing::trace!(
            kind = %spec_op.kind(),
            path = %spec_op.path.display(),
            "operation queued"
        );
        self.pending.push(spec_op);
    }

    pub fn pending(&self) -> &OperationQueue {
        &self.pending
    }

    pub fn pending_mut(&mut self) -> &mut OperationQueue {
        &mut self.pending
    }

    pub fn take_pending(&mut self) -> OperationQueue {
        self.pending.take()
    }
}

impl fmt::Display for PathState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.current_path.display())
    }
}
