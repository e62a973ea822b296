//! Queue draining: one algorithm, two filesystem backends.

use std::fmt;
use std::io;
use std::path::Path;

use pathkit_io_fs::{FsAccess, FsBlocking, FsTokio, SpecCopyOptions};

use crate::queue::{EnumCopyTarget, EnumOperation, EnumOperationKind, OperationQueue};
use crate::spec::{ErrorPath, PathResult};

/// Counters for one successful drain.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReportDrain {
    pub cnt_mkdir: u64,
    pub cnt_touch: u64,
    pub cnt_chmod: u64,
    pub cnt_copy: u64,
}

impl ReportDrain {
    fn add(&mut self, kind: EnumOperationKind) {
        match kind {
            EnumOperationKind::MakeDirectory => self.cnt_mkdir += 1,
            EnumOperationKind::Touch => self.cnt_touch += 1,
            EnumOperationKind::Chmod => self.cnt_chmod += 1,
            EnumOperationKind::Copy => self.cnt_copy += 1,
        }
    }

    /// Number of applied operations.
    pub fn total(&self) -> u64 {
        self.cnt_mkdir + self.cnt_touch + self.cnt_chmod + self.cnt_copy
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        format!(
            "{prefix} applied={} mkdir={} touch={} chmod={} copy={}",
            self.total(),
            self.cnt_mkdir,
            self.cnt_touch,
            self.cnt_chmod,
            self.cnt_copy
        )
    }
}

impl fmt::Display for ReportDrain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[DRAIN]"))
    }
}

/// Apply every operation of `queue` in insertion order.
///
/// Each call is awaited before the next one is dispatched. The first failure
/// stops the drain; operations after it are dropped with the queue.
pub async fn drain<F>(queue: OperationQueue, fs_access: &F) -> PathResult<ReportDrain>
where
    F: FsAccess,
{
    let n_total = queue.len();
    let mut report_drain = ReportDrain::default();

    for (n_idx, spec_op) in queue.into_iter().enumerate() {
        let kind = spec_op.kind();
        tracing::debug!(
            index = n_idx,
            %kind,
            path = %spec_op.path.display(),
            "dispatch queued operation"
        );

        let res_op = match &spec_op.operation {
            EnumOperation::MakeDirectory => fs_access.create_directory(&spec_op.path, true).await,
            EnumOperation::Touch => fs_access.write_empty_file(&spec_op.path).await,
            EnumOperation::Chmod { mode } => fs_access.set_permissions(&spec_op.path, *mode).await,
            EnumOperation::Copy {
                target,
                spec_cp_options,
            } => copy_to_target(fs_access, &spec_op.path, target, spec_cp_options).await,
        };

        if let Err(e) = res_op {
            tracing::warn!(
                index = n_idx,
                %kind,
                path = %spec_op.path.display(),
                n_discarded = n_total - n_idx - 1,
                error = %e,
                "queued operation failed; remaining operations discarded"
            );
            return Err(ErrorPath::Filesystem {
                kind,
                path: spec_op.path,
                source: e,
            });
        }
        report_drain.add(kind);
    }

    tracing::info!("{report_drain}");
    Ok(report_drain)
}

/// Settle `target` against the filesystem as it is now, then copy.
async fn copy_to_target<F>(
    fs_access: &F,
    path_source: &Path,
    target: &EnumCopyTarget,
    spec_cp_options: &SpecCopyOptions,
) -> io::Result<()>
where
    F: FsAccess,
{
    let status_dir = match target.directory_to_inspect() {
        Some(path_dir) => fs_access.status_of(path_dir).await?,
        None => None,
    };
    let path_destination = target.destination(status_dir);
    tracing::debug!(
        from = %path_source.display(),
        to = %path_destination.display(),
        "copy destination settled"
    );
    fs_access
        .copy_entry(path_source, &path_destination, spec_cp_options)
        .await
        .map(|_| ())
}

/// Drain with blocking `std::fs` calls on the current thread.
pub fn drain_blocking(queue: OperationQueue) -> PathResult<ReportDrain> {
    futures::executor::block_on(drain(queue, &FsBlocking))
}

/// Drain with `tokio::fs`; must run inside a tokio runtime.
pub async fn drain_non_blocking(queue: OperationQueue) -> PathResult<ReportDrain> {
    drain(queue, &FsTokio).await
}

#[cfg(test)]
mod tests {
    use std::future::{Future, ready};
    use std::io;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    use pathkit_io_fs::{FsAccess, ReportCopy, SpecCopyOptions, SpecLsEntry, SpecPathStatus};

    use super::{ReportDrain, drain, drain_blocking};
    use crate::queue::{EnumOperation, EnumOperationKind, OperationQueue, SpecOperation};
    use crate::spec::ErrorPath;

    /// Records when each returned future starts and finishes; fails any call
    /// whose path ends with `fail`.
    #[derive(Default)]
    struct FsRecorder {
        l_calls: Mutex<Vec<String>>,
        if_yield: bool,
    }

    impl FsRecorder {
        fn push(&self, c_call: String) {
            self.l_calls.lock().expect("recorder lock").push(c_call);
        }

        fn record(&self, verb: &str, path: &Path) -> impl Future<Output = io::Result<()>> + Send {
            let c_call = format!("{verb} {}", path.display());
            let b_fail = path.ends_with("fail");
            async move {
                self.push(format!("start {c_call}"));
                if self.if_yield {
                    tokio::task::yield_now().await;
                }
                if b_fail {
                    return Err(io::Error::from(io::ErrorKind::PermissionDenied));
                }
                self.push(format!("end {c_call}"));
                Ok(())
            }
        }

        fn calls(&self) -> Vec<String> {
            self.l_calls.lock().expect("recorder lock").clone()
        }
    }

    /// Every `start X` is immediately followed by its own `end X`.
    fn is_serialized(l_calls: &[String]) -> bool {
        l_calls.chunks(2).all(|pair| match pair {
            [c_start, c_end] => match c_start.strip_prefix("start ") {
                Some(c_call) => c_end.strip_prefix("end ") == Some(c_call),
                None => false,
            },
            _ => false,
        })
    }

    impl FsAccess for FsRecorder {
        fn create_directory(
            &self,
            path: &Path,
            _recursive: bool,
        ) -> impl Future<Output = io::Result<()>> + Send {
            self.record("mkdir", path)
        }

        fn write_empty_file(&self, path: &Path) -> impl Future<Output = io::Result<()>> + Send {
            self.record("touch", path)
        }

        fn set_permissions(
            &self,
            path: &Path,
            _mode: u32,
        ) -> impl Future<Output = io::Result<()>> + Send {
            self.record("chmod", path)
        }

        fn copy_entry(
            &self,
            from: &Path,
            _to: &Path,
            _spec_cp_options: &SpecCopyOptions,
        ) -> impl Future<Output = io::Result<ReportCopy>> + Send {
            let fut = self.record("copy", from);
            async move { fut.await.map(|_| ReportCopy::default()) }
        }

        fn list_directory(
            &self,
            _path: &Path,
        ) -> impl Future<Output = io::Result<Vec<SpecLsEntry>>> + Send {
            ready(Ok(Vec::new()))
        }

        fn status_of(
            &self,
            _path: &Path,
        ) -> impl Future<Output = io::Result<Option<SpecPathStatus>>> + Send {
            ready(Ok(None))
        }
    }

    fn queue_abc() -> OperationQueue {
        let mut queue = OperationQueue::default();
        queue.push(SpecOperation::new(Path::new("a"), EnumOperation::MakeDirectory));
        queue.push(SpecOperation::new(Path::new("b"), EnumOperation::Touch));
        queue.push(SpecOperation::new(
            Path::new("c"),
            EnumOperation::Chmod { mode: 0o644 },
        ));
        queue
    }

    #[test]
    fn drain_applies_in_insertion_order() {
        let fs_recorder = FsRecorder::default();
        let report_drain =
            futures::executor::block_on(drain(queue_abc(), &fs_recorder)).expect("drain");
        assert_eq!(
            fs_recorder.calls(),
            vec![
                "start mkdir a",
                "end mkdir a",
                "start touch b",
                "end touch b",
                "start chmod c",
                "end chmod c"
            ]
        );
        assert_eq!(report_drain.total(), 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn drain_awaits_each_call_before_next() {
        let fs_recorder = FsRecorder {
            if_yield: true,
            ..FsRecorder::default()
        };
        drain(queue_abc(), &fs_recorder).await.expect("drain");
        let l_calls = fs_recorder.calls();
        assert_eq!(l_calls.len(), 6);
        assert!(is_serialized(&l_calls), "overlapping calls: {l_calls:?}");
    }

    #[tokio::test]
    async fn recorder_detects_overlapping_calls() {
        let fs_recorder = FsRecorder {
            if_yield: true,
            ..FsRecorder::default()
        };
        let l_futures = ["a", "b", "c"]
            .map(|name| fs_recorder.write_empty_file(Path::new(name)));
        for res in futures::future::join_all(l_futures).await {
            res.expect("touch");
        }
        let l_calls = fs_recorder.calls();
        assert_eq!(l_calls.len(), 6);
        assert!(!is_serialized(&l_calls), "expected overlap: {l_calls:?}");
    }

    #[test]
    fn drain_stops_at_first_failure() {
        let mut queue = OperationQueue::default();
        queue.push(SpecOperation::new(Path::new("a"), EnumOperation::MakeDirectory));
        queue.push(SpecOperation::new(Path::new("x/fail"), EnumOperation::Touch));
        queue.push(SpecOperation::new(Path::new("c"), EnumOperation::MakeDirectory));

        let fs_recorder = FsRecorder::default();
        let err = futures::executor::block_on(drain(queue, &fs_recorder)).expect_err("must fail");
        match err {
            ErrorPath::Filesystem { kind, path, source } => {
                assert_eq!(kind, EnumOperationKind::Touch);
                assert_eq!(path, PathBuf::from("x/fail"));
                assert_eq!(source.kind(), io::ErrorKind::PermissionDenied);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(
            fs_recorder.calls(),
            vec!["start mkdir a", "end mkdir a", "start touch x/fail"]
        );
    }

    #[test]
    fn drain_blocking_touches_real_filesystem() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let mut queue = OperationQueue::default();
        queue.push(SpecOperation::new(
            &tmp.path().join("sub"),
            EnumOperation::MakeDirectory,
        ));
        queue.push(SpecOperation::new(
            &tmp.path().join("sub").join("f.txt"),
            EnumOperation::Touch,
        ));

        let report_drain = drain_blocking(queue).expect("drain");
        assert_eq!(
            report_drain,
            ReportDrain {
                cnt_mkdir: 1,
                cnt_touch: 1,
                ..ReportDrain::default()
            }
        );
        assert!(tmp.path().join("sub/f.txt").is_file());
    }

    #[test]
    fn report_drain_format() {
        let report_drain = ReportDrain {
            cnt_mkdir: 2,
            cnt_copy: 1,
            ..ReportDrain::default()
        };
        assert_eq!(
            report_drain.to_string(),
            "[DRAIN] applied=3 mkdir=2 touch=0 chmod=0 copy=1"
        );
    }
}
