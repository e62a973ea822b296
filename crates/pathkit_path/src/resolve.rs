//! Copy destination resolution and cross-builder dependency merge.

use std::path::{Path, PathBuf};

use pathkit_io_fs::SpecCopyOptions;

use crate::queue::{EnumCopyTarget, EnumOperation, OperationQueue};
use crate::spec::{ErrorPath, PathResult, SpecCopyDestination, SpecCopyOption};

/// Outcome of resolving one copy intent against a source path.
#[derive(Debug)]
pub struct SpecResolvedCopy {
    /// Copy destination; an `into` target is settled at copy time.
    pub target: EnumCopyTarget,
    /// Operations taken over from a builder destination; they must run
    /// before the copy.
    pub dependencies: OperationQueue,
    pub spec_cp_options: SpecCopyOptions,
}

impl SpecResolvedCopy {
    pub fn into_operation(self) -> (OperationQueue, EnumOperation) {
        (
            self.dependencies,
            EnumOperation::Copy {
                target: self.target,
                spec_cp_options: self.spec_cp_options,
            },
        )
    }
}

/// Resolves copy intents; stateless.
pub struct CopyResolver;

impl CopyResolver {
    /// Validate `spec_copy` and compute the destination for copying
    /// `path_source`.
    ///
    /// - `to`   : destination is used verbatim.
    /// - `into` : destination is `into / basename(path_source)`, or
    ///   `dirname(into) / basename(path_source)` when `into` turns out to be
    ///   an existing non-directory when the copy runs.
    ///
    /// Errors leave every queue untouched, including a builder destination's.
    pub fn resolve(
        path_source: &Path,
        spec_copy: SpecCopyOption,
    ) -> PathResult<SpecResolvedCopy> {
        let SpecCopyOption {
            to,
            into,
            spec_cp_options,
        } = spec_copy;

        let (destination, b_is_into) = match (to, into) {
            (Some(dest), None) => (dest, false),
            (None, Some(dest)) => (dest, true),
            (None, None) => {
                return Err(ErrorPath::InvalidArgument(
                    "copy requires one of `to` or `into`".to_string(),
                ));
            }
            (Some(_), Some(_)) => {
                return Err(ErrorPath::InvalidArgument(
                    "copy accepts only one of `to` or `into`".to_string(),
                ));
            }
        };

        let name_source = if b_is_into {
            let Some(name_source) = path_source.file_name() else {
                return Err(ErrorPath::InvalidArgument(format!(
                    "copy source has no base name to place into a directory: {}",
                    path_source.display()
                )));
            };
            Some(name_source.to_os_string())
        } else {
            None
        };

        let (path_dest, dependencies) = Self::take_destination(destination);
        let target = match name_source {
            Some(name) => EnumCopyTarget::Into {
                path_dir: path_dest,
                name,
            },
            None => EnumCopyTarget::Exact(path_dest),
        };

        Ok(SpecResolvedCopy {
            target,
            dependencies,
            spec_cp_options,
        })
    }

    /// Destination path plus the pending operations it hands over.
    fn take_destination(destination: SpecCopyDestination) -> (PathBuf, OperationQueue) {
        match destination {
            SpecCopyDestination::Literal(path) => (path, OperationQueue::default()),
            SpecCopyDestination::Builder(mut chain) => {
                let dependencies = chain.take_pending();
                if !dependencies.is_empty() {
                    tracing::debug!(
                        n_dependencies = dependencies.len(),
                        destination = %chain.path().display(),
                        "copy destination hands over pending operations"
                    );
                }
                (chain.path().to_path_buf(), dependencies)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::CopyResolver;
    use crate::queue::{EnumCopyTarget, EnumOperation, EnumOperationKind};
    use crate::spec::{ErrorPath, SpecCopyOption};

    #[test]
    fn to_uses_exact_destination() {
        let spec_resolved = CopyResolver::resolve(
            Path::new("data/foo.ts"),
            SpecCopyOption::copy_to("data/bar.ts"),
        )
        .expect("resolve");
        assert_eq!(
            spec_resolved.target,
            EnumCopyTarget::Exact(Path::new("data/bar.ts").to_path_buf())
        );
        assert!(spec_resolved.dependencies.is_empty());
    }

    #[test]
    fn into_joins_source_base_name() {
        let spec_resolved = CopyResolver::resolve(
            Path::new("data/foo.ts"),
            SpecCopyOption::copy_into(crate::path("data").join("sub")),
        )
        .expect("resolve");
        assert_eq!(
            spec_resolved.target,
            EnumCopyTarget::Into {
                path_dir: Path::new("data").join("sub"),
                name: "foo.ts".into(),
            }
        );
        assert_eq!(
            spec_resolved.target.destination(None),
            Path::new("data").join("sub").join("foo.ts")
        );
    }

    #[test]
    fn builder_destination_hands_over_its_queue() {
        let destination = crate::path("data").join("sub").mkdir().join("deeper").mkdir();
        let spec_resolved = CopyResolver::resolve(
            Path::new("data/foo.ts"),
            SpecCopyOption::copy_into(destination),
        )
        .expect("resolve");

        let l_kinds: Vec<_> = spec_resolved.dependencies.iter().map(|op| op.kind()).collect();
        assert_eq!(
            l_kinds,
            vec![EnumOperationKind::MakeDirectory, EnumOperationKind::MakeDirectory]
        );
        assert_eq!(
            spec_resolved.target.destination(None),
            Path::new("data").join("sub").join("deeper").join("foo.ts")
        );

        let (_, operation) = spec_resolved.into_operation();
        assert!(matches!(operation, EnumOperation::Copy { .. }));
    }

    #[test]
    fn missing_target_is_argument_error() {
        let err = CopyResolver::resolve(Path::new("foo.ts"), SpecCopyOption::default())
            .expect_err("must fail");
        assert!(matches!(err, ErrorPath::InvalidArgument(_)));
    }

    #[test]
    fn both_targets_is_argument_error() {
        let spec_copy = SpecCopyOption {
            to: Some("a".into()),
            into: Some("b".into()),
            ..SpecCopyOption::default()
        };
        let err = CopyResolver::resolve(Path::new("foo.ts"), spec_copy).expect_err("must fail");
        assert!(matches!(err, ErrorPath::InvalidArgument(_)));
    }

    #[test]
    fn into_without_source_name_is_argument_error() {
        let err = CopyResolver::resolve(Path::new("/"), SpecCopyOption::copy_into("dst"))
            .expect_err("must fail");
        assert!(matches!(err, ErrorPath::InvalidArgument(_)));
    }
}
