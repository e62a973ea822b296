//! `pathkit_path` v1:
//! Fluent path builder with a deferred filesystem operation queue.
//!
//! Modules:
//! - `builder` : `PathChain` plus the `path` / `home` / `root` anchors
//! - `state`   : current path and pending queue
//! - `segment` : dynamic segment access and the `segments!` macro
//! - `queue`   : queued operation model
//! - `resolve` : copy destination resolution and dependency merge
//! - `exec`    : queue draining over blocking / tokio backends
//! - `spec`    : enums/options/errors

pub mod builder;
pub mod exec;
pub mod queue;
pub mod resolve;
pub mod segment;
pub mod spec;
pub mod state;

pub use builder::{PathChain, home, path, root};
pub use exec::{ReportDrain, drain, drain_blocking, drain_non_blocking};
pub use queue::{
    EnumCopyTarget, EnumOperation, EnumOperationKind, OperationQueue, SpecOperation,
};
pub use resolve::{CopyResolver, SpecResolvedCopy};
pub use segment::{EnumMemberAccess, SegmentResolver};
pub use spec::{
    EnumExecMode, ErrorPath, PathResult, SpecCopyDestination, SpecCopyOption, SpecPathOptions,
};
pub use state::PathState;
