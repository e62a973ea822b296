//! `pathkit_io_fs` v1:
//! Filesystem-access layer behind the `pathkit_path` builder.
//!
//! Modules:
//! - `access`  : `FsAccess` capability with blocking and tokio backends
//! - `copy`    : single-entry / directory-tree copy
//! - `listing` : directory listing and status probes
//! - `spec`    : enums/options/errors
//! - `report`  : copy run report model
//! - `util`    : shared helper functions

pub mod access;
pub mod copy;
pub mod listing;
pub mod report;
pub mod spec;
mod util;

pub use access::{FsAccess, FsBlocking, FsTokio};
pub use copy::copy_entry;
pub use listing::{SpecLsEntry, SpecPathStatus, filter_entries_by_glob, list_directory, status_of};
pub use report::{ReportCopy, ReportCopyBuilder};
pub use spec::{
    CopyEntryError, EnumCopyFileConflictStrategy, EnumCopySymlinkStrategy, SpecCopyError,
    SpecCopyOptions,
};
