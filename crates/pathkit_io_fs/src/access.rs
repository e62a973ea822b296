//! Filesystem capability used by the path queue executor.
//!
//! Every primitive is expressed as a future so one draining algorithm can
//! serve both execution strategies:
//! - [`FsBlocking`] performs the syscall before returning and hands back an
//!   already-completed future.
//! - [`FsTokio`] performs the syscall on the tokio runtime; it must be polled
//!   from inside a runtime.

use std::fs;
use std::future::{Future, ready};
use std::io;
use std::path::{Path, PathBuf};

use crate::copy::copy_entry;
use crate::listing::{SpecLsEntry, SpecPathStatus, list_directory, sort_entries, status_of};
use crate::report::ReportCopy;
use crate::spec::SpecCopyOptions;

/// Filesystem primitives consumed by queued path operations.
pub trait FsAccess {
    /// Create `path`; parents are created too when `recursive`.
    fn create_directory(
        &self,
        path: &Path,
        recursive: bool,
    ) -> impl Future<Output = io::Result<()>> + Send;

    /// Create or truncate `path` to an empty file.
    fn write_empty_file(&self, path: &Path) -> impl Future<Output = io::Result<()>> + Send;

    /// Set permission bits of `path` (unix mode).
    fn set_permissions(&self, path: &Path, mode: u32)
    -> impl Future<Output = io::Result<()>> + Send;

    /// Copy `from` (file, link or tree) to exactly `to`.
    ///
    /// A report carrying per-entry errors is returned as an error.
    fn copy_entry(
        &self,
        from: &Path,
        to: &Path,
        spec_cp_options: &SpecCopyOptions,
    ) -> impl Future<Output = io::Result<ReportCopy>> + Send;

    /// Entries of `path`, sorted by name.
    fn list_directory(
        &self,
        path: &Path,
    ) -> impl Future<Output = io::Result<Vec<SpecLsEntry>>> + Send;

    /// Status of `path`; `None` when it does not exist.
    fn status_of(
        &self,
        path: &Path,
    ) -> impl Future<Output = io::Result<Option<SpecPathStatus>>> + Send;
}

////////////////////////////////////////////////////////////////////////////////
// #region Blocking

/// Blocking `std::fs` backend; futures are ready on return.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsBlocking;

#[cfg(unix)]
fn permissions_from_mode(mode: u32) -> io::Result<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Ok(fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn permissions_from_mode(mode: u32) -> io::Result<fs::Permissions> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        format!("Permission mode {mode:o} is unsupported on this platform"),
    ))
}

fn create_directory_blocking(path: &Path, recursive: bool) -> io::Result<()> {
    if recursive {
        fs::create_dir_all(path)
    } else {
        fs::create_dir(path)
    }
}

fn copy_entry_checked(
    from: &Path,
    to: &Path,
    spec_cp_options: &SpecCopyOptions,
) -> io::Result<ReportCopy> {
    let report = copy_entry(from, to, spec_cp_options)?.into_result()?;
    tracing::debug!(from = %from.display(), to = %to.display(), "{report}");
    Ok(report)
}

impl FsAccess for FsBlocking {
    fn create_directory(
        &self,
        path: &Path,
        recursive: bool,
    ) -> impl Future<Output = io::Result<()>> + Send {
        ready(create_directory_blocking(path, recursive))
    }

    fn write_empty_file(&self, path: &Path) -> impl Future<Output = io::Result<()>> + Send {
        ready(fs::write(path, b""))
    }

    fn set_permissions(
        &self,
        path: &Path,
        mode: u32,
    ) -> impl Future<Output = io::Result<()>> + Send {
        ready(permissions_from_mode(mode).and_then(|perm| fs::set_permissions(path, perm)))
    }

    fn copy_entry(
        &self,
        from: &Path,
        to: &Path,
        spec_cp_options: &SpecCopyOptions,
    ) -> impl Future<Output = io::Result<ReportCopy>> + Send {
        ready(copy_entry_checked(from, to, spec_cp_options))
    }

    fn list_directory(
        &self,
        path: &Path,
    ) -> impl Future<Output = io::Result<Vec<SpecLsEntry>>> + Send {
        ready(list_directory(path))
    }

    fn status_of(
        &self,
        path: &Path,
    ) -> impl Future<Output = io::Result<Option<SpecPathStatus>>> + Send {
        ready(status_of(path))
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Tokio

/// Non-blocking `tokio::fs` backend.
///
/// Tree copies run on the blocking thread pool via `spawn_blocking`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsTokio;

impl FsAccess for FsTokio {
    async fn create_directory(&self, path: &Path, recursive: bool) -> io::Result<()> {
        if recursive {
            tokio::fs::create_dir_all(path).await
        } else {
            tokio::fs::create_dir(path).await
        }
    }

    async fn write_empty_file(&self, path: &Path) -> io::Result<()> {
        tokio::fs::write(path, b"").await
    }

    async fn set_permissions(&self, path: &Path, mode: u32) -> io::Result<()> {
        let perm = permissions_from_mode(mode)?;
        tokio::fs::set_permissions(path, perm).await
    }

    async fn copy_entry(
        &self,
        from: &Path,
        to: &Path,
        spec_cp_options: &SpecCopyOptions,
    ) -> io::Result<ReportCopy> {
        let path_from: PathBuf = from.to_path_buf();
        let path_to: PathBuf = to.to_path_buf();
        let spec_cp_options = spec_cp_options.clone();
        tokio::task::spawn_blocking(move || {
            copy_entry_checked(&path_from, &path_to, &spec_cp_options)
        })
        .await
        .map_err(io::Error::other)?
    }

    async fn list_directory(&self, path: &Path) -> io::Result<Vec<SpecLsEntry>> {
        let mut l_entries = Vec::new();
        let mut iter_entries = tokio::fs::read_dir(path).await?;
        while let Some(entry) = iter_entries.next_entry().await? {
            let c_name = entry.file_name().to_string_lossy().to_string();
            l_entries.push(SpecLsEntry::from_parts(c_name, entry.file_type().await?));
        }
        sort_entries(&mut l_entries);
        Ok(l_entries)
    }

    async fn status_of(&self, path: &Path) -> io::Result<Option<SpecPathStatus>> {
        let meta_link = match tokio::fs::symlink_metadata(path).await {
            Ok(v) => v,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        let meta_target = if meta_link.file_type().is_symlink() {
            match tokio::fs::metadata(path).await {
                Ok(v) => Some(v),
                Err(e) if e.kind() == io::ErrorKind::NotFound => None,
                Err(e) => return Err(e),
            }
        } else {
            None
        };
        Ok(Some(SpecPathStatus::from_metadata(
            &meta_link,
            meta_target.as_ref(),
        )))
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
