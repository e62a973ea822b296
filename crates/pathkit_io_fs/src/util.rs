use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::report::ReportCopyBuilder;
use crate::spec::EnumCopyFileConflictStrategy;

////////////////////////////////////////////////////////////////////////////////
// #region PathUtilities

fn _normalize_path(path: &Path) -> PathBuf {
    if let Ok(resolved) = fs::canonicalize(path) {
        return resolved;
    }
    // Destination usually does not exist yet: resolve its parent instead.
    if let (Some(parent), Some(name)) = (path.parent(), path.file_name())
        && !parent.as_os_str().is_empty()
        && let Ok(parent_resolved) = fs::canonicalize(parent)
    {
        return parent_resolved.join(name);
    }
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(path)
}

/// `true` when `dst` is `src` itself or lives somewhere below it.
pub(crate) fn is_nested_into_source(src: &Path, dst: &Path) -> bool {
    let src_resolved = _normalize_path(src);
    let dst_resolved = _normalize_path(dst);
    dst_resolved.starts_with(&src_resolved)
}

pub(crate) fn should_skip_file_conflict(
    path_dst: &Path,
    rule_conflict: EnumCopyFileConflictStrategy,
    builder_cp_report: &mut ReportCopyBuilder,
) -> bool {
    let Ok(meta_dst) = fs::symlink_metadata(path_dst) else {
        return false;
    };
    if meta_dst.is_dir() {
        builder_cp_report.add_error(
            path_dst.to_path_buf(),
            format!("Destination is a directory: {}", path_dst.display()),
        );
        return true;
    }

    match rule_conflict {
        EnumCopyFileConflictStrategy::Skip => {
            builder_cp_report.add_skipped();
            true
        }
        EnumCopyFileConflictStrategy::Error => {
            builder_cp_report.add_error(
                path_dst.to_path_buf(),
                format!("Destination exists: {}", path_dst.display()),
            );
            true
        }
        EnumCopyFileConflictStrategy::Overwrite => {
            // A dangling or foreign symlink must not redirect the write.
            if meta_dst.file_type().is_symlink()
                && let Err(e) = fs::remove_file(path_dst)
            {
                builder_cp_report.add_error(path_dst.to_path_buf(), e.to_string());
                return true;
            }
            false
        }
    }
}

pub(crate) fn create_symbolic_link(
    path_src: &Path,
    path_dst: &Path,
    builder_cp_report: &mut ReportCopyBuilder,
) {
    let target = match fs::read_link(path_src) {
        Ok(v) => v,
        Err(e) => {
            builder_cp_report.add_error(path_dst.to_path_buf(), e.to_string());
            return;
        }
    };

    #[cfg(unix)]
    {
        use std::os::unix::fs::symlink;
        match symlink(&target, path_dst) {
            Ok(_) => builder_cp_report.add_copied(),
            Err(e) => builder_cp_report.add_error(path_dst.to_path_buf(), e.to_string()),
        }
    }
    #[cfg(windows)]
    {
        use std::os::windows::fs::{symlink_dir, symlink_file};
        let res = if path_src.is_dir() {
            symlink_dir(&target, path_dst)
        } else {
            symlink_file(&target, path_dst)
        };
        match res {
            Ok(_) => builder_cp_report.add_copied(),
            Err(e) => builder_cp_report.add_error(path_dst.to_path_buf(), e.to_string()),
        }
    }
    #[cfg(not(any(unix, windows)))]
    {
        let _ = target;
        builder_cp_report.add_error(
            path_dst.to_path_buf(),
            "Symbolic links are unsupported on this platform".to_string(),
        );
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region FileCopy

pub(crate) fn copy_file_with_metadata(
    path_file_src: &Path,
    path_file_dst: &Path,
    if_preserve_metadata: bool,
) -> Result<(), io::Error> {
    fs::copy(path_file_src, path_file_dst)?;
    if !if_preserve_metadata {
        return Ok(());
    }
    apply_metadata(path_file_src, path_file_dst)?;
    #[cfg(target_os = "linux")]
    {
        copy_xattrs_linux(path_file_src, path_file_dst);
    }
    Ok(())
}

fn apply_metadata(path_file_src: &Path, path_file_dst: &Path) -> Result<(), io::Error> {
    use filetime::{FileTime, set_file_times};

    let stat_src = fs::metadata(path_file_src)?;
    fs::set_permissions(path_file_dst, stat_src.permissions())?;

    let file_time_access = FileTime::from_last_access_time(&stat_src);
    let file_time_modify = FileTime::from_last_modification_time(&stat_src);
    set_file_times(path_file_dst, file_time_access, file_time_modify)
}

#[cfg(target_os = "linux")]
fn copy_xattrs_linux(path_file_src: &Path, path_file_dst: &Path) {
    let iter_xattr_names = match xattr::list(path_file_src) {
        Ok(v) => v,
        Err(_) => return,
    };

    for name in iter_xattr_names {
        let Some(raw_value) = xattr::get(path_file_src, &name).ok().flatten() else {
            continue;
        };
        let _ = xattr::set(path_file_dst, &name, &raw_value);
    }
}

pub(crate) fn calculate_worker_limit(num_workers_max: Option<usize>) -> usize {
    let n_cpu = std::thread::available_parallelism()
        .map(|v| v.get())
        .unwrap_or(1);

    match num_workers_max {
        Some(n) => n.clamp(1, n_cpu),
        None => n_cpu.clamp(1, 8),
    }
}

/// Map a source entry below `path_dir_src` onto the same relative location
/// below `path_dir_dst`.
pub(crate) fn derive_destination_path(
    path_src: &Path,
    path_dir_src: &Path,
    path_dir_dst: &Path,
) -> PathBuf {
    match path_src.strip_prefix(path_dir_src) {
        Ok(path_rel) => path_dir_dst.join(path_rel),
        Err(_) => path_dir_dst.join(path_src.file_name().unwrap_or_default()),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
