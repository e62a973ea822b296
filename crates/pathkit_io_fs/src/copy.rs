//! Single-entry and directory-tree copy orchestration.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rayon::ThreadPoolBuilder;
use rayon::prelude::*;

use crate::report::{ReportCopy, ReportCopyBuilder};
use crate::spec::{CopyEntryError, EnumCopySymlinkStrategy, SpecCopyOptions};
use crate::util::{
    calculate_worker_limit, copy_file_with_metadata, create_symbolic_link,
    derive_destination_path, is_nested_into_source, should_skip_file_conflict,
};

#[derive(Debug, Clone)]
struct SpecCopyTaskFile {
    path_file_src: PathBuf,
    path_file_dst: PathBuf,
}

#[derive(Debug)]
struct SpecCopyContext {
    path_dir_src: PathBuf,
    path_dir_dst: PathBuf,
    spec_cp_options: SpecCopyOptions,
    builder_cp_report: ReportCopyBuilder,
    set_visited_dirs: HashSet<(u64, u64)>,
    l_tasks_file_copy: Vec<SpecCopyTaskFile>,
}

/// Copy one filesystem entry from `path_source` to exactly `path_destination`.
///
/// - A regular file is copied (optionally with metadata).
/// - A symlink is recreated or followed depending on
///   [`SpecCopyOptions::rule_symlink`].
/// - A directory is copied recursively; `path_destination` becomes the copy
///   of the directory itself and is merged into when it already exists.
///
/// Per-entry failures are collected into the returned [`ReportCopy`]; the
/// caller decides whether a report with errors fails the run (see
/// [`ReportCopy::into_result`]). [`CopyEntryError`] is returned only for
/// setup failures.
pub fn copy_entry<P, Q>(
    path_source: P,
    path_destination: Q,
    spec_cp_options: &SpecCopyOptions,
) -> Result<ReportCopy, CopyEntryError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let path_src = path_source.as_ref().to_path_buf();
    let path_dst = path_destination.as_ref().to_path_buf();

    let meta_src = match fs::symlink_metadata(&path_src) {
        Ok(v) => v,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(CopyEntryError::SourceMissing(path_src));
        }
        Err(e) => {
            return Err(CopyEntryError::SourceInspectFailed {
                path: path_src,
                source: e,
            });
        }
    };

    let b_is_symlink = meta_src.file_type().is_symlink();
    let b_follow = spec_cp_options.rule_symlink == EnumCopySymlinkStrategy::Dereference;
    let mut builder_cp_report = ReportCopyBuilder::default();

    if b_is_symlink && !b_follow {
        builder_cp_report.add_scanned();
        if !should_skip_file_conflict(
            &path_dst,
            spec_cp_options.rule_conflict_file,
            &mut builder_cp_report,
        ) {
            create_symbolic_link(&path_src, &path_dst, &mut builder_cp_report);
        }
        return Ok(builder_cp_report.build());
    }

    let b_is_dir = if b_is_symlink {
        path_src.is_dir()
    } else {
        meta_src.is_dir()
    };
    if b_is_dir {
        return copy_directory(path_src, path_dst, spec_cp_options.clone());
    }

    let b_is_file = if b_is_symlink {
        path_src.is_file()
    } else {
        meta_src.is_file()
    };
    if !b_is_file {
        if b_is_symlink {
            return Err(CopyEntryError::SourceMissing(path_src));
        }
        return Err(CopyEntryError::UnsupportedEntry(path_src));
    }

    builder_cp_report.add_scanned();
    if should_skip_file_conflict(
        &path_dst,
        spec_cp_options.rule_conflict_file,
        &mut builder_cp_report,
    ) {
        return Ok(builder_cp_report.build());
    }
    match copy_file_with_metadata(&path_src, &path_dst, spec_cp_options.if_preserve_metadata) {
        Ok(_) => builder_cp_report.add_copied(),
        Err(e) => builder_cp_report.add_error(path_dst, e.to_string()),
    }
    Ok(builder_cp_report.build())
}

fn copy_directory(
    path_dir_src: PathBuf,
    path_dir_dst: PathBuf,
    spec_cp_options: SpecCopyOptions,
) -> Result<ReportCopy, CopyEntryError> {
    if is_nested_into_source(&path_dir_src, &path_dir_dst) {
        return Err(CopyEntryError::SourceDestinationOverlap {
            source_dir: path_dir_src,
            destination: path_dir_dst,
        });
    }
    fs::create_dir_all(&path_dir_dst).map_err(|e| CopyEntryError::DestinationInitFailed {
        path: path_dir_dst.clone(),
        source: e,
    })?;

    let mut spec_cp_ctx = SpecCopyContext {
        path_dir_src: path_dir_src.clone(),
        path_dir_dst,
        spec_cp_options,
        builder_cp_report: ReportCopyBuilder::default(),
        set_visited_dirs: HashSet::new(),
        l_tasks_file_copy: Vec::new(),
    };
    spec_cp_ctx.builder_cp_report.add_scanned();
    spec_cp_ctx.builder_cp_report.add_copied();

    walk_directory(&path_dir_src, &mut spec_cp_ctx);
    flush_file_copy_tasks(&mut spec_cp_ctx);
    Ok(spec_cp_ctx.builder_cp_report.build())
}

fn run_file_copy_task(
    spec_task: &SpecCopyTaskFile,
    if_preserve_metadata: bool,
) -> Result<(), String> {
    copy_file_with_metadata(
        &spec_task.path_file_src,
        &spec_task.path_file_dst,
        if_preserve_metadata,
    )
    .map_err(|e| e.to_string())
}

fn flush_file_copy_tasks(spec_cp_ctx: &mut SpecCopyContext) {
    let l_tasks_file_copy = std::mem::take(&mut spec_cp_ctx.l_tasks_file_copy);
    if l_tasks_file_copy.is_empty() {
        return;
    }
    let if_preserve_metadata = spec_cp_ctx.spec_cp_options.if_preserve_metadata;
    let n_workers_max = calculate_worker_limit(spec_cp_ctx.spec_cp_options.num_workers_max);

    let run_serial = |l_tasks: Vec<SpecCopyTaskFile>| {
        l_tasks
            .into_iter()
            .map(|spec_task| {
                let res_copy = run_file_copy_task(&spec_task, if_preserve_metadata);
                (spec_task.path_file_dst, res_copy)
            })
            .collect::<Vec<_>>()
    };

    let l_results = if n_workers_max <= 1 || l_tasks_file_copy.len() == 1 {
        run_serial(l_tasks_file_copy)
    } else {
        match ThreadPoolBuilder::new().num_threads(n_workers_max).build() {
            Ok(thread_pool) => thread_pool.install(|| {
                l_tasks_file_copy
                    .into_par_iter()
                    .map(|spec_task| {
                        let res_copy = run_file_copy_task(&spec_task, if_preserve_metadata);
                        (spec_task.path_file_dst, res_copy)
                    })
                    .collect::<Vec<_>>()
            }),
            Err(_) => {
                spec_cp_ctx.builder_cp_report.add_warning(format!(
                    "Failed to initialize thread pool (workers={n_workers_max}); fallback to serial copy."
                ));
                run_serial(l_tasks_file_copy)
            }
        }
    };

    for (path_file_dst, res_copy) in l_results {
        match res_copy {
            Ok(_) => spec_cp_ctx.builder_cp_report.add_copied(),
            Err(msg) => spec_cp_ctx.builder_cp_report.add_error(path_file_dst, msg),
        }
    }
}

fn walk_directory(path_root: &Path, spec_cp_ctx: &mut SpecCopyContext) {
    let enum_rule_symlink = spec_cp_ctx.spec_cp_options.rule_symlink;
    if enum_rule_symlink == EnumCopySymlinkStrategy::Dereference {
        #[cfg(unix)]
        {
            use std::os::unix::fs::MetadataExt;
            if let Ok(stat_root) = fs::metadata(path_root)
                && !spec_cp_ctx
                    .set_visited_dirs
                    .insert((stat_root.dev(), stat_root.ino()))
            {
                spec_cp_ctx
                    .builder_cp_report
                    .add_warning(format!("Symlink loop detected: {}", path_root.display()));
                return;
            }
        }
    }

    let iter_entries = match fs::read_dir(path_root) {
        Ok(iter) => iter,
        Err(e) => {
            spec_cp_ctx
                .builder_cp_report
                .add_error(path_root.to_path_buf(), e.to_string());
            return;
        }
    };

    let mut l_entries = Vec::new();
    for _entry_res in iter_entries {
        match _entry_res {
            Ok(entry) => l_entries.push(entry),
            Err(e) => spec_cp_ctx.builder_cp_report.add_warning(format!(
                "Failed to read directory entry under {} ({e})",
                path_root.display()
            )),
        }
    }
    l_entries.sort_by_key(|entry| entry.file_name());

    for entry in l_entries {
        let path_entry = entry.path();
        let cfg_file_type = match entry.file_type() {
            Ok(v) => v,
            Err(e) => {
                spec_cp_ctx
                    .builder_cp_report
                    .add_warning(format!("Failed to inspect {} ({e})", path_entry.display()));
                continue;
            }
        };
        spec_cp_ctx.builder_cp_report.add_scanned();

        let path_dst = derive_destination_path(
            &path_entry,
            &spec_cp_ctx.path_dir_src,
            &spec_cp_ctx.path_dir_dst,
        );
        let b_is_symlink = cfg_file_type.is_symlink();

        if b_is_symlink && enum_rule_symlink == EnumCopySymlinkStrategy::CopySymlinks {
            if !should_skip_file_conflict(
                &path_dst,
                spec_cp_ctx.spec_cp_options.rule_conflict_file,
                &mut spec_cp_ctx.builder_cp_report,
            ) {
                create_symbolic_link(&path_entry, &path_dst, &mut spec_cp_ctx.builder_cp_report);
            }
            continue;
        }

        if b_is_symlink && !path_entry.exists() {
            spec_cp_ctx.builder_cp_report.add_error(
                path_entry.clone(),
                format!("Broken symlink: {}", path_entry.display()),
            );
            continue;
        }

        let b_is_dir = cfg_file_type.is_dir() || (b_is_symlink && path_entry.is_dir());
        if b_is_dir {
            match fs::create_dir_all(&path_dst) {
                Ok(_) => {
                    spec_cp_ctx.builder_cp_report.add_copied();
                    walk_directory(&path_entry, spec_cp_ctx);
                }
                Err(e) => spec_cp_ctx
                    .builder_cp_report
                    .add_error(path_dst, e.to_string()),
            }
            continue;
        }

        let b_is_file = cfg_file_type.is_file() || (b_is_symlink && path_entry.is_file());
        if !b_is_file {
            spec_cp_ctx
                .builder_cp_report
                .add_warning(format!("Special file skipped: {}", path_entry.display()));
            spec_cp_ctx.builder_cp_report.add_skipped();
            continue;
        }

        if should_skip_file_conflict(
            &path_dst,
            spec_cp_ctx.spec_cp_options.rule_conflict_file,
            &mut spec_cp_ctx.builder_cp_report,
        ) {
            continue;
        }
        spec_cp_ctx.l_tasks_file_copy.push(SpecCopyTaskFile {
            path_file_src: path_entry,
            path_file_dst: path_dst,
        });
    }
}
