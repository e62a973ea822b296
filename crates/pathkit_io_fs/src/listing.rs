//! Directory listing and path status probes.

use std::fs;
use std::io;
use std::path::Path;

use globset::Glob;
use serde::Serialize;

/// One directory entry as reported by a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpecLsEntry {
    /// Entry file name.
    pub name: String,
    /// Text after the last `.` of a file name, per `Path::extension`.
    ///
    /// `None` for directories and for names without an extension, including
    /// `Makefile` and dot-files such as `.bashrc`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
    pub is_directory: bool,
    pub is_file: bool,
    /// Entry itself is a link (links are not followed for classification).
    pub is_symlink: bool,
}

impl SpecLsEntry {
    pub(crate) fn from_parts(name: String, file_type: fs::FileType) -> Self {
        let extension = if file_type.is_file() {
            Path::new(&name)
                .extension()
                .map(|ext| ext.to_string_lossy().to_string())
        } else {
            None
        };
        Self {
            name,
            extension,
            is_directory: file_type.is_dir(),
            is_file: file_type.is_file(),
            is_symlink: file_type.is_symlink(),
        }
    }
}

/// Kind probes for one path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SpecPathStatus {
    /// Path (following links) is a regular file.
    pub is_file: bool,
    /// Path (following links) is a directory.
    pub is_directory: bool,
    /// Path itself is a symbolic link.
    pub is_symlink: bool,
}

impl SpecPathStatus {
    /// Combine the link's own metadata with the (optional) target metadata.
    pub(crate) fn from_metadata(
        meta_link: &fs::Metadata,
        meta_target: Option<&fs::Metadata>,
    ) -> Self {
        let is_symlink = meta_link.file_type().is_symlink();
        let meta_kind = if is_symlink { meta_target } else { Some(meta_link) };
        Self {
            is_file: meta_kind.is_some_and(|m| m.is_file()),
            is_directory: meta_kind.is_some_and(|m| m.is_dir()),
            is_symlink,
        }
    }
}

/// Sort listing entries by name, ordinal byte comparison.
pub(crate) fn sort_entries(l_entries: &mut [SpecLsEntry]) {
    l_entries.sort_by(|a, b| a.name.as_bytes().cmp(b.name.as_bytes()));
}

/// List `path_dir` immediately; entries are sorted by name.
pub fn list_directory(path_dir: &Path) -> io::Result<Vec<SpecLsEntry>> {
    let mut l_entries = Vec::new();
    for entry in fs::read_dir(path_dir)? {
        let entry = entry?;
        let c_name = entry.file_name().to_string_lossy().to_string();
        l_entries.push(SpecLsEntry::from_parts(c_name, entry.file_type()?));
    }
    sort_entries(&mut l_entries);
    Ok(l_entries)
}

/// Status of `path`; `Ok(None)` when nothing exists there.
pub fn status_of(path: &Path) -> io::Result<Option<SpecPathStatus>> {
    let meta_link = match fs::symlink_metadata(path) {
        Ok(v) => v,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };
    let meta_target = if meta_link.file_type().is_symlink() {
        match fs::metadata(path) {
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

/// Keep entries whose name matches the shell-like `pattern`.
pub fn filter_entries_by_glob(
    l_entries: Vec<SpecLsEntry>,
    pattern: &str,
) -> Result<Vec<SpecLsEntry>, globset::Error> {
    let matcher = Glob::new(pattern)?.compile_matcher();
    Ok(l_entries
        .into_iter()
        .filter(|entry| matcher.is_match(&entry.name))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::{filter_entries_by_glob, list_directory, status_of};

    #[test]
    fn list_directory_sorted_with_extensions() {
        let tmp = tempfile::tempdir().expect("tempdir");
        std::fs::write(tmp.path().join("foo.ts"), "").expect("write foo");
        std::fs::write(tmp.path().join("bar.ts"), "").expect("write bar");
        std::fs::create_dir(tmp.path().join("folder")).expect("mkdir folder");

        let l_entries = list_directory(tmp.path()).expect("list");
        let l_names: Vec<&str> = l_entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(l_names, vec!["bar.ts", "folder", "foo.ts"]);

        assert_eq!(l_entries[0].extension.as_deref(), Some("ts"));
        assert!(l_entries[0].is_file);
        assert_eq!(l_entries[1].extension, None);
        assert!(l_entries[1].is_directory);
        assert!(!l_entries[1].is_file);
        assert_eq!(l_entries[2].extension.as_deref(), Some("ts"));
    }

    #[test]
    fn names_without_extension_report_none() {
        let tmp = tempfile::tempdir().expect("tempdir");
        for name in ["Makefile", ".bashrc", "archive.tar.gz"] {
            std::fs::write(tmp.path().join(name), "").expect("write");
        }
        let l_entries = list_directory(tmp.path()).expect("list");
        let l_extensions: Vec<_> = l_entries
            .iter()
            .map(|e| (e.name.as_str(), e.extension.as_deref()))
            .collect();
        assert_eq!(
            l_extensions,
            vec![
                (".bashrc", None),
                ("Makefile", None),
                ("archive.tar.gz", Some("gz"))
            ]
        );
    }

    #[test]
    fn list_directory_sorts_ordinally() {
        let tmp = tempfile::tempdir().expect("tempdir");
        for name in ["b", "B", "a", "_z"] {
            std::fs::write(tmp.path().join(name), "").expect("write");
        }
        let l_names: Vec<String> = list_directory(tmp.path())
            .expect("list")
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(l_names, vec!["B", "_z", "a", "b"]);
    }

    #[test]
    fn list_entry_serializes_without_missing_extension() {
        let tmp = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir(tmp.path().join("folder")).expect("mkdir");
        let l_entries = list_directory(tmp.path()).expect("list");
        let json = serde_json::to_value(&l_entries[0]).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "name": "folder",
                "is_directory": true,
                "is_file": false,
                "is_symlink": false,
            })
        );
    }

    #[test]
    fn status_of_missing_path_is_none() {
        let tmp = tempfile::tempdir().expect("tempdir");
        assert_eq!(status_of(&tmp.path().join("dOzNotEXiZt")).expect("status"), None);
        let status = status_of(tmp.path()).expect("status").expect("exists");
        assert!(status.is_directory);
        assert!(!status.is_file);
    }

    #[cfg(unix)]
    #[test]
    fn status_of_reports_link_and_target_kind() {
        let tmp = tempfile::tempdir().expect("tempdir");
        std::fs::write(tmp.path().join("target.txt"), "").expect("write");
        std::os::unix::fs::symlink(tmp.path().join("target.txt"), tmp.path().join("link"))
            .expect("symlink");

        let status = status_of(&tmp.path().join("link"))
            .expect("status")
            .expect("exists");
        assert!(status.is_symlink);
        assert!(status.is_file);
    }

    #[test]
    fn glob_filter_keeps_matching_names() {
        let tmp = tempfile::tempdir().expect("tempdir");
        for name in ["a.ts", "b.rs", "c.ts"] {
            std::fs::write(tmp.path().join(name), "").expect("write");
        }
        let l_entries = list_directory(tmp.path()).expect("list");
        let l_matched = filter_entries_by_glob(l_entries, "*.ts").expect("glob");
        let l_names: Vec<&str> = l_matched.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(l_names, vec!["a.ts", "c.ts"]);

        assert!(filter_entries_by_glob(Vec::new(), "[").is_err());
    }
}
