//! Copy report models and mutable report builder.

use std::fmt;
use std::path::PathBuf;

use crate::spec::{CopyEntryError, SpecCopyError};

/// Aggregate counters and diagnostics for one `copy_entry` run.
#[derive(Debug, Default, Clone)]
pub struct ReportCopy {
    /// Total scanned directory/file entries.
    pub cnt_scanned: u64,
    /// Number of entries successfully committed (files, dirs, links).
    pub cnt_copied: u64,
    /// Number of entries skipped by conflict strategy.
    pub cnt_skipped: u64,
    /// Non-fatal warnings collected during traversal/copy.
    pub warnings: Vec<String>,
    /// Per-entry failures.
    pub errors: Vec<SpecCopyError>,
}

impl ReportCopy {
    /// Number of collected hard errors.
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Number of collected warnings.
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        format!(
            "{prefix} scanned={} copied={} skipped={} errors={} warnings={}",
            self.cnt_scanned,
            self.cnt_copied,
            self.cnt_skipped,
            self.error_count(),
            self.warning_count()
        )
    }

    /// Fail the run when any entry failed; the first failure is surfaced.
    pub fn into_result(self) -> Result<Self, CopyEntryError> {
        match self.errors.first() {
            None => Ok(self),
            Some(spec_error) => Err(CopyEntryError::EntriesFailed {
                count: self.errors.len(),
                path: spec_error.path.clone(),
                message: spec_error.exception.clone(),
            }),
        }
    }
}

impl fmt::Display for ReportCopy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[COPY]"))
    }
}

/// Mutable accumulator for copy statistics.
#[derive(Debug, Default, Clone)]
pub struct ReportCopyBuilder {
    /// See [`ReportCopy::cnt_scanned`].
    pub cnt_scanned: u64,
    /// See [`ReportCopy::cnt_copied`].
    pub cnt_copied: u64,
    /// See [`ReportCopy::cnt_skipped`].
    pub cnt_skipped: u64,
    /// See [`ReportCopy::errors`].
    pub errors: Vec<SpecCopyError>,
    /// See [`ReportCopy::warnings`].
    pub warnings: Vec<String>,
}

impl ReportCopyBuilder {
    pub fn add_scanned(&mut self) {
        self.cnt_scanned += 1;
    }

    pub fn add_copied(&mut self) {
        self.cnt_copied += 1;
    }

    pub fn add_skipped(&mut self) {
        self.cnt_skipped += 1;
    }

    /// Add warning message; also emitted as a `tracing` warning.
    pub fn add_warning(&mut self, warning: String) {
        tracing::warn!(target: "pathkit_io_fs::copy", "{warning}");
        self.warnings.push(warning);
    }

    /// Add one path-scoped error.
    pub fn add_error(&mut self, path: PathBuf, exception: String) {
        self.errors.push(SpecCopyError { path, exception });
    }

    /// Finalize builder into immutable report.
    pub fn build(self) -> ReportCopy {
        ReportCopy {
            cnt_scanned: self.cnt_scanned,
            cnt_copied: self.cnt_copied,
            cnt_skipped: self.cnt_skipped,
            errors: self.errors,
            warnings: self.warnings,
        }
    }
}
