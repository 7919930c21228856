//! Materialization and verification reporting.

use std::path::Path;
use std::time::Duration;

/// Report of a materialization.
#[derive(Debug, Clone, Default)]
pub struct ExtractionReport {
    /// Number of files written.
    pub files_extracted: usize,

    /// Number of directories created.
    pub directories_created: usize,

    /// Total bytes written to disk.
    pub bytes_written: u64,

    /// Duration of the operation.
    pub duration: Duration,

    /// Number of files skipped, e.g. symlinks found in a staging tree.
    pub files_skipped: usize,

    /// Warnings generated during the operation.
    pub warnings: Vec<String>,
}

impl ExtractionReport {
    /// Creates a new empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a warning message to the report.
    pub fn add_warning(&mut self, message: String) {
        self.warnings.push(message);
    }

    /// Returns total number of items created.
    #[must_use]
    pub fn total_items(&self) -> usize {
        self.files_extracted + self.directories_created
    }

    /// Returns whether any warnings were generated.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Outcome of comparing one entry against the file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    /// Bytes on disk equal the materialized entry.
    Match,
    /// The file exists but its bytes differ.
    Mismatch {
        /// Length the entry would materialize to.
        expected_len: u64,
        /// Length found on disk.
        actual_len: u64,
    },
    /// No file exists at the resolved path.
    Missing,
    /// The entry path was rejected by the path guard.
    Unsafe(String),
    /// The file could not be read.
    Unreadable(String),
}

impl FileStatus {
    /// Returns `true` for [`FileStatus::Match`].
    #[must_use]
    pub const fn is_match(&self) -> bool {
        matches!(self, Self::Match)
    }
}

/// One row of a [`VerificationReport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCheck {
    /// Entry path as written in the archive.
    pub path: String,
    /// Comparison outcome.
    pub status: FileStatus,
}

/// Per-entry result of comparing an archive against a directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerificationReport {
    /// One check per entry, in archive order.
    pub files: Vec<FileCheck>,
}

impl VerificationReport {
    /// Number of entries that matched.
    #[must_use]
    pub fn passed(&self) -> usize {
        self.files.iter().filter(|f| f.status.is_match()).count()
    }

    /// Number of entries that did not match.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.files.len() - self.passed()
    }

    /// Returns `true` if every entry matched.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.files.iter().all(|f| f.status.is_match())
    }
}

/// Callback trait for progress reporting during materialization.
///
/// The trait requires `Send` to allow use in multi-threaded contexts.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use textpack_core::ProgressCallback;
///
/// struct SimpleProgress;
///
/// impl ProgressCallback for SimpleProgress {
///     fn on_entry_start(&mut self, path: &Path, total: usize, current: usize) {
///         println!("Writing {}/{}: {}", current, total, path.display());
///     }
///
///     fn on_bytes_written(&mut self, _bytes: u64) {}
///
///     fn on_entry_complete(&mut self, path: &Path) {
///         println!("Completed: {}", path.display());
///     }
///
///     fn on_complete(&mut self) {}
/// }
/// ```
pub trait ProgressCallback: Send {
    /// Called when starting to process an entry.
    ///
    /// `current` is 1-indexed.
    fn on_entry_start(&mut self, path: &Path, total: usize, current: usize);

    /// Called after bytes were written.
    fn on_bytes_written(&mut self, bytes: u64);

    /// Called when an entry has been completely processed.
    fn on_entry_complete(&mut self, path: &Path);

    /// Called when the entire operation is complete.
    fn on_complete(&mut self);
}

/// No-op implementation of `ProgressCallback`.
#[derive(Debug, Default)]
pub struct NoopProgress;

impl ProgressCallback for NoopProgress {
    fn on_entry_start(&mut self, _path: &Path, _total: usize, _current: usize) {}

    fn on_bytes_written(&mut self, _bytes: u64) {}

    fn on_entry_complete(&mut self, _path: &Path) {}

    fn on_complete(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_report() {
        let report = ExtractionReport::new();
        assert_eq!(report.files_extracted, 0);
        assert_eq!(report.bytes_written, 0);
        assert!(!report.has_warnings());
    }

    #[test]
    fn test_add_warning() {
        let mut report = ExtractionReport::new();
        report.add_warning("Test warning".to_string());
        assert!(report.has_warnings());
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_total_items() {
        let mut report = ExtractionReport::new();
        report.files_extracted = 10;
        report.directories_created = 5;
        assert_eq!(report.total_items(), 15);
    }

    #[test]
    fn test_verification_counts() {
        let report = VerificationReport {
            files: vec![
                FileCheck {
                    path: "a".into(),
                    status: FileStatus::Match,
                },
                FileCheck {
                    path: "b".into(),
                    status: FileStatus::Missing,
                },
            ],
        };
        assert_eq!(report.passed(), 1);
        assert_eq!(report.failed(), 1);
        assert!(!report.is_success());
        assert!(VerificationReport::default().is_success());
    }
}
