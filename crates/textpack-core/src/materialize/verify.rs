//! Compares archive entries with files already on disk.

use std::io::ErrorKind;

use tracing::debug;

use crate::ExtractConfig;
use crate::report::FileCheck;
use crate::report::FileStatus;
use crate::report::VerificationReport;
use crate::security::resolve;
use crate::types::DestDir;
use crate::types::Entry;

/// Checks every entry against the file at its resolved path under `dest`.
///
/// Nothing is written. Entries the path guard rejects are reported as
/// [`FileStatus::Unsafe`] rather than aborting the run.
///
/// # Examples
///
/// ```no_run
/// use textpack_core::materialize;
/// use textpack_core::types::{DestDir, Entry};
/// use textpack_core::ExtractConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dest = DestDir::new("/tmp/restore")?;
/// let entries = vec![Entry::text("hello.txt", "hi\n")];
/// let report = materialize::verify(&entries, &dest, &ExtractConfig::default());
/// println!("{} of {} files match", report.passed(), report.files.len());
/// # Ok(())
/// # }
/// ```
#[must_use]
pub fn verify(entries: &[Entry], dest: &DestDir, config: &ExtractConfig) -> VerificationReport {
    let files = entries
        .iter()
        .map(|entry| FileCheck {
            path: entry.path.clone(),
            status: check(entry, dest, config),
        })
        .collect();
    let report = VerificationReport { files };
    debug!(
        passed = report.passed(),
        failed = report.failed(),
        "verified entries"
    );
    report
}

fn check(entry: &Entry, dest: &DestDir, config: &ExtractConfig) -> FileStatus {
    let safe = match resolve(&entry.path, dest, config) {
        Ok(safe) => safe,
        Err(e) => return FileStatus::Unsafe(e.to_string()),
    };
    let expected = entry.materialized();
    match std::fs::read(dest.join(&safe)) {
        Ok(actual) if actual == *expected => FileStatus::Match,
        Ok(actual) => FileStatus::Mismatch {
            expected_len: expected.len() as u64,
            actual_len: actual.len() as u64,
        },
        Err(e) if e.kind() == ErrorKind::NotFound => FileStatus::Missing,
        Err(e) => FileStatus::Unreadable(e.to_string()),
    }
}
