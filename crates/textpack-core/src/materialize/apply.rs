//! Direct materialization of parsed entries.

use std::path::Path;
use std::time::Instant;

use tracing::debug;
use tracing::info;

use super::write;
use crate::ExtractConfig;
use crate::ExtractionReport;
use crate::ProgressCallback;
use crate::Result;
use crate::security::QuotaTracker;
use crate::security::resolve;
use crate::types::DestDir;
use crate::types::Entry;

/// Writes every entry under `dest`.
///
/// Each entry path passes the path guard and the quota check before its
/// file is written. Text entries are written in their materialized form
/// (one trailing newline); binary entries verbatim. Missing parent
/// directories are created.
///
/// Entries are processed in order and the first failure stops the run.
/// Files written before the failure stay on disk; use
/// [`apply_staged`](super::apply_staged) to avoid partial output.
///
/// # Errors
///
/// - `PathTraversal` or `SecurityViolation` from the path guard
/// - `SecurityViolation` if a target exists and `config.overwrite` is off
/// - `QuotaExceeded` if file count or total size limits are crossed
/// - `Io` for filesystem failures
///
/// # Examples
///
/// ```no_run
/// use textpack_core::materialize;
/// use textpack_core::types::{DestDir, Entry};
/// use textpack_core::{ExtractConfig, NoopProgress};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dest = DestDir::create("/tmp/restore")?;
/// let entries = vec![Entry::text("hello.txt", "hi\n")];
/// let report = materialize::apply(&entries, &dest, &ExtractConfig::default(), &mut NoopProgress)?;
/// assert_eq!(report.files_extracted, 1);
/// # Ok(())
/// # }
/// ```
pub fn apply(
    entries: &[Entry],
    dest: &DestDir,
    config: &ExtractConfig,
    progress: &mut dyn ProgressCallback,
) -> Result<ExtractionReport> {
    let start = Instant::now();
    let mut report = ExtractionReport::new();
    let mut quota = QuotaTracker::new();
    let total = entries.len();

    for (index, entry) in entries.iter().enumerate() {
        let display = Path::new(&entry.path);
        progress.on_entry_start(display, total, index + 1);

        let safe = resolve(&entry.path, dest, config)?;
        let bytes = entry.materialized();
        quota.record_file(bytes.len() as u64, config)?;

        let target = dest.join(&safe);
        write::check_target(&target, &entry.path, config.overwrite)?;
        write::ensure_parent(&target, &mut report)?;
        write::write_file(&target, &bytes, &mut report)?;
        debug!(path = %entry.path, bytes = bytes.len(), "wrote entry");

        progress.on_bytes_written(bytes.len() as u64);
        progress.on_entry_complete(display);
    }

    progress.on_complete();
    report.duration = start.elapsed();
    info!(
        files = report.files_extracted,
        bytes = report.bytes_written,
        dest = %dest.as_path().display(),
        "materialized archive"
    );
    Ok(report)
}
