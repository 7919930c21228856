//! File writing shared by direct and staged materialization.

use std::fs::File;
use std::fs::create_dir_all;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;

use crate::ExtractionReport;
use crate::Result;
use crate::TextpackError;
use crate::error::QuotaResource;

/// Creates the parent directories of `target`, counting the ones that did
/// not exist before.
pub(crate) fn ensure_parent(target: &Path, report: &mut ExtractionReport) -> Result<()> {
    let Some(parent) = target.parent() else {
        return Ok(());
    };
    let missing = parent
        .ancestors()
        .take_while(|dir| dir.symlink_metadata().is_err())
        .count();
    if missing > 0 {
        create_dir_all(parent)?;
        report.directories_created += missing;
    }
    Ok(())
}

/// Refuses to replace an existing file unless `overwrite` is set, and never
/// replaces a directory.
pub(crate) fn check_target(target: &Path, display: &str, overwrite: bool) -> Result<()> {
    let Ok(meta) = target.symlink_metadata() else {
        return Ok(());
    };
    if meta.is_dir() {
        return Err(TextpackError::SecurityViolation {
            reason: format!("'{display}' would replace a directory"),
        });
    }
    if !overwrite {
        return Err(TextpackError::SecurityViolation {
            reason: format!("'{display}' already exists (overwrite is disabled)"),
        });
    }
    Ok(())
}

/// Writes `bytes` to `target` and updates the report.
pub(crate) fn write_file(target: &Path, bytes: &[u8], report: &mut ExtractionReport) -> Result<()> {
    let file = File::create(target)?;
    let mut writer = BufWriter::with_capacity(64 * 1024, file);
    writer.write_all(bytes)?;
    writer.flush()?;

    report.files_extracted += 1;
    report.bytes_written = report
        .bytes_written
        .checked_add(bytes.len() as u64)
        .ok_or(TextpackError::QuotaExceeded {
            resource: QuotaResource::IntegerOverflow,
        })?;
    Ok(())
}
