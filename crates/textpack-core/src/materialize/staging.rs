//! Staged materialization: write to a scratch directory, then copy.
//!
//! Every entry is written to a temporary directory first. Only when all of
//! them pass the path guard and the quota is the staged tree copied into the
//! destination, so a hostile archive never leaves partial output behind.

use std::path::Component;
use std::path::Path;
use std::time::Instant;

use tracing::info;
use tracing::warn;
use walkdir::WalkDir;

use super::apply;
use super::write;
use crate::ExtractConfig;
use crate::ExtractionReport;
use crate::ProgressCallback;
use crate::Result;
use crate::TextpackError;
use crate::security::QuotaTracker;
use crate::security::resolve;
use crate::types::DestDir;
use crate::types::Entry;

const STAGING_PREFIX: &str = ".textpack-staging-";

/// Joins the components of a relative path with `/`.
fn archive_path(relative: &Path) -> Result<String> {
    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str().ok_or_else(|| {
                TextpackError::SecurityViolation {
                    reason: format!("non UTF-8 path in staging tree: {}", relative.display()),
                }
            })?),
            _ => {
                return Err(TextpackError::PathTraversal {
                    path: relative.to_path_buf(),
                });
            }
        }
    }
    Ok(parts.join("/"))
}

/// Copies every regular file under `staging` into `dest`.
///
/// Each relative path passes through the path guard again, so a staging
/// tree that was tampered with cannot escape `dest`. Symlinks are skipped
/// with a warning.
///
/// # Errors
///
/// Returns path guard, quota, overwrite and I/O errors.
pub fn copy_staged(
    staging: &Path,
    dest: &DestDir,
    config: &ExtractConfig,
) -> Result<ExtractionReport> {
    let start = Instant::now();
    let staging = staging.canonicalize()?;
    let mut report = ExtractionReport::new();
    let mut quota = QuotaTracker::new();

    for item in WalkDir::new(&staging).follow_links(false).sort_by_file_name() {
        let item = item.map_err(|e| {
            TextpackError::Io(e.into_io_error().unwrap_or_else(|| {
                std::io::Error::other("filesystem loop in staging tree")
            }))
        })?;
        let file_type = item.file_type();
        if file_type.is_dir() {
            continue;
        }

        let relative = item
            .path()
            .strip_prefix(&staging)
            .map_err(|_| TextpackError::PathTraversal {
                path: item.path().to_path_buf(),
            })?;
        let candidate = archive_path(relative)?;

        if file_type.is_symlink() {
            warn!(path = %candidate, "skipping symlink in staging tree");
            report.files_skipped += 1;
            report.add_warning(format!("skipped symlink '{candidate}'"));
            continue;
        }

        let safe = resolve(&candidate, dest, config)?;
        let bytes = std::fs::read(item.path())?;
        quota.record_file(bytes.len() as u64, config)?;

        let target = dest.join(&safe);
        write::check_target(&target, &candidate, config.overwrite)?;
        write::ensure_parent(&target, &mut report)?;
        write::write_file(&target, &bytes, &mut report)?;
    }

    report.duration = start.elapsed();
    Ok(report)
}

/// Materializes `entries` into a scratch directory inside `dest`, then
/// copies the result into `dest`.
///
/// On any failure before the copy starts, `dest` is left untouched. The
/// scratch directory is removed in every case.
///
/// # Errors
///
/// Same as [`apply`](super::apply) and [`copy_staged`].
pub fn apply_staged(
    entries: &[Entry],
    dest: &DestDir,
    config: &ExtractConfig,
    progress: &mut dyn ProgressCallback,
) -> Result<ExtractionReport> {
    let scratch = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempdir_in(dest.as_path())?;
    let staged_dest = DestDir::new(scratch.path())?;

    // Later duplicates replace earlier ones inside the scratch tree.
    let staging_config = config.clone().with_overwrite(true);
    let staged = apply(entries, &staged_dest, &staging_config, progress)?;

    let mut report = copy_staged(scratch.path(), dest, config)?;
    report.duration += staged.duration;
    scratch.close()?;

    info!(files = report.files_extracted, "staged materialization complete");
    Ok(report)
}
