//! High-level public API for packing and extracting archives.

use std::collections::BTreeSet;
use std::path::Path;

use tracing::debug;
use tracing::info;

use crate::ExtractConfig;
use crate::ExtractionReport;
use crate::NoopProgress;
use crate::PackOptions;
use crate::ReadOptions;
use crate::Result;
use crate::TextpackError;
use crate::formats::current;
use crate::formats::header;
use crate::layers::compression;
use crate::layers::encryption;
use crate::materialize;
use crate::reader::ParsedArchive;
use crate::reader::read_archive;
use crate::types::ArchiveMetadata;
use crate::types::DestDir;
use crate::types::Entry;
use crate::types::SourceFile;

/// Packs source files into archive bytes.
///
/// Each file is classified as text or binary, sized and (unless
/// `no_checksum` is set) checksummed. Metadata fields `file_count`,
/// `total_size` and `created_at` are filled in when the caller left them
/// unset. The serialized archive is then wrapped in the compressed layer if
/// `compress` is set, and in the encrypted layer if a password is given.
/// With both, the compressed archive ends up inside the encrypted one.
///
/// # Errors
///
/// Returns `InvalidEntry` if a path is empty, contains a line break, or
/// appears twice, and `InvalidOption` if the iteration count is out of
/// range. Layer errors are propagated.
///
/// # Examples
///
/// ```
/// use textpack_core::types::{ArchiveMetadata, SourceFile};
/// use textpack_core::{PackOptions, ReadOptions, pack, read_archive};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let files = vec![SourceFile::new("hello.txt", "hi\n")];
/// let opts = PackOptions::default().with_created_at("2026-01-01T00:00:00Z");
/// let bytes = pack(&files, &ArchiveMetadata::new().with_name("demo"), &opts)?;
///
/// let parsed = read_archive(&bytes, &ReadOptions::default())?;
/// assert_eq!(parsed.metadata.file_count, Some(1));
/// assert_eq!(parsed.entries[0].content.as_bytes(), b"hi\n");
/// # Ok(())
/// # }
/// ```
pub fn pack(files: &[SourceFile], metadata: &ArchiveMetadata, opts: &PackOptions) -> Result<Vec<u8>> {
    validate_paths(files)?;

    let entries: Vec<Entry> = files
        .iter()
        .map(|file| {
            let entry = Entry::from_bytes(file.path.clone(), file.data.clone());
            if opts.no_checksum {
                entry
            } else {
                entry.with_checksum()
            }
        })
        .collect();

    let mut metadata = metadata.clone();
    metadata.file_count.get_or_insert(entries.len());
    if metadata.total_size.is_none() {
        metadata.total_size = Some(header::total_size_label(entries.iter().map(|e| e.size)));
    }
    if metadata.created_at.is_none() {
        metadata.created_at = Some(
            opts.created_at
                .clone()
                .unwrap_or_else(|| chrono::Utc::now().to_rfc3339()),
        );
    }

    let mut bytes = current::serialize(&entries, &metadata, opts.spec.as_deref());
    debug!(entries = entries.len(), size = bytes.len(), "serialized archive");

    if opts.compress {
        bytes = compression::wrap(&bytes)?;
    }
    if let Some(password) = opts.password.as_deref() {
        bytes = encryption::wrap_with_iterations(&bytes, password, opts.iterations)?;
    }

    info!(
        files = entries.len(),
        size = bytes.len(),
        compressed = opts.compress,
        encrypted = opts.password.is_some(),
        "packed archive"
    );
    Ok(bytes)
}

fn validate_paths(files: &[SourceFile]) -> Result<()> {
    let mut seen = BTreeSet::new();
    for file in files {
        let reason = if file.path.is_empty() {
            Some("path is empty")
        } else if file.path.contains(['\n', '\r']) {
            Some("path contains a line break")
        } else if !seen.insert(file.path.as_str()) {
            Some("path appears more than once")
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(TextpackError::InvalidEntry {
                path: file.path.clone(),
                reason: reason.to_string(),
            });
        }
    }
    Ok(())
}

/// Reads and parses an archive file, peeling any layers.
///
/// # Errors
///
/// Returns `Io` if the file cannot be read, otherwise the errors of
/// [`read_archive`].
///
/// # Examples
///
/// ```no_run
/// use textpack_core::{ReadOptions, read_archive_file};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let parsed = read_archive_file("bundle.txt", &ReadOptions::default())?;
/// for entry in &parsed.entries {
///     println!("{} ({} bytes)", entry.path, entry.size);
/// }
/// # Ok(())
/// # }
/// ```
pub fn read_archive_file<P: AsRef<Path>>(path: P, opts: &ReadOptions) -> Result<ParsedArchive> {
    let data = std::fs::read(path.as_ref())?;
    read_archive(&data, opts)
}

/// Extracts an archive file into `output_dir`, creating it if needed.
///
/// Entries are written directly; if an entry fails the path guard or a
/// quota, extraction stops and earlier files stay on disk. Parse warnings
/// are copied into the report.
///
/// # Errors
///
/// Returns any read error, `PathTraversal`, `SecurityViolation`,
/// `QuotaExceeded` or `Io`.
///
/// # Examples
///
/// ```no_run
/// use textpack_core::{ExtractConfig, ReadOptions, extract_archive};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let report = extract_archive(
///     "bundle.txt",
///     "/tmp/output",
///     &ReadOptions::default(),
///     &ExtractConfig::default(),
/// )?;
/// println!("Extracted {} files", report.files_extracted);
/// # Ok(())
/// # }
/// ```
pub fn extract_archive<P: AsRef<Path>, Q: AsRef<Path>>(
    archive_path: P,
    output_dir: Q,
    opts: &ReadOptions,
    config: &ExtractConfig,
) -> Result<ExtractionReport> {
    let parsed = read_archive_file(archive_path, opts)?;
    let dest = DestDir::create(output_dir.as_ref())?;
    let mut report = materialize::apply(&parsed.entries, &dest, config, &mut NoopProgress)?;
    report.warnings.splice(0..0, parsed.warnings);
    Ok(report)
}

/// Like [`extract_archive`], but writes through a scratch directory first.
///
/// A failing entry leaves `output_dir` untouched.
///
/// # Errors
///
/// Same as [`extract_archive`].
pub fn extract_archive_staged<P: AsRef<Path>, Q: AsRef<Path>>(
    archive_path: P,
    output_dir: Q,
    opts: &ReadOptions,
    config: &ExtractConfig,
) -> Result<ExtractionReport> {
    let parsed = read_archive_file(archive_path, opts)?;
    let dest = DestDir::create(output_dir.as_ref())?;
    let mut report = materialize::apply_staged(&parsed.entries, &dest, config, &mut NoopProgress)?;
    report.warnings.splice(0..0, parsed.warnings);
    Ok(report)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::layers::LayerKind;
    use std::fs;
    use tempfile::TempDir;

    fn opts() -> PackOptions {
        PackOptions::default()
            .with_spec(None)
            .with_created_at("2026-10-18T00:00:00Z")
            .with_iterations(1_000)
    }

    #[test]
    fn test_pack_fills_metadata() {
        let files = vec![SourceFile::new("a.txt", "abc"), SourceFile::new("b.bin", vec![0u8; 4])];
        let bytes = pack(&files, &ArchiveMetadata::new(), &opts()).unwrap();
        let parsed = read_archive(&bytes, &ReadOptions::new()).unwrap();

        assert_eq!(parsed.metadata.file_count, Some(2));
        assert_eq!(parsed.metadata.total_size.as_deref(), Some("7 B"));
        assert_eq!(parsed.metadata.created_at.as_deref(), Some("2026-10-18T00:00:00Z"));
        assert!(parsed.entries[1].is_binary());
        assert!(parsed.entries.iter().all(|e| e.checksum.is_some()));
    }

    #[test]
    fn test_pack_keeps_caller_metadata() {
        let mut meta = ArchiveMetadata::new();
        meta.created_at = Some("fixed".to_string());
        meta.file_count = Some(99);
        let bytes = pack(&[SourceFile::new("a", "x")], &meta, &opts()).unwrap();
        let parsed = read_archive(&bytes, &ReadOptions::new()).unwrap();

        assert_eq!(parsed.metadata.created_at.as_deref(), Some("fixed"));
        assert_eq!(parsed.metadata.file_count, Some(99));
    }

    #[test]
    fn test_pack_is_deterministic_with_pinned_time() {
        let files = vec![SourceFile::new("a.txt", "abc\n")];
        let first = pack(&files, &ArchiveMetadata::new(), &opts().with_compress(true)).unwrap();
        let second = pack(&files, &ArchiveMetadata::new(), &opts().with_compress(true)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_pack_no_checksum() {
        let bytes = pack(
            &[SourceFile::new("a.txt", "abc")],
            &ArchiveMetadata::new(),
            &opts().with_no_checksum(true),
        )
        .unwrap();
        let parsed = read_archive(&bytes, &ReadOptions::new()).unwrap();
        assert_eq!(parsed.entries[0].checksum, None);
    }

    #[test]
    fn test_pack_layers() {
        let files = vec![SourceFile::new("a.txt", "abc\n")];
        let bytes = pack(
            &files,
            &ArchiveMetadata::new(),
            &opts().with_compress(true).with_password("pw"),
        )
        .unwrap();
        assert!(encryption::detect(&bytes));

        let parsed = read_archive(&bytes, &ReadOptions::new().with_password("pw")).unwrap();
        assert_eq!(parsed.layers, vec![LayerKind::Encrypted, LayerKind::Compressed]);
        assert_eq!(parsed.entries[0].content.as_bytes(), b"abc\n");
    }

    #[test]
    fn test_pack_rejects_bad_paths() {
        for files in [
            vec![SourceFile::new("", "x")],
            vec![SourceFile::new("a\nb", "x")],
            vec![SourceFile::new("a", "x"), SourceFile::new("a", "y")],
        ] {
            let result = pack(&files, &ArchiveMetadata::new(), &opts());
            assert!(matches!(result, Err(TextpackError::InvalidEntry { .. })));
        }
    }

    #[test]
    fn test_pack_rejects_bad_iterations() {
        let result = pack(
            &[SourceFile::new("a", "x")],
            &ArchiveMetadata::new(),
            &opts().with_password("pw").with_iterations(0),
        );
        assert!(matches!(result, Err(TextpackError::InvalidOption(_))));
    }

    #[test]
    fn test_extract_archive() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("bundle.txt");
        let bytes = pack(
            &[SourceFile::new("dir/a.txt", "abc"), SourceFile::new("b.bin", vec![0u8, 1])],
            &ArchiveMetadata::new(),
            &opts(),
        )
        .unwrap();
        fs::write(&archive, bytes).unwrap();

        let out = temp.path().join("out");
        let report =
            extract_archive(&archive, &out, &ReadOptions::new(), &ExtractConfig::default()).unwrap();

        assert_eq!(report.files_extracted, 2);
        assert_eq!(fs::read(out.join("dir/a.txt")).unwrap(), b"abc\n");
        assert_eq!(fs::read(out.join("b.bin")).unwrap(), vec![0u8, 1]);
    }

    #[test]
    fn test_extract_archive_staged_leaves_dest_clean_on_failure() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("evil.txt");
        fs::write(
            &archive,
            "# TEXTPACK ARCHIVE v2\n\n=== ok.txt ===\nfine\n=== END ok.txt ===\n\n\
             === ../escape.txt ===\nbad\n=== END ../escape.txt ===\n",
        )
        .unwrap();

        let out = temp.path().join("out");
        let result =
            extract_archive_staged(&archive, &out, &ReadOptions::new(), &ExtractConfig::default());

        assert!(matches!(result, Err(TextpackError::PathTraversal { .. })));
        assert!(!out.join("ok.txt").exists());
        assert!(!temp.path().join("escape.txt").exists());
    }
}
