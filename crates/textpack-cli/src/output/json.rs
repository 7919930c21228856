//! JSON output formatter for machine-readable results.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use super::formatter::PackSummary;
use super::formatter::VerifySummary;
use anyhow::Result;
use serde::Serialize;
use std::io::Write;
use std::io::{self};
use std::path::Path;
use textpack_core::ExtractionReport;
use textpack_core::ParsedArchive;
use textpack_core::report::FileStatus;

pub struct JsonFormatter;

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}

#[derive(Serialize)]
struct EntryOutput<'a> {
    path: &'a str,
    kind: &'static str,
    size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    checksum: Option<&'a str>,
}

#[derive(Serialize)]
struct ListingOutput<'a> {
    generation: &'static str,
    layers: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    created_at: Option<&'a str>,
    total_entries: usize,
    total_size: u64,
    entries: Vec<EntryOutput<'a>>,
    warnings: &'a [String],
}

#[derive(Serialize)]
struct MismatchOutput<'a> {
    path: &'a str,
    expected: &'a str,
    actual: &'a str,
}

#[derive(Serialize)]
struct FileCheckOutput<'a> {
    path: &'a str,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

#[derive(Serialize)]
struct VerificationOutput<'a> {
    entries: usize,
    warnings: &'a [String],
    checksum_mismatches: Vec<MismatchOutput<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    files: Option<Vec<FileCheckOutput<'a>>>,
}

fn status_parts(status: &FileStatus) -> (&'static str, Option<String>) {
    match status {
        FileStatus::Match => ("match", None),
        FileStatus::Mismatch {
            expected_len,
            actual_len,
        } => (
            "mismatch",
            Some(format!("expected {expected_len} bytes, found {actual_len}")),
        ),
        FileStatus::Missing => ("missing", None),
        FileStatus::Unsafe(reason) => ("unsafe", Some(reason.clone())),
        FileStatus::Unreadable(reason) => ("unreadable", Some(reason.clone())),
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_pack_result(&self, output_path: &Path, summary: &PackSummary) -> Result<()> {
        #[derive(Serialize)]
        struct PackOutput {
            output_path: String,
            files_added: usize,
            content_bytes: u64,
            archive_bytes: u64,
            compressed: bool,
            encrypted: bool,
        }

        let data = PackOutput {
            output_path: output_path.display().to_string(),
            files_added: summary.files,
            content_bytes: summary.content_bytes,
            archive_bytes: summary.archive_bytes,
            compressed: summary.compressed,
            encrypted: summary.encrypted,
        };

        Self::output(&JsonOutput::success("pack", data))
    }

    fn format_extraction_result(&self, report: &ExtractionReport) -> Result<()> {
        #[derive(Serialize)]
        struct ExtractionOutput<'a> {
            files_extracted: usize,
            directories_created: usize,
            bytes_written: u64,
            files_skipped: usize,
            duration_ms: u128,
            warnings: &'a [String],
        }

        let data = ExtractionOutput {
            files_extracted: report.files_extracted,
            directories_created: report.directories_created,
            bytes_written: report.bytes_written,
            files_skipped: report.files_skipped,
            duration_ms: report.duration.as_millis(),
            warnings: &report.warnings,
        };

        Self::output(&JsonOutput::success("extract", data))
    }

    fn format_listing(
        &self,
        archive: &ParsedArchive,
        _long: bool,
        _human_readable: bool,
    ) -> Result<()> {
        let data = ListingOutput {
            generation: archive.generation.name(),
            layers: archive.layers.iter().map(|l| l.name()).collect(),
            name: archive.metadata.name.as_deref(),
            description: archive.metadata.description.as_deref(),
            created_at: archive.metadata.created_at.as_deref(),
            total_entries: archive.entries.len(),
            total_size: archive.total_size(),
            entries: archive
                .entries
                .iter()
                .map(|e| EntryOutput {
                    path: &e.path,
                    kind: if e.is_binary() { "binary" } else { "text" },
                    size: e.size,
                    checksum: e.checksum.as_deref(),
                })
                .collect(),
            warnings: &archive.warnings,
        };

        Self::output(&JsonOutput::success("list", data))
    }

    fn format_verification(&self, summary: &VerifySummary) -> Result<()> {
        let data = VerificationOutput {
            entries: summary.entries,
            warnings: &summary.warnings,
            checksum_mismatches: summary
                .mismatches
                .iter()
                .map(|m| MismatchOutput {
                    path: &m.path,
                    expected: &m.expected,
                    actual: &m.actual,
                })
                .collect(),
            files: summary.on_disk.as_ref().map(|report| {
                report
                    .files
                    .iter()
                    .map(|check| {
                        let (status, detail) = status_parts(&check.status);
                        FileCheckOutput {
                            path: &check.path,
                            status,
                            detail,
                        }
                    })
                    .collect()
            }),
        };

        if summary.passed() {
            Self::output(&JsonOutput::success("verify", data))
        } else {
            Self::output(&JsonOutput::failure("verify", data))
        }
    }

    fn format_warning(&self, message: &str) {
        #[derive(Serialize)]
        struct WarningData {
            message: String,
        }

        let output = JsonOutput::success(
            "warning",
            WarningData {
                message: message.to_string(),
            },
        );
        let _ = Self::output(&output);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parts() {
        assert_eq!(status_parts(&FileStatus::Match), ("match", None));
        let (status, detail) = status_parts(&FileStatus::Mismatch {
            expected_len: 3,
            actual_len: 5,
        });
        assert_eq!(status, "mismatch");
        assert!(detail.unwrap().contains("expected 3 bytes"));
    }

    #[test]
    fn test_entry_output_skips_missing_checksum() {
        let entry = EntryOutput {
            path: "a.txt",
            kind: "text",
            size: 3,
            checksum: None,
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"path\":\"a.txt\""));
        assert!(!json.contains("checksum"));
    }
}
