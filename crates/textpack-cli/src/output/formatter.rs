//! Output formatter trait for CLI results.

use anyhow::Result;
use serde::Serialize;
use std::path::Path;
use textpack_core::ExtractionReport;
use textpack_core::ParsedArchive;
use textpack_core::VerificationReport;
use textpack_core::reader::ChecksumMismatch;

/// What `pack` produced.
#[derive(Debug, Clone)]
pub struct PackSummary {
    pub files: usize,
    pub content_bytes: u64,
    pub archive_bytes: u64,
    pub compressed: bool,
    pub encrypted: bool,
}

/// What `verify` found.
#[derive(Debug, Clone, Default)]
pub struct VerifySummary {
    pub entries: usize,
    pub warnings: Vec<String>,
    pub mismatches: Vec<ChecksumMismatch>,
    pub on_disk: Option<VerificationReport>,
}

impl VerifySummary {
    /// Returns `true` if no checksum or on-disk comparison failed.
    pub fn passed(&self) -> bool {
        self.mismatches.is_empty() && self.on_disk.as_ref().is_none_or(VerificationReport::is_success)
    }
}

/// Common output formatter trait
pub trait OutputFormatter {
    /// Format pack result
    fn format_pack_result(&self, output_path: &Path, summary: &PackSummary) -> Result<()>;

    /// Format extraction result
    fn format_extraction_result(&self, report: &ExtractionReport) -> Result<()>;

    /// Format archive contents
    fn format_listing(&self, archive: &ParsedArchive, long: bool, human_readable: bool)
    -> Result<()>;

    /// Format verification result
    fn format_verification(&self, summary: &VerifySummary) -> Result<()>;

    /// Format warning message
    fn format_warning(&self, message: &str);
}

/// Generic JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput<T> {
    pub operation: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Failure,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn success(operation: impl Into<String>, data: T) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Success,
            data: Some(data),
        }
    }

    pub fn failure(operation: impl Into<String>, data: T) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Failure,
            data: Some(data),
        }
    }
}
