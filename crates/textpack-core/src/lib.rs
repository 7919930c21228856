//! Self-documenting text archive format.
//!
//! `textpack-core` packs a set of files into a single plain-text archive
//! carrying metadata, a checksum manifest and a description of the format
//! itself. Archives can be wrapped in a gzip layer and in a password-based
//! AES-256-GCM layer. Reading peels whatever layers are present and accepts
//! both the current and the legacy archive generation.
//!
//! Entry paths from an archive are untrusted. Every write goes through the
//! path guard in [`security`], which rejects absolute paths, `..` segments
//! and symlink escapes.
//!
//! # Examples
//!
//! ```no_run
//! use textpack_core::creation::{CollectConfig, collect_sources};
//! use textpack_core::types::ArchiveMetadata;
//! use textpack_core::{ExtractConfig, PackOptions, ReadOptions, extract_archive, pack};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let files = collect_sources(&["src"], &CollectConfig::default())?;
//! let bytes = pack(&files, &ArchiveMetadata::new().with_name("src"), &PackOptions::default())?;
//! std::fs::write("src.textpack", bytes)?;
//!
//! let report = extract_archive(
//!     "src.textpack",
//!     "/tmp/output",
//!     &ReadOptions::default(),
//!     &ExtractConfig::default(),
//! )?;
//! println!("Extracted {} files", report.files_extracted);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod creation;
pub mod error;
pub mod formats;
pub mod integrity;
pub mod layers;
pub mod materialize;
pub mod reader;
pub mod report;
pub mod security;
pub mod types;

/// Built-in description of the archive format, embedded in packed archives
/// by default.
pub const FORMAT_SPEC: &str = include_str!("../FORMAT.md");

pub use api::extract_archive;
pub use api::extract_archive_staged;
pub use api::pack;
pub use api::read_archive_file;
pub use config::ExtractConfig;
pub use config::PackOptions;
pub use config::ReadOptions;
pub use error::QuotaResource;
pub use error::Result;
pub use error::TextpackError;
pub use reader::ParsedArchive;
pub use reader::read_archive;
pub use report::ExtractionReport;
pub use report::NoopProgress;
pub use report::ProgressCallback;
pub use report::VerificationReport;

pub use types::DestDir;
pub use types::Entry;
pub use types::SafePath;
