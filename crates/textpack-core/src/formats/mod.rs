//! Archive codecs and format detection.
//!
//! Each archive generation is an [`ArchiveCodec`]. [`decode`] walks an
//! ordered list of codecs, current first, and hands the input to the first
//! one whose marker matches. Supporting a new generation means adding one
//! entry to that list.

pub mod current;
pub(crate) mod header;
pub mod legacy;

pub use current::CurrentCodec;
pub use legacy::LegacyCodec;

use tracing::debug;

use crate::Result;
use crate::TextpackError;
use crate::types::ArchiveMetadata;
use crate::types::Entry;
use crate::types::Manifest;

/// Archive format generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Generation {
    /// Delimited text blocks, written by this crate.
    Current,
    /// Self-extracting shell script, read only.
    Legacy,
}

impl Generation {
    /// Returns a short display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Current => "textpack v2",
            Self::Legacy => "textpack v1 (self-extracting)",
        }
    }
}

impl std::fmt::Display for Generation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of parsing an archive body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedBody {
    /// Header metadata.
    pub metadata: ArchiveMetadata,
    /// Manifest as recorded in the header, possibly empty.
    pub manifest: Manifest,
    /// Entries in body order.
    pub entries: Vec<Entry>,
}

/// A codec for one archive generation.
pub trait ArchiveCodec {
    /// Returns the generation this codec handles.
    fn generation(&self) -> Generation;

    /// Returns `true` if `data` carries this generation's marker.
    ///
    /// Detection only looks at leading lines and never fails.
    fn detect(&self, data: &[u8]) -> bool;

    /// Parses a complete archive of this generation.
    ///
    /// # Errors
    ///
    /// Returns `MalformedArchive` if the input is structurally broken.
    fn parse(&self, data: &[u8]) -> Result<ParsedBody>;
}

/// Codecs in detection order.
const CODECS: &[&(dyn ArchiveCodec + Sync)] = &[&CurrentCodec, &LegacyCodec];

/// Detects the generation of `data` without parsing it.
#[must_use]
pub fn detect(data: &[u8]) -> Option<Generation> {
    CODECS
        .iter()
        .find(|codec| codec.detect(data))
        .map(|codec| codec.generation())
}

/// Parses `data` with the first codec whose marker matches.
///
/// # Errors
///
/// Returns `UnrecognizedFormat` when no codec matches, or the matching
/// codec's parse error.
///
/// # Examples
///
/// ```
/// use textpack_core::formats::{self, Generation};
///
/// let (generation, body) = formats::decode(b"# TEXTPACK ARCHIVE v2\n").unwrap();
/// assert_eq!(generation, Generation::Current);
/// assert!(body.entries.is_empty());
///
/// assert!(formats::decode(b"plain text").is_err());
/// ```
pub fn decode(data: &[u8]) -> Result<(Generation, ParsedBody)> {
    let codec = CODECS
        .iter()
        .find(|codec| codec.detect(data))
        .ok_or(TextpackError::UnrecognizedFormat)?;
    debug!(generation = %codec.generation(), "format detected");
    let body = codec.parse(data)?;
    Ok((codec.generation(), body))
}
