//! Reader facade: peels layers, then dispatches to a codec.

use std::borrow::Cow;
use std::collections::BTreeSet;

use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::ReadOptions;
use crate::Result;
use crate::TextpackError;
use crate::formats;
use crate::formats::Generation;
use crate::integrity;
use crate::layers::LayerKind;
use crate::layers::compression;
use crate::layers::encryption;
use crate::types::ArchiveMetadata;
use crate::types::Entry;
use crate::types::Manifest;

/// An entry whose recorded checksum disagrees with its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksumMismatch {
    /// Entry path.
    pub path: String,
    /// Checksum recorded in the manifest.
    pub expected: String,
    /// Checksum of the materialized content.
    pub actual: String,
}

/// A fully decoded archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedArchive {
    /// Header metadata.
    pub metadata: ArchiveMetadata,
    /// Manifest as recorded in the header.
    pub manifest: Manifest,
    /// Entries in body order.
    pub entries: Vec<Entry>,
    /// Codec generation that parsed the body.
    pub generation: Generation,
    /// Layers that were peeled, outermost first.
    pub layers: Vec<LayerKind>,
    /// Non-fatal problems found while reading.
    pub warnings: Vec<String>,
}

impl ParsedArchive {
    /// Returns `true` if the archive was wrapped in the encrypted layer.
    #[must_use]
    pub fn is_encrypted(&self) -> bool {
        self.layers.contains(&LayerKind::Encrypted)
    }

    /// Returns `true` if the archive was wrapped in the compressed layer.
    #[must_use]
    pub fn is_compressed(&self) -> bool {
        self.layers.contains(&LayerKind::Compressed)
    }

    /// Sum of entry sizes in bytes.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.entries.iter().map(|e| e.size).fold(0, u64::saturating_add)
    }

    /// Looks up an entry by path. The last entry wins on duplicates.
    #[must_use]
    pub fn entry(&self, path: &str) -> Option<&Entry> {
        self.entries.iter().rev().find(|e| e.path == path)
    }

    /// Compares every recorded checksum with the entry's content.
    ///
    /// Entries without a checksum are skipped.
    #[must_use]
    pub fn checksum_mismatches(&self) -> Vec<ChecksumMismatch> {
        self.entries
            .iter()
            .filter_map(|entry| {
                let expected = entry.checksum.as_ref()?;
                let actual = integrity::short_checksum(&entry.materialized());
                (!expected.eq_ignore_ascii_case(&actual)).then(|| ChecksumMismatch {
                    path: entry.path.clone(),
                    expected: expected.clone(),
                    actual,
                })
            })
            .collect()
    }
}

/// Decodes raw archive bytes.
///
/// Layers are peeled in a fixed order: encrypted, then compressed. The
/// remaining bytes go through the codec cascade.
///
/// # Errors
///
/// - `PasswordRequired` if the archive is encrypted and `opts` has no
///   password
/// - any layer error (`IntegrityError`, `WrongPasswordOrCorrupt`, ...)
/// - `UnrecognizedFormat` if no codec marker matches
/// - `MalformedArchive` if the matching codec fails
///
/// # Examples
///
/// ```
/// use textpack_core::{ReadOptions, read_archive};
///
/// let parsed = read_archive(
///     b"# TEXTPACK ARCHIVE v2\n\n=== hello.txt ===\nhi\n=== END hello.txt ===\n",
///     &ReadOptions::default(),
/// )
/// .unwrap();
/// assert_eq!(parsed.entries[0].content.as_bytes(), b"hi\n");
/// ```
pub fn read_archive(data: &[u8], opts: &ReadOptions) -> Result<ParsedArchive> {
    let limit = opts.payload_limit();
    let mut layers = Vec::new();
    let mut current: Cow<'_, [u8]> = Cow::Borrowed(data);

    if encryption::detect(&current) {
        let password = opts
            .password
            .as_deref()
            .ok_or(TextpackError::PasswordRequired)?;
        current = Cow::Owned(encryption::unwrap_with_limit(&current, password, limit)?);
        layers.push(LayerKind::Encrypted);
        debug!("peeled encrypted layer");
    }

    if compression::detect(&current) {
        current = Cow::Owned(compression::unwrap_with_limit(&current, limit)?);
        layers.push(LayerKind::Compressed);
        debug!("peeled compressed layer");
    }

    let (generation, body) = formats::decode(&current)?;

    let mut warnings = body.manifest.disagreements(&body.entries);
    warnings.extend(duplicate_paths(&body.entries));
    for warning in &warnings {
        warn!("{warning}");
    }

    info!(
        entries = body.entries.len(),
        %generation,
        layers = layers.len(),
        "read archive"
    );

    Ok(ParsedArchive {
        metadata: body.metadata,
        manifest: body.manifest,
        entries: body.entries,
        generation,
        layers,
        warnings,
    })
}

fn duplicate_paths(entries: &[Entry]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut reported = BTreeSet::new();
    let mut warnings = Vec::new();
    for entry in entries {
        if !seen.insert(entry.path.as_str()) && reported.insert(entry.path.as_str()) {
            warnings.push(format!(
                "entry '{}' appears more than once; the last copy wins",
                entry.path
            ));
        }
    }
    warnings
}
