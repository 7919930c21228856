//! Per-file manifest recorded in an archive header.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use super::Entry;
use crate::integrity::format_size;

/// One manifest line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestRecord {
    /// Entry path.
    pub path: String,
    /// Truncated checksum, `None` when the archive was packed without.
    pub checksum: Option<String>,
    /// Binary flag as recorded in the manifest.
    pub is_binary: bool,
    /// Human-readable size label, e.g. `1.5 KiB`.
    pub size_label: String,
}

/// Ordered manifest of an archive.
///
/// The manifest is documentation for human readers; the delimited body is
/// ground truth. Disagreements are reported by [`Manifest::disagreements`]
/// and never fail a parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    /// Records in header order.
    pub records: Vec<ManifestRecord>,
}

impl Manifest {
    /// Builds the manifest describing `entries`.
    #[must_use]
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a Entry>) -> Self {
        let records = entries
            .into_iter()
            .map(|entry| ManifestRecord {
                path: entry.path.clone(),
                checksum: entry.checksum.clone(),
                is_binary: entry.is_binary(),
                size_label: format_size(entry.size),
            })
            .collect();
        Self { records }
    }

    /// Returns `true` if the manifest has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Maps each path to its recorded checksum, skipping records without one.
    #[must_use]
    pub fn checksums(&self) -> BTreeMap<String, String> {
        self.records
            .iter()
            .filter_map(|r| r.checksum.clone().map(|c| (r.path.clone(), c)))
            .collect()
    }

    /// Looks up the record for `path`.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&ManifestRecord> {
        self.records.iter().find(|r| r.path == path)
    }

    /// Lists the ways this manifest disagrees with the parsed body.
    ///
    /// Only structure is compared (path sets and binary flags). Checksum
    /// values are not checked against content here.
    #[must_use]
    pub fn disagreements(&self, entries: &[Entry]) -> Vec<String> {
        if self.records.is_empty() {
            return Vec::new();
        }

        let mut warnings = Vec::new();
        let body_paths: BTreeSet<&str> = entries.iter().map(|e| e.path.as_str()).collect();

        for record in &self.records {
            if !body_paths.contains(record.path.as_str()) {
                warnings.push(format!(
                    "manifest lists '{}' but the archive body has no such entry",
                    record.path
                ));
            }
        }

        for entry in entries {
            match self.get(&entry.path) {
                None => warnings.push(format!(
                    "entry '{}' is missing from the manifest",
                    entry.path
                )),
                Some(record) if record.is_binary != entry.is_binary() => {
                    warnings.push(format!(
                        "manifest marks '{}' as {} but the body stores it as {}",
                        entry.path,
                        kind_label(record.is_binary),
                        kind_label(entry.is_binary())
                    ));
                }
                Some(_) => {}
            }
        }

        warnings
    }
}

/// Returns the manifest tag for a binary flag.
pub(crate) const fn kind_label(is_binary: bool) -> &'static str {
    if is_binary { "binary" } else { "text" }
}
