//! Header lines shared by every archive generation.
//!
//! A header is a run of `#`-prefixed lines holding the embedded format
//! description (`#| ...`), metadata (`# key: value`) and the manifest block
//! (`# manifest:` followed by `#   ...` records). Anything else starting with
//! `#` is a comment.

use tracing::warn;

use crate::integrity::format_size;
use crate::types::ArchiveMetadata;
use crate::types::Manifest;
use crate::types::ManifestRecord;
use crate::types::manifest::kind_label;
use crate::types::metadata::is_valid_key;

/// Prefix of embedded format description lines.
pub const SPEC_PREFIX: &str = "#|";

/// Line that opens the manifest block.
pub const MANIFEST_HEADER: &str = "# manifest:";

/// Prefix of each manifest record.
const MANIFEST_INDENT: &str = "#   ";

/// Placeholder written for entries packed without a checksum.
pub const NO_CHECKSUM: &str = "----------------";

/// Splits text into lines on `\n`, dropping the empty piece after a final
/// newline. A `\r` before the newline is kept.
pub(crate) fn split_lines(text: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = text.split('\n').collect();
    if lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}

/// Removes a single trailing `\r`, so CRLF archives compare equal to LF ones.
pub(crate) fn trim_cr(line: &str) -> &str {
    line.strip_suffix('\r').unwrap_or(line)
}

/// Returns the first `n` lines of `data`, without decoding the rest.
///
/// Lines that are not valid UTF-8 are returned as empty strings.
pub(crate) fn leading_lines(data: &[u8], n: usize) -> Vec<&str> {
    data.split(|&b| b == b'\n')
        .take(n)
        .map(|raw| std::str::from_utf8(raw).map_or("", trim_cr))
        .collect()
}

/// Accumulates metadata and manifest records from header lines.
#[derive(Debug, Default)]
pub(crate) struct HeaderParser {
    metadata: ArchiveMetadata,
    manifest: Manifest,
    in_manifest: bool,
}

impl HeaderParser {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Feeds one header line. `line_no` is 1-based and only used in logs.
    pub(crate) fn feed(&mut self, line: &str, line_no: usize) {
        let line = trim_cr(line);

        if line.starts_with(SPEC_PREFIX) {
            return;
        }

        if line == MANIFEST_HEADER {
            self.in_manifest = true;
            return;
        }

        if self.in_manifest {
            if let Some(record) = line.strip_prefix(MANIFEST_INDENT) {
                match parse_record(record) {
                    Some(record) => self.manifest.records.push(record),
                    None => warn!(line = line_no, "skipping unreadable manifest record"),
                }
                return;
            }
            self.in_manifest = false;
        }

        if let Some((key, value)) = parse_metadata(line) {
            self.metadata.set(key, value.to_string());
        }
    }

    pub(crate) fn finish(self) -> (ArchiveMetadata, Manifest) {
        (self.metadata, self.manifest)
    }
}

/// Parses `# key: value`. Returns `None` for comments and other lines.
pub(crate) fn parse_metadata(line: &str) -> Option<(&str, &str)> {
    let rest = line.strip_prefix("# ")?;
    let (key, value) = rest.split_once(':')?;
    if !is_valid_key(key) {
        return None;
    }
    Some((key, value.strip_prefix(' ').unwrap_or(value)))
}

/// Splits off the next whitespace-delimited token.
fn next_token(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    if s.is_empty() {
        return None;
    }
    let end = s.find(char::is_whitespace).unwrap_or(s.len());
    Some((&s[..end], &s[end..]))
}

/// Parses `<checksum> <kind> <size> <unit> <path>`.
fn parse_record(record: &str) -> Option<ManifestRecord> {
    let (checksum, rest) = next_token(record)?;
    let (kind, rest) = next_token(rest)?;
    let (amount, rest) = next_token(rest)?;
    let (unit, rest) = next_token(rest)?;
    let path = rest.strip_prefix("  ").unwrap_or_else(|| rest.trim_start());
    if path.is_empty() {
        return None;
    }

    let is_binary = match kind {
        "binary" => true,
        "text" => false,
        _ => return None,
    };
    let checksum = (checksum != NO_CHECKSUM).then(|| checksum.to_string());

    Some(ManifestRecord {
        path: path.to_string(),
        checksum,
        is_binary,
        size_label: format!("{amount} {unit}"),
    })
}

/// Appends the embedded description, one `#|` line per source line.
pub(crate) fn write_spec(out: &mut String, spec: &str) {
    for line in spec.lines() {
        if line.is_empty() {
            out.push_str(SPEC_PREFIX);
        } else {
            out.push_str(SPEC_PREFIX);
            out.push(' ');
            out.push_str(line);
        }
        out.push('\n');
    }
    out.push_str("#\n");
}

/// Appends `# key: value` lines. Line breaks inside values become spaces.
pub(crate) fn write_metadata(out: &mut String, metadata: &ArchiveMetadata) {
    let pairs = metadata.pairs();
    if pairs.is_empty() {
        return;
    }
    for (key, value) in pairs {
        let value = value.replace(['\r', '\n'], " ");
        out.push_str(&format!("# {key}: {value}\n"));
    }
    out.push_str("#\n");
}

/// Appends the manifest block.
pub(crate) fn write_manifest(out: &mut String, manifest: &Manifest) {
    if manifest.is_empty() {
        return;
    }
    out.push_str(MANIFEST_HEADER);
    out.push('\n');
    for record in &manifest.records {
        let checksum = record.checksum.as_deref().unwrap_or(NO_CHECKSUM);
        out.push_str(&format!(
            "{MANIFEST_INDENT}{checksum}  {:<6}  {:>10}  {}\n",
            kind_label(record.is_binary),
            record.size_label,
            record.path
        ));
    }
    out.push_str("#\n");
}

/// Builds the `total_size` label for a set of entry sizes.
pub(crate) fn total_size_label(sizes: impl Iterator<Item = u64>) -> String {
    format_size(sizes.fold(0u64, u64::saturating_add))
}
