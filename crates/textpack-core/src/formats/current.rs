//! Current archive generation: delimited text blocks.
//!
//! ```text
//! # TEXTPACK ARCHIVE v2
//! # name: demo
//! #
//! # manifest:
//! #   2d711642b726b044  text           3 B  hello.txt
//! #
//!
//! === hello.txt ===
//! hi
//! === END hello.txt ===
//!
//! ```

use std::borrow::Cow;

use tracing::debug;

use super::ArchiveCodec;
use super::Generation;
use super::ParsedBody;
use super::header;
use super::header::HeaderParser;
use crate::Result;
use crate::TextpackError;
use crate::integrity;
use crate::types::ArchiveMetadata;
use crate::types::Entry;
use crate::types::EntryContent;
use crate::types::Manifest;

/// First line of every current-generation archive.
pub const MARKER: &str = "# TEXTPACK ARCHIVE v2";

const START_PREFIX: &str = "=== ";
const START_SUFFIX: &str = " ===";
const BINARY_SUFFIX: &str = " === [binary]";

/// Codec for the current generation.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurrentCodec;

impl ArchiveCodec for CurrentCodec {
    fn generation(&self) -> Generation {
        Generation::Current
    }

    fn detect(&self, data: &[u8]) -> bool {
        detect(data)
    }

    fn parse(&self, data: &[u8]) -> Result<ParsedBody> {
        parse(data)
    }
}

/// Returns `true` if the first line is the current marker.
#[must_use]
pub fn detect(data: &[u8]) -> bool {
    header::leading_lines(data, 1).first() == Some(&MARKER)
}

fn start_line(path: &str, is_binary: bool) -> String {
    if is_binary {
        format!("{START_PREFIX}{path}{BINARY_SUFFIX}")
    } else {
        format!("{START_PREFIX}{path}{START_SUFFIX}")
    }
}

fn end_line(path: &str) -> String {
    format!("=== END {path} ===")
}

/// Parses a start delimiter into `(path, is_binary)`.
fn parse_start(line: &str) -> Option<(&str, bool)> {
    let inner = line.strip_prefix(START_PREFIX)?;
    if let Some(path) = inner.strip_suffix(BINARY_SUFFIX) {
        return Some((path, true));
    }
    inner.strip_suffix(START_SUFFIX).map(|path| (path, false))
}

/// Text with its single trailing newline removed, as stored in a block.
fn block_body(text: &str) -> &str {
    text.strip_suffix('\n').unwrap_or(text)
}

/// Forces text entries that contain their own end delimiter to binary.
///
/// Such text cannot be stored verbatim without ending the block early.
fn prepare(entry: &Entry) -> Cow<'_, Entry> {
    if let EntryContent::Text(text) = &entry.content {
        let end = end_line(&entry.path);
        if block_body(text)
            .split('\n')
            .any(|line| header::trim_cr(line) == end)
        {
            debug!(path = %entry.path, "text contains its end delimiter, storing as binary");
            return Cow::Owned(entry.clone().into_binary());
        }
    }
    Cow::Borrowed(entry)
}

/// Serializes entries into a current-generation archive.
///
/// `spec`, when present, is embedded as `#|` lines right after the marker.
/// Entries are written in the order given.
///
/// # Examples
///
/// ```
/// use textpack_core::formats::current;
/// use textpack_core::types::ArchiveMetadata;
/// use textpack_core::types::Entry;
///
/// let entries = vec![Entry::text("hello.txt", "hi\n")];
/// let bytes = current::serialize(&entries, &ArchiveMetadata::new(), None);
/// let text = String::from_utf8(bytes).unwrap();
///
/// assert!(text.starts_with("# TEXTPACK ARCHIVE v2\n"));
/// assert!(text.contains("=== hello.txt ===\nhi\n=== END hello.txt ===\n"));
/// ```
#[must_use]
pub fn serialize(entries: &[Entry], metadata: &ArchiveMetadata, spec: Option<&str>) -> Vec<u8> {
    let prepared: Vec<Cow<'_, Entry>> = entries.iter().map(prepare).collect();
    let manifest = Manifest::from_entries(prepared.iter().map(|e| &**e));

    let mut out = String::new();
    out.push_str(MARKER);
    out.push('\n');
    if let Some(spec) = spec {
        header::write_spec(&mut out, spec);
    }
    header::write_metadata(&mut out, metadata);
    header::write_manifest(&mut out, &manifest);
    out.push('\n');

    for entry in &prepared {
        out.push_str(&start_line(&entry.path, entry.is_binary()));
        out.push('\n');
        match &entry.content {
            EntryContent::Text(text) if text.is_empty() => {}
            EntryContent::Text(text) => {
                out.push_str(block_body(text));
                out.push('\n');
            }
            EntryContent::Binary(data) => out.push_str(&integrity::encode_wrapped(data)),
        }
        out.push_str(&end_line(&entry.path));
        out.push_str("\n\n");
    }

    out.into_bytes()
}

/// Parses a current-generation archive.
///
/// Checksums from the manifest are attached to their entries but not
/// checked against content here.
///
/// # Errors
///
/// Returns `MalformedArchive` if the marker is missing, the input is not
/// UTF-8, a block has no end delimiter, a stray line appears between
/// blocks, or a binary block is not valid base64.
pub fn parse(data: &[u8]) -> Result<ParsedBody> {
    let text = std::str::from_utf8(data)
        .map_err(|e| TextpackError::malformed(format!("archive is not valid UTF-8: {e}")))?;
    let lines = header::split_lines(text);

    if lines.first().map(|l| header::trim_cr(l)) != Some(MARKER) {
        return Err(TextpackError::malformed_at(1, "missing current format marker"));
    }

    let mut header = HeaderParser::new();
    let mut idx = 1;
    while idx < lines.len() {
        let line = header::trim_cr(lines[idx]);
        if parse_start(line).is_some() {
            break;
        }
        header.feed(line, idx + 1);
        idx += 1;
    }
    let (metadata, manifest) = header.finish();
    let checksums = manifest.checksums();

    let mut entries = Vec::new();
    while idx < lines.len() {
        let line = header::trim_cr(lines[idx]);
        if line.is_empty() {
            idx += 1;
            continue;
        }

        let Some((path, is_binary)) = parse_start(line) else {
            return Err(TextpackError::malformed_at(
                idx + 1,
                "unexpected line outside an entry block",
            ));
        };
        if path.is_empty() {
            return Err(TextpackError::malformed_at(idx + 1, "entry with empty path"));
        }

        let end = end_line(path);
        let body_start = idx + 1;
        let Some(offset) = lines[body_start..]
            .iter()
            .position(|l| header::trim_cr(l) == end)
        else {
            return Err(TextpackError::malformed_at(
                idx + 1,
                format!("missing end delimiter for {path}"),
            ));
        };
        let body = &lines[body_start..body_start + offset];

        let mut entry = if is_binary {
            let data = integrity::decode_wrapped(&body.concat()).map_err(|e| {
                TextpackError::malformed_at(body_start + 1, format!("{path}: {e}"))
            })?;
            Entry::binary(path, data)
        } else if body.is_empty() {
            Entry::text(path, String::new())
        } else {
            let mut text = body.join("\n");
            text.push('\n');
            Entry::text(path, text)
        };
        entry.checksum = checksums.get(path).cloned();
        entries.push(entry);

        idx = body_start + offset + 1;
    }

    debug!(entries = entries.len(), "parsed current archive");
    Ok(ParsedBody {
        metadata,
        manifest,
        entries,
    })
}
