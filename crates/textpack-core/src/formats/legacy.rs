//! Legacy archive generation: self-extracting shell script.
//!
//! Only parsing is supported. The script itself is never executed; entries
//! are recovered from its heredoc blocks:
//!
//! ```text
//! #!/bin/sh
//! # TEXTPACK SELF-EXTRACTING ARCHIVE v1
//! # name: demo
//! # --- END OF HEADER ---
//! mkdir -p 'docs'
//! cat > 'docs/a.txt' <<'TPK_EOF_docs_a_txt'
//! hello
//! TPK_EOF_docs_a_txt
//! base64 -d > 'logo.png' <<'TPK_EOF_logo_png'
//! iVBORw0KGgo=
//! TPK_EOF_logo_png
//! ```

use tracing::debug;

use super::ArchiveCodec;
use super::Generation;
use super::ParsedBody;
use super::header;
use super::header::HeaderParser;
use crate::Result;
use crate::TextpackError;
use crate::integrity;
use crate::types::Entry;

/// Second line of every legacy archive; the first is a shebang.
pub const MARKER: &str = "# TEXTPACK SELF-EXTRACTING ARCHIVE v1";

/// Line that ends the legacy header.
pub const HEADER_SENTINEL: &str = "# --- END OF HEADER ---";

const TOKEN_PREFIX: &str = "TPK_EOF_";
const TEXT_COMMAND: &str = "cat > ";
const BINARY_COMMAND: &str = "base64 -d > ";

/// Codec for the legacy generation.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyCodec;

impl ArchiveCodec for LegacyCodec {
    fn generation(&self) -> Generation {
        Generation::Legacy
    }

    fn detect(&self, data: &[u8]) -> bool {
        detect(data)
    }

    fn parse(&self, data: &[u8]) -> Result<ParsedBody> {
        parse(data)
    }
}

/// Returns `true` for a shebang line followed by the legacy marker.
#[must_use]
pub fn detect(data: &[u8]) -> bool {
    let lines = header::leading_lines(data, 2);
    lines.len() == 2 && lines[0].starts_with("#!") && lines[1] == MARKER
}

/// Derives the heredoc terminator for `path`.
///
/// # Examples
///
/// ```
/// use textpack_core::formats::legacy::terminator_for;
///
/// assert_eq!(terminator_for("docs/a.txt"), "TPK_EOF_docs_a_txt");
/// ```
#[must_use]
pub fn terminator_for(path: &str) -> String {
    let mangled: String = path
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | '.') { '_' } else { c })
        .collect();
    format!("{TOKEN_PREFIX}{mangled}")
}

/// Reads one POSIX shell word built from single-quoted runs and `\'`.
///
/// Returns the unquoted word and the remaining input.
fn parse_quoted(input: &str) -> Option<(String, &str)> {
    let mut word = String::new();
    let mut rest = input;
    let mut consumed = false;
    loop {
        if let Some(after) = rest.strip_prefix('\'') {
            let close = after.find('\'')?;
            word.push_str(&after[..close]);
            rest = &after[close + 1..];
        } else if let Some(after) = rest.strip_prefix("\\'") {
            word.push('\'');
            rest = after;
        } else {
            break;
        }
        consumed = true;
    }
    consumed.then_some((word, rest))
}

/// Parses `<<'TOKEN'` or `<<TOKEN`.
fn parse_heredoc(input: &str) -> Option<&str> {
    let token = input.trim().strip_prefix("<<")?;
    let token = match token.strip_prefix('\'') {
        Some(quoted) => quoted.strip_suffix('\'')?,
        None => token,
    };
    (!token.is_empty()).then_some(token)
}

/// Parses an entry-opening line into `(path, token, is_binary)`.
///
/// Returns `Ok(None)` for lines that are not entry commands.
fn parse_opening(line: &str, line_no: usize) -> Result<Option<(String, String, bool)>> {
    let (rest, is_binary) = if let Some(rest) = line.strip_prefix(TEXT_COMMAND) {
        (rest, false)
    } else if let Some(rest) = line.strip_prefix(BINARY_COMMAND) {
        (rest, true)
    } else {
        return Ok(None);
    };

    let bad = || TextpackError::malformed_at(line_no, "unreadable entry command");
    let (path, rest) = parse_quoted(rest).ok_or_else(bad)?;
    let token = parse_heredoc(rest).ok_or_else(bad)?;
    if path.is_empty() {
        return Err(TextpackError::malformed_at(line_no, "entry with empty path"));
    }

    let expected = terminator_for(&path);
    if token != expected {
        return Err(TextpackError::malformed_at(
            line_no,
            format!("terminator {token} does not match {expected} for {path}"),
        ));
    }
    Ok(Some((path, expected, is_binary)))
}

/// Parses a legacy self-extracting archive.
///
/// Lines before [`HEADER_SENTINEL`] are header lines. After it, only
/// `cat > ...` and `base64 -d > ...` heredocs produce entries; every other
/// shell line is ignored.
///
/// # Errors
///
/// Returns `MalformedArchive` if the marker or header sentinel is missing, a
/// heredoc token does not match its path, a heredoc is unterminated, or a
/// binary body is not valid base64.
pub fn parse(data: &[u8]) -> Result<ParsedBody> {
    let text = std::str::from_utf8(data)
        .map_err(|e| TextpackError::malformed(format!("archive is not valid UTF-8: {e}")))?;
    let lines = header::split_lines(text);

    if lines.get(1).map(|l| header::trim_cr(l)) != Some(MARKER) {
        return Err(TextpackError::malformed_at(2, "missing legacy format marker"));
    }

    let mut header = HeaderParser::new();
    let mut idx = 2;
    loop {
        let Some(line) = lines.get(idx).map(|l| header::trim_cr(l)) else {
            return Err(TextpackError::malformed("missing end of header sentinel"));
        };
        idx += 1;
        if line == HEADER_SENTINEL {
            break;
        }
        header.feed(line, idx);
    }
    let (metadata, manifest) = header.finish();
    let checksums = manifest.checksums();

    let mut entries = Vec::new();
    while idx < lines.len() {
        let line = header::trim_cr(lines[idx]);
        let Some((path, token, is_binary)) = parse_opening(line, idx + 1)? else {
            idx += 1;
            continue;
        };

        let body_start = idx + 1;
        let Some(offset) = lines[body_start..]
            .iter()
            .position(|l| header::trim_cr(l) == token)
        else {
            return Err(TextpackError::malformed_at(
                idx + 1,
                format!("unterminated heredoc for {path}"),
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
        entry.checksum = checksums.get(&entry.path).cloned();
        entries.push(entry);

        idx = body_start + offset + 1;
    }

    debug!(entries = entries.len(), "parsed legacy archive");
    Ok(ParsedBody {
        metadata,
        manifest,
        entries,
    })
}
