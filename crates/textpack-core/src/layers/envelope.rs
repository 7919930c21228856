//! Text envelope shared by the compressed and encrypted layers.
//!
//! ```text
//! # TEXTPACK COMPRESSED ARCHIVE
//! # <description line>
//! # key: value
//! #
//! -----BEGIN TEXTPACK PAYLOAD-----
//! <base64, 76 columns>
//! -----END TEXTPACK PAYLOAD-----
//! ```

use std::collections::BTreeMap;
use std::str::FromStr;

use crate::Result;
use crate::TextpackError;
use crate::formats::header;
use crate::integrity;

/// Begin/end lines around a base64 payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundaryPair {
    /// Line opening the payload.
    pub begin: &'static str,
    /// Line closing the payload.
    pub end: &'static str,
}

/// `key: value` fields from a layer header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerHeader {
    fields: BTreeMap<String, String>,
}

impl LayerHeader {
    /// Returns the raw value of `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Returns the value of `key` or fails with `MalformedArchive`.
    ///
    /// # Errors
    ///
    /// Returns `MalformedArchive` if the field is absent.
    pub fn require(&self, key: &str) -> Result<&str> {
        self.get(key)
            .ok_or_else(|| TextpackError::malformed(format!("layer header lacks '{key}'")))
    }

    /// Parses the value of `key`, if present.
    ///
    /// # Errors
    ///
    /// Returns `MalformedArchive` if the field is present but unparsable.
    pub fn parse<T: FromStr>(&self, key: &str) -> Result<Option<T>> {
        self.get(key)
            .map(|raw| {
                raw.trim().parse().map_err(|_| {
                    TextpackError::malformed(format!("layer header field '{key}' is invalid: {raw}"))
                })
            })
            .transpose()
    }
}

/// An opened envelope: header fields and the still-encoded payload.
#[derive(Debug)]
pub(crate) struct Envelope {
    pub(crate) header: LayerHeader,
    pub(crate) body: Vec<u8>,
}

impl Envelope {
    /// Decodes the base64 payload.
    pub(crate) fn payload(&self) -> Result<Vec<u8>> {
        integrity::decode_wrapped(&self.body)
    }
}

/// Returns `true` if `marker` is the first or second line of `data`.
///
/// The second line is allowed so a shebang or comment may come first.
pub(crate) fn has_marker(data: &[u8], marker: &str) -> bool {
    header::leading_lines(data, 2).contains(&marker)
}

/// Splits raw bytes into lines without the `\n` and a trailing `\r`.
fn byte_lines(data: &[u8]) -> Vec<&[u8]> {
    let mut lines: Vec<&[u8]> = data
        .split(|&b| b == b'\n')
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
        .collect();
    if lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}

/// Locates the payload between the first boundary pair found.
///
/// Pairs are tried in order; the first whose begin line occurs wins. Only
/// header lines must be UTF-8; body bytes go to the base64 decoder as is.
pub(crate) fn open(data: &[u8], marker: &str, pairs: &[BoundaryPair]) -> Result<Envelope> {
    let lines = byte_lines(data);

    if !lines.iter().take(2).any(|line| *line == marker.as_bytes()) {
        return Err(TextpackError::malformed_at(1, format!("missing '{marker}'")));
    }

    for pair in pairs {
        let Some(begin) = lines.iter().position(|line| *line == pair.begin.as_bytes()) else {
            continue;
        };
        let Some(len) = lines[begin + 1..]
            .iter()
            .position(|line| *line == pair.end.as_bytes())
        else {
            return Err(TextpackError::malformed_at(
                begin + 1,
                format!("'{}' has no matching '{}'", pair.begin, pair.end),
            ));
        };

        let mut fields = BTreeMap::new();
        for (idx, raw) in lines[..begin].iter().enumerate() {
            let line = std::str::from_utf8(raw).map_err(|e| {
                TextpackError::malformed_at(idx + 1, format!("header is not valid UTF-8: {e}"))
            })?;
            if let Some((key, value)) = header::parse_metadata(line) {
                fields.insert(key.to_string(), value.to_string());
            }
        }

        return Ok(Envelope {
            header: LayerHeader { fields },
            body: lines[begin + 1..begin + 1 + len].concat(),
        });
    }

    Err(TextpackError::malformed("no payload boundary found"))
}

/// Renders an envelope around `payload`.
pub(crate) fn seal(
    marker: &str,
    description: &str,
    fields: &[(&str, String)],
    pair: BoundaryPair,
    payload: &[u8],
) -> Vec<u8> {
    let mut out = String::new();
    out.push_str(marker);
    out.push('\n');
    out.push_str(&format!("# {description}\n"));
    for (key, value) in fields {
        out.push_str(&format!("# {key}: {value}\n"));
    }
    out.push_str("#\n");
    out.push_str(pair.begin);
    out.push('\n');
    out.push_str(&integrity::encode_wrapped(payload));
    out.push_str(pair.end);
    out.push('\n');
    out.into_bytes()
}
