//! Hashing, binary classification and base64 line wrapping.
//!
//! Every other component builds on these helpers: the codecs use them for
//! manifest checksums and binary blocks, the layers for payload digests and
//! the boundary-delimited base64 body.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use sha2::Digest;
use sha2::Sha256;

use crate::Result;
use crate::TextpackError;

/// Number of leading bytes inspected when classifying content.
pub const BINARY_SNIFF_LEN: usize = 8 * 1024;

/// Column width used for every base64 body.
pub const WRAP_WIDTH: usize = 76;

/// Length of a truncated entry checksum in hex characters.
pub const SHORT_CHECKSUM_LEN: usize = 16;

/// Returns the lowercase hex SHA-256 digest of `data`.
///
/// # Examples
///
/// ```
/// use textpack_core::integrity::sha256_hex;
///
/// assert_eq!(
///     sha256_hex(b""),
///     "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
/// );
/// ```
#[must_use]
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Returns the first 16 hex characters of the SHA-256 digest of `data`.
#[must_use]
pub fn short_checksum(data: &[u8]) -> String {
    let mut digest = sha256_hex(data);
    digest.truncate(SHORT_CHECKSUM_LEN);
    digest
}

/// Returns `true` if a NUL byte appears in the first 8 KiB of `data`.
///
/// # Examples
///
/// ```
/// use textpack_core::integrity::is_binary;
///
/// assert!(!is_binary(b"plain text\n"));
/// assert!(is_binary(b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR"));
/// ```
#[must_use]
pub fn is_binary(data: &[u8]) -> bool {
    let window = &data[..data.len().min(BINARY_SNIFF_LEN)];
    window.contains(&0)
}

/// Base64-encodes `data` and wraps it at [`WRAP_WIDTH`] columns.
///
/// Every line, including the last, is terminated by `\n`. Empty input yields
/// an empty string.
#[must_use]
pub fn encode_wrapped(data: &[u8]) -> String {
    let encoded = STANDARD.encode(data);
    let mut out = String::with_capacity(encoded.len() + encoded.len() / WRAP_WIDTH + 1);
    // base64 output is pure ASCII, so byte chunks are valid char boundaries
    for chunk in encoded.as_bytes().chunks(WRAP_WIDTH) {
        out.push_str(std::str::from_utf8(chunk).unwrap_or_default());
        out.push('\n');
    }
    out
}

/// Decodes a line-wrapped base64 body, ignoring all ASCII whitespace.
///
/// Accepts raw bytes so a body that is not even UTF-8 fails as corrupt
/// base64 rather than as a malformed archive.
///
/// # Errors
///
/// Returns [`TextpackError::CorruptPayload`] if the body is not valid
/// standard base64.
pub fn decode_wrapped<B: AsRef<[u8]>>(body: B) -> Result<Vec<u8>> {
    let compact: Vec<u8> = body
        .as_ref()
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    STANDARD
        .decode(&compact)
        .map_err(|e| TextpackError::CorruptPayload(format!("invalid base64 payload: {e}")))
}

/// Formats a byte count for humans, e.g. `512 B`, `1.5 KiB`, `3.0 MiB`.
///
/// The label is always two whitespace-separated tokens, which the manifest
/// parser relies on.
///
/// # Examples
///
/// ```
/// use textpack_core::integrity::format_size;
///
/// assert_eq!(format_size(3), "3 B");
/// assert_eq!(format_size(1536), "1.5 KiB");
/// ```
#[must_use]
pub fn format_size(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = KIB * 1024;
    const GIB: u64 = MIB * 1024;

    if bytes >= GIB {
        format!("{:.1} GiB", bytes as f64 / GIB as f64)
    } else if bytes >= MIB {
        format!("{:.1} MiB", bytes as f64 / MIB as f64)
    } else if bytes >= KIB {
        format!("{:.1} KiB", bytes as f64 / KIB as f64)
    } else {
        format!("{bytes} B")
    }
}
