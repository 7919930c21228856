//! Compressed layer: a gzip stream of a complete archive, base64 in a text
//! envelope.

use std::io::Read;
use std::io::Write;

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use tracing::debug;
use tracing::warn;

use super::envelope;
use super::envelope::BoundaryPair;
use crate::Result;
use crate::TextpackError;
use crate::config::DEFAULT_MAX_PAYLOAD_SIZE;
use crate::error::QuotaResource;
use crate::integrity;

/// Marker line of a compressed archive.
pub const MARKER: &str = "# TEXTPACK COMPRESSED ARCHIVE";

/// Boundaries written by this crate.
pub const BOUNDARY: BoundaryPair = BoundaryPair {
    begin: "-----BEGIN TEXTPACK PAYLOAD-----",
    end: "-----END TEXTPACK PAYLOAD-----",
};

/// Boundaries of older compressed archives, accepted on read.
pub const LEGACY_BOUNDARY: BoundaryPair = BoundaryPair {
    begin: "__TEXTPACK_PAYLOAD_BEGIN__",
    end: "__TEXTPACK_PAYLOAD_END__",
};

const DESCRIPTION: &str = "gzip-compressed textpack archive; decode the base64 below and gunzip it";

/// Gzips `data` at maximum compression.
pub(crate) fn gzip(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// Gunzips `data`, refusing output larger than `limit` bytes.
pub(crate) fn gunzip(data: &[u8], limit: u64) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    GzDecoder::new(data)
        .take(limit.saturating_add(1))
        .read_to_end(&mut out)
        .map_err(|e| TextpackError::CorruptPayload(format!("gzip stream is invalid: {e}")))?;
    if out.len() as u64 > limit {
        return Err(TextpackError::QuotaExceeded {
            resource: QuotaResource::PayloadSize { max: limit },
        });
    }
    Ok(out)
}

/// Formats `part / whole` as a percentage with one decimal.
fn ratio(part: usize, whole: usize) -> String {
    if whole == 0 {
        return "n/a".to_string();
    }
    #[allow(clippy::cast_precision_loss)]
    let percent = part as f64 / whole as f64 * 100.0;
    format!("{percent:.1}%")
}

/// Returns `true` if `data` carries the compressed marker on line 1 or 2.
#[must_use]
pub fn detect(data: &[u8]) -> bool {
    envelope::has_marker(data, MARKER)
}

/// Wraps a serialized archive in the compressed layer.
///
/// Output is deterministic for a given input.
///
/// # Errors
///
/// Returns `Io` if the gzip encoder fails.
///
/// # Examples
///
/// ```
/// use textpack_core::layers::compression;
///
/// let inner = b"# TEXTPACK ARCHIVE v2\n".to_vec();
/// let wrapped = compression::wrap(&inner).unwrap();
/// assert!(compression::detect(&wrapped));
/// assert_eq!(compression::unwrap(&wrapped).unwrap(), inner);
/// ```
pub fn wrap(payload: &[u8]) -> Result<Vec<u8>> {
    let compressed = gzip(payload)?;
    let fields = [
        ("original_size", payload.len().to_string()),
        ("compressed_size", compressed.len().to_string()),
        ("ratio", ratio(compressed.len(), payload.len())),
        ("sha256", integrity::sha256_hex(&compressed)),
    ];
    debug!(
        original = payload.len(),
        compressed = compressed.len(),
        "compressed archive"
    );
    Ok(envelope::seal(MARKER, DESCRIPTION, &fields, BOUNDARY, &compressed))
}

/// Unwraps the compressed layer using the default payload cap.
///
/// # Errors
///
/// See [`unwrap_with_limit`].
pub fn unwrap(data: &[u8]) -> Result<Vec<u8>> {
    unwrap_with_limit(data, DEFAULT_MAX_PAYLOAD_SIZE)
}

/// Unwraps the compressed layer, capping the decompressed size at `limit`.
///
/// # Errors
///
/// - `MalformedArchive` if the marker, boundaries or `sha256` field are
///   missing
/// - `CorruptPayload` if the body is not base64 or not a gzip stream
/// - `IntegrityError` if the gzip bytes do not match `sha256`
/// - `QuotaExceeded` if decompression exceeds `limit`
pub fn unwrap_with_limit(data: &[u8], limit: u64) -> Result<Vec<u8>> {
    let envelope = envelope::open(data, MARKER, &[BOUNDARY, LEGACY_BOUNDARY])?;
    let compressed = envelope.payload()?;

    let expected = envelope.header.require("sha256")?.trim().to_ascii_lowercase();
    let actual = integrity::sha256_hex(&compressed);
    if expected != actual {
        return Err(TextpackError::IntegrityError { expected, actual });
    }

    let payload = gunzip(&compressed, limit)?;
    if let Some(original) = envelope.header.parse::<u64>("original_size")?
        && original != payload.len() as u64
    {
        warn!(
            recorded = original,
            actual = payload.len(),
            "original_size in compressed header does not match payload"
        );
    }
    Ok(payload)
}
