//! Encrypted layer: AES-256-GCM over a gzip stream of a complete archive.
//!
//! Decoded payload layout:
//!
//! ```text
//! salt (16) | nonce (12) | tag (16) | ciphertext
//! ```
//!
//! The key is PBKDF2-HMAC-SHA256 over the password and salt. Salt and nonce
//! are fresh random bytes for every wrap.

use aes_gcm::Aes256Gcm;
use aes_gcm::Key;
use aes_gcm::Nonce;
use aes_gcm::Tag;
use aes_gcm::aead::AeadInPlace;
use aes_gcm::aead::KeyInit;
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::Sha256;
use tracing::debug;

use super::compression;
use super::envelope;
use super::envelope::BoundaryPair;
use crate::Result;
use crate::TextpackError;
use crate::config::DEFAULT_MAX_PAYLOAD_SIZE;
use crate::integrity;

/// Marker line of an encrypted archive.
pub const MARKER: &str = "# TEXTPACK ENCRYPTED ARCHIVE";

/// Boundaries written by this crate.
pub const BOUNDARY: BoundaryPair = BoundaryPair {
    begin: "-----BEGIN TEXTPACK ENCRYPTED PAYLOAD-----",
    end: "-----END TEXTPACK ENCRYPTED PAYLOAD-----",
};

/// Boundaries of older encrypted archives, accepted on read.
pub const LEGACY_BOUNDARY: BoundaryPair = BoundaryPair {
    begin: "__TEXTPACK_ENCRYPTED_BEGIN__",
    end: "__TEXTPACK_ENCRYPTED_END__",
};

/// PBKDF2 iteration count used when none is given.
pub const DEFAULT_ITERATIONS: u32 = 100_000;

/// Largest iteration count accepted from a header.
pub const MAX_ITERATIONS: u32 = 10_000_000;

/// Cipher name recorded in the header.
pub const CIPHER: &str = "AES-256-GCM";

/// Key derivation name recorded in the header.
pub const KDF: &str = "PBKDF2-HMAC-SHA256";

const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;
const KEY_LEN: usize = 32;

/// Bytes preceding the ciphertext.
pub const PREFIX_LEN: usize = SALT_LEN + NONCE_LEN + TAG_LEN;

const DESCRIPTION: &str = "encrypted textpack archive; a password is required to read it";

fn derive_key(password: &str, salt: &[u8], iterations: u32) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut key);
    key
}

fn check_iterations(iterations: u32) -> Option<u32> {
    (1..=MAX_ITERATIONS).contains(&iterations).then_some(iterations)
}

/// Returns `true` if `data` carries the encrypted marker on line 1 or 2.
#[must_use]
pub fn detect(data: &[u8]) -> bool {
    envelope::has_marker(data, MARKER)
}

/// Wraps a serialized archive in the encrypted layer using
/// [`DEFAULT_ITERATIONS`].
///
/// # Errors
///
/// See [`wrap_with_iterations`].
pub fn wrap(payload: &[u8], password: &str) -> Result<Vec<u8>> {
    wrap_with_iterations(payload, password, DEFAULT_ITERATIONS)
}

/// Wraps a serialized archive in the encrypted layer.
///
/// The payload is gzipped before encryption. Two calls with the same input
/// produce different output.
///
/// # Errors
///
/// Returns `InvalidOption` if `iterations` is outside `1..=10_000_000`, or
/// `Io` if compression fails.
///
/// # Examples
///
/// ```
/// use textpack_core::layers::encryption;
///
/// let inner = b"# TEXTPACK ARCHIVE v2\n".to_vec();
/// let sealed = encryption::wrap_with_iterations(&inner, "pw", 1_000).unwrap();
/// assert!(encryption::detect(&sealed));
/// assert_eq!(encryption::unwrap(&sealed, "pw").unwrap(), inner);
/// assert!(encryption::unwrap(&sealed, "wrong").is_err());
/// ```
pub fn wrap_with_iterations(payload: &[u8], password: &str, iterations: u32) -> Result<Vec<u8>> {
    let iterations = check_iterations(iterations).ok_or_else(|| {
        TextpackError::InvalidOption(format!(
            "iteration count must be between 1 and {MAX_ITERATIONS}, got {iterations}"
        ))
    })?;

    let mut buffer = compression::gzip(payload)?;

    let mut salt = [0u8; SALT_LEN];
    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut salt);
    OsRng.fill_bytes(&mut nonce);

    let key = derive_key(password, &salt, iterations);
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key));
    let tag = cipher
        .encrypt_in_place_detached(Nonce::from_slice(&nonce), b"", &mut buffer)
        .map_err(|_| TextpackError::CorruptPayload("encryption failed".to_string()))?;

    let mut blob = Vec::with_capacity(PREFIX_LEN + buffer.len());
    blob.extend_from_slice(&salt);
    blob.extend_from_slice(&nonce);
    blob.extend_from_slice(&tag);
    blob.extend_from_slice(&buffer);

    let fields = [
        ("cipher", CIPHER.to_string()),
        ("kdf", KDF.to_string()),
        ("iterations", iterations.to_string()),
        ("original_size", payload.len().to_string()),
        ("encrypted_size", blob.len().to_string()),
        ("sha256", integrity::sha256_hex(&blob)),
    ];
    debug!(iterations, encrypted = blob.len(), "encrypted archive");
    Ok(envelope::seal(MARKER, DESCRIPTION, &fields, BOUNDARY, &blob))
}

/// Unwraps the encrypted layer using the default payload cap.
///
/// # Errors
///
/// See [`unwrap_with_limit`].
pub fn unwrap(data: &[u8], password: &str) -> Result<Vec<u8>> {
    unwrap_with_limit(data, password, DEFAULT_MAX_PAYLOAD_SIZE)
}

/// Unwraps the encrypted layer, capping the decompressed size at `limit`.
///
/// # Errors
///
/// - `NotEncrypted` if the marker is absent
/// - `MalformedArchive` for missing boundaries, a missing `sha256` field, a
///   missing or out-of-range iteration count, or an unsupported cipher
/// - `CorruptPayload` if the body is not base64 or the plaintext is not gzip
/// - `IntegrityError` if `sha256` does not match the payload
/// - `TruncatedPayload` if the payload is shorter than 44 bytes
/// - `WrongPasswordOrCorrupt` if authenticated decryption fails
/// - `QuotaExceeded` if decompression exceeds `limit`
pub fn unwrap_with_limit(data: &[u8], password: &str, limit: u64) -> Result<Vec<u8>> {
    if !detect(data) {
        return Err(TextpackError::NotEncrypted);
    }
    let envelope = envelope::open(data, MARKER, &[BOUNDARY, LEGACY_BOUNDARY])?;

    if let Some(cipher) = envelope.header.get("cipher")
        && cipher.trim() != CIPHER
    {
        return Err(TextpackError::malformed(format!("unsupported cipher: {cipher}")));
    }

    let iterations = envelope
        .header
        .parse::<u32>("iterations")?
        .ok_or_else(|| TextpackError::malformed("encrypted header lacks 'iterations'"))?;
    let iterations = check_iterations(iterations).ok_or_else(|| {
        TextpackError::malformed(format!("iteration count out of range: {iterations}"))
    })?;

    let blob = envelope.payload()?;

    let expected = envelope.header.require("sha256")?.trim().to_ascii_lowercase();
    let actual = integrity::sha256_hex(&blob);
    if expected != actual {
        return Err(TextpackError::IntegrityError { expected, actual });
    }

    if blob.len() < PREFIX_LEN {
        return Err(TextpackError::TruncatedPayload { len: blob.len() });
    }
    let (salt, rest) = blob.split_at(SALT_LEN);
    let (nonce, rest) = rest.split_at(NONCE_LEN);
    let (tag, ciphertext) = rest.split_at(TAG_LEN);

    let key = derive_key(password, salt, iterations);
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key));
    let mut buffer = ciphertext.to_vec();
    cipher
        .decrypt_in_place_detached(
            Nonce::from_slice(nonce),
            b"",
            &mut buffer,
            Tag::from_slice(tag),
        )
        .map_err(|_| TextpackError::WrongPasswordOrCorrupt)?;

    debug!(iterations, "decrypted archive");
    compression::gunzip(&buffer, limit)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const FAST: u32 = 1_000;

    fn seal_blob(blob: &[u8], iterations: &str) -> Vec<u8> {
        let text = format!(
            "{MARKER}\n# iterations: {iterations}\n# sha256: {}\n{}\n{}{}\n",
            integrity::sha256_hex(blob),
            BOUNDARY.begin,
            integrity::encode_wrapped(blob),
            BOUNDARY.end
        );
        text.into_bytes()
    }

    #[test]
    fn test_roundtrip() {
        let sealed = wrap_with_iterations(b"payload", "pw", FAST).unwrap();
        assert_eq!(unwrap(&sealed, "pw").unwrap(), b"payload");
    }

    #[test]
    fn test_wrap_is_randomized() {
        let a = wrap_with_iterations(b"payload", "pw", FAST).unwrap();
        let b = wrap_with_iterations(b"payload", "pw", FAST).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_header_fields() {
        let sealed = String::from_utf8(wrap_with_iterations(b"x", "pw", FAST).unwrap()).unwrap();
        assert!(sealed.starts_with(MARKER));
        assert!(sealed.contains("# cipher: AES-256-GCM\n"));
        assert!(sealed.contains("# kdf: PBKDF2-HMAC-SHA256\n"));
        assert!(sealed.contains("# iterations: 1000\n"));
        assert!(sealed.contains("# original_size: 1\n"));
        assert!(sealed.contains(BOUNDARY.begin));
    }

    #[test]
    fn test_wrong_password() {
        let sealed = wrap_with_iterations(b"payload", "right", FAST).unwrap();
        let err = unwrap(&sealed, "wrong").unwrap_err();
        assert!(matches!(err, TextpackError::WrongPasswordOrCorrupt));
    }

    #[test]
    fn test_flipped_ciphertext_with_matching_digest_fails_authentication() {
        let mut blob = vec![7u8; PREFIX_LEN + 8];
        blob[PREFIX_LEN] ^= 1;
        let err = unwrap(&seal_blob(&blob, "1000"), "pw").unwrap_err();
        assert!(matches!(err, TextpackError::WrongPasswordOrCorrupt));
    }

    #[test]
    fn test_missing_digest_is_malformed() {
        let sealed = String::from_utf8(wrap_with_iterations(b"payload", "pw", FAST).unwrap())
            .unwrap();
        let stripped: String = sealed
            .lines()
            .filter(|line| !line.starts_with("# sha256:"))
            .map(|line| format!("{line}\n"))
            .collect();

        let err = unwrap(stripped.as_bytes(), "pw").unwrap_err();
        assert!(
            matches!(&err, TextpackError::MalformedArchive { reason, .. } if reason.contains("sha256")),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn test_truncated_payload() {
        let err = unwrap(&seal_blob(&[0u8; 43], "1000"), "pw").unwrap_err();
        assert!(matches!(err, TextpackError::TruncatedPayload { len: 43 }));
    }

    #[test]
    fn test_iteration_bounds() {
        let blob = [0u8; PREFIX_LEN];
        for bad in ["0", "10000001", "many"] {
            let err = unwrap(&seal_blob(&blob, bad), "pw").unwrap_err();
            assert!(
                matches!(err, TextpackError::MalformedArchive { .. }),
                "iterations {bad} should be rejected"
            );
        }
        assert!(matches!(
            wrap_with_iterations(b"x", "pw", 0),
            Err(TextpackError::InvalidOption(_))
        ));
    }

    #[test]
    fn test_not_encrypted() {
        let err = unwrap(b"# TEXTPACK ARCHIVE v2\n", "pw").unwrap_err();
        assert!(matches!(err, TextpackError::NotEncrypted));
    }

    #[test]
    fn test_tampered_sealed_text_fails() {
        let sealed = String::from_utf8(wrap_with_iterations(b"payload", "pw", FAST).unwrap())
            .unwrap();
        let begin = sealed.find(BOUNDARY.begin).unwrap() + BOUNDARY.begin.len() + 1;
        let mut bytes = sealed.into_bytes();
        bytes[begin + 70] = if bytes[begin + 70] == b'A' { b'B' } else { b'A' };

        let err = unwrap(&bytes, "pw").unwrap_err();
        assert!(err.is_integrity_failure());
    }
}
