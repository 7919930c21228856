//! Error conversion utilities for CLI.
//!
//! Converts textpack-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance.

use anyhow::Result;
use anyhow::anyhow;
use std::path::Path;
use textpack_core::TextpackError;

/// Converts `TextpackError` to user-friendly anyhow error with context
pub fn convert_textpack_error(err: TextpackError, archive: &Path) -> anyhow::Error {
    match err {
        TextpackError::PathTraversal { path } => {
            anyhow!(
                "Security violation: Archive '{}' attempted path traversal with '{}'\n\
                 HINT: This archive may be malicious. Do not extract from untrusted sources.",
                archive.display(),
                path.display()
            )
        }
        TextpackError::SecurityViolation { reason } => {
            anyhow!(
                "Refused to write from '{}': {}\n\
                 HINT: Use --force to replace existing files, or --max-depth for deeper paths.",
                archive.display(),
                reason
            )
        }
        TextpackError::QuotaExceeded { resource } => {
            anyhow!(
                "Extraction limit exceeded for '{}': {}\n\
                 HINT: Use --max-files or --max-total-size to increase limits.",
                archive.display(),
                resource
            )
        }
        TextpackError::PasswordRequired => {
            anyhow!(
                "Archive '{}' is encrypted\n\
                 HINT: Pass --password or set TEXTPACK_PASSWORD.",
                archive.display()
            )
        }
        TextpackError::WrongPasswordOrCorrupt => {
            anyhow!(
                "Could not decrypt '{}': the password is wrong or the archive is corrupted\n\
                 HINT: Check the password. If it is right, the archive was damaged in transit.",
                archive.display()
            )
        }
        TextpackError::IntegrityError { expected, actual } => {
            anyhow!(
                "Integrity check failed for '{}': expected sha256 {expected}, got {actual}\n\
                 HINT: The archive was modified or truncated after it was written.",
                archive.display()
            )
        }
        TextpackError::UnrecognizedFormat => {
            anyhow!(
                "Not a textpack archive: {}\n\
                 HINT: Run `textpack spec` to see what an archive looks like.",
                archive.display()
            )
        }
        TextpackError::MalformedArchive { .. } | TextpackError::CorruptPayload(_) => {
            anyhow!(
                "Invalid archive '{}': {}\n\
                 HINT: The archive may be corrupted or hand-edited incorrectly.",
                archive.display(),
                err
            )
        }
        TextpackError::Io(io_err) => {
            anyhow!(
                "I/O error while processing '{}': {}",
                archive.display(),
                io_err
            )
        }
        _ => anyhow::Error::from(err)
            .context(format!("Error processing archive '{}'", archive.display())),
    }
}

/// Adds context to a generic error about archive operations
pub fn add_archive_context<T>(result: Result<T, TextpackError>, archive: &Path) -> anyhow::Result<T> {
    result.map_err(|e| convert_textpack_error(e, archive))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::PathBuf;

    #[test]
    fn test_convert_path_traversal_error() {
        let err = TextpackError::PathTraversal {
            path: PathBuf::from("../../../etc/passwd"),
        };
        let converted = convert_textpack_error(err, Path::new("malicious.txt"));
        let msg = format!("{converted:?}");
        assert!(msg.contains("path traversal"));
        assert!(msg.contains("malicious.txt"));
        assert!(msg.contains("HINT"));
    }

    #[test]
    fn test_convert_password_required() {
        let converted = convert_textpack_error(TextpackError::PasswordRequired, Path::new("a.txt"));
        let msg = format!("{converted:?}");
        assert!(msg.contains("encrypted"));
        assert!(msg.contains("TEXTPACK_PASSWORD"));
    }

    #[test]
    fn test_convert_malformed_keeps_line() {
        let err = TextpackError::MalformedArchive {
            line: Some(7),
            reason: "missing end delimiter for a.txt".to_string(),
        };
        let msg = format!("{:?}", convert_textpack_error(err, Path::new("a.txt")));
        assert!(msg.contains("line 7"));
    }

    #[test]
    fn test_convert_io_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err = TextpackError::Io(io_err);
        let converted = convert_textpack_error(err, Path::new("archive.txt"));
        let msg = format!("{converted:?}");
        assert!(msg.contains("I/O error"));
    }
}
