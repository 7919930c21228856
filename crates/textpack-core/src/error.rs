//! Error types for packing, reading and materializing archives.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `TextpackError`.
pub type Result<T> = std::result::Result<T, TextpackError>;

/// Represents a specific quota resource that was exceeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuotaResource {
    /// File count quota exceeded.
    FileCount {
        /// Current file count.
        current: usize,
        /// Maximum allowed file count.
        max: usize,
    },
    /// Total size quota exceeded.
    TotalSize {
        /// Current total size in bytes.
        current: u64,
        /// Maximum allowed total size in bytes.
        max: u64,
    },
    /// A decompressed layer payload grew past the configured limit.
    PayloadSize {
        /// Maximum allowed payload size in bytes.
        max: u64,
    },
    /// Integer overflow detected in quota tracking.
    IntegerOverflow,
}

impl std::fmt::Display for QuotaResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FileCount { current, max } => {
                write!(f, "quota exceeded: file count ({current} > {max})")
            }
            Self::TotalSize { current, max } => {
                write!(f, "quota exceeded: total size ({current} > {max})")
            }
            Self::PayloadSize { max } => {
                write!(f, "quota exceeded: decompressed payload larger than {max} bytes")
            }
            Self::IntegerOverflow => {
                write!(f, "quota exceeded: integer overflow in quota tracking")
            }
        }
    }
}

/// Errors that can occur while packing, reading or materializing an archive.
#[derive(Error, Debug)]
pub enum TextpackError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No layer or codec marker matched the input.
    #[error("unrecognized archive format")]
    UnrecognizedFormat,

    /// A marker matched but the structure behind it is broken.
    #[error("malformed archive{}: {reason}", line_suffix(.line))]
    MalformedArchive {
        /// 1-based line number where the problem was found, if known.
        line: Option<usize>,
        /// What was wrong.
        reason: String,
    },

    /// A recorded SHA-256 digest does not match the payload.
    #[error("integrity check failed: expected sha256 {expected}, got {actual}")]
    IntegrityError {
        /// Digest recorded in the layer header.
        expected: String,
        /// Digest computed over the payload.
        actual: String,
    },

    /// The payload could not be decoded or decompressed.
    #[error("corrupt payload: {0}")]
    CorruptPayload(String),

    /// The archive is encrypted and no password was supplied.
    #[error("archive is encrypted and no password was supplied")]
    PasswordRequired,

    /// Authenticated decryption failed.
    ///
    /// Deliberately does not say whether the password or the ciphertext is at
    /// fault.
    #[error("decryption failed: the password is wrong or the archive is corrupted")]
    WrongPasswordOrCorrupt,

    /// Encrypted payload is shorter than salt, nonce and tag combined.
    #[error("encrypted payload truncated: {len} bytes is shorter than the 44 byte header")]
    TruncatedPayload {
        /// Decoded payload length.
        len: usize,
    },

    /// Input handed to the encryption layer does not carry its marker.
    #[error("input is not an encrypted archive")]
    NotEncrypted,

    /// An entry path is absolute or escapes the destination directory.
    #[error("path traversal detected: {path}")]
    PathTraversal {
        /// The offending entry path.
        path: PathBuf,
    },

    /// Extraction quota exceeded.
    #[error("{resource}")]
    QuotaExceeded {
        /// Description of the exceeded resource.
        resource: QuotaResource,
    },

    /// Operation not permitted by the extraction policy.
    #[error("operation denied by security policy: {reason}")]
    SecurityViolation {
        /// Reason for the violation.
        reason: String,
    },

    /// A source file cannot be represented in an archive.
    #[error("cannot pack '{path}': {reason}")]
    InvalidEntry {
        /// The offending entry path.
        path: String,
        /// Why the entry was refused.
        reason: String,
    },

    /// A packing or reading option is out of range.
    #[error("invalid option: {0}")]
    InvalidOption(String),

    /// Collecting source files for packing failed.
    #[error("cannot collect sources: {0}")]
    Collection(String),
}

fn line_suffix(line: &Option<usize>) -> String {
    line.map(|l| format!(" at line {l}")).unwrap_or_default()
}

impl TextpackError {
    /// Shorthand for a [`TextpackError::MalformedArchive`] at a known line.
    pub(crate) fn malformed_at(line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedArchive {
            line: Some(line),
            reason: reason.into(),
        }
    }

    /// Shorthand for a [`TextpackError::MalformedArchive`] without position.
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedArchive {
            line: None,
            reason: reason.into(),
        }
    }

    /// Returns `true` if this error represents a security violation.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::PathBuf;
    /// use textpack_core::TextpackError;
    ///
    /// let err = TextpackError::PathTraversal {
    ///     path: PathBuf::from("../etc/passwd"),
    /// };
    /// assert!(err.is_security_violation());
    ///
    /// let err = TextpackError::UnrecognizedFormat;
    /// assert!(!err.is_security_violation());
    /// ```
    #[must_use]
    pub const fn is_security_violation(&self) -> bool {
        matches!(
            self,
            Self::PathTraversal { .. } | Self::QuotaExceeded { .. } | Self::SecurityViolation { .. }
        )
    }

    /// Returns `true` if the archive bytes failed an integrity or
    /// authenticity check.
    #[must_use]
    pub const fn is_integrity_failure(&self) -> bool {
        matches!(
            self,
            Self::IntegrityError { .. }
                | Self::CorruptPayload(_)
                | Self::WrongPasswordOrCorrupt
                | Self::TruncatedPayload { .. }
        )
    }

    /// Returns a context string for this error, if available.
    ///
    /// # Examples
    ///
    /// ```
    /// use textpack_core::TextpackError;
    ///
    /// let err = TextpackError::CorruptPayload("bad gzip header".to_string());
    /// assert_eq!(err.context(), Some("bad gzip header"));
    ///
    /// let err = TextpackError::PasswordRequired;
    /// assert_eq!(err.context(), None);
    /// ```
    #[must_use]
    pub fn context(&self) -> Option<&str> {
        match self {
            Self::MalformedArchive { reason, .. }
            | Self::SecurityViolation { reason }
            | Self::InvalidEntry { reason, .. } => Some(reason),
            Self::CorruptPayload(msg) | Self::InvalidOption(msg) | Self::Collection(msg) => {
                Some(msg)
            }
            _ => None,
        }
    }

    /// Returns the quota resource that was exceeded, if applicable.
    #[must_use]
    pub const fn quota_resource(&self) -> Option<&QuotaResource> {
        match self {
            Self::QuotaExceeded { resource } => Some(resource),
            _ => None,
        }
    }
}
