//! Validated entry path type for materialization.

use std::io::ErrorKind;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use super::DestDir;
use crate::ExtractConfig;
use crate::Result;
use crate::TextpackError;

/// An entry path that is safe to write under a destination directory.
///
/// A `SafePath` is relative, contains no `..` segment, and resolves inside
/// the canonical destination even after following any symlinks that already
/// exist on disk. It can only be obtained through [`SafePath::validate`].
///
/// # Examples
///
/// ```no_run
/// use textpack_core::ExtractConfig;
/// use textpack_core::types::DestDir;
/// use textpack_core::types::SafePath;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dest = DestDir::new("/tmp/restore")?;
/// let config = ExtractConfig::default();
///
/// let safe = SafePath::validate("src/lib.rs", &dest, &config)?;
/// assert!(SafePath::validate("../etc/passwd", &dest, &config).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SafePath(PathBuf);

impl SafePath {
    /// Validates an archive entry path against `dest`.
    ///
    /// Both `/` and `\` separate segments, so `a\..\b` is rejected on every
    /// platform. A segment is only a traversal when it is exactly `..`;
    /// `foo..bar` is an ordinary name. `.` segments are dropped.
    ///
    /// # Errors
    ///
    /// - `PathTraversal` for empty, absolute or `..`-bearing paths, and for
    ///   paths that resolve outside `dest` through existing symlinks
    /// - `SecurityViolation` for NUL bytes or excessive depth
    /// - `Io` if an existing ancestor cannot be canonicalized
    pub fn validate(candidate: &str, dest: &DestDir, config: &ExtractConfig) -> Result<Self> {
        let traversal = || TextpackError::PathTraversal {
            path: PathBuf::from(candidate),
        };

        if candidate.contains('\0') {
            return Err(TextpackError::SecurityViolation {
                reason: format!("path contains null bytes: {}", candidate.escape_debug()),
            });
        }

        if candidate.starts_with('/') || candidate.starts_with('\\') || has_drive_prefix(candidate)
        {
            return Err(traversal());
        }

        let mut depth = 0;
        let mut normalized = PathBuf::new();
        for segment in candidate.split(['/', '\\']) {
            match segment {
                "" | "." => {}
                ".." => return Err(traversal()),
                name => {
                    depth += 1;
                    normalized.push(name);
                }
            }
        }

        if depth == 0 {
            return Err(traversal());
        }

        // Catches platform prefixes the string checks above do not know about.
        if !normalized
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(traversal());
        }

        if depth > config.max_path_depth {
            return Err(TextpackError::SecurityViolation {
                reason: format!(
                    "path depth {} exceeds maximum {}",
                    depth, config.max_path_depth
                ),
            });
        }

        let resolved = dest.as_path().join(&normalized);
        let ancestor = nearest_existing(&resolved)?;
        let canonical = ancestor.canonicalize().map_err(|e| {
            TextpackError::Io(std::io::Error::new(
                e.kind(),
                format!("failed to canonicalize {}: {e}", ancestor.display()),
            ))
        })?;
        if !canonical.starts_with(dest.as_path()) {
            return Err(traversal());
        }

        Ok(Self(normalized))
    }

    /// Returns the path as a `&Path`.
    #[inline]
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Converts into the inner `PathBuf`.
    #[inline]
    #[must_use]
    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }
}

/// Returns `resolved` or its closest ancestor that exists on disk.
///
/// A symlink counts as existing even when its target does not.
fn nearest_existing(resolved: &Path) -> Result<&Path> {
    let mut current = resolved;
    loop {
        match current.symlink_metadata() {
            Ok(_) => return Ok(current),
            Err(e) if e.kind() == ErrorKind::NotFound => match current.parent() {
                Some(parent) => current = parent,
                None => return Ok(current),
            },
            Err(e) => return Err(TextpackError::Io(e)),
        }
    }
}

/// Detects absolute drive paths (`C:\x`, `C:/x`) regardless of host platform.
///
/// A bare `c:name` is an ordinary file name on Unix. On Windows it is
/// drive-relative and the component check in `validate` rejects it.
fn has_drive_prefix(candidate: &str) -> bool {
    matches!(
        candidate.as_bytes(),
        [drive, b':', b'/' | b'\\', ..] if drive.is_ascii_alphabetic()
    )
}
