//! Validated destination directory type.

use std::path::Path;
use std::path::PathBuf;

use crate::Result;
use crate::TextpackError;

/// A validated destination directory for materialization.
///
/// Once constructed, a `DestDir` names an existing, writable directory by its
/// absolute canonical path. Every entry path is checked against this
/// canonical form by the path guard.
///
/// # Examples
///
/// ```no_run
/// use std::path::PathBuf;
/// use textpack_core::types::DestDir;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dest = DestDir::new(PathBuf::from("/tmp/restore"))?;
/// println!("Restoring into: {}", dest.as_path().display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestDir(PathBuf);

impl DestDir {
    /// Creates a new `DestDir` after validating the path.
    ///
    /// # Security Considerations
    ///
    /// There is a time-of-check-time-of-use window between these checks and
    /// later writes. Canonicalizing here and re-checking every resolved entry
    /// path against the canonical base narrows it; closing it fully would
    /// need `openat()`-style APIs.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The path does not exist
    /// - The path exists but is not a directory
    /// - The path cannot be canonicalized
    /// - The directory is marked read-only
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            return Err(TextpackError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("destination directory does not exist: {}", path.display()),
            )));
        }

        if !path.is_dir() {
            return Err(TextpackError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("path is not a directory: {}", path.display()),
            )));
        }

        let canonical = path.canonicalize().map_err(|e| {
            TextpackError::Io(std::io::Error::new(
                e.kind(),
                format!("failed to canonicalize path {}: {}", path.display(), e),
            ))
        })?;

        if std::fs::metadata(&canonical)?.permissions().readonly() {
            return Err(TextpackError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                format!("directory is not writable: {}", canonical.display()),
            )));
        }

        Ok(Self(canonical))
    }

    /// Creates the directory (and missing parents) if needed, then validates
    /// it like [`DestDir::new`].
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or fails
    /// validation.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        std::fs::create_dir_all(&path)?;
        Self::new(path)
    }

    /// Returns the path as a `&Path`.
    #[inline]
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Joins a `SafePath` to this destination directory.
    #[inline]
    #[must_use]
    pub fn join(&self, safe_path: &super::SafePath) -> PathBuf {
        self.0.join(safe_path.as_path())
    }

    /// Converts into the inner `PathBuf`.
    #[inline]
    #[must_use]
    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_dest_dir_valid() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let dest = DestDir::new(temp.path().to_path_buf()).expect("dest should be valid");
        assert!(dest.as_path().is_absolute());
    }

    #[test]
    fn test_dest_dir_nonexistent() {
        let path = PathBuf::from("/nonexistent/directory/that/does/not/exist");
        let result = DestDir::new(path);
        assert!(matches!(result, Err(TextpackError::Io(_))));
    }

    #[test]
    fn test_dest_dir_not_a_directory() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let file_path = temp.path().join("file.txt");
        fs::write(&file_path, "test").expect("failed to write file");

        let result = DestDir::new(file_path);
        assert!(matches!(result, Err(TextpackError::Io(_))));
    }

    #[test]
    fn test_dest_dir_canonicalization() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let subdir = temp.path().join("subdir");
        fs::create_dir(&subdir).expect("failed to create subdir");

        let path_with_dot = subdir.join(".").join("..");
        let dest = DestDir::new(path_with_dot).expect("should create dest dir");

        assert_eq!(dest.as_path(), temp.path().canonicalize().unwrap());
    }

    #[test]
    fn test_dest_dir_create_makes_missing_dirs() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let nested = temp.path().join("a").join("b");

        let dest = DestDir::create(&nested).expect("should create nested dirs");
        assert!(nested.is_dir());
        assert_eq!(dest.into_path_buf(), nested.canonicalize().unwrap());
    }

    #[test]
    #[cfg(unix)]
    fn test_dest_dir_follows_symlink() {
        use std::os::unix::fs::symlink;

        let temp = TempDir::new().expect("failed to create temp dir");
        let real_dir = temp.path().join("real");
        fs::create_dir(&real_dir).expect("failed to create real dir");
        let link = temp.path().join("link");
        symlink(&real_dir, &link).expect("failed to create symlink");

        let dest = DestDir::new(link).expect("should create from symlink");
        assert_eq!(dest.as_path(), real_dir.canonicalize().unwrap());
    }
}
