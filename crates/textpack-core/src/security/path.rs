//! Path guard applied to every entry before it touches the filesystem.

use crate::ExtractConfig;
use crate::Result;
use crate::types::DestDir;
use crate::types::SafePath;

/// Resolves an archive entry path to a location inside `base`.
///
/// This delegates to [`SafePath::validate`], which rejects:
/// - empty paths and paths with NUL bytes
/// - absolute paths (`/x`, `\x`, `C:\x`)
/// - any segment that is exactly `..`, with `/` and `\` both treated as
///   separators
/// - paths deeper than `config.max_path_depth`
/// - paths whose nearest existing ancestor canonicalizes outside `base`
///
/// # Errors
///
/// Returns `PathTraversal` or `SecurityViolation` for rejected candidates.
///
/// # Examples
///
/// ```no_run
/// use textpack_core::ExtractConfig;
/// use textpack_core::security::resolve;
/// use textpack_core::types::DestDir;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let base = DestDir::new("/tmp/restore")?;
/// let config = ExtractConfig::default();
///
/// let safe = resolve("docs/readme.md", &base, &config)?;
/// assert!(base.join(&safe).starts_with(base.as_path()));
///
/// assert!(resolve("../../etc/passwd", &base, &config).is_err());
/// # Ok(())
/// # }
/// ```
pub fn resolve(candidate: &str, base: &DestDir, config: &ExtractConfig) -> Result<SafePath> {
    SafePath::validate(candidate, base, config)
}
