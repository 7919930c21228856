//! Path filtering for source collection.
//!
//! Filters are applied to paths relative to the walked root, so a root
//! directory that is itself hidden (such as a scratch directory) is still
//! walked.

use std::path::Component;
use std::path::Path;

use crate::Result;
use crate::TextpackError;
use crate::creation::config::CollectConfig;

/// Checks if a relative path should be skipped.
///
/// A path is skipped if it is hidden and `include_hidden` is off, or if it
/// matches an exclude pattern.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use textpack_core::creation::CollectConfig;
/// use textpack_core::creation::filters;
///
/// let config = CollectConfig::default();
/// assert!(filters::should_skip(Path::new(".gitignore"), &config));
/// assert!(!filters::should_skip(Path::new("main.rs"), &config));
/// ```
#[must_use]
pub fn should_skip(relative: &Path, config: &CollectConfig) -> bool {
    if !config.include_hidden && is_hidden(relative) {
        return true;
    }

    config
        .exclude_patterns
        .iter()
        .any(|pattern| matches_pattern(relative, pattern))
}

/// Checks if the last component of a path starts with `.`.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use textpack_core::creation::filters;
///
/// assert!(filters::is_hidden(Path::new("dir/.hidden")));
/// assert!(!filters::is_hidden(Path::new("dir/normal.rs")));
/// ```
#[must_use]
pub fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('.'))
}

/// One segment of an exclude pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    /// `name`
    Exact(&'a str),
    /// `name*`
    Prefix(&'a str),
    /// `*name`
    Suffix(&'a str),
}

impl<'a> Segment<'a> {
    fn parse(raw: &'a str) -> Self {
        if let Some(prefix) = raw.strip_suffix('*') {
            Self::Prefix(prefix)
        } else if let Some(suffix) = raw.strip_prefix('*') {
            Self::Suffix(suffix)
        } else {
            Self::Exact(raw)
        }
    }

    fn matches(self, name: &str) -> bool {
        match self {
            Self::Exact(exact) => name == exact,
            Self::Prefix(prefix) => name.starts_with(prefix),
            Self::Suffix(suffix) => name.ends_with(suffix),
        }
    }
}

/// Matches a relative path against an exclude pattern.
///
/// Each `/`-separated segment of the pattern is an exact name, `name*` or
/// `*name`. A pattern without `/` matches any component, so `*.log` skips
/// log files at every depth. A pattern with `/` is anchored at the walked
/// root and matches the leading components, so `build/*.log` skips
/// `build/a.log` but not `src/build/a.log`, and `docs/drafts` skips the
/// whole directory.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use textpack_core::creation::filters;
///
/// assert!(filters::matches_pattern(Path::new("dir/.git"), ".git"));
/// assert!(filters::matches_pattern(Path::new("dir/test.tmp"), "*.tmp"));
/// assert!(!filters::matches_pattern(Path::new("file_temp"), "temp*"));
/// assert!(filters::matches_pattern(Path::new("build/a.log"), "build/*.log"));
/// assert!(!filters::matches_pattern(Path::new("src/build/a.log"), "build/*.log"));
/// ```
#[must_use]
pub fn matches_pattern(path: &Path, pattern: &str) -> bool {
    let names: Vec<&str> = path
        .components()
        .filter_map(|c| match c {
            Component::Normal(name) => name.to_str(),
            _ => None,
        })
        .collect();

    let anchored = pattern.trim_matches('/');
    if anchored.contains('/') || pattern.starts_with('/') {
        let segments: Vec<Segment<'_>> = anchored.split('/').map(Segment::parse).collect();
        return segments.len() <= names.len()
            && segments
                .iter()
                .zip(&names)
                .all(|(segment, name)| segment.matches(name));
    }

    let segment = Segment::parse(pattern);
    names.iter().any(|name| segment.matches(name))
}

/// Computes the `/`-separated archive path of `source` relative to `root`.
///
/// `strip_prefix` is applied when it matches.
///
/// # Errors
///
/// Returns `Collection` if `source` is not under `root` or a component is
/// not valid UTF-8.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use textpack_core::creation::CollectConfig;
/// use textpack_core::creation::filters;
///
/// let config = CollectConfig::default();
/// let path = filters::compute_archive_path(
///     Path::new("/home/user/project/src/main.rs"),
///     Path::new("/home/user/project"),
///     &config,
/// )
/// .unwrap();
/// assert_eq!(path, "src/main.rs");
/// ```
pub fn compute_archive_path(source: &Path, root: &Path, config: &CollectConfig) -> Result<String> {
    let mut relative = source.strip_prefix(root).map_err(|_| {
        TextpackError::Collection(format!(
            "{} is not under {}",
            source.display(),
            root.display()
        ))
    })?;

    if let Some(strip) = &config.strip_prefix
        && let Ok(stripped) = relative.strip_prefix(strip)
    {
        relative = stripped;
    }

    let mut parts = Vec::new();
    for component in relative.components() {
        if let Component::Normal(part) = component {
            parts.push(part.to_str().ok_or_else(|| {
                TextpackError::Collection(format!("path is not valid UTF-8: {}", source.display()))
            })?);
        }
    }
    Ok(parts.join("/"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_is_hidden() {
        assert!(is_hidden(Path::new(".env")));
        assert!(is_hidden(Path::new("dir/.DS_Store")));
        assert!(!is_hidden(Path::new("README.md")));
        assert!(!is_hidden(Path::new("")));
    }

    #[test]
    fn test_matches_pattern_exact() {
        assert!(matches_pattern(Path::new(".git"), ".git"));
        assert!(matches_pattern(Path::new("src/.git/config"), ".git"));
        assert!(!matches_pattern(Path::new(".github"), ".git"));
    }

    #[test]
    fn test_matches_pattern_wildcards() {
        assert!(matches_pattern(Path::new("dir/file.log"), "*.log"));
        assert!(!matches_pattern(Path::new("txtfile"), "*.txt"));
        assert!(matches_pattern(Path::new("dir/temp_data"), "temp*"));
        assert!(!matches_pattern(Path::new("main.rs"), "temp*"));
    }

    #[test]
    fn test_matches_pattern_anchored() {
        assert!(matches_pattern(Path::new("build/a.log"), "build/*.log"));
        assert!(!matches_pattern(Path::new("src/build/a.log"), "build/*.log"));
        assert!(matches_pattern(Path::new("docs/drafts/a.md"), "docs/drafts"));
        assert!(matches_pattern(Path::new("docs/drafts"), "docs/drafts/"));
        assert!(!matches_pattern(Path::new("docs"), "docs/drafts"));
        assert!(matches_pattern(Path::new("target/debug"), "/target"));
        assert!(!matches_pattern(Path::new("crate/target"), "/target"));
    }

    #[test]
    fn test_segment_parse() {
        assert_eq!(Segment::parse(".git"), Segment::Exact(".git"));
        assert_eq!(Segment::parse("tmp*"), Segment::Prefix("tmp"));
        assert_eq!(Segment::parse("*.bak"), Segment::Suffix(".bak"));
        assert!(Segment::parse("*").matches("anything"));
    }

    #[test]
    fn test_compute_archive_path_strip_prefix() {
        let config = CollectConfig::default().with_strip_prefix(Some(PathBuf::from("src")));
        let root = Path::new("/p");

        assert_eq!(
            compute_archive_path(Path::new("/p/src/main.rs"), root, &config).unwrap(),
            "main.rs"
        );
        assert_eq!(
            compute_archive_path(Path::new("/p/docs/a.md"), root, &config).unwrap(),
            "docs/a.md"
        );
    }

    #[test]
    fn test_compute_archive_path_not_under_root() {
        let config = CollectConfig::default();
        let result = compute_archive_path(Path::new("/other/x"), Path::new("/p"), &config);
        assert!(matches!(result, Err(TextpackError::Collection(_))));
    }

    #[test]
    fn test_should_skip() {
        let config = CollectConfig::default();
        assert!(should_skip(Path::new(".env"), &config));
        assert!(should_skip(Path::new("build/out.tmp"), &config));
        assert!(!should_skip(Path::new("src/lib.rs"), &config));

        let config = config.with_include_hidden(true);
        assert!(!should_skip(Path::new(".env"), &config));
        assert!(should_skip(Path::new(".git"), &config));
    }
}
