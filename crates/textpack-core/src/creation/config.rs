//! Configuration for collecting source files.

use std::path::PathBuf;

use crate::Result;
use crate::TextpackError;

/// Controls how directories are walked when collecting files to pack.
///
/// # Examples
///
/// ```
/// use textpack_core::creation::CollectConfig;
///
/// let config = CollectConfig::default()
///     .with_include_hidden(true)
///     .with_exclude_pattern("*.log");
/// assert!(config.exclude_patterns.contains(&"*.log".to_string()));
/// ```
#[derive(Debug, Clone)]
pub struct CollectConfig {
    /// Follow symlinks while walking.
    ///
    /// Default: `false` (symlinks are skipped).
    pub follow_symlinks: bool,

    /// Include hidden files (names starting with `.`).
    ///
    /// Default: `false`.
    pub include_hidden: bool,

    /// Skip files larger than this many bytes. `None` means no limit.
    pub max_file_size: Option<u64>,

    /// Patterns to exclude.
    ///
    /// Default: `[".git", ".DS_Store", "*.tmp"]`.
    pub exclude_patterns: Vec<String>,

    /// Prefix removed from every archive path when it matches.
    pub strip_prefix: Option<PathBuf>,
}

impl Default for CollectConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            include_hidden: false,
            max_file_size: None,
            exclude_patterns: vec![
                ".git".to_string(),
                ".DS_Store".to_string(),
                "*.tmp".to_string(),
            ],
            strip_prefix: None,
        }
    }
}

impl CollectConfig {
    /// Creates a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether to follow symlinks.
    #[must_use]
    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Sets whether to include hidden files.
    #[must_use]
    pub fn with_include_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    /// Sets the maximum file size.
    #[must_use]
    pub fn with_max_file_size(mut self, max_size: Option<u64>) -> Self {
        self.max_file_size = max_size;
        self
    }

    /// Adds an exclude pattern.
    #[must_use]
    pub fn with_exclude_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Replaces all exclude patterns.
    #[must_use]
    pub fn with_exclude_patterns(mut self, patterns: Vec<String>) -> Self {
        self.exclude_patterns = patterns;
        self
    }

    /// Sets the prefix to strip from archive paths.
    #[must_use]
    pub fn with_strip_prefix(mut self, prefix: Option<PathBuf>) -> Self {
        self.strip_prefix = prefix;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOption` for an empty exclude pattern or an absolute
    /// strip prefix.
    pub fn validate(&self) -> Result<()> {
        if self.exclude_patterns.iter().any(String::is_empty) {
            return Err(TextpackError::InvalidOption(
                "exclude patterns must not be empty".to_string(),
            ));
        }
        if self.strip_prefix.as_ref().is_some_and(|p| p.is_absolute()) {
            return Err(TextpackError::InvalidOption(
                "strip prefix must be a relative path".to_string(),
            ));
        }
        Ok(())
    }
}
