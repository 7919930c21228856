//! Directory walking with filtering.

use std::collections::BTreeSet;
use std::path::Path;
use std::path::PathBuf;

use tracing::debug;
use walkdir::WalkDir;

use crate::Result;
use crate::TextpackError;
use crate::creation::config::CollectConfig;
use crate::creation::filters;
use crate::types::SourceFile;

/// A regular file found while walking, with its archive path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectedFile {
    /// Filesystem path.
    pub path: PathBuf,
    /// `/`-separated path inside the archive.
    pub archive_path: String,
    /// Size in bytes.
    pub size: u64,
}

/// Walks a directory tree, yielding regular files that pass the filters.
///
/// Files come out sorted by name within each directory so the resulting
/// archive does not depend on filesystem order.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use textpack_core::creation::CollectConfig;
/// use textpack_core::creation::walker::FilteredWalker;
///
/// let config = CollectConfig::default();
/// for file in FilteredWalker::new(Path::new("./project"), &config).walk() {
///     println!("would pack: {}", file.unwrap().archive_path);
/// }
/// ```
pub struct FilteredWalker<'a> {
    root: &'a Path,
    config: &'a CollectConfig,
}

impl<'a> FilteredWalker<'a> {
    /// Creates a walker rooted at `root`.
    #[must_use]
    pub fn new(root: &'a Path, config: &'a CollectConfig) -> Self {
        Self { root, config }
    }

    /// Returns an iterator over the files that pass the filters.
    ///
    /// Hidden or excluded directories are pruned without descending into
    /// them. Symlinks are skipped unless `follow_symlinks` is set.
    pub fn walk(&self) -> impl Iterator<Item = Result<CollectedFile>> + '_ {
        WalkDir::new(self.root)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| {
                entry.depth() == 0
                    || entry
                        .path()
                        .strip_prefix(self.root)
                        .is_ok_and(|rel| !filters::should_skip(rel, self.config))
            })
            .filter_map(move |entry| match entry {
                Ok(entry) => self.build(&entry).transpose(),
                Err(e) => Some(Err(TextpackError::Collection(format!("walk failed: {e}")))),
            })
    }

    fn build(&self, entry: &walkdir::DirEntry) -> Result<Option<CollectedFile>> {
        if !entry.file_type().is_file() {
            return Ok(None);
        }

        let metadata = entry.metadata().map_err(|e| {
            TextpackError::Collection(format!(
                "cannot read metadata for {}: {e}",
                entry.path().display()
            ))
        })?;
        let size = metadata.len();
        if let Some(max) = self.config.max_file_size
            && size > max
        {
            debug!(path = %entry.path().display(), size, "skipping oversized file");
            return Ok(None);
        }

        Ok(Some(CollectedFile {
            path: entry.path().to_path_buf(),
            archive_path: filters::compute_archive_path(entry.path(), self.root, self.config)?,
            size,
        }))
    }
}

/// Collects every file under `sources` into a list ready for packing.
///
/// A directory contributes its files with paths relative to itself; a file
/// contributes itself under its file name.
///
/// # Errors
///
/// Returns `Collection` if a source does not exist, a walk fails, or two
/// sources produce the same archive path, and `Io` if a file cannot be read.
///
/// # Examples
///
/// ```no_run
/// use textpack_core::creation::{CollectConfig, collect_sources};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let files = collect_sources(&["src", "Cargo.toml"], &CollectConfig::default())?;
/// println!("collected {} files", files.len());
/// # Ok(())
/// # }
/// ```
pub fn collect_sources<P: AsRef<Path>>(
    sources: &[P],
    config: &CollectConfig,
) -> Result<Vec<SourceFile>> {
    config.validate()?;

    let mut collected = Vec::new();
    for source in sources {
        let path = source.as_ref();
        if !path.exists() {
            return Err(TextpackError::Collection(format!(
                "source not found: {}",
                path.display()
            )));
        }

        if path.is_dir() {
            for file in FilteredWalker::new(path, config).walk() {
                collected.push(file?);
            }
        } else {
            let name = path.file_name().and_then(|n| n.to_str()).ok_or_else(|| {
                TextpackError::Collection(format!("cannot name source {}", path.display()))
            })?;
            collected.push(CollectedFile {
                path: path.to_path_buf(),
                archive_path: name.to_string(),
                size: std::fs::metadata(path)?.len(),
            });
        }
    }

    let mut seen = BTreeSet::new();
    let mut files = Vec::with_capacity(collected.len());
    for file in collected {
        if !seen.insert(file.archive_path.clone()) {
            return Err(TextpackError::Collection(format!(
                "two sources map to the archive path '{}'",
                file.archive_path
            )));
        }
        let data = std::fs::read(&file.path)?;
        files.push(SourceFile::new(file.archive_path, data));
    }

    debug!(files = files.len(), "collected sources");
    Ok(files)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn tree() -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("src/nested")).unwrap();
        fs::create_dir_all(temp.path().join(".git")).unwrap();
        fs::write(temp.path().join("src/main.rs"), "fn main() {}\n").unwrap();
        fs::write(temp.path().join("src/nested/data.bin"), [0u8, 1]).unwrap();
        fs::write(temp.path().join(".git/config"), "x").unwrap();
        fs::write(temp.path().join(".env"), "SECRET=1").unwrap();
        fs::write(temp.path().join("scratch.tmp"), "x").unwrap();
        temp
    }

    #[test]
    fn test_walk_filters_and_sorts() {
        let temp = tree();
        let config = CollectConfig::default();
        let paths: Vec<String> = FilteredWalker::new(temp.path(), &config)
            .walk()
            .map(|f| f.unwrap().archive_path)
            .collect();
        assert_eq!(paths, vec!["src/main.rs", "src/nested/data.bin"]);
    }

    #[test]
    fn test_walk_includes_hidden_when_asked() {
        let temp = tree();
        let config = CollectConfig::default().with_include_hidden(true);
        let paths: Vec<String> = FilteredWalker::new(temp.path(), &config)
            .walk()
            .map(|f| f.unwrap().archive_path)
            .collect();
        assert!(paths.contains(&".env".to_string()));
        assert!(!paths.iter().any(|p| p.starts_with(".git/")));
    }

    #[test]
    fn test_max_file_size() {
        let temp = tree();
        let config = CollectConfig::default().with_max_file_size(Some(2));
        let paths: Vec<String> = FilteredWalker::new(temp.path(), &config)
            .walk()
            .map(|f| f.unwrap().archive_path)
            .collect();
        assert_eq!(paths, vec!["src/nested/data.bin"]);
    }

    #[test]
    fn test_collect_sources_mixes_files_and_dirs() {
        let temp = tree();
        let files = collect_sources(
            &[temp.path().join("src/nested"), temp.path().join("src/main.rs")],
            &CollectConfig::default(),
        )
        .unwrap();

        assert_eq!(files.len(), 2);
        assert_eq!(files[0].path, "data.bin");
        assert_eq!(files[0].data, vec![0, 1]);
        assert_eq!(files[1].path, "main.rs");
    }

    #[test]
    fn test_collect_sources_missing() {
        let result = collect_sources(&["/definitely/not/here"], &CollectConfig::default());
        assert!(matches!(result, Err(TextpackError::Collection(_))));
    }

    #[test]
    fn test_collect_sources_duplicate_paths() {
        let temp = tree();
        let main = temp.path().join("src/main.rs");
        let result = collect_sources(&[main.clone(), main], &CollectConfig::default());
        assert!(matches!(result, Err(TextpackError::Collection(_))));
    }
}
