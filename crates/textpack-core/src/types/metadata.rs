//! Free-form archive metadata.

use std::collections::BTreeMap;

/// Key/value metadata recorded in an archive header.
///
/// No field is required. Absent fields are omitted on output and stay `None`
/// when parsing. Keys outside the well-known set are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveMetadata {
    /// Human name of the archive.
    pub name: Option<String>,
    /// One-line description.
    pub description: Option<String>,
    /// Number of entries at pack time.
    pub file_count: Option<usize>,
    /// Human-readable total content size.
    pub total_size: Option<String>,
    /// RFC 3339 creation timestamp.
    pub created_at: Option<String>,
    /// Optional sentinel value carried through untouched.
    pub sentinel: Option<String>,
    /// Any other header key.
    pub extra: BTreeMap<String, String>,
}

impl ArchiveMetadata {
    /// Creates empty metadata.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the archive name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the archive description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Stores one parsed `key: value` pair.
    ///
    /// A `file_count` that is not a number is kept in `extra` so nothing in
    /// the header is lost.
    pub fn set(&mut self, key: &str, value: String) {
        match key {
            "name" => self.name = Some(value),
            "description" => self.description = Some(value),
            "file_count" => match value.parse() {
                Ok(count) => self.file_count = Some(count),
                Err(_) => {
                    self.extra.insert(key.to_string(), value);
                }
            },
            "total_size" => self.total_size = Some(value),
            "created_at" => self.created_at = Some(value),
            "sentinel" => self.sentinel = Some(value),
            _ => {
                self.extra.insert(key.to_string(), value);
            }
        }
    }

    /// Returns the present fields as `(key, value)` pairs in output order.
    ///
    /// # Examples
    ///
    /// ```
    /// use textpack_core::types::ArchiveMetadata;
    ///
    /// let meta = ArchiveMetadata::new().with_name("demo");
    /// assert_eq!(meta.pairs(), vec![("name".to_string(), "demo".to_string())]);
    /// ```
    #[must_use]
    pub fn pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        let known = [
            ("name", self.name.clone()),
            ("description", self.description.clone()),
            ("file_count", self.file_count.map(|c| c.to_string())),
            ("total_size", self.total_size.clone()),
            ("created_at", self.created_at.clone()),
            ("sentinel", self.sentinel.clone()),
        ];
        for (key, value) in known {
            if let Some(value) = value {
                pairs.push((key.to_string(), value));
            }
        }
        pairs.extend(self.extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        pairs
    }

    /// Returns `true` if no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs().is_empty()
    }
}

/// Returns `true` if `key` may appear as a metadata key in a header line.
pub(crate) fn is_valid_key(key: &str) -> bool {
    let mut chars = key.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c == '_')
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_known_and_extra_keys() {
        let mut meta = ArchiveMetadata::new();
        meta.set("name", "demo".into());
        meta.set("file_count", "3".into());
        meta.set("author", "someone".into());

        assert_eq!(meta.name.as_deref(), Some("demo"));
        assert_eq!(meta.file_count, Some(3));
        assert_eq!(meta.extra.get("author").map(String::as_str), Some("someone"));
    }

    #[test]
    fn test_non_numeric_file_count_goes_to_extra() {
        let mut meta = ArchiveMetadata::new();
        meta.set("file_count", "many".into());
        assert_eq!(meta.file_count, None);
        assert_eq!(meta.extra.get("file_count").map(String::as_str), Some("many"));
    }

    #[test]
    fn test_pairs_order_and_omission() {
        let mut meta = ArchiveMetadata::new().with_description("d").with_name("n");
        meta.extra.insert("zeta".into(), "z".into());
        let keys: Vec<String> = meta.pairs().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["name", "description", "zeta"]);
        assert!(ArchiveMetadata::new().is_empty());
    }

    #[test]
    fn test_valid_keys() {
        assert!(is_valid_key("name"));
        assert!(is_valid_key("created_at"));
        assert!(is_valid_key("_x1"));
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("Name"));
        assert!(!is_valid_key("has space"));
        assert!(!is_valid_key("1abc"));
    }
}
