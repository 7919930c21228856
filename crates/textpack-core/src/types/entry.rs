//! Archive entries and packing inputs.

use std::borrow::Cow;

use crate::integrity;

/// Content of one packed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryContent {
    /// UTF-8 text, stored verbatim in the archive body.
    Text(String),
    /// Arbitrary bytes, stored base64-encoded.
    Binary(Vec<u8>),
}

impl EntryContent {
    /// Returns the raw content bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(text) => text.as_bytes(),
            Self::Binary(data) => data,
        }
    }

    /// Returns `true` for [`EntryContent::Binary`].
    #[must_use]
    pub const fn is_binary(&self) -> bool {
        matches!(self, Self::Binary(_))
    }

    /// Returns the bytes that materializing this content writes to disk.
    ///
    /// Non-empty text gets exactly one trailing newline if it lacks one;
    /// binary content is returned unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use textpack_core::types::EntryContent;
    ///
    /// let text = EntryContent::Text("hi".to_string());
    /// assert_eq!(&*text.materialized(), b"hi\n");
    ///
    /// let text = EntryContent::Text("hi\n".to_string());
    /// assert_eq!(&*text.materialized(), b"hi\n");
    ///
    /// let empty = EntryContent::Text(String::new());
    /// assert!(empty.materialized().is_empty());
    /// ```
    #[must_use]
    pub fn materialized(&self) -> Cow<'_, [u8]> {
        match self {
            Self::Text(text) if !text.is_empty() && !text.ends_with('\n') => {
                let mut bytes = Vec::with_capacity(text.len() + 1);
                bytes.extend_from_slice(text.as_bytes());
                bytes.push(b'\n');
                Cow::Owned(bytes)
            }
            _ => Cow::Borrowed(self.as_bytes()),
        }
    }
}

/// One logical file inside an archive.
///
/// The `path` is kept exactly as written in the archive. It is not validated
/// here: a hostile archive may carry `../x` or `/etc/passwd` as data, and the
/// path guard rejects it when the entry is materialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Relative, `/`-separated path.
    pub path: String,
    /// Text or binary content.
    pub content: EntryContent,
    /// Byte length of the original content.
    pub size: u64,
    /// Truncated SHA-256 of the materialized content, if recorded.
    pub checksum: Option<String>,
}

impl Entry {
    /// Creates a text entry without a checksum.
    pub fn text(path: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            path: path.into(),
            size: text.len() as u64,
            content: EntryContent::Text(text),
            checksum: None,
        }
    }

    /// Creates a binary entry without a checksum.
    pub fn binary(path: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        let data = data.into();
        Self {
            path: path.into(),
            size: data.len() as u64,
            content: EntryContent::Binary(data),
            checksum: None,
        }
    }

    /// Classifies raw bytes into a text or binary entry.
    ///
    /// Content is binary when a NUL byte appears in the first 8 KiB or when it
    /// is not valid UTF-8.
    ///
    /// # Examples
    ///
    /// ```
    /// use textpack_core::types::Entry;
    ///
    /// assert!(!Entry::from_bytes("a.txt", b"hello".to_vec()).is_binary());
    /// assert!(Entry::from_bytes("a.bin", vec![0, 1, 2]).is_binary());
    /// assert!(Entry::from_bytes("latin1.txt", vec![0xE9]).is_binary());
    /// ```
    pub fn from_bytes(path: impl Into<String>, data: Vec<u8>) -> Self {
        if integrity::is_binary(&data) {
            return Self::binary(path, data);
        }
        match String::from_utf8(data) {
            Ok(text) => Self::text(path, text),
            Err(err) => Self::binary(path, err.into_bytes()),
        }
    }

    /// Returns `true` if the content is binary.
    #[must_use]
    pub const fn is_binary(&self) -> bool {
        self.content.is_binary()
    }

    /// Returns the bytes materializing this entry writes to disk.
    #[must_use]
    pub fn materialized(&self) -> Cow<'_, [u8]> {
        self.content.materialized()
    }

    /// Computes and stores the truncated checksum of the materialized content.
    #[must_use]
    pub fn with_checksum(mut self) -> Self {
        self.checksum = Some(integrity::short_checksum(&self.materialized()));
        self
    }

    /// Converts a text entry into a binary one.
    ///
    /// A recorded checksum is recomputed, since binary content is
    /// materialized without newline normalization.
    #[must_use]
    pub(crate) fn into_binary(self) -> Self {
        let had_checksum = self.checksum.is_some();
        let converted = match self.content {
            EntryContent::Text(text) => Self {
                content: EntryContent::Binary(text.into_bytes()),
                checksum: None,
                ..self
            },
            EntryContent::Binary(_) => return self,
        };
        if had_checksum {
            converted.with_checksum()
        } else {
            converted
        }
    }
}

/// A file handed to the packer: an archive path and its raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Relative, `/`-separated path inside the archive.
    pub path: String,
    /// Raw file content.
    pub data: Vec<u8>,
}

impl SourceFile {
    /// Creates a new source file.
    pub fn new(path: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            data: data.into(),
        }
    }
}
