//! Optional envelopes around a serialized archive.
//!
//! A layer wraps a complete archive in another text file with its own marker
//! line. Packing applies compression first and encryption last; reading
//! peels them in the opposite order.

pub mod compression;
pub mod encryption;
pub mod envelope;

/// A layer recognized while reading an archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    /// AES-256-GCM envelope.
    Encrypted,
    /// Gzip envelope.
    Compressed,
}

impl LayerKind {
    /// Returns a short lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Encrypted => "encrypted",
            Self::Compressed => "compressed",
        }
    }
}

impl std::fmt::Display for LayerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Returns the outermost layer `data` is wrapped in, if any.
///
/// # Examples
///
/// ```
/// use textpack_core::layers::{self, LayerKind};
///
/// let wrapped = layers::compression::wrap(b"# TEXTPACK ARCHIVE v2\n").unwrap();
/// assert_eq!(layers::detect(&wrapped), Some(LayerKind::Compressed));
/// assert_eq!(layers::detect(b"# TEXTPACK ARCHIVE v2\n"), None);
/// ```
#[must_use]
pub fn detect(data: &[u8]) -> Option<LayerKind> {
    if encryption::detect(data) {
        Some(LayerKind::Encrypted)
    } else if compression::detect(data) {
        Some(LayerKind::Compressed)
    } else {
        None
    }
}
