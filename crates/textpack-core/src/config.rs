//! Configuration for packing, reading and extracting archives.

use crate::layers::encryption::DEFAULT_ITERATIONS;

/// Default cap on a decompressed layer payload (1 GiB).
pub const DEFAULT_MAX_PAYLOAD_SIZE: u64 = 1024 * 1024 * 1024;

/// Options controlling how raw archive bytes are read.
///
/// # Examples
///
/// ```
/// use textpack_core::ReadOptions;
///
/// let opts = ReadOptions::default().with_password("hunter2");
/// assert!(opts.password.is_some());
/// ```
#[derive(Clone, Default)]
pub struct ReadOptions {
    /// Password for the encrypted layer, if any.
    pub password: Option<String>,

    /// Maximum size of a decompressed layer payload in bytes.
    ///
    /// `None` means [`DEFAULT_MAX_PAYLOAD_SIZE`].
    pub max_payload_size: Option<u64>,
}

impl ReadOptions {
    /// Creates read options with no password.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the password used for the encrypted layer.
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Sets the decompressed payload cap.
    #[must_use]
    pub fn with_max_payload_size(mut self, max: u64) -> Self {
        self.max_payload_size = Some(max);
        self
    }

    /// Returns the effective decompressed payload cap.
    #[must_use]
    pub fn payload_limit(&self) -> u64 {
        self.max_payload_size.unwrap_or(DEFAULT_MAX_PAYLOAD_SIZE)
    }
}

// Manual impl so the password never ends up in logs.
impl std::fmt::Debug for ReadOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadOptions")
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("max_payload_size", &self.max_payload_size)
            .finish()
    }
}

/// Options controlling how an archive is packed.
///
/// # Examples
///
/// ```
/// use textpack_core::PackOptions;
///
/// let opts = PackOptions::default()
///     .with_compress(true)
///     .with_created_at("2026-01-01T00:00:00Z");
/// assert!(opts.compress);
/// ```
#[derive(Clone)]
pub struct PackOptions {
    /// Wrap the serialized archive in the compressed layer.
    pub compress: bool,

    /// Wrap the result in the encrypted layer with this password.
    pub password: Option<String>,

    /// Omit per-entry checksums from the manifest.
    pub no_checksum: bool,

    /// Specification text embedded in the header; `None` embeds nothing.
    ///
    /// Default: the built-in [`FORMAT_SPEC`](crate::FORMAT_SPEC).
    pub spec: Option<String>,

    /// Creation timestamp written to the metadata when the caller's metadata
    /// does not set one. `None` stamps the current time.
    pub created_at: Option<String>,

    /// PBKDF2 iteration count for the encrypted layer.
    pub iterations: u32,
}

impl Default for PackOptions {
    /// Creates `PackOptions` with default settings.
    ///
    /// Default values:
    /// - `compress`: `false`
    /// - `password`: `None`
    /// - `no_checksum`: `false`
    /// - `spec`: the built-in format specification
    /// - `created_at`: `None` (current time)
    /// - `iterations`: 100,000
    fn default() -> Self {
        Self {
            compress: false,
            password: None,
            no_checksum: false,
            spec: Some(crate::FORMAT_SPEC.to_string()),
            created_at: None,
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

impl PackOptions {
    /// Creates `PackOptions` with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables the compressed layer.
    #[must_use]
    pub fn with_compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Enables the encrypted layer with the given password.
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Enables or disables per-entry checksums.
    #[must_use]
    pub fn with_no_checksum(mut self, no_checksum: bool) -> Self {
        self.no_checksum = no_checksum;
        self
    }

    /// Replaces the embedded specification; `None` omits it.
    #[must_use]
    pub fn with_spec(mut self, spec: Option<String>) -> Self {
        self.spec = spec;
        self
    }

    /// Pins the creation timestamp for reproducible output.
    #[must_use]
    pub fn with_created_at(mut self, created_at: impl Into<String>) -> Self {
        self.created_at = Some(created_at.into());
        self
    }

    /// Sets the PBKDF2 iteration count.
    #[must_use]
    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }
}

impl std::fmt::Debug for PackOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackOptions")
            .field("compress", &self.compress)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("no_checksum", &self.no_checksum)
            .field("spec", &self.spec.as_ref().map(String::len))
            .field("created_at", &self.created_at)
            .field("iterations", &self.iterations)
            .finish()
    }
}

/// Policy applied when materializing entries onto a filesystem.
///
/// # Examples
///
/// ```
/// use textpack_core::ExtractConfig;
///
/// let config = ExtractConfig {
///     max_file_count: 100,
///     ..Default::default()
/// };
/// assert!(!config.overwrite);
/// ```
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Maximum number of path components in an entry path.
    pub max_path_depth: usize,

    /// Maximum number of files written by one operation.
    pub max_file_count: usize,

    /// Maximum total bytes written by one operation.
    pub max_total_size: u64,

    /// Replace files that already exist at the target path.
    pub overwrite: bool,
}

impl Default for ExtractConfig {
    /// Creates an `ExtractConfig` with secure default settings.
    ///
    /// Default values:
    /// - `max_path_depth`: 32
    /// - `max_file_count`: 10,000
    /// - `max_total_size`: 1 GiB
    /// - `overwrite`: false
    fn default() -> Self {
        Self {
            max_path_depth: 32,
            max_file_count: 10_000,
            max_total_size: 1024 * 1024 * 1024,
            overwrite: false,
        }
    }
}

impl ExtractConfig {
    /// Allows replacing existing files.
    #[must_use]
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_extract_config() {
        let config = ExtractConfig::default();
        assert_eq!(config.max_path_depth, 32);
        assert_eq!(config.max_file_count, 10_000);
        assert!(!config.overwrite);
        assert!(config.with_overwrite(true).overwrite);
    }

    #[test]
    fn test_default_pack_options_embed_spec() {
        let opts = PackOptions::default();
        assert!(!opts.compress);
        assert!(opts.password.is_none());
        assert_eq!(opts.iterations, 100_000);
        assert!(opts.spec.as_deref().is_some_and(|s| !s.is_empty()));
        assert!(opts.with_spec(None).spec.is_none());
    }

    #[test]
    fn test_debug_redacts_passwords() {
        let read = ReadOptions::new().with_password("s3cret");
        let pack = PackOptions::new().with_password("s3cret");
        assert!(!format!("{read:?}").contains("s3cret"));
        assert!(!format!("{pack:?}").contains("s3cret"));
    }

    #[test]
    fn test_payload_limit_default() {
        assert_eq!(ReadOptions::new().payload_limit(), DEFAULT_MAX_PAYLOAD_SIZE);
        assert_eq!(ReadOptions::new().with_max_payload_size(5).payload_limit(), 5);
    }
}
