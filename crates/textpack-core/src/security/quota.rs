//! Materialization quota tracking.

use crate::ExtractConfig;
use crate::Result;
use crate::TextpackError;
use crate::error::QuotaResource;

/// Tracks files and bytes written by one materialization.
#[derive(Debug, Default)]
pub struct QuotaTracker {
    files_written: usize,
    bytes_written: u64,
}

impl QuotaTracker {
    /// Creates a new quota tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one file about to be written.
    ///
    /// # Errors
    ///
    /// Returns `QuotaExceeded` if the file count or total size limit is
    /// crossed, or if the byte counter would overflow.
    pub fn record_file(&mut self, size: u64, config: &ExtractConfig) -> Result<()> {
        let files = self.files_written + 1;
        let bytes = self
            .bytes_written
            .checked_add(size)
            .ok_or(TextpackError::QuotaExceeded {
                resource: QuotaResource::IntegerOverflow,
            })?;

        if files > config.max_file_count {
            return Err(TextpackError::QuotaExceeded {
                resource: QuotaResource::FileCount {
                    current: files,
                    max: config.max_file_count,
                },
            });
        }

        if bytes > config.max_total_size {
            return Err(TextpackError::QuotaExceeded {
                resource: QuotaResource::TotalSize {
                    current: bytes,
                    max: config.max_total_size,
                },
            });
        }

        self.files_written = files;
        self.bytes_written = bytes;
        Ok(())
    }

    /// Returns the number of files recorded.
    #[must_use]
    pub const fn files_written(&self) -> usize {
        self.files_written
    }

    /// Returns the total bytes recorded.
    #[must_use]
    pub const fn bytes_written(&self) -> u64 {
        self.bytes_written
    }
}
