//! Progress bar implementation for CLI operations.

use console::Term;
use indicatif::ProgressBar;
use indicatif::ProgressStyle;
use std::path::Path;
use textpack_core::ProgressCallback;
use textpack_core::integrity::format_size;

/// CLI progress bar wrapper implementing `ProgressCallback`.
///
/// Counts entries on the bar and shows the bytes written so far. Cleans up
/// on drop.
pub struct CliProgress {
    bar: ProgressBar,
    bytes_written: u64,
}

impl CliProgress {
    /// Creates a progress bar over `total` entries.
    #[must_use]
    pub fn new(total: usize, message: &str) -> Self {
        let bar = ProgressBar::new(total as u64);

        // "[████████░░░░] 42/100 files (3s) 15.2 KiB src/main.rs"
        bar.set_style(
            ProgressStyle::default_bar()
                .template("[{bar:40.cyan/blue}] {pos}/{len} files ({elapsed}) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓░"),
        );

        bar.set_message(message.to_string());

        Self {
            bar,
            bytes_written: 0,
        }
    }

    /// Checks if we should show progress (TTY detection).
    #[must_use]
    pub fn should_show() -> bool {
        Term::stderr().is_term()
    }

    fn refresh_message(&self, path: &Path) {
        self.bar.set_message(format!(
            "{} {}",
            format_size(self.bytes_written),
            path.display()
        ));
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressCallback for CliProgress {
    fn on_entry_start(&mut self, path: &Path, total: usize, _current: usize) {
        self.bar.set_length(total as u64);
        self.refresh_message(path);
    }

    fn on_bytes_written(&mut self, bytes: u64) {
        self.bytes_written = self.bytes_written.saturating_add(bytes);
    }

    fn on_entry_complete(&mut self, path: &Path) {
        self.refresh_message(path);
        self.bar.inc(1);
    }

    fn on_complete(&mut self) {
        self.bar.finish_and_clear();
    }
}
