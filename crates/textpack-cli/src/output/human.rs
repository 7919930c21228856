//! Human-readable output formatter with colors and styling.

use super::formatter::OutputFormatter;
use super::formatter::PackSummary;
use super::formatter::VerifySummary;
use anyhow::Result;
use console::Term;
use console::style;
use std::path::Path;
use textpack_core::ExtractionReport;
use textpack_core::ParsedArchive;
use textpack_core::integrity::format_size;
use textpack_core::report::FileStatus;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
        }
    }

    fn format_number(n: usize) -> String {
        let s = n.to_string();
        let mut result = String::new();
        let mut count = 0;

        for c in s.chars().rev() {
            if count == 3 {
                result.push(',');
                count = 0;
            }
            result.push(c);
            count += 1;
        }

        result.chars().rev().collect()
    }

    fn headline(&self, ok: bool, message: &str) {
        let line = match (self.use_colors, ok) {
            (true, true) => format!("{} {message}", style("✓").green().bold()),
            (true, false) => format!("{} {message}", style("✗").red().bold()),
            (false, _) => message.to_string(),
        };
        let _ = self.term.write_line(&line);
    }

    fn warnings(&self, warnings: &[String]) {
        if warnings.is_empty() {
            return;
        }
        let _ = self.term.write_line("");
        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{}", style("Warnings:").yellow().bold()));
        } else {
            let _ = self.term.write_line("Warnings:");
        }
        for warning in warnings {
            let _ = self.term.write_line(&format!("  - {warning}"));
        }
    }

    fn status_label(&self, status: &FileStatus) -> String {
        let (label, detail) = match status {
            FileStatus::Match => ("OK", String::new()),
            FileStatus::Mismatch {
                expected_len,
                actual_len,
            } => (
                "DIFFERS",
                format!(" (expected {expected_len} bytes, found {actual_len})"),
            ),
            FileStatus::Missing => ("MISSING", String::new()),
            FileStatus::Unsafe(reason) => ("UNSAFE", format!(" ({reason})")),
            FileStatus::Unreadable(reason) => ("UNREADABLE", format!(" ({reason})")),
        };
        if !self.use_colors {
            return format!("[{label}]{detail}");
        }
        let styled = if status.is_match() {
            style(label).green().to_string()
        } else {
            style(label).red().bold().to_string()
        };
        format!("{styled}{detail}")
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_pack_result(&self, output_path: &Path, summary: &PackSummary) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        self.headline(true, &format!("Archive created: {}", output_path.display()));
        let _ = self.term.write_line("");
        let _ = self.term.write_line(&format!(
            "  Files added:      {}",
            Self::format_number(summary.files)
        ));
        let _ = self.term.write_line(&format!(
            "  Content size:     {}",
            format_size(summary.content_bytes)
        ));
        let _ = self.term.write_line(&format!(
            "  Archive size:     {}",
            format_size(summary.archive_bytes)
        ));

        let mut layers = Vec::new();
        if summary.compressed {
            layers.push("gzip");
        }
        if summary.encrypted {
            layers.push("AES-256-GCM");
        }
        if !layers.is_empty() {
            let _ = self
                .term
                .write_line(&format!("  Layers:           {}", layers.join(" + ")));
        }

        Ok(())
    }

    fn format_extraction_result(&self, report: &ExtractionReport) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        self.headline(true, "Extraction complete");
        let _ = self
            .term
            .write_line(&format!("  Files extracted: {}", report.files_extracted));
        let _ = self
            .term
            .write_line(&format!("  Directories: {}", report.directories_created));
        let _ = self.term.write_line(&format!(
            "  Total size: {}",
            format_size(report.bytes_written)
        ));

        if self.verbose {
            if report.files_skipped > 0 {
                let _ = self
                    .term
                    .write_line(&format!("  Skipped: {}", report.files_skipped));
            }
            let _ = self
                .term
                .write_line(&format!("  Duration: {:?}", report.duration));
        }

        self.warnings(&report.warnings);
        Ok(())
    }

    fn format_listing(&self, archive: &ParsedArchive, long: bool, human_readable: bool) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        if !long {
            for entry in &archive.entries {
                let _ = self.term.write_line(&entry.path);
            }
            return Ok(());
        }

        if let Some(name) = &archive.metadata.name {
            let _ = self.term.write_line(&format!("Name: {name}"));
        }
        if let Some(description) = &archive.metadata.description {
            let _ = self.term.write_line(&format!("Description: {description}"));
        }
        let mut format = archive.generation.name().to_string();
        for layer in &archive.layers {
            format.push_str(&format!(", {layer}"));
        }
        let _ = self.term.write_line(&format!("Format: {format}"));
        let _ = self.term.write_line("");

        for entry in &archive.entries {
            let size_str = if human_readable {
                format_size(entry.size)
            } else {
                entry.size.to_string()
            };
            let kind = if entry.is_binary() { "binary" } else { "text" };
            let checksum = entry.checksum.as_deref().unwrap_or("-");

            let _ = self.term.write_line(&format!(
                "{kind:<6} {size_str:>10}  {checksum:<16}  {}",
                entry.path
            ));
        }

        let _ = self.term.write_line("");
        let _ = self.term.write_line(&format!(
            "Total: {} files, {}",
            Self::format_number(archive.entries.len()),
            format_size(archive.total_size())
        ));

        self.warnings(&archive.warnings);
        Ok(())
    }

    fn format_verification(&self, summary: &VerifySummary) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        let passed = summary.passed();
        let status = match (self.use_colors, passed) {
            (true, true) => style("PASSED").green().bold().to_string(),
            (true, false) => style("FAILED").red().bold().to_string(),
            (false, true) => "PASSED".to_string(),
            (false, false) => "FAILED".to_string(),
        };
        let _ = self
            .term
            .write_line(&format!("Archive verification: {status}"));
        let _ = self.term.write_line(&format!(
            "  Total entries: {}",
            Self::format_number(summary.entries)
        ));
        let _ = self.term.write_line(&format!(
            "  Checksum mismatches: {}",
            summary.mismatches.len()
        ));

        for mismatch in &summary.mismatches {
            let _ = self.term.write_line(&format!(
                "  {}: recorded {}, content hashes to {}",
                mismatch.path, mismatch.expected, mismatch.actual
            ));
        }

        if let Some(report) = &summary.on_disk {
            let _ = self.term.write_line(&format!(
                "  Files on disk: {} match, {} differ",
                report.passed(),
                report.failed()
            ));
            for check in &report.files {
                if self.verbose || !check.status.is_match() {
                    let _ = self.term.write_line(&format!(
                        "    {} {}",
                        self.status_label(&check.status),
                        check.path
                    ));
                }
            }
        }

        self.warnings(&summary.warnings);
        Ok(())
    }

    fn format_warning(&self, message: &str) {
        if self.quiet {
            return;
        }

        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{} {message}", style("⚠").yellow().bold()));
        } else {
            let _ = self.term.write_line(&format!("WARNING: {message}"));
        }
    }
}
