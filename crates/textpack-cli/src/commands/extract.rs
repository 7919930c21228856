//! Extract command implementation.

use super::load_archive;
use crate::cli::ExtractArgs;
use crate::error::add_archive_context;
use crate::output::OutputFormatter;
use crate::progress::CliProgress;
use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
use std::env;
use textpack_core::DestDir;
use textpack_core::ExtractConfig;
use textpack_core::NoopProgress;
use textpack_core::ProgressCallback;
use textpack_core::materialize;

pub fn execute(args: &ExtractArgs, formatter: &dyn OutputFormatter, quiet: bool) -> Result<()> {
    let output_dir = match &args.output_dir {
        Some(dir) => dir.clone(),
        None => env::current_dir().context("failed to get current directory")?,
    };

    let defaults = ExtractConfig::default();
    let config = ExtractConfig {
        max_path_depth: args.max_depth,
        max_file_count: args.max_files,
        max_total_size: args.max_total_size.unwrap_or(defaults.max_total_size),
        overwrite: args.force,
    };

    let archive = load_archive(&args.archive, args.password.as_deref())?;
    let dest = add_archive_context(DestDir::create(&output_dir), &args.archive)?;

    let mut bar;
    let mut noop = NoopProgress;
    let progress: &mut dyn ProgressCallback = if !quiet && CliProgress::should_show() {
        bar = CliProgress::new(archive.entries.len(), "Extracting");
        &mut bar
    } else {
        &mut noop
    };

    let result = if args.staged {
        materialize::apply_staged(&archive.entries, &dest, &config, progress)
    } else {
        materialize::apply(&archive.entries, &dest, &config, progress)
    };
    let mut report = add_archive_context(result, &args.archive)?;
    report.warnings.splice(0..0, archive.warnings);

    formatter.format_extraction_result(&report)?;

    if args.verify {
        let check = materialize::verify(&archive.entries, &dest, &config);
        if !check.is_success() {
            for file in check.files.iter().filter(|f| !f.status.is_match()) {
                formatter.format_warning(&format!("{}: {:?}", file.path, file.status));
            }
            bail!(
                "{} of {} extracted files do not match the archive",
                check.failed(),
                check.files.len()
            );
        }
    }

    Ok(())
}
