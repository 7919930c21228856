//! Pack command implementation.

use crate::cli::PackArgs;
use crate::cli::is_stdio;
use crate::output::OutputFormatter;
use crate::output::PackSummary;
use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
use std::io::Write;
use textpack_core::PackOptions;
use textpack_core::creation::CollectConfig;
use textpack_core::creation::collect_sources;
use textpack_core::pack;
use textpack_core::types::ArchiveMetadata;

pub fn execute(args: &PackArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let to_stdout = is_stdio(&args.output);
    if !to_stdout && args.output.exists() && !args.force {
        bail!(
            "Output file '{}' already exists\n\
             HINT: Use --force to overwrite.",
            args.output.display()
        );
    }

    let mut config = CollectConfig::default()
        .with_include_hidden(args.include_hidden)
        .with_follow_symlinks(args.follow_symlinks)
        .with_max_file_size(args.max_file_size)
        .with_strip_prefix(args.strip_prefix.clone());
    for pattern in &args.exclude {
        config = config.with_exclude_pattern(pattern.clone());
    }

    let files = collect_sources(&args.sources, &config).context("failed to collect sources")?;
    if files.is_empty() {
        formatter.format_warning("no files matched; the archive will be empty");
    }

    let mut metadata = ArchiveMetadata::new();
    metadata.name = args.name.clone().or_else(|| default_name(args));
    metadata.description.clone_from(&args.description);

    let spec = if args.no_spec {
        None
    } else if let Some(path) = &args.spec {
        Some(
            std::fs::read_to_string(path)
                .with_context(|| format!("failed to read spec file '{}'", path.display()))?,
        )
    } else {
        Some(textpack_core::FORMAT_SPEC.to_string())
    };

    let mut opts = PackOptions::default()
        .with_compress(args.compress)
        .with_no_checksum(args.no_checksum)
        .with_spec(spec)
        .with_iterations(args.iterations);
    if let Some(password) = &args.password {
        opts = opts.with_password(password.clone());
    }

    let bytes = pack(&files, &metadata, &opts).context("failed to pack archive")?;

    if to_stdout {
        std::io::stdout()
            .write_all(&bytes)
            .context("failed to write archive to stdout")?;
        return Ok(());
    }

    std::fs::write(&args.output, &bytes)
        .with_context(|| format!("failed to write '{}'", args.output.display()))?;

    let summary = PackSummary {
        files: files.len(),
        content_bytes: files.iter().map(|f| f.data.len() as u64).sum(),
        archive_bytes: bytes.len() as u64,
        compressed: args.compress,
        encrypted: args.password.is_some(),
    };
    formatter.format_pack_result(&args.output, &summary)
}

/// Names the archive after its only source when none was given.
fn default_name(args: &PackArgs) -> Option<String> {
    match args.sources.as_slice() {
        [single] => single
            .canonicalize()
            .ok()?
            .file_name()?
            .to_str()
            .map(str::to_string),
        _ => None,
    }
}
