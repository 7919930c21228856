//! Verify command implementation

use super::load_archive;
use crate::cli::VerifyArgs;
use crate::error::add_archive_context;
use crate::output::OutputFormatter;
use crate::output::VerifySummary;
use anyhow::Result;
use anyhow::bail;
use textpack_core::DestDir;
use textpack_core::ExtractConfig;
use textpack_core::materialize;

pub fn execute(args: &VerifyArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let archive = load_archive(&args.archive, args.password.as_deref())?;

    let on_disk = match &args.against {
        Some(dir) => {
            let dest = add_archive_context(DestDir::new(dir), &args.archive)?;
            Some(materialize::verify(
                &archive.entries,
                &dest,
                &ExtractConfig::default(),
            ))
        }
        None => None,
    };

    let summary = VerifySummary {
        entries: archive.entries.len(),
        mismatches: archive.checksum_mismatches(),
        warnings: archive.warnings,
        on_disk,
    };

    formatter.format_verification(&summary)?;

    if summary.passed() {
        Ok(())
    } else {
        bail!("Archive verification failed")
    }
}
