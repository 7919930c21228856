//! List command implementation

use super::load_archive;
use crate::cli::ListArgs;
use crate::output::OutputFormatter;
use anyhow::Result;

pub fn execute(args: &ListArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let archive = load_archive(&args.archive, args.password.as_deref())?;
    formatter.format_listing(&archive, args.long, args.human_readable)
}
