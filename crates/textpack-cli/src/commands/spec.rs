//! Spec command: prints the built-in format specification.

use anyhow::Result;
use std::io::Write;
use std::io::{self};

pub fn execute() -> Result<()> {
    io::stdout().write_all(textpack_core::FORMAT_SPEC.as_bytes())?;
    Ok(())
}
