//! Subcommand implementations.

pub mod completion;
pub mod extract;
pub mod list;
pub mod pack;
pub mod spec;
pub mod verify;

use crate::cli::is_stdio;
use crate::error::add_archive_context;
use anyhow::Context;
use anyhow::Result;
use std::io::Read;
use std::path::Path;
use textpack_core::ParsedArchive;
use textpack_core::ReadOptions;
use textpack_core::read_archive;

/// Reads archive bytes from a file, or from stdin for `-`.
fn read_input(path: &Path) -> Result<Vec<u8>> {
    if is_stdio(path) {
        let mut data = Vec::new();
        std::io::stdin()
            .read_to_end(&mut data)
            .context("failed to read archive from stdin")?;
        return Ok(data);
    }
    std::fs::read(path).with_context(|| format!("failed to read archive '{}'", path.display()))
}

/// Reads and parses an archive, peeling any layers.
fn load_archive(path: &Path, password: Option<&str>) -> Result<ParsedArchive> {
    let data = read_input(path)?;
    let mut opts = ReadOptions::new();
    if let Some(password) = password {
        opts = opts.with_password(password);
    }
    add_archive_context(read_archive(&data, &opts), path)
}
