//! CLI argument parsing using clap.

use clap::Parser;
use clap::Subcommand;
use clap_complete::Shell;
use std::path::Path;
use std::path::PathBuf;

/// Path argument meaning standard input or standard output.
pub const STDIO: &str = "-";

#[derive(Parser)]
#[command(name = "textpack")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Pack files and directories into a text archive
    Pack(PackArgs),
    /// Extract archive contents
    Extract(ExtractArgs),
    /// List archive contents without extraction
    List(ListArgs),
    /// Verify archive integrity
    Verify(VerifyArgs),
    /// Print the built-in format specification
    Spec,
    /// Generate shell completions
    Completion {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(clap::Args)]
pub struct PackArgs {
    /// Output archive path, or `-` for stdout
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Source files or directories to pack
    #[arg(value_name = "SOURCE", required = true)]
    pub sources: Vec<PathBuf>,

    /// Archive name recorded in the header
    #[arg(long)]
    pub name: Option<String>,

    /// One-line description recorded in the header
    #[arg(long)]
    pub description: Option<String>,

    /// Wrap the archive in the gzip layer
    #[arg(short = 'z', long)]
    pub compress: bool,

    /// Encrypt the archive with this password
    #[arg(long, env = "TEXTPACK_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// PBKDF2 iteration count for encryption
    #[arg(long, default_value_t = textpack_core::layers::encryption::DEFAULT_ITERATIONS)]
    pub iterations: u32,

    /// Omit per-file checksums from the manifest
    #[arg(long)]
    pub no_checksum: bool,

    /// Embed this file as the format description instead of the built-in one
    #[arg(long, value_name = "FILE", conflicts_with = "no_spec")]
    pub spec: Option<PathBuf>,

    /// Do not embed a format description
    #[arg(long)]
    pub no_spec: bool,

    /// Exclude pattern (`name`, `*.ext`, `prefix*`; `/` anchors it at the source root)
    #[arg(long = "exclude", short = 'x', value_name = "PATTERN")]
    pub exclude: Vec<String>,

    /// Include hidden files
    #[arg(long)]
    pub include_hidden: bool,

    /// Follow symbolic links
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Strip path prefix from entries
    #[arg(long, value_name = "PREFIX")]
    pub strip_prefix: Option<PathBuf>,

    /// Skip files larger than this size
    #[arg(long, value_parser = parse_byte_size)]
    pub max_file_size: Option<u64>,

    /// Overwrite output file if exists
    #[arg(short = 'f', long)]
    pub force: bool,
}

#[derive(clap::Args)]
pub struct ExtractArgs {
    /// Path to the archive file, or `-` for stdin
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Output directory (default: current directory)
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Password for an encrypted archive
    #[arg(long, env = "TEXTPACK_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Maximum number of files to extract
    #[arg(long, default_value = "10000")]
    pub max_files: usize,

    /// Maximum total extracted size in bytes
    #[arg(long, value_parser = parse_byte_size)]
    pub max_total_size: Option<u64>,

    /// Maximum number of components in an entry path
    #[arg(long, default_value = "32")]
    pub max_depth: usize,

    /// Extract into a scratch directory first, so a bad entry writes nothing
    #[arg(long)]
    pub staged: bool,

    /// Re-read extracted files and compare them with the archive
    #[arg(long)]
    pub verify: bool,

    /// Overwrite existing files
    #[arg(long)]
    pub force: bool,
}

#[derive(clap::Args)]
pub struct ListArgs {
    /// Path to the archive file, or `-` for stdin
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Show detailed file information
    #[arg(short, long)]
    pub long: bool,

    /// Show sizes in human-readable format
    #[arg(short = 'H', long)]
    pub human_readable: bool,

    /// Password for an encrypted archive
    #[arg(long, env = "TEXTPACK_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(clap::Args)]
pub struct VerifyArgs {
    /// Path to the archive file, or `-` for stdin
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Password for an encrypted archive
    #[arg(long, env = "TEXTPACK_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Also compare the archive against files extracted into this directory
    #[arg(long, value_name = "DIR")]
    pub against: Option<PathBuf>,
}

/// Returns `true` if `path` is the stdio placeholder.
pub fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == STDIO
}

/// Parse byte size with optional suffix (K, M, G, T)
#[allow(clippy::option_if_let_else)]
fn parse_byte_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty byte size".to_string());
    }

    let (num_str, multiplier) = if let Some(stripped) = s.strip_suffix('T') {
        (stripped, 1024_u64.pow(4))
    } else if let Some(stripped) = s.strip_suffix('G') {
        (stripped, 1024_u64.pow(3))
    } else if let Some(stripped) = s.strip_suffix('M') {
        (stripped, 1024_u64.pow(2))
    } else if let Some(stripped) = s.strip_suffix('K') {
        (stripped, 1024)
    } else {
        (s, 1)
    };

    num_str
        .parse::<u64>()
        .map_err(|_| format!("invalid byte size: {s}"))
        .and_then(|n| {
            n.checked_mul(multiplier)
                .ok_or_else(|| format!("byte size overflow: {s}"))
        })
}
