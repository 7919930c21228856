//! Collecting files from disk for packing.

pub mod config;
pub mod filters;
pub mod walker;

pub use config::CollectConfig;
pub use walker::CollectedFile;
pub use walker::FilteredWalker;
pub use walker::collect_sources;
