//! Archive data model and validated path types.
//!
//! `Entry`, `ArchiveMetadata` and `Manifest` describe what an archive holds.
//! `DestDir` and `SafePath` are newtypes that can only be built through
//! validation, so materialization code cannot write to an unchecked path.

pub mod dest_dir;
pub mod entry;
pub mod manifest;
pub mod metadata;
pub mod safe_path;

pub use dest_dir::DestDir;
pub use entry::Entry;
pub use entry::EntryContent;
pub use entry::SourceFile;
pub use manifest::Manifest;
pub use manifest::ManifestRecord;
pub use metadata::ArchiveMetadata;
pub use safe_path::SafePath;
