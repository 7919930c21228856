//! Property-based tests for the codec, the layers and the path guard.
//!
//! These tests use proptest to generate arbitrary entry lists and paths and
//! check that round trips and guard decisions hold across them.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use proptest::prelude::*;
use tempfile::TempDir;
use textpack_core::DestDir;
use textpack_core::ExtractConfig;
use textpack_core::ReadOptions;
use textpack_core::TextpackError;
use textpack_core::formats::current;
use textpack_core::layers::compression;
use textpack_core::layers::encryption;
use textpack_core::read_archive;
use textpack_core::security;
use textpack_core::types::ArchiveMetadata;
use textpack_core::types::Entry;
use textpack_core::types::EntryContent;

fn create_test_dest() -> (TempDir, DestDir) {
    let temp = TempDir::new().expect("failed to create temp dir");
    let dest = DestDir::new(temp.path()).expect("failed to create dest");
    (temp, dest)
}

fn path_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-zA-Z0-9_ .-]{1,12}", 1..4).prop_map(|parts| parts.join("/"))
}

fn entry_strategy() -> impl Strategy<Value = Entry> {
    prop_oneof![
        (path_strategy(), "[^\u{0}]{0,200}").prop_map(|(path, text)| Entry::text(path, text)),
        (path_strategy(), prop::collection::vec(any::<u8>(), 0..300))
            .prop_map(|(path, data)| Entry::binary(path, data)),
    ]
}

fn find(haystack: &[u8], needle: &str) -> usize {
    haystack
        .windows(needle.len())
        .position(|w| w == needle.as_bytes())
        .expect("boundary line present")
}

/// Text comes back with exactly one trailing newline when non-empty.
fn normalized(content: &EntryContent) -> Vec<u8> {
    match content {
        EntryContent::Text(text) if text.is_empty() => Vec::new(),
        EntryContent::Text(text) => {
            let mut bytes = text.strip_suffix('\n').unwrap_or(text).as_bytes().to_vec();
            bytes.push(b'\n');
            bytes
        }
        EntryContent::Binary(data) => data.clone(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Serialize then parse keeps paths, kinds and normalized content.
    #[test]
    fn prop_codec_round_trip(
        entries in prop::collection::vec(entry_strategy(), 0..6),
        name in proptest::option::of("[a-zA-Z0-9 ]{1,20}"),
    ) {
        let mut metadata = ArchiveMetadata::new();
        metadata.name = name;
        let bytes = current::serialize(&entries, &metadata, Some("stub spec\nsecond line"));
        let parsed = current::parse(&bytes).unwrap();

        prop_assert_eq!(parsed.metadata, metadata);
        prop_assert_eq!(parsed.entries.len(), entries.len());
        for (original, decoded) in entries.iter().zip(&parsed.entries) {
            prop_assert_eq!(&decoded.path, &original.path);
            prop_assert_eq!(&*decoded.materialized(), &*original.materialized());
            if !decoded.is_binary() {
                prop_assert_eq!(decoded.content.as_bytes(), &normalized(&original.content)[..]);
            }
        }
    }

    /// The compressed layer returns its input unchanged.
    #[test]
    fn prop_compression_round_trip(payload in prop::collection::vec(any::<u8>(), 0..2048)) {
        let wrapped = compression::wrap(&payload).unwrap();
        prop_assert!(compression::detect(&wrapped));
        prop_assert_eq!(compression::unwrap(&wrapped).unwrap(), payload);
    }

    /// The encrypted layer returns its input unchanged with the right password.
    #[test]
    fn prop_encryption_round_trip(
        payload in prop::collection::vec(any::<u8>(), 0..512),
        password in "[ -~]{1,16}",
    ) {
        let sealed = encryption::wrap_with_iterations(&payload, &password, 1_000).unwrap();
        prop_assert_eq!(encryption::unwrap(&sealed, &password).unwrap(), payload);
    }

    /// Overwriting any body byte of a wrapped layer with any other value,
    /// including bytes that are not UTF-8, is reported as tampering.
    #[test]
    fn prop_altered_body_byte_detected(
        payload in prop::collection::vec(any::<u8>(), 1..512),
        pick in any::<prop::sample::Index>(),
        value in any::<u8>(),
        encrypt in any::<bool>(),
    ) {
        let (wrapped, boundary) = if encrypt {
            (
                encryption::wrap_with_iterations(&payload, "pw", 1_000).unwrap(),
                encryption::BOUNDARY,
            )
        } else {
            (compression::wrap(&payload).unwrap(), compression::BOUNDARY)
        };
        let start = find(&wrapped, boundary.begin) + boundary.begin.len() + 1;
        let stop = find(&wrapped, boundary.end);
        let offsets: Vec<usize> = (start..stop).filter(|&i| wrapped[i] != b'\n').collect();
        let offset = offsets[pick.index(offsets.len())];
        prop_assume!(wrapped[offset] != value);

        let mut tampered = wrapped;
        tampered[offset] = value;
        let result = if encrypt {
            encryption::unwrap(&tampered, "pw")
        } else {
            compression::unwrap(&tampered)
        };
        prop_assert!(
            matches!(
                result,
                Err(TextpackError::IntegrityError { .. }
                    | TextpackError::CorruptPayload(_)
                    | TextpackError::WrongPasswordOrCorrupt)
            ),
            "byte {:#04x} at {}: {:?}",
            value,
            offset,
            result.map(|v| v.len())
        );
    }

    /// Text containing its own end delimiter still round trips.
    #[test]
    fn prop_delimiter_lookalike_content(path in path_strategy(), before in "[a-z]{0,10}") {
        let text = format!("{before}\n=== END {path} ===\n");
        let entries = vec![Entry::text(path.clone(), text.clone())];
        let bytes = current::serialize(&entries, &ArchiveMetadata::new(), None);
        let parsed = read_archive(&bytes, &ReadOptions::new()).unwrap();
        prop_assert_eq!(parsed.entries[0].content.as_bytes(), text.as_bytes());
    }

    /// Any path with a `..` segment is rejected.
    #[test]
    fn prop_parent_traversal_rejected(
        prefix in "([a-z]+/){0,5}",
        suffix in "([a-z]+/?){0,5}",
        backslash in any::<bool>(),
    ) {
        let (_temp, dest) = create_test_dest();
        let sep = if backslash { "\\" } else { "/" };
        let candidate = format!("{prefix}..{sep}{suffix}");
        let result = security::resolve(&candidate, &dest, &ExtractConfig::default());
        prop_assert!(
            matches!(result, Err(TextpackError::PathTraversal { .. })),
            "path with .. should be rejected"
        );
    }

    /// Absolute paths are rejected.
    #[test]
    fn prop_absolute_rejected(rest in "[a-z]{1,10}(/[a-z]{1,10}){0,3}") {
        let (_temp, dest) = create_test_dest();
        let config = ExtractConfig::default();
        let unix_abs = format!("/{rest}");
        let windows_abs = format!("C:/{rest}");
        prop_assert!(security::resolve(&unix_abs, &dest, &config).is_err());
        prop_assert!(security::resolve(&windows_abs, &dest, &config).is_err());
    }

    /// Plain relative paths are accepted and stay under the destination.
    #[test]
    fn prop_valid_relative_paths_accepted(
        components in prop::collection::vec("[a-zA-Z0-9_-]{1,20}(\\.\\.[a-z]{1,3})?", 1..5)
    ) {
        let (_temp, dest) = create_test_dest();
        let safe = security::resolve(&components.join("/"), &dest, &ExtractConfig::default());
        prop_assert!(safe.is_ok(), "valid path should be accepted");
        prop_assert!(dest.join(&safe.unwrap()).starts_with(dest.as_path()));
    }

    /// Paths deeper than the limit are rejected.
    #[test]
    fn prop_excessive_depth_rejected(depth in 33usize..100) {
        let (_temp, dest) = create_test_dest();
        let components: Vec<String> = (0..depth).map(|i| format!("d{i}")).collect();
        let result = security::resolve(&components.join("/"), &dest, &ExtractConfig::default());
        prop_assert!(
            matches!(result, Err(TextpackError::SecurityViolation { .. })),
            "excessive depth should be rejected"
        );
    }
}
