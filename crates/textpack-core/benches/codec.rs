//! Codec and layer throughput benchmarks for textpack.
//!
//! Measures:
//! - Serializing and parsing archives of text and binary entries
//! - Wrapping and unwrapping the compressed layer
//! - Path guard cost per entry

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::cast_possible_truncation,
    missing_docs
)]

use criterion::BenchmarkId;
use criterion::Criterion;
use criterion::Throughput;
use criterion::criterion_group;
use criterion::criterion_main;
use std::hint::black_box;
use tempfile::TempDir;
use textpack_core::DestDir;
use textpack_core::ExtractConfig;
use textpack_core::ReadOptions;
use textpack_core::formats::current;
use textpack_core::layers::compression;
use textpack_core::read_archive;
use textpack_core::security;
use textpack_core::types::ArchiveMetadata;
use textpack_core::types::Entry;

fn sample_entries(count: usize, size: usize) -> Vec<Entry> {
    (0..count)
        .map(|i| {
            if i % 4 == 0 {
                Entry::binary(format!("bin/{i}.dat"), vec![(i % 251) as u8; size]).with_checksum()
            } else {
                let line = format!("line {i} of some source text\n");
                Entry::text(format!("src/{i}.txt"), line.repeat(size / line.len() + 1))
                    .with_checksum()
            }
        })
        .collect()
}

fn benchmark_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");

    for &(count, size) in &[(10, 1024), (100, 4096), (1000, 1024)] {
        let entries = sample_entries(count, size);
        let bytes = current::serialize(&entries, &ArchiveMetadata::new(), None);
        group.throughput(Throughput::Bytes(bytes.len() as u64));
        let label = format!("{count}x{size}");

        group.bench_with_input(BenchmarkId::new("serialize", &label), &entries, |b, entries| {
            b.iter(|| current::serialize(black_box(entries), &ArchiveMetadata::new(), None));
        });

        group.bench_with_input(BenchmarkId::new("parse", &label), &bytes, |b, bytes| {
            b.iter(|| current::parse(black_box(bytes)).unwrap());
        });
    }

    group.finish();
}

fn benchmark_compression(c: &mut Criterion) {
    let mut group = c.benchmark_group("compression_layer");

    let bytes = current::serialize(&sample_entries(200, 2048), &ArchiveMetadata::new(), None);
    let wrapped = compression::wrap(&bytes).unwrap();
    group.throughput(Throughput::Bytes(bytes.len() as u64));

    group.bench_function("wrap", |b| {
        b.iter(|| compression::wrap(black_box(&bytes)).unwrap());
    });

    group.bench_function("read_archive", |b| {
        b.iter(|| read_archive(black_box(&wrapped), &ReadOptions::new()).unwrap());
    });

    group.finish();
}

fn benchmark_path_guard(c: &mut Criterion) {
    let mut group = c.benchmark_group("path_guard");

    let temp = TempDir::new().unwrap();
    let dest = DestDir::new(temp.path()).unwrap();
    let config = ExtractConfig::default();

    for path in ["file.txt", "./a/./b/c.txt", "a/b/c/d/e/f/g/h/i/j/file.txt", "../escape"] {
        group.bench_with_input(BenchmarkId::new("resolve", path), &path, |b, path| {
            b.iter(|| security::resolve(black_box(path), &dest, &config));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_codec,
    benchmark_compression,
    benchmark_path_guard
);
criterion_main!(benches);
