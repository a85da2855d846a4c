//! Benchmarks for timestamp resolution
//!
//! Run with: cargo bench -p bindstamp-bindings

#![allow(clippy::unwrap_used)]

use bindstamp_bindings::TimestampResolver;
use bindstamp_filesys::{Error, FileSystem, Result, ScanObserver};
use bindstamp_pathsys::{child, member_of};
use bindstamp_timestamp::Timestamp;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::io;

/// In-memory tree: one directory of `width` files and one archive of
/// `width` members, all with known times.
struct SyntheticFs {
    width: usize,
}

impl FileSystem for SyntheticFs {
    fn scan_dir(&self, dir: &str, observer: &mut dyn ScanObserver) -> Result<()> {
        for i in 0..self.width {
            let time = Timestamp::new(i as i64, 0);
            observer.entry(&child(dir, &format!("f{i}.c")), Some(time));
        }
        observer.entry(&child(dir, "lib.a"), None);
        Ok(())
    }

    fn scan_archive(&self, archive: &str, observer: &mut dyn ScanObserver) -> Result<()> {
        for i in 0..self.width {
            let time = Timestamp::new(i as i64, 0);
            observer.entry(&member_of(archive, &format!("m{i}.o")), Some(time));
        }
        Ok(())
    }

    fn file_time(&self, path: &str) -> Result<Timestamp> {
        let missing = io::Error::from(io::ErrorKind::NotFound);
        Err(Error::io(missing, path, "metadata"))
    }
}

fn benchmark_cold_directory(c: &mut Criterion) {
    let mut group = c.benchmark_group("cold_directory");

    for width in [10, 100, 1000] {
        let paths: Vec<String> = (0..width).map(|i| format!("/src/f{i}.c")).collect();
        group.bench_with_input(BenchmarkId::from_parameter(width), &width, |b, &width| {
            b.iter(|| {
                let resolver = TimestampResolver::new(SyntheticFs { width });
                for path in &paths {
                    black_box(resolver.resolve(path));
                }
            });
        });
    }

    group.finish();
}

fn benchmark_warm_hits(c: &mut Criterion) {
    let mut group = c.benchmark_group("warm_hits");

    for width in [100, 1000] {
        group.bench_with_input(BenchmarkId::from_parameter(width), &width, |b, &width| {
            let resolver = TimestampResolver::new(SyntheticFs { width });
            resolver.resolve("/src/f0.c");
            b.iter(|| black_box(resolver.resolve("/src/f0.c")));
        });
    }

    group.finish();
}

fn benchmark_archive_members(c: &mut Criterion) {
    let mut group = c.benchmark_group("archive_members");

    for width in [10, 100, 1000] {
        let paths: Vec<String> = (0..width).map(|i| format!("/src/lib.a(m{i}.o)")).collect();
        group.bench_with_input(BenchmarkId::from_parameter(width), &width, |b, &width| {
            b.iter(|| {
                let resolver = TimestampResolver::new(SyntheticFs { width });
                black_box(resolver.newest(&paths))
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_cold_directory,
    benchmark_warm_hits,
    benchmark_archive_members,
);

criterion_main!(benches);
