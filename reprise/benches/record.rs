//! Microbenchmarks for the `record()` hot path.
//!
//! Measures fan-out cost across archive sets and the consolidation cost
//! at window boundaries.
//!
//! Run with: `cargo bench -p reprise -- record`

#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use reprise::{ArchiveConfig, ConsolidationFn, Database};

/// The archive layout used by the sampling driver: all raw samples plus
/// three consolidating archives.
fn driver_db(steps: u32) -> Database {
    Database::new(
        "bench",
        vec![
            ArchiveConfig::new("all", 1, 1800, ConsolidationFn::Average).unwrap(),
            ArchiveConfig::new("min", steps, 1440, ConsolidationFn::Min).unwrap(),
            ArchiveConfig::new("max", steps, 1440, ConsolidationFn::Max).unwrap(),
            ArchiveConfig::new("avg", steps, 1440, ConsolidationFn::Average).unwrap(),
        ],
    )
    .unwrap()
}

fn bench_record_raw_archive(c: &mut Criterion) {
    let mut db = Database::new(
        "bench",
        vec![ArchiveConfig::new("all", 1, 1800, ConsolidationFn::Average).unwrap()],
    )
    .unwrap();

    let mut ts = 1_700_000_000_000_000_000u64;

    c.bench_function("record/raw_archive", |b| {
        b.iter(|| {
            ts += 1_000_000_000;
            db.record(black_box(42.5), black_box(ts));
        });
    });
}

fn bench_record_fan_out(c: &mut Criterion) {
    let mut db = driver_db(5);
    let mut ts = 1_700_000_000_000_000_000u64;

    c.bench_function("record/four_archive_fan_out", |b| {
        b.iter(|| {
            ts += 1_000_000_000;
            db.record(black_box(42.5), black_box(ts));
        });
    });
}

fn bench_record_window_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("record/window_size");

    for steps in [2u32, 10, 60, 300] {
        let mut db = driver_db(steps);
        let mut ts = 1_700_000_000_000_000_000u64;

        group.bench_with_input(BenchmarkId::from_parameter(steps), &steps, |b, _| {
            b.iter(|| {
                ts += 1_000_000_000;
                db.record(black_box(42.5), black_box(ts));
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_record_raw_archive,
    bench_record_fan_out,
    bench_record_window_sizes,
);
criterion_main!(benches);
