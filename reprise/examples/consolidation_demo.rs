//! Demonstration of consolidation and eviction in reprise.
//!
//! Feeds a synthetic CPU-load curve through a database with four archives
//! and prints what each archive retained, then writes the dump artifacts.

use reprise::{ArchiveConfig, ConsolidationFn, Database, DumpOptions};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Every raw sample for 30 entries, plus one consolidated entry per
    // 10 samples for each aggregation function, 5 entries each.
    let mut db = Database::new(
        "cpu",
        vec![
            ArchiveConfig::new("all", 1, 30, ConsolidationFn::Average)?,
            ArchiveConfig::new("min", 10, 5, ConsolidationFn::Min)?,
            ArchiveConfig::new("max", 10, 5, ConsolidationFn::Max)?,
            ArchiveConfig::new("avg", 10, 5, ConsolidationFn::Average)?,
        ],
    )?;

    println!("Recording 100 samples of a synthetic load curve...");

    let base_time = 1_700_000_000_000_000_000u64;
    for i in 0u32..100 {
        let fi = f64::from(i);
        // sinusoidal base load with periodic spikes
        let value = if i % 10 == 0 {
            95.0 + (fi % 3.0)
        } else {
            45.0 + 15.0 * (fi * 0.1).sin()
        };
        db.record(value, base_time + u64::from(i) * 1_000_000_000);
    }

    println!();
    for archive in db.archives() {
        println!(
            "Archive '{}' ({} per {} samples): {} entries, {} pending",
            archive.name(),
            archive.consolidation_fn(),
            archive.steps(),
            archive.entries().len(),
            archive.pending_len(),
        );
        if let Some(newest) = archive.entries().front() {
            println!(
                "  newest entry: value={:.1} at t+{}s",
                newest.value(),
                (newest.timestamp_ns() - base_time) / 1_000_000_000
            );
        }
    }

    println!();
    println!("Writing demo_cpu_*.rrd artifacts...");
    let outcome = db.dump("demo_cpu_", &DumpOptions::default());
    for failure in outcome.failures() {
        eprintln!("  failed: {}: {}", failure.archive, failure.error);
    }
    if outcome.is_success() {
        println!("Done.");
    }

    Ok(())
}
