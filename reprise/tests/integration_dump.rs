//! Integration tests for dump artifact rendering options.

use std::fs;

use chrono::DateTime;
use reprise::{ArchiveConfig, ConsolidationFn, Database, DumpOptions, TimeFormat, ValueFormat};
use tempfile::tempdir;

fn one_archive_db() -> Database {
    let mut db = Database::new(
        "fmt",
        vec![ArchiveConfig::new("all", 1, 10, ConsolidationFn::Average).unwrap()],
    )
    .unwrap();
    db.record(1.2, 1_000_000);
    db.record(0.5, 2_000_000);
    db
}

fn dump_with(db: &Database, dir: &std::path::Path, options: &DumpOptions) -> String {
    let prefix = format!("{}/", dir.display());
    let outcome = db.dump(&prefix, options);
    assert!(outcome.is_success());
    fs::read_to_string(dir.join("all.rrd")).unwrap()
}

#[test]
fn test_default_formats() {
    let temp_dir = tempdir().unwrap();
    let db = one_archive_db();

    let dump = dump_with(&db, temp_dir.path(), &DumpOptions::default());
    assert_eq!(dump, "2 0.5\n1 1.2\n");
}

#[test]
fn test_fixed_value_format() {
    let temp_dir = tempdir().unwrap();
    let db = one_archive_db();

    let options = DumpOptions {
        value_format: ValueFormat::Fixed,
        ..DumpOptions::default()
    };
    let dump = dump_with(&db, temp_dir.path(), &options);
    assert_eq!(dump, "2 0.500000\n1 1.200000\n");
}

#[test]
fn test_scientific_value_format() {
    let temp_dir = tempdir().unwrap();
    let db = one_archive_db();

    let options = DumpOptions {
        value_format: ValueFormat::Scientific,
        ..DumpOptions::default()
    };
    let dump = dump_with(&db, temp_dir.path(), &options);
    for line in dump.lines() {
        let value = line.split(' ').nth(1).unwrap();
        assert!(value.contains('e'), "expected exponent in '{value}'");
    }
}

#[test]
fn test_iso8601_time_format() {
    let temp_dir = tempdir().unwrap();
    let mut db = Database::new(
        "fmt",
        vec![ArchiveConfig::new("all", 1, 10, ConsolidationFn::Average).unwrap()],
    )
    .unwrap();
    db.record(2.5, 1_700_000_000_000_000_000);

    let options = DumpOptions {
        time_format: TimeFormat::Iso8601,
        ..DumpOptions::default()
    };
    let dump = dump_with(&db, temp_dir.path(), &options);

    let line = dump.lines().next().unwrap();
    let rendered_time = line.split(' ').next().unwrap();
    let parsed = DateTime::parse_from_str(rendered_time, "%Y-%m-%dT%H:%M:%S%z").unwrap();
    assert_eq!(parsed.timestamp(), 1_700_000_000);
}
