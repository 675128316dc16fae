//! Rendering of consolidated entries to textual artifacts.
//!
//! An archive dump is one line per entry, newest first, in the form
//! `<timestamp> <value>\n`. Both halves of the line are configurable via
//! [`DumpOptions`]: timestamps render as milliseconds since the Unix epoch
//! (the default) or as a local calendar timestamp with UTC offset, values
//! render in their shortest round-trippable form (the default), with a
//! fixed number of fractional digits, or in scientific notation.
//!
//! Dumping is read-only; dumping the same archive twice without recording
//! in between produces byte-identical output.

use std::io::{self, Write};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::sample::Sample;

const NANOS_PER_MILLI: u64 = 1_000_000;

/// Timestamp rendering for dumped entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeFormat {
    /// Milliseconds since the Unix epoch.
    #[default]
    EpochMillis,

    /// Local calendar time with UTC offset, e.g. `2026-08-07T14:03:05+0200`.
    Iso8601,
}

/// Value rendering for dumped entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueFormat {
    /// Shortest representation that round-trips, e.g. `0`, `1.2`, `4.5`.
    #[default]
    Default,

    /// Fixed-point with six fractional digits, e.g. `1.200000`.
    Fixed,

    /// Scientific notation, e.g. `1.2e0`.
    Scientific,
}

/// Rendering options for a dump operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DumpOptions {
    /// How to render entry timestamps.
    #[serde(default)]
    pub time_format: TimeFormat,

    /// How to render entry values.
    #[serde(default)]
    pub value_format: ValueFormat,
}

/// Writes one entry as a `<timestamp> <value>\n` line.
pub(crate) fn write_entry<W: Write>(
    out: &mut W,
    entry: &Sample,
    options: &DumpOptions,
) -> io::Result<()> {
    match options.time_format {
        TimeFormat::EpochMillis => {
            write!(out, "{}", entry.timestamp_ns() / NANOS_PER_MILLI)?;
        }
        TimeFormat::Iso8601 => {
            // i64 nanoseconds cover timestamps until the year 2262
            #[allow(clippy::cast_possible_wrap)]
            let utc = DateTime::from_timestamp_nanos(entry.timestamp_ns() as i64);
            let local = utc.with_timezone(&Local);
            write!(out, "{}", local.format("%Y-%m-%dT%H:%M:%S%z"))?;
        }
    }

    match options.value_format {
        ValueFormat::Default => writeln!(out, " {}", entry.value()),
        ValueFormat::Fixed => writeln!(out, " {:.6}", entry.value()),
        ValueFormat::Scientific => writeln!(out, " {:e}", entry.value()),
    }
}
