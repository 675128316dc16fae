//! Round-robin archive of consolidated entries.
//!
//! An [`Archive`] owns two bounded, newest-first queues: a pending buffer
//! of raw samples awaiting consolidation and the ring of consolidated
//! entries. Recording a sample buffers it, folds a full window into one
//! entry via the configured [`ConsolidationFn`], and evicts the oldest
//! entry once the ring exceeds its row count.
//!
//! # Invariants
//!
//! After every `record` call returns:
//!
//! - `entries.len() <= rows`
//! - `pending_len() < steps`
//!
//! An archive with `steps == 1` never buffers: each raw sample becomes an
//! entry directly.

use std::collections::VecDeque;
use std::io;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::consolidate::ConsolidationFn;
use crate::dump::{self, DumpOptions};
use crate::error::{ConfigError, DumpError, Result};
use crate::sample::Sample;

/// Configuration of a single archive, fixed for the archive's lifetime.
///
/// Constructed through [`ArchiveConfig::new`], which rejects invalid
/// settings before an archive exists. Serializable, so an archive set can
/// be described in a JSON file.
///
/// # Example
///
/// ```rust
/// use reprise::{ArchiveConfig, ConsolidationFn};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// // one entry per 5 raw samples, keeping the 1440 newest entries
/// let config = ArchiveConfig::new("avg", 5, 1440, ConsolidationFn::Average)?;
/// assert_eq!(config.steps, 5);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Archive identifier, also the stem of its dump artifact.
    pub name: String,

    /// Number of raw samples consolidated into one entry. Must be >= 1.
    ///
    /// A value of 1 stores every raw sample as an entry without any
    /// consolidation.
    pub steps: u32,

    /// Maximum number of retained entries before the oldest is evicted.
    /// Must be >= 1.
    pub rows: u32,

    /// How a full window of raw samples becomes one entry.
    pub consolidation_fn: ConsolidationFn,
}

impl ArchiveConfig {
    /// Creates a validated archive configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the name is empty or either bound is
    /// zero.
    pub fn new(
        name: impl Into<String>,
        steps: u32,
        rows: u32,
        consolidation_fn: ConsolidationFn,
    ) -> Result<Self> {
        let config = Self {
            name: name.into(),
            steps,
            rows,
            consolidation_fn,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if validation fails.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(ConfigError::EmptyName.into());
        }
        if self.steps == 0 {
            return Err(ConfigError::ZeroSteps {
                name: self.name.clone(),
            }
            .into());
        }
        if self.rows == 0 {
            return Err(ConfigError::ZeroRows {
                name: self.name.clone(),
            }
            .into());
        }
        Ok(())
    }
}

/// A bounded ring of consolidated entries at one (steps, function) pair.
///
/// Storage is fixed at construction: both queues are pre-allocated, and
/// the record path never grows them beyond their configured bounds.
///
/// # Thread Safety
///
/// Archives are designed for single-threaded access; external locking is
/// required to share one across threads.
#[derive(Debug)]
pub struct Archive {
    config: ArchiveConfig,
    /// Raw samples awaiting consolidation, newest first.
    pending: VecDeque<Sample>,
    /// Consolidated entries, newest first.
    entries: VecDeque<Sample>,
}

impl Archive {
    /// Creates an archive from a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration is invalid.
    pub fn new(config: ArchiveConfig) -> Result<Self> {
        config.validate()?;
        // one extra slot each: pending holds `steps` samples at the
        // consolidation instant, entries holds `rows + 1` before eviction
        let pending = VecDeque::with_capacity(config.steps as usize);
        let entries = VecDeque::with_capacity(config.rows as usize + 1);
        Ok(Self {
            config,
            pending,
            entries,
        })
    }

    /// Records one raw sample.
    ///
    /// With `steps == 1` the sample becomes an entry directly. Otherwise
    /// it is buffered, and a full buffer is consolidated into one entry
    /// and cleared. The oldest entry is evicted once the ring exceeds
    /// `rows`. Never fails.
    pub fn record(&mut self, sample: Sample) {
        if self.config.steps == 1 {
            // store each raw sample without consolidating
            self.entries.push_front(sample);
        } else {
            self.pending.push_front(sample);
            if self.pending.len() >= self.config.steps as usize {
                self.consolidate();
            }
        }

        while self.entries.len() > self.config.rows as usize {
            debug!(
                "archive '{}' over capacity, evicting oldest entry",
                self.config.name
            );
            self.entries.pop_back();
        }
    }

    /// Folds the pending buffer into one entry and clears the buffer.
    fn consolidate(&mut self) {
        if let Some(entry) = self.config.consolidation_fn.aggregate(&self.pending) {
            debug!(
                "archive '{}' consolidated {} samples with {} into value {}",
                self.config.name,
                self.pending.len(),
                self.config.consolidation_fn,
                entry.value()
            );
            self.entries.push_front(entry);
        }
        self.pending.clear();
    }

    /// Streams all entries, newest first, as `<timestamp> <value>` lines.
    ///
    /// Read-only; dumping twice without intervening records produces
    /// identical bytes.
    ///
    /// # Errors
    ///
    /// Returns [`DumpError::Write`] if the writer fails.
    pub fn dump<W: io::Write>(
        &self,
        out: &mut W,
        options: &DumpOptions,
    ) -> std::result::Result<(), DumpError> {
        for entry in &self.entries {
            dump::write_entry(out, entry, options).map_err(|e| DumpError::Write { source: e })?;
        }
        Ok(())
    }

    /// Returns the archive name.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Returns the number of raw samples per consolidated entry.
    pub fn steps(&self) -> u32 {
        self.config.steps
    }

    /// Returns the maximum number of retained entries.
    pub fn rows(&self) -> u32 {
        self.config.rows
    }

    /// Returns the configured consolidation function.
    pub fn consolidation_fn(&self) -> ConsolidationFn {
        self.config.consolidation_fn
    }

    /// Returns the consolidated entries, newest first.
    pub fn entries(&self) -> &VecDeque<Sample> {
        &self.entries
    }

    /// Returns the number of raw samples currently awaiting consolidation.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn archive(steps: u32, rows: u32, cf: ConsolidationFn) -> Archive {
        Archive::new(ArchiveConfig::new("test", steps, rows, cf).unwrap()).unwrap()
    }

    /// Records `count` samples with value `i % 10` at 1ms increments.
    fn record_pattern(archive: &mut Archive, count: u64) {
        for i in 0..count {
            #[allow(clippy::cast_precision_loss)]
            archive.record(Sample::new((i % 10) as f64, i * 1_000_000));
        }
    }

    #[test]
    fn test_config_validation() {
        assert!(ArchiveConfig::new("all", 1, 30, ConsolidationFn::Average).is_ok());
        assert!(ArchiveConfig::new("", 1, 30, ConsolidationFn::Average).is_err());
        assert!(ArchiveConfig::new("bad", 0, 30, ConsolidationFn::Average).is_err());
        assert!(ArchiveConfig::new("bad", 1, 0, ConsolidationFn::Average).is_err());
    }

    #[test]
    fn test_steps_one_never_buffers() {
        let mut archive = archive(1, 100, ConsolidationFn::Average);

        for i in 0u64..50 {
            archive.record(Sample::new(1.0, i));
            assert_eq!(archive.pending_len(), 0);
            assert_eq!(archive.entries().len(), i as usize + 1);
        }

        // newest first, entries carry the raw timestamps
        assert_eq!(archive.entries().front().unwrap().timestamp_ns(), 49);
        assert_eq!(archive.entries().back().unwrap().timestamp_ns(), 0);
    }

    #[test]
    fn test_consolidation_triggers_exactly_at_steps() {
        let mut archive = archive(3, 10, ConsolidationFn::Average);

        archive.record(Sample::new(1.0, 0));
        archive.record(Sample::new(2.0, 1));
        assert_eq!(archive.pending_len(), 2);
        assert!(archive.entries().is_empty());

        archive.record(Sample::new(3.0, 2));
        assert_eq!(archive.pending_len(), 0);
        assert_eq!(archive.entries().len(), 1);
        assert_eq!(archive.entries()[0].value(), 2.0);
        assert_eq!(archive.entries()[0].timestamp_ns(), 2);
    }

    #[test]
    fn test_eviction_keeps_newest_rows() {
        let mut archive = archive(1, 3, ConsolidationFn::Average);

        for i in 0u64..10 {
            #[allow(clippy::cast_precision_loss)]
            archive.record(Sample::new(i as f64, i));
            assert!(archive.entries().len() <= 3);
        }

        let timestamps: Vec<u64> = archive.entries().iter().map(Sample::timestamp_ns).collect();
        assert_eq!(timestamps, vec![9, 8, 7]);
    }

    #[test]
    fn test_invariants_hold_after_every_record() {
        for (steps, rows) in [(1u32, 1u32), (2, 1), (7, 3), (10, 5)] {
            let mut archive = archive(steps, rows, ConsolidationFn::Min);
            for i in 0..1000u64 {
                #[allow(clippy::cast_precision_loss)]
                archive.record(Sample::new((i % 13) as f64, i * 1_000_000));
                assert!(archive.entries().len() <= rows as usize);
                assert!(archive.pending_len() < steps as usize);
            }
        }
    }

    #[test]
    fn test_min_archive_windows() {
        // values 0..9 repeating: each 10-sample window has min 0 at its
        // first sample and max 9 at its last
        let mut archive = archive(10, 5, ConsolidationFn::Min);
        record_pattern(&mut archive, 100);

        assert_eq!(archive.entries().len(), 5);
        let points: Vec<(u64, f64)> = archive
            .entries()
            .iter()
            .map(|e| (e.timestamp_ns() / 1_000_000, e.value()))
            .collect();
        assert_eq!(
            points,
            vec![(90, 0.0), (80, 0.0), (70, 0.0), (60, 0.0), (50, 0.0)]
        );
    }

    #[test]
    fn test_max_archive_windows() {
        let mut archive = archive(10, 5, ConsolidationFn::Max);
        record_pattern(&mut archive, 100);

        let points: Vec<(u64, f64)> = archive
            .entries()
            .iter()
            .map(|e| (e.timestamp_ns() / 1_000_000, e.value()))
            .collect();
        assert_eq!(
            points,
            vec![(99, 9.0), (89, 9.0), (79, 9.0), (69, 9.0), (59, 9.0)]
        );
    }

    #[test]
    fn test_average_archive_windows() {
        let mut archive = archive(10, 5, ConsolidationFn::Average);
        record_pattern(&mut archive, 100);

        let points: Vec<(u64, f64)> = archive
            .entries()
            .iter()
            .map(|e| (e.timestamp_ns() / 1_000_000, e.value()))
            .collect();
        assert_eq!(
            points,
            vec![(99, 4.5), (89, 4.5), (79, 4.5), (69, 4.5), (59, 4.5)]
        );
    }

    #[test]
    fn test_partial_window_is_not_consolidated() {
        let mut archive = archive(2, 5, ConsolidationFn::Max);
        archive.record(Sample::new(1.0, 0));
        archive.record(Sample::new(2.0, 1));
        archive.record(Sample::new(9.0, 2));

        // the third sample sits in pending, below the window size
        assert_eq!(archive.entries().len(), 1);
        assert_eq!(archive.entries()[0].value(), 2.0);
        assert_eq!(archive.pending_len(), 1);
    }

    #[test]
    fn test_dump_streams_newest_first() {
        let mut archive = archive(1, 2, ConsolidationFn::Average);
        archive.record(Sample::new(0.0, 0));
        archive.record(Sample::new(1.2, 1_000_000));

        let mut out = Vec::new();
        archive.dump(&mut out, &DumpOptions::default()).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "1 1.2\n0 0\n");
    }
}
