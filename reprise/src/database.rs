//! Database of archives sharing one sample stream.
//!
//! A [`Database`] owns an ordered set of archives. Every recorded sample
//! is offered to every archive, in the order the archives were configured,
//! as the identical `(value, timestamp)` pair. Dumping writes one artifact
//! per archive and keeps going past individual failures, reporting them
//! collectively in a [`DumpOutcome`].

use std::fs::File;
use std::io::{BufWriter, Write};

use tracing::debug;

use crate::archive::{Archive, ArchiveConfig};
use crate::dump::DumpOptions;
use crate::error::{DumpError, Result};
use crate::sample::Sample;

/// A named, ordered collection of archives consuming the same samples.
///
/// The archive set is fixed at construction; archives cannot be added or
/// removed afterwards.
///
/// # Example
///
/// ```rust
/// use reprise::{ArchiveConfig, ConsolidationFn, Database};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut db = Database::new(
///     "cpu",
///     vec![
///         // every raw sample, 30 newest
///         ArchiveConfig::new("all", 1, 30, ConsolidationFn::Average)?,
///         // one minimum per 5 samples, 1440 newest
///         ArchiveConfig::new("min", 5, 1440, ConsolidationFn::Min)?,
///     ],
/// )?;
///
/// db.record(42.5, 1_700_000_000_000_000_000);
/// assert_eq!(db.archives()[0].entries().len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Database {
    name: String,
    archives: Vec<Archive>,
}

impl Database {
    /// Creates a database from an ordered archive configuration set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`](crate::ConfigError) for the first invalid
    /// archive configuration; no database is created in that case.
    pub fn new(name: impl Into<String>, configs: Vec<ArchiveConfig>) -> Result<Self> {
        let archives = configs
            .into_iter()
            .map(Archive::new)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            name: name.into(),
            archives,
        })
    }

    /// Records one sample into every archive, in configuration order.
    ///
    /// All archives observe the identical value/timestamp pair. Never
    /// fails.
    pub fn record(&mut self, value: f64, timestamp_ns: u64) {
        let sample = Sample::new(value, timestamp_ns);
        for archive in &mut self.archives {
            archive.record(sample);
        }
    }

    /// Dumps every archive to `<prefix><archive name>.rrd`.
    ///
    /// A failing archive is skipped and recorded in the outcome; the
    /// remaining archives are still attempted.
    pub fn dump(&self, prefix: &str, options: &DumpOptions) -> DumpOutcome {
        let mut failures = Vec::new();

        for archive in &self.archives {
            let path = format!("{prefix}{}.rrd", archive.name());
            if let Err(error) = Self::dump_archive(archive, &path, options) {
                debug!("dump of archive '{}' failed: {error}", archive.name());
                failures.push(DumpFailure {
                    archive: archive.name().to_string(),
                    error,
                });
            }
        }

        DumpOutcome { failures }
    }

    /// Writes one archive's artifact.
    fn dump_archive(
        archive: &Archive,
        path: &str,
        options: &DumpOptions,
    ) -> std::result::Result<(), DumpError> {
        let file = File::create(path).map_err(|e| DumpError::Create {
            path: path.to_string(),
            source: e,
        })?;
        let mut out = BufWriter::new(file);
        archive.dump(&mut out, options)?;
        out.flush().map_err(|e| DumpError::Write { source: e })
    }

    /// Returns the database name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the archives in configuration order.
    pub fn archives(&self) -> &[Archive] {
        &self.archives
    }
}

/// Result of dumping a database: which archives failed, if any.
///
/// An empty failure list means every artifact was written.
#[derive(Debug)]
#[must_use]
pub struct DumpOutcome {
    failures: Vec<DumpFailure>,
}

impl DumpOutcome {
    /// Returns true if every archive dumped successfully.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Returns the per-archive failures.
    pub fn failures(&self) -> &[DumpFailure] {
        &self.failures
    }
}

/// One archive that failed to dump, with its cause.
#[derive(Debug)]
pub struct DumpFailure {
    /// Name of the archive whose artifact could not be written.
    pub archive: String,
    /// Why the dump failed.
    pub error: DumpError,
}
