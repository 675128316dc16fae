//! # reprise
//!
//! Fixed-memory round-robin time-series archive engine.
//!
//! reprise accepts a stream of timestamped scalar samples and maintains
//! several independently-configured circular archives, each holding a
//! bounded, rolling window of entries derived from the raw stream by an
//! aggregation function (average, minimum, maximum) applied over a fixed
//! number of raw samples per entry. Think rrdtool's storage philosophy as
//! an embeddable in-process library.
//!
//! ## Key Properties
//!
//! - Bounded, predictable storage — size is determined by configuration,
//!   not data volume
//! - Consolidation happens at write time; recording never fails
//! - Single-threaded, synchronous, no background threads
//! - Textual dump artifacts, one per archive, with configurable
//!   timestamp and value rendering
//!
//! ## Quick Start
//!
//! ```rust
//! use reprise::{ArchiveConfig, ConsolidationFn, Database, DumpOptions};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut cpu = Database::new(
//!     "cpu",
//!     vec![
//!         // every raw sample, 30 newest
//!         ArchiveConfig::new("all", 1, 30, ConsolidationFn::Average)?,
//!         // one minimum per 5 samples, 1440 newest
//!         ArchiveConfig::new("min", 5, 1440, ConsolidationFn::Min)?,
//!     ],
//! )?;
//!
//! // ingest samples (nanoseconds since the Unix epoch)
//! for i in 0..10u64 {
//!     cpu.record(f64::from(i as u32 % 4), i * 1_000_000_000);
//! }
//!
//! // render an archive without touching the filesystem
//! let mut out = Vec::new();
//! cpu.archives()[1].dump(&mut out, &DumpOptions::default())?;
//!
//! // or write `<prefix><name>.rrd` artifacts for all archives at once:
//! // let outcome = cpu.dump("cpu_usage_", &DumpOptions::default());
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`sample`] — the raw `(value, timestamp)` observation type
//! - [`archive`] — buffering, consolidation, and eviction for one archive
//! - [`consolidate`] — the aggregation functions
//! - [`database`] — fan-out of one sample stream to many archives
//! - [`dump`] — textual rendering of archive entries
//! - [`error`] — error types

pub mod archive;
pub mod consolidate;
pub mod database;
pub mod dump;
pub mod error;
pub mod sample;

// Re-export primary API types at crate root for convenience.
pub use archive::{Archive, ArchiveConfig};
pub use consolidate::ConsolidationFn;
pub use database::{Database, DumpFailure, DumpOutcome};
pub use dump::{DumpOptions, TimeFormat, ValueFormat};
pub use error::{ConfigError, DumpError, RepriseError, Result};
pub use sample::Sample;
