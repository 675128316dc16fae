//! Consolidation functions for folding raw samples into archive entries.
//!
//! A consolidation function describes how a full window of raw samples
//! becomes one archived entry. The window is handed over newest-first,
//! which matters for two semantic details:
//!
//! - `Average` has no single source sample, so the entry is anchored at
//!   the newest timestamp in the window.
//! - `Min`/`Max` return the extremal sample itself, value and timestamp,
//!   so the entry records *when* the extreme was observed. Ties are
//!   resolved toward the most recently recorded sample.

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::sample::Sample;

/// Aggregation function applied to a full pending window.
///
/// This is a closed set: an archive configuration either names one of
/// these variants or fails to deserialize, so the aggregation match below
/// needs no fallback branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsolidationFn {
    /// Arithmetic mean of the window, stamped with the newest timestamp.
    Average,

    /// The sample with the smallest value; newest wins ties.
    Min,

    /// The sample with the largest value; newest wins ties.
    Max,
}

impl ConsolidationFn {
    /// Returns the human-readable name of this function.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Average => "average",
            Self::Min => "minimum",
            Self::Max => "maximum",
        }
    }

    /// Folds a newest-first window of samples into one entry.
    ///
    /// Returns `None` for an empty window.
    pub fn aggregate(self, window: &VecDeque<Sample>) -> Option<Sample> {
        let newest = *window.front()?;

        match self {
            Self::Average => {
                let sum: f64 = window.iter().map(Sample::value).sum();
                #[allow(clippy::cast_precision_loss)]
                let mean = sum / window.len() as f64;
                Some(Sample::new(mean, newest.timestamp_ns()))
            }
            Self::Min => {
                let mut best = newest;
                for sample in window.iter().skip(1) {
                    // strict comparison: the newest of equal values survives
                    if sample.value() < best.value() {
                        best = *sample;
                    }
                }
                Some(best)
            }
            Self::Max => {
                let mut best = newest;
                for sample in window.iter().skip(1) {
                    if sample.value() > best.value() {
                        best = *sample;
                    }
                }
                Some(best)
            }
        }
    }
}

impl fmt::Display for ConsolidationFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
