//! Error types for the reprise archive engine.

use thiserror::Error;

/// The main error type for all reprise operations.
///
/// Covers everything that can go wrong, from archive construction to
/// dumping artifacts. Recording samples is infallible under a valid
/// configuration and has no error variant.
#[derive(Error, Debug)]
pub enum RepriseError {
    /// Error validating an archive configuration.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Error writing a dump artifact.
    #[error("dump error: {0}")]
    Dump(#[from] DumpError),
}

/// Errors rejected at archive construction time.
///
/// These are surfaced by [`ArchiveConfig::validate`](crate::ArchiveConfig::validate)
/// before an archive exists, so the aggregation path never has to deal
/// with a half-valid configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The archive name is empty.
    #[error("archive name must not be empty")]
    EmptyName,

    /// The consolidation step count is zero.
    #[error("archive '{name}': steps must be at least 1")]
    ZeroSteps {
        /// Name of the offending archive.
        name: String,
    },

    /// The retained row count is zero.
    #[error("archive '{name}': rows must be at least 1")]
    ZeroRows {
        /// Name of the offending archive.
        name: String,
    },
}

/// Errors that can occur while dumping an archive to an artifact.
#[derive(Error, Debug)]
pub enum DumpError {
    /// The output artifact could not be created.
    #[error("failed to create '{path}': {source}")]
    Create {
        /// The artifact path that could not be created.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Writing entries to the output failed.
    #[error("failed to write entries: {source}")]
    Write {
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Type alias for `Result<T, RepriseError>`.
pub type Result<T> = std::result::Result<T, RepriseError>;
