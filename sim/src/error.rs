//! Error types for the simulation core.
//!
//! Only loading can fail. Unreachable routes and missing targets are normal
//! outcomes and are reported through `Vec`/`Option`, not through these types.

use std::path::PathBuf;

/// Alias for `Result<T, TerrainError>`.
pub type TerrainResult<T> = Result<T, TerrainError>;

/// Errors raised while reading a terrain layout.
#[derive(Debug, thiserror::Error)]
pub enum TerrainError {
    /// The layout file could not be opened or read.
    #[error("could not read terrain layout {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The first line holding the row count is absent.
    #[error("terrain layout is missing its row count line")]
    MissingRowCount,

    /// The first line is not a non-negative integer.
    #[error("invalid terrain row count: \"{0}\"")]
    InvalidRowCount(String),

    /// Fewer rows follow than the header announced.
    #[error("terrain layout declares {expected} rows but only {found} follow")]
    TruncatedLayout { expected: usize, found: usize },

    /// The layout has no tiles at all.
    #[error("terrain layout contains no tiles")]
    EmptyLayout,
}

/// Errors raised while reading a simulation configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("malformed configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value that would make the simulation degenerate.
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}
