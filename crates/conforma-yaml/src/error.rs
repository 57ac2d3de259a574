//! Error types for the YAML bridge.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for conforma-yaml operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading or parsing YAML.
#[derive(Debug, Error)]
pub enum Error {
    /// YAML syntax error reported by the scanner.
    #[error("YAML parse error: {0}")]
    Scan(#[from] yaml_rust2::ScanError),

    /// Failed to read or write a document file.
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
