//! Error types for occupancy.
//!
//! This module defines all error types used throughout the occupancy crate,
//! covering query outcomes, record loading, and configuration.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for occupancy operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Query Errors ===
    /// No future flight with free seats exists for the destination.
    #[error("no available flight to '{destination}'")]
    NoAvailableFlight {
        /// The destination that was queried.
        destination: String,
    },

    // === Loader Errors ===
    /// A record line could not be parsed.
    #[error("line {line}: {message}")]
    Parse {
        /// 1-based line number in the source.
        line: usize,
        /// Description of what went wrong.
        message: String,
    },

    /// Failed to read a records file.
    #[error("failed to read records from {path}: {source}")]
    ReadRecords {
        /// Path to the records file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a records file.
    #[error("failed to write records to {path}: {source}")]
    WriteRecords {
        /// Path to the records file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for occupancy operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new parse error for the given line.
    #[must_use]
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this error means a query found nothing to return.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NoAvailableFlight { .. })
    }

    /// Check if this error came from malformed record input.
    #[must_use]
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }
}
