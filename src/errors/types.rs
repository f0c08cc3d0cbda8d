//! Error type definitions for the aggregator

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration file could not be read, parsed or validated
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// A required input file (source list, template) does not exist
    #[error("Missing required input: {what} at {}", path.display())]
    MissingInput { what: String, path: PathBuf },

    /// Filesystem errors while reading inputs or writing artifacts
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Template line that could not be used
    #[error("Template error on line {line}: {message}")]
    Template { line: usize, message: String },

    /// Source handling errors
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// HTTP client construction errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Errors raised while retrieving or decoding a single source
#[derive(Error, Debug)]
pub enum SourceError {
    /// Request did not finish inside the configured timeout
    #[error("Connection timeout: {url}")]
    Timeout { url: String },

    /// Transport failures and non-success HTTP statuses
    #[error("HTTP error: {status} - {message}")]
    Http { status: u16, message: String },

    /// Body could not be decompressed
    #[error("Decode error: {message}")]
    Decode { message: String },
}

impl AppError {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a missing-input error
    pub fn missing_input<S: Into<String>, P: Into<PathBuf>>(what: S, path: P) -> Self {
        Self::MissingInput {
            what: what.into(),
            path: path.into(),
        }
    }

    /// Wrap an I/O error with the path it happened on
    pub fn io<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a template error
    pub fn template<S: Into<String>>(line: usize, message: S) -> Self {
        Self::Template {
            line,
            message: message.into(),
        }
    }

    /// Whether this error means the operator has to fix an input before rerunning
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. } | Self::MissingInput { .. })
    }
}

impl SourceError {
    /// Create a decode error
    pub fn decode<S: Into<String>>(message: S) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}
