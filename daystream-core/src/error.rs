//! Structured error types for enumeration.
//!
//! Every failure the orchestrator or its collaborators can raise ends up as an
//! [`EnumerationError`]. They are displayable as-is in the CLI.

use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

use crate::source::{FileFormat, SourceTransport};

#[derive(Debug, Error)]
pub enum EnumerationError {
    /// No ticker is known for the identity on `date`: the history is missing
    /// or starts later.
    #[error("no symbol mapping for '{symbol}' on {date}")]
    UnresolvableSymbol { symbol: String, date: NaiveDate },

    /// The selector has no reader for this format/transport pair.
    #[error("no reader for {format:?} data over {transport:?}")]
    UnsupportedSource {
        format: FileFormat,
        transport: SourceTransport,
    },

    /// The data-type tag has no registered locator.
    #[error("cannot build source locator: {0}")]
    Construction(String),

    /// The day's file does not exist locally or remotely (HTTP 404).
    #[error("source not found: {location}")]
    SourceNotFound { location: String },

    /// The file was found but could not be decoded.
    #[error("failed to read {location}: {reason}")]
    Read { location: String, reason: String },

    #[error("malformed map file {path}:{line}: {reason}")]
    MapFileFormat {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// Download failed after retries, or remote access is disabled.
    #[error("fetch failed: {0}")]
    Fetch(String),

    /// The remote source refused us (403) or failed too often in a row.
    #[error("hard stop: remote source has blocked requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl EnumerationError {
    /// Shorthand for [`EnumerationError::Read`].
    pub(crate) fn read(location: impl Into<String>, reason: impl ToString) -> Self {
        Self::Read {
            location: location.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T, E = EnumerationError> = std::result::Result<T, E>;
