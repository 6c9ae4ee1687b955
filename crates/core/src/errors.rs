//! Core error types for the Ingot application.
//!
//! This module defines storage- and transport-agnostic error types. Backend
//! specific errors (filesystem, HTTP, serde wire formats) are converted to
//! these types by the storage and remote-api crates.

use chrono::ParseError as ChronoParseError;
use std::num::ParseFloatError;
use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the holdings application.
///
/// Storage-specific details are wrapped in string form to keep this type
/// independent of any particular backend.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Storage operation failed: {0}")]
    Storage(#[from] StorageError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Remote holdings service error: {0}")]
    Remote(#[from] RemoteError),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl Error {
    /// True when the error means the targeted record does not exist.
    ///
    /// NotFound is never absorbed by the sync fallback path; callers rely on
    /// it propagating unchanged.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Storage(StorageError::NotFound(_)))
    }

    /// True when the error came from the remote service being unreachable or
    /// otherwise failing. These errors are recovered by the sync coordinator
    /// and never surface to callers.
    pub fn is_remote(&self) -> bool {
        matches!(self, Error::Remote(_))
    }
}

/// Backend-agnostic error type for persistence operations.
///
/// The storage layer converts its concrete errors (io, serde) into this
/// format. Apart from `NotFound`, these are fatal: there is no fallback for
/// a local write that the device rejected.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The requested record was not found.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Reading from or writing to the backing store failed.
    #[error("Storage I/O failed: {0}")]
    Io(String),

    /// A persisted document could not be decoded.
    #[error("Stored document is corrupted: {0}")]
    Corrupted(String),

    /// Persisting a document failed after the data was prepared.
    #[error("Storage write failed: {0}")]
    WriteFailed(String),

    /// Internal/unexpected storage error.
    #[error("Internal storage error: {0}")]
    Internal(String),
}

/// Errors from the remote holdings service.
///
/// All variants are treated as "remote unavailable" by the sync coordinator:
/// the operation degrades to the offline path instead of failing.
#[derive(Error, Debug)]
pub enum RemoteError {
    /// The service could not be reached (network down, DNS, timeout).
    #[error("Remote service unreachable: {0}")]
    Unavailable(String),

    /// The service answered with a non-success status.
    #[error("Remote API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The access credentials were rejected.
    #[error("Remote authentication failed: {0}")]
    Auth(String),
}

/// Validation errors for user input and data parsing.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Failed to parse number: {0}")]
    NumberParse(#[from] ParseFloatError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("Failed to parse decimal number: {0}")]
    DecimalParse(#[from] rust_decimal::Error),

    #[error("Failed to parse date/time: {0}")]
    DateTimeParse(#[from] ChronoParseError),
}

// === From implementations for common error types ===

impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::Validation(ValidationError::DecimalParse(err))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Storage(StorageError::Io(err.to_string()))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Storage(StorageError::Corrupted(err.to_string()))
    }
}

impl From<ChronoParseError> for Error {
    fn from(err: ChronoParseError) -> Self {
        Error::Validation(ValidationError::DateTimeParse(err))
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
