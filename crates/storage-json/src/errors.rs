//! Storage-specific error conversion for filesystem operations.
//!
//! This module converts filesystem and serde errors into the
//! backend-agnostic error types defined in `ingot_core`, attaching the
//! document key as context so failures name the blob they hit.

use ingot_core::errors::{Error, StorageError};

/// Extension trait for converting backend Results to core Results.
///
/// Since we can't implement `From<std::io::Error>` with extra context due to
/// orphan rules, this trait provides conversion methods that carry the
/// document key.
pub trait IntoCore<T> {
    /// Convert a read-path error into a core Error.
    fn into_core_read(self, key: &str) -> ingot_core::Result<T>;

    /// Convert a write-path error into a core Error.
    ///
    /// Write failures are fatal for the caller; there is no fallback once
    /// the local store rejects a persist.
    fn into_core_write(self, key: &str) -> ingot_core::Result<T>;
}

impl<T> IntoCore<T> for std::result::Result<T, std::io::Error> {
    fn into_core_read(self, key: &str) -> ingot_core::Result<T> {
        self.map_err(|e| Error::Storage(StorageError::Io(format!("document '{}': {}", key, e))))
    }

    fn into_core_write(self, key: &str) -> ingot_core::Result<T> {
        self.map_err(|e| {
            Error::Storage(StorageError::WriteFailed(format!(
                "document '{}': {}",
                key, e
            )))
        })
    }
}

impl<T> IntoCore<T> for std::result::Result<T, serde_json::Error> {
    fn into_core_read(self, key: &str) -> ingot_core::Result<T> {
        self.map_err(|e| {
            Error::Storage(StorageError::Corrupted(format!(
                "document '{}': {}",
                key, e
            )))
        })
    }

    fn into_core_write(self, key: &str) -> ingot_core::Result<T> {
        self.map_err(|e| {
            Error::Storage(StorageError::WriteFailed(format!(
                "document '{}': {}",
                key, e
            )))
        })
    }
}
