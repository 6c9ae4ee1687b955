//! Keyed JSON document store with atomic full-blob writes.

use std::fs;
use std::path::PathBuf;

use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::IntoCore;
use ingot_core::Result;

/// Storage key for the local holdings collection blob.
pub const HOLDINGS_DOCUMENT_KEY: &str = "holdings";

/// Storage key for the pending-action queue blob.
pub const PENDING_ACTIONS_DOCUMENT_KEY: &str = "pending_actions";

/// A directory of whole-document JSON blobs, one `<key>.json` file per key.
///
/// Documents are opaque to the store: every write re-serializes the full
/// value and replaces the file in place (temp file + rename), so readers
/// never observe a partially written blob.
#[derive(Clone)]
pub struct JsonDocumentStore {
    dir: PathBuf,
}

impl JsonDocumentStore {
    /// Opens a store rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).into_core_write("store root")?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Reads and decodes the document under `key`.
    ///
    /// Returns None when the document has never been written. A document
    /// that exists but does not decode is reported as corrupted, never
    /// silently dropped.
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&path).into_core_read(key)?;
        let value = serde_json::from_str(&text).into_core_read(key)?;
        Ok(Some(value))
    }

    /// Serializes `value` and replaces the document under `key`.
    pub fn write<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let text = serde_json::to_string(value).into_core_write(key)?;
        let path = self.path_for(key);
        let tmp = self.dir.join(format!("{}.json.tmp", key));
        fs::write(&tmp, text.as_bytes()).into_core_write(key)?;
        fs::rename(&tmp, &path).into_core_write(key)?;
        debug!("Persisted document '{}' ({} bytes)", key, text.len());
        Ok(())
    }

    /// Removes the document under `key`. Removing an absent document is not
    /// an error.
    pub fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).into_core_write(key),
        }
    }
}
