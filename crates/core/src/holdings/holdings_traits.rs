//! Holdings repository traits.
//!
//! These traits define the contract for the two holding stores without any
//! storage- or transport-specific types. The local store is implemented by
//! the JSON document storage crate, the remote store by the HTTP API crate;
//! tests substitute in-memory mocks.

use async_trait::async_trait;

use super::holdings_model::{Holding, HoldingInput};
use crate::errors::Result;

/// Contract for the single-device local holdings store.
///
/// The backing collection is persisted in full on every mutation; there are
/// no partial writes. Implementations own local id generation and canonical
/// weight conversion via [`Holding::from_input`].
#[async_trait]
pub trait LocalHoldingsRepositoryTrait: Send + Sync {
    /// Lists the locally persisted collection.
    fn list(&self) -> Result<Vec<Holding>>;

    /// Validates and adds a holding under a freshly generated local id.
    async fn add(&self, input: HoldingInput) -> Result<Holding>;

    /// Updates an existing holding.
    ///
    /// Fails with `StorageError::NotFound` when the id is absent. Preserves
    /// the creation timestamp and refreshes `updated_at`.
    async fn update(&self, id: &str, input: HoldingInput) -> Result<Holding>;

    /// Deletes a holding. Fails with `StorageError::NotFound` when absent.
    async fn delete(&self, id: &str) -> Result<()>;

    /// Parses CSV text and merges the importable rows into the collection.
    ///
    /// Returns the newly created holdings. Unparseable rows are skipped,
    /// never fatal.
    async fn import_csv(&self, text: &str) -> Result<Vec<Holding>>;

    /// Serializes the local collection into the CSV interchange format.
    fn export_csv(&self) -> Result<String>;

    /// Overwrites the whole collection.
    async fn replace_all(&self, holdings: Vec<Holding>) -> Result<()>;

    /// Empties the collection (used after a successful remote migration).
    async fn clear_all(&self) -> Result<()>;
}

/// Contract for the multi-device authoritative holdings store.
///
/// Every operation is scoped by the owning user id; records of other users
/// are invisible. Deletion is a soft delete: a tombstone timestamp hides the
/// record from reads without physically removing it.
#[async_trait]
pub trait RemoteHoldingsRepositoryTrait: Send + Sync {
    /// Fetches the user's holdings, excluding tombstoned records, newest
    /// first.
    async fn fetch(&self, user_id: &str) -> Result<Vec<Holding>>;

    /// Adds a holding under a freshly generated remote id.
    async fn add(&self, input: HoldingInput, user_id: &str) -> Result<Holding>;

    /// Updates a holding. Fails with `StorageError::NotFound` when the
    /// id+user pair does not exist.
    async fn update(&self, id: &str, input: HoldingInput, user_id: &str) -> Result<Holding>;

    /// Soft-deletes a holding by writing its tombstone timestamp.
    ///
    /// Tombstoning an already tombstoned record succeeds; the write is
    /// idempotent.
    async fn delete(&self, id: &str, user_id: &str) -> Result<()>;

    /// Bulk-inserts previously local-only holdings under newly generated
    /// remote ids. Local ids are never reused as remote keys.
    async fn migrate_batch(&self, holdings: Vec<Holding>, user_id: &str) -> Result<Vec<Holding>>;
}
