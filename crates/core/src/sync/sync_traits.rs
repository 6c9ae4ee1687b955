//! Sync engine traits: queue persistence, environment providers, and the
//! coordinator surface.
//!
//! These traits define contracts without storage- or platform-specific
//! types. The queue repository is implemented by the JSON document storage
//! crate; the providers are implemented by the embedding runtime (auth
//! session, network monitor); tests substitute mocks for all of them.

use async_trait::async_trait;

use super::pending_action_model::PendingAction;
use super::sync_state_model::SyncStatusSnapshot;
use crate::errors::Result;
use crate::holdings::{Holding, HoldingInput, MetalTotal};

/// Contract for the durable pending-action queue persistence.
///
/// Implementations persist the queue as one ordered document; every mutation
/// rewrites it in full. Ordering is enqueue order and must survive
/// restarts.
#[async_trait]
pub trait PendingActionRepositoryTrait: Send + Sync {
    /// Returns the queued actions in enqueue order.
    fn list(&self) -> Result<Vec<PendingAction>>;

    /// Returns the number of queued actions.
    fn count(&self) -> Result<usize>;

    /// Appends an action at the tail and persists immediately.
    async fn append(&self, action: PendingAction) -> Result<()>;

    /// Replaces the whole queue, preserving the given order.
    async fn replace_all(&self, actions: Vec<PendingAction>) -> Result<()>;

    /// Drops all queued actions.
    async fn clear(&self) -> Result<()>;
}

/// Read access to the current identity.
///
/// Implemented by the embedding runtime's auth session. The engine treats
/// "signed in" and "has a user id" as the same fact.
pub trait IdentityProviderTrait: Send + Sync {
    /// Current user id, or None when signed out.
    fn current_user_id(&self) -> Option<String>;

    fn is_signed_in(&self) -> bool {
        self.current_user_id().is_some()
    }
}

/// Read access to remote-service reachability.
///
/// Implemented by the embedding runtime's network monitor. Change events
/// from the monitor land as [`HoldingsSyncServiceTrait::connectivity_changed`]
/// calls.
pub trait ConnectivityProviderTrait: Send + Sync {
    /// Whether the remote service is currently believed reachable.
    fn is_reachable(&self) -> bool;
}

/// The surface the UI layer talks to.
///
/// Every mutating call runs the source-of-truth decision: signed out →
/// local only; signed in and online → remote, degrading to a local mirror
/// plus a queued action when the remote service fails; signed in and
/// offline → local mirror plus queued action directly.
#[async_trait]
pub trait HoldingsSyncServiceTrait: Send + Sync {
    /// Loads the observed collection from the store currently holding truth.
    ///
    /// Triggers the one-time local-to-remote migration on the first
    /// successful remote read of a session.
    async fn list(&self) -> Result<Vec<Holding>>;

    /// Re-runs the read path and replaces the cached view.
    async fn refresh(&self) -> Result<Vec<Holding>>;

    /// Adds a holding.
    async fn add(&self, input: HoldingInput) -> Result<Holding>;

    /// Updates a holding by id. NotFound propagates unchanged.
    async fn update(&self, id: &str, input: HoldingInput) -> Result<Holding>;

    /// Deletes a holding by id. NotFound propagates unchanged.
    async fn delete(&self, id: &str) -> Result<()>;

    /// Parses CSV text and routes each importable row through the add
    /// decision. Returns the created holdings.
    async fn import_csv(&self, text: &str) -> Result<Vec<Holding>>;

    /// Serializes the currently observed collection as CSV.
    fn export_csv(&self) -> Result<String>;

    /// Folds the currently observed collection into per-metal totals.
    ///
    /// Purely in-memory; never touches a store.
    fn get_totals_by_metal(&self) -> Vec<MetalTotal>;

    /// Reacts to a connectivity change event: re-reads the provider and,
    /// on an offline-to-online transition while signed in, replays the
    /// pending queue and re-fetches the remote collection.
    async fn connectivity_changed(&self) -> Result<()>;

    /// Current externally visible flags.
    fn status(&self) -> SyncStatusSnapshot;
}
