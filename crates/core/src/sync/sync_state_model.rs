//! Sync status domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which store currently backs the observed holdings collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HoldingsSource {
    /// The single-device cache store.
    #[default]
    Local,
    /// The authoritative multi-device store.
    Remote,
}

/// Point-in-time view of the sync engine's externally visible flags.
///
/// Backs the persistent status indicator ("syncing / offline / pending
/// changes"). Emitted through the domain event sink whenever a flag
/// transitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatusSnapshot {
    /// A read of the observed collection is in progress.
    pub loading: bool,
    /// A replay or migration is in progress.
    pub syncing: bool,
    /// Last observed reachability of the remote service.
    pub is_online: bool,
    /// Whether an identity is currently attached.
    pub signed_in: bool,
    /// The pending queue holds unconfirmed mutations.
    pub has_pending_changes: bool,
    /// Store backing the current view.
    pub source: HoldingsSource,
    /// When the view was last confirmed against the remote store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_synced_at: Option<DateTime<Utc>>,
    /// Most recent swallowed remote failure, for the status indicator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}
