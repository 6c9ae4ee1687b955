//! Domain event types.

use serde::{Deserialize, Serialize};

use crate::sync::{HoldingsSource, SyncStatusSnapshot};

/// Domain events emitted by core services after successful mutations.
///
/// These events represent facts about domain data changes. Runtime adapters
/// translate them into platform-specific actions (list refresh, status
/// indicator updates, badge counts).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    /// Holdings were created, updated, deleted, or re-fetched.
    HoldingsChanged {
        /// Which store currently backs the observed collection.
        source: HoldingsSource,
        holding_ids: Vec<String>,
    },

    /// One or more sync status flags changed.
    SyncStateChanged { snapshot: SyncStatusSnapshot },
}

impl DomainEvent {
    /// Creates a HoldingsChanged event.
    pub fn holdings_changed(source: HoldingsSource, holding_ids: Vec<String>) -> Self {
        Self::HoldingsChanged {
            source,
            holding_ids,
        }
    }

    /// Creates a SyncStateChanged event.
    pub fn sync_state_changed(snapshot: SyncStatusSnapshot) -> Self {
        Self::SyncStateChanged { snapshot }
    }
}
