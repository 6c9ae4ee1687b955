//! Sync module - pending-action queue, environment providers, and the
//! coordinator that decides which holdings store is the source of truth.

mod pending_action_model;
mod pending_log;
mod sync_service;
mod sync_state_model;
mod sync_traits;


pub use pending_action_model::{PendingAction, PendingActionKind};
pub use pending_log::{PendingActionLog, ReplayOutcome};
pub use sync_service::HoldingsSyncService;
pub use sync_state_model::{HoldingsSource, SyncStatusSnapshot};
pub use sync_traits::{
    ConnectivityProviderTrait, HoldingsSyncServiceTrait, IdentityProviderTrait,
    PendingActionRepositoryTrait,
};
