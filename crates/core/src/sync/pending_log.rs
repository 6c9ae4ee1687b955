//! Durable, ordered queue of unconfirmed remote mutations.

use std::future::Future;
use std::sync::Arc;

use log::warn;

use super::pending_action_model::PendingAction;
use super::sync_traits::PendingActionRepositoryTrait;
use crate::errors::Result;

/// Result of one replay pass over the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayOutcome {
    /// Actions applied successfully and dropped from the queue.
    pub replayed: usize,
    /// Actions that failed and stayed queued.
    pub remaining: usize,
}

/// The pending-action log.
///
/// Wraps the queue persistence with the replay protocol: actions are
/// applied strictly in enqueue order, successes are dropped, failures are
/// re-persisted in their original relative order. The log never
/// deduplicates; replaying an action that can no longer succeed leaves it
/// queued for a later pass.
#[derive(Clone)]
pub struct PendingActionLog {
    repository: Arc<dyn PendingActionRepositoryTrait>,
}

impl PendingActionLog {
    pub fn new(repository: Arc<dyn PendingActionRepositoryTrait>) -> Self {
        Self { repository }
    }

    /// Appends an action at the tail and persists immediately.
    pub async fn append(&self, action: PendingAction) -> Result<()> {
        self.repository.append(action).await
    }

    /// Returns the queued actions in enqueue order.
    pub fn list(&self) -> Result<Vec<PendingAction>> {
        self.repository.list()
    }

    /// Number of queued actions.
    pub fn count(&self) -> Result<usize> {
        self.repository.count()
    }

    /// Whether any action is queued.
    pub fn has_pending(&self) -> Result<bool> {
        Ok(self.repository.count()? > 0)
    }

    /// Drops all queued actions.
    pub async fn clear(&self) -> Result<()> {
        self.repository.clear().await
    }

    /// Replays the queue through `apply` in enqueue order.
    ///
    /// Successful actions are dropped; failed actions remain and are
    /// re-persisted in their original relative order. Failures are
    /// per-action and never abort the pass; only a queue persistence
    /// failure is returned as an error.
    pub async fn replay_all<F, Fut>(&self, apply: F) -> Result<ReplayOutcome>
    where
        F: Fn(PendingAction) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        let actions = self.repository.list()?;
        if actions.is_empty() {
            return Ok(ReplayOutcome {
                replayed: 0,
                remaining: 0,
            });
        }

        let mut remaining = Vec::new();
        let mut replayed = 0usize;
        for action in actions {
            match apply(action.clone()).await {
                Ok(()) => replayed += 1,
                Err(e) => {
                    warn!(
                        "Pending {:?} action {} failed to replay, keeping it queued: {}",
                        action.kind, action.id, e
                    );
                    remaining.push(action);
                }
            }
        }

        let remaining_count = remaining.len();
        self.repository.replace_all(remaining).await?;

        Ok(ReplayOutcome {
            replayed,
            remaining: remaining_count,
        })
    }
}
