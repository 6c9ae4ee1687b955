//! Pending mutation queue domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::holdings::HoldingInput;

/// Kind of queued mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PendingActionKind {
    Add,
    Update,
    Delete,
}

/// A durable record of a mutation that could not be confirmed against the
/// remote store.
///
/// Created when a remote write fails or is skipped while offline. Removed
/// only on successful replay; an action may persist across sessions
/// indefinitely if replay keeps failing. Actions are never deduplicated or
/// collapsed: an update followed by a delete of the same holding stays two
/// actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingAction {
    pub id: String,
    pub kind: PendingActionKind,
    /// Target holding id, present for update/delete.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holding_id: Option<String>,
    /// Form payload, present for add/update.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<HoldingInput>,
    pub enqueued_at: DateTime<Utc>,
}

impl PendingAction {
    fn new(
        kind: PendingActionKind,
        holding_id: Option<String>,
        input: Option<HoldingInput>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            holding_id,
            input,
            enqueued_at: Utc::now(),
        }
    }

    /// Creates a queued add.
    pub fn add(input: HoldingInput) -> Self {
        Self::new(PendingActionKind::Add, None, Some(input))
    }

    /// Creates a queued update of an existing holding.
    pub fn update(holding_id: String, input: HoldingInput) -> Self {
        Self::new(PendingActionKind::Update, Some(holding_id), Some(input))
    }

    /// Creates a queued delete of an existing holding.
    pub fn delete(holding_id: String) -> Self {
        Self::new(PendingActionKind::Delete, Some(holding_id), None)
    }
}
