use std::sync::Mutex;

use async_trait::async_trait;
use log::debug;

use crate::document::{JsonDocumentStore, PENDING_ACTIONS_DOCUMENT_KEY};
use ingot_core::errors::Result;
use ingot_core::sync::{PendingAction, PendingActionRepositoryTrait};

/// Repository for the durable pending-action queue.
///
/// The queue is one ordered JSON array blob; enqueue order is the document
/// order and survives restarts. Every mutation rewrites the whole document.
pub struct JsonPendingActionRepository {
    store: JsonDocumentStore,
    write_guard: Mutex<()>,
}

impl JsonPendingActionRepository {
    /// Creates a new JsonPendingActionRepository backed by the given store.
    pub fn new(store: JsonDocumentStore) -> Self {
        Self {
            store,
            write_guard: Mutex::new(()),
        }
    }

    fn load(&self) -> Result<Vec<PendingAction>> {
        Ok(self
            .store
            .read(PENDING_ACTIONS_DOCUMENT_KEY)?
            .unwrap_or_default())
    }
}

#[async_trait]
impl PendingActionRepositoryTrait for JsonPendingActionRepository {
    fn list(&self) -> Result<Vec<PendingAction>> {
        self.load()
    }

    fn count(&self) -> Result<usize> {
        Ok(self.load()?.len())
    }

    async fn append(&self, action: PendingAction) -> Result<()> {
        let _guard = self.write_guard.lock().unwrap();
        let mut actions = self.load()?;
        debug!("Queueing {:?} action {}", action.kind, action.id);
        actions.push(action);
        self.store.write(PENDING_ACTIONS_DOCUMENT_KEY, &actions)
    }

    async fn replace_all(&self, actions: Vec<PendingAction>) -> Result<()> {
        let _guard = self.write_guard.lock().unwrap();
        self.store.write(PENDING_ACTIONS_DOCUMENT_KEY, &actions)
    }

    async fn clear(&self) -> Result<()> {
        let _guard = self.write_guard.lock().unwrap();
        self.store.remove(PENDING_ACTIONS_DOCUMENT_KEY)
    }
}
