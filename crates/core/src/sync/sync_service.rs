//! The holdings sync coordinator.
//!
//! Composes the local store, the remote store, and the pending-action log,
//! and decides per operation which store is the source of truth. Remote
//! failures degrade into the offline path: the mutation is mirrored into
//! the local store and queued for replay, and the caller still gets a
//! successful result. Local persistence failures have no fallback and
//! propagate.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use log::{debug, info, warn};

use super::pending_action_model::PendingAction;
use super::pending_log::PendingActionLog;
use super::sync_state_model::{HoldingsSource, SyncStatusSnapshot};
use super::sync_traits::{
    ConnectivityProviderTrait, HoldingsSyncServiceTrait, IdentityProviderTrait,
    PendingActionRepositoryTrait,
};
use crate::errors::{Error, Result};
use crate::events::{DomainEvent, DomainEventSink};
use crate::holdings::{
    holdings_to_csv, parse_holdings_csv, totals_by_metal, Holding, HoldingInput,
    LocalHoldingsRepositoryTrait, MetalTotal, RemoteHoldingsRepositoryTrait,
};

/// A mutation flowing through the source-of-truth decision.
#[derive(Debug)]
enum WriteOp {
    Add(HoldingInput),
    Update(String, HoldingInput),
    Delete(String),
}

/// Per-instance coordinator state.
///
/// The migration guard lives here, never in process-wide state, so separate
/// coordinator instances (one per session, or several under test) cannot
/// share it.
struct EngineState {
    /// The collection the UI currently observes.
    view: Vec<Holding>,
    source: HoldingsSource,
    loading: bool,
    syncing: bool,
    /// Last reachability observed by `connectivity_changed`.
    was_online: bool,
    /// Set after the first successful remote read of this session.
    migration_checked: bool,
    last_synced_at: Option<DateTime<Utc>>,
    last_error: Option<String>,
    /// Last emitted status snapshot, for transition detection.
    last_emitted: Option<SyncStatusSnapshot>,
}

/// Service coordinating the holdings stores and the pending queue.
pub struct HoldingsSyncService {
    local: Arc<dyn LocalHoldingsRepositoryTrait>,
    remote: Arc<dyn RemoteHoldingsRepositoryTrait>,
    pending: PendingActionLog,
    identity: Arc<dyn IdentityProviderTrait>,
    connectivity: Arc<dyn ConnectivityProviderTrait>,
    event_sink: Arc<dyn DomainEventSink>,
    state: RwLock<EngineState>,
}

impl HoldingsSyncService {
    /// Creates a new coordinator instance with a fresh migration guard.
    pub fn new(
        local: Arc<dyn LocalHoldingsRepositoryTrait>,
        remote: Arc<dyn RemoteHoldingsRepositoryTrait>,
        pending_repository: Arc<dyn PendingActionRepositoryTrait>,
        identity: Arc<dyn IdentityProviderTrait>,
        connectivity: Arc<dyn ConnectivityProviderTrait>,
        event_sink: Arc<dyn DomainEventSink>,
    ) -> Self {
        let was_online = connectivity.is_reachable();
        Self {
            local,
            remote,
            pending: PendingActionLog::new(pending_repository),
            identity,
            connectivity,
            event_sink,
            state: RwLock::new(EngineState {
                view: Vec::new(),
                source: HoldingsSource::Local,
                loading: false,
                syncing: false,
                was_online,
                migration_checked: false,
                last_synced_at: None,
                last_error: None,
                last_emitted: None,
            }),
        }
    }

    // ---- read path ----

    async fn load_observed(&self) -> Result<Vec<Holding>> {
        self.set_loading(true);
        let result = self.reload().await;
        self.set_loading(false);
        result
    }

    /// Runs the source-of-truth read: remote when signed in and online,
    /// local otherwise. A failing remote read degrades to the local copy.
    async fn reload(&self) -> Result<Vec<Holding>> {
        match self.identity.current_user_id() {
            Some(user_id) if self.connectivity.is_reachable() => {
                debug!("Loading holdings from remote store for user {}", user_id);
                match self.remote.fetch(&user_id).await {
                    Ok(fetched) => match self.first_read_migration(fetched, &user_id).await {
                        Ok(holdings) => {
                            self.record_synced();
                            self.install_view(holdings.clone(), HoldingsSource::Remote);
                            Ok(holdings)
                        }
                        Err(e) if e.is_remote() => self.degraded_local_view(e),
                        Err(e) => Err(e),
                    },
                    Err(e) if e.is_remote() => self.degraded_local_view(e),
                    Err(e) => Err(e),
                }
            }
            _ => {
                debug!("Loading holdings from local store");
                let holdings = self.local.list()?;
                self.install_view(holdings.clone(), HoldingsSource::Local);
                Ok(holdings)
            }
        }
    }

    /// On the first successful remote read of this session, migrates a
    /// non-empty local collection into an empty remote store, re-fetches,
    /// and clears the local copy. Runs at most once per instance.
    async fn first_read_migration(
        &self,
        fetched: Vec<Holding>,
        user_id: &str,
    ) -> Result<Vec<Holding>> {
        let first_read = {
            let mut state = self.state.write().unwrap();
            if state.migration_checked {
                false
            } else {
                state.migration_checked = true;
                true
            }
        };
        if !first_read || !fetched.is_empty() {
            return Ok(fetched);
        }

        let local_holdings = self.local.list()?;
        if local_holdings.is_empty() {
            return Ok(fetched);
        }

        info!(
            "Migrating {} local holdings to the remote store",
            local_holdings.len()
        );
        self.set_syncing(true);
        let migrated = self.remote.migrate_batch(local_holdings, user_id).await;
        let outcome = match migrated {
            Ok(_) => match self.remote.fetch(user_id).await {
                Ok(refreshed) => match self.local.clear_all().await {
                    Ok(()) => {
                        info!("Migration complete, local store cleared");
                        Ok(refreshed)
                    }
                    Err(e) => Err(e),
                },
                Err(e) => Err(e),
            },
            Err(e) => Err(e),
        };
        self.set_syncing(false);
        outcome
    }

    /// Falls back to the local collection after a swallowed remote failure.
    fn degraded_local_view(&self, err: Error) -> Result<Vec<Holding>> {
        self.note_remote_degraded(&err);
        let holdings = self.local.list()?;
        self.install_view(holdings.clone(), HoldingsSource::Local);
        Ok(holdings)
    }

    // ---- write path ----

    /// The one place every mutation's source-of-truth decision happens.
    ///
    /// Returns the materialized holding for add/update, None for delete.
    async fn dispatch_write(&self, op: WriteOp) -> Result<Option<Holding>> {
        match self.identity.current_user_id() {
            None => self.apply_local(&op).await,
            Some(user_id) => {
                if self.connectivity.is_reachable() {
                    match self.apply_remote(&op, &user_id).await {
                        Ok(result) => {
                            self.record_synced();
                            self.emit_state();
                            Ok(result)
                        }
                        Err(e) if e.is_remote() => {
                            self.note_remote_degraded(&e);
                            self.mirror_and_enqueue(op).await
                        }
                        Err(e) => Err(e),
                    }
                } else {
                    debug!("Offline while signed in, mirroring write into local store");
                    self.mirror_and_enqueue(op).await
                }
            }
        }
    }

    async fn apply_local(&self, op: &WriteOp) -> Result<Option<Holding>> {
        match op {
            WriteOp::Add(input) => Ok(Some(self.local.add(input.clone()).await?)),
            WriteOp::Update(id, input) => Ok(Some(self.local.update(id, input.clone()).await?)),
            WriteOp::Delete(id) => {
                self.local.delete(id).await?;
                Ok(None)
            }
        }
    }

    async fn apply_remote(&self, op: &WriteOp, user_id: &str) -> Result<Option<Holding>> {
        match op {
            WriteOp::Add(input) => Ok(Some(self.remote.add(input.clone(), user_id).await?)),
            WriteOp::Update(id, input) => {
                Ok(Some(self.remote.update(id, input.clone(), user_id).await?))
            }
            WriteOp::Delete(id) => {
                self.remote.delete(id, user_id).await?;
                Ok(None)
            }
        }
    }

    /// The compensating half of the two-phase write: apply the identical
    /// operation to the local store and queue it for replay. Local failures
    /// propagate; there is no further fallback.
    async fn mirror_and_enqueue(&self, op: WriteOp) -> Result<Option<Holding>> {
        let result = self.apply_local(&op).await?;
        let action = match op {
            WriteOp::Add(input) => PendingAction::add(input),
            WriteOp::Update(id, input) => PendingAction::update(id, input),
            WriteOp::Delete(id) => PendingAction::delete(id),
        };
        self.pending.append(action).await?;
        self.emit_state();
        Ok(result)
    }

    // ---- replay ----

    /// Replays the pending queue against the remote store, then re-fetches
    /// to reconcile the view. No-op when signed out or the queue is empty.
    async fn replay_and_refresh(&self) -> Result<()> {
        let user_id = match self.identity.current_user_id() {
            Some(user_id) => user_id,
            None => return Ok(()),
        };
        let queued = self.pending.count()?;
        if queued == 0 {
            return Ok(());
        }

        info!("Connectivity restored, replaying {} pending actions", queued);
        self.set_syncing(true);
        let remote = Arc::clone(&self.remote);
        let replayed = self
            .pending
            .replay_all(move |action| {
                let remote = Arc::clone(&remote);
                let user_id = user_id.clone();
                async move { apply_pending_action(remote, user_id, action).await }
            })
            .await;
        self.set_syncing(false);

        let outcome = replayed?;
        info!(
            "Replay finished: {} applied, {} still queued",
            outcome.replayed, outcome.remaining
        );
        if outcome.remaining == 0 {
            let mut state = self.state.write().unwrap();
            state.last_error = None;
        }
        self.emit_state();

        self.load_observed().await?;
        Ok(())
    }

    // ---- state helpers ----

    fn snapshot(&self) -> SyncStatusSnapshot {
        let state = self.state.read().unwrap();
        SyncStatusSnapshot {
            loading: state.loading,
            syncing: state.syncing,
            is_online: self.connectivity.is_reachable(),
            signed_in: self.identity.is_signed_in(),
            has_pending_changes: self.pending.count().unwrap_or(0) > 0,
            source: state.source,
            last_synced_at: state.last_synced_at,
            last_error: state.last_error.clone(),
        }
    }

    /// Emits a SyncStateChanged event when any flag actually transitioned.
    fn emit_state(&self) {
        let snapshot = self.snapshot();
        let changed = {
            let mut state = self.state.write().unwrap();
            if state.last_emitted.as_ref() == Some(&snapshot) {
                false
            } else {
                state.last_emitted = Some(snapshot.clone());
                true
            }
        };
        if changed {
            self.event_sink
                .emit(DomainEvent::sync_state_changed(snapshot));
        }
    }

    fn set_loading(&self, loading: bool) {
        self.state.write().unwrap().loading = loading;
        self.emit_state();
    }

    fn set_syncing(&self, syncing: bool) {
        self.state.write().unwrap().syncing = syncing;
        self.emit_state();
    }

    fn record_synced(&self) {
        let mut state = self.state.write().unwrap();
        state.last_synced_at = Some(Utc::now());
        state.last_error = None;
    }

    fn note_remote_degraded(&self, err: &Error) {
        warn!("Remote holdings store degraded to offline path: {}", err);
        self.state.write().unwrap().last_error = Some(err.to_string());
        self.emit_state();
    }

    // ---- view helpers ----

    fn install_view(&self, holdings: Vec<Holding>, source: HoldingsSource) {
        let ids: Vec<String> = holdings.iter().map(|h| h.id.clone()).collect();
        {
            let mut state = self.state.write().unwrap();
            state.view = holdings;
            state.source = source;
        }
        self.event_sink
            .emit(DomainEvent::holdings_changed(source, ids));
        self.emit_state();
    }

    fn view_insert(&self, holding: Holding) {
        let id = holding.id.clone();
        let source = {
            let mut state = self.state.write().unwrap();
            state.view.insert(0, holding);
            state.source
        };
        self.event_sink
            .emit(DomainEvent::holdings_changed(source, vec![id]));
        self.emit_state();
    }

    fn view_replace(&self, holding: Holding) {
        let id = holding.id.clone();
        let source = {
            let mut state = self.state.write().unwrap();
            if let Some(slot) = state.view.iter_mut().find(|h| h.id == holding.id) {
                *slot = holding;
            }
            state.source
        };
        self.event_sink
            .emit(DomainEvent::holdings_changed(source, vec![id]));
        self.emit_state();
    }

    fn view_remove(&self, id: &str) {
        let source = {
            let mut state = self.state.write().unwrap();
            state.view.retain(|h| h.id != id);
            state.source
        };
        self.event_sink
            .emit(DomainEvent::holdings_changed(source, vec![id.to_string()]));
        self.emit_state();
    }
}

/// Applies one queued action against the remote store.
async fn apply_pending_action(
    remote: Arc<dyn RemoteHoldingsRepositoryTrait>,
    user_id: String,
    action: PendingAction,
) -> Result<()> {
    use super::pending_action_model::PendingActionKind;

    match action.kind {
        PendingActionKind::Add => {
            let input = action
                .input
                .ok_or_else(|| Error::Unexpected("queued add is missing its payload".to_string()))?;
            remote.add(input, &user_id).await.map(|_| ())
        }
        PendingActionKind::Update => {
            let id = action.holding_id.ok_or_else(|| {
                Error::Unexpected("queued update is missing its target id".to_string())
            })?;
            let input = action.input.ok_or_else(|| {
                Error::Unexpected("queued update is missing its payload".to_string())
            })?;
            remote.update(&id, input, &user_id).await.map(|_| ())
        }
        PendingActionKind::Delete => {
            let id = action.holding_id.ok_or_else(|| {
                Error::Unexpected("queued delete is missing its target id".to_string())
            })?;
            remote.delete(&id, &user_id).await
        }
    }
}

#[async_trait::async_trait]
impl HoldingsSyncServiceTrait for HoldingsSyncService {
    /// Loads the observed collection from the store currently holding truth.
    async fn list(&self) -> Result<Vec<Holding>> {
        self.load_observed().await
    }

    /// Re-runs the read path and replaces the cached view.
    async fn refresh(&self) -> Result<Vec<Holding>> {
        self.load_observed().await
    }

    /// Adds a holding through the source-of-truth decision.
    async fn add(&self, input: HoldingInput) -> Result<Holding> {
        input.validate()?;
        debug!("Adding {} holding", input.metal);
        let holding = self
            .dispatch_write(WriteOp::Add(input))
            .await?
            .ok_or_else(|| Error::Unexpected("add produced no holding".to_string()))?;
        self.view_insert(holding.clone());
        Ok(holding)
    }

    /// Updates a holding. NotFound propagates unchanged.
    async fn update(&self, id: &str, input: HoldingInput) -> Result<Holding> {
        input.validate()?;
        debug!("Updating holding {}", id);
        let holding = self
            .dispatch_write(WriteOp::Update(id.to_string(), input))
            .await?
            .ok_or_else(|| Error::Unexpected("update produced no holding".to_string()))?;
        self.view_replace(holding.clone());
        Ok(holding)
    }

    /// Deletes a holding. NotFound propagates unchanged.
    async fn delete(&self, id: &str) -> Result<()> {
        debug!("Deleting holding {}", id);
        self.dispatch_write(WriteOp::Delete(id.to_string()))
            .await?;
        self.view_remove(id);
        Ok(())
    }

    /// Imports CSV rows through the standard add decision.
    async fn import_csv(&self, text: &str) -> Result<Vec<Holding>> {
        let outcome = parse_holdings_csv(text)?;
        let mut imported = Vec::with_capacity(outcome.inputs.len());
        for input in outcome.inputs {
            let holding = self
                .dispatch_write(WriteOp::Add(input))
                .await?
                .ok_or_else(|| Error::Unexpected("add produced no holding".to_string()))?;
            self.view_insert(holding.clone());
            imported.push(holding);
        }
        info!(
            "Imported {} holdings from CSV ({} rows skipped)",
            imported.len(),
            outcome.skipped
        );
        Ok(imported)
    }

    /// Serializes the currently observed collection as CSV.
    fn export_csv(&self) -> Result<String> {
        let view = self.state.read().unwrap().view.clone();
        holdings_to_csv(&view)
    }

    /// Folds the currently observed collection into per-metal totals.
    fn get_totals_by_metal(&self) -> Vec<MetalTotal> {
        let state = self.state.read().unwrap();
        totals_by_metal(&state.view)
    }

    /// Handles a connectivity change event from the embedding runtime.
    async fn connectivity_changed(&self) -> Result<()> {
        let online = self.connectivity.is_reachable();
        let was_online = {
            let mut state = self.state.write().unwrap();
            std::mem::replace(&mut state.was_online, online)
        };
        debug!("Connectivity changed: online={} (was {})", online, was_online);
        self.emit_state();

        if online && !was_online {
            self.replay_and_refresh().await?;
        }
        Ok(())
    }

    /// Current externally visible flags.
    fn status(&self) -> SyncStatusSnapshot {
        self.snapshot()
    }
}
