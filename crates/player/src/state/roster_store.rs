//! Roster Store - in-memory roster and party layout for one event view
//!
//! Layout mutations are optimistic: local state changes synchronously, is
//! published to watchers, and a background task persists the whole layout.
//! A failed write is logged and surfaced as a generic error but never rolled
//! back; the next refresh brings the authoritative state.
//!
//! Every layout write bumps a local revision that stays *unconfirmed* until
//! its persistence call settles. With [`ReconcilePolicy::Versioned`] a parties
//! refetch that raced such a write is discarded and replayed once the last
//! write settles, so a stale server snapshot cannot erase a newer local edit.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use keyparty_domain::{
    by_role, Access, Character, CharacterDraft, CharacterId, Event, EventCode, LayoutError,
    LevelBounds, Party, PartyLayout, Role,
};
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::application::services::RosterService;
use crate::application::ServiceError;
use crate::infrastructure::messaging::{PushChannel, RefreshCallbacks, Subscription};
use crate::ports::outbound::{storage_keys, StorageProvider};

/// How many times a parties refetch is retried when a write that has
/// already settled moved the revision underneath it.
const MAX_PARTIES_REFRESH_ATTEMPTS: usize = 3;

/// What to do with a parties refetch that raced a local write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconcilePolicy {
    /// Discard the refetch while a newer local write is unconfirmed
    #[default]
    Versioned,
    /// Apply every refetch; whichever response lands last wins
    LastResponseWins,
}

impl fmt::Display for ReconcilePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconcilePolicy::Versioned => write!(f, "versioned"),
            ReconcilePolicy::LastResponseWins => write!(f, "last-response-wins"),
        }
    }
}

impl FromStr for ReconcilePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "versioned" => Ok(ReconcilePolicy::Versioned),
            "last-response-wins" | "last_response_wins" => Ok(ReconcilePolicy::LastResponseWins),
            other => Err(format!("Unknown reconcile policy: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterError {
    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error("Only the operator can change parties")]
    NotOperator,

    #[error("No character is registered from this device")]
    NoSelfCharacter,

    #[error("Character {0} belongs to another player")]
    NotOwnCharacter(CharacterId),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("Write task aborted: {0}")]
    WriteAborted(String),
}

/// Handle on a background write started by a mutation.
///
/// Awaiting `settled` is optional. Dropping the handle does not cancel the
/// write.
#[derive(Debug)]
pub struct PendingWrite {
    revision: u64,
    task: Option<JoinHandle<Result<(), RosterError>>>,
}

impl PendingWrite {
    fn spawned(revision: u64, task: JoinHandle<Result<(), RosterError>>) -> Self {
        Self {
            revision,
            task: Some(task),
        }
    }

    /// A write with nothing to persist.
    pub fn completed(revision: u64) -> Self {
        Self {
            revision,
            task: None,
        }
    }

    /// Local revision this write produced.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Wait for the write (and any refresh it replays) to finish.
    pub async fn settled(self) -> Result<(), RosterError> {
        match self.task {
            None => Ok(()),
            Some(task) => task
                .await
                .map_err(|e| RosterError::WriteAborted(e.to_string()))?,
        }
    }
}

/// Everything a view needs to render the roster, as seen by this viewer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RosterSnapshot {
    pub access: Access,
    pub event: Option<Event>,
    pub characters: Vec<Character>,
    /// Empty for observers while the event hides parties
    pub parties: Vec<Party>,
    pub pending: Vec<Character>,
    pub self_character: Option<Character>,
    pub self_party_index: Option<usize>,
    pub last_error: Option<String>,
    pub revision: u64,
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl RosterSnapshot {
    pub fn parties_visible(&self) -> bool {
        let flag = self.event.as_ref().is_some_and(|e| e.are_parties_visible);
        self.access.can_see_parties(flag)
    }

    pub fn pending_by_role(&self) -> BTreeMap<Role, Vec<&Character>> {
        by_role(&self.pending)
    }

    pub fn assigned_count(&self) -> usize {
        self.parties.iter().map(Party::len).sum()
    }
}

#[derive(Default)]
struct RosterState {
    event: Option<Event>,
    characters: Vec<Character>,
    layout: PartyLayout,
    self_id: Option<CharacterId>,
    last_error: Option<String>,
    revision: u64,
    unconfirmed: BTreeSet<u64>,
    stale_parties: bool,
    last_synced_at: Option<DateTime<Utc>>,
}

impl RosterState {
    /// Bump the revision for a local write and mark it unconfirmed.
    fn begin_write(&mut self) -> u64 {
        self.revision += 1;
        self.unconfirmed.insert(self.revision);
        self.revision
    }

    fn mark_synced(&mut self) {
        self.last_error = None;
        self.last_synced_at = Some(Utc::now());
    }

    fn snapshot(&self, access: Access) -> RosterSnapshot {
        let flag = self.event.as_ref().is_some_and(|e| e.are_parties_visible);
        let visible = access.can_see_parties(flag);

        let (parties, pending) = if visible {
            (
                self.layout.parties().to_vec(),
                self.layout
                    .pending(&self.characters)
                    .into_iter()
                    .cloned()
                    .collect(),
            )
        } else {
            (Vec::new(), self.characters.clone())
        };

        let self_character = self
            .self_id
            .and_then(|id| self.characters.iter().find(|c| c.id() == id).cloned());
        let self_party_index = match self.self_id {
            Some(id) if visible => self.layout.locate(id).map(|p| p.party_index),
            _ => None,
        };

        RosterSnapshot {
            access,
            event: self.event.clone(),
            characters: self.characters.clone(),
            parties,
            pending,
            self_character,
            self_party_index,
            last_error: self.last_error.clone(),
            revision: self.revision,
            last_synced_at: self.last_synced_at,
        }
    }
}

enum RefreshOutcome {
    Applied,
    Deferred,
    Retry,
}

struct Inner {
    event_code: EventCode,
    access: Access,
    policy: ReconcilePolicy,
    bounds: LevelBounds,
    service: RosterService,
    storage: Arc<dyn StorageProvider>,
    state: Mutex<RosterState>,
    snapshots: watch::Sender<RosterSnapshot>,
}

/// Roster store for one event. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct RosterStore {
    inner: Arc<Inner>,
}

impl RosterStore {
    /// Characters read from the backend are clamped into `bounds`.
    pub fn new(
        event_code: EventCode,
        access: Access,
        policy: ReconcilePolicy,
        bounds: LevelBounds,
        service: RosterService,
        storage: Arc<dyn StorageProvider>,
    ) -> Self {
        let self_id = storage
            .load(&storage_keys::self_character(&event_code))
            .and_then(|raw| raw.parse::<CharacterId>().ok());

        let state = RosterState {
            self_id,
            ..RosterState::default()
        };
        let (snapshots, _) = watch::channel(state.snapshot(access));

        tracing::debug!(
            event_code = %event_code,
            access = %access,
            policy = %policy,
            ?bounds,
            self_id = ?self_id,
            "Roster store created"
        );

        Self {
            inner: Arc::new(Inner {
                event_code,
                access,
                policy,
                bounds,
                service,
                storage,
                state: Mutex::new(state),
                snapshots,
            }),
        }
    }

    pub fn event_code(&self) -> &EventCode {
        &self.inner.event_code
    }

    pub fn access(&self) -> Access {
        self.inner.access
    }

    pub fn policy(&self) -> ReconcilePolicy {
        self.inner.policy
    }

    pub fn bounds(&self) -> LevelBounds {
        self.inner.bounds
    }

    pub fn subscribe(&self) -> watch::Receiver<RosterSnapshot> {
        self.inner.snapshots.subscribe()
    }

    pub fn snapshot(&self) -> RosterSnapshot {
        self.inner.snapshots.borrow().clone()
    }

    /// Current size of a party, as the local layout has it.
    pub fn party_len(&self, party_index: usize) -> Option<usize> {
        self.lock().layout.party(party_index).map(Party::len)
    }

    /// Position of a member inside a party, as the local layout has it.
    pub fn member_position(&self, party_index: usize, member_id: CharacterId) -> Option<usize> {
        self.lock()
            .layout
            .party(party_index)
            .and_then(|party| party.position_of(member_id))
    }

    pub fn party_count(&self) -> usize {
        self.lock().layout.len()
    }

    fn lock(&self) -> MutexGuard<'_, RosterState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Send the current state to watchers. The lock is held while sending
    /// so snapshots reach watchers in state order.
    fn publish(&self) {
        let state = self.lock();
        self.inner
            .snapshots
            .send_replace(state.snapshot(self.inner.access));
    }

    fn ensure_operator(&self) -> Result<(), RosterError> {
        if self.inner.access.can_modify() {
            Ok(())
        } else {
            tracing::warn!(event_code = %self.inner.event_code, "Rejected change from observer");
            Err(RosterError::NotOperator)
        }
    }

    fn record_failure(&self, operation: &'static str, error: ServiceError) -> RosterError {
        tracing::error!(
            event_code = %self.inner.event_code,
            operation,
            error = %error,
            "Roster request failed"
        );
        self.lock().last_error = Some(error.user_message());
        self.publish();
        RosterError::Service(error)
    }

    fn forget_self(&self) {
        self.inner
            .storage
            .remove(&storage_keys::self_character(&self.inner.event_code));
    }

    // =========================================================================
    // Optimistic layout mutations
    // =========================================================================

    /// Move a member between (or within) parties.
    ///
    /// `to_party == party_count()` opens a new party.
    pub fn move_character(
        &self,
        from_party: usize,
        to_party: usize,
        member_id: CharacterId,
        to_index: usize,
    ) -> Result<PendingWrite, RosterError> {
        self.mutate_layout("move_character", |layout| {
            layout
                .move_character(from_party, to_party, member_id, to_index)
                .map(|_| ())
        })
    }

    pub fn swap_characters(
        &self,
        from_party: usize,
        to_party: usize,
        source_id: CharacterId,
        target_id: CharacterId,
    ) -> Result<PendingWrite, RosterError> {
        self.mutate_layout("swap_characters", |layout| {
            layout.swap_characters(from_party, to_party, source_id, target_id)
        })
    }

    /// Place a pending character into a party.
    pub fn assign_from_pending(
        &self,
        character: Character,
        to_party: usize,
        to_index: usize,
    ) -> Result<PendingWrite, RosterError> {
        self.mutate_layout("assign_from_pending", |layout| {
            layout.assign(character, to_party, to_index).map(|_| ())
        })
    }

    /// Take a member out of its party, back to pending.
    pub fn unassign_character(
        &self,
        from_party: usize,
        member_id: CharacterId,
    ) -> Result<PendingWrite, RosterError> {
        self.mutate_layout("unassign_character", |layout| {
            layout.unassign(from_party, member_id).map(|_| ())
        })
    }

    fn mutate_layout(
        &self,
        operation: &'static str,
        apply: impl FnOnce(&mut PartyLayout) -> Result<(), LayoutError>,
    ) -> Result<PendingWrite, RosterError> {
        self.ensure_operator()?;

        let (revision, layout) = {
            let mut state = self.lock();
            if let Err(e) = apply(&mut state.layout) {
                tracing::warn!(operation, error = %e, "Party change rejected");
                return Err(e.into());
            }
            let revision = state.begin_write();
            (revision, state.layout.clone())
        };

        tracing::debug!(
            event_code = %self.inner.event_code,
            operation,
            revision,
            "Applied optimistic party change"
        );
        self.publish();

        let service = self.inner.service.clone();
        let code = self.inner.event_code.clone();
        Ok(self.spawn_write(revision, "persist_parties", async move {
            service.persist_parties(&code, &layout).await
        }))
    }

    /// Delete characters server-side and clear every party locally.
    ///
    /// Returns as soon as local state changed; the authoritative roster
    /// arrives with the next refresh.
    pub fn clear(&self, ids: &[CharacterId]) -> Result<PendingWrite, RosterError> {
        self.ensure_operator()?;

        let (revision, lost_self) = {
            let mut state = self.lock();
            state.layout.clear();
            state.characters.retain(|c| !ids.contains(&c.id()));
            let lost_self = state.self_id.is_some_and(|id| ids.contains(&id));
            if lost_self {
                state.self_id = None;
            }
            (state.begin_write(), lost_self)
        };
        if lost_self {
            self.forget_self();
        }

        tracing::info!(
            event_code = %self.inner.event_code,
            removed = ids.len(),
            revision,
            "Cleared parties"
        );
        self.publish();

        let service = self.inner.service.clone();
        let ids = ids.to_vec();
        Ok(self.spawn_write(revision, "remove_characters", async move {
            service.remove_characters(&ids).await
        }))
    }

    /// Delete every party, keeping the characters.
    pub fn reset_parties(&self) -> Result<PendingWrite, RosterError> {
        self.ensure_operator()?;

        let revision = {
            let mut state = self.lock();
            state.layout.clear();
            state.begin_write()
        };
        self.publish();

        let service = self.inner.service.clone();
        let code = self.inner.event_code.clone();
        Ok(self.spawn_write(revision, "delete_parties", async move {
            service.delete_parties(&code).await
        }))
    }

    fn spawn_write<F>(&self, revision: u64, operation: &'static str, write: F) -> PendingWrite
    where
        F: Future<Output = Result<(), ServiceError>> + Send + 'static,
    {
        let store = self.clone();
        let task = tokio::spawn(async move {
            let result = write.await;
            store.settle_write(revision, operation, result).await
        });
        PendingWrite::spawned(revision, task)
    }

    async fn settle_write(
        &self,
        revision: u64,
        operation: &'static str,
        result: Result<(), ServiceError>,
    ) -> Result<(), RosterError> {
        let replay = {
            let mut state = self.lock();
            state.unconfirmed.remove(&revision);
            if let Err(e) = &result {
                state.last_error = Some(e.user_message());
            }
            state.unconfirmed.is_empty() && std::mem::take(&mut state.stale_parties)
        };

        match &result {
            Ok(()) => tracing::debug!(operation, revision, "Write confirmed"),
            Err(e) => tracing::error!(
                event_code = %self.inner.event_code,
                operation,
                revision,
                error = %e,
                "Write failed, keeping local state"
            ),
        }
        self.publish();

        if replay {
            tracing::debug!(revision, "Replaying parties refresh deferred during write");
            if let Err(e) = self.refresh_parties().await {
                tracing::warn!(error = %e, "Replayed parties refresh failed");
            }
        }

        result.map_err(RosterError::from)
    }

    // =========================================================================
    // Awaited operations
    // =========================================================================

    /// Hide parties, then let the backend reassign everyone.
    ///
    /// The new layout replaces local state wholesale and the self identity
    /// is cleared if it is no longer placed.
    pub async fn shuffle(&self) -> Result<(), RosterError> {
        self.ensure_operator()?;
        let code = &self.inner.event_code;

        self.inner
            .service
            .set_parties_visibility(code, false)
            .await
            .map_err(|e| self.record_failure("hide_parties", e))?;
        {
            let mut state = self.lock();
            state
                .event
                .get_or_insert_with(|| Event::new(code.clone()))
                .are_parties_visible = false;
        }
        self.publish();

        let layout = self
            .inner
            .service
            .shuffle_parties(code)
            .await
            .map_err(|e| self.record_failure("shuffle_parties", e))?
            .clamped(&self.inner.bounds);

        let lost_self = {
            let mut state = self.lock();
            state.revision += 1;
            state.layout = layout;
            state.stale_parties = false;
            state.mark_synced();
            let lost_self = state.self_id.is_some_and(|id| !state.layout.contains(id));
            if lost_self {
                state.self_id = None;
            }
            lost_self
        };
        if lost_self {
            tracing::info!(event_code = %code, "Own character not placed by shuffle, forgetting it");
            self.forget_self();
        }

        tracing::info!(event_code = %code, parties = self.party_count(), "Parties shuffled");
        self.publish();
        Ok(())
    }

    pub async fn set_parties_visibility(&self, visible: bool) -> Result<(), RosterError> {
        self.ensure_operator()?;
        let code = &self.inner.event_code;

        self.inner
            .service
            .set_parties_visibility(code, visible)
            .await
            .map_err(|e| self.record_failure("set_parties_visibility", e))?;

        self.lock()
            .event
            .get_or_insert_with(|| Event::new(code.clone()))
            .are_parties_visible = visible;
        tracing::info!(event_code = %code, visible, "Parties visibility changed");
        self.publish();
        Ok(())
    }

    /// Create or update a character and remember a new one as this device's.
    ///
    /// Observers may only edit their own character.
    pub async fn register_character(&self, draft: CharacterDraft) -> Result<Character, RosterError> {
        if let Some(id) = draft.id() {
            let own = self.lock().self_id == Some(id);
            if !own && !self.inner.access.can_modify() {
                return Err(RosterError::NotOwnCharacter(id));
            }
        }

        let code = &self.inner.event_code;
        let draft = draft.clamped(&self.inner.bounds);
        let character = self
            .inner
            .service
            .upsert_character(code, &draft)
            .await
            .map_err(|e| self.record_failure("upsert_character", e))?
            .clamped(&self.inner.bounds);

        {
            let mut state = self.lock();
            match state.characters.iter_mut().find(|c| c.id() == character.id()) {
                Some(existing) => *existing = character.clone(),
                None => state.characters.push(character.clone()),
            }
            if draft.id().is_none() {
                state.self_id = Some(character.id());
            }
        }
        if draft.id().is_none() {
            self.inner.storage.save(
                &storage_keys::self_character(code),
                &character.id().to_string(),
            );
        }

        tracing::info!(event_code = %code, character_id = %character.id(), "Character saved");
        self.publish();
        Ok(character)
    }

    /// Delete this device's character.
    pub async fn leave(&self) -> Result<(), RosterError> {
        let id = self.lock().self_id.ok_or(RosterError::NoSelfCharacter)?;

        self.inner
            .service
            .delete_character(id)
            .await
            .map_err(|e| self.record_failure("delete_character", e))?;

        {
            let mut state = self.lock();
            state.characters.retain(|c| c.id() != id);
            if let Some(placement) = state.layout.locate(id) {
                let _ = state.layout.unassign(placement.party_index, id);
            }
            state.self_id = None;
        }
        self.forget_self();

        tracing::info!(event_code = %self.inner.event_code, character_id = %id, "Left event");
        self.publish();
        Ok(())
    }

    // =========================================================================
    // Refreshes
    // =========================================================================

    /// Refetch the roster and re-resolve the self identity.
    pub async fn refresh_characters(&self) -> Result<(), RosterError> {
        let characters = self
            .inner
            .service
            .fetch_characters(&self.inner.event_code)
            .await
            .map_err(|e| self.record_failure("fetch_characters", e))?;
        let characters: Vec<Character> = characters
            .into_iter()
            .map(|c| c.clamped(&self.inner.bounds))
            .collect();

        let lost_self = {
            let mut state = self.lock();
            state.characters = characters;
            state.mark_synced();
            let lost_self = state
                .self_id
                .is_some_and(|id| !state.characters.iter().any(|c| c.id() == id));
            if lost_self {
                state.self_id = None;
            }
            lost_self
        };
        if lost_self {
            tracing::info!(event_code = %self.inner.event_code, "Own character no longer registered");
            self.forget_self();
        }

        self.publish();
        Ok(())
    }

    /// Refetch the party layout.
    ///
    /// Under [`ReconcilePolicy::Versioned`] the response is discarded when a
    /// local write happened while it was in flight or is still unconfirmed.
    pub async fn refresh_parties(&self) -> Result<(), RosterError> {
        for attempt in 1..=MAX_PARTIES_REFRESH_ATTEMPTS {
            let started_at = self.lock().revision;

            let layout = self
                .inner
                .service
                .fetch_parties(&self.inner.event_code)
                .await
                .map_err(|e| self.record_failure("fetch_parties", e))?
                .clamped(&self.inner.bounds);

            let outcome = {
                let mut state = self.lock();
                let superseded = state.revision != started_at || !state.unconfirmed.is_empty();
                match self.inner.policy {
                    ReconcilePolicy::Versioned if superseded => {
                        if state.unconfirmed.is_empty() {
                            RefreshOutcome::Retry
                        } else {
                            state.stale_parties = true;
                            RefreshOutcome::Deferred
                        }
                    }
                    _ => {
                        if superseded {
                            tracing::warn!(
                                revision = state.revision,
                                "Parties refresh overwrites unconfirmed local changes"
                            );
                        }
                        state.layout = layout;
                        state.stale_parties = false;
                        state.mark_synced();
                        RefreshOutcome::Applied
                    }
                }
            };

            match outcome {
                RefreshOutcome::Applied => {
                    self.publish();
                    return Ok(());
                }
                RefreshOutcome::Deferred => {
                    tracing::debug!(started_at, "Parties refresh deferred behind unconfirmed write");
                    return Ok(());
                }
                RefreshOutcome::Retry => {
                    tracing::debug!(attempt, started_at, "Parties refresh raced a write, refetching");
                }
            }
        }

        let write_pending = {
            let mut state = self.lock();
            let write_pending = !state.unconfirmed.is_empty();
            state.stale_parties |= write_pending;
            write_pending
        };
        if write_pending {
            tracing::warn!("Parties refresh kept racing local writes, replaying once they settle");
        } else {
            tracing::warn!("Parties refresh kept racing local writes, replaying in the background");
            self.spawn_parties_refresh();
        }
        Ok(())
    }

    fn spawn_parties_refresh(&self) {
        let store = self.clone();
        tokio::spawn(async move {
            if let Err(e) = store.refresh_parties().await {
                tracing::warn!(error = %e, "Replayed parties refresh failed");
            }
        });
    }

    pub async fn refresh_event(&self) -> Result<(), RosterError> {
        let event = self
            .inner
            .service
            .fetch_event(&self.inner.event_code)
            .await
            .map_err(|e| self.record_failure("fetch_event", e))?;

        {
            let mut state = self.lock();
            state.event = Some(event);
            state.mark_synced();
        }
        self.publish();
        Ok(())
    }

    /// Refetch everything. Each resource refreshes even if another fails.
    pub async fn refresh_all(&self) -> Result<(), RosterError> {
        let (characters, parties, event) = tokio::join!(
            self.refresh_characters(),
            self.refresh_parties(),
            self.refresh_event()
        );
        characters.and(parties).and(event)
    }

    /// Subscribe to a push channel; every message spawns the matching refresh.
    pub fn attach(&self, channel: &PushChannel) -> Subscription {
        channel.subscribe(
            RefreshCallbacks::new()
                .on_character(refresh_in_background(self, |store| async move {
                    store.refresh_characters().await
                }))
                .on_parties(refresh_in_background(self, |store| async move {
                    store.refresh_parties().await
                }))
                .on_event(refresh_in_background(self, |store| async move {
                    store.refresh_event().await
                })),
        )
    }
}

fn refresh_in_background<F, Fut>(store: &RosterStore, refresh: F) -> impl Fn() + Send + Sync + 'static
where
    F: Fn(RosterStore) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), RosterError>> + Send + 'static,
{
    let store = store.clone();
    move || {
        let pending = refresh(store.clone());
        tokio::spawn(async move {
            if let Err(e) = pending.await {
                tracing::debug!(error = %e, "Push-triggered refresh failed");
            }
        });
    }
}
