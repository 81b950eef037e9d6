//! Push channel - typed subscription bus for backend invalidations.
//!
//! The backend never sends data over this channel, only "resource X is
//! stale". Subscribers register one refresh callback per resource kind and
//! get back a [`Subscription`] they own; dropping it unsubscribes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use keyparty_shared::PushMessage;
use uuid::Uuid;

/// Zero-argument refresh callback.
pub type RefreshCallback = Arc<dyn Fn() + Send + Sync + 'static>;

/// One optional callback per push message kind.
#[derive(Clone, Default)]
pub struct RefreshCallbacks {
    pub on_character: Option<RefreshCallback>,
    pub on_parties: Option<RefreshCallback>,
    pub on_event: Option<RefreshCallback>,
}

impl RefreshCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_character(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_character = Some(Arc::new(callback));
        self
    }

    pub fn on_parties(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_parties = Some(Arc::new(callback));
        self
    }

    pub fn on_event(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_event = Some(Arc::new(callback));
        self
    }

    fn for_message(&self, message: PushMessage) -> Option<RefreshCallback> {
        match message {
            PushMessage::CharacterUpdated => self.on_character.clone(),
            PushMessage::PartiesUpdated => self.on_parties.clone(),
            PushMessage::EventUpdated => self.on_event.clone(),
            PushMessage::Unknown => None,
        }
    }
}

type Subscribers = Mutex<HashMap<Uuid, RefreshCallbacks>>;

/// Push channel for one event.
///
/// Cheap to clone; clones share the subscriber registry.
#[derive(Clone, Default)]
pub struct PushChannel {
    subscribers: Arc<Subscribers>,
}

impl PushChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register refresh callbacks until the returned handle is dropped.
    pub fn subscribe(&self, callbacks: RefreshCallbacks) -> Subscription {
        let id = Uuid::new_v4();
        lock(&self.subscribers).insert(id, callbacks);
        tracing::debug!(subscription_id = %id, "Push channel subscriber added");
        Subscription {
            id,
            subscribers: Arc::downgrade(&self.subscribers),
        }
    }

    /// Invoke every subscriber's callback for `message`.
    ///
    /// Callbacks run outside the registry lock, so a callback may subscribe
    /// or unsubscribe. Returns how many callbacks ran.
    pub fn dispatch(&self, message: PushMessage) -> usize {
        if message == PushMessage::Unknown {
            tracing::debug!("Ignoring unknown push message");
            return 0;
        }

        let callbacks: Vec<RefreshCallback> = lock(&self.subscribers)
            .values()
            .filter_map(|callbacks| callbacks.for_message(message))
            .collect();

        tracing::debug!(message = %message, subscribers = callbacks.len(), "Dispatching push message");
        for callback in &callbacks {
            callback();
        }
        callbacks.len()
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.subscribers).len()
    }

    /// Drop every subscriber. Outstanding `Subscription`s become inert.
    pub fn clear(&self) {
        lock(&self.subscribers).clear();
    }
}

/// Owned subscription handle. Unsubscribes on drop.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: Uuid,
    subscribers: Weak<Subscribers>,
}

impl Subscription {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn unsubscribe(self) {
        // Drop does the work
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(subscribers) = self.subscribers.upgrade() {
            if lock(&subscribers).remove(&self.id).is_some() {
                tracing::debug!(subscription_id = %self.id, "Push channel subscriber removed");
            }
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

fn lock(subscribers: &Subscribers) -> MutexGuard<'_, HashMap<Uuid, RefreshCallbacks>> {
    subscribers.lock().unwrap_or_else(PoisonError::into_inner)
}
