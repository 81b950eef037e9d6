//! Test fixtures used across unit tests.
//!
//! `FakeEventApi` is a scripted in-memory backend for one event. Unlike a
//! `MockRawApiPort` it keeps state between calls, and it can hold party
//! writes and party fetches in flight so tests can interleave them.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use keyparty_domain::{Character, CharacterId, Event, EventCode, Party, PartyLayout};
use keyparty_shared::paths;
use serde_json::{json, Value};
use tokio::sync::{watch, Semaphore};

use crate::ports::outbound::{ApiError, RawApiPort};

pub fn api_request_failed(msg: &str) -> ApiError {
    ApiError::RequestFailed(msg.to_string())
}

struct FakeState {
    event: Value,
    characters: Vec<Value>,
    parties: Value,
    shuffle_result: Value,
    failing: HashSet<String>,
    calls: Vec<String>,
    next_id: i64,
}

pub struct FakeEventApi {
    code: EventCode,
    state: Mutex<FakeState>,
    persist_gate: watch::Sender<bool>,
    fetches_held: AtomicBool,
    fetch_permits: Semaphore,
}

impl FakeEventApi {
    pub fn new(code: &EventCode) -> Self {
        let (persist_gate, _) = watch::channel(true);
        Self {
            code: code.clone(),
            state: Mutex::new(FakeState {
                event: to_value(&Event::new(code.clone())),
                characters: Vec::new(),
                parties: json!([]),
                shuffle_result: json!([]),
                failing: HashSet::new(),
                calls: Vec::new(),
                next_id: 1000,
            }),
            persist_gate,
            fetches_held: AtomicBool::new(false),
            fetch_permits: Semaphore::new(0),
        }
    }

    pub fn with_event(self, event: Event) -> Self {
        self.lock().event = to_value(&event);
        self
    }

    pub fn with_characters(self, characters: Vec<Character>) -> Self {
        self.lock().characters = characters.iter().map(to_value).collect();
        self
    }

    pub fn with_parties(self, parties: Vec<Party>) -> Self {
        self.set_parties(parties);
        self
    }

    pub fn with_shuffle_result(self, parties: Vec<Party>) -> Self {
        self.lock().shuffle_result = to_value(&parties);
        self
    }

    /// Overwrite the stored layout, as another writer would.
    pub fn set_parties(&self, parties: Vec<Party>) {
        self.lock().parties = to_value(&parties);
    }

    /// Requests whose `"METHOD path"` matches fail with a transport error.
    pub fn fail(&self, call: &str) {
        self.lock().failing.insert(call.to_string());
    }

    pub fn recover(&self) {
        self.lock().failing.clear();
    }

    /// Party writes wait until `release_persists` is called.
    pub fn hold_persists(&self) {
        self.persist_gate.send_replace(false);
    }

    pub fn release_persists(&self) {
        self.persist_gate.send_replace(true);
    }

    /// Party fetches read the stored layout when they arrive, then wait for
    /// `release_party_fetch` before answering with it.
    pub fn hold_party_fetches(&self) {
        self.fetches_held.store(true, Ordering::SeqCst);
    }

    /// Let one held party fetch answer.
    pub fn release_party_fetch(&self) {
        self.fetch_permits.add_permits(1);
    }

    /// Let every party fetch through, now and from here on.
    pub fn release_party_fetches(&self) {
        self.fetches_held.store(false, Ordering::SeqCst);
        self.fetch_permits.close();
    }

    /// Number of `GET` requests for the party layout seen so far.
    pub fn party_fetches(&self) -> usize {
        let path = format!("GET {}", paths::parties(&self.code));
        self.lock().calls.iter().filter(|c| **c == path).count()
    }

    /// Every request seen so far, as `"METHOD path"`.
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    pub fn stored_layout(&self) -> PartyLayout {
        serde_json::from_value(self.lock().parties.clone()).expect("stored layout is valid")
    }

    pub fn stored_character_ids(&self) -> Vec<CharacterId> {
        self.lock()
            .characters
            .iter()
            .filter_map(|c| c["id"].as_i64().map(CharacterId::new))
            .collect()
    }

    pub fn parties_visible(&self) -> bool {
        self.lock().event["arePartiesVisible"].as_bool().unwrap_or(false)
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, method: &str, path: &str) -> Result<(), ApiError> {
        let call = format!("{} {}", method, path);
        let mut state = self.lock();
        state.calls.push(call.clone());
        if state.failing.contains(&call) {
            return Err(api_request_failed("connection refused"));
        }
        Ok(())
    }

    async fn party_fetch_released(&self) {
        if !self.fetches_held.load(Ordering::SeqCst) {
            return;
        }
        // A closed semaphore means the gate was opened for good.
        if let Ok(permit) = self.fetch_permits.acquire().await {
            permit.forget();
        }
    }

    fn unknown(method: &str, path: &str) -> ApiError {
        ApiError::HttpError {
            status: 404,
            message: format!("no fake route for {} {}", method, path),
        }
    }
}

fn to_value<T: serde::Serialize>(value: &T) -> Value {
    serde_json::to_value(value).expect("fixture serializes")
}

#[async_trait::async_trait]
impl RawApiPort for FakeEventApi {
    async fn get_json(&self, path: &str) -> Result<Value, ApiError> {
        self.record("GET", path)?;
        if path == paths::parties(&self.code) {
            let parties = self.lock().parties.clone();
            self.party_fetch_released().await;
            return Ok(parties);
        }
        let mut state = self.lock();
        if path == paths::event(&self.code) {
            Ok(state.event.clone())
        } else if path == paths::characters(&self.code) {
            Ok(Value::Array(state.characters.clone()))
        } else if path == paths::shuffle_parties(&self.code) {
            state.parties = state.shuffle_result.clone();
            Ok(state.parties.clone())
        } else {
            Err(Self::unknown("GET", path))
        }
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        self.post_no_response_json(path, body).await?;
        Ok(Value::Null)
    }

    async fn post_no_response_json(&self, path: &str, body: &Value) -> Result<(), ApiError> {
        self.record("POST", path)?;
        if path == paths::parties(&self.code) {
            let mut gate = self.persist_gate.subscribe();
            gate.wait_for(|open| *open)
                .await
                .map_err(|e| api_request_failed(&e.to_string()))?;
            self.lock().parties = body.clone();
            Ok(())
        } else if path == paths::REMOVE_CHARACTERS {
            let ids: HashSet<i64> = body["ids"]
                .as_array()
                .map(|ids| ids.iter().filter_map(Value::as_i64).collect())
                .unwrap_or_default();
            self.lock()
                .characters
                .retain(|c| !c["id"].as_i64().is_some_and(|id| ids.contains(&id)));
            Ok(())
        } else {
            Err(Self::unknown("POST", path))
        }
    }

    async fn put_json(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        self.record("PUT", path)?;
        if path != paths::UPSERT_CHARACTER {
            return Err(Self::unknown("PUT", path));
        }
        let mut state = self.lock();
        let mut stored = body.clone();
        if let Some(map) = stored.as_object_mut() {
            map.remove("eventCode");
        }
        let id = match body["id"].as_i64() {
            Some(id) => id,
            None => {
                state.next_id += 1;
                state.next_id
            }
        };
        stored["id"] = json!(id);
        state.characters.retain(|c| c["id"].as_i64() != Some(id));
        state.characters.push(stored.clone());
        Ok(stored)
    }

    async fn patch_json(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        self.record("PATCH", path)?;
        if path != paths::parties_visibility(&self.code) {
            return Err(Self::unknown("PATCH", path));
        }
        self.lock().event["arePartiesVisible"] = body["visible"].clone();
        Ok(Value::Null)
    }

    async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.record("DELETE", path)?;
        let mut state = self.lock();
        if path == paths::parties(&self.code) {
            state.parties = json!([]);
            return Ok(());
        }
        let id = path
            .strip_prefix("/characters/")
            .and_then(|id| id.parse::<i64>().ok())
            .ok_or_else(|| Self::unknown("DELETE", path))?;
        state.characters.retain(|c| c["id"].as_i64() != Some(id));
        Ok(())
    }
}
