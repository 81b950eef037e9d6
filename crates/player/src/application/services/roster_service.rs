//! Roster Service - persistence client for one event's roster and parties
//!
//! Stateless request functions, each a single round trip. Nothing here
//! retries, de-duplicates or queues; failures go back to the caller.

use keyparty_domain::{Character, CharacterDraft, CharacterId, Event, EventCode, PartyLayout};
use keyparty_shared::{
    paths, RemoveCharactersRequest, SetPartiesVisibilityRequest, UpsertCharacterRequest,
};

use crate::application::api::Api;
use crate::application::ServiceError;

/// Roster service for talking to the event backend
///
/// Depends only on the typed `Api` wrapper, not on a concrete HTTP client.
#[derive(Clone)]
pub struct RosterService {
    api: Api,
}

impl RosterService {
    pub fn new(api: Api) -> Self {
        Self { api }
    }

    /// Fetch event metadata (parties visibility).
    pub async fn fetch_event(&self, code: &EventCode) -> Result<Event, ServiceError> {
        Ok(self.api.get(&paths::event(code)).await?)
    }

    /// Fetch every character registered for an event.
    pub async fn fetch_characters(&self, code: &EventCode) -> Result<Vec<Character>, ServiceError> {
        Ok(self.api.get(&paths::characters(code)).await?)
    }

    /// Fetch the authoritative party layout.
    pub async fn fetch_parties(&self, code: &EventCode) -> Result<PartyLayout, ServiceError> {
        Ok(self.api.get(&paths::parties(code)).await?)
    }

    /// Persist the whole layout as one unit (last write wins server-side).
    pub async fn persist_parties(
        &self,
        code: &EventCode,
        layout: &PartyLayout,
    ) -> Result<(), ServiceError> {
        tracing::debug!(
            event_code = %code,
            parties = layout.len(),
            members = layout.total_members(),
            "Persisting party layout"
        );
        Ok(self.api.post_no_response(&paths::parties(code), layout).await?)
    }

    pub async fn delete_parties(&self, code: &EventCode) -> Result<(), ServiceError> {
        Ok(self.api.delete(&paths::parties(code)).await?)
    }

    /// Ask the backend to reassign everyone; returns the new layout.
    pub async fn shuffle_parties(&self, code: &EventCode) -> Result<PartyLayout, ServiceError> {
        Ok(self.api.get(&paths::shuffle_parties(code)).await?)
    }

    /// Create (draft without id) or update a character.
    pub async fn upsert_character(
        &self,
        code: &EventCode,
        draft: &CharacterDraft,
    ) -> Result<Character, ServiceError> {
        let body = UpsertCharacterRequest::new(draft.clone(), code.clone());
        Ok(self.api.put(paths::UPSERT_CHARACTER, &body).await?)
    }

    pub async fn delete_character(&self, id: CharacterId) -> Result<(), ServiceError> {
        Ok(self.api.delete(&paths::character(id)).await?)
    }

    /// Delete a batch of characters.
    pub async fn remove_characters(&self, ids: &[CharacterId]) -> Result<(), ServiceError> {
        let body = RemoveCharactersRequest { ids: ids.to_vec() };
        Ok(self
            .api
            .post_no_response(paths::REMOVE_CHARACTERS, &body)
            .await?)
    }

    pub async fn set_parties_visibility(
        &self,
        code: &EventCode,
        visible: bool,
    ) -> Result<(), ServiceError> {
        let body = SetPartiesVisibilityRequest { visible };
        Ok(self
            .api
            .patch_no_response(&paths::parties_visibility(code), &body)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::testing::fixtures::api_request_failed;
    use crate::ports::outbound::{ApiError, MockRawApiPort};
    use keyparty_domain::testing::{character, party};
    use keyparty_domain::{CharacterClass, CharacterName, LevelBounds, Specialization};
    use serde_json::json;
    use std::sync::Arc;

    fn service(mock: MockRawApiPort) -> RosterService {
        RosterService::new(Api::new(Arc::new(mock)))
    }

    fn code() -> EventCode {
        EventCode::new("tuesday-keys").unwrap()
    }

    #[tokio::test]
    async fn fetch_characters_reads_event_roster() {
        let mut mock = MockRawApiPort::new();
        let roster = serde_json::to_value(vec![character(1), character(2)]).unwrap();
        mock.expect_get_json()
            .withf(|path| path == "/events/tuesday-keys/characters")
            .times(1)
            .returning(move |_| Ok(roster.clone()));

        let characters = service(mock).fetch_characters(&code()).await.unwrap();

        assert_eq!(characters.len(), 2);
        assert_eq!(characters[1].id(), CharacterId::new(2));
    }

    #[tokio::test]
    async fn fetch_parties_rejects_duplicate_assignment() {
        let mut mock = MockRawApiPort::new();
        let parties = serde_json::to_value(vec![party(&[1, 2]), party(&[2])]).unwrap();
        mock.expect_get_json()
            .returning(move |_| Ok(parties.clone()));

        let err = service(mock).fetch_parties(&code()).await.unwrap_err();

        assert!(matches!(err, ServiceError::ParseError(_)));
    }

    #[tokio::test]
    async fn persist_parties_posts_full_array() {
        let mut mock = MockRawApiPort::new();
        mock.expect_post_no_response_json()
            .withf(|path, body| {
                path == "/events/tuesday-keys/parties"
                    && body.as_array().map(Vec::len) == Some(2)
                    && body[1]["members"][0]["id"] == json!(3)
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let layout = PartyLayout::new(vec![party(&[1, 2]), party(&[3])]).unwrap();
        service(mock)
            .persist_parties(&code(), &layout)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn shuffle_uses_get_and_returns_layout() {
        let mut mock = MockRawApiPort::new();
        let parties = serde_json::to_value(vec![party(&[2, 1])]).unwrap();
        mock.expect_get_json()
            .withf(|path| path == "/events/tuesday-keys/shuffle-parties")
            .returning(move |_| Ok(parties.clone()));

        let layout = service(mock).shuffle_parties(&code()).await.unwrap();

        assert_eq!(layout.total_members(), 2);
    }

    #[tokio::test]
    async fn remove_characters_sends_id_list() {
        let mut mock = MockRawApiPort::new();
        mock.expect_post_no_response_json()
            .withf(|path, body| path == "/characters/remove" && *body == json!({ "ids": [4, 9] }))
            .times(1)
            .returning(|_, _| Ok(()));

        service(mock)
            .remove_characters(&[CharacterId::new(4), CharacterId::new(9)])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn set_visibility_patches_flag() {
        let mut mock = MockRawApiPort::new();
        mock.expect_patch_json()
            .withf(|path, body| {
                path == "/events/tuesday-keys/setPartiesVisibility"
                    && *body == json!({ "visible": true })
            })
            .times(1)
            .returning(|_, _| Ok(serde_json::Value::Null));

        service(mock)
            .set_parties_visibility(&code(), true)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn upsert_returns_stored_character() {
        let mut mock = MockRawApiPort::new();
        let stored = serde_json::to_value(character(12)).unwrap();
        mock.expect_put_json()
            .withf(|path, body| path == "/characters/upsert" && body["eventCode"] == "tuesday-keys")
            .returning(move |_, _| Ok(stored.clone()));

        let draft = CharacterDraft::new(
            CharacterName::new("char-12").unwrap(),
            CharacterClass::Rogue,
            Specialization::Outlaw,
            620,
            2,
            12,
            &LevelBounds::default(),
        )
        .unwrap();
        let created = service(mock)
            .upsert_character(&code(), &draft)
            .await
            .unwrap();

        assert_eq!(created.id(), CharacterId::new(12));
    }

    #[tokio::test]
    async fn transport_failure_is_returned_not_retried() {
        let mut mock = MockRawApiPort::new();
        mock.expect_delete()
            .times(1)
            .returning(|_| Err(api_request_failed("connection refused")));

        let err = service(mock)
            .delete_character(CharacterId::new(3))
            .await
            .unwrap_err();

        assert_eq!(err, ServiceError::Request("connection refused".into()));
    }

    #[tokio::test]
    async fn missing_event_is_not_found() {
        let mut mock = MockRawApiPort::new();
        mock.expect_get_json().returning(|_| {
            Err(ApiError::HttpError {
                status: 404,
                message: "unknown event".into(),
            })
        });

        let err = service(mock).fetch_event(&code()).await.unwrap_err();

        assert!(err.is_not_found());
    }
}
