//! REST request bodies.

use keyparty_domain::{CharacterDraft, CharacterId, EventCode};
use serde::{Deserialize, Serialize};

/// Body of `POST /characters/remove`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveCharactersRequest {
    pub ids: Vec<CharacterId>,
}

/// Body of `PATCH /events/{code}/setPartiesVisibility`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetPartiesVisibilityRequest {
    pub visible: bool,
}

/// Body of `PUT /characters/upsert`.
///
/// The draft's fields are flattened next to the event code, so a draft
/// without an id creates a character and one with an id updates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertCharacterRequest {
    #[serde(flatten)]
    pub character: CharacterDraft,
    pub event_code: EventCode,
}

impl UpsertCharacterRequest {
    pub fn new(character: CharacterDraft, event_code: EventCode) -> Self {
        Self {
            character,
            event_code,
        }
    }
}
