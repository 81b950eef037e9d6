//! REST paths of the event backend, relative to the API base URL.

use keyparty_domain::{CharacterId, EventCode};

/// `GET /events/{code}`
pub fn event(code: &EventCode) -> String {
    format!("/events/{}", code)
}

/// `GET /events/{code}/characters`
pub fn characters(code: &EventCode) -> String {
    format!("/events/{}/characters", code)
}

/// `GET | POST | DELETE /events/{code}/parties`
pub fn parties(code: &EventCode) -> String {
    format!("/events/{}/parties", code)
}

/// `GET /events/{code}/shuffle-parties`
pub fn shuffle_parties(code: &EventCode) -> String {
    format!("/events/{}/shuffle-parties", code)
}

/// `PATCH /events/{code}/setPartiesVisibility`
pub fn parties_visibility(code: &EventCode) -> String {
    format!("/events/{}/setPartiesVisibility", code)
}

/// `PUT /characters/upsert`
pub const UPSERT_CHARACTER: &str = "/characters/upsert";

/// `POST /characters/remove`
pub const REMOVE_CHARACTERS: &str = "/characters/remove";

/// `DELETE /characters/{id}`
pub fn character(id: CharacterId) -> String {
    format!("/characters/{}", id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_scoped_paths() {
        let code = EventCode::new("tuesday-keys").unwrap();
        assert_eq!(event(&code), "/events/tuesday-keys");
        assert_eq!(characters(&code), "/events/tuesday-keys/characters");
        assert_eq!(parties(&code), "/events/tuesday-keys/parties");
        assert_eq!(
            shuffle_parties(&code),
            "/events/tuesday-keys/shuffle-parties"
        );
        assert_eq!(
            parties_visibility(&code),
            "/events/tuesday-keys/setPartiesVisibility"
        );
    }

    #[test]
    fn test_character_path() {
        assert_eq!(character(CharacterId::new(42)), "/characters/42");
    }
}
