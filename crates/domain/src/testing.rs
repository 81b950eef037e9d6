//! Test fixtures shared by this crate and downstream crates' tests.
//!
//! Enabled for this crate's own tests and, for other crates, through the
//! `testing` feature.

use crate::types::{CharacterClass, Specialization};
use crate::value_objects::CharacterName;
use crate::{Character, CharacterId, Party};

/// A damage dealer with the given id, named `char-<id>`.
pub fn character(id: i64) -> Character {
    character_with(id, CharacterClass::Rogue, Specialization::Outlaw)
}

/// A character with an explicit class/spec pair.
///
/// # Panics
///
/// Panics if `spec` does not belong to `class`.
pub fn character_with(id: i64, class: CharacterClass, spec: Specialization) -> Character {
    let name = CharacterName::new(format!("char-{}", id)).expect("fixture name is valid");
    Character::new(CharacterId::new(id), name, class, spec).expect("fixture spec matches class")
}

/// A party holding fixture characters with the given ids.
///
/// # Panics
///
/// Panics if more than five ids are given.
pub fn party(ids: &[i64]) -> Party {
    Party::from_members(ids.iter().map(|id| character(*id)).collect())
        .expect("fixture party fits capacity")
}

/// Ids of a party's members, in order.
pub fn ids(party: &Party) -> Vec<i64> {
    party.member_ids().map(|id| id.as_i64()).collect()
}
