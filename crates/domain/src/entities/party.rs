//! Party entity - an ordered, fixed-capacity group of characters
//!
//! Member order is kept for display; it carries no other meaning.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::types::Role;
use crate::value_objects::LevelBounds;
use crate::{Character, CharacterId};

/// An ordered group of at most [`Party::CAPACITY`] characters.
///
/// # Invariants
///
/// - `members.len() <= Party::CAPACITY` (checked on every insert and on
///   deserialization)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PartyWireFormat")]
pub struct Party {
    members: Vec<Character>,
}

#[derive(Deserialize)]
struct PartyWireFormat {
    #[serde(default)]
    members: Vec<Character>,
}

impl TryFrom<PartyWireFormat> for Party {
    type Error = DomainError;

    fn try_from(wire: PartyWireFormat) -> Result<Self, Self::Error> {
        Party::from_members(wire.members)
    }
}

/// Party-wide utilities, as shown next to each party row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PartyUtilities {
    pub blood_lust: bool,
    pub battle_rez: bool,
}

/// Number of members per role in a party.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoleCounts {
    pub tank: usize,
    pub heal: usize,
    pub cac: usize,
    pub dist: usize,
}

impl RoleCounts {
    pub fn get(&self, role: Role) -> usize {
        match role {
            Role::Tank => self.tank,
            Role::Heal => self.heal,
            Role::Cac => self.cac,
            Role::Dist => self.dist,
        }
    }

    fn add(&mut self, role: Role) {
        match role {
            Role::Tank => self.tank += 1,
            Role::Heal => self.heal += 1,
            Role::Cac => self.cac += 1,
            Role::Dist => self.dist += 1,
        }
    }
}

impl Party {
    pub const CAPACITY: usize = 5;

    pub fn new() -> Self {
        Self::default()
    }

    /// Build a party from an ordered member list.
    ///
    /// # Errors
    ///
    /// `ContainerFull` when more than [`Party::CAPACITY`] members are given,
    /// `Constraint` when the same id appears twice.
    pub fn from_members(members: Vec<Character>) -> Result<Self, DomainError> {
        if members.len() > Self::CAPACITY {
            return Err(DomainError::container_full(
                members.len() as u32,
                Self::CAPACITY as u32,
            ));
        }
        for (index, member) in members.iter().enumerate() {
            if members[..index].iter().any(|m| m.id() == member.id()) {
                return Err(DomainError::constraint(format!(
                    "Character {} appears twice in the same party",
                    member.id()
                )));
            }
        }
        Ok(Self { members })
    }

    #[inline]
    pub fn members(&self) -> &[Character] {
        &self.members
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.members.len() >= Self::CAPACITY
    }

    pub fn free_slots(&self) -> usize {
        Self::CAPACITY.saturating_sub(self.members.len())
    }

    pub fn position_of(&self, id: CharacterId) -> Option<usize> {
        self.members.iter().position(|m| m.id() == id)
    }

    pub fn contains(&self, id: CharacterId) -> bool {
        self.position_of(id).is_some()
    }

    pub fn member_ids(&self) -> impl Iterator<Item = CharacterId> + '_ {
        self.members.iter().map(Character::id)
    }

    /// Remove a member by id, returning its former position.
    pub fn remove(&mut self, id: CharacterId) -> Option<(usize, Character)> {
        let position = self.position_of(id)?;
        Some((position, self.members.remove(position)))
    }

    /// Insert at `index`, clamped into `[0, len]`.
    ///
    /// Returns the position the member landed at. A full party hands the
    /// character back inside the error so nothing is lost.
    pub fn insert(
        &mut self,
        index: usize,
        character: Character,
    ) -> Result<usize, (DomainError, Character)> {
        if self.is_full() {
            return Err((
                DomainError::container_full(self.len() as u32, Self::CAPACITY as u32),
                character,
            ));
        }
        let position = index.min(self.members.len());
        self.members.insert(position, character);
        Ok(position)
    }

    pub(crate) fn member_mut(&mut self, position: usize) -> Option<&mut Character> {
        self.members.get_mut(position)
    }

    pub(crate) fn swap_positions(&mut self, a: usize, b: usize) {
        self.members.swap(a, b);
    }

    pub fn utilities(&self) -> PartyUtilities {
        PartyUtilities {
            blood_lust: self.members.iter().any(Character::has_blood_lust),
            battle_rez: self.members.iter().any(Character::has_battle_rez),
        }
    }

    pub fn role_counts(&self) -> RoleCounts {
        let mut counts = RoleCounts::default();
        for member in &self.members {
            counts.add(member.role());
        }
        counts
    }

    /// Clamp every member into `bounds`. Order and size are unchanged.
    pub fn clamped(self, bounds: &LevelBounds) -> Self {
        Self {
            members: self
                .members
                .into_iter()
                .map(|member| member.clamped(bounds))
                .collect(),
        }
    }

    /// Mean item level, `None` for an empty party.
    pub fn average_item_level(&self) -> Option<u32> {
        if self.members.is_empty() {
            return None;
        }
        let total: u64 = self.members.iter().map(|m| m.item_level() as u64).sum();
        Some((total / self.members.len() as u64) as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{character, character_with};
    use crate::types::{CharacterClass, Specialization};

    fn party_of(ids: &[i64]) -> Party {
        Party::from_members(ids.iter().map(|id| character(*id)).collect()).unwrap()
    }

    #[test]
    fn test_from_members_enforces_capacity() {
        let members = (1..=6).map(character).collect();
        let err = Party::from_members(members).unwrap_err();
        assert!(err.is_container_full());
    }

    #[test]
    fn test_from_members_rejects_duplicates() {
        let err = Party::from_members(vec![character(1), character(1)]).unwrap_err();
        assert!(matches!(err, DomainError::Constraint(_)));
    }

    #[test]
    fn test_insert_clamps_index() {
        let mut party = party_of(&[1, 2]);
        let position = party.insert(99, character(3)).unwrap();
        assert_eq!(position, 2);
        assert_eq!(party.member_ids().map(|id| id.as_i64()).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_insert_into_full_party_returns_character() {
        let mut party = party_of(&[1, 2, 3, 4, 5]);
        let (err, returned) = party.insert(0, character(6)).unwrap_err();
        assert!(err.is_container_full());
        assert_eq!(returned.id().as_i64(), 6);
        assert_eq!(party.len(), 5);
    }

    #[test]
    fn test_remove_reports_position() {
        let mut party = party_of(&[1, 2, 3]);
        let (position, removed) = party.remove(CharacterId::new(2)).unwrap();
        assert_eq!(position, 1);
        assert_eq!(removed.id().as_i64(), 2);
        assert!(party.remove(CharacterId::new(2)).is_none());
    }

    #[test]
    fn test_utilities_and_role_counts() {
        let tank = character_with(1, CharacterClass::Warrior, Specialization::Protection);
        let healer = character_with(2, CharacterClass::Druid, Specialization::Restoration)
            .with_battle_rez(true);
        let mage = character_with(3, CharacterClass::Mage, Specialization::Fire).with_blood_lust(true);
        let party = Party::from_members(vec![tank, healer, mage]).unwrap();

        let utilities = party.utilities();
        assert!(utilities.blood_lust);
        assert!(utilities.battle_rez);

        let counts = party.role_counts();
        assert_eq!(counts.get(Role::Tank), 1);
        assert_eq!(counts.get(Role::Heal), 1);
        assert_eq!(counts.get(Role::Dist), 1);
        assert_eq!(counts.get(Role::Cac), 0);
        assert_eq!(party.free_slots(), 2);
    }

    #[test]
    fn test_deserialize_rejects_oversized_party() {
        let members: Vec<_> = (1..=6).map(character).collect();
        let value = serde_json::json!({ "members": members });
        assert!(serde_json::from_value::<Party>(value).is_err());
    }

    #[test]
    fn test_serializes_members_array() {
        let party = party_of(&[4]);
        let value = serde_json::to_value(&party).unwrap();
        assert_eq!(value["members"][0]["id"], 4);
    }
}
