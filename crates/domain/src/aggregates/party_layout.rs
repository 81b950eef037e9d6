//! PartyLayout aggregate - the ordered set of parties for an event
//!
//! All roster rearrangement rules live here as pure operations so the client
//! store can apply them optimistically and tests can check them without any
//! I/O.
//!
//! # Invariants
//!
//! - every party holds at most [`Party::CAPACITY`] members
//! - a character id appears in at most one party
//! - a rejected operation leaves the layout exactly as it was

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::DomainError;
use crate::types::Role;
use crate::value_objects::LevelBounds;
use crate::{Character, CharacterId, Party};

/// Why a layout operation was rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("Party {party_index} does not exist")]
    PartyNotFound { party_index: usize },

    #[error("Member {member_id} not found in party {party_index}")]
    MemberNotFound {
        party_index: usize,
        member_id: CharacterId,
    },

    #[error(
        "Members not found: {source_id} in party {source_party} / {target_id} in party {target_party}"
    )]
    MembersNotFound {
        source_party: usize,
        source_id: CharacterId,
        target_party: usize,
        target_id: CharacterId,
    },

    #[error("Party {party_index} is full")]
    TargetFull { party_index: usize },

    #[error("Character {member_id} is already assigned to party {party_index}")]
    AlreadyAssigned {
        member_id: CharacterId,
        party_index: usize,
    },
}

impl From<LayoutError> for DomainError {
    fn from(err: LayoutError) -> Self {
        match err {
            LayoutError::PartyNotFound { party_index } => {
                DomainError::not_found("party", party_index.to_string())
            }
            LayoutError::MemberNotFound { member_id, .. } => {
                DomainError::not_found("party member", member_id.to_string())
            }
            LayoutError::MembersNotFound {
                source_id,
                target_id,
                ..
            } => DomainError::not_found("party members", format!("{}, {}", source_id, target_id)),
            LayoutError::TargetFull { .. } => DomainError::container_full(
                Party::CAPACITY as u32,
                Party::CAPACITY as u32,
            ),
            LayoutError::AlreadyAssigned { .. } => DomainError::constraint(err.to_string()),
        }
    }
}

/// Where a moved member ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub party_index: usize,
    pub position: usize,
}

/// The ordered parties of an event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Party>", into = "Vec<Party>")]
pub struct PartyLayout {
    parties: Vec<Party>,
}

impl TryFrom<Vec<Party>> for PartyLayout {
    type Error = DomainError;

    fn try_from(parties: Vec<Party>) -> Result<Self, Self::Error> {
        PartyLayout::new(parties)
    }
}

impl From<PartyLayout> for Vec<Party> {
    fn from(layout: PartyLayout) -> Self {
        layout.parties
    }
}

impl PartyLayout {
    /// Build a layout, rejecting a character assigned to two parties.
    pub fn new(parties: Vec<Party>) -> Result<Self, DomainError> {
        let mut seen = HashSet::new();
        for party in &parties {
            for id in party.member_ids() {
                if !seen.insert(id) {
                    return Err(DomainError::constraint(format!(
                        "Character {} is assigned to more than one party",
                        id
                    )));
                }
            }
        }
        Ok(Self { parties })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    // =========================================================================
    // Queries
    // =========================================================================

    #[inline]
    pub fn parties(&self) -> &[Party] {
        &self.parties
    }

    pub fn party(&self, index: usize) -> Option<&Party> {
        self.parties.get(index)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.parties.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.parties.is_empty()
    }

    pub fn total_members(&self) -> usize {
        self.parties.iter().map(Party::len).sum()
    }

    /// Party index and position of a character, if assigned.
    pub fn locate(&self, id: CharacterId) -> Option<Placement> {
        self.parties
            .iter()
            .enumerate()
            .find_map(|(party_index, party)| {
                party.position_of(id).map(|position| Placement {
                    party_index,
                    position,
                })
            })
    }

    pub fn contains(&self, id: CharacterId) -> bool {
        self.locate(id).is_some()
    }

    pub fn find(&self, id: CharacterId) -> Option<&Character> {
        self.locate(id)
            .map(|placement| &self.parties[placement.party_index].members()[placement.position])
    }

    /// Characters of the roster that are in no party, in roster order.
    pub fn pending<'a>(&self, roster: &'a [Character]) -> Vec<&'a Character> {
        let assigned: HashSet<CharacterId> = self
            .parties
            .iter()
            .flat_map(|party| party.member_ids())
            .collect();
        roster
            .iter()
            .filter(|character| !assigned.contains(&character.id()))
            .collect()
    }

    /// Verify capacity and uniqueness. Used by tests and debug assertions.
    pub fn check_invariants(&self) -> Result<(), DomainError> {
        let mut seen = HashSet::new();
        for party in &self.parties {
            if party.len() > Party::CAPACITY {
                return Err(DomainError::container_full(
                    party.len() as u32,
                    Party::CAPACITY as u32,
                ));
            }
            for id in party.member_ids() {
                if !seen.insert(id) {
                    return Err(DomainError::constraint(format!(
                        "Character {} is assigned to more than one party",
                        id
                    )));
                }
            }
        }
        Ok(())
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Move a member from one party to another (or within the same party).
    ///
    /// `to_party == len()` opens a new party at the end. `to_index` is clamped
    /// into the target's bounds. A full target rejects the move and the member
    /// stays at its original position.
    pub fn move_character(
        &mut self,
        from_party: usize,
        to_party: usize,
        member_id: CharacterId,
        to_index: usize,
    ) -> Result<Placement, LayoutError> {
        self.ensure_party(from_party)?;
        self.ensure_target(to_party)?;

        let (original_position, member) =
            self.parties[from_party]
                .remove(member_id)
                .ok_or(LayoutError::MemberNotFound {
                    party_index: from_party,
                    member_id,
                })?;

        if to_party == self.parties.len() {
            self.parties.push(Party::new());
        }

        match self.parties[to_party].insert(to_index, member) {
            Ok(position) => Ok(Placement {
                party_index: to_party,
                position,
            }),
            Err((_, member)) => {
                // Source just lost a member so it has room to take it back.
                let _ = self.parties[from_party].insert(original_position, member);
                Err(LayoutError::TargetFull {
                    party_index: to_party,
                })
            }
        }
    }

    /// Exchange two members' positions. Party sizes never change.
    pub fn swap_characters(
        &mut self,
        from_party: usize,
        to_party: usize,
        source_id: CharacterId,
        target_id: CharacterId,
    ) -> Result<(), LayoutError> {
        self.ensure_party(from_party)?;
        self.ensure_party(to_party)?;

        let source = self.parties[from_party].position_of(source_id);
        let target = self.parties[to_party].position_of(target_id);
        let (Some(source), Some(target)) = (source, target) else {
            return Err(LayoutError::MembersNotFound {
                source_party: from_party,
                source_id,
                target_party: to_party,
                target_id,
            });
        };

        if from_party == to_party {
            self.parties[from_party].swap_positions(source, target);
            return Ok(());
        }

        let (low, high, low_pos, high_pos) = if from_party < to_party {
            (from_party, to_party, source, target)
        } else {
            (to_party, from_party, target, source)
        };
        let (head, tail) = self.parties.split_at_mut(high);
        if let (Some(a), Some(b)) = (
            head[low].member_mut(low_pos),
            tail[0].member_mut(high_pos),
        ) {
            std::mem::swap(a, b);
        }
        Ok(())
    }

    /// Place a pending character into a party, without removing it from any.
    pub fn assign(
        &mut self,
        character: Character,
        to_party: usize,
        to_index: usize,
    ) -> Result<Placement, LayoutError> {
        self.ensure_target(to_party)?;
        if let Some(existing) = self.locate(character.id()) {
            return Err(LayoutError::AlreadyAssigned {
                member_id: character.id(),
                party_index: existing.party_index,
            });
        }
        if self
            .parties
            .get(to_party)
            .is_some_and(|party| party.is_full())
        {
            return Err(LayoutError::TargetFull {
                party_index: to_party,
            });
        }

        if to_party == self.parties.len() {
            self.parties.push(Party::new());
        }
        let position = self.parties[to_party]
            .insert(to_index, character)
            .map_err(|_| LayoutError::TargetFull {
                party_index: to_party,
            })?;
        Ok(Placement {
            party_index: to_party,
            position,
        })
    }

    /// Remove a member from its party; it becomes pending.
    pub fn unassign(
        &mut self,
        from_party: usize,
        member_id: CharacterId,
    ) -> Result<Character, LayoutError> {
        self.ensure_party(from_party)?;
        self.parties[from_party]
            .remove(member_id)
            .map(|(_, member)| member)
            .ok_or(LayoutError::MemberNotFound {
                party_index: from_party,
                member_id,
            })
    }

    pub fn clear(&mut self) {
        self.parties.clear();
    }

    /// Clamp every assigned character into `bounds`.
    pub fn clamped(self, bounds: &LevelBounds) -> Self {
        Self {
            parties: self
                .parties
                .into_iter()
                .map(|party| party.clamped(bounds))
                .collect(),
        }
    }

    fn ensure_party(&self, index: usize) -> Result<(), LayoutError> {
        if index < self.parties.len() {
            Ok(())
        } else {
            Err(LayoutError::PartyNotFound { party_index: index })
        }
    }

    fn ensure_target(&self, index: usize) -> Result<(), LayoutError> {
        if index <= self.parties.len() {
            Ok(())
        } else {
            Err(LayoutError::PartyNotFound { party_index: index })
        }
    }
}

/// Group characters by role, keeping roster order inside each group.
pub fn by_role(characters: &[Character]) -> BTreeMap<Role, Vec<&Character>> {
    let mut groups: BTreeMap<Role, Vec<&Character>> = BTreeMap::new();
    for character in characters {
        groups.entry(character.role()).or_default().push(character);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{character, character_with, ids, party};
    use crate::types::{CharacterClass, Specialization};

    fn layout(parties: &[&[i64]]) -> PartyLayout {
        PartyLayout::new(parties.iter().map(|p| party(p)).collect()).unwrap()
    }

    fn id(value: i64) -> CharacterId {
        CharacterId::new(value)
    }

    mod move_character {
        use super::*;

        #[test]
        fn into_full_party_is_rejected_without_change() {
            let mut layout = layout(&[&[1, 2], &[3, 4, 5, 6, 7]]);
            let before = layout.clone();

            let err = layout.move_character(0, 1, id(1), 5).unwrap_err();

            assert_eq!(err, LayoutError::TargetFull { party_index: 1 });
            assert_eq!(layout, before);
            assert_eq!(ids(&layout.parties()[0]), vec![1, 2]);
        }

        #[test]
        fn to_front_of_other_party() {
            let mut layout = layout(&[&[1, 2], &[3, 4]]);

            let placement = layout.move_character(0, 1, id(1), 0).unwrap();

            assert_eq!(placement, Placement { party_index: 1, position: 0 });
            assert_eq!(ids(&layout.parties()[0]), vec![2]);
            assert_eq!(ids(&layout.parties()[1]), vec![1, 3, 4]);
        }

        #[test]
        fn conserves_total_member_count() {
            let mut layout = layout(&[&[1, 2, 3], &[4]]);
            let total = layout.total_members();

            layout.move_character(0, 1, id(2), 1).unwrap();
            assert_eq!(layout.total_members(), total);
            assert_eq!(layout.parties()[0].len(), 2);
            assert_eq!(layout.parties()[1].len(), 2);
            layout.check_invariants().unwrap();
        }

        #[test]
        fn missing_member_reports_not_found() {
            let mut layout = layout(&[&[1], &[2]]);
            let err = layout.move_character(0, 1, id(9), 0).unwrap_err();
            assert_eq!(
                err,
                LayoutError::MemberNotFound {
                    party_index: 0,
                    member_id: id(9)
                }
            );
            assert_eq!(layout.total_members(), 2);
        }

        #[test]
        fn index_is_clamped() {
            let mut layout = layout(&[&[1], &[2, 3]]);
            let placement = layout.move_character(0, 1, id(1), 42).unwrap();
            assert_eq!(placement.position, 2);
        }

        #[test]
        fn reorder_within_full_party() {
            let mut layout = layout(&[&[1, 2, 3, 4, 5]]);
            layout.move_character(0, 0, id(5), 0).unwrap();
            assert_eq!(ids(&layout.parties()[0]), vec![5, 1, 2, 3, 4]);
        }

        #[test]
        fn past_last_party_opens_a_new_one() {
            let mut layout = layout(&[&[1, 2]]);
            layout.move_character(0, 1, id(2), 0).unwrap();
            assert_eq!(layout.len(), 2);
            assert_eq!(ids(&layout.parties()[1]), vec![2]);
        }

        #[test]
        fn unknown_party_is_rejected() {
            let mut layout = layout(&[&[1]]);
            assert_eq!(
                layout.move_character(0, 5, id(1), 0).unwrap_err(),
                LayoutError::PartyNotFound { party_index: 5 }
            );
            assert_eq!(
                layout.move_character(3, 0, id(1), 0).unwrap_err(),
                LayoutError::PartyNotFound { party_index: 3 }
            );
        }
    }

    mod swap_characters {
        use super::*;

        #[test]
        fn across_parties() {
            let mut layout = layout(&[&[1, 2], &[3, 4]]);
            layout.swap_characters(0, 1, id(1), id(3)).unwrap();
            assert_eq!(ids(&layout.parties()[0]), vec![3, 2]);
            assert_eq!(ids(&layout.parties()[1]), vec![1, 4]);
        }

        #[test]
        fn backwards_across_parties() {
            let mut layout = layout(&[&[1, 2], &[3, 4]]);
            layout.swap_characters(1, 0, id(4), id(2)).unwrap();
            assert_eq!(ids(&layout.parties()[0]), vec![1, 4]);
            assert_eq!(ids(&layout.parties()[1]), vec![3, 2]);
        }

        #[test]
        fn within_party() {
            let mut layout = layout(&[&[1, 2, 3]]);
            layout.swap_characters(0, 0, id(1), id(3)).unwrap();
            assert_eq!(ids(&layout.parties()[0]), vec![3, 2, 1]);
        }

        #[test]
        fn never_changes_sizes() {
            let mut layout = layout(&[&[1, 2, 3, 4, 5], &[6]]);
            layout.swap_characters(0, 1, id(5), id(6)).unwrap();
            assert_eq!(layout.parties()[0].len(), 5);
            assert_eq!(layout.parties()[1].len(), 1);
            layout.check_invariants().unwrap();
        }

        #[test]
        fn missing_member_aborts_without_mutation() {
            let mut layout = layout(&[&[1, 2], &[3, 4]]);
            let before = layout.clone();
            let err = layout.swap_characters(0, 1, id(1), id(2)).unwrap_err();
            assert!(matches!(err, LayoutError::MembersNotFound { .. }));
            assert_eq!(layout, before);
        }
    }

    mod pending {
        use super::*;

        #[test]
        fn derived_from_roster_minus_assigned() {
            let roster = vec![character(1), character(2), character(3)];
            let mut layout = PartyLayout::empty();

            let pending: Vec<i64> = layout
                .pending(&roster)
                .iter()
                .map(|c| c.id().as_i64())
                .collect();
            assert_eq!(pending, vec![1, 2, 3]);

            layout.assign(roster[0].clone(), 0, 0).unwrap();

            let pending: Vec<i64> = layout
                .pending(&roster)
                .iter()
                .map(|c| c.id().as_i64())
                .collect();
            assert_eq!(pending, vec![2, 3]);
            assert_eq!(layout.len(), 1);
        }

        #[test]
        fn unassign_returns_member_to_pending() {
            let roster = vec![character(1), character(2)];
            let mut layout = layout(&[&[1, 2]]);
            let removed = layout.unassign(0, id(2)).unwrap();
            assert_eq!(removed.id(), id(2));
            assert_eq!(layout.pending(&roster).len(), 1);
        }
    }

    mod assign {
        use super::*;

        #[test]
        fn rejects_already_assigned_character() {
            let mut layout = layout(&[&[1], &[2]]);
            let err = layout.assign(character(1), 1, 0).unwrap_err();
            assert_eq!(
                err,
                LayoutError::AlreadyAssigned {
                    member_id: id(1),
                    party_index: 0
                }
            );
        }

        #[test]
        fn rejects_full_target() {
            let mut layout = layout(&[&[1, 2, 3, 4, 5]]);
            let err = layout.assign(character(6), 0, 0).unwrap_err();
            assert_eq!(err, LayoutError::TargetFull { party_index: 0 });
            assert_eq!(layout.total_members(), 5);
        }

        #[test]
        fn inserts_at_dropped_position() {
            let mut layout = layout(&[&[1, 2]]);
            layout.assign(character(3), 0, 1).unwrap();
            assert_eq!(ids(&layout.parties()[0]), vec![1, 3, 2]);
        }
    }

    #[test]
    fn test_new_rejects_duplicate_assignment() {
        let result = PartyLayout::new(vec![party(&[1]), party(&[1])]);
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_from_party_array() {
        let json = serde_json::to_value(vec![party(&[1, 2]), party(&[3])]).unwrap();
        let layout: PartyLayout = serde_json::from_value(json).unwrap();
        assert_eq!(layout.len(), 2);
        assert_eq!(layout.total_members(), 3);
        assert_eq!(layout.find(id(3)).map(|c| c.id()), Some(id(3)));
    }

    #[test]
    fn test_clamped_keeps_placement() {
        let high = character(2).with_item_level(690, &LevelBounds::default());
        let layout = PartyLayout::new(vec![
            party(&[1]),
            Party::from_members(vec![character(3), high]).unwrap(),
        ])
        .unwrap();

        let clamped = layout.clamped(&LevelBounds::new(400, 600, 2, 30).unwrap());

        assert_eq!(ids(&clamped.parties()[1]), vec![3, 2]);
        assert_eq!(clamped.find(id(2)).map(|c| c.item_level()), Some(600));
    }

    #[test]
    fn test_by_role_groups() {
        let roster = vec![
            character_with(1, CharacterClass::Paladin, Specialization::Protection),
            character_with(2, CharacterClass::Priest, Specialization::Holy),
            character(3),
            character(4),
        ];
        let groups = by_role(&roster);
        assert_eq!(groups[&Role::Tank].len(), 1);
        assert_eq!(groups[&Role::Heal].len(), 1);
        assert_eq!(groups[&Role::Cac].len(), 2);
        assert!(!groups.contains_key(&Role::Dist));
    }
}
