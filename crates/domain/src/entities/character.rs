//! Character entity - a registered participant of an event
//!
//! # Invariants
//!
//! - `spec` always belongs to `class`, and `role` is derived from the pair
//! - `keystone.min() <= keystone.max()` (enforced by `KeystoneRange`)
//! - item level and keystone range lie within the configured `LevelBounds`
//!   once the character has gone through [`Character::clamped`] or one of
//!   the bounded builder methods

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::DomainError;
use crate::types::{CharacterClass, Role, Specialization};
use crate::value_objects::{
    CharacterName, KeystoneRange, LevelBounds, DEFAULT_ITEM_LEVEL_MIN, DEFAULT_KEYSTONE_MAX_LEVEL,
    DEFAULT_KEYSTONE_MIN_LEVEL,
};
use crate::CharacterId;

/// A registered character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Character {
    id: CharacterId,
    name: CharacterName,
    class: CharacterClass,
    spec: Specialization,
    role: Role,
    blood_lust: bool,
    battle_rez: bool,
    item_level: u32,
    keystone: KeystoneRange,
}

impl Character {
    // =========================================================================
    // Constructor
    // =========================================================================

    /// Create a character with default utility flags and level ranges.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `spec` is not one of `class`'s
    /// specializations.
    pub fn new(
        id: CharacterId,
        name: CharacterName,
        class: CharacterClass,
        spec: Specialization,
    ) -> Result<Self, DomainError> {
        let role = class.role_of(spec)?;
        Ok(Self {
            id,
            name,
            class,
            spec,
            role,
            blood_lust: false,
            battle_rez: false,
            item_level: DEFAULT_ITEM_LEVEL_MIN,
            keystone: KeystoneRange::new(DEFAULT_KEYSTONE_MIN_LEVEL, DEFAULT_KEYSTONE_MAX_LEVEL)?,
        })
    }

    // =========================================================================
    // Builder methods
    // =========================================================================

    pub fn with_blood_lust(mut self, blood_lust: bool) -> Self {
        self.blood_lust = blood_lust;
        self
    }

    pub fn with_battle_rez(mut self, battle_rez: bool) -> Self {
        self.battle_rez = battle_rez;
        self
    }

    pub fn with_item_level(mut self, item_level: u32, bounds: &LevelBounds) -> Self {
        self.item_level = bounds.clamp_item_level(item_level);
        self
    }

    pub fn with_keystone_range(mut self, min: u32, max: u32, bounds: &LevelBounds) -> Self {
        self.keystone = bounds.clamp_keystone_range(min, max);
        self
    }

    /// Re-apply the configured bounds to values read from the backend.
    pub fn clamped(mut self, bounds: &LevelBounds) -> Self {
        self.item_level = bounds.clamp_item_level(self.item_level);
        self.keystone = bounds.clamp_keystone_range(self.keystone.min(), self.keystone.max());
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn id(&self) -> CharacterId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &CharacterName {
        &self.name
    }

    #[inline]
    pub fn class(&self) -> CharacterClass {
        self.class
    }

    #[inline]
    pub fn spec(&self) -> Specialization {
        self.spec
    }

    #[inline]
    pub fn role(&self) -> Role {
        self.role
    }

    #[inline]
    pub fn has_blood_lust(&self) -> bool {
        self.blood_lust
    }

    #[inline]
    pub fn has_battle_rez(&self) -> bool {
        self.battle_rez
    }

    #[inline]
    pub fn item_level(&self) -> u32 {
        self.item_level
    }

    #[inline]
    pub fn keystone(&self) -> KeystoneRange {
        self.keystone
    }
}

// =============================================================================
// Registration draft
// =============================================================================

/// A character as submitted for registration or edition.
///
/// The id is absent until the backend assigns one; the upsert endpoint
/// returns the stored `Character`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterDraft {
    id: Option<CharacterId>,
    name: CharacterName,
    class: CharacterClass,
    spec: Specialization,
    role: Role,
    blood_lust: bool,
    battle_rez: bool,
    item_level: u32,
    keystone: KeystoneRange,
}

impl CharacterDraft {
    /// Build a draft, clamping levels into `bounds`.
    pub fn new(
        name: CharacterName,
        class: CharacterClass,
        spec: Specialization,
        item_level: u32,
        keystone_min_level: u32,
        keystone_max_level: u32,
        bounds: &LevelBounds,
    ) -> Result<Self, DomainError> {
        let role = class.role_of(spec)?;
        Ok(Self {
            id: None,
            name,
            class,
            spec,
            role,
            blood_lust: false,
            battle_rez: false,
            item_level: bounds.clamp_item_level(item_level),
            keystone: bounds.clamp_keystone_range(keystone_min_level, keystone_max_level),
        })
    }

    /// Draft for editing an existing character.
    pub fn from_character(character: &Character) -> Self {
        Self {
            id: Some(character.id),
            name: character.name.clone(),
            class: character.class,
            spec: character.spec,
            role: character.role,
            blood_lust: character.blood_lust,
            battle_rez: character.battle_rez,
            item_level: character.item_level,
            keystone: character.keystone,
        }
    }

    pub fn with_blood_lust(mut self, blood_lust: bool) -> Self {
        self.blood_lust = blood_lust;
        self
    }

    pub fn with_battle_rez(mut self, battle_rez: bool) -> Self {
        self.battle_rez = battle_rez;
        self
    }

    /// Re-apply `bounds`; a draft built against other bounds is pulled in.
    pub fn clamped(mut self, bounds: &LevelBounds) -> Self {
        self.item_level = bounds.clamp_item_level(self.item_level);
        self.keystone = bounds.clamp_keystone_range(self.keystone.min(), self.keystone.max());
        self
    }

    pub fn id(&self) -> Option<CharacterId> {
        self.id
    }

    pub fn name(&self) -> &CharacterName {
        &self.name
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn item_level(&self) -> u32 {
        self.item_level
    }

    pub fn keystone(&self) -> KeystoneRange {
        self.keystone
    }
}

// =============================================================================
// Serde: one wire shape for both the stored character and the draft
// =============================================================================

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CharacterWireFormat {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<CharacterId>,
    name: CharacterName,
    class: CharacterClass,
    spec: Specialization,
    /// Always re-derived on read; the backend copy is informational
    #[serde(default, skip_deserializing)]
    role: Option<Role>,
    #[serde(default)]
    blood_lust: bool,
    #[serde(default)]
    battle_rez: bool,
    #[serde(default = "default_item_level")]
    i_level: u32,
    #[serde(default = "default_keystone_min")]
    keystone_min_level: u32,
    #[serde(default = "default_keystone_max")]
    keystone_max_level: u32,
}

fn default_item_level() -> u32 {
    DEFAULT_ITEM_LEVEL_MIN
}

fn default_keystone_min() -> u32 {
    DEFAULT_KEYSTONE_MIN_LEVEL
}

fn default_keystone_max() -> u32 {
    DEFAULT_KEYSTONE_MAX_LEVEL
}

impl CharacterWireFormat {
    fn into_parts(self) -> Result<(Role, KeystoneRange, Self), DomainError> {
        let role = self.class.role_of(self.spec)?;
        let (low, high) = if self.keystone_min_level <= self.keystone_max_level {
            (self.keystone_min_level, self.keystone_max_level)
        } else {
            (self.keystone_max_level, self.keystone_min_level)
        };
        let keystone = KeystoneRange::new(low, high)?;
        Ok((role, keystone, self))
    }
}

impl Serialize for Character {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        CharacterWireFormat {
            id: Some(self.id),
            name: self.name.clone(),
            class: self.class,
            spec: self.spec,
            role: Some(self.role),
            blood_lust: self.blood_lust,
            battle_rez: self.battle_rez,
            i_level: self.item_level,
            keystone_min_level: self.keystone.min(),
            keystone_max_level: self.keystone.max(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Character {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let wire = CharacterWireFormat::deserialize(deserializer)?;
        let id = wire
            .id
            .ok_or_else(|| serde::de::Error::missing_field("id"))?;
        let (role, keystone, wire) = wire.into_parts().map_err(serde::de::Error::custom)?;

        Ok(Self {
            id,
            name: wire.name,
            class: wire.class,
            spec: wire.spec,
            role,
            blood_lust: wire.blood_lust,
            battle_rez: wire.battle_rez,
            item_level: wire.i_level,
            keystone,
        })
    }
}

impl Serialize for CharacterDraft {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        CharacterWireFormat {
            id: self.id,
            name: self.name.clone(),
            class: self.class,
            spec: self.spec,
            role: Some(self.role),
            blood_lust: self.blood_lust,
            battle_rez: self.battle_rez,
            i_level: self.item_level,
            keystone_min_level: self.keystone.min(),
            keystone_max_level: self.keystone.max(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CharacterDraft {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let wire = CharacterWireFormat::deserialize(deserializer)?;
        let (role, keystone, wire) = wire.into_parts().map_err(serde::de::Error::custom)?;

        Ok(Self {
            id: wire.id,
            name: wire.name,
            class: wire.class,
            spec: wire.spec,
            role,
            blood_lust: wire.blood_lust,
            battle_rez: wire.battle_rez,
            item_level: wire.i_level,
            keystone,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn name(value: &str) -> CharacterName {
        CharacterName::new(value).unwrap()
    }

    mod constructor {
        use super::*;

        #[test]
        fn role_is_derived_from_class_and_spec() {
            let character = Character::new(
                CharacterId::new(1),
                name("Anduin"),
                CharacterClass::Priest,
                Specialization::Discipline,
            )
            .unwrap();

            assert_eq!(character.role(), Role::Heal);
            assert!(!character.has_blood_lust());
            assert!(!character.has_battle_rez());
        }

        #[test]
        fn foreign_spec_is_rejected() {
            let result = Character::new(
                CharacterId::new(1),
                name("Varian"),
                CharacterClass::Warrior,
                Specialization::Holy,
            );
            assert!(matches!(result, Err(DomainError::Validation(_))));
        }

        #[test]
        fn bounded_builders_clamp() {
            let bounds = LevelBounds::new(600, 650, 2, 15).unwrap();
            let character = Character::new(
                CharacterId::new(3),
                name("Jaina"),
                CharacterClass::Mage,
                Specialization::Frost,
            )
            .unwrap()
            .with_item_level(900, &bounds)
            .with_keystone_range(0, 40, &bounds);

            assert_eq!(character.item_level(), 650);
            assert_eq!(character.keystone().min(), 2);
            assert_eq!(character.keystone().max(), 15);
        }

        #[test]
        fn clamped_pulls_stored_levels_into_narrower_bounds() {
            let character = Character::new(
                CharacterId::new(4),
                name("Tyrande"),
                CharacterClass::Druid,
                Specialization::Balance,
            )
            .unwrap()
            .with_item_level(690, &LevelBounds::default())
            .with_keystone_range(12, 25, &LevelBounds::default());

            let narrow = LevelBounds::new(400, 600, 2, 10).unwrap();
            let clamped = character.clamped(&narrow);

            assert_eq!(clamped.item_level(), 600);
            assert_eq!(clamped.keystone().min(), 10);
            assert_eq!(clamped.keystone().max(), 10);
            assert_eq!(clamped.id(), CharacterId::new(4));
        }

        #[test]
        fn draft_clamped_against_other_bounds() {
            let draft = CharacterDraft::new(
                name("Malfurion"),
                CharacterClass::Druid,
                Specialization::Restoration,
                680,
                4,
                20,
                &LevelBounds::default(),
            )
            .unwrap()
            .clamped(&LevelBounds::new(500, 650, 5, 15).unwrap());

            assert_eq!(draft.item_level(), 650);
            assert_eq!(draft.keystone().min(), 5);
            assert_eq!(draft.keystone().max(), 15);
        }
    }

    mod serde_format {
        use super::*;

        #[test]
        fn deserializes_backend_shape_and_rederives_role() {
            let value = json!({
                "id": 12,
                "name": "Sylvanas",
                "class": "HUNTER",
                "spec": "MARKSMANSHIP",
                "role": "TANK",
                "bloodLust": true,
                "battleRez": false,
                "iLevel": 640,
                "keystoneMinLevel": 10,
                "keystoneMaxLevel": 14
            });

            let character: Character = serde_json::from_value(value).unwrap();
            assert_eq!(character.id(), CharacterId::new(12));
            assert_eq!(character.role(), Role::Dist);
            assert!(character.has_blood_lust());
            assert_eq!(character.item_level(), 640);
            assert_eq!(character.keystone().max(), 14);
        }

        #[test]
        fn serializes_camel_case_with_role() {
            let character = Character::new(
                CharacterId::new(5),
                name("Illidan"),
                CharacterClass::DemonHunter,
                Specialization::Vengeance,
            )
            .unwrap()
            .with_battle_rez(false);

            let value = serde_json::to_value(&character).unwrap();
            assert_eq!(value["id"], 5);
            assert_eq!(value["class"], "DEMON_HUNTER");
            assert_eq!(value["role"], "TANK");
            assert_eq!(value["iLevel"], DEFAULT_ITEM_LEVEL_MIN);
            assert!(value.get("keystoneMinLevel").is_some());
        }

        #[test]
        fn rejects_spec_outside_class() {
            let value = json!({
                "id": 1,
                "name": "Broken",
                "class": "ROGUE",
                "spec": "HOLY"
            });
            assert!(serde_json::from_value::<Character>(value).is_err());
        }

        #[test]
        fn character_requires_id_but_draft_does_not() {
            let value = json!({
                "name": "Newcomer",
                "class": "MONK",
                "spec": "MISTWEAVER"
            });
            assert!(serde_json::from_value::<Character>(value.clone()).is_err());

            let draft: CharacterDraft = serde_json::from_value(value).unwrap();
            assert_eq!(draft.id(), None);
            assert_eq!(draft.role(), Role::Heal);
        }

        #[test]
        fn inverted_keystone_range_is_reordered() {
            let value = json!({
                "id": 2,
                "name": "Chen",
                "class": "MONK",
                "spec": "BREWMASTER",
                "keystoneMinLevel": 12,
                "keystoneMaxLevel": 7
            });
            let character: Character = serde_json::from_value(value).unwrap();
            assert_eq!(character.keystone().min(), 7);
            assert_eq!(character.keystone().max(), 12);
        }

        #[test]
        fn draft_omits_missing_id() {
            let bounds = LevelBounds::default();
            let draft = CharacterDraft::new(
                name("Thrall"),
                CharacterClass::Shaman,
                Specialization::Enhancement,
                620,
                5,
                10,
                &bounds,
            )
            .unwrap()
            .with_blood_lust(true);

            let value = serde_json::to_value(&draft).unwrap();
            assert!(value.get("id").is_none());
            assert_eq!(value["bloodLust"], true);
            assert_eq!(value["role"], "CAC");
        }
    }
}
