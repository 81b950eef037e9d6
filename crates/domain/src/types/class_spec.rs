//! Class, specialization, and role vocabulary
//!
//! The class list is fixed. A specialization is only meaningful together with
//! its class (several classes share a spec name such as "Protection" or
//! "Restoration"), so the role is always derived from the pair.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Combat role of a character inside a party.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Tank,
    Heal,
    /// Melee damage ("corps à corps")
    Cac,
    /// Ranged damage
    Dist,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Tank, Role::Heal, Role::Cac, Role::Dist];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Tank => "TANK",
            Role::Heal => "HEAL",
            Role::Cac => "CAC",
            Role::Dist => "DIST",
        }
    }

    /// Melee and ranged damage dealers.
    pub fn is_damage(&self) -> bool {
        matches!(self, Role::Cac | Role::Dist)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TANK" => Ok(Role::Tank),
            "HEAL" => Ok(Role::Heal),
            "CAC" => Ok(Role::Cac),
            "DIST" => Ok(Role::Dist),
            other => Err(DomainError::parse(format!("Unknown role: {}", other))),
        }
    }
}

/// Playable class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CharacterClass {
    Warrior,
    Paladin,
    Hunter,
    Rogue,
    Priest,
    DeathKnight,
    Shaman,
    Mage,
    Warlock,
    Monk,
    Druid,
    DemonHunter,
    Evoker,
}

impl CharacterClass {
    pub const ALL: [CharacterClass; 13] = [
        CharacterClass::Warrior,
        CharacterClass::Paladin,
        CharacterClass::Hunter,
        CharacterClass::Rogue,
        CharacterClass::Priest,
        CharacterClass::DeathKnight,
        CharacterClass::Shaman,
        CharacterClass::Mage,
        CharacterClass::Warlock,
        CharacterClass::Monk,
        CharacterClass::Druid,
        CharacterClass::DemonHunter,
        CharacterClass::Evoker,
    ];

    /// Specializations available to this class, in display order.
    pub fn specializations(&self) -> &'static [Specialization] {
        use Specialization::*;
        match self {
            CharacterClass::Warrior => &[Arms, Fury, Protection],
            CharacterClass::Paladin => &[Holy, Protection, Retribution],
            CharacterClass::Hunter => &[BeastMastery, Marksmanship, Survival],
            CharacterClass::Rogue => &[Assassination, Outlaw, Subtlety],
            CharacterClass::Priest => &[Discipline, Holy, Shadow],
            CharacterClass::DeathKnight => &[Blood, Frost, Unholy],
            CharacterClass::Shaman => &[Elemental, Enhancement, Restoration],
            CharacterClass::Mage => &[Arcane, Fire, Frost],
            CharacterClass::Warlock => &[Affliction, Demonology, Destruction],
            CharacterClass::Monk => &[Brewmaster, Mistweaver, Windwalker],
            CharacterClass::Druid => &[Balance, Feral, Guardian, Restoration],
            CharacterClass::DemonHunter => &[Havoc, Vengeance],
            CharacterClass::Evoker => &[Devastation, Preservation, Augmentation],
        }
    }

    pub fn has_specialization(&self, spec: Specialization) -> bool {
        self.specializations().contains(&spec)
    }

    /// Derive the role for a class/spec pair.
    ///
    /// Returns a validation error when the spec does not belong to the class.
    pub fn role_of(&self, spec: Specialization) -> Result<Role, DomainError> {
        use Specialization::*;

        if !self.has_specialization(spec) {
            return Err(DomainError::validation(format!(
                "Specialization {} is not available to {}",
                spec, self
            )));
        }

        let role = match (self, spec) {
            (_, Protection | Blood | Brewmaster | Guardian | Vengeance) => Role::Tank,
            (_, Holy | Discipline | Restoration | Mistweaver | Preservation) => Role::Heal,
            (CharacterClass::Hunter, Survival) => Role::Cac,
            (CharacterClass::Mage, Frost) => Role::Dist,
            (
                _,
                BeastMastery | Marksmanship | Shadow | Elemental | Arcane | Fire | Affliction
                | Demonology | Destruction | Balance | Devastation | Augmentation,
            ) => Role::Dist,
            _ => Role::Cac,
        };
        Ok(role)
    }

    /// Classes that bring a party-wide haste cooldown.
    pub fn provides_blood_lust(&self) -> bool {
        matches!(
            self,
            CharacterClass::Shaman
                | CharacterClass::Mage
                | CharacterClass::Hunter
                | CharacterClass::Evoker
        )
    }

    /// Classes with an in-combat resurrection.
    pub fn provides_battle_rez(&self) -> bool {
        matches!(
            self,
            CharacterClass::DeathKnight
                | CharacterClass::Druid
                | CharacterClass::Warlock
                | CharacterClass::Paladin
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CharacterClass::Warrior => "WARRIOR",
            CharacterClass::Paladin => "PALADIN",
            CharacterClass::Hunter => "HUNTER",
            CharacterClass::Rogue => "ROGUE",
            CharacterClass::Priest => "PRIEST",
            CharacterClass::DeathKnight => "DEATH_KNIGHT",
            CharacterClass::Shaman => "SHAMAN",
            CharacterClass::Mage => "MAGE",
            CharacterClass::Warlock => "WARLOCK",
            CharacterClass::Monk => "MONK",
            CharacterClass::Druid => "DRUID",
            CharacterClass::DemonHunter => "DEMON_HUNTER",
            CharacterClass::Evoker => "EVOKER",
        }
    }
}

impl fmt::Display for CharacterClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CharacterClass {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace([' ', '-'], "_");
        CharacterClass::ALL
            .into_iter()
            .find(|class| class.as_str() == normalized)
            .ok_or_else(|| DomainError::parse(format!("Unknown class: {}", s)))
    }
}

/// Specialization name.
///
/// Names are shared between classes; use [`CharacterClass::role_of`] to get a
/// role, never the spec alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Specialization {
    Arms,
    Fury,
    Protection,
    Holy,
    Retribution,
    BeastMastery,
    Marksmanship,
    Survival,
    Assassination,
    Outlaw,
    Subtlety,
    Discipline,
    Shadow,
    Blood,
    Frost,
    Unholy,
    Elemental,
    Enhancement,
    Restoration,
    Arcane,
    Fire,
    Affliction,
    Demonology,
    Destruction,
    Brewmaster,
    Mistweaver,
    Windwalker,
    Balance,
    Feral,
    Guardian,
    Havoc,
    Vengeance,
    Devastation,
    Preservation,
    Augmentation,
}

impl Specialization {
    pub fn as_str(&self) -> &'static str {
        match self {
            Specialization::Arms => "ARMS",
            Specialization::Fury => "FURY",
            Specialization::Protection => "PROTECTION",
            Specialization::Holy => "HOLY",
            Specialization::Retribution => "RETRIBUTION",
            Specialization::BeastMastery => "BEAST_MASTERY",
            Specialization::Marksmanship => "MARKSMANSHIP",
            Specialization::Survival => "SURVIVAL",
            Specialization::Assassination => "ASSASSINATION",
            Specialization::Outlaw => "OUTLAW",
            Specialization::Subtlety => "SUBTLETY",
            Specialization::Discipline => "DISCIPLINE",
            Specialization::Shadow => "SHADOW",
            Specialization::Blood => "BLOOD",
            Specialization::Frost => "FROST",
            Specialization::Unholy => "UNHOLY",
            Specialization::Elemental => "ELEMENTAL",
            Specialization::Enhancement => "ENHANCEMENT",
            Specialization::Restoration => "RESTORATION",
            Specialization::Arcane => "ARCANE",
            Specialization::Fire => "FIRE",
            Specialization::Affliction => "AFFLICTION",
            Specialization::Demonology => "DEMONOLOGY",
            Specialization::Destruction => "DESTRUCTION",
            Specialization::Brewmaster => "BREWMASTER",
            Specialization::Mistweaver => "MISTWEAVER",
            Specialization::Windwalker => "WINDWALKER",
            Specialization::Balance => "BALANCE",
            Specialization::Feral => "FERAL",
            Specialization::Guardian => "GUARDIAN",
            Specialization::Havoc => "HAVOC",
            Specialization::Vengeance => "VENGEANCE",
            Specialization::Devastation => "DEVASTATION",
            Specialization::Preservation => "PRESERVATION",
            Specialization::Augmentation => "AUGMENTATION",
        }
    }
}

impl fmt::Display for Specialization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_spec_of_every_class_has_a_role() {
        for class in CharacterClass::ALL {
            for spec in class.specializations() {
                assert!(class.role_of(*spec).is_ok(), "{} {}", class, spec);
            }
        }
    }

    #[test]
    fn test_shared_spec_names_resolve_per_class() {
        assert_eq!(
            CharacterClass::Warrior.role_of(Specialization::Protection),
            Ok(Role::Tank)
        );
        assert_eq!(
            CharacterClass::Paladin.role_of(Specialization::Holy),
            Ok(Role::Heal)
        );
        assert_eq!(
            CharacterClass::DeathKnight.role_of(Specialization::Frost),
            Ok(Role::Cac)
        );
        assert_eq!(
            CharacterClass::Mage.role_of(Specialization::Frost),
            Ok(Role::Dist)
        );
        assert_eq!(
            CharacterClass::Hunter.role_of(Specialization::Survival),
            Ok(Role::Cac)
        );
        assert_eq!(
            CharacterClass::Druid.role_of(Specialization::Restoration),
            Ok(Role::Heal)
        );
    }

    #[test]
    fn test_foreign_spec_is_rejected() {
        let err = CharacterClass::Rogue
            .role_of(Specialization::Protection)
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn test_class_parsing_accepts_display_forms() {
        assert_eq!(
            "death knight".parse::<CharacterClass>().unwrap(),
            CharacterClass::DeathKnight
        );
        assert_eq!(
            "DEMON_HUNTER".parse::<CharacterClass>().unwrap(),
            CharacterClass::DemonHunter
        );
        assert!("bard".parse::<CharacterClass>().is_err());
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(
            serde_json::to_string(&CharacterClass::DeathKnight).unwrap(),
            "\"DEATH_KNIGHT\""
        );
        assert_eq!(
            serde_json::to_string(&Specialization::BeastMastery).unwrap(),
            "\"BEAST_MASTERY\""
        );
        assert_eq!(serde_json::to_string(&Role::Cac).unwrap(), "\"CAC\"");
    }
}
