//! Keyparty domain - roster model for a live keystone event.
//!
//! Characters, fixed-capacity parties and the party layout aggregate that
//! keeps every character in at most one party. No I/O lives here.

pub mod types;

pub mod aggregates;
pub mod entities;
pub mod error;
pub mod ids;
pub mod value_objects;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use aggregates::{by_role, LayoutError, PartyLayout, Placement};
pub use entities::{Character, CharacterDraft, Event, Party, PartyUtilities, RoleCounts};
pub use error::DomainError;
pub use ids::CharacterId;
pub use types::{Access, CharacterClass, Role, Specialization};
pub use value_objects::{
    CharacterName, EventCode, KeystoneRange, LevelBounds, DEFAULT_ITEM_LEVEL_MAX,
    DEFAULT_ITEM_LEVEL_MIN, DEFAULT_KEYSTONE_MAX_LEVEL, DEFAULT_KEYSTONE_MIN_LEVEL,
};
