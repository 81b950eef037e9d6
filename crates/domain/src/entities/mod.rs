//! Domain entities - Core business objects with identity

mod character;
mod event;
mod party;

pub use character::{Character, CharacterDraft};
pub use event::Event;
pub use party::{Party, PartyUtilities, RoleCounts};
