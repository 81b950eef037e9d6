//! Value objects - immutable, validated building blocks for entities.

mod level_bounds;
mod names;

pub use level_bounds::{
    KeystoneRange, LevelBounds, DEFAULT_ITEM_LEVEL_MAX, DEFAULT_ITEM_LEVEL_MIN,
    DEFAULT_KEYSTONE_MAX_LEVEL, DEFAULT_KEYSTONE_MIN_LEVEL,
};
pub use names::{CharacterName, EventCode};
