//! Globally configured level bounds
//!
//! Item level and keystone range inputs are clamped into these bounds before a
//! character is built, so every `Character` in memory satisfies them.

use crate::error::DomainError;

pub const DEFAULT_ITEM_LEVEL_MIN: u32 = 400;
pub const DEFAULT_ITEM_LEVEL_MAX: u32 = 700;
pub const DEFAULT_KEYSTONE_MIN_LEVEL: u32 = 2;
pub const DEFAULT_KEYSTONE_MAX_LEVEL: u32 = 30;

/// Inclusive keystone level range a character is willing to run.
///
/// # Invariants
///
/// - `min <= max`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeystoneRange {
    min: u32,
    max: u32,
}

impl KeystoneRange {
    /// Build a range, rejecting `min > max`.
    pub fn new(min: u32, max: u32) -> Result<Self, DomainError> {
        if min > max {
            return Err(DomainError::validation(format!(
                "Keystone range min {} is greater than max {}",
                min, max
            )));
        }
        Ok(Self { min, max })
    }

    #[inline]
    pub fn min(&self) -> u32 {
        self.min
    }

    #[inline]
    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn contains(&self, level: u32) -> bool {
        (self.min..=self.max).contains(&level)
    }
}

/// Item level and keystone level bounds for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelBounds {
    item_level_min: u32,
    item_level_max: u32,
    keystone_min_level: u32,
    keystone_max_level: u32,
}

impl Default for LevelBounds {
    fn default() -> Self {
        Self {
            item_level_min: DEFAULT_ITEM_LEVEL_MIN,
            item_level_max: DEFAULT_ITEM_LEVEL_MAX,
            keystone_min_level: DEFAULT_KEYSTONE_MIN_LEVEL,
            keystone_max_level: DEFAULT_KEYSTONE_MAX_LEVEL,
        }
    }
}

impl LevelBounds {
    pub fn new(
        item_level_min: u32,
        item_level_max: u32,
        keystone_min_level: u32,
        keystone_max_level: u32,
    ) -> Result<Self, DomainError> {
        if item_level_min > item_level_max {
            return Err(DomainError::validation(format!(
                "ITEM_LEVEL_MIN ({}) must not exceed ITEM_LEVEL_MAX ({})",
                item_level_min, item_level_max
            )));
        }
        if keystone_min_level > keystone_max_level {
            return Err(DomainError::validation(format!(
                "KEYSTONE_MIN_LEVEL ({}) must not exceed KEYSTONE_MAX_LEVEL ({})",
                keystone_min_level, keystone_max_level
            )));
        }
        Ok(Self {
            item_level_min,
            item_level_max,
            keystone_min_level,
            keystone_max_level,
        })
    }

    pub fn item_level_min(&self) -> u32 {
        self.item_level_min
    }

    pub fn item_level_max(&self) -> u32 {
        self.item_level_max
    }

    pub fn keystone_min_level(&self) -> u32 {
        self.keystone_min_level
    }

    pub fn keystone_max_level(&self) -> u32 {
        self.keystone_max_level
    }

    pub fn clamp_item_level(&self, item_level: u32) -> u32 {
        item_level.clamp(self.item_level_min, self.item_level_max)
    }

    /// Clamp both ends into the keystone bounds.
    ///
    /// An inverted input is reordered rather than rejected, matching what a
    /// form slider would produce.
    pub fn clamp_keystone_range(&self, min: u32, max: u32) -> KeystoneRange {
        let (low, high) = if min <= max { (min, max) } else { (max, min) };
        KeystoneRange {
            min: low.clamp(self.keystone_min_level, self.keystone_max_level),
            max: high.clamp(self.keystone_min_level, self.keystone_max_level),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> LevelBounds {
        LevelBounds::new(600, 650, 2, 20).unwrap()
    }

    #[test]
    fn test_item_level_is_clamped() {
        assert_eq!(bounds().clamp_item_level(10), 600);
        assert_eq!(bounds().clamp_item_level(625), 625);
        assert_eq!(bounds().clamp_item_level(9000), 650);
    }

    #[test]
    fn test_keystone_range_is_clamped_and_ordered() {
        let range = bounds().clamp_keystone_range(25, 0);
        assert_eq!(range.min(), 2);
        assert_eq!(range.max(), 20);

        let range = bounds().clamp_keystone_range(12, 8);
        assert_eq!((range.min(), range.max()), (8, 12));
        assert!(range.contains(10));
        assert!(!range.contains(13));
    }

    #[test]
    fn test_inverted_bounds_are_rejected() {
        assert!(LevelBounds::new(700, 600, 2, 20).is_err());
        assert!(LevelBounds::new(600, 700, 20, 2).is_err());
    }

    #[test]
    fn test_keystone_range_constructor() {
        assert!(KeystoneRange::new(5, 4).is_err());
        assert_eq!(KeystoneRange::new(4, 4).unwrap().min(), 4);
    }
}
