//! Viewer access levels
//!
//! An event view is either driven by the operator (who arranges parties) or
//! followed by read-only observers.

use serde::{Deserialize, Serialize};

/// Access level of the local viewer for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    /// Can rearrange, shuffle, clear, and toggle visibility
    Operator,
    /// Can view but not mutate; party contents follow the visibility flag
    #[default]
    Observer,
}

impl Access {
    /// Check if this viewer may mutate the roster
    pub fn can_modify(&self) -> bool {
        matches!(self, Access::Operator)
    }

    /// Whether party contents are shown given the event's visibility flag
    pub fn can_see_parties(&self, parties_visible: bool) -> bool {
        self.can_modify() || parties_visible
    }
}

impl std::fmt::Display for Access {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Access::Operator => write!(f, "Operator"),
            Access::Observer => write!(f, "Observer"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_always_sees_parties() {
        assert!(Access::Operator.can_see_parties(false));
        assert!(Access::Operator.can_see_parties(true));
    }

    #[test]
    fn test_observer_follows_visibility_flag() {
        assert!(!Access::Observer.can_see_parties(false));
        assert!(Access::Observer.can_see_parties(true));
        assert!(!Access::Observer.can_modify());
    }
}
