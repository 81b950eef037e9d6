//! Event entity - the live event a roster belongs to

use serde::{Deserialize, Serialize};

use crate::value_objects::EventCode;

/// A live event.
///
/// `are_parties_visible` controls whether observers may see party contents;
/// the operator always sees them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub code: EventCode,
    #[serde(default)]
    pub are_parties_visible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Event {
    pub fn new(code: EventCode) -> Self {
        Self {
            code,
            are_parties_visible: false,
            title: None,
        }
    }

    pub fn with_parties_visible(mut self, visible: bool) -> Self {
        self.are_parties_visible = visible;
        self
    }
}
