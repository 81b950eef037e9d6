//! Drag-Drop Coordinator - turns a completed drag into a roster mutation
//!
//! One drag is tracked at a time. Operator rights are checked when the drag
//! starts and again when it is dropped.

use keyparty_domain::{Character, CharacterId};
use thiserror::Error;

use super::roster_store::{PendingWrite, RosterError, RosterStore};

/// What is being dragged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragPayload {
    /// A member of a party, addressed by party and id
    Party {
        party_index: usize,
        member_id: CharacterId,
    },
    /// A pending character; it has no party position, so it travels whole
    Pending { character: Character },
}

/// Where a drag was released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    /// An occupied row of a party
    Member {
        party_index: usize,
        position: usize,
        member_id: CharacterId,
    },
    /// The free space of a party (append)
    EmptySlot { party_index: usize },
    /// The pending list
    PendingList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    Swapped,
    Moved,
    Assigned,
    Unassigned,
    NoOp,
}

/// Outcome of a drop plus the write it started, if any.
#[derive(Debug)]
pub struct DropResult {
    pub outcome: DropOutcome,
    pub write: PendingWrite,
}

impl DropResult {
    fn no_op(revision: u64) -> Self {
        Self {
            outcome: DropOutcome::NoOp,
            write: PendingWrite::completed(revision),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DragError {
    #[error("Only the operator can drag characters")]
    NotOperator,

    #[error("No drag in progress")]
    NoActiveDrag,

    #[error(transparent)]
    Roster(#[from] RosterError),
}

pub struct DragDropCoordinator {
    store: RosterStore,
    active: Option<DragPayload>,
}

impl DragDropCoordinator {
    pub fn new(store: RosterStore) -> Self {
        Self {
            store,
            active: None,
        }
    }

    pub fn active(&self) -> Option<&DragPayload> {
        self.active.as_ref()
    }

    /// Start dragging. Replaces any drag already in progress.
    pub fn begin_drag(&mut self, payload: DragPayload) -> Result<(), DragError> {
        self.ensure_operator()?;
        tracing::debug!(?payload, "Drag started");
        self.active = Some(payload);
        Ok(())
    }

    pub fn cancel_drag(&mut self) {
        if self.active.take().is_some() {
            tracing::debug!("Drag cancelled");
        }
    }

    /// Complete the active drag on `target`.
    ///
    /// The drag ends whatever the result.
    pub fn drop_on(&mut self, target: DropTarget) -> Result<DropResult, DragError> {
        let payload = self.active.take().ok_or(DragError::NoActiveDrag)?;
        self.ensure_operator()?;

        let revision = self.store.snapshot().revision;
        let result = match (payload, target) {
            (
                DragPayload::Party {
                    party_index,
                    member_id,
                },
                DropTarget::Member {
                    party_index: to_party,
                    member_id: target_id,
                    ..
                },
            ) => {
                if party_index == to_party && member_id == target_id {
                    DropResult::no_op(revision)
                } else {
                    let write =
                        self.store
                            .swap_characters(party_index, to_party, member_id, target_id)?;
                    DropResult {
                        outcome: DropOutcome::Swapped,
                        write,
                    }
                }
            }
            (
                DragPayload::Party {
                    party_index,
                    member_id,
                },
                DropTarget::EmptySlot {
                    party_index: to_party,
                },
            ) => {
                let to_index = self.store.party_len(to_party).unwrap_or(0);
                let already_last = party_index == to_party
                    && self.store.member_position(party_index, member_id)
                        == to_index.checked_sub(1);
                if already_last {
                    DropResult::no_op(revision)
                } else {
                    let write =
                        self.store
                            .move_character(party_index, to_party, member_id, to_index)?;
                    DropResult {
                        outcome: DropOutcome::Moved,
                        write,
                    }
                }
            }
            (
                DragPayload::Party {
                    party_index,
                    member_id,
                },
                DropTarget::PendingList,
            ) => {
                let write = self.store.unassign_character(party_index, member_id)?;
                DropResult {
                    outcome: DropOutcome::Unassigned,
                    write,
                }
            }
            (
                DragPayload::Pending { character },
                DropTarget::Member {
                    party_index,
                    position,
                    ..
                },
            ) => {
                let write = self
                    .store
                    .assign_from_pending(character, party_index, position)?;
                DropResult {
                    outcome: DropOutcome::Assigned,
                    write,
                }
            }
            (DragPayload::Pending { character }, DropTarget::EmptySlot { party_index }) => {
                let to_index = self.store.party_len(party_index).unwrap_or(0);
                let write = self
                    .store
                    .assign_from_pending(character, party_index, to_index)?;
                DropResult {
                    outcome: DropOutcome::Assigned,
                    write,
                }
            }
            (DragPayload::Pending { .. }, DropTarget::PendingList) => DropResult::no_op(revision),
        };

        tracing::debug!(outcome = ?result.outcome, ?target, "Drop handled");
        Ok(result)
    }

    fn ensure_operator(&self) -> Result<(), DragError> {
        if self.store.access().can_modify() {
            Ok(())
        } else {
            Err(DragError::NotOperator)
        }
    }
}
