//! Client-side state for one event view
//!
//! The roster store owns the cached roster and party layout; the drag-drop
//! coordinator drives it from direct manipulation.

mod drag_drop;
mod roster_store;

pub use drag_drop::{DragDropCoordinator, DragError, DragPayload, DropOutcome, DropResult, DropTarget};
pub use roster_store::{
    PendingWrite, ReconcilePolicy, RosterError, RosterSnapshot, RosterStore,
};
