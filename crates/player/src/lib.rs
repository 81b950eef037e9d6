//! Keyparty player.
//!
//! Client side of a live keystone event: the roster store and drag-drop
//! coordinator, the persistence client and the push channel that keeps
//! every viewer in sync.

pub mod application;
pub mod config;
pub mod infrastructure;
pub mod ports;
pub mod runner;
pub mod state;

pub use config::PlayerConfig;
pub use state::{DragDropCoordinator, ReconcilePolicy, RosterSnapshot, RosterStore};
