//! Application services - use case implementations over the outbound ports.

pub mod roster_service;

pub use roster_service::RosterService;
