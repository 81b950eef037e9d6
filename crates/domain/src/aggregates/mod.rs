//! Aggregate roots - domain objects that own their related data
//!
//! The party layout owns every party of an event and is the only place where
//! members move between parties. Mutations return `Result`s and leave the
//! aggregate untouched on error, so callers can apply them optimistically.

mod party_layout;

pub use party_layout::{by_role, LayoutError, PartyLayout, Placement};
