//! Keyparty Shared - wire vocabulary for the roster client
//!
//! This crate contains the types exchanged with the event backend:
//! - Push channel message kinds (signal-only invalidations)
//! - REST request bodies
//! - REST paths
//!
//! # Design Principles
//!
//! 1. **Minimal dependencies** - Only serde, serde_json and tracing
//! 2. **No business logic** - Pure data types and serialization
//! 3. **Domain vocabulary** - Characters and parties travel as the domain
//!    types themselves so every save path goes through one definition

pub mod messages;
pub mod paths;
pub mod requests;

pub use messages::PushMessage;
pub use requests::{RemoveCharactersRequest, SetPartiesVisibilityRequest, UpsertCharacterRequest};
