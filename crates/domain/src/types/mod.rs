//! Shared vocabulary types used by entities and the wire protocol.

// Class/spec/role vocabulary
mod class_spec;
pub use class_spec::{CharacterClass, Role, Specialization};

// Viewer access
mod access;
pub use access::Access;
