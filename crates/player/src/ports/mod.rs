//! Player port definitions.
//!
//! Only outbound ports exist: the HTTP boundary to the event backend and the
//! local key-value storage used for the self identity.

pub mod outbound;
