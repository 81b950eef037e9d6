//! Test doubles for the outbound ports.

pub mod fixtures;

pub use fixtures::FakeEventApi;
