//! Shared helpers for integration tests.

pub mod fixtures;
pub mod socket_guard;
