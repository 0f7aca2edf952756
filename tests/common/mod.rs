//! Shared mocks for the integration tests

pub mod mocks;
