//! Testing utilities for flag-scoped request handling.
//!
//! This module provides:
//! - A static provider and a recording client
//! - An in-memory evaluation subsystem
//! - Assertions on the ambient evaluation context

mod assertions;
mod fixtures;
mod mocks;

pub use assertions::{assert_current_target, assert_no_context};
pub use fixtures::InMemoryFeatureApi;
pub use mocks::{RecordingClient, StaticProvider};
