//! Ambient propagation of request bindings across asynchronous code.
//!
//! The store is built on tokio task-local storage. Inside a scope the binding
//! is visible without parameter passing; crossing a task boundary requires
//! the explicit propagation helpers exported here.

mod store;

pub use store::{AmbientContextStore, AmbientFutureExt, InCurrentScope};
