//! Read-only access to the current request's evaluation context.

use super::EvaluationContext;
use crate::ambient::AmbientContextStore;
use std::sync::Arc;

/// Facade for application code that needs the ambient evaluation context.
///
/// This is the only context API handlers are expected to call. It never
/// fails: outside a request scope, or when the scope derived nothing, the
/// result is `None` and callers fall back to provider defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextAccessor;

impl ContextAccessor {
    /// Creates a new accessor.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Returns the evaluation context of the request the caller is part of.
    #[must_use]
    pub fn get_context(&self) -> Option<Arc<EvaluationContext>> {
        AmbientContextStore::current_context()
    }
}
