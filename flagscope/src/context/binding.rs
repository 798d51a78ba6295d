//! Branch identities and the per-branch ambient binding.

use super::EvaluationContext;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Opaque identity of one request's execution lineage.
///
/// Created at scope entry and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BranchId(Uuid);

impl BranchId {
    /// Creates a fresh branch id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for BranchId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BranchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The value bound to a branch in the ambient store.
///
/// The context is fixed when the binding is created; it is either the full
/// derived context or nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct AsyncContext {
    branch: BranchId,
    context: Option<Arc<EvaluationContext>>,
}

impl AsyncContext {
    /// Creates a binding for a new branch.
    #[must_use]
    pub fn new(context: Option<EvaluationContext>) -> Self {
        Self {
            branch: BranchId::new(),
            context: context.map(Arc::new),
        }
    }

    /// Creates a binding for a new branch holding `context`.
    #[must_use]
    pub fn with_context(context: EvaluationContext) -> Self {
        Self::new(Some(context))
    }

    /// Creates a binding for a new branch without a context.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(None)
    }

    /// Returns the branch this binding belongs to.
    #[must_use]
    pub const fn branch(&self) -> BranchId {
        self.branch
    }

    /// Returns the bound context, if any.
    #[must_use]
    pub fn context(&self) -> Option<&Arc<EvaluationContext>> {
        self.context.as_ref()
    }

    /// Returns true if a context was bound.
    #[must_use]
    pub const fn has_context(&self) -> bool {
        self.context.is_some()
    }
}
