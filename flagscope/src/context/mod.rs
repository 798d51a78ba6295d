//! Evaluation contexts and their per-request lifecycle.
//!
//! This module provides:
//! - The evaluation context handed to flag providers
//! - Branch identities and the ambient binding stored per request
//! - The deriver contract that builds a context from a request
//! - The read-only accessor used by application code

mod accessor;
mod binding;
mod deriver;
mod evaluation;

pub use accessor::ContextAccessor;
pub use binding::{AsyncContext, BranchId};
pub use deriver::{ContextDeriver, DeriveResult, StaticDeriver};
pub use evaluation::{ContextValue, EvaluationContext, TARGETING_KEY};
