//! Test assertions for the ambient evaluation context.

use crate::context::ContextAccessor;

/// Asserts that the current request's context has the expected targeting key.
pub fn assert_current_target(expected: &str) {
    let context = ContextAccessor::new().get_context();
    let actual = context.as_ref().and_then(|c| c.targeting_key());
    assert_eq!(
        actual,
        Some(expected),
        "Expected targeting key {:?}, got {:?}",
        expected,
        actual
    );
}

/// Asserts that no evaluation context is bound for the caller.
pub fn assert_no_context() {
    let context = ContextAccessor::new().get_context();
    assert!(
        context.is_none(),
        "Expected no evaluation context, got {:?}",
        context
    );
}
