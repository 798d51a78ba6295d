//! Task-local store for the active request binding.

use crate::context::{AsyncContext, EvaluationContext};
use futures::future::Either;
use std::future::Future;
use std::sync::Arc;
use tokio::task::futures::TaskLocalFuture;
use tokio::task::JoinHandle;

tokio::task_local! {
    static CURRENT_BINDING: AsyncContext;
}

/// Process-wide ambient store of request bindings.
///
/// A binding is visible to every poll of the future it was installed for,
/// across all of that future's suspension points. Concurrent scopes never see
/// each other's bindings, even when they are interleaved on one task, and a
/// nested scope shadows the enclosing one until it completes.
///
/// Bindings do not follow work onto new tasks on their own. Use
/// [`AmbientContextStore::spawn`], [`AmbientContextStore::spawn_blocking`] or
/// [`AmbientFutureExt::in_current_scope`] to carry the current binding across
/// a task boundary.
#[derive(Debug, Clone, Copy, Default)]
pub struct AmbientContextStore;

impl AmbientContextStore {
    /// Runs `future` with `binding` as the ambient binding and returns its output.
    pub async fn run<F>(binding: AsyncContext, future: F) -> F::Output
    where
        F: Future,
    {
        CURRENT_BINDING.scope(binding, future).await
    }

    /// Wraps `future` so that `binding` is ambient whenever it is polled.
    pub fn scope<F>(binding: AsyncContext, future: F) -> TaskLocalFuture<AsyncContext, F>
    where
        F: Future,
    {
        CURRENT_BINDING.scope(binding, future)
    }

    /// Runs a synchronous callback with `binding` as the ambient binding.
    pub fn run_sync<R>(binding: AsyncContext, callback: impl FnOnce() -> R) -> R {
        CURRENT_BINDING.sync_scope(binding, callback)
    }

    /// Returns the binding active for the caller, or `None` outside any scope.
    #[must_use]
    pub fn current() -> Option<AsyncContext> {
        CURRENT_BINDING.try_with(Clone::clone).ok()
    }

    /// Returns the context of the active binding, if any.
    #[must_use]
    pub fn current_context() -> Option<Arc<EvaluationContext>> {
        CURRENT_BINDING
            .try_with(|binding| binding.context().cloned())
            .ok()
            .flatten()
    }

    /// Returns true if the caller runs inside a scope.
    #[must_use]
    pub fn is_active() -> bool {
        CURRENT_BINDING.try_with(|_| ()).is_ok()
    }

    /// Spawns a tokio task that inherits the caller's binding.
    pub fn spawn<F>(future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        tokio::spawn(future.in_current_scope())
    }

    /// Runs a blocking closure on the blocking pool with the caller's binding.
    pub fn spawn_blocking<F, R>(callback: F) -> JoinHandle<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let binding = Self::current();
        tokio::task::spawn_blocking(move || match binding {
            Some(binding) => CURRENT_BINDING.sync_scope(binding, callback),
            None => callback(),
        })
    }
}

/// Future returned by [`AmbientFutureExt::in_current_scope`].
pub type InCurrentScope<F> = Either<TaskLocalFuture<AsyncContext, F>, F>;

/// Explicit propagation of the ambient binding into a future.
pub trait AmbientFutureExt: Future + Sized {
    /// Captures the caller's binding so the future observes it wherever it runs.
    ///
    /// Outside any scope the future is returned unchanged.
    fn in_current_scope(self) -> InCurrentScope<Self> {
        match AmbientContextStore::current() {
            Some(binding) => Either::Left(CURRENT_BINDING.scope(binding, self)),
            None => Either::Right(self),
        }
    }

    /// Runs the future under `binding`.
    fn with_binding(self, binding: AsyncContext) -> TaskLocalFuture<AsyncContext, Self> {
        AmbientContextStore::scope(binding, self)
    }
}

impl<F: Future> AmbientFutureExt for F {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn target() -> Option<String> {
        AmbientContextStore::current_context()
            .and_then(|ctx| ctx.targeting_key().map(String::from))
    }

    fn binding(key: &str) -> AsyncContext {
        AsyncContext::with_context(EvaluationContext::for_target(key))
    }

    #[tokio::test]
    async fn test_outside_scope_is_absent() {
        assert!(AmbientContextStore::current().is_none());
        assert!(AmbientContextStore::current_context().is_none());
        assert!(!AmbientContextStore::is_active());
    }

    #[tokio::test]
    async fn test_run_returns_callback_output() {
        let out = AmbientContextStore::run(binding("user-1"), async { 41 + 1 }).await;
        assert_eq!(out, 42);
    }

    #[tokio::test]
    async fn test_binding_survives_suspension_points() {
        let seen = AmbientContextStore::run(binding("user-42"), async {
            let before = target();
            tokio::task::yield_now().await;
            tokio::time::sleep(Duration::from_millis(5)).await;
            let after = target();
            (before, after)
        })
        .await;

        assert_eq!(seen.0.as_deref(), Some("user-42"));
        assert_eq!(seen.1.as_deref(), Some("user-42"));
        assert!(target().is_none());
    }

    #[tokio::test]
    async fn test_empty_binding_is_active_without_context() {
        let (active, context) = AmbientContextStore::run(AsyncContext::empty(), async {
            (
                AmbientContextStore::is_active(),
                AmbientContextStore::current_context(),
            )
        })
        .await;

        assert!(active);
        assert!(context.is_none());
    }

    #[tokio::test]
    async fn test_nested_scope_shadows_and_restores() {
        let outer = binding("outer");
        let outer_branch = outer.branch();

        let seen = AmbientContextStore::run(outer, async {
            let inner = AmbientContextStore::run(binding("inner"), async {
                tokio::task::yield_now().await;
                target()
            })
            .await;
            let restored = target();
            let branch = AmbientContextStore::current().map(|b| b.branch());
            (inner, restored, branch)
        })
        .await;

        assert_eq!(seen.0.as_deref(), Some("inner"));
        assert_eq!(seen.1.as_deref(), Some("outer"));
        assert_eq!(seen.2, Some(outer_branch));
    }

    #[tokio::test]
    async fn test_interleaved_scopes_on_one_task_are_isolated() {
        let a = AmbientContextStore::run(binding("a"), async {
            let mut seen = Vec::new();
            for _ in 0..5 {
                seen.push(target());
                tokio::task::yield_now().await;
            }
            seen
        });
        let b = AmbientContextStore::run(binding("b"), async {
            let mut seen = Vec::new();
            for _ in 0..5 {
                tokio::task::yield_now().await;
                seen.push(target());
            }
            seen
        });

        let (seen_a, seen_b) = tokio::join!(a, b);
        assert!(seen_a.iter().all(|t| t.as_deref() == Some("a")));
        assert!(seen_b.iter().all(|t| t.as_deref() == Some("b")));
    }

    #[tokio::test]
    async fn test_plain_spawn_does_not_inherit() {
        let seen = AmbientContextStore::run(binding("user-1"), async {
            tokio::spawn(async { target() }).await.unwrap()
        })
        .await;
        assert!(seen.is_none());
    }

    #[tokio::test]
    async fn test_spawn_propagates_binding() {
        let seen = AmbientContextStore::run(binding("user-1"), async {
            AmbientContextStore::spawn(async {
                tokio::task::yield_now().await;
                target()
            })
            .await
            .unwrap()
        })
        .await;
        assert_eq!(seen.as_deref(), Some("user-1"));
    }

    #[tokio::test]
    async fn test_spawn_outside_scope() {
        let seen = AmbientContextStore::spawn(async { target() }).await.unwrap();
        assert!(seen.is_none());
    }

    #[tokio::test]
    async fn test_spawn_blocking_propagates_binding() {
        let seen = AmbientContextStore::run(binding("user-9"), async {
            AmbientContextStore::spawn_blocking(target).await.unwrap()
        })
        .await;
        assert_eq!(seen.as_deref(), Some("user-9"));
    }

    #[tokio::test]
    async fn test_in_current_scope_captures_at_call_time() {
        let captured = AmbientContextStore::run(binding("captured"), async {
            async { target() }.in_current_scope()
        })
        .await;

        // Polled after the creating scope has exited.
        assert_eq!(captured.await.as_deref(), Some("captured"));
    }

    #[tokio::test]
    async fn test_with_binding() {
        let seen = async { target() }.with_binding(binding("explicit")).await;
        assert_eq!(seen.as_deref(), Some("explicit"));
    }

    #[test]
    fn test_run_sync() {
        let seen = AmbientContextStore::run_sync(binding("sync"), target);
        assert_eq!(seen.as_deref(), Some("sync"));
        assert!(target().is_none());
    }
}
