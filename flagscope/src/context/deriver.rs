//! Context derivation from inbound requests.

use super::EvaluationContext;
use futures::future::BoxFuture;
use std::future::Future;

/// Result of deriving a context for one request.
pub type DeriveResult = anyhow::Result<Option<EvaluationContext>>;

/// Maps an inbound request descriptor to an evaluation context.
///
/// Invoked once per request, before any handler logic runs. Returning
/// `Ok(None)` means the request has no context; returning an error fails the
/// request.
///
/// Closures of the form `Fn(&Req) -> impl Future<Output = DeriveResult>` are
/// derivers. The returned future may not borrow the request, so copy what it
/// needs out of the descriptor first.
pub trait ContextDeriver<Req: ?Sized>: Send + Sync {
    /// Derives the context for `request`.
    fn derive<'a>(&'a self, request: &'a Req) -> BoxFuture<'a, DeriveResult>;
}

impl<Req, F, Fut> ContextDeriver<Req> for F
where
    Req: ?Sized,
    F: Fn(&Req) -> Fut + Send + Sync,
    Fut: Future<Output = DeriveResult> + Send + 'static,
{
    fn derive<'a>(&'a self, request: &'a Req) -> BoxFuture<'a, DeriveResult> {
        Box::pin(self(request))
    }
}

/// A deriver that always produces the same context.
#[derive(Debug, Clone, Default)]
pub struct StaticDeriver {
    context: Option<EvaluationContext>,
}

impl StaticDeriver {
    /// Creates a deriver returning `context` for every request.
    #[must_use]
    pub const fn new(context: Option<EvaluationContext>) -> Self {
        Self { context }
    }
}

impl<Req: ?Sized> ContextDeriver<Req> for StaticDeriver {
    fn derive<'a>(&'a self, _request: &'a Req) -> BoxFuture<'a, DeriveResult> {
        let context = self.context.clone();
        Box::pin(async move { Ok(context) })
    }
}
