//! Interceptor that binds a derived evaluation context to each request.

use super::{Interceptor, Next};
use crate::ambient::AmbientContextStore;
use crate::config::ScopeConfig;
use crate::context::{AsyncContext, ContextDeriver};
use crate::errors::DerivationError;
use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn, Instrument};

/// Priority of [`EvaluationContextInterceptor`]: outermost, so every other
/// interceptor and the handler run inside the request's scope.
pub const EVALUATION_CONTEXT_PRIORITY: i32 = i32::MIN;

/// Establishes the ambient evaluation context for each request.
///
/// For every request the deriver (if any) runs exactly once and is awaited
/// before the rest of the chain starts. The rest of the chain then runs with
/// the derived context bound, so the handler's first statement can already
/// read it through a [`ContextAccessor`](crate::context::ContextAccessor).
///
/// Handler results and errors are returned unchanged. A deriver failure
/// becomes the request's failure and the handler is not invoked.
pub struct EvaluationContextInterceptor<Req: ?Sized> {
    deriver: Option<Arc<dyn ContextDeriver<Req>>>,
    config: ScopeConfig,
}

impl<Req: ?Sized> EvaluationContextInterceptor<Req> {
    /// Creates an interceptor with an optional deriver.
    #[must_use]
    pub fn new(deriver: Option<Arc<dyn ContextDeriver<Req>>>) -> Self {
        Self {
            deriver,
            config: ScopeConfig::default(),
        }
    }

    /// Creates an interceptor using `deriver`.
    #[must_use]
    pub fn with_deriver(deriver: impl ContextDeriver<Req> + 'static) -> Self {
        Self::new(Some(Arc::new(deriver)))
    }

    /// Creates an interceptor that binds no context to any request.
    #[must_use]
    pub fn without_deriver() -> Self {
        Self::new(None)
    }

    /// Sets the scope configuration.
    #[must_use]
    pub fn with_config(mut self, config: ScopeConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns true if a deriver is configured.
    #[must_use]
    pub fn has_deriver(&self) -> bool {
        self.deriver.is_some()
    }

    /// Returns the scope configuration.
    #[must_use]
    pub const fn config(&self) -> &ScopeConfig {
        &self.config
    }

    /// Derives the binding for one request.
    ///
    /// Either the full derived context is bound or none is.
    pub async fn bind(&self, request: &Req) -> Result<AsyncContext, DerivationError> {
        let context = match &self.deriver {
            Some(deriver) => deriver.derive(request).await.map_err(|error| {
                warn!(%error, "Evaluation context derivation failed");
                DerivationError::new(error)
            })?,
            None => None,
        };

        let binding = AsyncContext::new(context);
        debug!(
            branch = %binding.branch(),
            has_context = binding.has_context(),
            "Evaluation context bound"
        );
        if self.config.log_contexts {
            match binding.context().map(|context| context.to_json()) {
                Some(Ok(context)) => debug!(
                    branch = %binding.branch(),
                    %context,
                    "Derived evaluation context"
                ),
                Some(Err(error)) => warn!(
                    branch = %binding.branch(),
                    %error,
                    "Derived evaluation context is not loggable"
                ),
                None => {}
            }
        }

        Ok(binding)
    }

    /// Runs `next` inside a scope bound to the context derived for `request`.
    ///
    /// `next` is only called after derivation succeeded.
    pub async fn scope<T, E, Fut>(&self, request: &Req, next: impl FnOnce() -> Fut) -> Result<T, E>
    where
        Fut: Future<Output = Result<T, E>>,
        E: From<DerivationError>,
    {
        let binding = self.bind(request).await?;
        self.run_bound(binding, next()).await
    }

    async fn run_bound<F: Future>(&self, binding: AsyncContext, future: F) -> F::Output {
        if self.config.trace_spans {
            let span = tracing::debug_span!("evaluation_context", branch = %binding.branch());
            AmbientContextStore::run(binding, future).instrument(span).await
        } else {
            AmbientContextStore::run(binding, future).await
        }
    }
}

impl<Req: ?Sized> Clone for EvaluationContextInterceptor<Req> {
    fn clone(&self) -> Self {
        Self {
            deriver: self.deriver.clone(),
            config: self.config.clone(),
        }
    }
}

impl<Req: ?Sized> Default for EvaluationContextInterceptor<Req> {
    fn default() -> Self {
        Self::without_deriver()
    }
}

impl<Req: ?Sized> std::fmt::Debug for EvaluationContextInterceptor<Req> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvaluationContextInterceptor")
            .field("has_deriver", &self.has_deriver())
            .field("config", &self.config)
            .finish()
    }
}

impl<Req, Resp, E> Interceptor<Req, Resp, E> for EvaluationContextInterceptor<Req>
where
    Req: Send + Sync + 'static,
    Resp: Send + 'static,
    E: From<DerivationError> + Send + 'static,
{
    fn priority(&self) -> i32 {
        EVALUATION_CONTEXT_PRIORITY
    }

    fn intercept<'a>(
        &'a self,
        request: Req,
        next: Next<'a, Req, Resp, E>,
    ) -> BoxFuture<'a, Result<Resp, E>> {
        Box::pin(async move {
            let binding = self.bind(&request).await?;
            self.run_bound(binding, next.run(request)).await
        })
    }
}
