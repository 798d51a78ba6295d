//! Interceptor chain for ordered request middleware.

use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;

/// The terminal handler invoked at the end of an interceptor chain.
pub trait RequestHandler<Req, Resp, E>: Send + Sync {
    /// Handles one request.
    fn handle(&self, request: Req) -> BoxFuture<'_, Result<Resp, E>>;
}

impl<Req, Resp, E, F, Fut> RequestHandler<Req, Resp, E> for F
where
    F: Fn(Req) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Resp, E>> + Send + 'static,
{
    fn handle(&self, request: Req) -> BoxFuture<'_, Result<Resp, E>> {
        Box::pin(self(request))
    }
}

/// A middleware stage wrapping the rest of the chain.
///
/// An interceptor receives the request and a [`Next`] continuation. It may do
/// work before and after calling `next.run(request)`, or return without
/// calling it at all.
pub trait Interceptor<Req, Resp, E>: Send + Sync {
    /// Returns the interceptor's priority (lower = runs earlier, outermost).
    fn priority(&self) -> i32 {
        0
    }

    /// Intercepts a request.
    fn intercept<'a>(
        &'a self,
        request: Req,
        next: Next<'a, Req, Resp, E>,
    ) -> BoxFuture<'a, Result<Resp, E>>;
}

/// The remainder of an interceptor chain.
pub struct Next<'a, Req, Resp, E> {
    interceptors: &'a [Arc<dyn Interceptor<Req, Resp, E>>],
    handler: &'a dyn RequestHandler<Req, Resp, E>,
}

impl<'a, Req, Resp, E> Next<'a, Req, Resp, E> {
    /// Creates a continuation over `interceptors` ending in `handler`.
    #[must_use]
    pub fn new(
        interceptors: &'a [Arc<dyn Interceptor<Req, Resp, E>>],
        handler: &'a dyn RequestHandler<Req, Resp, E>,
    ) -> Self {
        Self {
            interceptors,
            handler,
        }
    }

    /// Runs the rest of the chain.
    pub fn run(self, request: Req) -> BoxFuture<'a, Result<Resp, E>> {
        match self.interceptors.split_first() {
            Some((first, rest)) => first.intercept(request, Next::new(rest, self.handler)),
            None => self.handler.handle(request),
        }
    }

    /// Returns the number of interceptors still ahead of the handler.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.interceptors.len()
    }
}

/// A chain of interceptors around a request handler.
pub struct InterceptorChain<Req, Resp, E> {
    interceptors: Vec<Arc<dyn Interceptor<Req, Resp, E>>>,
    handler: Arc<dyn RequestHandler<Req, Resp, E>>,
}

impl<Req, Resp, E> InterceptorChain<Req, Resp, E> {
    /// Creates a chain with no interceptors.
    #[must_use]
    pub fn new(handler: Arc<dyn RequestHandler<Req, Resp, E>>) -> Self {
        Self {
            interceptors: Vec::new(),
            handler,
        }
    }

    /// Adds an interceptor to the chain.
    pub fn add(&mut self, interceptor: Arc<dyn Interceptor<Req, Resp, E>>) {
        self.interceptors.push(interceptor);
        self.interceptors.sort_by_key(|i| i.priority());
    }

    /// Adds an interceptor, builder style.
    #[must_use]
    pub fn with(mut self, interceptor: Arc<dyn Interceptor<Req, Resp, E>>) -> Self {
        self.add(interceptor);
        self
    }

    /// Runs a request through the chain.
    pub fn handle(&self, request: Req) -> BoxFuture<'_, Result<Resp, E>> {
        Next::new(&self.interceptors, self.handler.as_ref()).run(request)
    }

    /// Returns the number of interceptors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    /// Returns true if the chain has no interceptors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    type Log = Arc<Mutex<Vec<String>>>;

    struct RecordingInterceptor {
        name: &'static str,
        priority: i32,
        log: Log,
    }

    impl Interceptor<u32, u32, String> for RecordingInterceptor {
        fn priority(&self) -> i32 {
            self.priority
        }

        fn intercept<'a>(
            &'a self,
            request: u32,
            next: Next<'a, u32, u32, String>,
        ) -> BoxFuture<'a, Result<u32, String>> {
            Box::pin(async move {
                self.log.lock().push(format!("{}:before", self.name));
                let result = next.run(request + 1).await;
                self.log.lock().push(format!("{}:after", self.name));
                result
            })
        }
    }

    struct RejectingInterceptor;

    impl Interceptor<u32, u32, String> for RejectingInterceptor {
        fn intercept<'a>(
            &'a self,
            request: u32,
            _next: Next<'a, u32, u32, String>,
        ) -> BoxFuture<'a, Result<u32, String>> {
            Box::pin(async move { Err(format!("rejected {request}")) })
        }
    }

    fn echo_handler(calls: Arc<AtomicUsize>) -> Arc<dyn RequestHandler<u32, u32, String>> {
        Arc::new(move |request: u32| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { Ok::<_, String>(request) }
        })
    }

    #[tokio::test]
    async fn test_chain_creation() {
        let chain = InterceptorChain::new(echo_handler(Arc::default()));
        assert!(chain.is_empty());
        assert_eq!(chain.handle(7).await, Ok(7));
    }

    #[tokio::test]
    async fn test_chain_ordering() {
        let log: Log = Arc::default();
        let mut chain = InterceptorChain::new(echo_handler(Arc::default()));
        for (name, priority) in [("a", 10), ("b", 5), ("c", 15)] {
            chain.add(Arc::new(RecordingInterceptor {
                name,
                priority,
                log: log.clone(),
            }));
        }

        assert_eq!(chain.len(), 3);
        assert_eq!(chain.handle(0).await, Ok(3));
        assert_eq!(
            *log.lock(),
            vec!["b:before", "a:before", "c:before", "c:after", "a:after", "b:after"]
        );
    }

    #[tokio::test]
    async fn test_chain_short_circuit() {
        let calls = Arc::new(AtomicUsize::new(0));
        let chain = InterceptorChain::new(echo_handler(calls.clone()))
            .with(Arc::new(RejectingInterceptor));

        assert_eq!(chain.handle(1).await, Err("rejected 1".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_handler_error_passes_through() {
        let log: Log = Arc::default();
        let handler: Arc<dyn RequestHandler<u32, u32, String>> =
            Arc::new(|_request: u32| async { Err::<u32, _>("handler failed".to_string()) });
        let chain = InterceptorChain::new(handler).with(Arc::new(RecordingInterceptor {
            name: "outer",
            priority: 0,
            log: log.clone(),
        }));

        assert_eq!(chain.handle(1).await, Err("handler failed".to_string()));
        assert_eq!(log.lock().len(), 2);
    }
}
