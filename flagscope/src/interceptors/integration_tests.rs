//! End-to-end request flows through the interceptor chain.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use thiserror::Error;

use crate::ambient::AmbientContextStore;
use crate::client::{Client, ContextualClient};
use crate::context::{AsyncContext, ContextAccessor, EvaluationContext};
use crate::errors::DerivationError;
use crate::interceptors::{InterceptorChain, RequestHandler};
use crate::setup::{FlagScope, FlagScopeOptions};
use crate::testing::{
    assert_current_target, assert_no_context, InMemoryFeatureApi, RecordingClient,
    StaticProvider,
};

#[derive(Debug, Clone)]
struct HttpRequest {
    path: String,
    user: Option<String>,
    delay_ms: u64,
}

impl HttpRequest {
    fn new(user: &str, delay_ms: u64) -> Self {
        Self {
            path: "/checkout".to_string(),
            user: Some(user.to_string()),
            delay_ms,
        }
    }
}

#[derive(Debug, Error)]
enum HttpError {
    #[error(transparent)]
    Context(#[from] DerivationError),
    #[error("internal: {0}")]
    Internal(String),
}

fn header_deriver(
    req: &HttpRequest,
) -> impl std::future::Future<Output = crate::context::DeriveResult> + Send + 'static {
    let user = req.user.clone();
    let path = req.path.clone();
    async move {
        tokio::time::sleep(Duration::from_millis(2)).await;
        Ok(user.map(|u| EvaluationContext::for_target(u).with_attribute("path", path)))
    }
}

fn delayed_target_handler() -> Arc<dyn RequestHandler<HttpRequest, Option<String>, HttpError>> {
    Arc::new(|req: HttpRequest| async move {
        tokio::time::sleep(Duration::from_millis(req.delay_ms)).await;
        Ok::<_, HttpError>(
            ContextAccessor::new()
                .get_context()
                .and_then(|ctx| ctx.targeting_key().map(String::from)),
        )
    })
}

fn scoped_chain(
    handler: Arc<dyn RequestHandler<HttpRequest, Option<String>, HttpError>>,
) -> (Arc<InterceptorChain<HttpRequest, Option<String>, HttpError>>, FlagScope<HttpRequest>) {
    let api = InMemoryFeatureApi::new();
    let scope = FlagScope::for_root(
        &api,
        FlagScopeOptions::new()
            .with_default_provider(Arc::new(StaticProvider::new("static")))
            .with_context_deriver(header_deriver),
    );
    let chain = InterceptorChain::new(handler).with(scope.interceptor_stage());
    (Arc::new(chain), scope)
}

#[tokio::test]
async fn test_concurrent_requests_see_their_own_context() {
    let (chain, _scope) = scoped_chain(delayed_target_handler());

    // A finishes its delay after B has started and suspended.
    let a = {
        let chain = chain.clone();
        tokio::spawn(async move { chain.handle(HttpRequest::new("user-42", 20)).await })
    };
    let b = {
        let chain = chain.clone();
        tokio::spawn(async move { chain.handle(HttpRequest::new("user-7", 5)).await })
    };

    let a = a.await.unwrap().unwrap();
    let b = b.await.unwrap().unwrap();
    assert_eq!(a.as_deref(), Some("user-42"));
    assert_eq!(b.as_deref(), Some("user-7"));
}

#[tokio::test]
async fn test_many_interleaved_requests_on_one_task() {
    let (chain, _scope) = scoped_chain(delayed_target_handler());

    let requests = (0..16u64).map(|i| {
        let chain = chain.clone();
        async move {
            let user = format!("user-{i}");
            let seen = chain
                .handle(HttpRequest::new(&user, (16 - i) % 5))
                .await
                .unwrap();
            (user, seen)
        }
    });

    for (user, seen) in futures::future::join_all(requests).await {
        assert_eq!(seen, Some(user));
    }
}

#[tokio::test]
async fn test_flag_evaluation_uses_request_context() {
    let provider = Arc::new(StaticProvider::new("static").with_boolean("new-checkout", true));
    let api = InMemoryFeatureApi::new();
    let scope = FlagScope::for_root(
        &api,
        FlagScopeOptions::new()
            .with_default_provider(provider.clone())
            .with_context_deriver(header_deriver),
    );

    let client = scope.client("client:default").unwrap();
    let handler: Arc<dyn RequestHandler<HttpRequest, bool, HttpError>> =
        Arc::new(move |_req: HttpRequest| {
            let client = client.clone();
            async move {
                tokio::task::yield_now().await;
                Ok::<_, HttpError>(client.boolean_value_in_scope("new-checkout", false).await)
            }
        });
    let chain = InterceptorChain::new(handler).with(scope.interceptor_stage());

    assert!(chain.handle(HttpRequest::new("user-42", 0)).await.unwrap());
    assert_eq!(provider.seen_targets(), vec![Some("user-42".to_string())]);
}

#[tokio::test]
async fn test_nested_scope_inside_request() {
    let handler: Arc<dyn RequestHandler<HttpRequest, Vec<Option<String>>, HttpError>> =
        Arc::new(|_req: HttpRequest| async {
            let read = || {
                ContextAccessor::new()
                    .get_context()
                    .and_then(|ctx| ctx.targeting_key().map(String::from))
            };
            let outer = read();
            let inner = AmbientContextStore::run(
                AsyncContext::with_context(EvaluationContext::for_target("service-account")),
                async move {
                    tokio::task::yield_now().await;
                    read()
                },
            )
            .await;
            let restored = read();
            Ok::<_, HttpError>(vec![outer, inner, restored])
        });

    let api = InMemoryFeatureApi::new();
    let scope = FlagScope::for_root(
        &api,
        FlagScopeOptions::new().with_context_deriver(header_deriver),
    );
    let chain = InterceptorChain::new(handler).with(scope.interceptor_stage());

    let seen = chain.handle(HttpRequest::new("user-42", 0)).await.unwrap();
    assert_eq!(
        seen,
        vec![
            Some("user-42".to_string()),
            Some("service-account".to_string()),
            Some("user-42".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_background_work_carries_request_context() {
    let handler: Arc<dyn RequestHandler<HttpRequest, (), HttpError>> =
        Arc::new(|_req: HttpRequest| async {
            AmbientContextStore::spawn(async {
                tokio::time::sleep(Duration::from_millis(1)).await;
                assert_current_target("user-42");
            })
            .await
            .map_err(|e| HttpError::Internal(e.to_string()))
        });

    let api = InMemoryFeatureApi::new();
    let scope = FlagScope::for_root(
        &api,
        FlagScopeOptions::new().with_context_deriver(header_deriver),
    );
    let chain = InterceptorChain::new(handler).with(scope.interceptor_stage());

    chain.handle(HttpRequest::new("user-42", 0)).await.unwrap();
    assert_no_context();
}

#[tokio::test]
async fn test_without_deriver_every_read_is_absent() {
    let api = InMemoryFeatureApi::new();
    let scope = FlagScope::<HttpRequest>::for_root(&api, FlagScopeOptions::new());
    let chain = InterceptorChain::new(delayed_target_handler()).with(scope.interceptor_stage());

    let seen = chain.handle(HttpRequest::new("user-42", 1)).await.unwrap();
    assert!(seen.is_none());
}

#[tokio::test]
async fn test_failed_derivation_fails_request() {
    let calls = Arc::new(RecordingClient::new(None));
    let recorder = calls.clone();
    let handler: Arc<dyn RequestHandler<HttpRequest, (), HttpError>> =
        Arc::new(move |_req: HttpRequest| {
            let recorder = recorder.clone();
            async move {
                recorder.boolean_value_in_scope("never", false).await;
                Ok::<_, HttpError>(())
            }
        });

    let api = InMemoryFeatureApi::new();
    let scope = FlagScope::for_root(
        &api,
        FlagScopeOptions::new().with_context_deriver(|req: &HttpRequest| {
            let path = req.path.clone();
            async move {
                Err::<Option<EvaluationContext>, _>(anyhow::anyhow!(
                    "cannot derive context for {path}"
                ))
            }
        }),
    );
    let chain = InterceptorChain::new(handler).with(scope.interceptor_stage());

    let err = chain.handle(HttpRequest::new("user-42", 0)).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Failed to derive evaluation context: cannot derive context for /checkout"
    );
    assert!(calls.evaluations().is_empty());
}

#[tokio::test]
async fn test_read_outside_any_request() {
    assert_no_context();
    let client = RecordingClient::new(None);
    client.boolean_value_in_scope("startup", true).await;
    assert_eq!(client.evaluations(), vec![("startup".to_string(), None)]);
    assert_eq!(client.name(), None);
}
