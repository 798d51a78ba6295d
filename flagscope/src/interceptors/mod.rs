//! Interceptors (middleware) for request handling.

mod chain;
mod evaluation_context;
#[cfg(test)]
mod integration_tests;

pub use chain::{Interceptor, InterceptorChain, Next, RequestHandler};
pub use evaluation_context::{EvaluationContextInterceptor, EVALUATION_CONTEXT_PRIORITY};
