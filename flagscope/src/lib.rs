//! # Flagscope
//!
//! Request-scoped evaluation contexts for feature flag clients.
//!
//! Flagscope derives an evaluation context from every inbound request and
//! makes it available to all code running on that request's behalf, with:
//!
//! - **Ambient propagation**: a per-request binding that survives `.await`
//!   points without being passed through call signatures
//! - **Isolation**: concurrent requests on the same runtime never observe
//!   each other's context
//! - **Interception**: a request interceptor that derives the context before
//!   any handler logic runs
//! - **Client lookup**: flag clients addressed by `client:default` or
//!   `client:<name>` tokens
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use flagscope::prelude::*;
//!
//! let scope = FlagScope::for_root(
//!     &api,
//!     FlagScopeOptions::new()
//!         .with_default_provider(provider)
//!         .with_context_deriver(|req: &Request| {
//!             let user = req.user_id.clone();
//!             async move { Ok(Some(EvaluationContext::for_target(user))) }
//!         }),
//! );
//!
//! let chain = InterceptorChain::new(handler).with(scope.interceptor_stage());
//! let response = chain.handle(request).await?;
//!
//! // Anywhere inside the handler:
//! let enabled = scope
//!     .default_client()?
//!     .boolean_value_in_scope("new-checkout", false)
//!     .await;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod ambient;
pub mod client;
pub mod config;
pub mod context;
pub mod errors;
pub mod interceptors;
pub mod observability;
pub mod setup;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::ambient::{AmbientContextStore, AmbientFutureExt};
    pub use crate::client::{
        client_token, Client, ClientRegistry, ContextTransformer, ContextualClient,
        EvaluationDetails, FeatureApi, FlagEvaluationOptions, Provider, ResolutionDetails,
        TransformedProvider, TransformingProvider,
    };
    pub use crate::config::ScopeConfig;
    pub use crate::context::{
        AsyncContext, BranchId, ContextAccessor, ContextDeriver, ContextValue,
        DeriveResult, EvaluationContext, StaticDeriver,
    };
    pub use crate::errors::{DerivationError, FlagScopeError, RegistryError};
    pub use crate::interceptors::{
        EvaluationContextInterceptor, Interceptor, InterceptorChain, Next, RequestHandler,
    };
    pub use crate::observability::{init_tracing, LogFormat};
    pub use crate::setup::{FlagScope, FlagScopeOptions};
}
