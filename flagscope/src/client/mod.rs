//! Flag evaluation clients, providers and their registry.
//!
//! Resolution itself is done by an external evaluation subsystem; this
//! module only defines its interfaces and the token scheme used to look up
//! clients by provider name.

mod api;
mod features;
mod provider;
mod registry;
mod types;

#[cfg(test)]
pub use api::MockFeatureApi;
pub use api::FeatureApi;
pub use features::{Client, ContextualClient};
pub use provider::{ContextTransformer, Provider, TransformedProvider, TransformingProvider};
pub use registry::{
    client_token, parse_client_token, ClientRegistry, CLIENT_TOKEN_PREFIX, DEFAULT_CLIENT_NAME,
};
pub use types::{EvaluationDetails, FlagEvaluationOptions, ResolutionDetails};
