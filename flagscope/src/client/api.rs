//! Boundary to the external flag evaluation subsystem.

use super::{Client, Provider};
use std::sync::Arc;

/// Provider registration and client creation, owned by the evaluation
/// subsystem.
///
/// Setup registers every provider through this trait before any client is
/// created.
#[cfg_attr(test, mockall::automock)]
pub trait FeatureApi: Send + Sync {
    /// Sets the provider used by the default client.
    fn set_provider(&self, provider: Arc<dyn Provider>);

    /// Sets the provider used by the client named `name`.
    fn set_named_provider(&self, name: &str, provider: Arc<dyn Provider>);

    /// Returns the default client.
    fn default_client(&self) -> Arc<dyn Client>;

    /// Returns the client named `name`.
    fn named_client(&self, name: &str) -> Arc<dyn Client>;
}
