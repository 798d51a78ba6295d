//! Test fixtures for flag evaluation setups.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use super::RecordingClient;
use crate::client::{Client, FeatureApi, Provider};

/// An in-memory stand-in for the evaluation subsystem.
///
/// Clients are [`RecordingClient`]s backed by the registered provider. A
/// named client without its own provider falls back to the default one.
#[derive(Default)]
pub struct InMemoryFeatureApi {
    default_provider: RwLock<Option<Arc<dyn Provider>>>,
    named_providers: RwLock<HashMap<String, Arc<dyn Provider>>>,
    registrations: RwLock<Vec<String>>,
}

impl InMemoryFeatureApi {
    /// Creates an empty API.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns registered provider names in registration order.
    ///
    /// The default provider is listed as `default:<provider name>`, named
    /// providers as `<client name>:<provider name>`.
    #[must_use]
    pub fn registrations(&self) -> Vec<String> {
        self.registrations.read().clone()
    }

    /// Returns the provider serving the client named `name`.
    #[must_use]
    pub fn provider_for(&self, name: Option<&str>) -> Option<Arc<dyn Provider>> {
        name.and_then(|n| self.named_providers.read().get(n).cloned())
            .or_else(|| self.default_provider.read().clone())
    }
}

impl FeatureApi for InMemoryFeatureApi {
    fn set_provider(&self, provider: Arc<dyn Provider>) {
        self.registrations
            .write()
            .push(format!("default:{}", provider.name()));
        *self.default_provider.write() = Some(provider);
    }

    fn set_named_provider(&self, name: &str, provider: Arc<dyn Provider>) {
        self.registrations
            .write()
            .push(format!("{name}:{}", provider.name()));
        self.named_providers
            .write()
            .insert(name.to_string(), provider);
    }

    fn default_client(&self) -> Arc<dyn Client> {
        Arc::new(RecordingClient::new(self.provider_for(None)))
    }

    fn named_client(&self, name: &str) -> Arc<dyn Client> {
        Arc::new(RecordingClient::named(name, self.provider_for(Some(name))))
    }
}
