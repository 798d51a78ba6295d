//! One-time wiring of providers, clients and the request interceptor.

use crate::client::{Client, ClientRegistry, FeatureApi, Provider};
use crate::config::ScopeConfig;
use crate::context::{ContextAccessor, ContextDeriver};
use crate::errors::{DerivationError, RegistryError};
use crate::interceptors::{EvaluationContextInterceptor, Interceptor};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

/// Setup options: providers to register and how to derive request contexts.
pub struct FlagScopeOptions<Req: ?Sized> {
    default_provider: Option<Arc<dyn Provider>>,
    providers: BTreeMap<String, Arc<dyn Provider>>,
    context_deriver: Option<Arc<dyn ContextDeriver<Req>>>,
    scope_config: ScopeConfig,
}

impl<Req: ?Sized> FlagScopeOptions<Req> {
    /// Creates empty options.
    #[must_use]
    pub fn new() -> Self {
        Self {
            default_provider: None,
            providers: BTreeMap::new(),
            context_deriver: None,
            scope_config: ScopeConfig::default(),
        }
    }

    /// Sets the default provider.
    #[must_use]
    pub fn with_default_provider(mut self, provider: Arc<dyn Provider>) -> Self {
        self.default_provider = Some(provider);
        self
    }

    /// Adds a provider served by the client named `name`.
    #[must_use]
    pub fn with_provider(mut self, name: impl Into<String>, provider: Arc<dyn Provider>) -> Self {
        self.providers.insert(name.into(), provider);
        self
    }

    /// Sets the deriver run for every request.
    #[must_use]
    pub fn with_context_deriver(mut self, deriver: impl ContextDeriver<Req> + 'static) -> Self {
        self.context_deriver = Some(Arc::new(deriver));
        self
    }

    /// Sets the request scope configuration.
    #[must_use]
    pub fn with_scope_config(mut self, config: ScopeConfig) -> Self {
        self.scope_config = config;
        self
    }

    /// Returns the names of the named providers in registration order.
    #[must_use]
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.keys().map(String::as_str).collect()
    }
}

impl<Req: ?Sized> Default for FlagScopeOptions<Req> {
    fn default() -> Self {
        Self::new()
    }
}

/// The wired-up pieces an application uses at runtime.
pub struct FlagScope<Req: ?Sized> {
    registry: Arc<ClientRegistry>,
    interceptor: Arc<EvaluationContextInterceptor<Req>>,
    accessor: ContextAccessor,
}

impl<Req: ?Sized> FlagScope<Req> {
    /// Registers all providers with `api`, then builds the client registry,
    /// the request interceptor and the context accessor.
    ///
    /// The default provider is registered first, then named providers in
    /// name order. `client:default` is always available, plus one
    /// `client:<name>` token per named provider.
    pub fn for_root(api: &dyn FeatureApi, options: FlagScopeOptions<Req>) -> Self {
        let FlagScopeOptions {
            default_provider,
            providers,
            context_deriver,
            scope_config,
        } = options;

        if let Some(provider) = default_provider {
            info!(provider = provider.name(), "Registering default flag provider");
            api.set_provider(provider);
        }
        for (name, provider) in &providers {
            info!(client = %name, provider = provider.name(), "Registering named flag provider");
            api.set_named_provider(name, provider.clone());
        }

        let registry = ClientRegistry::new();
        registry.register(None, api.default_client());
        for name in providers.keys() {
            registry.register(Some(name), api.named_client(name));
        }

        let interceptor =
            EvaluationContextInterceptor::new(context_deriver).with_config(scope_config);

        Self {
            registry: Arc::new(registry),
            interceptor: Arc::new(interceptor),
            accessor: ContextAccessor::new(),
        }
    }

    /// Returns the client registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<ClientRegistry> {
        &self.registry
    }

    /// Resolves a client by token (`client:default`, `client:<name>`).
    ///
    /// # Errors
    ///
    /// Returns a `RegistryError` for malformed or unknown tokens.
    pub fn client(&self, token: &str) -> Result<Arc<dyn Client>, RegistryError> {
        self.registry.resolve(token)
    }

    /// Returns the default client.
    ///
    /// # Errors
    ///
    /// Never fails after `for_root`; kept fallible to mirror the registry.
    pub fn default_client(&self) -> Result<Arc<dyn Client>, RegistryError> {
        self.registry.default_client()
    }

    /// Returns the request interceptor.
    #[must_use]
    pub fn interceptor(&self) -> &Arc<EvaluationContextInterceptor<Req>> {
        &self.interceptor
    }

    /// Returns the request interceptor as a chain stage.
    #[must_use]
    pub fn interceptor_stage<Resp, E>(&self) -> Arc<dyn Interceptor<Req, Resp, E>>
    where
        Req: Send + Sync + Sized + 'static,
        Resp: Send + 'static,
        E: From<DerivationError> + Send + 'static,
    {
        self.interceptor.clone()
    }

    /// Returns the context accessor.
    #[must_use]
    pub const fn accessor(&self) -> &ContextAccessor {
        &self.accessor
    }
}

impl<Req: ?Sized> Clone for FlagScope<Req> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            interceptor: self.interceptor.clone(),
            accessor: self.accessor,
        }
    }
}
