//! Name-keyed registry of flag evaluation clients.

use super::Client;
use crate::errors::RegistryError;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Prefix shared by every client token.
pub const CLIENT_TOKEN_PREFIX: &str = "client:";

/// Name used in the token of the default client.
pub const DEFAULT_CLIENT_NAME: &str = "default";

/// Returns the lookup token for a client.
///
/// `None` and the empty name both map to `client:default`.
#[must_use]
pub fn client_token(name: Option<&str>) -> String {
    let name = name.filter(|n| !n.is_empty()).unwrap_or(DEFAULT_CLIENT_NAME);
    format!("{CLIENT_TOKEN_PREFIX}{name}")
}

/// Extracts the client name from a token.
///
/// # Errors
///
/// Returns `RegistryError::InvalidToken` if the token lacks the `client:`
/// prefix or names no client.
pub fn parse_client_token(token: &str) -> Result<&str, RegistryError> {
    match token.strip_prefix(CLIENT_TOKEN_PREFIX) {
        Some(name) if !name.is_empty() => Ok(name),
        _ => Err(RegistryError::invalid_token(token)),
    }
}

/// Registry mapping client tokens to client instances.
///
/// Registering a second client under the same token replaces the first.
#[derive(Default)]
pub struct ClientRegistry {
    clients: RwLock<HashMap<String, Arc<dyn Client>>>,
}

impl ClientRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a client under `client_token(name)` and returns the token.
    pub fn register(&self, name: Option<&str>, client: Arc<dyn Client>) -> String {
        let token = client_token(name);
        let previous = self.clients.write().insert(token.clone(), client);
        if previous.is_some() {
            warn!(token = %token, "Replaced previously registered client");
        } else {
            debug!(token = %token, "Registered client");
        }
        token
    }

    /// Resolves a client by token.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::InvalidToken` for malformed tokens and
    /// `RegistryError::UnknownClient` when nothing is registered.
    pub fn resolve(&self, token: &str) -> Result<Arc<dyn Client>, RegistryError> {
        parse_client_token(token)?;
        self.clients
            .read()
            .get(token)
            .cloned()
            .ok_or_else(|| RegistryError::unknown_client(token))
    }

    /// Resolves a client by name, `None` meaning the default client.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::UnknownClient` when nothing is registered.
    pub fn get(&self, name: Option<&str>) -> Result<Arc<dyn Client>, RegistryError> {
        self.resolve(&client_token(name))
    }

    /// Resolves the default client.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::UnknownClient` if no default client is registered.
    pub fn default_client(&self) -> Result<Arc<dyn Client>, RegistryError> {
        self.get(None)
    }

    /// Checks if a token is registered.
    #[must_use]
    pub fn contains(&self, token: &str) -> bool {
        self.clients.read().contains_key(token)
    }

    /// Lists registered tokens in sorted order.
    #[must_use]
    pub fn tokens(&self) -> Vec<String> {
        let mut tokens: Vec<String> = self.clients.read().keys().cloned().collect();
        tokens.sort();
        tokens
    }

    /// Returns the number of registered clients.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clients.read().len()
    }

    /// Returns true if no client is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clients.read().is_empty()
    }
}

impl std::fmt::Debug for ClientRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientRegistry")
            .field("tokens", &self.tokens())
            .finish()
    }
}
