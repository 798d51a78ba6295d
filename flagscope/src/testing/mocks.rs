//! Mock providers and clients for testing.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use crate::client::{
    Client, EvaluationDetails, FlagEvaluationOptions, Provider, ResolutionDetails,
};
use crate::context::EvaluationContext;

const STATIC_REASON: &str = "STATIC";
const DEFAULT_REASON: &str = "DEFAULT";
const FLAG_NOT_FOUND: &str = "FLAG_NOT_FOUND";

/// A provider serving fixed flag values and recording the contexts it sees.
#[derive(Debug, Default)]
pub struct StaticProvider {
    name: String,
    booleans: HashMap<String, bool>,
    strings: HashMap<String, String>,
    numbers: HashMap<String, f64>,
    objects: HashMap<String, serde_json::Value>,
    targets: Mutex<Vec<Option<String>>>,
}

impl StaticProvider {
    /// Creates a provider with no flags.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Adds a boolean flag.
    #[must_use]
    pub fn with_boolean(mut self, flag_key: impl Into<String>, value: bool) -> Self {
        self.booleans.insert(flag_key.into(), value);
        self
    }

    /// Adds a string flag.
    #[must_use]
    pub fn with_string(mut self, flag_key: impl Into<String>, value: impl Into<String>) -> Self {
        self.strings.insert(flag_key.into(), value.into());
        self
    }

    /// Adds a numeric flag.
    #[must_use]
    pub fn with_number(mut self, flag_key: impl Into<String>, value: f64) -> Self {
        self.numbers.insert(flag_key.into(), value);
        self
    }

    /// Adds a structured flag.
    #[must_use]
    pub fn with_object(mut self, flag_key: impl Into<String>, value: serde_json::Value) -> Self {
        self.objects.insert(flag_key.into(), value);
        self
    }

    /// Returns the targeting key of every context passed to a resolution.
    #[must_use]
    pub fn seen_targets(&self) -> Vec<Option<String>> {
        self.targets.lock().clone()
    }

    fn resolve<T: Clone>(
        &self,
        flags: &HashMap<String, T>,
        flag_key: &str,
        default_value: T,
        context: Option<&EvaluationContext>,
    ) -> ResolutionDetails<T> {
        self.targets
            .lock()
            .push(context.and_then(|c| c.targeting_key().map(String::from)));

        match flags.get(flag_key) {
            Some(value) => ResolutionDetails::new(value.clone()).with_reason(STATIC_REASON),
            None => ResolutionDetails::new(default_value)
                .with_reason(DEFAULT_REASON)
                .with_error_code(FLAG_NOT_FOUND),
        }
    }
}

#[async_trait]
impl Provider for StaticProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn resolve_boolean_evaluation(
        &self,
        flag_key: &str,
        default_value: bool,
        context: Option<&EvaluationContext>,
        _options: &FlagEvaluationOptions,
    ) -> ResolutionDetails<bool> {
        self.resolve(&self.booleans, flag_key, default_value, context)
    }

    async fn resolve_string_evaluation(
        &self,
        flag_key: &str,
        default_value: String,
        context: Option<&EvaluationContext>,
        _options: &FlagEvaluationOptions,
    ) -> ResolutionDetails<String> {
        self.resolve(&self.strings, flag_key, default_value, context)
    }

    async fn resolve_number_evaluation(
        &self,
        flag_key: &str,
        default_value: f64,
        context: Option<&EvaluationContext>,
        _options: &FlagEvaluationOptions,
    ) -> ResolutionDetails<f64> {
        self.resolve(&self.numbers, flag_key, default_value, context)
    }

    async fn resolve_object_evaluation(
        &self,
        flag_key: &str,
        default_value: serde_json::Value,
        context: Option<&EvaluationContext>,
        _options: &FlagEvaluationOptions,
    ) -> ResolutionDetails<serde_json::Value> {
        self.resolve(&self.objects, flag_key, default_value, context)
    }
}

/// A client that records each evaluation and delegates to an optional provider.
///
/// Without a provider every evaluation returns the default value.
pub struct RecordingClient {
    name: Option<String>,
    provider: Option<Arc<dyn Provider>>,
    evaluations: Mutex<Vec<(String, Option<String>)>>,
}

impl RecordingClient {
    /// Creates an unnamed (default) client.
    #[must_use]
    pub fn new(provider: Option<Arc<dyn Provider>>) -> Self {
        Self {
            name: None,
            provider,
            evaluations: Mutex::new(Vec::new()),
        }
    }

    /// Creates a client for a named provider.
    #[must_use]
    pub fn named(name: impl Into<String>, provider: Option<Arc<dyn Provider>>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::new(provider)
        }
    }

    /// Returns the name of the provider backing this client, if any.
    #[must_use]
    pub fn provider_name(&self) -> Option<&str> {
        self.provider.as_deref().map(Provider::name)
    }

    /// Returns `(flag_key, targeting_key)` for every evaluation so far.
    #[must_use]
    pub fn evaluations(&self) -> Vec<(String, Option<String>)> {
        self.evaluations.lock().clone()
    }

    /// Clears recorded evaluations.
    pub fn reset(&self) {
        self.evaluations.lock().clear();
    }

    fn record(&self, flag_key: &str, context: Option<&EvaluationContext>) {
        self.evaluations.lock().push((
            flag_key.to_string(),
            context.and_then(|c| c.targeting_key().map(String::from)),
        ));
    }
}

impl std::fmt::Debug for RecordingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingClient")
            .field("name", &self.name)
            .field("provider", &self.provider_name())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Client for RecordingClient {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    async fn get_boolean_details(
        &self,
        flag_key: &str,
        default_value: bool,
        context: Option<&EvaluationContext>,
        options: &FlagEvaluationOptions,
    ) -> EvaluationDetails<bool> {
        self.record(flag_key, context);
        let resolution = match &self.provider {
            Some(provider) => {
                provider
                    .resolve_boolean_evaluation(flag_key, default_value, context, options)
                    .await
            }
            None => ResolutionDetails::new(default_value).with_reason(DEFAULT_REASON),
        };
        EvaluationDetails::new(flag_key, resolution)
    }

    async fn get_string_details(
        &self,
        flag_key: &str,
        default_value: String,
        context: Option<&EvaluationContext>,
        options: &FlagEvaluationOptions,
    ) -> EvaluationDetails<String> {
        self.record(flag_key, context);
        let resolution = match &self.provider {
            Some(provider) => {
                provider
                    .resolve_string_evaluation(flag_key, default_value, context, options)
                    .await
            }
            None => ResolutionDetails::new(default_value).with_reason(DEFAULT_REASON),
        };
        EvaluationDetails::new(flag_key, resolution)
    }

    async fn get_number_details(
        &self,
        flag_key: &str,
        default_value: f64,
        context: Option<&EvaluationContext>,
        options: &FlagEvaluationOptions,
    ) -> EvaluationDetails<f64> {
        self.record(flag_key, context);
        let resolution = match &self.provider {
            Some(provider) => {
                provider
                    .resolve_number_evaluation(flag_key, default_value, context, options)
                    .await
            }
            None => ResolutionDetails::new(default_value).with_reason(DEFAULT_REASON),
        };
        EvaluationDetails::new(flag_key, resolution)
    }

    async fn get_object_details(
        &self,
        flag_key: &str,
        default_value: serde_json::Value,
        context: Option<&EvaluationContext>,
        options: &FlagEvaluationOptions,
    ) -> EvaluationDetails<serde_json::Value> {
        self.record(flag_key, context);
        let resolution = match &self.provider {
            Some(provider) => {
                provider
                    .resolve_object_evaluation(flag_key, default_value, context, options)
                    .await
            }
            None => ResolutionDetails::new(default_value).with_reason(DEFAULT_REASON),
        };
        EvaluationDetails::new(flag_key, resolution)
    }
}
