//! Provider interfaces implemented by flag backends.
//!
//! A [`Provider`] resolves flags against the evaluation context directly. A
//! [`TransformingProvider`] first maps the context into its own type and is
//! adapted to [`Provider`] by [`TransformedProvider`].

use super::{FlagEvaluationOptions, ResolutionDetails};
use crate::context::EvaluationContext;
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;

/// A flag backend or vendor integration.
///
/// Resolution failures are reported through
/// [`ResolutionDetails::error_code`] with the default value as `value`.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Returns the provider's name.
    fn name(&self) -> &str;

    /// Resolves a boolean flag.
    async fn resolve_boolean_evaluation(
        &self,
        flag_key: &str,
        default_value: bool,
        context: Option<&EvaluationContext>,
        options: &FlagEvaluationOptions,
    ) -> ResolutionDetails<bool>;

    /// Resolves a string flag.
    async fn resolve_string_evaluation(
        &self,
        flag_key: &str,
        default_value: String,
        context: Option<&EvaluationContext>,
        options: &FlagEvaluationOptions,
    ) -> ResolutionDetails<String>;

    /// Resolves a numeric flag.
    async fn resolve_number_evaluation(
        &self,
        flag_key: &str,
        default_value: f64,
        context: Option<&EvaluationContext>,
        options: &FlagEvaluationOptions,
    ) -> ResolutionDetails<f64>;

    /// Resolves a structured flag.
    async fn resolve_object_evaluation(
        &self,
        flag_key: &str,
        default_value: serde_json::Value,
        context: Option<&EvaluationContext>,
        options: &FlagEvaluationOptions,
    ) -> ResolutionDetails<serde_json::Value>;
}

/// Maps an evaluation context into a provider's own targeting representation.
///
/// Closures of the form `Fn(&EvaluationContext) -> impl Future<Output = T>`
/// are transformers.
pub trait ContextTransformer<T>: Send + Sync {
    /// Transforms `context`.
    fn transform<'a>(&'a self, context: &'a EvaluationContext) -> BoxFuture<'a, T>;
}

impl<T, F, Fut> ContextTransformer<T> for F
where
    F: Fn(&EvaluationContext) -> Fut + Send + Sync,
    Fut: Future<Output = T> + Send + 'static,
{
    fn transform<'a>(&'a self, context: &'a EvaluationContext) -> BoxFuture<'a, T> {
        Box::pin(self(context))
    }
}

/// A provider that resolves flags against a transformed context of type `T`.
///
/// The transformation runs immediately before every resolution. Wrap the
/// provider in a [`TransformedProvider`] to register it as a [`Provider`].
#[async_trait]
pub trait TransformingProvider<T>: Send + Sync
where
    T: Send + Sync + 'static,
{
    /// Returns the provider's name.
    fn name(&self) -> &str;

    /// Maps the evaluation context into `T`.
    async fn transform_context(&self, context: &EvaluationContext) -> T;

    /// Resolves a boolean flag.
    async fn resolve_boolean_evaluation(
        &self,
        flag_key: &str,
        default_value: bool,
        context: Option<&T>,
        options: &FlagEvaluationOptions,
    ) -> ResolutionDetails<bool>;

    /// Resolves a string flag.
    async fn resolve_string_evaluation(
        &self,
        flag_key: &str,
        default_value: String,
        context: Option<&T>,
        options: &FlagEvaluationOptions,
    ) -> ResolutionDetails<String>;

    /// Resolves a numeric flag.
    async fn resolve_number_evaluation(
        &self,
        flag_key: &str,
        default_value: f64,
        context: Option<&T>,
        options: &FlagEvaluationOptions,
    ) -> ResolutionDetails<f64>;

    /// Resolves a structured flag.
    async fn resolve_object_evaluation(
        &self,
        flag_key: &str,
        default_value: serde_json::Value,
        context: Option<&T>,
        options: &FlagEvaluationOptions,
    ) -> ResolutionDetails<serde_json::Value>;
}

/// Adapts a [`TransformingProvider`] to the [`Provider`] interface.
///
/// Each resolution first transforms the context, using the override set with
/// [`TransformedProvider::with_transformer`] if any, and the provider's own
/// `transform_context` otherwise. A missing context stays missing.
pub struct TransformedProvider<P, T> {
    inner: P,
    transformer: Option<Arc<dyn ContextTransformer<T>>>,
}

impl<P, T> TransformedProvider<P, T>
where
    P: TransformingProvider<T>,
    T: Send + Sync + 'static,
{
    /// Wraps `inner`.
    #[must_use]
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            transformer: None,
        }
    }

    /// Replaces the provider's own transformation.
    #[must_use]
    pub fn with_transformer(mut self, transformer: impl ContextTransformer<T> + 'static) -> Self {
        self.transformer = Some(Arc::new(transformer));
        self
    }

    /// Returns the wrapped provider.
    #[must_use]
    pub const fn inner(&self) -> &P {
        &self.inner
    }

    async fn transform(&self, context: Option<&EvaluationContext>) -> Option<T> {
        let context = context?;
        Some(match &self.transformer {
            Some(transformer) => transformer.transform(context).await,
            None => self.inner.transform_context(context).await,
        })
    }
}

impl<P, T> std::fmt::Debug for TransformedProvider<P, T>
where
    P: TransformingProvider<T>,
    T: Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformedProvider")
            .field("name", &self.inner.name())
            .field("has_transformer", &self.transformer.is_some())
            .finish()
    }
}

#[async_trait]
impl<P, T> Provider for TransformedProvider<P, T>
where
    P: TransformingProvider<T>,
    T: Send + Sync + 'static,
{
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn resolve_boolean_evaluation(
        &self,
        flag_key: &str,
        default_value: bool,
        context: Option<&EvaluationContext>,
        options: &FlagEvaluationOptions,
    ) -> ResolutionDetails<bool> {
        let transformed = self.transform(context).await;
        self.inner
            .resolve_boolean_evaluation(flag_key, default_value, transformed.as_ref(), options)
            .await
    }

    async fn resolve_string_evaluation(
        &self,
        flag_key: &str,
        default_value: String,
        context: Option<&EvaluationContext>,
        options: &FlagEvaluationOptions,
    ) -> ResolutionDetails<String> {
        let transformed = self.transform(context).await;
        self.inner
            .resolve_string_evaluation(flag_key, default_value, transformed.as_ref(), options)
            .await
    }

    async fn resolve_number_evaluation(
        &self,
        flag_key: &str,
        default_value: f64,
        context: Option<&EvaluationContext>,
        options: &FlagEvaluationOptions,
    ) -> ResolutionDetails<f64> {
        let transformed = self.transform(context).await;
        self.inner
            .resolve_number_evaluation(flag_key, default_value, transformed.as_ref(), options)
            .await
    }

    async fn resolve_object_evaluation(
        &self,
        flag_key: &str,
        default_value: serde_json::Value,
        context: Option<&EvaluationContext>,
        options: &FlagEvaluationOptions,
    ) -> ResolutionDetails<serde_json::Value> {
        let transformed = self.transform(context).await;
        self.inner
            .resolve_object_evaluation(flag_key, default_value, transformed.as_ref(), options)
            .await
    }
}
