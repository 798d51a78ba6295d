//! Flag evaluation client interface and ambient-context evaluation.

use super::{EvaluationDetails, FlagEvaluationOptions};
use crate::context::{ContextAccessor, EvaluationContext};
use async_trait::async_trait;

/// A flag evaluation client bound to one provider.
///
/// Implemented by the evaluation subsystem. Every `get_*` call takes the
/// context explicitly; [`ContextualClient`] reads it from the request scope
/// instead.
#[async_trait]
pub trait Client: Send + Sync {
    /// Returns the client's name, if it was created for a named provider.
    fn name(&self) -> Option<&str>;

    /// Returns the client's version, if known.
    fn version(&self) -> Option<&str> {
        None
    }

    /// Evaluates a boolean flag with details.
    async fn get_boolean_details(
        &self,
        flag_key: &str,
        default_value: bool,
        context: Option<&EvaluationContext>,
        options: &FlagEvaluationOptions,
    ) -> EvaluationDetails<bool>;

    /// Evaluates a string flag with details.
    async fn get_string_details(
        &self,
        flag_key: &str,
        default_value: String,
        context: Option<&EvaluationContext>,
        options: &FlagEvaluationOptions,
    ) -> EvaluationDetails<String>;

    /// Evaluates a numeric flag with details.
    async fn get_number_details(
        &self,
        flag_key: &str,
        default_value: f64,
        context: Option<&EvaluationContext>,
        options: &FlagEvaluationOptions,
    ) -> EvaluationDetails<f64>;

    /// Evaluates a structured flag with details.
    async fn get_object_details(
        &self,
        flag_key: &str,
        default_value: serde_json::Value,
        context: Option<&EvaluationContext>,
        options: &FlagEvaluationOptions,
    ) -> EvaluationDetails<serde_json::Value>;

    /// Evaluates a boolean flag.
    async fn get_boolean_value(
        &self,
        flag_key: &str,
        default_value: bool,
        context: Option<&EvaluationContext>,
        options: &FlagEvaluationOptions,
    ) -> bool {
        self.get_boolean_details(flag_key, default_value, context, options)
            .await
            .into_value()
    }

    /// Evaluates a string flag.
    async fn get_string_value(
        &self,
        flag_key: &str,
        default_value: String,
        context: Option<&EvaluationContext>,
        options: &FlagEvaluationOptions,
    ) -> String {
        self.get_string_details(flag_key, default_value, context, options)
            .await
            .into_value()
    }

    /// Evaluates a numeric flag.
    async fn get_number_value(
        &self,
        flag_key: &str,
        default_value: f64,
        context: Option<&EvaluationContext>,
        options: &FlagEvaluationOptions,
    ) -> f64 {
        self.get_number_details(flag_key, default_value, context, options)
            .await
            .into_value()
    }

    /// Evaluates a structured flag.
    async fn get_object_value(
        &self,
        flag_key: &str,
        default_value: serde_json::Value,
        context: Option<&EvaluationContext>,
        options: &FlagEvaluationOptions,
    ) -> serde_json::Value {
        self.get_object_details(flag_key, default_value, context, options)
            .await
            .into_value()
    }
}

/// Evaluation against the ambient request context.
///
/// Each method reads the context of the request the caller is part of and
/// evaluates with it, or with no context outside a request scope.
#[async_trait]
pub trait ContextualClient: Client {
    /// Evaluates a boolean flag in the current request's context.
    async fn boolean_value_in_scope(&self, flag_key: &str, default_value: bool) -> bool {
        let context = ContextAccessor::new().get_context();
        self.get_boolean_value(
            flag_key,
            default_value,
            context.as_deref(),
            &FlagEvaluationOptions::new(),
        )
        .await
    }

    /// Evaluates a string flag in the current request's context.
    async fn string_value_in_scope(&self, flag_key: &str, default_value: String) -> String {
        let context = ContextAccessor::new().get_context();
        self.get_string_value(
            flag_key,
            default_value,
            context.as_deref(),
            &FlagEvaluationOptions::new(),
        )
        .await
    }

    /// Evaluates a numeric flag in the current request's context.
    async fn number_value_in_scope(&self, flag_key: &str, default_value: f64) -> f64 {
        let context = ContextAccessor::new().get_context();
        self.get_number_value(
            flag_key,
            default_value,
            context.as_deref(),
            &FlagEvaluationOptions::new(),
        )
        .await
    }

    /// Evaluates a structured flag in the current request's context.
    async fn object_value_in_scope(
        &self,
        flag_key: &str,
        default_value: serde_json::Value,
    ) -> serde_json::Value {
        let context = ContextAccessor::new().get_context();
        self.get_object_value(
            flag_key,
            default_value,
            context.as_deref(),
            &FlagEvaluationOptions::new(),
        )
        .await
    }

    /// Evaluates a boolean flag with details in the current request's context.
    async fn boolean_details_in_scope(
        &self,
        flag_key: &str,
        default_value: bool,
    ) -> EvaluationDetails<bool> {
        let context = ContextAccessor::new().get_context();
        self.get_boolean_details(
            flag_key,
            default_value,
            context.as_deref(),
            &FlagEvaluationOptions::new(),
        )
        .await
    }
}

impl<C: Client + ?Sized> ContextualClient for C {}
