//! Evaluation options and results exchanged with providers.

use serde::{Deserialize, Serialize};

/// Per-evaluation options.
///
/// Carries nothing yet; evaluation hooks will be configured here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct FlagEvaluationOptions {}

impl FlagEvaluationOptions {
    /// Creates empty options.
    #[must_use]
    pub const fn new() -> Self {
        Self {}
    }
}

/// A provider's answer for one flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionDetails<T> {
    /// The resolved value.
    pub value: T,
    /// The variant that produced the value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    /// Why this value was chosen.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Set when resolution failed and `value` is a fallback.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl<T> ResolutionDetails<T> {
    /// Creates details carrying only a value.
    #[must_use]
    pub const fn new(value: T) -> Self {
        Self {
            value,
            variant: None,
            reason: None,
            error_code: None,
        }
    }

    /// Sets the variant.
    #[must_use]
    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = Some(variant.into());
        self
    }

    /// Sets the reason.
    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Sets the error code.
    #[must_use]
    pub fn with_error_code(mut self, error_code: impl Into<String>) -> Self {
        self.error_code = Some(error_code.into());
        self
    }

    /// Returns true if the provider reported an error.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.error_code.is_some()
    }
}

/// Resolution details annotated with the evaluated flag key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationDetails<T> {
    /// The evaluated flag.
    pub flag_key: String,
    /// The provider's resolution.
    #[serde(flatten)]
    pub resolution: ResolutionDetails<T>,
}

impl<T> EvaluationDetails<T> {
    /// Annotates a resolution with its flag key.
    #[must_use]
    pub fn new(flag_key: impl Into<String>, resolution: ResolutionDetails<T>) -> Self {
        Self {
            flag_key: flag_key.into(),
            resolution,
        }
    }

    /// Returns the resolved value.
    #[must_use]
    pub const fn value(&self) -> &T {
        &self.resolution.value
    }

    /// Unwraps into the resolved value.
    #[must_use]
    pub fn into_value(self) -> T {
        self.resolution.value
    }

    /// Returns the variant, if any.
    #[must_use]
    pub fn variant(&self) -> Option<&str> {
        self.resolution.variant.as_deref()
    }

    /// Returns the reason, if any.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        self.resolution.reason.as_deref()
    }

    /// Returns the error code, if any.
    #[must_use]
    pub fn error_code(&self) -> Option<&str> {
        self.resolution.error_code.as_deref()
    }
}
