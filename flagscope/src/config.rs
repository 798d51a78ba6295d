//! Configuration for request scoping.

use serde::{Deserialize, Serialize};

/// Controls how the evaluation context interceptor reports its work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeConfig {
    /// Log the derived context (as JSON) at debug level on scope entry.
    ///
    /// Contexts usually carry user attributes, so this is off by default.
    #[serde(default)]
    pub log_contexts: bool,
    /// Wrap each request scope in a `tracing` span carrying the branch id.
    #[serde(default = "default_trace_spans")]
    pub trace_spans: bool,
}

fn default_trace_spans() -> bool {
    true
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            log_contexts: false,
            trace_spans: default_trace_spans(),
        }
    }
}

impl ScopeConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables logging of derived contexts.
    #[must_use]
    pub const fn with_log_contexts(mut self, enabled: bool) -> Self {
        self.log_contexts = enabled;
        self
    }

    /// Enables or disables per-request tracing spans.
    #[must_use]
    pub const fn with_trace_spans(mut self, enabled: bool) -> Self {
        self.trace_spans = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ScopeConfig::default();
        assert!(!config.log_contexts);
        assert!(config.trace_spans);
    }

    #[test]
    fn test_deserialize_partial() {
        let config: ScopeConfig = serde_json::from_str(r#"{"log_contexts": true}"#).unwrap();
        assert!(config.log_contexts);
        assert!(config.trace_spans);

        let config: ScopeConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ScopeConfig::default());
    }

    #[test]
    fn test_builder() {
        let config = ScopeConfig::new()
            .with_log_contexts(true)
            .with_trace_spans(false);
        assert!(config.log_contexts);
        assert!(!config.trace_spans);
    }
}
