//! Evaluation context passed to flag providers.

use crate::errors::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Reserved attribute key identifying the evaluation subject.
pub const TARGETING_KEY: &str = "targetingKey";

/// A primitive-or-date attribute value.
///
/// Timestamps are written as RFC 3339 strings and read back as
/// [`ContextValue::String`]; JSON strings always deserialize as strings.
/// Use [`ContextValue::as_datetime`] to read either form as a timestamp.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ContextValue {
    /// A boolean attribute.
    Bool(bool),
    /// A numeric attribute.
    Number(f64),
    /// A timestamp attribute, serialized as RFC 3339.
    DateTime(DateTime<Utc>),
    /// A string attribute.
    String(String),
}

impl ContextValue {
    /// Returns the value as a string slice if it is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as a bool if it is a bool.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the value as a number if it is a number.
    #[must_use]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the value as a timestamp, parsing RFC 3339 strings.
    #[must_use]
    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::DateTime(d) => Some(*d),
            Self::String(s) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|d| d.with_timezone(&Utc)),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for ContextValue {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Bool(bool),
            Number(f64),
            String(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Bool(b) => Self::Bool(b),
            Raw::Number(n) => Self::Number(n),
            Raw::String(s) => Self::String(s),
        })
    }
}

impl fmt::Display for ContextValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::DateTime(d) => write!(f, "{}", d.to_rfc3339()),
            Self::String(s) => f.write_str(s),
        }
    }
}

impl From<bool> for ContextValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for ContextValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for ContextValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<u32> for ContextValue {
    fn from(value: u32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<DateTime<Utc>> for ContextValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::DateTime(value)
    }
}

impl From<String> for ContextValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for ContextValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

/// Attributes describing the subject of a flag evaluation.
///
/// Built once per request by a context deriver and shared read-only with
/// everything that runs inside the request's scope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationContext {
    /// Identifies the subject (end user or client service) of an evaluation.
    #[serde(
        rename = "targetingKey",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    targeting_key: Option<String>,

    #[serde(flatten)]
    attributes: BTreeMap<String, ContextValue>,
}

impl EvaluationContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context for the given subject.
    #[must_use]
    pub fn for_target(targeting_key: impl Into<String>) -> Self {
        Self::new().with_targeting_key(targeting_key)
    }

    /// Sets the targeting key.
    #[must_use]
    pub fn with_targeting_key(mut self, targeting_key: impl Into<String>) -> Self {
        self.targeting_key = Some(targeting_key.into());
        self
    }

    /// Adds an attribute.
    ///
    /// The reserved `targetingKey` name sets the targeting key instead.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<ContextValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Inserts an attribute, returning the previous value for that key.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ContextValue>,
    ) -> Option<ContextValue> {
        let key = key.into();
        let value = value.into();
        if key == TARGETING_KEY {
            return self
                .targeting_key
                .replace(value.to_string())
                .map(ContextValue::String);
        }
        self.attributes.insert(key, value)
    }

    /// Returns the targeting key, if set.
    #[must_use]
    pub fn targeting_key(&self) -> Option<&str> {
        self.targeting_key.as_deref()
    }

    /// Gets an attribute by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        self.attributes.get(key)
    }

    /// Checks if an attribute exists.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    /// Iterates over attributes in key order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &ContextValue)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the number of attributes, excluding the targeting key.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Returns true if there is neither a targeting key nor any attribute.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targeting_key.is_none() && self.attributes.is_empty()
    }

    /// Converts to a JSON object.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Builds a context from a JSON object.
    ///
    /// A `targetingKey` member becomes the targeting key; every other member
    /// must be a boolean, number or string.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }
}
