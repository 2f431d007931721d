//! Validation error types
//!
//! Rule failures never surface as Rust errors on their own: they are recorded
//! per attribute and, once every attribute has been checked, reported together
//! as one [`InvalidProperties`] error. [`ValidatorError`] separates that
//! expected outcome from defects such as a malformed schema.

use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Per-attribute error map: rule name to message
pub type ErrorMap = BTreeMap<String, String>;

/// Result type for model validation
pub type ValidatorResult<T> = Result<T, ValidatorError>;

// ============================================================================
// Rule Failure
// ============================================================================

/// A single failed rule on one attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleFailure {
    /// Rule name (built-in or custom)
    pub rule: String,
    /// Human-readable message
    pub message: String,
}

impl RuleFailure {
    pub fn new(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for RuleFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.rule, self.message)
    }
}

// ============================================================================
// Aggregate Error
// ============================================================================

/// Every invalid attribute of one model validation, with all its failed rules
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidProperties {
    errors: BTreeMap<String, ErrorMap>,
    message: String,
}

impl InvalidProperties {
    /// Build from `(attribute, error map)` pairs; a repeated attribute keeps the last map
    pub fn new(failures: impl IntoIterator<Item = (String, ErrorMap)>) -> Self {
        let errors: BTreeMap<String, ErrorMap> = failures.into_iter().collect();
        let names: Vec<&str> = errors.keys().map(String::as_str).collect();
        let message = format!("{} properties invalid: {}", errors.len(), names.join(", "));
        Self { errors, message }
    }

    /// Structured form: attribute to rule to message
    pub fn errors(&self) -> &BTreeMap<String, ErrorMap> {
        &self.errors
    }

    /// Error map of one attribute
    pub fn get(&self, attribute: &str) -> Option<&ErrorMap> {
        self.errors.get(attribute)
    }

    /// Is `attribute` invalid
    pub fn contains(&self, attribute: &str) -> bool {
        self.errors.contains_key(attribute)
    }

    /// Number of invalid attributes
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// More than one attribute is invalid
    pub fn multiple(&self) -> bool {
        self.errors.len() > 1
    }

    /// Summary, e.g. `2 properties invalid: age, name`
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Flattened list of every failure
    pub fn failures(&self) -> Vec<(&str, RuleFailure)> {
        self.errors
            .iter()
            .flat_map(|(attribute, rules)| {
                rules
                    .iter()
                    .map(move |(rule, message)| (attribute.as_str(), RuleFailure::new(rule, message)))
            })
            .collect()
    }

    /// Plain JSON map `{ attribute: { rule: message } }`
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.errors).unwrap_or_default()
    }

    pub fn into_errors(self) -> BTreeMap<String, ErrorMap> {
        self.errors
    }
}

impl fmt::Display for InvalidProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for InvalidProperties {}

impl Serialize for InvalidProperties {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.errors.serialize(serializer)
    }
}

// ============================================================================
// Schema Errors
// ============================================================================

/// Malformed schema or rule set
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Schema must be an object of rule sets")]
    NotAnObject,

    #[error("Rule set for '{0}' must be an object")]
    RuleSetNotAnObject(String),

    #[error("Messages for '{0}' must be an object of strings")]
    InvalidMessages(String),

    #[error("Unknown sanitize mode for '{attribute}': {mode}")]
    InvalidSanitize { attribute: String, mode: String },

    #[error("Invalid arguments for rule '{rule}' on '{attribute}': {reason}")]
    InvalidArguments {
        attribute: String,
        rule: String,
        reason: String,
    },
}

// ============================================================================
// Validator Errors
// ============================================================================

/// Errors returned by the model validator
#[derive(Error, Debug)]
pub enum ValidatorError {
    /// One or more attributes failed their rules
    #[error(transparent)]
    Invalid(#[from] InvalidProperties),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Invalid attributes: {0}")]
    Attributes(String),
}

impl ValidatorError {
    /// Is this a validation failure (as opposed to a defect)
    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid(_))
    }

    pub fn as_invalid(&self) -> Option<&InvalidProperties> {
        match self {
            Self::Invalid(invalid) => Some(invalid),
            _ => None,
        }
    }

    pub fn into_invalid(self) -> Option<InvalidProperties> {
        match self {
            Self::Invalid(invalid) => Some(invalid),
            _ => None,
        }
    }
}
