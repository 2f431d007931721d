//! Configuration options for validation behavior

use crate::sanitize::SanitizeMode;
use serde::Deserialize;

/// Reserved rule-set key holding custom messages in the JSON schema form
pub const DEFAULT_MESSAGES_KEY: &str = "_messages";

// ============================================================================
// Validator Config
// ============================================================================

/// Configuration options for the model validator
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Sanitization applied to values whose rule set does not override it
    pub sanitize: SanitizeMode,

    /// Key reserved for custom messages when parsing JSON rule sets
    pub messages_key: String,

    /// Include attribute values in log events
    pub log_values: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            sanitize: SanitizeMode::default(),
            messages_key: DEFAULT_MESSAGES_KEY.to_string(),
            log_values: false,
        }
    }
}

impl ValidatorConfig {
    /// Create a new validator config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default sanitization mode
    pub fn sanitize(mut self, mode: SanitizeMode) -> Self {
        self.sanitize = mode;
        self
    }

    /// Sanitize every value, numbers and booleans included
    pub fn legacy_sanitize(self) -> Self {
        self.sanitize(SanitizeMode::All)
    }

    /// Set the reserved messages key
    pub fn messages_key(mut self, key: impl Into<String>) -> Self {
        self.messages_key = key.into();
        self
    }

    /// Include attribute values in log events
    pub fn log_values(mut self, log: bool) -> Self {
        self.log_values = log;
        self
    }
}
