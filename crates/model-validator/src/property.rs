//! Property-level validation
//!
//! A [`PropertyValidator`] checks one attribute value against its compiled
//! rule set. Every rule runs, even after an earlier one failed, and each
//! failure is recorded in the validator's error map instead of being returned
//! as an error.

use crate::custom::ValueSlot;
use crate::errors::ErrorMap;
use crate::sanitize::SanitizeMode;
use crate::schema::{CompiledRuleSet, RuleSpec};
use crate::types::Value;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, trace};

/// Validates a single attribute
#[derive(Debug, Clone)]
pub struct PropertyValidator {
    name: String,
    value: Value,
    rules: Arc<CompiledRuleSet>,
    sanitize: SanitizeMode,
    errors: Option<ErrorMap>,
    log_values: bool,
}

impl PropertyValidator {
    /// Create a validator for `name` holding the raw (unsanitized) value.
    ///
    /// `default_sanitize` applies unless the rule set overrides it.
    pub fn new(
        name: impl Into<String>,
        value: Value,
        rules: Arc<CompiledRuleSet>,
        default_sanitize: SanitizeMode,
    ) -> Self {
        let sanitize = rules.sanitize_mode(default_sanitize);
        Self {
            name: name.into(),
            value,
            rules,
            sanitize,
            errors: None,
            log_values: false,
        }
    }

    /// Include the final value in the completion log event
    pub fn log_values(mut self, log: bool) -> Self {
        self.log_values = log;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current value: raw before [`validate`](Self::validate), final afterwards
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Failed rules; `None` until the first failure
    pub fn errors(&self) -> Option<&ErrorMap> {
        self.errors.as_ref()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.as_ref().map_or(true, ErrorMap::is_empty)
    }

    /// Split into name, final value and error map
    pub fn into_outcome(self) -> (String, Value, Option<ErrorMap>) {
        (self.name, self.value, self.errors)
    }

    /// Sanitize the value and run every rule.
    ///
    /// Built-in rules see the sanitized value. Custom rules then run
    /// concurrently, sharing one [`ValueSlot`]; its content once they have all
    /// settled becomes the final value.
    pub async fn validate(mut self) -> Self {
        let raw = std::mem::take(&mut self.value);
        self.value = self.sanitize.apply(raw);

        let rules = Arc::clone(&self.rules);
        let text = self.value.to_text();
        let mut customs = Vec::new();

        for spec in rules.rules() {
            match spec {
                RuleSpec::BuiltIn { name, args, rule } => {
                    if let Err(default_message) = rule.check(&text, args) {
                        self.record(name, default_message);
                    }
                }
                RuleSpec::Custom { name, rule } => customs.push((name.as_str(), rule)),
            }
        }

        if !customs.is_empty() {
            let slot = ValueSlot::new(std::mem::take(&mut self.value));
            let outcomes = join_all(customs.into_iter().map(|(name, rule)| {
                let slot = slot.clone();
                async move { (name, rule.check(slot).await) }
            }))
            .await;
            self.value = slot.take();

            for (name, outcome) in outcomes {
                match outcome {
                    Ok(true) => {}
                    Ok(false) => self.record(name, String::new()),
                    Err(err) => self.record(name, err.to_string()),
                }
            }
        }

        if self.log_values {
            debug!(
                attribute = %self.name,
                failed = self.errors.as_ref().map_or(0, ErrorMap::len),
                value = ?self.value,
                "property validated"
            );
        } else {
            debug!(
                attribute = %self.name,
                failed = self.errors.as_ref().map_or(0, ErrorMap::len),
                "property validated"
            );
        }

        self
    }

    /// Record a failure; a configured message for `rule` replaces `fallback`
    fn record(&mut self, rule: &str, fallback: String) {
        let message = self
            .rules
            .message(rule)
            .map(str::to_string)
            .unwrap_or(fallback);
        trace!(attribute = %self.name, rule, message = %message, "rule failed");
        self.errors
            .get_or_insert_with(ErrorMap::new)
            .insert(rule.to_string(), message);
    }
}
