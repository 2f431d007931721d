//! Model-level validation
//!
//! The [`ModelValidator`] selects the attributes to check, validates all of
//! them concurrently and reports either every sanitized value or every
//! failure at once.
//!
//! # Example
//!
//! ```
//! use model_validator::{Attributes, ModelValidator, RuleSet, Schema, Value};
//!
//! # futures::executor::block_on(async {
//! let mut attributes = Attributes::new();
//! attributes.insert("name".to_string(), Value::from("  Ada "));
//!
//! let schema = Schema::new()
//!     .attribute("name", RuleSet::new().rule("notEmpty"))
//!     .attribute("nickname", RuleSet::new().required(false).rule("isAlpha"));
//!
//! let values = ModelValidator::new().validate(&attributes, &schema).await.unwrap();
//! assert_eq!(values.get("name"), Some(&Value::from("Ada")));
//! assert!(!values.contains_key("nickname"));
//! # });
//! ```

use crate::config::ValidatorConfig;
use crate::errors::{InvalidProperties, SchemaError, ValidatorError, ValidatorResult};
use crate::property::PropertyValidator;
use crate::rules::{standard_library, RuleLibrary};
use crate::schema::{CompiledSchema, Schema};
use crate::types::{Attributes, ValidatedValues, Value};
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, debug_span, info, Instrument};

// ============================================================================
// Model Validator
// ============================================================================

/// Validates attribute bags against schemas
#[derive(Debug, Clone)]
pub struct ModelValidator {
    library: Arc<RuleLibrary>,
    config: ValidatorConfig,
}

impl Default for ModelValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelValidator {
    /// Validator with the standard rule library and default config
    pub fn new() -> Self {
        Self {
            library: standard_library(),
            config: ValidatorConfig::default(),
        }
    }

    /// Use a different rule library
    pub fn with_library(mut self, library: impl Into<Arc<RuleLibrary>>) -> Self {
        self.library = library.into();
        self
    }

    /// Use a different configuration
    pub fn with_config(mut self, config: ValidatorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn library(&self) -> &RuleLibrary {
        &self.library
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Compile a schema against this validator's library
    pub fn compile(&self, schema: &Schema) -> Result<CompiledSchema, SchemaError> {
        schema.compile(&self.library)
    }

    /// Validate `attributes` against `schema`.
    ///
    /// Returns the sanitized value of every selected attribute, or
    /// [`ValidatorError::Invalid`] listing every attribute that failed.
    pub async fn validate(
        &self,
        attributes: &Attributes,
        schema: &Schema,
    ) -> ValidatorResult<ValidatedValues> {
        let compiled = self.compile(schema)?;
        self.validate_compiled(attributes, &compiled).await
    }

    /// Validate against an already compiled schema
    pub async fn validate_compiled(
        &self,
        attributes: &Attributes,
        schema: &CompiledSchema,
    ) -> ValidatorResult<ValidatedValues> {
        let span = debug_span!("model_validate", attributes = schema.len());
        self.run(attributes, schema).instrument(span).await
    }

    /// Validate a JSON object against a JSON schema
    pub async fn validate_json(
        &self,
        attributes: &serde_json::Value,
        schema: &serde_json::Value,
    ) -> ValidatorResult<ValidatedValues> {
        let object = attributes.as_object().ok_or_else(|| {
            ValidatorError::Attributes(format!("expected a JSON object, got {}", attributes))
        })?;
        let attributes: Attributes = object
            .iter()
            .map(|(name, value)| (name.clone(), Value::from(value.clone())))
            .collect();

        let schema = Schema::from_json_with_key(schema, &self.config.messages_key)?;
        self.validate(&attributes, &schema).await
    }

    async fn run(
        &self,
        attributes: &Attributes,
        schema: &CompiledSchema,
    ) -> ValidatorResult<ValidatedValues> {
        let tasks: Vec<_> = schema
            .iter()
            .filter_map(|(name, rules)| {
                let value = attributes.get(name).filter(|v| !v.is_null());
                if !rules.is_required() && value.is_none() {
                    debug!(attribute = name, "skipping optional attribute");
                    return None;
                }

                let raw = value.cloned().unwrap_or_default();
                let property = PropertyValidator::new(name, raw, Arc::clone(rules), self.config.sanitize)
                    .log_values(self.config.log_values);
                Some(property.validate())
            })
            .collect();

        let mut values = ValidatedValues::with_capacity(tasks.len());
        let mut failures = Vec::new();

        for property in join_all(tasks).await {
            match property.into_outcome() {
                (name, _, Some(errors)) if !errors.is_empty() => failures.push((name, errors)),
                (name, value, _) => {
                    values.insert(name, value);
                }
            }
        }

        if failures.is_empty() {
            return Ok(values);
        }

        let invalid = InvalidProperties::new(failures);
        info!(invalid = invalid.len(), "{}", invalid.message());
        Err(invalid.into())
    }
}

/// Validate with the standard rule library and default config
pub async fn validate(attributes: &Attributes, schema: &Schema) -> ValidatorResult<ValidatedValues> {
    ModelValidator::new().validate(attributes, schema).await
}
