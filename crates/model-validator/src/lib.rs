//! Model Validator
//!
//! Asynchronous validation of attribute bags against declarative schemas.
//!
//! A schema maps attribute names to rule sets. Each rule set lists named
//! rules: built-ins from a [`RuleLibrary`] (`notEmpty`, `isInt`, `len`, ...)
//! or custom, possibly asynchronous, rules that may also rewrite the value.
//! Every selected attribute is sanitized and checked concurrently, and the
//! outcome is either all validated values or one [`InvalidProperties`] error
//! listing every failed rule of every invalid attribute.
//!
//! # Modules
//!
//! - [`model`](mod@model): attribute selection, fan-out and aggregation
//! - [`property`]: per-attribute rule dispatch
//! - [`schema`]: rule sets, JSON parsing and compilation
//! - [`rules`] / [`formats`]: built-in rule library
//! - [`custom`]: custom rule traits and the shared value slot
//! - [`sanitize`](mod@sanitize): entity-encode and trim pipeline
//!
//! # Example
//!
//! ```
//! use model_validator::ModelValidator;
//! use serde_json::json;
//!
//! # futures::executor::block_on(async {
//! let result = ModelValidator::new()
//!     .validate_json(
//!         &json!({"aString": "abc", "aNumber": 123, "aStringWithWrongValue": 123}),
//!         &json!({
//!             "aString": {"notEmpty": null},
//!             "aNumber": {"isInt": null},
//!             "aStringWithWrongValue": {"isAlpha": null}
//!         }),
//!     )
//!     .await;
//!
//! let err = result.unwrap_err();
//! let invalid = err.as_invalid().unwrap();
//! assert_eq!(invalid.message(), "1 properties invalid: aStringWithWrongValue");
//! assert_eq!(
//!     invalid.to_json(),
//!     json!({"aStringWithWrongValue": {"isAlpha": "Invalid characters"}})
//! );
//! # });
//! ```

pub mod config;
pub mod custom;
pub mod errors;
pub mod formats;
pub mod model;
pub mod property;
pub mod rules;
pub mod sanitize;
pub mod schema;
pub mod types;

// Re-export commonly used types
pub use config::ValidatorConfig;
pub use custom::{
    BoxedCustomRule, CustomResult, CustomRule, FnCustomRule, SyncCustomRule, ValueSlot,
};
pub use errors::{
    ErrorMap, InvalidProperties, RuleFailure, SchemaError, ValidatorError, ValidatorResult,
};
pub use model::{validate, ModelValidator};
pub use property::PropertyValidator;
pub use rules::{standard_library, BuiltinRule, FnRule, RuleLibrary};
pub use sanitize::{sanitize, SanitizeMode};
pub use schema::{CompiledRuleSet, CompiledSchema, RuleArgs, RuleSet, RuleSpec, Schema};
pub use types::{Attributes, ValidatedValues, Value};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
