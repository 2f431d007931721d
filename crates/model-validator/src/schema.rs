//! Schemas and rule sets
//!
//! A [`Schema`] maps attribute names to [`RuleSet`]s. Rule sets are written
//! declaratively (builder or JSON) and compiled once against a
//! [`RuleLibrary`], which resolves every rule name into a [`RuleSpec`].
//!
//! # Example
//!
//! ```
//! use model_validator::schema::{RuleSet, Schema};
//! use model_validator::rules::RuleLibrary;
//!
//! let schema = Schema::new()
//!     .attribute("name", RuleSet::new().rule("notEmpty").rule_with("len", vec![2, 32]))
//!     .attribute(
//!         "nickname",
//!         RuleSet::new().required(false).rule("isAlpha").message("isAlpha", "letters only"),
//!     );
//!
//! let compiled = schema.compile(&RuleLibrary::standard()).unwrap();
//! assert_eq!(compiled.len(), 2);
//! ```

use crate::config::DEFAULT_MESSAGES_KEY;
use crate::custom::{BoxedCustomRule, CustomRule};
use crate::errors::SchemaError;
use crate::rules::{BoxedRule, RuleLibrary};
use crate::sanitize::SanitizeMode;
use crate::types::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

const REQUIRED_KEY: &str = "required";
const SANITIZE_KEY: &str = "sanitize";

// ============================================================================
// Rule Arguments
// ============================================================================

/// Arguments of a built-in rule as written in a rule set
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RuleArgs {
    /// No arguments
    #[default]
    None,
    /// A single argument
    One(Value),
    /// Several arguments, passed to the rule in order
    Many(Vec<Value>),
}

impl RuleArgs {
    /// Flatten into the argument list handed to the rule
    pub fn into_vec(self) -> Vec<Value> {
        match self {
            Self::None => Vec::new(),
            Self::One(value) => vec![value],
            Self::Many(values) => values,
        }
    }

    /// JSON form: `null` means no arguments, an array is spread
    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::None,
            serde_json::Value::Array(items) => {
                Self::Many(items.iter().cloned().map(Value::from).collect())
            }
            other => Self::One(Value::from(other.clone())),
        }
    }
}

impl From<Value> for RuleArgs {
    fn from(value: Value) -> Self {
        Self::One(value)
    }
}

impl From<&str> for RuleArgs {
    fn from(value: &str) -> Self {
        Self::One(value.into())
    }
}

impl From<String> for RuleArgs {
    fn from(value: String) -> Self {
        Self::One(value.into())
    }
}

impl From<i64> for RuleArgs {
    fn from(value: i64) -> Self {
        Self::One(value.into())
    }
}

impl From<i32> for RuleArgs {
    fn from(value: i32) -> Self {
        Self::One(value.into())
    }
}

impl From<f64> for RuleArgs {
    fn from(value: f64) -> Self {
        Self::One(value.into())
    }
}

impl<T: Into<Value>> From<Vec<T>> for RuleArgs {
    fn from(values: Vec<T>) -> Self {
        Self::Many(values.into_iter().map(Into::into).collect())
    }
}

// ============================================================================
// Rule Set
// ============================================================================

/// One entry of a rule set before compilation
#[derive(Clone)]
pub enum RuleDef {
    /// Arguments for a rule looked up in the library by name
    Args(RuleArgs),
    /// A custom rule
    Custom(BoxedCustomRule),
}

impl fmt::Debug for RuleDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Args(args) => f.debug_tuple("Args").field(args).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Rules for one attribute, plus custom messages and the `required` flag
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<(String, RuleDef)>,
    messages: HashMap<String, String>,
    required: Option<bool>,
    sanitize: Option<SanitizeMode>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule without arguments
    pub fn rule(self, name: impl Into<String>) -> Self {
        self.rule_with(name, RuleArgs::None)
    }

    /// Add a rule with arguments
    pub fn rule_with(self, name: impl Into<String>, args: impl Into<RuleArgs>) -> Self {
        self.insert(name.into(), RuleDef::Args(args.into()))
    }

    /// Add a custom rule
    pub fn custom(self, name: impl Into<String>, rule: impl CustomRule + 'static) -> Self {
        self.custom_arc(name, Arc::new(rule))
    }

    /// Add an already shared custom rule
    pub fn custom_arc(self, name: impl Into<String>, rule: BoxedCustomRule) -> Self {
        self.insert(name.into(), RuleDef::Custom(rule))
    }

    /// Set the message recorded when `rule` fails
    pub fn message(mut self, rule: impl Into<String>, message: impl Into<String>) -> Self {
        self.messages.insert(rule.into(), message.into());
        self
    }

    /// Mark the attribute as required (the default) or optional
    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    /// Override the validator's sanitization mode for this attribute
    pub fn sanitize(mut self, mode: SanitizeMode) -> Self {
        self.sanitize = Some(mode);
        self
    }

    /// Rules keep their first position when re-added
    fn insert(mut self, name: String, def: RuleDef) -> Self {
        match self.rules.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = def,
            None => self.rules.push((name, def)),
        }
        self
    }

    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(true)
    }

    pub fn messages(&self) -> &HashMap<String, String> {
        &self.messages
    }

    pub fn rule_names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Parse the JSON form of a rule set.
    ///
    /// `required`, `sanitize` and `messages_key` are reserved; every other key
    /// is a rule whose value holds its arguments.
    pub fn from_json(
        attribute: &str,
        json: &serde_json::Value,
        messages_key: &str,
    ) -> Result<Self, SchemaError> {
        let object = json
            .as_object()
            .ok_or_else(|| SchemaError::RuleSetNotAnObject(attribute.to_string()))?;

        let mut rule_set = Self::new();
        for (key, value) in object {
            if key == messages_key {
                let messages = value
                    .as_object()
                    .ok_or_else(|| SchemaError::InvalidMessages(attribute.to_string()))?;
                for (rule, message) in messages {
                    let text = message
                        .as_str()
                        .ok_or_else(|| SchemaError::InvalidMessages(attribute.to_string()))?;
                    rule_set.messages.insert(rule.clone(), text.to_string());
                }
            } else if key == REQUIRED_KEY {
                // Only an explicit `true` keeps the attribute required
                rule_set.required = Some(*value == serde_json::Value::Bool(true));
            } else if key == SANITIZE_KEY {
                let mode = value
                    .as_str()
                    .and_then(SanitizeMode::from_name)
                    .ok_or_else(|| SchemaError::InvalidSanitize {
                        attribute: attribute.to_string(),
                        mode: value.to_string(),
                    })?;
                rule_set.sanitize = Some(mode);
            } else {
                rule_set = rule_set.rule_with(key.as_str(), RuleArgs::from_json(value));
            }
        }

        Ok(rule_set)
    }

    /// Resolve every rule against `library`
    pub fn compile(
        &self,
        attribute: &str,
        library: &RuleLibrary,
    ) -> Result<CompiledRuleSet, SchemaError> {
        let mut rules = Vec::with_capacity(self.rules.len());

        for (name, def) in &self.rules {
            match def {
                RuleDef::Custom(rule) => rules.push(RuleSpec::Custom {
                    name: name.clone(),
                    rule: rule.clone(),
                }),
                RuleDef::Args(args) => {
                    let Some(rule) = library.get(name) else {
                        debug!(attribute, rule = %name, "ignoring unknown rule");
                        continue;
                    };
                    let args = args.clone().into_vec();
                    rule.check_args(&args)
                        .map_err(|reason| SchemaError::InvalidArguments {
                            attribute: attribute.to_string(),
                            rule: name.clone(),
                            reason,
                        })?;
                    rules.push(RuleSpec::BuiltIn {
                        name: name.clone(),
                        args,
                        rule,
                    });
                }
            }
        }

        Ok(CompiledRuleSet {
            rules,
            messages: self.messages.clone(),
            required: self.is_required(),
            sanitize: self.sanitize,
        })
    }
}

// ============================================================================
// Schema
// ============================================================================

/// Attribute name to rule set, in insertion order
#[derive(Debug, Clone, Default)]
pub struct Schema {
    attributes: Vec<(String, RuleSet)>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the rule set for an attribute, replacing any earlier one
    pub fn attribute(mut self, name: impl Into<String>, rules: RuleSet) -> Self {
        let name = name.into();
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = rules,
            None => self.attributes.push((name, rules)),
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&RuleSet> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, rules)| rules)
    }

    /// Take an attribute's rule set out for editing (e.g. to attach custom rules)
    pub fn update(mut self, name: &str, f: impl FnOnce(RuleSet) -> RuleSet) -> Self {
        if let Some(entry) = self.attributes.iter_mut().find(|(n, _)| n == name) {
            entry.1 = f(std::mem::take(&mut entry.1));
        }
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RuleSet)> {
        self.attributes.iter().map(|(name, rules)| (name.as_str(), rules))
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Parse a JSON schema using the default `_messages` key
    pub fn from_json(json: &serde_json::Value) -> Result<Self, SchemaError> {
        Self::from_json_with_key(json, DEFAULT_MESSAGES_KEY)
    }

    /// Parse a JSON schema with a custom messages key
    pub fn from_json_with_key(
        json: &serde_json::Value,
        messages_key: &str,
    ) -> Result<Self, SchemaError> {
        let object = json.as_object().ok_or(SchemaError::NotAnObject)?;

        let mut schema = Self::new();
        for (name, rules) in object {
            schema = schema.attribute(name.as_str(), RuleSet::from_json(name, rules, messages_key)?);
        }
        Ok(schema)
    }

    /// Resolve every rule set against `library`
    pub fn compile(&self, library: &RuleLibrary) -> Result<CompiledSchema, SchemaError> {
        let attributes = self
            .attributes
            .iter()
            .map(|(name, rules)| -> Result<_, SchemaError> {
                Ok((name.clone(), Arc::new(rules.compile(name, library)?)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CompiledSchema { attributes })
    }
}

// ============================================================================
// Compiled Forms
// ============================================================================

/// A rule resolved once at compile time
#[derive(Clone)]
pub enum RuleSpec {
    /// Library predicate with its argument list
    BuiltIn {
        name: String,
        args: Vec<Value>,
        rule: BoxedRule,
    },
    /// User-supplied rule
    Custom { name: String, rule: BoxedCustomRule },
}

impl RuleSpec {
    pub fn name(&self) -> &str {
        match self {
            Self::BuiltIn { name, .. } | Self::Custom { name, .. } => name,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom { .. })
    }
}

impl fmt::Debug for RuleSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BuiltIn { name, args, .. } => f
                .debug_struct("BuiltIn")
                .field("name", name)
                .field("args", args)
                .finish(),
            Self::Custom { name, .. } => f.debug_struct("Custom").field("name", name).finish(),
        }
    }
}

/// A rule set with every rule resolved
#[derive(Debug, Clone)]
pub struct CompiledRuleSet {
    rules: Vec<RuleSpec>,
    messages: HashMap<String, String>,
    required: bool,
    sanitize: Option<SanitizeMode>,
}

impl CompiledRuleSet {
    pub fn rules(&self) -> &[RuleSpec] {
        &self.rules
    }

    /// Custom message configured for `rule`
    pub fn message(&self, rule: &str) -> Option<&str> {
        self.messages.get(rule).map(String::as_str)
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Sanitization mode, falling back to `default`
    pub fn sanitize_mode(&self, default: SanitizeMode) -> SanitizeMode {
        self.sanitize.unwrap_or(default)
    }
}

/// A schema whose rule sets are compiled; cheap to share across calls
#[derive(Debug, Clone, Default)]
pub struct CompiledSchema {
    attributes: Vec<(String, Arc<CompiledRuleSet>)>,
}

impl CompiledSchema {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<CompiledRuleSet>)> {
        self.attributes.iter().map(|(name, rules)| (name.as_str(), rules))
    }

    pub fn get(&self, name: &str) -> Option<&Arc<CompiledRuleSet>> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, rules)| rules)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}
