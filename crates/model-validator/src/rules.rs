//! Built-in rule library
//!
//! A [`RuleLibrary`] maps rule names (`notEmpty`, `isInt`, `len`, ...) to
//! [`BuiltinRule`] predicates. Predicates never panic or throw on bad input:
//! they return `Err(message)` with their default failure message, which the
//! property validator records (or replaces with a configured message).
//!
//! # Example
//!
//! ```
//! use model_validator::rules::RuleLibrary;
//! use model_validator::Value;
//!
//! let library = RuleLibrary::standard();
//! let len = library.get("len").unwrap();
//! assert!(len.check("abc", &[Value::Int(2), Value::Int(10)]).is_ok());
//! assert_eq!(len.check("a", &[Value::Int(2)]), Err("String is too small".to_string()));
//! ```

use crate::formats;
use crate::types::Value;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use regex::{Regex, RegexBuilder};
use std::collections::HashMap;
use std::sync::Arc;

/// Outcome of a single built-in check: `Err` carries the default message
pub type RuleOutcome = Result<(), String>;

// ============================================================================
// Builtin Rule Trait
// ============================================================================

/// A named, synchronous predicate over the text form of a value
pub trait BuiltinRule: Send + Sync {
    /// Name the rule is registered under
    fn name(&self) -> &str;

    /// Validate the arguments a rule set passes to this rule.
    ///
    /// Called once when a schema is compiled; an `Err` makes the schema invalid.
    fn check_args(&self, _args: &[Value]) -> Result<(), String> {
        Ok(())
    }

    /// Check `text` against this rule with the configured arguments
    fn check(&self, text: &str, args: &[Value]) -> RuleOutcome;
}

/// Type alias for shared built-in rules
pub type BoxedRule = Arc<dyn BuiltinRule>;

// ============================================================================
// Function-based Rules
// ============================================================================

/// Built-in rule backed by a function, with an accepted argument count range
pub struct FnRule<F>
where
    F: Fn(&str, &[Value]) -> RuleOutcome + Send + Sync,
{
    name: String,
    min_args: usize,
    max_args: usize,
    check_fn: F,
}

impl<F> FnRule<F>
where
    F: Fn(&str, &[Value]) -> RuleOutcome + Send + Sync,
{
    /// Create a rule that accepts any number of arguments
    pub fn new(name: impl Into<String>, check_fn: F) -> Self {
        Self {
            name: name.into(),
            min_args: 0,
            max_args: usize::MAX,
            check_fn,
        }
    }

    /// Restrict the number of arguments accepted at compile time
    pub fn args(mut self, min: usize, max: usize) -> Self {
        self.min_args = min;
        self.max_args = max;
        self
    }
}

impl<F> BuiltinRule for FnRule<F>
where
    F: Fn(&str, &[Value]) -> RuleOutcome + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn check_args(&self, args: &[Value]) -> Result<(), String> {
        if args.len() < self.min_args || args.len() > self.max_args {
            return Err(if self.min_args == self.max_args {
                format!("expected {} argument(s), got {}", self.min_args, args.len())
            } else if self.max_args == usize::MAX {
                format!("expected at least {} argument(s), got {}", self.min_args, args.len())
            } else {
                format!(
                    "expected {} to {} argument(s), got {}",
                    self.min_args,
                    self.max_args,
                    args.len()
                )
            });
        }
        Ok(())
    }

    fn check(&self, text: &str, args: &[Value]) -> RuleOutcome {
        (self.check_fn)(text, args)
    }
}

/// Pattern rule (`regex`/`is` and `notRegex`/`not`): `pattern[, flags]`.
///
/// Patterns are compiled once, when a schema using them is compiled, and
/// looked up by `(pattern, flags)` afterwards.
pub struct PatternRule {
    name: String,
    negate: bool,
    cache: RwLock<HashMap<(String, String), Regex>>,
}

impl PatternRule {
    pub fn new(name: impl Into<String>, negate: bool) -> Self {
        Self {
            name: name.into(),
            negate,
            cache: RwLock::new(HashMap::new()),
        }
    }

    fn key(args: &[Value]) -> Result<(String, String), String> {
        let pattern = match args.first() {
            Some(Value::String(p)) => p.clone(),
            Some(other) => return Err(format!("pattern must be a string, got {}", other.type_name())),
            None => return Err("missing pattern".to_string()),
        };
        let flags = args.get(1).map(Value::to_text).unwrap_or_default();
        Ok((pattern, flags))
    }

    /// Cached regex for `args`, compiling it on first use
    fn regex(&self, args: &[Value]) -> Result<Regex, String> {
        let key = Self::key(args)?;
        if let Some(re) = self.cache.read().get(&key) {
            return Ok(re.clone());
        }

        let (pattern, flags) = &key;
        let re = RegexBuilder::new(pattern)
            .case_insensitive(flags.contains('i'))
            .multi_line(flags.contains('m'))
            .build()
            .map_err(|e| format!("invalid pattern: {}", e))?;
        self.cache.write().insert(key, re.clone());
        Ok(re)
    }
}

impl BuiltinRule for PatternRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn check_args(&self, args: &[Value]) -> Result<(), String> {
        if args.len() > 2 {
            return Err(format!("expected 1 to 2 argument(s), got {}", args.len()));
        }
        self.regex(args).map(|_| ())
    }

    fn check(&self, text: &str, args: &[Value]) -> RuleOutcome {
        let re = self.regex(args)?;
        if re.is_match(text) != self.negate {
            Ok(())
        } else {
            Err("Invalid characters".to_string())
        }
    }
}

// ============================================================================
// Rule Library
// ============================================================================

/// Registry of built-in rules, used read-only while validating
#[derive(Clone, Default)]
pub struct RuleLibrary {
    rules: HashMap<String, BoxedRule>,
}

impl RuleLibrary {
    /// Create an empty library
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a library with every standard rule registered
    pub fn standard() -> Self {
        let mut library = Self::new();
        register_standard_rules(&mut library);
        library
    }

    /// Register a rule, replacing any rule with the same name
    pub fn register(&mut self, rule: impl BuiltinRule + 'static) -> &mut Self {
        self.register_arc(Arc::new(rule))
    }

    /// Register an already shared rule
    pub fn register_arc(&mut self, rule: BoxedRule) -> &mut Self {
        self.rules.insert(rule.name().to_string(), rule);
        self
    }

    /// Get a rule by name
    pub fn get(&self, name: &str) -> Option<BoxedRule> {
        self.rules.get(name).cloned()
    }

    /// Check if a rule is registered
    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    /// All registered rule names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl std::fmt::Debug for RuleLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleLibrary")
            .field("rules", &self.names())
            .finish()
    }
}

/// Shared standard library
static STANDARD_LIBRARY: Lazy<Arc<RuleLibrary>> = Lazy::new(|| Arc::new(RuleLibrary::standard()));

/// Get the shared standard rule library
pub fn standard_library() -> Arc<RuleLibrary> {
    STANDARD_LIBRARY.clone()
}

// ============================================================================
// Standard Rules
// ============================================================================

const INVALID_CHARACTERS: &str = "Invalid characters";
const INVALID_NUMBER: &str = "Invalid number";
const UNEXPECTED_VALUE: &str = "Unexpected value or invalid argument";

/// Zero-argument rule from a plain predicate
fn predicate(
    name: &'static str,
    message: &'static str,
    test: fn(&str) -> bool,
) -> FnRule<impl Fn(&str, &[Value]) -> RuleOutcome + Send + Sync> {
    FnRule::new(name, move |text: &str, _args: &[Value]| {
        if test(text) {
            Ok(())
        } else {
            Err(message.to_string())
        }
    })
    .args(0, 0)
}

fn expect(ok: bool, message: &str) -> RuleOutcome {
    if ok {
        Ok(())
    } else {
        Err(message.to_string())
    }
}

/// Optional small version argument (`isIP(6)`, `isUUID(4)`)
fn version_arg(args: &[Value]) -> Option<u8> {
    args.first()
        .and_then(Value::as_f64)
        .and_then(|v| u8::try_from(v as i64).ok())
}

fn number_arg(args: &[Value], idx: usize) -> Option<f64> {
    args.get(idx).and_then(Value::as_f64)
}

/// `isIn(["a", "b"])` and `isIn("a", "b")` both list the candidates
fn candidates(args: &[Value]) -> Vec<String> {
    match args {
        [Value::List(items)] => items.iter().map(Value::to_text).collect(),
        _ => args.iter().map(Value::to_text).collect(),
    }
}

fn register_standard_rules(library: &mut RuleLibrary) {
    // Presence
    library.register(predicate("notEmpty", "String is whitespace", |s| {
        !s.chars().all(char::is_whitespace)
    }));
    library.register(predicate("notNull", "String is empty", |s| !s.is_empty()));
    library.register(predicate("isNull", "String is not empty", str::is_empty));

    // Character classes
    library.register(predicate("isAlpha", INVALID_CHARACTERS, formats::is_alpha));
    library.register(predicate("isAlphanumeric", INVALID_CHARACTERS, formats::is_alphanumeric));
    library.register(predicate("isLowercase", INVALID_CHARACTERS, |s| s == s.to_lowercase()));
    library.register(predicate("isUppercase", INVALID_CHARACTERS, |s| s == s.to_uppercase()));

    // Numbers
    library.register(predicate("isNumeric", INVALID_NUMBER, formats::is_numeric));
    library.register(predicate("isInt", "Invalid integer", formats::is_int));
    library.register(predicate("isDecimal", "Invalid decimal", formats::is_decimal));
    library.register(predicate("isFloat", "Invalid decimal", formats::is_decimal));
    library.register(predicate("isHexadecimal", "Invalid hexadecimal", formats::is_hexadecimal));
    library.register(predicate("isHexColor", "Invalid hexcolor", formats::is_hex_color));
    library.register(
        FnRule::new("isDivisibleBy", |text: &str, args: &[Value]| {
            let divisible = match (text.trim().parse::<f64>(), number_arg(args, 0)) {
                (Ok(n), Some(d)) if d != 0.0 => n % d == 0.0,
                _ => false,
            };
            expect(divisible, "Not divisible")
        })
        .args(1, 1),
    );
    library.register(
        FnRule::new("min", |text: &str, args: &[Value]| {
            let ok = matches!(
                (text.trim().parse::<f64>(), number_arg(args, 0)),
                (Ok(n), Some(min)) if n >= min
            );
            expect(ok, INVALID_NUMBER)
        })
        .args(1, 1),
    );
    library.register(
        FnRule::new("max", |text: &str, args: &[Value]| {
            let ok = matches!(
                (text.trim().parse::<f64>(), number_arg(args, 0)),
                (Ok(n), Some(max)) if n <= max
            );
            expect(ok, INVALID_NUMBER)
        })
        .args(1, 1),
    );

    // Formats
    library.register(predicate("isEmail", "Invalid email", formats::is_email));
    library.register(predicate("isUrl", "Invalid URL", formats::is_url));
    library.register(predicate("isDate", "Not a date", formats::is_date));
    library.register(predicate("isCreditCard", "Invalid credit card", formats::is_credit_card));
    library.register(
        FnRule::new("isIP", |text: &str, args: &[Value]| {
            expect(formats::is_ip(text, version_arg(args)), "Invalid IP")
        })
        .args(0, 1),
    );
    library.register(predicate("isIPv4", "Invalid IP", |s| formats::is_ip(s, Some(4))));
    library.register(predicate("isIPv6", "Invalid IP", |s| formats::is_ip(s, Some(6))));
    library.register(
        FnRule::new("isUUID", |text: &str, args: &[Value]| {
            expect(formats::is_uuid(text, version_arg(args)), "Not a UUID")
        })
        .args(0, 1),
    );

    // Comparison
    library.register(
        FnRule::new("equals", |text: &str, args: &[Value]| {
            expect(args.first().map(Value::to_text).as_deref() == Some(text), "Not equal")
        })
        .args(1, 1),
    );
    library.register(
        FnRule::new("contains", |text: &str, args: &[Value]| {
            let needle = args.first().map(Value::to_text).unwrap_or_default();
            expect(text.contains(&needle), INVALID_CHARACTERS)
        })
        .args(1, 1),
    );
    library.register(
        FnRule::new("notContains", |text: &str, args: &[Value]| {
            let needle = args.first().map(Value::to_text).unwrap_or_default();
            expect(!text.contains(&needle), INVALID_CHARACTERS)
        })
        .args(1, 1),
    );
    library.register(
        FnRule::new("isIn", |text: &str, args: &[Value]| {
            expect(candidates(args).iter().any(|c| c == text), UNEXPECTED_VALUE)
        })
        .args(1, usize::MAX),
    );
    library.register(
        FnRule::new("notIn", |text: &str, args: &[Value]| {
            expect(!candidates(args).iter().any(|c| c == text), UNEXPECTED_VALUE)
        })
        .args(1, usize::MAX),
    );
    library.register(
        FnRule::new("len", |text: &str, args: &[Value]| {
            let len = text.chars().count() as f64;
            if number_arg(args, 0).is_some_and(|min| len < min) {
                return Err("String is too small".to_string());
            }
            if number_arg(args, 1).is_some_and(|max| len > max) {
                return Err("String is too large".to_string());
            }
            Ok(())
        })
        .args(1, 2),
    );

    // Patterns
    library.register(PatternRule::new("regex", false));
    library.register(PatternRule::new("is", false));
    library.register(PatternRule::new("notRegex", true));
    library.register(PatternRule::new("not", true));
}
