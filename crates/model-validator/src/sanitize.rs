//! Value sanitization
//!
//! Every attribute value is normalized before its rules run. The default
//! pipeline HTML-entity-encodes the text and then trims surrounding whitespace.
//!
//! # Example
//!
//! ```
//! use model_validator::sanitize::{sanitize, Sanitizer};
//!
//! assert_eq!(sanitize("  <b>hi</b> "), "&lt;b&gt;hi&lt;/b&gt;");
//! assert_eq!(Sanitizer::new(" a & b ").trim().into_string(), "a & b");
//! ```

use crate::types::Value;
use serde::{Deserialize, Serialize};

// ============================================================================
// Sanitize Mode
// ============================================================================

/// Which values the sanitization pipeline is applied to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SanitizeMode {
    /// Sanitize string values, leave every other value untouched (default)
    #[default]
    Strings,
    /// Convert every value to text and sanitize it
    All,
    /// Do not sanitize
    Off,
}

impl SanitizeMode {
    /// Parse the name used in JSON rule sets
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "strings" => Some(Self::Strings),
            "all" => Some(Self::All),
            "off" => Some(Self::Off),
            _ => None,
        }
    }

    /// Apply the default pipeline to a value according to this mode
    pub fn apply(self, value: Value) -> Value {
        match (self, value) {
            (Self::Off, value) => value,
            (Self::Strings, Value::String(s)) => Value::String(sanitize(&s)),
            (Self::Strings, value) => value,
            (Self::All, value) => Value::String(sanitize(&value.to_text())),
        }
    }
}

// ============================================================================
// Sanitizer Chain
// ============================================================================

/// Composable sanitization chain over a string
#[derive(Debug, Clone)]
pub struct Sanitizer {
    text: String,
}

impl Sanitizer {
    /// Start a chain from the given text
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// HTML-entity-encode the text
    pub fn entity_encode(mut self) -> Self {
        self.text = entity_encode(&self.text);
        self
    }

    /// Strip leading and trailing whitespace
    pub fn trim(mut self) -> Self {
        self.text = trim(&self.text);
        self
    }

    /// Borrow the current text
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Finish the chain
    pub fn into_string(self) -> String {
        self.text
    }
}

// ============================================================================
// Transforms
// ============================================================================

/// Default pipeline: entity-encode, then trim
pub fn sanitize(text: &str) -> String {
    Sanitizer::new(text).entity_encode().trim().into_string()
}

/// Strip leading and trailing whitespace
pub fn trim(text: &str) -> String {
    text.trim().to_string()
}

/// HTML-entity-encode `&`, `<`, `>`, `"` and `'`.
///
/// An ampersand that already starts a well-formed entity reference is kept,
/// so encoding an encoded string is a no-op.
pub fn entity_encode(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for (idx, ch) in text.char_indices() {
        match ch {
            '&' if starts_entity(&text[idx..]) => out.push('&'),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Does `s` (which starts with `&`) begin with `&name;`, `&#123;` or `&#x1F;`?
fn starts_entity(s: &str) -> bool {
    let body = &s[1..];
    let Some(end) = body.find(';') else {
        return false;
    };
    let name = &body[..end];

    if let Some(num) = name.strip_prefix('#') {
        if let Some(hex) = num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
            return !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit());
        }
        return !num.is_empty() && num.chars().all(|c| c.is_ascii_digit());
    }

    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_encode() {
        assert_eq!(entity_encode("<a href=\"x\">"), "&lt;a href=&quot;x&quot;&gt;");
        assert_eq!(entity_encode("it's"), "it&#x27;s");
        assert_eq!(entity_encode("fish & chips"), "fish &amp; chips");
    }

    #[test]
    fn test_entity_encode_keeps_existing_entities() {
        assert_eq!(entity_encode("&amp; &#39; &#x27; &copy;"), "&amp; &#39; &#x27; &copy;");
        assert_eq!(entity_encode("&;"), "&amp;;");
        assert_eq!(entity_encode("&#;"), "&amp;#;");
        assert_eq!(entity_encode("&#xZZ;"), "&amp;#xZZ;");
        assert_eq!(entity_encode("& amp;"), "&amp; amp;");
        assert_eq!(entity_encode("trailing &"), "trailing &amp;");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let inputs = [
            "",
            "   ",
            "abc",
            "  padded  ",
            "<script>alert('x')</script>",
            "a & b && c",
            "&amp;&lt;&unknown",
            " \"quoted\" & 'single' ",
            "ünïcödé < ✓ >",
            "&#",
        ];
        for input in inputs {
            let once = sanitize(input);
            assert_eq!(sanitize(&once), once, "input: {:?}", input);
        }
    }

    #[test]
    fn test_sanitizer_chain_order() {
        assert_eq!(
            Sanitizer::new("  <x>  ").trim().entity_encode().into_string(),
            "&lt;x&gt;"
        );
        assert_eq!(Sanitizer::new(" a ").as_str(), " a ");
    }

    #[test]
    fn test_mode_strings_leaves_numbers() {
        assert_eq!(SanitizeMode::Strings.apply(Value::Int(123)), Value::Int(123));
        assert_eq!(
            SanitizeMode::Strings.apply(Value::from(" <b> ")),
            Value::from("&lt;b&gt;")
        );
    }

    #[test]
    fn test_mode_all_stringifies() {
        assert_eq!(SanitizeMode::All.apply(Value::Int(123)), Value::from("123"));
        assert_eq!(SanitizeMode::All.apply(Value::Null), Value::from(""));
    }

    #[test]
    fn test_mode_off() {
        assert_eq!(SanitizeMode::Off.apply(Value::from(" x ")), Value::from(" x "));
    }

    #[test]
    fn test_mode_from_name() {
        assert_eq!(SanitizeMode::from_name("all"), Some(SanitizeMode::All));
        assert_eq!(SanitizeMode::from_name("ALL"), None);
    }
}
