//! Format checks for common string patterns
//!
//! This module provides pre-compiled regex matchers backing the built-in
//! rules: character classes, numbers, email, URL, UUID and dates.

use once_cell::sync::Lazy;
use regex::Regex;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

// ============================================================================
// Pre-compiled Regex Patterns
// ============================================================================

static ALPHA_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z]+$").unwrap());

static ALPHANUMERIC_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9]+$").unwrap());

static NUMERIC_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?[0-9]+$").unwrap());

/// Integer without leading zeros
static INT_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?(0|[1-9][0-9]*)$").unwrap());

/// Decimal with optional fraction and exponent
static DECIMAL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^-?([0-9]+)?(\.[0-9]*)?([eE][+-]?[0-9]+)?$").unwrap()
});

static HEXADECIMAL_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9a-fA-F]+$").unwrap());

static HEX_COLOR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#?([0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").unwrap()
});

/// Email regex pattern (RFC 5322 simplified)
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap()
});

/// URL regex pattern (http/https/ftp)
static URL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(https?|ftp)://[^\s/$.?#][^\s]*$").unwrap()
});

/// UUID of any version
static UUID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$").unwrap()
});

/// UUID v3/v5 (version nibble only)
static UUID_V35_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[35][0-9a-fA-F]{3}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$").unwrap()
});

/// UUID v4
static UUID_V4_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-4[0-9a-fA-F]{3}-[89abAB][0-9a-fA-F]{3}-[0-9a-fA-F]{12}$").unwrap()
});

/// Date (`YYYY-MM-DD`) with an optional ISO 8601 time part, ASCII digits only
static DATE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^([0-9]{4})-([0-9]{2})-([0-9]{2})(T[0-9]{2}:[0-9]{2}:[0-9]{2}(\.[0-9]{1,9})?(Z|[+-][0-9]{2}:[0-9]{2})?)?$",
    )
    .unwrap()
});

// ============================================================================
// Character classes and numbers
// ============================================================================

pub fn is_alpha(value: &str) -> bool {
    ALPHA_REGEX.is_match(value)
}

pub fn is_alphanumeric(value: &str) -> bool {
    ALPHANUMERIC_REGEX.is_match(value)
}

pub fn is_numeric(value: &str) -> bool {
    NUMERIC_REGEX.is_match(value)
}

pub fn is_int(value: &str) -> bool {
    INT_REGEX.is_match(value)
}

/// Decimal number; the empty string and a lone sign or dot are rejected
pub fn is_decimal(value: &str) -> bool {
    !value.is_empty() && value != "-" && value != "." && DECIMAL_REGEX.is_match(value)
}

pub fn is_hexadecimal(value: &str) -> bool {
    HEXADECIMAL_REGEX.is_match(value)
}

pub fn is_hex_color(value: &str) -> bool {
    HEX_COLOR_REGEX.is_match(value)
}

// ============================================================================
// Network and identifier formats
// ============================================================================

/// Validate email format
///
/// # Example
/// ```
/// use model_validator::formats::is_email;
///
/// assert!(is_email("user@example.com"));
/// assert!(!is_email("invalid-email"));
/// ```
pub fn is_email(value: &str) -> bool {
    EMAIL_REGEX.is_match(value)
}

/// Validate URL format (http/https/ftp)
pub fn is_url(value: &str) -> bool {
    URL_REGEX.is_match(value)
}

/// Validate an IP address; `version` is 4, 6 or `None` for either
pub fn is_ip(value: &str, version: Option<u8>) -> bool {
    match version {
        Some(4) => value.parse::<Ipv4Addr>().is_ok(),
        Some(6) => value.parse::<Ipv6Addr>().is_ok(),
        None => value.parse::<IpAddr>().is_ok(),
        Some(_) => false,
    }
}

/// Validate a UUID; `version` is 3, 4, 5 or `None` for any
///
/// # Example
/// ```
/// use model_validator::formats::is_uuid;
///
/// assert!(is_uuid("550e8400-e29b-41d4-a716-446655440000", Some(4)));
/// assert!(!is_uuid("not-a-uuid", None));
/// ```
pub fn is_uuid(value: &str, version: Option<u8>) -> bool {
    match version {
        None => UUID_REGEX.is_match(value),
        Some(4) => UUID_V4_REGEX.is_match(value),
        Some(v @ (3 | 5)) => {
            UUID_V35_REGEX.is_match(value) && value.as_bytes().get(14) == Some(&(b'0' + v))
        }
        Some(_) => false,
    }
}

/// Validate a date (`YYYY-MM-DD`) or ISO 8601 datetime with plausible ranges
pub fn is_date(value: &str) -> bool {
    let Some(caps) = DATE_REGEX.captures(value) else {
        return false;
    };
    let month: u32 = caps[2].parse().unwrap_or(0);
    let day: u32 = caps[3].parse().unwrap_or(0);
    (1..=12).contains(&month) && (1..=31).contains(&day)
}

/// Luhn check over 13-19 digits, ignoring spaces and dashes
pub fn is_credit_card(value: &str) -> bool {
    let digits: Vec<u32> = value
        .chars()
        .filter(|c| *c != ' ' && *c != '-')
        .map(|c| c.to_digit(10))
        .collect::<Option<Vec<_>>>()
        .unwrap_or_default();

    if !(13..=19).contains(&digits.len()) {
        return false;
    }

    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                *d
            }
        })
        .sum();
    sum % 10 == 0
}
