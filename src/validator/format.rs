//! String formats
//!
//! The fixed table of string sub-kinds the compiler understands. Any other
//! `format` value leaves a plain string validator.

use chrono::{DateTime, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_'+\-.]*[A-Za-z0-9_+\-]@([A-Za-z0-9][A-Za-z0-9\-]*\.)+[A-Za-z]{2,}$")
        .expect("email regex is valid")
});

static UUID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .expect("uuid regex is valid")
});

static DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date regex is valid"));

/// Recognized string format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StringFormat {
    Email,
    Uuid,
    /// `uri` and `url` both map here
    Url,
    DateTime,
    Date,
}

impl StringFormat {
    /// Look up a descriptor `format` value. Unknown formats yield `None`.
    pub fn from_descriptor(format: &str) -> Option<Self> {
        match format {
            "email" => Some(Self::Email),
            "uuid" => Some(Self::Uuid),
            "uri" | "url" => Some(Self::Url),
            "date-time" => Some(Self::DateTime),
            "date" => Some(Self::Date),
            _ => None,
        }
    }

    /// JSON Schema `format` keyword
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Uuid => "uuid",
            Self::Url => "uri",
            Self::DateTime => "date-time",
            Self::Date => "date",
        }
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            Self::Email => {
                !value.starts_with('.') && !value.contains("..") && EMAIL.is_match(value)
            }
            Self::Uuid => UUID.is_match(value),
            Self::Url => url::Url::parse(value).is_ok(),
            Self::DateTime => DateTime::parse_from_rfc3339(value).is_ok(),
            Self::Date => {
                DATE.is_match(value) && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
            }
        }
    }
}

impl fmt::Display for StringFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_table() {
        assert_eq!(StringFormat::from_descriptor("uri"), Some(StringFormat::Url));
        assert_eq!(StringFormat::from_descriptor("url"), Some(StringFormat::Url));
        assert_eq!(StringFormat::from_descriptor("hostname"), None);
        assert_eq!(StringFormat::from_descriptor(""), None);
    }

    #[test]
    fn test_email() {
        assert!(StringFormat::Email.matches("ada@example.com"));
        assert!(StringFormat::Email.matches("first.last+tag@mail.example.co"));
        assert!(!StringFormat::Email.matches("not-an-email"));
        assert!(!StringFormat::Email.matches(".ada@example.com"));
        assert!(!StringFormat::Email.matches("ada..b@example.com"));
        assert!(!StringFormat::Email.matches("ada@example"));
    }

    #[test]
    fn test_uuid() {
        assert!(StringFormat::Uuid.matches("123e4567-e89b-12d3-a456-426614174000"));
        assert!(!StringFormat::Uuid.matches("123e4567e89b12d3a456426614174000"));
        assert!(!StringFormat::Uuid.matches("user-1"));
    }

    #[test]
    fn test_url() {
        assert!(StringFormat::Url.matches("https://example.com/a?b=c"));
        assert!(!StringFormat::Url.matches("example.com"));
    }

    #[test]
    fn test_dates() {
        assert!(StringFormat::DateTime.matches("2024-01-31T10:00:00Z"));
        assert!(StringFormat::DateTime.matches("2024-01-31T10:00:00.123+02:00"));
        assert!(!StringFormat::DateTime.matches("2024-01-31"));
        assert!(StringFormat::Date.matches("2024-02-29"));
        assert!(!StringFormat::Date.matches("2023-02-29"));
        assert!(!StringFormat::Date.matches("2024-1-5"));
    }
}
