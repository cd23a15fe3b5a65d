//! Check results: per-node issues with the path at which they occurred

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Path
// =============================================================================

/// A segment in the path from the checked document root to a value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathSegment {
    /// A named key in an object
    Key(String),
    /// A position in an array
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(name) => write!(f, ".{}", name),
            Self::Index(i) => write!(f, "[{}]", i),
        }
    }
}

/// Format a path as a string
pub fn format_path(path: &[PathSegment]) -> String {
    if path.is_empty() {
        return String::from("<root>");
    }
    path.iter().map(|s| s.to_string()).collect::<String>()
}

// =============================================================================
// Issues
// =============================================================================

/// What kind of constraint a value violated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    /// Wrong JSON type
    InvalidType,
    /// Required key absent
    MissingKey,
    /// Key not declared and unknown keys are rejected
    UnknownKey,
    /// Number is not integral
    NotInteger,
    TooSmall,
    TooLarge,
    TooShort,
    TooLong,
    /// String fails its declared format
    InvalidFormat,
    /// String does not match its pattern
    PatternMismatch,
    /// String is not the literal / one of the enumerated values
    InvalidValue,
}

impl IssueCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidType => "invalid_type",
            Self::MissingKey => "missing_key",
            Self::UnknownKey => "unknown_key",
            Self::NotInteger => "not_integer",
            Self::TooSmall => "too_small",
            Self::TooLarge => "too_large",
            Self::TooShort => "too_short",
            Self::TooLong => "too_long",
            Self::InvalidFormat => "invalid_format",
            Self::PatternMismatch => "pattern_mismatch",
            Self::InvalidValue => "invalid_value",
        }
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single failed check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub path: Vec<PathSegment>,
    pub code: IssueCode,
    pub message: String,
}

impl Issue {
    pub fn new(path: &[PathSegment], code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            path: path.to_vec(),
            code,
            message: message.into(),
        }
    }

    pub fn path_string(&self) -> String {
        format_path(&self.path)
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.path_string(), self.message, self.code)
    }
}

// =============================================================================
// Report
// =============================================================================

/// Outcome of checking one value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckReport {
    issues: Vec<Issue>,
}

impl CheckReport {
    pub fn new(issues: Vec<Issue>) -> Self {
        Self { issues }
    }

    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// Issues with the given code
    pub fn with_code(&self, code: IssueCode) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(move |i| i.code == code)
    }

    /// True if some issue was reported at exactly this path
    pub fn has_issue_at(&self, path: &str) -> bool {
        self.issues.iter().any(|i| i.path_string() == path)
    }
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            return write!(f, "valid");
        }
        for (i, issue) in self.issues.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", issue)?;
        }
        Ok(())
    }
}

impl IntoIterator for CheckReport {
    type Item = Issue;
    type IntoIter = std::vec::IntoIter<Issue>;

    fn into_iter(self) -> Self::IntoIter {
        self.issues.into_iter()
    }
}
