//! Structural Validators
//!
//! A compiled validator is an immutable tree of plain values. Small rules
//! (format, length, pattern, bounds) are layered onto a base type through
//! combinators, so the order in which the compiler applies them is visible
//! in the resulting value and can be asserted on directly.
//!
//! `check` walks a `serde_json::Value` against the tree and collects every
//! violation with its path; it never stops at the first issue.

pub mod format;
pub mod report;

pub use format::StringFormat;
pub use report::{format_path, CheckReport, Issue, IssueCode, PathSegment};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

// =============================================================================
// Rules
// =============================================================================

/// A compiled `pattern` constraint that remembers its source.
///
/// Descriptor patterns use the ECMA-262 dialect: `\d` and `\w` are ASCII
/// only and look-around is allowed.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: regress::Regex,
}

impl Pattern {
    /// Compile a pattern. Invalid syntax is reported to the caller, not panicked on.
    pub fn new(source: &str) -> Result<Self, regress::Error> {
        Ok(Self {
            source: source.to_string(),
            regex: regress::Regex::new(source)?,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Unanchored search, as JSON Schema `pattern` is defined
    pub fn is_match(&self, value: &str) -> bool {
        self.regex.find(value).is_some()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

/// Constraints layered on a string validator
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringRules {
    pub format: Option<StringFormat>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<Pattern>,
}

impl StringRules {
    pub fn with_format(mut self, format: StringFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn with_length(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        self.min_length = min;
        self.max_length = max;
        self
    }

    pub fn with_pattern(mut self, pattern: Pattern) -> Self {
        self.pattern = Some(pattern);
        self
    }
}

/// Numeric constraints
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumberRules {
    /// Only integral values are accepted
    pub integer: bool,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
}

impl NumberRules {
    pub fn integer() -> Self {
        Self { integer: true, ..Default::default() }
    }

    pub fn with_bounds(mut self, minimum: Option<f64>, maximum: Option<f64>) -> Self {
        self.minimum = minimum;
        self.maximum = maximum;
        self
    }
}

/// What an object does with keys it does not declare
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownKeys {
    #[default]
    Allow,
    Reject,
}

// =============================================================================
// Validator
// =============================================================================

/// A runtime-checkable shape
#[derive(Debug, Clone, PartialEq)]
pub enum Validator {
    /// Accepts any JSON object without looking inside it. Used wherever
    /// strict expansion would not terminate or the schema is incomplete.
    Permissive,
    Null,
    Boolean,
    Number(NumberRules),
    String(StringRules),
    /// Exactly this string
    Literal(String),
    /// One of these strings
    OneOf(Vec<String>),
    Array(Box<Validator>),
    Object(ObjectValidator),
    /// The inner validator, or an explicit null
    Nullable(Box<Validator>),
}

impl Validator {
    pub fn string() -> Self {
        Self::String(StringRules::default())
    }

    pub fn array_of(items: Validator) -> Self {
        Self::Array(Box::new(items))
    }

    /// Additionally accept null. Idempotent.
    pub fn nullable(self) -> Self {
        match self {
            Self::Nullable(_) | Self::Null => self,
            other => Self::Nullable(Box::new(other)),
        }
    }

    pub fn is_permissive(&self) -> bool {
        matches!(self, Self::Permissive)
    }

    pub fn as_object(&self) -> Option<&ObjectValidator> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Check a value, collecting every issue
    pub fn check(&self, value: &Value) -> CheckReport {
        let mut issues = Vec::new();
        let mut path = Vec::new();
        self.check_at(value, &mut path, &mut issues);
        CheckReport::new(issues)
    }

    /// Pass/fail only
    pub fn accepts(&self, value: &Value) -> bool {
        self.check(value).is_valid()
    }

    fn check_at(&self, value: &Value, path: &mut Vec<PathSegment>, issues: &mut Vec<Issue>) {
        match self {
            Self::Permissive => {
                if !value.is_object() {
                    issues.push(type_issue(path, "object", value));
                }
            }
            Self::Null => {
                if !value.is_null() {
                    issues.push(type_issue(path, "null", value));
                }
            }
            Self::Boolean => {
                if !value.is_boolean() {
                    issues.push(type_issue(path, "boolean", value));
                }
            }
            Self::Number(rules) => check_number(rules, value, path, issues),
            Self::String(rules) => check_string(rules, value, path, issues),
            Self::Literal(expected) => match value.as_str() {
                Some(s) if s == expected => {}
                Some(s) => issues.push(Issue::new(
                    path,
                    IssueCode::InvalidValue,
                    format!("expected \"{}\", got \"{}\"", expected, s),
                )),
                None => issues.push(type_issue(path, "string", value)),
            },
            Self::OneOf(options) => match value.as_str() {
                Some(s) if options.iter().any(|o| o == s) => {}
                Some(s) => issues.push(Issue::new(
                    path,
                    IssueCode::InvalidValue,
                    format!("\"{}\" is not one of {:?}", s, options),
                )),
                None => issues.push(type_issue(path, "string", value)),
            },
            Self::Array(items) => match value.as_array() {
                Some(elements) => {
                    for (i, element) in elements.iter().enumerate() {
                        path.push(PathSegment::Index(i));
                        items.check_at(element, path, issues);
                        path.pop();
                    }
                }
                None => issues.push(type_issue(path, "array", value)),
            },
            Self::Object(object) => match value.as_object() {
                Some(map) => object.check_map(map, path, issues),
                None => issues.push(type_issue(path, "object", value)),
            },
            Self::Nullable(inner) => {
                if !value.is_null() {
                    inner.check_at(value, path, issues);
                }
            }
        }
    }
}

fn check_number(rules: &NumberRules, value: &Value, path: &[PathSegment], issues: &mut Vec<Issue>) {
    let Some(n) = value.as_f64() else {
        let expected = if rules.integer { "integer" } else { "number" };
        issues.push(type_issue(path, expected, value));
        return;
    };
    if rules.integer && n.fract() != 0.0 {
        issues.push(Issue::new(path, IssueCode::NotInteger, format!("expected integer, got {}", n)));
    }
    if let Some(min) = rules.minimum {
        if n < min {
            issues.push(Issue::new(path, IssueCode::TooSmall, format!("{} is less than minimum {}", n, min)));
        }
    }
    if let Some(max) = rules.maximum {
        if n > max {
            issues.push(Issue::new(path, IssueCode::TooLarge, format!("{} is greater than maximum {}", n, max)));
        }
    }
}

fn check_string(rules: &StringRules, value: &Value, path: &[PathSegment], issues: &mut Vec<Issue>) {
    let Some(s) = value.as_str() else {
        issues.push(type_issue(path, "string", value));
        return;
    };
    if let Some(format) = rules.format {
        if !format.matches(s) {
            issues.push(Issue::new(path, IssueCode::InvalidFormat, format!("\"{}\" is not a valid {}", s, format)));
        }
    }
    let length = s.chars().count();
    if let Some(min) = rules.min_length {
        if length < min {
            issues.push(Issue::new(path, IssueCode::TooShort, format!("length {} is shorter than {}", length, min)));
        }
    }
    if let Some(max) = rules.max_length {
        if length > max {
            issues.push(Issue::new(path, IssueCode::TooLong, format!("length {} is longer than {}", length, max)));
        }
    }
    if let Some(pattern) = &rules.pattern {
        if !pattern.is_match(s) {
            issues.push(Issue::new(
                path,
                IssueCode::PatternMismatch,
                format!("\"{}\" does not match /{}/", s, pattern.as_str()),
            ));
        }
    }
}

fn type_issue(path: &[PathSegment], expected: &str, actual: &Value) -> Issue {
    Issue::new(
        path,
        IssueCode::InvalidType,
        format!("expected {}, got {}", expected, json_type_name(actual)),
    )
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// =============================================================================
// Objects
// =============================================================================

/// One key of an object validator
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectField {
    pub validator: Validator,
    /// The key may be absent entirely. Unrelated to accepting null.
    pub optional: bool,
}

/// Record shape: named keys, each required or optional
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectValidator {
    fields: BTreeMap<String, ObjectField>,
    unknown_keys: UnknownKeys,
}

impl ObjectValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unknown_keys(mut self, unknown_keys: UnknownKeys) -> Self {
        self.unknown_keys = unknown_keys;
        self
    }

    /// Add a key that must be present
    pub fn field(mut self, name: impl Into<String>, validator: Validator) -> Self {
        self.insert(name, validator, false);
        self
    }

    /// Add a key that may be absent
    pub fn optional_field(mut self, name: impl Into<String>, validator: Validator) -> Self {
        self.insert(name, validator, true);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, validator: Validator, optional: bool) {
        self.fields.insert(name.into(), ObjectField { validator, optional });
    }

    pub fn get(&self, name: &str) -> Option<&ObjectField> {
        self.fields.get(name)
    }

    /// Fields in key order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &ObjectField)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn unknown_keys(&self) -> UnknownKeys {
        self.unknown_keys
    }

    pub fn into_validator(self) -> Validator {
        Validator::Object(self)
    }

    pub fn check(&self, value: &Value) -> CheckReport {
        let mut issues = Vec::new();
        let mut path = Vec::new();
        match value.as_object() {
            Some(map) => self.check_map(map, &mut path, &mut issues),
            None => issues.push(type_issue(&path, "object", value)),
        }
        CheckReport::new(issues)
    }

    pub fn accepts(&self, value: &Value) -> bool {
        self.check(value).is_valid()
    }

    fn check_map(&self, map: &Map<String, Value>, path: &mut Vec<PathSegment>, issues: &mut Vec<Issue>) {
        for (name, field) in &self.fields {
            path.push(PathSegment::Key(name.clone()));
            match map.get(name) {
                Some(value) => field.validator.check_at(value, path, issues),
                None if field.optional => {}
                None => issues.push(Issue::new(path, IssueCode::MissingKey, "required key is missing")),
            }
            path.pop();
        }

        if self.unknown_keys == UnknownKeys::Reject {
            for key in map.keys().filter(|k| !self.fields.contains_key(*k)) {
                path.push(PathSegment::Key(key.clone()));
                issues.push(Issue::new(path, IssueCode::UnknownKey, "key is not declared"));
                path.pop();
            }
        }
    }
}
