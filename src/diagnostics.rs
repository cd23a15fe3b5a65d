//! Diagnostics
//!
//! Side channel for everything the compiler quietly degraded. Compilation
//! still succeeds for every input; these records only explain where the
//! compiled validator is looser than the schema it came from.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Diagnostic Codes
// =============================================================================

/// Diagnostic code for categorizing fallbacks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticCode {
    // === References ===
    /// $ref target not found in the schema
    DanglingReference,
    /// $ref re-enters a model already on the current path
    CyclicReference,
    /// Reference chain deeper than the configured bound
    DepthExceeded,
    /// Reference compiled without a schema to resolve against
    MissingRegistry,

    // === Fields ===
    /// Type tag outside the known set
    UnknownType,
    /// `pattern` is not a valid regular expression
    InvalidPattern,
    /// `enum` declared but has no string values
    EmptyEnum,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DanglingReference => "W001",
            Self::CyclicReference => "I001",
            Self::DepthExceeded => "W002",
            Self::UnknownType => "W003",
            Self::InvalidPattern => "W004",
            Self::EmptyEnum => "W005",
            Self::MissingRegistry => "W006",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            // Expected for recursive schemas
            Self::CyclicReference => Severity::Info,

            Self::DanglingReference
            | Self::DepthExceeded
            | Self::MissingRegistry
            | Self::UnknownType
            | Self::InvalidPattern
            | Self::EmptyEnum => Severity::Warning,
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Severity
// =============================================================================

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

// =============================================================================
// Diagnostic Item
// =============================================================================

/// A single diagnostic item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticItem {
    /// Model (or reference target) the diagnostic is about
    pub subject: String,
    pub code: DiagnosticCode,
    pub message: String,
    /// Additional context (resolution trail, suggestions)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub context: Vec<String>,
}

impl DiagnosticItem {
    pub fn new(subject: impl Into<String>, code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            code,
            message: message.into(),
            context: Vec::new(),
        }
    }

    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        self.context.push(ctx.into());
        self
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }
}

impl fmt::Display for DiagnosticItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {} ({})",
            self.code,
            self.code.severity(),
            self.message,
            self.subject
        )?;

        for ctx in &self.context {
            write!(f, "\n  - {}", ctx)?;
        }

        Ok(())
    }
}

// =============================================================================
// Diagnostics Collection
// =============================================================================

/// Collection of diagnostics from one or more compilations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    items: Vec<DiagnosticItem>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: DiagnosticItem) {
        self.items.push(item);
    }

    pub fn dangling_reference(&mut self, target: &str, trail: &str) {
        self.push(
            DiagnosticItem::new(
                target,
                DiagnosticCode::DanglingReference,
                format!("$ref target '{}' not found in schema; accepting any record", target),
            )
            .with_context(format!("Path: {}", trail)),
        );
    }

    pub fn cyclic_reference(&mut self, target: &str, trail: &str) {
        self.push(
            DiagnosticItem::new(
                target,
                DiagnosticCode::CyclicReference,
                format!("'{}' is already being expanded; accepting any record", target),
            )
            .with_context(format!("Cycle: {} -> {}", trail, target)),
        );
    }

    pub fn depth_exceeded(&mut self, target: &str, trail: &str, max_depth: usize) {
        self.push(
            DiagnosticItem::new(
                target,
                DiagnosticCode::DepthExceeded,
                format!("reference depth {} reached before '{}'; accepting any record", max_depth, target),
            )
            .with_context(format!("Path: {}", trail)),
        );
    }

    pub fn missing_registry(&mut self, target: &str) {
        self.push(DiagnosticItem::new(
            target,
            DiagnosticCode::MissingRegistry,
            format!("cannot resolve '{}' without a schema; accepting any record", target),
        ));
    }

    pub fn unknown_type(&mut self, subject: &str, type_tag: &str) {
        let message = if type_tag.is_empty() {
            "no type declared; accepting any record".to_string()
        } else {
            format!("unknown type '{}'; accepting any record", type_tag)
        };
        self.push(DiagnosticItem::new(subject, DiagnosticCode::UnknownType, message));
    }

    pub fn invalid_pattern(&mut self, subject: &str, pattern: &str, error: &str) {
        self.push(
            DiagnosticItem::new(
                subject,
                DiagnosticCode::InvalidPattern,
                format!("pattern /{}/ is not a valid regular expression; pattern dropped", pattern),
            )
            .with_context(error.to_string()),
        );
    }

    pub fn empty_enum(&mut self, subject: &str) {
        self.push(DiagnosticItem::new(
            subject,
            DiagnosticCode::EmptyEnum,
            "enum has no string values; treated as a plain string",
        ));
    }

    pub fn has_warnings(&self) -> bool {
        self.items.iter().any(|i| i.severity() == Severity::Warning)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &DiagnosticItem> {
        self.items.iter().filter(|i| i.severity() == Severity::Warning)
    }

    pub fn with_code(&self, code: DiagnosticCode) -> impl Iterator<Item = &DiagnosticItem> {
        self.items.iter().filter(move |i| i.code == code)
    }

    pub fn all(&self) -> &[DiagnosticItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    /// Format all diagnostics for display
    pub fn format_all(&self) -> String {
        let mut output = String::new();

        for item in &self.items {
            output.push_str(&format!("{}\n", item));
        }

        if !self.is_empty() {
            output.push_str(&format!(
                "\n{} warning(s), {} note(s)\n",
                self.warning_count(),
                self.len() - self.warning_count()
            ));
        }

        output
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_all())
    }
}

impl IntoIterator for Diagnostics {
    type Item = DiagnosticItem;
    type IntoIter = std::vec::IntoIter<DiagnosticItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a DiagnosticItem;
    type IntoIter = std::slice::Iter<'a, DiagnosticItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_severity() {
        assert_eq!(DiagnosticCode::CyclicReference.severity(), Severity::Info);
        assert_eq!(DiagnosticCode::DanglingReference.severity(), Severity::Warning);
    }

    #[test]
    fn test_diagnostics_collection() {
        let mut diags = Diagnostics::new();
        diags.cyclic_reference("Node", "Node");
        diags.dangling_reference("Ghost", "User");

        assert_eq!(diags.len(), 2);
        assert_eq!(diags.warning_count(), 1);
        assert!(diags.has_warnings());
        assert_eq!(diags.with_code(DiagnosticCode::DanglingReference).count(), 1);
    }

    #[test]
    fn test_display_includes_context() {
        let mut diags = Diagnostics::new();
        diags.cyclic_reference("A", "A -> B");
        let text = diags.to_string();
        assert!(text.contains("[I001] info"));
        assert!(text.contains("Cycle: A -> B -> A"));
        assert!(text.contains("0 warning(s), 1 note(s)"));
    }
}
