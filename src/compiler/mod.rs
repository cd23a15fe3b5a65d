//! Schema-to-Validator Compiler
//!
//! Recursive descent from a `SchemaDescriptor` to `Validator` values:
//!
//! ```text
//! document ──▶ model ──▶ field ──▶ items
//!                ▲         │         │
//!                └──── reference ◀───┘
//! ```
//!
//! The reference resolver calling back into the model compiler is the only
//! back-edge. It is guarded by the `ResolutionContext` visited set and depth
//! counter, so compilation terminates on any input, including cyclic and
//! dangling references. Every degraded node becomes `Validator::Permissive`
//! and leaves a record in the compiler's `Diagnostics`.

pub mod context;
mod document;
mod field;
mod items;
mod model;
mod reference;

pub use context::{Descent, ResolutionContext, DEFAULT_MAX_DEPTH};
pub use document::CompiledDocuments;

use serde::{Deserialize, Serialize};

use crate::descriptor::SchemaDescriptor;
use crate::diagnostics::Diagnostics;
use crate::validator::{ObjectValidator, UnknownKeys};

// =============================================================================
// Options
// =============================================================================

/// Knobs that change what the compiler produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileOptions {
    /// Bound on reference nesting before a permissive placeholder is used
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Whether compiled object shapes reject undeclared keys
    #[serde(default)]
    pub unknown_keys: UnknownKeys,
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            unknown_keys: UnknownKeys::Allow,
        }
    }
}

// =============================================================================
// Compiler
// =============================================================================

/// Compiles descriptors into validators, recording fallbacks as it goes.
///
/// The compiler holds no schema state between calls; each top-level model
/// gets its own `ResolutionContext`. Only the diagnostics accumulate.
#[derive(Debug, Default)]
pub struct Compiler {
    options: CompileOptions,
    diagnostics: Diagnostics,
    /// Document path of the node being compiled, for diagnostics only
    location: Vec<String>,
}

impl Compiler {
    pub fn new(options: CompileOptions) -> Self {
        Self {
            options,
            diagnostics: Diagnostics::new(),
            location: Vec::new(),
        }
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        Self::new(CompileOptions {
            max_depth,
            ..Default::default()
        })
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Diagnostics {
        self.diagnostics
    }

    /// Fresh root context for compiling one top-level model of `schema`
    pub fn root_context<'s>(&self, schema: &'s SchemaDescriptor) -> ResolutionContext<'s> {
        ResolutionContext::new(schema, self.options.max_depth)
    }

    fn subject(&self) -> String {
        if self.location.is_empty() {
            return String::from("<inline>");
        }
        self.location.join(".")
    }
}

/// Full document validator with default options
pub fn compile_full_document(schema: &SchemaDescriptor) -> ObjectValidator {
    Compiler::default().full_document(schema)
}

/// Partial document validator with default options
pub fn compile_partial_document(schema: &SchemaDescriptor) -> ObjectValidator {
    Compiler::default().partial_document(schema)
}
