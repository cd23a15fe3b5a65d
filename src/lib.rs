//! Fixture Schemas
//!
//! Compiles API schema descriptors (models, fields, `$ref`s) into structural
//! validators for demo fixture documents, so generated sample data can be
//! checked against the same API description the product is built from.
//!
//! ## Features
//!
//! - **Terminating Resolution**: Cyclic and deeply nested references degrade to
//!   permissive placeholders instead of recursing forever
//! - **Never Fails Closed**: Dangling refs, unknown types and bad patterns become
//!   diagnostics, not errors
//! - **Full & Partial Documents**: One document shape requiring every model, one
//!   accepting any subset
//! - **JSON Schema Export**: Compiled shapes render back to JSON Schema for
//!   structured-output generators
//!
//! ## Architecture
//!
//! ```text
//! SchemaDescriptor ──▶ Compiler ──▶ ObjectValidator (document)
//!        │                │                 │
//!        ▼                ▼                 ▼
//! ReferenceGraph     Diagnostics      CheckReport / JSON Schema
//! ```

pub mod compiler;
pub mod config;
pub mod descriptor;
pub mod diagnostics;
pub mod error;
pub mod export;
pub mod graph;
pub mod validator;

pub use compiler::{
    compile_full_document, compile_partial_document, CompileOptions, CompiledDocuments, Compiler,
    Descent, ResolutionContext,
};
pub use config::{FixtureConfig, OutputFormat};
pub use descriptor::{
    Constraints, FieldDescriptor, ItemsDescriptor, ModelDescriptor, ReferenceDescriptor,
    SchemaDescriptor, TypeTag,
};
pub use diagnostics::{DiagnosticCode, DiagnosticItem, Diagnostics, Severity};
pub use error::{Result, SchemaError};
pub use export::{object_to_json_schema, to_json_schema};
pub use graph::ReferenceGraph;
pub use validator::{CheckReport, Issue, IssueCode, ObjectValidator, UnknownKeys, Validator};
