//! Document Compiler
//!
//! A fixture document is an object keyed by model name, each value an array
//! of rows for that model. Only object models with at least one property can
//! be instantiated as rows; every other model is skipped.

use tracing::debug;

use super::Compiler;
use crate::descriptor::SchemaDescriptor;
use crate::validator::{ObjectValidator, Validator};

/// Both document variants, compiled from one pass over the schema
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledDocuments {
    /// Every fixture model's key is required
    pub full: ObjectValidator,
    /// Every fixture model's key may be absent
    pub partial: ObjectValidator,
}

impl Compiler {
    /// Document validator requiring a row array for every fixture model
    pub fn full_document(&mut self, schema: &SchemaDescriptor) -> ObjectValidator {
        let rows = self.compile_rows(schema);
        assemble(rows, false)
    }

    /// Document validator where any subset of fixture models may be present
    pub fn partial_document(&mut self, schema: &SchemaDescriptor) -> ObjectValidator {
        let rows = self.compile_rows(schema);
        assemble(rows, true)
    }

    pub fn compile_documents(&mut self, schema: &SchemaDescriptor) -> CompiledDocuments {
        let rows = self.compile_rows(schema);
        CompiledDocuments {
            full: assemble(rows.clone(), false),
            partial: assemble(rows, true),
        }
    }

    /// Row validator per fixture model, each compiled with its own fresh context
    fn compile_rows(&mut self, schema: &SchemaDescriptor) -> Vec<(String, Validator)> {
        let mut rows = Vec::new();

        for (name, model) in &schema.models {
            if !model.is_fixture_model() {
                debug!(model = %name, kind = %model.kind, "skipping non-fixture model");
                continue;
            }

            debug!(model = %name, "compiling fixture model");
            let ctx = self.root_context(schema);
            self.location.push(name.clone());
            let row = self.compile_model(model, Some(&ctx));
            self.location.pop();

            rows.push((name.clone(), Validator::array_of(row)));
        }

        rows
    }
}

fn assemble(rows: Vec<(String, Validator)>, optional: bool) -> ObjectValidator {
    let mut document = ObjectValidator::new();
    for (name, validator) in rows {
        document.insert(name, validator, optional);
    }
    document
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticCode;
    use serde_json::json;

    #[test]
    fn test_skips_non_fixture_models() {
        let schema = SchemaDescriptor::from_value(json!({
            "models": {
                "Tags": { "type": "array", "items": { "type": "string" } },
                "Empty": { "type": "object" },
                "Status": { "type": "string", "enum": ["a", "b"] },
                "User": { "type": "object", "properties": { "id": { "type": "string" } } }
            }
        }))
        .unwrap();

        let docs = Compiler::default().compile_documents(&schema);
        let keys: Vec<_> = docs.full.fields().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["User"]);
        assert_eq!(docs.partial.len(), 1);
    }

    #[test]
    fn test_variants_share_shapes() {
        let schema = SchemaDescriptor::from_value(json!({
            "models": {
                "User": { "type": "object", "properties": { "id": { "type": "string" } }, "required": ["id"] }
            }
        }))
        .unwrap();

        let docs = Compiler::default().compile_documents(&schema);
        let full = docs.full.get("User").unwrap();
        let partial = docs.partial.get("User").unwrap();
        assert!(!full.optional);
        assert!(partial.optional);
        assert_eq!(full.validator, partial.validator);
    }

    #[test]
    fn test_models_do_not_share_cycle_state() {
        // Both roots reach Shared; neither should see it as a cycle.
        let schema = SchemaDescriptor::from_value(json!({
            "models": {
                "A": { "type": "object", "properties": { "s": { "$ref": "Shared" } } },
                "B": { "type": "object", "properties": { "s": { "$ref": "Shared" } } },
                "Shared": {
                    "type": "object",
                    "properties": { "v": { "type": "integer" } },
                    "required": ["v"]
                }
            }
        }))
        .unwrap();

        let mut compiler = Compiler::default();
        let doc = compiler.full_document(&schema);
        assert!(compiler.diagnostics().is_empty());
        assert!(doc.accepts(&json!({
            "A": [{ "s": { "v": 1 } }],
            "B": [{ "s": { "v": 2 } }],
            "Shared": [{ "v": 3 }]
        })));
        assert!(!doc.accepts(&json!({
            "A": [{ "s": { "v": "1" } }],
            "B": [],
            "Shared": []
        })));
        assert_eq!(compiler.diagnostics().with_code(DiagnosticCode::CyclicReference).count(), 0);
    }
}
