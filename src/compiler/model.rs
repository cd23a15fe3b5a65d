//! Model Compiler
//!
//! Dispatches on a model's declared kind. Object models become record
//! shapes; arrays and primitives used as named types follow the same rules as
//! fields, since reference targets are not assumed to be records.

use super::field::compile_number;
use super::{Compiler, ResolutionContext};
use crate::descriptor::{ModelDescriptor, TypeTag};
use crate::validator::{ObjectValidator, Validator};

impl Compiler {
    pub fn compile_model<'s>(
        &mut self,
        model: &'s ModelDescriptor,
        ctx: Option<&ResolutionContext<'s>>,
    ) -> Validator {
        let validator = match &model.kind {
            TypeTag::Object => self.compile_object(model, ctx).into_validator(),
            TypeTag::Array => Validator::array_of(self.compile_items(model.items.as_ref(), ctx)),
            TypeTag::String => self.compile_string(&model.constraints),
            TypeTag::Number => compile_number(false, &model.constraints),
            TypeTag::Integer => compile_number(true, &model.constraints),
            TypeTag::Boolean => Validator::Boolean,
            TypeTag::Null => Validator::Null,
            TypeTag::Other(tag) => {
                let subject = self.subject();
                self.diagnostics.unknown_type(&subject, tag);
                Validator::Permissive
            }
        };

        if model.constraints.nullable {
            validator.nullable()
        } else {
            validator
        }
    }

    /// Record shape from `properties`, optional unless listed in `required`
    pub fn compile_object<'s>(
        &mut self,
        model: &'s ModelDescriptor,
        ctx: Option<&ResolutionContext<'s>>,
    ) -> ObjectValidator {
        let mut object = ObjectValidator::new().with_unknown_keys(self.options.unknown_keys);

        for (name, field) in &model.properties {
            self.location.push(name.clone());
            let validator = self.compile_field(field, ctx);
            self.location.pop();

            object.insert(name.clone(), validator, !model.is_required(name));
        }

        object
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::SchemaDescriptor;
    use crate::validator::UnknownKeys;
    use serde_json::json;

    fn model(value: serde_json::Value) -> ModelDescriptor {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_required_vs_optional() {
        let m = model(json!({
            "type": "object",
            "properties": { "id": { "type": "string" }, "name": { "type": "string" } },
            "required": ["id"]
        }));
        let v = Compiler::default().compile_model(&m, None);
        assert!(v.accepts(&json!({ "id": "1" })));
        assert!(v.accepts(&json!({ "id": "1", "name": "Ada" })));
        assert!(!v.accepts(&json!({ "name": "Ada" })));
    }

    #[test]
    fn test_required_names_outside_properties_are_ignored() {
        let m = model(json!({
            "type": "object",
            "properties": { "id": { "type": "string" } },
            "required": ["id", "ghost"]
        }));
        let v = Compiler::default().compile_model(&m, None);
        assert!(v.accepts(&json!({ "id": "1" })));
        assert_eq!(v.as_object().unwrap().len(), 1);
    }

    #[test]
    fn test_compilation_is_deterministic() {
        let m = model(json!({
            "type": "object",
            "properties": {
                "b": { "type": "integer" },
                "a": { "type": "string", "pattern": "^x" },
                "c": { "type": "array", "items": { "type": "boolean" } }
            },
            "required": ["c", "a"]
        }));
        let first = Compiler::default().compile_model(&m, None);
        let second = Compiler::default().compile_model(&m, None);
        assert_eq!(first, second);
        let keys: Vec<_> = first.as_object().unwrap().fields().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_primitive_model_via_reference() {
        let schema = SchemaDescriptor::from_value(json!({
            "models": {
                "Status": { "type": "string", "enum": ["open", "closed"] },
                "Ids": { "type": "array", "items": { "type": "integer" } },
                "Ticket": {
                    "type": "object",
                    "properties": {
                        "status": { "type": "object", "$ref": "#/components/schemas/Status" },
                        "related": { "$ref": "Ids" }
                    },
                    "required": ["status"]
                }
            }
        }))
        .unwrap();

        let mut compiler = Compiler::default();
        let ctx = compiler.root_context(&schema);
        let v = compiler.compile_model(&schema.models["Ticket"], Some(&ctx));
        assert!(v.accepts(&json!({ "status": "open", "related": [1, 2] })));
        assert!(!v.accepts(&json!({ "status": "pending" })));
        assert!(!v.accepts(&json!({ "status": "open", "related": ["1"] })));
    }

    #[test]
    fn test_sibling_references_both_expand() {
        let schema = SchemaDescriptor::from_value(json!({
            "models": {
                "Point": {
                    "type": "object",
                    "properties": { "x": { "type": "integer" }, "y": { "type": "integer" } },
                    "required": ["x", "y"]
                },
                "Segment": {
                    "type": "object",
                    "properties": {
                        "start": { "$ref": "#/components/schemas/Point" },
                        "end": { "$ref": "#/components/schemas/Point" }
                    },
                    "required": ["start", "end"]
                }
            }
        }))
        .unwrap();

        let mut compiler = Compiler::default();
        let ctx = compiler.root_context(&schema);
        let v = compiler.compile_model(&schema.models["Segment"], Some(&ctx));

        let segment = v.as_object().unwrap();
        assert!(!segment.get("start").unwrap().validator.is_permissive());
        assert!(!segment.get("end").unwrap().validator.is_permissive());

        assert!(v.accepts(&json!({ "start": { "x": 0, "y": 0 }, "end": { "x": 3, "y": 4 } })));
        let report = v.check(&json!({ "start": { "x": 0, "y": 0 }, "end": { "x": 1 } }));
        assert!(report.has_issue_at(".end.y"));
        assert_eq!(report.issues().len(), 1);
        assert!(compiler.diagnostics().is_empty());
    }

    #[test]
    fn test_strict_objects() {
        let m = model(json!({ "type": "object", "properties": { "id": { "type": "string" } } }));
        let mut compiler = Compiler::new(crate::compiler::CompileOptions {
            unknown_keys: UnknownKeys::Reject,
            ..Default::default()
        });
        let v = compiler.compile_model(&m, None);
        assert!(v.accepts(&json!({ "id": "1" })));
        assert!(!v.accepts(&json!({ "id": "1", "extra": true })));
    }

    #[test]
    fn test_unknown_model_type() {
        let m = model(json!({ "type": "tuple" }));
        let v = Compiler::default().compile_model(&m, None);
        assert!(v.is_permissive());
    }
}
