//! Field Type Compiler
//!
//! One `FieldDescriptor` to one `Validator`. Type-specific construction comes
//! first; nullability is applied last and independently. Optionality is not
//! decided here but by the enclosing object from its `required` list.

use tracing::debug;

use super::{Compiler, ResolutionContext};
use crate::descriptor::{Constraints, FieldDescriptor, TypeTag};
use crate::validator::{NumberRules, Pattern, StringFormat, StringRules, Validator};

impl Compiler {
    pub fn compile_field<'s>(
        &mut self,
        field: &'s FieldDescriptor,
        ctx: Option<&ResolutionContext<'s>>,
    ) -> Validator {
        let validator = match &field.kind {
            TypeTag::String => self.compile_string(&field.constraints),
            TypeTag::Number => compile_number(false, &field.constraints),
            TypeTag::Integer => compile_number(true, &field.constraints),
            TypeTag::Boolean => Validator::Boolean,
            TypeTag::Null => Validator::Null,
            TypeTag::Array => Validator::array_of(self.compile_items(field.items.as_ref(), ctx)),
            TypeTag::Object => self.compile_object_field(field, ctx),
            // bare `{ "$ref": ... }` property
            tag if tag.is_unspecified() && field.reference.is_some() => {
                self.compile_object_field(field, ctx)
            }
            TypeTag::Other(tag) => {
                let subject = self.subject();
                self.diagnostics.unknown_type(&subject, tag);
                Validator::Permissive
            }
        };

        if field.constraints.nullable {
            validator.nullable()
        } else {
            validator
        }
    }

    /// `object` fields: a reference, a nested shape via `items`, or nothing
    fn compile_object_field<'s>(
        &mut self,
        field: &'s FieldDescriptor,
        ctx: Option<&ResolutionContext<'s>>,
    ) -> Validator {
        if let Some(target) = &field.reference {
            return self.resolve_reference(target, ctx);
        }
        if let Some(items) = &field.items {
            return self.compile_items(Some(items), ctx);
        }
        debug!(subject = %self.subject(), "object field without nested shape, accepting any record");
        Validator::Permissive
    }

    /// String rules, in order: enum short-circuit, then format, length, pattern
    pub(super) fn compile_string(&mut self, constraints: &Constraints) -> Validator {
        match constraints.string_enum().as_slice() {
            [] => {
                if constraints.has_unusable_enum() {
                    let subject = self.subject();
                    self.diagnostics.empty_enum(&subject);
                }
            }
            [only] => return Validator::Literal(only.to_string()),
            values => return Validator::OneOf(values.iter().map(|v| v.to_string()).collect()),
        }

        let mut rules = StringRules::default();

        if let Some(format) = constraints.format.as_deref().and_then(StringFormat::from_descriptor) {
            rules = rules.with_format(format);
        }

        if constraints.min_length.is_some() || constraints.max_length.is_some() {
            rules = rules.with_length(constraints.min_length, constraints.max_length);
        }

        if let Some(source) = &constraints.pattern {
            match Pattern::new(source) {
                Ok(pattern) => rules = rules.with_pattern(pattern),
                Err(err) => {
                    let subject = self.subject();
                    self.diagnostics.invalid_pattern(&subject, source, &err.to_string());
                }
            }
        }

        Validator::String(rules)
    }
}

pub(super) fn compile_number(integer: bool, constraints: &Constraints) -> Validator {
    let rules = NumberRules {
        integer,
        ..Default::default()
    };
    Validator::Number(rules.with_bounds(constraints.minimum, constraints.maximum))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticCode;
    use crate::validator::IssueCode;
    use serde_json::json;

    fn field(value: serde_json::Value) -> FieldDescriptor {
        serde_json::from_value(value).unwrap()
    }

    fn compile(value: serde_json::Value) -> Validator {
        let field = field(value);
        Compiler::default().compile_field(&field, None)
    }

    #[test]
    fn test_single_enum_is_literal() {
        let v = compile(json!({ "type": "string", "enum": ["x"] }));
        assert_eq!(v, Validator::Literal("x".to_string()));
        assert!(v.accepts(&json!("x")));
        assert!(!v.accepts(&json!("X")));
        assert!(!v.accepts(&json!("y")));
    }

    #[test]
    fn test_enum_takes_precedence() {
        let v = compile(json!({
            "type": "string",
            "enum": ["x", "y", 7],
            "format": "email",
            "pattern": "^z$",
            "minLength": 5
        }));
        assert_eq!(v, Validator::OneOf(vec!["x".to_string(), "y".to_string()]));
        assert!(v.accepts(&json!("x")));
        assert!(v.accepts(&json!("y")));
        assert!(!v.accepts(&json!("z")));
    }

    #[test]
    fn test_unusable_enum_falls_through() {
        let f = field(json!({ "type": "string", "enum": [1, 2], "maxLength": 3 }));
        let mut compiler = Compiler::default();
        let v = compiler.compile_field(&f, None);
        assert!(v.accepts(&json!("abc")));
        assert!(!v.accepts(&json!("abcd")));
        assert_eq!(compiler.diagnostics().with_code(DiagnosticCode::EmptyEnum).count(), 1);
    }

    #[test]
    fn test_format_length_pattern_accumulate() {
        let v = compile(json!({
            "type": "string",
            "format": "email",
            "maxLength": 16,
            "pattern": "@example\\.com$"
        }));
        assert!(v.accepts(&json!("ada@example.com")));
        assert!(!v.accepts(&json!("ada@example.org")));
        assert!(!v.accepts(&json!("ada.lovelace@example.com")));
        assert!(!v.accepts(&json!("@example.com")));
    }

    #[test]
    fn test_unknown_format_is_plain_string() {
        let v = compile(json!({ "type": "string", "format": "hostname" }));
        assert_eq!(v, Validator::string());
    }

    #[test]
    fn test_invalid_pattern_is_dropped() {
        let f = field(json!({ "type": "string", "pattern": "[unclosed", "minLength": 2 }));
        let mut compiler = Compiler::default();
        let v = compiler.compile_field(&f, None);
        assert!(v.accepts(&json!("anything")));
        let report = v.check(&json!("a"));
        assert_eq!(report.with_code(IssueCode::TooShort).count(), 1);
        assert_eq!(compiler.diagnostics().with_code(DiagnosticCode::InvalidPattern).count(), 1);
    }

    #[test]
    fn test_pattern_digits_are_ascii() {
        let v = compile(json!({ "type": "string", "pattern": "^\\d{3}$" }));
        assert!(v.accepts(&json!("123")));
        assert!(!v.accepts(&json!("\u{661}\u{662}\u{663}")));
    }

    #[test]
    fn test_lookahead_pattern_is_kept() {
        let f = field(json!({ "type": "string", "pattern": "^(?=.*[0-9]).{8,}$" }));
        let mut compiler = Compiler::default();
        let v = compiler.compile_field(&f, None);
        assert!(v.accepts(&json!("abcdefg1")));
        assert!(!v.accepts(&json!("abcdefgh")));
        assert!(!v.accepts(&json!("x")));
        assert!(compiler.diagnostics().is_empty());
    }

    #[test]
    fn test_integer_bounds() {
        let v = compile(json!({ "type": "integer", "minimum": 1, "maximum": 10 }));
        assert!(v.accepts(&json!(1)));
        assert!(v.accepts(&json!(10)));
        assert!(!v.accepts(&json!(11)));
        assert!(!v.accepts(&json!(2.5)));
    }

    #[test]
    fn test_number_allows_fractions() {
        let v = compile(json!({ "type": "number", "maximum": 1.5 }));
        assert!(v.accepts(&json!(1.25)));
        assert!(!v.accepts(&json!(1.75)));
    }

    #[test]
    fn test_nullable() {
        let nullable = compile(json!({ "type": "string", "nullable": true }));
        assert!(nullable.accepts(&json!("a")));
        assert!(nullable.accepts(&json!(null)));

        let plain = compile(json!({ "type": "string" }));
        assert!(!plain.accepts(&json!(null)));

        let explicit_false = compile(json!({ "type": "string", "nullable": false }));
        assert!(!explicit_false.accepts(&json!(null)));
    }

    #[test]
    fn test_null_and_boolean() {
        let null = compile(json!({ "type": "null" }));
        assert!(null.accepts(&json!(null)));
        assert!(!null.accepts(&json!(false)));

        let boolean = compile(json!({ "type": "boolean" }));
        assert!(boolean.accepts(&json!(true)));
        assert!(!boolean.accepts(&json!("true")));
    }

    #[test]
    fn test_unknown_type_is_permissive() {
        let f = field(json!({ "type": "decimal" }));
        let mut compiler = Compiler::default();
        let v = compiler.compile_field(&f, None);
        assert!(v.is_permissive());
        assert_eq!(compiler.diagnostics().with_code(DiagnosticCode::UnknownType).count(), 1);
    }

    #[test]
    fn test_type_list_falls_back_to_permissive() {
        let f = field(json!({ "type": ["string", "null"] }));
        let mut compiler = Compiler::default();
        let v = compiler.compile_field(&f, None);
        assert!(v.is_permissive());
        assert_eq!(compiler.diagnostics().with_code(DiagnosticCode::UnknownType).count(), 1);
    }

    #[test]
    fn test_untyped_object_field_is_permissive() {
        let mut compiler = Compiler::default();
        let f = field(json!({ "type": "object" }));
        let v = compiler.compile_field(&f, None);
        assert!(v.is_permissive());
        assert!(compiler.diagnostics().is_empty());
    }

    #[test]
    fn test_object_field_with_inline_items() {
        let v = compile(json!({
            "type": "object",
            "items": {
                "type": "object",
                "properties": { "street": { "type": "string" } },
                "required": ["street"]
            }
        }));
        assert!(v.accepts(&json!({ "street": "Main" })));
        assert!(!v.accepts(&json!({})));
        assert!(!v.accepts(&json!([{ "street": "Main" }])));
    }

    #[test]
    fn test_array_of_primitives() {
        let v = compile(json!({ "type": "array", "items": { "type": "string", "format": "uuid" } }));
        assert!(v.accepts(&json!([])));
        assert!(v.accepts(&json!(["123e4567-e89b-12d3-a456-426614174000"])));
        assert!(!v.accepts(&json!(["nope"])));
        assert!(!v.accepts(&json!("123e4567-e89b-12d3-a456-426614174000")));
    }
}
