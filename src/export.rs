//! JSON Schema export
//!
//! Renders a compiled validator back into a JSON Schema value, the form
//! structured-output generators expect. The mapping is one-to-one with the
//! validator variants; nothing is re-read from the original descriptors.

use serde_json::{json, Map, Number, Value};

use crate::validator::{NumberRules, ObjectValidator, StringRules, UnknownKeys, Validator};

pub fn to_json_schema(validator: &Validator) -> Value {
    match validator {
        Validator::Permissive => json!({ "type": "object", "additionalProperties": true }),
        Validator::Null => json!({ "type": "null" }),
        Validator::Boolean => json!({ "type": "boolean" }),
        Validator::Number(rules) => number_schema(rules),
        Validator::String(rules) => string_schema(rules),
        Validator::Literal(value) => json!({ "type": "string", "const": value }),
        Validator::OneOf(values) => json!({ "type": "string", "enum": values }),
        Validator::Array(items) => json!({ "type": "array", "items": to_json_schema(items) }),
        Validator::Object(object) => object_to_json_schema(object),
        Validator::Nullable(inner) => json!({ "anyOf": [to_json_schema(inner), { "type": "null" }] }),
    }
}

/// Object schema with `required` listing every non-optional key in key order
pub fn object_to_json_schema(object: &ObjectValidator) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for (name, field) in object.fields() {
        properties.insert(name.to_string(), to_json_schema(&field.validator));
        if !field.optional {
            required.push(Value::String(name.to_string()));
        }
    }

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": object.unknown_keys() == UnknownKeys::Allow,
    })
}

fn number_schema(rules: &NumberRules) -> Value {
    let mut schema = Map::new();
    let kind = if rules.integer { "integer" } else { "number" };
    schema.insert("type".into(), json!(kind));
    if let Some(min) = rules.minimum {
        schema.insert("minimum".into(), number_value(min));
    }
    if let Some(max) = rules.maximum {
        schema.insert("maximum".into(), number_value(max));
    }
    Value::Object(schema)
}

fn string_schema(rules: &StringRules) -> Value {
    let mut schema = Map::new();
    schema.insert("type".into(), json!("string"));
    if let Some(format) = rules.format {
        schema.insert("format".into(), json!(format.as_str()));
    }
    if let Some(min) = rules.min_length {
        schema.insert("minLength".into(), json!(min));
    }
    if let Some(max) = rules.max_length {
        schema.insert("maxLength".into(), json!(max));
    }
    if let Some(pattern) = &rules.pattern {
        schema.insert("pattern".into(), json!(pattern.as_str()));
    }
    Value::Object(schema)
}

/// Whole numbers print without a trailing `.0`
fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Value::Number(Number::from(n as i64))
    } else {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::{Pattern, StringFormat};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_primitives() {
        assert_eq!(
            to_json_schema(&Validator::Permissive),
            json!({ "type": "object", "additionalProperties": true })
        );
        assert_eq!(to_json_schema(&Validator::Null), json!({ "type": "null" }));
        assert_eq!(
            to_json_schema(&Validator::Literal("x".into())),
            json!({ "type": "string", "const": "x" })
        );
        assert_eq!(
            to_json_schema(&Validator::OneOf(vec!["a".into(), "b".into()])),
            json!({ "type": "string", "enum": ["a", "b"] })
        );
    }

    #[test]
    fn test_string_rules() {
        let v = Validator::String(
            StringRules::default()
                .with_format(StringFormat::Url)
                .with_length(None, Some(64))
                .with_pattern(Pattern::new("^https").unwrap()),
        );
        assert_eq!(
            to_json_schema(&v),
            json!({ "type": "string", "format": "uri", "maxLength": 64, "pattern": "^https" })
        );
    }

    #[test]
    fn test_number_bounds() {
        let v = Validator::Number(NumberRules::integer().with_bounds(Some(0.0), Some(120.0)));
        assert_eq!(to_json_schema(&v), json!({ "type": "integer", "minimum": 0, "maximum": 120 }));

        let v = Validator::Number(NumberRules::default().with_bounds(None, Some(0.5)));
        assert_eq!(to_json_schema(&v), json!({ "type": "number", "maximum": 0.5 }));
    }

    #[test]
    fn test_object_with_nullable_array() {
        let object = ObjectValidator::new()
            .field("id", Validator::string())
            .optional_field("tags", Validator::array_of(Validator::string()).nullable())
            .with_unknown_keys(UnknownKeys::Reject);

        assert_eq!(
            object_to_json_schema(&object),
            json!({
                "type": "object",
                "properties": {
                    "id": { "type": "string" },
                    "tags": {
                        "anyOf": [
                            { "type": "array", "items": { "type": "string" } },
                            { "type": "null" }
                        ]
                    }
                },
                "required": ["id"],
                "additionalProperties": false
            })
        );
    }
}
