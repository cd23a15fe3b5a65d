//! Schema Descriptors
//!
//! The already-parsed API schema handed to the compiler: named models, their
//! fields and constraints, and `$ref` pointers between them. Descriptors are
//! produced upstream (OpenAPI import, inferred codebase types) and are often
//! imperfect, so deserialization is lenient: every key is optional and any
//! type tag is accepted.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use tracing::debug;

use crate::error::Result;

// =============================================================================
// Type Tags
// =============================================================================

/// Declared kind of a model or field
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Value", into = "String")]
pub enum TypeTag {
    Object,
    Array,
    String,
    Number,
    Integer,
    Boolean,
    Null,
    /// Unrecognized tag, kept verbatim. An absent or null `type` is
    /// `Other("")`; a non-string `type` keeps its JSON text.
    Other(String),
}

impl TypeTag {
    pub fn from_json_type(type_str: &str) -> Self {
        match type_str {
            "object" => Self::Object,
            "array" => Self::Array,
            "string" => Self::String,
            "number" => Self::Number,
            "integer" => Self::Integer,
            "boolean" => Self::Boolean,
            "null" => Self::Null,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Object => "object",
            Self::Array => "array",
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Null => "null",
            Self::Other(other) => other,
        }
    }

    /// True when no `type` key was present at all
    pub fn is_unspecified(&self) -> bool {
        matches!(self, Self::Other(tag) if tag.is_empty())
    }
}

impl Default for TypeTag {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl From<Value> for TypeTag {
    fn from(value: Value) -> Self {
        match value {
            Value::String(tag) => Self::from_json_type(&tag),
            Value::Null => Self::default(),
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<TypeTag> for String {
    fn from(tag: TypeTag) -> Self {
        tag.as_str().to_string()
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unspecified() {
            write!(f, "<unspecified>")
        } else {
            write!(f, "{}", self.as_str())
        }
    }
}

// =============================================================================
// Constraints
// =============================================================================

/// Constraint vocabulary shared by fields and primitive models
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constraints {
    /// String sub-kind: email, uuid, uri/url, date-time, date, or anything else
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Explicit null is acceptable. Independent of required-ness.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub nullable: bool,
}

impl Constraints {
    /// The declared enum values that are strings, in declaration order
    pub fn string_enum(&self) -> Vec<&str> {
        self.enum_values
            .iter()
            .flatten()
            .filter_map(Value::as_str)
            .collect()
    }

    /// An `enum` key was present but none of its values are strings
    pub fn has_unusable_enum(&self) -> bool {
        self.enum_values.is_some() && self.string_enum().is_empty()
    }
}

// =============================================================================
// References
// =============================================================================

/// A `$ref` pointer to a model in the same schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceDescriptor {
    #[serde(rename = "$ref")]
    pub target: String,
}

impl ReferenceDescriptor {
    pub fn new(target: impl Into<String>) -> Self {
        Self { target: target.into() }
    }

    /// Name of the model this reference points at
    pub fn model_name(&self) -> &str {
        ref_model_name(&self.target)
    }
}

/// Extract a model name from a ref pointer.
///
/// `#/components/schemas/User`, `#/definitions/User`, `User.schema.json`
/// and `User` all name `User`.
pub fn ref_model_name(ref_path: &str) -> &str {
    let last = ref_path.rsplit('/').next().unwrap_or(ref_path);
    last.strip_suffix(".schema.json")
        .or_else(|| last.strip_suffix(".json"))
        .unwrap_or(last)
}

/// Element type of an array, or the nested shape of an object field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemsDescriptor {
    Reference(ReferenceDescriptor),
    Inline(Box<ModelDescriptor>),
}

// =============================================================================
// Fields and Models
// =============================================================================

/// One property inside an object model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    #[serde(rename = "type", default)]
    pub kind: TypeTag,
    #[serde(flatten)]
    pub constraints: Constraints,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<ItemsDescriptor>,
    /// Inline reference when the field is itself a `$ref`
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FieldDescriptor {
    pub fn new(kind: TypeTag) -> Self {
        Self { kind, ..Default::default() }
    }

    /// A field that points at another model
    pub fn reference(target: impl Into<String>) -> Self {
        Self {
            kind: TypeTag::Object,
            reference: Some(target.into()),
            ..Default::default()
        }
    }

    pub fn nullable(mut self) -> Self {
        self.constraints.nullable = true;
        self
    }
}

/// One named, reusable type: an object record, an array, or a primitive
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    #[serde(rename = "type", default)]
    pub kind: TypeTag,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, FieldDescriptor>,
    /// Field names that must be present. Names missing from `properties` are tolerated.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<ItemsDescriptor>,
    #[serde(flatten)]
    pub constraints: Constraints,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ModelDescriptor {
    pub fn new(kind: TypeTag) -> Self {
        Self { kind, ..Default::default() }
    }

    pub fn object() -> Self {
        Self::new(TypeTag::Object)
    }

    pub fn property(mut self, name: impl Into<String>, field: FieldDescriptor) -> Self {
        self.properties.insert(name.into(), field);
        self
    }

    pub fn required_property(mut self, name: impl Into<String>, field: FieldDescriptor) -> Self {
        let name = name.into();
        self.required.push(name.clone());
        self.properties.insert(name, field);
        self
    }

    pub fn is_required(&self, field_name: &str) -> bool {
        self.required.iter().any(|r| r == field_name)
    }

    /// Object model with at least one property: can be instantiated as fixture rows
    pub fn is_fixture_model(&self) -> bool {
        self.kind == TypeTag::Object && !self.properties.is_empty()
    }
}

// =============================================================================
// Schema
// =============================================================================

/// One side of a relationship: a bare model name or `{ model, field }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelationshipEnd {
    Model(String),
    Field {
        model: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        field: Option<String>,
    },
}

impl RelationshipEnd {
    pub fn model_name(&self) -> &str {
        match self {
            Self::Model(model) | Self::Field { model, .. } => model,
        }
    }
}

impl Default for RelationshipEnd {
    fn default() -> Self {
        Self::Model(String::new())
    }
}

/// Cross-model relationship (foreign key). Carried for consumers, not compiled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    #[serde(default)]
    pub from: RelationshipEnd,
    #[serde(default)]
    pub to: RelationshipEnd,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
}

/// The whole parsed API schema
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaDescriptor {
    #[serde(default)]
    pub models: BTreeMap<String, ModelDescriptor>,
    /// Entries that do not read as a relationship are skipped
    #[serde(
        default,
        deserialize_with = "lenient_relationships",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub relationships: Vec<Relationship>,
}

fn lenient_relationships<'de, D>(deserializer: D) -> std::result::Result<Vec<Relationship>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(Value::Array(entries)) = Option::<Value>::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };

    let relationships = entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value(entry) {
            Ok(relationship) => Some(relationship),
            Err(err) => {
                debug!(index, error = %err, "skipping unreadable relationship");
                None
            }
        })
        .collect();
    Ok(relationships)
}

impl SchemaDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(mut self, name: impl Into<String>, model: ModelDescriptor) -> Self {
        self.models.insert(name.into(), model);
        self
    }

    pub fn model(&self, name: &str) -> Option<&ModelDescriptor> {
        self.models.get(name)
    }

    /// Names of models the document compiler turns into fixture arrays
    pub fn fixture_model_names(&self) -> Vec<&str> {
        self.models
            .iter()
            .filter(|(_, model)| model.is_fixture_model())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Parse from JSON text. Errors carry the path of the offending element.
    pub fn from_json_str(source: &str) -> Result<Self> {
        let mut de = serde_json::Deserializer::from_str(source);
        let schema = serde_path_to_error::deserialize(&mut de)?;
        de.end()?;
        Ok(schema)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_path_to_error::deserialize(value)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&source)
    }
}
