//! Output-schema descriptors and the tool-input schema compiler
//!
//! A task declares the fields it wants back as a flat map of
//! [`FieldDescriptor`]s. [`compile_schema`] turns that map into the
//! `input_schema` object the provider expects on a tool definition. Every
//! declared field becomes required; there are no optional structured fields.

use crate::error::LlmError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Primitive JSON type of a structured field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// JSON string
    String,
    /// JSON number (integer or float)
    Number,
    /// JSON integer
    Integer,
    /// JSON boolean
    Boolean,
}

impl FieldType {
    /// Parse a wire type tag
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "string" => Some(FieldType::String),
            "number" => Some(FieldType::Number),
            "integer" => Some(FieldType::Integer),
            "boolean" => Some(FieldType::Boolean),
            _ => None,
        }
    }

    /// Wire type tag
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Integer => "integer",
            FieldType::Boolean => "boolean",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type tag and description for one structured field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Primitive type the model must produce
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Human-readable description shown to the model
    pub description: String,
}

impl FieldDescriptor {
    /// Create a descriptor
    pub fn new(field_type: FieldType, description: impl Into<String>) -> Self {
        Self {
            field_type,
            description: description.into(),
        }
    }

    /// Shorthand for a string field
    pub fn string(description: impl Into<String>) -> Self {
        Self::new(FieldType::String, description)
    }

    /// Decode a descriptor from an untyped `{type, description}` object
    pub fn from_value(field: &str, value: &Value) -> Result<Self, LlmError> {
        let obj = value
            .as_object()
            .ok_or_else(|| LlmError::schema(field, "descriptor is not an object"))?;

        let tag = obj
            .get("type")
            .ok_or_else(|| LlmError::schema(field, "missing type"))?
            .as_str()
            .ok_or_else(|| LlmError::schema(field, "type must be a string"))?;

        let field_type = FieldType::from_tag(tag)
            .ok_or_else(|| LlmError::schema(field, format!("unsupported type '{}'", tag)))?;

        let description = obj
            .get("description")
            .ok_or_else(|| LlmError::schema(field, "missing description"))?
            .as_str()
            .ok_or_else(|| LlmError::schema(field, "description must be a string"))?;

        Ok(Self::new(field_type, description))
    }
}

/// Field name → descriptor, as declared by a task
pub type OutputSchema = BTreeMap<String, FieldDescriptor>;

/// Decode an untyped field map (e.g. loaded from a JSON file)
pub fn parse_output_schema(value: &Value) -> Result<OutputSchema, LlmError> {
    let obj = value
        .as_object()
        .ok_or_else(|| LlmError::schema("<root>", "output schema must be a JSON object"))?;

    let mut schema = OutputSchema::new();
    for (name, descriptor) in obj {
        schema.insert(name.clone(), FieldDescriptor::from_value(name, descriptor)?);
    }
    Ok(schema)
}

/// One entry of `input_schema.properties`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertySchema {
    /// Wire type tag
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Description shown to the model
    pub description: String,
}

/// The `input_schema` object of a tool definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolSchema {
    /// Always `"object"`
    #[serde(rename = "type")]
    pub schema_type: &'static str,
    /// Declared fields
    pub properties: BTreeMap<String, PropertySchema>,
    /// Every key of `properties`
    pub required: Vec<String>,
}

/// Compile a task's output schema into a tool-input schema
///
/// # Errors
///
/// Returns [`LlmError::Schema`] naming the first field with an empty name or
/// an empty description.
pub fn compile_schema(schema: &OutputSchema) -> Result<ToolSchema, LlmError> {
    let mut properties = BTreeMap::new();

    for (name, descriptor) in schema {
        if name.trim().is_empty() {
            return Err(LlmError::schema(name.as_str(), "field name is empty"));
        }
        if descriptor.description.trim().is_empty() {
            return Err(LlmError::schema(name.as_str(), "missing description"));
        }

        properties.insert(
            name.clone(),
            PropertySchema {
                field_type: descriptor.field_type,
                description: descriptor.description.clone(),
            },
        );
    }

    let required = properties.keys().cloned().collect();

    Ok(ToolSchema {
        schema_type: "object",
        properties,
        required,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_schema() -> OutputSchema {
        let mut schema = OutputSchema::new();
        schema.insert(
            "date".to_string(),
            FieldDescriptor::string("The creation date of the invoice"),
        );
        schema.insert("total".to_string(), FieldDescriptor::new(FieldType::Number, "Gross total"));
        schema.insert("paid".to_string(), FieldDescriptor::new(FieldType::Boolean, "Already paid"));
        schema
    }

    #[test]
    fn test_required_matches_properties() {
        let schema = sample_schema();
        let compiled = compile_schema(&schema).unwrap();

        assert_eq!(compiled.schema_type, "object");
        assert_eq!(compiled.required.len(), schema.len());
        for name in schema.keys() {
            assert!(compiled.required.contains(name));
            assert!(compiled.properties.contains_key(name));
        }
        assert_eq!(compiled.properties["total"].field_type, FieldType::Number);
        assert_eq!(compiled.properties["date"].description, "The creation date of the invoice");
    }

    #[test]
    fn test_wire_shape() {
        let mut schema = OutputSchema::new();
        schema.insert(
            "date".to_string(),
            FieldDescriptor::string("The creation date of the invoice"),
        );

        let json = serde_json::to_value(compile_schema(&schema).unwrap()).unwrap();
        assert_eq!(
            json,
            json!({
                "type": "object",
                "properties": {
                    "date": {"type": "string", "description": "The creation date of the invoice"}
                },
                "required": ["date"]
            })
        );
    }

    #[test]
    fn test_empty_description_rejected() {
        let mut schema = sample_schema();
        schema.insert("vendor".to_string(), FieldDescriptor::string("  "));

        match compile_schema(&schema) {
            Err(LlmError::Schema { field, reason }) => {
                assert_eq!(field, "vendor");
                assert_eq!(reason, "missing description");
            }
            other => panic!("Expected Schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_field_name_rejected() {
        let mut schema = OutputSchema::new();
        schema.insert(String::new(), FieldDescriptor::string("something"));
        assert!(matches!(compile_schema(&schema), Err(LlmError::Schema { .. })));
    }

    #[test]
    fn test_parse_untyped_schema() {
        let value = json!({
            "date": {"type": "string", "description": "Issue date"},
            "total": {"type": "number", "description": "Gross total"}
        });
        let schema = parse_output_schema(&value).unwrap();
        assert_eq!(schema.len(), 2);
        assert_eq!(schema["total"].field_type, FieldType::Number);
    }

    #[test]
    fn test_parse_missing_description() {
        let value = json!({"date": {"type": "string"}});
        match parse_output_schema(&value) {
            Err(LlmError::Schema { field, reason }) => {
                assert_eq!(field, "date");
                assert_eq!(reason, "missing description");
            }
            other => panic!("Expected Schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_wrong_shapes() {
        assert!(parse_output_schema(&json!(["date"])).is_err());
        assert!(parse_output_schema(&json!({"date": "string"})).is_err());
        assert!(parse_output_schema(&json!({"date": {"type": 1, "description": "d"}})).is_err());
        let unknown_type = json!({"date": {"type": "date", "description": "d"}});
        assert!(parse_output_schema(&unknown_type).is_err());
        let bad_description = json!({"date": {"type": "string", "description": 5}});
        assert!(parse_output_schema(&bad_description).is_err());
    }
}
