//! JSON-schema-shaped parameter declarations and validation.
//!
//! Skills declare their arguments as a small JSON Schema subset (object
//! type, `properties`, `required`, `items`, `enum`). The host validates
//! the parsed argument object against the declaration before the handler
//! runs, so handlers can assume well-shaped input.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Declared parameter schema for a skill.
///
/// Only the subset actually used by skill declarations is interpreted:
/// `type`, `properties`, `required`, `items`, and `enum`. Members outside
/// the declared properties pass through unchecked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterSchema {
    #[serde(rename = "type")]
    pub schema_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
}

impl ParameterSchema {
    /// Validate an argument object against this schema.
    pub fn validate(&self, params: &Map<String, Value>) -> Result<(), SchemaError> {
        if let Some(required) = &self.required {
            for name in required {
                if !params.contains_key(name) {
                    return Err(SchemaError::MissingRequired { name: name.clone() });
                }
            }
        }

        if let Some(properties) = &self.properties {
            for (name, fragment) in properties {
                if let Some(value) = params.get(name) {
                    validate_fragment(name, fragment, value)?;
                }
            }
        }

        Ok(())
    }
}

/// Fluent builder for [`ParameterSchema`].
///
/// ```
/// use serde_json::json;
/// use shared::schema::SchemaBuilder;
///
/// let schema = SchemaBuilder::new()
///     .required_property("data", json!({"type": "array", "items": {"type": "object"}}))
///     .property("options", json!({"type": "object"}))
///     .build();
/// assert_eq!(schema.required.as_deref(), Some(&["data".to_string()][..]));
/// ```
pub struct SchemaBuilder {
    properties: Map<String, Value>,
    required: Vec<String>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self {
            properties: Map::new(),
            required: Vec::new(),
        }
    }

    /// Add an optional property.
    pub fn property(mut self, name: &str, schema: Value) -> Self {
        self.properties.insert(name.into(), schema);
        self
    }

    /// Add a required property.
    pub fn required_property(mut self, name: &str, schema: Value) -> Self {
        self.properties.insert(name.into(), schema);
        self.required.push(name.into());
        self
    }

    pub fn build(self) -> ParameterSchema {
        ParameterSchema {
            schema_type: "object".into(),
            properties: if self.properties.is_empty() {
                None
            } else {
                Some(self.properties)
            },
            required: if self.required.is_empty() {
                None
            } else {
                Some(self.required)
            },
        }
    }
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Schema validation failures
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("missing required parameter: {name}")]
    MissingRequired { name: String },

    #[error("parameter {path}: expected {expected}, got {actual}")]
    TypeMismatch {
        path: String,
        expected: String,
        actual: &'static str,
    },

    #[error("parameter {path}: {value} is not an allowed value")]
    EnumViolation { path: String, value: String },
}

/// Validate one value against a schema fragment, recursing into arrays
/// and nested objects.
fn validate_fragment(path: &str, fragment: &Value, value: &Value) -> Result<(), SchemaError> {
    if let Some(expected) = fragment.get("type").and_then(Value::as_str) {
        if !type_matches(expected, value) {
            return Err(SchemaError::TypeMismatch {
                path: path.to_string(),
                expected: expected.to_string(),
                actual: json_type_name(value),
            });
        }
    }

    if let Some(allowed) = fragment.get("enum").and_then(Value::as_array) {
        if !allowed.contains(value) {
            return Err(SchemaError::EnumViolation {
                path: path.to_string(),
                value: value.to_string(),
            });
        }
    }

    if let (Some(items), Some(elements)) = (fragment.get("items"), value.as_array()) {
        for (index, element) in elements.iter().enumerate() {
            validate_fragment(&format!("{}[{}]", path, index), items, element)?;
        }
    }

    if let Some(object) = value.as_object() {
        if let Some(required) = fragment.get("required").and_then(Value::as_array) {
            for name in required.iter().filter_map(Value::as_str) {
                if !object.contains_key(name) {
                    return Err(SchemaError::MissingRequired {
                        name: format!("{}.{}", path, name),
                    });
                }
            }
        }

        if let Some(properties) = fragment.get("properties").and_then(Value::as_object) {
            for (name, child) in properties {
                if let Some(member) = object.get(name) {
                    validate_fragment(&format!("{}.{}", path, name), child, member)?;
                }
            }
        }
    }

    Ok(())
}

fn type_matches(expected: &str, value: &Value) -> bool {
    match expected {
        "object" => value.is_object(),
        "array" => value.is_array(),
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "null" => value.is_null(),
        _ => true,
    }
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

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pivot_like_schema() -> ParameterSchema {
        SchemaBuilder::new()
            .required_property("data", json!({"type": "array", "items": {"type": "object"}}))
            .required_property("rows", json!({"type": "array", "items": {"type": "string"}}))
            .required_property(
                "values",
                json!({
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "field": {"type": "string"},
                            "aggregation": {"type": "string", "enum": ["sum", "count", "avg", "max", "min"]}
                        },
                        "required": ["field"]
                    }
                }),
            )
            .property("options", json!({"type": "object", "properties": {"width": {"type": "number"}}}))
            .build()
    }

    fn params(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn builder_separates_required_from_optional() {
        let schema = pivot_like_schema();
        let props = schema.properties.as_ref().unwrap();

        assert_eq!(props.len(), 4);
        assert_eq!(
            schema.required.as_deref(),
            Some(&["data".to_string(), "rows".to_string(), "values".to_string()][..])
        );
    }

    #[test]
    fn empty_builder_has_no_members() {
        let schema = SchemaBuilder::new().build();
        assert_eq!(schema.schema_type, "object");
        assert!(schema.properties.is_none());
        assert!(schema.required.is_none());
    }

    #[test]
    fn valid_params_pass() {
        let schema = pivot_like_schema();
        let input = params(json!({
            "data": [{"region": "East"}],
            "rows": ["region"],
            "values": [{"field": "sales", "aggregation": "avg"}],
        }));

        assert!(schema.validate(&input).is_ok());
    }

    #[test]
    fn missing_required_is_rejected() {
        let schema = pivot_like_schema();
        let input = params(json!({"data": [], "rows": []}));

        let err = schema.validate(&input).unwrap_err();
        assert!(matches!(err, SchemaError::MissingRequired { name } if name == "values"));
    }

    #[test]
    fn wrong_element_type_is_rejected() {
        let schema = pivot_like_schema();
        let input = params(json!({
            "data": [{"region": "East"}],
            "rows": ["region", 7],
            "values": [{"field": "sales"}],
        }));

        let err = schema.validate(&input).unwrap_err();
        assert!(matches!(err, SchemaError::TypeMismatch { path, .. } if path == "rows[1]"));
    }

    #[test]
    fn enum_violation_is_rejected() {
        let schema = pivot_like_schema();
        let input = params(json!({
            "data": [],
            "rows": ["region"],
            "values": [{"field": "sales", "aggregation": "median"}],
        }));

        let err = schema.validate(&input).unwrap_err();
        assert!(matches!(err, SchemaError::EnumViolation { .. }));
    }

    #[test]
    fn nested_required_member_is_enforced() {
        let schema = pivot_like_schema();
        let input = params(json!({
            "data": [],
            "rows": ["region"],
            "values": [{"aggregation": "sum"}],
        }));

        let err = schema.validate(&input).unwrap_err();
        assert!(matches!(err, SchemaError::MissingRequired { name } if name == "values[0].field"));
    }

    #[test]
    fn undeclared_members_pass_through() {
        let schema = pivot_like_schema();
        let input = params(json!({
            "data": [],
            "rows": [],
            "values": [],
            "extra": {"anything": true},
        }));

        assert!(schema.validate(&input).is_ok());
    }

    #[test]
    fn schema_serializes_like_the_wire_contract() {
        let schema = SchemaBuilder::new()
            .required_property("data", json!({"type": "array"}))
            .build();
        let value = serde_json::to_value(&schema).unwrap();

        assert_eq!(value["type"], "object");
        assert_eq!(value["required"], json!(["data"]));
        assert_eq!(value["properties"]["data"]["type"], "array");
    }
}
