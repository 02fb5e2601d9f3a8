//! Envelope parsing and structural validation of generated output.
//!
//! Validation here is deliberately lightweight: required properties and
//! primitive type checks against the extractor's schema. Full JSON
//! Schema enforcement is delegated to generation backends that support
//! constrained output; this layer catches the mismatches that slip
//! through and attributes them to a path.

use schemars::schema::{InstanceType, RootSchema, Schema, SchemaObject, SingleOrVec};
use serde_json::Value;

use crate::error::{ExtractError, Result, SchemaViolation};

/// Parse the `{ "items": [...] }` envelope from raw generator output.
pub fn parse_items(output: &Value) -> Result<Vec<Value>> {
    let envelope = output.as_object().ok_or_else(|| ExtractError::UnparseableOutput {
        message: format!("expected a JSON object envelope, got {}", type_name(output)),
    })?;

    let items = envelope
        .get("items")
        .ok_or_else(|| ExtractError::SchemaMismatch {
            violations: vec![SchemaViolation::new("items", "missing required field")],
        })?;

    let array = items.as_array().ok_or_else(|| ExtractError::SchemaMismatch {
        violations: vec![SchemaViolation::new(
            "items",
            format!("expected array, got {}", type_name(items)),
        )],
    })?;

    Ok(array.clone())
}

/// Validate each item against the extractor's item schema.
///
/// Collects all violations before failing, so a single bad response
/// reports every problem at once.
pub fn validate_items(items: &[Value], schema: &RootSchema) -> Result<()> {
    let mut violations = Vec::new();

    for (i, item) in items.iter().enumerate() {
        check_value(item, &schema.schema, &format!("items[{i}]"), &mut violations);
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ExtractError::SchemaMismatch { violations })
    }
}

fn check_value(value: &Value, schema: &SchemaObject, path: &str, violations: &mut Vec<SchemaViolation>) {
    if let Some(types) = &schema.instance_type {
        if !matches_type(value, types) {
            violations.push(SchemaViolation::new(
                path,
                format!("expected {}, got {}", describe_types(types), type_name(value)),
            ));
            return;
        }
    }

    let Some(object_schema) = &schema.object else {
        return;
    };
    let Some(object) = value.as_object() else {
        return;
    };

    for required in &object_schema.required {
        if !object.contains_key(required) {
            violations.push(SchemaViolation::new(
                format!("{path}.{required}"),
                "missing required field",
            ));
        }
    }

    for (name, property_schema) in &object_schema.properties {
        if let (Some(property), Schema::Object(property_schema)) =
            (object.get(name), property_schema)
        {
            check_value(property, property_schema, &format!("{path}.{name}"), violations);
        }
    }
}

fn matches_type(value: &Value, types: &SingleOrVec<InstanceType>) -> bool {
    let check = |t: &InstanceType| match t {
        InstanceType::Null => value.is_null(),
        InstanceType::Boolean => value.is_boolean(),
        InstanceType::Object => value.is_object(),
        InstanceType::Array => value.is_array(),
        InstanceType::Number => value.is_number(),
        InstanceType::String => value.is_string(),
        InstanceType::Integer => value.is_i64() || value.is_u64(),
    };

    match types {
        SingleOrVec::Single(t) => check(t),
        SingleOrVec::Vec(ts) => ts.iter().any(check),
    }
}

fn describe_types(types: &SingleOrVec<InstanceType>) -> String {
    match types {
        SingleOrVec::Single(t) => format!("{t:?}").to_lowercase(),
        SingleOrVec::Vec(ts) => ts
            .iter()
            .map(|t| format!("{t:?}").to_lowercase())
            .collect::<Vec<_>>()
            .join(" | "),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
