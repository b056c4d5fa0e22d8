//! Record hydration: decoded JSON objects to fully-defaulted typed records.
//!
//! Every schema field is filled independently. A field that is present with
//! a value of its declared kind is taken as-is; a field that is absent,
//! `null`, or of another kind resolves to its default. Hydration never fails.

use crate::entity::{FieldType, FieldValue, Record};
use crate::schema::{EntitySchema, FieldSource};
use serde_json::{Map, Value};

/// Hydrate one element of the input array.
///
/// Elements that are not objects have no keys, so they hydrate to an
/// all-default record.
pub fn hydrate(schema: &EntitySchema, element: &Value) -> Record {
    match element {
        Value::Object(object) => hydrate_object(schema, object),
        other => {
            tracing::debug!(
                entity = schema.name(),
                "array element is {} rather than an object; using defaults",
                json_kind(other)
            );
            hydrate_object(schema, &Map::new())
        }
    }
}

/// Hydrate a JSON object against `schema`.
pub fn hydrate_object(schema: &EntitySchema, object: &Map<String, Value>) -> Record {
    let mut record = Record::with_capacity(schema.fields().len());

    // Input fields first; derived fields hold their slot with the default
    for field in schema.fields() {
        let value = match field.source {
            FieldSource::Input => match object.get(field.name) {
                Some(raw) => coerce(raw, field.field_type).unwrap_or_else(|| {
                    if !raw.is_null() {
                        tracing::debug!(
                            entity = schema.name(),
                            field = field.name,
                            expected = field.field_type.as_str(),
                            "found {}; using default",
                            json_kind(raw)
                        );
                    }
                    field.default.clone()
                }),
                None => field.default.clone(),
            },
            FieldSource::Derived(_) => field.default.clone(),
        };
        record.set(field.name, value);
    }

    for field in schema.fields() {
        if let FieldSource::Derived(derive) = field.source {
            let value = derive(&record);
            record.set(field.name, value);
        }
    }

    record
}

/// Accept `raw` if it is already of kind `field_type`.
///
/// Integers widen into float fields; nothing else converts. Numeric strings
/// stay strings.
fn coerce(raw: &Value, field_type: FieldType) -> Option<FieldValue> {
    match (field_type, raw) {
        (FieldType::Int, Value::Number(n)) => n.as_i64().map(FieldValue::Int),
        (FieldType::Float, Value::Number(n)) => n.as_f64().map(FieldValue::Float),
        (FieldType::String, Value::String(s)) => Some(FieldValue::String(s.clone())),
        (FieldType::Bool, Value::Bool(b)) => Some(FieldValue::Bool(*b)),
        _ => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(n) if n.is_f64() => "a floating-point number",
        Value::Number(_) => "an integer",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
