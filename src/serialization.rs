//! Typed report tree and its JSON encoder.
//!
//! Reports are assembled as a [`ReportValue`] tree rather than by indexing
//! into loose JSON values. Objects keep insertion order, so the encoded
//! document lists keys in the order the schema declares them.

use crate::entity::FieldValue;
use indexmap::IndexMap;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::io::Write;

/// A node of the summary document
#[derive(Debug, Clone, PartialEq)]
pub enum ReportValue {
    Object(IndexMap<String, ReportValue>),
    Array(Vec<ReportValue>),
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl ReportValue {
    pub fn object() -> Self {
        ReportValue::Object(IndexMap::new())
    }

    /// Builder: append `key` to an object. Non-objects are returned unchanged.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ReportValue>) -> Self {
        if let ReportValue::Object(map) = &mut self {
            map.insert(key.into(), value.into());
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&ReportValue> {
        match self {
            ReportValue::Object(map) => map.get(key),
            _ => None,
        }
    }

    pub fn keys(&self) -> Vec<&str> {
        match self {
            ReportValue::Object(map) => map.keys().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }

    pub fn as_array(&self) -> Option<&[ReportValue]> {
        match self {
            ReportValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ReportValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ReportValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ReportValue::Float(f) => Some(*f),
            ReportValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ReportValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<&FieldValue> for ReportValue {
    fn from(value: &FieldValue) -> Self {
        match value {
            FieldValue::String(s) => ReportValue::String(s.clone()),
            FieldValue::Int(i) => ReportValue::Int(*i),
            FieldValue::Float(f) => ReportValue::Float(*f),
            FieldValue::Bool(b) => ReportValue::Bool(*b),
        }
    }
}

impl From<&str> for ReportValue {
    fn from(s: &str) -> Self {
        ReportValue::String(s.to_string())
    }
}

impl From<String> for ReportValue {
    fn from(s: String) -> Self {
        ReportValue::String(s)
    }
}

impl From<i64> for ReportValue {
    fn from(i: i64) -> Self {
        ReportValue::Int(i)
    }
}

impl From<f64> for ReportValue {
    fn from(f: f64) -> Self {
        ReportValue::Float(f)
    }
}

impl From<bool> for ReportValue {
    fn from(b: bool) -> Self {
        ReportValue::Bool(b)
    }
}

impl From<Vec<ReportValue>> for ReportValue {
    fn from(items: Vec<ReportValue>) -> Self {
        ReportValue::Array(items)
    }
}

impl Serialize for ReportValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ReportValue::Object(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map {
                    out.serialize_entry(key, value)?;
                }
                out.end()
            }
            ReportValue::Array(items) => serializer.collect_seq(items),
            ReportValue::String(s) => serializer.serialize_str(s),
            ReportValue::Int(i) => serializer.serialize_i64(*i),
            ReportValue::Float(f) => serializer.serialize_f64(*f),
            ReportValue::Bool(b) => serializer.serialize_bool(*b),
        }
    }
}

/// Write `value` as pretty JSON with 4-space indentation.
pub fn write_pretty<W: Write>(writer: W, value: &ReportValue) -> Result<(), serde_json::Error> {
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(writer, formatter);
    value.serialize(&mut serializer)
}

/// Encode `value` as pretty JSON with 4-space indentation.
pub fn serialize(value: &ReportValue) -> Result<String, serde_json::Error> {
    let mut buf = Vec::new();
    write_pretty(&mut buf, value)?;
    String::from_utf8(buf).map_err(<serde_json::Error as serde::ser::Error>::custom)
}
