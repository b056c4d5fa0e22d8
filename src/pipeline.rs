//! End-to-end batch run: load, hydrate, list, classify, aggregate, summarize.

use crate::aggregate::aggregate;
use crate::classify::{classify, ClassifiedRecord};
use crate::error::ReportError;
use crate::extraction::hydrate;
use crate::report::{render_summary, render_text, DIVIDER};
use crate::schema::{schema_for, EntityKind, EntitySchema};
use crate::serialization::{serialize, ReportValue};
use serde_json::Value;
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;

/// The two parts of a finished report.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub listing: String,
    pub summary: ReportValue,
}

impl Report {
    /// Full stdout text: listing, divider, then the pretty JSON summary.
    pub fn to_output(&self) -> Result<String, ReportError> {
        let json = serialize(&self.summary)?;
        Ok(format!("{}\n{}\nJSON Response:\n{}\n", self.listing, DIVIDER, json))
    }
}

/// Read `path` and decode it as a JSON array.
///
/// The file is closed before this returns, on success and on every error.
pub fn load_elements(path: &Path) -> Result<Vec<Value>, ReportError> {
    let file = File::open(path).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let document: Value =
        serde_json::from_reader(BufReader::new(file)).map_err(|source| {
            if source.is_io() {
                ReportError::Io {
                    path: path.to_path_buf(),
                    source: source.into(),
                }
            } else {
                ReportError::Decode {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

    match document {
        Value::Array(elements) => Ok(elements),
        other => Err(ReportError::NotAnArray {
            path: path.to_path_buf(),
            found: json_kind(&other),
        }),
    }
}

/// Run the whole pipeline over already-decoded elements.
pub fn process(schema: &EntitySchema, elements: &[Value]) -> Report {
    let records: Vec<_> = elements
        .iter()
        .map(|element| hydrate(schema, element))
        .collect();

    let listing = render_text(schema, &records);

    let classified: Vec<ClassifiedRecord> = records
        .into_iter()
        .map(|record| classify(schema, record))
        .collect();

    let tally = aggregate(schema, &classified);
    let summary = render_summary(schema, &classified, &tally);

    tracing::info!(
        entity = schema.name(),
        records = classified.len(),
        "processed batch"
    );

    Report { listing, summary }
}

/// Load `path` and produce the complete report text for `kind`.
pub fn run(kind: EntityKind, path: &Path) -> Result<String, ReportError> {
    let elements = load_elements(path)?;
    tracing::info!(path = %path.display(), elements = elements.len(), "loaded input");
    process(schema_for(kind), &elements).to_output()
}

/// Write the finished report text to `out` and flush it.
pub fn write_report<W: Write>(out: &mut W, output: &str) -> Result<(), ReportError> {
    out.write_all(output.as_bytes())
        .and_then(|_| out.flush())
        .map_err(ReportError::Output)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
