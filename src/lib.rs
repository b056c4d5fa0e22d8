//! # foodreport: schema-driven batch reports
//!
//! Reads a JSON array of flat records of one entity kind (user account,
//! order, restaurant account), hydrates each element into a typed record,
//! derives status flags, prints a listing and emits a JSON summary with
//! per-record data, status counts and, for orders, revenue figures.
//!
//! ## Pipeline
//!
//! ```text
//! JSON array ─▶ hydrate ─▶ render_text
//!                  │
//!                  ▼
//!              classify ─▶ aggregate ─▶ render_summary ─▶ serialize
//! ```
//!
//! Every stage is driven by an [`EntitySchema`]. Field lists, defaults,
//! classification rules and the revenue aggregate are declared as tables in
//! [`schema::catalog`]; the stages themselves know nothing about a
//! particular entity.
//!
//! ## Example
//!
//! ```
//! use foodreport::{pipeline, schema_for, EntityKind, ReportValue};
//! use serde_json::json;
//!
//! let report = pipeline::process(
//!     schema_for(EntityKind::Order),
//!     &[json!({ "status": "delivered", "total_price": 12.5 })],
//! );
//! let counts = report.summary.get("status_counts").unwrap();
//! assert_eq!(counts.get("delivered").and_then(ReportValue::as_i64), Some(1));
//! ```

// Core modules
pub mod entity;
pub mod schema;
pub mod extraction;
pub mod classify;
pub mod aggregate;
pub mod serialization;
pub mod report;

// Batch run and binaries
pub mod error;
pub mod pipeline;
pub mod cli;

// Re-export key types
pub use entity::{FieldType, FieldValue, Record};
pub use schema::{
    schema_for, AggregateSpec, ClassificationRule, EntityKind, EntitySchema, FieldDescriptor,
    Predicate, SchemaError,
};
pub use extraction::hydrate;
pub use classify::{classify, ClassifiedRecord};
pub use aggregate::{aggregate, Revenue, Tally};
pub use serialization::{serialize, ReportValue};
pub use report::{render_summary, render_text};
pub use error::ReportError;
pub use pipeline::Report;
