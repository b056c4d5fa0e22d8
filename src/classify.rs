//! Status-derived classification flags.

use crate::entity::Record;
use crate::schema::{EntitySchema, Predicate};
use indexmap::IndexMap;

/// A hydrated record with its classification flags.
///
/// Flags are keyed by rule name and listed in rule declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedRecord {
    pub record: Record,
    flags: IndexMap<&'static str, bool>,
}

impl ClassifiedRecord {
    /// Value of a flag; unknown names are `false`.
    pub fn flag(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }

    pub fn flags(&self) -> impl Iterator<Item = (&'static str, bool)> + '_ {
        self.flags.iter().map(|(name, value)| (*name, *value))
    }
}

/// Evaluate every rule of `schema` against `record`.
///
/// Rules run in dependency order so that `AnyOf` rules see the flags they
/// combine. A status value no rule mentions leaves every status flag false.
pub fn classify(schema: &EntitySchema, record: Record) -> ClassifiedRecord {
    let mut evaluated: IndexMap<&'static str, bool> = IndexMap::with_capacity(schema.rules().len());

    for rule in schema.evaluation_order() {
        let value = match &rule.predicate {
            Predicate::FieldEquals { field, value } => record.get_str(field) == *value,
            Predicate::AnyOf(rules) => rules
                .iter()
                .any(|name| evaluated.get(name).copied().unwrap_or(false)),
        };
        evaluated.insert(rule.name, value);
    }

    let flags = schema
        .rules()
        .iter()
        .map(|rule| (rule.name, evaluated.get(rule.name).copied().unwrap_or(false)))
        .collect();

    ClassifiedRecord { record, flags }
}
