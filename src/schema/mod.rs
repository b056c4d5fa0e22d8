//! Declarative entity schemas.
//!
//! An [`EntitySchema`] describes one entity kind: its ordered fields with
//! types and defaults, the classification rules derived from those fields,
//! the optional numeric aggregate, and the layout of its text listing. The
//! hydration, classification, aggregation and report stages are all driven
//! by the schema, so a new entity kind only needs a new table in
//! [`catalog`].

pub mod catalog;

use crate::entity::{FieldType, FieldValue, Record};
use convert_case::{Case, Casing};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

pub use catalog::{schema_for, EntityKind};

/// Computes a derived field from the already-hydrated input fields.
pub type DeriveFn = fn(&Record) -> FieldValue;

/// Where a field's value comes from
#[derive(Clone, Copy)]
pub enum FieldSource {
    /// Read from the input object under the field's name
    Input,
    /// Computed from the other fields after they have been read
    Derived(DeriveFn),
}

impl fmt::Debug for FieldSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldSource::Input => f.write_str("Input"),
            FieldSource::Derived(_) => f.write_str("Derived"),
        }
    }
}

/// One declared field of an entity schema.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub field_type: FieldType,
    pub default: FieldValue,
    pub source: FieldSource,
}

impl FieldDescriptor {
    fn input(name: &'static str, field_type: FieldType, default: FieldValue) -> Self {
        Self {
            name,
            field_type,
            default,
            source: FieldSource::Input,
        }
    }

    pub fn int(name: &'static str) -> Self {
        Self::input(name, FieldType::Int, FieldValue::Int(0))
    }

    pub fn float(name: &'static str) -> Self {
        Self::input(name, FieldType::Float, FieldValue::Float(0.0))
    }

    pub fn string(name: &'static str) -> Self {
        Self::input(name, FieldType::String, FieldValue::String(String::new()))
    }

    pub fn boolean(name: &'static str) -> Self {
        Self::input(name, FieldType::Bool, FieldValue::Bool(false))
    }

    /// A string field computed from the other fields of the record.
    pub fn derived(name: &'static str, derive: DeriveFn) -> Self {
        Self {
            name,
            field_type: FieldType::String,
            default: FieldValue::String(String::new()),
            source: FieldSource::Derived(derive),
        }
    }

    pub fn is_derived(&self) -> bool {
        matches!(self.source, FieldSource::Derived(_))
    }
}

/// Boolean predicate over a record and the flags evaluated before it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// String field equals a literal value
    FieldEquals {
        field: &'static str,
        value: &'static str,
    },
    /// True when any of the named rules is true
    AnyOf(Vec<&'static str>),
}

impl Predicate {
    /// Names of other rules this predicate reads.
    pub fn rule_references(&self) -> &[&'static str] {
        match self {
            Predicate::FieldEquals { .. } => &[],
            Predicate::AnyOf(rules) => rules,
        }
    }
}

/// A named classification flag attached to every record of a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationRule {
    /// Flag name in record output (e.g. `is_delivered`)
    pub name: &'static str,
    /// Key in the status tally (e.g. `delivered`)
    pub tally_key: &'static str,
    pub predicate: Predicate,
}

impl ClassificationRule {
    pub fn new(name: &'static str, predicate: Predicate) -> Self {
        Self {
            name,
            tally_key: name.strip_prefix("is_").unwrap_or(name),
            predicate,
        }
    }

    /// `name` is true when the `status` field equals `value`.
    pub fn status(name: &'static str, value: &'static str) -> Self {
        Self::new(
            name,
            Predicate::FieldEquals {
                field: "status",
                value,
            },
        )
    }

    pub fn any_of(name: &'static str, rules: &[&'static str]) -> Self {
        Self::new(name, Predicate::AnyOf(rules.to_vec()))
    }
}

/// Numeric aggregate over one field, skipping records with an excluding flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateSpec {
    pub field: &'static str,
    pub excluded_by: &'static str,
    pub sum_key: &'static str,
    pub average_key: &'static str,
}

/// One line of the human-readable listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingLine {
    pub label: &'static str,
    pub field: &'static str,
}

/// Error type for schema construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    DuplicateField(String),
    DuplicateRule(String),
    RuleShadowsField(String),
    UnknownField {
        context: String,
        field: String,
    },
    FieldNotComparable {
        rule: String,
        field: String,
    },
    UnknownRule {
        context: String,
        rule: String,
    },
    RuleCycle(Vec<String>),
    AggregateNotNumeric(String),
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::DuplicateField(name) => write!(f, "Duplicate field '{}'", name),
            SchemaError::DuplicateRule(name) => write!(f, "Duplicate rule '{}'", name),
            SchemaError::RuleShadowsField(name) => {
                write!(f, "Rule '{}' has the same name as a field", name)
            }
            SchemaError::UnknownField { context, field } => {
                write!(f, "{} refers to undefined field '{}'", context, field)
            }
            SchemaError::FieldNotComparable { rule, field } => {
                write!(f, "Rule '{}' compares non-string field '{}'", rule, field)
            }
            SchemaError::UnknownRule { context, rule } => {
                write!(f, "{} refers to undefined rule '{}'", context, rule)
            }
            SchemaError::RuleCycle(rules) => {
                write!(f, "Circular rule dependency among: {}", rules.join(", "))
            }
            SchemaError::AggregateNotNumeric(field) => {
                write!(f, "Aggregate field '{}' is not numeric", field)
            }
        }
    }
}

impl std::error::Error for SchemaError {}

/// The complete, validated description of one entity kind.
#[derive(Debug, Clone)]
pub struct EntitySchema {
    name: &'static str,
    fields: Vec<FieldDescriptor>,
    rules: Vec<ClassificationRule>,
    rule_order: Vec<usize>,
    aggregate: Option<AggregateSpec>,
    listing: Vec<ListingLine>,
}

impl EntitySchema {
    pub fn builder(name: &'static str) -> SchemaBuilder {
        SchemaBuilder {
            name,
            fields: Vec::new(),
            rules: Vec::new(),
            aggregate: None,
            listing: Vec::new(),
        }
    }

    /// Type name of the entity (e.g. `RestaurantAccount`)
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Rules in declaration order.
    pub fn rules(&self) -> &[ClassificationRule] {
        &self.rules
    }

    pub fn rule(&self, name: &str) -> Option<&ClassificationRule> {
        self.rules.iter().find(|r| r.name == name)
    }

    /// Rules in an order where every rule comes after the rules it references.
    pub fn evaluation_order(&self) -> impl Iterator<Item = &ClassificationRule> {
        self.rule_order.iter().map(|&i| &self.rules[i])
    }

    pub fn aggregate(&self) -> Option<&AggregateSpec> {
        self.aggregate.as_ref()
    }

    pub fn listing(&self) -> &[ListingLine] {
        &self.listing
    }

    /// Lower-case plural noun used in messages, e.g. `restaurant accounts`.
    ///
    /// Always plural, whatever the count (`Processed 1 orders:`).
    pub fn plural_noun(&self) -> String {
        format!("{}s", self.name.to_case(Case::Lower))
    }

    /// Key of the record array in the summary, e.g. `restaurant_accounts`.
    pub fn collection_key(&self) -> String {
        format!("{}s", self.name.to_case(Case::Snake))
    }
}

/// Builder for [`EntitySchema`]; `build` validates the declaration.
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    name: &'static str,
    fields: Vec<FieldDescriptor>,
    rules: Vec<ClassificationRule>,
    aggregate: Option<AggregateSpec>,
    listing: Vec<ListingLine>,
}

impl SchemaBuilder {
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn rule(mut self, rule: ClassificationRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn aggregate(mut self, aggregate: AggregateSpec) -> Self {
        self.aggregate = Some(aggregate);
        self
    }

    pub fn line(mut self, label: &'static str, field: &'static str) -> Self {
        self.listing.push(ListingLine { label, field });
        self
    }

    pub fn build(self) -> Result<EntitySchema, SchemaError> {
        let mut field_names = HashSet::new();
        for field in &self.fields {
            if !field_names.insert(field.name) {
                return Err(SchemaError::DuplicateField(field.name.to_string()));
            }
        }

        let mut rule_names = HashSet::new();
        for rule in &self.rules {
            if field_names.contains(rule.name) {
                return Err(SchemaError::RuleShadowsField(rule.name.to_string()));
            }
            if !rule_names.insert(rule.name) {
                return Err(SchemaError::DuplicateRule(rule.name.to_string()));
            }
        }

        for rule in &self.rules {
            if let Predicate::FieldEquals { field, .. } = &rule.predicate {
                let descriptor = self
                    .fields
                    .iter()
                    .find(|f| f.name == *field)
                    .ok_or_else(|| SchemaError::UnknownField {
                        context: format!("Rule '{}'", rule.name),
                        field: field.to_string(),
                    })?;
                if descriptor.field_type != FieldType::String {
                    return Err(SchemaError::FieldNotComparable {
                        rule: rule.name.to_string(),
                        field: field.to_string(),
                    });
                }
            }
        }

        if let Some(aggregate) = &self.aggregate {
            let descriptor = self
                .fields
                .iter()
                .find(|f| f.name == aggregate.field)
                .ok_or_else(|| SchemaError::UnknownField {
                    context: "Aggregate".to_string(),
                    field: aggregate.field.to_string(),
                })?;
            if !descriptor.field_type.is_numeric() {
                return Err(SchemaError::AggregateNotNumeric(aggregate.field.to_string()));
            }
            if !rule_names.contains(aggregate.excluded_by) {
                return Err(SchemaError::UnknownRule {
                    context: "Aggregate".to_string(),
                    rule: aggregate.excluded_by.to_string(),
                });
            }
        }

        for line in &self.listing {
            if !field_names.contains(line.field) {
                return Err(SchemaError::UnknownField {
                    context: format!("Listing line '{}'", line.label),
                    field: line.field.to_string(),
                });
            }
        }

        let rule_order = compute_rule_order(&self.rules)?;

        Ok(EntitySchema {
            name: self.name,
            fields: self.fields,
            rules: self.rules,
            rule_order,
            aggregate: self.aggregate,
            listing: self.listing,
        })
    }
}

/// Order rules so that referenced rules are evaluated first (Kahn's algorithm).
///
/// Rules with no pending references are released in declaration order, so the
/// result is deterministic.
fn compute_rule_order(rules: &[ClassificationRule]) -> Result<Vec<usize>, SchemaError> {
    let index: HashMap<&str, usize> = rules
        .iter()
        .enumerate()
        .map(|(i, rule)| (rule.name, i))
        .collect();

    let mut in_degree = vec![0usize; rules.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); rules.len()];

    for (i, rule) in rules.iter().enumerate() {
        for reference in rule.predicate.rule_references() {
            let dep = *index
                .get(reference)
                .ok_or_else(|| SchemaError::UnknownRule {
                    context: format!("Rule '{}'", rule.name),
                    rule: reference.to_string(),
                })?;
            in_degree[i] += 1;
            dependents[dep].push(i);
        }
    }

    let mut queue: VecDeque<usize> = (0..rules.len()).filter(|&i| in_degree[i] == 0).collect();
    let mut sorted = Vec::with_capacity(rules.len());

    while let Some(i) = queue.pop_front() {
        sorted.push(i);
        for &dependent in &dependents[i] {
            in_degree[dependent] -= 1;
            if in_degree[dependent] == 0 {
                queue.push_back(dependent);
            }
        }
    }

    if sorted.len() != rules.len() {
        let stuck = (0..rules.len())
            .filter(|&i| in_degree[i] > 0)
            .map(|i| rules[i].name.to_string())
            .collect();
        return Err(SchemaError::RuleCycle(stuck));
    }

    Ok(sorted)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket_builder() -> SchemaBuilder {
        EntitySchema::builder("SupportTicket")
            .field(FieldDescriptor::int("id"))
            .field(FieldDescriptor::string("status"))
            .field(FieldDescriptor::float("cost"))
    }

    #[test]
    fn test_rule_order_places_dependencies_first() {
        let schema = ticket_builder()
            .rule(ClassificationRule::any_of("is_done", &["is_closed", "is_resolved"]))
            .rule(ClassificationRule::status("is_closed", "closed"))
            .rule(ClassificationRule::status("is_resolved", "resolved"))
            .build()
            .unwrap();

        let order: Vec<&str> = schema.evaluation_order().map(|r| r.name).collect();
        assert_eq!(order, vec!["is_closed", "is_resolved", "is_done"]);

        // Declaration order is untouched
        let declared: Vec<&str> = schema.rules().iter().map(|r| r.name).collect();
        assert_eq!(declared, vec!["is_done", "is_closed", "is_resolved"]);
    }

    #[test]
    fn test_tally_key_strips_prefix() {
        let rule = ClassificationRule::status("is_open", "open");
        assert_eq!(rule.tally_key, "open");

        let bare = ClassificationRule::status("flagged", "flagged");
        assert_eq!(bare.tally_key, "flagged");
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let err = ticket_builder()
            .field(FieldDescriptor::string("status"))
            .build()
            .unwrap_err();
        assert_eq!(err, SchemaError::DuplicateField("status".to_string()));
    }

    #[test]
    fn test_rule_name_must_not_shadow_field() {
        let err = ticket_builder()
            .rule(ClassificationRule::status("status", "open"))
            .build()
            .unwrap_err();
        assert_eq!(err, SchemaError::RuleShadowsField("status".to_string()));
    }

    #[test]
    fn test_duplicate_rule_rejected() {
        let err = ticket_builder()
            .rule(ClassificationRule::status("is_open", "open"))
            .rule(ClassificationRule::status("is_open", "reopened"))
            .build()
            .unwrap_err();
        assert_eq!(err, SchemaError::DuplicateRule("is_open".to_string()));
    }

    #[test]
    fn test_unknown_rule_reference_rejected() {
        let err = ticket_builder()
            .rule(ClassificationRule::any_of("is_done", &["is_closed"]))
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::UnknownRule { ref rule, .. } if rule == "is_closed"));
    }

    #[test]
    fn test_rule_cycle_rejected() {
        let err = ticket_builder()
            .rule(ClassificationRule::any_of("is_a", &["is_b"]))
            .rule(ClassificationRule::any_of("is_b", &["is_a"]))
            .rule(ClassificationRule::status("is_c", "c"))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            SchemaError::RuleCycle(vec!["is_a".to_string(), "is_b".to_string()])
        );
    }

    #[test]
    fn test_status_rule_needs_string_field() {
        let err = EntitySchema::builder("Counter")
            .field(FieldDescriptor::int("status"))
            .rule(ClassificationRule::status("is_zero", "0"))
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::FieldNotComparable { .. }));
    }

    #[test]
    fn test_aggregate_validation() {
        let not_numeric = ticket_builder()
            .rule(ClassificationRule::status("is_void", "void"))
            .aggregate(AggregateSpec {
                field: "status",
                excluded_by: "is_void",
                sum_key: "total",
                average_key: "average",
            })
            .build()
            .unwrap_err();
        assert_eq!(not_numeric, SchemaError::AggregateNotNumeric("status".to_string()));

        let unknown_rule = ticket_builder()
            .aggregate(AggregateSpec {
                field: "cost",
                excluded_by: "is_void",
                sum_key: "total",
                average_key: "average",
            })
            .build()
            .unwrap_err();
        assert!(matches!(unknown_rule, SchemaError::UnknownRule { .. }));
    }

    #[test]
    fn test_listing_must_name_fields() {
        let err = ticket_builder().line("Owner", "owner").build().unwrap_err();
        assert!(matches!(err, SchemaError::UnknownField { ref field, .. } if field == "owner"));
    }

    #[test]
    fn test_entity_naming() {
        let schema = ticket_builder().build().unwrap();
        assert_eq!(schema.plural_noun(), "support tickets");
        assert_eq!(schema.collection_key(), "support_tickets");
    }
}
