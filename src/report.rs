//! Human-readable listing and structured summary of a batch.

use crate::aggregate::Tally;
use crate::classify::ClassifiedRecord;
use crate::entity::{FieldValue, Record};
use crate::schema::EntitySchema;
use crate::serialization::ReportValue;
use std::fmt::Write;

/// Line printed between record blocks and before the JSON summary.
pub const DIVIDER: &str = "-----------------------------------";

/// Count line followed by one labelled block per record.
pub fn render_text(schema: &EntitySchema, records: &[Record]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Processed {} {}:", records.len(), schema.plural_noun());

    for record in records {
        let _ = writeln!(out, "\n{}", DIVIDER);
        for line in schema.listing() {
            let value = record.get(line.field).map(display_value).unwrap_or_default();
            let _ = writeln!(out, "{}: {}", line.label, value);
        }
    }

    out
}

fn display_value(value: &FieldValue) -> String {
    match value {
        FieldValue::Float(f) => format!("{:.2}", f),
        FieldValue::Bool(true) => "Yes".to_string(),
        FieldValue::Bool(false) => "No".to_string(),
        other => other.to_string(),
    }
}

/// One record as an object: fields in schema order, then flags in rule order.
pub fn record_value(record: &ClassifiedRecord) -> ReportValue {
    let mut value = ReportValue::object();
    for (name, field) in record.record.iter() {
        value = value.with(name, field);
    }
    for (name, flag) in record.flags() {
        value = value.with(name, flag);
    }
    value
}

/// Assemble the summary document for a processed batch.
///
/// `status_counts` is present only for schemas with rules; the sum and
/// average keys only for schemas with a numeric aggregate.
pub fn render_summary(
    schema: &EntitySchema,
    records: &[ClassifiedRecord],
    tally: &Tally,
) -> ReportValue {
    let mut summary = ReportValue::object()
        .with("status", "success")
        .with(
            "message",
            format!("Successfully processed {} {}", records.len(), schema.plural_noun()),
        )
        .with(
            schema.collection_key(),
            records.iter().map(record_value).collect::<Vec<_>>(),
        );

    if !schema.rules().is_empty() {
        let mut counts = ReportValue::object();
        for rule in schema.rules() {
            counts = counts.with(rule.tally_key, tally.count(rule.name) as i64);
        }
        summary = summary.with("status_counts", counts);
    }

    if let (Some(spec), Some(revenue), Some(average)) =
        (schema.aggregate(), tally.revenue(), tally.average())
    {
        summary = summary
            .with(spec.sum_key, revenue.sum)
            .with(spec.average_key, average);
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::classify::classify;
    use crate::extraction::hydrate;
    use crate::schema::{schema_for, EntityKind};
    use serde_json::{json, Value};

    fn summarize(kind: EntityKind, values: Vec<Value>) -> ReportValue {
        let schema = schema_for(kind);
        let records: Vec<ClassifiedRecord> = values
            .iter()
            .map(|value| classify(schema, hydrate(schema, value)))
            .collect();
        let tally = aggregate(schema, &records);
        render_summary(schema, &records, &tally)
    }

    #[test]
    fn test_render_text_blocks() {
        let schema = schema_for(EntityKind::RestaurantAccount);
        let records = vec![
            hydrate(schema, &json!({ "id": 3, "restaurant_name": "Dar Zitoun", "status": "approved" })),
            hydrate(schema, &json!({ "id": 4, "city": "Fes" })),
        ];

        let text = render_text(schema, &records);
        assert!(text.starts_with("Processed 2 restaurant accounts:\n"));
        assert_eq!(text.matches(DIVIDER).count(), 2);
        assert!(text.contains("Restaurant ID: 3\nName: Dar Zitoun\nOwner: \nStatus: approved\n"));
        assert!(text.contains("Restaurant ID: 4\n"));
        assert!(text.contains("City: Fes\n"));
    }

    #[test]
    fn test_render_text_formats_values() {
        let schema = schema_for(EntityKind::Order);
        let records = vec![hydrate(
            schema,
            &json!({ "order_id": 1, "total_price": 12.5, "is_takeaway": true }),
        )];

        let text = render_text(schema, &records);
        assert!(text.starts_with("Processed 1 orders:\n"));
        assert!(text.contains("Total Price: 12.50\n"));
        assert!(text.contains("Takeaway: Yes\n"));
    }

    #[test]
    fn test_render_text_uses_derived_name() {
        let schema = schema_for(EntityKind::Account);
        let records = vec![hydrate(schema, &json!({ "username": "nadia" }))];

        let text = render_text(schema, &records);
        assert!(text.contains("Name: nadia\n"));
    }

    #[test]
    fn test_render_text_empty_batch() {
        let schema = schema_for(EntityKind::Account);
        assert_eq!(render_text(schema, &[]), "Processed 0 accounts:\n");
    }

    #[test]
    fn test_delivered_order_summary() {
        let summary = summarize(
            EntityKind::Order,
            vec![json!({ "status": "delivered", "total_price": 12.5 })],
        );

        let first = &summary.get("orders").and_then(ReportValue::as_array).unwrap()[0];
        assert_eq!(first.get("is_delivered").and_then(ReportValue::as_bool), Some(true));
        assert_eq!(first.get("is_completed").and_then(ReportValue::as_bool), Some(true));

        let counts = summary.get("status_counts").unwrap();
        assert_eq!(counts.get("delivered").and_then(ReportValue::as_i64), Some(1));
        assert_eq!(counts.get("completed").and_then(ReportValue::as_i64), Some(1));
        assert_eq!(summary.get("total_revenue").and_then(ReportValue::as_f64), Some(12.5));
        assert_eq!(
            summary.get("average_order_value").and_then(ReportValue::as_f64),
            Some(12.5)
        );
    }

    #[test]
    fn test_summary_key_order() {
        let summary = summarize(EntityKind::Order, vec![json!({})]);
        assert_eq!(
            summary.keys(),
            vec![
                "status",
                "message",
                "orders",
                "status_counts",
                "total_revenue",
                "average_order_value"
            ]
        );
        assert_eq!(
            summary.get("message").and_then(ReportValue::as_str),
            Some("Successfully processed 1 orders")
        );
    }

    #[test]
    fn test_record_object_lists_fields_then_flags() {
        let summary = summarize(EntityKind::RestaurantAccount, vec![json!({ "status": "pending" })]);
        let record = &summary
            .get("restaurant_accounts")
            .and_then(ReportValue::as_array)
            .unwrap()[0];

        assert_eq!(
            record.keys(),
            vec![
                "id",
                "restaurant_name",
                "owner_username",
                "status",
                "account_type",
                "created_at",
                "city",
                "address",
                "phone",
                "email",
                "is_approved",
                "is_pending",
                "is_sanctioned",
                "is_banned",
                "is_rejected"
            ]
        );
        assert_eq!(record.get("is_pending").and_then(ReportValue::as_bool), Some(true));
    }

    #[test]
    fn test_account_summary_has_no_counts() {
        let summary = summarize(
            EntityKind::Account,
            vec![json!({ "user_id": 1, "first_name": "Karim", "last_name": "Alaoui" })],
        );

        assert_eq!(summary.keys(), vec!["status", "message", "accounts"]);
        let record = &summary.get("accounts").and_then(ReportValue::as_array).unwrap()[0];
        assert_eq!(record.get("full_name").and_then(ReportValue::as_str), Some("Karim Alaoui"));
    }

    #[test]
    fn test_records_keep_input_order() {
        let summary = summarize(
            EntityKind::Order,
            (1..=5).map(|id| json!({ "order_id": id })).collect(),
        );

        let ids: Vec<i64> = summary
            .get("orders")
            .and_then(ReportValue::as_array)
            .unwrap()
            .iter()
            .filter_map(|order| order.get("order_id").and_then(ReportValue::as_i64))
            .collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_huge_revenue_stays_numeric() {
        let summary = summarize(
            EntityKind::Order,
            vec![
                json!({ "total_price": 1.7e308, "status": "delivered" }),
                json!({ "total_price": 1.7e308, "status": "new" }),
            ],
        );

        let json = crate::serialization::serialize(&summary).unwrap();
        assert!(!json.contains("null"));
        assert_eq!(summary.get("total_revenue").and_then(ReportValue::as_f64), Some(f64::MAX));
        assert!(summary
            .get("average_order_value")
            .and_then(ReportValue::as_f64)
            .is_some_and(f64::is_finite));
    }
}
