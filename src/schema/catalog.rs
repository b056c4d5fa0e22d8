//! Built-in entity kinds and their schema tables.

use super::{AggregateSpec, ClassificationRule, EntitySchema, FieldDescriptor};
use crate::entity::{FieldValue, Record};
use std::fmt;
use std::sync::OnceLock;

/// The entity kinds this crate can report on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Account,
    Order,
    RestaurantAccount,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [
        EntityKind::Account,
        EntityKind::Order,
        EntityKind::RestaurantAccount,
    ];

    /// Binary name of the report tool for this kind.
    pub fn tool_name(&self) -> &'static str {
        match self {
            EntityKind::Account => "account-report",
            EntityKind::Order => "order-report",
            EntityKind::RestaurantAccount => "restaurant-report",
        }
    }

    pub fn about(&self) -> &'static str {
        match self {
            EntityKind::Account => "Summarize a JSON export of user accounts",
            EntityKind::Order => "Summarize a JSON export of orders with status counts and revenue",
            EntityKind::RestaurantAccount => {
                "Summarize a JSON export of restaurant accounts with status counts"
            }
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(schema_for(*self).name())
    }
}

/// Schema of an entity kind, built on first use and shared afterwards.
pub fn schema_for(kind: EntityKind) -> &'static EntitySchema {
    static ACCOUNT: OnceLock<EntitySchema> = OnceLock::new();
    static ORDER: OnceLock<EntitySchema> = OnceLock::new();
    static RESTAURANT_ACCOUNT: OnceLock<EntitySchema> = OnceLock::new();

    match kind {
        EntityKind::Account => ACCOUNT.get_or_init(account_schema),
        EntityKind::Order => ORDER.get_or_init(order_schema),
        EntityKind::RestaurantAccount => RESTAURANT_ACCOUNT.get_or_init(restaurant_account_schema),
    }
}

/// `first_name last_name`, or the username when both are empty.
fn full_name(record: &Record) -> FieldValue {
    let first = record.get_str("first_name");
    let last = record.get_str("last_name");
    if first.is_empty() && last.is_empty() {
        record.get_str("username").into()
    } else {
        format!("{} {}", first, last).into()
    }
}

// Built-in tables must validate; `test_builtin_schemas_build` checks all of them.

fn account_schema() -> EntitySchema {
    EntitySchema::builder("Account")
        .field(FieldDescriptor::int("user_id"))
        .field(FieldDescriptor::string("username"))
        .field(FieldDescriptor::string("email"))
        .field(FieldDescriptor::string("first_name"))
        .field(FieldDescriptor::string("last_name"))
        .field(FieldDescriptor::derived("full_name", full_name))
        .field(FieldDescriptor::string("date_joined"))
        .line("User ID", "user_id")
        .line("Username", "username")
        .line("Email", "email")
        .line("Name", "full_name")
        .line("Joined", "date_joined")
        .build()
        .expect("account schema is valid")
}

fn order_schema() -> EntitySchema {
    EntitySchema::builder("Order")
        .field(FieldDescriptor::int("order_id"))
        .field(FieldDescriptor::int("user_id"))
        .field(FieldDescriptor::int("restaurant_id"))
        .field(FieldDescriptor::float("total_price"))
        .field(FieldDescriptor::string("status"))
        .field(FieldDescriptor::string("payment_method"))
        .field(FieldDescriptor::string("delivery_address"))
        .field(FieldDescriptor::string("delivery_time"))
        .field(FieldDescriptor::string("order_code"))
        .field(FieldDescriptor::string("customer_name"))
        .field(FieldDescriptor::boolean("is_takeaway"))
        .field(FieldDescriptor::string("created_at"))
        .field(FieldDescriptor::string("special_instructions"))
        .rule(ClassificationRule::status("is_new", "new"))
        .rule(ClassificationRule::status("is_pending", "pending"))
        .rule(ClassificationRule::status("is_preparing", "preparing"))
        .rule(ClassificationRule::status("is_ready", "ready"))
        .rule(ClassificationRule::status("is_delivered", "delivered"))
        .rule(ClassificationRule::status("is_cancelled", "cancelled"))
        .rule(ClassificationRule::status("is_paid", "paid"))
        .rule(ClassificationRule::any_of("is_completed", &["is_delivered", "is_paid"]))
        .aggregate(AggregateSpec {
            field: "total_price",
            excluded_by: "is_cancelled",
            sum_key: "total_revenue",
            average_key: "average_order_value",
        })
        .line("Order ID", "order_id")
        .line("User ID", "user_id")
        .line("Restaurant ID", "restaurant_id")
        .line("Total Price", "total_price")
        .line("Status", "status")
        .line("Payment Method", "payment_method")
        .line("Delivery Address", "delivery_address")
        .line("Delivery Time", "delivery_time")
        .line("Order Code", "order_code")
        .line("Customer Name", "customer_name")
        .line("Takeaway", "is_takeaway")
        .line("Created At", "created_at")
        .line("Special Instructions", "special_instructions")
        .build()
        .expect("order schema is valid")
}

fn restaurant_account_schema() -> EntitySchema {
    EntitySchema::builder("RestaurantAccount")
        .field(FieldDescriptor::int("id"))
        .field(FieldDescriptor::string("restaurant_name"))
        .field(FieldDescriptor::string("owner_username"))
        .field(FieldDescriptor::string("status"))
        .field(FieldDescriptor::string("account_type"))
        .field(FieldDescriptor::string("created_at"))
        .field(FieldDescriptor::string("city"))
        .field(FieldDescriptor::string("address"))
        .field(FieldDescriptor::string("phone"))
        .field(FieldDescriptor::string("email"))
        .rule(ClassificationRule::status("is_approved", "approved"))
        .rule(ClassificationRule::status("is_pending", "pending"))
        .rule(ClassificationRule::status("is_sanctioned", "sanctioned"))
        .rule(ClassificationRule::status("is_banned", "banned"))
        .rule(ClassificationRule::status("is_rejected", "rejected"))
        .line("Restaurant ID", "id")
        .line("Name", "restaurant_name")
        .line("Owner", "owner_username")
        .line("Status", "status")
        .line("Account Type", "account_type")
        .line("Created", "created_at")
        .line("City", "city")
        .line("Address", "address")
        .line("Phone", "phone")
        .line("Email", "email")
        .build()
        .expect("restaurant account schema is valid")
}
