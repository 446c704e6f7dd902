use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{EventKind, Topic};

/// One received webhook, immutable after insertion.
///
/// `data` is a small per-kind projection of the payload for cheap display and
/// querying; `raw` keeps the full inbound body for audit and debugging.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    pub id: String,
    pub kind: EventKind,
    pub topic: Topic,
    pub timestamp: DateTime<Utc>,
    pub data: EventData,
    pub raw: Value,
}

/// Normalized per-kind projection of a webhook payload.
///
/// Extraction is permissive: missing fields default to empty/zero rather than
/// rejecting the event. Kinds without a dedicated projection (refunds, app
/// lifecycle) fall back to a one-line summary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum EventData {
    Order {
        order_number: Option<i64>,
        customer: String,
        email: String,
        total: String,
        currency: String,
        item_count: usize,
        status: String,
        fulfillment: String,
    },
    Product {
        product_id: Option<i64>,
        title: String,
        vendor: String,
        status: String,
        variants: usize,
    },
    Inventory {
        inventory_item_id: Option<i64>,
        location_id: Option<i64>,
        available: Option<i64>,
        updated_at: String,
    },
    Customer {
        customer_id: Option<i64>,
        name: String,
        email: String,
        orders_count: Option<i64>,
        total_spent: String,
    },
    Other {
        summary: String,
    },
}

impl EventData {
    pub fn extract(kind: EventKind, raw: &Value) -> Self {
        match kind {
            EventKind::Order => EventData::Order {
                order_number: i64_field(raw, "order_number"),
                customer: order_customer(raw),
                email: str_field(raw, "email"),
                total: str_field(raw, "total_price"),
                currency: str_field(raw, "currency"),
                item_count: array_len(raw, "line_items"),
                status: str_field(raw, "financial_status"),
                fulfillment: str_field_or(raw, "fulfillment_status", "unfulfilled"),
            },
            EventKind::Product => EventData::Product {
                product_id: i64_field(raw, "id"),
                title: str_field(raw, "title"),
                vendor: str_field(raw, "vendor"),
                status: str_field(raw, "status"),
                variants: array_len(raw, "variants"),
            },
            EventKind::Inventory => EventData::Inventory {
                inventory_item_id: i64_field(raw, "inventory_item_id"),
                location_id: i64_field(raw, "location_id"),
                available: i64_field(raw, "available"),
                updated_at: str_field(raw, "updated_at"),
            },
            EventKind::Customer => EventData::Customer {
                customer_id: i64_field(raw, "id"),
                name: format!(
                    "{} {}",
                    str_field(raw, "first_name"),
                    str_field(raw, "last_name")
                )
                .trim()
                .to_string(),
                email: str_field(raw, "email"),
                orders_count: i64_field(raw, "orders_count"),
                total_spent: str_field(raw, "total_spent"),
            },
            EventKind::Refund | EventKind::App => EventData::Other {
                summary: format!("{kind} event"),
            },
        }
    }

    /// One-line digest used in the recent-activity feed.
    pub fn summary(&self, topic: Topic) -> String {
        match self {
            EventData::Order {
                order_number,
                total,
                currency,
                ..
            } => format!(
                "Order #{} - {total} {currency}",
                fmt_opt_i64(*order_number)
            ),
            EventData::Product { title, .. } => title.clone(),
            EventData::Inventory { available, .. } => {
                format!("Stock: {} units", fmt_opt_i64(*available))
            }
            EventData::Customer { name, email, .. } => {
                if name.is_empty() {
                    email.clone()
                } else {
                    name.clone()
                }
            }
            EventData::Other { .. } => topic.as_str().to_string(),
        }
    }
}

fn order_customer(raw: &Value) -> String {
    match raw.get("customer") {
        Some(customer) if customer.is_object() => format!(
            "{} {}",
            str_field(customer, "first_name"),
            str_field(customer, "last_name")
        ),
        _ => str_field(raw, "email"),
    }
}

fn fmt_opt_i64(value: Option<i64>) -> String {
    value.map_or_else(|| "?".to_string(), |n| n.to_string())
}

pub(crate) fn str_field(raw: &Value, key: &str) -> String {
    raw.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

pub(crate) fn str_field_or(raw: &Value, key: &str, default: &str) -> String {
    match raw.get(key).and_then(Value::as_str) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => default.to_string(),
    }
}

pub(crate) fn i64_field(raw: &Value, key: &str) -> Option<i64> {
    raw.get(key).and_then(Value::as_i64)
}

pub(crate) fn array_len(raw: &Value, key: &str) -> usize {
    raw.get(key).and_then(Value::as_array).map_or(0, Vec::len)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn order_projection_extracts_key_fields() {
        let raw = json!({
            "order_number": 1001,
            "email": "a.b@example.com",
            "total_price": "49.99",
            "currency": "USD",
            "financial_status": "paid",
            "customer": { "first_name": "A", "last_name": "B" },
            "line_items": [{ "name": "Belt", "quantity": 2 }]
        });

        let data = EventData::extract(EventKind::Order, &raw);
        assert_eq!(
            data,
            EventData::Order {
                order_number: Some(1001),
                customer: "A B".to_string(),
                email: "a.b@example.com".to_string(),
                total: "49.99".to_string(),
                currency: "USD".to_string(),
                item_count: 1,
                status: "paid".to_string(),
                fulfillment: "unfulfilled".to_string(),
            }
        );
        assert_eq!(
            data.summary(Topic::OrdersCreate),
            "Order #1001 - 49.99 USD"
        );
    }

    #[test]
    fn order_without_customer_object_falls_back_to_email() {
        let raw = json!({ "order_number": 7, "email": "guest@example.com" });
        let EventData::Order { customer, .. } = EventData::extract(EventKind::Order, &raw) else {
            unreachable!();
        };
        assert_eq!(customer, "guest@example.com");
    }

    #[test]
    fn missing_fields_default_instead_of_failing() {
        let data = EventData::extract(EventKind::Inventory, &json!({}));
        assert_eq!(
            data,
            EventData::Inventory {
                inventory_item_id: None,
                location_id: None,
                available: None,
                updated_at: String::new(),
            }
        );
        assert_eq!(
            data.summary(Topic::InventoryLevelsUpdate),
            "Stock: ? units"
        );
    }

    #[test]
    fn customer_name_is_trimmed() {
        let raw = json!({ "id": 5, "first_name": "Ada", "email": "ada@example.com" });
        let EventData::Customer { name, .. } = EventData::extract(EventKind::Customer, &raw)
        else {
            unreachable!();
        };
        assert_eq!(name, "Ada");
    }

    #[test]
    fn refund_and_app_use_generic_summary() {
        let data = EventData::extract(EventKind::Refund, &json!({ "order_id": 9 }));
        assert_eq!(
            data,
            EventData::Other {
                summary: "refund event".to_string()
            }
        );
        assert_eq!(data.summary(Topic::RefundsCreate), "refunds/create");
    }
}
